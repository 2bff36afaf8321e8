//! Model extraction driver.
//!
//! [`run`] takes a [`Config`](modeldump_config::Config) through the whole
//! job: locate and validate the cache, load it, then [`extract`] every model
//! archive to `<id>.model`, with a [`Converter`] writing `<id>.obj` and
//! `<id>.mtl` alongside when conversion is enabled.

mod convert;
pub mod error;
mod extract;
mod run;

pub use crate::convert::Converter;
pub use crate::extract::{Summary, extract};
pub use crate::run::run;
