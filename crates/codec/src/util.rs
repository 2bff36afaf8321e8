use crate::Compression;
use std::fmt::{Display, Formatter, Result as FmtResult};

impl Display for Compression {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl Compression {
    /// Returns the id written in the first byte of a container.
    #[inline]
    #[must_use]
    pub fn id(&self) -> u8 {
        *self as u8
    }

    /// Returns the short name for configuration (for displaying to user)
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Compression::None => "none",
            Compression::Bzip2 => "bzip2",
            Compression::Gzip => "gzip",
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Compression;
    use rstest::rstest;

    #[rstest]
    #[case(Compression::None, "none")]
    #[case(Compression::Bzip2, "bzip2")]
    #[case(Compression::Gzip, "gzip")]
    fn test_display(#[case] format: Compression, #[case] expected: &str) {
        assert_eq!(format.to_string(), expected);
    }
}
