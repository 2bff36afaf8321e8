use crate::error::{ErrorKind, Result};
use modeldump_codec::buffer::Reader;

/// A texture: one or more sprites blended together, optionally animated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextureDefinition {
    pub id: u32,
    /// Packed HSL colour used when the texture cannot be drawn.
    pub average_rgb: u16,
    pub opaque: bool,
    /// Sprite ids, first one is the base layer.
    pub file_ids: Vec<u16>,
    pub sprite_types: Vec<u8>,
    pub transforms: Vec<u8>,
    pub colours: Vec<i32>,
    pub animation_direction: u8,
    pub animation_speed: u8,
}

impl TextureDefinition {
    pub fn decode(id: u32, data: &[u8]) -> Result<Self> {
        Self::read(id, &mut Reader::new(data)).map_err(|err| err.raise(ErrorKind::InvalidTexture(id)))
    }

    fn read(id: u32, reader: &mut Reader<'_>) -> modeldump_codec::error::Result<Self> {
        let average_rgb = reader.u16()?;
        let opaque = reader.u8()? != 0;
        let count = usize::from(reader.u8()?);
        let file_ids = (0..count).map(|_| reader.u16()).collect::<std::result::Result<Vec<_>, _>>()?;
        let layers = count.saturating_sub(1);
        let sprite_types = reader.take(layers)?.to_vec();
        let transforms = reader.take(layers)?.to_vec();
        let colours = (0..count).map(|_| reader.i32()).collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self {
            id,
            average_rgb,
            opaque,
            file_ids,
            sprite_types,
            transforms,
            colours,
            animation_direction: reader.u8()?,
            animation_speed: reader.u8()?,
        })
    }

    /// Base sprite, if the texture has any.
    pub fn sprite(&self) -> Option<u16> {
        self.file_ids.first().copied()
    }
}
