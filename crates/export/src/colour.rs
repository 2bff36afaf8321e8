//! Packed HSL colours.
//!
//! Face colours are 16 bits: 6 bits of hue, 3 of saturation and 7 of
//! luminance. The game darkens them with a brightness exponent before
//! display.

pub const BRIGHTNESS_MAX: f64 = 0.6;
pub const BRIGHTNESS_HIGH: f64 = 0.7;
pub const BRIGHTNESS_LOW: f64 = 0.8;
pub const BRIGHTNESS_MIN: f64 = 0.9;

pub fn unpack_hue(hsl: u16) -> u8 {
    ((hsl >> 10) & 63) as u8
}

pub fn unpack_saturation(hsl: u16) -> u8 {
    ((hsl >> 7) & 7) as u8
}

pub fn unpack_luminance(hsl: u16) -> u8 {
    (hsl & 127) as u8
}

/// Convert a packed HSL colour to `0xRRGGBB`.
///
/// Never returns 0: pure black is reserved as "no colour" and becomes 1.
pub fn hsl_to_rgb(hsl: u16, brightness: f64) -> u32 {
    let hue = f64::from(unpack_hue(hsl)) / 64.0 + 0.0078125;
    let saturation = f64::from(unpack_saturation(hsl)) / 8.0 + 0.0625;
    let luminance = f64::from(unpack_luminance(hsl)) / 128.0;

    let chroma = (1.0 - (2.0 * luminance - 1.0).abs()) * saturation;
    let x = chroma * (1.0 - ((hue * 6.0) % 2.0 - 1.0).abs());
    let lightness = luminance - chroma / 2.0;

    let (mut r, mut g, mut b) = (lightness, lightness, lightness);
    match (hue * 6.0) as u32 {
        0 => {
            r += chroma;
            g += x;
        },
        1 => {
            g += chroma;
            r += x;
        },
        2 => {
            g += chroma;
            b += x;
        },
        3 => {
            b += chroma;
            g += x;
        },
        4 => {
            b += chroma;
            r += x;
        },
        _ => {
            r += chroma;
            b += x;
        },
    }

    match adjust_for_brightness(pack(r, g, b), brightness) {
        0 => 1,
        rgb => rgb,
    }
}

/// Raise each channel to the power of `brightness`.
pub fn adjust_for_brightness(rgb: u32, brightness: f64) -> u32 {
    let [r, g, b] = channels(rgb).map(|channel| (f64::from(channel) / 256.0).powf(brightness));
    pack(r, g, b)
}

/// Split `0xRRGGBB` into its channels.
pub fn channels(rgb: u32) -> [u8; 3] {
    [(rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8]
}

/// Channels in `[0, 1)` to `0xRRGGBB`.
fn pack(r: f64, g: f64, b: f64) -> u32 {
    ((r * 256.0) as u32) << 16 | ((g * 256.0) as u32) << 8 | (b * 256.0) as u32
}
