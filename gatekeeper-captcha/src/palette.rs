//! Quantises rendered grayscale pixels down to the four Minecraft map-color indices used for
//! this challenge's palette (shades of a single base color are enough to keep the image legible
//! as a map item without needing the full vanilla map-color table).

/// Map-color palette index for light stone/quartz gray-tones, darkest to lightest.
const DARKEST: u8 = 29;
const DARK: u8 = 30;
const LIGHT: u8 = 31;
const LIGHTEST: u8 = 34;

/// Quantises a single gray value (0-255) into one of the four palette indices.
pub fn quantize(gray: u8) -> u8 {
    match gray {
        0..64 => DARKEST,
        64..128 => DARK,
        128..192 => LIGHT,
        _ => LIGHTEST,
    }
}
