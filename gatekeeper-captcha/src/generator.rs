use crate::error::Error;
use crate::font::glyph_for;
use crate::palette::quantize;
use image::{GrayImage, Luma};
use rand::Rng;
use rand::RngExt;
use rand::seq::IndexedRandom;

/// Side length of a rendered CAPTCHA image, matching a vanilla Minecraft map item.
pub const IMAGE_SIZE: u32 = 128;

/// Number of palette bytes in a rendered artifact (`IMAGE_SIZE * IMAGE_SIZE`).
pub const PALETTE_LEN: usize = (IMAGE_SIZE * IMAGE_SIZE) as usize;

const BACKGROUND_GRAY: u8 = 235;
const INK_GRAY: u8 = 20;
const NOISE_PIXELS: usize = 100;
const LINE_COUNT: usize = 5;
const MAX_ROTATION_DEGREES: f64 = 20.0;
const MAX_Y_OFFSET: i32 = 10;

/// Renders CAPTCHA challenge codes into 128×128 map-palette byte buffers.
///
/// Configured once with an alphabet and code length; [`CaptchaGenerator::generate_code`] and
/// [`CaptchaGenerator::render`] are pure with respect to an injected [`rand::Rng`], so tests can
/// drive them with a seeded generator instead of depending on wall-clock entropy.
#[derive(Debug, Clone)]
pub struct CaptchaGenerator {
    alphabet: Vec<char>,
    code_length: usize,
    background: Option<GrayImage>,
}

impl CaptchaGenerator {
    pub fn new(alphabet: impl Into<Vec<char>>, code_length: usize) -> Result<Self, Error> {
        let alphabet = alphabet.into();
        if alphabet.is_empty() {
            return Err(Error::EmptyAlphabet);
        }
        if code_length == 0 {
            return Err(Error::ZeroLength);
        }
        Ok(Self {
            alphabet,
            code_length,
            background: None,
        })
    }

    /// Supplies a custom background image, pre-scaled to [`IMAGE_SIZE`]×[`IMAGE_SIZE`] and
    /// converted to grayscale. Loading and resizing from a file path is the caller's concern
    /// (the config layer resolves `mapCaptcha.backgroundPath`, see `gatekeeper::config`).
    pub fn with_background(mut self, background: GrayImage) -> Self {
        self.background = Some(background);
        self
    }

    /// Loads a background image from disk, resizing and converting it to the grayscale
    /// [`IMAGE_SIZE`]×[`IMAGE_SIZE`] canvas that [`CaptchaGenerator::render`] draws onto.
    pub fn with_background_file(self, path: impl AsRef<std::path::Path>) -> Result<Self, Error> {
        let decoded = image::open(path).map_err(Error::Background)?;
        let resized = decoded.resize_exact(
            IMAGE_SIZE,
            IMAGE_SIZE,
            image::imageops::FilterType::Triangle,
        );
        Ok(self.with_background(resized.into_luma8()))
    }

    /// Draws a random code from the configured alphabet.
    pub fn generate_code(&self, rng: &mut impl Rng) -> String {
        (0..self.code_length)
            .map(|_| *self.alphabet.choose(rng).expect("alphabet validated non-empty at construction"))
            .collect()
    }

    /// Renders `code` into a 16384-byte Minecraft map-color palette buffer.
    pub fn render(&self, code: &str, rng: &mut impl Rng) -> Vec<u8> {
        let mut image = self.background.clone().unwrap_or_else(|| {
            GrayImage::from_pixel(IMAGE_SIZE, IMAGE_SIZE, Luma([BACKGROUND_GRAY]))
        });

        let chars: Vec<char> = code.chars().collect();
        let cell_width = IMAGE_SIZE as f64 / chars.len().max(1) as f64;
        for (i, ch) in chars.into_iter().enumerate() {
            let cx = cell_width * (i as f64 + 0.5);
            let cy = IMAGE_SIZE as f64 / 2.0
                + rng.random_range(-MAX_Y_OFFSET..=MAX_Y_OFFSET) as f64;
            let angle = rng.random_range(-MAX_ROTATION_DEGREES..=MAX_ROTATION_DEGREES);
            draw_glyph(&mut image, ch, cx, cy, cell_width * 0.7, angle);
        }

        for _ in 0..NOISE_PIXELS {
            let x = rng.random_range(0..IMAGE_SIZE);
            let y = rng.random_range(0..IMAGE_SIZE);
            let gray = rng.random_range(0..=255u8);
            image.put_pixel(x, y, Luma([gray]));
        }

        for _ in 0..LINE_COUNT {
            let x0 = rng.random_range(0..IMAGE_SIZE) as i32;
            let y0 = rng.random_range(0..IMAGE_SIZE) as i32;
            let x1 = rng.random_range(0..IMAGE_SIZE) as i32;
            let y1 = rng.random_range(0..IMAGE_SIZE) as i32;
            draw_line(&mut image, (x0, y0), (x1, y1), rng.random_range(0..=255u8));
        }

        image
            .pixels()
            .map(|p| quantize(p.0[0]))
            .collect()
    }
}

/// Rasterizes a single 5×7 glyph into `image`, rotated by `angle_degrees` around `(cx, cy)` and
/// scaled to occupy roughly `width` pixels.
fn draw_glyph(image: &mut GrayImage, ch: char, cx: f64, cy: f64, width: f64, angle_degrees: f64) {
    let glyph = glyph_for(ch);
    let height = width * 7.0 / 5.0;
    let theta = -angle_degrees.to_radians();
    let (sin, cos) = theta.sin_cos();

    // half-diagonal of the glyph's bounding box, so the rotated sweep never clips a corner
    let radius = ((width / 2.0).powi(2) + (height / 2.0).powi(2)).sqrt().ceil() as i32;
    let (cxi, cyi) = (cx.round() as i32, cy.round() as i32);

    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let px = cxi + dx;
            let py = cyi + dy;
            if px < 0 || py < 0 || px as u32 >= IMAGE_SIZE || py as u32 >= IMAGE_SIZE {
                continue;
            }

            // rotate the destination offset back into unrotated glyph space
            let (fx, fy) = (dx as f64, dy as f64);
            let gx = fx * cos - fy * sin;
            let gy = fx * sin + fy * cos;

            if gx < -width / 2.0 || gx >= width / 2.0 || gy < -height / 2.0 || gy >= height / 2.0 {
                continue;
            }

            let col = (((gx + width / 2.0) / width) * 5.0) as usize;
            let row = (((gy + height / 2.0) / height) * 7.0) as usize;
            let (col, row) = (col.min(4), row.min(6));

            if glyph[row] & (1 << (4 - col)) != 0 {
                image.put_pixel(px as u32, py as u32, Luma([INK_GRAY]));
            }
        }
    }
}

/// Plain Bresenham line rasterizer; used for the randomised noise lines in a rendered CAPTCHA.
fn draw_line(image: &mut GrayImage, (x0, y0): (i32, i32), (x1, y1): (i32, i32), gray: u8) {
    let (mut x0, mut y0) = (x0, y0);
    let (dx, dy) = ((x1 - x0).abs(), -(y1 - y0).abs());
    let (sx, sy) = (if x0 < x1 { 1 } else { -1 }, if y0 < y1 { 1 } else { -1 });
    let mut err = dx + dy;

    loop {
        if x0 >= 0 && y0 >= 0 && (x0 as u32) < IMAGE_SIZE && (y0 as u32) < IMAGE_SIZE {
            image.put_pixel(x0 as u32, y0 as u32, Luma([gray]));
        }
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn generator() -> CaptchaGenerator {
        CaptchaGenerator::new(['A', 'B', 'C'], 3).unwrap()
    }

    #[test]
    fn new_rejects_an_empty_alphabet() {
        assert!(matches!(
            CaptchaGenerator::new(Vec::<char>::new(), 3),
            Err(Error::EmptyAlphabet)
        ));
    }

    #[test]
    fn new_rejects_a_zero_code_length() {
        assert!(matches!(
            CaptchaGenerator::new(['A'], 0),
            Err(Error::ZeroLength)
        ));
    }

    #[test]
    fn generate_code_has_configured_length_and_alphabet() {
        let mut rng = StdRng::seed_from_u64(1);
        let code = generator().generate_code(&mut rng);
        assert_eq!(code.len(), 3);
        assert!(code.chars().all(|c| "ABC".contains(c)));
    }

    #[test]
    fn render_produces_full_size_palette_buffer() {
        let mut rng = StdRng::seed_from_u64(2);
        let bytes = generator().render("CAB", &mut rng);
        assert_eq!(bytes.len(), PALETTE_LEN);
    }

    #[test]
    fn render_is_deterministic_for_a_fixed_seed() {
        let bytes_a = generator().render("CAB", &mut StdRng::seed_from_u64(42));
        let bytes_b = generator().render("CAB", &mut StdRng::seed_from_u64(42));
        assert_eq!(bytes_a, bytes_b);
    }

    #[test]
    fn every_palette_byte_is_one_of_the_four_indices() {
        let mut rng = StdRng::seed_from_u64(3);
        let bytes = generator().render("BCA", &mut rng);
        assert!(bytes.iter().all(|b| [29, 30, 31, 34].contains(b)));
    }
}
