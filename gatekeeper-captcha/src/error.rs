use thiserror::Error;

/// Failures that can occur while configuring or running the CAPTCHA generator.
#[derive(Debug, Error)]
pub enum Error {
    #[error("captcha alphabet must contain at least one character")]
    EmptyAlphabet,

    #[error("captcha code length must be at least one character")]
    ZeroLength,

    #[error("failed to decode background image: {0}")]
    Background(#[source] image::ImageError),
}
