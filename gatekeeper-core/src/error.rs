use thiserror::Error;

/// Operational failures of the admission core, as distinct from the admission-domain
/// [`gatekeeper_packets::decision::Reason`] taxonomy returned from `decide`/`on_event` calls.
///
/// An `Error` aborts startup or a fallible construction step; it never represents a single
/// session's outcome.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid regex for {field}: {source}")]
    InvalidRegex {
        field: &'static str,
        #[source]
        source: regex::Error,
    },

    #[error("failed to prepare captcha generator: {0}")]
    Captcha(#[from] gatekeeper_captcha::Error),

    #[error("admission core is disabled")]
    Disabled,
}
