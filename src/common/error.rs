use thiserror::Error;

/// Pipeline-internal error taxonomy.
///
/// Neither variant crosses the public aggregation boundary: fetch errors
/// are retried and then swallowed by the fetcher, render errors degrade
/// to an empty output. Codec failures are `Option`-shaped drop sites and
/// never reach this type.
#[derive(Error, Debug)]
pub enum SubError {
    #[error("fetch error: {0}")]
    Fetch(String),

    #[error("render error: {0}")]
    Render(String),
}

impl From<reqwest::Error> for SubError {
    fn from(e: reqwest::Error) -> Self {
        SubError::Fetch(e.to_string())
    }
}
