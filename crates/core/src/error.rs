use thiserror::Error;

/// How a failed encryption lookup is treated by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The bucket has no server-side encryption configuration.
    NotFound,
    Other,
}

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("server-side encryption configuration not found")]
    NotConfigured,
    #[error("{0:#}")]
    Other(anyhow::Error),
}

impl LookupError {
    pub fn class(&self) -> ErrorClass {
        match self {
            LookupError::NotConfigured => ErrorClass::NotFound,
            LookupError::Other(_) => ErrorClass::Other,
        }
    }
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("failed to enumerate buckets: {0:#}")]
    Enumerate(anyhow::Error),
    #[error("failed to encode scan result")]
    Encode(#[from] serde_json::Error),
}
