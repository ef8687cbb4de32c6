use async_trait::async_trait;

pub mod aggregate;
pub mod config;
pub mod error;
pub mod model;
pub mod scan;

pub use aggregate::{aggregate, build_prompt, is_placeholder_analysis, AI_FAILED_PREFIX, AI_SKIPPED};
pub use config::ScanConfig;
pub use error::{ErrorClass, LookupError, ScanError};
pub use model::{
    BucketRecord, DefaultEncryption, EncryptionConfig, EncryptionRule, EncryptionStatus, Envelope,
    ScanResult,
};
pub use scan::Scanner;

/// Storage provider seen by the scan: bucket listing plus per-bucket encryption lookup.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BucketSource: Send + Sync {
    /// One listing call; no pagination.
    async fn list_buckets(&self) -> anyhow::Result<Vec<String>>;
    /// `Err(LookupError::NotConfigured)` when the bucket has no encryption configuration.
    async fn bucket_encryption(&self, bucket: &str) -> Result<EncryptionConfig, LookupError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, api_key: &str, prompt: &str) -> anyhow::Result<String>;
}

/// Delivers a finished scan to a chat webhook, returning the HTTP status code.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, webhook_url: &str, result: &ScanResult) -> anyhow::Result<u16>;
}
