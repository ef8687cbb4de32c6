use serde::{Serialize, Deserialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncryptionStatus {
    #[serde(rename="Enabled")]
    Enabled,
    #[serde(rename="Not Enabled")]
    NotEnabled,
}

impl fmt::Display for EncryptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncryptionStatus::Enabled => f.write_str("Enabled"),
            EncryptionStatus::NotEnabled => f.write_str("Not Enabled"),
        }
    }
}

/// Default encryption applied to new objects.
/// `SSEAlgorithm` is `AES256`, `aws:kms` or `aws:kms:dsse`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultEncryption {
    #[serde(rename="SSEAlgorithm")]
    pub sse_algorithm: String,
    #[serde(rename="KMSMasterKeyID", default, skip_serializing_if="Option::is_none")]
    pub kms_master_key_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionRule {
    #[serde(
        rename="ApplyServerSideEncryptionByDefault",
        default,
        skip_serializing_if="Option::is_none"
    )]
    pub default_encryption: Option<DefaultEncryption>,
    #[serde(rename="BucketKeyEnabled", default, skip_serializing_if="Option::is_none")]
    pub bucket_key_enabled: Option<bool>,
}

/// Server-side encryption configuration of one bucket, shaped like the provider's payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionConfig {
    #[serde(rename="Rules", default)]
    pub rules: Vec<EncryptionRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketRecord {
    pub bucket_name: String,
    pub encryption_status: EncryptionStatus,
    pub encryption_status_details: Option<EncryptionConfig>,
}

impl BucketRecord {
    pub fn enabled(bucket_name: impl Into<String>, details: EncryptionConfig) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            encryption_status: EncryptionStatus::Enabled,
            encryption_status_details: Some(details),
        }
    }

    pub fn not_enabled(bucket_name: impl Into<String>) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            encryption_status: EncryptionStatus::NotEnabled,
            encryption_status_details: None,
        }
    }

    pub fn is_encrypted(&self) -> bool { self.encryption_status == EncryptionStatus::Enabled }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub total_buckets: usize,
    pub encrypted_buckets: usize,
    pub unencrypted_buckets: usize,
    pub scan_results: Vec<BucketRecord>,
    pub ai_analysis: String,
    pub alert: bool,
}

impl ScanResult {
    /// Names of the buckets without default encryption, in scan order.
    pub fn unencrypted_names(&self) -> Vec<&str> {
        self.scan_results.iter()
            .filter(|r| !r.is_encrypted())
            .map(|r| r.bucket_name.as_str())
            .collect()
    }
}

/// What the invocation runtime gets back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename="statusCode")]
    pub status_code: u16,
    pub body: String,
}
