use anyhow::Context;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::types::ServerSideEncryptionConfiguration;
use aws_sdk_s3::Client;
use tracing::debug;

use sseaudit_core::{
    BucketSource, DefaultEncryption, EncryptionConfig, EncryptionRule, ErrorClass, LookupError,
};

/// Error code S3 answers `GetBucketEncryption` with when no configuration exists.
pub const SSE_NOT_FOUND_CODE: &str = "ServerSideEncryptionConfigurationNotFoundError";

pub fn classify_code(code: Option<&str>) -> ErrorClass {
    match code {
        Some(SSE_NOT_FOUND_CODE) => ErrorClass::NotFound,
        _ => ErrorClass::Other,
    }
}

/// S3 as a [`BucketSource`], using the ambient credential chain.
#[derive(Debug, Clone)]
pub struct S3Inventory { client: Client }

impl S3Inventory {
    pub fn new(client: Client) -> Self { Self { client } }

    pub async fn from_env(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(r) = region { loader = loader.region(Region::new(r)); }
        let shared = loader.load().await;
        Self::new(Client::new(&shared))
    }
}

#[async_trait]
impl BucketSource for S3Inventory {
    async fn list_buckets(&self) -> anyhow::Result<Vec<String>> {
        let out = self.client.list_buckets().send().await.context("s3 ListBuckets")?;
        Ok(out.buckets().iter().filter_map(|b| b.name().map(str::to_string)).collect())
    }

    async fn bucket_encryption(&self, bucket: &str) -> Result<EncryptionConfig, LookupError> {
        match self.client.get_bucket_encryption().bucket(bucket).send().await {
            Ok(out) => out.server_side_encryption_configuration()
                .map(to_model)
                .ok_or_else(|| {
                    LookupError::Other(anyhow::anyhow!(
                        "GetBucketEncryption for {bucket} returned no configuration"
                    ))
                }),
            Err(e) => {
                debug!(bucket, code = e.code().unwrap_or("unknown"), "GetBucketEncryption failed");
                match classify_code(e.code()) {
                    ErrorClass::NotFound => Err(LookupError::NotConfigured),
                    ErrorClass::Other => Err(LookupError::Other(
                        anyhow::Error::new(e).context(format!("s3 GetBucketEncryption {bucket}")))),
                }
            }
        }
    }
}

pub fn to_model(cfg: &ServerSideEncryptionConfiguration) -> EncryptionConfig {
    EncryptionConfig {
        rules: cfg.rules().iter().map(|rule| EncryptionRule {
            default_encryption: rule.apply_server_side_encryption_by_default()
                .map(|d| DefaultEncryption {
                    sse_algorithm: d.sse_algorithm().as_str().to_string(),
                    kms_master_key_id: d.kms_master_key_id().map(str::to_string),
                }),
            bucket_key_enabled: rule.bucket_key_enabled(),
        }).collect(),
    }
}
