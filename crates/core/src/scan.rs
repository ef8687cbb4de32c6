use serde_json::Value as Json;
use tracing::{error, info, instrument, warn};

use crate::aggregate::{aggregate, analyze};
use crate::config::ScanConfig;
use crate::error::{ErrorClass, ScanError};
use crate::model::{BucketRecord, Envelope, ScanResult};
use crate::{BucketSource, Notifier, TextGenerator};

/// Status the webhook answers with when the message was accepted.
pub const WEBHOOK_ACCEPTED: u16 = 204;

pub struct Scanner {
    config: ScanConfig,
    source: Box<dyn BucketSource>,
    generator: Box<dyn TextGenerator>,
    notifier: Box<dyn Notifier>,
}

impl Scanner {
    pub fn new(
        config: ScanConfig,
        source: Box<dyn BucketSource>,
        generator: Box<dyn TextGenerator>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self { config, source, generator, notifier }
    }

    /// Invocation entry point. Event and context are accepted for the runtime contract only.
    pub async fn handle(&self, _event: &Json, _context: &Json) -> Result<Envelope, ScanError> {
        let result = self.run().await?;
        Ok(Envelope { status_code: 200, body: serde_json::to_string(&result)? })
    }

    /// Enumerate, classify, aggregate, analyze, notify. Only enumeration can fail.
    #[instrument(name = "scan", skip_all)]
    pub async fn run(&self) -> Result<ScanResult, ScanError> {
        info!("scanning S3 buckets for encryption status");
        let buckets = self.source.list_buckets().await.map_err(ScanError::Enumerate)?;
        info!(total = buckets.len(), "found buckets");

        let mut records = Vec::with_capacity(buckets.len());
        for bucket in &buckets {
            if let Some(rec) = self.classify(bucket).await {
                records.push(rec);
            }
        }

        let mut result = aggregate(buckets.len(), records);
        info!(unencrypted = result.unencrypted_buckets, "total unencrypted buckets");

        result.ai_analysis = analyze(&result, &self.config, self.generator.as_ref()).await;

        info!(
            unencrypted = result.unencrypted_buckets,
            total = result.total_buckets,
            "scan complete: {}/{} buckets need encryption",
            result.unencrypted_buckets, result.total_buckets
        );

        self.notify(&result).await;
        Ok(result)
    }

    /// `None` means the bucket is skipped: its lookup failed for a reason other than "not found".
    pub async fn classify(&self, bucket: &str) -> Option<BucketRecord> {
        let rec = match self.source.bucket_encryption(bucket).await {
            Ok(cfg) => BucketRecord::enabled(bucket, cfg),
            Err(e) if e.class() == ErrorClass::NotFound => BucketRecord::not_enabled(bucket),
            Err(e) => {
                error!(bucket, error = %e, "error checking encryption for bucket");
                return None;
            }
        };
        info!(bucket, status = %rec.encryption_status, "bucket encryption status");
        Some(rec)
    }

    /// Best effort. Nothing here can change the returned result.
    pub async fn notify(&self, result: &ScanResult) {
        let Some(url) = self.config.webhook_url.as_deref() else {
            info!("notification skipped: DISCORD_WEBHOOK_URL not configured");
            return;
        };
        match self.notifier.notify(url, result).await {
            Ok(WEBHOOK_ACCEPTED) => info!("alert sent to webhook"),
            Ok(status) => warn!(http.status = status, "webhook did not accept the alert"),
            Err(e) => error!(error = %format!("{e:#}"), "failed to send webhook alert"),
        }
    }
}
