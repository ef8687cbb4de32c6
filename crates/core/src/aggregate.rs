use tracing::{error, info};

use crate::config::ScanConfig;
use crate::model::{BucketRecord, ScanResult};
use crate::TextGenerator;

pub const AI_SKIPPED: &str = "AI analysis skipped: GOOGLE_API_KEY not configured";
pub const AI_FAILED_PREFIX: &str = "AI analysis failed: ";

/// True for the two stand-in texts that are not real analysis.
pub fn is_placeholder_analysis(text: &str) -> bool {
    text.is_empty() || text == AI_SKIPPED || text.starts_with(AI_FAILED_PREFIX)
}

/// Partitions the classified records. `total_buckets` is what the enumerator returned,
/// so it can exceed the record count when buckets were skipped.
pub fn aggregate(total_buckets: usize, records: Vec<BucketRecord>) -> ScanResult {
    let (encrypted, unencrypted): (Vec<&BucketRecord>, Vec<&BucketRecord>) =
        records.iter().partition(|r| r.is_encrypted());
    let encrypted_buckets = encrypted.len();
    let unencrypted_buckets = unencrypted.len();
    ScanResult {
        total_buckets,
        encrypted_buckets,
        unencrypted_buckets,
        scan_results: records,
        ai_analysis: String::new(),
        alert: unencrypted_buckets > 0,
    }
}

pub fn build_prompt(result: &ScanResult) -> String {
    let names = result.unencrypted_names();
    let names = if names.is_empty() { "None".to_string() } else { names.join(", ") };
    format!(
"You are an AWS security expert. Analyze this S3 encryption scan and provide a brief security assessment.

Scan Results:

- Total Buckets: {total}
- Encrypted: {encrypted}
- Unencrypted: {unencrypted}
- Unencrypted Bucket Names: {names}

Provide a 2-3 sentence analysis:
1. What's the security risk of unencrypted buckets?
2. What encryption should be enabled? (AES256 or aws:kms)
3. What action should the user take immediately?

Be concise and actionable.
",
        total = result.total_buckets,
        encrypted = result.encrypted_buckets,
        unencrypted = result.unencrypted_buckets,
    )
}

/// Never fails: a missing key or a failed call yields a placeholder text instead.
pub async fn analyze(
    result: &ScanResult,
    config: &ScanConfig,
    generator: &dyn TextGenerator,
) -> String {
    let Some(api_key) = config.api_key() else {
        info!("{}", AI_SKIPPED);
        return AI_SKIPPED.to_string();
    };
    let prompt = build_prompt(result);
    match generator.generate(api_key, &prompt).await {
        Ok(text) => text,
        Err(e) => {
            error!(error = %format!("{e:#}"), "error during AI analysis");
            format!("{AI_FAILED_PREFIX}{e:#}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EncryptionConfig, EncryptionStatus};
    use crate::MockTextGenerator;

    fn records() -> Vec<BucketRecord> {
        vec![
            BucketRecord::enabled("a", EncryptionConfig { rules: vec![] }),
            BucketRecord::not_enabled("b"),
            BucketRecord::not_enabled("c"),
        ]
    }

    #[test]
    fn counts_partition_records() {
        let r = aggregate(3, records());
        assert_eq!(r.total_buckets, 3);
        assert_eq!(r.encrypted_buckets, 1);
        assert_eq!(r.unencrypted_buckets, 2);
        assert!(r.alert);
        assert!(r.ai_analysis.is_empty());
        assert_eq!(r.scan_results[1].encryption_status, EncryptionStatus::NotEnabled);
    }

    #[test]
    fn skipped_buckets_count_toward_total_only() {
        let r = aggregate(5, records());
        assert_eq!(r.total_buckets, 5);
        assert_eq!(r.encrypted_buckets + r.unencrypted_buckets, r.scan_results.len());
    }

    #[test]
    fn empty_scan_raises_no_alert() {
        let r = aggregate(0, vec![]);
        assert_eq!((r.total_buckets, r.encrypted_buckets, r.unencrypted_buckets), (0, 0, 0));
        assert!(!r.alert);
    }

    #[test]
    fn prompt_lists_unencrypted_names() {
        let p = build_prompt(&aggregate(3, records()));
        assert!(p.contains("- Total Buckets: 3"));
        assert!(p.contains("- Encrypted: 1"));
        assert!(p.contains("- Unencrypted: 2"));
        assert!(p.contains("- Unencrypted Bucket Names: b, c"));
        assert!(p.contains("(AES256 or aws:kms)"));
    }

    #[test]
    fn prompt_says_none_without_unencrypted_buckets() {
        let p = build_prompt(&aggregate(0, vec![]));
        assert!(p.contains("- Unencrypted Bucket Names: None"));
    }

    #[test]
    fn placeholders_are_recognized() {
        assert!(is_placeholder_analysis(AI_SKIPPED));
        assert!(is_placeholder_analysis("AI analysis failed: timeout"));
        assert!(!is_placeholder_analysis("Enable SSE-KMS on bucket b."));
    }

    #[tokio::test]
    async fn missing_key_skips_generator() {
        let mut generator = MockTextGenerator::new();
        generator.expect_generate().times(0);
        let text = analyze(&aggregate(0, vec![]), &ScanConfig::default(), &generator).await;
        assert_eq!(text, "AI analysis skipped: GOOGLE_API_KEY not configured");
    }

    #[tokio::test]
    async fn generator_receives_key_and_prompt() {
        let mut generator = MockTextGenerator::new();
        generator.expect_generate()
            .withf(|key, prompt| {
                key.to_string() == "k-1" && prompt.contains("Unencrypted Bucket Names: b, c")
            })
            .times(1)
            .returning(|_, _| Ok("Encrypt b and c with SSE-KMS.".to_string()));
        let cfg = ScanConfig::new(Some("k-1".into()), None);
        let text = analyze(&aggregate(3, records()), &cfg, &generator).await;
        assert_eq!(text, "Encrypt b and c with SSE-KMS.");
    }

    #[tokio::test]
    async fn generator_error_becomes_diagnostic_text() {
        let mut generator = MockTextGenerator::new();
        generator.expect_generate().returning(|_, _| Err(anyhow::anyhow!("quota exceeded")));
        let cfg = ScanConfig::new(Some("k-1".into()), None);
        let text = analyze(&aggregate(0, vec![]), &cfg, &generator).await;
        assert!(text.starts_with(AI_FAILED_PREFIX));
        assert!(text.contains("quota exceeded"));
    }
}
