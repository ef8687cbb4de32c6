use anyhow::Context;
use async_trait::async_trait;
use serde::{Serialize, Deserialize};
use tracing::debug;

use sseaudit_core::{is_placeholder_analysis, Notifier, ScanResult};

/// Names listed in the bucket field before collapsing the rest into "+N more".
pub const MAX_LISTED_BUCKETS: usize = 10;
/// Discord rejects embed field values longer than this.
pub const MAX_FIELD_CHARS: usize = 1024;

pub const ALERT_TITLE: &str = "🚨 S3 Encryption Alert: Unencrypted Buckets Found";
pub const CLEAR_TITLE: &str = "✅ S3 Encryption Scan: All Buckets Encrypted";
pub const ALERT_COLOR: u32 = 0xE74C3C;
pub const CLEAR_COLOR: u32 = 0x2ECC71;
pub const DEFAULT_FOOTER: &str = "S3 Encryption Scanner";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedFooter { pub text: String }

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
    pub footer: EmbedFooter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookMessage { pub embeds: Vec<Embed> }

fn field(name: &str, value: String) -> EmbedField {
    EmbedField { name: name.to_string(), value, inline: false }
}

pub fn bucket_list(names: &[&str]) -> String {
    let mut lines: Vec<String> = names.iter()
        .take(MAX_LISTED_BUCKETS)
        .map(|n| format!("• `{n}`"))
        .collect();
    if names.len() > MAX_LISTED_BUCKETS {
        lines.push(format!("+{} more", names.len() - MAX_LISTED_BUCKETS));
    }
    lines.join("\n")
}

pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

pub fn build_message(result: &ScanResult, footer: &str) -> WebhookMessage {
    let alert = result.unencrypted_buckets > 0;
    let mut fields = vec![field("📊 Summary", format!(
        "Total buckets: {}\nEncrypted: {}\nUnencrypted: {}",
        result.total_buckets, result.encrypted_buckets, result.unencrypted_buckets,
    ))];

    let names = result.unencrypted_names();
    if !names.is_empty() {
        fields.push(field("🔓 Unencrypted Buckets", bucket_list(&names)));
    }
    if !is_placeholder_analysis(&result.ai_analysis) {
        let analysis = truncate_chars(&result.ai_analysis, MAX_FIELD_CHARS);
        fields.push(field("🤖 AI Analysis", analysis));
    }

    WebhookMessage { embeds: vec![Embed {
        title: (if alert { ALERT_TITLE } else { CLEAR_TITLE }).to_string(),
        color: if alert { ALERT_COLOR } else { CLEAR_COLOR },
        fields,
        footer: EmbedFooter { text: footer.to_string() },
    }] }
}

#[derive(Debug, Clone)]
pub struct DiscordWebhook {
    http: reqwest::Client,
    footer: String,
}

impl DiscordWebhook {
    pub fn new(http: reqwest::Client, footer: Option<String>) -> Self {
        Self { http, footer: footer.unwrap_or_else(|| DEFAULT_FOOTER.to_string()) }
    }
}

#[async_trait]
impl Notifier for DiscordWebhook {
    async fn notify(&self, webhook_url: &str, result: &ScanResult) -> anyhow::Result<u16> {
        let message = build_message(result, &self.footer);
        debug!(fields = message.embeds[0].fields.len(), "posting webhook embed");
        // .json() sets Content-Type: application/json
        let resp = self.http.post(webhook_url)
            .json(&message)
            .send()
            .await
            .context("post webhook message")?;
        Ok(resp.status().as_u16())
    }
}
