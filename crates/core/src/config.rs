use secrecy::{ExposeSecret, SecretString};

pub const AI_CREDENTIAL_VAR: &str = "GOOGLE_API_KEY";
pub const WEBHOOK_URL_VAR: &str = "DISCORD_WEBHOOK_URL";

/// Optional collaborators of a scan. A missing value degrades the scan, it never fails it.
#[derive(Debug, Default)]
pub struct ScanConfig {
    pub ai_credential: Option<SecretString>,
    pub webhook_url: Option<String>,
}

impl ScanConfig {
    pub fn new(ai_credential: Option<String>, webhook_url: Option<String>) -> Self {
        Self {
            ai_credential: non_empty(ai_credential).map(SecretString::new),
            webhook_url: non_empty(webhook_url),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self::new(lookup(AI_CREDENTIAL_VAR), lookup(WEBHOOK_URL_VAR))
    }

    pub fn api_key(&self) -> Option<&str> {
        self.ai_credential.as_ref().map(|s| s.expose_secret().as_str())
    }

    pub fn without_webhook(mut self) -> Self {
        self.webhook_url = None;
        self
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
