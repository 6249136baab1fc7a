use serde::Deserialize;
use relaywire_core::error::{RelayError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub version: u32,

    #[serde(default)]
    pub session: SessionSection,
}

impl ClientConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(RelayError::UnsupportedVersion);
        }

        self.session.validate()?;

        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            version: 1,
            session: SessionSection::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionSection {
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Chains subscribed to when a session starts.
    #[serde(default)]
    pub chain_ids: Vec<String>,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            max_frame_bytes: default_max_frame_bytes(),
            request_timeout_ms: default_request_timeout_ms(),
            chain_ids: Vec::new(),
        }
    }
}

impl SessionSection {
    pub fn validate(&self) -> Result<()> {
        if !(1024..=16 * 1024 * 1024).contains(&self.max_frame_bytes) {
            return Err(RelayError::BadRequest(
                "session.max_frame_bytes must be between 1024 and 16777216".into(),
            ));
        }
        if !(100..=120000).contains(&self.request_timeout_ms) {
            return Err(RelayError::BadRequest(
                "session.request_timeout_ms must be between 100 and 120000".into(),
            ));
        }
        if self.chain_ids.iter().any(String::is_empty) {
            return Err(RelayError::BadRequest(
                "session.chain_ids must not contain empty ids".into(),
            ));
        }
        Ok(())
    }
}

fn default_max_frame_bytes() -> usize {
    65536
}
fn default_request_timeout_ms() -> u64 {
    5000
}
