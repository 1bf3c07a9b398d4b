//! Application configuration models.
//!
//! These are plain serde models; loading and saving `config.toml` is the
//! infrastructure layer's job. Every field has a default so a partial or
//! missing file is valid.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How the store reacts when a link or file operation names a project
/// (or conversation) that does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LinkPolicy {
    /// Apply whichever side of the update can be applied and log the gap.
    #[default]
    Lenient,
    /// Reject the call with `NotFound` and change nothing.
    Strict,
}

/// Store behaviour settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreConfig {
    #[serde(default)]
    pub link_policy: LinkPolicy,
}

/// Which canned reply table the mock generator uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReplyStyle {
    /// General assistant replies (greetings, PDFs, reports, search).
    #[default]
    General,
    /// Polygenic risk score assistant replies.
    Genomics,
}

/// Reply generator settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyConfig {
    #[serde(default)]
    pub style: ReplyStyle,
    /// Simulated "typing" delay before the bot reply, in milliseconds.
    #[serde(default = "default_reply_delay_ms")]
    pub delay_ms: u64,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            style: ReplyStyle::default(),
            delay_ms: default_reply_delay_ms(),
        }
    }
}

fn default_reply_delay_ms() -> u64 {
    1000
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Root of `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Default tracing directive when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub reply: ReplyConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            store: StoreConfig::default(),
            reply: ReplyConfig::default(),
        }
    }
}
