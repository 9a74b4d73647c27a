//! # Configuration
//!
//! Configuration is managed by [`confique`], layering environment variables over an
//! optional `autosalon.toml` over compiled defaults.
//!
//! ## Available Settings
//!
//! | Key | Env | Default | Description |
//! |-----|-----|---------|-------------|
//! | `provider` | `AUTOSALON_PROVIDER` | `supabase` | Remote backend flavour (`supabase`, `firestore`) |
//! | `provider_url` | `AUTOSALON_PROVIDER_URL` | none | Project URL (Supabase) or database root (Firestore) |
//! | `provider_key` | `AUTOSALON_PROVIDER_KEY` | none | Anon key (Supabase) or API key (Firestore) |
//! | `access_token` | `AUTOSALON_ACCESS_TOKEN` | none | Signed-in user's JWT, sent to row-level security |
//! | `storage_dir` | `AUTOSALON_STORAGE_DIR` | OS data dir | Where the local fallback slots live |
//!
//! ## The Gate
//!
//! [`Gate::resolve`] turns a loaded config into the decision the facade is built
//! with: a remote provider, or the local fallback. It never fails. Missing values and
//! template placeholders (anything containing [`PLACEHOLDER_MARKER`], such as
//! `your-supabase-url`) resolve to [`Gate::Fallback`].

use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{AutosalonError, Result};

/// Substring that marks an unfilled template value.
pub const PLACEHOLDER_MARKER: &str = "your-";

pub const CONFIG_FILE_NAME: &str = "autosalon.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Supabase,
    Firestore,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Supabase => f.write_str("supabase"),
            ProviderKind::Firestore => f.write_str("firestore"),
        }
    }
}

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AutosalonConfig {
    /// Which remote backend the URL and key belong to.
    #[config(env = "AUTOSALON_PROVIDER", default = "supabase")]
    pub provider: ProviderKind,

    #[config(env = "AUTOSALON_PROVIDER_URL")]
    pub provider_url: Option<String>,

    #[config(env = "AUTOSALON_PROVIDER_KEY")]
    pub provider_key: Option<String>,

    #[config(env = "AUTOSALON_ACCESS_TOKEN")]
    pub access_token: Option<String>,

    /// Directory for the local fallback slots.
    #[config(env = "AUTOSALON_STORAGE_DIR")]
    pub storage_dir: Option<PathBuf>,
}

impl Default for AutosalonConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Supabase,
            provider_url: None,
            provider_key: None,
            access_token: None,
            storage_dir: None,
        }
    }
}

impl AutosalonConfig {
    /// Loads env vars, then `file` if given and present, then defaults.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder().env();
        if let Some(path) = file {
            builder = builder.file(path);
        }
        builder
            .load()
            .map_err(|e| AutosalonError::Config(e.to_string()))
    }

    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// Storage directory, defaulting to the platform data dir.
    pub fn storage_dir(&self) -> PathBuf {
        if let Some(dir) = &self.storage_dir {
            return dir.clone();
        }
        ProjectDirs::from("com", "autosalon", "autosalon")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".autosalon"))
    }
}

/// Credentials for a remote provider that passed the gate.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    pub url: String,
    pub key: String,
    pub access_token: Option<String>,
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("kind", &self.kind)
            .field("url", &self.url)
            .field("key", &"<redacted>")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Which store is authoritative for the lifetime of a facade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    Remote(ProviderSettings),
    Fallback,
}

impl Gate {
    pub fn resolve(config: &AutosalonConfig) -> Gate {
        let url = usable(config.provider_url.as_deref());
        let key = usable(config.provider_key.as_deref());
        match (url, key) {
            (Some(url), Some(key)) => Gate::Remote(ProviderSettings {
                kind: config.provider,
                url: url.trim_end_matches('/').to_string(),
                key: key.to_string(),
                access_token: usable(config.access_token.as_deref()).map(str::to_string),
            }),
            _ => Gate::Fallback,
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, Gate::Remote(_))
    }
}

fn usable(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.contains(PLACEHOLDER_MARKER))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: Option<&str>, key: Option<&str>) -> AutosalonConfig {
        AutosalonConfig {
            provider_url: url.map(str::to_string),
            provider_key: key.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config_is_fallback() {
        let cfg = AutosalonConfig::default();
        assert_eq!(cfg.provider, ProviderKind::Supabase);
        assert_eq!(Gate::resolve(&cfg), Gate::Fallback);
    }

    #[test]
    fn test_gate_requires_both_values() {
        assert!(!Gate::resolve(&config(Some("https://x.supabase.co"), None)).is_configured());
        assert!(!Gate::resolve(&config(None, Some("anon"))).is_configured());
        assert!(Gate::resolve(&config(Some("https://x.supabase.co"), Some("anon"))).is_configured());
    }

    #[test]
    fn test_gate_rejects_placeholders() {
        let cfg = config(Some("your-supabase-url"), Some("real-key"));
        assert_eq!(Gate::resolve(&cfg), Gate::Fallback);

        let cfg = config(Some("https://x.supabase.co"), Some("your-supabase-anon-key"));
        assert_eq!(Gate::resolve(&cfg), Gate::Fallback);
    }

    #[test]
    fn test_gate_rejects_blank_values() {
        let cfg = config(Some("   "), Some("key"));
        assert_eq!(Gate::resolve(&cfg), Gate::Fallback);
    }

    #[test]
    fn test_gate_normalizes_url() {
        let cfg = config(Some(" https://x.supabase.co/ "), Some("anon"));
        match Gate::resolve(&cfg) {
            Gate::Remote(settings) => {
                assert_eq!(settings.url, "https://x.supabase.co");
                assert_eq!(settings.kind, ProviderKind::Supabase);
                assert_eq!(settings.access_token, None);
            }
            Gate::Fallback => panic!("Expected remote"),
        }
    }

    #[test]
    fn test_settings_debug_redacts_key() {
        let cfg = config(Some("https://x.supabase.co"), Some("super-secret"));
        let rendered = format!("{:?}", Gate::resolve(&cfg));
        assert!(!rendered.contains("super-secret"));
    }

    #[test]
    fn test_storage_dir_override() {
        let cfg = AutosalonConfig {
            storage_dir: Some(PathBuf::from("/tmp/autosalon-test")),
            ..Default::default()
        };
        assert_eq!(cfg.storage_dir(), PathBuf::from("/tmp/autosalon-test"));
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let file_cfg = AutosalonConfig {
            provider: ProviderKind::Firestore,
            provider_url: Some(
                "https://firestore.googleapis.com/v1/projects/demo/databases/(default)".into(),
            ),
            provider_key: Some("api-key".into()),
            access_token: None,
            storage_dir: Some(dir.path().to_path_buf()),
        };
        std::fs::write(&path, toml::to_string(&file_cfg).unwrap()).unwrap();

        let loaded = AutosalonConfig::builder().file(&path).load().unwrap();
        assert_eq!(loaded, file_cfg);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = AutosalonConfig::builder()
            .file(dir.path().join("absent.toml"))
            .load()
            .unwrap();
        assert_eq!(loaded.provider, ProviderKind::Supabase);
        assert_eq!(loaded.provider_url, None);
    }
}
