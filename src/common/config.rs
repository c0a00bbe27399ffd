//! Ledger configuration.
//!
//! Loaded from an optional YAML file and `IMAGER__`-prefixed environment
//! variables; every field has a default so an empty environment works.

use std::path::PathBuf;

use serde::Deserialize;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "imager.yaml";
/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV_VAR: &str = "IMAGER_CONFIG";
/// Prefix for configuration environment variables (`IMAGER__STORAGE__PATH`).
pub const CONFIG_ENV_PREFIX: &str = "IMAGER";
/// Environment variable holding the tracing filter.
pub const LOG_ENV_VAR: &str = "IMAGER_LOG";

const DEFAULT_ADMIN_EMAIL: &str = "admin@imager.local";
const DEFAULT_ADMIN_PASSWORD: &str = "change-me";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub storage: StorageConfig,
    pub admin: AdminConfig,
    pub credits: CreditsConfig,
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the persisted blobs.
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".imager"),
        }
    }
}

/// The single administrative credential pair.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub email: String,
    pub password: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            email: DEFAULT_ADMIN_EMAIL.to_string(),
            password: DEFAULT_ADMIN_PASSWORD.to_string(),
        }
    }
}

impl AdminConfig {
    pub fn matches(&self, email: &str, password: &str) -> bool {
        self.email == email && self.password == password
    }

    pub fn uses_default_password(&self) -> bool {
        self.password == DEFAULT_ADMIN_PASSWORD
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CreditsConfig {
    /// Balance granted to every new standard account.
    pub signup_bonus: u64,
    /// Balance shown on the administrator session.
    pub admin_balance: u64,
}

impl Default for CreditsConfig {
    fn default() -> Self {
        Self {
            signup_bonus: 40,
            admin_balance: 99_999,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Give back the charged credits when the generation call fails.
    pub refund_on_failure: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            refund_on_failure: true,
        }
    }
}

impl LedgerConfig {
    /// Load configuration from file and environment.
    ///
    /// Sources, later overriding earlier:
    /// 1. `imager.yaml` in the current directory (if present)
    /// 2. the file given by `path` (required when provided)
    /// 3. the file named by `IMAGER_CONFIG` (required when set)
    /// 4. `IMAGER__SECTION__FIELD` environment variables
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        use config::{Config, Environment, File, FileFormat};

        let mut builder = Config::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_the_product_rules() {
        let config = LedgerConfig::default();
        assert_eq!(config.credits.signup_bonus, 40);
        assert_eq!(config.credits.admin_balance, 99_999);
        assert!(config.generation.refund_on_failure);
        assert_eq!(config.storage.path, PathBuf::from(".imager"));
        assert!(config.admin.uses_default_password());
    }

    #[test]
    fn admin_pair_must_match_exactly() {
        let admin = AdminConfig {
            email: "root@example.com".into(),
            password: "s3cret".into(),
        };
        assert!(admin.matches("root@example.com", "s3cret"));
        assert!(!admin.matches("root@example.com", "S3cret"));
        assert!(!admin.matches("other@example.com", "s3cret"));
        assert!(!admin.uses_default_password());
    }

    #[test]
    fn loads_partial_yaml_over_defaults() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "admin:\n  email: ops@example.com\n  password: hunter22\ngeneration:\n  refund_on_failure: false"
        )
        .unwrap();

        let config = LedgerConfig::load(file.path().to_str()).unwrap();
        assert_eq!(config.admin.email, "ops@example.com");
        assert!(!config.generation.refund_on_failure);
        assert_eq!(config.credits.signup_bonus, 40);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        assert!(LedgerConfig::load(Some("/nonexistent/imager-config.yaml")).is_err());
    }
}
