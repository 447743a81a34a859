use std::env;
use std::path::PathBuf;

use anyhow::{bail, Result};
use serde::Serialize;

const DEFAULT_SMTP_PORT: u16 = 465;

/// All runtime configuration. Read once from the environment in main and
/// passed explicitly into components; nothing else touches ambient state.
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    pub sheet: SheetConfig,
    pub storage: StorageConfig,
    pub mailer: MailerConfig,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct SheetConfig {
    pub csv_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StorageConfig {
    pub snapshot_path: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct MailerConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub recipient: String,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub sheet_url: Option<String>,
    pub snapshot_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            sheet: SheetConfig {
                csv_url: env_string("TARIFF_SHEET_CSV_URL"),
            },
            storage: StorageConfig {
                snapshot_path: env::var("TARIFF_SNAPSHOT_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| default_snapshot_path()),
            },
            mailer: MailerConfig {
                smtp_host: env::var("TARIFF_SMTP_HOST").unwrap_or_else(|_| default_smtp_host()),
                smtp_port: env::var("TARIFF_SMTP_PORT")
                    .ok()
                    .and_then(|raw| raw.parse().ok())
                    .unwrap_or(DEFAULT_SMTP_PORT),
                username: env_string("GMAIL_USER"),
                password: env_string("GMAIL_APP_PASSWORD"),
                recipient: env_string("ALERT_EMAIL_TO"),
            },
        }
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(url) = overrides.sheet_url {
            self.sheet.csv_url = url;
        }
        if let Some(path) = overrides.snapshot_path {
            self.storage.snapshot_path = path;
        }
    }

    /// Copy safe to print: the mail secret is masked.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if !config.mailer.password.is_empty() {
            config.mailer.password = "********".to_string();
        }
        config
    }
}

impl SheetConfig {
    /// The sheet URL is the one piece of configuration the pipeline cannot
    /// run without; refuse before any network or file access.
    pub fn require_url(&self) -> Result<&str> {
        if self.csv_url.trim().is_empty() {
            bail!("TARIFF_SHEET_CSV_URL is not set");
        }
        Ok(&self.csv_url)
    }
}

impl MailerConfig {
    /// Mail goes out only when identity, secret and recipient are all set.
    /// Anything less degrades delivery to console output.
    pub fn is_configured(&self) -> bool {
        !self.username.trim().is_empty()
            && !self.password.trim().is_empty()
            && !self.recipient.trim().is_empty()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sheet: SheetConfig::default(),
            storage: StorageConfig::default(),
            mailer: MailerConfig::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
        }
    }
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: DEFAULT_SMTP_PORT,
            username: String::new(),
            password: String::new(),
            recipient: String::new(),
        }
    }
}

fn env_string(key: &str) -> String {
    env::var(key).unwrap_or_default()
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("tariff_snapshot.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mailer_requires_all_three_credentials() {
        let mut mailer = MailerConfig::default();
        assert!(!mailer.is_configured());

        mailer.username = "sender@example.com".to_string();
        mailer.password = "app-password".to_string();
        assert!(!mailer.is_configured());

        mailer.recipient = "alerts@example.com".to_string();
        assert!(mailer.is_configured());

        mailer.password = "   ".to_string();
        assert!(!mailer.is_configured());
    }

    #[test]
    fn require_url_rejects_blank_configuration() {
        let sheet = SheetConfig::default();
        assert!(sheet.require_url().is_err());

        let sheet = SheetConfig {
            csv_url: "https://example.com/sheet.csv".to_string(),
        };
        assert_eq!(
            sheet.require_url().expect("url"),
            "https://example.com/sheet.csv"
        );
    }

    #[test]
    fn overrides_replace_only_what_they_carry() {
        let mut config = Config::default();
        config.sheet.csv_url = "https://example.com/a.csv".to_string();
        config.apply_overrides(ConfigOverrides {
            sheet_url: None,
            snapshot_path: Some(PathBuf::from("/tmp/other.json")),
        });
        assert_eq!(config.sheet.csv_url, "https://example.com/a.csv");
        assert_eq!(config.storage.snapshot_path, PathBuf::from("/tmp/other.json"));
    }

    #[test]
    fn redacted_masks_the_mail_secret() {
        let mut config = Config::default();
        config.mailer.password = "hunter2".to_string();
        let shown = config.redacted();
        assert_eq!(shown.mailer.password, "********");
        // The original is untouched.
        assert_eq!(config.mailer.password, "hunter2");
    }
}
