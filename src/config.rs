use std::env;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;

use crate::submission::Credentials;
use crate::utils;

pub const DEFAULT_SECRETS_FILE: &str = "secrets.toml";

pub const WEEK: &str = "week";
pub const CLIENT_ID: &str = "CLIENT_ID";
pub const CLIENT_SECRET: &str = "CLIENT_SECRET";
pub const TENANT_ID: &str = "TENANT_ID";
pub const DRIVE_ID: &str = "DRIVE_ID";
pub const PARENT_FOLDER_PATH: &str = "PARENT_FOLDER_PATH";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing setting `{0}`, set it in the environment or in the secrets file")]
    Missing(&'static str),
    #[error("`week` should be a positive number, but is `{0}`")]
    InvalidWeek(String),
    #[error("failed to read the secrets file `{}`", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("the secrets file `{}` is malformed", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
enum WeekValue {
    Number(i64),
    Text(String),
}

impl WeekValue {
    fn into_string(self) -> String {
        match self {
            Self::Number(number) => number.to_string(),
            Self::Text(text) => text,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SecretsFile {
    week: Option<WeekValue>,
    #[serde(rename = "CLIENT_ID")]
    client_id: Option<String>,
    #[serde(rename = "CLIENT_SECRET")]
    client_secret: Option<String>,
    #[serde(rename = "TENANT_ID")]
    tenant_id: Option<String>,
    #[serde(rename = "DRIVE_ID")]
    drive_id: Option<String>,
    #[serde(rename = "PARENT_FOLDER_PATH")]
    parent_folder_path: Option<String>,
}

impl SecretsFile {
    fn read(path: &Path) -> Result<Self, ConfigError> {
        let data = utils::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// The settings of a deployment, the environment takes precedence over the
/// secrets file.
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    week: u32,
    client_id: Option<String>,
    client_secret: Option<String>,
    tenant_id: Option<String>,
    drive_id: Option<String>,
    parent_folder_path: Option<String>,
}

impl Settings {
    /// Reads the settings from the process environment and the optional
    /// secrets file.
    pub fn load(secrets: Option<&Path>) -> Result<Self, ConfigError> {
        Self::from_sources(secrets, |key| env::var(key).ok())
    }

    pub fn from_sources(
        secrets: Option<&Path>,
        environment: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let file = match secrets {
            Some(path) if path.is_file() => {
                info!("reading secrets from: {}", path.display());
                SecretsFile::read(path)?
            }
            Some(path) => {
                debug!("there is no secrets file at: {}", path.display());
                SecretsFile::default()
            }
            None => SecretsFile::default(),
        };

        let lookup = |key: &str, fallback: Option<String>| {
            environment(key)
                .filter(|value| !value.trim().is_empty())
                .or(fallback)
        };

        let week = lookup(WEEK, file.week.map(WeekValue::into_string))
            .ok_or(ConfigError::Missing(WEEK))?;

        Ok(Self {
            week: parse_week(&week)?,
            client_id: lookup(CLIENT_ID, file.client_id),
            client_secret: lookup(CLIENT_SECRET, file.client_secret),
            tenant_id: lookup(TENANT_ID, file.tenant_id),
            drive_id: lookup(DRIVE_ID, file.drive_id),
            parent_folder_path: lookup(PARENT_FOLDER_PATH, file.parent_folder_path),
        })
    }

    pub fn week(&self) -> u32 {
        self.week
    }

    pub fn parent_folder_path(&self) -> Result<&str, ConfigError> {
        self.parent_folder_path
            .as_deref()
            .ok_or(ConfigError::Missing(PARENT_FOLDER_PATH))
    }

    /// The credentials are only needed for submitting.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        let get = |value: &Option<String>, key: &'static str| {
            value.clone().ok_or(ConfigError::Missing(key))
        };

        Ok(Credentials::new(
            get(&self.client_id, CLIENT_ID)?,
            get(&self.client_secret, CLIENT_SECRET)?,
            get(&self.tenant_id, TENANT_ID)?,
            get(&self.drive_id, DRIVE_ID)?,
        ))
    }

    /// Where the template for the configured week is expected.
    #[must_use]
    pub fn template_path(&self, template_dir: &Path) -> PathBuf {
        template_path(template_dir, self.week)
    }
}

// the secrets must not end up in the logs
impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("week", &self.week)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "***"))
            .field("tenant_id", &self.tenant_id)
            .field("drive_id", &self.drive_id)
            .field("parent_folder_path", &self.parent_folder_path)
            .finish()
    }
}

fn parse_week(value: &str) -> Result<u32, ConfigError> {
    match value.trim().parse::<u32>() {
        Ok(week) if week > 0 => Ok(week),
        _ => Err(ConfigError::InvalidWeek(value.to_string())),
    }
}

#[must_use]
pub fn template_path(template_dir: &Path, week: u32) -> PathBuf {
    template_dir.join(format!("Skills Boot Camp Week {} Timesheet.docx", week))
}
