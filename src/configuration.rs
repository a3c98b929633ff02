//! src/configuration.rs
use config::{Config, File};
use lettre::transport::smtp::authentication::Credentials;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum ConfigurationError {
    #[error("Failed to determine the current directory")]
    CurrentDirectory(#[source] std::io::Error),
    #[error("{0}")]
    UnsupportedEnvironment(String),
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error("Failed to read email settings file")]
    EmailFile(#[source] dotenvy::Error),
    #[error("Failed to parse email settings from environment")]
    EmailEnvironment(#[from] envy::Error),
    #[error("Email settings are missing, set EMAIL_CLIENT_SENDER_EMAIL")]
    MissingEmailSettings,
    #[error("The {0} relay requires a password, set EMAIL_CLIENT_PASSWORD")]
    MissingPassword(String),
}

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub report: ReportSettings,
    pub email: Option<EmailSettings>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    pub port: u16,
    pub host: String,
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ReportSettings {
    pub path: PathBuf,
    pub subject: String,
}

#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Encryption {
    #[default]
    Starttls,
    Tls,
    None,
}

#[derive(Deserialize, Clone, Debug)]
pub struct EmailSettings {
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub encryption: Encryption,
    pub username: Option<String>,
    pub password: Option<Secret<String>>,
    pub sender_email: String,
    #[serde(default = "default_sender_name")]
    pub sender_name: String,
    #[serde(default = "default_timeout_milliseconds")]
    pub timeout_milliseconds: u64,
}

fn default_allowed_origin() -> String {
    "*".into()
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".into()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_sender_name() -> String {
    "Bitcoin Analysis System".into()
}

fn default_timeout_milliseconds() -> u64 {
    10_000
}

impl EmailSettings {
    /// Relay login, if a non-empty password is configured. Gmail style
    /// accounts log in with the sender address, so that is the fallback username.
    pub fn credentials(&self) -> Option<Credentials> {
        let password = self
            .password
            .as_ref()
            .filter(|password| !password.expose_secret().is_empty())?;
        let username = self
            .username
            .clone()
            .unwrap_or_else(|| self.sender_email.clone());

        Some(Credentials::new(
            username,
            password.expose_secret().to_owned(),
        ))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }

    fn validate(self) -> Result<Self, ConfigurationError> {
        if self.encryption != Encryption::None && self.credentials().is_none() {
            return Err(ConfigurationError::MissingPassword(self.smtp_host));
        }
        Ok(self)
    }
}

#[derive(PartialEq, Debug)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.as_ref() {
            "local" => Ok(Environment::Local),
            "production" => Ok(Environment::Production),
            _ => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                s
            )),
        }
    }
}

pub fn get_configuration() -> Result<Settings, ConfigurationError> {
    let mut settings = get_file_configuration()?;
    settings.email = get_email_configuration()?;
    Ok(settings)
}

fn configuration_directory() -> Result<PathBuf, ConfigurationError> {
    let base_path = std::env::current_dir().map_err(ConfigurationError::CurrentDirectory)?;
    Ok(base_path.join("configuration"))
}

fn current_environment() -> Result<Environment, ConfigurationError> {
    // Default to `local` if not specified.
    std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(ConfigurationError::UnsupportedEnvironment)
}

/// Settings from the yaml layers and `APP_` overrides only. The relay is left unset.
pub fn get_file_configuration() -> Result<Settings, ConfigurationError> {
    let configuration_directory = configuration_directory()?;
    let environment = current_environment()?;

    // E.g. `APP_APPLICATION__PORT=5001` sets `Settings.application.port`
    let settings = Config::builder()
        .add_source(File::from(configuration_directory.join("base")).required(true))
        .add_source(File::from(configuration_directory.join(environment.as_str())).required(true))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let settings: Settings = settings.try_deserialize()?;
    Ok(Settings {
        email: None,
        ..settings
    })
}

fn get_email_configuration() -> Result<Option<EmailSettings>, ConfigurationError> {
    if current_environment()? == Environment::Local {
        let email_file_path = configuration_directory()?.join("email");
        if let Err(e) = dotenvy::from_filename(email_file_path) {
            if !e.not_found() {
                return Err(ConfigurationError::EmailFile(e));
            }
        }
    }

    match envy::prefixed("EMAIL_CLIENT_").from_env::<EmailSettings>() {
        Ok(email_settings) => Ok(Some(email_settings.validate()?)),
        Err(envy::Error::MissingValue(field)) => {
            tracing::warn!(
                "Email settings unavailable, EMAIL_CLIENT_{} is not set",
                field.to_uppercase()
            );
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}
