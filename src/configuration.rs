use crate::api_client::ApiClient;
use crate::authentication::Credentials;
use crate::bulk_update::BulkUpdateOptions;
use crate::domain::TenantId;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, Secret};
use serde_aux::field_attributes::{
    deserialize_number_from_string, deserialize_vec_from_string_or_vec,
};
use std::path::PathBuf;

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    pub api: ApiSettings,
    pub credentials: CredentialSettings,
    pub ui: UiSettings,
    pub fixtures: FixtureSettings,
    pub card_flow: CardFlowSettings,
    pub bulk_update: BulkUpdateSettings,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ApiSettings {
    pub base_url: String,
    pub tenant_id: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

impl ApiSettings {
    pub fn client(&self) -> Result<ApiClient, reqwest::Error> {
        ApiClient::new(self.base_url.clone(), self.timeout())
    }

    pub fn tenant(&self) -> Result<TenantId, String> {
        TenantId::parse(self.tenant_id.clone())
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_milliseconds)
    }
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct CredentialSettings {
    pub username: String,
    pub password: Secret<String>,
}

impl CredentialSettings {
    pub fn credentials(&self) -> Credentials {
        Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct UiSettings {
    pub base_url: String,
    // Fall back to the API credentials when unset
    pub username: Option<String>,
    pub password: Option<Secret<String>>,
    pub headless: bool,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

impl UiSettings {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_milliseconds)
    }
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct FixtureSettings {
    pub directory: PathBuf,
    pub create_template: String,
    pub create_pass: String,
    pub update_pass: String,
    pub email_to_card_id: String,
}

impl FixtureSettings {
    pub fn path_of(&self, file_name: &str) -> PathBuf {
        self.directory.join(file_name)
    }
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct CardFlowSettings {
    /// Dotted paths looked up, in order, for the id of a freshly created pass.
    /// Accepts a comma separated list when set through the environment.
    #[serde(deserialize_with = "deserialize_vec_from_string_or_vec")]
    pub card_id_fields: Vec<String>,
    /// Also write the created card id back into the update fixture on disk.
    #[serde(default)]
    pub persist_card_id: bool,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct BulkUpdateSettings {
    pub birthday: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub status_change_limit: usize,
}

impl BulkUpdateSettings {
    pub fn options(&self) -> BulkUpdateOptions {
        BulkUpdateOptions {
            birthday: self.birthday,
            status_change_limit: self.status_change_limit,
        }
    }
}

impl Settings {
    pub fn ui_credentials(&self) -> Credentials {
        Credentials {
            username: self
                .ui
                .username
                .clone()
                .unwrap_or_else(|| self.credentials.username.clone()),
            password: self
                .ui
                .password
                .clone()
                .unwrap_or_else(|| self.credentials.password.clone()),
        }
    }

    /// Reject blank mandatory values before anything talks to the backend.
    pub fn validate(&self) -> Result<(), String> {
        if self.credentials.username.trim().is_empty() {
            return Err("credentials.username must not be empty.".into());
        }
        if self.credentials.password.expose_secret().is_empty() {
            return Err("credentials.password must not be empty.".into());
        }
        self.api.tenant()?;
        if self.card_flow.card_id_fields.is_empty() {
            return Err("card_flow.card_id_fields must name at least one field.".into());
        }
        Ok(())
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    // Detect the running environment.
    // Default to `dev` if unspecified.
    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "dev".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;
    load_configuration(environment, None)
}

/// Layer `base.yaml`, the environment file and `APP_*` variables.
///
/// `variables` stands in for the process environment when given.
pub fn load_configuration(
    environment: Environment,
    variables: Option<config::Map<String, String>>,
) -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|e| config::ConfigError::Foreign(Box::new(e)))?;
    let configuration_directory = base_path.join("configuration");
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(
            configuration_directory.join("base.yaml"),
        ))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        // Add in settings from environment variables (with a prefix of APP and '__' as separator)
        // E.g. `APP_CREDENTIALS__PASSWORD=...` would set `Settings.credentials.password`
        // Values stay strings: secrets and ids such as `007` must not be read as numbers.
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .source(variables),
        )
        .build()?;

    let settings = settings.try_deserialize::<Settings>()?;
    settings.validate().map_err(config::ConfigError::Message)?;
    Ok(settings)
}

/// The backend the suite runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Demo,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Demo => "demo",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Self::Dev),
            "demo" => Ok(Self::Demo),
            other => Err(format!(
                "{} is not a supported environment. Use either `dev` or `demo`.",
                other
            )),
        }
    }
}
