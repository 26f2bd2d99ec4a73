use crate::configuration::FixtureSettings;
use crate::domain::EmailCardEntry;
use crate::telemetry::error_chain_fmt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

#[derive(thiserror::Error)]
pub enum FixtureError {
    #[error("Failed to read fixture {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Fixture {} does not hold the expected JSON", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to write fixture {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl std::fmt::Debug for FixtureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Read a JSON fixture from disk.
#[tracing::instrument(name = "Loading fixture", skip_all, fields(path = %path.display()))]
pub fn load_fixture<T>(path: &Path) -> Result<T, FixtureError>
where
    T: DeserializeOwned,
{
    let raw = std::fs::read_to_string(path).map_err(|source| FixtureError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| FixtureError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Overwrite a JSON fixture with pretty-printed `value`.
#[tracing::instrument(name = "Saving fixture", skip_all, fields(path = %path.display()))]
pub fn save_fixture<T>(path: &Path, value: &T) -> Result<(), FixtureError>
where
    T: Serialize + ?Sized,
{
    let write_error = |source| FixtureError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut raw = serde_json::to_string_pretty(value)
        .map_err(|e| write_error(std::io::Error::from(e)))?;
    raw.push('\n');
    std::fs::write(path, raw).map_err(write_error)
}

/// Request payloads for the template → pass → update sequence.
#[derive(Debug, Clone)]
pub struct CardFlowFixtures {
    pub create_template: Value,
    pub create_pass: Value,
    // Must be an object: the created card id is written into it
    pub update_pass: Map<String, Value>,
}

impl CardFlowFixtures {
    pub fn load(settings: &FixtureSettings) -> Result<Self, FixtureError> {
        Ok(Self {
            create_template: load_fixture(&settings.path_of(&settings.create_template))?,
            create_pass: load_fixture(&settings.path_of(&settings.create_pass))?,
            update_pass: load_fixture(&settings.path_of(&settings.update_pass))?,
        })
    }
}

/// Every row is kept; malformed emails are only reported.
pub fn load_email_card_map(path: &Path) -> Result<Vec<EmailCardEntry>, FixtureError> {
    let entries: Vec<EmailCardEntry> = load_fixture(path)?;
    for entry in &entries {
        if let Err(e) = entry.email_address() {
            tracing::warn!(card_id = %entry.card_id, error.message = %e, "Malformed email in card map");
        }
    }
    Ok(entries)
}
