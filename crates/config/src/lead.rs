//! Lead token storage.
//!
//! Reads/writes <config dir>/lead.json (0600 on Unix). The token has no
//! expiry; it stays until `logout` deletes the file.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ConfigError;

pub const LEAD_FILE: &str = "lead.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadRecord {
    pub lead_token: String,
    #[serde(default)]
    pub lead_email: Option<String>,
}

impl LeadRecord {
    pub fn new(lead_token: impl Into<String>, lead_email: Option<String>) -> Self {
        Self { lead_token: lead_token.into(), lead_email }
    }
}

/// Returns None if nothing is saved, the file is invalid, or the token is blank.
pub fn load_lead(path: &Path) -> Option<LeadRecord> {
    let contents = std::fs::read_to_string(path).ok()?;
    let record: LeadRecord = serde_json::from_str(&contents).ok()?;
    if record.lead_token.trim().is_empty() {
        return None;
    }
    Some(record)
}

pub fn save_lead(path: &Path, record: &LeadRecord) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
    }

    let contents = serde_json::to_string_pretty(record).map_err(|e| ConfigError::parse(path, e))?;
    std::fs::write(path, &contents).map_err(|e| ConfigError::io(path, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions).map_err(|e| ConfigError::io(path, e))?;
    }

    Ok(())
}

pub fn delete_lead(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        std::fs::remove_file(path).map_err(|e| ConfigError::io(path, e))?;
    }
    Ok(())
}
