//! Local persistence of controller account credentials.
//!
//! Accounts live in one YAML document keyed by controller name:
//!
//! ```yaml
//! controllers:
//!   ctrl:
//!     user: admin@local
//!     password: hunter2
//!     last-known-access: superuser
//! ```
//!
//! Serialization is deterministic (controllers are kept sorted), so a
//! write followed by a read reproduces the mapping exactly.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::errors::Error;
use crate::errors::Result;

/// Credentials and access level stored for one controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDetails {
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(
        default,
        rename = "last-known-access",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_known_access: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct AccountsCollection {
    #[serde(default)]
    controllers: BTreeMap<String, AccountDetails>,
}

/// Reads the accounts file. A missing file is an empty mapping, not an
/// error.
pub fn read_accounts(path: impl AsRef<Path>) -> Result<BTreeMap<String, AccountDetails>> {
    let data = match std::fs::read(path.as_ref()) {
        Ok(d) => d,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => return Err(e.into()),
    };
    parse_accounts(&data)
}

/// Parses an accounts document. Structural failures are wrapped with a
/// prefix identifying the failing document.
pub fn parse_accounts(data: &[u8]) -> Result<BTreeMap<String, AccountDetails>> {
    if data.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(BTreeMap::new());
    }
    let collection: AccountsCollection =
        serde_yaml::from_slice(data).map_err(|e| Error::CorruptAccounts(e.to_string()))?;
    Ok(collection.controllers)
}

/// Writes the accounts file, replacing any previous content.
pub fn write_accounts(
    path: impl AsRef<Path>,
    accounts: &BTreeMap<String, AccountDetails>,
) -> Result<()> {
    let collection = AccountsCollection {
        controllers: accounts.clone(),
    };
    let data = serde_yaml::to_string(&collection)
        .map_err(|e| Error::Fatal(format!("cannot marshal accounts: {e}")))?;
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path.as_ref(), data)?;
    Ok(())
}
