//! The stake table the daemon reads voter stake from.
//!
//! A JSON object mapping account names to stake, e.g.
//! `{"alice": 120000, "bob": 5000}`. Accounts missing from the table are
//! treated as unstaked.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use referendum_types::AccountName;

pub type StakeTable = HashMap<AccountName, u64>;

/// Load the stake table, or an empty one when no file is configured.
pub fn load_stakes(path: Option<&Path>) -> anyhow::Result<StakeTable> {
    let Some(path) = path else {
        tracing::warn!("no stakes file configured, every account is treated as unstaked");
        return Ok(StakeTable::new());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read stakes file {}", path.display()))?;
    let stakes: StakeTable = serde_json::from_str(&content)
        .with_context(|| format!("invalid stakes file {}", path.display()))?;
    tracing::info!(path = %path.display(), accounts = stakes.len(), "loaded stake table");
    Ok(stakes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_account_stakes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stakes.json");
        std::fs::write(&path, r#"{"alice": 120000, "bob": 5000}"#).unwrap();

        let stakes = load_stakes(Some(&path)).unwrap();
        assert_eq!(stakes.len(), 2);
        assert_eq!(stakes.get(&AccountName::new("alice")), Some(&120_000));
    }

    #[test]
    fn missing_file_config_gives_empty_table() {
        assert!(load_stakes(None).unwrap().is_empty());
    }

    #[test]
    fn invalid_account_names_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stakes.json");
        std::fs::write(&path, r#"{"Alice!": 1}"#).unwrap();
        assert!(load_stakes(Some(&path)).is_err());
    }
}
