use crate::ledger::SubLedger;
use crate::mirror::client::Credentials;
use crate::storage::StorageEngine;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Genesis records at sequence numbers `1..=DEFAULT_GENESIS_WINDOW` may lack a
/// timestamp. Empirical; differs between networks.
pub const DEFAULT_GENESIS_WINDOW: u64 = 17;

pub const DEFAULT_DB_PATH: &str = "ledger_copy.db";

/// One mirror per (network, sub-ledger).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    /// pool / network name handed to the ledger client
    pub network: String,
    pub sub_ledger: SubLedger,
    pub db_path: PathBuf,
    pub engine: StorageEngine,
    pub genesis_window: u64,
    pub credentials: Credentials,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            network: "default".into(),
            sub_ledger: SubLedger::Domain,
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            engine: StorageEngine::Fs,
            genesis_window: DEFAULT_GENESIS_WINDOW,
            credentials: Credentials::default(),
        }
    }
}

impl MirrorConfig {
    /// Load mirror config from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let cfg: MirrorConfig = toml::from_str(&data).with_context(|| format!("parsing {}", path.display()))?;
        Ok(cfg)
    }

    /// Defaults when no file is given or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) if p.exists() => Self::load(p),
            _ => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg: MirrorConfig = toml::from_str(
            r#"
            network = "sovrin-main"
            sub_ledger = "pool"

            [credentials]
            wallet_name = "steward"
            wallet_key = "hunter2"
            submitter_did = "KvGE2tKSDuBXEkRc86dL4T"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.network, "sovrin-main");
        assert_eq!(cfg.sub_ledger, SubLedger::Pool);
        assert_eq!(cfg.db_path, PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(cfg.genesis_window, DEFAULT_GENESIS_WINDOW);
        assert_eq!(cfg.engine, StorageEngine::Fs);
        assert!(!format!("{:?}", cfg.credentials).contains("hunter2"));
    }

    #[test]
    fn missing_file_is_default() {
        let cfg = MirrorConfig::load_or_default(Some(Path::new("/nonexistent/mirror.toml"))).unwrap();
        assert_eq!(cfg.sub_ledger, SubLedger::Domain);
    }
}
