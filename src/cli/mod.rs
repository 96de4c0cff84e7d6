use crate::ledger::{LedgerStore, SubLedger};
use crate::mirror::{Mirror, MirrorConfig, ReplayClient};
use crate::query::{LedgerQuery, RangeQuery, TransactionMap};
use crate::storage::StorageEngine;
use crate::utils::{init_logging, METRICS};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

/// Local ledger mirror: sync and query a cached copy of one sub-ledger.
#[derive(Parser)]
#[clap(name = "ledger-mirror", version)]
pub struct Cli {
    /// TOML config file (network, credentials, store location)
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the local ledger database
    #[clap(long, global = true)]
    pub db: Option<PathBuf>,

    /// Storage engine: fs, memory, rocksdb
    #[clap(long, global = true)]
    pub engine: Option<StorageEngine>,

    /// Sub-ledger to mirror (DOMAIN, POOL, CONFIG, AUDIT)
    #[clap(long, global = true)]
    pub sub_ledger: Option<SubLedger>,

    /// Sequence numbers 1..=N may lack timestamps
    #[clap(long, global = true)]
    pub genesis_window: Option<u64>,

    /// More logging (-v debug, -vv trace)
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[clap(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand)]
pub enum Cmd {
    /// Bring the local copy up to date from an exported ledger file
    Sync {
        /// JSON array or JSON-lines file of ledger records
        #[clap(long)]
        from_file: PathBuf,
    },
    /// Show how many transactions are cached
    Status,
    /// Print one transaction
    Get {
        #[clap(long)]
        seq: Option<u64>,
        /// POSIX seconds; prints the first transaction at or after it
        #[clap(long)]
        timestamp: Option<u64>,
    },
    /// Print the transactions in an inclusive range
    Range {
        #[clap(long)]
        start_time: Option<u64>,
        #[clap(long)]
        end_time: Option<u64>,
        #[clap(long)]
        start_seq: Option<u64>,
        #[clap(long)]
        end_seq: Option<u64>,
        /// print whole records instead of sequence numbers
        #[clap(long)]
        full: bool,
    },
    /// Print the transactions submitted by an identity
    Sender {
        did: String,
        #[clap(long)]
        full: bool,
    },
    /// Check the cache has no gaps
    Verify,
}

impl Cli {
    /// Config file values, overridden by flags.
    pub fn mirror_config(&self) -> Result<MirrorConfig> {
        let mut cfg = MirrorConfig::load_or_default(self.config.as_deref())?;
        if let Some(db) = &self.db {
            cfg.db_path = db.clone();
        }
        if let Some(engine) = self.engine {
            cfg.engine = engine;
        }
        if let Some(sub_ledger) = self.sub_ledger {
            cfg.sub_ledger = sub_ledger;
        }
        if let Some(window) = self.genesis_window {
            cfg.genesis_window = window;
        }
        Ok(cfg)
    }
}

fn print_txns(txns: &TransactionMap, full: bool) {
    println!("{} transactions", txns.len());
    if full {
        for (_, txn) in txns {
            println!("{}", txn.to_pretty());
        }
    } else {
        let seqs: Vec<String> = txns.seq_nos().map(|n| n.to_string()).collect();
        if !seqs.is_empty() {
            println!("{}", seqs.join(" "));
        }
    }
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let cfg = cli.mirror_config()?;
    debug!(?cfg, "configuration loaded");

    match cli.cmd {
        Cmd::Sync { from_file } => {
            let client = ReplayClient::from_file(&from_file)?;
            let mut mirror = Mirror::new(&cfg, client)?;
            let fetched = mirror.refresh().await?;
            println!("fetched {} new transactions; {} cached", fetched, mirror.count()?);
        }
        Cmd::Status => {
            let store = LedgerStore::open(&cfg.db_path, cfg.engine)?;
            println!(
                "{} ({}, {} engine): {} transactions cached",
                cfg.db_path.display(),
                cfg.sub_ledger,
                store.engine_name(),
                store.high_water_mark()?
            );
        }
        Cmd::Get { seq, timestamp } => {
            let store = LedgerStore::open(&cfg.db_path, cfg.engine)?;
            let q = LedgerQuery::new(&store).with_genesis_window(cfg.genesis_window);
            match q.get_txn(seq, timestamp)? {
                Some(txn) => println!("{}", txn.to_pretty()),
                None => println!("no such transaction"),
            }
        }
        Cmd::Range { start_time, end_time, start_seq, end_seq, full } => {
            let store = LedgerStore::open(&cfg.db_path, cfg.engine)?;
            let q = LedgerQuery::new(&store).with_genesis_window(cfg.genesis_window);
            let txns = q.query_range(RangeQuery { start_time, end_time, start_seq, end_seq })?;
            print_txns(&txns, full);
        }
        Cmd::Sender { did, full } => {
            let store = LedgerStore::open(&cfg.db_path, cfg.engine)?;
            let txns = LedgerQuery::new(&store).get_by_sender(&did)?;
            print_txns(&txns, full);
        }
        Cmd::Verify => {
            let store = LedgerStore::open(&cfg.db_path, cfg.engine)?;
            let stored = store.verify()?;
            println!("ok: {} contiguous transactions", stored);
        }
    }

    let (counters, gauges) = METRICS.snapshot();
    debug!(?counters, ?gauges, "metrics");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from([
            "ledger-mirror",
            "--db",
            "/tmp/other.db",
            "--sub-ledger",
            "pool",
            "--genesis-window",
            "3",
            "range",
            "--start-seq",
            "1",
            "--end-time",
            "99",
        ]);
        let cfg = cli.mirror_config().unwrap();
        assert_eq!(cfg.db_path, PathBuf::from("/tmp/other.db"));
        assert_eq!(cfg.sub_ledger, SubLedger::Pool);
        assert_eq!(cfg.genesis_window, 3);
        assert!(matches!(cli.cmd, Cmd::Range { start_seq: Some(1), end_time: Some(99), .. }));
    }
}
