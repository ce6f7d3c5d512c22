#![deny(unsafe_code)]
//! AIver demo binary.
//!
//! Builds the reference adapter lineage in an in-memory ledger (or loads a
//! previously exported snapshot), then prints roots, children, topological
//! order and the result of both audits.

mod config;

use std::fs;
use std::path::PathBuf;

use aiver_ledger::{
    AcyclicityReport, AdapterMetadata, Digest, LedgerError, LedgerReader, LedgerSnapshot,
    LedgerStore, LedgerWriter,
};
use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::DemoConfig;

/// AIver demo CLI
#[derive(Parser)]
#[command(name = "aiver-demo")]
#[command(about = "AIver - adapter lineage ledger demo", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "AIVER_CONFIG")]
    config: Option<String>,

    /// Log level (overrides the configuration file)
    #[arg(long, env = "AIVER_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "AIVER_LOG_JSON")]
    json: bool,

    /// Load this snapshot instead of building the reference lineage
    #[arg(long)]
    load: Option<PathBuf>,

    /// Write the final snapshot as JSON to this path ("-" for stdout)
    #[arg(long)]
    snapshot: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = DemoConfig::load(cli.config.as_deref()).context("loading configuration")?;

    // Initialize tracing
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into());

    if cli.json || config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    info!(
        algorithm = %config.ledger.digest_algorithm,
        audit_on_load = config.ledger.audit_on_load,
        "Starting aiver-demo"
    );

    let store = match &cli.load {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("reading snapshot {}", path.display()))?;
            let snapshot: LedgerSnapshot =
                serde_json::from_str(&raw).context("parsing snapshot")?;
            LedgerStore::from_snapshot(config.ledger.clone(), snapshot)?
        }
        None => {
            let store = LedgerStore::with_config(config.ledger.clone());
            build_reference_lineage(&store)?;
            reject_unknown_parent(&store)?;
            store
        }
    };

    report(&store)?;

    if let Some(target) = cli.snapshot.as_deref() {
        let json = serde_json::to_string_pretty(&store.snapshot()?)?;
        if target == "-" {
            println!("{}", json);
        } else {
            fs::write(target, json).with_context(|| format!("writing snapshot {}", target))?;
            info!(path = target, "Snapshot written");
        }
    }

    Ok(())
}

fn adapter(fields: [&str; 6]) -> Result<AdapterMetadata, LedgerError> {
    let [name, version, lifetime, expires, policy, regulation] = fields;
    AdapterMetadata::parse(name, version, lifetime, expires, policy, regulation)
}

/// A and B are roots, C derives from A, D from B, and E combines C and D.
fn build_reference_lineage(store: &LedgerStore) -> Result<()> {
    let a = store.insert(
        adapter(["Aladapter1", "1.0", "2 years", "2026-01-01", "policy_v1.json", "Regulation A"])?,
        vec![],
    )?;
    let b = store.insert(
        adapter(["Aladapter", "1.0", "3 years", "2027-01-01", "policy_v2.json", "Regulation B"])?,
        vec![],
    )?;
    let c = store.insert(
        adapter(["Aladapter1", "2.0", "2 years", "2028-01-01", "policy_v1.json", "Regulation A"])?,
        vec![a],
    )?;
    let d = store.insert(
        adapter(["Aladapter2", "2.0", "3 years", "2029-01-01", "policy_v2.json", "Regulation B"])?,
        vec![b],
    )?;
    store.insert(
        adapter([
            "CombinedAladapter",
            "1.0",
            "5 years",
            "2030-01-01",
            "policy_combined.json",
            "Regulation C",
        ])?,
        vec![c, d],
    )?;
    Ok(())
}

/// Show that an insert naming an unknown parent is refused and changes nothing.
fn reject_unknown_parent(store: &LedgerStore) -> Result<()> {
    let before = store.len()?;
    let orphan = adapter(["OrphanAladapter", "1.0", "1 year", "2027-01-01", "policy_v1.json", ""])?;
    match store.insert(orphan, vec![Digest::from_bytes([0; Digest::LEN])]) {
        Err(LedgerError::ParentNotFound(missing)) => {
            println!("Rejected insert with unknown parent {}", missing.short());
        }
        Err(e) => return Err(e.into()),
        Ok(digest) => anyhow::bail!("orphan insert unexpectedly accepted as {}", digest),
    }
    anyhow::ensure!(store.len()? == before, "rejected insert changed the ledger");
    Ok(())
}

fn report(store: &LedgerStore) -> Result<()> {
    let label = |digest: &Digest| -> Result<String> {
        let node = store.get(digest)?;
        let meta = node.metadata();
        Ok(format!(
            "{} {}@{}",
            digest.short(),
            meta.identity_name(),
            meta.version()
        ))
    };

    println!("Nodes: {}", store.len()?);

    println!("Roots:");
    for root in store.roots()? {
        println!("  {}", label(&root)?);
    }

    println!("Children:");
    for digest in store.digests()? {
        let children = store
            .children(&digest)?
            .iter()
            .map(&label)
            .collect::<Result<Vec<_>>>()?;
        println!("  {} -> [{}]", label(&digest)?, children.join(", "));
    }

    match store.topological_order() {
        Ok(order) => {
            println!("Topological order:");
            for digest in order {
                println!("  {}", label(&digest)?);
            }
        }
        Err(e) => warn!(error = %e, "No topological order"),
    }

    let today = Utc::now().date_naive();
    let expired = store.expired_as_of(today)?;
    println!("Expired as of {}: {}", today, expired.len());

    match store.validate()? {
        AcyclicityReport::Acyclic {
            nodes_visited,
            edges_traversed,
        } => println!(
            "Is DAG valid? true ({} nodes, {} edges)",
            nodes_visited, edges_traversed
        ),
        AcyclicityReport::Cycle { digest, path } => println!(
            "Is DAG valid? false (cycle at {}, length {})",
            digest.short(),
            path.len().saturating_sub(1)
        ),
    }

    let integrity = store.verify_integrity()?;
    println!(
        "Integrity: {}/{} checks passed",
        integrity.checks_passed, integrity.checks_performed
    );
    for error in &integrity.errors {
        println!("  {}", error);
    }
    Ok(())
}
