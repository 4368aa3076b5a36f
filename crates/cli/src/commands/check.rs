//! `check` command implementation.
//!
//! One-shot compliance test: request attributes, decode the reply, validate
//! every value and print `TEST_PASSED` or `TEST_FAILED`.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use attribute_cache::{AttributeCache, QueryFacade};
use config_loader::ConfigLoader;
use contracts::{AttributeKey, AttributeMask, Snapshot};
use wire_codec::{decode_reply, encode_request};

use crate::cli::CheckArgs;
use crate::error::CliError;
use crate::service::SimulatedService;

pub const TEST_PASSED: &str = "TEST_PASSED";
pub const TEST_FAILED: &str = "TEST_FAILED";

/// Check result for JSON output
#[derive(Serialize)]
struct CheckReport {
    result: &'static str,
    requested: Vec<AttributeKey>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    values: BTreeMap<AttributeKey, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Execute the `check` command
pub fn run_check(args: &CheckArgs) -> Result<()> {
    let config = ConfigLoader::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;

    let requested = args
        .attributes
        .clone()
        .unwrap_or_else(|| config.compliance.attributes.clone());
    let mask: AttributeMask = requested.iter().copied().collect();
    info!(attributes = %mask, "Running compliance check");

    let outcome = fetch_and_validate(args, mask);
    let report = CheckReport {
        result: if outcome.is_ok() { TEST_PASSED } else { TEST_FAILED },
        requested: mask.iter().collect(),
        values: outcome
            .as_ref()
            .map(|snapshot| snapshot.values.clone())
            .unwrap_or_default(),
        error: outcome.as_ref().err().map(ToString::to_string),
    };

    if args.json {
        let json =
            serde_json::to_string_pretty(&report).context("Failed to serialize check result")?;
        println!("{json}");
    } else {
        print_report(&report);
    }

    match outcome {
        Ok(_) => Ok(()),
        Err(e) => {
            warn!(error = %e, "Compliance check failed");
            Err(e).context("Compliance check failed")
        }
    }
}

/// Request → reply → cache → snapshot, restricted to the requested keys
fn fetch_and_validate(args: &CheckArgs, mask: AttributeMask) -> Result<Snapshot, CliError> {
    let request = encode_request(mask);
    let reply = match &args.reply {
        Some(path) => {
            debug!(path = %path.display(), "Reading reply from file");
            bytes::Bytes::from(std::fs::read(path)?)
        }
        None => SimulatedService::default().handle_request(&request)?,
    };

    let decoded = decode_reply(&reply)?;
    if let Some(missing) = mask.iter().find(|key| !decoded.contains(*key)) {
        return Err(CliError::MissingAttribute(missing));
    }

    let cache = Arc::new(AttributeCache::new());
    cache.apply(&decoded);
    Ok(QueryFacade::new(cache).snapshot_all().restricted_to(mask))
}

fn print_report(report: &CheckReport) {
    for (key, value) in &report.values {
        println!("{key:<10} = {value} {}", key.unit());
    }
    if let Some(ref error) = report.error {
        println!("error: {error}");
    }
    println!("{}", report.result);
}
