//! Process helpers for campaigns and configs.

use std::collections::HashSet;

use colored::Colorize;
use tracing::{debug, warn};

use crate::error::{unregistered_message, AnalysisConfigError, MissingProcess, Result};
use crate::model::{Campaign, Config, ProcessIndex, ProcessKey};

/// Collect the root processes of all dataset processes in `campaign` and
/// return them, together with every subprocess, in a new index.
///
/// Processes appear in the order they are first reached. A campaign without
/// datasets yields an empty index.
pub fn get_root_processes_from_campaign(campaign: &Campaign) -> Result<ProcessIndex> {
    let index = &campaign.processes;

    let mut roots: Vec<ProcessKey> = Vec::new();
    for dataset in &campaign.datasets {
        for name in &dataset.processes {
            let key = index.require(name)?;
            for root in index.root_processes(key) {
                if !roots.contains(&root) {
                    roots.push(root);
                }
            }
        }
    }

    let mut seen = HashSet::new();
    let keys: Vec<ProcessKey> = roots
        .iter()
        .flat_map(|&root| index.walk(root, true))
        .map(|(key, _)| key)
        .filter(|key| seen.insert(*key))
        .collect();

    debug!(
        campaign = %campaign.name,
        roots = roots.len(),
        processes = keys.len(),
        "collected root processes"
    );
    Ok(index.subset(keys))
}

/// All (dataset, process) pairs of `config` whose process is not registered.
pub fn find_unregistered_processes(config: &Config) -> Vec<MissingProcess> {
    config
        .datasets
        .iter()
        .flat_map(|dataset| {
            dataset
                .processes
                .iter()
                .filter(|process| !config.has_process(process))
                .map(|process| MissingProcess {
                    dataset: dataset.name.clone(),
                    process: process.clone(),
                })
        })
        .collect()
}

/// Verify that the processes of all datasets in `config` are registered.
///
/// Fails with [`AnalysisConfigError::UnregisteredProcesses`] listing every
/// offending pair, or, when `warn` is set, prints a warning and succeeds.
pub fn verify_config_processes(config: &Config, warn: bool) -> Result<()> {
    let missing = find_unregistered_processes(config);
    if missing.is_empty() {
        return Ok(());
    }

    if !warn {
        return Err(AnalysisConfigError::UnregisteredProcesses {
            config: config.name.clone(),
            missing,
        });
    }

    let msg = unregistered_message(&config.name, &missing);
    warn!(config = %config.name, missing = missing.len(), "unregistered dataset processes");
    println!("{}: {}", "WARNING".red(), msg);
    Ok(())
}
