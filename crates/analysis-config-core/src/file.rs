use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::category::{
    add_category, create_category_combinations, CategoryGroups, CombinedParts, FieldsFn,
    JoinNamer, DEFAULT_SEPARATOR,
};
use crate::error::{AnalysisConfigError, Result};
use crate::model::{
    Campaign, CategoryFields, Config, Dataset, IdSpec, Process, ProcessIndex, Selection, Shift,
};
use crate::process::get_root_processes_from_campaign;
use crate::shift::add_shift_aliases;

pub const ANALYSIS_FILE: &str = "analysis.toml";

/// Default analysis file template with rich comments
pub const DEFAULT_ANALYSIS_TEMPLATE: &str = r#"# analysis configuration file
# Describes a campaign and one config built on top of it.

[campaign]
name = "run2_2017_nano_v9"
id = 1
# Center-of-mass energy in TeV
ecm = 13.0

[[campaign.processes]]
name = "tt"
id = 1000

[[campaign.processes]]
name = "tt_sl"
id = 1100
parents = ["tt"]

[[campaign.processes]]
name = "tt_dl"
id = 1200
parents = ["tt"]

[[campaign.processes]]
name = "st"
id = 2000

[[campaign.datasets]]
name = "tt_sl_powheg"
id = 14235437
processes = ["tt_sl"]

[[campaign.datasets]]
name = "tt_dl_powheg"
id = 14235438
processes = ["tt_dl"]

[config]
name = "run2_2017_nano_v9_default"
id = 1
# Processes registered together with their subprocesses.
# Default: root processes of all campaign datasets
# processes = ["tt"]
# Datasets taken over from the campaign. Default: all
# datasets = ["tt_sl_powheg"]

# Leaf categories; ids are generated when omitted
[[config.categories]]
name = "e"
id = 1
selection = "n_electron == 1"

[[config.categories]]
name = "mu"
id = 2
selection = "n_muon == 1"

[[config.categories]]
name = "1j"
selection = "n_jet == 1"

[[config.categories]]
name = "2j"
selection = "n_jet >= 2"

[[config.shifts]]
name = "nominal"
id = 0

[[config.shifts]]
name = "pdf_up"
id = 10

[[config.shifts]]
name = "pdf_down"
id = 11

# Column aliases per shift source; {name}, {id}, {source}, {direction}
# and {label} are replaced by the attributes of each shift
[config.shift_aliases.pdf]
pdf_weight = "pdf_weight_{direction}"

# Combined categories built from the leaf categories above
[config.combine]
separator = "__"
skip_existing = true
# "hash" (deterministic ids) or "next" (highest id plus one)
ids = "hash"
groups = [
    { name = "lepton", categories = ["e", "mu"] },
    { name = "n_jets", categories = ["1j", "2j"] },
]
"#;

/// Analysis file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisFile {
    pub campaign: CampaignEntry,
    pub config: ConfigEntry,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignEntry {
    pub name: String,
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ecm: Option<f64>,
    #[serde(default)]
    pub processes: Vec<ProcessEntry>,
    #[serde(default)]
    pub datasets: Vec<DatasetEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessEntry {
    pub name: String,
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Names of the parent processes
    #[serde(default)]
    pub parents: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetEntry {
    pub name: String,
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub processes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub name: String,
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datasets: Option<Vec<String>>,
    #[serde(default)]
    pub categories: Vec<CategoryEntry>,
    #[serde(default)]
    pub shifts: Vec<ShiftEntry>,
    /// Shift source -> (alias target -> alias source)
    #[serde(default)]
    pub shift_aliases: BTreeMap<String, BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combine: Option<CombineEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<Selection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftEntry {
    pub name: String,
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombineEntry {
    #[serde(default = "default_separator")]
    pub separator: String,
    #[serde(default = "default_skip_existing")]
    pub skip_existing: bool,
    #[serde(default)]
    pub ids: IdPolicy,
    pub groups: CategoryGroups,
}

/// Id assignment of combined categories
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdPolicy {
    /// Deterministic hash-based ids
    #[default]
    Hash,
    /// Highest known id plus one
    Next,
}

fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

fn default_skip_existing() -> bool {
    true
}

/// Campaign and config built from an [`AnalysisFile`].
#[derive(Debug, Clone)]
pub struct Analysis {
    pub campaign: Campaign,
    pub config: Config,
    /// Number of categories created by combination
    pub created_categories: usize,
}

impl AnalysisFile {
    /// Load an analysis file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content).map_err(|e| AnalysisConfigError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Parse an analysis file from a string
    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Save the analysis file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Write the default template unless the file already exists
    pub fn init(path: &Path) -> Result<PathBuf> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        if !path.exists() {
            fs::write(path, DEFAULT_ANALYSIS_TEMPLATE)?;
        }
        Ok(path.to_path_buf())
    }

    /// Build the campaign and config described by this file
    pub fn build(&self) -> Result<Analysis> {
        let campaign = self.build_campaign()?;
        let mut config = Config::new(&self.config.name, self.config.id);
        config.campaign = Some(campaign.name.clone());

        // processes
        config.processes = match &self.config.processes {
            Some(names) => {
                let mut index = ProcessIndex::new();
                for name in names {
                    let added = index.extend_from(&campaign.processes, name)?;
                    debug!(process = %name, added, "registered process tree");
                }
                index
            }
            None => get_root_processes_from_campaign(&campaign)?,
        };

        // datasets
        match &self.config.datasets {
            Some(names) => {
                for name in names {
                    config.add_dataset(campaign.require_dataset(name)?.clone())?;
                }
            }
            None => {
                for dataset in &campaign.datasets {
                    config.add_dataset(dataset.clone())?;
                }
            }
        }

        // leaf categories
        for entry in &self.config.categories {
            let mut fields = CategoryFields::named(&entry.name);
            fields.id = entry.id.map(IdSpec::Value);
            fields.label = entry.label.clone();
            fields.selection = entry.selection.clone();
            add_category(&mut config, fields)?;
        }

        // shifts
        for entry in &self.config.shifts {
            let mut shift = Shift::new(&entry.name, entry.id)?;
            shift.label = entry.label.clone();
            config.add_shift(shift)?;
        }
        for (source, aliases) in &self.config.shift_aliases {
            add_shift_aliases(&mut config, source, aliases)?;
        }

        // combinations
        let mut created_categories = 0;
        if let Some(combine) = &self.config.combine {
            let namer = JoinNamer::for_groups(&combine.groups, combine.separator.as_str());
            let next_ids = |_: &CombinedParts| CategoryFields::default().id(IdSpec::Next);
            let fields_fn: Option<&FieldsFn<'_>> = match combine.ids {
                IdPolicy::Hash => None,
                IdPolicy::Next => Some(&next_ids),
            };
            created_categories = create_category_combinations(
                &mut config,
                &combine.groups,
                &namer,
                fields_fn,
                combine.skip_existing,
            )?;
        }

        info!(
            config = %config.name,
            categories = config.category_count(),
            processes = config.processes.len(),
            datasets = config.datasets.len(),
            shifts = config.shifts().len(),
            "built analysis config"
        );

        Ok(Analysis {
            campaign,
            config,
            created_categories,
        })
    }

    fn build_campaign(&self) -> Result<Campaign> {
        let entry = &self.campaign;
        let mut campaign = Campaign::new(&entry.name, entry.id);
        campaign.ecm = entry.ecm;

        for process in &entry.processes {
            let mut p = Process::new(&process.name, process.id);
            p.label = process.label.clone();
            campaign.processes.add_process(p)?;
        }
        for process in &entry.processes {
            let child = campaign.processes.require(&process.name)?;
            for parent in &process.parents {
                let parent = campaign.processes.require(parent)?;
                campaign.processes.add_child(parent, child)?;
            }
        }

        for dataset in &entry.datasets {
            let mut d = Dataset::new(&dataset.name, dataset.id);
            d.label = dataset.label.clone();
            d.processes = dataset.processes.clone();
            campaign.add_dataset(d)?;
        }

        Ok(campaign)
    }
}
