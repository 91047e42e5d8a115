use super::process::ProcessIndex;
use crate::error::{AnalysisConfigError, Result};

/// A dataset and the names of the processes it contains.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub name: String,
    pub id: u64,
    pub label: Option<String>,
    pub processes: Vec<String>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, id: u64) -> Self {
        Self {
            name: name.into(),
            id,
            label: None,
            processes: Vec::new(),
        }
    }

    pub fn with_process(mut self, process: impl Into<String>) -> Self {
        self.processes.push(process.into());
        self
    }
}

/// A collection of datasets for a given data-taking period.
#[derive(Debug, Clone, Default)]
pub struct Campaign {
    pub name: String,
    pub id: u64,
    /// Center-of-mass energy in TeV.
    pub ecm: Option<f64>,
    pub processes: ProcessIndex,
    pub datasets: Vec<Dataset>,
}

impl Campaign {
    pub fn new(name: impl Into<String>, id: u64) -> Self {
        Self {
            name: name.into(),
            id,
            ..Self::default()
        }
    }

    pub fn add_dataset(&mut self, dataset: Dataset) -> Result<()> {
        if self.get_dataset(&dataset.name).is_some() {
            return Err(AnalysisConfigError::DuplicateDataset {
                name: dataset.name,
            });
        }
        self.datasets.push(dataset);
        Ok(())
    }

    pub fn get_dataset(&self, name: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.name == name)
    }

    pub fn require_dataset(&self, name: &str) -> Result<&Dataset> {
        self.get_dataset(name)
            .ok_or_else(|| AnalysisConfigError::DatasetNotFound {
                name: name.to_string(),
            })
    }
}
