use std::path::PathBuf;

use thiserror::Error;

/// A dataset whose process is not registered in a config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingProcess {
    pub dataset: String,
    pub process: String,
}

#[derive(Debug, Error)]
pub enum AnalysisConfigError {
    #[error("a field 'name' is required to create a category, got '{fields}'")]
    MissingCategoryName { fields: String },

    #[error("Category not found: {name}")]
    CategoryNotFound { name: String },

    #[error("Category already exists: {name}")]
    DuplicateCategory { name: String },

    #[error("Category id {id} of '{name}' is already taken by '{existing}'")]
    DuplicateCategoryId {
        id: u64,
        name: String,
        existing: String,
    },

    #[error("Cannot link category '{child}' to parent '{parent}'")]
    InvalidCategoryLink { parent: String, child: String },

    #[error("Process not found: {name}")]
    ProcessNotFound { name: String },

    #[error("Process already exists: {name}")]
    DuplicateProcess { name: String },

    #[error("Cannot make process '{child}' a subprocess of '{parent}'")]
    InvalidProcessLink { parent: String, child: String },

    #[error("Dataset not found: {name}")]
    DatasetNotFound { name: String },

    #[error("Dataset already exists: {name}")]
    DuplicateDataset { name: String },

    #[error("Shift not found: {name}")]
    ShiftNotFound { name: String },

    #[error("Shift already exists: {name}")]
    DuplicateShift { name: String },

    #[error("Invalid shift name: '{name}' - must be 'nominal' or end with '_up' or '_down'")]
    InvalidShiftName { name: String },

    #[error("Invalid template '{template}': {message}")]
    InvalidTemplate { template: String, message: String },

    #[error("Unknown field '{field}' in template '{template}'")]
    UnknownTemplateField { template: String, field: String },

    #[error("Invalid hash length {hash_len} - must be between 1 and 15")]
    InvalidHashLength { hash_len: usize },

    #[error("{}", unregistered_message(.config, .missing))]
    UnregisteredProcesses {
        config: String,
        missing: Vec<MissingProcess>,
    },

    #[error("Failed to parse analysis file {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisConfigError>;

impl AnalysisConfigError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::CategoryNotFound { .. }
            | Self::ProcessNotFound { .. }
            | Self::DatasetNotFound { .. }
            | Self::ShiftNotFound { .. } => 2,
            Self::UnregisteredProcesses { .. } => 3,
            Self::DuplicateCategory { .. }
            | Self::DuplicateCategoryId { .. }
            | Self::DuplicateProcess { .. }
            | Self::DuplicateDataset { .. }
            | Self::DuplicateShift { .. } => 4,
            Self::ConfigParse { .. } | Self::TomlDe(_) => 5,
            Self::InvalidTemplate { .. } | Self::UnknownTemplateField { .. } => 6,
            _ => 1,
        }
    }
}

/// Multi-line report listing every unregistered (dataset, process) pair.
pub(crate) fn unregistered_message(config: &str, missing: &[MissingProcess]) -> String {
    let mut msg = format!(
        "found {} dataset(s) whose process is not registered in the '{}' config:",
        missing.len(),
        config
    );
    for pair in missing {
        msg.push_str(&format!(
            "\n  dataset '{}' -> process '{}'",
            pair.dataset, pair.process
        ));
    }
    msg
}
