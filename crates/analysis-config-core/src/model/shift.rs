use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisConfigError, Result};

pub const NOMINAL: &str = "nominal";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftDirection {
    Nominal,
    Up,
    Down,
}

impl ShiftDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nominal => NOMINAL,
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl fmt::Display for ShiftDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A systematic variation.
#[derive(Debug, Clone, PartialEq)]
pub struct Shift {
    pub name: String,
    pub id: u64,
    pub source: String,
    pub direction: ShiftDirection,
    pub label: Option<String>,
    /// Alias target column -> source column, applied when this shift is active.
    pub column_aliases: BTreeMap<String, String>,
}

impl Shift {
    /// Create a shift from its full name, e.g. `jec_up` or `nominal`.
    pub fn new(name: impl Into<String>, id: u64) -> Result<Self> {
        let name = name.into();
        let (source, direction) = Self::split_name(&name)?;
        Ok(Self {
            source,
            direction,
            name,
            id,
            label: None,
            column_aliases: BTreeMap::new(),
        })
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn join_name(source: &str, direction: ShiftDirection) -> String {
        match direction {
            ShiftDirection::Nominal => NOMINAL.to_string(),
            _ => format!("{}_{}", source, direction),
        }
    }

    pub fn split_name(name: &str) -> Result<(String, ShiftDirection)> {
        if name == NOMINAL {
            return Ok((NOMINAL.to_string(), ShiftDirection::Nominal));
        }
        let split = name
            .strip_suffix("_up")
            .map(|s| (s, ShiftDirection::Up))
            .or_else(|| name.strip_suffix("_down").map(|s| (s, ShiftDirection::Down)));

        match split {
            Some((source, direction)) if !source.is_empty() => {
                Ok((source.to_string(), direction))
            }
            _ => Err(AnalysisConfigError::InvalidShiftName {
                name: name.to_string(),
            }),
        }
    }

    pub fn is_nominal(&self) -> bool {
        self.direction == ShiftDirection::Nominal
    }
}
