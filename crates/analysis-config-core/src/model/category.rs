use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable handle of a category inside its owning [`Config`](super::Config).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CategoryKey(pub(crate) usize);

impl CategoryKey {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Selection requirement of a category.
///
/// Either a single expression or an ordered sequence of nested selections that
/// are all required. The default is the empty sequence, i.e. no requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Selection {
    Expr(String),
    All(Vec<Selection>),
}

impl Selection {
    pub fn expr(expr: impl Into<String>) -> Self {
        Self::Expr(expr.into())
    }

    pub fn is_empty(&self) -> bool {
        self.expressions().is_empty()
    }

    /// All expressions in order, with nesting flattened.
    pub fn expressions(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_into(&mut out);
        out
    }

    fn collect_into<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Expr(expr) => out.push(expr.as_str()),
            Self::All(parts) => parts.iter().for_each(|p| p.collect_into(out)),
        }
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::All(Vec::new())
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expressions().join(" && "))
    }
}

impl From<&str> for Selection {
    fn from(expr: &str) -> Self {
        Self::Expr(expr.to_string())
    }
}

impl From<String> for Selection {
    fn from(expr: String) -> Self {
        Self::Expr(expr)
    }
}

/// How to assign the id of a new category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdSpec {
    /// Use exactly this id.
    Value(u64),
    /// Take the highest id known to the config plus one.
    Next,
}

impl From<u64> for IdSpec {
    fn from(id: u64) -> Self {
        Self::Value(id)
    }
}

/// An analysis category (selection region).
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub name: String,
    pub id: u64,
    pub label: Option<String>,
    pub selection: Selection,
    pub aux: BTreeMap<String, serde_json::Value>,
    pub(crate) parents: Vec<CategoryKey>,
    pub(crate) children: Vec<CategoryKey>,
}

impl Category {
    pub fn new(name: impl Into<String>, id: u64) -> Self {
        Self {
            name: name.into(),
            id,
            label: None,
            selection: Selection::default(),
            aux: BTreeMap::new(),
            parents: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_selection(mut self, selection: impl Into<Selection>) -> Self {
        self.selection = selection.into();
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn parents(&self) -> &[CategoryKey] {
        &self.parents
    }

    pub fn children(&self) -> &[CategoryKey] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Loosely specified constructor fields of a category.
///
/// Used where a caller may leave out the id or selection and let a helper fill
/// in defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryFields {
    pub name: Option<String>,
    pub id: Option<IdSpec>,
    pub label: Option<String>,
    pub selection: Option<Selection>,
    pub aux: BTreeMap<String, serde_json::Value>,
}

impl CategoryFields {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn id(mut self, id: impl Into<IdSpec>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn selection(mut self, selection: impl Into<Selection>) -> Self {
        self.selection = Some(selection.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn aux(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.aux.insert(key.into(), value);
        self
    }

    /// Names of the fields that are set, aux keys included.
    pub fn supplied(&self) -> Vec<String> {
        let mut fields = Vec::new();
        if self.name.is_some() {
            fields.push("name".to_string());
        }
        if self.id.is_some() {
            fields.push("id".to_string());
        }
        if self.label.is_some() {
            fields.push("label".to_string());
        }
        if self.selection.is_some() {
            fields.push("selection".to_string());
        }
        fields.extend(self.aux.keys().cloned());
        fields
    }
}
