use std::collections::HashMap;

use super::category::{Category, CategoryKey};
use super::dataset::Dataset;
use super::process::ProcessIndex;
use super::shift::Shift;
use crate::error::{AnalysisConfigError, Result};

/// Registry owning all categories, processes, datasets and shifts of one
/// analysis configuration.
///
/// Categories live in an arena addressed by [`CategoryKey`]. Categories added
/// with [`Config::add_category`] are top-level; categories registered with
/// [`Config::register_category`] are only reachable through their parents, so
/// a shallow lookup does not see them.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub name: String,
    pub id: u64,
    pub campaign: Option<String>,
    pub processes: ProcessIndex,
    pub datasets: Vec<Dataset>,
    categories: Vec<Category>,
    category_names: HashMap<String, CategoryKey>,
    category_ids: HashMap<u64, CategoryKey>,
    root_categories: Vec<CategoryKey>,
    shifts: Vec<Shift>,
}

impl Config {
    pub fn new(name: impl Into<String>, id: u64) -> Self {
        Self {
            name: name.into(),
            id,
            ..Self::default()
        }
    }

    // ------------------------------------------------------------------
    // categories
    // ------------------------------------------------------------------

    /// Add a top-level category.
    pub fn add_category(&mut self, category: Category) -> Result<CategoryKey> {
        let key = self.insert_category(category)?;
        self.root_categories.push(key);
        Ok(key)
    }

    /// Register a category without making it top-level.
    pub fn register_category(&mut self, category: Category) -> Result<CategoryKey> {
        self.insert_category(category)
    }

    fn insert_category(&mut self, mut category: Category) -> Result<CategoryKey> {
        if self.category_names.contains_key(&category.name) {
            return Err(AnalysisConfigError::DuplicateCategory {
                name: category.name,
            });
        }
        if let Some(existing) = self.category_ids.get(&category.id) {
            return Err(AnalysisConfigError::DuplicateCategoryId {
                id: category.id,
                name: category.name,
                existing: self.categories[existing.0].name.clone(),
            });
        }
        category.parents.clear();
        category.children.clear();

        let key = CategoryKey(self.categories.len());
        self.category_names.insert(category.name.clone(), key);
        self.category_ids.insert(category.id, key);
        self.categories.push(category);
        Ok(key)
    }

    /// Attach `child` below `parent`. Linking twice is a no-op.
    pub fn link_category(&mut self, parent: CategoryKey, child: CategoryKey) -> Result<()> {
        if parent == child {
            let name = self.categories[parent.0].name.clone();
            return Err(AnalysisConfigError::InvalidCategoryLink {
                parent: name.clone(),
                child: name,
            });
        }
        if !self.categories[parent.0].children.contains(&child) {
            self.categories[parent.0].children.push(child);
            self.categories[child.0].parents.push(parent);
        }
        Ok(())
    }

    pub fn category_key(&self, name: &str, deep: bool) -> Option<CategoryKey> {
        let key = self.category_names.get(name).copied()?;
        if deep || self.root_categories.contains(&key) {
            Some(key)
        } else {
            None
        }
    }

    pub fn has_category(&self, name: &str, deep: bool) -> bool {
        self.category_key(name, deep).is_some()
    }

    pub fn get_category(&self, name: &str, deep: bool) -> Result<&Category> {
        self.require_category(name, deep)
            .map(|key| &self.categories[key.0])
    }

    pub fn require_category(&self, name: &str, deep: bool) -> Result<CategoryKey> {
        self.category_key(name, deep)
            .ok_or_else(|| AnalysisConfigError::CategoryNotFound {
                name: name.to_string(),
            })
    }

    pub fn category(&self, key: CategoryKey) -> &Category {
        &self.categories[key.0]
    }

    pub fn category_mut(&mut self, key: CategoryKey) -> &mut Category {
        &mut self.categories[key.0]
    }

    pub fn has_category_id(&self, id: u64) -> bool {
        self.category_ids.contains_key(&id)
    }

    /// All categories in registration order.
    pub fn categories(&self) -> impl Iterator<Item = (CategoryKey, &Category)> {
        self.categories
            .iter()
            .enumerate()
            .map(|(i, c)| (CategoryKey(i), c))
    }

    pub fn root_categories(&self) -> &[CategoryKey] {
        &self.root_categories
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// Highest category id plus one, or 1 for an empty config.
    pub fn next_category_id(&self) -> u64 {
        self.category_ids
            .keys()
            .max()
            .map(|id| id + 1)
            .unwrap_or(1)
    }

    // ------------------------------------------------------------------
    // processes and datasets
    // ------------------------------------------------------------------

    pub fn has_process(&self, name: &str) -> bool {
        self.processes.contains(name)
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

    // ------------------------------------------------------------------
    // shifts
    // ------------------------------------------------------------------

    pub fn add_shift(&mut self, shift: Shift) -> Result<()> {
        if self.shifts.iter().any(|s| s.name == shift.name) {
            return Err(AnalysisConfigError::DuplicateShift { name: shift.name });
        }
        self.shifts.push(shift);
        Ok(())
    }

    pub fn get_shift(&self, name: &str) -> Result<&Shift> {
        self.shifts
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| AnalysisConfigError::ShiftNotFound {
                name: name.to_string(),
            })
    }

    pub fn get_shift_mut(&mut self, name: &str) -> Result<&mut Shift> {
        self.shifts
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or_else(|| AnalysisConfigError::ShiftNotFound {
                name: name.to_string(),
            })
    }

    pub fn shifts(&self) -> &[Shift] {
        &self.shifts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Process;

    #[test]
    fn shallow_lookup_sees_root_categories_only() {
        let mut config = Config::new("run2", 1);
        let e = config.add_category(Category::new("e", 1)).unwrap();
        let e_1j = config.register_category(Category::new("e__1j", 2)).unwrap();
        config.link_category(e, e_1j).unwrap();

        assert!(config.has_category("e", false));
        assert!(!config.has_category("e__1j", false));
        assert!(config.has_category("e__1j", true));
        assert_eq!(config.category(e).children(), &[e_1j]);
        assert_eq!(config.category(e_1j).parents(), &[e]);
    }

    #[test]
    fn duplicate_names_and_ids_rejected() {
        let mut config = Config::new("run2", 1);
        config.add_category(Category::new("e", 1)).unwrap();

        let err = config.add_category(Category::new("e", 2)).unwrap_err();
        assert!(matches!(err, AnalysisConfigError::DuplicateCategory { .. }));

        let err = config.register_category(Category::new("mu", 1)).unwrap_err();
        match err {
            AnalysisConfigError::DuplicateCategoryId { id, existing, .. } => {
                assert_eq!(id, 1);
                assert_eq!(existing, "e");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn link_is_idempotent_and_rejects_self() {
        let mut config = Config::new("run2", 1);
        let a = config.add_category(Category::new("a", 1)).unwrap();
        let b = config.add_category(Category::new("b", 2)).unwrap();
        config.link_category(a, b).unwrap();
        config.link_category(a, b).unwrap();
        assert_eq!(config.category(a).children().len(), 1);
        assert!(config.link_category(a, a).is_err());
    }

    #[test]
    fn next_category_id() {
        let mut config = Config::new("run2", 1);
        assert_eq!(config.next_category_id(), 1);
        config.add_category(Category::new("a", 7)).unwrap();
        config.add_category(Category::new("b", 3)).unwrap();
        assert_eq!(config.next_category_id(), 8);
    }

    #[test]
    fn shifts_and_processes() {
        let mut config = Config::new("run2", 1);
        config.add_shift(Shift::new("nominal", 0).unwrap()).unwrap();
        assert!(config.add_shift(Shift::new("nominal", 0).unwrap()).is_err());
        assert!(config.get_shift("jec_up").is_err());

        config.processes.add_process(Process::new("tt", 1)).unwrap();
        assert!(config.has_process("tt"));
        assert!(!config.has_process("st"));
    }
}
