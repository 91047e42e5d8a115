use tracing::debug;

use super::id::{create_category_id, DEFAULT_HASH_LEN};
use crate::error::{AnalysisConfigError, Result};
use crate::model::{Category, CategoryFields, CategoryKey, Config, IdSpec};

/// Resolve an optional id specification for a category named `name`.
///
/// Missing ids are derived with [`create_category_id`].
pub(crate) fn resolve_id(config: &Config, name: &str, id: Option<IdSpec>) -> Result<u64> {
    match id {
        Some(IdSpec::Value(id)) => Ok(id),
        Some(IdSpec::Next) => Ok(config.next_category_id()),
        None => create_category_id(config, name, DEFAULT_HASH_LEN, None),
    }
}

/// Create a top-level category from `fields` and add it to `config`.
///
/// `fields` must contain a name. Without an id, a deterministic one is
/// created from the config identity and the name.
pub fn add_category(config: &mut Config, fields: CategoryFields) -> Result<CategoryKey> {
    let Some(name) = fields.name else {
        return Err(AnalysisConfigError::MissingCategoryName {
            fields: fields.supplied().join(","),
        });
    };

    let id = resolve_id(config, &name, fields.id)?;
    let mut category = Category::new(name, id);
    category.label = fields.label;
    category.selection = fields.selection.unwrap_or_default();
    category.aux = fields.aux;

    debug!(name = %category.name, id = category.id, "adding category");
    config.add_category(category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Selection;

    #[test]
    fn add_category_requires_name() {
        let mut config = Config::new("run2", 1);
        let fields = CategoryFields::default().id(3u64).selection("n_e == 1");

        let err = add_category(&mut config, fields).unwrap_err();
        assert_eq!(
            err.to_string(),
            "a field 'name' is required to create a category, got 'id,selection'"
        );
        assert_eq!(config.category_count(), 0);
    }

    #[test]
    fn add_category_default_id() {
        let mut config = Config::new("run2", 1);
        let key = add_category(&mut config, CategoryFields::named("e")).unwrap();

        let expected = create_category_id(&config, "e", DEFAULT_HASH_LEN, None).unwrap();
        let category = config.category(key);
        assert_eq!(category.id, expected);
        assert_eq!(category.selection, Selection::default());
        assert!(config.has_category("e", false));
    }

    #[test]
    fn add_category_explicit_and_next_ids() {
        let mut config = Config::new("run2", 1);
        let e = add_category(&mut config, CategoryFields::named("e").id(10u64)).unwrap();
        let mu = add_category(&mut config, CategoryFields::named("mu").id(IdSpec::Next)).unwrap();

        assert_eq!(config.category(e).id, 10);
        assert_eq!(config.category(mu).id, 11);
    }
}
