//! Category Combination
//!
//! 複数のカテゴリグループ（例: lepton × n_jets × n_tags）を組み合わせて、
//! 親子関係を持つカテゴリ階層を生成する。
//!
//! 深さ k の組み合わせカテゴリは、グループを1つ除いた k-1 個の組み合わせ
//! すべてを親として持つ。k = 2 の場合、親は元のリーフカテゴリそのもの。

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::add::resolve_id;
use crate::error::Result;
use crate::model::{Category, CategoryFields, CategoryKey, Config, Selection};

/// 組み合わせの1軸（例: "lepton" → [e, mu]）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryGroup {
    /// グループ名（NamePartsのキーとして使用）
    pub name: String,
    /// 互いに排他的なベースカテゴリ名（順序保持）
    pub categories: Vec<String>,
}

/// 順序付きカテゴリグループ
///
/// グループの順序は生成順序と命名関数に渡される順序を決める。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryGroups {
    groups: Vec<CategoryGroup>,
}

impl CategoryGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// グループを末尾に追加
    pub fn with_group<I, S>(mut self, name: impl Into<String>, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(CategoryGroup {
            name: name.into(),
            categories: categories.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn push(&mut self, group: CategoryGroup) {
        self.groups.push(group);
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryGroup> {
        self.groups.iter()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.name.as_str()).collect()
    }
}

impl FromIterator<CategoryGroup> for CategoryGroups {
    fn from_iter<T: IntoIterator<Item = CategoryGroup>>(iter: T) -> Self {
        Self {
            groups: iter.into_iter().collect(),
        }
    }
}

/// 命名関数への入力: グループ名 → ベースカテゴリ名
///
/// 現在の組み合わせに参加しているグループだけを含む。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameParts {
    parts: Vec<(String, String)>,
}

impl NameParts {
    pub fn new<I, L, N>(parts: I) -> Self
    where
        I: IntoIterator<Item = (L, N)>,
        L: Into<String>,
        N: Into<String>,
    {
        Self {
            parts: parts
                .into_iter()
                .map(|(l, n)| (l.into(), n.into()))
                .collect(),
        }
    }

    /// グループ `label` で選ばれたカテゴリ名
    pub fn get(&self, label: &str) -> Option<&str> {
        self.parts
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, n)| n.as_str())
    }

    pub fn contains(&self, label: &str) -> bool {
        self.get(label).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.parts.iter().map(|(l, n)| (l.as_str(), n.as_str()))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|(l, _)| l.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|(_, n)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// フィールド関数への入力: グループ名 → 選ばれたベースカテゴリ
#[derive(Debug, Clone, Default)]
pub struct CombinedParts {
    parts: Vec<(String, Category)>,
}

impl CombinedParts {
    pub fn get(&self, label: &str) -> Option<&Category> {
        self.parts
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, c)| c)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Category)> {
        self.parts.iter().map(|(l, c)| (l.as_str(), c))
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// 組み合わせカテゴリの命名規則
///
/// `Fn(&NameParts) -> String` を満たすクロージャはそのまま使える。
pub trait CategoryNamer {
    fn name(&self, parts: &NameParts) -> String;
}

impl<F> CategoryNamer for F
where
    F: Fn(&NameParts) -> String,
{
    fn name(&self, parts: &NameParts) -> String {
        self(parts)
    }
}

/// 固定のグループ順でカテゴリ名を区切り文字で連結する
///
/// 欠けているグループは飛ばし、`order` に無いグループは末尾に出現順で続ける。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinNamer {
    order: Vec<String>,
    separator: String,
}

pub const DEFAULT_SEPARATOR: &str = "__";

impl JoinNamer {
    pub fn new<I, S>(order: I, separator: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            order: order.into_iter().map(Into::into).collect(),
            separator: separator.into(),
        }
    }

    /// `groups` のグループ順を使う
    pub fn for_groups(groups: &CategoryGroups, separator: impl Into<String>) -> Self {
        Self::new(groups.labels(), separator)
    }
}

impl CategoryNamer for JoinNamer {
    fn name(&self, parts: &NameParts) -> String {
        let ordered = self.order.iter().filter_map(|label| parts.get(label));
        let rest = parts
            .iter()
            .filter(|(label, _)| !self.order.iter().any(|o| o == label))
            .map(|(_, name)| name);
        ordered.chain(rest).join(&self.separator)
    }
}

/// 追加フィールド関数の型
pub type FieldsFn<'a> = dyn Fn(&CombinedParts) -> CategoryFields + 'a;

/// Build all combinations of the categories in `groups` and link them into
/// the category hierarchy of `config`.
///
/// Combinations of 2 up to `groups.len()` groups are built in order of
/// increasing size, every subset of groups in combination order, every
/// subset as the Cartesian product of its groups. Each combination is named
/// via `namer` and created with the fields returned by `fields_fn`; without
/// an id a deterministic one is created, without a selection the selections
/// of the contributing base categories are used. A returned name field is
/// ignored in favor of the generated name.
///
/// A new category becomes a child of every combination with one group less.
/// With `skip_existing`, combinations whose name is already known are
/// skipped entirely.
///
/// Returns the number of created categories. Fewer than two groups create
/// nothing. Categories created before an error stay registered.
pub fn create_category_combinations<N>(
    config: &mut Config,
    groups: &CategoryGroups,
    namer: &N,
    fields_fn: Option<&FieldsFn<'_>>,
    skip_existing: bool,
) -> Result<usize>
where
    N: CategoryNamer + ?Sized,
{
    let mut created = 0;
    let n_groups = groups.len();

    if n_groups < 2 {
        return Ok(created);
    }

    let labels = groups.labels();
    let base: Vec<Vec<CategoryKey>> = groups
        .iter()
        .map(|group| {
            group
                .categories
                .iter()
                .map(|name| config.require_category(name, true))
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<_>>()?;

    for size in 2..=n_groups {
        for subset in (0..n_groups).combinations(size) {
            let axes = subset.iter().map(|&g| base[g].iter().copied());
            for choice in axes.multi_cartesian_product() {
                let members: Vec<(usize, CategoryKey)> =
                    subset.iter().copied().zip(choice).collect();

                let cat_name = namer.name(&name_parts(config, &labels, &members));
                if skip_existing && config.has_category(&cat_name, true) {
                    debug!(name = %cat_name, "skipping existing category");
                    continue;
                }

                let fields = match fields_fn {
                    Some(f) => f(&combined_parts(config, &labels, &members)),
                    None => CategoryFields::default(),
                };
                let id = resolve_id(config, &cat_name, fields.id)?;
                let selection = fields.selection.unwrap_or_else(|| {
                    Selection::All(
                        members
                            .iter()
                            .map(|&(_, key)| config.category(key).selection.clone())
                            .collect(),
                    )
                });

                let mut category = Category::new(cat_name, id).with_selection(selection);
                category.label = fields.label;
                category.aux = fields.aux;
                let key = config.register_category(category)?;
                created += 1;

                for parents in members.iter().copied().combinations(size - 1) {
                    let parent_name = match parents.as_slice() {
                        [(_, single)] => config.category(*single).name.clone(),
                        _ => namer.name(&name_parts(config, &labels, &parents)),
                    };
                    let parent = config.require_category(&parent_name, true)?;
                    config.link_category(parent, key)?;
                }

                let category = config.category(key);
                debug!(
                    name = %category.name,
                    id = category.id,
                    parents = category.parents().len(),
                    "created category combination"
                );
            }
        }
    }

    info!(created, groups = n_groups, config = %config.name, "combined categories");
    Ok(created)
}

fn name_parts(config: &Config, labels: &[&str], members: &[(usize, CategoryKey)]) -> NameParts {
    NameParts::new(
        members
            .iter()
            .map(|&(g, key)| (labels[g], config.category(key).name.as_str())),
    )
}

fn combined_parts(
    config: &Config,
    labels: &[&str],
    members: &[(usize, CategoryKey)],
) -> CombinedParts {
    CombinedParts {
        parts: members
            .iter()
            .map(|&(g, key)| (labels[g].to_string(), config.category(key).clone()))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::add_category;
    use crate::model::IdSpec;

    fn leaf_config() -> Config {
        let mut config = Config::new("run2_2017", 1);
        let leaves = [
            ("e", 1, "n_e == 1"),
            ("mu", 2, "n_mu == 1"),
            ("1j", 10, "n_jet == 1"),
            ("2j", 11, "n_jet == 2"),
            ("0t", 20, "n_tag == 0"),
            ("1t", 21, "n_tag == 1"),
        ];
        for (name, id, sel) in leaves {
            add_category(
                &mut config,
                CategoryFields::named(name).id(id as u64).selection(sel),
            )
            .unwrap();
        }
        config
    }

    fn two_groups() -> CategoryGroups {
        CategoryGroups::new()
            .with_group("lepton", ["e", "mu"])
            .with_group("n_jets", ["1j", "2j"])
    }

    fn three_groups() -> CategoryGroups {
        two_groups().with_group("n_tags", ["0t", "1t"])
    }

    fn parent_names(config: &Config, name: &str) -> Vec<String> {
        let category = config.get_category(name, true).unwrap();
        category
            .parents()
            .iter()
            .map(|&key| config.category(key).name.clone())
            .collect()
    }

    #[test]
    fn two_group_example() {
        let mut config = leaf_config();
        let groups = two_groups();
        let namer = JoinNamer::for_groups(&groups, "__");

        let created = create_category_combinations(&mut config, &groups, &namer, None, true).unwrap();
        assert_eq!(created, 4);

        let names: Vec<_> = config
            .categories()
            .skip(6)
            .map(|(_, c)| c.name.clone())
            .collect();
        assert_eq!(names, vec!["e__1j", "e__2j", "mu__1j", "mu__2j"]);

        assert_eq!(parent_names(&config, "e__1j"), vec!["e", "1j"]);
        assert_eq!(parent_names(&config, "mu__2j"), vec!["mu", "2j"]);

        let e_1j = config.get_category("e__1j", true).unwrap();
        assert_eq!(e_1j.selection.expressions(), vec!["n_e == 1", "n_jet == 1"]);
        assert!(!config.has_category("e__1j", false));
    }

    #[test]
    fn three_group_counts_and_parents() {
        let mut config = leaf_config();
        let groups = three_groups();
        let namer = JoinNamer::for_groups(&groups, "__");

        let created = create_category_combinations(&mut config, &groups, &namer, None, true).unwrap();
        // 3 pairs of 2x2 plus one triple of 2x2x2
        assert_eq!(created, 3 * 4 + 8);

        assert_eq!(
            parent_names(&config, "mu__2j__1t"),
            vec!["mu__2j", "mu__1t", "2j__1t"]
        );
        for (_, category) in config.categories() {
            let depth = category.name.split("__").count();
            if depth > 1 {
                assert_eq!(category.parents().len(), depth, "{}", category.name);
            }
        }

        let e = config.get_category("e", false).unwrap();
        assert_eq!(e.children().len(), 4);
    }

    #[test]
    fn second_run_creates_nothing() {
        let mut config = leaf_config();
        let groups = three_groups();
        let namer = JoinNamer::for_groups(&groups, "__");

        create_category_combinations(&mut config, &groups, &namer, None, true).unwrap();
        let count = config.category_count();
        let again = create_category_combinations(&mut config, &groups, &namer, None, true).unwrap();

        assert_eq!(again, 0);
        assert_eq!(config.category_count(), count);
        let e_1j = config.get_category("e__1j", true).unwrap();
        assert_eq!(e_1j.parents().len(), 2);
    }

    #[test]
    fn without_skip_existing_duplicates_fail() {
        let mut config = leaf_config();
        let groups = two_groups();
        let namer = JoinNamer::for_groups(&groups, "__");

        create_category_combinations(&mut config, &groups, &namer, None, true).unwrap();
        let err = create_category_combinations(&mut config, &groups, &namer, None, false).unwrap_err();
        assert!(matches!(
            err,
            crate::error::AnalysisConfigError::DuplicateCategory { .. }
        ));
    }

    #[test]
    fn pre_existing_combination_is_skipped_but_used_as_parent() {
        let mut config = leaf_config();
        add_category(&mut config, CategoryFields::named("e__1j").id(100u64)).unwrap();
        let groups = three_groups();
        let namer = JoinNamer::for_groups(&groups, "__");

        let created = create_category_combinations(&mut config, &groups, &namer, None, true).unwrap();
        assert_eq!(created, 3 * 4 + 8 - 1);

        let existing = config.get_category("e__1j", false).unwrap();
        assert_eq!(existing.id, 100);
        assert!(existing.parents().is_empty());
        assert_eq!(existing.children().len(), 2);
    }

    #[test]
    fn fewer_than_two_groups_is_a_no_op() {
        let mut config = leaf_config();
        let groups = CategoryGroups::new().with_group("lepton", ["e", "mu"]);
        let namer = JoinNamer::for_groups(&groups, "__");

        let created = create_category_combinations(&mut config, &groups, &namer, None, true).unwrap();
        assert_eq!(created, 0);
        assert_eq!(config.category_count(), 6);
    }

    #[test]
    fn unknown_base_category_fails_before_creation() {
        let mut config = leaf_config();
        let groups = CategoryGroups::new()
            .with_group("lepton", ["e", "tau"])
            .with_group("n_jets", ["1j"]);
        let namer = JoinNamer::for_groups(&groups, "__");

        let err = create_category_combinations(&mut config, &groups, &namer, None, true).unwrap_err();
        assert!(err.to_string().contains("tau"));
        assert_eq!(config.category_count(), 6);
    }

    #[test]
    fn closure_namer_only_sees_current_labels() {
        let mut config = leaf_config();
        let groups = three_groups();
        let namer = |parts: &NameParts| {
            let lepton = parts.get("lepton").unwrap_or("incl");
            let rest: Vec<_> = parts
                .iter()
                .filter(|(l, _)| *l != "lepton")
                .map(|(_, n)| n)
                .collect();
            format!("{}_{}", lepton, rest.join("_"))
        };

        create_category_combinations(&mut config, &groups, &namer, None, true).unwrap();
        assert!(config.has_category("incl_1j_0t", true));
        assert!(config.has_category("mu_2j_1t", true));
        assert_eq!(
            parent_names(&config, "e_1j_0t"),
            vec!["e_1j", "e_0t", "incl_1j_0t"]
        );
    }

    #[test]
    fn fields_fn_overrides_defaults() {
        let mut config = leaf_config();
        let groups = two_groups();
        let namer = JoinNamer::for_groups(&groups, "__");
        let fields = |parts: &CombinedParts| {
            let lepton = parts.get("lepton").map(|c| c.name.clone()).unwrap_or_default();
            CategoryFields::default()
                .id(IdSpec::Next)
                .label(format!("{} channel", lepton))
        };

        create_category_combinations(&mut config, &groups, &namer, Some(&fields), true).unwrap();

        let ids: Vec<_> = ["e__1j", "e__2j", "mu__1j", "mu__2j"]
            .iter()
            .map(|n| config.get_category(n, true).unwrap().id)
            .collect();
        assert_eq!(ids, vec![22, 23, 24, 25]);

        let mu_2j = config.get_category("mu__2j", true).unwrap();
        assert_eq!(mu_2j.label.as_deref(), Some("mu channel"));
        assert_eq!(mu_2j.selection.expressions(), vec!["n_mu == 1", "n_jet == 2"]);
    }

    #[test]
    fn fields_fn_selection_wins_and_name_is_ignored() {
        let mut config = leaf_config();
        let groups = two_groups();
        let namer = JoinNamer::for_groups(&groups, "__");
        let fields = |_: &CombinedParts| CategoryFields::named("bogus").selection("custom");

        let created =
            create_category_combinations(&mut config, &groups, &namer, Some(&fields), true)
                .unwrap();
        assert_eq!(created, 4);
        assert!(!config.has_category("bogus", true));

        let e_1j = config.get_category("e__1j", true).unwrap();
        assert_eq!(e_1j.selection.expressions(), vec!["custom"]);
    }

    #[test]
    fn failure_keeps_earlier_combinations() {
        let mut config = leaf_config();
        add_category(&mut config, CategoryFields::named("mu__1j").id(100u64)).unwrap();
        let groups = two_groups();
        let namer = JoinNamer::for_groups(&groups, "__");

        let err =
            create_category_combinations(&mut config, &groups, &namer, None, false).unwrap_err();
        assert!(matches!(
            err,
            crate::error::AnalysisConfigError::DuplicateCategory { .. }
        ));
        assert!(config.has_category("e__1j", true));
        assert!(config.has_category("e__2j", true));
        assert!(!config.has_category("mu__2j", true));
        assert_eq!(parent_names(&config, "e__2j"), vec!["e", "2j"]);
    }

    #[test]
    fn generation_is_deterministic() {
        let run = || {
            let mut config = leaf_config();
            let groups = three_groups();
            let namer = JoinNamer::for_groups(&groups, "__");
            create_category_combinations(&mut config, &groups, &namer, None, true).unwrap();
            config
                .categories()
                .map(|(_, c)| (c.name.clone(), c.id))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn join_namer_orders_parts() {
        let namer = JoinNamer::new(["lepton", "n_jets"], "__");
        let parts = NameParts::new([("n_tags", "1t"), ("n_jets", "2j"), ("lepton", "e")]);
        assert_eq!(namer.name(&parts), "e__2j__1t");

        let parts = NameParts::new([("n_jets", "2j")]);
        assert_eq!(namer.name(&parts), "2j");
    }
}
