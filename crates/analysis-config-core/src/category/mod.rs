//! # Category Module
//!
//! 解析カテゴリ（選択領域）の作成と組み合わせを提供する。
//!
//! ## 設計目的
//!
//! 解析では複数の軸でイベントを分類する：
//!
//! - **lepton**: e, mu
//! - **n_jets**: 1j, 2j
//! - **n_tags**: 0t, 1t
//!
//! これらの軸を組み合わせたカテゴリ（`e__1j`, `mu__2j__1t` 等）を手で定義するのは
//! 煩雑なので、リーフカテゴリから階層全体を自動生成する。
//!
//! ## モジュール構成
//!
//! - `id`: 決定的なカテゴリIDの生成
//! - `add`: 単一カテゴリの追加
//! - `combine`: カテゴリの組み合わせ生成
//!
//! ## 使用例
//!
//! ```rust
//! use analysis_config_core::category::{
//!     add_category, create_category_combinations, CategoryGroups, JoinNamer,
//! };
//! use analysis_config_core::model::{CategoryFields, Config};
//!
//! let mut config = Config::new("run2_2017", 1);
//! for (name, sel) in [("e", "n_e == 1"), ("mu", "n_mu == 1"), ("1j", "n_jet == 1"), ("2j", "n_jet == 2")] {
//!     add_category(&mut config, CategoryFields::named(name).selection(sel))?;
//! }
//!
//! let groups = CategoryGroups::new()
//!     .with_group("lepton", ["e", "mu"])
//!     .with_group("n_jets", ["1j", "2j"]);
//! let namer = JoinNamer::for_groups(&groups, "__");
//!
//! let created = create_category_combinations(&mut config, &groups, &namer, None, true)?;
//! assert_eq!(created, 4);
//! assert!(config.has_category("mu__2j", true));
//! # Ok::<(), analysis_config_core::AnalysisConfigError>(())
//! ```

mod add;
mod combine;
mod id;

// Re-exports
pub use add::add_category;
pub use combine::{
    create_category_combinations, CategoryGroup, CategoryGroups, CategoryNamer, CombinedParts,
    FieldsFn, JoinNamer, NameParts, DEFAULT_SEPARATOR,
};
pub use id::{create_category_id, create_hash, DEFAULT_HASH_LEN, MAX_HASH_LEN};
