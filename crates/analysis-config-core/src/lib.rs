pub mod category;
pub mod error;
pub mod file;
pub mod model;
pub mod process;
pub mod shift;

pub use error::{AnalysisConfigError, MissingProcess, Result};
pub use file::{Analysis, AnalysisFile, IdPolicy, ANALYSIS_FILE, DEFAULT_ANALYSIS_TEMPLATE};
pub use model::{
    Campaign, Category, CategoryFields, CategoryKey, Config, Dataset, IdSpec, Process,
    ProcessIndex, ProcessKey, Selection, Shift, ShiftDirection,
};
pub use process::{
    find_unregistered_processes, get_root_processes_from_campaign, verify_config_processes,
};
pub use shift::{add_shift_aliases, get_shifts_from_sources, render_template};

// Category system
pub use category::{
    add_category, create_category_combinations, create_category_id, CategoryGroup,
    CategoryGroups, CategoryNamer, CombinedParts, JoinNamer, NameParts, DEFAULT_HASH_LEN,
};
