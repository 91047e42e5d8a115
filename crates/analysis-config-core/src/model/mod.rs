//! Object model of an analysis configuration.
//!
//! - `category`: categories, selections and loose constructor fields
//! - `process`: processes and the process index
//! - `dataset`: datasets and campaigns
//! - `shift`: systematic shifts
//! - `config`: the registry tying everything together

mod category;
mod config;
mod dataset;
mod process;
mod shift;

pub use category::{Category, CategoryFields, CategoryKey, IdSpec, Selection};
pub use config::Config;
pub use dataset::{Campaign, Dataset};
pub use process::{Process, ProcessIndex, ProcessKey};
pub use shift::{Shift, ShiftDirection, NOMINAL};
