/*!
This crate computes exploratory data analysis reports over a dataframe: per-column statistical profiles, a dataset overview, and bivariate chart routing. It emits structured data only, never markup, so any presentation layer can render it.
*/

pub mod bivariate;
pub mod config;
pub mod profile;
pub mod report;

pub use self::report::{compute_report, DatasetSummary, Report};
