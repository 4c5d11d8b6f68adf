/*!
This module defines the `Config` struct, which is deserialized from a yaml file to override type inference and the profiling thresholds.
*/

use crate::{bivariate::RouterSettings, profile::ProfileSettings};
use anyhow::Result;
use saeda_dataframe::{DataFrameColumnType, InferOptions};
use std::{collections::BTreeMap, path::Path};

#[derive(Debug, Default, serde::Deserialize)]
pub struct Config {
	pub column_types: Option<BTreeMap<String, ColumnType>>,
	pub enum_max_unique_values: Option<usize>,
	pub number_histogram_max_size: Option<usize>,
	pub category_histogram_max_size: Option<usize>,
	pub cardinality_threshold_percent: Option<f32>,
	pub missing_flag_threshold_percent: Option<f32>,
	pub min_candidate_columns: Option<usize>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(tag = "type")]
pub enum ColumnType {
	#[serde(rename = "unknown")]
	Unknown,
	#[serde(rename = "number")]
	Number,
	#[serde(rename = "enum")]
	Enum { options: Vec<String> },
	#[serde(rename = "text")]
	Text,
}

impl Config {
	pub fn from_path(path: &Path) -> Result<Self> {
		let config = std::fs::read_to_string(path)?;
		let config = serde_yaml::from_str(&config)?;
		Ok(config)
	}

	pub fn dataframe_column_types(&self) -> Option<BTreeMap<String, DataFrameColumnType>> {
		self.column_types.as_ref().map(|column_types| {
			column_types
				.iter()
				.map(|(column_name, column_type)| {
					let column_type = match column_type {
						ColumnType::Unknown => DataFrameColumnType::Unknown,
						ColumnType::Number => DataFrameColumnType::Number,
						ColumnType::Enum { options } => DataFrameColumnType::Enum {
							options: options.clone(),
						},
						ColumnType::Text => DataFrameColumnType::Text,
					};
					(column_name.clone(), column_type)
				})
				.collect()
		})
	}

	pub fn infer_options(&self) -> InferOptions {
		let mut infer_options = InferOptions::default();
		if let Some(enum_max_unique_values) = self.enum_max_unique_values {
			infer_options.enum_max_unique_values = enum_max_unique_values;
		}
		infer_options
	}

	pub fn profile_settings(&self) -> ProfileSettings {
		let mut settings = ProfileSettings::default();
		if let Some(number_histogram_max_size) = self.number_histogram_max_size {
			settings.number_histogram_max_size = number_histogram_max_size;
		}
		if let Some(category_histogram_max_size) = self.category_histogram_max_size {
			settings.category_histogram_max_size = category_histogram_max_size;
		}
		if let Some(cardinality_threshold_percent) = self.cardinality_threshold_percent {
			settings.cardinality_threshold_percent = cardinality_threshold_percent;
		}
		if let Some(missing_flag_threshold_percent) = self.missing_flag_threshold_percent {
			settings.missing_flag_threshold_percent = missing_flag_threshold_percent;
		}
		settings
	}

	pub fn router_settings(&self) -> RouterSettings {
		let mut settings = RouterSettings::default();
		if let Some(min_candidate_columns) = self.min_candidate_columns {
			settings.min_candidate_columns = min_candidate_columns;
		}
		settings
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_parse_config() {
		let yaml = r#"
column_types:
  name:
    type: text
  churned:
    type: enum
    options: ["0", "1"]
min_candidate_columns: 0
cardinality_threshold_percent: 5.0
"#;
		let config: Config = serde_yaml::from_str(yaml).unwrap();
		let column_types = config.dataframe_column_types().unwrap();
		assert_eq!(
			column_types.get("name"),
			Some(&DataFrameColumnType::Text)
		);
		assert_eq!(
			column_types.get("churned"),
			Some(&DataFrameColumnType::Enum {
				options: vec!["0".to_owned(), "1".to_owned()],
			})
		);
		assert_eq!(config.router_settings().min_candidate_columns, 0);
		assert_eq!(config.profile_settings().cardinality_threshold_percent, 5.0);
		assert_eq!(config.profile_settings().missing_flag_threshold_percent, 25.0);
	}
}
