use crate::profile::{ColumnProfile, ProfileSettings};
use num_traits::ToPrimitive;
use saeda_dataframe::{DataFrameColumnView, DataFrameView};

/// The full analysis of one dataset: the overview plus one profile per column.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Report {
	pub summary: DatasetSummary,
	pub column_profiles: Vec<ColumnProfile>,
}

/// Dataset-wide counts. Missing values are nulls plus empty strings.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct DatasetSummary {
	pub n_columns: u64,
	pub n_rows: u64,
	pub n_cells: u64,
	pub null_count: u64,
	pub empty_count: u64,
	pub missing_count: u64,
	/// missing count relative to the cell count, as a percent
	pub missing_percent: f32,
}

/// Compute the report for a dataset. Returns `None` when the dataset has no rows, in which case profiling is skipped entirely.
pub fn compute_report(
	dataframe: &DataFrameView,
	settings: &ProfileSettings,
	progress: impl Fn(u64),
) -> Option<Report> {
	if dataframe.nrows() == 0 {
		return None;
	}
	let summary = compute_summary(dataframe);
	let column_profiles = dataframe
		.columns
		.iter()
		.enumerate()
		.map(|(index, column)| {
			let profile = ColumnProfile::compute(column, summary.n_cells, settings);
			progress(index.to_u64().unwrap() + 1);
			profile
		})
		.collect();
	Some(Report {
		summary,
		column_profiles,
	})
}

fn compute_summary(dataframe: &DataFrameView) -> DatasetSummary {
	let n_columns = dataframe.ncols().to_u64().unwrap();
	let n_rows = dataframe.nrows().to_u64().unwrap();
	let n_cells = n_columns * n_rows;
	let mut null_count = 0;
	let mut empty_count = 0;
	for column in dataframe.columns.iter() {
		match column {
			// A column with no inferable type has no usable values at all.
			DataFrameColumnView::Unknown(column) => {
				null_count += column.len.to_u64().unwrap();
			}
			DataFrameColumnView::Number(column) => {
				null_count += column
					.data
					.iter()
					.filter(|value| !value.is_finite())
					.count()
					.to_u64()
					.unwrap();
			}
			DataFrameColumnView::Enum(column) => {
				null_count += column
					.data
					.iter()
					.filter(|value| value.is_none())
					.count()
					.to_u64()
					.unwrap();
			}
			DataFrameColumnView::Text(column) => {
				empty_count += column
					.data
					.iter()
					.filter(|value| value.is_empty())
					.count()
					.to_u64()
					.unwrap();
			}
		}
	}
	let missing_count = null_count + empty_count;
	let missing_percent = if n_cells == 0 {
		0.0
	} else {
		missing_count.to_f32().unwrap() * 100.0 / n_cells.to_f32().unwrap()
	};
	DatasetSummary {
		n_columns,
		n_rows,
		n_cells,
		null_count,
		empty_count,
		missing_count,
		missing_percent,
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use saeda_dataframe::{DataFrame, FromCsvOptions};
	use std::io::Cursor;

	fn load(csv: &str, options: FromCsvOptions) -> DataFrame {
		DataFrame::from_csv(&mut csv::Reader::from_reader(Cursor::new(csv)), options, |_| {})
			.unwrap()
	}

	#[test]
	fn test_summary_counts() {
		use saeda_dataframe::DataFrameColumnType;
		use std::collections::BTreeMap;
		let csv = "age,name\n20,alice\n,bob\n30,\n40,dora\n";
		// Force the name column to text so empty strings stay distinguishable from nulls.
		let mut column_types = BTreeMap::new();
		column_types.insert("name".to_owned(), DataFrameColumnType::Text);
		let dataframe = load(
			csv,
			FromCsvOptions {
				column_types: Some(column_types),
				..Default::default()
			},
		);
		let report =
			compute_report(&dataframe.view(), &ProfileSettings::default(), |_| {}).unwrap();
		assert_eq!(report.summary.n_columns, 2);
		assert_eq!(report.summary.n_rows, 4);
		assert_eq!(report.summary.n_cells, 8);
		assert_eq!(report.summary.null_count, 1);
		assert_eq!(report.summary.empty_count, 1);
		assert_eq!(report.summary.missing_count, 2);
		assert_eq!(report.summary.missing_percent, 25.0);
		assert_eq!(report.column_profiles.len(), 2);
	}

	#[test]
	fn test_empty_dataset_is_skipped() {
		let csv = "a,b\n";
		let dataframe = load(csv, FromCsvOptions::default());
		assert!(compute_report(&dataframe.view(), &ProfileSettings::default(), |_| {}).is_none());
	}

	#[test]
	fn test_report_is_idempotent() {
		let csv = "age,name\n20,alice\n25,bob\n30,carol\n";
		let dataframe = load(csv, FromCsvOptions::default());
		let view = dataframe.view();
		let settings = ProfileSettings::default();
		let a = compute_report(&view, &settings, |_| {});
		let b = compute_report(&view, &settings, |_| {});
		assert_eq!(a, b);
	}
}
