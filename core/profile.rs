use num_traits::ToPrimitive;
use saeda_dataframe::{
	DataFrameColumnView, EnumDataFrameColumnView, NumberDataFrameColumnView,
	TextDataFrameColumnView, UnknownDataFrameColumnView,
};
use saeda_metrics as metrics;
use saeda_util::finite::Finite;
use std::{cmp::Ordering, collections::BTreeMap};

/// This struct contains settings used to compute column profiles.
#[derive(Clone, Debug, PartialEq)]
pub struct ProfileSettings {
	/// This is the maximum number of unique numeric values to report in the histogram.
	pub number_histogram_max_size: usize,
	/// This is the maximum number of unique categorical values to report in the histogram.
	pub category_histogram_max_size: usize,
	/// A column whose distinct-value count is at most this percent of the row count has low cardinality.
	pub cardinality_threshold_percent: f32,
	/// A column whose missing percent exceeds this value is flagged.
	pub missing_flag_threshold_percent: f32,
}

impl Default for ProfileSettings {
	fn default() -> Self {
		Self {
			number_histogram_max_size: 100,
			category_histogram_max_size: 100,
			cardinality_threshold_percent: 2.0,
			missing_flag_threshold_percent: 25.0,
		}
	}
}

/// This is an enum describing the different types of column profiles where the type matches the type of the source column.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub enum ColumnProfile {
	Unknown(UnknownColumnProfile),
	Number(NumberColumnProfile),
	Enum(EnumColumnProfile),
	Text(TextColumnProfile),
}

/// Missing-value accounting for one column. A value is missing if it was null or an empty string in the source file.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct MissingValues {
	pub count: u64,
	/// missing count relative to the column length, as a percent
	pub percent_of_column: f32,
	/// missing count relative to the whole-dataset cell count, as a percent
	pub percent_of_dataset: f32,
	pub level: MissingLevel,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub enum MissingLevel {
	Acceptable,
	Flagged,
}

impl std::fmt::Display for MissingLevel {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Acceptable => write!(f, "acceptable"),
			Self::Flagged => write!(f, "flagged"),
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub enum CardinalityLevel {
	Low,
	High,
}

impl std::fmt::Display for CardinalityLevel {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Low => write!(f, "low"),
			Self::High => write!(f, "high"),
		}
	}
}

/// This struct contains the profile for columns whose type could not be determined. Every value in such a column is missing.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct UnknownColumnProfile {
	pub column_name: String,
	pub count: u64,
	pub missing: MissingValues,
}

/// This struct contains the profile for numeric columns.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct NumberColumnProfile {
	pub column_name: String,
	pub count: u64,
	pub missing: MissingValues,
	pub unique_count: u64,
	/// distinct-value count relative to the column length, as a percent
	pub unique_percent: f32,
	/// This is a histogram mapping unique values to their counts. It is `None` if the number of unique values exceeds `number_histogram_max_size`.
	pub histogram: Option<Vec<(f32, u64)>>,
	/// This is `None` when the column has no valid values.
	pub summary: Option<NumberSummary>,
}

/// The descriptive and quantile statistics of a numeric column.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct NumberSummary {
	pub min: f32,
	pub max: f32,
	pub mean: f32,
	/// sample variance, `None` when fewer than two valid values
	pub variance: Option<f32>,
	/// sample standard deviation
	pub std: Option<f32>,
	/// the 25th percentile, by linear interpolation
	pub p25: f32,
	pub median: f32,
	/// the 75th percentile, by linear interpolation
	pub p75: f32,
	/// inter-quartile range, p75 - p25
	pub iqr: f32,
	/// half the inter-quartile range
	pub quartile_deviation: f32,
	/// sample std over mean, as a percent. `None` when the mean is zero or the ratio is not finite.
	pub coefficient_of_variation: Option<f32>,
	/// sample-adjusted Fisher-Pearson skewness, `None` when undefined
	pub skewness: Option<f32>,
	/// sample-adjusted excess kurtosis, `None` when undefined
	pub kurtosis: Option<f32>,
}

/// This struct contains the profile for enum columns.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct EnumColumnProfile {
	pub column_name: String,
	pub count: u64,
	pub missing: MissingValues,
	/// the number of options that actually occur in the column
	pub unique_count: u64,
	pub unique_percent: f32,
	pub cardinality: CardinalityLevel,
	/// The same threshold test as `cardinality`, computed independently so the two checks can diverge if their thresholds ever differ.
	pub unique_values_level: CardinalityLevel,
	pub histogram: Vec<(String, u64)>,
}

/// This struct contains the profile for text columns.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TextColumnProfile {
	pub column_name: String,
	pub count: u64,
	pub missing: MissingValues,
	pub unique_count: u64,
	pub unique_percent: f32,
	pub cardinality: CardinalityLevel,
	/// The same threshold test as `cardinality`, computed independently so the two checks can diverge if their thresholds ever differ.
	pub unique_values_level: CardinalityLevel,
	/// This is `None` if the number of unique values exceeds `category_histogram_max_size`.
	pub histogram: Option<Vec<(String, u64)>>,
}

impl ColumnProfile {
	/// Compute the profile of one column. `n_cells` is the whole-dataset cell count, used as the denominator of the dataset-relative missing percent.
	pub fn compute(
		column: &DataFrameColumnView,
		n_cells: u64,
		settings: &ProfileSettings,
	) -> Self {
		match column {
			DataFrameColumnView::Unknown(column) => {
				Self::Unknown(UnknownColumnProfile::compute(column, n_cells, settings))
			}
			DataFrameColumnView::Number(column) => {
				Self::Number(NumberColumnProfile::compute(column, n_cells, settings))
			}
			DataFrameColumnView::Enum(column) => {
				Self::Enum(EnumColumnProfile::compute(column, n_cells, settings))
			}
			DataFrameColumnView::Text(column) => {
				Self::Text(TextColumnProfile::compute(column, n_cells, settings))
			}
		}
	}

	/// Return the name of the source column.
	pub fn column_name(&self) -> &str {
		match self {
			Self::Unknown(profile) => &profile.column_name,
			Self::Number(profile) => &profile.column_name,
			Self::Enum(profile) => &profile.column_name,
			Self::Text(profile) => &profile.column_name,
		}
	}

	pub fn missing(&self) -> &MissingValues {
		match self {
			Self::Unknown(profile) => &profile.missing,
			Self::Number(profile) => &profile.missing,
			Self::Enum(profile) => &profile.missing,
			Self::Text(profile) => &profile.missing,
		}
	}
}

impl MissingValues {
	fn compute(
		missing_count: u64,
		column_len: u64,
		n_cells: u64,
		settings: &ProfileSettings,
	) -> Self {
		let percent_of_column = percent(missing_count, column_len);
		let percent_of_dataset = percent(missing_count, n_cells);
		Self {
			count: missing_count,
			percent_of_column,
			percent_of_dataset,
			level: classify_missing(percent_of_column, settings.missing_flag_threshold_percent),
		}
	}
}

impl UnknownColumnProfile {
	fn compute(
		column: &UnknownDataFrameColumnView,
		n_cells: u64,
		settings: &ProfileSettings,
	) -> Self {
		let count = column.len.to_u64().unwrap();
		Self {
			column_name: column.name.to_owned(),
			count,
			missing: MissingValues::compute(count, count, n_cells, settings),
		}
	}
}

impl NumberColumnProfile {
	fn compute(
		column: &NumberDataFrameColumnView,
		n_cells: u64,
		settings: &ProfileSettings,
	) -> Self {
		let count = column.data.len().to_u64().unwrap();
		let mut histogram: BTreeMap<Finite<f32>, usize> = BTreeMap::new();
		let mut missing_count = 0;
		for value in column.data {
			// If the value is a finite f32, add it to the histogram. Otherwise it is a missing value.
			if let Ok(value) = <Finite<f32>>::new(*value) {
				*histogram.entry(value).or_insert(0) += 1;
			} else {
				missing_count += 1;
			}
		}
		let valid_count = count - missing_count;
		let unique_count = histogram.len().to_u64().unwrap();
		let summary = summarize_histogram(&histogram, valid_count);
		let histogram_out = if histogram.len() <= settings.number_histogram_max_size {
			Some(
				histogram
					.iter()
					.map(|(value, count)| (value.get(), count.to_u64().unwrap()))
					.collect(),
			)
		} else {
			None
		};
		Self {
			column_name: column.name.to_owned(),
			count,
			missing: MissingValues::compute(missing_count, count, n_cells, settings),
			unique_count,
			unique_percent: percent(unique_count, count),
			histogram: histogram_out,
			summary,
		}
	}
}

impl EnumColumnProfile {
	fn compute(
		column: &EnumDataFrameColumnView,
		n_cells: u64,
		settings: &ProfileSettings,
	) -> Self {
		let count = column.data.len().to_u64().unwrap();
		let mut histogram = vec![0u64; column.options.len() + 1];
		for value in column.data {
			let index = value.map(|value| value.get()).unwrap_or(0);
			histogram[index] += 1;
		}
		let missing_count = histogram[0];
		let histogram: Vec<(String, u64)> = column
			.options
			.iter()
			.cloned()
			.zip(histogram.into_iter().skip(1))
			.collect();
		let unique_count = histogram
			.iter()
			.filter(|(_, count)| *count > 0)
			.count()
			.to_u64()
			.unwrap();
		Self {
			column_name: column.name.to_owned(),
			count,
			missing: MissingValues::compute(missing_count, count, n_cells, settings),
			unique_count,
			unique_percent: percent(unique_count, count),
			cardinality: classify_cardinality(
				unique_count,
				count,
				settings.cardinality_threshold_percent,
			),
			unique_values_level: classify_cardinality(
				unique_count,
				count,
				settings.cardinality_threshold_percent,
			),
			histogram,
		}
	}
}

impl TextColumnProfile {
	fn compute(
		column: &TextDataFrameColumnView,
		n_cells: u64,
		settings: &ProfileSettings,
	) -> Self {
		let count = column.data.len().to_u64().unwrap();
		let mut histogram: BTreeMap<&str, u64> = BTreeMap::new();
		let mut missing_count = 0;
		for value in column.data {
			if value.is_empty() {
				missing_count += 1;
			} else {
				*histogram.entry(value.as_str()).or_insert(0) += 1;
			}
		}
		let unique_count = histogram.len().to_u64().unwrap();
		let histogram = if histogram.len() <= settings.category_histogram_max_size {
			Some(
				histogram
					.into_iter()
					.map(|(value, count)| (value.to_owned(), count))
					.collect(),
			)
		} else {
			None
		};
		Self {
			column_name: column.name.to_owned(),
			count,
			missing: MissingValues::compute(missing_count, count, n_cells, settings),
			unique_count,
			unique_percent: percent(unique_count, count),
			cardinality: classify_cardinality(
				unique_count,
				count,
				settings.cardinality_threshold_percent,
			),
			unique_values_level: classify_cardinality(
				unique_count,
				count,
				settings.cardinality_threshold_percent,
			),
			histogram,
		}
	}
}

/// Low cardinality iff the distinct-value count is at most `threshold_percent` percent of the row count.
pub fn classify_cardinality(
	unique_count: u64,
	n_rows: u64,
	threshold_percent: f32,
) -> CardinalityLevel {
	let threshold = n_rows.to_f32().unwrap() * threshold_percent / 100.0;
	if unique_count.to_f32().unwrap() <= threshold {
		CardinalityLevel::Low
	} else {
		CardinalityLevel::High
	}
}

/// Flagged iff the missing percent exceeds `threshold_percent`.
pub fn classify_missing(percent_of_column: f32, threshold_percent: f32) -> MissingLevel {
	if percent_of_column <= threshold_percent {
		MissingLevel::Acceptable
	} else {
		MissingLevel::Flagged
	}
}

fn percent(numerator: u64, denominator: u64) -> f32 {
	if denominator == 0 {
		return 0.0;
	}
	numerator.to_f32().unwrap() * 100.0 / denominator.to_f32().unwrap()
}

/// Compute the quantile and descriptive statistics from a histogram of (value, count) buckets.
/// Quantiles use the linear-interpolation percentile method.
fn summarize_histogram(
	histogram: &BTreeMap<Finite<f32>, usize>,
	valid_count: u64,
) -> Option<NumberSummary> {
	if histogram.is_empty() {
		return None;
	}
	let min = histogram.iter().next().unwrap().0.get();
	let max = histogram.iter().next_back().unwrap().0.get();
	let total_values_count = valid_count.to_f32().unwrap();
	let quantiles: Vec<f32> = vec![0.25, 0.50, 0.75];
	// Find the index of each quantile given the total number of values in the dataset.
	let quantile_indexes: Vec<usize> = quantiles
		.iter()
		.map(|q| ((total_values_count - 1.0) * q).trunc().to_usize().unwrap())
		.collect();
	// This is the fractional part of the index used to interpolate values if the index is not an integer value.
	let quantile_fracts: Vec<f32> = quantiles
		.iter()
		.map(|q| ((total_values_count - 1.0) * q).fract())
		.collect();
	let mut quantiles: Vec<Option<f32>> = vec![None; quantiles.len()];
	let mut current_count: usize = 0;
	let mut mean = 0.0;
	let mut m2 = 0.0;
	let mut iter = histogram.iter().peekable();
	while let Some((value, count)) = iter.next() {
		let value = value.get();
		let (new_mean, new_m2) = metrics::merge_mean_m2(
			current_count.to_u64().unwrap(),
			mean,
			m2,
			count.to_u64().unwrap(),
			value.to_f64().unwrap(),
			0.0,
		);
		mean = new_mean;
		m2 = new_m2;
		current_count += count;
		let quantiles_iter = quantiles
			.iter_mut()
			.zip(quantile_indexes.iter().zip(quantile_fracts.iter()))
			.filter(|(q, (_, _))| q.is_none());
		for (quantile, (index, fract)) in quantiles_iter {
			match (current_count - 1).cmp(index) {
				Ordering::Equal => {
					if *fract > 0.0 {
						// Interpolate between two values.
						let next_value = iter.peek().unwrap().0.get();
						*quantile = Some(value * (1.0 - fract) + next_value * fract);
					} else {
						*quantile = Some(value);
					}
				}
				Ordering::Greater => *quantile = Some(value),
				Ordering::Less => {}
			}
		}
	}
	let quantiles: Vec<f32> = quantiles.into_iter().map(|q| q.unwrap()).collect();
	let p25 = quantiles[0];
	let median = quantiles[1];
	let p75 = quantiles[2];
	// Second pass for the third and fourth central moment sums now that the mean is known.
	let mut m3 = 0.0;
	let mut m4 = 0.0;
	for (value, count) in histogram.iter() {
		let deviation = value.get().to_f64().unwrap() - mean;
		let count = count.to_f64().unwrap();
		m3 += count * deviation.powi(3);
		m4 += count * deviation.powi(4);
	}
	let variance = metrics::m2_to_sample_variance(m2, valid_count);
	let std = variance.map(|variance| variance.sqrt());
	let mean = mean.to_f32().unwrap();
	let coefficient_of_variation = std.and_then(|std| {
		if mean == 0.0 {
			return None;
		}
		let coefficient_of_variation = std / mean * 100.0;
		if coefficient_of_variation.is_finite() {
			Some(coefficient_of_variation)
		} else {
			None
		}
	});
	let iqr = p75 - p25;
	Some(NumberSummary {
		min,
		max,
		mean,
		variance,
		std,
		p25,
		median,
		p75,
		iqr,
		quartile_deviation: iqr / 2.0,
		coefficient_of_variation,
		skewness: metrics::sample_skewness(valid_count, m2, m3),
		kurtosis: metrics::sample_excess_kurtosis(valid_count, m2, m4),
	})
}

#[cfg(test)]
mod test {
	use super::*;

	fn number_profile(name: &str, data: Vec<f32>) -> NumberColumnProfile {
		let n_cells = data.len().to_u64().unwrap();
		let column = saeda_dataframe::NumberDataFrameColumn {
			name: name.to_owned(),
			data,
		};
		NumberColumnProfile::compute(&column.view(), n_cells, &ProfileSettings::default())
	}

	#[test]
	fn test_quantile_scenario() {
		let profile = number_profile("age", vec![20.0, 25.0, 30.0, 35.0, 40.0]);
		let summary = profile.summary.unwrap();
		assert_eq!(summary.min, 20.0);
		assert_eq!(summary.max, 40.0);
		assert_eq!(summary.p25, 25.0);
		assert_eq!(summary.median, 30.0);
		assert_eq!(summary.p75, 35.0);
		assert_eq!(summary.iqr, 10.0);
		assert_eq!(summary.quartile_deviation, 5.0);
		assert_eq!(summary.mean, 30.0);
		assert!((summary.std.unwrap() - 62.5f32.sqrt()).abs() < 1e-4);
		let coefficient_of_variation = summary.coefficient_of_variation.unwrap();
		assert!((coefficient_of_variation - 62.5f32.sqrt() / 30.0 * 100.0).abs() < 1e-3);
	}

	#[test]
	fn test_quantile_interpolation() {
		let profile = number_profile("x", vec![1.0, 2.0, 3.0, 4.0]);
		let summary = profile.summary.unwrap();
		assert_eq!(summary.p25, 1.75);
		assert_eq!(summary.median, 2.5);
		assert_eq!(summary.p75, 3.25);
	}

	#[test]
	fn test_quantile_ordering() {
		let profile = number_profile("x", vec![9.0, 2.0, 7.0, 4.0, 4.0, 1.0, 8.0]);
		let summary = profile.summary.unwrap();
		assert!(summary.p25 <= summary.median);
		assert!(summary.median <= summary.p75);
	}

	#[test]
	fn test_missing_values_are_nulls_plus_empties() {
		let profile = number_profile("x", vec![1.0, f32::NAN, 2.0, f32::NAN, 3.0]);
		assert_eq!(profile.count, 5);
		assert_eq!(profile.missing.count, 2);
		assert_eq!(profile.missing.percent_of_column, 40.0);
		assert_eq!(profile.missing.level, MissingLevel::Flagged);
		assert_eq!(profile.unique_count, 3);
	}

	#[test]
	fn test_zero_mean_coefficient_of_variation_is_undefined() {
		let profile = number_profile("x", vec![-1.0, 0.0, 1.0]);
		let summary = profile.summary.unwrap();
		assert_eq!(summary.mean, 0.0);
		assert!(summary.coefficient_of_variation.is_none());
	}

	#[test]
	fn test_all_missing_column_has_no_summary() {
		let profile = number_profile("x", vec![f32::NAN, f32::NAN]);
		assert_eq!(profile.missing.count, 2);
		assert!(profile.summary.is_none());
		assert!(profile.histogram.unwrap().is_empty());
	}

	#[test]
	fn test_profile_is_idempotent() {
		let column = saeda_dataframe::NumberDataFrameColumn {
			name: "x".to_owned(),
			data: vec![1.0, 2.0, f32::NAN, 4.0],
		};
		let settings = ProfileSettings::default();
		let a = NumberColumnProfile::compute(&column.view(), 4, &settings);
		let b = NumberColumnProfile::compute(&column.view(), 4, &settings);
		assert_eq!(a, b);
	}

	#[test]
	fn test_text_missing_scenario() {
		// 3 of 10 rows are empty strings: missing 30%, which exceeds the 25% threshold
		let data: Vec<String> = vec!["a", "b", "", "c", "d", "", "e", "f", "", "g"]
			.into_iter()
			.map(|value| value.to_owned())
			.collect();
		let column = saeda_dataframe::TextDataFrameColumn {
			name: "notes".to_owned(),
			data,
		};
		let profile = TextColumnProfile::compute(&column.view(), 10, &ProfileSettings::default());
		assert_eq!(profile.missing.count, 3);
		assert_eq!(profile.missing.percent_of_column, 30.0);
		assert_eq!(profile.missing.level, MissingLevel::Flagged);
		assert_eq!(profile.unique_count, 7);
		assert_eq!(profile.cardinality, CardinalityLevel::High);
	}

	#[test]
	fn test_cardinality_classification_is_monotonic() {
		let n_rows = 1000;
		let mut last_was_high = false;
		for unique_count in 0..100 {
			let level = classify_cardinality(unique_count, n_rows, 2.0);
			if last_was_high {
				assert_eq!(level, CardinalityLevel::High);
			}
			last_was_high = level == CardinalityLevel::High;
		}
		assert_eq!(classify_cardinality(20, 1000, 2.0), CardinalityLevel::Low);
		assert_eq!(classify_cardinality(21, 1000, 2.0), CardinalityLevel::High);
	}

	#[test]
	fn test_enum_profile() {
		use std::num::NonZeroUsize;
		let column = saeda_dataframe::EnumDataFrameColumn {
			name: "color".to_owned(),
			options: vec!["blue".to_owned(), "green".to_owned(), "red".to_owned()],
			data: vec![
				NonZeroUsize::new(1),
				NonZeroUsize::new(3),
				None,
				NonZeroUsize::new(1),
			],
		};
		let profile = EnumColumnProfile::compute(&column.view(), 4, &ProfileSettings::default());
		assert_eq!(profile.missing.count, 1);
		assert_eq!(profile.unique_count, 2);
		assert_eq!(
			profile.histogram,
			vec![
				("blue".to_owned(), 2),
				("green".to_owned(), 0),
				("red".to_owned(), 1),
			]
		);
		assert_eq!(profile.cardinality, CardinalityLevel::High);
	}

	#[test]
	fn test_skewness_and_kurtosis() {
		let profile = number_profile("x", vec![1.0, 2.0, 3.0, 4.0, 5.0]);
		let summary = profile.summary.unwrap();
		assert!(summary.skewness.unwrap().abs() < 1e-6);
		assert!((summary.kurtosis.unwrap() - (-1.2)).abs() < 1e-4);
	}
}
