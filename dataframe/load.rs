use super::*;
use anyhow::Result;
use std::{
	collections::{BTreeMap, BTreeSet},
	path::Path,
};

#[derive(Clone)]
pub struct FromCsvOptions<'a> {
	pub column_types: Option<BTreeMap<String, DataFrameColumnType>>,
	pub infer_options: InferOptions,
	pub invalid_values: &'a [&'a str],
}

impl<'a> Default for FromCsvOptions<'a> {
	fn default() -> Self {
		Self {
			column_types: None,
			infer_options: InferOptions::default(),
			invalid_values: DEFAULT_INVALID_VALUES,
		}
	}
}

#[derive(Clone, Debug)]
pub struct InferOptions {
	pub enum_max_unique_values: usize,
}

impl Default for InferOptions {
	fn default() -> Self {
		Self {
			enum_max_unique_values: 100,
		}
	}
}

/// These values are the default values that are considered invalid.
pub const DEFAULT_INVALID_VALUES: &[&str] = &[
	"", "null", "NULL", "n/a", "N/A", "nan", "-nan", "NaN", "-NaN", "?",
];

impl DataFrame {
	pub fn from_path(path: &Path, options: FromCsvOptions, progress: impl Fn(u64)) -> Result<Self> {
		Self::from_csv(&mut csv::Reader::from_path(path)?, options, progress)
	}

	pub fn from_csv<R>(
		reader: &mut csv::Reader<R>,
		options: FromCsvOptions,
		progress: impl Fn(u64),
	) -> Result<Self>
	where
		R: std::io::Read + std::io::Seek,
	{
		let column_names: Vec<String> = reader
			.headers()?
			.into_iter()
			.map(|column_name| column_name.to_owned())
			.collect();
		let n_columns = column_names.len();
		let start_position = reader.position().clone();
		let infer_options = &options.infer_options;
		let invalid_values = options.invalid_values;
		let mut n_rows = None;

		#[derive(Clone, Debug)]
		enum ColumnTypeOrInferStats<'a> {
			ColumnType(DataFrameColumnType),
			InferStats(InferStats<'a>),
		}

		// Retrieve any column types present in the options.
		let mut column_types: Vec<ColumnTypeOrInferStats> = if let Some(column_types) =
			options.column_types
		{
			column_names
				.iter()
				.map(|column_name| {
					column_types
						.get(column_name)
						.map(|column_type| ColumnTypeOrInferStats::ColumnType(column_type.clone()))
						.unwrap_or_else(|| {
							ColumnTypeOrInferStats::InferStats(InferStats::new(
								infer_options,
								invalid_values,
							))
						})
				})
				.collect()
		} else {
			vec![
				ColumnTypeOrInferStats::InferStats(InferStats::new(
					infer_options,
					invalid_values
				));
				n_columns
			]
		};

		// Passing over the csv to infer column types is only necessary if one or more columns did not have its type specified.
		let needs_infer =
			column_types.iter().any(
				|column_type_or_infer_stats| match column_type_or_infer_stats {
					ColumnTypeOrInferStats::ColumnType(_) => false,
					ColumnTypeOrInferStats::InferStats(_) => true,
				},
			);

		// If the infer pass is necessary, pass over the dataset and infer the types for those columns whose types were not specified.
		let column_types: Vec<DataFrameColumnType> = if needs_infer {
			let mut infer_stats: Vec<(usize, &mut InferStats)> = column_types
				.iter_mut()
				.enumerate()
				.filter_map(
					|(index, column_type_or_infer_stats)| match column_type_or_infer_stats {
						ColumnTypeOrInferStats::ColumnType(_) => None,
						ColumnTypeOrInferStats::InferStats(infer_stats) => {
							Some((index, infer_stats))
						}
					},
				)
				.collect();
			// Iterate over each record in the csv file and update the infer stats for the columns that need to be inferred.
			let mut record = csv::StringRecord::new();
			let mut n_rows_computed = 0;
			while reader.read_record(&mut record)? {
				n_rows_computed += 1;
				for (index, infer_stats) in infer_stats.iter_mut() {
					let value = record.get(*index).unwrap_or("");
					infer_stats.update(value);
				}
			}
			n_rows = Some(n_rows_computed);
			let column_types = column_types
				.into_iter()
				.map(
					|column_type_or_infer_stats| match column_type_or_infer_stats {
						ColumnTypeOrInferStats::ColumnType(column_type) => column_type,
						ColumnTypeOrInferStats::InferStats(infer_stats) => infer_stats.finalize(),
					},
				)
				.collect();
			// After inference, return back to the beginning of the csv to load the values.
			reader.seek(start_position)?;
			column_types
		} else {
			column_types
				.into_iter()
				.map(
					|column_type_or_infer_stats| match column_type_or_infer_stats {
						ColumnTypeOrInferStats::ColumnType(column_type) => column_type,
						_ => unreachable!(),
					},
				)
				.collect()
		};

		// Create the dataframe.
		let mut dataframe = Self::new(column_names, column_types);
		// If an inference pass was done, reserve storage for the values because we know how many rows are in the csv.
		if let Some(n_rows) = n_rows {
			for column in dataframe.columns.iter_mut() {
				match column {
					DataFrameColumn::Unknown(_) => {}
					DataFrameColumn::Number(column) => column.data.reserve_exact(n_rows),
					DataFrameColumn::Enum(column) => column.data.reserve_exact(n_rows),
					DataFrameColumn::Text(column) => column.data.reserve_exact(n_rows),
				}
			}
		}
		// Build an index from option to position for each enum column so inserting values is not a linear scan.
		let options_index: Vec<Option<BTreeMap<String, usize>>> = dataframe
			.columns
			.iter()
			.map(|column| match column {
				DataFrameColumn::Enum(column) => Some(
					column
						.options
						.iter()
						.enumerate()
						.map(|(index, option)| (option.clone(), index))
						.collect(),
				),
				_ => None,
			})
			.collect();
		// Read each csv record and insert the values into the columns of the dataframe.
		let mut record = csv::ByteRecord::new();
		while reader.read_byte_record(&mut record)? {
			if let Some(position) = record.position() {
				progress(position.byte());
			}
			for ((column, options_index), value) in dataframe
				.columns
				.iter_mut()
				.zip(options_index.iter())
				.zip(record.iter())
			{
				match column {
					DataFrameColumn::Unknown(column) => {
						column.len += 1;
					}
					DataFrameColumn::Number(column) => {
						let value = match lexical::parse::<f32, &[u8]>(value) {
							Ok(value) if value.is_finite() => value,
							_ => std::f32::NAN,
						};
						column.data.push(value);
					}
					DataFrameColumn::Enum(column) => {
						let value = if let Ok(value) = std::str::from_utf8(value) {
							options_index
								.as_ref()
								.and_then(|options_index| options_index.get(value))
								.map(|position| NonZeroUsize::new(*position + 1).unwrap())
						} else {
							None
						};
						column.data.push(value);
					}
					DataFrameColumn::Text(column) => {
						column.data.push(std::str::from_utf8(value)?.to_owned())
					}
				}
			}
		}
		Ok(dataframe)
	}
}

#[derive(Clone, Debug)]
pub struct InferStats<'a> {
	infer_options: &'a InferOptions,
	invalid_values: &'a [&'a str],
	column_type: InferColumnType,
	unique_values: Option<BTreeSet<String>>,
}

#[derive(PartialEq, Clone, Copy, Debug)]
enum InferColumnType {
	Unknown,
	Number,
	Enum,
	Text,
}

impl<'a> InferStats<'a> {
	pub fn new(infer_options: &'a InferOptions, invalid_values: &'a [&'a str]) -> Self {
		Self {
			infer_options,
			invalid_values,
			column_type: InferColumnType::Unknown,
			unique_values: Some(BTreeSet::new()),
		}
	}

	pub fn update(&mut self, value: &str) {
		if self.invalid_values.contains(&value) {
			return;
		}
		if let Some(unique_values) = self.unique_values.as_mut() {
			if !unique_values.contains(value) {
				unique_values.insert(value.to_owned());
			}
			if unique_values.len() > self.infer_options.enum_max_unique_values {
				self.unique_values = None;
			}
		}
		match self.column_type {
			InferColumnType::Unknown | InferColumnType::Number => {
				if lexical::parse::<f32, &str>(value)
					.map(|v| v.is_finite())
					.unwrap_or(false)
				{
					self.column_type = InferColumnType::Number;
				} else if self.unique_values.is_some() {
					self.column_type = InferColumnType::Enum;
				} else {
					self.column_type = InferColumnType::Text;
				}
			}
			InferColumnType::Enum => {
				if self.unique_values.is_none() {
					self.column_type = InferColumnType::Text;
				}
			}
			_ => {}
		}
	}

	pub fn finalize(self) -> DataFrameColumnType {
		match self.column_type {
			InferColumnType::Unknown => DataFrameColumnType::Unknown,
			InferColumnType::Number => {
				// If all the values in a number column are zero or one then make this an enum column instead, which is how boolean columns enter the dataframe.
				if let Some(unique_values) = self.unique_values {
					let mut values = unique_values.iter();
					if values.next().map(|s| s.as_str()) == Some("0")
						&& values.next().map(|s| s.as_str()) == Some("1")
						&& values.next().is_none()
					{
						return DataFrameColumnType::Enum {
							options: unique_values.into_iter().collect(),
						};
					}
				}
				DataFrameColumnType::Number
			}
			InferColumnType::Enum => DataFrameColumnType::Enum {
				options: self.unique_values.unwrap().into_iter().collect(),
			},
			InferColumnType::Text => DataFrameColumnType::Text,
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use std::io::Cursor;

	fn load(csv: &str, options: FromCsvOptions) -> DataFrame {
		DataFrame::from_csv(&mut csv::Reader::from_reader(Cursor::new(csv)), options, |_| {})
			.unwrap()
	}

	#[test]
	fn test_infer() {
		let csv = "number,enum,text\n1,test,hello\n2,test,world\n";
		let dataframe = load(
			csv,
			FromCsvOptions {
				infer_options: InferOptions {
					enum_max_unique_values: 1,
				},
				..Default::default()
			},
		);
		assert_eq!(
			dataframe.columns[0],
			DataFrameColumn::Number(NumberDataFrameColumn {
				name: "number".to_owned(),
				data: vec![1.0, 2.0],
			})
		);
		assert_eq!(
			dataframe.columns[1],
			DataFrameColumn::Enum(EnumDataFrameColumn {
				name: "enum".to_owned(),
				options: vec!["test".to_owned()],
				data: vec![NonZeroUsize::new(1), NonZeroUsize::new(1)],
			})
		);
		assert_eq!(
			dataframe.columns[2],
			DataFrameColumn::Text(TextDataFrameColumn {
				name: "text".to_owned(),
				data: vec!["hello".to_owned(), "world".to_owned()],
			})
		);
	}

	#[test]
	fn test_column_types() {
		let csv = "number,text,enum\n1,test,hello\n2,test,world\n";
		let mut column_types = BTreeMap::new();
		column_types.insert("text".to_owned(), DataFrameColumnType::Text);
		column_types.insert(
			"enum".to_owned(),
			DataFrameColumnType::Enum {
				options: vec!["hello".to_owned(), "world".to_owned()],
			},
		);
		let dataframe = load(
			csv,
			FromCsvOptions {
				column_types: Some(column_types),
				..Default::default()
			},
		);
		assert_eq!(dataframe.columns[0].name(), "number");
		assert!(dataframe.columns[0].as_number().is_some());
		assert_eq!(
			dataframe.columns[1],
			DataFrameColumn::Text(TextDataFrameColumn {
				name: "text".to_owned(),
				data: vec!["test".to_owned(), "test".to_owned()],
			})
		);
		assert_eq!(
			dataframe.columns[2],
			DataFrameColumn::Enum(EnumDataFrameColumn {
				name: "enum".to_owned(),
				options: vec!["hello".to_owned(), "world".to_owned()],
				data: vec![NonZeroUsize::new(1), NonZeroUsize::new(2)],
			})
		);
	}

	#[test]
	fn test_invalid_values_become_nan() {
		// the second column keeps the rows with missing values from being blank lines, which the csv reader skips
		let csv = "a,b\n1,x\n,y\n2,z\nn/a,w\n3,v\n";
		let dataframe = load(csv, FromCsvOptions::default());
		let column = dataframe.columns[0].as_number().unwrap();
		assert_eq!(column.data.len(), 5);
		assert_eq!(column.data[0], 1.0);
		assert!(column.data[1].is_nan());
		assert_eq!(column.data[2], 2.0);
		assert!(column.data[3].is_nan());
		assert_eq!(column.data[4], 3.0);
	}

	#[test]
	fn test_zero_one_column_becomes_enum() {
		let csv = "flag\n0\n1\n1\n0\n";
		let dataframe = load(csv, FromCsvOptions::default());
		assert_eq!(
			dataframe.columns[0],
			DataFrameColumn::Enum(EnumDataFrameColumn {
				name: "flag".to_owned(),
				options: vec!["0".to_owned(), "1".to_owned()],
				data: vec![
					NonZeroUsize::new(1),
					NonZeroUsize::new(2),
					NonZeroUsize::new(2),
					NonZeroUsize::new(1),
				],
			})
		);
	}

	#[test]
	fn test_empty_csv_has_no_rows() {
		let csv = "a,b\n";
		let dataframe = load(csv, FromCsvOptions::default());
		assert_eq!(dataframe.ncols(), 2);
		assert_eq!(dataframe.nrows(), 0);
	}
}
