/*!
This crate provides a basic implementation of dataframes, which are two dimensional arrays of data where each column can have a different data type, like a spreadsheet. It implements only the features needed to profile a dataset: typed columns, borrowed views, and a csv loader with per-column type inference.
*/

use std::num::NonZeroUsize;

pub mod load;

pub use self::load::*;

#[derive(Debug, Clone, PartialEq)]
pub struct DataFrame {
	pub columns: Vec<DataFrameColumn>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataFrameView<'a> {
	pub columns: Vec<DataFrameColumnView<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DataFrameColumn {
	Unknown(UnknownDataFrameColumn),
	Number(NumberDataFrameColumn),
	Enum(EnumDataFrameColumn),
	Text(TextDataFrameColumn),
}

/// A column whose type could not be determined, for example because every value was a missing-value marker.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownDataFrameColumn {
	pub name: String,
	pub len: usize,
}

/// A numeric column. Values that failed to parse as finite floats are stored as NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberDataFrameColumn {
	pub name: String,
	pub data: Vec<f32>,
}

/// A categorical column. Values are indexes into `options`, offset by one. `None` marks a missing or unrecognized value.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDataFrameColumn {
	pub name: String,
	pub options: Vec<String>,
	pub data: Vec<Option<NonZeroUsize>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextDataFrameColumn {
	pub name: String,
	pub data: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DataFrameColumnView<'a> {
	Unknown(UnknownDataFrameColumnView<'a>),
	Number(NumberDataFrameColumnView<'a>),
	Enum(EnumDataFrameColumnView<'a>),
	Text(TextDataFrameColumnView<'a>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnknownDataFrameColumnView<'a> {
	pub name: &'a str,
	pub len: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberDataFrameColumnView<'a> {
	pub name: &'a str,
	pub data: &'a [f32],
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDataFrameColumnView<'a> {
	pub name: &'a str,
	pub options: &'a [String],
	pub data: &'a [Option<NonZeroUsize>],
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextDataFrameColumnView<'a> {
	pub name: &'a str,
	pub data: &'a [String],
}

#[derive(Debug, Clone, PartialEq)]
pub enum DataFrameColumnType {
	Unknown,
	Number,
	Enum { options: Vec<String> },
	Text,
}

impl DataFrame {
	pub fn new(column_names: Vec<String>, column_types: Vec<DataFrameColumnType>) -> Self {
		let columns = column_names
			.into_iter()
			.zip(column_types.into_iter())
			.map(|(column_name, column_type)| match column_type {
				DataFrameColumnType::Unknown => {
					DataFrameColumn::Unknown(UnknownDataFrameColumn::new(column_name))
				}
				DataFrameColumnType::Number => {
					DataFrameColumn::Number(NumberDataFrameColumn::new(column_name))
				}
				DataFrameColumnType::Enum { options } => {
					DataFrameColumn::Enum(EnumDataFrameColumn::new(column_name, options))
				}
				DataFrameColumnType::Text => {
					DataFrameColumn::Text(TextDataFrameColumn::new(column_name))
				}
			})
			.collect();
		Self { columns }
	}

	pub fn ncols(&self) -> usize {
		self.columns.len()
	}

	pub fn nrows(&self) -> usize {
		self.columns.first().map(|column| column.len()).unwrap_or(0)
	}

	pub fn view(&self) -> DataFrameView {
		let columns = self.columns.iter().map(|column| column.view()).collect();
		DataFrameView { columns }
	}
}

impl DataFrameColumn {
	pub fn len(&self) -> usize {
		match self {
			Self::Unknown(s) => s.len,
			Self::Number(s) => s.data.len(),
			Self::Enum(s) => s.data.len(),
			Self::Text(s) => s.data.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		match self {
			Self::Unknown(s) => s.len == 0,
			Self::Number(s) => s.data.is_empty(),
			Self::Enum(s) => s.data.is_empty(),
			Self::Text(s) => s.data.is_empty(),
		}
	}

	pub fn name(&self) -> &str {
		match self {
			Self::Unknown(s) => s.name.as_str(),
			Self::Number(s) => s.name.as_str(),
			Self::Enum(s) => s.name.as_str(),
			Self::Text(s) => s.name.as_str(),
		}
	}

	pub fn as_number(&self) -> Option<&NumberDataFrameColumn> {
		match self {
			Self::Number(s) => Some(s),
			_ => None,
		}
	}

	pub fn view(&self) -> DataFrameColumnView {
		match self {
			Self::Unknown(column) => DataFrameColumnView::Unknown(column.view()),
			Self::Number(column) => DataFrameColumnView::Number(column.view()),
			Self::Enum(column) => DataFrameColumnView::Enum(column.view()),
			Self::Text(column) => DataFrameColumnView::Text(column.view()),
		}
	}
}

impl UnknownDataFrameColumn {
	pub fn new(name: String) -> Self {
		Self { name, len: 0 }
	}

	pub fn view(&self) -> UnknownDataFrameColumnView {
		UnknownDataFrameColumnView {
			name: &self.name,
			len: self.len,
		}
	}
}

impl NumberDataFrameColumn {
	pub fn new(name: String) -> Self {
		Self {
			name,
			data: Vec::new(),
		}
	}

	pub fn view(&self) -> NumberDataFrameColumnView {
		NumberDataFrameColumnView {
			name: &self.name,
			data: &self.data,
		}
	}
}

impl EnumDataFrameColumn {
	pub fn new(name: String, options: Vec<String>) -> Self {
		Self {
			name,
			options,
			data: Vec::new(),
		}
	}

	pub fn view(&self) -> EnumDataFrameColumnView {
		EnumDataFrameColumnView {
			name: &self.name,
			options: &self.options,
			data: &self.data,
		}
	}
}

impl TextDataFrameColumn {
	pub fn new(name: String) -> Self {
		Self {
			name,
			data: Vec::new(),
		}
	}

	pub fn view(&self) -> TextDataFrameColumnView {
		TextDataFrameColumnView {
			name: &self.name,
			data: &self.data,
		}
	}
}

impl<'a> DataFrameView<'a> {
	pub fn ncols(&self) -> usize {
		self.columns.len()
	}

	pub fn nrows(&self) -> usize {
		self.columns.first().map(|column| column.len()).unwrap_or(0)
	}

	pub fn view(&self) -> Self {
		self.clone()
	}

	/// Find a column by name.
	pub fn column(&self, name: &str) -> Option<&DataFrameColumnView<'a>> {
		self.columns.iter().find(|column| column.name() == name)
	}
}

impl<'a> DataFrameColumnView<'a> {
	pub fn len(&self) -> usize {
		match self {
			Self::Unknown(s) => s.len,
			Self::Number(s) => s.data.len(),
			Self::Enum(s) => s.data.len(),
			Self::Text(s) => s.data.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		match self {
			Self::Unknown(s) => s.len == 0,
			Self::Number(s) => s.data.is_empty(),
			Self::Enum(s) => s.data.is_empty(),
			Self::Text(s) => s.data.is_empty(),
		}
	}

	pub fn name(&self) -> &str {
		match self {
			Self::Unknown(s) => s.name,
			Self::Number(s) => s.name,
			Self::Enum(s) => s.name,
			Self::Text(s) => s.name,
		}
	}

	pub fn view(&self) -> Self {
		self.clone()
	}
}

impl<'a> EnumDataFrameColumnView<'a> {
	/// Resolve the option string for one value, `None` for missing values.
	pub fn option_for(&self, value: Option<NonZeroUsize>) -> Option<&'a str> {
		value.map(|value| self.options[value.get() - 1].as_str())
	}
}
