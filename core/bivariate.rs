use itertools::Itertools;
use saeda_dataframe::{DataFrameColumnView, DataFrameView};
use std::collections::BTreeMap;

/// This struct contains settings used to route bivariate analyses.
#[derive(Clone, Debug, PartialEq)]
pub struct RouterSettings {
	/// No candidate columns are offered unless the dataset has more than this many non-output columns. Set to zero to always offer routing.
	pub min_candidate_columns: usize,
}

impl Default for RouterSettings {
	fn default() -> Self {
		Self {
			min_candidate_columns: 10,
		}
	}
}

/// The coarse kind of a column for pairing purposes. Enum and text columns are categorical; boolean columns load as enums so they are categorical too.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub enum ColumnKind {
	Numeric,
	Categorical,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub enum ChartKind {
	BoxPlot,
	BarChart,
	CountBarChart,
	ScatterPlot,
	LinePlot,
	ContingencyTable,
	Heatmap,
}

impl std::fmt::Display for ChartKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			Self::BoxPlot => "box_plot",
			Self::BarChart => "bar_chart",
			Self::CountBarChart => "count_bar_chart",
			Self::ScatterPlot => "scatter_plot",
			Self::LinePlot => "line_plot",
			Self::ContingencyTable => "contingency_table",
			Self::Heatmap => "heatmap",
		};
		write!(f, "{}", name)
	}
}

/// A request for the presentation layer to draw one chart. The core never renders anything itself.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ChartRequest {
	pub kind: ChartKind,
	pub x: String,
	pub y: Option<String>,
	pub group_by: Option<String>,
}

/// Co-occurrence counts between two categorical columns. `counts[i][j]` is the number of rows with x label `x_labels[i]` and y label `y_labels[j]`.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ContingencyTable {
	pub x_column: String,
	pub y_column: String,
	pub x_labels: Vec<String>,
	pub y_labels: Vec<String>,
	pub counts: Vec<Vec<u64>>,
}

pub fn classify_column(column: &DataFrameColumnView) -> Option<ColumnKind> {
	match column {
		DataFrameColumnView::Unknown(_) => None,
		DataFrameColumnView::Number(_) => Some(ColumnKind::Numeric),
		DataFrameColumnView::Enum(_) => Some(ColumnKind::Categorical),
		DataFrameColumnView::Text(_) => Some(ColumnKind::Categorical),
	}
}

/// The non-output columns offered for pairing against the output column.
/// No candidates are offered at all unless there are more than `min_candidate_columns` of them.
pub fn candidate_columns<'a>(
	dataframe: &'a DataFrameView,
	output_column: &str,
	settings: &RouterSettings,
) -> Vec<&'a str> {
	let candidates: Vec<&str> = dataframe
		.columns
		.iter()
		.map(|column| column.name())
		.filter(|name| *name != output_column)
		.collect();
	if candidates.len() <= settings.min_candidate_columns {
		return Vec::new();
	}
	candidates
}

/// Select the charts for one (independent, dependent) column pair. An empty result means the pair's type combination is unsupported, which is a normal outcome.
pub fn route(
	dataframe: &DataFrameView,
	output_column: &str,
	candidate_column: &str,
) -> Vec<ChartRequest> {
	let dependent = match dataframe.column(output_column).and_then(|c| classify_column(c)) {
		Some(kind) => kind,
		None => return Vec::new(),
	};
	let independent = match dataframe
		.column(candidate_column)
		.and_then(|c| classify_column(c))
	{
		Some(kind) => kind,
		None => return Vec::new(),
	};
	let independent_name = candidate_column.to_owned();
	let dependent_name = output_column.to_owned();
	match (independent, dependent) {
		(ColumnKind::Numeric, ColumnKind::Numeric) => vec![
			ChartRequest {
				kind: ChartKind::ScatterPlot,
				x: independent_name.clone(),
				y: Some(dependent_name.clone()),
				group_by: None,
			},
			ChartRequest {
				kind: ChartKind::LinePlot,
				x: independent_name,
				y: Some(dependent_name),
				group_by: None,
			},
		],
		(ColumnKind::Numeric, ColumnKind::Categorical) => {
			grouped_charts(independent_name, dependent_name.clone(), dependent_name)
		}
		(ColumnKind::Categorical, ColumnKind::Numeric) => {
			// Same charts with the roles of x and y reversed relative to the numeric/categorical case.
			grouped_charts(dependent_name, independent_name.clone(), independent_name)
		}
		(ColumnKind::Categorical, ColumnKind::Categorical) => vec![
			ChartRequest {
				kind: ChartKind::ContingencyTable,
				x: independent_name.clone(),
				y: Some(dependent_name.clone()),
				group_by: None,
			},
			ChartRequest {
				kind: ChartKind::Heatmap,
				x: independent_name,
				y: Some(dependent_name),
				group_by: None,
			},
		],
	}
}

/// The chart set for a numeric/categorical pair: a box plot and a bar chart over the pair, and a bar chart of row counts per category.
fn grouped_charts(x: String, y: String, group_by: String) -> Vec<ChartRequest> {
	vec![
		ChartRequest {
			kind: ChartKind::BoxPlot,
			x: x.clone(),
			y: Some(y.clone()),
			group_by: Some(group_by.clone()),
		},
		ChartRequest {
			kind: ChartKind::BarChart,
			x,
			y: Some(y),
			group_by: None,
		},
		ChartRequest {
			kind: ChartKind::CountBarChart,
			x: group_by.clone(),
			y: None,
			group_by: Some(group_by),
		},
	]
}

/// Cross-tabulate two categorical columns. Returns `None` when either column is missing or not categorical. Missing cells are excluded.
pub fn crosstab(
	dataframe: &DataFrameView,
	x_column: &str,
	y_column: &str,
) -> Option<ContingencyTable> {
	let x = dataframe.column(x_column)?;
	let y = dataframe.column(y_column)?;
	let x_values = category_values(x)?;
	let y_values = category_values(y)?;
	let mut counts: BTreeMap<(&str, &str), u64> = BTreeMap::new();
	for (x_value, y_value) in x_values.iter().zip(y_values.iter()) {
		if let (Some(x_value), Some(y_value)) = (x_value, y_value) {
			*counts.entry((x_value, y_value)).or_insert(0) += 1;
		}
	}
	let x_labels: Vec<String> = counts
		.keys()
		.map(|(x_value, _)| x_value.to_string())
		.dedup()
		.collect();
	let y_labels: Vec<String> = counts
		.keys()
		.map(|(_, y_value)| y_value.to_string())
		.sorted()
		.dedup()
		.collect();
	let table = x_labels
		.iter()
		.map(|x_label| {
			y_labels
				.iter()
				.map(|y_label| {
					counts
						.get(&(x_label.as_str(), y_label.as_str()))
						.copied()
						.unwrap_or(0)
				})
				.collect()
		})
		.collect();
	Some(ContingencyTable {
		x_column: x_column.to_owned(),
		y_column: y_column.to_owned(),
		x_labels,
		y_labels,
		counts: table,
	})
}

/// The per-row category label of a categorical column, `None` per row for missing cells, and `None` overall for non-categorical columns.
fn category_values<'a>(column: &DataFrameColumnView<'a>) -> Option<Vec<Option<&'a str>>> {
	match column {
		DataFrameColumnView::Enum(column) => Some(
			column
				.data
				.iter()
				.map(|value| column.option_for(*value))
				.collect(),
		),
		DataFrameColumnView::Text(column) => Some(
			column
				.data
				.iter()
				.map(|value| {
					if value.is_empty() {
						None
					} else {
						Some(value.as_str())
					}
				})
				.collect(),
		),
		_ => None,
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use saeda_dataframe::{DataFrame, FromCsvOptions};
	use std::io::Cursor;

	fn load(csv: &str) -> DataFrame {
		DataFrame::from_csv(
			&mut csv::Reader::from_reader(Cursor::new(csv)),
			FromCsvOptions::default(),
			|_| {},
		)
		.unwrap()
	}

	#[test]
	fn test_numeric_independent_boolean_dependent() {
		// A 0/1 column loads as an enum, so it pairs as categorical.
		let csv = "age,churned\n20,0\n25,1\n30,0\n35,1\n";
		let dataframe = load(csv);
		let requests = route(&dataframe.view(), "churned", "age");
		let kinds: Vec<ChartKind> = requests.iter().map(|request| request.kind).collect();
		assert_eq!(
			kinds,
			vec![
				ChartKind::BoxPlot,
				ChartKind::BarChart,
				ChartKind::CountBarChart,
			]
		);
		assert!(!kinds.contains(&ChartKind::ScatterPlot));
		assert!(!kinds.contains(&ChartKind::LinePlot));
		assert_eq!(requests[0].x, "age");
		assert_eq!(requests[0].y.as_deref(), Some("churned"));
		assert_eq!(requests[0].group_by.as_deref(), Some("churned"));
	}

	#[test]
	fn test_numeric_numeric() {
		let csv = "height,weight\n160,60\n170,70\n180,80\n";
		let dataframe = load(csv);
		let requests = route(&dataframe.view(), "weight", "height");
		let kinds: Vec<ChartKind> = requests.iter().map(|request| request.kind).collect();
		assert_eq!(kinds, vec![ChartKind::ScatterPlot, ChartKind::LinePlot]);
		assert_eq!(requests[0].x, "height");
		assert_eq!(requests[0].y.as_deref(), Some("weight"));
	}

	#[test]
	fn test_categorical_independent_numeric_dependent_reverses_axes() {
		let csv = "color,price\nred,1\ngreen,2\nblue,3\n";
		let dataframe = load(csv);
		let requests = route(&dataframe.view(), "price", "color");
		assert_eq!(requests[0].kind, ChartKind::BoxPlot);
		// x/y are reversed relative to the numeric-independent case.
		assert_eq!(requests[0].x, "price");
		assert_eq!(requests[0].y.as_deref(), Some("color"));
		assert_eq!(requests[2].kind, ChartKind::CountBarChart);
		assert_eq!(requests[2].x, "color");
	}

	#[test]
	fn test_categorical_categorical() {
		let csv = "color,size\nred,s\ngreen,m\nblue,l\n";
		let dataframe = load(csv);
		let requests = route(&dataframe.view(), "size", "color");
		let kinds: Vec<ChartKind> = requests.iter().map(|request| request.kind).collect();
		assert_eq!(kinds, vec![ChartKind::ContingencyTable, ChartKind::Heatmap]);
	}

	#[test]
	fn test_unknown_pair_is_unsupported() {
		let csv = "a,b\n,1\n,2\n";
		let dataframe = load(csv);
		// Column a has no valid values, so its type is unknown and the pair is unsupported.
		assert!(route(&dataframe.view(), "b", "a").is_empty());
		assert!(route(&dataframe.view(), "b", "no_such_column").is_empty());
	}

	#[test]
	fn test_candidate_gate() {
		let mut csv = String::from("target");
		for index in 0..10 {
			csv.push_str(&format!(",c{}", index));
		}
		csv.push('\n');
		csv.push_str("1");
		for index in 0..10 {
			csv.push_str(&format!(",{}", index));
		}
		csv.push('\n');
		let dataframe = load(&csv);
		let view = dataframe.view();
		// Exactly ten non-output columns: the gate suppresses routing entirely.
		assert!(candidate_columns(&view, "target", &RouterSettings::default()).is_empty());
		// Lowering the threshold offers every non-output column.
		let settings = RouterSettings {
			min_candidate_columns: 0,
		};
		let candidates = candidate_columns(&view, "target", &settings);
		assert_eq!(candidates.len(), 10);
		assert!(!candidates.contains(&"target"));
	}

	#[test]
	fn test_crosstab() {
		let csv = "color,size\nred,s\nred,s\nred,m\nblue,m\n,\n";
		let dataframe = load(csv);
		let table = crosstab(&dataframe.view(), "color", "size").unwrap();
		assert_eq!(table.x_labels, vec!["blue".to_owned(), "red".to_owned()]);
		assert_eq!(table.y_labels, vec!["m".to_owned(), "s".to_owned()]);
		// row = x label, column = y label; the missing row is excluded
		assert_eq!(table.counts, vec![vec![1, 0], vec![1, 2]]);
		// numeric columns cannot be crosstabulated
		let csv = "a,b\n1,x\n2,y\n";
		let dataframe = load(csv);
		assert!(crosstab(&dataframe.view(), "a", "b").is_none());
	}
}
