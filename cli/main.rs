//! This module contains the main entrypoint to the saeda cli.

use anyhow::{anyhow, Result};
use clap::Clap;
use colored::Colorize;
use saeda_core::{
	bivariate::{candidate_columns, crosstab, route, ChartKind, ChartRequest, ContingencyTable},
	compute_report,
	config::Config,
	profile::{ColumnProfile, EnumColumnProfile, NumberColumnProfile, TextColumnProfile},
	Report,
};
use saeda_dataframe::{DataFrame, FromCsvOptions};
use saeda_util::table::Table;
use std::path::PathBuf;

#[derive(Clap)]
#[clap(
	about = "Profile a csv dataset and select charts for column pairs.",
	setting = clap::AppSettings::DisableHelpSubcommand,
)]
enum Options {
	#[clap(name = "profile")]
	Profile(Box<ProfileOptions>),
	#[clap(name = "charts")]
	Charts(Box<ChartsOptions>),
}

#[derive(Clap, Debug)]
#[clap(about = "profile the columns of a csv file")]
struct ProfileOptions {
	#[clap(short, long, about = "the path to your .csv file")]
	file: PathBuf,
	#[clap(short, long, about = "profile only this column")]
	column: Option<String>,
	#[clap(long, about = "the path to a yaml config file")]
	config: Option<PathBuf>,
	#[clap(long, about = "print the report as json")]
	json: bool,
}

#[derive(Clap, Debug)]
#[clap(about = "select charts for column pairs")]
struct ChartsOptions {
	#[clap(short, long, about = "the path to your .csv file")]
	file: PathBuf,
	#[clap(short, long, about = "the name of the output column")]
	target: String,
	#[clap(short, long, about = "pair only this column with the target")]
	column: Option<String>,
	#[clap(long, about = "the path to a yaml config file")]
	config: Option<PathBuf>,
	#[clap(long, about = "print the chart requests as json")]
	json: bool,
}

fn main() {
	let options = Options::parse();
	let result = match options {
		Options::Profile(options) => cli_profile(*options),
		Options::Charts(options) => cli_charts(*options),
	};
	if let Err(error) = result {
		eprintln!("{}: {}", "error".red().bold(), error);
		std::process::exit(1);
	}
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
	match path {
		Some(path) => Config::from_path(path),
		None => Ok(Config::default()),
	}
}

fn load_dataframe(file: &PathBuf, config: &Config) -> Result<DataFrame> {
	let options = FromCsvOptions {
		column_types: config.dataframe_column_types(),
		infer_options: config.infer_options(),
		..Default::default()
	};
	DataFrame::from_path(file, options, |_| {})
}

fn cli_profile(options: ProfileOptions) -> Result<()> {
	let config = load_config(options.config.as_ref())?;
	let dataframe = load_dataframe(&options.file, &config)?;
	let report = match compute_report(&dataframe.view(), &config.profile_settings(), |_| {}) {
		Some(report) => report,
		None => {
			eprintln!("the dataset has no rows, profiling skipped");
			return Ok(());
		}
	};
	let report = match options.column.as_deref() {
		Some(column_name) => {
			let column_profiles: Vec<ColumnProfile> = report
				.column_profiles
				.into_iter()
				.filter(|profile| profile.column_name() == column_name)
				.collect();
			if column_profiles.is_empty() {
				return Err(anyhow!("no column named \"{}\"", column_name));
			}
			Report {
				summary: report.summary,
				column_profiles,
			}
		}
		None => report,
	};
	if options.json {
		println!("{}", serde_json::to_string_pretty(&report)?);
		return Ok(());
	}
	print_summary(&report);
	for profile in report.column_profiles.iter() {
		print_column_profile(profile);
	}
	Ok(())
}

fn cli_charts(options: ChartsOptions) -> Result<()> {
	let config = load_config(options.config.as_ref())?;
	let dataframe = load_dataframe(&options.file, &config)?;
	let view = dataframe.view();
	if view.column(&options.target).is_none() {
		return Err(anyhow!("no column named \"{}\"", options.target));
	}
	let candidates: Vec<String> = match options.column {
		// An explicitly requested pair bypasses the candidate gate.
		Some(column) => {
			if view.column(&column).is_none() {
				return Err(anyhow!("no column named \"{}\"", column));
			}
			vec![column]
		}
		None => {
			let candidates = candidate_columns(&view, &options.target, &config.router_settings());
			if candidates.is_empty() {
				eprintln!("too few candidate columns, no charts offered");
				return Ok(());
			}
			candidates
				.into_iter()
				.map(|candidate| candidate.to_owned())
				.collect()
		}
	};
	let mut analyses = Vec::new();
	for candidate in candidates {
		let requests = route(&view, &options.target, &candidate);
		let contingency = if requests
			.iter()
			.any(|request| request.kind == ChartKind::ContingencyTable)
		{
			crosstab(&view, &candidate, &options.target)
		} else {
			None
		};
		analyses.push((candidate, requests, contingency));
	}
	if options.json {
		let analyses: Vec<serde_json::Value> = analyses
			.into_iter()
			.map(|(candidate, requests, contingency)| {
				serde_json::json!({
					"column": candidate,
					"requests": requests,
					"contingency": contingency,
				})
			})
			.collect();
		println!("{}", serde_json::to_string_pretty(&analyses)?);
		return Ok(());
	}
	for (candidate, requests, contingency) in analyses {
		print_chart_requests(&candidate, &options.target, &requests);
		if let Some(contingency) = contingency {
			print_contingency_table(&contingency);
		}
	}
	Ok(())
}

fn print_summary(report: &Report) {
	let summary = &report.summary;
	println!("overview");
	let rows = vec![
		row("columns", summary.n_columns.to_string()),
		row("rows", summary.n_rows.to_string()),
		row("null values", summary.null_count.to_string()),
		row("empty values", summary.empty_count.to_string()),
		row("missing values", summary.missing_count.to_string()),
		row("missing percent", format!("{}%", summary.missing_percent)),
	];
	println!("{}", Table::new(&["statistic", "value"], &rows));
}

fn print_column_profile(profile: &ColumnProfile) {
	match profile {
		ColumnProfile::Unknown(profile) => {
			println!("{} (unknown)", profile.column_name);
			let rows = vec![
				row("count", profile.count.to_string()),
				row("missing values", profile.missing.count.to_string()),
			];
			println!("{}", Table::new(&["statistic", "value"], &rows));
		}
		ColumnProfile::Number(profile) => print_number_profile(profile),
		ColumnProfile::Enum(profile) => print_enum_profile(profile),
		ColumnProfile::Text(profile) => print_text_profile(profile),
	}
}

fn print_number_profile(profile: &NumberColumnProfile) {
	println!("{} (number)", profile.column_name);
	let mut rows = vec![
		row("count", profile.count.to_string()),
		row("missing values", profile.missing.count.to_string()),
		row(
			"missing percent of column",
			format!("{}%", profile.missing.percent_of_column),
		),
		row(
			"missing percent of dataset",
			format!("{}%", profile.missing.percent_of_dataset),
		),
		row("distinct values", profile.unique_count.to_string()),
		row("distinct percent", format!("{}%", profile.unique_percent)),
	];
	if let Some(summary) = &profile.summary {
		rows.push(row("min", summary.min.to_string()));
		rows.push(row("first quartile", summary.p25.to_string()));
		rows.push(row("median", summary.median.to_string()));
		rows.push(row("third quartile", summary.p75.to_string()));
		rows.push(row("max", summary.max.to_string()));
		rows.push(row("inter quartile range", summary.iqr.to_string()));
		rows.push(row(
			"quartile deviation",
			summary.quartile_deviation.to_string(),
		));
		rows.push(row("mean", summary.mean.to_string()));
		rows.push(row("standard deviation", undefined_or(summary.std)));
		rows.push(row("variance", undefined_or(summary.variance)));
		rows.push(row(
			"coefficient of variation",
			undefined_or(summary.coefficient_of_variation),
		));
		rows.push(row("skewness", undefined_or(summary.skewness)));
		rows.push(row("kurtosis", undefined_or(summary.kurtosis)));
	}
	println!("{}", Table::new(&["statistic", "value"], &rows));
}

fn print_enum_profile(profile: &EnumColumnProfile) {
	println!("{} (enum)", profile.column_name);
	let rows = category_rows(
		profile.count,
		&profile.missing,
		profile.unique_count,
		profile.unique_percent,
		profile.cardinality,
		profile.unique_values_level,
	);
	println!("{}", Table::new(&["statistic", "value"], &rows));
}

fn print_text_profile(profile: &TextColumnProfile) {
	println!("{} (text)", profile.column_name);
	let rows = category_rows(
		profile.count,
		&profile.missing,
		profile.unique_count,
		profile.unique_percent,
		profile.cardinality,
		profile.unique_values_level,
	);
	println!("{}", Table::new(&["statistic", "value"], &rows));
}

fn category_rows(
	count: u64,
	missing: &saeda_core::profile::MissingValues,
	unique_count: u64,
	unique_percent: f32,
	cardinality: saeda_core::profile::CardinalityLevel,
	unique_values_level: saeda_core::profile::CardinalityLevel,
) -> Vec<Vec<String>> {
	vec![
		row("count", count.to_string()),
		row("missing values", missing.count.to_string()),
		row(
			"missing percent of column",
			format!("{}%", missing.percent_of_column),
		),
		row("missing level", missing.level.to_string()),
		row("distinct values", unique_count.to_string()),
		row("distinct percent", format!("{}%", unique_percent)),
		row("cardinality", cardinality.to_string()),
		row("unique values level", unique_values_level.to_string()),
	]
}

fn print_chart_requests(candidate: &str, target: &str, requests: &[ChartRequest]) {
	if requests.is_empty() {
		println!("{} x {}: unsupported type combination", candidate, target);
		return;
	}
	println!("{} x {}", candidate, target);
	let rows: Vec<Vec<String>> = requests
		.iter()
		.map(|request| {
			vec![
				request.kind.to_string(),
				request.x.clone(),
				request.y.clone().unwrap_or_default(),
				request.group_by.clone().unwrap_or_default(),
			]
		})
		.collect();
	println!("{}", Table::new(&["chart", "x", "y", "group by"], &rows));
}

fn print_contingency_table(contingency: &ContingencyTable) {
	println!(
		"contingency table: {} x {}",
		contingency.x_column, contingency.y_column
	);
	let mut header: Vec<&str> = vec![""];
	header.extend(contingency.y_labels.iter().map(|label| label.as_str()));
	let rows: Vec<Vec<String>> = contingency
		.x_labels
		.iter()
		.zip(contingency.counts.iter())
		.map(|(x_label, counts)| {
			let mut row = vec![x_label.clone()];
			row.extend(counts.iter().map(|count| count.to_string()));
			row
		})
		.collect();
	println!("{}", Table::new(&header, &rows));
}

fn row(statistic: &str, value: String) -> Vec<String> {
	vec![statistic.to_owned(), value]
}

fn undefined_or(value: Option<f32>) -> String {
	value
		.map(|value| value.to_string())
		.unwrap_or_else(|| "undefined".to_owned())
}
