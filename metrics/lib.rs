/*!
This crate provides the numeric building blocks for descriptive statistics: streaming mean/variance merging and central-moment based shape measures.
*/

mod moments;

pub use self::moments::{
	m2_to_sample_variance, merge_mean_m2, sample_excess_kurtosis, sample_skewness,
};
