//! https://en.wikipedia.org/wiki/Algorithms_for_calculating_variance#Parallel_algorithm

use num_traits::cast::ToPrimitive;

/// combine two separate means and variances into a single mean and variance
/// useful when accumulating over a histogram of (value, count) buckets
pub fn merge_mean_m2(
	n_a: u64,
	mean_a: f64,
	m2_a: f64,
	n_b: u64,
	mean_b: f64,
	m2_b: f64,
) -> (f64, f64) {
	let n_a = n_a.to_f64().unwrap();
	let n_b = n_b.to_f64().unwrap();
	(
		(((n_a * mean_a) + (n_b * mean_b)) / (n_a + n_b)),
		m2_a + m2_b + (mean_b - mean_a) * (mean_b - mean_a) * (n_a * n_b / (n_a + n_b)),
	)
}

/// sample variance, m2 / (n - 1), `None` when n < 2
pub fn m2_to_sample_variance(m2: f64, n: u64) -> Option<f32> {
	if n < 2 {
		return None;
	}
	Some((m2 / (n - 1).to_f64().unwrap()) as f32)
}

/// Sample-adjusted Fisher-Pearson skewness from the second and third central moment sums,
/// where m2 = sum((x - mean)^2) and m3 = sum((x - mean)^3).
/// `None` when n < 3 or the variance is zero.
pub fn sample_skewness(n: u64, m2: f64, m3: f64) -> Option<f32> {
	if n < 3 || m2 <= 0.0 {
		return None;
	}
	let n = n.to_f64().unwrap();
	let g1 = (m3 / n) / (m2 / n).powf(1.5);
	let skewness = (n * (n - 1.0)).sqrt() / (n - 2.0) * g1;
	if skewness.is_finite() {
		Some(skewness as f32)
	} else {
		None
	}
}

/// Sample-adjusted excess kurtosis from the second and fourth central moment sums,
/// where m2 = sum((x - mean)^2) and m4 = sum((x - mean)^4).
/// `None` when n < 4 or the variance is zero.
pub fn sample_excess_kurtosis(n: u64, m2: f64, m4: f64) -> Option<f32> {
	if n < 4 || m2 <= 0.0 {
		return None;
	}
	let n = n.to_f64().unwrap();
	let g2 = (m4 / n) / (m2 / n).powi(2) - 3.0;
	let kurtosis = ((n + 1.0) * g2 + 6.0) * (n - 1.0) / ((n - 2.0) * (n - 3.0));
	if kurtosis.is_finite() {
		Some(kurtosis as f32)
	} else {
		None
	}
}

#[test]
fn test_merge_mean_m2() {
	// accumulate [1, 2, 3, 4, 5] one value at a time
	let mut n = 0u64;
	let mut mean = 0.0;
	let mut m2 = 0.0;
	for value in 1..=5 {
		let (new_mean, new_m2) = merge_mean_m2(n, mean, m2, 1, value as f64, 0.0);
		mean = new_mean;
		m2 = new_m2;
		n += 1;
	}
	assert!((mean - 3.0).abs() < 1e-12);
	assert!((m2 - 10.0).abs() < 1e-9);
	assert!((m2_to_sample_variance(m2, n).unwrap() - 2.5).abs() < 1e-6);
}

#[test]
fn test_sample_skewness() {
	// [1, 2, 3, 4, 10]: mean 4, m2 = 50, m3 = 180
	let skewness = sample_skewness(5, 50.0, 180.0).unwrap();
	assert!((skewness - 1.6971).abs() < 1e-3);
	// symmetric data has zero skewness
	let skewness = sample_skewness(5, 10.0, 0.0).unwrap();
	assert!(skewness.abs() < 1e-6);
	// undefined below three values or with zero variance
	assert!(sample_skewness(2, 1.0, 1.0).is_none());
	assert!(sample_skewness(5, 0.0, 0.0).is_none());
}

#[test]
fn test_sample_excess_kurtosis() {
	// [1, 2, 3, 4, 5]: mean 3, m2 = 10, m4 = 34
	let kurtosis = sample_excess_kurtosis(5, 10.0, 34.0).unwrap();
	assert!((kurtosis - (-1.2)).abs() < 1e-5);
	assert!(sample_excess_kurtosis(3, 1.0, 1.0).is_none());
	assert!(sample_excess_kurtosis(5, 0.0, 0.0).is_none());
}
