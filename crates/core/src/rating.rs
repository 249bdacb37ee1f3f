//! Title rating: the mean review score rounded to one decimal place.
//!
//! The repository layer computes the same value in SQL with
//! `ROUND(AVG(score)::numeric, 1)`.

/// Average of `scores` rounded to one decimal, or `None` without reviews.
pub fn average_score(scores: &[i32]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    let sum: i64 = scores.iter().map(|&s| i64::from(s)).sum();
    let mean = sum as f64 / scores.len() as f64;
    Some(round_one_decimal(mean))
}

/// Round half away from zero to one decimal place.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
