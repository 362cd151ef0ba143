use super::{ChartError, ChartResult};
use crate::repo::student_repo::CityCount;
use serde::Serialize;

/// One pie wedge sized by `fraction` of the whole.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Wedge {
    pub label: String,
    pub count: u64,
    /// Share of the total in `0.0..=1.0`.
    pub fraction: f64,
    /// Percentage text such as `66.7%`.
    pub percent_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChart {
    pub wedges: Vec<Wedge>,
}

/// Builds one wedge per city, in the order given.
///
/// # Errors
/// - `EmptyInput` when `counts` is empty or every count is zero.
pub fn city_pie(counts: &[CityCount]) -> ChartResult<PieChart> {
    let total: u64 = counts.iter().map(|entry| entry.count).sum();
    if total == 0 {
        return Err(ChartError::EmptyInput);
    }

    let wedges = counts
        .iter()
        .map(|entry| {
            let fraction = entry.count as f64 / total as f64;
            Wedge {
                label: entry.city.clone(),
                count: entry.count,
                fraction,
                percent_label: format!("{:.1}%", fraction * 100.0),
            }
        })
        .collect();

    Ok(PieChart { wedges })
}
