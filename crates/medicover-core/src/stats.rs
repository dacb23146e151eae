//! Coverage area summary shown under the confirm button.

use serde::{Deserialize, Serialize};

use crate::fmt::format_area;

/// Summary of the region areas (m²) produced for one map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub struct CoverageStats {
    /// Number of regions the summary was computed from.
    pub count: usize,
    pub biggest: f64,
    pub median: f64,
    pub mean: f64,
}

impl CoverageStats {
    /// Computes the summary. Non-finite and negative areas are skipped;
    /// returns `None` when nothing is left.
    pub fn from_areas(areas: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = areas
            .iter()
            .copied()
            .filter(|a| a.is_finite() && *a >= 0.0)
            .collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let biggest = sorted[count - 1];
        let median = if count % 2 == 1 {
            sorted[count / 2]
        } else {
            (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
        };
        let mean = sorted.iter().sum::<f64>() / count as f64;

        Some(CoverageStats {
            count,
            biggest,
            median,
            mean,
        })
    }

    /// Panel lines: biggest, median, mean.
    pub fn lines(&self) -> [String; 3] {
        [
            format!("Biggest Coverage Area: {}", format_area(self.biggest)),
            format!("Median Coverage Area: {}", format_area(self.median)),
            format!("Mean Coverage Area: {}", format_area(self.mean)),
        ]
    }
}
