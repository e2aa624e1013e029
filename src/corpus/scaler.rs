//! Min-max scaling for the numeric feature columns.

use serde::{Deserialize, Serialize};

/// A fitted `[min, max] -> [0, 1]` linear transform.
///
/// Values outside the fitted range are not clamped: they map linearly outside
/// `[0, 1]`. A constant column (max == min) uses a unit range, so every
/// fitted value maps to 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    pub min: f64,
    pub max: f64,
}

impl MinMaxScaler {
    /// Fits on `values`; returns `None` for an empty slice.
    pub fn fit(values: &[f64]) -> Option<Self> {
        let mut iter = values.iter().copied().filter(|v| v.is_finite());
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        Some(Self { min, max })
    }

    pub fn transform(&self, value: f64) -> f64 {
        let range = self.max - self.min;
        let range = if range == 0.0 { 1.0 } else { range };
        (value - self.min) / range
    }
}

/// The three scalers fitted at corpus build time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericScalers {
    pub calories: MinMaxScaler,
    pub time: MinMaxScaler,
    pub rating: MinMaxScaler,
}
