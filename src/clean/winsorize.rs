//! Rolling-IQR winsorization.
//!
//! For each point `i` whose trailing window `[i - W + 1, i]` is full:
//!
//! - `Q1`, `Q3` = 25th / 75th percentile of the window's *input* prices
//! - `lower = Q1 - 1.5 * IQR`, `upper = Q3 + 1.5 * IQR`
//! - the price is clamped into `[lower, upper]`
//!
//! Bounds always come from the unclipped input, never from values clipped earlier
//! in the same pass. Points before the window fills pass through untouched.

use crate::domain::PricePoint;
use crate::math::SortedWindow;

/// Tukey fence multiplier.
pub const IQR_FENCE: f64 = 1.5;

/// Bounds computed for one point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IqrBounds {
    pub q1: f64,
    pub q3: f64,
    pub lower: f64,
    pub upper: f64,
}

impl IqrBounds {
    fn from_quartiles(q1: f64, q3: f64) -> Self {
        let iqr = q3 - q1;
        Self {
            q1,
            q3,
            lower: q1 - IQR_FENCE * iqr,
            upper: q3 + IQR_FENCE * iqr,
        }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.lower, self.upper)
    }
}

/// Per-point bounds; `None` while the trailing window is not yet full.
pub fn rolling_iqr_bounds(prices: &[f64], window: usize) -> Vec<Option<IqrBounds>> {
    let mut win = SortedWindow::new(window);
    prices
        .iter()
        .map(|&p| {
            win.push(p);
            if !win.is_full() {
                return None;
            }
            let q1 = win.quantile(0.25)?;
            let q3 = win.quantile(0.75)?;
            Some(IqrBounds::from_quartiles(q1, q3))
        })
        .collect()
}

/// Clamp every point into its rolling IQR fence.
///
/// Returns the new points and how many prices actually changed. Row count and
/// dates are preserved.
pub fn winsorize(points: &[PricePoint], window: usize) -> (Vec<PricePoint>, usize) {
    let prices: Vec<f64> = points.iter().map(|p| p.price).collect();
    let bounds = rolling_iqr_bounds(&prices, window);

    let mut clipped = 0usize;
    let out = points
        .iter()
        .zip(bounds)
        .map(|(p, b)| match b {
            Some(b) => {
                let price = b.clamp(p.price);
                if price != p.price {
                    clipped += 1;
                }
                PricePoint { date: p.date, price }
            }
            None => *p,
        })
        .collect();
    (out, clipped)
}
