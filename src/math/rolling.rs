//! Trailing-window helpers.
//!
//! `SortedWindow` keeps the last `capacity` values both in arrival order and in
//! sorted order, so quantiles of the window are O(1) after an O(capacity)
//! update instead of re-sorting every step.

use std::cmp::Ordering;
use std::collections::VecDeque;

use crate::math::stats::quantile_sorted;

#[derive(Debug, Clone)]
pub struct SortedWindow {
    capacity: usize,
    arrivals: VecDeque<f64>,
    sorted: Vec<f64>,
}

impl SortedWindow {
    /// `capacity` must be >= 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            arrivals: VecDeque::with_capacity(capacity + 1),
            sorted: Vec::with_capacity(capacity + 1),
        }
    }

    /// Push a value, evicting the oldest one once the window is full.
    ///
    /// Values must not be NaN.
    pub fn push(&mut self, value: f64) {
        self.arrivals.push_back(value);
        let at = self.sorted.partition_point(|v| cmp(*v, value) == Ordering::Less);
        self.sorted.insert(at, value);

        if self.arrivals.len() > self.capacity {
            if let Some(old) = self.arrivals.pop_front() {
                let at = self.sorted.partition_point(|v| cmp(*v, old) == Ordering::Less);
                if at < self.sorted.len() {
                    self.sorted.remove(at);
                }
            }
        }
    }

    pub fn is_full(&self) -> bool {
        self.arrivals.len() == self.capacity
    }

    pub fn len(&self) -> usize {
        self.arrivals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrivals.is_empty()
    }

    /// Quantile of the current contents (see `quantile_sorted`).
    pub fn quantile(&self, q: f64) -> Option<f64> {
        quantile_sorted(&self.sorted, q)
    }
}

fn cmp(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Trailing means over `window` points; `None` until the window has filled.
///
/// Each mean is summed from its own slice (no running sum), so the value at `i`
/// is exactly the mean of `values[i + 1 - window..=i]`.
pub fn trailing_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            let slice = &values[i + 1 - window..=i];
            Some(slice.iter().sum::<f64>() / window as f64)
        })
        .collect()
}

/// Applies `f` to every full trailing window of `values`; a window containing a
/// missing value yields `None`.
pub fn trailing_apply<F>(values: &[Option<f64>], window: usize, f: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> Option<f64>,
{
    if window == 0 {
        return vec![None; values.len()];
    }
    let mut buf = Vec::with_capacity(window);
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            buf.clear();
            for v in &values[i + 1 - window..=i] {
                buf.push((*v)?);
            }
            f(&buf)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::stats::{sample_std, sorted_copy};

    #[test]
    fn sorted_window_tracks_last_values() {
        let mut w = SortedWindow::new(3);
        for v in [5.0, 1.0, 3.0] {
            w.push(v);
        }
        assert!(w.is_full());
        assert_eq!(w.quantile(0.5), Some(3.0));

        // Evicts 5.0 -> window [1, 3, 10].
        w.push(10.0);
        assert_eq!(w.len(), 3);
        assert_eq!(w.quantile(0.0), Some(1.0));
        assert_eq!(w.quantile(1.0), Some(10.0));
        assert_eq!(w.quantile(0.5), Some(3.0));
    }

    #[test]
    fn sorted_window_matches_resorting_with_duplicates() {
        let values = [4.0, 4.0, 2.0, 9.0, 4.0, 1.0, 1.0, 7.0, 3.0, 3.0];
        let cap = 4;
        let mut w = SortedWindow::new(cap);
        for (i, v) in values.iter().enumerate() {
            w.push(*v);
            let start = (i + 1).saturating_sub(cap);
            let expected = sorted_copy(&values[start..=i]);
            for q in [0.0, 0.25, 0.5, 0.75, 1.0] {
                assert_eq!(w.quantile(q), quantile_sorted(&expected, q), "i={i} q={q}");
            }
        }
    }

    #[test]
    fn trailing_mean_waits_for_full_window() {
        let out = trailing_mean(&[1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert!((out[2].unwrap() - 2.0).abs() < 1e-12);
        assert!((out[3].unwrap() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn trailing_apply_propagates_missing() {
        let values = [None, Some(1.0), Some(2.0), Some(4.0)];
        let out = trailing_apply(&values, 2, sample_std);
        assert_eq!(out[0], None);
        assert_eq!(out[1], None); // window includes the missing first value
        assert!(out[2].is_some());
        assert!(out[3].is_some());
    }
}
