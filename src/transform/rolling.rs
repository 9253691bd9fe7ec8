//! Right-aligned rolling mean.

use chrono::NaiveDate;

/// Fixed-size circular buffer holding the most recent `N` values.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    buf: Vec<f64>,
    next: usize,
    filled: usize,
}

impl RollingWindow {
    /// `size` is clamped to at least 1.
    pub fn new(size: usize) -> Self {
        Self {
            buf: vec![0.0; size.max(1)],
            next: 0,
            filled: 0,
        }
    }

    /// Push a value; returns the window mean once the window is full.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        self.buf[self.next] = value;
        self.next = (self.next + 1) % self.buf.len();
        self.filled = (self.filled + 1).min(self.buf.len());

        if self.filled < self.buf.len() {
            return None;
        }
        Some(self.buf.iter().sum::<f64>() / self.buf.len() as f64)
    }
}

/// Rolling mean of `points` over `window` points, attached to the date of the
/// window's last member.
///
/// - `window <= 1`: identity
/// - fewer points than `window`: a single point, the mean of everything,
///   dated at the last input point
/// - otherwise: `len - (window - 1)` points
pub fn rolling_average(points: &[(NaiveDate, f64)], window: usize) -> Vec<(NaiveDate, f64)> {
    let Some(&(last_date, _)) = points.last() else {
        return Vec::new();
    };

    if window <= 1 {
        return points.to_vec();
    }

    if points.len() < window {
        let mean = points.iter().map(|&(_, v)| v).sum::<f64>() / points.len() as f64;
        return vec![(last_date, mean)];
    }

    let mut rolling = RollingWindow::new(window);
    points
        .iter()
        .filter_map(|&(date, value)| rolling.push(value).map(|mean| (date, mean)))
        .collect()
}
