/// RSI (Relative Strength Index) indicator.
///
/// Uses Wilder's smoothed moving average (same as TradingView / standard RSI),
/// seeded with the simple mean of the first `period` close-to-close changes.
/// Yields `None` until `period + 1` closes have been seen.
#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    prev_close: Option<f64>,
    changes_seen: usize,
    avg_gain: f64,
    avg_loss: f64,
    value: Option<f64>,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 2, "RSI period must be >= 2");
        Self {
            period,
            prev_close: None,
            changes_seen: 0,
            avg_gain: 0.0,
            avg_loss: 0.0,
            value: None,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    /// Feed the next close and return the updated RSI.
    pub fn next(&mut self, close: f64) -> Option<f64> {
        let Some(prev) = self.prev_close.replace(close) else {
            return None;
        };

        let (gain, loss) = split_change(close - prev);
        let period = self.period as f64;
        self.changes_seen += 1;

        if self.changes_seen <= self.period {
            // Accumulate the seed window; averaged once it is full.
            self.avg_gain += gain;
            self.avg_loss += loss;
            if self.changes_seen == self.period {
                self.avg_gain /= period;
                self.avg_loss /= period;
                self.value = Some(rsi_from_averages(self.avg_gain, self.avg_loss));
            }
        } else {
            self.avg_gain = (self.avg_gain * (period - 1.0) + gain) / period;
            self.avg_loss = (self.avg_loss * (period - 1.0) + loss) / period;
            self.value = Some(rsi_from_averages(self.avg_gain, self.avg_loss));
        }

        self.value
    }

    /// Batch RSI over a whole close series (oldest first), ignoring this
    /// instance's running state. Serves as the reference `next` is checked
    /// against; `None` with fewer than `period + 1` closes.
    pub fn compute(&self, closes: &[f64]) -> Option<f64> {
        if closes.len() <= self.period {
            return None;
        }
        let period = self.period as f64;
        let moves = closes.windows(2).map(|w| split_change(w[1] - w[0]));

        let (seed_gain, seed_loss) = moves
            .clone()
            .take(self.period)
            .fold((0.0, 0.0), |(g, l), (gain, loss)| (g + gain, l + loss));
        let (avg_gain, avg_loss) = moves.skip(self.period).fold(
            (seed_gain / period, seed_loss / period),
            |(g, l), (gain, loss)| {
                ((g * (period - 1.0) + gain) / period, (l * (period - 1.0) + loss) / period)
            },
        );

        Some(rsi_from_averages(avg_gain, avg_loss))
    }
}

/// `(gain, loss)` of one close-to-close change, both non-negative.
fn split_change(change: f64) -> (f64, f64) {
    (change.max(0.0), (-change).max(0.0))
}

/// A flat series (no gains, no losses) reads as neutral.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return if avg_gain == 0.0 { 50.0 } else { 100.0 };
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}
