//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|); the first
//! bar has no previous close and uses high-low. The first value is the mean
//! of the first `period` true ranges, then Wilder smoothing (alpha = 1/period).

use common::Bar;

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    prev_close: Option<f64>,
    bars_seen: usize,
    seed_sum: f64,
    value: Option<f64>,
}

/// True range of a bar given the previous close, if any.
pub fn true_range(high: f64, low: f64, prev_close: Option<f64>) -> f64 {
    let range = high - low;
    match prev_close {
        Some(pc) => range.max((high - pc).abs()).max((low - pc).abs()),
        None => range,
    }
}

impl Atr {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self {
            period,
            prev_close: None,
            bars_seen: 0,
            seed_sum: 0.0,
            value: None,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn next(&mut self, bar: &Bar) -> Option<f64> {
        let tr = true_range(bar.high, bar.low, self.prev_close);
        self.prev_close = Some(bar.close);
        self.bars_seen += 1;

        let period = self.period as f64;
        self.value = match self.value {
            Some(prev) => Some((prev * (period - 1.0) + tr) / period),
            None => {
                self.seed_sum += tr;
                (self.bars_seen == self.period).then(|| self.seed_sum / period)
            }
        };
        self.value
    }

    /// ATR over a full bar slice (oldest first).
    pub fn compute(&self, bars: &[Bar]) -> Option<f64> {
        if bars.len() < self.period {
            return None;
        }
        let tr: Vec<f64> = bars
            .iter()
            .enumerate()
            .map(|(i, b)| true_range(b.high, b.low, i.checked_sub(1).map(|p| bars[p].close)))
            .collect();

        let period = self.period as f64;
        let mut atr = tr[..self.period].iter().sum::<f64>() / period;
        for &value in &tr[self.period..] {
            atr = (atr * (period - 1.0) + value) / period;
        }
        Some(atr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn make_ohlc_bars(data: &[(f64, f64, f64, f64)]) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 9, 30, 0).unwrap();
        data.iter()
            .enumerate()
            .map(|(i, &(open, high, low, close))| Bar {
                timestamp: start + Duration::minutes(15 * i as i64),
                open,
                high,
                low,
                close,
                volume: 1000.0,
            })
            .collect()
    }

    #[test]
    fn true_range_basic() {
        assert_eq!(true_range(105.0, 95.0, None), 10.0);
        // max(8, |108-102|, |100-102|) = 8
        assert_eq!(true_range(108.0, 100.0, Some(102.0)), 8.0);
        // Gap up: prev close 100, bar 108..115 → 15
        assert_eq!(true_range(115.0, 108.0, Some(100.0)), 15.0);
    }

    #[test]
    fn atr_seed_is_mean_of_first_period_ranges() {
        let bars = make_ohlc_bars(&[
            (100.0, 105.0, 95.0, 102.0),  // TR = 10
            (102.0, 108.0, 100.0, 106.0), // TR = 8
            (106.0, 107.0, 98.0, 99.0),   // TR = 9
            (99.0, 101.0, 97.0, 100.0),   // TR = 4
        ]);
        let mut atr = Atr::new(3);
        assert_eq!(atr.next(&bars[0]), None);
        assert_eq!(atr.next(&bars[1]), None);
        let seeded = atr.next(&bars[2]).unwrap();
        assert!((seeded - 9.0).abs() < 1e-12);
        let smoothed = atr.next(&bars[3]).unwrap();
        assert!((smoothed - (9.0 * 2.0 + 4.0) / 3.0).abs() < 1e-12);
    }

    #[test]
    fn atr_incremental_matches_batch() {
        let bars = make_ohlc_bars(
            &(0..40)
                .map(|i| {
                    let c = 50.0 + ((i * 13) % 7) as f64;
                    (c - 0.5, c + 1.5, c - 2.0, c)
                })
                .collect::<Vec<_>>(),
        );
        let mut atr = Atr::new(5);
        for end in 1..=bars.len() {
            let incremental = atr.next(&bars[end - 1]);
            let batch = atr.compute(&bars[..end]);
            match (incremental, batch) {
                (Some(a), Some(b)) => assert!((a - b).abs() < 1e-9),
                (None, None) => {}
                other => panic!("bar {end}: warm-up mismatch {other:?}"),
            }
        }
    }
}
