pub mod atr;
pub mod rsi;
pub mod sma;

pub use atr::Atr;
pub use rsi::Rsi;
pub use sma::Sma;

use common::Bar;
use serde::Serialize;

use crate::config::Parameters;

/// Latest indicator readings. Each value is `None` until its warm-up is filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct IndicatorState {
    pub rsi: Option<f64>,
    pub sma: Option<f64>,
    pub atr: Option<f64>,
}

/// The three rolling indicators the strategy reads, updated once per bar.
///
/// ATR is maintained and exposed but no decision consults it.
#[derive(Debug, Clone)]
pub struct IndicatorBank {
    rsi: Rsi,
    sma: Sma,
    atr: Atr,
    state: IndicatorState,
}

impl IndicatorBank {
    pub fn new(params: &Parameters) -> Self {
        Self {
            rsi: Rsi::new(params.rsi_period),
            sma: Sma::new(params.sma_period),
            atr: Atr::new(params.atr_period),
            state: IndicatorState::default(),
        }
    }

    pub fn update(&mut self, bar: &Bar) -> IndicatorState {
        self.state = IndicatorState {
            rsi: self.rsi.next(bar.close),
            sma: self.sma.next(bar.close),
            atr: self.atr.next(bar),
        };
        self.state
    }

    pub fn state(&self) -> IndicatorState {
        self.state
    }

    /// Number of bars after which every indicator is defined.
    pub fn warmup(&self) -> usize {
        (self.rsi.period() + 1)
            .max(self.sma.period())
            .max(self.atr.period())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn bar(i: usize, close: f64) -> Bar {
        Bar {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
                + Duration::minutes(5 * i as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 10.0,
        }
    }

    #[test]
    fn bank_becomes_ready_after_warmup() {
        let params = Parameters {
            rsi_period: 4,
            sma_period: 6,
            atr_period: 3,
            ..Parameters::default()
        };
        let mut bank = IndicatorBank::new(&params);
        assert_eq!(bank.warmup(), 6);

        let states: Vec<IndicatorState> =
            (0..6).map(|i| bank.update(&bar(i, 100.0 + i as f64))).collect();

        assert!(states[..2].iter().all(|s| s.atr.is_none()));
        assert!(states[2].atr.is_some());
        assert!(states[..4].iter().all(|s| s.rsi.is_none()));
        assert!(states[4].rsi.is_some());
        assert!(states[..5].iter().all(|s| s.sma.is_none()));
        assert_eq!(states[5].sma, Some(102.5));
        assert_eq!(bank.state(), states[5]);
    }
}
