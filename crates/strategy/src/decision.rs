use serde::{Deserialize, Serialize};

use common::{Action, Position, PositionSide};

use crate::config::Parameters;
use crate::indicators::IndicatorState;

/// Whether the overbought-below-trend condition opens a short.
///
/// `Disabled` keeps the rule as traded: the condition is recognised but
/// produces no order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShortEntries {
    #[default]
    Disabled,
    Enabled,
}

/// Which exit condition closed a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    RsiReversion,
    ProfitTarget,
    StopLoss,
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExitReason::RsiReversion => write!(f, "rsi reversion"),
            ExitReason::ProfitTarget => write!(f, "profit target"),
            ExitReason::StopLoss => write!(f, "stop loss"),
        }
    }
}

/// The RSI rollercoaster rule: a pure function of indicators, close, and
/// position state.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    params: Parameters,
    short_entries: ShortEntries,
}

impl DecisionEngine {
    pub fn new(params: Parameters) -> Self {
        Self {
            params,
            short_entries: ShortEntries::default(),
        }
    }

    pub fn with_short_entries(mut self, short_entries: ShortEntries) -> Self {
        self.short_entries = short_entries;
        self
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    /// Next action for the bar just evaluated.
    ///
    /// Returns `Hold` while an order is pending or while any indicator is
    /// still warming up. ATR only gates readiness; no rule reads its value.
    pub fn decide(
        &self,
        indicators: &IndicatorState,
        close: f64,
        position: &Position,
        pending_order: bool,
    ) -> Action {
        if pending_order {
            return Action::Hold;
        }
        let (Some(rsi), Some(sma), Some(_)) = (indicators.rsi, indicators.sma, indicators.atr)
        else {
            return Action::Hold;
        };

        match position.side {
            PositionSide::Flat => self.entry(rsi, sma, close),
            PositionSide::Long | PositionSide::Short => {
                if self.exit_reason(rsi, close, position).is_some() {
                    Action::Exit
                } else {
                    Action::Hold
                }
            }
        }
    }

    fn entry(&self, rsi: f64, sma: f64, close: f64) -> Action {
        let p = &self.params;
        if rsi < p.rsi_low && close > sma {
            Action::EnterLong
        } else if rsi > p.rsi_high && close < sma {
            match self.short_entries {
                ShortEntries::Enabled => Action::EnterShort,
                ShortEntries::Disabled => Action::Hold,
            }
        } else {
            Action::Hold
        }
    }

    /// First exit condition met by an open position, checked in the order
    /// RSI reversion, profit target, stop loss.
    pub fn exit_reason(&self, rsi: f64, close: f64, position: &Position) -> Option<ExitReason> {
        let p = &self.params;
        let entry = position.entry_price?;
        let (reverted, target_hit, stopped) = match position.side {
            PositionSide::Long => (
                rsi > p.rsi_mid,
                close >= entry * (1.0 + p.profit_target),
                close <= entry * (1.0 - p.stop_loss),
            ),
            PositionSide::Short => (
                rsi < p.rsi_mid,
                close <= entry * (1.0 - p.profit_target),
                close >= entry * (1.0 + p.stop_loss),
            ),
            PositionSide::Flat => return None,
        };

        if reverted {
            Some(ExitReason::RsiReversion)
        } else if target_hit {
            Some(ExitReason::ProfitTarget)
        } else if stopped {
            Some(ExitReason::StopLoss)
        } else {
            None
        }
    }
}
