use tracing::{debug, error, info, warn};

use common::{Action, Bar, MarketEvent, OrderSide, OrderStatus, OrderUpdate, Position, TradeClosed};

use crate::config::Parameters;
use crate::decision::{DecisionEngine, ExitReason};
use crate::indicators::{IndicatorBank, IndicatorState};
use crate::position::PositionTracker;

/// An action handed to the execution client and not yet resolved.
#[derive(Debug, Clone, Copy)]
struct PendingOrder {
    action: Action,
    /// Close of the bar the action was decided on; becomes the entry price.
    price: f64,
}

/// Drives one strategy instance bar by bar.
///
/// Each bar index is evaluated at most once. While an order is pending the
/// indicators keep updating but every bar yields `Hold`.
#[derive(Debug)]
pub struct BarDispatcher {
    bank: IndicatorBank,
    engine: DecisionEngine,
    tracker: PositionTracker,
    pending: Option<PendingOrder>,
    last_index: Option<u64>,
    last_bar: Option<Bar>,
}

impl BarDispatcher {
    pub fn new(params: Parameters) -> Self {
        Self::with_engine(DecisionEngine::new(params))
    }

    pub fn with_engine(engine: DecisionEngine) -> Self {
        Self {
            bank: IndicatorBank::new(engine.params()),
            engine,
            tracker: PositionTracker::new(),
            pending: None,
            last_index: None,
            last_bar: None,
        }
    }

    pub fn params(&self) -> &Parameters {
        self.engine.params()
    }

    pub fn position(&self) -> &Position {
        self.tracker.position()
    }

    pub fn indicators(&self) -> IndicatorState {
        self.bank.state()
    }

    pub fn warmup(&self) -> usize {
        self.bank.warmup()
    }

    pub fn has_pending_order(&self) -> bool {
        self.pending.is_some()
    }

    /// Order side that realises `action` from the current position.
    pub fn order_side(&self, action: Action) -> Option<OrderSide> {
        action.order_side(self.tracker.side())
    }

    /// Evaluate a new bar. Delayed bars and any index at or below the last
    /// evaluated one are skipped silently.
    pub fn on_bar(&mut self, event: &MarketEvent) -> Action {
        if event.is_delayed() {
            return Action::Hold;
        }
        if self.last_index.is_some_and(|last| event.index <= last) {
            return Action::Hold;
        }
        self.last_index = Some(event.index);
        self.last_bar = Some(event.bar);

        let bar = &event.bar;
        let indicators = self.bank.update(bar);
        let position = *self.tracker.position();
        let action = self
            .engine
            .decide(&indicators, bar.close, &position, self.pending.is_some());

        match action {
            Action::Hold => return action,
            Action::EnterLong => log(bar, format!("Creating BUY order @ {}", bar.close)),
            Action::EnterShort => log(bar, format!("Creating SELL order @ {}", bar.close)),
            Action::Exit => {
                let reason = indicators
                    .rsi
                    .and_then(|rsi| self.engine.exit_reason(rsi, bar.close, &position))
                    .map_or_else(String::new, |r: ExitReason| format!(" ({r})"));
                log(
                    bar,
                    format!("Closing {} position @ {}{reason}", position.side, bar.close),
                );
            }
        }

        self.pending = Some(PendingOrder {
            action,
            price: bar.close,
        });
        action
    }

    /// Resolve the pending order once the execution client reports a terminal
    /// status. A completed fill moves the position; any other terminal status
    /// leaves it as it was.
    pub fn on_order_notification(&mut self, update: &OrderUpdate) {
        if !update.status.is_terminal() {
            debug!(order_id = %update.order_id, status = %update.status, "Order in flight");
            return;
        }

        let Some(pending) = self.pending.take() else {
            warn!(
                order_id = %update.order_id,
                status = %update.status,
                "Terminal order notification without a pending order"
            );
            return;
        };

        match update.status {
            OrderStatus::Completed => {
                if let Err(e) = self.tracker.apply_action(
                    pending.action,
                    pending.price,
                    update.filled_quantity,
                ) {
                    error!(order_id = %update.order_id, error = %e, "Fill could not be applied");
                    return;
                }
                info!(
                    order_id = %update.order_id,
                    action = %pending.action,
                    side = %self.tracker.side(),
                    fill_price = ?update.fill_price,
                    "Order completed"
                );
            }
            status => {
                warn!(
                    order_id = %update.order_id,
                    action = %pending.action,
                    status = %status,
                    "Order not filled"
                );
            }
        }
    }

    /// Log a closed trade. No state changes.
    pub fn on_trade_closed(&self, trade: &TradeClosed) {
        let msg = format!(
            "OPERATION PROFIT, GROSS {}, NET {}",
            trade.pnl_gross, trade.pnl_net
        );
        match &self.last_bar {
            Some(bar) => log(bar, msg),
            None => info!(pair = %trade.pair, "{msg}"),
        }
    }
}

/// `<date> <time> <message>`
fn log(bar: &Bar, msg: String) {
    info!("{} {msg}", bar.stamp());
}
