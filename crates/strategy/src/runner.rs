use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use common::{
    ExecutionClient, ExecutionEvent, MarketEvent, Order, OrderStatus, OrderUpdate, Position,
};

use crate::dispatcher::BarDispatcher;

/// Connects a bar channel to a `BarDispatcher` and an execution client.
///
/// Orders are awaited inline, so every notification for a bar's order is
/// applied before the next bar is read.
pub struct StrategyRunner {
    name: String,
    pair: String,
    dispatcher: BarDispatcher,
    client: Arc<dyn ExecutionClient>,
}

impl StrategyRunner {
    pub fn new(
        name: impl Into<String>,
        pair: impl Into<String>,
        dispatcher: BarDispatcher,
        client: Arc<dyn ExecutionClient>,
    ) -> Self {
        Self {
            name: name.into(),
            pair: pair.into(),
            dispatcher,
            client,
        }
    }

    pub fn dispatcher(&self) -> &BarDispatcher {
        &self.dispatcher
    }

    /// Run until the bar channel closes; returns the final position.
    pub async fn run(mut self, mut bar_rx: mpsc::Receiver<MarketEvent>) -> Position {
        info!(
            name = %self.name,
            pair = %self.pair,
            warmup = self.dispatcher.warmup(),
            "StrategyRunner running"
        );

        while let Some(event) = bar_rx.recv().await {
            if event.pair != self.pair {
                warn!(pair = %event.pair, "Bar for an unexpected pair ignored");
                continue;
            }
            self.handle_bar(&event).await;
        }

        let position = *self.dispatcher.position();
        info!(side = %position.side, entry = ?position.entry_price, "Bar channel closed");
        position
    }

    async fn handle_bar(&mut self, event: &MarketEvent) {
        if !event.is_delayed() {
            self.client.mark_price(&event.pair, event.bar.close).await;
        }

        let action = self.dispatcher.on_bar(event);
        let Some(side) = self.dispatcher.order_side(action) else {
            return;
        };

        let order = Order::market(&self.pair, side, action);
        match self.client.submit_order(&order).await {
            Ok(events) => {
                for ev in events {
                    match ev {
                        ExecutionEvent::Order(update) => {
                            self.dispatcher.on_order_notification(&update)
                        }
                        ExecutionEvent::TradeClosed(trade) => {
                            self.dispatcher.on_trade_closed(&trade)
                        }
                    }
                }
            }
            Err(e) => {
                error!(
                    pair = %order.pair,
                    side = %order.side,
                    error = %e,
                    "Order submission failed"
                );
                self.dispatcher
                    .on_order_notification(&OrderUpdate::status(&order.id, OrderStatus::Rejected));
            }
        }
    }
}
