use async_trait::async_trait;

use crate::{ExecutionEvent, Order, Result};

/// Abstraction over whatever realises the strategy's orders.
///
/// `PaperClient` implements this for simulation. The strategy core never
/// calls it directly: `StrategyRunner` submits orders and routes the returned
/// events back into the `BarDispatcher`.
#[async_trait]
pub trait ExecutionClient: Send + Sync {
    /// Submit an order and return every notification it produced, in order.
    ///
    /// The final `ExecutionEvent::Order` carries a terminal status unless the
    /// client resolves orders asynchronously.
    async fn submit_order(&self, order: &Order) -> Result<Vec<ExecutionEvent>>;

    /// Inform the client of the latest close for a pair.
    async fn mark_price(&self, _pair: &str, _price: f64) {}
}
