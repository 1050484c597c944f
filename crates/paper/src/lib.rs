use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use common::{
    Action, Error, ExecutionClient, ExecutionEvent, Order, OrderSide, OrderStatus, OrderUpdate,
    Result, TradeClosed,
};

/// How entry orders are sized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sizer {
    /// Every entry trades the same number of lots.
    FixedLot { lots: f64 },
}

impl Sizer {
    /// Build a sizer from its configured name.
    pub fn from_name(name: &str, lots: f64) -> Result<Self> {
        match name {
            "FixedLotSizer" | "fixed_lot" => {
                if lots > 0.0 {
                    Ok(Sizer::FixedLot { lots })
                } else {
                    Err(Error::Config(format!("sizer lots must be positive, got {lots}")))
                }
            }
            other => Err(Error::Config(format!("Unknown sizer '{other}'"))),
        }
    }

    fn quantity(&self) -> f64 {
        match self {
            Sizer::FixedLot { lots } => *lots,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PaperPosition {
    side: OrderSide,
    entry_price: f64,
    quantity: f64,
}

/// Execution client that fills every order at the last marked close.
///
/// Entries are sized by the configured `Sizer` and refused with a `Margin`
/// status when their notional exceeds the balance. Exits close the whole
/// position and report the realised P&L. No real orders are ever sent.
pub struct PaperClient {
    sizer: Sizer,
    balance: Arc<RwLock<f64>>,
    /// Open simulated positions, keyed by pair.
    positions: Arc<RwLock<HashMap<String, PaperPosition>>>,
    /// Latest known price per pair, updated via `mark_price`.
    prices: Arc<RwLock<HashMap<String, f64>>>,
}

impl PaperClient {
    pub fn new(sizer: Sizer, initial_balance: f64) -> Self {
        info!(?sizer, balance = initial_balance, "PaperClient initialized");
        Self {
            sizer,
            balance: Arc::new(RwLock::new(initial_balance)),
            positions: Arc::new(RwLock::new(HashMap::new())),
            prices: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn balance(&self) -> f64 {
        *self.balance.read().await
    }

    /// Open quantity for a pair, signed: positive long, negative short.
    pub async fn exposure(&self, pair: &str) -> f64 {
        self.positions
            .read()
            .await
            .get(pair)
            .map_or(0.0, |p| match p.side {
                OrderSide::Buy => p.quantity,
                OrderSide::Sell => -p.quantity,
            })
    }

    async fn open(&self, order: &Order, price: f64) -> Vec<ExecutionEvent> {
        let submitted =
            ExecutionEvent::Order(OrderUpdate::status(&order.id, OrderStatus::Submitted));
        let mut positions = self.positions.write().await;

        if positions.contains_key(&order.pair) {
            return vec![
                submitted,
                ExecutionEvent::Order(OrderUpdate::status(&order.id, OrderStatus::Rejected)),
            ];
        }

        let quantity = self.sizer.quantity();
        let notional = quantity * price;
        let balance = *self.balance.read().await;
        if notional > balance {
            debug!(pair = %order.pair, notional, balance, "Paper order refused for margin");
            return vec![
                submitted,
                ExecutionEvent::Order(OrderUpdate::status(&order.id, OrderStatus::Margin)),
            ];
        }

        positions.insert(
            order.pair.clone(),
            PaperPosition {
                side: order.side,
                entry_price: price,
                quantity,
            },
        );
        debug!(pair = %order.pair, side = %order.side, price, quantity, "Paper entry filled");

        vec![
            submitted,
            ExecutionEvent::Order(OrderUpdate::status(&order.id, OrderStatus::Accepted)),
            ExecutionEvent::Order(OrderUpdate::completed(&order.id, quantity, price)),
        ]
    }

    async fn close(&self, order: &Order, price: f64) -> Vec<ExecutionEvent> {
        let submitted =
            ExecutionEvent::Order(OrderUpdate::status(&order.id, OrderStatus::Submitted));
        let mut positions = self.positions.write().await;

        let Some(position) = positions.get(&order.pair).copied() else {
            return vec![
                submitted,
                ExecutionEvent::Order(OrderUpdate::status(&order.id, OrderStatus::Rejected)),
            ];
        };
        if position.side == order.side {
            return vec![
                submitted,
                ExecutionEvent::Order(OrderUpdate::status(&order.id, OrderStatus::Rejected)),
            ];
        }
        positions.remove(&order.pair);

        let pnl = match position.side {
            OrderSide::Buy => (price - position.entry_price) * position.quantity,
            OrderSide::Sell => (position.entry_price - price) * position.quantity,
        };
        *self.balance.write().await += pnl;
        debug!(pair = %order.pair, price, pnl, "Paper exit filled");

        vec![
            submitted,
            ExecutionEvent::Order(OrderUpdate::status(&order.id, OrderStatus::Accepted)),
            ExecutionEvent::Order(OrderUpdate::completed(&order.id, position.quantity, price)),
            ExecutionEvent::TradeClosed(TradeClosed {
                pair: order.pair.clone(),
                pnl_gross: pnl,
                pnl_net: pnl,
            }),
        ]
    }
}

#[async_trait]
impl ExecutionClient for PaperClient {
    async fn submit_order(&self, order: &Order) -> Result<Vec<ExecutionEvent>> {
        let price = self.prices.read().await.get(&order.pair).copied().ok_or_else(|| {
            Error::Execution(format!(
                "PaperClient has no price for pair '{}'. Ensure bars are flowing.",
                order.pair
            ))
        })?;

        match order.action {
            Action::EnterLong | Action::EnterShort => Ok(self.open(order, price).await),
            Action::Exit => Ok(self.close(order, price).await),
            Action::Hold => Err(Error::Execution("HOLD is not an order".into())),
        }
    }

    async fn mark_price(&self, pair: &str, price: f64) {
        self.prices.write().await.insert(pair.to_string(), price);
    }
}
