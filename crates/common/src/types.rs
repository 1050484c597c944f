use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV price observation for a fixed interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// `<date> <time>` prefix used by every strategy log line.
    pub fn stamp(&self) -> String {
        format!(
            "{} {}",
            self.timestamp.date_naive(),
            self.timestamp.time().format("%H:%M:%S")
        )
    }
}

/// A bar as delivered by the data feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketEvent {
    pub pair: String,
    /// Sequence number assigned by the feed. A replayed bar keeps its index.
    pub index: u64,
    pub bar: Bar,
    /// `Some(true)` when the feed flags the bar as delayed or non-final.
    /// `None` when the feed does not expose the capability.
    #[serde(default)]
    pub is_delayed: Option<bool>,
}

impl MarketEvent {
    pub fn is_delayed(&self) -> bool {
        self.is_delayed.unwrap_or(false)
    }
}

/// Abstract decision produced for each evaluated bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    EnterLong,
    EnterShort,
    Exit,
    Hold,
}

impl Action {
    pub fn is_hold(&self) -> bool {
        matches!(self, Action::Hold)
    }

    /// Order side that realises this action from the given position.
    /// `None` for `Hold` and for an exit while flat.
    pub fn order_side(&self, current: PositionSide) -> Option<OrderSide> {
        match (self, current) {
            (Action::EnterLong, _) => Some(OrderSide::Buy),
            (Action::EnterShort, _) => Some(OrderSide::Sell),
            (Action::Exit, PositionSide::Long) => Some(OrderSide::Sell),
            (Action::Exit, PositionSide::Short) => Some(OrderSide::Buy),
            (Action::Exit, PositionSide::Flat) | (Action::Hold, _) => None,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::EnterLong => write!(f, "ENTER_LONG"),
            Action::EnterShort => write!(f, "ENTER_SHORT"),
            Action::Exit => write!(f, "EXIT"),
            Action::Hold => write!(f, "HOLD"),
        }
    }
}

/// Exposure held by the strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionSide {
    #[default]
    Flat,
    Long,
    Short,
}

impl std::fmt::Display for PositionSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PositionSide::Flat => write!(f, "FLAT"),
            PositionSide::Long => write!(f, "LONG"),
            PositionSide::Short => write!(f, "SHORT"),
        }
    }
}

/// Current position. Flat positions carry no entry price and zero size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Position {
    pub side: PositionSide,
    pub entry_price: Option<f64>,
    pub size: f64,
}

impl Position {
    pub fn flat() -> Self {
        Self::default()
    }

    pub fn long(entry_price: f64, size: f64) -> Self {
        Self {
            side: PositionSide::Long,
            entry_price: Some(entry_price),
            size,
        }
    }

    pub fn short(entry_price: f64, size: f64) -> Self {
        Self {
            side: PositionSide::Short,
            entry_price: Some(entry_price),
            size,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.side == PositionSide::Flat
    }
}

/// Side of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

/// A market order realising one strategy action. Quantity is decided by the
/// execution client's sizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub pair: String,
    pub side: OrderSide,
    pub action: Action,
}

impl Order {
    pub fn market(pair: impl Into<String>, side: OrderSide, action: Action) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            pair: pair.into(),
            side,
            action,
        }
    }
}

/// Lifecycle states reported by the execution collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Submitted,
    Accepted,
    Completed,
    Canceled,
    Margin,
    Rejected,
}

impl OrderStatus {
    /// Terminal statuses resolve the pending order.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Submitted | OrderStatus::Accepted)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Submitted => write!(f, "submitted"),
            OrderStatus::Accepted => write!(f, "accepted"),
            OrderStatus::Completed => write!(f, "completed"),
            OrderStatus::Canceled => write!(f, "canceled"),
            OrderStatus::Margin => write!(f, "margin"),
            OrderStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Order-status notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub order_id: String,
    pub status: OrderStatus,
    /// Quantity filled so far; zero unless `status == Completed`.
    pub filled_quantity: f64,
    pub fill_price: Option<f64>,
}

impl OrderUpdate {
    pub fn status(order_id: impl Into<String>, status: OrderStatus) -> Self {
        Self {
            order_id: order_id.into(),
            status,
            filled_quantity: 0.0,
            fill_price: None,
        }
    }

    pub fn completed(order_id: impl Into<String>, quantity: f64, price: f64) -> Self {
        Self {
            order_id: order_id.into(),
            status: OrderStatus::Completed,
            filled_quantity: quantity,
            fill_price: Some(price),
        }
    }
}

/// Realised result of a closed trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeClosed {
    pub pair: String,
    pub pnl_gross: f64,
    pub pnl_net: f64,
}

/// Anything the execution collaborator reports back to the strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExecutionEvent {
    Order(OrderUpdate),
    TradeClosed(TradeClosed),
}
