use serde::{Deserialize, Serialize};

pub type Price = i32;
pub type Quantity = u32;
pub type OrderId = u64;
pub type Symbol = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    GoodTillCancel,
    FillAndKill,
}

// Inbound commands (feed -> engine)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OrderCommand {
    PlaceOrder(Order),
    CancelOrder(CancelOrder),
    ModifyOrder(OrderModify),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub order_type: OrderType,
    pub order_id: OrderId,
    pub symbol: Symbol,
    pub side: Side,
    pub price: Price,
    pub quantity: Quantity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelOrder {
    pub symbol: Symbol,
    pub order_id: OrderId,
}

/// Amendment command. The replacement order keeps the type of the order it
/// replaces but re-enters its price level at the tail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderModify {
    pub order_id: OrderId,
    pub symbol: Symbol,
    pub side: Side,
    pub price: Price,
    pub quantity: Quantity,
}

/// One leg of a match. The price is the resting limit of that leg, not the
/// price the aggressor crossed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeInfo {
    pub order_id: OrderId,
    pub price: Price,
    pub quantity: Quantity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub bid: TradeInfo,
    pub ask: TradeInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelInfo {
    pub price: Price,
    pub quantity: Quantity,
}

/// Aggregated per-level view of one book: bids highest price first, asks
/// lowest price first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookLevels {
    pub bids: Vec<LevelInfo>,
    pub asks: Vec<LevelInfo>,
}

impl Order {
    pub fn new(
        order_type: OrderType,
        order_id: OrderId,
        symbol: Symbol,
        side: Side,
        price: Price,
        quantity: Quantity,
    ) -> Self {
        Self {
            order_type,
            order_id,
            symbol,
            side,
            price,
            quantity,
        }
    }
}
