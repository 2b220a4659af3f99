use protocol::{Symbol, Trade};

/// One batch of trades produced by a single matching pass on one book,
/// delivered to every session in production order.
#[derive(Debug, Clone)]
pub struct TradeFeedEvent {
    pub symbol: Symbol,
    pub trades: Vec<Trade>,
}
