use tokio::sync::broadcast;

use protocol::Trade;

use crate::types::TradeFeedEvent;

/// Broadcast hub between the matching engine and the dissemination sessions.
///
/// One topic carries every symbol's trades; each session subscribes and
/// filters by its own subscription set. Dropping a receiver removes that
/// session from the fan-out.
#[derive(Clone)]
pub struct TradeFeed {
    sender: broadcast::Sender<TradeFeedEvent>,
}

impl TradeFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TradeFeedEvent> {
        self.sender.subscribe()
    }

    /// Publish one matching pass's trades. A send with no connected session
    /// is not an error; the batch is simply dropped.
    pub fn publish(&self, symbol: &str, trades: Vec<Trade>) {
        let _ = self.sender.send(TradeFeedEvent {
            symbol: symbol.to_string(),
            trades,
        });
    }
}
