use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use actix_ws::{Message, MessageStream, Session};
use engine_core::registry::OrderBookRegistry;
use market_data::fanout::TradeFeed;
use market_data::render::{snapshot_frame, trade_frame};
use protocol::Symbol;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, PartialEq, Eq)]
pub enum SessionRequest {
    Subscribe(Symbol),
    Unsubscribe(Symbol),
}

impl SessionRequest {
    /// `subscribe:<symbol>` or `unsubscribe:<symbol>`, case-sensitive. The
    /// symbol is everything after the first colon; anything else is not a
    /// request.
    pub fn parse(text: &str) -> Option<Self> {
        if let Some(symbol) = text.strip_prefix("subscribe:") {
            Some(Self::Subscribe(symbol.to_string()))
        } else if let Some(symbol) = text.strip_prefix("unsubscribe:") {
            Some(Self::Unsubscribe(symbol.to_string()))
        } else {
            None
        }
    }
}

/// One task per connection. All reads and writes for the connection happen
/// here, so per-session state needs no locking; the session ends on the
/// first failed write, Close frame, or transport error.
pub(crate) async fn run_session(
    mut session: Session,
    mut msg_stream: MessageStream,
    registry: Arc<OrderBookRegistry>,
    feed: TradeFeed,
) {
    let mut subscriptions: HashSet<Symbol> = HashSet::new();
    let mut trade_rx = feed.subscribe();
    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);

    loop {
        tokio::select! {
            message = msg_stream.recv() => match message {
                Some(Ok(Message::Text(text))) => {
                    if !handle_request(&text, &mut session, &mut subscriptions, &registry).await {
                        break;
                    }
                }
                Some(Ok(Message::Ping(bytes))) => {
                    if session.pong(&bytes).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(error)) => {
                    debug!(%error, "websocket protocol error");
                    break;
                }
            },
            event = trade_rx.recv() => match event {
                Ok(event) => {
                    if subscriptions.contains(&event.symbol)
                        && session.text(trade_frame(&event.trades)).await.is_err()
                    {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "session fell behind the trade feed");
                }
                Err(RecvError::Closed) => break,
            },
            _ = heartbeat.tick() => {
                if session.ping(b"").await.is_err() {
                    break;
                }
            }
        }
    }

    let _ = session.close(None).await;
}

/// Returns false when the client is gone and the session should tear down.
/// Unknown commands and unregistered symbols are silently ignored.
async fn handle_request(
    text: &str,
    session: &mut Session,
    subscriptions: &mut HashSet<Symbol>,
    registry: &OrderBookRegistry,
) -> bool {
    match SessionRequest::parse(text) {
        Some(SessionRequest::Subscribe(symbol)) => {
            let Some(book) = registry.get_book(&symbol) else {
                return true;
            };

            let depth = registry.get_depth(&symbol);
            let levels = book.lock().unwrap().depth();
            subscriptions.insert(symbol);

            session.text(snapshot_frame(&levels, depth)).await.is_ok()
        }
        Some(SessionRequest::Unsubscribe(symbol)) => {
            subscriptions.remove(&symbol);
            true
        }
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subscribe_and_unsubscribe() {
        assert_eq!(
            SessionRequest::parse("subscribe:META"),
            Some(SessionRequest::Subscribe("META".to_string()))
        );
        assert_eq!(
            SessionRequest::parse("unsubscribe:META"),
            Some(SessionRequest::Unsubscribe("META".to_string()))
        );
    }

    #[test]
    fn symbol_is_everything_after_the_colon() {
        // Symbols are opaque bytes; embedded colons belong to the symbol.
        assert_eq!(
            SessionRequest::parse("subscribe:SOL/USD:spot"),
            Some(SessionRequest::Subscribe("SOL/USD:spot".to_string()))
        );
    }

    #[test]
    fn rejects_malformed_requests() {
        assert_eq!(SessionRequest::parse("subscribe META"), None);
        assert_eq!(SessionRequest::parse("SUBSCRIBE:META"), None);
        assert_eq!(SessionRequest::parse("resubscribe:META"), None);
        assert_eq!(SessionRequest::parse(""), None);
    }

    #[test]
    fn empty_symbol_is_still_a_request() {
        // An empty symbol parses; it simply never matches a registered book.
        assert_eq!(
            SessionRequest::parse("subscribe:"),
            Some(SessionRequest::Subscribe(String::new()))
        );
    }
}
