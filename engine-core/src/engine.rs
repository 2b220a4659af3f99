use std::sync::Arc;

use crossbeam_channel::Receiver;
use market_data::fanout::TradeFeed;
use protocol::{OrderCommand, Trade};
use tracing::{info, warn};

use crate::orderbook::orderbook::OrderEntry;
use crate::registry::OrderBookRegistry;

/// Synchronous matching loop.
///
/// Runs in a dedicated thread and owns no book itself: every command is
/// routed by symbol through the registry and applied under that book's lock,
/// so all mutations of one book observe a total order. Trades are pushed to
/// the dissemination fan-out as they are produced.
pub struct Engine {
    registry: Arc<OrderBookRegistry>,
    feed: TradeFeed,
}

impl Engine {
    pub fn new(registry: Arc<OrderBookRegistry>, feed: TradeFeed) -> Self {
        Self { registry, feed }
    }

    /// Consume commands until every sender is gone.
    pub fn run(&mut self, order_rx: Receiver<OrderCommand>) {
        info!("matching engine started");

        while let Ok(command) = order_rx.recv() {
            self.handle_command(command);
        }

        info!("matching engine stopped");
    }

    fn handle_command(&mut self, command: OrderCommand) {
        match command {
            OrderCommand::PlaceOrder(order) => {
                let Some(book) = self.registry.get_book(&order.symbol) else {
                    warn!(symbol = %order.symbol, "order for unregistered symbol dropped");
                    return;
                };

                let entry = OrderEntry::new(
                    order.order_type,
                    order.order_id,
                    order.side,
                    order.price,
                    order.quantity,
                );

                let trades = book.lock().unwrap().add_order(entry);
                self.publish(&order.symbol, trades);
            }
            OrderCommand::CancelOrder(cancel) => {
                let Some(book) = self.registry.get_book(&cancel.symbol) else {
                    warn!(symbol = %cancel.symbol, "cancel for unregistered symbol dropped");
                    return;
                };

                book.lock().unwrap().cancel_order(cancel.order_id);
            }
            OrderCommand::ModifyOrder(modify) => {
                let Some(book) = self.registry.get_book(&modify.symbol) else {
                    warn!(symbol = %modify.symbol, "modify for unregistered symbol dropped");
                    return;
                };

                let symbol = modify.symbol.clone();
                let trades = book.lock().unwrap().modify_order(modify);
                self.publish(&symbol, trades);
            }
        }
    }

    fn publish(&self, symbol: &str, trades: Vec<Trade>) {
        if !trades.is_empty() {
            self.feed.publish(symbol, trades);
        }
    }
}
