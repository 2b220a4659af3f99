use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use protocol::Symbol;

use crate::orderbook::orderbook::OrderBook;

/// Shared handle to one book. The per-book mutex serializes mutators and
/// snapshot readers; the handle stays valid for as long as anyone holds it,
/// even after the symbol is unregistered.
pub type SharedOrderBook = Arc<Mutex<OrderBook>>;

struct SymbolEntry {
    book: SharedOrderBook,
    depth: usize,
}

/// Process-wide mapping from symbol to its book and dissemination depth.
///
/// Registration changes are rare; lookups happen on every feed command and
/// every snapshot, so they only take the read lock and clone an `Arc`.
pub struct OrderBookRegistry {
    books: RwLock<HashMap<Symbol, SymbolEntry>>,
}

impl OrderBookRegistry {
    pub fn new() -> Self {
        Self {
            books: RwLock::new(HashMap::new()),
        }
    }

    /// Register a symbol with an empty book. Returns false without touching
    /// the existing entry (including its depth) if the symbol is already
    /// registered.
    pub fn add_symbol(&self, symbol: &str, depth: usize) -> bool {
        let mut books = self.books.write().unwrap();

        if books.contains_key(symbol) {
            return false;
        }

        books.insert(
            symbol.to_string(),
            SymbolEntry {
                book: Arc::new(Mutex::new(OrderBook::new(symbol))),
                depth,
            },
        );

        tracing::info!(symbol, depth, "registered order book");
        true
    }

    /// Drop a symbol's book and depth. Returns false if it was not
    /// registered. Outstanding handles keep the book alive.
    pub fn remove_symbol(&self, symbol: &str) -> bool {
        let removed = self.books.write().unwrap().remove(symbol).is_some();
        if removed {
            tracing::info!(symbol, "removed order book");
        }
        removed
    }

    pub fn get_book(&self, symbol: &str) -> Option<SharedOrderBook> {
        self.books
            .read()
            .unwrap()
            .get(symbol)
            .map(|entry| Arc::clone(&entry.book))
    }

    /// Configured dissemination depth, 0 for an unregistered symbol.
    pub fn get_depth(&self, symbol: &str) -> usize {
        self.books
            .read()
            .unwrap()
            .get(symbol)
            .map(|entry| entry.depth)
            .unwrap_or(0)
    }

    pub fn symbols(&self) -> Vec<Symbol> {
        self.books.read().unwrap().keys().cloned().collect()
    }
}

impl Default for OrderBookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orderbook::orderbook::OrderEntry;
    use protocol::{OrderType, Side};

    #[test]
    fn add_symbol_is_idempotent_on_conflict() {
        let registry = OrderBookRegistry::new();

        assert!(registry.add_symbol("META", 5));
        assert!(!registry.add_symbol("META", 9));

        // The losing registration must not update the depth.
        assert_eq!(registry.get_depth("META"), 5);
    }

    #[test]
    fn unknown_symbol_lookups() {
        let registry = OrderBookRegistry::new();

        assert!(registry.get_book("AAPL").is_none());
        assert_eq!(registry.get_depth("AAPL"), 0);
        assert!(!registry.remove_symbol("AAPL"));
    }

    #[test]
    fn handle_outlives_removal() {
        let registry = OrderBookRegistry::new();
        registry.add_symbol("META", 5);

        let book = registry.get_book("META").unwrap();
        book.lock().unwrap().add_order(OrderEntry::new(
            OrderType::GoodTillCancel,
            1,
            Side::Buy,
            10,
            5,
        ));

        assert!(registry.remove_symbol("META"));
        assert!(registry.get_book("META").is_none());

        // The session that grabbed the handle before removal can finish its
        // snapshot against a live book.
        assert_eq!(book.lock().unwrap().order_count(), 1);
    }
}
