use std::collections::{BTreeMap, HashMap};

use protocol::{
    BookLevels, LevelInfo, OrderId, OrderModify, OrderType, Price, Quantity, Side, Trade,
    TradeInfo,
};

use crate::{error::OrderBookError, orderbook::price_levels::PriceLevel};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderEntry {
    order_type: OrderType,
    order_id: OrderId,
    side: Side,
    price: Price,
    initial_quantity: Quantity,
    remaining_quantity: Quantity,
}

impl OrderEntry {
    #[inline]
    pub fn new(
        order_type: OrderType,
        order_id: OrderId,
        side: Side,
        price: Price,
        quantity: Quantity,
    ) -> Self {
        Self {
            order_type,
            order_id,
            side,
            price,
            initial_quantity: quantity,
            remaining_quantity: quantity,
        }
    }

    #[inline]
    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    #[inline]
    pub fn price(&self) -> Price {
        self.price
    }

    #[inline]
    pub fn order_type(&self) -> OrderType {
        self.order_type
    }

    #[inline]
    pub fn initial_quantity(&self) -> Quantity {
        self.initial_quantity
    }

    #[inline]
    pub fn remaining_quantity(&self) -> Quantity {
        self.remaining_quantity
    }

    #[inline]
    pub fn filled_quantity(&self) -> Quantity {
        self.initial_quantity - self.remaining_quantity
    }

    #[inline]
    pub fn is_filled(&self) -> bool {
        self.remaining_quantity == 0
    }

    #[inline]
    pub(crate) fn validate(&self) -> Result<(), OrderBookError> {
        if self.remaining_quantity == 0 {
            return Err(OrderBookError::InvalidOrder(
                "Quantity must be greater than 0".into(),
            ));
        }

        if self.price < 0 {
            return Err(OrderBookError::InvalidOrder(
                "Price must not be negative".into(),
            ));
        }

        Ok(())
    }

    // Filling past the remaining quantity is a matching-engine bug, never a
    // recoverable condition.
    #[inline]
    pub(crate) fn fill(&mut self, quantity: Quantity) {
        assert!(
            quantity <= self.remaining_quantity,
            "order {} cannot be filled for more than its remaining quantity",
            self.order_id
        );

        self.remaining_quantity -= quantity;
    }
}

/// Per-symbol limit order book under price-time priority.
///
/// Both ladders map price to a FIFO level; the id index maps every resting
/// order id to its order data. An order is in the id index iff it sits in
/// exactly one level queue.
pub struct OrderBook {
    symbol: String,
    bids: BTreeMap<Price, PriceLevel>,
    asks: BTreeMap<Price, PriceLevel>,

    orders: HashMap<OrderId, OrderEntry>,
}

impl OrderBook {
    #[inline]
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            orders: HashMap::new(),
        }
    }

    /// Insert an order and run the matching loop.
    ///
    /// Rejections (invalid quantity or price, duplicate resting id, a
    /// FillAndKill with nothing to cross) return an empty vec and leave the
    /// book untouched.
    pub fn add_order(&mut self, order: OrderEntry) -> Vec<Trade> {
        if let Err(error) = order.validate() {
            tracing::debug!(order_id = order.order_id, %error, "order rejected");
            return Vec::new();
        }

        if self.orders.contains_key(&order.order_id) {
            return Vec::new();
        }

        if order.order_type == OrderType::FillAndKill && !self.can_match(order.side, order.price)
        {
            return Vec::new();
        }

        let order_id = order.order_id;
        let price = order.price;
        let remaining = order.remaining_quantity;

        let ladder = match order.side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        ladder
            .entry(price)
            .or_insert_with(|| PriceLevel::new(price))
            .push_order(order_id, remaining);

        self.orders.insert(order_id, order);

        self.match_orders()
    }

    /// Remove a resting order. No-op on an unknown id.
    pub fn cancel_order(&mut self, order_id: OrderId) {
        let Some(order) = self.orders.remove(&order_id) else {
            return;
        };

        let ladder = match order.side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };

        if let Some(level) = ladder.get_mut(&order.price) {
            level.remove_order(order_id, order.remaining_quantity);
            if level.is_empty() {
                ladder.remove(&order.price);
            }
        }
    }

    /// Cancel-and-replace. The replacement keeps the existing order's type
    /// and joins the tail of its (possibly new) price level, so queue
    /// priority is always re-established from scratch.
    pub fn modify_order(&mut self, modify: OrderModify) -> Vec<Trade> {
        let Some(existing) = self.orders.get(&modify.order_id) else {
            return Vec::new();
        };
        let order_type = existing.order_type;

        self.cancel_order(modify.order_id);
        self.add_order(OrderEntry::new(
            order_type,
            modify.order_id,
            modify.side,
            modify.price,
            modify.quantity,
        ))
    }

    /// Aggregated per-level dump of the whole book, best prices first.
    pub fn depth(&self) -> BookLevels {
        let bids = self
            .bids
            .iter()
            .rev()
            .map(|(&price, level)| LevelInfo {
                price,
                quantity: level.get_total_quantity(),
            })
            .collect();

        let asks = self
            .asks
            .iter()
            .map(|(&price, level)| LevelInfo {
                price,
                quantity: level.get_total_quantity(),
            })
            .collect();

        BookLevels { bids, asks }
    }

    #[inline]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    #[inline]
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.keys().next_back().copied()
    }

    #[inline]
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.keys().next().copied()
    }

    #[inline]
    pub fn get_order(&self, order_id: OrderId) -> Option<&OrderEntry> {
        self.orders.get(&order_id)
    }

    #[inline]
    pub fn get_symbol(&self) -> &str {
        &self.symbol
    }

    fn can_match(&self, side: Side, price: Price) -> bool {
        match side {
            Side::Buy => self.best_ask().is_some_and(|best_ask| price >= best_ask),
            Side::Sell => self.best_bid().is_some_and(|best_bid| price <= best_bid),
        }
    }

    /// Consume liquidity from the tops of both ladders while the book is
    /// crossed, then cancel any FillAndKill order left at the top of either
    /// side (its limit no longer crosses, so it can never execute further).
    fn match_orders(&mut self) -> Vec<Trade> {
        let mut trades = Vec::new();

        loop {
            let Some(bid_price) = self.best_bid() else {
                break;
            };
            let Some(ask_price) = self.best_ask() else {
                break;
            };

            if bid_price < ask_price {
                break;
            }

            // Walk the two head queues until one of them drains; the outer
            // loop then re-reads the best prices.
            loop {
                let Some(bid_id) = self.bids.get(&bid_price).and_then(|level| level.front())
                else {
                    break;
                };
                let Some(ask_id) = self.asks.get(&ask_price).and_then(|level| level.front())
                else {
                    break;
                };

                let quantity = self.orders[&bid_id]
                    .remaining_quantity
                    .min(self.orders[&ask_id].remaining_quantity);

                let (bid_leg, bid_filled) = self.fill_order(bid_id, quantity);
                let (ask_leg, ask_filled) = self.fill_order(ask_id, quantity);

                trades.push(Trade {
                    bid: bid_leg,
                    ask: ask_leg,
                });

                self.settle_level(Side::Buy, bid_price, bid_id, quantity, bid_filled);
                self.settle_level(Side::Sell, ask_price, ask_id, quantity, ask_filled);
            }
        }

        if let Some(order_id) = self.top_of_book_fill_and_kill(Side::Buy) {
            self.cancel_order(order_id);
        }
        if let Some(order_id) = self.top_of_book_fill_and_kill(Side::Sell) {
            self.cancel_order(order_id);
        }

        trades
    }

    fn fill_order(&mut self, order_id: OrderId, quantity: Quantity) -> (TradeInfo, bool) {
        let order = self
            .orders
            .get_mut(&order_id)
            .expect("queue head missing from id index");

        order.fill(quantity);

        let leg = TradeInfo {
            order_id,
            price: order.price,
            quantity,
        };

        (leg, order.is_filled())
    }

    fn settle_level(
        &mut self,
        side: Side,
        price: Price,
        order_id: OrderId,
        quantity: Quantity,
        filled: bool,
    ) {
        let ladder = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        let level = ladder
            .get_mut(&price)
            .expect("crossed price level missing from ladder");

        level.fill(quantity);

        if filled {
            level.pop_front();
            self.orders.remove(&order_id);
        }

        if level.is_empty() {
            ladder.remove(&price);
        }
    }

    fn top_of_book_fill_and_kill(&self, side: Side) -> Option<OrderId> {
        let level = match side {
            Side::Buy => self.bids.values().next_back(),
            Side::Sell => self.asks.values().next(),
        }?;
        let order_id = level.front()?;

        (self.orders[&order_id].order_type == OrderType::FillAndKill).then_some(order_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gtc(order_id: OrderId, side: Side, price: Price, quantity: Quantity) -> OrderEntry {
        OrderEntry::new(OrderType::GoodTillCancel, order_id, side, price, quantity)
    }

    fn fak(order_id: OrderId, side: Side, price: Price, quantity: Quantity) -> OrderEntry {
        OrderEntry::new(OrderType::FillAndKill, order_id, side, price, quantity)
    }

    /// Structural invariants that must hold after every public operation.
    fn check_invariants(book: &OrderBook) {
        let mut queued = 0usize;

        for (ladder, side) in [(&book.bids, Side::Buy), (&book.asks, Side::Sell)] {
            for (&price, level) in ladder {
                assert!(!level.is_empty(), "empty level left at price {price}");
                assert_eq!(level.get_price(), price);

                let mut aggregate: Quantity = 0;
                for &order_id in &level.orders {
                    let order = book
                        .orders
                        .get(&order_id)
                        .expect("queued order missing from id index");
                    assert_eq!(order.side(), side);
                    assert_eq!(order.price(), price);
                    assert!(order.remaining_quantity() > 0);
                    aggregate += order.remaining_quantity();
                }
                assert_eq!(level.get_total_quantity(), aggregate);

                queued += level.get_orders_count();
            }
        }

        assert_eq!(queued, book.order_count());

        if let (Some(best_bid), Some(best_ask)) = (book.best_bid(), book.best_ask()) {
            assert!(best_bid < best_ask, "book left crossed: {best_bid} >= {best_ask}");
        }
    }

    #[test]
    fn invariants_hold_through_partial_fills() {
        let mut book = OrderBook::new("META");

        book.add_order(gtc(1, Side::Buy, 9, 10));
        check_invariants(&book);
        book.add_order(gtc(2, Side::Buy, 10, 5));
        check_invariants(&book);
        book.add_order(gtc(3, Side::Sell, 10, 3));
        check_invariants(&book);

        assert_eq!(book.get_order(2).unwrap().remaining_quantity(), 2);

        book.add_order(gtc(4, Side::Sell, 9, 8));
        check_invariants(&book);

        book.cancel_order(1);
        check_invariants(&book);
    }

    #[test]
    fn invariants_hold_after_fill_and_kill_cleanup() {
        let mut book = OrderBook::new("META");

        book.add_order(gtc(1, Side::Sell, 10, 2));
        book.add_order(fak(2, Side::Buy, 10, 5));
        check_invariants(&book);

        assert_eq!(book.order_count(), 0);
    }

    #[test]
    fn invariants_hold_after_modify() {
        let mut book = OrderBook::new("META");

        book.add_order(gtc(1, Side::Buy, 10, 5));
        book.add_order(gtc(2, Side::Buy, 10, 5));
        book.modify_order(OrderModify {
            order_id: 1,
            symbol: "META".to_string(),
            side: Side::Buy,
            price: 11,
            quantity: 4,
        });
        check_invariants(&book);

        assert_eq!(book.best_bid(), Some(11));
        assert_eq!(book.get_order(1).unwrap().remaining_quantity(), 4);
    }

    #[test]
    #[should_panic(expected = "cannot be filled for more than its remaining quantity")]
    fn overfill_is_fatal() {
        let mut order = gtc(1, Side::Buy, 10, 5);
        order.fill(6);
    }
}
