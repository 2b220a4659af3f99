use std::collections::VecDeque;

use protocol::{OrderId, Price, Quantity};

/// All resting orders at a single price on one side. The queue holds order
/// ids in arrival order; the order data itself lives in the book's id index.
#[derive(Debug, Clone, Default)]
pub struct PriceLevel {
    pub(crate) price: Price,
    pub(crate) orders: VecDeque<OrderId>,
    pub(crate) total_quantity: Quantity,
}

impl PriceLevel {
    #[inline]
    pub(crate) fn new(price: Price) -> Self {
        Self {
            price,
            orders: VecDeque::new(),
            total_quantity: 0,
        }
    }

    #[inline]
    pub(crate) fn push_order(&mut self, order_id: OrderId, remaining: Quantity) {
        self.orders.push_back(order_id);
        self.total_quantity = self.total_quantity.saturating_add(remaining);
    }

    #[inline]
    pub(crate) fn front(&self) -> Option<OrderId> {
        self.orders.front().copied()
    }

    #[inline]
    pub(crate) fn pop_front(&mut self) {
        self.orders.pop_front();
    }

    /// Decrement the aggregate after the head order was filled for `quantity`.
    #[inline]
    pub(crate) fn fill(&mut self, quantity: Quantity) {
        self.total_quantity = self.total_quantity.saturating_sub(quantity);
    }

    /// Remove an order from anywhere in the queue. Position is re-derived by
    /// scanning, which is linear in the level depth.
    #[inline]
    pub(crate) fn remove_order(&mut self, order_id: OrderId, remaining: Quantity) {
        if let Some(position) = self.orders.iter().position(|&id| id == order_id) {
            let _ = self.orders.remove(position);
            self.total_quantity = self.total_quantity.saturating_sub(remaining);
        }
    }

    #[inline]
    pub(crate) fn get_total_quantity(&self) -> Quantity {
        self.total_quantity
    }

    #[inline]
    pub(crate) fn get_price(&self) -> Price {
        self.price
    }

    #[inline]
    pub(crate) fn get_orders_count(&self) -> usize {
        self.orders.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
