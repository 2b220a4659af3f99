//! Random order flow, standing in for a real feed handler. Order ids are
//! drawn from a small range on purpose so duplicate-id rejection, cancels of
//! live orders, and modifies all actually hit.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::Sender;
use engine_core::registry::OrderBookRegistry;
use protocol::{CancelOrder, Order, OrderCommand, OrderModify, OrderType, Side};
use rand::rngs::ThreadRng;
use rand::Rng;
use tracing::info;

const TICK_INTERVAL: Duration = Duration::from_millis(500);

pub fn run_feed(
    registry: Arc<OrderBookRegistry>,
    order_tx: Sender<OrderCommand>,
    shutdown: Arc<AtomicBool>,
) {
    info!("order feed started");

    let mut rng = rand::thread_rng();

    while !shutdown.load(Ordering::SeqCst) {
        for symbol in registry.symbols() {
            let command = random_command(&mut rng, &symbol);
            if order_tx.send(command).is_err() {
                info!("order feed stopped: engine gone");
                return;
            }
        }

        std::thread::sleep(TICK_INTERVAL);
    }

    info!("order feed stopped");
}

fn random_command(rng: &mut ThreadRng, symbol: &str) -> OrderCommand {
    let order_id = rng.gen_range(0..1000);

    match rng.gen_range(0..10) {
        0 => OrderCommand::CancelOrder(CancelOrder {
            symbol: symbol.to_string(),
            order_id,
        }),
        1 => OrderCommand::ModifyOrder(OrderModify {
            order_id,
            symbol: symbol.to_string(),
            side: random_side(rng),
            price: rng.gen_range(1..=10),
            quantity: rng.gen_range(1..=100),
        }),
        _ => OrderCommand::PlaceOrder(Order::new(
            random_order_type(rng),
            order_id,
            symbol.to_string(),
            random_side(rng),
            rng.gen_range(1..=10),
            rng.gen_range(1..=100),
        )),
    }
}

fn random_side(rng: &mut ThreadRng) -> Side {
    if rng.gen_bool(0.5) {
        Side::Buy
    } else {
        Side::Sell
    }
}

fn random_order_type(rng: &mut ThreadRng) -> OrderType {
    if rng.gen_bool(0.5) {
        OrderType::GoodTillCancel
    } else {
        OrderType::FillAndKill
    }
}
