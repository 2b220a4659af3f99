mod feed;

use std::env;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use engine_core::engine::Engine;
use engine_core::registry::OrderBookRegistry;
use market_data::fanout::TradeFeed;
use net::ws::app::WsServerApp;
use protocol::OrderCommand;
use tracing::{error, info};

/// Symbols served by this process and how many levels each disseminates.
const SYMBOLS: &[(&str, usize)] = &[("META", 5), ("AAPL", 5)];

const TRADE_FEED_CAPACITY: usize = 256;
const ORDER_QUEUE_CAPACITY: usize = 1000;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let (address, port, io_threads) = parse_args();

    let rt = runtime::init(io_threads);

    // Books and symbols exist before any I/O or order flow starts.
    let registry = Arc::new(OrderBookRegistry::new());
    for &(symbol, depth) in SYMBOLS {
        registry.add_symbol(symbol, depth);
    }

    let trade_feed = TradeFeed::new(TRADE_FEED_CAPACITY);
    let (order_tx, order_rx) = crossbeam_channel::bounded::<OrderCommand>(ORDER_QUEUE_CAPACITY);

    let server = match WsServerApp::build(
        &address,
        port,
        io_threads,
        Arc::clone(&registry),
        trade_feed.clone(),
    ) {
        Ok(server) => server,
        Err(e) => {
            eprintln!("Failed to bind {address}:{port}: {e}");
            process::exit(1);
        }
    };

    info!(%address, port = server.port, io_threads, "dissemination server listening");

    let engine_registry = Arc::clone(&registry);
    let engine_feed = trade_feed.clone();
    let engine_handle = std::thread::spawn(move || {
        Engine::new(engine_registry, engine_feed).run(order_rx);
    });

    let server_handle = server.handle();
    let server_join = rt.spawn(async move {
        if let Err(e) = server.run_until_stopped().await {
            error!("server error: {e}");
        }
    });

    let running = Arc::new(AtomicBool::new(true));

    let feed_registry = Arc::clone(&registry);
    let feed_shutdown = Arc::clone(&running);
    let feed_handle = std::thread::spawn(move || {
        feed::run_feed(feed_registry, order_tx, feed_shutdown);
    });

    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        info!("shutting down");
        r.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl-C handler");

    while running.load(Ordering::SeqCst) {
        std::thread::sleep(std::time::Duration::from_millis(100));
    }

    // The feed drops the only command sender, which ends the engine loop.
    feed_handle.join().unwrap();
    engine_handle.join().unwrap();

    rt.block_on(server_handle.stop(true));
    let _ = rt.block_on(server_join);

    info!("gateway stopped");
}

fn parse_args() -> (String, u16, usize) {
    let args: Vec<String> = env::args().collect();

    if args.len() != 4 {
        eprintln!("Usage: gateway <listen_address> <listen_port> <io_threads>");
        eprintln!("Example:");
        eprintln!("    gateway 0.0.0.0 8080 1");
        process::exit(1);
    }

    let address = args[1].clone();

    // Garbage numeric arguments clamp instead of failing: a bad port becomes
    // 0 (the listener then reports whatever ephemeral port it was given) and
    // the thread count is raised to at least 1.
    let port = args[2].parse::<u16>().unwrap_or(0);
    let io_threads = args[3].parse::<usize>().unwrap_or(0).max(1);

    (address, port, io_threads)
}
