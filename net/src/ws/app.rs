use std::net::TcpListener;
use std::sync::Arc;

use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use engine_core::registry::OrderBookRegistry;
use market_data::fanout::TradeFeed;

use crate::ws::session::run_session;

pub struct WsState {
    pub registry: Arc<OrderBookRegistry>,
    pub feed: TradeFeed,
}

/// The dissemination server: plain TCP listener whose only route upgrades
/// straight to a WebSocket session.
pub struct WsServerApp {
    pub port: u16,
    server: actix_web::dev::Server,
}

impl WsServerApp {
    pub fn build(
        host: &str,
        port: u16,
        workers: usize,
        registry: Arc<OrderBookRegistry>,
        feed: TradeFeed,
    ) -> Result<Self, std::io::Error> {
        let listener = TcpListener::bind((host, port))?;
        let port = listener.local_addr()?.port();

        let state = web::Data::new(WsState { registry, feed });

        let server = HttpServer::new(move || {
            App::new()
                .app_data(state.clone())
                .route("/", web::get().to(upgrade))
        })
        .workers(workers)
        .listen(listener)?
        .run();

        Ok(Self { port, server })
    }

    pub fn handle(&self) -> actix_web::dev::ServerHandle {
        self.server.handle()
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

async fn upgrade(
    req: HttpRequest,
    body: web::Payload,
    state: web::Data<WsState>,
) -> actix_web::Result<HttpResponse> {
    let (response, session, msg_stream) = actix_ws::handle(&req, body)?;

    let registry = Arc::clone(&state.registry);
    let feed = state.feed.clone();
    actix_web::rt::spawn(run_session(session, msg_stream, registry, feed));

    Ok(response)
}
