use std::future::{Future, IntoFuture};
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::Config;
use crate::coordinator::registry::SubscriptionRegistry;
use crate::coordinator::GameCoordinator;
use crate::game::service::InMemoryGameService;
use crate::routes::{self, AppState};

/// Wires the game service, the registry and the coordinator into the router. The returned future
/// serves requests until it fails.
pub fn create_web_server(
    config: Config,
    listener: TcpListener,
) -> impl Future<Output = Result<(), std::io::Error>> {
    let coordinator = Arc::new(GameCoordinator::new(
        Arc::new(InMemoryGameService::new()),
        Arc::new(SubscriptionRegistry::new()),
    ));

    let router = routes::create_router(&config).with_state(Arc::new(AppState {
        coordinator,
        config,
    }));

    match listener.local_addr() {
        Ok(address) => log::info!("Listening. Address: '{address}'."),
        Err(error) => log::warn!("Could not read the listening address. Error: '{error}'."),
    }
    axum::serve(listener, router).into_future()
}
