use prometheus::{IntCounter, IntGauge, Registry};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref LIVE_GAMES: IntGauge =
        new_gauge("quizline_live_games", "Games created and not finished yet");
    pub static ref CONNECTED_PLAYERS: IntGauge =
        new_gauge("quizline_connected_players", "Amount of players connected");
    pub static ref CONNECTED_CREATORS: IntGauge =
        new_gauge("quizline_connected_creators", "Amount of game creators connected");
    pub static ref BROADCASTS: IntCounter =
        new_counter("quizline_broadcasts_total", "Messages broadcast to a game");
    pub static ref FAILED_DELIVERIES: IntCounter = new_counter(
        "quizline_failed_deliveries_total",
        "Callbacks that panicked while receiving a broadcast"
    );
}

fn new_gauge(name: &str, help: &str) -> IntGauge {
    IntGauge::new(name, help).expect("metric cannot be created")
}

fn new_counter(name: &str, help: &str) -> IntCounter {
    IntCounter::new(name, help).expect("metric cannot be created")
}

/// Registers every collector in [`REGISTRY`]. Calling it more than once only logs a warning.
pub fn register_metrics() {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(LIVE_GAMES.clone()),
        Box::new(CONNECTED_PLAYERS.clone()),
        Box::new(CONNECTED_CREATORS.clone()),
        Box::new(BROADCASTS.clone()),
        Box::new(FAILED_DELIVERIES.clone()),
    ];

    for collector in collectors {
        if let Err(error) = REGISTRY.register(collector) {
            log::warn!("Collector cannot be registered. Error: '{error}'.");
        }
    }
}
