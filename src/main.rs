use quizline::config::Config;
use quizline::metrics::register_metrics;
use quizline::startup::create_web_server;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    std_logger::Config::logfmt().init();

    let config = match Config::get() {
        Ok(config) => config,
        Err(error) => {
            log::error!("Unable to read the configuration. Error: '{error}'.");
            std::process::exit(1);
        }
    };
    register_metrics();

    let listener = match TcpListener::bind(config.address()).await {
        Ok(listener) => listener,
        Err(error) => {
            log::error!(
                "Unable to bind the address. Address: '{}', Error: '{error}'.",
                config.address()
            );
            std::process::exit(1);
        }
    };

    if let Err(error) = create_web_server(config, listener).await {
        log::error!("The web server stopped. Error: '{error}'.");
        std::process::exit(1);
    }
}
