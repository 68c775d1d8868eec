//! hwserver: request/reply hello world server.
//!
//! Binds a REP socket (default `tcp://*:5560`), and for every request logs
//! `Received Hello`, does a second of "work" and replies `World`.

use hwserver::config::Config;
use hwserver::dev_tracing::init_logging;
use hwserver::server::HelloServer;
use tracing::info;

#[compio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use futures::{select, FutureExt};

    let config = Config::load()?;
    init_logging(&config.log_level);

    let mut server = HelloServer::bind(config).await?;

    select! {
        result = server.run().fuse() => {
            let served = result?;
            info!(served, "Server finished");
        }
        signal = compio::signal::ctrl_c().fuse() => {
            signal?;
            info!("Interrupted, shutting down");
        }
    }

    Ok(())
}
