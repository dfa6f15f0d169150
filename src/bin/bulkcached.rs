#![forbid(unsafe_code)]

use bulkcache::cli::Cli;
use bulkcache::container::Container;
use bulkcache::{config, dage, http_api, logging};
use clap::Parser;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    logging::init_console();
    let cli = Cli::parse();
    let cfg = config::load(&cli.into_overrides());

    log::info!(
        "starting container {:?} engine={:?} dage=:{} http=:{}",
        cfg.container_name,
        cfg.engine,
        cfg.dage_port,
        cfg.http_port
    );
    let container = Container::new(cfg.container_name.clone(), cfg.engine);

    let dage_container = container.clone();
    let dage_handle = tokio::spawn(async move { dage::serve(dage_container, cfg.dage_port).await });

    let http_container = container.clone();
    let http_handle = tokio::spawn(async move { http_api::serve(http_container, cfg.http_port).await });

    tokio::select! {
        res = dage_handle => {
            res.map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))??;
        }
        res = http_handle => {
            res.map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))??;
        }
        _ = tokio::signal::ctrl_c() => {
            log::info!("received shutdown signal");
        }
    }
    container.shutdown();
    Ok(())
}
