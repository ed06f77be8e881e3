use std::fs::File;
use std::future;
use std::io::{self, Write};

use log::{error, info, warn};

use csm_receiver::config::Config;
use csm_receiver::{CsvSink, Listener};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();
    let config = Config::from_args();

    let output: Box<dyn Write + Send> = match &config.output {
        Some(path) => {
            info!("Writing events to {}", path.display());
            Box::new(File::create(path)?)
        }
        None => Box::new(io::stdout()),
    };
    let sink = CsvSink::new(output)?;

    let listener = match Listener::bind(&config.addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("{}", err);
            return Err(err.into());
        }
    };
    listener.serve_with_shutdown(sink, interrupted()).await?;
    Ok(())
}

async fn interrupted() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Interrupted, shutting down"),
        Err(err) => {
            warn!("Unable to listen for Ctrl-C, running until killed: {}", err);
            future::pending::<()>().await
        }
    }
}
