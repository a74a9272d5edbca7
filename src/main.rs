use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::prelude::*;

/// Arguments to configure this runtime of the application before it is started.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(long, env, default_value = "INFO")]
    log_level: LevelFilter,
}

/// Initializes logging, reads the layered configuration, and starts the multithreaded tokio
/// runtime. This is only a thin wrapper around the `gatekeeper` crate that supplies the necessary
/// settings and a Ctrl-C driven shutdown signal.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_filter(args.log_level),
        )
        .init();

    let config = gatekeeper::config::Config::read()?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async {
            gatekeeper::run(config, async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await
        })?;

    Ok(())
}
