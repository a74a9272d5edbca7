#![forbid(unsafe_code)]

//! Process bootstrap for the admission core: wires up [`AdmissionController`], drives its
//! periodic workers, and runs until asked to shut down.

pub mod config;

use crate::config::Config;
use gatekeeper_core::AdmissionController;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Builds the admission core from `config`, enables it, and runs its periodic workers until
/// `shutdown` resolves. On shutdown the core is disabled and both workers are aborted; sessions
/// already verifying are abandoned, matching [`AdmissionController::disable`]'s contract.
///
/// # Errors
///
/// Returns an error if the core's regexes or CAPTCHA generator fail to build, or if the core is
/// configured disabled.
pub async fn run(
    config: Config,
    shutdown: impl Future<Output = ()>,
) -> Result<(), gatekeeper_core::Error> {
    let controller = Arc::new(AdmissionController::new(config.admission)?);
    controller.enable(&mut rand::rng()).await?;

    let one_second = tokio::spawn({
        let controller = Arc::clone(&controller);
        async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            loop {
                interval.tick().await;
                controller.tick_one_second().await;
                controller.check_session_deadlines().await;
            }
        }
    });

    let thirty_seconds = tokio::spawn({
        let controller = Arc::clone(&controller);
        async move {
            let mut interval = tokio::time::interval(Duration::from_secs(30));
            loop {
                interval.tick().await;
                controller.tick_thirty_seconds().await;
            }
        }
    });

    info!("gatekeeper admission core running");
    shutdown.await;
    info!("shutdown requested, disabling admission core");

    controller.disable();
    one_second.abort();
    thirty_seconds.abort();

    Ok(())
}
