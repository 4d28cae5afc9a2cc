use std::fmt::Debug;
use std::fmt::Display;

use mangabyte::configuration::get_configuration;
use mangabyte::otp::init_expiry_worker;
use mangabyte::startup::Application;
use mangabyte::telemetry::get_subscriber;
use mangabyte::telemetry::init_subscriber;
use tokio::task::JoinError;

fn report_exit(
    name: &str,
    outcome: Result<Result<(), impl Debug + Display>, JoinError>,
) {
    match outcome {
        Ok(Ok(())) => {
            tracing::info!("{name} exited gracefully")
        }

        Ok(Err(e)) => {
            tracing::error!(
                error.cause_chain=?e,
                error.message=%e,
                "{name} failed (inner)"
            )
        }

        Err(e) => {
            tracing::error!(
                error.cause_chain=?e,
                error.message=%e,
                "{name} failed (outer)"
            )
        }
    }
}

/// Initialise telemetry, load config, and start the server and the expiry
/// worker
#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let subscriber = get_subscriber("mangabyte", "info", std::io::stdout);
    init_subscriber(subscriber);

    let cfg = get_configuration()?;
    let sweep_interval = cfg.otp.sweep_interval();

    let app = Application::build(cfg).await?;
    tracing::info!(port = app.port(), "listening");

    // the worker must use the app's verifier: with the in-memory backend, that
    // is the only handle on the pending codes
    let expiry_worker = init_expiry_worker(app.verifier(), sweep_interval);

    let server_thread = tokio::spawn(app.run_until_stopped());
    let expiry_worker_thread = tokio::spawn(expiry_worker);

    // returns when the first branch completes, cancelling the other
    tokio::select! {
        o = server_thread => { report_exit("API", o) },
        o = expiry_worker_thread => { report_exit("Background expiry worker", o) },
    }

    Ok(())
}
