use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use mfa_rolers::app::{App, Args};
use mfa_rolers::environment::reset_credential_variables;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    reset_credential_variables();

    let app = App::from(Args::parse());
    match app.run().await {
        Ok(_) => Ok(()),
        Err(e) => {
            error!("error:{:?}", e);
            Err(e)
        }
    }
}
