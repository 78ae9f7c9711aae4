use std::net::TcpListener;

use anyhow::Context;
use env_logger::Env;
use feedreap::{
    configuration::get_configuration,
    startup::{build_pipeline, run},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration().context("Failed to read configuration.")?;
    let pipeline = build_pipeline(&configuration).context("Failed to set up the extraction pipeline.")?;

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address).with_context(|| format!("Failed to bind {}", address))?;
    log::info!(
        "Serving on http://{} (webdriver {}, extraction {})",
        address,
        configuration.browser.webdriver_url,
        configuration.extraction.provider
    );

    run(listener, &configuration, pipeline)?.await?;

    Ok(())
}
