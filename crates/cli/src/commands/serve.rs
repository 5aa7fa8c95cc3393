//! `answerline serve`: Start the HTTP gateway.

use std::path::Path;

pub async fn run(
    config_path: Option<&Path>,
    port_override: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config(config_path)
        .map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("answerline gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Models:    {}", config.models.len());
    println!("   Tools:     {}", config.tools.len());

    answerline_gateway::start(config).await?;

    Ok(())
}
