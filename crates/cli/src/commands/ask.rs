//! `answerline ask`: Answer one question from the command line.

use std::path::Path;
use std::sync::Arc;

use answerline_core::event::EventBus;
use answerline_orchestrator::HostInput;

pub async fn run(
    config_path: Option<&Path>,
    question: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)
        .map_err(|e| format!("Failed to load config: {e}"))?;
    let orchestrator =
        answerline_gateway::build_orchestrator(&config, Arc::new(EventBus::default()))?;

    let outputs = orchestrator.run(&HostInput { question }).await;
    println!("{}", serde_json::to_string_pretty(&outputs)?);

    Ok(())
}
