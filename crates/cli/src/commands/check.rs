//! `answerline check`: Check each configured provider endpoint.

use std::path::Path;

use answerline_providers::build_from_config;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)
        .map_err(|e| format!("Failed to load config: {e}"))?;
    let router = build_from_config(&config);

    let mut failures = 0;
    for name in router.list() {
        let Some(provider) = router.get(name) else {
            continue;
        };
        let key = if config.api_key_for(name).is_some() {
            "key set"
        } else {
            "no key"
        };

        match provider.health_check().await {
            Ok(true) => println!("  ok    {name} ({key})"),
            Ok(false) => {
                failures += 1;
                println!("  fail  {name} ({key}): endpoint rejected the request");
            }
            Err(e) => {
                failures += 1;
                println!("  fail  {name} ({key}): {e}");
            }
        }
    }

    for model in &config.models {
        println!("  model {} -> {} [{}]", model.model, model.provider, model.effective_role());
    }

    if failures > 0 {
        return Err(format!("{failures} provider(s) unreachable").into());
    }
    Ok(())
}
