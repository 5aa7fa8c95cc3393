//! HTTP tool adapter.
//!
//! Sends `POST <url>` with body `{"query": "..."}` and hands the response
//! back to the model: JSON bodies as [`ToolOutput::Json`], anything else as
//! text.

use std::collections::HashMap;

use answerline_config::ToolConfig;
use answerline_core::error::ToolError;
use answerline_core::tool::{Tool, ToolOutput};
use async_trait::async_trait;
use tracing::{debug, warn};

pub struct HttpTool {
    name: String,
    description: String,
    url: String,
    headers: HashMap<String, String>,
    client: reqwest::Client,
}

impl HttpTool {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            url: url.into(),
            headers: HashMap::new(),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &ToolConfig) -> Self {
        Self::new(&config.name, &config.description, &config.url)
            .with_headers(config.headers.clone())
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    fn failed(&self, reason: impl Into<String>) -> ToolError {
        ToolError::ExecutionFailed {
            tool_name: self.name.clone(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Tool for HttpTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn invoke(&self, query: &str) -> Result<ToolOutput, ToolError> {
        debug!(tool = %self.name, url = %self.url, "Calling tool endpoint");

        let mut request = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({ "query": query }));
        for (key, value) in &self.headers {
            request = request.header(key, value);
        }

        let response = request.send().await.map_err(|e| self.failed(e.to_string()))?;
        let status = response.status();

        let is_json = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("application/json"));

        let body = response.text().await.map_err(|e| self.failed(e.to_string()))?;

        if !status.is_success() {
            warn!(tool = %self.name, status = status.as_u16(), "Tool endpoint returned error");
            return Err(self.failed(format!("HTTP {}: {body}", status.as_u16())));
        }

        if is_json {
            if let Ok(value) = serde_json::from_str::<serde_json::Value>(&body) {
                return Ok(ToolOutput::Json(value));
            }
        }

        Ok(ToolOutput::Text(body))
    }
}
