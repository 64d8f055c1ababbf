use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::AppConfig;
use crate::services::backend::{AnalysisBackend, BackendError, TaskOutput};
use crate::services::tasks::TaskDefinition;

/// Runs the advisor tasks one after another against an OpenAI-compatible
/// chat-completions endpoint (Groq by default).
pub struct CrewClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl CrewClient {
    pub fn new(config: &AppConfig) -> Result<Self, BackendError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;

        Ok(Self {
            http,
            base_url: config.groq_base_url.trim_end_matches('/').to_string(),
            api_key: config.groq_api_key.clone(),
            model: config.groq_model.clone(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
        })
    }

    /// Run a single task and return the model's text.
    async fn complete(
        &self,
        task: &TaskDefinition,
        inputs: &BTreeMap<String, String>,
    ) -> Result<String, BackendError> {
        let system = task.system_prompt();
        let user = task.user_prompt(inputs);

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &system,
                },
                ChatMessage {
                    role: "user",
                    content: &user,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = response.json().await?;
        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| BackendError::EmptyResponse {
                agent: task.agent.name.to_string(),
            })
    }
}

#[async_trait]
impl AnalysisBackend for CrewClient {
    async fn invoke(
        &self,
        tasks: &[TaskDefinition],
        inputs: &BTreeMap<String, String>,
    ) -> Result<Vec<TaskOutput>, BackendError> {
        let mut outputs = Vec::with_capacity(tasks.len());

        for task in tasks {
            tracing::debug!(task = task.name, agent = task.agent.name, model = %self.model, "Running advisor task");
            let start = std::time::Instant::now();
            let raw = self.complete(task, inputs).await?;

            tracing::info!(
                task = task.name,
                duration_ms = start.elapsed().as_millis() as u64,
                output_chars = raw.chars().count(),
                "Advisor task complete"
            );
            outputs.push(TaskOutput::from_raw(task.agent.name, raw));
        }

        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            model: "llama-3.3-70b-versatile",
            messages: vec![ChatMessage {
                role: "user",
                content: "hello",
            }],
            temperature: 0.7,
            max_tokens: 2048,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "llama-3.3-70b-versatile");
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["max_tokens"], 2048);
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{"choices": [{"index": 0, "message": {"role": "assistant", "content": "{\"weaknesses\": []}"}}]}"#;
        let chat: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            chat.choices[0].message.content.as_deref(),
            Some("{\"weaknesses\": []}")
        );
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config: AppConfig = envy::from_iter(vec![
            ("GROQ_API_KEY".to_string(), "gsk_test".to_string()),
            ("GROQ_BASE_URL".to_string(), "http://localhost:9999/v1/".to_string()),
        ])
        .unwrap();
        let client = CrewClient::new(&config).unwrap();
        assert_eq!(client.base_url, "http://localhost:9999/v1");
    }
}
