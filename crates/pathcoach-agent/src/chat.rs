use crate::error::{AgentError, Service};
use crate::Result;
use pathcoach_core::config::TextApiConfig;
use pathcoach_core::parse::extract_json;
use pathcoach_core::prompt::ChatPrompt;
use pathcoach_core::CoachError;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

// ─── Wire types ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<ErrorDetail>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

// ─── Client ─────────────────────────────────────────────────────────────────

/// Chat-completion client for an OpenAI-compatible endpoint.
pub struct ChatClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    timeout_secs: u64,
    api_key: String,
}

impl ChatClient {
    pub fn new(config: &TextApiConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(AgentError::Client)?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout_secs: config.timeout_secs,
            api_key: api_key.into(),
        })
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|_| AgentError::InvalidApiKey(Service::Text))?;
        headers.insert(AUTHORIZATION, bearer);
        Ok(headers)
    }

    /// Send one system + user exchange and return the raw message content.
    pub async fn complete(&self, prompt: &ChatPrompt) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        tracing::debug!(model = %self.model, prompt_chars = prompt.user.len(), "chat request");
        let response = self
            .client
            .post(&self.endpoint)
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::from_transport(Service::Text, self.timeout_secs, e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AgentError::from_transport(Service::Text, self.timeout_secs, e))?;

        if !status.is_success() {
            return Err(map_error(status.as_u16(), &text));
        }

        let parsed: ChatResponse = serde_json::from_str(&text).map_err(|e| {
            CoachError::MalformedResponse(format!("chat completion envelope: {e}"))
        })?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| CoachError::MalformedResponse("empty completion".to_string()).into())
    }

    /// [`ChatClient::complete`], then recover a `T` from the content.
    pub async fn complete_json<T: DeserializeOwned>(&self, prompt: &ChatPrompt) -> Result<T> {
        let content = self.complete(prompt).await?;
        Ok(extract_json(&content)?)
    }
}

/// Quota is checked before the status code: the API reports it as a 429 too.
fn map_error(status: u16, body: &str) -> AgentError {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .unwrap_or_default();
    let code = detail.code.as_deref().or(detail.kind.as_deref());

    match (status, code) {
        (_, Some("insufficient_quota")) => AgentError::InsufficientQuota,
        (401, _) | (_, Some("invalid_api_key")) => AgentError::InvalidApiKey(Service::Text),
        (429, _) => AgentError::RateLimited(Service::Text),
        _ => AgentError::Rejected {
            service: Service::Text,
            status,
            message: detail
                .message
                .unwrap_or_else(|| "no error message in response".to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use pathcoach_core::types::GeneratedPlan;
    use serde_json::json;

    fn config(base_url: &str) -> TextApiConfig {
        TextApiConfig {
            base_url: base_url.to_string(),
            ..TextApiConfig::default()
        }
    }

    fn prompt() -> ChatPrompt {
        ChatPrompt {
            system: "coach".into(),
            user: "help".into(),
        }
    }

    fn completion(content: &str) -> String {
        json!({"choices": [{"message": {"role": "assistant", "content": content}}]}).to_string()
    }

    #[tokio::test]
    async fn sends_model_roles_and_json_format() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(json!({
                "model": "gpt-4o",
                "response_format": {"type": "json_object"},
                "messages": [
                    {"role": "system", "content": "coach"},
                    {"role": "user", "content": "help"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion("{\"ok\":true}"))
            .expect(1)
            .create_async()
            .await;

        let client = ChatClient::new(&config(&server.url()), "sk-test").unwrap();
        let content = client.complete(&prompt()).await.unwrap();
        assert_eq!(content, "{\"ok\":true}");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn fenced_content_parses_like_bare_json() {
        let plan = r#"{"summary":"s","reasoning":"r","timeframe":"t","steps":[{"title":"a","description":"b","timeframe":"c"}]}"#;
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(completion(&format!("```json\n{plan}\n```")))
            .create_async()
            .await;

        let client = ChatClient::new(&config(&server.url()), "k").unwrap();
        let fenced: GeneratedPlan = client.complete_json(&prompt()).await.unwrap();
        let bare: GeneratedPlan = serde_json::from_str(plan).unwrap();
        assert_eq!(fenced, bare);
    }

    #[tokio::test]
    async fn quota_wins_over_rate_limit_status() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body(
                json!({"error": {"message": "You exceeded your quota", "code": "insufficient_quota"}})
                    .to_string(),
            )
            .create_async()
            .await;
        let client = ChatClient::new(&config(&server.url()), "k").unwrap();
        let err = client.complete(&prompt()).await.unwrap_err();
        assert!(matches!(err, AgentError::InsufficientQuota));
    }

    #[test]
    fn status_codes_map_to_distinct_errors() {
        assert!(matches!(
            map_error(401, "{}"),
            AgentError::InvalidApiKey(Service::Text)
        ));
        assert!(matches!(
            map_error(400, r#"{"error":{"code":"invalid_api_key"}}"#),
            AgentError::InvalidApiKey(Service::Text)
        ));
        assert!(matches!(
            map_error(429, "not json"),
            AgentError::RateLimited(Service::Text)
        ));
        match map_error(500, r#"{"error":{"message":"boom"}}"#) {
            AgentError::Rejected {
                status, message, ..
            } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn garbage_content_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(completion("sorry, I cannot do that"))
            .create_async()
            .await;
        let client = ChatClient::new(&config(&server.url()), "k").unwrap();
        let err = client
            .complete_json::<GeneratedPlan>(&prompt())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AgentError::Coach(CoachError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_network_error() {
        let client = ChatClient::new(&config("http://127.0.0.1:9"), "k").unwrap();
        let err = client.complete(&prompt()).await.unwrap_err();
        assert!(matches!(
            err,
            AgentError::Network {
                service: Service::Text,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn silent_server_is_a_timeout_not_a_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _hold = tokio::spawn(async move {
            let mut open = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                open.push(socket);
            }
        });

        let cfg = TextApiConfig {
            timeout_secs: 1,
            ..config(&format!("http://{addr}"))
        };
        let client = ChatClient::new(&cfg, "k").unwrap();
        let err = client.complete(&prompt()).await.unwrap_err();
        assert!(matches!(
            err,
            AgentError::Timeout {
                service: Service::Text,
                secs: 1
            }
        ));
        assert!(err.to_string().contains("timed out"));
    }
}
