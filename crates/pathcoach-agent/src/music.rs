use crate::error::{AgentError, Service};
use crate::poller::StatusSource;
use crate::Result;
use pathcoach_core::config::MusicApiConfig;
use pathcoach_core::task::{TaskRecord, TaskStatus};
use pathcoach_core::types::SongData;
use pathcoach_core::CoachError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const CODE_OK: i64 = 200;

// ─── Wire types ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitRequest<'a> {
    prompt: &'a str,
    style: &'a str,
    title: &'a str,
    custom_mode: bool,
    instrumental: bool,
    model: &'a str,
    #[serde(rename = "callBackUrl")]
    callback_url: &'a str,
}

/// `{code, msg, data}` wrapper shared by every endpoint.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    msg: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitData {
    #[serde(default)]
    task_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordData {
    #[serde(default)]
    status: Option<TaskStatus>,
    #[serde(default)]
    response: Option<RecordPayload>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordPayload {
    #[serde(default)]
    suno_data: Option<Vec<Track>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Track {
    #[serde(default)]
    audio_url: Option<String>,
    #[serde(default)]
    stream_audio_url: Option<String>,
}

impl RecordData {
    fn into_record(self) -> TaskRecord {
        let audio_url = self
            .response
            .and_then(|r| r.suno_data)
            .and_then(|tracks| tracks.into_iter().next())
            .and_then(|t| {
                non_blank(t.audio_url).or_else(|| non_blank(t.stream_audio_url))
            });
        TaskRecord {
            status: self.status.unwrap_or(TaskStatus::Unknown),
            audio_url,
            error_message: non_blank(self.error_message),
        }
    }
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.trim().is_empty())
}

// ─── Client ─────────────────────────────────────────────────────────────────

/// Client for the task-based music-generation API.
pub struct MusicClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    style: String,
    callback_url: String,
    timeout_secs: u64,
    api_key: String,
}

impl MusicClient {
    pub fn new(config: &MusicApiConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(AgentError::Client)?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            style: config.style.clone(),
            callback_url: config.callback_url.clone(),
            timeout_secs: config.timeout_secs,
            api_key: api_key.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn read<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Envelope<T>> {
        let response = request
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| AgentError::from_transport(Service::Music, self.timeout_secs, e))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AgentError::from_transport(Service::Music, self.timeout_secs, e))?;

        if !status.is_success() {
            let msg = serde_json::from_str::<Envelope<serde_json::Value>>(&text)
                .ok()
                .and_then(|e| e.msg);
            return Err(map_error(status.as_u16() as i64, msg));
        }
        let envelope: Envelope<T> = serde_json::from_str(&text)
            .map_err(|e| CoachError::MalformedResponse(format!("music API response: {e}")))?;
        if envelope.code != CODE_OK {
            return Err(map_error(envelope.code, envelope.msg));
        }
        Ok(envelope)
    }

    /// Submit the lyrics for rendering and return the task id.
    pub async fn submit(&self, song: &SongData) -> Result<String> {
        let body = SubmitRequest {
            prompt: &song.lyrics,
            style: &self.style,
            title: &song.title,
            custom_mode: true,
            instrumental: false,
            model: &self.model,
            callback_url: &self.callback_url,
        };
        let request = self.client.post(self.url("generate")).json(&body);
        let envelope: Envelope<SubmitData> = self.read(request).await?;
        let task_id = envelope
            .data
            .and_then(|d| non_blank(d.task_id))
            .ok_or_else(|| CoachError::MalformedResponse("no task id in response".to_string()))?;
        tracing::info!(task_id = %task_id, title = %song.title, "submitted music task");
        Ok(task_id)
    }

    /// One status check for `task_id`.
    pub async fn record_info(&self, task_id: &str) -> Result<TaskRecord> {
        let request = self
            .client
            .get(self.url("generate/record-info"))
            .query(&[("taskId", task_id)]);
        let envelope: Envelope<RecordData> = self.read(request).await?;
        let data = envelope
            .data
            .ok_or_else(|| CoachError::MalformedResponse("no task data in response".to_string()))?;
        Ok(data.into_record())
    }

    /// Liveness check for the key. `Ok(false)` means the service rejected it.
    pub async fn check_key(&self) -> Result<bool> {
        let request = self.client.get(self.url("generate/credit"));
        match self.read::<serde_json::Value>(request).await {
            Ok(_) => Ok(true),
            Err(AgentError::InvalidApiKey(_) | AgentError::Rejected { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Fetch a rendered track. Audio links are public, so no key is sent; the
/// music API timeout still bounds the request.
pub async fn download_audio(config: &MusicApiConfig, url: &str) -> Result<Vec<u8>> {
    let client = reqwest::Client::builder()
        .timeout(config.timeout())
        .build()
        .map_err(AgentError::Client)?;
    let transport =
        |e: reqwest::Error| AgentError::from_transport(Service::Music, config.timeout_secs, e);

    let response = client.get(url).send().await.map_err(transport)?;
    let status = response.status();
    if !status.is_success() {
        return Err(AgentError::Rejected {
            service: Service::Music,
            status: status.as_u16(),
            message: format!("could not download {url}"),
        });
    }
    let bytes = response.bytes().await.map_err(transport)?;
    if bytes.is_empty() {
        return Err(CoachError::MalformedResponse(format!("{url} returned an empty file")).into());
    }
    tracing::info!(url, bytes = bytes.len(), "downloaded audio");
    Ok(bytes.to_vec())
}

impl StatusSource for MusicClient {
    async fn fetch(&self, task_id: &str) -> Result<TaskRecord> {
        self.record_info(task_id).await
    }
}

fn map_error(code: i64, msg: Option<String>) -> AgentError {
    match code {
        401 => AgentError::InvalidApiKey(Service::Music),
        429 => AgentError::RateLimited(Service::Music),
        _ => AgentError::Rejected {
            service: Service::Music,
            status: u16::try_from(code).unwrap_or(0),
            message: msg
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| "no error message in response".to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn client(url: &str) -> MusicClient {
        let config = MusicApiConfig {
            base_url: url.to_string(),
            ..MusicApiConfig::default()
        };
        MusicClient::new(&config, "m-key").unwrap()
    }

    fn song() -> SongData {
        SongData {
            title: "Новий ранок".into(),
            lyrics: "Я встаю і йду вперед".into(),
        }
    }

    #[tokio::test]
    async fn submit_sends_fixed_fields_and_returns_task_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/generate")
            .match_header("authorization", "Bearer m-key")
            .match_body(Matcher::Json(json!({
                "prompt": "Я встаю і йду вперед",
                "style": "Pop",
                "title": "Новий ранок",
                "customMode": true,
                "instrumental": false,
                "model": "V4",
                "callBackUrl": "https://no-callback.com"
            })))
            .with_status(200)
            .with_body(json!({"code": 200, "msg": "success", "data": {"taskId": "abc123"}}).to_string())
            .expect(1)
            .create_async()
            .await;

        let id = client(&server.url()).submit(&song()).await.unwrap();
        assert_eq!(id, "abc123");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn submit_surfaces_server_message() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/generate")
            .with_status(200)
            .with_body(json!({"code": 400, "msg": "lyrics too long"}).to_string())
            .create_async()
            .await;
        let err = client(&server.url()).submit(&song()).await.unwrap_err();
        assert!(err.to_string().contains("lyrics too long"));
    }

    #[tokio::test]
    async fn submit_without_task_id_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/generate")
            .with_status(200)
            .with_body(json!({"code": 200, "data": {}}).to_string())
            .create_async()
            .await;
        let err = client(&server.url()).submit(&song()).await.unwrap_err();
        assert!(matches!(err, AgentError::Coach(CoachError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn record_info_without_data_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/generate/record-info")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({"code": 200, "msg": "success"}).to_string())
            .create_async()
            .await;
        let err = client(&server.url()).record_info("t").await.unwrap_err();
        assert!(matches!(err, AgentError::Coach(CoachError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn record_info_reads_first_track() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/generate/record-info")
            .match_query(Matcher::UrlEncoded("taskId".into(), "abc123".into()))
            .with_status(200)
            .with_body(
                json!({"code": 200, "data": {"status": "SUCCESS", "response": {"sunoData": [
                    {"audioUrl": "https://x/y.mp3", "streamAudioUrl": "https://x/s", "duration": 180.0},
                    {"audioUrl": "https://x/z.mp3"}
                ]}}})
                .to_string(),
            )
            .create_async()
            .await;
        let record = client(&server.url()).record_info("abc123").await.unwrap();
        assert_eq!(record.status, TaskStatus::Success);
        assert_eq!(record.audio_url.as_deref(), Some("https://x/y.mp3"));
    }

    #[tokio::test]
    async fn stream_url_is_the_fallback() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/generate/record-info")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                json!({"code": 200, "data": {"status": "FIRST_SUCCESS", "response": {"sunoData": [
                    {"audioUrl": "", "streamAudioUrl": "https://x/stream"}
                ]}}})
                .to_string(),
            )
            .create_async()
            .await;
        let record = client(&server.url()).record_info("t").await.unwrap();
        assert_eq!(record.status, TaskStatus::FirstSuccess);
        assert_eq!(record.audio_url.as_deref(), Some("https://x/stream"));
    }

    #[tokio::test]
    async fn record_info_carries_error_message() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/generate/record-info")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                json!({"code": 200, "data": {"status": "GENERATE_AUDIO_FAILED", "response": null, "errorMessage": "model overloaded"}})
                    .to_string(),
            )
            .create_async()
            .await;
        let record = client(&server.url()).record_info("t").await.unwrap();
        assert_eq!(record.status, TaskStatus::GenerateAudioFailed);
        assert_eq!(record.error_message.as_deref(), Some("model overloaded"));
    }

    #[tokio::test]
    async fn check_key_reports_rejection_as_false() {
        let mut server = mockito::Server::new_async().await;
        let _ok = server
            .mock("GET", "/generate/credit")
            .match_header("authorization", "Bearer m-key")
            .with_status(200)
            .with_body(json!({"code": 200, "data": 42}).to_string())
            .create_async()
            .await;
        assert!(client(&server.url()).check_key().await.unwrap());

        let mut bad = mockito::Server::new_async().await;
        let _unauth = bad
            .mock("GET", "/generate/credit")
            .with_status(401)
            .with_body(json!({"code": 401, "msg": "invalid key"}).to_string())
            .create_async()
            .await;
        assert!(!client(&bad.url()).check_key().await.unwrap());
    }

    #[tokio::test]
    async fn download_returns_track_bytes() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/tracks/y.mp3")
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_body("ID3-audio")
            .expect(1)
            .create_async()
            .await;
        let config = MusicApiConfig::default();
        let url = format!("{}/tracks/y.mp3", server.url());
        let bytes = download_audio(&config, &url).await.unwrap();
        assert_eq!(bytes, b"ID3-audio");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn expired_download_link_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/tracks/gone.mp3")
            .with_status(404)
            .create_async()
            .await;
        let url = format!("{}/tracks/gone.mp3", server.url());
        let err = download_audio(&MusicApiConfig::default(), &url)
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Rejected { status: 404, .. }));
        assert!(err.to_string().contains("gone.mp3"));
    }

    #[test]
    fn body_codes_map_like_http_codes() {
        assert!(matches!(map_error(401, None), AgentError::InvalidApiKey(Service::Music)));
        assert!(matches!(map_error(429, None), AgentError::RateLimited(Service::Music)));
        assert!(matches!(
            map_error(-1, Some("odd".into())),
            AgentError::Rejected { status: 0, .. }
        ));
    }
}
