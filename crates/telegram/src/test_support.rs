//! Fakes shared by the crate's tests: an in-process Telegram Bot API and
//! recording implementations of the outbound and generator seams.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::{
    collections::VecDeque,
    net::SocketAddr,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use {
    async_trait::async_trait,
    axum::{Json, Router, body::Bytes, extract::State, http::Uri, routing::post},
    base64::{Engine, engine::general_purpose::STANDARD},
    fxbot_soundgen::{
        DecodedAudio, GenerationConfigEcho, GenerationError, GenerationItem, GenerationRequest,
        GenerationResponse, GenerationSettings, HistoryItem, SoundGenerator,
    },
    serde::Deserialize,
    serde_json::{Value, json},
    teloxide::types::ChatId,
    tokio::{sync::oneshot, task::JoinHandle},
};

use crate::{Error, Result, outbound::ChatOutbound};

// ── Mock Telegram Bot API ──────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SendMessageRequest {
    pub chat_id: i64,
    pub text: String,
    #[serde(default)]
    pub parse_mode: Option<String>,
    #[serde(default)]
    pub link_preview_options: Option<Value>,
}

impl SendMessageRequest {
    pub fn link_preview_disabled(&self) -> bool {
        self.link_preview_options
            .as_ref()
            .and_then(|v| v.get("is_disabled"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone)]
pub(crate) enum CapturedRequest {
    SendMessage(SendMessageRequest),
    SendAudio { raw_body: String },
    GetUpdates { offset: Option<i64> },
    ChatAction { action: String },
    Other { method: String },
}

/// What the next `getUpdates` call answers with.
#[derive(Debug, Clone)]
pub(crate) enum UpdatesReply {
    Batch(Vec<Value>),
    Conflict,
}

#[derive(Clone)]
struct MockState {
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    updates: Arc<Mutex<VecDeque<UpdatesReply>>>,
    fail_sends: bool,
}

pub(crate) struct MockTelegramApi {
    addr: SocketAddr,
    state: MockState,
    shutdown: oneshot::Sender<()>,
    server: JoinHandle<()>,
}

impl MockTelegramApi {
    pub async fn start() -> Self {
        Self::spawn(false).await
    }

    /// Every send answers with an API error.
    pub async fn start_failing() -> Self {
        Self::spawn(true).await
    }

    async fn spawn(fail_sends: bool) -> Self {
        let state = MockState {
            requests: Arc::new(Mutex::new(Vec::new())),
            updates: Arc::new(Mutex::new(VecDeque::new())),
            fail_sends,
        };
        let app = Router::new()
            .route("/{*path}", post(telegram_api_handler))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("local addr");
        let (shutdown, shutdown_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("serve mock telegram api");
        });

        Self {
            addr,
            state,
            shutdown,
            server,
        }
    }

    pub fn bot(&self) -> teloxide::Bot {
        let api_url =
            reqwest::Url::parse(&format!("http://{}/", self.addr)).expect("parse api url");
        teloxide::Bot::new("test-token").set_api_url(api_url)
    }

    pub fn push_updates(&self, reply: UpdatesReply) {
        self.state.updates.lock().unwrap().push_back(reply);
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter_map(|r| match r {
                CapturedRequest::SendMessage(m) => Some(m.text),
                _ => None,
            })
            .collect()
    }

    pub fn method_calls(&self, method: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| matches!(r, CapturedRequest::Other { method: m } if m == method))
            .count()
    }

    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        self.server.await.expect("server join");
    }
}

fn ok(result: Value) -> Json<Value> {
    Json(json!({ "ok": true, "result": result }))
}

fn message_result(extra: Value) -> Value {
    let mut message = json!({
        "message_id": 1,
        "date": 0,
        "chat": { "id": 42, "type": "private", "first_name": "Alice" }
    });
    if let (Some(target), Value::Object(extra)) = (message.as_object_mut(), extra) {
        target.extend(extra);
    }
    message
}

async fn telegram_api_handler(
    State(state): State<MockState>,
    uri: Uri,
    body: Bytes,
) -> Json<Value> {
    let method = uri
        .path()
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();

    let captured = match method.as_str() {
        "sendmessage" => match serde_json::from_slice::<SendMessageRequest>(&body) {
            Ok(req) => CapturedRequest::SendMessage(req),
            Err(_) => CapturedRequest::Other {
                method: method.clone(),
            },
        },
        "sendaudio" => CapturedRequest::SendAudio {
            raw_body: String::from_utf8_lossy(&body).to_string(),
        },
        "sendchataction" => CapturedRequest::ChatAction {
            action: serde_json::from_slice::<Value>(&body)
                .ok()
                .and_then(|v| v.get("action").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_default(),
        },
        "getupdates" => CapturedRequest::GetUpdates {
            offset: serde_json::from_slice::<Value>(&body)
                .ok()
                .and_then(|v| v.get("offset").and_then(Value::as_i64)),
        },
        _ => CapturedRequest::Other {
            method: method.clone(),
        },
    };
    state.requests.lock().unwrap().push(captured);

    if state.fail_sends && method.starts_with("send") {
        return Json(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: chat not found"
        }));
    }

    match method.as_str() {
        "getme" => ok(json!({
            "id": 7,
            "is_bot": true,
            "first_name": "FX",
            "username": "fx_test_bot",
            "can_join_groups": true,
            "can_read_all_group_messages": false,
            "supports_inline_queries": false,
            "can_connect_to_business": false,
            "has_main_web_app": false
        })),
        "getupdates" => {
            let next = state.updates.lock().unwrap().pop_front();
            match next {
                Some(UpdatesReply::Batch(updates)) => ok(Value::Array(updates)),
                Some(UpdatesReply::Conflict) => Json(json!({
                    "ok": false,
                    "error_code": 409,
                    "description": "Conflict: terminated by other getUpdates request; make sure that only one bot instance is running"
                })),
                None => {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    ok(json!([]))
                },
            }
        },
        "sendmessage" => ok(message_result(json!({ "text": "ok" }))),
        "sendaudio" => ok(message_result(json!({
            "audio": {
                "file_id": "audio-file-id",
                "file_unique_id": "audio-unique-id",
                "duration": 1,
                "file_size": 11
            }
        }))),
        _ => ok(json!(true)),
    }
}

/// A private-chat text message update as Telegram delivers it.
pub(crate) fn text_update(update_id: i64, text: &str) -> Value {
    json!({
        "update_id": update_id,
        "message": {
            "message_id": update_id,
            "date": 1,
            "chat": { "id": 42, "type": "private", "first_name": "Alice" },
            "from": {
                "id": 1001,
                "is_bot": false,
                "first_name": "Alice",
                "username": "alice"
            },
            "text": text
        }
    })
}

// ── Log capture ────────────────────────────────────────────────────────────

/// In-memory sink for formatted tracing output.
#[derive(Clone, Default)]
pub(crate) struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// A WARN-and-above subscriber writing into this capture.
    pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync + 'static {
        let sink = self.clone();
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .finish()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
    }
}

impl std::io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

// ── Recording fakes ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Event {
    Notice(String),
    Audio(String),
    Generate(String),
}

/// Ordered log shared by the fakes of one test.
#[derive(Debug, Clone, Default)]
pub(crate) struct EventLog(Arc<Mutex<Vec<Event>>>);

impl EventLog {
    fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    pub fn notices(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Notice(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn audio_ids(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Audio(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn generate_calls(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Generate(_)))
            .count()
    }
}

#[derive(Default)]
pub(crate) struct RecordingOutbound {
    log: EventLog,
    /// Zero-based index of the audio send that fails.
    fail_audio_at: Option<usize>,
    /// Notices containing this text fail to send.
    fail_notice_containing: Option<&'static str>,
    audio_attempts: AtomicUsize,
}

impl RecordingOutbound {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            ..Default::default()
        }
    }

    pub fn failing_audio_at(mut self, index: usize) -> Self {
        self.fail_audio_at = Some(index);
        self
    }

    pub fn failing_notice_containing(mut self, needle: &'static str) -> Self {
        self.fail_notice_containing = Some(needle);
        self
    }
}

#[async_trait]
impl ChatOutbound for RecordingOutbound {
    async fn send_notice(&self, _chat: ChatId, html: &str) -> Result<()> {
        if self
            .fail_notice_containing
            .is_some_and(|needle| html.contains(needle))
        {
            return Err(Error::message("notice rejected"));
        }
        self.log.push(Event::Notice(html.to_string()));
        Ok(())
    }

    async fn send_audio(&self, _chat: ChatId, audio: &DecodedAudio) -> Result<()> {
        let attempt = self.audio_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_audio_at == Some(attempt) {
            return Err(Error::message("upload rejected"));
        }
        self.log.push(Event::Audio(audio.id.clone()));
        Ok(())
    }
}

pub(crate) enum GeneratorScript {
    Items(Vec<GenerationItem>),
    TransportFailure,
}

pub(crate) struct FakeGenerator {
    log: EventLog,
    script: GeneratorScript,
}

impl FakeGenerator {
    pub fn new(log: EventLog, script: GeneratorScript) -> Self {
        Self { log, script }
    }
}

#[async_trait]
impl SoundGenerator for FakeGenerator {
    fn id(&self) -> &'static str {
        "fake"
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> std::result::Result<GenerationResponse, GenerationError> {
        self.log.push(Event::Generate(request.text().to_string()));
        match &self.script {
            GeneratorScript::Items(items) => Ok(GenerationResponse {
                items: items.clone(),
            }),
            GeneratorScript::TransportFailure => Err(GenerationError::transport(
                "failed to send sound generation request (timed out)",
                std::io::Error::other("operation timed out"),
            )),
        }
    }
}

pub(crate) fn item(id: &str, audio: &[u8]) -> GenerationItem {
    item_with_waveform(id, STANDARD.encode(audio))
}

pub(crate) fn item_with_waveform(id: &str, waveform: impl Into<String>) -> GenerationItem {
    GenerationItem {
        history: HistoryItem {
            id: id.into(),
            text: "test".into(),
            created_at: 0,
            content_type: "audio/mpeg".into(),
            generation_config: GenerationConfigEcho {
                text: "test".into(),
                generation_settings: GenerationSettings {
                    duration_seconds: None,
                    prompt_influence: 0.3,
                },
                number_of_generations: 1,
            },
        },
        waveform: waveform.into(),
    }
}

pub(crate) fn audio(id: &str) -> DecodedAudio {
    DecodedAudio {
        id: id.into(),
        content_type: "audio/mpeg".into(),
        data: Bytes::from(id.as_bytes().to_vec()),
    }
}
