// ABOUTME: In-memory middleware fake shared by the integration tests.
// ABOUTME: Scripts replies per call and records every request it receives.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use aab_client::aab_grpc::{from_stream, ResponseStream};
use aab_client::aab_proto::*;
use aab_client::{Connector, Middleware};
use async_trait::async_trait;
use tonic::Status;

/// Canned replies.
#[derive(Clone)]
pub struct Script {
    /// `None` makes the liveness call fail.
    pub hello: Option<String>,
    /// Delay before the liveness reply.
    pub hello_delay: Option<Duration>,
    pub warmup_fails: bool,
    pub history: String,
    pub chat_chunks: Vec<Result<ChatResponse, Status>>,
    pub upload_events: Vec<Result<AddFilesResponse, Status>>,
    pub download_events: Vec<Result<DownloadFilesResponse, Status>>,
    pub files_removed: String,
    pub file_list: String,
    pub client_config: String,
    pub disconnect_fails: bool,
    pub disconnect_delay: Option<Duration>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            hello: Some("Hello from the middleware".to_string()),
            hello_delay: None,
            warmup_fails: false,
            history: "[]".to_string(),
            chat_chunks: Vec::new(),
            upload_events: Vec::new(),
            download_events: Vec::new(),
            files_removed: "removed".to_string(),
            file_list: "[]".to_string(),
            client_config: "{}".to_string(),
            disconnect_fails: false,
            disconnect_delay: None,
        }
    }
}

/// Everything the fake saw.
#[derive(Default)]
pub struct Calls {
    pub methods: Mutex<Vec<&'static str>>,
    pub chat_requests: Mutex<Vec<ChatRequest>>,
    pub add_files: Mutex<Vec<AddFilesRequest>>,
    pub remove_files: Mutex<Vec<RemoveFilesRequest>>,
    pub download_files: Mutex<Vec<DownloadFilesRequest>>,
    pub removed_sessions: Mutex<Vec<i32>>,
    pub set_models: Mutex<Vec<String>>,
    pub disconnects: AtomicUsize,
}

impl Calls {
    pub fn count(&self, method: &str) -> usize {
        self.methods
            .lock()
            .unwrap()
            .iter()
            .filter(|m| **m == method)
            .count()
    }

    pub fn disconnects(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }

    fn record(&self, method: &'static str) {
        self.methods.lock().unwrap().push(method);
    }
}

pub struct FakeBackend {
    pub script: Script,
    pub calls: Arc<Calls>,
}

impl FakeBackend {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            calls: Arc::new(Calls::default()),
        }
    }

    pub fn with_calls(script: Script, calls: Arc<Calls>) -> Self {
        Self { script, calls }
    }
}

pub fn chat_chunk(text: &str) -> Result<ChatResponse, Status> {
    Ok(ChatResponse {
        message: serde_json::json!({ "message": text }).to_string(),
    })
}

pub fn upload_event(percent: i32, status: &str) -> Result<AddFilesResponse, Status> {
    Ok(AddFilesResponse {
        current_file_progress: percent,
        files_uploaded: status.to_string(),
    })
}

pub fn download_event(percent: i32, status: &str) -> Result<DownloadFilesResponse, Status> {
    Ok(DownloadFilesResponse {
        progress: percent,
        file_downloaded: status.to_string(),
    })
}

#[async_trait]
impl Middleware for FakeBackend {
    async fn say_hello(&self, _request: SayHelloRequest) -> Result<SayHelloResponse, Status> {
        self.calls.record("SayHelloPyllm");
        if let Some(delay) = self.script.hello_delay {
            tokio::time::sleep(delay).await;
        }
        match &self.script.hello {
            Some(message) => Ok(SayHelloResponse {
                message: message.clone(),
            }),
            None => Err(Status::unavailable("backend starting")),
        }
    }

    async fn load_models(&self) -> Result<(), Status> {
        self.calls.record("LoadModels");
        if self.script.warmup_fails {
            return Err(Status::internal("no GPU"));
        }
        Ok(())
    }

    async fn get_chat_history(&self) -> Result<GetChatHistoryResponse, Status> {
        self.calls.record("GetChatHistory");
        Ok(GetChatHistoryResponse {
            data: self.script.history.clone(),
        })
    }

    async fn chat(&self, request: ChatRequest) -> Result<ResponseStream<ChatResponse>, Status> {
        self.calls.record("Chat");
        self.calls.chat_requests.lock().unwrap().push(request);
        Ok(from_stream(futures::stream::iter(
            self.script.chat_chunks.clone(),
        )))
    }

    async fn remove_session(&self, request: RemoveSessionRequest) -> Result<(), Status> {
        self.calls.record("RemoveSession");
        let mut removed = self.calls.removed_sessions.lock().unwrap();
        if removed.contains(&request.session_id) {
            return Err(Status::not_found("session already removed"));
        }
        removed.push(request.session_id);
        Ok(())
    }

    async fn add_files(
        &self,
        request: AddFilesRequest,
    ) -> Result<ResponseStream<AddFilesResponse>, Status> {
        self.calls.record("AddFiles");
        self.calls.add_files.lock().unwrap().push(request);
        Ok(from_stream(futures::stream::iter(
            self.script.upload_events.clone(),
        )))
    }

    async fn remove_files(
        &self,
        request: RemoveFilesRequest,
    ) -> Result<RemoveFilesResponse, Status> {
        self.calls.record("RemoveFiles");
        self.calls.remove_files.lock().unwrap().push(request);
        Ok(RemoveFilesResponse {
            files_removed: self.script.files_removed.clone(),
        })
    }

    async fn get_file_list(
        &self,
        _request: GetFileListRequest,
    ) -> Result<GetFileListResponse, Status> {
        self.calls.record("GetFileList");
        Ok(GetFileListResponse {
            file_list: self.script.file_list.clone(),
        })
    }

    async fn download_files(
        &self,
        request: DownloadFilesRequest,
    ) -> Result<ResponseStream<DownloadFilesResponse>, Status> {
        self.calls.record("DownloadFiles");
        self.calls.download_files.lock().unwrap().push(request);
        Ok(from_stream(futures::stream::iter(
            self.script.download_events.clone(),
        )))
    }

    async fn set_parameters(
        &self,
        request: SetParametersRequest,
    ) -> Result<SetParametersResponse, Status> {
        self.calls.record("SetParameters");
        Ok(SetParametersResponse {
            message: format!("max_token={}", request.max_token),
        })
    }

    async fn get_client_config(&self) -> Result<GetClientConfigResponse, Status> {
        self.calls.record("GetClientConfig");
        Ok(GetClientConfigResponse {
            data: self.script.client_config.clone(),
        })
    }

    async fn set_active_assistant(
        &self,
        request: SetActiveAssistantRequest,
    ) -> Result<SetActiveAssistantResponse, Status> {
        self.calls.record("SetActiveAssistant");
        Ok(SetActiveAssistantResponse {
            message: format!("active: {}", request.assistant),
        })
    }

    async fn set_models(&self, request: SetModelsRequest) -> Result<SetModelsResponse, Status> {
        self.calls.record("SetModels");
        self.calls
            .set_models
            .lock()
            .unwrap()
            .push(request.assistant.clone());
        Ok(SetModelsResponse {
            message: format!("switched to {}", request.assistant),
        })
    }

    async fn client_disconnected(&self) -> Result<(), Status> {
        self.calls.record("ClientDisconnected");
        self.calls.disconnects.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.script.disconnect_delay {
            tokio::time::sleep(delay).await;
        }
        if self.script.disconnect_fails {
            return Err(Status::unavailable("already gone"));
        }
        Ok(())
    }
}

/// Connector that fails a fixed number of times before handing out a fake.
pub struct FakeConnector {
    pub failures: usize,
    pub attempts: AtomicUsize,
    pub script: Script,
    pub calls: Arc<Calls>,
}

impl FakeConnector {
    pub fn new(failures: usize, script: Script) -> Self {
        Self {
            failures,
            attempts: AtomicUsize::new(0),
            script,
            calls: Arc::new(Calls::default()),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for FakeConnector {
    type Backend = FakeBackend;

    fn target(&self) -> &str {
        "fake://middleware"
    }

    async fn connect(&self) -> Option<FakeBackend> {
        let n = self.attempts.fetch_add(1, Ordering::SeqCst);
        (n >= self.failures)
            .then(|| FakeBackend::with_calls(self.script.clone(), self.calls.clone()))
    }
}
