// ABOUTME: Prost message definitions for the SuperBuilder middleware service.
// ABOUTME: JSON payloads travel inside string fields, so most messages are thin.

/// Liveness handshake request.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SayHelloRequest {
    #[prost(string, tag = "1")]
    pub name: String,
}

/// Liveness acknowledgement. An empty message means the backend is not ready.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SayHelloResponse {
    #[prost(string, tag = "1")]
    pub message: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LoadModelsRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LoadModelsResponse {
    #[prost(string, tag = "1")]
    pub message: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetChatHistoryRequest {}

/// `data` is a JSON array of session objects, each carrying a `sid` field.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetChatHistoryResponse {
    #[prost(string, tag = "1")]
    pub data: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChatRequest {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub prompt: String,
    #[prost(int32, tag = "3")]
    pub session_id: i32,
    /// Always a JSON array string, `[]` when nothing is attached.
    #[prost(string, tag = "4")]
    pub attached_files: String,
    #[prost(string, optional, tag = "5")]
    pub query_type: Option<String>,
}

/// One streamed chat chunk. `message` holds a JSON envelope, not raw text.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChatResponse {
    #[prost(string, tag = "1")]
    pub message: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RemoveSessionRequest {
    #[prost(int32, tag = "1")]
    pub session_id: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RemoveSessionResponse {
    #[prost(string, tag = "1")]
    pub message: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AddFilesRequest {
    /// JSON array of absolute paths.
    #[prost(string, tag = "1")]
    pub files_to_upload: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AddFilesResponse {
    #[prost(int32, tag = "1")]
    pub current_file_progress: i32,
    #[prost(string, tag = "2")]
    pub files_uploaded: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RemoveFilesRequest {
    /// JSON array of absolute paths.
    #[prost(string, tag = "1")]
    pub files_to_remove: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RemoveFilesResponse {
    #[prost(string, tag = "1")]
    pub files_removed: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetFileListRequest {
    #[prost(string, tag = "1")]
    pub file_type: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetFileListResponse {
    #[prost(string, tag = "1")]
    pub file_list: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DownloadFilesRequest {
    #[prost(string, tag = "1")]
    pub file_url: String,
    #[prost(string, tag = "2")]
    pub local_path: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DownloadFilesResponse {
    #[prost(int32, tag = "1")]
    pub progress: i32,
    #[prost(string, tag = "2")]
    pub file_downloaded: String,
}

/// Generation controls applied to subsequent chat turns.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SetParametersRequest {
    #[prost(int32, tag = "1")]
    pub max_token: i32,
    #[prost(float, tag = "2")]
    pub temperature: f32,
    #[prost(int32, tag = "3")]
    pub retriever_top_k: i32,
    #[prost(int32, tag = "4")]
    pub reranker_top_k: i32,
    #[prost(float, tag = "5")]
    pub reranker_threshold: f32,
    #[prost(int32, tag = "6")]
    pub max_num_references: i32,
    #[prost(float, tag = "7")]
    pub reference_threshold: f32,
    #[prost(float, tag = "8")]
    pub input_prompt_safety_threshold: f32,
    #[prost(int32, tag = "9")]
    pub streaming_batch_size: i32,
    #[prost(string, tag = "10")]
    pub rag_system_message: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SetParametersResponse {
    #[prost(string, tag = "1")]
    pub message: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetClientConfigRequest {}

/// `data` is the client configuration as a JSON object.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetClientConfigResponse {
    #[prost(string, tag = "1")]
    pub data: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SetActiveAssistantRequest {
    #[prost(string, tag = "1")]
    pub assistant: String,
    #[prost(string, tag = "2")]
    pub models_json: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SetActiveAssistantResponse {
    #[prost(string, tag = "1")]
    pub message: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SetModelsRequest {
    #[prost(string, tag = "1")]
    pub assistant: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SetModelsResponse {
    #[prost(string, tag = "1")]
    pub message: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ClientDisconnectedRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ClientDisconnectedResponse {
    #[prost(string, tag = "1")]
    pub message: String,
}
