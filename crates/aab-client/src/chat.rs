// ABOUTME: Chat stream client: builds chat requests and reduces reply streams to text.
// ABOUTME: Fragments are joined in arrival order and can be echoed as they arrive.

use std::io::Write;

use aab_grpc::ResponseStream;
use aab_proto::{ChatRequest, ChatResponse, RemoveSessionRequest};
use futures::StreamExt;
use serde_json::{Map, Value};

use crate::backend::Middleware;
use crate::error::ClientError;
use crate::session::{init_session, SessionId};

/// Client name sent when the caller does not supply one.
pub const DEFAULT_CLIENT_NAME: &str = "AAB Rust Client";

/// Wire value for "no attachments".
pub const NO_ATTACHMENTS: &str = "[]";

/// Query type tag for image questions.
pub const IMAGE_QUERY: &str = "image";

/// Optional parts of a chat turn.
#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    /// Existing session to continue. A new one is minted when absent.
    pub session_id: Option<SessionId>,
    /// Client name reported to the backend.
    pub name: Option<String>,
    /// Local paths attached to the prompt.
    pub attachments: Vec<String>,
    /// Query type tag, e.g. [`IMAGE_QUERY`].
    pub query_type: Option<String>,
}

impl ChatOptions {
    pub fn in_session(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_attachments<I, S>(mut self, attachments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attachments = attachments.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_query_type(mut self, query_type: impl Into<String>) -> Self {
        self.query_type = Some(query_type.into());
        self
    }
}

/// Encode attachments as a JSON array string; `[]` when empty.
pub fn attachments_json(attachments: &[String]) -> Result<String, ClientError> {
    if attachments.is_empty() {
        return Ok(NO_ATTACHMENTS.to_string());
    }
    serde_json::to_string(attachments)
        .map_err(|e| ClientError::Validation(format!("attachments: {e}")))
}

/// Build the wire request for one chat turn.
pub fn build_chat_request(
    prompt: &str,
    session_id: SessionId,
    options: &ChatOptions,
) -> Result<ChatRequest, ClientError> {
    Ok(ChatRequest {
        name: options
            .name
            .clone()
            .unwrap_or_else(|| DEFAULT_CLIENT_NAME.to_string()),
        prompt: prompt.to_string(),
        session_id: session_id.to_wire()?,
        attached_files: attachments_json(&options.attachments)?,
        query_type: options.query_type.clone(),
    })
}

/// A chat turn in flight: the session it belongs to and the raw reply stream.
pub struct ChatTurn {
    pub session_id: SessionId,
    pub stream: ResponseStream<ChatResponse>,
}

/// Issue a streaming chat call. Mints a session first when none is given.
///
/// The returned stream is not consumed; pass it to [`drain_chat`].
pub async fn send_chat<M>(
    backend: &M,
    prompt: &str,
    options: &ChatOptions,
) -> Result<ChatTurn, ClientError>
where
    M: Middleware + ?Sized,
{
    let session_id = match options.session_id {
        Some(id) => id,
        None => init_session(backend).await?,
    };
    let request = build_chat_request(prompt, session_id, options)?;
    tracing::debug!(
        %session_id,
        query_type = ?request.query_type,
        attachments = %request.attached_files,
        "sending chat"
    );

    let stream = backend
        .chat(request)
        .await
        .map_err(|status| ClientError::Stream(status.message().to_string()))?;
    Ok(ChatTurn { session_id, stream })
}

/// Extract the text fragment from one chunk's JSON envelope.
///
/// A missing `message` field is an empty fragment; anything that is not a
/// JSON object with a string `message` is a protocol error.
pub fn decode_chunk(chunk: &ChatResponse) -> Result<String, ClientError> {
    let envelope: Map<String, Value> = serde_json::from_str(&chunk.message)
        .map_err(|e| ClientError::Protocol(format!("chat chunk: {e}")))?;
    match envelope.get("message") {
        None => Ok(String::new()),
        Some(Value::String(text)) => Ok(text.clone()),
        Some(other) => Err(ClientError::Protocol(format!(
            "chat chunk: `message` is not a string: {other}"
        ))),
    }
}

/// Consume a reply stream, writing each fragment to `echo` as soon as it arrives.
///
/// On a transport error the partial reply is dropped and the error returned.
pub async fn drain_chat_to<W: Write>(
    mut stream: ResponseStream<ChatResponse>,
    mut echo: Option<&mut W>,
) -> Result<String, ClientError> {
    let mut reply = String::new();
    while let Some(item) = stream.next().await {
        let chunk = item.map_err(|status| ClientError::Stream(status.message().to_string()))?;
        let fragment = decode_chunk(&chunk)?;
        if let Some(out) = echo.as_mut() {
            out.write_all(fragment.as_bytes())
                .and_then(|_| out.flush())
                .map_err(|e| ClientError::Stream(format!("echo failed: {e}")))?;
        }
        reply.push_str(&fragment);
    }
    Ok(reply)
}

/// Consume a reply stream into one string, echoing to stdout when `verbose`.
pub async fn drain_chat(
    stream: ResponseStream<ChatResponse>,
    verbose: bool,
) -> Result<String, ClientError> {
    if !verbose {
        return drain_chat_to::<std::io::Stdout>(stream, None).await;
    }
    println!("Response:");
    let mut stdout = std::io::stdout();
    let reply = drain_chat_to(stream, Some(&mut stdout)).await?;
    println!("\n");
    Ok(reply)
}

/// Remove a session on the backend.
///
/// Callers should treat a failure for an already-removed id as non-fatal.
pub async fn end_session<M>(backend: &M, session_id: SessionId) -> Result<(), ClientError>
where
    M: Middleware + ?Sized,
{
    backend
        .remove_session(RemoveSessionRequest {
            session_id: session_id.to_wire()?,
        })
        .await
        .map_err(ClientError::rpc("RemoveSession"))?;
    tracing::debug!(%session_id, "session removed");
    Ok(())
}
