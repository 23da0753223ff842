// ABOUTME: Session and streaming protocol client for the AI Assistant Builder middleware.
// ABOUTME: Sessions, chat streams, transfer progress, knowledge base, models, and lifecycle control.

pub mod backend;
pub mod chat;
pub mod error;
pub mod knowledge;
pub mod lifecycle;
pub mod model;
pub mod parameters;
pub mod progress;
pub mod session;
pub mod transfer;

pub use backend::Middleware;
pub use chat::{
    attachments_json, build_chat_request, decode_chunk, drain_chat, drain_chat_to, end_session,
    send_chat, ChatOptions, ChatTurn, DEFAULT_CLIENT_NAME, IMAGE_QUERY, NO_ATTACHMENTS,
};
pub use error::ClientError;
pub use knowledge::{list_files, remove_files};
pub use lifecycle::{
    check_backend, warmup, Connector, GrpcConnector, Lifecycle, LifecycleState, SessionExit,
};
pub use model::{
    get_client_config, plan_model_switch, set_active_assistant, switch_model, ClientConfig,
    ModelEntry, ModelSwitchPlan,
};
pub use parameters::{set_parameters, Parameters};
pub use progress::BarObserver;
pub use session::{init_session, list_sessions, new_session_id, SessionId};
pub use transfer::{
    download_model, upload_files, Silent, TransferKind, TransferObserver, TransferOutcome,
};

// Re-export transport types for convenience
pub use aab_grpc;
pub use aab_proto;
