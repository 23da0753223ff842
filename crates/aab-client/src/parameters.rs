// ABOUTME: Generation parameters applied to the active assistant.
// ABOUTME: Defaults mirror the backend's recommended retrieval-augmented chat settings.

use aab_proto::SetParametersRequest;
use serde::{Deserialize, Serialize};

use crate::backend::Middleware;
use crate::error::ClientError;

pub const DEFAULT_RAG_SYSTEM_MESSAGE: &str = "Using the information contained in the context, give a comprehensive answer to the question.\n\n\
Please provide answer with full sentence, and don't end a sentence with colon.\n\n\
If the context is not relevant, please answer the question by using your own knowledge about the topic.";

/// Generation-control values. Partial TOML tables fill in from defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameters {
    pub max_token: i32,
    pub temperature: f32,
    pub retriever_top_k: i32,
    pub reranker_top_k: i32,
    pub reranker_threshold: f32,
    pub max_num_references: i32,
    pub reference_threshold: f32,
    pub input_prompt_safety_threshold: f32,
    pub streaming_batch_size: i32,
    pub rag_system_message: String,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            max_token: 1024,
            temperature: 1.0,
            retriever_top_k: 13,
            reranker_top_k: 4,
            reranker_threshold: 0.0,
            max_num_references: 2,
            reference_threshold: 0.1,
            input_prompt_safety_threshold: 0.75,
            streaming_batch_size: 1,
            rag_system_message: DEFAULT_RAG_SYSTEM_MESSAGE.to_string(),
        }
    }
}

impl Parameters {
    pub fn to_request(&self) -> SetParametersRequest {
        SetParametersRequest {
            max_token: self.max_token,
            temperature: self.temperature,
            retriever_top_k: self.retriever_top_k,
            reranker_top_k: self.reranker_top_k,
            reranker_threshold: self.reranker_threshold,
            max_num_references: self.max_num_references,
            reference_threshold: self.reference_threshold,
            input_prompt_safety_threshold: self.input_prompt_safety_threshold,
            streaming_batch_size: self.streaming_batch_size,
            rag_system_message: self.rag_system_message.clone(),
        }
    }
}

/// Send parameters to the backend; returns its reply message.
pub async fn set_parameters<M>(backend: &M, params: &Parameters) -> Result<String, ClientError>
where
    M: Middleware + ?Sized,
{
    let response = backend
        .set_parameters(params.to_request())
        .await
        .map_err(ClientError::rpc("SetParameters"))?;
    Ok(response.message)
}
