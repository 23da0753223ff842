// ABOUTME: Client configuration and model switching for the active assistant.
// ABOUTME: Decodes GetClientConfig and plans whether a model needs downloading first.

use std::path::{Path, PathBuf};

use aab_proto::{SetActiveAssistantRequest, SetModelsRequest};
use serde::{Deserialize, Serialize};

use crate::backend::Middleware;
use crate::error::ClientError;

/// `model_type` of the chat model entry.
pub const CHAT_MODEL: &str = "chat_model";

/// One model known to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub full_name: String,
    #[serde(default)]
    pub model_type: Option<String>,
    #[serde(default)]
    pub download_link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveAssistant {
    /// Models currently selected, one per type.
    #[serde(default)]
    pub models: Vec<ModelEntry>,
    /// Every model the assistant can use.
    #[serde(default)]
    pub all_models: Vec<ModelEntry>,
}

/// Subset of the backend's client configuration this client relies on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(rename = "ActiveAssistant", default)]
    pub active_assistant: ActiveAssistant,
    /// Directory on the backend host holding downloaded models.
    #[serde(default)]
    pub local_model_hub: String,
}

impl ClientConfig {
    /// The selected chat model, if any.
    pub fn active_chat_model(&self) -> Option<&ModelEntry> {
        self.active_assistant
            .models
            .iter()
            .find(|m| m.model_type.as_deref() == Some(CHAT_MODEL))
    }

    /// Where a model would live inside the local hub.
    pub fn model_dir(&self, model_name: &str) -> PathBuf {
        Path::new(&self.local_model_hub).join(model_name)
    }
}

/// What switching to a model requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSwitchPlan {
    /// The chosen model is already the active chat model.
    AlreadyActive,
    /// The model folder is missing; download first.
    Download {
        model_name: String,
        url: String,
        hub: String,
    },
    /// The model is present locally.
    Switch { model_name: String },
}

/// Decide how to switch to `all_models[index]`.
pub fn plan_model_switch(config: &ClientConfig, index: usize) -> Result<ModelSwitchPlan, ClientError> {
    let target = config
        .active_assistant
        .all_models
        .get(index)
        .ok_or_else(|| ClientError::Validation(format!("no model at index {index}")))?;

    if config
        .active_chat_model()
        .is_some_and(|active| active.full_name == target.full_name)
    {
        return Ok(ModelSwitchPlan::AlreadyActive);
    }

    if config.model_dir(&target.full_name).exists() {
        return Ok(ModelSwitchPlan::Switch {
            model_name: target.full_name.clone(),
        });
    }

    let url = target.download_link.clone().ok_or_else(|| {
        ClientError::Validation(format!("model '{}' has no download link", target.full_name))
    })?;
    Ok(ModelSwitchPlan::Download {
        model_name: target.full_name.clone(),
        url,
        hub: config.local_model_hub.clone(),
    })
}

/// Fetch and decode the backend's client configuration.
pub async fn get_client_config<M>(backend: &M) -> Result<ClientConfig, ClientError>
where
    M: Middleware + ?Sized,
{
    let response = backend
        .get_client_config()
        .await
        .map_err(ClientError::rpc("GetClientConfig"))?;
    serde_json::from_str(&response.data)
        .map_err(|e| ClientError::Protocol(format!("client config: {e}")))
}

/// Make `assistant` active with the given models (JSON encoded).
pub async fn set_active_assistant<M>(
    backend: &M,
    assistant: &str,
    models_json: &str,
) -> Result<String, ClientError>
where
    M: Middleware + ?Sized,
{
    let response = backend
        .set_active_assistant(SetActiveAssistantRequest {
            assistant: assistant.to_string(),
            models_json: models_json.to_string(),
        })
        .await
        .map_err(ClientError::rpc("SetActiveAssistant"))?;
    Ok(response.message)
}

/// Switch to a locally present model.
///
/// Refuses without calling the backend when `local_model_dir` is missing.
pub async fn switch_model<M>(
    backend: &M,
    local_model_dir: &Path,
    model_name: &str,
) -> Result<String, ClientError>
where
    M: Middleware + ?Sized,
{
    if !local_model_dir.exists() {
        return Err(ClientError::Validation(format!(
            "Local folder for model '{model_name}' does not exist."
        )));
    }
    let response = backend
        .set_models(SetModelsRequest {
            assistant: model_name.to_string(),
        })
        .await
        .map_err(ClientError::rpc("SetModels"))?;
    Ok(response.message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(hub: &str) -> ClientConfig {
        let data = serde_json::json!({
            "ActiveAssistant": {
                "models": [
                    {"full_name": "bge-base", "model_type": "embedding_model"},
                    {"full_name": "Qwen2-7B-Instruct-int4", "model_type": "chat_model"}
                ],
                "all_models": [
                    {"full_name": "Qwen2-7B-Instruct-int4", "download_link": "https://models/qwen"},
                    {"full_name": "Phi-3-mini-4k-instruct-int4-ov", "download_link": "https://models/phi"},
                    {"full_name": "NoLink"}
                ]
            },
            "local_model_hub": hub,
            "unrelated": {"kept": false}
        });
        serde_json::from_value(data).unwrap()
    }

    #[test]
    fn test_active_chat_model() {
        let cfg = config("/hub");
        assert_eq!(
            cfg.active_chat_model().map(|m| m.full_name.as_str()),
            Some("Qwen2-7B-Instruct-int4")
        );
    }

    #[test]
    fn test_plan_already_active() {
        assert_eq!(
            plan_model_switch(&config("/hub"), 0).unwrap(),
            ModelSwitchPlan::AlreadyActive
        );
    }

    #[test]
    fn test_plan_download_when_missing() {
        let plan = plan_model_switch(&config("/definitely/not/here"), 1).unwrap();
        assert_eq!(
            plan,
            ModelSwitchPlan::Download {
                model_name: "Phi-3-mini-4k-instruct-int4-ov".into(),
                url: "https://models/phi".into(),
                hub: "/definitely/not/here".into(),
            }
        );
    }

    #[test]
    fn test_plan_switch_when_present() {
        let hub = tempfile::tempdir().unwrap();
        std::fs::create_dir(hub.path().join("Phi-3-mini-4k-instruct-int4-ov")).unwrap();
        let plan = plan_model_switch(&config(&hub.path().to_string_lossy()), 1).unwrap();
        assert_eq!(
            plan,
            ModelSwitchPlan::Switch {
                model_name: "Phi-3-mini-4k-instruct-int4-ov".into()
            }
        );
    }

    #[test]
    fn test_plan_rejects_bad_index_and_missing_link() {
        let cfg = config("/definitely/not/here");
        assert!(matches!(
            plan_model_switch(&cfg, 9),
            Err(ClientError::Validation(_))
        ));
        assert!(matches!(
            plan_model_switch(&cfg, 2),
            Err(ClientError::Validation(_))
        ));
    }
}
