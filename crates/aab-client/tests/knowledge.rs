// ABOUTME: Integration tests for knowledge-base management, parameters, and model switching.
// ABOUTME: Runs the unary helpers against the scripted fake middleware.

mod support;

use aab_client::{
    get_client_config, list_files, plan_model_switch, remove_files, set_active_assistant,
    set_parameters, switch_model, ClientError, ModelSwitchPlan, Parameters, Silent,
};
use support::{FakeBackend, Script};
use tempfile::TempDir;

#[tokio::test]
async fn test_remove_files_returns_server_status() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("notes.txt");
    std::fs::write(&file, "kb").unwrap();
    let backend = FakeBackend::new(Script {
        files_removed: "Removed 1 file".to_string(),
        ..Script::default()
    });

    let status = remove_files(&backend, &[&file], &mut Silent).await.unwrap();
    assert_eq!(status.as_deref(), Some("Removed 1 file"));

    let requests = backend.calls.remove_files.lock().unwrap();
    let sent: Vec<String> = serde_json::from_str(&requests[0].files_to_remove).unwrap();
    assert_eq!(sent, vec![file.to_string_lossy().into_owned()]);
}

#[tokio::test]
async fn test_remove_files_error_status() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("notes.txt");
    std::fs::write(&file, "kb").unwrap();
    let backend = FakeBackend::new(Script {
        files_removed: "Error: file not indexed".to_string(),
        ..Script::default()
    });

    let err = remove_files(&backend, &[&file], &mut Silent)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Transfer(detail) if detail.contains("not indexed")));
}

#[tokio::test]
async fn test_remove_files_without_valid_paths_makes_no_call() {
    let backend = FakeBackend::new(Script::default());

    let status = remove_files(&backend, &["/nope/missing.txt"], &mut Silent)
        .await
        .unwrap();
    assert_eq!(status, None);
    assert_eq!(backend.calls.count("RemoveFiles"), 0);
}

#[tokio::test]
async fn test_list_files_decodes_array() {
    let backend = FakeBackend::new(Script {
        file_list: r#"[{"name":"a.pdf"},{"name":"b.txt"}]"#.to_string(),
        ..Script::default()
    });

    let files = list_files(&backend).await.unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[1]["name"], "b.txt");
}

#[tokio::test]
async fn test_list_files_rejects_garbage() {
    let backend = FakeBackend::new(Script {
        file_list: "<html>".to_string(),
        ..Script::default()
    });

    assert!(matches!(
        list_files(&backend).await,
        Err(ClientError::Protocol(_))
    ));
}

#[tokio::test]
async fn test_set_parameters_sends_values() {
    let backend = FakeBackend::new(Script::default());
    let params = Parameters {
        max_token: 256,
        ..Parameters::default()
    };

    let message = set_parameters(&backend, &params).await.unwrap();
    assert_eq!(message, "max_token=256");
}

#[tokio::test]
async fn test_model_switch_flow() {
    let hub = TempDir::new().unwrap();
    std::fs::create_dir(hub.path().join("phi-3")).unwrap();
    let config = serde_json::json!({
        "ActiveAssistant": {
            "models": [{ "full_name": "llama-3", "model_type": "chat_model" }],
            "all_models": [
                { "full_name": "llama-3", "model_type": "chat_model" },
                { "full_name": "phi-3", "model_type": "chat_model" },
                { "full_name": "qwen-2", "model_type": "chat_model", "download_link": "https://hub/qwen-2" }
            ]
        },
        "local_model_hub": hub.path().to_string_lossy(),
    });
    let backend = FakeBackend::new(Script {
        client_config: config.to_string(),
        ..Script::default()
    });

    let config = get_client_config(&backend).await.unwrap();
    assert_eq!(
        plan_model_switch(&config, 0).unwrap(),
        ModelSwitchPlan::AlreadyActive
    );
    assert!(matches!(
        plan_model_switch(&config, 2).unwrap(),
        ModelSwitchPlan::Download { ref url, .. } if url == "https://hub/qwen-2"
    ));

    let plan = plan_model_switch(&config, 1).unwrap();
    let ModelSwitchPlan::Switch { model_name } = plan else {
        panic!("expected a local switch, got {plan:?}");
    };
    let message = switch_model(&backend, &config.model_dir(&model_name), &model_name)
        .await
        .unwrap();
    assert_eq!(message, "switched to phi-3");
    assert_eq!(*backend.calls.set_models.lock().unwrap(), vec!["phi-3"]);
}

#[tokio::test]
async fn test_switch_model_refuses_missing_folder() {
    let hub = TempDir::new().unwrap();
    let backend = FakeBackend::new(Script::default());

    let result = switch_model(&backend, &hub.path().join("absent"), "absent").await;
    assert!(matches!(result, Err(ClientError::Validation(_))));
    assert_eq!(backend.calls.count("SetModels"), 0);
}

#[tokio::test]
async fn test_set_active_assistant_passes_models() {
    let backend = FakeBackend::new(Script::default());

    let message = set_active_assistant(&backend, "rag", "[]").await.unwrap();
    assert_eq!(message, "active: rag");
}
