// ABOUTME: Example scenarios driven from the interactive menu.
// ABOUTME: Each scenario reports its own failure and hands control back to the caller.

use std::fmt;
use std::path::Path;

use aab_client::{
    download_model, drain_chat, end_session, init_session, list_files, plan_model_switch,
    remove_files, send_chat, switch_model, upload_files, BarObserver, ChatOptions, ClientConfig,
    ClientError, Middleware, ModelSwitchPlan, SessionId, Silent, TransferKind, TransferOutcome,
    IMAGE_QUERY,
};

use crate::config::Config;

/// Menu entries, numbered as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    SimpleChat,
    KnowledgeChat,
    ImageQuery,
    SwitchModel,
}

impl Scenario {
    pub const ALL: [Scenario; 4] = [
        Scenario::SimpleChat,
        Scenario::KnowledgeChat,
        Scenario::ImageQuery,
        Scenario::SwitchModel,
    ];

    pub fn number(self) -> u8 {
        match self {
            Scenario::SimpleChat => 1,
            Scenario::KnowledgeChat => 2,
            Scenario::ImageQuery => 3,
            Scenario::SwitchModel => 4,
        }
    }

    pub fn from_choice(choice: &str) -> Option<Self> {
        let n: u8 = choice.trim().parse().ok()?;
        Self::ALL.into_iter().find(|s| s.number() == n)
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Scenario::SimpleChat => "Execute simple chat",
            Scenario::KnowledgeChat => "Execute simple chat with Knowledge Base",
            Scenario::ImageQuery => "Execute Image Query",
            Scenario::SwitchModel => "Switch chat model",
        };
        f.write_str(s)
    }
}

/// Menu text listing every scenario plus the exit entry.
pub fn menu_text() -> String {
    let mut text = String::from("Select which example to run:\n");
    for scenario in Scenario::ALL {
        text.push_str(&format!("{}. {}\n", scenario.number(), scenario));
    }
    text.push_str("\n0. Exit\n");
    text
}

/// Print a scenario failure. Returns whether the scenario succeeded.
pub fn report(result: Result<(), ClientError>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "scenario failed");
            println!("Error: {e}");
            false
        }
    }
}

/// Send one prompt and print the streamed reply as it arrives.
async fn ask<M>(
    backend: &M,
    prompt: &str,
    options: ChatOptions,
) -> Result<String, ClientError>
where
    M: Middleware + ?Sized,
{
    println!("Prompt: {prompt}");
    let turn = send_chat(backend, prompt, &options).await?;
    drain_chat(turn.stream, true).await
}

/// Remove a session, tolerating a backend that already forgot it.
async fn close_session<M>(backend: &M, session_id: SessionId)
where
    M: Middleware + ?Sized,
{
    if let Err(e) = end_session(backend, session_id).await {
        tracing::warn!(%session_id, error = %e, "session removal failed");
        println!("Could not remove session {session_id}: {e}");
    }
}

pub async fn simple_chat<M>(backend: &M, config: &Config) -> Result<(), ClientError>
where
    M: Middleware + ?Sized,
{
    let session_id = init_session(backend).await?;
    let options = ChatOptions::default()
        .in_session(session_id)
        .with_name(config.server.client_name.clone());
    let result = ask(backend, &config.scenarios.chat_prompt, options).await;
    close_session(backend, session_id).await;
    result.map(|_| ())
}

/// Upload, list, chat, then clean up both the files and the session.
pub async fn knowledge_chat<M>(backend: &M, config: &Config) -> Result<(), ClientError>
where
    M: Middleware + ?Sized,
{
    let files = &config.scenarios.knowledge_files;
    let mut bar = BarObserver::new(TransferKind::Upload);
    let outcome = upload_files(backend, files, &mut bar).await?;
    if outcome == TransferOutcome::NothingToTransfer {
        println!("No files uploaded.");
    }

    let indexed = list_files(backend).await?;
    println!("Files in knowledge base: {}", indexed.len());
    for file in &indexed {
        println!("  {file}");
    }

    let session_id = init_session(backend).await?;
    let options = ChatOptions::default()
        .in_session(session_id)
        .with_name(config.server.client_name.clone());
    let result = ask(backend, &config.scenarios.knowledge_prompt, options).await;

    match remove_files(backend, files, &mut Silent).await {
        Ok(Some(status)) => println!("{status}"),
        Ok(None) => {}
        Err(e) => println!("Error removing files: {e}"),
    }
    close_session(backend, session_id).await;
    result.map(|_| ())
}

pub async fn image_query<M>(backend: &M, config: &Config) -> Result<(), ClientError>
where
    M: Middleware + ?Sized,
{
    let attachments: Vec<String> = config
        .scenarios
        .image_files
        .iter()
        .map(|p| absolute_display(p))
        .collect();

    let session_id = init_session(backend).await?;
    let options = ChatOptions::default()
        .in_session(session_id)
        .with_name(config.server.client_name.clone())
        .with_attachments(attachments)
        .with_query_type(IMAGE_QUERY);
    let result = ask(backend, &config.scenarios.image_prompt, options).await;
    close_session(backend, session_id).await;
    result.map(|_| ())
}

fn absolute_display(path: &Path) -> String {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .into_owned()
}

/// One line per selectable model, marking the active chat model.
pub fn model_menu(config: &ClientConfig) -> Vec<String> {
    let active = config.active_chat_model().map(|m| m.full_name.as_str());
    config
        .active_assistant
        .all_models
        .iter()
        .enumerate()
        .map(|(index, model)| {
            if Some(model.full_name.as_str()) == active {
                format!("{index}. Model: {} (Active)", model.full_name)
            } else {
                format!("{index}. Model: {}", model.full_name)
            }
        })
        .collect()
}

/// Switch to `all_models[index]`, downloading it first when missing locally.
pub async fn switch_to_model<M>(
    backend: &M,
    client_config: &ClientConfig,
    index: usize,
) -> Result<(), ClientError>
where
    M: Middleware + ?Sized,
{
    let model_name = match plan_model_switch(client_config, index)? {
        ModelSwitchPlan::AlreadyActive => {
            println!("Model is already active.");
            return Ok(());
        }
        ModelSwitchPlan::Switch { model_name } => {
            println!("Model '{model_name}' already exists. Switching...");
            model_name
        }
        ModelSwitchPlan::Download {
            model_name,
            url,
            hub,
        } => {
            println!("Local folder for model '{model_name}' does not exist.  Downloading...");
            let mut bar = BarObserver::new(TransferKind::Download);
            match download_model(backend, &url, &hub, &mut bar).await? {
                TransferOutcome::Completed => model_name,
                other => {
                    return Err(ClientError::Transfer(format!(
                        "download of '{model_name}' did not complete: {other:?}"
                    )))
                }
            }
        }
    };

    let message = switch_model(backend, &client_config.model_dir(&model_name), &model_name).await?;
    println!("{message}");
    Ok(())
}
