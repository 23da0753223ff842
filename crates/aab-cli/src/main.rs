// ABOUTME: Entry point for the aab command-line client.
// ABOUTME: Parses arguments, loads config, and runs each subcommand inside the lifecycle controller.

use std::io::Write;
use std::path::{Path, PathBuf};

use aab_cli::config::Config;
use aab_cli::scenarios::{self, Scenario};
use aab_client::{
    download_model, drain_chat, end_session, get_client_config, list_files, list_sessions,
    remove_files, send_chat, set_active_assistant, set_parameters, upload_files, BarObserver,
    ChatOptions, ClientError, GrpcConnector, Lifecycle, Middleware, SessionExit, SessionId,
    TransferKind, TransferObserver, TransferOutcome, IMAGE_QUERY,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

#[derive(Parser)]
#[command(name = "aab")]
#[command(about = "Client for the AI Assistant Builder middleware")]
#[command(version)]
struct Cli {
    /// Middleware address, host:port or URL (overrides the config file)
    #[arg(short, long, global = true, env = "AAB_SERVER")]
    server: Option<String>,

    /// Config file path (defaults to ~/.config/aab/config.toml)
    #[arg(short, long, global = true, env = "AAB_CONFIG")]
    config: Option<PathBuf>,

    /// Client name sent to the middleware
    #[arg(short, long, global = true, env = "AAB_CLIENT_NAME")]
    name: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive example menu (the default)
    Menu,

    /// Send one prompt and print the streamed reply
    Chat {
        prompt: String,

        /// Continue an existing session instead of starting a new one
        #[arg(long)]
        session: Option<u32>,

        /// Files attached to the prompt
        #[arg(long = "attach")]
        attachments: Vec<String>,

        /// Treat the attachments as images
        #[arg(long)]
        image: bool,

        /// Leave a newly created session on the backend
        #[arg(long)]
        keep_session: bool,
    },

    /// List chat sessions known to the backend
    Sessions,

    /// Upload files to the knowledge base
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Remove files from the knowledge base
    Remove {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// List files in the knowledge base
    Files,

    /// Download a model into a directory on the backend host
    Download { url: String, local_path: String },

    /// Print the backend's client configuration
    ShowConfig,

    /// List chat models, or switch to the one at INDEX
    SwitchModel { index: Option<usize> },

    /// Send the [parameters] table from the config file
    Params,

    /// Make an assistant active
    Assistant {
        name: String,

        /// Models for the assistant, as a JSON array
        #[arg(long, default_value = "[]")]
        models: String,
    },

    /// Write a default config file
    Init,
}

fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Proxy variables must be gone before any channel exists
    let scrubbed = aab_grpc::scrub_proxy_env();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Menu);

    if matches!(command, Commands::Menu) {
        aab_log::init_file("aab");
    } else {
        aab_log::init();
    }
    for var in scrubbed {
        tracing::debug!(var, "cleared proxy variable");
    }

    if matches!(command, Commands::Init) {
        let path = Config::init()?;
        println!("Config written to {}", path.display());
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(server) = cli.server {
        config.server.address = server;
    }
    if let Some(name) = cli.name {
        config.server.client_name = name;
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let result = runtime.block_on(run(command, config));
    // A blocked stdin read would otherwise hold shutdown until the next newline.
    runtime.shutdown_background();
    result
}

async fn run(command: Commands, config: Config) -> Result<()> {
    let connector = GrpcConnector::new(config.channel_config());
    let mut lifecycle = Lifecycle::new(
        connector,
        config.retry_policy(),
        config.server.client_name.clone(),
    );

    println!("Connecting to {}...", config.server.address);
    let exit = lifecycle
        .run(aab_cli::shutdown_signal(), move |backend| {
            Box::pin(dispatch(backend, command, config))
        })
        .await
        .context("Could not start a session with the middleware")?;

    match exit {
        SessionExit::Completed(()) => Ok(()),
        SessionExit::Failed(e) => Err(e.into()),
        SessionExit::Interrupted => {
            println!("Stopping execution.");
            Ok(())
        }
    }
}

async fn dispatch<M>(backend: &M, command: Commands, config: Config) -> Result<(), ClientError>
where
    M: Middleware + ?Sized,
{
    match command {
        Commands::Menu => run_menu(backend, &config).await,
        Commands::Chat {
            prompt,
            session,
            attachments,
            image,
            keep_session,
        } => {
            let mut options = ChatOptions::default()
                .with_name(config.server.client_name.clone())
                .with_attachments(attachments);
            if let Some(id) = session {
                options = options.in_session(SessionId::new(id));
            }
            if image {
                options = options.with_query_type(IMAGE_QUERY);
            }
            chat_once(backend, &prompt, options, keep_session).await
        }
        Commands::Sessions => {
            let mut sessions: Vec<_> = list_sessions(backend).await?.into_iter().collect();
            sessions.sort();
            for id in sessions {
                println!("{id}");
            }
            Ok(())
        }
        Commands::Upload { files } => {
            let mut bar = BarObserver::new(TransferKind::Upload);
            let outcome = upload_files(backend, &files, &mut bar).await?;
            print_outcome(outcome);
            Ok(())
        }
        Commands::Remove { files } => {
            match remove_files(backend, &files, &mut RejectedPaths).await? {
                Some(status) => println!("{status}"),
                None => println!("No valid file paths to remove."),
            }
            Ok(())
        }
        Commands::Files => {
            let files = list_files(backend).await?;
            if files.is_empty() {
                println!("Knowledge base is empty.");
            }
            for file in files {
                println!("{file}");
            }
            Ok(())
        }
        Commands::Download { url, local_path } => {
            let mut bar = BarObserver::new(TransferKind::Download);
            let outcome = download_model(backend, &url, &local_path, &mut bar).await?;
            print_outcome(outcome);
            Ok(())
        }
        Commands::ShowConfig => {
            let client_config = get_client_config(backend).await?;
            println!("{}", serde_json::to_string_pretty(&client_config)?);
            Ok(())
        }
        Commands::SwitchModel { index } => {
            let client_config = get_client_config(backend).await?;
            match index {
                Some(index) => scenarios::switch_to_model(backend, &client_config, index).await,
                None => {
                    for line in scenarios::model_menu(&client_config) {
                        println!("{line}");
                    }
                    Ok(())
                }
            }
        }
        Commands::Params => {
            let reply = set_parameters(backend, &config.parameters).await?;
            println!("{reply}");
            Ok(())
        }
        Commands::Assistant { name, models } => {
            let reply = set_active_assistant(backend, &name, &models).await?;
            println!("{reply}");
            Ok(())
        }
        // Handled before connecting
        Commands::Init => Ok(()),
    }
}

async fn chat_once<M>(
    backend: &M,
    prompt: &str,
    options: ChatOptions,
    keep_session: bool,
) -> Result<(), ClientError>
where
    M: Middleware + ?Sized,
{
    let minted = options.session_id.is_none();
    let turn = send_chat(backend, prompt, &options).await?;
    let session_id = turn.session_id;
    let result = drain_chat(turn.stream, true).await;

    if minted && !keep_session {
        if let Err(e) = end_session(backend, session_id).await {
            tracing::warn!(%session_id, error = %e, "session removal failed");
        }
    } else {
        println!("Session: {session_id}");
    }
    result.map(|_| ())
}

async fn run_menu<M>(backend: &M, config: &Config) -> Result<(), ClientError>
where
    M: Middleware + ?Sized,
{
    println!("LLM backend is ready.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        println!("\n========================================");
        prompt(&format!("{}\nEnter number: ", scenarios::menu_text()));
        let Some(line) = read_line(&mut lines).await else {
            println!("Exiting...");
            return Ok(());
        };
        let choice = line.trim();
        if choice == "0" {
            println!("Exiting...");
            return Ok(());
        }
        let Some(scenario) = Scenario::from_choice(choice) else {
            println!("Invalid option: {choice}");
            continue;
        };

        println!("{scenario}...");
        let completed = match scenario {
            Scenario::SimpleChat => scenarios::report(scenarios::simple_chat(backend, config).await),
            Scenario::KnowledgeChat => {
                scenarios::report(scenarios::knowledge_chat(backend, config).await)
            }
            Scenario::ImageQuery => scenarios::report(scenarios::image_query(backend, config).await),
            Scenario::SwitchModel => scenarios::report(choose_model(backend, &mut lines).await),
        };
        if completed {
            println!("\n\nExample {} completed.", scenario.number());
        }
    }
}

async fn choose_model<M, R>(backend: &M, lines: &mut Lines<R>) -> Result<(), ClientError>
where
    M: Middleware + ?Sized,
    R: AsyncBufRead + Unpin,
{
    let client_config = get_client_config(backend).await?;
    for line in scenarios::model_menu(&client_config) {
        println!("{line}");
    }
    prompt("Select the model to switch to: ");
    let Some(input) = read_line(lines).await else {
        return Ok(());
    };
    let index = input
        .trim()
        .parse::<usize>()
        .map_err(|_| ClientError::Validation(format!("invalid selection '{}'", input.trim())))?;
    scenarios::switch_to_model(backend, &client_config, index).await
}

/// Next stdin line, or `None` at end of input.
async fn read_line<R>(lines: &mut Lines<R>) -> Option<String>
where
    R: AsyncBufRead + Unpin,
{
    match lines.next_line().await {
        Ok(line) => line,
        Err(e) => {
            tracing::warn!(error = %e, "failed to read stdin");
            None
        }
    }
}

fn prompt(text: &str) {
    print!("{text}");
    let _ = std::io::stdout().flush();
}

fn print_outcome(outcome: TransferOutcome) {
    match outcome {
        TransferOutcome::Completed => println!("Transfer complete."),
        TransferOutcome::NothingToTransfer => println!("No valid file paths to upload."),
        TransferOutcome::StreamEnded { last_percent } => {
            println!("Transfer stream ended at {last_percent}%.")
        }
    }
}

/// Prints rejected paths; remove has no progress to draw.
struct RejectedPaths;

impl TransferObserver for RejectedPaths {
    fn on_rejected(&mut self, path: &Path) {
        println!("Invalid file path: {}", path.display());
    }
}
