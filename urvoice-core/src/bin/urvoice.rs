//! Command-line front end for the UrVoice backend.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use urvoice::result::settle;
use urvoice::telemetry::init_logging;
use urvoice::{
    AnalyzeRepository, ApiClient, ArticleRepository, AsyncResult, AudioClip, AuthRepository, Config,
    HistoryRepository, ResultStream, SaveHistoryRequest, SessionStore, SpeechRepository, Storage,
    UserRepository, build_media_url,
};

#[derive(Debug, Parser)]
#[command(name = "urvoice", about = "UrVoice speaking practice client", version)]
struct Cli {
    /// Backend base URL; overrides URVOICE_BASE_URL
    #[arg(long, global = true, value_name = "url")]
    base_url: Option<String>,
    /// Directory for the local database; overrides URVOICE_DATA_DIR
    #[arg(long, global = true, value_name = "dir")]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in and remember the session token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Log out and forget the session token
    Logout,
    /// Create an account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Show the logged-in user
    Me,
    /// List articles
    Articles,
    /// Show one article
    Article { id: i64 },
    /// List practice history, or show one entry
    History { id: Option<i64> },
    /// Upload a WAV recording for transcription
    Transcribe { wav: PathBuf },
    /// Run grammar analysis on a transcript
    Analyze {
        text: String,
        /// Server file name of the recording the text came from
        #[arg(long, value_name = "name")]
        audio_file_name: String,
        /// Also save the result to history
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut config = Config::from_env().context("reading configuration")?;
    if let Some(url) = cli.base_url {
        config = config.with_base_url(url)?;
    }
    if let Some(dir) = cli.data_dir {
        config = config.with_data_dir(dir);
    }
    debug!("Using backend {}", config.base());

    let storage = Arc::new(
        Storage::open(config.database_path())
            .with_context(|| format!("opening {}", config.database_path().display()))?,
    );
    let session: Arc<dyn SessionStore> = storage;
    let api = Arc::new(ApiClient::new(config, Arc::clone(&session))?);

    match cli.command {
        Command::Login { email, password } => {
            let (token, message) = run(AuthRepository::new(api).login(&email, &password)).await?;
            print_message(message);
            println!("logged in as {}", token.email.as_deref().unwrap_or(&email));
        }
        Command::Logout => {
            let (_, message) = run(AuthRepository::new(api).logout()).await?;
            print_message(message);
        }
        Command::Register {
            name,
            email,
            password,
        } => {
            let (user, message) =
                run(AuthRepository::new(api).register(&name, &email, &password)).await?;
            print_message(message);
            if let Some(user) = user {
                print_json(&user)?;
            }
        }
        Command::Me => {
            let base = api.config().base().to_string();
            let (user, _) = run(UserRepository::new(api).current_user()).await?;
            print_json(&user)?;
            let image = build_media_url(&base, user.profile_image.as_deref());
            if !image.is_empty() {
                println!("profile image: {image}");
            }
        }
        Command::Articles => {
            let (articles, _) = run(ArticleRepository::new(api).all_articles()).await?;
            for article in articles {
                println!(
                    "{:>5}  {}",
                    article.id.map(|id| id.to_string()).unwrap_or_default(),
                    article.title.as_deref().unwrap_or("(untitled)")
                );
            }
        }
        Command::Article { id } => {
            let (article, _) = run(ArticleRepository::new(api).article(id)).await?;
            print_json(&article)?;
        }
        Command::History { id: Some(id) } => {
            let (entry, _) = run(HistoryRepository::new(api).history(id)).await?;
            print_json(&entry)?;
        }
        Command::History { id: None } => {
            let (entries, _) = run(HistoryRepository::new(api).all_history()).await?;
            for entry in urvoice::history::sorted_newest_first(&entries) {
                println!(
                    "{:>5}  {}  {}",
                    entry.id.map(|id| id.to_string()).unwrap_or_default(),
                    entry.created_at.as_deref().unwrap_or("-"),
                    entry.original_paragraph.as_deref().unwrap_or_default()
                );
            }
        }
        Command::Transcribe { wav } => {
            let bytes =
                std::fs::read(&wav).with_context(|| format!("reading {}", wav.display()))?;
            let clip = AudioClip::from_wav(&bytes)
                .with_context(|| format!("decoding {}", wav.display()))?;
            debug!("Loaded {} ms of audio", clip.duration_ms());
            let (transcript, _) = run(SpeechRepository::new(api).speech_to_text(clip)).await?;
            print_json(&transcript)?;
        }
        Command::Analyze {
            text,
            audio_file_name,
            save,
        } => {
            let (analysis, _) =
                run(AnalyzeRepository::new(Arc::clone(&api)).analyze(&text, &audio_file_name))
                    .await?;
            print_json(&analysis)?;
            if save {
                let request = SaveHistoryRequest::from_analysis(&audio_file_name, &text, &analysis);
                let (entry, message) = run(HistoryRepository::new(api).save_history(request)).await?;
                print_message(message);
                println!("saved as entry {}", entry.id.unwrap_or_default());
            }
        }
    }

    Ok(())
}

/// Drive a result stream to its end and turn the outcome into an anyhow result
async fn run<T>(results: ResultStream<T>) -> anyhow::Result<(T, Option<String>)> {
    match settle(results).await {
        AsyncResult::Success { value, message } => Ok((value, message)),
        AsyncResult::Error(failure) => bail!("{} ({:?})", failure.message, failure.kind),
        AsyncResult::Initial | AsyncResult::Loading => bail!("request produced no result"),
    }
}

fn print_message(message: Option<String>) {
    if let Some(message) = message.filter(|m| !m.is_empty()) {
        println!("{message}");
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
