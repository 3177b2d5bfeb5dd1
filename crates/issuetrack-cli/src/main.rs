//! issuetrack - report and browse issues from the terminal.

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use issuetrack_core::auth::{FileStore, KeyringStore};
use issuetrack_core::utils::age_since;
use issuetrack_core::{ApiClient, Config, CredentialBackend, IssueDraft, SessionContext};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use issuetrack_cli::cli::{Cli, Commands, IssueCommands, PasswordArg};
use issuetrack_cli::{App, Notice, NoticeLevel};

/// Directory for an additional log file, if set
const LOG_DIR_ENV: &str = "ISSUETRACK_LOG_DIR";

/// Initialize the tracing subscriber for logging.
///
/// Returns the file writer guard, which must live until exit.
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::env::var(LOG_DIR_ENV) {
        Ok(dir) if !dir.is_empty() => {
            let appender = tracing_appender::rolling::daily(dir, "issuetrack.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

fn load_config(cli: &Cli) -> Config {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        }
    };
    let mut config = config.with_env_overrides();
    if let Some(ref url) = cli.api_url {
        config.api_base_url = url.clone();
    }
    config
}

fn open_session(config: &Config, ephemeral: bool) -> Result<SessionContext> {
    if ephemeral {
        return Ok(SessionContext::in_memory());
    }
    Ok(match config.credential_backend {
        CredentialBackend::File => {
            let data_dir = config.data_dir()?;
            SessionContext::new(FileStore::open(&data_dir).context("Failed to open token store")?)
        }
        CredentialBackend::Keyring => SessionContext::new(KeyringStore::new()?),
    })
}

fn read_password(arg: PasswordArg) -> Result<String> {
    match arg.password {
        Some(password) => Ok(password),
        None => rpassword::prompt_password("Password: ").context("Failed to read password"),
    }
}

fn print_notice(notice: Option<Notice>) {
    if let Some(notice) = notice {
        match notice.level {
            NoticeLevel::Info => println!("{}", notice.text),
            NoticeLevel::Error => eprintln!("{}", notice.text),
        }
    }
}

async fn run(cli: Cli, mut config: Config) -> Result<bool> {
    let session = Arc::new(open_session(&config, cli.ephemeral)?);
    let api = ApiClient::new(&config, session.clone())?;
    let mut app = App::new(api);

    let ok = match cli.command {
        Commands::Login { username, password } => {
            let username = username
                .or_else(|| config.last_username.clone())
                .ok_or_else(|| anyhow::anyhow!("No username given"))?;
            let password = read_password(password)?;
            let ok = app.submit_login(&username, &password).await;
            if ok {
                config.last_username = Some(username);
                if let Err(e) = config.save() {
                    warn!(error = %e, "Failed to save config");
                }
                // Show the dashboard straight away
                print_notice(app.take_notice());
                app.load_issues().await;
                for fragment in &app.issue_fragments {
                    println!("{}", fragment);
                }
            }
            ok
        }
        Commands::Register {
            username,
            email,
            password,
        } => {
            let password = read_password(password)?;
            app.submit_registration(&username, &email, &password).await
        }
        Commands::Logout => app.logout(),
        Commands::Refresh => app.refresh_session().await,
        Commands::Status => {
            println!("Backend: {}", config.base_url());
            if session.is_logged_in() {
                match session.saved_at() {
                    Some(at) => println!("Session: logged in (tokens saved {})", age_since(at)),
                    None => println!("Session: logged in"),
                }
            } else {
                println!("Session: not logged in");
            }
            true
        }
        Commands::Issues { command } => match command {
            IssueCommands::List => {
                app.load_issues().await;
                for fragment in &app.issue_fragments {
                    println!("{}", fragment);
                }
                !app.notice.as_ref().is_some_and(Notice::is_error)
            }
            IssueCommands::Create {
                title,
                location,
                description,
            } => {
                let draft = IssueDraft::new(title, location, description);
                app.submit_issue(&draft).await
            }
        },
    };

    print_notice(app.take_notice());
    Ok(ok)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _log_guard = init_tracing();
    info!("issuetrack starting");

    let config = load_config(&cli);
    let ok = run(cli, config).await?;

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
