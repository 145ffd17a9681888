use std::process::ExitCode;

use authgate::{AuthForm, AuthOperation, FormError, Gateway, GatewayConfig, GatewayError, UsernamePolicy};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Form(#[from] FormError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "authgate", about = "Log in or sign up against the auth backend")]
struct Cli {
    /// Backend base URL. Falls back to `BACKEND_HOST`.
    #[arg(long, global = true)]
    backend_host: Option<String>,

    /// Send a `username` derived from the email's local part.
    #[arg(long, global = true, default_value_t = false)]
    derive_username: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// POST /auth/login
    Login(CredentialArgs),
    /// POST /auth/sign_up
    SignUp(CredentialArgs),
}

#[derive(Args, Debug)]
struct CredentialArgs {
    #[arg(long)]
    email: String,

    #[arg(long, env = "AUTH_PASSWORD", hide_env_values = true)]
    password: String,
}

impl Command {
    fn into_form(self) -> AuthForm {
        match self {
            Self::Login(args) => AuthForm::with_input(AuthOperation::Login, args.email, args.password),
            Self::SignUp(args) => AuthForm::with_input(AuthOperation::SignUp, args.email, args.password),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();
    init_tracing();
    report_dotenv(dotenv);

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("warning: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Log how `.env` loading went. The file itself is read before tracing starts.
fn report_dotenv(result: Result<std::path::PathBuf, dotenvy::Error>) {
    match result {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, ".env present but not loaded"),
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = build_config(cli.backend_host.as_deref(), cli.derive_username)?;
    let gateway = Gateway::from_config(config)?;
    let form = cli.command.into_form();

    tracing::info!(page = form.page_title(), host = %gateway.config().backend_host, "submitting");
    let details = form.submit(&gateway).await?;
    print_json(&details)
}

fn build_config(backend_host: Option<&str>, derive_username: bool) -> Result<GatewayConfig, GatewayError> {
    let config = match backend_host {
        Some(host) => GatewayConfig::from_env_with_host(host)?,
        None => GatewayConfig::from_env()?,
    };
    if derive_username {
        return Ok(config.with_username_policy(UsernamePolicy::DeriveFromEmail));
    }
    Ok(config)
}

fn print_json(value: &Value) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
