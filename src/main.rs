//! Command-line entry point for the OAuth2 grant flows.
//!
//! Thin wrapper over [`salesforce_rest::auth`]: it loads the connected-app
//! configuration, runs the requested flow and prints the token endpoint's
//! raw output for the operator to persist.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use salesforce_rest::auth;
use salesforce_rest::config::{Config, LoginHost};

#[derive(Parser)]
#[command(name = "sf-rest", version, about = "Salesforce REST API tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// OAuth2 authentication sub-commands.
    Oauth2 {
        /// Path to the connected-app configuration file.
        #[arg(long, default_value = "config.yaml")]
        config: PathBuf,
        /// Authenticate against the sandbox login host.
        #[arg(long, env = "SF_SANDBOX")]
        sandbox: bool,
        #[command(subcommand)]
        command: Oauth2Command,
    },
}

#[derive(Subcommand)]
enum Oauth2Command {
    /// Print the authorization URL for the user-present flow.
    AuthorizeUrl,
    /// Exchange an authorization code for a token response.
    ExchangeCode {
        /// The code from the redirect after authorizing the app.
        authorization_code: String,
    },
    /// Obtain a token via the JWT bearer grant.
    BearerToken {
        /// Path to the connected app's RSA private key (PEM).
        key_file: PathBuf,
        /// Username to obtain a token for.
        user: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Oauth2 {
            config,
            sandbox,
            command,
        } => {
            let config = Config::from_yaml_path(&config)
                .with_context(|| format!("loading {}", config.display()))?;
            let login_host = LoginHost::from_sandbox_flag(sandbox);
            run_oauth2(&config, login_host, command).await
        }
    }
}

async fn run_oauth2(
    config: &Config,
    login_host: LoginHost,
    command: Oauth2Command,
) -> anyhow::Result<()> {
    match command {
        Oauth2Command::AuthorizeUrl => {
            println!("Please go to the following URL and then authenticate the app.");
            println!();
            println!("{}", auth::authorization_request_url(config, login_host));
            println!();
            println!(
                "Once you have been redirected back please copy&paste the authorization code provided."
            );
        }
        Oauth2Command::ExchangeCode { authorization_code } => {
            let response =
                auth::exchange_authorization_code(config, login_host, &authorization_code).await?;
            println!("{}", response.status());
            println!("{}", response.text().await?);
        }
        Oauth2Command::BearerToken { key_file, user } => {
            let private_key = std::fs::read(&key_file)
                .with_context(|| format!("reading {}", key_file.display()))?;
            let response =
                auth::request_jwt_bearer_token(config, login_host, &private_key, &user).await?;
            println!("{}", response.text().await?);
        }
    }
    Ok(())
}
