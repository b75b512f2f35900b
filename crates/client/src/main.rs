//! `storefront-admin`: drive the admin console's auth core from a terminal.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use storefront_auth::UserRole;
use storefront_client::{AdminClient, ClientConfig, HistoryNavigator, NewUser};

/// storefront-admin - storefront admin console client
#[derive(Parser, Debug)]
#[command(name = "storefront-admin")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in and store the session token
    Login {
        username: String,

        #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account (does not log in)
    Register {
        username: String,

        email: String,

        #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
        password: String,

        /// USER or ADMIN
        #[arg(long, default_value = "USER")]
        role: UserRole,
    },

    /// Forget the stored session
    Logout,

    /// Show the current session
    Whoami,

    /// Try to open a console view, running its route guards
    Open {
        /// e.g. /products/3
        path: String,
    },

    /// GET an API path with the session's bearer token
    Get {
        /// Relative to the API base, e.g. products
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    storefront_observability::init();
    let cli = Cli::parse();

    let config = ClientConfig::from_env().context("failed to read client configuration")?;
    let navigator = Arc::new(HistoryNavigator::new());
    let client = AdminClient::init(&config, navigator.clone())
        .context("failed to initialize admin client")?;

    let output = match cli.command {
        Commands::Login { username, password } => {
            let outcome = client
                .gateway
                .login(&username, &password)
                .await
                .context("login failed")?;
            json!({
                "username": username,
                "role": outcome.role,
                "admin": client.store.is_admin(),
            })
        }
        Commands::Register {
            username,
            email,
            password,
            role,
        } => {
            let user = NewUser {
                username,
                password,
                email,
                role,
            };
            let created = client
                .gateway
                .register(&user)
                .await
                .context("registration failed")?;
            serde_json::to_value(created)?
        }
        Commands::Logout => {
            client.gateway.logout();
            json!({ "authenticated": false, "navigated_to": navigator.current() })
        }
        Commands::Whoami => whoami(&client),
        Commands::Open { path } => {
            let activation = client.router.activate(&path);
            json!({
                "activation": activation,
                "navigated_to": navigator.current(),
            })
        }
        Commands::Get { path } => client
            .api
            .get_json::<serde_json::Value>(&path)
            .await
            .with_context(|| format!("GET {path} failed"))?,
    };

    client.dispose();
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn whoami(client: &AdminClient) -> serde_json::Value {
    let session = client.store.get();
    let claims = match session.claims() {
        Some(Ok(claims)) => {
            let window = claims
                .time_window(chrono::Utc::now())
                .map_or_else(|e| e.to_string(), |()| "valid".to_string());
            json!({
                "sub": claims.sub,
                "role": claims.role,
                "issued_at": claims.issued_at(),
                "expires_at": claims.expires_at(),
                "time_window": window,
            })
        }
        Some(Err(err)) => json!({ "error": err.to_string() }),
        None => serde_json::Value::Null,
    };

    json!({
        "authenticated": session.is_authenticated(),
        "admin": session.is_admin(),
        "username": session.username(),
        "claims": claims,
        "accessible": client.router.accessible(),
    })
}
