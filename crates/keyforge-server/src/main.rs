use clap::{Parser, Subcommand};
use uuid::Uuid;

use keyforge_auth::secret;
use keyforge_server::{AppContext, ServerConfig, load_config, observability};

#[derive(Parser)]
#[command(name = "keyforge-server")]
#[command(about = "Keyforge OAuth 2.0 authorization server")]
#[command(version)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, env = "KEYFORGE_CONFIG", default_value = "keyforge.toml")]
    config: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the authorization server (default)
    Serve(ServeArgs),
    /// Hash a password and print a bootstrap user entry
    InitUser(InitUserArgs),
    /// Generate client credentials and print a bootstrap client entry
    InitClient(InitClientArgs),
}

#[derive(clap::Args)]
struct ServeArgs {
    /// Listen address (overrides config)
    #[arg(long)]
    listen: Option<String>,
}

#[derive(clap::Args)]
struct InitUserArgs {
    /// Login email
    #[arg(long)]
    email: String,
    /// Plaintext password to hash
    #[arg(long)]
    password: String,
}

#[derive(clap::Args)]
struct InitClientArgs {
    /// Display name
    #[arg(long)]
    name: String,
    /// Allowed redirect URI (repeatable)
    #[arg(long = "redirect-uri", required = true)]
    redirect_uris: Vec<String>,
}

#[tokio::main]
async fn main() {
    // Load .env if present; a missing file is not an error.
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("Warning: failed to load .env file: {e}");
        }
    }

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::InitUser(args)) => init_user(&args),
        Some(Commands::InitClient(args)) => init_client(&args),
        Some(Commands::Serve(args)) => serve(&cli.config, args.listen.as_deref()).await,
        None => serve(&cli.config, None).await,
    }
}

async fn serve(config_path: &str, listen_override: Option<&str>) {
    observability::init_tracing("info");

    let mut config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    if let Some(listen) = listen_override {
        config.listen = listen.to_string();
    }

    if let Err(e) = config.auth.validate() {
        eprintln!("Configuration error: {e}");
        std::process::exit(2);
    }

    tracing::info!(path = %config_path, "configuration loaded");

    if let Err(e) = run(config).await {
        eprintln!("Server error: {e}");
        std::process::exit(1);
    }
}

async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let context = AppContext::new(&config.auth);
    context.seed(&config.bootstrap).await?;
    let _cleanup = context.spawn_cleanup_task(std::time::Duration::from_secs(300));

    let app = context.router();

    let listener = tokio::net::TcpListener::bind(&config.listen).await?;
    tracing::info!(listen = %config.listen, issuer = %config.auth.issuer, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}

/// Prints a `[[bootstrap.users]]` entry for the configuration file.
fn init_user(args: &InitUserArgs) {
    let password_hash = match secret::hash_password(&args.password) {
        Ok(h) => h,
        Err(e) => {
            eprintln!("Failed to hash password: {e}");
            std::process::exit(1);
        }
    };

    println!("[[bootstrap.users]]");
    println!("email = \"{}\"", args.email);
    println!("password_hash = \"{password_hash}\"");
}

/// Prints a `[[bootstrap.clients]]` entry and the raw client secret.
///
/// The secret is shown once and only its hash goes into the
/// configuration file.
fn init_client(args: &InitClientArgs) {
    let client_id = Uuid::new_v4().to_string();
    let client_secret = secret::generate_client_secret();

    let secret_hash = match secret::hash_password(&client_secret) {
        Ok(h) => h,
        Err(e) => {
            eprintln!("Failed to hash client secret: {e}");
            std::process::exit(1);
        }
    };

    let uris = args
        .redirect_uris
        .iter()
        .map(|u| format!("\"{u}\""))
        .collect::<Vec<_>>()
        .join(", ");

    println!("# client_secret = {client_secret}");
    println!("# Shown once; store it with the client application.");
    println!("[[bootstrap.clients]]");
    println!("client_id = \"{client_id}\"");
    println!("name = \"{}\"", args.name);
    println!("redirect_uris = [{uris}]");
    println!("secret_hash = \"{secret_hash}\"");
}
