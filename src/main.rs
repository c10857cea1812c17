use anyhow::{Context, Result};
use clap::Parser;
use engine_client::{Config, LogMarker};
use serde_json::Value;

/// engine-client - authenticated requests against the engine API
///
/// Requests are signed with Hawk credentials. The client logs in with the
/// given username and password when the engine rejects a request.
///
/// Examples:
///   engine-client get users/42
///   engine-client post users --data '{"name": "bob"}'
#[derive(Parser, Debug)]
#[command(author, version = engine_client::VERSION, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Engine base URL
    #[arg(long, env = "ENGINE_HOST", value_name = "URL", global = true)]
    pub host: Option<String>,

    /// Username for the auth endpoint
    #[arg(long, short = 'u', env = "ENGINE_USERNAME", global = true)]
    pub username: Option<String>,

    /// Password for the auth endpoint
    #[arg(long, short = 'p', env = "ENGINE_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,

    /// Text appended to the completion log line
    #[arg(long, global = true, conflicts_with = "quiet")]
    pub marker: Option<String>,

    /// Do not log the completion line
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// GET a resource
    Get(PathArgs),
    /// DELETE a resource
    Delete(PathArgs),
    /// POST a JSON body
    Post(BodyArgs),
    /// PATCH a JSON body
    Patch(BodyArgs),
    /// PUT a JSON body
    Put(BodyArgs),
}

#[derive(clap::Args, Debug)]
pub struct PathArgs {
    /// Path relative to the engine host, e.g. "users/42"
    pub path: String,
}

#[derive(clap::Args, Debug)]
pub struct BodyArgs {
    /// Path relative to the engine host
    pub path: String,

    /// JSON request body
    #[arg(long, short = 'd', value_name = "JSON")]
    pub data: String,
}

impl Cli {
    fn config(&self) -> Result<Config> {
        let host = self
            .host
            .as_deref()
            .context("Engine host is required (--host or ENGINE_HOST)")?;
        Ok(Config::new(
            host,
            self.username.as_deref().unwrap_or_default(),
            self.password.as_deref().unwrap_or_default(),
        ))
    }

    fn log_marker(&self) -> LogMarker {
        if self.quiet {
            LogMarker::Suppress
        } else {
            LogMarker::from(self.marker.clone().unwrap_or_default())
        }
    }
}

fn parse_body(data: &str) -> Result<Value> {
    serde_json::from_str(data).with_context(|| format!("Invalid JSON body: {}", data))
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let client = cli.config()?.build_client()?;
    let marker = cli.log_marker();

    let body = match &cli.command {
        Commands::Get(args) => client.get(&args.path, marker).await?,
        Commands::Delete(args) => client.delete(&args.path, marker).await?,
        Commands::Post(args) => {
            client
                .post(&args.path, parse_body(&args.data)?, marker)
                .await?
        }
        Commands::Patch(args) => {
            client
                .patch(&args.path, parse_body(&args.data)?, marker)
                .await?
        }
        Commands::Put(args) => client.put(&args.path, parse_body(&args.data)?, marker).await?,
    };

    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
