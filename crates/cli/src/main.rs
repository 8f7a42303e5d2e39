use clap::{Parser, Subcommand};

const DEFAULT_WEBHOOK_URL: &str = "http://localhost:3001/webhook";

#[derive(Parser)]
#[command(name = "helpdesk-relay")]
#[command(about = "Relay Chatwoot conversations to a language model", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and a default config file.
    Init {
        /// Config file path (default: RELAY_CONFIG_PATH or ~/.helpdesk-relay/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },

    /// Run the webhook gateway. Environment variables (and .env) override the config file.
    Serve {
        /// Config file path (default: RELAY_CONFIG_PATH or ~/.helpdesk-relay/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// HTTP port (default from PORT, config, or 3001)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// POST a sample message_created event to a running gateway and print the response.
    SendTestEvent {
        /// Webhook URL (default: WEBHOOK_URL or http://localhost:3001/webhook)
        #[arg(long, env = "WEBHOOK_URL", default_value = DEFAULT_WEBHOOK_URL)]
        url: String,

        #[arg(long, default_value_t = 12345)]
        conversation: i64,

        #[arg(long, default_value = "what about the session management")]
        content: String,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("helpdesk-relay {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("init failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Serve { config, port }) => {
            if let Err(e) = run_serve(config, port).await {
                log::error!("gateway failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::SendTestEvent {
            url,
            conversation,
            content,
        }) => {
            if let Err(e) = run_send_test_event(&url, conversation, &content).await {
                log::error!("test event failed: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn run_init(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(relay::config::default_config_path);
    let dir = relay::init::init_config_dir(&path)?;
    println!("initialized configuration at {}", dir.display());
    Ok(())
}

async fn run_serve(
    config_path: Option<std::path::PathBuf>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let (mut config, path) = relay::config::load_config_with_env(config_path)?;
    if let Some(p) = port {
        config.gateway.port = p;
    }
    log::info!(
        "starting gateway on {}:{} (config {})",
        config.gateway.bind,
        config.gateway.port,
        path.display()
    );
    relay::gateway::run_gateway(config).await
}

async fn run_send_test_event(url: &str, conversation: i64, content: &str) -> anyhow::Result<()> {
    let event = relay::helpdesk::sample_message_created(conversation, content);
    println!("sending message_created for conversation {} to {}", conversation, url);
    let res = reqwest::Client::new().post(url).json(&event).send().await?;
    let status = res.status();
    let body = res.text().await.unwrap_or_default();
    println!("{} {}", status, body);
    if !status.is_success() {
        anyhow::bail!("webhook returned {}", status);
    }
    Ok(())
}
