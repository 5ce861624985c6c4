use clap::{Parser, Subcommand};
use kurd_dx::application::errors::{BotError, ConfigError};
use kurd_dx::infrastructure::adapters::console;
use kurd_dx::infrastructure::adapters::discord::{self, RunOptions};
use kurd_dx::infrastructure::config::{load_token, BotSettings, Config};
use kurd_dx::infrastructure::logging::{self, LogBuffer};

#[derive(Parser)]
#[command(name = "kurd-dx")]
#[command(about = "KurdDX Discord bot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run {
        /// Config file path
        #[arg(short, long, default_value = "config.json")]
        config: String,

        /// Token file path
        #[arg(short, long, default_value = "token.json")]
        token_file: String,

        /// Do not read console commands from stdin
        #[arg(long)]
        headless: bool,
    },
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    let history = LogBuffer::new();
    logging::init(history.clone());

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, token_file, headless } => {
            if let Err(e) = run_bot(&config, &token_file, headless, history) {
                tracing::error!("{}", e);
                std::process::exit(1);
            }
        }
        Commands::Version => {
            println!("kurd-dx v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => init_config(),
    }
}

fn run_bot(config_path: &str, token_path: &str, headless: bool, history: LogBuffer) -> Result<(), BotError> {
    let config = match Config::load(config_path) {
        Ok(config) => config,
        Err(ConfigError::NotFound { file_name, .. }) => {
            tracing::error!("File '{}' not found!", file_name);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let token = match load_token(token_path) {
        Err(BotError::Config(ConfigError::NotFound { file_name, .. })) => {
            tracing::error!("File '{}' not found!", file_name);
            return Ok(());
        }
        other => other?,
    };

    tracing::info!("Starting kurd-dx v{}", env!("CARGO_PKG_VERSION"));

    console::block_on(discord::run(RunOptions {
        token,
        config: config.into_shared(),
        history,
        headless,
    }))?
}

fn init_config() {
    match serde_json::to_string_pretty(&BotSettings::default()) {
        Ok(json) => {
            println!("{}", json);
            println!("\nSave this to config.json and adjust as needed.");
        }
        Err(e) => eprintln!("Failed to render default config: {}", e),
    }
}
