use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{debug, error, info};
use std::path::PathBuf;
use std::process;

use docker_tool::config::{Config, DEFAULT_IMAGES_DIR, DEFAULT_OLD_REGISTRY};
use docker_tool::notifier::VerbosityLevel;
use docker_tool::{DockerEngine, ImageShuttle, Notifier};

#[derive(Parser)]
#[command(
    name = "docker-tool",
    author,
    version,
    about = "A tool to save, load and replace Docker images",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Verbose mode (-v for info, -vv for debug, -vvv for trace). Also switches to text-based progress"
    )]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Save all Docker images
    Save {
        #[arg(
            long = "save",
            env = "DOCKER_TOOL_SAVE_DIR",
            default_value = DEFAULT_IMAGES_DIR,
            help = "Images save path"
        )]
        dir: PathBuf,
    },
    /// Load all Docker images
    Load {
        #[arg(
            long = "load",
            env = "DOCKER_TOOL_LOAD_DIR",
            default_value = DEFAULT_IMAGES_DIR,
            help = "Images load path"
        )]
        dir: PathBuf,
    },
    /// Replace the registry of all Docker images
    Replace {
        #[arg(
            long,
            env = "DOCKER_TOOL_OLD_REGISTRY",
            default_value = DEFAULT_OLD_REGISTRY,
            help = "Old image registry"
        )]
        old: String,

        #[arg(
            long,
            env = "DOCKER_TOOL_NEW_REGISTRY",
            default_value = "",
            help = "New image registry (required once a tag matches --old)"
        )]
        new: String,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Save { .. } => "save",
            Command::Load { .. } => "load",
            Command::Replace { .. } => "replace",
        }
    }

    fn config(&self) -> Config {
        let mut config = Config::default();
        match self {
            Command::Save { dir } => config.save_dir = dir.clone(),
            Command::Load { dir } => config.load_dir = dir.clone(),
            Command::Replace { old, new } => {
                config.old_registry = old.clone();
                config.new_registry = new.clone();
            }
        }
        config
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.command.config();

    info!("Starting docker-tool {}", cli.command.name());
    debug!("Configuration: {:?}", config);

    if let Command::Replace { .. } = cli.command {
        config.validate_old_registry()?;
    }

    debug!("Initializing Docker engine");
    let engine =
        DockerEngine::new().map_err(|e| anyhow!("Failed to initialize Docker engine: {:#}", e))?;
    let shuttle = ImageShuttle::new(engine, Notifier::new(cli.verbose));

    match cli.command {
        Command::Save { .. } => {
            let saved = shuttle.save_all(&config.save_dir)?;
            info!("Saved {} images to {}", saved.len(), config.save_dir.display());
        }
        Command::Load { .. } => {
            let loaded = shuttle.load_all(&config.load_dir)?;
            info!(
                "Loaded {} archives from {}",
                loaded.len(),
                config.load_dir.display()
            );
        }
        Command::Replace { .. } => {
            let retags = shuttle.replace_all(&config.old_registry, &config.new_registry)?;
            info!("Added {} tags", retags.len());
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(Env::default())
        .filter_level(VerbosityLevel::from(cli.verbose).to_log_level())
        .parse_default_env()
        .init();

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        process::exit(1);
    }
}
