// lander-teleop command line entry point

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use teleop_play::PlayConfig;

#[derive(Parser)]
#[command(name = "teleop")]
#[command(about = "Fly a simulated lunar lander from the keyboard", version)]
struct Cli {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Environment id, overrides the config file
    #[arg(short, long)]
    env: Option<String>,

    /// Print the registered environment ids and exit
    #[arg(long)]
    list_envs: bool,
}

fn main() -> Result<()> {
    teleop_play::logging::init();

    let cli = Cli::parse();

    if cli.list_envs {
        for id in teleop_env::list_envs() {
            println!("{id}");
        }
        return Ok(());
    }

    let mut config = match cli.config {
        Some(path) => PlayConfig::load(&path)?,
        None => PlayConfig::default(),
    };
    if let Some(env) = cli.env {
        config.env_id = env;
    }

    teleop_play::play(&config)?;
    Ok(())
}
