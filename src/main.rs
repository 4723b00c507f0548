use std::env;
use std::path::PathBuf;

use clap::Parser;

use landed::config::{read_config, Config};
use landed::logger::configure_logger;
use landed::server::server_run;

const CFG_FILE_NAME: &str = "landed.toml";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file. Defaults to landed.toml next to the executable
    /// or in the current directory
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn find_config_path() -> Option<PathBuf> {
    let exe_path = env::current_exe().ok()?;
    let exe_dir = exe_path.parent()?;

    if exe_dir.join(CFG_FILE_NAME).exists() {
        return Some(exe_dir.join(CFG_FILE_NAME));
    }

    let cur_dir = env::current_dir().ok()?;
    if cur_dir.join(CFG_FILE_NAME).exists() {
        return Some(cur_dir.join(CFG_FILE_NAME));
    }

    None
}

fn open_config(args: &Args) -> std::io::Result<Config> {
    let config_path = match args.config.clone().or_else(find_config_path) {
        Some(path) => path,
        None => return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not find landed.toml - pass one with --config")),
    };

    println!("Reading config from {}", config_path.to_str().unwrap_or("?"));
    let config = read_config(&config_path)?;

    println!("Listening on {}:{}", config.server.address, config.server.port);

    Ok(config)
}

#[ntex::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    let config = open_config(&args)?;

    if let Err(e) = configure_logger(&config) {
        eprintln!("Error configuring logger: {}", e);
    }

    server_run(config).await
}
