use anyhow::Result;
use clap::Parser;

use gv_core::config::{GridConfig, load_or_default};

pub mod cli;
pub mod commands;

use cli::{Cli, Command};

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Charger la config, puis les overrides CLI
    let mut config = load_or_default(&cli.config)?;

    match &cli.command {
        Command::Encode(args) => {
            args.apply(&mut config);
            commands::encode(&args.input, &config, cli.quiet)
        }
        Command::Play(files) => {
            files.apply(&mut config);
            commands::play(&config)
        }
        Command::Export(args) => {
            args.files.apply(&mut config);
            let output = resolve_output(&config, args.output.as_deref());
            commands::export(&config, &output, cli.quiet)
        }
        Command::Transcode(args) => {
            args.files.apply(&mut config);
            commands::transcode_mp4(&config, &args.output, cli.quiet)
        }
    }
}

/// `--output`, sinon le chemin d'export de la config.
fn resolve_output(config: &GridConfig, output: Option<&std::path::Path>) -> std::path::PathBuf {
    output.map_or_else(|| config.export_path.clone(), std::path::Path::to_path_buf)
}
