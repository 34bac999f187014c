mod replay;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use drawing::DrawConfig;

#[derive(Parser, Debug)]
#[command(name = "mapdraw", about = "Replay a drawing script against a headless map and print the result")]
struct Cli {
    /// JSON script of tool, pointer and history steps.
    script: PathBuf,

    /// Map zoom used when the script does not set one.
    #[arg(long, env = "MAPDRAW_ZOOM", default_value_t = replay::DEFAULT_ZOOM)]
    zoom: f64,

    /// Pretty-print the resulting snapshot.
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so stdout carries only the snapshot.
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    match run(&cli).await {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, script = %cli.script.display(), "replay failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<String, replay::ReplayError> {
    let config = DrawConfig::from_env()?;
    let source = tokio::fs::read_to_string(&cli.script).await?;
    let script = replay::Script::parse(&source, cli.zoom)?;
    let snapshot = replay::run(&script, config).await;
    let json = if cli.pretty { serde_json::to_string_pretty(&snapshot)? } else { serde_json::to_string(&snapshot)? };
    Ok(json)
}
