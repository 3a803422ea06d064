mod cmd_doctor;
mod cmd_notify;
mod cmd_render;
mod config;
mod spinner;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "lookout", version, about = "Report visual regression outcomes to GitHub")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Send the outcome of a comparison run: commit status and PR comment
    Notify {
        /// Path to the comparison result JSON
        result: String,
        /// Config file path
        #[arg(long, default_value = "lookout.json")]
        config: String,
        /// URL of the published comparison report
        #[arg(long)]
        report_url: Option<String>,
        /// Do everything except the remote calls that write
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the PR comment for a result without sending anything
    Render {
        /// Path to the comparison result JSON
        result: String,
        /// Config file path
        #[arg(long, default_value = "lookout.json")]
        config: String,
        /// URL of the published comparison report
        #[arg(long)]
        report_url: Option<String>,
    },
    /// Check the configuration: target, credential, token, repository HEAD
    Doctor {
        /// Config file path
        #[arg(long, default_value = "lookout.json")]
        config: String,
    },
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let repo_root = std::env::current_dir()?;

    match cli.cmd {
        Command::Notify {
            result,
            config,
            report_url,
            dry_run,
        } => cmd_notify::execute(&repo_root, &result, &config, report_url.as_deref(), dry_run),
        Command::Render {
            result,
            config,
            report_url,
        } => cmd_render::execute(&repo_root, &result, &config, report_url.as_deref()),
        Command::Doctor { config } => cmd_doctor::execute(&repo_root, &config),
    }
}

/// Stderr logging, filtered by `LOOKOUT_LOG` (default: info).
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("LOOKOUT_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
