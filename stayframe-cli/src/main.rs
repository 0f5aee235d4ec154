//! # StayFrame CLI
//!
//! `stayframe` binary: catalog listing, layout and export.

use clap::Parser;
use stayframe_cli::{run_export, run_layout, run_list, CliArgs, Command};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured tracing on stderr with optional JSON format.
///
/// Set `RUST_LOG` to control log levels (default: info,stayframe_renderer=debug,stayframe_core=info).
/// Set `RUST_LOG_FORMAT=json` for JSON output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stayframe_renderer=debug,stayframe_core=info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = CliArgs::parse();

    let stdout = std::io::stdout();
    match args.command {
        Command::List(list) => run_list(&list, &mut stdout.lock())?,
        Command::Layout(layout) => run_layout(&layout, &mut stdout.lock())?,
        Command::Export(export) => {
            let summary = run_export(&export).await?;
            println!(
                "{} {}x{} {} bytes",
                summary.path.display(),
                summary.width,
                summary.height,
                summary.bytes
            );
        }
    }
    Ok(())
}
