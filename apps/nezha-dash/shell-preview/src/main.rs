#![expect(clippy::print_stdout, reason = "the preview report goes to stdout")]

use anyhow::Result;
use clap::Parser;
use nezha_dash_shell_preview::{PreviewArgs, run};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = PreviewArgs::parse();
    let pretty = args.pretty;
    let report = run(args).await?;
    let rendered = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{rendered}");
    Ok(())
}
