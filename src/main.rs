//! exifsift
//!
//! Usage:
//!     exifsift --source ~/Pictures --destination ~/beach --key Keywords --query beach,sunset

mod cli;
mod error;
mod logging;

use crate::cli::Args;
use crate::error::{ErrorKind, Result};
use clap::Parser;
use exifsift_config::Config;
use exifsift_metadata::{ExifTool, Options, ServiceHandle};
use exifsift_pipeline::{Summary, execute};
use exn::ResultExt;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.verbose, args.quiet);

    match run(&args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = ?e, "{}", *e);
            e.exit_code()
        },
    }
}

async fn run(args: &Args) -> Result<Summary> {
    let config = Config::load(args.config.as_deref(), &args.overrides()).or_raise(|| ErrorKind::Config)?;
    let settings = config.validate().or_raise(|| ErrorKind::Config)?;

    let options = Options { executable: settings.exiftool.clone(), timeout: settings.timeout };
    let service: ServiceHandle = Arc::new(ExifTool::open(options).await.or_raise(|| ErrorKind::Backend)?);

    let cancel = CancellationToken::new();
    let watcher = tokio::spawn(cancel_on_ctrl_c(cancel.clone()));
    let result = execute(&service, &settings.context, cancel.clone()).await;
    watcher.abort();

    // Released on every path out of the run.
    if let Err(e) = service.close().await {
        tracing::warn!(error = ?e, "Failed to close metadata service");
    }

    let summary = result.or_raise(|| ErrorKind::Run)?;
    if cancel.is_cancelled() {
        exn::bail!(ErrorKind::Interrupted);
    }
    Ok(summary)
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::warn!("Interrupted; letting files in progress finish");
        cancel.cancel();
    }
}
