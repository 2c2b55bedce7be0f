use anyhow::Context;
use clap::Parser;
use digestline_fetch::{ClientOptions, ReqwestClient, UrlDigester};
use digestline_pipeline::{Pipeline, PipelineOptions};
use tracing::warn;

use crate::cli::App;
use crate::tracker::RecordTracker;

mod cli;
mod logging;
mod tracker;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app = App::parse();
    logging::init_logging()?;

    let client = ReqwestClient::new(&ClientOptions::default()).context("failed to build HTTP client")?;
    let digester = UrlDigester::new(client);

    let tracker = RecordTracker::new("digesting");
    let options = PipelineOptions::default()
        .num_workers(app.num_workers)
        .on_progress(tracker.callback());

    let summary = Pipeline::new(options)
        .run_files(&app.input_file, &app.output_file, digester)
        .await
        .with_context(|| {
            format!(
                "failed to digest {} into {}",
                app.input_file.display(),
                app.output_file.display()
            )
        })?;
    tracker.finish(&summary);

    if summary.failed > 0 {
        warn!(failed = summary.failed, total = summary.written, "some URLs could not be digested");
    }
    Ok(())
}
