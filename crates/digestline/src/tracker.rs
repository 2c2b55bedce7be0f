use std::sync::Arc;
use std::time::Duration;

use digestline_pipeline::{PipelineSummary, Progress};
use indicatif::{ProgressBar, ProgressStyle};
use once_cell::sync::Lazy;

const PB_STYLE: &str = "{spinner:.blue} {prefix:>12.cyan.bold} [{elapsed_precise}] {pos} records ({per_sec}) {wide_msg}";

const TICK: &str = "⠁⠂⠄⡀⢀⠠⠐⠈ ";

static PB_TEMPLATE: Lazy<Option<ProgressStyle>> = Lazy::new(|| {
    ProgressStyle::with_template(PB_STYLE)
        .ok()
        .map(|style| style.tick_chars(TICK))
});

/// Spinner counting records as the sequencer writes them.
///
/// Hidden automatically when stderr is not a terminal.
pub struct RecordTracker {
    pb: ProgressBar,
}

impl RecordTracker {
    pub fn new(prefix: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        let pb = match PB_TEMPLATE.as_ref() {
            Some(style) => pb.with_style(style.clone()),
            None => pb,
        };
        pb.set_prefix(prefix.to_string());
        pb.enable_steady_tick(Duration::from_millis(120));
        Self { pb }
    }

    /// Callback that moves the spinner as records are written.
    pub fn callback(&self) -> Arc<dyn Fn(&Progress) + Send + Sync> {
        let pb = self.pb.clone();
        Arc::new(move |progress: &Progress| {
            pb.set_position(progress.written);
            if progress.failed > 0 {
                pb.set_message(format!("{} failed", progress.failed));
            }
        })
    }

    pub fn finish(self, summary: &PipelineSummary) {
        self.pb.set_position(summary.written);
        self.pb.finish_with_message(format!("done, {} failed", summary.failed));
    }
}
