//! CLI progress rendering for batches.
//!
//! A progress bar when stderr is a terminal, throttled plain lines otherwise.

mod throttle;

use std::io::{self, IsTerminal};
use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use imgdl_core::{BatchSummary, ProgressReporter};

pub use throttle::ProgressThrottle;

/// Progress display that picks terminal or plain output.
pub struct CliProgress {
    inner: ProgressRender,
}

enum ProgressRender {
    Fancy(ProgressBar),
    Plain(Mutex<ProgressThrottle>),
}

impl CliProgress {
    /// Auto-detect terminal capability on stderr.
    pub fn new() -> Self {
        if io::stderr().is_terminal() {
            Self::fancy()
        } else {
            Self::plain()
        }
    }

    fn fancy() -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr());
        bar.set_style(bar_style());
        Self {
            inner: ProgressRender::Fancy(bar),
        }
    }

    pub fn plain() -> Self {
        Self {
            inner: ProgressRender::Plain(Mutex::new(ProgressThrottle::default())),
        }
    }
}

impl Default for CliProgress {
    fn default() -> Self {
        Self::new()
    }
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} images ({per_sec}, ETA {eta})",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("=> ")
}

#[allow(clippy::cast_precision_loss)]
fn percent(completed: usize, total: usize) -> f64 {
    if total == 0 {
        100.0
    } else {
        completed as f64 * 100.0 / total as f64
    }
}

impl ProgressReporter for CliProgress {
    fn start(&self, total: usize) {
        match &self.inner {
            ProgressRender::Fancy(bar) => {
                bar.set_length(total as u64);
                bar.enable_steady_tick(Duration::from_millis(120));
            }
            ProgressRender::Plain(_) => eprintln!("Downloading {total} images"),
        }
    }

    fn update(&self, completed: usize, total: usize) {
        match &self.inner {
            ProgressRender::Fancy(bar) => bar.set_position(completed as u64),
            ProgressRender::Plain(throttle) => {
                let emit = throttle
                    .lock()
                    .is_ok_and(|mut throttle| throttle.should_emit(completed, total));
                if emit {
                    eprintln!(
                        "[{completed}/{total}] {:.1}%",
                        percent(completed, total)
                    );
                }
            }
        }
    }

    fn finish(&self, _summary: &BatchSummary) {
        if let ProgressRender::Fancy(bar) = &self.inner {
            bar.finish_and_clear();
        }
    }
}
