use indicatif::{ProgressBar, ProgressStyle};
use pinchoff::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

/// Renders driver phases as a spinner on stderr.
#[derive(Clone)]
pub struct CliProgressHandler {
    pb: Arc<Mutex<ProgressBar>>,
    phase: Arc<Mutex<&'static str>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        let pb = ProgressBar::new_spinner().with_style(Self::spinner_style());
        pb.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        pb.finish_and_clear();

        Self {
            pb: Arc::new(Mutex::new(pb)),
            phase: Arc::new(Mutex::new("")),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let pb_clone = self.pb.clone();
        let phase_clone = self.phase.clone();

        Box::new(move |progress: Progress| {
            let Ok(mut pb_guard) = pb_clone.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::PhaseStart { name } => {
                    let pb = ProgressBar::new_spinner().with_style(Self::spinner_style());
                    pb.set_draw_target(indicatif::ProgressDrawTarget::stderr());
                    pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    pb.set_message(format!("{}...", name));
                    *pb_guard = pb;
                    if let Ok(mut phase) = phase_clone.lock() {
                        *phase = name;
                    }
                }
                Progress::PhaseFinish => {
                    let name = phase_clone.lock().map(|p| *p).unwrap_or_default();
                    pb_guard.disable_steady_tick();
                    pb_guard.finish_and_clear();
                    eprintln!("✓ {}", name);
                }
                Progress::Message(msg) => {
                    pb_guard.suspend(|| eprintln!("  {}", msg));
                }
            }
        })
    }

    /// Stops a spinner left running by a phase that failed.
    pub fn abandon(&self) {
        if let Ok(pb) = self.pb.lock() {
            if !pb.is_finished() {
                pb.abandon();
            }
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .expect("Failed to create spinner style template")
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}
