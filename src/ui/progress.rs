use std::time::{Duration, Instant};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use crate::pipeline::phase::ScanPhase;
use crate::ui::events::PipelineEvent;
use crate::utils::formatting::format_duration;

/// Phase bar plus a spinner for the running scanner process.
pub struct ScanProgress {
    multi: MultiProgress,
    phase_bar: Option<ProgressBar>,
    spinner: Option<ProgressBar>,
    start_time: Instant,
}

impl ScanProgress {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            phase_bar: None,
            spinner: None,
            start_time: Instant::now(),
        }
    }

    /// Handle a pipeline event and update progress bars accordingly.
    pub fn handle_event(&mut self, event: &PipelineEvent) {
        match event {
            PipelineEvent::PipelineStarted { target, .. } => {
                let bar = self.multi.add(ProgressBar::new(ScanPhase::ALL.len() as u64));
                if let Ok(s) = ProgressStyle::default_bar()
                    .template("  {bar:30.cyan/dark_gray} {pos}/{len} phases | {msg}")
                {
                    bar.set_style(s.progress_chars("█▓░"));
                }
                bar.set_message(format!("Scanning {}", target));
                self.phase_bar = Some(bar);
            }
            PipelineEvent::PhaseStarted { display_name, .. } => {
                let spinner = self.multi.add(ProgressBar::new_spinner());
                if let Ok(s) = ProgressStyle::default_spinner().template("    {spinner:.yellow} {msg} [{elapsed}]") {
                    spinner.set_style(s);
                }
                spinner.set_message(format!("{} running", display_name));
                spinner.enable_steady_tick(Duration::from_millis(120));
                self.spinner = Some(spinner);
                if let Some(bar) = &self.phase_bar {
                    bar.set_message(display_name.clone());
                }
            }
            PipelineEvent::PhaseCompleted { .. }
            | PipelineEvent::PhaseSkipped { .. }
            | PipelineEvent::PhaseFailed { .. } => {
                if let Some(spinner) = self.spinner.take() {
                    spinner.finish_and_clear();
                }
                if let Some(bar) = &self.phase_bar {
                    bar.inc(1);
                }
            }
            PipelineEvent::PipelineCompleted { .. } => {
                self.clear_spinner();
                if let Some(bar) = self.phase_bar.take() {
                    bar.finish_with_message(format!(
                        "All phases finished in {}",
                        format_duration(self.start_time.elapsed().as_millis() as u64)
                    ));
                }
            }
            PipelineEvent::PipelineFailed { .. } => {
                self.clear_spinner();
                if let Some(bar) = self.phase_bar.take() {
                    bar.abandon_with_message("Failed");
                }
            }
            _ => {}
        }
    }

    fn clear_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    /// Print a line through the multi-progress (won't interfere with bars).
    pub fn println(&self, msg: &str) {
        let _ = self.multi.println(msg);
    }
}

impl Default for ScanProgress {
    fn default() -> Self {
        Self::new()
    }
}
