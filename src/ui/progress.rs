use crate::pipeline::StageKind;
use crate::suite::{NotifyLevel, SuiteStatus};
use crate::ui::icons::{CHECK, CROSS, FRESH, INFO, REVIEW, SYNTHESIS, WARN};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

/// Terminal UI for a review session, rendered via one `indicatif` spinner.
///
/// The spinner's prefix is the suite status line (stage and freshness), its
/// message is the live agent activity. Output lines are printed above it.
pub struct SessionUI {
    bar: ProgressBar,
    verbose: bool,
    status: Mutex<Option<String>>,
}

impl SessionUI {
    /// Create the UI. With `verbose`, step and thinking lines are printed too.
    pub fn new(verbose: bool) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{prefix:.bold.dim} {spinner} {msg}")
                .expect("progress bar template is a valid static string"),
        );
        Self {
            bar,
            verbose,
            status: Mutex::new(None),
        }
    }

    #[cfg(test)]
    pub(crate) fn hidden() -> Self {
        let ui = Self::new(false);
        ui.bar.set_draw_target(indicatif::ProgressDrawTarget::hidden());
        ui
    }

    /// Print a line above the spinner, falling back to `eprintln!`.
    fn print_line(&self, msg: impl AsRef<str>) {
        if self.bar.is_hidden() {
            eprintln!("{}", msg.as_ref());
        } else {
            self.bar.println(msg.as_ref());
        }
    }

    /// Replace the status line; `None` clears it and stops the spinner.
    pub fn set_status(&self, status: Option<&SuiteStatus>) {
        if let Ok(mut current) = self.status.lock() {
            *current = status.map(|s| s.text.clone());
        }
        match status {
            Some(status) => {
                let icon = match status.kind {
                    StageKind::Review => REVIEW,
                    StageKind::Synthesize => SYNTHESIS,
                };
                self.bar.set_prefix(format!("{icon}{}", status.text));
            }
            None => {
                self.bar.set_prefix("");
                self.bar.finish_and_clear();
            }
        }
    }

    pub fn status(&self) -> Option<String> {
        self.status.lock().ok().and_then(|s| s.clone())
    }

    /// Start the spinner for an agent turn.
    pub fn start_turn(&self) {
        self.bar.reset();
        self.bar
            .set_message(format!("{}", style("(waiting for agent...)").dim()));
        self.bar.enable_steady_tick(Duration::from_millis(100));
    }

    /// Stop the spinner after an agent turn.
    pub fn finish_turn(&self) {
        self.bar.disable_steady_tick();
        self.bar.set_message("");
    }

    pub fn log_step(&self, msg: &str) {
        self.bar.set_message(format!("{}", style(format!("({msg})")).dim()));
        if self.verbose {
            self.print_line(format!("    {} {}", style("→").dim(), style(msg).dim()));
        }
    }

    /// Refresh the spinner with wall-clock time since the turn began.
    pub fn update_elapsed(&self, elapsed: Duration) {
        let secs = elapsed.as_secs();
        let time_str = if secs >= 60 {
            format!("{}m {}s", secs / 60, secs % 60)
        } else {
            format!("{}s", secs)
        };
        self.bar
            .set_message(format!("{}", style(format!("({time_str})")).dim()));
    }

    /// Show a tool use event (Read, Bash, Grep, etc.)
    pub fn show_tool_use(&self, emoji: &str, description: &str) {
        self.bar
            .set_message(format!("{} {}", emoji, style(description).yellow()));
        self.print_line(format!("    {} {}", emoji, style(description).yellow()));
    }

    /// Show a snippet of the agent's text.
    pub fn show_thinking(&self, snippet: &str) {
        self.bar
            .set_message(format!("{}", style(format!("💭 {snippet}")).dim()));
        if self.verbose {
            self.print_line(format!("    {} {}", style("💭").dim(), style(snippet).dim()));
        }
    }

    /// Surface a suite notification.
    pub fn notify(&self, level: NotifyLevel, message: &str) {
        let line = match level {
            NotifyLevel::Info => format!("{}{}", INFO, message),
            NotifyLevel::Warning => format!("{}{}", WARN, style(message).yellow()),
            NotifyLevel::Error => format!("{}{}", CROSS, style(message).red().bold()),
        };
        self.print_line(line);
    }

    /// Print the header for a new suite run.
    pub fn print_suite_header(&self, target: &str, fresh_context: bool) {
        self.print_separator();
        self.print_line(format!(
            "{} {}",
            style("▶ Review suite:").green().bold(),
            style(target).yellow().bold()
        ));
        if fresh_context {
            self.print_line(format!(
                "{}{}",
                FRESH,
                style("Review stages run with fresh context").dim()
            ));
        }
        self.print_separator();
    }

    /// Print a finished report (or chat answer) under a heading.
    pub fn print_report(&self, heading: &str, text: &str) {
        self.print_line("");
        self.print_line(format!("{}{}", CHECK, style(heading).green().bold()));
        self.print_line("");
        self.print_line(text);
        self.print_line("");
    }

    pub fn print_separator(&self) {
        self.print_line(format!("{}", style("═".repeat(70)).cyan()));
    }
}
