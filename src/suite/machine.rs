//! The suite state machine.
//!
//! At most one [`SuiteRun`] exists at a time. It is created by
//! [`SuiteMachine::start`], advanced by [`SuiteMachine::on_turn_completed`],
//! and destroyed through a single teardown path on completion, missing
//! template, empty output, or user interruption.

use super::host::{NotifyLevel, SuiteHost, SuiteStatus};
use crate::conversation::{Turn, last_user_turn_index};
use crate::errors::SuiteError;
use crate::pipeline::{PIPELINE, StageDescriptor, StageKind, StageReport, strip_end_marker};
use crate::prompt::{TemplateSource, compile_stage_prompt};
use crate::target::ReviewTarget;
use std::fmt;
use uuid::Uuid;

/// Behaviour switches for new runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuiteOptions {
    /// Hide earlier stages from later review stages.
    pub fresh_context: bool,
    /// Append a freshness indicator to the status line.
    pub show_freshness: bool,
}

impl Default for SuiteOptions {
    fn default() -> Self {
        Self {
            fresh_context: true,
            show_freshness: true,
        }
    }
}

/// State of the active run.
#[derive(Debug, Clone)]
pub struct SuiteRun {
    id: Uuid,
    target: ReviewTarget,
    stage_index: usize,
    reports: Vec<StageReport>,
    fresh_context_mode: bool,
    boundary_marker: Option<usize>,
    boundary_pending: bool,
}

impl SuiteRun {
    fn new(target: ReviewTarget, fresh_context_mode: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            target,
            stage_index: 0,
            reports: Vec::new(),
            fresh_context_mode,
            boundary_marker: None,
            boundary_pending: true,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn target(&self) -> &ReviewTarget {
        &self.target
    }

    pub fn stage_index(&self) -> usize {
        self.stage_index
    }

    pub fn reports(&self) -> &[StageReport] {
        &self.reports
    }

    pub fn fresh_context_mode(&self) -> bool {
        self.fresh_context_mode
    }

    pub fn boundary_marker(&self) -> Option<usize> {
        self.boundary_marker
    }

    pub fn boundary_pending(&self) -> bool {
        self.boundary_pending
    }

    /// Current stage. Always in range while the run exists.
    pub fn stage(&self) -> &'static StageDescriptor {
        &PIPELINE[self.stage_index]
    }
}

/// Why a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndReason {
    Complete,
    NoOutput,
    MissingTemplate { template: String },
    UserInterrupted,
}

impl EndReason {
    /// Whether this ending should be reported as a failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::NoOutput | Self::MissingTemplate { .. })
    }

    fn notify_level(&self) -> NotifyLevel {
        if self.is_failure() {
            NotifyLevel::Error
        } else {
            NotifyLevel::Info
        }
    }
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndReason::Complete => write!(f, "complete"),
            EndReason::NoOutput => write!(f, "aborted: no output"),
            EndReason::MissingTemplate { template } => {
                write!(f, "aborted: missing template '{}'", template)
            }
            EndReason::UserInterrupted => write!(f, "user interrupted"),
        }
    }
}

/// Result of a state machine operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// No run was active; nothing changed.
    Idle,
    /// The prompt for `stage_index` was emitted.
    Prompted {
        stage_index: usize,
        stage_id: &'static str,
    },
    /// The synthesize stage finished; `report` is its answer.
    Completed { report: String },
    /// The run was torn down early.
    Aborted(EndReason),
}

/// Where the upcoming turn's history may be cut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactionWindow {
    /// First suite-injected turn; everything before it is pre-suite context.
    pub boundary: usize,
    pub stage_label: &'static str,
    /// 1-based stage number.
    pub stage_number: usize,
    pub total_stages: usize,
}

/// Owns the single run slot and every transition on it.
pub struct SuiteMachine {
    run: Option<SuiteRun>,
    templates: Box<dyn TemplateSource>,
    options: SuiteOptions,
}

impl SuiteMachine {
    pub fn new(templates: Box<dyn TemplateSource>, options: SuiteOptions) -> Self {
        Self {
            run: None,
            templates,
            options,
        }
    }

    pub fn is_active(&self) -> bool {
        self.run.is_some()
    }

    pub fn run(&self) -> Option<&SuiteRun> {
        self.run.as_ref()
    }

    pub fn options(&self) -> SuiteOptions {
        self.options
    }

    /// Begin a run for `target` and emit the first stage prompt.
    ///
    /// Rejected with [`SuiteError::AlreadyActive`] while another run exists;
    /// the existing run is left untouched.
    pub fn start(
        &mut self,
        host: &mut dyn SuiteHost,
        target: ReviewTarget,
    ) -> Result<Transition, SuiteError> {
        if let Some(run) = &self.run {
            tracing::warn!(run_id = %run.id, "review suite already running, start rejected");
            host.notify(
                "A review suite is already running. Send any message to interrupt it first.",
                NotifyLevel::Warning,
            );
            return Err(SuiteError::AlreadyActive);
        }

        let run = SuiteRun::new(target, self.options.fresh_context);
        tracing::info!(
            run_id = %run.id,
            target = %run.target,
            fresh_context = run.fresh_context_mode,
            "review suite started"
        );
        host.notify(
            &format!(
                "Starting review suite for {} ({} stages)",
                run.target,
                PIPELINE.len()
            ),
            NotifyLevel::Info,
        );
        self.run = Some(run);

        Ok(self.emit_current_stage(host))
    }

    /// Record a finished agent turn and move to the next stage.
    ///
    /// `produced` is the text of the agent's answer; `None` or blank text
    /// aborts the run.
    pub fn on_turn_completed(
        &mut self,
        host: &mut dyn SuiteHost,
        produced: Option<&str>,
    ) -> Transition {
        let Some(run) = self.run.as_mut() else {
            return Transition::Idle;
        };

        let text = produced.map(str::trim).unwrap_or_default();
        if text.is_empty() {
            tracing::warn!(run_id = %run.id, stage = run.stage().id, "stage produced no output");
            return self.teardown(host, EndReason::NoOutput);
        }

        let stage = run.stage();
        if stage.kind == StageKind::Review {
            run.reports.push(StageReport::from_output(stage, text));
        }
        tracing::info!(
            run_id = %run.id,
            stage = stage.id,
            stage_index = run.stage_index,
            output_chars = text.len(),
            "stage completed"
        );

        run.stage_index += 1;
        if run.stage_index >= PIPELINE.len() {
            let report = strip_end_marker(text);
            self.teardown(host, EndReason::Complete);
            return Transition::Completed { report };
        }

        self.emit_current_stage(host)
    }

    /// Abort the active run because the user sent new input.
    ///
    /// A no-op when no run is active.
    pub fn on_user_interrupt(&mut self, host: &mut dyn SuiteHost) -> Transition {
        if self.run.is_none() {
            return Transition::Idle;
        }
        self.teardown(host, EndReason::UserInterrupted)
    }

    /// Capture the boundary on first sight of history, then report whether the
    /// upcoming turn is eligible for redaction.
    ///
    /// Redaction applies only to review stages after the first, with fresh
    /// context enabled and a boundary recorded.
    pub fn redaction_window(&mut self, history: &[Turn]) -> Option<RedactionWindow> {
        let run = self.run.as_mut()?;

        if run.boundary_pending {
            run.boundary_marker = last_user_turn_index(history);
            run.boundary_pending = false;
            tracing::debug!(
                run_id = %run.id,
                boundary = ?run.boundary_marker,
                history_len = history.len(),
                "captured suite boundary"
            );
        }

        let stage = run.stage();
        if !run.fresh_context_mode || run.stage_index == 0 || !stage.is_review() {
            return None;
        }

        Some(RedactionWindow {
            boundary: run.boundary_marker?,
            stage_label: stage.label,
            stage_number: run.stage_index + 1,
            total_stages: PIPELINE.len(),
        })
    }

    /// Status for the current run, if any.
    pub fn status(&self) -> Option<SuiteStatus> {
        let run = self.run.as_ref()?;
        let stage = run.stage();
        let mut status = format!(
            "Review suite: {} ({}/{})",
            stage.label,
            run.stage_index + 1,
            PIPELINE.len()
        );
        if self.options.show_freshness && run.fresh_context_mode && stage.is_review() {
            status.push_str(" · fresh eyes");
        }
        Some(SuiteStatus {
            text: status,
            kind: stage.kind,
        })
    }

    fn emit_current_stage(&mut self, host: &mut dyn SuiteHost) -> Transition {
        let Some(run) = self.run.as_ref() else {
            return Transition::Idle;
        };
        let stage = run.stage();

        match compile_stage_prompt(self.templates.as_mut(), &run.target, stage, &run.reports) {
            Ok(prompt) => {
                let stage_index = run.stage_index;
                tracing::debug!(
                    run_id = %run.id,
                    stage = stage.id,
                    prompt_chars = prompt.len(),
                    "emitting stage prompt"
                );
                host.set_status(self.status());
                host.send_user_message(prompt);
                Transition::Prompted {
                    stage_index,
                    stage_id: stage.id,
                }
            }
            Err(SuiteError::MissingTemplate { template }) => {
                self.teardown(host, EndReason::MissingTemplate { template })
            }
            Err(e) => {
                tracing::error!(error = %e, "unexpected prompt compilation failure");
                self.teardown(
                    host,
                    EndReason::MissingTemplate {
                        template: stage.template_name.to_string(),
                    },
                )
            }
        }
    }

    /// The only way a run ends: clear the slot, clear the status, report.
    fn teardown(&mut self, host: &mut dyn SuiteHost, reason: EndReason) -> Transition {
        if let Some(run) = self.run.take() {
            tracing::info!(
                run_id = %run.id,
                stage_index = run.stage_index,
                reports = run.reports.len(),
                reason = %reason,
                "review suite ended"
            );
        }
        host.set_status(None);
        host.notify(&format!("Review suite {}", reason), reason.notify_level());
        Transition::Aborted(reason)
    }
}

impl fmt::Debug for SuiteMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuiteMachine")
            .field("run", &self.run)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
