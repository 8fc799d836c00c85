//! A conversation with the agent, with the review suite hooked in.
//!
//! The session owns the durable history and fires the hooks in order for
//! every turn: input, context, agent call, turn end. Stage prompts the suite
//! queues are delivered as programmatic input, so they never interrupt the
//! run that produced them.

use crate::agent::Agent;
use crate::conversation::{Turn, last_assistant_text};
use crate::hooks::{HookEvent, InputSource, filter_context, on_input, on_turn_end};
use crate::suite::{NotifyLevel, SuiteHost, SuiteMachine, SuiteStatus, Transition};
use crate::target::ReviewTarget;
use crate::ui::SessionUI;
use anyhow::Result;
use std::collections::VecDeque;
use std::sync::Arc;

/// [`SuiteHost`] that queues prompts for the session to deliver.
#[derive(Default)]
struct Outbox {
    queued: VecDeque<String>,
    notifications: Vec<(NotifyLevel, String)>,
    ui: Option<Arc<SessionUI>>,
}

impl SuiteHost for Outbox {
    fn send_user_message(&mut self, text: String) {
        self.queued.push_back(text);
    }

    fn notify(&mut self, message: &str, level: NotifyLevel) {
        tracing::debug!(%level, "{message}");
        if let Some(ui) = &self.ui {
            ui.notify(level, message);
        }
        self.notifications.push((level, message.to_string()));
    }

    fn set_status(&mut self, status: Option<SuiteStatus>) {
        if let Some(ui) = &self.ui {
            ui.set_status(status.as_ref());
        }
    }
}

pub struct Session<A: Agent> {
    agent: A,
    machine: SuiteMachine,
    history: Vec<Turn>,
    outbox: Outbox,
}

impl<A: Agent> Session<A> {
    pub fn new(agent: A, machine: SuiteMachine) -> Self {
        Self {
            agent,
            machine,
            history: Vec::new(),
            outbox: Outbox::default(),
        }
    }

    pub fn with_ui(mut self, ui: Arc<SessionUI>) -> Self {
        self.outbox.ui = Some(ui);
        self
    }

    /// The durable history. Never redacted.
    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub fn machine(&self) -> &SuiteMachine {
        &self.machine
    }

    /// Every notification the suite has raised so far.
    pub fn notifications(&self) -> &[(NotifyLevel, String)] {
        &self.outbox.notifications
    }

    /// Start a suite run and drive it until it completes or aborts.
    pub async fn start_review(&mut self, target: ReviewTarget) -> Result<Transition> {
        let started = self.machine.start(&mut self.outbox, target)?;
        let outcome = self.deliver_queued().await?;
        Ok(outcome.unwrap_or(started))
    }

    /// Handle one message from `source`, then drive any prompts it causes.
    ///
    /// Returns the last suite transition this produced.
    pub async fn submit(&mut self, text: impl Into<String>, source: InputSource) -> Result<Transition> {
        let mut last = self.receive(text.into(), source).await?;
        if let Some(outcome) = self.deliver_queued().await? {
            last = outcome;
        }
        Ok(last)
    }

    /// Cancel the active run, as if the user had typed something.
    ///
    /// Nothing is appended to the history.
    pub fn interrupt(&mut self) -> Transition {
        self.outbox.queued.clear();
        on_input(&mut self.machine, &mut self.outbox, InputSource::Interactive)
    }

    /// Newest assistant answer in the history.
    pub fn last_answer(&self) -> Option<String> {
        last_assistant_text(&self.history)
    }

    async fn deliver_queued(&mut self) -> Result<Option<Transition>> {
        let mut last = None;
        while let Some(prompt) = self.outbox.queued.pop_front() {
            last = Some(self.receive(prompt, InputSource::Programmatic).await?);
        }
        Ok(last)
    }

    async fn receive(&mut self, text: String, source: InputSource) -> Result<Transition> {
        tracing::debug!(event = %HookEvent::Input, ?source, "dispatching hook");
        let interrupted = on_input(&mut self.machine, &mut self.outbox, source);
        if interrupted != Transition::Idle {
            self.outbox.queued.clear();
        }

        self.history.push(Turn::user(text));
        let ended = self.run_turn().await?;

        Ok(match ended {
            Transition::Idle => interrupted,
            other => other,
        })
    }

    async fn run_turn(&mut self) -> Result<Transition> {
        tracing::debug!(event = %HookEvent::Context, turns = self.history.len(), "dispatching hook");
        let redacted = filter_context(&mut self.machine, &self.history);
        let view = redacted.as_deref().unwrap_or(self.history.as_slice());

        if let Some(ui) = &self.outbox.ui {
            ui.start_turn();
        }
        let produced = self.agent.respond(view).await;
        if let Some(ui) = &self.outbox.ui {
            ui.finish_turn();
        }

        let produced = match produced {
            Ok(turns) => turns,
            Err(e) => {
                if self.machine.is_active() {
                    self.machine.on_turn_completed(&mut self.outbox, None);
                }
                return Err(e);
            }
        };

        tracing::debug!(event = %HookEvent::TurnEnd, produced = produced.len(), "dispatching hook");
        let transition = on_turn_end(&mut self.machine, &mut self.outbox, &produced);
        self.history.extend(produced);
        Ok(transition)
    }
}
