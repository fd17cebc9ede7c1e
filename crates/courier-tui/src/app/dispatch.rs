//! Key routing, command execution and async completion handling.

use std::time::Instant;

use crossterm::event::KeyEvent;

use courier_core::{Action, ChordOutcome, GrantIdentity, KernelError, Resolution, ViewName, resolve};

use super::palette::PaletteResult;
use super::prompt::{PromptKind, PromptResult};
use super::scheduler::{Completion, Job, JobKind, Payload, Target, UiMessage};
use super::state::{FlashLevel, Mode, StatusLine};
use super::App;
use crate::event::GlobalKey;
use crate::views::{HelpView, KeyOutcome, Request, Surface, View, ViewContext};

/// Selection movements; views that have nothing to move stay silent.
fn is_motion(action: &Action) -> bool {
    matches!(
        action,
        Action::SelectRow(_)
            | Action::JumpToTop
            | Action::JumpToBottom
            | Action::HalfPageDown
            | Action::HalfPageUp
            | Action::PageDown
            | Action::PageUp
    )
}

impl App {
    /// Single entry point for key presses.
    pub fn handle_key(&mut self, key: KeyEvent) {
        self.handle_key_at(key, Instant::now());
    }

    /// Handle a key press as if it arrived at `now`.
    pub fn handle_key_at(&mut self, key: KeyEvent, now: Instant) {
        match self.state.mode {
            Mode::Palette => self.handle_palette_key(key),
            Mode::CommandPrompt | Mode::FilterPrompt => self.handle_prompt_key(key),
            Mode::Normal if self.in_overlay() => self.handle_overlay_key(key),
            Mode::Normal => self.handle_normal_key(key, now),
        }
    }

    fn handle_palette_key(&mut self, key: KeyEvent) {
        match self.palette.handle_key(key, &self.commands) {
            PaletteResult::Continue => {}
            PaletteResult::Close => self.state.mode = Mode::Normal,
            PaletteResult::Commit(command) => {
                self.state.mode = Mode::Normal;
                self.on_command(&command);
            }
        }
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) {
        if let PromptResult::Commit(text) = self.prompt.handle_key(key) {
            self.state.mode = Mode::Normal;
            match self.prompt.kind() {
                PromptKind::Command => self.on_command(&text),
                PromptKind::Filter => self.on_filter(&text),
            }
        }
    }

    fn handle_overlay_key(&mut self, key: KeyEvent) {
        match GlobalKey::from_key_event(key) {
            GlobalKey::Quit => self.quit(),
            GlobalKey::Escape => self.go_back(),
            _ => {
                self.forward_key(key);
            }
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent, now: Instant) {
        let global = GlobalKey::from_key_event(key);
        tracing::trace!(?global, "Normal mode key");

        match global {
            GlobalKey::Quit => self.quit(),
            GlobalKey::Escape => {
                let target = self.active_target();
                let used = self
                    .with_target(target, |view, ctx| view.escape(ctx))
                    .unwrap_or(false);
                if !used && self.stack.len() > 1 {
                    self.go_back();
                }
            }
            GlobalKey::HalfPageDown => self.perform_action(Action::HalfPageDown),
            GlobalKey::HalfPageUp => self.perform_action(Action::HalfPageUp),
            GlobalKey::PageDown => self.perform_action(Action::PageDown),
            GlobalKey::PageUp => self.perform_action(Action::PageUp),
            GlobalKey::Command => {
                self.state.chord.clear();
                if self.config.palette {
                    self.palette.open(&self.commands);
                    self.state.mode = Mode::Palette;
                } else {
                    self.prompt.open(PromptKind::Command);
                    self.state.mode = Mode::CommandPrompt;
                }
            }
            GlobalKey::Filter => {
                self.state.chord.clear();
                self.prompt.open(PromptKind::Filter);
                self.state.mode = Mode::FilterPrompt;
            }
            GlobalKey::Help => self.show_help(),
            GlobalKey::Refresh => self.refresh_active(),
            GlobalKey::Chord(c) => match self.state.chord.press(c, now) {
                ChordOutcome::Pending => {}
                ChordOutcome::Complete('g') => self.perform_action(Action::JumpToTop),
                ChordOutcome::Complete('d') => self.perform_action(Action::Delete),
                ChordOutcome::Complete(_) | ChordOutcome::NotChord => {
                    self.forward_key(key);
                }
            },
            GlobalKey::JumpToBottom => self.perform_action(Action::JumpToBottom),
            GlobalKey::Archive => self.perform_action(Action::Archive),
            GlobalKey::None => {
                if self.forward_key(key) == KeyOutcome::Passthrough {
                    tracing::trace!(?key, "Unhandled key");
                }
            }
        }
    }

    /// Send a key verbatim to the top surface.
    fn forward_key(&mut self, key: KeyEvent) -> KeyOutcome {
        let target = self.active_target();
        self.with_target(target, |view, ctx| view.handle_key(key, ctx))
            .unwrap_or(KeyOutcome::Passthrough)
    }

    /// Resolve and run a command line from the prompt, the palette or a view.
    pub fn on_command(&mut self, input: &str) {
        match resolve(&self.commands, input) {
            Resolution::Action(action) => {
                tracing::debug!(input, ?action, "Command");
                self.perform_action(action);
            }
            Resolution::Ignored => {}
        }
    }

    /// Apply a filter to the active view and refresh it. Empty clears.
    pub fn on_filter(&mut self, text: &str) {
        let target = self.active_target();
        self.with_target(target, |view, ctx| {
            view.filter(text);
            view.refresh(ctx);
        });
        self.mark_loaded(target);
    }

    fn perform_action(&mut self, action: Action) {
        match action {
            Action::Navigate(name) => self.navigate_to(name),
            Action::OpenFolder(_) => {
                // Collapse onto messages and let the view load the folder
                self.switch_stack(ViewName::Messages);
                let target = Target::View(ViewName::Messages);
                self.with_target(target, |view, ctx| view.perform(&action, ctx));
            }
            Action::Refresh => self.refresh_active(),
            Action::ShowHelp => self.show_help(),
            Action::Quit => self.quit(),
            action => {
                let target = self.active_target();
                let outcome =
                    self.with_target(target, |view, ctx| (view.perform(&action, ctx), view.title()));
                if let Some((false, title)) = outcome {
                    if !is_motion(&action) {
                        self.state.flash(FlashLevel::Info, format!("Not available in {title}"));
                    }
                }
            }
        }
    }

    /// Collapse the stack to `name` and load it.
    pub fn navigate_to(&mut self, name: ViewName) {
        tracing::info!(view = %name, "Navigate");
        self.switch_stack(name);
        self.with_target(Target::View(name), |view, ctx| view.load(ctx));
    }

    fn switch_stack(&mut self, name: ViewName) {
        while let Some(entry) = self.stack.pop() {
            self.scheduler.forget(entry.surface.target());
        }
        self.stack.switch_to(name.as_str(), Surface::Registered(name));
        self.last_load = Instant::now();
    }

    /// Pop one overlay.
    pub fn go_back(&mut self) {
        if let Some(entry) = self.stack.pop() {
            tracing::debug!(name = %entry.name, "Pop");
            self.scheduler.forget(entry.surface.target());
        }
    }

    fn show_help(&mut self) {
        let help = HelpView::new(&self.commands);
        self.push_overlay(Box::new(help));
    }

    fn refresh_active(&mut self) {
        let target = self.active_target();
        self.with_target(target, |view, ctx| view.refresh(ctx));
        self.mark_loaded(target);
    }

    /// Reload a registered view. Reloading the home view restarts the
    /// auto-refresh countdown.
    fn refresh_view(&mut self, name: ViewName) {
        let target = Target::View(name);
        if self.active_target() == target {
            self.refresh_active();
            return;
        }
        if self.registry.get(name).is_none() {
            return;
        }
        self.with_target(target, |view, ctx| view.refresh(ctx));
        let home = self.stack.base().map(|entry| entry.surface.target());
        if home == Some(target) {
            self.mark_loaded(target);
        }
    }

    fn mark_loaded(&mut self, target: Target) {
        if matches!(target, Target::View(_)) {
            self.last_load = Instant::now();
        }
    }

    fn quit(&mut self) {
        self.state.quit = true;
    }

    /// Switch the active grant through the grant store.
    ///
    /// Every outcome is flashed. On failure the active grant is unchanged.
    pub fn switch_grant(&mut self, identity: GrantIdentity) -> Result<(), KernelError> {
        let Some(store) = self.config.grant_store.clone() else {
            let error = KernelError::NoGrantStore;
            self.state.flash(FlashLevel::Warn, error.to_string());
            return Err(error);
        };

        if identity.id == self.config.grant.id {
            self.state
                .flash(FlashLevel::Info, format!("Already using {}", identity.email));
            return Ok(());
        }

        if let Err(source) = store.set_default_grant(&identity.id) {
            let error = KernelError::GrantStore {
                grant: identity.id.clone(),
                source,
            };
            self.state.flash(FlashLevel::Error, error.to_string());
            return Err(error);
        }

        tracing::info!(grant = %identity.id, email = %identity.email, "Switched grant");
        self.state
            .flash(FlashLevel::Info, format!("Switched to {}", identity.email));
        self.config.grant = identity;
        self.refresh_active();
        Ok(())
    }

    /// Handle a message from a worker or the ticker.
    pub fn handle_message(&mut self, message: UiMessage) {
        match message {
            UiMessage::Completed(completion) => self.on_completion(completion),
            UiMessage::StatusTick => self.on_status_tick(Instant::now()),
        }
    }

    fn on_completion(&mut self, completion: Completion) {
        let Completion { job, result } = completion;
        if !self.scheduler.accept(&job) {
            return;
        }
        if let Target::Overlay(id) = job.target {
            if self.find_overlay_mut(id).is_none() {
                self.on_orphaned_completion(job, result);
                return;
            }
        }

        match result {
            Ok(payload) => {
                self.with_target(job.target, |view, ctx| view.apply(&job, payload, ctx));
            }
            Err(error) => {
                tracing::warn!(label = %job.label, %error, "Job failed");
                self.state
                    .flash(FlashLevel::Error, format!("{} failed: {error}", job.label));
                self.with_target(job.target, |view, ctx| view.on_error(&job, ctx));
            }
        }
    }

    /// Report a result whose overlay has already closed.
    ///
    /// Loads are dropped. Finished mutations and submissions still flash
    /// and refresh the view they changed; every failure is flashed.
    fn on_orphaned_completion(&mut self, job: Job, result: Result<Payload, KernelError>) {
        match result {
            Ok(Payload::Done(message)) if job.kind != JobKind::Load => {
                self.state.flash(FlashLevel::Info, message);
                if let Some(name) = job.affects {
                    self.refresh_view(name);
                }
            }
            Ok(_) => {
                tracing::debug!(label = %job.label, "Discarding result for closed overlay");
            }
            Err(error) => {
                tracing::warn!(label = %job.label, %error, "Job failed after its overlay closed");
                self.state
                    .flash(FlashLevel::Error, format!("{} failed: {error}", job.label));
            }
        }
    }

    /// Refresh the status line, expire the flash and auto refresh when due.
    pub fn on_status_tick(&mut self, now: Instant) {
        let interval = self.config.refresh_interval;
        let since_load = now.saturating_duration_since(self.last_load);
        self.state.status = StatusLine::compute(&self.config.grant.email, interval, since_load);
        self.state.expire_flash(now);

        let due = !interval.is_zero() && since_load >= interval;
        if due && self.state.mode == Mode::Normal && !self.in_overlay() {
            tracing::debug!("Auto refresh");
            self.refresh_active();
        }
    }

    /// Target of the surface on top of the stack.
    fn active_target(&self) -> Target {
        self.stack
            .top_entry()
            .map(|entry| entry.surface.target())
            .unwrap_or(Target::View(self.config.initial_view))
    }

    fn find_overlay_mut(&mut self, id: u64) -> Option<&mut dyn View> {
        let entry = self.stack.find_mut(
            |surface| matches!(surface, Surface::Overlay { id: found, .. } if *found == id),
        )?;
        match &mut entry.surface {
            Surface::Overlay { view, .. } => Some(view.as_mut()),
            Surface::Registered(_) => None,
        }
    }

    /// Run `f` against the view behind `target` and apply the requests it
    /// records. Returns `None` when the overlay is gone.
    fn with_target<R>(
        &mut self,
        target: Target,
        f: impl FnOnce(&mut dyn View, &mut ViewContext) -> R,
    ) -> Option<R> {
        let mut ctx = ViewContext::new(target, self.config.grant.clone());
        let view = match target {
            Target::View(name) => Some(self.registry.get_or_create(name)),
            Target::Overlay(id) => self.find_overlay_mut(id),
        }?;
        let result = f(view, &mut ctx);
        self.apply_requests(ctx.into_requests());
        Some(result)
    }

    fn push_overlay(&mut self, view: Box<dyn View>) {
        self.next_overlay += 1;
        let id = self.next_overlay;
        let name = view.name().to_string();
        tracing::debug!(%name, id, "Push overlay");
        // A half-typed chord must not complete after the overlay closes
        self.state.chord.clear();
        self.stack.push(name, Surface::Overlay { id, view });
        self.with_target(Target::Overlay(id), |view, ctx| view.load(ctx));
    }

    fn apply_requests(&mut self, requests: Vec<Request>) {
        for request in requests {
            match request {
                Request::Push(view) => self.push_overlay(view),
                Request::Pop(target) => {
                    let on_top = self
                        .stack
                        .top_entry()
                        .is_some_and(|entry| entry.surface.target() == target);
                    if on_top {
                        self.go_back();
                    }
                }
                Request::Navigate(name) => self.navigate_to(name),
                Request::Execute(command) => self.on_command(&command),
                Request::Flash(level, message) => self.state.flash(level, message),
                Request::SwitchGrant(identity) => {
                    if let Err(error) = self.switch_grant(identity) {
                        tracing::debug!(%error, "Grant switch refused");
                    }
                }
                Request::Refresh(name) => self.refresh_view(name),
                Request::Spawn {
                    target,
                    label,
                    work,
                } => {
                    let grant = self.config.grant.id.clone();
                    self.scheduler.spawn(target, label, &grant, work);
                }
                Request::Quit => self.quit(),
            }
        }
    }
}
