//! Application state and the UI event loop.

mod constants;
mod dispatch;
mod input;
mod palette;
mod prompt;
mod render;
mod scheduler;
mod state;
mod ticker;

use std::time::{Duration, Instant};

use crossterm::event::{Event, EventStream, KeyEventKind};
use futures::StreamExt;
use ratatui::DefaultTerminal;
use tokio::sync::mpsc;

use courier_core::{CommandRegistry, Config, GrantIdentity, Hint, PageStack};

use crate::theme::{Theme, ThemeVariant};
use crate::views::{Surface, View, ViewRegistry};

pub use constants::*;
pub use input::{InputResult, InputState};
pub use palette::{Palette, PaletteResult, Suggestion};
pub use prompt::{Prompt, PromptKind, PromptResult};
pub use scheduler::{Completion, Job, JobKind, Payload, Scheduler, Target, UiMessage, Work};
pub use state::{Flash, FlashLevel, KernelState, Mode, RunFlag, StatusLine};
pub use ticker::spawn_status_ticker;

/// Result type for the application.
pub type AppResult<T> = color_eyre::Result<T>;

/// The dispatcher: owns the page stack, the views and every kernel flag.
pub struct App {
    config: Config,
    registry: ViewRegistry,
    stack: PageStack<Surface>,
    commands: CommandRegistry,
    state: KernelState,
    prompt: Prompt,
    palette: Palette,
    scheduler: Scheduler,
    rx: mpsc::Receiver<UiMessage>,
    tx: mpsc::Sender<UiMessage>,
    running: RunFlag,
    theme: Theme,
    next_overlay: u64,
    /// When the active top-level view last loaded, for auto refresh.
    last_load: Instant,
}

impl App {
    /// Create the application and load the initial view.
    ///
    /// Must be called inside a tokio runtime: loading spawns a job.
    pub fn new(config: Config) -> Self {
        let (tx, rx) = mpsc::channel(UI_CHANNEL_SIZE);
        let scheduler = Scheduler::new(config.client.clone(), tx.clone(), config.stale_policy);
        let initial = config.initial_view;
        let theme = Theme::from_variant(ThemeVariant::from_name(&config.theme));
        let status = StatusLine::compute(&config.grant.email, config.refresh_interval, Duration::ZERO);

        let mut app = Self {
            config,
            registry: ViewRegistry::new(),
            stack: PageStack::new(initial.as_str(), Surface::Registered(initial)),
            commands: CommandRegistry::with_defaults(),
            state: KernelState {
                status,
                ..KernelState::default()
            },
            prompt: Prompt::default(),
            palette: Palette::default(),
            scheduler,
            rx,
            tx,
            running: RunFlag::new(),
            theme,
            next_overlay: 0,
            last_load: Instant::now(),
        };
        tracing::debug!(stale_results = %app.scheduler.policy(), "Kernel ready");
        app.navigate_to(initial);
        app
    }

    /// Run the application main loop.
    pub async fn run(mut self, mut terminal: DefaultTerminal) -> AppResult<()> {
        let ticker = spawn_status_ticker(self.running.clone(), self.tx.clone(), STATUS_TICK);

        let period = Duration::from_millis(TICK_INTERVAL_MS);
        let mut interval = tokio::time::interval(period);
        let mut events = EventStream::new();
        let mut needs_redraw = true;

        while !self.state.quit {
            if needs_redraw {
                terminal.draw(|frame| self.render(frame))?;
                needs_redraw = false;
            }

            tokio::select! {
                biased;

                Some(Ok(event)) = events.next() => {
                    self.handle_event(event);

                    // Drain any additional pending events
                    while !self.state.quit && crossterm::event::poll(Duration::ZERO)? {
                        let event = crossterm::event::read()?;
                        self.handle_event(event);
                    }
                    needs_redraw = true;
                }

                Some(message) = self.rx.recv() => {
                    self.handle_message(message);
                    while let Ok(message) = self.rx.try_recv() {
                        self.handle_message(message);
                    }
                    needs_redraw = true;
                }

                _ = interval.tick() => {
                    // Periodic tick for background updates
                }
            }
        }

        self.running.stop();
        // Don't wait out the ticker's current period
        ticker.abort();
        tracing::info!("Quit");
        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            if key.kind == KeyEventKind::Press {
                self.handle_key(key);
            }
        }
    }

    /// Receive and handle messages until no spawned job is outstanding.
    pub async fn settle(&mut self) {
        while self.scheduler.in_flight() > 0 {
            match self.rx.recv().await {
                Some(message) => self.handle_message(message),
                None => break,
            }
        }
    }

    /// Whether quit has been requested.
    pub fn should_quit(&self) -> bool {
        self.state.quit
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    /// Page-stack names, bottom to top.
    pub fn stack_names(&self) -> Vec<&str> {
        self.stack.names()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn flash(&self) -> Option<&Flash> {
        self.state.flash.as_ref()
    }

    pub fn status(&self) -> &StatusLine {
        &self.state.status
    }

    /// The active grant.
    pub fn grant(&self) -> &GrantIdentity {
        &self.config.grant
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// The surface on top of the stack.
    pub fn top_view(&self) -> Option<&dyn View> {
        let entry = self.stack.top_entry()?;
        self.surface_view(&entry.surface)
    }

    /// Hints of the top surface.
    pub fn hints(&self) -> Vec<Hint> {
        self.top_view().map(|view| view.hints()).unwrap_or_default()
    }

    fn surface_view<'a>(&'a self, surface: &'a Surface) -> Option<&'a dyn View> {
        match surface {
            Surface::Registered(name) => self.registry.get(*name),
            Surface::Overlay { view, .. } => Some(view.as_ref()),
        }
    }

    /// Whether an overlay sits on top of the stack.
    pub fn in_overlay(&self) -> bool {
        self.stack.len() > 1
            && self
                .stack
                .top_entry()
                .is_some_and(|entry| entry.surface.is_overlay())
    }
}
