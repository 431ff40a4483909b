//! Interactive navigator: terminal setup, the input reader and the
//! interaction loop that owns `AppState`.

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::sync::mpsc::{self, Sender};
use std::thread;

pub mod application;
pub mod constants;
pub mod domain;
pub mod ui;

use self::application::dispatcher::CommandDispatcher;
use self::constants::INPUT_THREAD_NAME;
use self::ui::{app_state::AppState, commands::Command, events::Message, renderer::Renderer};
use crate::catalog::Catalog;
use crate::error::EngineError;
use crate::gateway::PipelineGateway;

pub struct InteractiveSession {
    catalog: Arc<Catalog>,
    gateway: Arc<dyn PipelineGateway>,
    profiles: Vec<String>,
    regions: Vec<String>,
    renderer: Renderer,
}

impl InteractiveSession {
    pub fn new(
        catalog: Arc<Catalog>,
        gateway: Arc<dyn PipelineGateway>,
        profiles: Vec<String>,
        regions: Vec<String>,
    ) -> Self {
        Self {
            catalog,
            gateway,
            profiles,
            regions,
            renderer: Renderer::new(),
        }
    }

    pub fn run(mut self) -> Result<()> {
        let mut terminal = self.setup_terminal()?;
        let result = self.run_app(&mut terminal);
        self.cleanup_terminal(&mut terminal)?;
        result
    }

    fn setup_terminal(&self) -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(terminal)
    }

    fn cleanup_terminal(&self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        Ok(())
    }

    fn run_app(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let (sender, receiver) = mpsc::channel();
        spawn_input_reader(sender.clone())?;
        let dispatcher = CommandDispatcher::new(Arc::clone(&self.gateway), sender.clone());

        let mut state = AppState::new(
            Arc::clone(&self.catalog),
            self.profiles.clone(),
            self.regions.clone(),
        );
        tracing::info!("navigator started");

        loop {
            terminal.draw(|f| self.renderer.render(f, &state))?;

            // the loop holds a sender, so recv only fails if that invariant breaks
            let message = receiver
                .recv()
                .context("Event queue closed unexpectedly")?;
            let (next, command) = state.update(message);
            state = next;

            match command {
                Command::None => {}
                Command::Quit => break,
                Command::Execute(dispatch) => {
                    if let Err(err) = dispatcher.dispatch(dispatch) {
                        let failure = EngineError::Internal(format!("{err:#}"));
                        sender
                            .send(Message::Completed(Err(failure)))
                            .context("Failed to queue dispatch failure")?;
                    }
                }
            }
        }

        tracing::info!("navigator stopped");
        Ok(())
    }
}

/// Forwards key presses and resizes into the queue until the loop goes away.
fn spawn_input_reader(sender: Sender<Message>) -> Result<()> {
    thread::Builder::new()
        .name(INPUT_THREAD_NAME.to_string())
        .spawn(move || {
            loop {
                let message = match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => Message::Key(key),
                    Ok(Event::Resize(_, _)) => Message::Resize,
                    Ok(_) => continue,
                    Err(err) => {
                        tracing::warn!(error = %err, "terminal input failed");
                        let _ = sender.send(Message::InputClosed);
                        break;
                    }
                };
                if sender.send(message).is_err() {
                    break;
                }
            }
        })
        .context("Failed to spawn input reader")?;
    Ok(())
}
