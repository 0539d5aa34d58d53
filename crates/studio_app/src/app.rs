use std::io::BufRead;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use studio_core::{update, AppState, Msg};
use studio_engine::{BackendError, EngineHandle, SessionToken};
use studio_logging::{studio_debug, studio_info, studio_warn};

use crate::commands::{self, Command};
use crate::config::AppConfig;
use crate::effects::EffectRunner;
use crate::render::render;

/// How long the loop waits for input before draining engine events again.
const EVENT_POLL: Duration = Duration::from_millis(50);

pub fn run_app(config: AppConfig) -> Result<(), BackendError> {
    studio_info!("Using backend at {}", config.engine.base_url);
    let engine = EngineHandle::new(config.engine, SessionToken::generate())?;
    let mut app = App::new(EffectRunner::new(engine));

    println!("{}", commands::HELP);
    let input = spawn_stdin_reader();
    app.dispatch(Msg::ViewOpened);
    app.run(&input);
    app.close();
    Ok(())
}

fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    studio_warn!("Reading stdin failed: {}", err);
                    break;
                }
            }
        }
        studio_debug!("stdin closed");
    });
    rx
}

struct App {
    state: AppState,
    runner: EffectRunner,
}

impl App {
    fn new(runner: EffectRunner) -> Self {
        Self {
            state: AppState::new(),
            runner,
        }
    }

    fn run(&mut self, input: &mpsc::Receiver<String>) {
        loop {
            for msg in self.runner.drain() {
                self.dispatch(msg);
            }
            match input.recv_timeout(EVENT_POLL) {
                Ok(line) => {
                    if !self.handle_line(&line) {
                        break;
                    }
                }
                Err(RecvTimeoutError::Timeout) => self.dispatch(Msg::Tick),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    }

    /// Returns `false` once the user asked to quit.
    fn handle_line(&mut self, line: &str) -> bool {
        match commands::parse_line(line) {
            Ok(None) => {}
            Ok(Some(Command::Send(msg))) => self.dispatch(msg),
            Ok(Some(Command::List)) => print!("{}", render(&self.state.view())),
            Ok(Some(Command::Help)) => println!("{}", commands::HELP),
            Ok(Some(Command::Quit)) => return false,
            Err(err) => println!("{err}"),
        }
        true
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let dirty = state.consume_dirty();
        self.state = state;
        self.runner.run(effects);
        if dirty {
            print!("{}", render(&self.state.view()));
        }
    }

    /// Tears the view down, which cancels polling, then stops the engine.
    fn close(mut self) {
        self.dispatch(Msg::ViewClosed);
        self.runner.shutdown();
    }
}
