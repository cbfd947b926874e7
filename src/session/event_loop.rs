use std::io::Write;
use std::path::{Path, PathBuf};

use crossterm::event::{Event, KeyEvent};
use tracing::debug;

use crate::display::input::{Command, InputAction, action_for_key, parse_command};
use crate::display::renderer::Renderer;
use crate::event::{AppEvent, Io, IoEvent};
use crate::session::controller::Controller;
use crate::session::state::{Resolution, RunStatus};

/// Files the interactive loop reads from and writes to.
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// File whose on-disk changes replace the source.
    pub watched: Option<PathBuf>,
    /// Target of `:save` without a path.
    pub download_path: PathBuf,
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Run the interactive session until the user quits or input ends.
pub async fn run_session<W: Write>(
    controller: &mut Controller,
    renderer: &mut Renderer<W>,
    io: &mut Io,
    config: &LoopConfig,
) {
    renderer.render_help();
    let origin = config
        .watched
        .as_deref()
        .map_or_else(|| "saved session".to_string(), |p| p.display().to_string());
    renderer.render_source("Loaded", &origin, controller.session().prompts().len());
    render_prompt(controller, renderer);

    loop {
        match io.next_event().await {
            IoEvent::Terminal(Event::Key(key)) => {
                if handle_key(&key, controller, renderer, config) == Flow::Quit {
                    break;
                }
            }
            IoEvent::Terminal(_) => {}
            IoEvent::App(AppEvent::Executed { ticket, result }) => {
                if let Resolution::Applied(status) = controller.handle_result(ticket, result) {
                    renderer.render_output(controller.session().output(), status);
                    render_prompt(controller, renderer);
                }
            }
            IoEvent::App(AppEvent::SourceFileChanged) => {
                if let Some(path) = &config.watched {
                    reload_watched(path, controller, renderer);
                }
            }
            IoEvent::Closed => break,
        }
    }

    renderer.finish();
}

/// Show the input line. During a run it only appears once a command is
/// being typed.
fn render_prompt<W: Write>(controller: &Controller, renderer: &mut Renderer<W>) {
    let session = controller.session();
    if session.status() != RunStatus::Executing {
        renderer.render_input_line(session.active_prompt(), session.pending_input());
    } else if session.pending_input().is_empty() {
        renderer.clear_input_line();
    } else {
        renderer.render_input_line(session.placeholder_prompt(), session.pending_input());
    }
}

fn handle_key<W: Write>(
    key: &KeyEvent,
    controller: &mut Controller,
    renderer: &mut Renderer<W>,
    config: &LoopConfig,
) -> Flow {
    let action = action_for_key(key);
    if controller.session().status() == RunStatus::Executing {
        return handle_key_while_executing(action, controller, renderer, config);
    }

    match action {
        InputAction::Quit => return Flow::Quit,
        InputAction::None => {}
        InputAction::Insert(c) => {
            controller.push_pending(c);
            renderer.render_input_char(c);
        }
        InputAction::Backspace => {
            if let Some(removed) = controller.pop_pending() {
                renderer.render_backspace(removed);
            }
        }
        InputAction::Clear => {
            controller.clear_pending_input();
            render_prompt(controller, renderer);
        }
        InputAction::Run => start_run(controller, renderer),
        InputAction::Submit => return handle_submit(controller, renderer, config),
    }
    Flow::Continue
}

/// While a run is in flight only commands are accepted. Answers and
/// `:run` wait for the result; `:reset` and `:load` supersede the run.
fn handle_key_while_executing<W: Write>(
    action: InputAction,
    controller: &mut Controller,
    renderer: &mut Renderer<W>,
    config: &LoopConfig,
) -> Flow {
    match action {
        InputAction::Quit => return Flow::Quit,
        InputAction::None | InputAction::Run => return Flow::Continue,
        InputAction::Insert(c) => controller.push_pending(c),
        InputAction::Backspace => {
            controller.pop_pending();
        }
        InputAction::Clear => controller.clear_pending_input(),
        InputAction::Submit => match parse_command(controller.session().pending_input()) {
            Some(Command::Run) | None => {
                renderer
                    .render_notice("Run in progress. Only :reset, :load, :save and :quit apply.");
            }
            Some(command) => {
                controller.clear_pending_input();
                renderer.clear_input_line();
                return run_command(command, controller, renderer, config);
            }
        },
    }
    render_prompt(controller, renderer);
    Flow::Continue
}

fn handle_submit<W: Write>(
    controller: &mut Controller,
    renderer: &mut Renderer<W>,
    config: &LoopConfig,
) -> Flow {
    if let Some(command) = parse_command(controller.session().pending_input()) {
        controller.clear_pending_input();
        renderer.clear_input_line();
        return run_command(command, controller, renderer, config);
    }

    if !controller.session().awaiting_input() {
        renderer.render_notice("No input requested. Ctrl+R or :run to execute.");
        render_prompt(controller, renderer);
        return Flow::Continue;
    }

    let collected = controller.session().inputs().len();
    let started = controller.submit_input();
    if controller.session().inputs().len() > collected {
        renderer.commit_input_line();
    }
    if started {
        renderer.render_running();
    } else {
        render_prompt(controller, renderer);
    }
    Flow::Continue
}

fn run_command<W: Write>(
    command: Command,
    controller: &mut Controller,
    renderer: &mut Renderer<W>,
    config: &LoopConfig,
) -> Flow {
    match command {
        Command::Quit => return Flow::Quit,
        Command::Run => {
            start_run(controller, renderer);
            return Flow::Continue;
        }
        Command::Reset => {
            controller.reset();
            renderer.render_notice("Session reset.");
        }
        Command::Load(path) => match std::fs::read_to_string(&path) {
            Ok(text) => {
                if controller.set_source(text) {
                    renderer.render_source(
                        "Loaded",
                        &path.display().to_string(),
                        controller.session().prompts().len(),
                    );
                } else {
                    renderer.render_notice("Source unchanged.");
                }
            }
            Err(e) => renderer.render_warning(&format!("Failed to read {}: {e}", path.display())),
        },
        Command::Save(path) => {
            let target = path.unwrap_or_else(|| config.download_path.clone());
            match std::fs::write(&target, controller.session().source()) {
                Ok(()) => renderer.render_notice(&format!("Saved to {}", target.display())),
                Err(e) => {
                    renderer.render_warning(&format!("Failed to write {}: {e}", target.display()));
                }
            }
        }
    }
    render_prompt(controller, renderer);
    Flow::Continue
}

fn start_run<W: Write>(controller: &mut Controller, renderer: &mut Renderer<W>) {
    if controller.request_run() {
        renderer.render_running();
    }
}

fn reload_watched<W: Write>(path: &Path, controller: &mut Controller, renderer: &mut Renderer<W>) {
    match std::fs::read_to_string(path) {
        Ok(text) => {
            if controller.set_source(text) {
                renderer.render_source(
                    "Reloaded",
                    &path.display().to_string(),
                    controller.session().prompts().len(),
                );
                render_prompt(controller, renderer);
            }
        }
        // Editors often replace files in several steps; the next event will
        // see the final contents.
        Err(e) => debug!(path = %path.display(), error = %e, "watched file not readable"),
    }
}
