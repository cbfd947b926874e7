use std::io::{self, Write};

use crossterm::style::Print;
use crossterm::{cursor, queue, terminal};
use unicode_width::UnicodeWidthChar;

use super::theme;
use crate::session::state::RunStatus;

/// Incremental terminal output for a session.
///
/// Output is line-oriented and written in raw mode, so every line ends with
/// `\r\n`. The input line (active prompt plus pending text) is the only line
/// that gets redrawn; everything above it is append-only.
pub struct Renderer<W: Write = io::Stdout> {
    /// Whether the cursor sits on an uncommitted input line.
    input_line_open: bool,
    /// Rows above the cursor taken by a multi-line prompt.
    input_line_rows: u16,
    out: W,
}

impl Default for Renderer<io::Stdout> {
    fn default() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl Renderer<io::Stdout> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<W: Write> Renderer<W> {
    pub fn with_writer(writer: W) -> Self {
        Self {
            input_line_open: false,
            input_line_rows: 0,
            out: writer,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    // --- Session lifecycle ---

    pub fn render_help(&mut self) {
        let help = "Enter submit · Ctrl+R run · :load PATH · :save [PATH] · :reset · Ctrl+D exit";
        queue!(self.out, Print(theme::dim().apply(help)), Print("\r\n")).ok();
        self.out.flush().ok();
    }

    /// Announce a new source, e.g. `Loaded greet.py · 2 prompts`.
    pub fn render_source(&mut self, verb: &str, origin: &str, prompt_count: usize) {
        self.clear_input_line();
        let noun = if prompt_count == 1 { "prompt" } else { "prompts" };
        let line = format!("{verb} {origin} · {prompt_count} {noun}");
        queue!(self.out, Print(theme::dim().apply(line)), Print("\r\n")).ok();
        self.out.flush().ok();
    }

    pub fn render_notice(&mut self, message: &str) {
        self.clear_input_line();
        queue!(self.out, Print(theme::dim().apply(message)), Print("\r\n")).ok();
        self.out.flush().ok();
    }

    pub fn render_warning(&mut self, message: &str) {
        self.clear_input_line();
        queue!(self.out, Print(theme::warning().apply(message)), Print("\r\n")).ok();
        self.out.flush().ok();
    }

    /// Leave the terminal on a fresh line.
    pub fn finish(&mut self) {
        if self.input_line_open {
            queue!(self.out, Print("\r\n")).ok();
            self.input_line_open = false;
            self.input_line_rows = 0;
        }
        self.out.flush().ok();
    }

    // --- Input line ---

    /// Redraw the input line from scratch.
    pub fn render_input_line(&mut self, prompt: &str, pending: &str) {
        self.clear_input_line();
        // Raw mode does not return the carriage on a bare newline.
        let prompt = prompt.replace('\n', "\r\n");
        queue!(
            self.out,
            Print("\r"),
            terminal::Clear(terminal::ClearType::CurrentLine),
            Print(theme::prompt().apply(prompt.as_str())),
            Print(pending),
        )
        .ok();
        self.input_line_open = true;
        self.input_line_rows = u16::try_from(prompt.matches('\n').count()).unwrap_or(u16::MAX);
        self.out.flush().ok();
    }

    pub fn render_input_char(&mut self, c: char) {
        queue!(self.out, Print(c)).ok();
        self.out.flush().ok();
    }

    /// Erase the last pending character, which was `removed`.
    pub fn render_backspace(&mut self, removed: char) {
        let width = u16::try_from(removed.width().unwrap_or(1).max(1)).unwrap_or(1);
        queue!(
            self.out,
            cursor::MoveLeft(width),
            terminal::Clear(terminal::ClearType::UntilNewLine),
        )
        .ok();
        self.out.flush().ok();
    }

    /// Keep the input line as-is (it now shows an answered prompt) and move on.
    pub fn commit_input_line(&mut self) {
        if self.input_line_open {
            queue!(self.out, Print("\r\n")).ok();
            self.input_line_open = false;
            self.input_line_rows = 0;
            self.out.flush().ok();
        }
    }

    /// Remove the input line so other output can take its place.
    pub fn clear_input_line(&mut self) {
        if self.input_line_open {
            queue!(self.out, Print("\r")).ok();
            if self.input_line_rows > 0 {
                queue!(self.out, cursor::MoveUp(self.input_line_rows)).ok();
            }
            queue!(self.out, terminal::Clear(terminal::ClearType::FromCursorDown)).ok();
            self.input_line_open = false;
            self.input_line_rows = 0;
        }
    }

    // --- Runs ---

    pub fn render_running(&mut self) {
        self.clear_input_line();
        queue!(self.out, Print(theme::dim().apply("Running...")), Print("\r\n")).ok();
        self.out.flush().ok();
    }

    /// Print a finished run's output lines followed by a status label.
    pub fn render_output(&mut self, lines: &[String], status: RunStatus) {
        self.clear_input_line();
        let failed = status == RunStatus::Failed;
        for line in lines {
            let style = if failed {
                theme::error()
            } else {
                theme::output_line()
            };
            queue!(self.out, Print(style.apply(line)), Print("\r\n")).ok();
        }
        let label = if failed {
            theme::error().apply("Failed")
        } else {
            theme::result_line().apply("Done")
        };
        queue!(self.out, Print(label), Print("\r\n")).ok();
        self.out.flush().ok();
    }
}

/// Strip ANSI escape sequences and carriage returns, leaving plain lines.
pub fn plain_text(s: &str) -> String {
    let mut result = String::new();
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\x1b' => {
                while let Some(&next) = chars.peek() {
                    chars.next();
                    if next.is_ascii_alphabetic() {
                        break;
                    }
                }
            }
            '\r' => {}
            _ => result.push(c),
        }
    }
    result
}
