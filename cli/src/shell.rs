use std::fmt::Display;
use std::io::{IsTerminal, Write};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Status and diagnostic output on stderr, in the cargo layout: a bold,
/// right-aligned label followed by the message. Command results go to
/// stdout and never pass through here.
pub struct Shell {
    err: StandardStream,
}

impl Shell {
    pub fn new() -> Shell {
        let choice = if std::io::stderr().is_terminal() {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        Shell {
            err: StandardStream::stderr(choice),
        }
    }

    pub fn status(&mut self, status: impl Display, message: impl Display) -> std::io::Result<()> {
        self.print(&status, &message, Color::Green, true)
    }

    pub fn status_with_color(
        &mut self,
        status: impl Display,
        message: impl Display,
        color: Color,
    ) -> std::io::Result<()> {
        self.print(&status, &message, color, true)
    }

    pub fn warn(&mut self, message: impl Display) -> std::io::Result<()> {
        self.print(&"warning", &message, Color::Yellow, false)
    }

    pub fn error(&mut self, message: impl Display) -> std::io::Result<()> {
        self.print(&"error", &message, Color::Red, false)
    }

    fn print(
        &mut self,
        status: &dyn Display,
        message: &dyn Display,
        color: Color,
        justified: bool,
    ) -> std::io::Result<()> {
        self.err.reset()?;
        self.err
            .set_color(ColorSpec::new().set_bold(true).set_fg(Some(color)))?;
        if justified {
            write!(self.err, "{status:>12}")?;
        } else {
            write!(self.err, "{status}")?;
            self.err.set_color(ColorSpec::new().set_bold(true))?;
            write!(self.err, ":")?;
        }
        self.err.reset()?;

        writeln!(self.err, " {message}")
    }
}
