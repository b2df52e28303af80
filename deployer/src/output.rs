//! User-facing output for the deployer CLI.
//!
//! Status lines go to an injected writer so that tests can capture them.
//! Highlighting is chosen once per run through [`OutputStyle`].

use std::io::{IsTerminal, Write};

/// Banner printed when every step of a run succeeded.
pub const SUCCESS_BANNER: &str = "Success!";

/// How highlighted text is rendered.
pub trait OutputStyle {
    /// Render `text` as a success message.
    fn success(&self, text: &str) -> String;

    /// Render `text` as a warning.
    fn warning(&self, text: &str) -> String;
}

/// ANSI escape sequences for colour terminals.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiStyle;

/// Unstyled text for pipes, logs and `--no-color`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainStyle;

impl OutputStyle for AnsiStyle {
    fn success(&self, text: &str) -> String {
        format!("\x1b[1;32m{text}\x1b[0m")
    }

    fn warning(&self, text: &str) -> String {
        format!("\x1b[1;33m{text}\x1b[0m")
    }
}

impl OutputStyle for PlainStyle {
    fn success(&self, text: &str) -> String {
        text.to_owned()
    }

    fn warning(&self, text: &str) -> String {
        text.to_owned()
    }
}

/// Pick a style: colour only when stderr is a terminal, `NO_COLOR` is unset
/// and colour was not disabled on the command line.
#[must_use]
pub fn detect_style(no_color: bool) -> Box<dyn OutputStyle> {
    let colour = !no_color
        && std::env::var_os("NO_COLOR").is_none()
        && std::io::stderr().is_terminal();
    if colour {
        Box::new(AnsiStyle)
    } else {
        Box::new(PlainStyle)
    }
}

/// Write one line, ignoring failures of the output stream itself.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Nowhere left to report to.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ansi_success_is_bright_green() {
        assert_eq!(AnsiStyle.success("Success!"), "\x1b[1;32mSuccess!\x1b[0m");
    }

    #[test]
    fn plain_style_leaves_text_alone() {
        assert_eq!(PlainStyle.success(SUCCESS_BANNER), "Success!");
        assert_eq!(PlainStyle.warning("careful"), "careful");
    }

    #[test]
    fn no_color_flag_forces_plain() {
        assert_eq!(detect_style(true).success("ok"), "ok");
    }

    #[test]
    fn no_color_variable_forces_plain() {
        temp_env::with_var("NO_COLOR", Some("1"), || {
            assert_eq!(detect_style(false).success("ok"), "ok");
        });
    }

    #[test]
    fn write_stderr_line_appends_newline() {
        let mut buffer = Vec::new();
        write_stderr_line(&mut buffer, "Building x64 version...");
        assert_eq!(buffer, b"Building x64 version...\n");
    }
}
