//! Plain terminal output for warnings: optional ANSI markup, separator
//! lines sized to the terminal, and a sink that prints one line per record.

use std::borrow::Cow;
use std::env;
use std::io::{self, Write};
use std::sync::Mutex;

use colored::Color;
use unicode_width::UnicodeWidthStr;

use crate::error::WarningError;
use crate::sink::WarningSink;
use crate::warning::WarningRecord;

pub const RESET: &str = "\x1b[0m";

/// Width used when the terminal does not report a usable one.
pub const FALLBACK_WIDTH: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Markup {
    Fg(Color),
    Bg(Color),
    Bold,
    Light,
    Underline,
    Blink,
    Invert,
}

impl Markup {
    fn code(&self) -> Cow<'static, str> {
        match self {
            Markup::Fg(color) => Cow::Owned(color.to_fg_str().to_string()),
            Markup::Bg(color) => Cow::Owned(color.to_bg_str().to_string()),
            Markup::Bold => Cow::Borrowed("1"),
            Markup::Light => Cow::Borrowed("2"),
            Markup::Underline => Cow::Borrowed("4"),
            Markup::Blink => Cow::Borrowed("5"),
            Markup::Invert => Cow::Borrowed("7"),
        }
    }
}

/// Width from a `COLUMNS` style value; anything under 40 columns is treated
/// as bogus.
pub fn terminal_width_from(columns: Option<&str>) -> usize {
    match columns.and_then(|c| c.trim().parse::<usize>().ok()) {
        Some(width) if width >= 40 => width,
        _ => FALLBACK_WIDTH,
    }
}

pub fn terminal_width() -> usize {
    terminal_width_from(env::var("COLUMNS").ok().as_deref())
}

/// Decide whether to emit ANSI escapes.
///
/// `PY_COLORS=1|0` forces the answer, then `NO_COLOR` disables and
/// `FORCE_COLOR` enables; otherwise only a tty whose `TERM` is not `dumb`
/// gets markup.
pub fn should_do_markup<F>(var: F, is_tty: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    match var("PY_COLORS").as_deref() {
        Some("1") => return true,
        Some("0") => return false,
        _ => {}
    }
    if var("NO_COLOR").is_some() {
        return false;
    }
    if var("FORCE_COLOR").is_some() {
        return true;
    }
    is_tty && var("TERM").as_deref() != Some("dumb")
}

#[derive(Debug)]
pub struct TerminalWriter<W> {
    out: W,
    has_markup: bool,
    current_line: String,
    fullwidth: Option<usize>,
}

impl<W: Write> TerminalWriter<W> {
    pub fn new(out: W, has_markup: bool) -> Self {
        Self {
            out,
            has_markup,
            current_line: String::new(),
            fullwidth: None,
        }
    }

    pub fn has_markup(&self) -> bool {
        self.has_markup
    }

    pub fn fullwidth(&self) -> usize {
        self.fullwidth.unwrap_or_else(terminal_width)
    }

    pub fn set_fullwidth(&mut self, width: usize) {
        self.fullwidth = Some(width);
    }

    /// Display width of what has been written since the last newline.
    pub fn width_of_current_line(&self) -> usize {
        self.current_line.width()
    }

    pub fn markup(&self, text: &str, markup: &[Markup]) -> String {
        if !self.has_markup || markup.is_empty() {
            return text.to_string();
        }
        let mut out = String::with_capacity(text.len() + 8 * markup.len());
        for m in markup {
            out.push_str("\x1b[");
            out.push_str(&m.code());
            out.push('m');
        }
        out.push_str(text);
        out.push_str(RESET);
        out
    }

    pub fn write(&mut self, msg: &str, markup: &[Markup]) -> io::Result<()> {
        if msg.is_empty() {
            return Ok(());
        }
        match msg.rsplit_once('\n') {
            Some((_, tail)) => self.current_line = tail.to_string(),
            None => self.current_line.push_str(msg),
        }
        let text = self.markup(msg, markup);
        self.out.write_all(text.as_bytes())
    }

    pub fn line(&mut self, s: &str, markup: &[Markup]) -> io::Result<()> {
        self.write(s, markup)?;
        self.write("\n", &[])
    }

    /// Write a full-width separator line, optionally with `title` centered.
    pub fn sep(&mut self, sepchar: &str, title: Option<&str>, markup: &[Markup]) -> io::Result<()> {
        let fullwidth = self.fullwidth();
        let sep_len = sepchar.chars().count().max(1);
        let mut line = match title {
            Some(title) => {
                let room = fullwidth.saturating_sub(title.chars().count() + 2);
                let fill = sepchar.repeat((room / (2 * sep_len)).max(1));
                format!("{fill} {title} {fill}")
            }
            None => sepchar.repeat(fullwidth / sep_len),
        };
        let trailing = sepchar.trim_end();
        if line.chars().count() + trailing.chars().count() <= fullwidth {
            line.push_str(trailing);
        }
        self.line(&line, markup)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Prints each warning as a yellow `location: Category: message` line.
#[derive(Debug)]
pub struct TerminalSink<W> {
    writer: Mutex<TerminalWriter<W>>,
}

impl<W: Write + Send> TerminalSink<W> {
    pub fn new(writer: TerminalWriter<W>) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Header line followed by one line per record.
    pub fn summary(&self, records: &[WarningRecord]) -> Result<(), WarningError> {
        let mut writer = crate::sink::lock(&self.writer);
        write_summary(&mut writer, records).map_err(write_error)
    }

    pub fn into_inner(self) -> TerminalWriter<W> {
        self.writer
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

fn write_summary<W: Write>(writer: &mut TerminalWriter<W>, records: &[WarningRecord]) -> io::Result<()> {
    writer.sep("=", Some("warnings summary"), &[Markup::Fg(Color::Yellow)])?;
    for record in records {
        writer.line(&record.to_string(), &[])?;
    }
    writer.flush()
}

fn write_error(err: io::Error) -> WarningError {
    WarningError::Write(err.to_string())
}

impl<W: Write + Send> WarningSink for TerminalSink<W> {
    fn emit(&self, record: WarningRecord) -> Result<(), WarningError> {
        let mut writer = crate::sink::lock(&self.writer);
        writer
            .line(&record.to_string(), &[Markup::Fg(Color::Yellow)])
            .map_err(write_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::WarningCategory;
    use crate::warning::Warning;

    fn plain() -> TerminalWriter<Vec<u8>> {
        let mut tw = TerminalWriter::new(Vec::new(), false);
        tw.set_fullwidth(80);
        tw
    }

    fn text(tw: TerminalWriter<Vec<u8>>) -> String {
        String::from_utf8(tw.into_inner()).unwrap()
    }

    #[test]
    fn width_ignores_bogus_columns() {
        assert_eq!(terminal_width_from(Some("120")), 120);
        assert_eq!(terminal_width_from(Some("20")), FALLBACK_WIDTH);
        assert_eq!(terminal_width_from(Some("wide")), FALLBACK_WIDTH);
        assert_eq!(terminal_width_from(None), FALLBACK_WIDTH);
    }

    #[test]
    fn markup_decision_follows_env_precedence() {
        let env = |pairs: &'static [(&'static str, &'static str)]| {
            move |k: &str| {
                pairs
                    .iter()
                    .find(|(name, _)| *name == k)
                    .map(|(_, v)| v.to_string())
            }
        };
        assert!(should_do_markup(env(&[("PY_COLORS", "1"), ("NO_COLOR", "")]), false));
        assert!(!should_do_markup(env(&[("PY_COLORS", "0"), ("FORCE_COLOR", "")]), true));
        assert!(!should_do_markup(env(&[("NO_COLOR", ""), ("FORCE_COLOR", "")]), true));
        assert!(should_do_markup(env(&[("FORCE_COLOR", "")]), false));
        assert!(!should_do_markup(env(&[("TERM", "dumb")]), true));
        assert!(should_do_markup(env(&[("TERM", "xterm")]), true));
        assert!(!should_do_markup(env(&[]), false));
    }

    #[test]
    fn markup_wraps_only_when_enabled() {
        let on = TerminalWriter::new(Vec::new(), true);
        assert_eq!(
            on.markup("hi", &[Markup::Fg(Color::Red), Markup::Bold]),
            "\x1b[31m\x1b[1mhi\x1b[0m"
        );
        assert_eq!(on.markup("hi", &[]), "hi");
        assert_eq!(plain().markup("hi", &[Markup::Bold]), "hi");
    }

    #[test]
    fn sep_fills_the_line() {
        let mut tw = plain();
        tw.sep("=", Some("warnings summary"), &[]).unwrap();
        tw.sep("-", None, &[]).unwrap();
        let out = text(tw);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], format!("{0} warnings summary {0}", "=".repeat(31)));
        assert_eq!(lines[0].len(), 80);
        assert_eq!(lines[1], "-".repeat(80));
    }

    #[test]
    fn sep_with_long_title_keeps_one_fill() {
        let mut tw = plain();
        tw.set_fullwidth(10);
        tw.sep("=", Some("a very long title"), &[]).unwrap();
        assert_eq!(text(tw), "= a very long title =\n");
    }

    #[test]
    fn current_line_width_tracks_last_line() {
        let mut tw = plain();
        tw.write("abc", &[]).unwrap();
        tw.write("de", &[]).unwrap();
        assert_eq!(tw.width_of_current_line(), 5);
        tw.write("x\n日本", &[]).unwrap();
        assert_eq!(tw.width_of_current_line(), 4);
        tw.line("", &[]).unwrap();
        assert_eq!(tw.width_of_current_line(), 0);
    }

    #[test]
    fn sink_prints_records_and_summary() {
        let sink = TerminalSink::new(plain());
        let rec = WarningRecord::at(
            Warning::new(WarningCategory::PytestDeprecationWarning, "old"),
            "setup.cfg",
        );
        sink.emit(rec.clone()).unwrap();
        sink.summary(&[rec]).unwrap();
        let out = text(sink.into_inner());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "setup.cfg: PytestDeprecationWarning: old");
        assert!(lines[1].contains(" warnings summary "));
        assert_eq!(lines[2], "setup.cfg: PytestDeprecationWarning: old");
    }
}
