#![forbid(unsafe_code)]

//! Line-oriented session scripts.
//!
//! ```text
//! # comments and blank lines are skipped
//! type Hello
//! type  World
//! undo
//! redo
//! status
//! history
//! clear
//! ```
//!
//! `type` appends everything after the first whitespace character, so any
//! further leading whitespace in the text is kept. The document is printed after every line that changes it.
//! Undo or redo on an empty stack prints a notice and the script goes on.

use std::fmt;
use std::io::{BufRead, Write};

use backtrack_core::{
    CommandInvoker, HistoryConfig, HistoryError, SnapshotCaretaker, UndoRedo, UndoableUnit,
    UnitKind,
};

use crate::document::{AppendText, TextDocument};
use crate::error::{CliError, Result};

/// One parsed script line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptLine {
    Type(String),
    Undo,
    Redo,
    Clear,
    Status,
    History,
}

impl ScriptLine {
    /// Parse a line. Blank lines and comments yield `Ok(None)`.
    pub fn parse(line: &str) -> std::result::Result<Option<Self>, String> {
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.trim().is_empty() || trimmed.trim_start().starts_with('#') {
            return Ok(None);
        }
        let trimmed = trimmed.trim_start();
        let (word, rest) = trimmed
            .split_once(char::is_whitespace)
            .unwrap_or((trimmed, ""));

        if word == "type" {
            if rest.is_empty() {
                return Err("`type` needs some text".to_string());
            }
            return Ok(Some(Self::Type(rest.to_string())));
        }
        let parsed = match word {
            "undo" => Self::Undo,
            "redo" => Self::Redo,
            "clear" => Self::Clear,
            "status" => Self::Status,
            "history" => Self::History,
            _ => return Err(format!("unknown command `{word}`")),
        };
        if !rest.trim().is_empty() {
            return Err(format!("`{word}` takes no arguments"));
        }
        Ok(Some(parsed))
    }

    /// True if running the line can change the document or the history.
    #[must_use]
    pub fn is_mutating(&self) -> bool {
        matches!(self, Self::Type(_) | Self::Undo | Self::Redo | Self::Clear)
    }
}

/// A text editing session in either model.
#[derive(Debug)]
pub enum EditorSession {
    Snapshot(SnapshotCaretaker<TextDocument>),
    Command(CommandInvoker<TextDocument>),
}

/// What an undo or redo did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Moved(String),
    Empty,
}

impl EditorSession {
    /// Start an empty document in the given model.
    pub fn new(kind: UnitKind, config: &HistoryConfig) -> Result<Self> {
        let doc = TextDocument::default();
        let session = match kind {
            UnitKind::Snapshot => Self::Snapshot(SnapshotCaretaker::with_config(doc, config)?),
            UnitKind::Command => Self::Command(CommandInvoker::with_config(doc, config)?),
        };
        tracing::debug!(
            target: "backtrack.cli",
            model = %kind,
            capacity = config.capacity.get(),
            "session started"
        );
        Ok(session)
    }

    #[must_use]
    pub fn kind(&self) -> UnitKind {
        match self {
            Self::Snapshot(_) => UnitKind::Snapshot,
            Self::Command(_) => UnitKind::Command,
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Snapshot(s) => s.originator().text(),
            Self::Command(c) => c.receiver().text(),
        }
    }

    pub fn type_text(&mut self, text: &str) -> Result<()> {
        match self {
            Self::Snapshot(s) => {
                s.edit(format!("Type {text:?}"), |doc| doc.append(text))?;
            }
            Self::Command(c) => {
                c.execute(AppendText::new(text))?;
            }
        }
        Ok(())
    }

    pub fn undo(&mut self) -> Result<StepOutcome> {
        match self {
            Self::Snapshot(s) => step(s.undo()),
            Self::Command(c) => step(c.undo()),
        }
    }

    pub fn redo(&mut self) -> Result<StepOutcome> {
        match self {
            Self::Snapshot(s) => step(s.redo()),
            Self::Command(c) => step(c.redo()),
        }
    }

    pub fn clear(&mut self) {
        match self {
            Self::Snapshot(s) => s.clear(),
            Self::Command(c) => c.clear(),
        }
    }

    #[must_use]
    pub fn status(&self) -> Status {
        match self {
            Self::Snapshot(s) => Status::of(s),
            Self::Command(c) => Status::of(c),
        }
    }

    /// `(undo, redo)` descriptions, most recent first.
    #[must_use]
    pub fn descriptions(&self) -> (Vec<String>, Vec<String>) {
        fn owned(list: Vec<&str>) -> Vec<String> {
            list.into_iter().map(str::to_string).collect()
        }
        match self {
            Self::Snapshot(s) => (
                owned(s.history().undo_descriptions(usize::MAX)),
                owned(s.history().redo_descriptions(usize::MAX)),
            ),
            Self::Command(c) => (
                owned(c.history().undo_descriptions(usize::MAX)),
                owned(c.history().redo_descriptions(usize::MAX)),
            ),
        }
    }
}

fn step<T, S>(result: std::result::Result<&UndoableUnit<T, S>, HistoryError>) -> Result<StepOutcome> {
    match result {
        Ok(unit) => Ok(StepOutcome::Moved(unit.description().to_string())),
        Err(err) if err.is_empty_history() => Ok(StepOutcome::Empty),
        Err(err) => Err(err.into()),
    }
}

/// Snapshot of the history counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub kind: UnitKind,
    pub undo: usize,
    pub redo: usize,
    pub capacity: usize,
    pub evicted: u64,
}

impl Status {
    fn of<A: UndoRedo>(session: &A) -> Self {
        let history = session.history();
        let (undo, redo) = history.history_size();
        Self {
            kind: history.kind(),
            undo,
            redo,
            capacity: history.capacity(),
            evicted: history.evicted_count(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "model={} undo={} redo={} capacity={} evicted={}",
            self.kind, self.undo, self.redo, self.capacity, self.evicted
        )
    }
}

/// Totals for a finished script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptSummary {
    pub lines: usize,
    pub executed: usize,
    pub empty_steps: usize,
}

/// Run every line of `input` against `session`, writing results to `out`.
///
/// Stops at the first line that fails to parse or fails for a reason other
/// than an empty history.
pub fn run_script<R: BufRead, W: Write>(
    session: &mut EditorSession,
    input: R,
    out: &mut W,
) -> Result<ScriptSummary> {
    let mut summary = ScriptSummary::default();
    for (index, line) in input.lines().enumerate() {
        let line = line?;
        let number = index + 1;
        summary.lines = number;
        let Some(parsed) = ScriptLine::parse(&line).map_err(|msg| CliError::script(number, msg))?
        else {
            continue;
        };
        if execute_line(session, &parsed, out)? {
            summary.empty_steps += 1;
        }
        summary.executed += 1;
    }
    Ok(summary)
}

/// Returns true if the line was an undo or redo on an empty stack.
fn execute_line<W: Write>(session: &mut EditorSession, line: &ScriptLine, out: &mut W) -> Result<bool> {
    let mut empty = false;
    match line {
        ScriptLine::Type(text) => session.type_text(text)?,
        ScriptLine::Undo => {
            if session.undo()? == StepOutcome::Empty {
                writeln!(out, "(nothing to undo)")?;
                empty = true;
            }
        }
        ScriptLine::Redo => {
            if session.redo()? == StepOutcome::Empty {
                writeln!(out, "(nothing to redo)")?;
                empty = true;
            }
        }
        ScriptLine::Clear => session.clear(),
        ScriptLine::Status => writeln!(out, "{}", session.status())?,
        ScriptLine::History => {
            let (undo, redo) = session.descriptions();
            for d in &undo {
                writeln!(out, "undo: {d}")?;
            }
            for d in &redo {
                writeln!(out, "redo: {d}")?;
            }
        }
    }
    if line.is_mutating() && !empty {
        writeln!(out, "{:?}", session.text())?;
    }
    Ok(empty)
}
