#![forbid(unsafe_code)]

//! Structured log events emitted by history operations.
//!
//! Installs a capturing layer per test and checks targets, levels, and the
//! fields each operation records.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use backtrack_core::{CommandInvoker, FnCommand, HistoryManager, UndoableUnit, UnitKind};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: Level,
    target: String,
    fields: HashMap<String, String>,
}

impl CapturedEvent {
    fn message(&self) -> &str {
        self.fields.get("message").map_or("", String::as_str)
    }
}

#[derive(Clone, Default)]
struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }
    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            fields: visitor.0.into_iter().collect(),
        });
    }
}

fn with_captured_tracing<F: FnOnce()>(f: F) -> Vec<CapturedEvent> {
    let capture = EventCapture::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    tracing::subscriber::with_default(subscriber, f);
    let events = capture.events.lock().unwrap().clone();
    events
}

fn noop(name: &str) -> FnCommand<u8> {
    FnCommand::new(name, |_: &mut u8| Ok(()), |_: &mut u8| Ok(()))
}

fn find<'a>(events: &'a [CapturedEvent], message: &str) -> Vec<&'a CapturedEvent> {
    events.iter().filter(|e| e.message() == message).collect()
}

#[test]
fn commit_undo_redo_clear_emit_debug_events() {
    let events = with_captured_tracing(|| {
        let mut history: HistoryManager<u8> =
            HistoryManager::new(UnitKind::Command, NonZeroUsize::new(4).unwrap());
        history.commit(UndoableUnit::command(noop("first"))).unwrap();
        history.undo().unwrap();
        history.redo().unwrap();
        history.clear();
    });

    for message in ["unit committed", "unit undone", "unit redone", "history cleared"] {
        let hits = find(&events, message);
        assert_eq!(hits.len(), 1, "expected one {message:?} event");
        assert_eq!(hits[0].level, Level::DEBUG);
        assert_eq!(hits[0].target, "backtrack.history");
    }

    let undone = find(&events, "unit undone")[0];
    assert_eq!(undone.fields.get("description").map(String::as_str), Some("first"));
    assert_eq!(undone.fields.get("undo_depth").map(String::as_str), Some("0"));
    assert_eq!(undone.fields.get("redo_depth").map(String::as_str), Some("1"));
}

#[test]
fn eviction_is_logged() {
    let events = with_captured_tracing(|| {
        let mut history: HistoryManager<u8> =
            HistoryManager::new(UnitKind::Command, NonZeroUsize::new(1).unwrap());
        history.commit(UndoableUnit::command(noop("old"))).unwrap();
        history.commit(UndoableUnit::command(noop("new"))).unwrap();
    });

    let evictions = find(&events, "capacity eviction");
    assert_eq!(evictions.len(), 1);
    assert_eq!(evictions[0].fields.get("description").map(String::as_str), Some("old"));
    assert_eq!(evictions[0].fields.get("capacity").map(String::as_str), Some("1"));
}

#[test]
fn rejected_commit_warns() {
    let events = with_captured_tracing(|| {
        let mut history: HistoryManager<u8> =
            HistoryManager::new(UnitKind::Command, NonZeroUsize::new(2).unwrap());
        assert!(history.commit(UndoableUnit::snapshot("wrong", ())).is_err());
    });

    let warnings: Vec<_> = events.iter().filter(|e| e.level == Level::WARN).collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].message(), "commit rejected");
    assert!(find(&events, "unit committed").is_empty());
}

#[test]
fn empty_history_calls_are_silent() {
    let events = with_captured_tracing(|| {
        let mut inv = CommandInvoker::new(0u8);
        assert!(inv.undo().is_err());
        assert!(inv.redo().is_err());
    });
    assert!(events.is_empty());
}

#[test]
fn adapter_events_use_their_own_target() {
    let events = with_captured_tracing(|| {
        let mut inv = CommandInvoker::new(0u8);
        inv.execute(noop("step")).unwrap();
        inv.undo().unwrap();
    });

    let adapter: Vec<_> = events
        .iter()
        .filter(|e| e.target == "backtrack.adapter")
        .map(CapturedEvent::message)
        .collect();
    assert_eq!(adapter, ["command applied", "command reversed"]);
}
