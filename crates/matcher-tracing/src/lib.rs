#![no_std]

//! Buffered `tracing` collector for the credman sandbox.
//!
//! The sandbox has no stderr, so events are collected into a static buffer.
//! A wallet that wants diagnostics sets a level (usually from its catalog
//! configuration); with the default `None` nothing is collected. After a
//! matcher run, [`flush_to_picker`] renders whatever was collected as one
//! extra picker entry so logs can be read off a debug build's picker UI.

extern crate alloc;

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt::Write;
use core::sync::atomic::{AtomicU64, Ordering};
use credman_host::{FieldForStringIdEntryRequest, StringIdEntryRequest, default_credman};
use spin::Mutex;
use tracing_core::dispatcher::Dispatch;
use tracing_core::field::{Field, Visit};
use tracing_core::span::{Attributes, Id, Record};
use tracing_core::{Event, Level, Metadata, Subscriber};

static LOGS: Mutex<Vec<String>> = Mutex::new(Vec::new());
static LOG_LEVEL: Mutex<Option<Level>> = Mutex::new(None);
static NEXT_SPAN_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: Vec<(String, String)>,
}

impl FieldVisitor {
    fn record_value(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = Some(value);
        } else {
            self.fields.push((field.name().to_string(), value));
        }
    }

    fn into_line(self, level: Level) -> String {
        let mut out = String::new();
        let _ = write!(&mut out, "{}: ", level.as_str());
        if let Some(message) = self.message {
            let _ = write!(&mut out, "{message}");
            if !self.fields.is_empty() {
                let _ = write!(&mut out, " ");
            }
        }
        for (index, (key, value)) in self.fields.iter().enumerate() {
            if index > 0 {
                let _ = write!(&mut out, " ");
            }
            let _ = write!(&mut out, "{key}={value}");
        }
        out
    }
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn core::fmt::Debug) {
        self.record_value(field, format!("{value:?}"));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_value(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record_value(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.record_value(field, value.to_string());
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_value(field, value.to_string());
    }
}

struct Collector;

impl Subscriber for Collector {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn new_span(&self, _attrs: &Attributes<'_>) -> Id {
        Id::from_u64(NEXT_SPAN_ID.fetch_add(1, Ordering::Relaxed))
    }

    fn record(&self, _span: &Id, _values: &Record<'_>) {}

    fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

    fn event(&self, event: &Event<'_>) {
        let Some(level) = *LOG_LEVEL.lock() else {
            return;
        };
        if event.metadata().level() > &level {
            return;
        }
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        LOGS.lock()
            .push(visitor.into_line(*event.metadata().level()));
    }

    fn enter(&self, _span: &Id) {}

    fn exit(&self, _span: &Id) {}
}

/// Installs the collector as the global tracing default and clears any
/// leftover buffer. Safe to call more than once; later installs are ignored.
pub fn install() {
    LOGS.lock().clear();
    let _ = tracing_core::dispatcher::set_global_default(Dispatch::new(Collector));
}

/// Sets the active log level. `None` disables collection entirely.
pub fn set_level(level: Option<Level>) {
    *LOG_LEVEL.lock() = level;
}

/// Returns and clears collected log lines.
pub fn take() -> Vec<String> {
    core::mem::take(&mut *LOGS.lock())
}

/// Renders collected log lines as a single picker entry.
///
/// Each line becomes one field name with an empty value. Does nothing when
/// no lines were collected.
pub fn flush_to_picker() {
    let lines = take();
    if lines.is_empty() {
        return;
    }

    let host = default_credman();
    host.add_string_id_entry(&StringIdEntryRequest {
        cred_id: "matcher:logs",
        icon: None,
        title: "matcher diagnostics",
        subtitle: None,
        disclaimer: None,
        warning: None,
    });
    for line in &lines {
        host.add_field_for_string_id_entry(&FieldForStringIdEntryRequest {
            cred_id: "matcher:logs",
            field_display_name: line.as_str(),
            field_display_value: None,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_only_at_or_above_level() {
        install();
        set_level(Some(Level::WARN));
        tracing::warn!(code = 7, "something {}", "bad");
        tracing::debug!("too fine to keep");
        let lines = take();
        set_level(None);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("WARN: something bad"));
        assert!(lines[0].contains("code=7"));
    }
}
