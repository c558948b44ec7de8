//! Custom tracing layer for streaming pipeline progress to front-ends
//!
//! Pipeline stages log events carrying `stage` and `status` fields. This layer
//! captures those events and forwards them over a tokio channel so the REPL
//! can print status lines while a report is being generated.

use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// Event data sent to the front-end
#[derive(Debug, Clone, serde::Serialize)]
pub struct PipelineEvent {
    /// Event target (e.g., "quarry_application::pipeline")
    pub target: String,
    /// Log level (INFO, DEBUG, WARN, ERROR)
    pub level: String,
    /// Human-readable message
    pub message: String,
    /// Structured fields from the event, including `stage` and `status`
    pub fields: HashMap<String, Value>,
    /// Timestamp
    pub timestamp: String,
}

impl PipelineEvent {
    /// Stage name, e.g. "Planner".
    pub fn stage(&self) -> Option<&str> {
        self.field_str("stage")
    }

    /// One of "started", "progress", "completed", "failed".
    pub fn status(&self) -> Option<&str> {
        self.field_str("status")
    }

    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    pub fn is_failure(&self) -> bool {
        self.status() == Some("failed")
    }
}

/// A tracing layer that sends stage events to a channel
pub struct PipelineEventLayer {
    sender: mpsc::UnboundedSender<PipelineEvent>,
}

impl PipelineEventLayer {
    /// Create a new layer with the given channel sender
    pub fn new(sender: mpsc::UnboundedSender<PipelineEvent>) -> Self {
        Self { sender }
    }

    /// Create a layer together with the receiving end of its channel
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<PipelineEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }
}

impl<S> Layer<S> for PipelineEventLayer
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if event.metadata().fields().field("stage").is_none() {
            return;
        }

        let mut fields = HashMap::new();
        let mut visitor = FieldVisitor(&mut fields);
        event.record(&mut visitor);

        let pipeline_event = PipelineEvent {
            target: event.metadata().target().to_string(),
            level: event.metadata().level().to_string(),
            message: fields
                .remove("message")
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default(),
            fields,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        // Receiver may already be gone
        let _ = self.sender.send(pipeline_event);
    }
}

/// Field visitor that extracts tracing event fields into a HashMap
struct FieldVisitor<'a>(&'a mut HashMap<String, Value>);

impl<'a> tracing::field::Visit for FieldVisitor<'a> {
    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.insert(
            field.name().to_string(),
            serde_json::json!(format!("{:?}", value)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_core::PipelineStage;
    use tracing_subscriber::layer::SubscriberExt;

    #[test]
    fn test_forwards_only_stage_events() {
        let (layer, mut receiver) = PipelineEventLayer::channel();
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("unrelated message");
            tracing::info!(
                stage = %PipelineStage::Planner,
                status = "completed",
                plan = "1. Intro",
                "[Planner] Plan ready"
            );
            tracing::warn!(stage = %PipelineStage::Writer, status = "failed", "[Writer] Failed");
        });

        let first = receiver.try_recv().unwrap();
        assert_eq!(first.stage(), Some("Planner"));
        assert_eq!(first.status(), Some("completed"));
        assert_eq!(first.field_str("plan"), Some("1. Intro"));
        assert_eq!(first.message, "[Planner] Plan ready");
        assert_eq!(first.level, "INFO");
        assert!(!first.is_failure());

        let second = receiver.try_recv().unwrap();
        assert_eq!(second.stage(), Some("Writer"));
        assert!(second.is_failure());

        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_numeric_fields_are_kept() {
        let (layer, mut receiver) = PipelineEventLayer::channel();
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(stage = "SectionResearcher", status = "completed", sources = 12u64, "done");
        });

        let event = receiver.try_recv().unwrap();
        assert_eq!(event.fields.get("sources"), Some(&serde_json::json!(12)));
    }

    #[test]
    fn test_dropped_receiver_is_ignored() {
        let (layer, receiver) = PipelineEventLayer::channel();
        drop(receiver);
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(stage = "Planner", status = "started", "start");
        });
    }
}
