//! Exported message and chunk types

use serde::Serialize;
use serde_json::{Map, Value};

/// Unique message id written by the ingest pipeline
pub const FIELD_MESSAGE_ID: &str = "gl2_message_id";
/// Engine document id
pub const FIELD_DOCUMENT_ID: &str = "_id";
/// Stream membership of a message
pub const FIELD_STREAMS: &str = "streams";
pub const FIELD_TIMESTAMP: &str = "timestamp";
pub const FIELD_SOURCE: &str = "source";
pub const FIELD_MESSAGE: &str = "message";

/// A single exported message
///
/// Fields keep the order in which the engine returned them. The origin index
/// is provenance and never part of the field map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimpleMessage {
    index: String,
    fields: Map<String, Value>,
}

impl SimpleMessage {
    /// Creates a message from its origin index and fields
    pub fn new(index: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            index: index.into(),
            fields,
        }
    }

    /// Index the message was read from
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Engine document id, if present
    pub fn document_id(&self) -> Option<&str> {
        self.fields.get(FIELD_DOCUMENT_ID).and_then(Value::as_str)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.fields
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Drops every field not named in `keep`
    pub fn retain_fields(&mut self, keep: &[String]) {
        self.fields.retain(|name, _| keep.iter().any(|k| k == name));
    }

    /// Values for `fields_in_order`, in that order; missing fields become `null`
    pub fn ordered_row(&self, fields_in_order: &[String]) -> Map<String, Value> {
        fields_in_order
            .iter()
            .map(|name| {
                (
                    name.clone(),
                    self.fields.get(name).cloned().unwrap_or(Value::Null),
                )
            })
            .collect()
    }
}

/// One page of exported messages
///
/// The field order is the column order of the whole export and is identical
/// for every chunk of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimpleMessageChunk {
    fields_in_order: Vec<String>,
    messages: Vec<SimpleMessage>,
    is_first_chunk: bool,
}

impl SimpleMessageChunk {
    pub fn new(fields_in_order: Vec<String>, messages: Vec<SimpleMessage>, is_first_chunk: bool) -> Self {
        Self {
            fields_in_order,
            messages,
            is_first_chunk,
        }
    }

    pub fn fields_in_order(&self) -> &[String] {
        &self.fields_in_order
    }

    pub fn messages(&self) -> &[SimpleMessage] {
        &self.messages
    }

    pub fn messages_mut(&mut self) -> &mut Vec<SimpleMessage> {
        &mut self.messages
    }

    pub fn into_messages(self) -> Vec<SimpleMessage> {
        self.messages
    }

    pub fn is_first_chunk(&self) -> bool {
        self.is_first_chunk
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Replaces the messages, keeping field order and first-chunk flag
    pub fn with_messages(self, messages: Vec<SimpleMessage>) -> Self {
        Self { messages, ..self }
    }

    /// Prunes every message down to the chunk's field order
    pub fn retain_requested_fields(&mut self) {
        let keep = self.fields_in_order.clone();
        for message in &mut self.messages {
            message.retain_fields(&keep);
        }
    }
}
