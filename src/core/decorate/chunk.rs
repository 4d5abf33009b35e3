//! Chunk decoration
//!
//! Chunk decorators rewrite message contents of a delivered chunk. They never
//! add or drop messages, and the field order and first-chunk flag of the
//! input chunk are kept.

use crate::domain::{
    DecoratorConfig, DecoratorKind, ExportError, MessagesRequest, Result, SimpleMessage,
    SimpleMessageChunk,
};
use regex::{Captures, Regex};
use serde_json::Value;

/// Rewrites chunk contents according to a message list's decorators
pub trait ChunkDecorator: Send + Sync {
    fn decorate(
        &self,
        chunk: SimpleMessageChunk,
        decorators: &[DecoratorConfig],
        request: &MessagesRequest,
    ) -> Result<SimpleMessageChunk>;
}

/// Applies the built-in decorator kinds, lowest `order` first
#[derive(Debug, Clone)]
pub struct ConfiguredChunkDecorator {
    placeholder: Regex,
}

impl ConfiguredChunkDecorator {
    pub fn new() -> Result<Self> {
        let placeholder = Regex::new(r"\$\{([^}]+)\}").map_err(|e| {
            ExportError::Configuration(format!("Invalid format placeholder pattern: {e}"))
        })?;
        Ok(Self { placeholder })
    }

    fn apply(&self, kind: &DecoratorKind, message: &mut SimpleMessage) {
        match kind {
            DecoratorKind::FormatString {
                target_field,
                format,
                require_all_fields,
            } => {
                if let Some(rendered) = self.render(format, message, *require_all_fields) {
                    message
                        .fields_mut()
                        .insert(target_field.clone(), Value::String(rendered));
                }
            }
            DecoratorKind::SyslogSeverity {
                source_field,
                target_field,
            } => {
                let severity = message.get(source_field).and_then(syslog_severity);
                if let Some(name) = severity {
                    message
                        .fields_mut()
                        .insert(target_field.clone(), Value::from(name));
                }
            }
            DecoratorKind::FieldRename { from, to } => {
                if from != to {
                    if let Some(value) = message.fields_mut().remove(from) {
                        message.fields_mut().insert(to.clone(), value);
                    }
                }
            }
        }
    }

    /// `None` when a placeholder is missing and all fields are required
    fn render(&self, format: &str, message: &SimpleMessage, require_all: bool) -> Option<String> {
        let mut missing = false;

        let rendered = self.placeholder.replace_all(format, |caps: &Captures| {
            match message.get(caps[1].trim()) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => {
                    missing = true;
                    String::new()
                }
                Some(other) => other.to_string(),
            }
        });

        if missing && require_all {
            None
        } else {
            Some(rendered.into_owned())
        }
    }
}

impl ChunkDecorator for ConfiguredChunkDecorator {
    fn decorate(
        &self,
        chunk: SimpleMessageChunk,
        decorators: &[DecoratorConfig],
        _request: &MessagesRequest,
    ) -> Result<SimpleMessageChunk> {
        if decorators.is_empty() {
            return Ok(chunk);
        }

        let mut ordered: Vec<&DecoratorConfig> = decorators.iter().collect();
        ordered.sort_by_key(|d| d.order);

        let mut chunk = chunk;
        for message in chunk.messages_mut() {
            for decorator in &ordered {
                self.apply(&decorator.kind, message);
            }
        }

        tracing::trace!(
            decorators = ordered.len(),
            messages = chunk.len(),
            "Decorated chunk"
        );

        Ok(chunk)
    }
}

/// Syslog level name for a numeric level or its string form
fn syslog_severity(level: &Value) -> Option<&'static str> {
    let level = match level {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };

    let name = match level {
        0 => "Emergency",
        1 => "Alert",
        2 => "Critical",
        3 => "Error",
        4 => "Warning",
        5 => "Notice",
        6 => "Informational",
        7 => "Debug",
        _ => return None,
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TimeRange;
    use serde_json::{json, Map};

    fn message(fields: Value) -> SimpleMessage {
        match fields {
            Value::Object(map) => SimpleMessage::new("graylog_0", map),
            _ => SimpleMessage::new("graylog_0", Map::new()),
        }
    }

    fn chunk(messages: Vec<SimpleMessage>) -> SimpleMessageChunk {
        SimpleMessageChunk::new(vec!["message".to_string()], messages, true)
    }

    fn request() -> MessagesRequest {
        MessagesRequest::builder(TimeRange::relative(300)).build().unwrap()
    }

    fn config(order: i32, kind: DecoratorKind) -> DecoratorConfig {
        DecoratorConfig {
            id: None,
            order,
            kind,
        }
    }

    #[test]
    fn test_format_string() {
        let decorator = ConfiguredChunkDecorator::new().unwrap();
        let decorators = [config(
            0,
            DecoratorKind::FormatString {
                target_field: "summary".to_string(),
                format: "${source}: ${message} (${level})".to_string(),
                require_all_fields: false,
            },
        )];

        let out = decorator
            .decorate(
                chunk(vec![message(json!({"source": "web", "message": "Ha", "level": 3}))]),
                &decorators,
                &request(),
            )
            .unwrap();

        assert_eq!(out.messages()[0].get("summary"), Some(&json!("web: Ha (3)")));
    }

    #[test]
    fn test_format_string_requiring_all_fields_skips_incomplete_messages() {
        let decorator = ConfiguredChunkDecorator::new().unwrap();
        let decorators = [config(
            0,
            DecoratorKind::FormatString {
                target_field: "summary".to_string(),
                format: "${source}/${missing}".to_string(),
                require_all_fields: true,
            },
        )];

        let out = decorator
            .decorate(chunk(vec![message(json!({"source": "web"}))]), &decorators, &request())
            .unwrap();

        assert_eq!(out.messages()[0].get("summary"), None);
    }

    #[test]
    fn test_decorators_run_in_order_and_keep_chunk_identity() {
        let decorator = ConfiguredChunkDecorator::new().unwrap();
        let decorators = [
            config(
                2,
                DecoratorKind::SyslogSeverity {
                    source_field: "severity".to_string(),
                    target_field: "severity_name".to_string(),
                },
            ),
            config(
                1,
                DecoratorKind::FieldRename {
                    from: "level".to_string(),
                    to: "severity".to_string(),
                },
            ),
        ];
        let input = SimpleMessageChunk::new(
            vec!["message".to_string(), "severity_name".to_string()],
            vec![message(json!({"message": "Ha", "level": 4})), message(json!({"message": "Ho", "level": "9"}))],
            false,
        );

        let out = decorator.decorate(input, &decorators, &request()).unwrap();

        assert!(!out.is_first_chunk());
        assert_eq!(out.fields_in_order(), ["message", "severity_name"]);
        assert_eq!(out.len(), 2);
        assert_eq!(out.messages()[0].get("level"), None);
        assert_eq!(out.messages()[0].get("severity_name"), Some(&json!("Warning")));
        assert_eq!(out.messages()[1].get("severity"), Some(&json!("9")));
        assert_eq!(out.messages()[1].get("severity_name"), None);
    }

    #[test]
    fn test_no_decorators_is_identity() {
        let decorator = ConfiguredChunkDecorator::new().unwrap();
        let input = chunk(vec![message(json!({"message": "Ha"}))]);

        let out = decorator.decorate(input.clone(), &[], &request()).unwrap();

        assert_eq!(out, input);
    }

    #[test]
    fn test_syslog_severity_mapping() {
        assert_eq!(syslog_severity(&json!(0)), Some("Emergency"));
        assert_eq!(syslog_severity(&json!("6")), Some("Informational"));
        assert_eq!(syslog_severity(&json!(8)), None);
        assert_eq!(syslog_severity(&json!("high")), None);
    }
}
