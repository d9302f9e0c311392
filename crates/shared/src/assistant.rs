//! Reply shapes returned by the assistant webhook
//!
//! The webhook is an external automation flow whose payload shape has changed
//! over time. Each known shape is a variant; anything else lands in
//! `Unrecognized` rather than being inspected field by field by callers.

use serde::Serialize;
use serde_json::Value;

/// Shortest string field considered an answer when no known key is present
const MIN_FREE_TEXT_LEN: usize = 11;

/// Message shown when no text can be extracted from a reply
pub const UNRECOGNIZED_REPLY_MESSAGE: &str = "No pude obtener la información solicitada. Por favor, intenta con otra pregunta. (Formato de respuesta incorrecto)";

/// Message shown when the webhook call itself fails
pub const ASSISTANT_ERROR_MESSAGE: &str = "Lo siento, ha ocurrido un error al procesar tu consulta. Por favor, inténtalo de nuevo más tarde.";

/// Known answer keys, in precedence order
const KNOWN_KEYS: [(&str, fn(String) -> AssistantReply); 3] = [
    ("respuesta", AssistantReply::Respuesta),
    ("output", AssistantReply::Output),
    ("data", AssistantReply::Data),
];

/// A parsed assistant reply
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", content = "value", rename_all = "snake_case")]
pub enum AssistantReply {
    /// `{ "respuesta": "..." }`, the documented shape
    Respuesta(String),
    /// `{ "output": "..." }`
    Output(String),
    /// `{ "data": "..." }`
    Data(String),
    /// Object without a known key; the longest string field wins
    LongestText { field: String, text: String },
    /// Bare JSON string or non-JSON text body
    PlainText(String),
    /// Nothing usable
    Unrecognized(Value),
}

impl AssistantReply {
    /// Classify a decoded JSON payload
    pub fn from_json(value: Value) -> Self {
        if let Value::String(text) = value {
            return if text.is_empty() {
                AssistantReply::Unrecognized(Value::String(text))
            } else {
                AssistantReply::PlainText(text)
            };
        }

        if let Value::Object(fields) = &value {
            let known = KNOWN_KEYS.iter().find_map(|(name, wrap)| {
                fields
                    .get(*name)
                    .and_then(Value::as_str)
                    .filter(|text| !text.is_empty())
                    .map(|text| wrap(text.to_string()))
            });
            if let Some(reply) = known {
                return reply;
            }

            let longest = fields
                .iter()
                .filter_map(|(key, v)| v.as_str().map(|s| (key, s)))
                .filter(|(_, s)| s.chars().count() >= MIN_FREE_TEXT_LEN)
                .max_by_key(|(_, s)| s.chars().count());
            if let Some((field, text)) = longest {
                return AssistantReply::LongestText {
                    field: field.clone(),
                    text: text.to_string(),
                };
            }
        }

        tracing::debug!(payload = %value, "Assistant reply shape not recognized");
        AssistantReply::Unrecognized(value)
    }

    /// Classify a raw response body, which may or may not be JSON
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str::<Value>(body) {
            Ok(value) => Self::from_json(value),
            Err(_) if !body.trim().is_empty() => AssistantReply::PlainText(body.to_string()),
            Err(_) => AssistantReply::Unrecognized(Value::Null),
        }
    }

    /// Extracted answer text, if any
    pub fn text(&self) -> Option<&str> {
        let text = match self {
            AssistantReply::Respuesta(t)
            | AssistantReply::Output(t)
            | AssistantReply::Data(t)
            | AssistantReply::PlainText(t) => t.as_str(),
            AssistantReply::LongestText { text, .. } => text.as_str(),
            AssistantReply::Unrecognized(_) => return None,
        };
        (!text.is_empty()).then_some(text)
    }

    /// Text to display, falling back to the fixed apology
    pub fn display_text(&self) -> &str {
        self.text().unwrap_or(UNRECOGNIZED_REPLY_MESSAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn respuesta_takes_precedence() {
        let reply = AssistantReply::from_json(json!({
            "respuesta": "Hay 12 clientes pendientes",
            "output": "ignored"
        }));
        assert_eq!(
            reply,
            AssistantReply::Respuesta("Hay 12 clientes pendientes".into())
        );
    }

    #[test]
    fn output_and_data_shapes() {
        assert_eq!(
            AssistantReply::from_json(json!({ "output": "hola" })),
            AssistantReply::Output("hola".into())
        );
        assert_eq!(
            AssistantReply::from_json(json!({ "data": "hola" })),
            AssistantReply::Data("hola".into())
        );
    }

    #[test]
    fn empty_known_key_falls_through_to_longest_text() {
        let reply = AssistantReply::from_json(json!({
            "respuesta": "",
            "note": "short",
            "message": "La tasa de conversión subió"
        }));
        assert_eq!(
            reply,
            AssistantReply::LongestText {
                field: "message".into(),
                text: "La tasa de conversión subió".into()
            }
        );
    }

    #[test]
    fn empty_respuesta_defers_to_output() {
        assert_eq!(
            AssistantReply::from_json(json!({ "respuesta": "", "output": "hola" })),
            AssistantReply::Output("hola".into())
        );
    }

    #[test]
    fn non_string_sibling_does_not_hide_respuesta() {
        assert_eq!(
            AssistantReply::from_json(json!({ "respuesta": "Hay 12", "output": { "rows": 3 } })),
            AssistantReply::Respuesta("Hay 12".into())
        );
        assert_eq!(
            AssistantReply::from_json(json!({ "respuesta": null, "data": "sin cambios" })),
            AssistantReply::Data("sin cambios".into())
        );
    }

    #[test]
    fn short_strings_are_not_answers() {
        let reply = AssistantReply::from_json(json!({ "ok": "yes", "count": 3 }));
        assert!(matches!(reply, AssistantReply::Unrecognized(_)));
        assert_eq!(reply.display_text(), UNRECOGNIZED_REPLY_MESSAGE);
    }

    #[test]
    fn plain_text_bodies() {
        assert_eq!(
            AssistantReply::from_body("respuesta directa"),
            AssistantReply::PlainText("respuesta directa".into())
        );
        assert_eq!(
            AssistantReply::from_body("\"cadena json\""),
            AssistantReply::PlainText("cadena json".into())
        );
        assert!(matches!(
            AssistantReply::from_body("   "),
            AssistantReply::Unrecognized(Value::Null)
        ));
    }

    #[test]
    fn arrays_are_unrecognized() {
        let reply = AssistantReply::from_json(json!(["a", "b"]));
        assert!(reply.text().is_none());
    }
}
