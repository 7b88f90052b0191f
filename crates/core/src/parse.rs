//! Pull a JSON object out of free-form language-model output
//!
//! Models wrap their answer in prose, fence it in markdown, or sprinkle
//! `// comments` inside it. [`extract_json`] survives all three.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use crate::appointment::AppointmentData;

/// Why a model response could not be turned into an object
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("No JSON object found in response")]
    NoJsonFound,

    #[error("Malformed JSON: {0}")]
    MalformedJson(String),
}

/// Extract and decode the JSON object embedded in `raw`.
///
/// A ```` ```json ```` fenced block wins when present; otherwise the span
/// from the first `{` to the last `}` is used. Comments and trailing commas
/// are removed before decoding.
pub fn extract_json(raw: &str) -> Result<Map<String, JsonValue>, ParseError> {
    let span = fenced_json(raw)
        .and_then(object_span)
        .or_else(|| object_span(raw))
        .ok_or(ParseError::NoJsonFound)?;

    let cleaned = strip_trailing_commas(&strip_comments(span));

    match serde_json::from_str::<JsonValue>(&cleaned) {
        Ok(JsonValue::Object(map)) => Ok(map),
        Ok(other) => Err(ParseError::MalformedJson(format!(
            "expected an object, got {}",
            type_name(&other)
        ))),
        Err(e) => Err(ParseError::MalformedJson(e.to_string())),
    }
}

/// Appointment fields as a model emits them: English or Spanish keys,
/// numbers for phones, `"null"` or blanks for missing values
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExtractedFields {
    #[serde(default, alias = "nombreCompleto", deserialize_with = "lenient_string")]
    full_name: Option<String>,

    #[serde(default, alias = "fecha", deserialize_with = "lenient_string")]
    date: Option<String>,

    #[serde(default, alias = "hora", deserialize_with = "lenient_string")]
    time: Option<String>,

    #[serde(default, alias = "especialidad", deserialize_with = "lenient_string")]
    specialty: Option<String>,

    #[serde(default, alias = "telefono", deserialize_with = "lenient_string")]
    phone: Option<String>,
}

impl From<ExtractedFields> for AppointmentData {
    fn from(fields: ExtractedFields) -> Self {
        AppointmentData {
            full_name: fields.full_name,
            date: fields.date,
            time: fields.time,
            specialty: fields.specialty,
            phone: fields.phone,
        }
    }
}

/// Accept strings, numbers and booleans; map null, blanks and the literal
/// string "null" to `None`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(match value {
        Some(JsonValue::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Some(JsonValue::Number(n)) => Some(n.to_string()),
        Some(JsonValue::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Extract the appointment fields carried by a model response
pub fn extract_appointment(raw: &str) -> Result<AppointmentData, ParseError> {
    let map = extract_json(raw)?;
    serde_json::from_value::<ExtractedFields>(JsonValue::Object(map))
        .map(AppointmentData::from)
        .map_err(|e| ParseError::MalformedJson(e.to_string()))
}

/// Inner text of the first ```` ```json ```` block; an unterminated block
/// runs to the end of the input.
fn fenced_json(text: &str) -> Option<&str> {
    const FENCE: &str = "```json";

    let start = text.to_ascii_lowercase().find(FENCE)?;
    let after = &text[start + FENCE.len()..];
    match after.find("```") {
        Some(end) => Some(&after[..end]),
        None => Some(after),
    }
}

/// Span from the first `{` to the last `}`, inclusive
fn object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Remove `// ...` and `/* ... */` comments that sit outside string literals.
///
/// A line comment ends at a newline or just before a `,`, `}` or `]`, so a
/// comment trailing a value does not swallow the structure after it.
pub fn strip_comments(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut chars = json.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match (c, chars.peek()) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                while let Some(&next) = chars.peek() {
                    if matches!(next, '\n' | ',' | '}' | ']') {
                        break;
                    }
                    chars.next();
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
            }
            _ => out.push(c),
        }
    }

    out
}

/// Drop commas that directly precede a closing `}` or `]`
fn strip_trailing_commas(json: &str) -> String {
    let chars: Vec<char> = json.chars().collect();
    let mut out = String::with_capacity(json.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
        } else if c == ',' {
            let closes = chars[i + 1..]
                .iter()
                .find(|ch| !ch.is_whitespace())
                .is_some_and(|ch| matches!(ch, '}' | ']'));
            if closes {
                continue;
            }
        }
        out.push(c);
    }

    out
}

fn type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn object(value: JsonValue) -> Map<String, JsonValue> {
        match value {
            JsonValue::Object(map) => map,
            _ => unreachable!("test fixture must be an object"),
        }
    }

    #[test]
    fn fenced_block_inside_prose() {
        let raw = "Claro, aquí tienes los datos:\n```json\n{\"date\": \"2025-08-20\", \"time\": \"16:00\"}\n```\nAvísame si necesitas algo más.";
        assert_eq!(
            extract_json(raw).unwrap(),
            object(json!({"date": "2025-08-20", "time": "16:00"}))
        );
    }

    #[test]
    fn bare_object_inside_prose() {
        let raw = "Resultado: {\"fullName\": \"Ana\", \"phone\": null} fin";
        assert_eq!(
            extract_json(raw).unwrap(),
            object(json!({"fullName": "Ana", "phone": null}))
        );
    }

    #[test]
    fn no_braces_is_no_json_found() {
        assert_eq!(
            extract_json("No tengo suficientes datos todavía."),
            Err(ParseError::NoJsonFound)
        );
        assert_eq!(extract_json("} al revés {"), Err(ParseError::NoJsonFound));
        assert_eq!(extract_json(""), Err(ParseError::NoJsonFound));
    }

    #[test]
    fn unterminated_object_is_malformed() {
        let err = extract_json("{\"date\": {\"day\": 20}").unwrap_err();
        assert!(matches!(err, ParseError::MalformedJson(_)));
    }

    #[test]
    fn strips_trailing_line_comments() {
        let raw = r#"{
            "fullName": "Ana Pérez", // nombre dado por el usuario
            "date": "2025-08-20", // "mañana"
            "time": null // no lo indicó
        }"#;
        assert_eq!(
            extract_json(raw).unwrap(),
            object(json!({"fullName": "Ana Pérez", "date": "2025-08-20", "time": null}))
        );
    }

    #[test]
    fn comment_before_closing_brace_on_same_line() {
        let raw = r#"{"time": "16:00" // 4 de la tarde}"#;
        assert_eq!(extract_json(raw).unwrap(), object(json!({"time": "16:00"})));
    }

    #[test]
    fn slashes_inside_strings_survive() {
        let raw = r#"{"note": "ver https://salu.example/citas", "date": "20/08/2025"}"#;
        assert_eq!(
            extract_json(raw).unwrap(),
            object(json!({"note": "ver https://salu.example/citas", "date": "20/08/2025"}))
        );
    }

    #[test]
    fn block_comments_and_trailing_commas() {
        let raw = "{ /* datos */ \"date\": \"2025-08-20\", \"time\": \"09:30\", }";
        assert_eq!(
            extract_json(raw).unwrap(),
            object(json!({"date": "2025-08-20", "time": "09:30"}))
        );
    }

    #[test]
    fn nested_braces_in_string_values() {
        let raw = r#"Listo {"fullName": "Ana {la doctora}", "time": "16:00"}"#;
        assert_eq!(
            extract_json(raw).unwrap(),
            object(json!({"fullName": "Ana {la doctora}", "time": "16:00"}))
        );
    }

    #[test]
    fn two_separate_objects_are_malformed() {
        let raw = r#"Primero {"date": "2025-08-20"} y luego {"time": "16:00"}"#;
        assert!(matches!(extract_json(raw), Err(ParseError::MalformedJson(_))));
    }

    #[test]
    fn fence_wins_over_other_spans() {
        let raw = "Ejemplo: {\"a\": 1}\n```json\n{\"time\": \"08:00\"}\n```";
        assert_eq!(extract_json(raw).unwrap(), object(json!({"time": "08:00"})));
    }

    #[test]
    fn empty_object_decodes_to_empty_appointment() {
        assert!(extract_json("{}").unwrap().is_empty());
        assert!(extract_appointment("```json\n{}\n```").unwrap().is_empty());
    }

    #[test]
    fn appointment_accepts_spanish_keys_and_numbers() {
        let data = extract_appointment(
            r#"{"nombreCompleto": " Luis Gómez ", "fecha": "2025-08-20", "hora": null, "telefono": 5512345678}"#,
        )
        .unwrap();

        assert_eq!(data.full_name.as_deref(), Some("Luis Gómez"));
        assert_eq!(data.date.as_deref(), Some("2025-08-20"));
        assert_eq!(data.time, None);
        assert_eq!(data.phone.as_deref(), Some("5512345678"));
    }

    #[test]
    fn appointment_treats_blank_and_null_strings_as_missing() {
        let data = extract_appointment(r#"{"fullName": "  ", "date": "null"}"#).unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn appointment_from_fenced_response() {
        let raw = "```JSON\n{\"nombreCompleto\": \"Luis\", \"fecha\": \"2025-08-21\", \"hora\": \"10:00\"}\n```";
        let data = extract_appointment(raw).unwrap();
        assert_eq!(data.full_name.as_deref(), Some("Luis"));
        assert_eq!(data.date.as_deref(), Some("2025-08-21"));
        assert_eq!(data.time.as_deref(), Some("10:00"));
        assert_eq!(data.specialty, None);
    }

    proptest! {
        #[test]
        fn fenced_object_is_independent_of_surrounding_prose(
            before in "[a-zA-Z ,.!¿?áéíóú\n]{0,40}",
            after in "[a-zA-Z ,.!¿?áéíóú\n]{0,40}",
            date in "[0-9]{4}-[0-9]{2}-[0-9]{2}",
        ) {
            let raw = format!("{before}```json\n{{\"date\": \"{date}\"}}\n```{after}");
            let map = extract_json(&raw).unwrap();
            prop_assert_eq!(map.get("date"), Some(&JsonValue::String(date)));
        }

        #[test]
        fn prose_without_braces_never_decodes(text in "[^{}]{0,80}") {
            prop_assert_eq!(extract_json(&text), Err(ParseError::NoJsonFound));
        }

        #[test]
        fn never_panics(text in ".{0,120}") {
            let _ = extract_json(&text);
        }
    }
}
