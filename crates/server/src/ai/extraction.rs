//! Prompt construction for appointment field extraction

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Weekday};
use salu_core::AppointmentData;

use super::client::OllamaClient;
use crate::runtime::Extractor;
use crate::upstream::ClientError;

/// Instructions given to the model on every extraction
pub const INSTRUCTIONS: &str = r#"Eres un asistente de citas médicas. Extrae del mensaje del usuario los datos de la cita y responde ÚNICAMENTE con un objeto JSON con exactamente estas claves:
- "fullName": nombre completo del paciente
- "date": fecha de la cita en formato AAAA-MM-DD
- "time": hora de la cita en formato de 24 horas HH:MM
- "specialty": especialidad médica
- "phone": número de teléfono

Reglas:
- Si falta un dato, escribe null. Nunca omitas una clave.
- Acepta expresiones informales como "mañana", "el próximo lunes" o "4 de la tarde", pero devuélvelas normalizadas.
- Conserva los datos actuales que el mensaje no contradiga.
- No agregues comentarios ni texto fuera del JSON."#;

/// Extractor that asks an Ollama model for the appointment fields
#[derive(Clone)]
pub struct LlmExtractor {
    client: OllamaClient,
}

impl LlmExtractor {
    pub fn new(client: OllamaClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Extractor for LlmExtractor {
    async fn extract(
        &self,
        instructions: &str,
        context: &AppointmentData,
        utterance: &str,
    ) -> Result<String, ClientError> {
        let today = chrono::Local::now().date_naive();
        let prompt = build_prompt(instructions, context, utterance, today);

        tracing::debug!(model = self.client.model(), "Requesting extraction");
        self.client.generate(&prompt).await
    }
}

/// Full prompt: instructions, reference date, current data and the message
pub fn build_prompt(
    instructions: &str,
    context: &AppointmentData,
    utterance: &str,
    today: NaiveDate,
) -> String {
    let context = serde_json::to_string(context).unwrap_or_else(|_| "{}".to_string());
    format!(
        "{instructions}\n\nFecha de hoy: {} ({})\nDatos actuales: {context}\nMensaje del usuario: \"{utterance}\"",
        today.format("%Y-%m-%d"),
        weekday_es(today.weekday()),
    )
}

fn weekday_es(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "lunes",
        Weekday::Tue => "martes",
        Weekday::Wed => "miércoles",
        Weekday::Thu => "jueves",
        Weekday::Fri => "viernes",
        Weekday::Sat => "sábado",
        Weekday::Sun => "domingo",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_carries_date_context_and_message() {
        let context = AppointmentData {
            full_name: Some("Ana".into()),
            specialty: Some("Cardiología".into()),
            ..Default::default()
        };
        let today = NaiveDate::from_ymd_opt(2025, 8, 19).unwrap();
        let prompt = build_prompt(INSTRUCTIONS, &context, "mañana a las 4 de la tarde", today);

        assert!(prompt.starts_with(INSTRUCTIONS));
        assert!(prompt.contains("Fecha de hoy: 2025-08-19 (martes)"));
        assert!(prompt.contains(r#""fullName":"Ana""#));
        assert!(prompt.contains(r#""phone":null"#));
        assert!(prompt.ends_with("Mensaje del usuario: \"mañana a las 4 de la tarde\""));
    }

    #[test]
    fn instructions_name_every_field_and_require_nulls() {
        for key in ["fullName", "date", "time", "specialty", "phone"] {
            assert!(INSTRUCTIONS.contains(&format!("\"{key}\"")));
        }
        assert!(INSTRUCTIONS.contains("null"));
        assert!(INSTRUCTIONS.contains("AAAA-MM-DD"));
        assert!(INSTRUCTIONS.contains("24 horas"));
    }
}
