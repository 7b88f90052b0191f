//! User-facing text, in the conversation's language (Spanish)

use crate::appointment::{AppointmentData, CaptureField};
use crate::specialty::SpecialtyIndex;

pub const WELCOME: &str =
    "👋 ¡Hola! Soy la IA de Salu, tu asistente virtual para agendar citas médicas.";

pub const MENU: &str = "¿Qué te gustaría hacer hoy? \n\n*1.* Ver especialidades \n*2.* Agendar una cita";

pub const MENU_HINT: &str = "No entendí tu respuesta. Escribe el número de una opción.";

pub const SEARCHING: &str = "Buscando especialidades...";

pub const BOOKING_HINT: &str = "Para agendar una cita, escribe \"2\" o \"agendar\".";

pub const CONFIRM_QUESTION: &str = "¿Es correcta la información para agendar la cita? (Sí/No)";

pub const YES_NO_HINT: &str = "Por favor responde \"Sí\" para confirmar o \"No\" para corregir tus datos.";

pub const RESTART: &str = "De acuerdo, volvamos a tomar tus datos.";

pub const BOOKED: &str = "¡Listo! Tu cita quedó agendada. Te esperamos.";

pub const IDLE_CLOSED: &str =
    "Se ha cerrado la sesión por inactividad. Para empezar de nuevo, envía un mensaje.";

const MISSING: &str = "No indicado";

/// One-sentence listing used by the "Ver especialidades" option
pub fn catalog_sentence(index: &SpecialtyIndex) -> String {
    format!(
        "Las especialidades disponibles son: {}",
        index.names().join(", ")
    )
}

/// Numbered list and the question that follows it
pub fn choose_specialty(index: &SpecialtyIndex) -> String {
    format!(
        "Estas son las especialidades disponibles:\n\n{}\n\nResponde con el número de la especialidad que necesitas.",
        index.render()
    )
}

pub fn specialty_chosen(name: &str) -> String {
    format!("¡Perfecto! Agendaremos tu cita en *{name}*.")
}

/// Question asked for each captured field
pub fn prompt_for(field: CaptureField) -> &'static str {
    match field {
        CaptureField::FullName => "¿Cuál es tu nombre completo?",
        CaptureField::Date => {
            "¿Para qué fecha quieres la cita? Puedes escribir, por ejemplo, \"mañana\" o \"el próximo lunes\"."
        }
        CaptureField::Time => {
            "¿A qué hora te gustaría la cita? Por ejemplo, \"4 de la tarde\"."
        }
    }
}

/// The raw replies combined into the text sent for extraction
pub fn extraction_utterance(data: &AppointmentData) -> String {
    format!(
        "Mi nombre es {}. Quiero la cita para {} a las {}.",
        data.full_name.as_deref().unwrap_or(MISSING),
        data.date.as_deref().unwrap_or(MISSING),
        data.time.as_deref().unwrap_or(MISSING),
    )
}

/// Recap of the five appointment fields
pub fn summary(data: &AppointmentData) -> String {
    let field = |value: &Option<String>| value.as_deref().unwrap_or(MISSING).to_string();
    format!(
        "*Resumen de la Cita:*\n*Nombre:* {}\n*Fecha:* {}\n*Hora:* {}\n*Especialidad:* {}\n*Teléfono:* {}",
        field(&data.full_name),
        field(&data.date),
        field(&data.time),
        field(&data.specialty),
        field(&data.phone),
    )
}
