use thiserror::Error;

use crate::parse::ParseError;

/// Failures a conversation can run into.
///
/// None of these ever reach the transport as an error: each one is turned
/// into an apology in the conversation's language at the step where it
/// happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("Specialty catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("Inference endpoint unavailable: {0}")]
    InferenceUnavailable(String),

    #[error("No JSON object found in model response")]
    NoJsonFound,

    #[error("Malformed JSON in model response: {0}")]
    MalformedJson(String),

    #[error("Model response carried no appointment fields")]
    EmptyExtraction,

    #[error("Booking failed: {0}")]
    BookingFailed(String),

    #[error("Invalid specialty selection: {0}")]
    InvalidSelection(String),

    #[error("Incomplete conversation state: missing {0}")]
    IncompleteState(&'static str),
}

impl FlowError {
    /// Message shown to the user in place of the error
    pub fn apology(&self) -> &'static str {
        match self {
            FlowError::CatalogUnavailable(_) => {
                "No se pudieron cargar las especialidades en este momento."
            }
            FlowError::InferenceUnavailable(_) => {
                "Lo siento, no puedo procesar tu solicitud en este momento. Inténtalo más tarde."
            }
            FlowError::NoJsonFound => {
                "Lo siento, no logré interpretar los datos de tu cita. Escribe \"Hola\" para intentarlo de nuevo."
            }
            FlowError::MalformedJson(_) => {
                "Lo siento, hubo un error al procesar los datos de tu cita. Escribe \"Hola\" para intentarlo de nuevo."
            }
            FlowError::EmptyExtraction => {
                "Lo siento, no pude identificar ningún dato de tu cita. Escribe \"Hola\" para intentarlo de nuevo."
            }
            FlowError::BookingFailed(_) => {
                "Lo siento, no pudimos agendar tu cita en este momento. Inténtalo más tarde."
            }
            FlowError::InvalidSelection(_) => {
                "Opción no válida. Por favor elige un número de la lista."
            }
            FlowError::IncompleteState(_) => {
                "Lo siento, se perdió parte de la información de tu cita. Escribe \"Hola\" para empezar de nuevo."
            }
        }
    }

    /// Short label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            FlowError::CatalogUnavailable(_) => "catalog_unavailable",
            FlowError::InferenceUnavailable(_) => "inference_unavailable",
            FlowError::NoJsonFound => "no_json_found",
            FlowError::MalformedJson(_) => "malformed_json",
            FlowError::EmptyExtraction => "empty_extraction",
            FlowError::BookingFailed(_) => "booking_failed",
            FlowError::InvalidSelection(_) => "invalid_selection",
            FlowError::IncompleteState(_) => "incomplete_state",
        }
    }
}

impl From<ParseError> for FlowError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::NoJsonFound => FlowError::NoJsonFound,
            ParseError::MalformedJson(msg) => FlowError::MalformedJson(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_failure_has_its_own_apology() {
        let errors = [
            FlowError::CatalogUnavailable("down".into()),
            FlowError::InferenceUnavailable("down".into()),
            FlowError::NoJsonFound,
            FlowError::MalformedJson("eof".into()),
            FlowError::EmptyExtraction,
            FlowError::BookingFailed("500".into()),
            FlowError::InvalidSelection("9".into()),
            FlowError::IncompleteState("fullName"),
        ];

        let apologies: HashSet<_> = errors.iter().map(FlowError::apology).collect();
        assert_eq!(apologies.len(), errors.len());
    }

    #[test]
    fn parse_errors_map_onto_flow_errors() {
        assert_eq!(FlowError::from(ParseError::NoJsonFound), FlowError::NoJsonFound);
        assert_eq!(
            FlowError::from(ParseError::MalformedJson("x".into())),
            FlowError::MalformedJson("x".into())
        );
    }
}
