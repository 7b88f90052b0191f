//! Keyword activation for flow steps

use serde::{Deserialize, Serialize};

/// A set of words that activates a step when a message matches one of them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keywords {
    words: Vec<String>,
    case_sensitive: bool,
}

/// Menu option that starts a booking
pub const BOOK: &[&str] = &["2", "agendar", "cita", "agendar cita", "agendar una cita"];

/// Menu option that lists the specialties
pub const BROWSE: &[&str] = &["1", "especialidades", "ver especialidades"];

pub const AFFIRMATIVE: &[&str] = &["si", "sí", "s", "yes", "correcto", "confirmar", "confirmo"];

pub const NEGATIVE: &[&str] = &["no", "n"];

impl Keywords {
    pub fn new<I, S>(words: I, case_sensitive: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words = words
            .into_iter()
            .map(Into::into)
            .map(|w| normalize(&w, case_sensitive))
            .filter(|w| !w.is_empty())
            .collect();
        Self {
            words,
            case_sensitive,
        }
    }

    /// Case-insensitive set built from a static word list
    pub fn insensitive(words: &[&str]) -> Self {
        Self::new(words.iter().copied(), false)
    }

    /// True when the whole message is one of the keywords.
    ///
    /// Surrounding punctuation and emoji are ignored, so "¡Hola!" matches
    /// "Hola".
    pub fn matches(&self, text: &str) -> bool {
        let text = normalize(text, self.case_sensitive);
        self.words.iter().any(|w| *w == text)
    }

    /// True when the message starts with one of the keywords as a word,
    /// e.g. "sí, es correcto" against "sí".
    pub fn leads(&self, text: &str) -> bool {
        if self.matches(text) {
            return true;
        }
        let first = text
            .split(|c: char| c.is_whitespace() || c == ',' || c == '.')
            .find(|w| !w.is_empty())
            .unwrap_or_default();
        self.matches(first)
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }
}

fn normalize(text: &str, case_sensitive: bool) -> String {
    let trimmed = text.trim_matches(|c: char| !c.is_alphanumeric());
    if case_sensitive {
        trimmed.to_string()
    } else {
        trimmed.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_sensitive_greeting() {
        let greeting = Keywords::new(["Hola"], true);
        assert!(greeting.matches("Hola"));
        assert!(greeting.matches("  ¡Hola! 👋"));
        assert!(!greeting.matches("hola"));
        assert!(!greeting.matches("Hola, quiero una cita"));
    }

    #[test]
    fn case_insensitive_greeting() {
        let greeting = Keywords::new(["Hola", "Buenas"], false);
        assert!(greeting.matches("HOLA"));
        assert!(greeting.matches("buenas"));
    }

    #[test]
    fn menu_options() {
        let book = Keywords::insensitive(BOOK);
        assert!(book.matches("2"));
        assert!(book.matches("Agendar"));
        assert!(book.matches("cita."));
        assert!(!book.matches("1"));
        assert!(!book.matches("22"));
    }

    #[test]
    fn yes_no_match_leading_word() {
        let yes = Keywords::insensitive(AFFIRMATIVE);
        let no = Keywords::insensitive(NEGATIVE);
        assert!(yes.leads("Sí, es correcto"));
        assert!(yes.leads("SI"));
        assert!(no.leads("No, cambia la hora"));
        assert!(!yes.leads("No"));
        assert!(!no.leads("nombre"));
    }
}
