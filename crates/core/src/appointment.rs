//! Appointment record captured during a conversation

use serde::{Deserialize, Serialize};

/// Appointment fields collected from the user.
///
/// Every field stays `None` until the user or the extraction step provides
/// it. Updates go through [`AppointmentData::merge`], which never erases a
/// value that is already known. Values round-trip through serde exactly as
/// captured; model output is decoded by [`crate::parse::extract_appointment`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentData {
    pub full_name: Option<String>,

    pub date: Option<String>,

    pub time: Option<String>,

    pub specialty: Option<String>,

    pub phone: Option<String>,
}

/// Fields captured verbatim, one prompt at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureField {
    FullName,
    Date,
    Time,
}

impl CaptureField {
    /// The first field asked after a specialty is chosen
    pub const FIRST: CaptureField = CaptureField::FullName;

    /// Field asked after this one, `None` once the sequence is done
    pub fn next(self) -> Option<CaptureField> {
        match self {
            CaptureField::FullName => Some(CaptureField::Date),
            CaptureField::Date => Some(CaptureField::Time),
            CaptureField::Time => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CaptureField::FullName => "fullName",
            CaptureField::Date => "date",
            CaptureField::Time => "time",
        }
    }
}

impl AppointmentData {
    /// A patch carrying a single raw reply for `field`
    pub fn captured(field: CaptureField, raw: impl Into<String>) -> Self {
        let value = Some(raw.into());
        match field {
            CaptureField::FullName => Self {
                full_name: value,
                ..Self::default()
            },
            CaptureField::Date => Self {
                date: value,
                ..Self::default()
            },
            CaptureField::Time => Self {
                time: value,
                ..Self::default()
            },
        }
    }

    /// A patch carrying only the chosen specialty
    pub fn with_specialty(name: impl Into<String>) -> Self {
        Self {
            specialty: Some(name.into()),
            ..Self::default()
        }
    }

    /// Field-wise merge: a value present in `patch` replaces the stored one,
    /// an absent value leaves the stored one untouched.
    pub fn merge(&mut self, patch: AppointmentData) {
        fn keep(slot: &mut Option<String>, value: Option<String>) {
            if value.is_some() {
                *slot = value;
            }
        }

        keep(&mut self.full_name, patch.full_name);
        keep(&mut self.date, patch.date);
        keep(&mut self.time, patch.time);
        keep(&mut self.specialty, patch.specialty);
        keep(&mut self.phone, patch.phone);
    }

    /// Non-mutating variant of [`merge`](Self::merge)
    pub fn merged(&self, patch: &AppointmentData) -> AppointmentData {
        let mut out = self.clone();
        out.merge(patch.clone());
        out
    }

    /// True when no field carries a value
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.date.is_none()
            && self.time.is_none()
            && self.specialty.is_none()
            && self.phone.is_none()
    }

    /// True when a non-blank name has been captured
    pub fn has_name(&self) -> bool {
        self.full_name
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty())
    }
}
