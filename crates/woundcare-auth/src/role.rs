//! User role model.

use std::fmt;

use serde_json::Value;

/// Role assigned to an authenticated user.
///
/// The identity service stores the role as free text in user metadata; it is
/// narrowed to this closed set when read so routing decisions can match
/// exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    /// Clinical staff. Routed to clinician registration.
    Clinician,
    /// Patients, and any user without a recognized role.
    #[default]
    Patient,
}

impl Role {
    /// Reads a role from a user metadata value.
    ///
    /// Only the exact string `"clinician"` selects [`Role::Clinician`]; absent,
    /// non-string, or unrecognized values read as [`Role::Patient`].
    #[must_use]
    pub fn from_metadata(value: Option<&Value>) -> Self {
        match value.and_then(Value::as_str) {
            Some("clinician") => Self::Clinician,
            _ => Self::Patient,
        }
    }

    /// Returns the metadata string for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clinician => "clinician",
            Self::Patient => "patient",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
