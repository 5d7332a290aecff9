use std::borrow::Cow;

use validator::{ValidationError, ValidationErrors};

/// Erreur de validation sur un seul champ, pour les contrôles faits hors
/// des dérivations `Validate` (formats métier)
pub fn field_error(field: &'static str, code: &'static str, message: &'static str) -> ValidationErrors {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));

    let mut errors = ValidationErrors::new();
    errors.add(field, error);
    errors
}
