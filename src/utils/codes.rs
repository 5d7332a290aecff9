// Générateurs et formats des identifiants métier

use rand::distributions::Alphanumeric;
use rand::Rng;

const PATIENT_CODE_LENGTH: usize = 8;

/// Code patient secret: "PAT-" + 8 caractères alphanumériques majuscules
pub fn generate_patient_code() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(PATIENT_CODE_LENGTH)
        .map(|b| (b as char).to_ascii_uppercase())
        .collect();
    format!("PAT-{}", suffix)
}

/// Les codes sont saisis à la main par le médecin
pub fn normalize_patient_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

pub fn request_reference(sequence: u64) -> String {
    format!("DEM-{:02}", sequence)
}

pub fn record_number(sequence: u64) -> String {
    format!("DOS-{:03}", sequence)
}

/// "DOS-" suivi d'au moins trois chiffres
pub fn is_valid_record_number(numero: &str) -> bool {
    match numero.strip_prefix("DOS-") {
        Some(digits) => digits.len() >= 3 && digits.chars().all(|c| c.is_ascii_digit()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patient_code_format() {
        let code = generate_patient_code();
        assert!(code.starts_with("PAT-"));
        assert_eq!(code.len(), 12);
        assert_eq!(code, normalize_patient_code(&code));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_patient_code("  pat-ab12cd34 "), "PAT-AB12CD34");
    }

    #[test]
    fn test_references() {
        assert_eq!(request_reference(1), "DEM-01");
        assert_eq!(request_reference(123), "DEM-123");
        assert_eq!(record_number(7), "DOS-007");
    }

    #[test]
    fn test_record_number_validation() {
        assert!(is_valid_record_number("DOS-001"));
        assert!(is_valid_record_number("DOS-1234"));
        assert!(!is_valid_record_number("DOS-01"));
        assert!(!is_valid_record_number("DEM-001"));
        assert!(!is_valid_record_number("DOS-0A1"));
    }
}
