use hmac::Hmac;
use pbkdf2::pbkdf2;
use sha2::Sha256;
use rand::Rng;
use base64::{Engine, engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD}};

type HmacSha256 = Hmac<Sha256>;

pub const DEFAULT_ITERATIONS: u32 = 260000;
const KEY_LENGTH: usize = 32;
const SALT_LENGTH: usize = 16;

/// Hash un mot de passe au format pbkdf2:sha256:iterations$salt$hash
/// Le nombre d'itérations vient de la configuration (PASSWORD_ITERATIONS)
pub fn hash_password(password: &str, iterations: u32) -> Result<String, String> {
    // Générer un salt aléatoire de 16 bytes
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill(&mut salt);

    let mut key = [0u8; KEY_LENGTH];
    pbkdf2::<HmacSha256>(password.as_bytes(), &salt, iterations, &mut key)
        .map_err(|e| format!("PBKDF2 hash generation failed: {}", e))?;

    // base64 URL-safe sans padding
    let salt_b64 = URL_SAFE_NO_PAD.encode(salt);
    let hash_b64 = URL_SAFE_NO_PAD.encode(key);

    Ok(format!("pbkdf2:sha256:{}${}${}", iterations, salt_b64, hash_b64))
}

/// Vérifie un mot de passe contre un hash stocké.
/// Les itérations sont lues dans le hash, un changement de PASSWORD_ITERATIONS
/// ne casse donc pas les comptes existants.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, String> {
    // Parser le format: pbkdf2:sha256:iterations$salt$hash
    let parts: Vec<&str> = stored_hash.split('$').collect();
    if parts.len() != 3 {
        return Err("Invalid hash format".to_string());
    }

    let header_parts: Vec<&str> = parts[0].split(':').collect();
    if header_parts.len() != 3 || header_parts[0] != "pbkdf2" || header_parts[1] != "sha256" {
        return Err("Invalid header".to_string());
    }

    let iterations = header_parts[2]
        .parse::<u32>()
        .map_err(|_| "Invalid iterations".to_string())?;

    let salt = decode_flexible(parts[1])?;
    let expected_hash = decode_flexible(parts[2])?;

    let mut computed = vec![0u8; expected_hash.len()];
    pbkdf2::<HmacSha256>(password.as_bytes(), &salt, iterations, &mut computed)
        .map_err(|e| format!("PBKDF2 hash verification failed: {}", e))?;

    Ok(constant_time_eq(&computed, &expected_hash))
}

/// Comparaison sans sortie anticipée
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Décode du base64 (URL-safe ou standard) ou de l'hexadécimal
fn decode_flexible(input: &str) -> Result<Vec<u8>, String> {
    if input.len() == 64 && input.chars().all(|c| c.is_ascii_hexdigit()) {
        return hex::decode(input)
            .map_err(|e| format!("Hex decode failed: {}", e));
    }

    if let Ok(decoded) = URL_SAFE_NO_PAD.decode(input) {
        return Ok(decoded);
    }

    let padding_needed = (4 - (input.len() % 4)) % 4;
    STANDARD
        .decode(format!("{}{}", input, "=".repeat(padding_needed)))
        .map_err(|_| "Failed to decode".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("motdepasse-solide", 1000).unwrap();
        assert!(hash.starts_with("pbkdf2:sha256:1000$"));
        assert!(verify_password("motdepasse-solide", &hash).unwrap());
        assert!(!verify_password("mauvais", &hash).unwrap());
    }

    #[test]
    fn test_salt_is_random() {
        let a = hash_password("identique", 1000).unwrap();
        let b = hash_password("identique", 1000).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_invalid_format() {
        assert!(verify_password("x", "not-a-hash").is_err());
        assert!(verify_password("x", "md5:sha256:10$a$b").is_err());
    }

    #[test]
    fn test_hex_encoded_hash() {
        // hash legacy encodé en hexadécimal
        let salt = b"0123456789abcdef";
        let mut key = [0u8; KEY_LENGTH];
        pbkdf2::<HmacSha256>(b"legacy", salt, 1000, &mut key).unwrap();
        let stored = format!("pbkdf2:sha256:1000${}${}", URL_SAFE_NO_PAD.encode(salt), hex::encode(key));
        assert!(verify_password("legacy", &stored).unwrap());
    }
}
