use jsonwebtoken::{encode, decode, Header, Validation, EncodingKey, DecodingKey, Algorithm};
use serde::{Deserialize, Serialize};
use chrono::{Utc, Duration};

use crate::models::enums::Role;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,        // user_id
    pub role: Role,      // indicatif, le rôle est relu en base à chaque appel
    pub ver: i32,        // users.session_version au moment du login
    pub exp: i64,        // expiration timestamp
}

/// Génère un JWT de session pour un utilisateur
pub fn generate_token(
    secret: &str,
    ttl_hours: i64,
    user_id: i32,
    role: Role,
    session_version: i32,
) -> Result<String, String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(ttl_hours))
        .ok_or("Failed to calculate expiration")?
        .timestamp();

    let claims = Claims {
        sub: user_id,
        role,
        ver: session_version,
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
        .map_err(|e| format!("Failed to generate token: {}", e))
}

/// Vérifie et décode un JWT de session
pub fn verify_token(secret: &str, token: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::new(Algorithm::HS256),
    )
        .map(|data| data.claims)
        .map_err(|e| format!("Invalid token: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_and_verify_token() {
        let token = generate_token("secret", 24, 123, Role::Medecin, 2).unwrap();
        let claims = verify_token("secret", &token).unwrap();

        assert_eq!(claims.sub, 123);
        assert_eq!(claims.role, Role::Medecin);
        assert_eq!(claims.ver, 2);
    }

    #[test]
    fn test_invalid_token() {
        let result = verify_token("secret", "invalid.token.here");
        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_secret() {
        let token = generate_token("secret", 24, 1, Role::Patient, 0).unwrap();
        assert!(verify_token("autre-secret", &token).is_err());
    }

    #[test]
    fn test_expired_token() {
        // au-delà de la marge par défaut (60s) de jsonwebtoken
        let token = generate_token("secret", -1, 1, Role::Patient, 0).unwrap();
        assert!(verify_token("secret", &token).is_err());
    }
}
