use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Identity claims issued by the MatchPoint identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: String,
    #[serde(default)]
    pub display_name: String,
    pub exp: usize,
    pub iat: usize,
}

/// Verifies bearer tokens against the shared HS256 secret
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expires_in_seconds: usize,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expires_in_seconds: 24 * 60 * 60, // 1 day
        }
    }

    /// Sign a token for a user (service-to-service calls and tests)
    pub fn sign(&self, user_id: &str, display_name: &str) -> Result<String, JwtError> {
        let now = chrono::Utc::now().timestamp() as usize;
        let claims = Claims {
            user_id: user_id.to_string(),
            display_name: display_name.to_string(),
            exp: now + self.expires_in_seconds,
            iat: now,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::Sign(e.to_string()))
    }

    /// Verify and decode a token
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let validation = Validation::default();
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidToken => JwtError::Invalid,
                _ => JwtError::Verify(e.to_string()),
            })
    }
}

/// JWT error types
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Failed to sign token: {0}")]
    Sign(String),
    #[error("Token has expired")]
    Expired,
    #[error("Invalid token")]
    Invalid,
    #[error("Failed to verify token: {0}")]
    Verify(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_and_verify() {
        let service = JwtService::new("test-secret");
        let token = service.sign("user-1", "Alex").unwrap();

        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.user_id, "user-1");
        assert_eq!(claims.display_name, "Alex");
    }

    #[test]
    fn test_rejects_foreign_secret_and_garbage() {
        let token = JwtService::new("one").sign("user-1", "Alex").unwrap();
        assert!(JwtService::new("two").verify(&token).is_err());
        assert!(JwtService::new("one").verify("not-a-token").is_err());
    }
}
