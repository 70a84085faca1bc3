use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Principal role carried by a bearer token.
///
/// A token carries exactly one role, so a client can never hold a merged
/// admin-and-customer session: whichever token it presents is the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (customer or admin id).
    pub sub: String,
    pub email: String,
    pub role: Role,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Token id.
    pub jti: String,
}

/// Issues and validates HS256 bearer tokens.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_minutes: i64,
}

impl JwtService {
    pub fn new(secret: &str, expiry_minutes: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry_minutes,
        }
    }

    pub fn issue(&self, subject: Uuid, email: &str, role: Role) -> Result<String, anyhow::Error> {
        let now = Utc::now();
        let exp = now + Duration::minutes(self.expiry_minutes);

        let claims = Claims {
            sub: subject.to_string(),
            email: email.to_string(),
            role,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| anyhow::anyhow!("Failed to encode token: {}", e))?;

        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify() {
        let service = JwtService::new("test-secret", 60);
        let id = Uuid::new_v4();

        let token = service
            .issue(id, "jane@example.com", Role::Customer)
            .unwrap();
        assert!(!token.is_empty());

        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.sub, id.to_string());
        assert_eq!(claims.email, "jane@example.com");
        assert_eq!(claims.role, Role::Customer);
    }

    #[test]
    fn test_role_preserved() {
        let service = JwtService::new("test-secret", 60);
        let token = service
            .issue(Uuid::new_v4(), "ops@example.com", Role::Admin)
            .unwrap();

        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.role, Role::Admin);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = JwtService::new("secret-a", 60);
        let verifier = JwtService::new("secret-b", 60);

        let token = issuer
            .issue(Uuid::new_v4(), "jane@example.com", Role::Customer)
            .unwrap();
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        let service = JwtService::new("test-secret", 60);
        assert!(service.verify("not.a.token").is_err());
    }
}
