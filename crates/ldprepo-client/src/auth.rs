//! Authentication strategies for the repository HTTP client.
//!
//! Grounded on `plastron.client.auth.get_authenticator`: a strict priority
//! list over a handful of environment-style configuration keys, picking the
//! first usable one.

use crate::error::{AuthError, ClientResult};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Configuration for building an [`Authenticator`], mirroring the
/// `REPOSITORY` section keys recognised by `client/auth.py`.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    pub auth_token: Option<String>,
    pub jwt_secret: Option<String>,
    pub jwt_subject: Option<String>,
    pub client_cert: Option<String>,
    pub client_key: Option<String>,
    pub fedora_user: Option<String>,
    pub fedora_password: Option<String>,
}

/// A way of authenticating requests to the repository.
#[derive(Debug, Clone)]
pub enum Authenticator {
    /// A pre-minted bearer token, sent as-is.
    Bearer(String),
    /// A JWT minted (and refreshed) locally from a shared secret.
    Jwt(JwtAuth),
    /// Mutual TLS via a client certificate/key pair.
    ClientCert { cert_path: String, key_path: String },
    /// HTTP Basic authentication.
    Basic { user: String, password: String },
}

impl Authenticator {
    /// Picks an authentication strategy using the priority order of the
    /// original client: `AUTH_TOKEN` > `JWT_SECRET` > `CLIENT_CERT`+
    /// `CLIENT_KEY` > `FEDORA_USER`+`FEDORA_PASSWORD` > none.
    pub fn from_config(config: &AuthConfig) -> ClientResult<Option<Self>> {
        if let Some(token) = &config.auth_token {
            return Ok(Some(Authenticator::Bearer(token.clone())));
        }
        if let Some(secret) = &config.jwt_secret {
            let subject = config.jwt_subject.clone().unwrap_or_else(|| "plastron".to_string());
            return Ok(Some(Authenticator::Jwt(JwtAuth::new(secret.clone(), subject))));
        }
        if let (Some(cert), Some(key)) = (&config.client_cert, &config.client_key) {
            return Ok(Some(Authenticator::ClientCert {
                cert_path: cert.clone(),
                key_path: key.clone(),
            }));
        }
        if let (Some(user), Some(password)) = (&config.fedora_user, &config.fedora_password) {
            return Ok(Some(Authenticator::Basic { user: user.clone(), password: password.clone() }));
        }
        Ok(None)
    }

    /// The value of an `Authorization` header for this authenticator, if
    /// one applies directly (client certs are applied at the TLS layer
    /// instead, by the caller configuring the `reqwest::Client`).
    pub fn authorization_header(&mut self) -> ClientResult<Option<String>> {
        match self {
            Authenticator::Bearer(token) => Ok(Some(format!("Bearer {token}"))),
            Authenticator::Jwt(jwt) => Ok(Some(format!("Bearer {}", jwt.token()?))),
            Authenticator::ClientCert { .. } => Ok(None),
            Authenticator::Basic { user, password } => {
                use base64::engine::general_purpose::STANDARD;
                use base64::Engine;
                let encoded = STANDARD.encode(format!("{user}:{password}"));
                Ok(Some(format!("Basic {encoded}")))
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iss: String,
    role: String,
    exp: u64,
}

/// Mints and refreshes short-lived JWTs signed with a shared secret,
/// claiming the `fedoraAdmin` role expected by the repository's servlet
/// filter. Grounded on `client/auth.py`'s `jwt.encode` call, enriched with
/// the `jsonwebtoken` crate (this corpus's JWT-minting reference is
/// `estuary-flow`'s `tokens`/`flow-client-next` crates).
#[derive(Debug, Clone)]
pub struct JwtAuth {
    secret: String,
    subject: String,
    issuer: String,
    ttl_secs: u64,
    cached: Option<(String, u64)>,
}

impl JwtAuth {
    pub fn new(secret: String, subject: String) -> Self {
        JwtAuth { secret, subject, issuer: "plastron".to_string(), ttl_secs: 3600, cached: None }
    }

    /// Returns a cached token if it has more than 60 seconds left,
    /// otherwise mints and caches a fresh one.
    pub fn token(&mut self) -> ClientResult<String> {
        let now = now_unix();
        if let Some((token, exp)) = &self.cached {
            if *exp > now + 60 {
                return Ok(token.clone());
            }
        }
        let exp = now + self.ttl_secs;
        let claims = Claims {
            sub: self.subject.clone(),
            iss: self.issuer.clone(),
            role: "fedoraAdmin".to_string(),
            exp,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(AuthError::Jwt)?;
        self.cached = Some((token.clone(), exp));
        Ok(token)
    }
}

fn now_unix() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).expect("system clock before epoch").as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_auth_token_wins() {
        let config = AuthConfig {
            auth_token: Some("tok".into()),
            jwt_secret: Some("secret".into()),
            ..Default::default()
        };
        let auth = Authenticator::from_config(&config).unwrap().unwrap();
        assert!(matches!(auth, Authenticator::Bearer(t) if t == "tok"));
    }

    #[test]
    fn test_priority_jwt_before_cert() {
        let config = AuthConfig {
            jwt_secret: Some("secret".into()),
            client_cert: Some("cert.pem".into()),
            client_key: Some("key.pem".into()),
            ..Default::default()
        };
        let auth = Authenticator::from_config(&config).unwrap().unwrap();
        assert!(matches!(auth, Authenticator::Jwt(_)));
    }

    #[test]
    fn test_priority_basic_last() {
        let config = AuthConfig {
            fedora_user: Some("fedoraAdmin".into()),
            fedora_password: Some("secret".into()),
            ..Default::default()
        };
        let auth = Authenticator::from_config(&config).unwrap().unwrap();
        assert!(matches!(auth, Authenticator::Basic { .. }));
    }

    #[test]
    fn test_no_credentials_gives_none() {
        let config = AuthConfig::default();
        assert!(Authenticator::from_config(&config).unwrap().is_none());
    }

    #[test]
    fn test_jwt_mints_and_caches() {
        let mut jwt = JwtAuth::new("secret".into(), "plastron".into());
        let t1 = jwt.token().unwrap();
        let t2 = jwt.token().unwrap();
        assert_eq!(t1, t2);
    }

    #[test]
    fn test_basic_auth_header() {
        let mut auth = Authenticator::Basic { user: "fedoraAdmin".into(), password: "secret".into() };
        let header = auth.authorization_header().unwrap().unwrap();
        assert!(header.starts_with("Basic "));
    }
}
