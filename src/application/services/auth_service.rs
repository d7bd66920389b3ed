//! Bearer token issuing and verification.

use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use uuid::Uuid;

use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// The authenticated party behind a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub owner_id: Uuid,
}

/// Service for issuing and checking owner tokens.
///
/// A token is `<owner-uuid>.<hex MAC>`, where the MAC is HMAC-SHA256 of the
/// hyphenated owner id keyed by `signing_secret`. Tokens are not stored;
/// rotating the secret revokes every token at once.
pub struct AuthService {
    signing_secret: String,
}

impl AuthService {
    /// Creates a new authentication service.
    ///
    /// `signing_secret` must match the value used when tokens were issued.
    pub fn new(signing_secret: String) -> Self {
        Self { signing_secret }
    }

    fn mac_for(&self, owner_id: Uuid) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(self.signing_secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(owner_id.hyphenated().to_string().as_bytes());
        mac
    }

    /// Issues a bearer token for `owner_id`.
    pub fn issue_token(&self, owner_id: Uuid) -> String {
        let signature = hex::encode(self.mac_for(owner_id).finalize().into_bytes());
        format!("{}.{signature}", owner_id.hyphenated())
    }

    /// Verifies a raw bearer token and returns its owner.
    ///
    /// The signature comparison is constant time.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token is malformed or its
    /// signature does not match.
    pub fn authenticate(&self, token: &str) -> Result<Caller, AppError> {
        let invalid = || {
            AppError::unauthorized("Unauthorized", json!({ "reason": "Invalid token" }))
        };

        let (owner, signature) = token.trim().split_once('.').ok_or_else(invalid)?;
        let owner_id = Uuid::parse_str(owner).map_err(|_| invalid())?;
        let signature = hex::decode(signature).map_err(|_| invalid())?;

        self.mac_for(owner_id)
            .verify_slice(&signature)
            .map_err(|_| invalid())?;

        Ok(Caller { owner_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> AuthService {
        AuthService::new("test-signing-secret".to_string())
    }

    #[test]
    fn test_issued_token_authenticates() {
        let service = test_service();
        let owner = Uuid::new_v4();

        let token = service.issue_token(owner);
        let caller = service.authenticate(&token).unwrap();

        assert_eq!(caller.owner_id, owner);
        assert!(token.starts_with(&owner.to_string()));
        assert_eq!(token.len(), 36 + 1 + 64);
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let service = test_service();
        let mut token = service.issue_token(Uuid::new_v4());
        let last = token.pop().unwrap();
        token.push(if last == '0' { '1' } else { '0' });

        assert!(matches!(
            service.authenticate(&token),
            Err(AppError::Unauthorized { .. })
        ));
    }

    #[test]
    fn test_token_for_other_owner_rejected() {
        let service = test_service();
        let token = service.issue_token(Uuid::new_v4());
        let (_, signature) = token.split_once('.').unwrap();
        let forged = format!("{}.{signature}", Uuid::new_v4());

        assert!(service.authenticate(&forged).is_err());
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        let service = test_service();
        let bad_hex = format!("{}.zz", Uuid::new_v4());
        for token in ["", "abc", "not-a-uuid.deadbeef", bad_hex.as_str()] {
            assert!(
                matches!(service.authenticate(token), Err(AppError::Unauthorized { .. })),
                "{token}"
            );
        }
    }

    #[test]
    fn test_secret_matters() {
        let owner = Uuid::new_v4();
        let a = AuthService::new("secret-a".to_string());
        let b = AuthService::new("secret-b".to_string());

        assert_ne!(a.issue_token(owner), b.issue_token(owner));
        assert!(b.authenticate(&a.issue_token(owner)).is_err());
    }
}
