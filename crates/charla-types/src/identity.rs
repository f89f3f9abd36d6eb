//! User identity and credential types.

use serde::{Deserialize, Serialize};

/// An authenticated user as reported by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
}

/// Access/refresh bearer token pair.
///
/// Both tokens are opaque strings from the client's point of view, except
/// that the access token carries a decodable `exp` claim (see
/// `charla_core::auth::claims`). The pair is always held whole: either both
/// tokens are present or neither is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// The durable auth blob persisted across process restarts: the token pair
/// plus the user record it belongs to. Replaced wholesale on login/register,
/// removed on logout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAuth {
    pub tokens: TokenPair,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_auth_roundtrip() {
        let auth = StoredAuth {
            tokens: TokenPair {
                access: "aaa.bbb.ccc".to_string(),
                refresh: "ddd.eee.fff".to_string(),
            },
            user: User {
                id: 7,
                username: "ana".to_string(),
                email: "ana@example.com".to_string(),
            },
        };

        let json = serde_json::to_string(&auth).unwrap();
        let parsed: StoredAuth = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, auth);
    }

    #[test]
    fn test_user_deserializes_from_server_shape() {
        let json = r#"{"id": 1, "username": "leo", "email": "leo@example.com"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.username, "leo");
    }
}
