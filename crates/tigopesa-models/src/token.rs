//! Password-grant token exchange.
//!
//! The push-pay API is protected by short-lived bearer tokens minted by a
//! form-encoded password grant. The provider answers with JSON, and
//! reports failures inside a `200 OK` body through the `error` /
//! `error_description` pair.

use serde::{Deserialize, Serialize};

/// Grant type sent when none is configured.
pub const PASSWORD_GRANT: &str = "password";

/// Form body of a token request.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenRequest {
    /// API username issued by the provider.
    pub username: String,
    /// API password issued by the provider.
    pub password: String,
    /// OAuth grant type, normally [`PASSWORD_GRANT`].
    pub grant_type: String,
}

/// JSON body of a token response.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct TokenResponse {
    /// The bearer token.
    pub access_token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    /// Token type, normally `bearer`.
    pub token_type: String,
    /// Error code, set only on failure.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub error: String,
    /// Human-readable error, set only on failure.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub error_description: String,
}

impl TokenResponse {
    /// `true` when the provider reported an error, whatever the HTTP status.
    pub fn is_error(&self) -> bool {
        !self.error.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{encode, PayloadKind};

    #[test]
    fn request_form_field_names() {
        let form = encode(
            PayloadKind::Form,
            &TokenRequest {
                username: "biller".into(),
                password: "secret".into(),
                grant_type: PASSWORD_GRANT.into(),
            },
        )
        .unwrap();
        assert_eq!(
            String::from_utf8(form).unwrap(),
            "username=biller&password=secret&grant_type=password"
        );
    }

    #[test]
    fn success_response_parses() {
        let body = r#"{"access_token":"abc","expires_in":3600,"token_type":"bearer"}"#;
        let resp: TokenResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.access_token, "abc");
        assert_eq!(resp.expires_in, 3600);
        assert!(!resp.is_error());
    }

    #[test]
    fn error_response_parses() {
        let body = r#"{"error":"invalid_grant","error_description":"bad credentials"}"#;
        let resp: TokenResponse = serde_json::from_str(body).unwrap();
        assert!(resp.is_error());
        assert_eq!(resp.error_description, "bad credentials");
        assert!(resp.access_token.is_empty());
    }

    #[test]
    fn response_json_roundtrip() {
        use crate::codec::assert_roundtrip;

        assert_roundtrip(
            PayloadKind::Json,
            &TokenResponse {
                access_token: "a&b<c>".into(),
                expires_in: 3599,
                token_type: "bearer".into(),
                ..Default::default()
            },
        );
        assert_roundtrip(
            PayloadKind::Json,
            &TokenResponse {
                error: "invalid_client".into(),
                error_description: "Client <suspended> & locked".into(),
                ..Default::default()
            },
        );
    }

    #[test]
    fn error_fields_omitted_when_empty() {
        let json = serde_json::to_string(&TokenResponse {
            access_token: "t".into(),
            expires_in: 60,
            token_type: "bearer".into(),
            ..Default::default()
        })
        .unwrap();
        assert!(!json.contains("error"));
    }
}
