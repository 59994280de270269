//! Token claims and caller identity.
//!
//! This module defines the verified-claims structure decoded from a bearer
//! token and the [`CallerIdentity`] derived from it. The identity is produced
//! exclusively by [`TokenVerifier::verify`](crate::verifier::TokenVerifier::verify),
//! lives for one request, and is never persisted.

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Claims carried by an identity-provider token.
///
/// Only the claims the verifier consumes are modeled; unknown claims are
/// ignored during deserialization. `sub` is optional here so that its absence
/// is handled explicitly in [`CallerIdentity::from_claims`] rather than as an
/// opaque deserialization failure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Issuer - the identity provider's URL.
    pub iss: String,
    /// Subject - the user identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Expiration time (seconds since epoch).
    pub exp: u64,
    /// Issued at (optional, seconds since epoch).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
    /// Organization identifier (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,
    /// Email address (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// The verified identity of a caller.
///
/// Scoped to one request's lifetime.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    /// User identifier (the token's subject).
    pub user_id: String,
    /// Account identifier: the organization claim, or the user id when the
    /// caller belongs to no organization (a lone caller is its own account
    /// scope).
    pub account_id: String,
    /// Email address, if the token carried one.
    pub email: Option<String>,
}

impl CallerIdentity {
    /// Maps verified claims to a caller identity.
    ///
    /// `user_id` comes from the subject claim; `account_id` from the
    /// organization claim, falling back to the subject when the organization
    /// claim is absent or empty.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::AuthenticationFailed`] if the subject claim is
    /// missing or empty.
    pub fn from_claims(claims: &TokenClaims) -> Result<Self, AuthError> {
        let user_id = claims
            .sub
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AuthError::authentication_failed("token claims missing subject"))?;

        let account_id = claims.org_id.as_deref().filter(|s| !s.is_empty()).unwrap_or(user_id);

        Ok(Self {
            user_id: user_id.to_owned(),
            account_id: account_id.to_owned(),
            email: claims.email.clone(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    fn claims(sub: Option<&str>, org_id: Option<&str>, email: Option<&str>) -> TokenClaims {
        TokenClaims {
            iss: "https://idp.example.com".into(),
            sub: sub.map(Into::into),
            exp: 2_000_000_000,
            iat: Some(1_000_000_000),
            org_id: org_id.map(Into::into),
            email: email.map(Into::into),
        }
    }

    #[test]
    fn test_identity_with_organization() {
        let identity = CallerIdentity::from_claims(&claims(
            Some("user_1"),
            Some("acct_9"),
            Some("a@example.com"),
        ))
        .unwrap();

        assert_eq!(identity.user_id, "user_1");
        assert_eq!(identity.account_id, "acct_9");
        assert_eq!(identity.email.as_deref(), Some("a@example.com"));
    }

    #[test]
    fn test_identity_without_organization_falls_back_to_subject() {
        let identity = CallerIdentity::from_claims(&claims(Some("user_1"), None, None)).unwrap();

        assert_eq!(identity.account_id, "user_1");
        assert!(identity.email.is_none());
    }

    #[test]
    fn test_empty_organization_falls_back_to_subject() {
        let identity =
            CallerIdentity::from_claims(&claims(Some("user_1"), Some(""), None)).unwrap();

        assert_eq!(identity.account_id, "user_1");
    }

    #[test]
    fn test_missing_subject_rejected() {
        let result = CallerIdentity::from_claims(&claims(None, Some("acct_9"), None));
        assert!(matches!(result, Err(AuthError::AuthenticationFailed(_))));
    }

    #[test]
    fn test_empty_subject_rejected() {
        let result = CallerIdentity::from_claims(&claims(Some(""), Some("acct_9"), None));
        assert!(matches!(result, Err(AuthError::AuthenticationFailed(_))));
    }

    mod proptests {
        use proptest::prelude::*;

        use super::*;

        fn arb_token_claims() -> impl Strategy<Value = TokenClaims> {
            (
                "[a-zA-Z0-9:/._-]{1,64}",
                proptest::option::of("[a-zA-Z0-9_-]{1,64}"),
                1_000_000_000u64..2_000_000_000u64,
                proptest::option::of(1_000_000_000u64..2_000_000_000u64),
                proptest::option::of("[a-zA-Z0-9_-]{1,64}"),
                proptest::option::of("[a-z0-9.]{1,32}@[a-z]{1,16}\\.[a-z]{2,4}"),
            )
                .prop_map(|(iss, sub, exp, iat, org_id, email)| TokenClaims {
                    iss,
                    sub,
                    exp,
                    iat,
                    org_id,
                    email,
                })
        }

        proptest! {
            /// Serializing then deserializing any valid `TokenClaims` must
            /// produce an identical struct.
            #[test]
            fn token_claims_serde_round_trip(claims in arb_token_claims()) {
                let json = serde_json::to_string(&claims).expect("serialize should succeed");
                let deserialized: TokenClaims =
                    serde_json::from_str(&json).expect("deserialize should succeed");
                prop_assert_eq!(deserialized, claims);
            }

            /// The account scope is always the organization claim when
            /// present, otherwise the subject.
            #[test]
            fn account_id_is_org_or_subject(claims in arb_token_claims()) {
                match CallerIdentity::from_claims(&claims) {
                    Ok(identity) => {
                        let sub = claims.sub.as_deref().expect("identity requires subject");
                        prop_assert_eq!(&identity.user_id, sub);
                        match claims.org_id.as_deref().filter(|s| !s.is_empty()) {
                            Some(org) => prop_assert_eq!(&identity.account_id, org),
                            None => prop_assert_eq!(&identity.account_id, sub),
                        }
                    },
                    Err(_) => {
                        // Only a missing or empty subject is rejected.
                        prop_assert!(claims.sub.as_deref().map_or(true, str::is_empty));
                    },
                }
            }
        }
    }
}
