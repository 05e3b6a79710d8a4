//! Bearer-token authoriser backed by one configured secret.
//!
//! Tokens are compared as SHA-256 digests so comparison time does not depend
//! on how much of the presented token matches. The configured secret is
//! zeroised on drop.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, Zeroizing};

use crate::domain::ports::{AdminAuthorizer, AdminAuthorizerError, AdminDecision};

/// Subject reported for requests carrying the configured token.
pub const STATIC_ADMIN_SUBJECT: &str = "static-admin";

/// [`AdminAuthorizer`] granting access to exactly one token.
pub struct StaticTokenAuthorizer {
    digest: Zeroizing<[u8; 32]>,
}

impl StaticTokenAuthorizer {
    /// Build an authoriser for `token`; the plaintext is wiped once hashed.
    pub fn new(token: impl Into<String>) -> Self {
        let mut token = token.into();
        let digest = Zeroizing::new(digest(&token));
        token.zeroize();
        Self { digest }
    }
}

impl std::fmt::Debug for StaticTokenAuthorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenAuthorizer")
            .field("digest", &"<redacted>")
            .finish()
    }
}

fn digest(token: &str) -> [u8; 32] {
    Sha256::digest(token.as_bytes()).into()
}

/// Compare digests without short-circuiting.
fn digests_match(left: &[u8; 32], right: &[u8; 32]) -> bool {
    left.iter()
        .zip(right.iter())
        .fold(0_u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

#[async_trait]
impl AdminAuthorizer for StaticTokenAuthorizer {
    async fn authorize(&self, bearer_token: &str) -> Result<AdminDecision, AdminAuthorizerError> {
        let presented = Zeroizing::new(digest(bearer_token));
        if digests_match(&self.digest, &presented) {
            Ok(AdminDecision::Granted {
                subject: STATIC_ADMIN_SUBJECT.to_owned(),
            })
        } else {
            Ok(AdminDecision::Denied)
        }
    }
}
