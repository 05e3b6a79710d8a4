//! Opaque cursor encoding.
//!
//! Cursors are URL-safe base64 (no padding) wrapping a small JSON document.
//! Clients must treat them as opaque tokens.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while decoding a cursor token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CursorError {
    /// The token is not valid URL-safe base64.
    #[error("cursor is not valid base64")]
    Encoding,
    /// The decoded bytes are not a cursor document.
    #[error("cursor payload is malformed")]
    Payload,
    /// The cursor points at page zero or carries a zero page size.
    #[error("cursor position is out of range")]
    OutOfRange,
}

/// Position of a page within an ordered collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    #[serde(rename = "p")]
    page: u32,
    #[serde(rename = "s")]
    page_size: u32,
}

impl Cursor {
    /// Build a cursor for the given 1-based page.
    #[must_use]
    pub const fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// 1-based page number the cursor refers to.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Page size the cursor was issued for.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Encode the cursor as an opaque token.
    #[must_use]
    pub fn encode(&self) -> String {
        // Serialising two integers cannot fail; fall back to an empty document
        // rather than panicking.
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Decode an opaque token produced by [`Cursor::encode`].
    ///
    /// # Errors
    ///
    /// Returns [`CursorError`] when the token is not base64, does not decode
    /// to a cursor document, or names page zero / page size zero.
    pub fn decode(token: &str) -> Result<Self, CursorError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| CursorError::Encoding)?;
        let cursor: Self = serde_json::from_slice(&bytes).map_err(|_| CursorError::Payload)?;
        if cursor.page == 0 || cursor.page_size == 0 {
            return Err(CursorError::OutOfRange);
        }
        Ok(cursor)
    }
}
