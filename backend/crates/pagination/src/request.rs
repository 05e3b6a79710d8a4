//! Validated page requests.

use std::ops::Range;

use thiserror::Error;

use crate::cursor::{Cursor, CursorError};

const DEFAULT_PAGE_SIZE: u32 = 20;
const MAX_PAGE_SIZE: u32 = 100;

/// Errors raised when configuring [`PageLimits`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageLimitsError {
    /// The maximum page size was zero.
    #[error("maximum page size must be positive")]
    ZeroMaximum,
    /// The default page size was zero or above the maximum.
    #[error("default page size must be between 1 and {max}, got {default}")]
    DefaultOutOfRange {
        /// Rejected default page size.
        default: u32,
        /// Configured maximum page size.
        max: u32,
    },
}

/// Bounds applied to incoming page sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    default_page_size: u32,
    max_page_size: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

impl PageLimits {
    /// Validate and construct page limits.
    ///
    /// # Errors
    ///
    /// Returns [`PageLimitsError`] when the maximum is zero or the default
    /// falls outside `1..=max`.
    pub const fn new(default_page_size: u32, max_page_size: u32) -> Result<Self, PageLimitsError> {
        if max_page_size == 0 {
            return Err(PageLimitsError::ZeroMaximum);
        }
        if default_page_size == 0 || default_page_size > max_page_size {
            return Err(PageLimitsError::DefaultOutOfRange {
                default: default_page_size,
                max: max_page_size,
            });
        }
        Ok(Self {
            default_page_size,
            max_page_size,
        })
    }

    /// Page size used when the client omits one.
    #[must_use]
    pub const fn default_page_size(&self) -> u32 {
        self.default_page_size
    }

    /// Largest page size a client may request.
    #[must_use]
    pub const fn max_page_size(&self) -> u32 {
        self.max_page_size
    }
}

/// Raw, unvalidated pagination parameters as received from a client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageParams<'a> {
    /// 1-based page number.
    pub page: Option<&'a str>,
    /// Requested number of items per page.
    pub page_size: Option<&'a str>,
    /// Opaque cursor returned by a previous page.
    pub cursor: Option<&'a str>,
}

/// Errors raised while validating pagination parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageRequestError {
    /// The page number was not a positive integer.
    #[error("page must be a positive integer")]
    InvalidPage {
        /// Raw value supplied by the client.
        value: String,
    },
    /// The page size was not an integer within the configured bounds.
    #[error("page_size must be between 1 and {max}")]
    InvalidPageSize {
        /// Raw value supplied by the client.
        value: String,
        /// Configured maximum page size.
        max: u32,
    },
    /// The cursor could not be decoded.
    #[error("cursor is invalid: {source}")]
    InvalidCursor {
        /// Underlying decoding failure.
        source: CursorError,
    },
    /// Both `page` and `cursor` were supplied.
    #[error("page and cursor are mutually exclusive")]
    ConflictingSelectors,
}

impl PageRequestError {
    /// Name of the offending request parameter.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::InvalidPage { .. } | Self::ConflictingSelectors => "page",
            Self::InvalidPageSize { .. } => "page_size",
            Self::InvalidCursor { .. } => "cursor",
        }
    }

    /// Stable machine-readable code for the failure.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidPage { .. } => "invalid_page",
            Self::InvalidPageSize { .. } => "invalid_page_size",
            Self::InvalidCursor { .. } => "invalid_cursor",
            Self::ConflictingSelectors => "conflicting_page_selectors",
        }
    }

    /// Raw value supplied by the client, when one is relevant.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::InvalidPage { value } | Self::InvalidPageSize { value, .. } => {
                Some(value.as_str())
            }
            Self::InvalidCursor { .. } | Self::ConflictingSelectors => None,
        }
    }
}

/// A validated request for one page of an ordered collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Construct a request from already-typed values.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError`] when `page` is zero or `page_size` lies
    /// outside `1..=limits.max_page_size()`.
    pub fn new(page: u32, page_size: u32, limits: &PageLimits) -> Result<Self, PageRequestError> {
        if page == 0 {
            return Err(PageRequestError::InvalidPage {
                value: page.to_string(),
            });
        }
        if page_size == 0 || page_size > limits.max_page_size() {
            return Err(PageRequestError::InvalidPageSize {
                value: page_size.to_string(),
                max: limits.max_page_size(),
            });
        }
        Ok(Self { page, page_size })
    }

    /// Parse raw client parameters.
    ///
    /// A cursor supplies both the page and the page size; an explicit
    /// `page_size` alongside a cursor overrides the size the cursor was
    /// issued with, and the page is clamped back to the first page.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError`] for non-numeric or out-of-range values,
    /// undecodable cursors, or when both `page` and `cursor` are present.
    pub fn parse(params: PageParams<'_>, limits: &PageLimits) -> Result<Self, PageRequestError> {
        let explicit_size = params
            .page_size
            .map(|raw| parse_page_size(raw, limits))
            .transpose()?;

        match (params.page, params.cursor) {
            (Some(_), Some(_)) => Err(PageRequestError::ConflictingSelectors),
            (None, Some(token)) => {
                let cursor = Cursor::decode(token)
                    .map_err(|source| PageRequestError::InvalidCursor { source })?;
                match explicit_size {
                    Some(size) if size != cursor.page_size() => Self::new(1, size, limits),
                    _ => Self::new(cursor.page(), cursor.page_size(), limits),
                }
            }
            (raw_page, None) => {
                let page = raw_page.map(parse_page).transpose()?.unwrap_or(1);
                let page_size = explicit_size.unwrap_or(limits.default_page_size());
                Self::new(page, page_size, limits)
            }
        }
    }

    /// 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Maximum number of items on the page.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of items preceding this page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    /// Index range of this page within a collection of `len` items.
    ///
    /// The range is clamped to the collection so pages past the end are empty.
    #[must_use]
    pub fn window(&self, len: usize) -> Range<usize> {
        let start = usize::try_from(self.offset()).unwrap_or(usize::MAX).min(len);
        let size = usize::try_from(self.page_size).unwrap_or(usize::MAX);
        let end = start.saturating_add(size).min(len);
        start..end
    }

    /// Borrow the items of this page from an in-memory collection.
    #[must_use]
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        items.get(self.window(items.len())).unwrap_or_default()
    }
}

fn parse_page(raw: &str) -> Result<u32, PageRequestError> {
    match raw.parse::<u32>() {
        Ok(page) if page > 0 => Ok(page),
        _ => Err(PageRequestError::InvalidPage {
            value: raw.to_owned(),
        }),
    }
}

fn parse_page_size(raw: &str, limits: &PageLimits) -> Result<u32, PageRequestError> {
    match raw.parse::<u32>() {
        Ok(size) if (1..=limits.max_page_size()).contains(&size) => Ok(size),
        _ => Err(PageRequestError::InvalidPageSize {
            value: raw.to_owned(),
            max: limits.max_page_size(),
        }),
    }
}
