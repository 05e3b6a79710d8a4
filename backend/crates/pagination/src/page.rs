//! Page envelope returned by list operations.

use serde::{Deserialize, Serialize};

use crate::cursor::Cursor;
use crate::request::PageRequest;

/// One page of an ordered collection together with its position.
///
/// Serialises as
/// `{"items": [...], "page": 1, "pageSize": 10, "total": 42, "totalPages": 5, "nextCursor": "..."}`;
/// `nextCursor` is omitted on the last page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    items: Vec<T>,
    page: u32,
    page_size: u32,
    total: u64,
    total_pages: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    next_cursor: Option<String>,
}

impl<T> Page<T> {
    /// Wrap `items` selected for `request` out of a collection of `total`
    /// items.
    ///
    /// Items beyond the requested page size are dropped so the envelope never
    /// exceeds the page size even if a backing store over-fetches.
    #[must_use]
    pub fn new(mut items: Vec<T>, request: &PageRequest, total: u64) -> Self {
        items.truncate(usize::try_from(request.page_size()).unwrap_or(usize::MAX));
        let total_pages = total.div_ceil(u64::from(request.page_size()));
        let next_cursor = request
            .page()
            .checked_add(1)
            .filter(|next| u64::from(*next) <= total_pages)
            .map(|next| Cursor::new(next, request.page_size()).encode());
        Self {
            items,
            page: request.page(),
            page_size: request.page_size(),
            total,
            total_pages,
            next_cursor,
        }
    }

    /// Items on this page in collection order.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consume the page, returning its items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Page size the page was produced for.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of items in the whole collection.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Number of pages in the whole collection at this page size.
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        self.total_pages
    }

    /// Cursor for the following page, absent on the last page.
    #[must_use]
    pub fn next_cursor(&self) -> Option<&str> {
        self.next_cursor.as_deref()
    }

    /// Transform every item while keeping the page position.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total: self.total,
            total_pages: self.total_pages,
            next_cursor: self.next_cursor,
        }
    }
}
