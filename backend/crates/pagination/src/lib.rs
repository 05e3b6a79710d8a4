//! Pagination primitives shared by admin gateway list endpoints.
//!
//! List operations accept either a 1-based `page` number or an opaque
//! `cursor` previously returned by the server, together with a `page_size`
//! bounded by [`PageLimits`]. Results travel back in a [`Page`] envelope that
//! carries the totals and the cursor for the following page.
//!
//! ```
//! use pagination::{Page, PageLimits, PageParams, PageRequest};
//!
//! let limits = PageLimits::default();
//! let request = PageRequest::parse(
//!     PageParams {
//!         page: Some("2"),
//!         page_size: Some("2"),
//!         cursor: None,
//!     },
//!     &limits,
//! )
//! .expect("valid page request");
//!
//! let rows = ["a", "b", "c", "d", "e"];
//! let page = Page::new(request.slice(&rows).to_vec(), &request, 5);
//! assert_eq!(page.items(), &["c", "d"]);
//! assert!(page.next_cursor().is_some());
//! ```

mod cursor;
mod page;
mod request;

pub use cursor::{Cursor, CursorError};
pub use page::Page;
pub use request::{PageLimits, PageLimitsError, PageParams, PageRequest, PageRequestError};
