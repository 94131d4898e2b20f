//! Repository listing error types.

use thiserror::Error;

/// Errors that can occur while listing repositories.
#[derive(Debug, Error)]
pub enum ListingError {
    /// A page could not be fetched and the listing policy forbids truncation.
    #[error("Repository listing incomplete: fetching {url} failed after {pages} page(s)")]
    Incomplete { url: String, pages: usize },
}
