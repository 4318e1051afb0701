//! Catalog operations over users and their music.
//!
//! Every operation takes the connection explicitly; there is no global store
//! handle. Errors are reported as [`CatalogError`] and mapped to HTTP status
//! codes by the server.

pub mod error;
pub mod music;
pub mod users;

pub use error::{CatalogError, CatalogResult};

/// Outcome of a delete: the confirmation text returned to clients and the
/// row that was removed.
#[derive(Debug, Clone)]
pub struct Deleted<T> {
    pub message: &'static str,
    pub record: T,
}

pub(crate) fn require_non_blank(field: &str, value: &str) -> CatalogResult<()> {
    if value.trim().is_empty() {
        return Err(CatalogError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}
