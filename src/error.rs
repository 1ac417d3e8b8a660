//! Error types for the raster filter.
//!
//! The row codec itself cannot fail; everything here belongs to the glue
//! around it. Any error aborts the whole job: a half-emitted page would
//! leave the printer mid-command.

use thiserror::Error;

/// Main error type for filter operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Reading the page data or writing the job stream failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Invalid job parameter or parameter combination.
    ///
    /// Parameters are validated once, before any page is read, so this
    /// never surfaces after output has started.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// The input ended in the middle of a page.
    ///
    /// Pages are processed whole; a truncated final page is discarded by
    /// failing the job rather than printing a partial sheet.
    #[error("input ended mid-page: got {got} of {expected} bytes")]
    ShortPage { got: usize, expected: usize },
}
