//! The directory-prospecting program: listing model, in-page queries, CSV
//! output, and the step program that ties them to a [`Flow`](crate::Flow).

mod listing;
mod program;
pub(crate) mod queries;

pub use listing::{Listing, ListingKind, CSV_HEADER};
pub use program::{build_program, CsvSink};
