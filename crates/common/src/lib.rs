pub mod error;
pub mod numeric_kernel;
pub mod types;

pub use error::{BuildIssue, Error, FetchError};
pub use types::{Cycle, DirectedEdge, RateTable};
