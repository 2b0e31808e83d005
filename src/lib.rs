//! Compiler for typed predicate expression trees.
//! Targets the Elasticsearch query DSL and exposes the expression and
//! criteria models.
//!
//! A deferred-execution query builder hands over a lambda-shaped expression
//! tree; this crate rewrites it into the filter body of a search request.
//!
//! You probably want to start with the [translate] wrapper function.
//!
//! For more granular access, refer to this diagram:
//! ```ascii
//!        expression tree
//!
//!  (normalize + translate) │
//!   criteria_of_predicate  │
//!                          │
//!                          ▼
//!
//!           criteria
//!
//!           (assemble) │
//!  request_of_criteria │
//!                      │
//!                      ▼
//!
//!        SearchRequest ──── json_of_request ────► JSON body
//! ```

pub mod ast;
pub mod criteria;
mod error;
pub mod mapping;
mod normalize;
pub mod search;
#[cfg(test)]
mod test;
mod utils;

pub use error::{Error, ErrorKind, ErrorMessage, ErrorMessages, Reason, Result, WithErrorInfo};
pub use utils::OrMap;

use ast::Lambda;
use criteria::Criteria;
use mapping::Mapping;
use search::SearchRequest;

/// Translate a predicate over `record_type` into a search request.
///
/// This is a wrapper for:
/// - [criteria_of_predicate]: partially evaluate and rewrite the expression
///   tree, then translate it into criteria.
/// - [request_of_criteria]: wrap the criteria in the request shell together
///   with the mapping's type selection.
pub fn translate(
    predicate: Lambda,
    mapping: &dyn Mapping,
    record_type: &str,
) -> Result<SearchRequest, ErrorMessages> {
    search::compile(predicate, mapping, record_type).map_err(error::downcast)
}

/// Normalize a predicate and translate it into criteria.
pub fn criteria_of_predicate(
    predicate: Lambda,
    mapping: &dyn Mapping,
) -> Result<Criteria, ErrorMessages> {
    search::criteria(predicate, mapping).map_err(error::downcast)
}

/// Wrap already-translated criteria in the request shell.
pub fn request_of_criteria(
    criteria: Criteria,
    mapping: &dyn Mapping,
    record_type: &str,
) -> SearchRequest {
    search::assemble(criteria, mapping, record_type)
}

/// JSON serialization of the request body.
pub fn json_of_request(request: &SearchRequest) -> Result<String, ErrorMessages> {
    serde_json::to_string(request).map_err(|e| error::downcast(anyhow::anyhow!(e)))
}
