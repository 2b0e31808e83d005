//! Backend for translating predicate expressions into search requests.

mod gen_filter;
mod methods;
mod request;

pub use request::{SearchRequest, SortField, SortOrder};

use crate::ast::Lambda;
use crate::criteria::{And, Criteria};
use crate::error::Result;
use crate::mapping::Mapping;
use crate::normalize;

/// Translate a predicate lambda into criteria, without the request shell.
pub fn criteria(predicate: Lambda, mapping: &dyn Mapping) -> Result<Criteria> {
    let predicate = normalize::normalize(predicate)?;
    gen_filter::translate_predicate(&predicate, mapping)
}

/// Translate a predicate lambda over `record_type` into a search request.
pub fn compile(
    predicate: Lambda,
    mapping: &dyn Mapping,
    record_type: &str,
) -> Result<SearchRequest> {
    let filter = criteria(predicate, mapping)?;
    Ok(assemble(filter, mapping, record_type))
}

/// Wrap criteria in the request shell, AND-ing in the mapping's type
/// selection. A filter that matches everything is elided; the type selection
/// (when the mapping supplies one) then stands alone.
pub fn assemble(filter: Criteria, mapping: &dyn Mapping, record_type: &str) -> SearchRequest {
    let doc_type = mapping.document_type(record_type);
    let filter = match mapping.type_selection(&doc_type) {
        Some(selection) => And::combine(vec![filter, selection]),
        None => filter,
    };
    log::debug!("assembled filter for `{doc_type}`: {filter:?}");
    SearchRequest {
        doc_type,
        filter: match filter {
            Criteria::MatchAll => None,
            other => Some(other),
        },
        ..SearchRequest::default()
    }
}
