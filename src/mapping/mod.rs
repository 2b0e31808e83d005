//! The mapping seam: how member chains become field paths and how runtime
//! values become the JSON scalars Elasticsearch indexed.

mod elastic;
mod metadata;

pub use elastic::{ElasticMapping, EnumFormat, FieldOptions};
pub use metadata::{MetadataFields, DOCUMENT_METADATA};

use crate::ast::{Literal, Member};
use crate::criteria::Criteria;
use crate::error::Result;

/// Capability set consumed by the translator.
///
/// Implementations must be stateless or otherwise safe for concurrent reads;
/// translator calls are arbitrarily interleaved.
pub trait Mapping: Send + Sync {
    /// The single-segment field name for one member of a chain.
    fn field_segment(&self, member: &Member) -> String;

    /// The conventional document-type name for a record type.
    fn document_type(&self, record_type: &str) -> String;

    /// Dotted prefix inserted before a member chain when the record lives
    /// nested inside a wrapper document.
    fn prefix(&self, record_type: &str) -> Option<String>;

    /// The canonical JSON shape of a runtime value for the given member.
    fn format_value(&self, member: &Member, value: &Literal) -> Result<serde_json::Value>;

    /// A filter AND-ed at the root to restrict results to documents of the
    /// intended record type.
    fn type_selection(&self, doc_type: &str) -> Option<Criteria>;
}
