use heck::ToLowerCamelCase;
use serde_json::Value;

use super::Mapping;
use crate::ast::{Literal, Member};
use crate::criteria::Criteria;
use crate::error::Result;

/// Sentinel owner type for the engine's own document metadata.
pub const DOCUMENT_METADATA: &str = "DocumentMetadata";

/// Decorator that short-circuits members of [DOCUMENT_METADATA] onto the
/// engine's underscore fields and delegates everything else.
#[derive(Debug, Clone)]
pub struct MetadataFields<M> {
    inner: M,
}

impl<M: Mapping> MetadataFields<M> {
    pub fn new(inner: M) -> Self {
        MetadataFields { inner }
    }
}

impl<M: Mapping> Mapping for MetadataFields<M> {
    fn field_segment(&self, member: &Member) -> String {
        if member.owner == DOCUMENT_METADATA {
            match member.name.to_lower_camel_case().as_str() {
                "id" => return "_id".to_string(),
                "score" => return "_score".to_string(),
                "index" => return "_index".to_string(),
                "type" => return "_type".to_string(),
                _ => {}
            }
        }
        self.inner.field_segment(member)
    }

    fn document_type(&self, record_type: &str) -> String {
        self.inner.document_type(record_type)
    }

    fn prefix(&self, record_type: &str) -> Option<String> {
        self.inner.prefix(record_type)
    }

    fn format_value(&self, member: &Member, value: &Literal) -> Result<Value> {
        self.inner.format_value(member, value)
    }

    fn type_selection(&self, doc_type: &str) -> Option<Criteria> {
        self.inner.type_selection(doc_type)
    }
}
