use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::criteria::Criteria;

/// The request shell around a translated filter.
///
/// `doc_type` is addressing metadata (it selects the URL path, not the body).
/// The translator core only ever populates `doc_type` and `filter`; the
/// remaining options belong to the outer query surface and serialize into the
/// body when set.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SearchRequest {
    #[serde(skip)]
    pub doc_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Criteria>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Criteria>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<SortField>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortField {
    pub field: String,
    pub order: SortOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortField {
    pub fn asc(field: impl Into<String>) -> Self {
        SortField {
            field: field.into(),
            order: SortOrder::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        SortField {
            field: field.into(),
            order: SortOrder::Desc,
        }
    }
}

// Ascending sorts use the engine's short form; descending ones spell the
// direction out.
impl Serialize for SortField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.order {
            SortOrder::Asc => serializer.serialize_str(&self.field),
            SortOrder::Desc => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(&self.field, "desc")?;
                map.end()
            }
        }
    }
}
