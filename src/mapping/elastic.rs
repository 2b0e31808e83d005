use std::collections::{BTreeMap, HashMap};

use heck::ToLowerCamelCase;
use serde_json::Value;

use super::Mapping;
use crate::ast::{Literal, Member};
use crate::criteria::{Criteria, Term};
use crate::error::{Error, ErrorKind, Result};

/// How enumeration values are written into the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumFormat {
    /// The registered symbolic name (subject to the analyzed-string casing
    /// policy). An unregistered value is a [ErrorKind::DomainRange] error.
    Name,
    /// The underlying integer.
    Ordinal,
}

/// Per-member options, registered explicitly where the source system read
/// attributes.
#[derive(Debug, Clone, Default)]
pub struct FieldOptions {
    /// Literal field name; wins over the casing convention.
    pub rename: Option<String>,
    /// The field is indexed verbatim, so values keep their case.
    pub not_analyzed: bool,
}

#[derive(Debug, Clone)]
struct DocumentWrapper {
    prefix: String,
    type_field: Option<String>,
}

/// The default mapping: camel-cased members, pluralized document types,
/// analyzed string values lower-cased to match the index's tokens.
#[derive(Debug, Clone)]
pub struct ElasticMapping {
    camel_case: bool,
    lowercase_analyzed: bool,
    enum_format: EnumFormat,
    wrapper: Option<DocumentWrapper>,
    fields: HashMap<(String, String), FieldOptions>,
    enums: HashMap<String, BTreeMap<i64, String>>,
}

impl Default for ElasticMapping {
    fn default() -> Self {
        ElasticMapping {
            camel_case: true,
            lowercase_analyzed: true,
            enum_format: EnumFormat::Name,
            wrapper: None,
            fields: HashMap::new(),
            enums: HashMap::new(),
        }
    }
}

impl ElasticMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep member names exactly as declared.
    pub fn exact_names(mut self) -> Self {
        self.camel_case = false;
        self
    }

    /// Keep string values exactly as supplied.
    pub fn exact_values(mut self) -> Self {
        self.lowercase_analyzed = false;
        self
    }

    pub fn enum_format(mut self, format: EnumFormat) -> Self {
        self.enum_format = format;
        self
    }

    /// Nest the record under `prefix`; when `type_field` is given, a
    /// `{prefix}.{type_field}` term restricts results to the document type.
    pub fn wrapped(mut self, prefix: impl Into<String>, type_field: Option<&str>) -> Self {
        self.wrapper = Some(DocumentWrapper {
            prefix: prefix.into(),
            type_field: type_field.map(str::to_string),
        });
        self
    }

    pub fn field(
        mut self,
        owner: impl Into<String>,
        member: impl Into<String>,
        options: FieldOptions,
    ) -> Self {
        self.fields.insert((owner.into(), member.into()), options);
        self
    }

    pub fn rename(self, owner: &str, member: &str, to: &str) -> Self {
        self.field(
            owner,
            member,
            FieldOptions {
                rename: Some(to.to_string()),
                not_analyzed: false,
            },
        )
    }

    pub fn not_analyzed(self, owner: &str, member: &str) -> Self {
        self.field(
            owner,
            member,
            FieldOptions {
                rename: None,
                not_analyzed: true,
            },
        )
    }

    /// Register the symbols of an enumeration type.
    pub fn with_enum(mut self, ty: impl Into<String>, values: &[(i64, &str)]) -> Self {
        self.enums.insert(
            ty.into(),
            values.iter().map(|(v, n)| (*v, n.to_string())).collect(),
        );
        self
    }

    fn options(&self, member: &Member) -> Option<&FieldOptions> {
        self.fields
            .get(&(member.owner.clone(), member.name.clone()))
    }

    fn is_analyzed(&self, member: &Member) -> bool {
        !self.options(member).map_or(false, |o| o.not_analyzed)
    }

    fn format_string(&self, member: &Member, s: &str) -> Value {
        if self.lowercase_analyzed && self.is_analyzed(member) {
            Value::String(s.to_lowercase())
        } else {
            Value::String(s.to_string())
        }
    }
}

impl Mapping for ElasticMapping {
    fn field_segment(&self, member: &Member) -> String {
        if let Some(rename) = self.options(member).and_then(|o| o.rename.as_deref()) {
            return rename.to_string();
        }
        if self.camel_case {
            member.name.to_lower_camel_case()
        } else {
            member.name.clone()
        }
    }

    fn document_type(&self, record_type: &str) -> String {
        pluralize(&record_type.to_lower_camel_case())
    }

    fn prefix(&self, _record_type: &str) -> Option<String> {
        self.wrapper.as_ref().map(|w| w.prefix.clone())
    }

    fn format_value(&self, member: &Member, value: &Literal) -> Result<Value> {
        Ok(match value {
            Literal::Null => Value::Null,
            Literal::Boolean(b) => Value::Bool(*b),
            Literal::Integer(i) => Value::from(*i),
            Literal::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .ok_or_else(|| {
                    Error::simple(
                        ErrorKind::Argument,
                        format!("non-finite number for field `{}`", member.name),
                    )
                })?,
            Literal::String(s) => self.format_string(member, s),
            Literal::Timestamp(t) => Value::String(t.clone()),
            Literal::Enum(e) => match self.enum_format {
                EnumFormat::Ordinal => Value::from(e.value),
                EnumFormat::Name => {
                    let symbol = self.enums.get(&e.ty).and_then(|m| m.get(&e.value));
                    match symbol {
                        Some(name) => self.format_string(member, name),
                        None => {
                            return Err(Error::simple(
                                ErrorKind::DomainRange,
                                format!("value {} is not defined on enum `{}`", e.value, e.ty),
                            )
                            .into())
                        }
                    }
                }
            },
            Literal::Seq(_) => {
                return Err(Error::simple(
                    ErrorKind::Argument,
                    "sequence value in scalar position",
                )
                .into())
            }
        })
    }

    fn type_selection(&self, doc_type: &str) -> Option<Criteria> {
        let wrapper = self.wrapper.as_ref()?;
        let type_field = wrapper.type_field.as_ref()?;
        Some(Term::new(
            format!("{}.{}", wrapper.prefix, type_field),
            doc_type,
        ))
    }
}

fn pluralize(noun: &str) -> String {
    if let Some(stem) = noun.strip_suffix('y') {
        if !matches!(stem.chars().last(), None | Some('a' | 'e' | 'i' | 'o' | 'u')) {
            return format!("{stem}ies");
        }
    }
    for suffix in ["s", "x", "z", "ch", "sh"] {
        if noun.ends_with(suffix) {
            return format!("{noun}es");
        }
    }
    format!("{noun}s")
}
