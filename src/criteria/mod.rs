//! The criteria algebra: the filter nodes the translator emits, together
//! with the smart combinators that keep every constructed tree canonical.

mod combine;
mod ser;

use enum_as_inner::EnumAsInner;
use serde_json::Value;

/// A node in the filter algebra. Leaf criteria target a single field;
/// compound criteria compose children. Values are immutable; combination
/// allocates new nodes.
#[derive(Debug, Clone, PartialEq, EnumAsInner)]
pub enum Criteria {
    /// The constant-true criteria; identity of [And::combine].
    MatchAll,
    /// The constant-false criteria; identity of [Or::combine].
    MatchNone,
    Term(Term),
    Terms(Terms),
    Range(Range),
    Missing(Missing),
    Exists(Exists),
    Prefix(Prefix),
    Regexp(Regexp),
    Not(Not),
    And(And),
    Or(Or),
}

impl Criteria {
    /// The stable name used as this node's JSON object key.
    pub fn name(&self) -> &'static str {
        match self {
            Criteria::MatchAll => "match_all",
            Criteria::MatchNone => "match_none",
            Criteria::Term(_) => "term",
            Criteria::Terms(_) => "terms",
            Criteria::Range(_) => "range",
            Criteria::Missing(_) => "missing",
            Criteria::Exists(_) => "exists",
            Criteria::Prefix(_) => "prefix",
            Criteria::Regexp(_) => "regexp",
            Criteria::Not(_) => "not",
            Criteria::And(_) => "and",
            Criteria::Or(_) => "or",
        }
    }
}

/// Exact-value match on a single field.
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub field: String,
    pub value: Value,
}

impl Term {
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Criteria {
        Criteria::Term(Term {
            field: field.into(),
            value: value.into(),
        })
    }
}

/// Set-membership match on a single field.
#[derive(Debug, Clone, PartialEq)]
pub struct Terms {
    pub field: String,
    /// Distinct values in insertion order.
    pub values: Vec<Value>,
    pub execution: TermsExecution,
}

/// Hint to the engine for evaluating a set-membership predicate.
/// `Plain`, `Bool` and `Or` carry disjunction semantics; `And` requires
/// every listed value to be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum TermsExecution {
    Plain,
    Bool,
    And,
    Or,
}

impl TermsExecution {
    /// Whether this mode admits disjunction, making the criteria
    /// or-combinable with others over the same field.
    pub fn admits_disjunction(&self) -> bool {
        !matches!(self, TermsExecution::And)
    }
}

/// Range bounds on a single field; at most one value per comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Range {
    pub field: String,
    pub gt: Option<Value>,
    pub gte: Option<Value>,
    pub lt: Option<Value>,
    pub lte: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum RangeOp {
    Gt,
    Gte,
    Lt,
    Lte,
}

/// Matches documents where the field is absent (or null).
#[derive(Debug, Clone, PartialEq)]
pub struct Missing {
    pub field: String,
}

impl Missing {
    pub fn new(field: impl Into<String>) -> Criteria {
        Criteria::Missing(Missing {
            field: field.into(),
        })
    }
}

/// Matches documents where the field is present.
#[derive(Debug, Clone, PartialEq)]
pub struct Exists {
    pub field: String,
}

impl Exists {
    pub fn new(field: impl Into<String>) -> Criteria {
        Criteria::Exists(Exists {
            field: field.into(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prefix {
    pub field: String,
    pub prefix: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Regexp {
    pub field: String,
    pub pattern: String,
}

/// Negation of a single child.
#[derive(Debug, Clone, PartialEq)]
pub struct Not {
    pub criteria: Box<Criteria>,
}

/// Conjunction over an ordered, flattened list of children.
#[derive(Debug, Clone, PartialEq)]
pub struct And {
    pub criteria: Vec<Criteria>,
}

/// Disjunction over an ordered, flattened list of children.
#[derive(Debug, Clone, PartialEq)]
pub struct Or {
    pub criteria: Vec<Criteria>,
}
