//! Wire shapes: every criteria serializes as `{ "<name>": <payload> }`.

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::{And, Criteria, Not, Or, Prefix, Range, Regexp, Term, Terms, TermsExecution};

impl Serialize for Criteria {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Criteria::MatchAll | Criteria::MatchNone => {
                map.serialize_entry(self.name(), &Empty)?
            }
            Criteria::Term(term) => map.serialize_entry(self.name(), term)?,
            Criteria::Terms(terms) => map.serialize_entry(self.name(), terms)?,
            Criteria::Range(range) => map.serialize_entry(self.name(), range)?,
            Criteria::Missing(missing) => {
                map.serialize_entry(self.name(), &Field(&missing.field))?
            }
            Criteria::Exists(exists) => map.serialize_entry(self.name(), &Field(&exists.field))?,
            Criteria::Prefix(prefix) => map.serialize_entry(self.name(), prefix)?,
            Criteria::Regexp(regexp) => map.serialize_entry(self.name(), regexp)?,
            Criteria::Not(not) => map.serialize_entry(self.name(), not)?,
            Criteria::And(and) => map.serialize_entry(self.name(), &Filters(&and.criteria))?,
            Criteria::Or(or) => map.serialize_entry(self.name(), &Filters(&or.criteria))?,
        }
        map.end()
    }
}

struct Empty;

impl Serialize for Empty {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_map(Some(0))?.end()
    }
}

struct Field<'a>(&'a str);

impl Serialize for Field<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("field", self.0)?;
        map.end()
    }
}

struct Filters<'a>(&'a [Criteria]);

impl Serialize for Filters<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("filters", self.0)?;
        map.end()
    }
}

impl Serialize for Term {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.field, &self.value)?;
        map.end()
    }
}

impl Serialize for Terms {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(&self.field, &self.values)?;
        if self.execution != TermsExecution::Plain {
            map.serialize_entry("execution", &self.execution.to_string())?;
        }
        map.end()
    }
}

impl Serialize for Range {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Bounds<'a>(&'a Range);

        impl Serialize for Bounds<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(None)?;
                for (op, bound) in [
                    ("gt", &self.0.gt),
                    ("gte", &self.0.gte),
                    ("lt", &self.0.lt),
                    ("lte", &self.0.lte),
                ] {
                    if let Some(value) = bound {
                        map.serialize_entry(op, value)?;
                    }
                }
                map.end()
            }
        }

        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.field, &Bounds(self))?;
        map.end()
    }
}

impl Serialize for Prefix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.field, &self.prefix)?;
        map.end()
    }
}

impl Serialize for Regexp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.field, &self.pattern)?;
        map.end()
    }
}

impl Serialize for Not {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("filter", &*self.criteria)?;
        map.end()
    }
}

// And/Or serialize through [Filters]; these impls exist so a bare payload can
// still be rendered when a caller serializes the node directly.
impl Serialize for And {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Filters(&self.criteria).serialize(serializer)
    }
}

impl Serialize for Or {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Filters(&self.criteria).serialize(serializer)
    }
}
