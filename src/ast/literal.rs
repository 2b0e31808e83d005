use std::fmt::Display;

use anyhow::anyhow;
use enum_as_inner::EnumAsInner;

/// The constant value domain: everything the partial evaluator can produce
/// and the mapping can format.
#[derive(Debug, EnumAsInner, PartialEq, Clone, strum::AsRefStr)]
pub enum Literal {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    /// An ISO-8601 instant, passed through to the engine as a string.
    Timestamp(String),
    /// A value of a named enumeration; the mapping decides symbol vs ordinal.
    Enum(EnumValue),
    /// A folded array literal.
    Seq(Vec<Literal>),
}

#[derive(Debug, PartialEq, Clone)]
pub struct EnumValue {
    pub ty: String,
    pub value: i64,
}

impl EnumValue {
    pub fn new(ty: impl Into<String>, value: i64) -> Self {
        EnumValue {
            ty: ty.into(),
            value,
        }
    }
}

impl From<Literal> for anyhow::Error {
    fn from(item: Literal) -> Self {
        anyhow!("Failed to convert `{item}`")
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Null => write!(f, "null")?,
            Literal::Boolean(b) => f.write_str(if *b { "true" } else { "false" })?,
            Literal::Integer(i) => write!(f, "{i}")?,
            Literal::Float(v) => write!(f, "{v}")?,
            Literal::String(s) => write!(f, "{s:?}")?,
            Literal::Timestamp(inner) => write!(f, "@{inner}")?,
            Literal::Enum(e) => write!(f, "{}({})", e.ty, e.value)?,
            Literal::Seq(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")?;
            }
        }
        Ok(())
    }
}
