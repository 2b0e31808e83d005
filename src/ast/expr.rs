use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use enum_as_inner::EnumAsInner;

use super::Literal;
use crate::error::Result;

/// Expr is anything that has a value.
/// If it cannot contain nested Exprs, it should be under [ExprKind::Literal].
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
}

#[derive(Debug, EnumAsInner, PartialEq, Clone, strum::AsRefStr)]
pub enum ExprKind {
    Literal(Literal),

    /// The bound root of a predicate: the document record itself.
    Parameter(String),

    Member(Member),
    Binary(BinaryExpr),
    Unary(UnaryExpr),

    /// A numeric or widening conversion. Transparently elided by the
    /// translator; folded over literals by the partial evaluator.
    Cast(CastExpr),

    MethodCall(MethodCall),
    Lambda(Lambda),

    /// An array literal; folds to [Literal::Seq] when every element folds.
    Array(Vec<Expr>),

    /// A host-supplied deferred value standing in for a closed-over capture
    /// or a static member. Invoked by the partial evaluator.
    Thunk(Thunk),
}

/// A member access along a chain rooted (for translatable predicates) at the
/// bound parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    /// `None` only for static members, which must be supplied as thunks.
    pub target: Option<Box<Expr>>,
    /// Name of the declaring type.
    pub owner: String,
    pub name: String,
    pub ty: Ty,
}

/// Static type of a member: its scalar kind plus nullability.
#[derive(Debug, Clone, PartialEq)]
pub struct Ty {
    pub kind: TyKind,
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TyKind {
    Bool,
    Int,
    Float,
    String,
    Timestamp,
    Enum(String),
    Seq,
    /// A nested object; only ever an intermediate chain segment.
    Record,
}

impl Ty {
    pub fn new(kind: TyKind) -> Self {
        Ty {
            kind,
            nullable: false,
        }
    }

    pub fn nullable(kind: TyKind) -> Self {
        Ty {
            kind,
            nullable: true,
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub op: BinOp,
    pub right: Box<Expr>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, strum::Display, strum::EnumString)]
pub enum BinOp {
    #[strum(to_string = "*")]
    Mul,
    #[strum(to_string = "/")]
    Div,
    #[strum(to_string = "%")]
    Mod,
    #[strum(to_string = "+")]
    Add,
    #[strum(to_string = "-")]
    Sub,
    #[strum(to_string = "==")]
    Eq,
    #[strum(to_string = "!=")]
    Ne,
    #[strum(to_string = ">")]
    Gt,
    #[strum(to_string = "<")]
    Lt,
    #[strum(to_string = ">=")]
    Gte,
    #[strum(to_string = "<=")]
    Lte,
    #[strum(to_string = "&&")]
    And,
    #[strum(to_string = "||")]
    Or,
}

#[derive(Debug, PartialEq, Clone)]
pub struct UnaryExpr {
    pub op: UnOp,
    pub expr: Box<Expr>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, strum::Display, strum::EnumString)]
pub enum UnOp {
    #[strum(to_string = "-")]
    Neg,
    #[strum(to_string = "!")]
    Not,
}

#[derive(Debug, PartialEq, Clone)]
pub struct CastExpr {
    pub expr: Box<Expr>,
    pub ty: TyKind,
}

/// A method call, identified for dispatch by `(owner, name, arity)` where
/// arity counts the receiver together with the arguments.
#[derive(Debug, PartialEq, Clone)]
pub struct MethodCall {
    /// `None` for static calls.
    pub receiver: Option<Box<Expr>>,
    /// Name of the declaring type.
    pub owner: String,
    pub name: String,
    pub args: Vec<Expr>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Lambda {
    pub param: String,
    pub body: Box<Expr>,
}

impl Lambda {
    pub fn new(param: impl Into<String>, body: Expr) -> Self {
        Lambda {
            param: param.into(),
            body: Box::new(body),
        }
    }
}

/// A deferred value supplied by the host: a pure function of its captured
/// state, invoked during partial evaluation.
#[derive(Clone)]
pub struct Thunk(Arc<dyn Fn() -> Result<Literal> + Send + Sync>);

impl Thunk {
    pub fn new(f: impl Fn() -> Result<Literal> + Send + Sync + 'static) -> Self {
        Thunk(Arc::new(f))
    }

    pub fn invoke(&self) -> Result<Literal> {
        (self.0)()
    }
}

impl Debug for Thunk {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("Thunk")
    }
}

// Thunks compare by allocation identity.
impl PartialEq for Thunk {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Expr { kind }
    }

    pub fn null() -> Expr {
        Expr::new(ExprKind::Literal(Literal::Null))
    }

    pub fn literal(value: impl Into<Literal>) -> Expr {
        Expr::new(ExprKind::Literal(value.into()))
    }

    pub fn param(name: impl Into<String>) -> Expr {
        Expr::new(ExprKind::Parameter(name.into()))
    }

    pub fn member(target: Expr, owner: impl Into<String>, name: impl Into<String>, ty: Ty) -> Expr {
        Expr::new(ExprKind::Member(Member {
            target: Some(Box::new(target)),
            owner: owner.into(),
            name: name.into(),
            ty,
        }))
    }

    pub fn binary(left: Expr, op: BinOp, right: Expr) -> Expr {
        Expr::new(ExprKind::Binary(BinaryExpr {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }))
    }

    pub fn unary(op: UnOp, expr: Expr) -> Expr {
        Expr::new(ExprKind::Unary(UnaryExpr {
            op,
            expr: Box::new(expr),
        }))
    }

    pub fn cast(expr: Expr, ty: TyKind) -> Expr {
        Expr::new(ExprKind::Cast(CastExpr {
            expr: Box::new(expr),
            ty,
        }))
    }

    pub fn call(
        receiver: Option<Expr>,
        owner: impl Into<String>,
        name: impl Into<String>,
        args: Vec<Expr>,
    ) -> Expr {
        Expr::new(ExprKind::MethodCall(MethodCall {
            receiver: receiver.map(Box::new),
            owner: owner.into(),
            name: name.into(),
            args,
        }))
    }

    pub fn array(items: Vec<Expr>) -> Expr {
        Expr::new(ExprKind::Array(items))
    }

    pub fn thunk(f: impl Fn() -> Result<Literal> + Send + Sync + 'static) -> Expr {
        Expr::new(ExprKind::Thunk(Thunk::new(f)))
    }

    pub fn lambda(param: impl Into<String>, body: Expr) -> Expr {
        Expr::new(ExprKind::Lambda(Lambda::new(param, body)))
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Boolean(value)
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::Integer(value)
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::Float(value)
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::String(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::String(value)
    }
}
