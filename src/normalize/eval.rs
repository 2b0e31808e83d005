//! Compile-time evaluation of parameter-independent subtrees.
//!
//! A node folds to a [Literal] exactly when every descendant has folded,
//! bottom-up; parameters (and chains hanging off them) never fold.

use crate::ast::{
    fold_expr_kind, AstFold, BinOp, BinaryExpr, CastExpr, Expr, ExprKind, Literal, TyKind, UnOp,
    UnaryExpr,
};
use crate::error::{Error, ErrorKind, Result};

pub(super) struct Evaluator;

impl AstFold for Evaluator {
    fn fold_expr_kind(&mut self, kind: ExprKind) -> Result<ExprKind> {
        let kind = fold_expr_kind(self, kind)?;
        collapse(kind)
    }
}

fn collapse(kind: ExprKind) -> Result<ExprKind> {
    Ok(match kind {
        ExprKind::Thunk(thunk) => {
            let value = thunk.invoke().map_err(|cause| {
                Error::simple(
                    ErrorKind::Evaluation,
                    format!("closed-over value failed to evaluate: {cause}"),
                )
            })?;
            ExprKind::Literal(value)
        }
        ExprKind::Array(items) => {
            if items.iter().all(|i| matches!(i.kind, ExprKind::Literal(_))) {
                let values = items
                    .into_iter()
                    .filter_map(|i| i.kind.into_literal().ok())
                    .collect();
                ExprKind::Literal(Literal::Seq(values))
            } else {
                ExprKind::Array(items)
            }
        }
        ExprKind::Unary(unary) => eval_unary(unary),
        ExprKind::Cast(cast) => eval_cast(cast),
        ExprKind::Binary(binary) => eval_binary(binary)?,
        ExprKind::Member(member) => match &member.target {
            None => {
                return Err(Error::simple(
                    ErrorKind::Evaluation,
                    format!(
                        "static member `{}` cannot be evaluated; supply it as a thunk",
                        member.name
                    ),
                )
                .into())
            }
            Some(target) if matches!(target.kind, ExprKind::Literal(_)) => {
                return Err(Error::simple(
                    ErrorKind::Evaluation,
                    format!(
                        "member `{}` of a closed-over value cannot be evaluated; supply it as a thunk",
                        member.name
                    ),
                )
                .into())
            }
            _ => ExprKind::Member(member),
        },
        ExprKind::MethodCall(call) => {
            let literal = |e: &Expr| matches!(e.kind, ExprKind::Literal(_));
            if call.receiver.as_deref().map_or(true, literal) && call.args.iter().all(literal) {
                return Err(Error::simple(
                    ErrorKind::Evaluation,
                    format!(
                        "method `{}::{}` cannot be invoked at translation time; supply its result as a thunk",
                        call.owner, call.name
                    ),
                )
                .into());
            }
            ExprKind::MethodCall(call)
        }
        kind => kind,
    })
}

fn eval_unary(unary: UnaryExpr) -> ExprKind {
    if let ExprKind::Literal(literal) = &unary.expr.kind {
        let folded = match (unary.op, literal) {
            (UnOp::Not, Literal::Boolean(b)) => Some(Literal::Boolean(!b)),
            (UnOp::Neg, Literal::Integer(i)) => i.checked_neg().map(Literal::Integer),
            (UnOp::Neg, Literal::Float(f)) => Some(Literal::Float(-f)),
            _ => None,
        };
        if let Some(folded) = folded {
            return ExprKind::Literal(folded);
        }
    }
    ExprKind::Unary(unary)
}

fn eval_cast(cast: CastExpr) -> ExprKind {
    let CastExpr { expr, ty } = cast;
    match (ty, expr.kind) {
        (TyKind::Float, ExprKind::Literal(Literal::Integer(i))) => {
            ExprKind::Literal(Literal::Float(i as f64))
        }
        // narrowing truncates toward zero, saturating at the integer bounds
        (TyKind::Int, ExprKind::Literal(Literal::Float(f))) => {
            ExprKind::Literal(Literal::Integer(f as i64))
        }
        (TyKind::Bool, kind @ ExprKind::Literal(Literal::Boolean(_)))
        | (TyKind::Int, kind @ ExprKind::Literal(Literal::Integer(_)))
        | (TyKind::Float, kind @ ExprKind::Literal(Literal::Float(_)))
        | (TyKind::String, kind @ ExprKind::Literal(Literal::String(_)))
        | (TyKind::Timestamp, kind @ ExprKind::Literal(Literal::Timestamp(_))) => kind,
        (ty, kind) => ExprKind::Cast(CastExpr {
            expr: Box::new(Expr::new(kind)),
            ty,
        }),
    }
}

fn eval_binary(binary: BinaryExpr) -> Result<ExprKind> {
    let folded = if let (ExprKind::Literal(left), ExprKind::Literal(right)) =
        (&binary.left.kind, &binary.right.kind)
    {
        eval_literal_binary(binary.op, left, right)?
    } else {
        None
    };
    Ok(match folded {
        Some(folded) => ExprKind::Literal(folded),
        None => ExprKind::Binary(binary),
    })
}

fn eval_literal_binary(op: BinOp, left: &Literal, right: &Literal) -> Result<Option<Literal>> {
    use Literal::*;

    // integer arithmetic stays integral
    if let (Integer(a), Integer(b)) = (left, right) {
        let overflow = || Error::simple(ErrorKind::Evaluation, "integer overflow while folding constants");
        return Ok(Some(match op {
            BinOp::Mul => Integer(a.checked_mul(*b).ok_or_else(overflow)?),
            BinOp::Add => Integer(a.checked_add(*b).ok_or_else(overflow)?),
            BinOp::Sub => Integer(a.checked_sub(*b).ok_or_else(overflow)?),
            BinOp::Div => Integer(a.checked_div(*b).ok_or_else(|| {
                Error::simple(ErrorKind::Evaluation, "integer division failed while folding constants")
            })?),
            BinOp::Mod => Integer(a.checked_rem(*b).ok_or_else(|| {
                Error::simple(ErrorKind::Evaluation, "integer division failed while folding constants")
            })?),
            BinOp::Eq => Boolean(a == b),
            BinOp::Ne => Boolean(a != b),
            BinOp::Gt => Boolean(a > b),
            BinOp::Lt => Boolean(a < b),
            BinOp::Gte => Boolean(a >= b),
            BinOp::Lte => Boolean(a <= b),
            BinOp::And | BinOp::Or => return Ok(None),
        }));
    }

    // mixed numeric operands fold in the float domain
    if let (Some(a), Some(b)) = (as_float(left), as_float(right)) {
        return Ok(Some(match op {
            BinOp::Mul => Float(a * b),
            BinOp::Add => Float(a + b),
            BinOp::Sub => Float(a - b),
            BinOp::Div => Float(a / b),
            BinOp::Mod => Float(a % b),
            BinOp::Eq => Boolean(a == b),
            BinOp::Ne => Boolean(a != b),
            BinOp::Gt => Boolean(a > b),
            BinOp::Lt => Boolean(a < b),
            BinOp::Gte => Boolean(a >= b),
            BinOp::Lte => Boolean(a <= b),
            BinOp::And | BinOp::Or => return Ok(None),
        }));
    }

    Ok(match (op, left, right) {
        (BinOp::And, Boolean(a), Boolean(b)) => Some(Boolean(*a && *b)),
        (BinOp::Or, Boolean(a), Boolean(b)) => Some(Boolean(*a || *b)),
        (BinOp::Eq, Boolean(a), Boolean(b)) => Some(Boolean(a == b)),
        (BinOp::Ne, Boolean(a), Boolean(b)) => Some(Boolean(a != b)),
        (BinOp::Eq, String(a), String(b)) => Some(Boolean(a == b)),
        (BinOp::Ne, String(a), String(b)) => Some(Boolean(a != b)),
        (BinOp::Eq, Null, Null) => Some(Boolean(true)),
        (BinOp::Ne, Null, Null) => Some(Boolean(false)),
        // ISO-8601 instants order lexically
        (BinOp::Eq, Timestamp(a), Timestamp(b)) => Some(Boolean(a == b)),
        (BinOp::Ne, Timestamp(a), Timestamp(b)) => Some(Boolean(a != b)),
        (BinOp::Gt, Timestamp(a), Timestamp(b)) => Some(Boolean(a > b)),
        (BinOp::Lt, Timestamp(a), Timestamp(b)) => Some(Boolean(a < b)),
        (BinOp::Gte, Timestamp(a), Timestamp(b)) => Some(Boolean(a >= b)),
        (BinOp::Lte, Timestamp(a), Timestamp(b)) => Some(Boolean(a <= b)),
        (BinOp::Eq, Enum(a), Enum(b)) if a.ty == b.ty => Some(Boolean(a.value == b.value)),
        (BinOp::Ne, Enum(a), Enum(b)) if a.ty == b.ty => Some(Boolean(a.value != b.value)),
        _ => None,
    })
}

fn as_float(literal: &Literal) -> Option<f64> {
    match literal {
        Literal::Integer(i) => Some(*i as f64),
        Literal::Float(f) => Some(*f),
        _ => None,
    }
}
