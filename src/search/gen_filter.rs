//! Contains functions that translate boolean [crate::ast] nodes into
//! [crate::criteria] nodes.

use crate::ast::{BinOp, BinaryExpr, Expr, ExprKind, Lambda, Literal, Member, TyKind, UnOp};
use crate::criteria::{And, Criteria, Exists, Missing, Not, Or, Range, RangeOp, Term};
use crate::error::{Error, ErrorKind, Reason, Result};
use crate::mapping::{Mapping, DOCUMENT_METADATA};

pub(super) struct Context<'a> {
    pub mapping: &'a dyn Mapping,
    pub param: &'a str,
}

pub(super) fn translate_predicate(predicate: &Lambda, mapping: &dyn Mapping) -> Result<Criteria> {
    let ctx = Context {
        mapping,
        param: &predicate.param,
    };
    translate_bool(&predicate.body, &ctx)
}

/// Translate an expression in boolean (predicate) position.
pub(super) fn translate_bool(expr: &Expr, ctx: &Context) -> Result<Criteria> {
    Ok(match &expr.kind {
        ExprKind::Literal(Literal::Boolean(true)) => Criteria::MatchAll,
        ExprKind::Literal(Literal::Boolean(false)) => Criteria::MatchNone,
        ExprKind::Binary(binary) => translate_binary(binary, ctx)?,
        ExprKind::Unary(unary) if unary.op == UnOp::Not => {
            Not::create(translate_bool(&unary.expr, ctx)?)
        }
        ExprKind::Cast(cast) => translate_bool(&cast.expr, ctx)?,
        // a quoted predicate; the wrapper adds nothing
        ExprKind::Lambda(lambda) => translate_bool(&lambda.body, ctx)?,
        ExprKind::Member(member) if member.ty.kind == TyKind::Bool => {
            let field = field_of(member, ctx)?;
            let value = ctx.mapping.format_value(member, &Literal::Boolean(true))?;
            Criteria::Term(Term { field, value })
        }
        ExprKind::MethodCall(call) => super::methods::translate_call(call, ctx)?,
        kind => {
            return Err(Error::new(
                ErrorKind::Unsupported,
                Reason::Expected {
                    who: Some("predicate".to_string()),
                    expected: "a boolean expression".to_string(),
                    found: format!("`{}`", kind.as_ref()),
                },
            )
            .into())
        }
    })
}

fn translate_binary(binary: &BinaryExpr, ctx: &Context) -> Result<Criteria> {
    match binary.op {
        BinOp::And => Ok(And::combine(vec![
            translate_bool(&binary.left, ctx)?,
            translate_bool(&binary.right, ctx)?,
        ])),
        BinOp::Or => Ok(Or::combine(vec![
            translate_bool(&binary.left, ctx)?,
            translate_bool(&binary.right, ctx)?,
        ])),
        BinOp::Eq | BinOp::Ne => translate_equality(binary.op, &binary.left, &binary.right, ctx),
        BinOp::Lt | BinOp::Lte | BinOp::Gt | BinOp::Gte => {
            translate_comparison(binary.op, &binary.left, &binary.right, ctx)
        }
        op => Err(Error::new(
            ErrorKind::Unsupported,
            Reason::Expected {
                who: Some("predicate".to_string()),
                expected: "a boolean operator".to_string(),
                found: format!("`{op}`"),
            },
        )
        .into()),
    }
}

pub(super) fn translate_equality(
    op: BinOp,
    left: &Expr,
    right: &Expr,
    ctx: &Context,
) -> Result<Criteria> {
    let positive = op == BinOp::Eq;
    let (left, right) = (strip_operand(left), strip_operand(right));

    // a boolean constant against a boolean subexpression reduces to that side
    for (constant, other) in [(left, right), (right, left)] {
        if let ExprKind::Literal(Literal::Boolean(b)) = &constant.kind {
            if !matches!(other.kind, ExprKind::Literal(_)) {
                let inner = translate_bool(other, ctx)?;
                return Ok(if *b == positive {
                    inner
                } else {
                    Not::create(inner)
                });
            }
        }
    }

    if let (Some(member), Some(constant)) = (member_operand(left), literal_operand(right)) {
        return build_equality(member, constant, positive, ctx);
    }
    if let (Some(constant), Some(member)) = (literal_operand(left), member_operand(right)) {
        return build_equality(member, constant, positive, ctx);
    }
    if member_operand(left).is_some() && member_operand(right).is_some() {
        return Err(Error::simple(
            ErrorKind::Unsupported,
            "comparing two document fields is not supported",
        )
        .into());
    }
    Err(Error::new(
        ErrorKind::Unsupported,
        Reason::Expected {
            who: Some("equality".to_string()),
            expected: "a document field compared against a constant".to_string(),
            found: found_operands(left, right),
        },
    )
    .into())
}

fn build_equality(
    member: &Member,
    constant: &Literal,
    positive: bool,
    ctx: &Context,
) -> Result<Criteria> {
    let field = field_of(member, ctx)?;
    if constant.is_null() {
        return Ok(if positive {
            Missing::new(field)
        } else {
            Exists::new(field)
        });
    }
    let value = ctx.mapping.format_value(member, constant)?;
    let term = Criteria::Term(Term { field, value });
    Ok(if positive { term } else { Not::create(term) })
}

fn translate_comparison(op: BinOp, left: &Expr, right: &Expr, ctx: &Context) -> Result<Criteria> {
    let (left, right) = (strip_operand(left), strip_operand(right));

    if let (Some(member), Some(constant)) = (member_operand(left), literal_operand(right)) {
        return build_range(op, member, constant, ctx);
    }
    // the constant on the left inverts the comparison: `c < m` is `m > c`
    if let (Some(constant), Some(member)) = (literal_operand(left), member_operand(right)) {
        return build_range(invert(op), member, constant, ctx);
    }
    if member_operand(left).is_some() && member_operand(right).is_some() {
        return Err(Error::simple(
            ErrorKind::Unsupported,
            "comparing two document fields is not supported",
        )
        .into());
    }
    Err(Error::new(
        ErrorKind::Unsupported,
        Reason::Expected {
            who: Some("comparison".to_string()),
            expected: "a document field compared against a constant".to_string(),
            found: found_operands(left, right),
        },
    )
    .into())
}

fn build_range(op: BinOp, member: &Member, constant: &Literal, ctx: &Context) -> Result<Criteria> {
    if constant.is_null() {
        return Err(Error::simple(
            ErrorKind::Unsupported,
            "range comparison against null",
        )
        .into());
    }
    let field = field_of(member, ctx)?;
    let value = ctx.mapping.format_value(member, constant)?;
    let op = match op {
        BinOp::Gt => RangeOp::Gt,
        BinOp::Gte => RangeOp::Gte,
        BinOp::Lt => RangeOp::Lt,
        _ => RangeOp::Lte,
    };
    Ok(Criteria::Range(Range::new(field, op, value)))
}

fn invert(op: BinOp) -> BinOp {
    match op {
        BinOp::Lt => BinOp::Gt,
        BinOp::Lte => BinOp::Gte,
        BinOp::Gt => BinOp::Lt,
        _ => BinOp::Lte,
    }
}

/// Strip casts and nullable-value unwraps off an operand. A `value` call only
/// unwraps when its receiver really is a nullable member; anything else is
/// left in place for the method table to reject.
pub(super) fn strip_operand(mut expr: &Expr) -> &Expr {
    loop {
        match &expr.kind {
            ExprKind::Cast(cast) => expr = cast.expr.as_ref(),
            ExprKind::MethodCall(call) => match (&call.receiver, call.owner.as_str()) {
                (Some(receiver), "Option")
                    if call.name == "value"
                        && call.args.is_empty()
                        && nullable_member(receiver) =>
                {
                    expr = receiver.as_ref()
                }
                _ => return expr,
            },
            _ => return expr,
        }
    }
}

pub(super) fn nullable_member(expr: &Expr) -> bool {
    matches!(&strip_operand(expr).kind, ExprKind::Member(m) if m.ty.nullable)
}

pub(super) fn member_operand(expr: &Expr) -> Option<&Member> {
    strip_operand(expr).kind.as_member()
}

pub(super) fn literal_operand(expr: &Expr) -> Option<&Literal> {
    strip_operand(expr).kind.as_literal()
}

fn found_operands(left: &Expr, right: &Expr) -> String {
    format!("`{}` and `{}`", left.kind.as_ref(), right.kind.as_ref())
}

/// Walk a member spine to its parameter root, mapping each segment.
pub(super) fn field_of(member: &Member, ctx: &Context) -> Result<String> {
    // metadata fields address the envelope, never the mapped document
    if member.owner == DOCUMENT_METADATA {
        let rooted = member
            .target
            .as_deref()
            .map(strip_operand)
            .map_or(false, |t| {
                matches!(&t.kind, ExprKind::Parameter(name) if name == ctx.param)
            });
        if !rooted {
            return Err(Error::simple(
                ErrorKind::Unsupported,
                format!(
                    "metadata member `{}` must hang directly off the predicate parameter",
                    member.name
                ),
            )
            .into());
        }
        return segment(member, ctx);
    }

    let mut segments = Vec::new();
    let mut current = member;
    loop {
        segments.push(segment(current, ctx)?);
        let Some(target) = current.target.as_deref() else {
            return Err(Error::simple(
                ErrorKind::Unsupported,
                format!(
                    "member `{}` is static; member chains must be rooted at the predicate parameter",
                    current.name
                ),
            )
            .into());
        };
        match &strip_operand(target).kind {
            ExprKind::Member(parent) => current = parent,
            ExprKind::Parameter(name) if name == ctx.param => break,
            ExprKind::Parameter(name) => {
                return Err(Error::simple(
                    ErrorKind::Unsupported,
                    format!(
                        "member chain is rooted at parameter `{name}`, not the predicate parameter `{}`",
                        ctx.param
                    ),
                )
                .into())
            }
            kind => {
                return Err(Error::new(
                    ErrorKind::Unsupported,
                    Reason::Expected {
                        who: Some("member access".to_string()),
                        expected: "a chain rooted at the predicate parameter".to_string(),
                        found: format!("`{}`", kind.as_ref()),
                    },
                )
                .into())
            }
        }
    }
    segments.reverse();
    let path = segments.join(".");
    Ok(match ctx.mapping.prefix(&current.owner) {
        Some(prefix) => format!("{prefix}.{path}"),
        None => path,
    })
}

fn segment(member: &Member, ctx: &Context) -> Result<String> {
    let segment = ctx.mapping.field_segment(member);
    if segment.trim().is_empty() {
        return Err(Error::simple(
            ErrorKind::Argument,
            format!("mapping produced a blank field name for member `{}`", member.name),
        )
        .into());
    }
    Ok(segment)
}
