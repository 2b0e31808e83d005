//! Recognition table for method calls inside predicates.
//!
//! Identities are `(owner, name, arity)` where arity counts the receiver
//! together with the arguments, so the instance and static spellings of a
//! method land on the same handler with pre-normalized operand positions.

use std::collections::HashMap;

use itertools::Itertools;
use once_cell::sync::Lazy;

use super::gen_filter::{
    field_of, literal_operand, member_operand, nullable_member, strip_operand, translate_equality,
    Context,
};
use crate::ast::{BinOp, Expr, ExprKind, Literal, Member, MethodCall};
use crate::criteria::{Criteria, Exists, Missing, Or, Prefix, Regexp, Term, Terms, TermsExecution};
use crate::error::{Error, ErrorKind, Reason, Result};

type Handler = fn(&[&Expr], &Context<'_>) -> Result<Criteria>;

static HANDLERS: Lazy<HashMap<(String, String, usize), Handler>> = Lazy::new(|| {
    let mut table: HashMap<(String, String, usize), Handler> = HashMap::new();
    let mut insert = |owner: &str, name: &str, arity: usize, handler: Handler| {
        table.insert((owner.to_string(), name.to_string(), arity), handler);
    };
    insert("Seq", "contains", 2, contains);
    insert("Elastic", "contains_any", 2, contains_any);
    insert("Elastic", "contains_all", 2, contains_all);
    insert("Elastic", "regexp", 2, regexp);
    insert("Elastic", "prefix", 2, prefix);
    insert("Option", "is_some", 1, is_some);
    table
});

pub(super) fn translate_call(call: &MethodCall, ctx: &Context) -> Result<Criteria> {
    let operands: Vec<&Expr> = call
        .receiver
        .iter()
        .map(|r| r.as_ref())
        .chain(call.args.iter())
        .collect();

    // every scalar type carries an `equals`; dispatch on name and arity alone
    if call.name == "equals" && operands.len() == 2 {
        return translate_equality(BinOp::Eq, operands[0], operands[1], ctx);
    }

    let identity = (call.owner.clone(), call.name.clone(), operands.len());
    if let Some(handler) = HANDLERS.get(&identity) {
        return handler(&operands, ctx);
    }

    let name = format!("{}::{}/{}", call.owner, call.name, operands.len());
    let mut error = Error::new(
        ErrorKind::Unsupported,
        Reason::NotFound {
            name,
            namespace: "method".to_string(),
        },
    );
    if call.owner == "String"
        && matches!(call.name.as_str(), "contains" | "starts_with" | "ends_with")
    {
        error = error
            .with_help("string matching cannot run in filter context; use Elastic::prefix or Elastic::regexp");
    }
    Err(error.into())
}

/// Set membership. Which side is the document field decides the shape:
/// a constant sequence against a field member becomes `terms` (null in the
/// sequence adds a `missing` alternative); a sequence-typed field against a
/// constant item becomes a single `term`.
fn contains(operands: &[&Expr], ctx: &Context) -> Result<Criteria> {
    let (collection, item) = (operands[0], operands[1]);

    if let (Some(values), Some(member)) = (seq_operand(collection), member_operand(item)) {
        let field = field_of(member, ctx)?;
        let had_null = values.iter().any(|v| v.is_null());
        let formatted = values
            .iter()
            .filter(|v| !v.is_null())
            .map(|v| ctx.mapping.format_value(member, v))
            .try_collect()?;
        let terms = Terms::build(field.clone(), formatted, TermsExecution::Plain);
        return Ok(if had_null {
            Or::combine(vec![terms, Missing::new(field)])
        } else {
            terms
        });
    }

    if let (Some(member), Some(value)) = (member_operand(collection), literal_operand(item)) {
        let field = field_of(member, ctx)?;
        let value = ctx.mapping.format_value(member, value)?;
        return Ok(Criteria::Term(Term { field, value }));
    }

    Err(operand_error(
        "contains",
        "a constant sequence and a document field",
        operands,
    ))
}

fn contains_any(operands: &[&Expr], ctx: &Context) -> Result<Criteria> {
    terms_set(operands, TermsExecution::Bool, "contains_any", ctx)
}

fn contains_all(operands: &[&Expr], ctx: &Context) -> Result<Criteria> {
    terms_set(operands, TermsExecution::And, "contains_all", ctx)
}

// Order-agnostic: the field member and the literal sequence may arrive in
// either position.
fn terms_set(
    operands: &[&Expr],
    execution: TermsExecution,
    who: &str,
    ctx: &Context,
) -> Result<Criteria> {
    let pair = match (member_operand(operands[0]), seq_operand(operands[1])) {
        (Some(member), Some(values)) => Some((member, values)),
        _ => match (member_operand(operands[1]), seq_operand(operands[0])) {
            (Some(member), Some(values)) => Some((member, values)),
            _ => None,
        },
    };
    let Some((member, values)) = pair else {
        return Err(operand_error(
            who,
            "a document field and a constant sequence",
            operands,
        ));
    };
    if values.iter().any(|v| v.is_null()) {
        return Err(Error::simple(
            ErrorKind::Argument,
            format!("the terms of `{who}` must not contain null"),
        )
        .into());
    }
    let field = field_of(member, ctx)?;
    let formatted = values
        .iter()
        .map(|v| ctx.mapping.format_value(member, v))
        .try_collect()?;
    Ok(Terms::build(field, formatted, execution))
}

fn regexp(operands: &[&Expr], ctx: &Context) -> Result<Criteria> {
    let (member, pattern) = member_and_string(operands, "regexp")?;
    Ok(Criteria::Regexp(Regexp {
        field: field_of(member, ctx)?,
        pattern,
    }))
}

fn prefix(operands: &[&Expr], ctx: &Context) -> Result<Criteria> {
    let (member, prefix) = member_and_string(operands, "prefix")?;
    Ok(Criteria::Prefix(Prefix {
        field: field_of(member, ctx)?,
        prefix,
    }))
}

fn is_some(operands: &[&Expr], ctx: &Context) -> Result<Criteria> {
    let Some(member) = member_operand(operands[0]) else {
        return Err(operand_error("is_some", "a document field", operands));
    };
    // a presence test on a member the host declared non-nullable is a bug in
    // the supplied tree, not a translatable predicate
    if !nullable_member(operands[0]) {
        return Err(Error::simple(
            ErrorKind::Argument,
            format!("member `{}` is not declared nullable", member.name),
        )
        .into());
    }
    Ok(Exists::new(field_of(member, ctx)?))
}

fn seq_operand(expr: &Expr) -> Option<&[Literal]> {
    match &strip_operand(expr).kind {
        ExprKind::Literal(Literal::Seq(items)) => Some(items.as_slice()),
        _ => None,
    }
}

fn member_and_string<'a>(operands: &[&'a Expr], who: &str) -> Result<(&'a Member, String)> {
    match (
        member_operand(operands[0]),
        literal_operand(operands[1]),
    ) {
        (Some(member), Some(Literal::String(s))) => Ok((member, s.clone())),
        _ => Err(operand_error(
            who,
            "a document field and a constant string",
            operands,
        )),
    }
}

fn operand_error(who: &str, expected: &str, operands: &[&Expr]) -> anyhow::Error {
    Error::new(
        ErrorKind::Unsupported,
        Reason::Expected {
            who: Some(who.to_string()),
            expected: expected.to_string(),
            found: operands
                .iter()
                .map(|o| format!("`{}`", o.kind.as_ref()))
                .join(" and "),
        },
    )
    .into()
}
