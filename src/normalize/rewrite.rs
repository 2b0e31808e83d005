//! Boolean rewriting: double negations, De Morgan push-down and constant
//! absorption through the logical connectives.

use crate::ast::{BinOp, BinaryExpr, CastExpr, Expr, ExprKind, Lambda, Literal, UnOp, UnaryExpr};

pub(super) fn rewrite_boolean(expr: Expr) -> Expr {
    let kind = match expr.kind {
        ExprKind::Unary(UnaryExpr {
            op: UnOp::Not,
            expr,
        }) => return negate(rewrite_boolean(*expr)),
        ExprKind::Binary(BinaryExpr { left, op, right }) => {
            let left = rewrite_boolean(*left);
            let right = rewrite_boolean(*right);
            match op {
                BinOp::And | BinOp::Or => return absorb(left, op, right),
                op => ExprKind::Binary(BinaryExpr {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                }),
            }
        }
        ExprKind::Unary(UnaryExpr { op, expr }) => ExprKind::Unary(UnaryExpr {
            op,
            expr: Box::new(rewrite_boolean(*expr)),
        }),
        ExprKind::Cast(CastExpr { expr, ty }) => ExprKind::Cast(CastExpr {
            expr: Box::new(rewrite_boolean(*expr)),
            ty,
        }),
        ExprKind::Lambda(Lambda { param, body }) => ExprKind::Lambda(Lambda {
            param,
            body: Box::new(rewrite_boolean(*body)),
        }),
        // members, literals and method arguments are value positions
        kind => kind,
    };
    Expr::new(kind)
}

fn negate(expr: Expr) -> Expr {
    match expr.kind {
        ExprKind::Literal(Literal::Boolean(b)) => Expr::literal(!b),
        ExprKind::Unary(UnaryExpr {
            op: UnOp::Not,
            expr,
        }) => *expr,
        ExprKind::Binary(BinaryExpr {
            left,
            op: BinOp::And,
            right,
        }) => absorb(negate(*left), BinOp::Or, negate(*right)),
        ExprKind::Binary(BinaryExpr {
            left,
            op: BinOp::Or,
            right,
        }) => absorb(negate(*left), BinOp::And, negate(*right)),
        kind => Expr::unary(UnOp::Not, Expr::new(kind)),
    }
}

// Constant absorption. The surviving operand keeps its position; the
// connectives are short-circuiting, so operands are pure by contract.
fn absorb(left: Expr, op: BinOp, right: Expr) -> Expr {
    match (boolean(&left), op, boolean(&right)) {
        (Some(true), BinOp::And, _) => right,
        (Some(false), BinOp::And, _) => Expr::literal(false),
        (_, BinOp::And, Some(true)) => left,
        (_, BinOp::And, Some(false)) => Expr::literal(false),
        (Some(true), BinOp::Or, _) => Expr::literal(true),
        (Some(false), BinOp::Or, _) => right,
        (_, BinOp::Or, Some(true)) => Expr::literal(true),
        (_, BinOp::Or, Some(false)) => left,
        _ => Expr::binary(left, op, right),
    }
}

fn boolean(expr: &Expr) -> Option<bool> {
    match &expr.kind {
        ExprKind::Literal(Literal::Boolean(b)) => Some(*b),
        _ => None,
    }
}
