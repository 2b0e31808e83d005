/// A trait to "fold" an expression tree (similar to a visitor), so we can
/// transitively apply some logic to a whole tree by just defining how we want
/// to handle each type.
use anyhow::Result;
use itertools::Itertools;

use super::*;

// Fold pattern:
// - https://rust-unofficial.github.io/patterns/patterns/creational/fold.html
//
// For some functions, we want to call a default impl, because copying &
// pasting everything apart from a specific match is lots of repetition. So
// we define a function outside the trait, by default call it, and let
// implementors override the default while calling the function directly for
// some cases. Ref https://stackoverflow.com/a/66077767/3064736
pub trait AstFold {
    fn fold_expr(&mut self, mut expr: Expr) -> Result<Expr> {
        expr.kind = self.fold_expr_kind(expr.kind)?;
        Ok(expr)
    }
    fn fold_expr_kind(&mut self, kind: ExprKind) -> Result<ExprKind> {
        fold_expr_kind(self, kind)
    }
    fn fold_exprs(&mut self, exprs: Vec<Expr>) -> Result<Vec<Expr>> {
        exprs.into_iter().map(|e| self.fold_expr(e)).try_collect()
    }
    fn fold_member(&mut self, member: Member) -> Result<Member> {
        fold_member(self, member)
    }
    fn fold_method_call(&mut self, call: MethodCall) -> Result<MethodCall> {
        fold_method_call(self, call)
    }
    fn fold_lambda(&mut self, lambda: Lambda) -> Result<Lambda> {
        fold_lambda(self, lambda)
    }
}

pub fn fold_expr_kind<F: ?Sized + AstFold>(fold: &mut F, kind: ExprKind) -> Result<ExprKind> {
    Ok(match kind {
        ExprKind::Literal(_) | ExprKind::Parameter(_) | ExprKind::Thunk(_) => kind,
        ExprKind::Member(member) => ExprKind::Member(fold.fold_member(member)?),
        ExprKind::Binary(BinaryExpr { left, op, right }) => ExprKind::Binary(BinaryExpr {
            left: Box::new(fold.fold_expr(*left)?),
            op,
            right: Box::new(fold.fold_expr(*right)?),
        }),
        ExprKind::Unary(UnaryExpr { op, expr }) => ExprKind::Unary(UnaryExpr {
            op,
            expr: Box::new(fold.fold_expr(*expr)?),
        }),
        ExprKind::Cast(CastExpr { expr, ty }) => ExprKind::Cast(CastExpr {
            expr: Box::new(fold.fold_expr(*expr)?),
            ty,
        }),
        ExprKind::MethodCall(call) => ExprKind::MethodCall(fold.fold_method_call(call)?),
        ExprKind::Lambda(lambda) => ExprKind::Lambda(fold.fold_lambda(lambda)?),
        ExprKind::Array(items) => ExprKind::Array(fold.fold_exprs(items)?),
    })
}

pub fn fold_member<F: ?Sized + AstFold>(fold: &mut F, member: Member) -> Result<Member> {
    let Member {
        target,
        owner,
        name,
        ty,
    } = member;
    Ok(Member {
        target: target
            .map(|t| fold.fold_expr(*t))
            .transpose()?
            .map(Box::new),
        owner,
        name,
        ty,
    })
}

pub fn fold_method_call<F: ?Sized + AstFold>(fold: &mut F, call: MethodCall) -> Result<MethodCall> {
    let MethodCall {
        receiver,
        owner,
        name,
        args,
    } = call;
    Ok(MethodCall {
        receiver: receiver
            .map(|r| fold.fold_expr(*r))
            .transpose()?
            .map(Box::new),
        owner,
        name,
        args: fold.fold_exprs(args)?,
    })
}

pub fn fold_lambda<F: ?Sized + AstFold>(fold: &mut F, lambda: Lambda) -> Result<Lambda> {
    Ok(Lambda {
        param: lambda.param,
        body: Box::new(fold.fold_expr(*lambda.body)?),
    })
}
