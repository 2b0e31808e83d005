//! Expression normalization: partial evaluation of closed-over values and
//! boolean rewriting, run once before translation.

mod eval;
mod rewrite;

use crate::ast::{AstFold, Lambda};
use crate::error::Result;

pub(crate) fn normalize(predicate: Lambda) -> Result<Lambda> {
    let Lambda { param, body } = predicate;
    let body = eval::Evaluator.fold_expr(*body)?;
    let body = rewrite::rewrite_boolean(body);
    log::debug!("normalized predicate body: {body:?}");
    Ok(Lambda {
        param,
        body: Box::new(body),
    })
}
