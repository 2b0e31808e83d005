//! A very simple benchmark for a single representative predicate, basically
//! copied from the [criterion quick
//! start](https://github.com/bheisler/criterion.rs#quickstart).

use criterion::{criterion_group, criterion_main, Criterion};
use elinq_compiler::ast::{BinOp, Expr, Lambda, Ty, TyKind};
use elinq_compiler::mapping::ElasticMapping;
use elinq_compiler::translate;

fn predicate() -> Lambda {
    let cost = Expr::member(Expr::param("r"), "Robot", "Cost", Ty::new(TyKind::Float));
    let name = Expr::member(Expr::param("r"), "Robot", "Name", Ty::new(TyKind::String));
    let body = Expr::binary(
        Expr::binary(
            Expr::binary(cost.clone(), BinOp::Gt, Expr::literal(710.956)),
            BinOp::And,
            Expr::binary(cost, BinOp::Lt, Expr::literal(3428.9)),
        ),
        BinOp::And,
        Expr::binary(name, BinOp::Eq, Expr::literal("Marvin")),
    );
    Lambda::new("r", body)
}

fn criterion_benchmark(c: &mut Criterion) {
    let mapping = ElasticMapping::default();
    c.bench_function("range-and-term-predicate", |b| {
        b.iter(|| translate(predicate(), &mapping, "Robot").unwrap())
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
