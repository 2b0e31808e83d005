//! Smart combinators. Every constructor here returns criteria already in
//! canonical form, so no separate simplification pass runs afterwards.

use std::cmp::Ordering;
use std::mem;

use serde_json::Value;

use super::{And, Criteria, Exists, Missing, Not, Or, Range, RangeOp, Term, Terms, TermsExecution};
use crate::utils::OrMap;

impl Terms {
    /// Build a set-membership criteria from already-formatted values.
    ///
    /// Values are deduped in insertion order. A single value degenerates to
    /// [Term]; an empty set can match nothing.
    pub fn build(
        field: impl Into<String>,
        values: Vec<Value>,
        execution: TermsExecution,
    ) -> Criteria {
        let field = field.into();
        let mut distinct: Vec<Value> = Vec::with_capacity(values.len());
        for value in values {
            if !distinct.contains(&value) {
                distinct.push(value);
            }
        }
        match distinct.len() {
            0 => Criteria::MatchNone,
            1 => Criteria::Term(Term {
                field,
                value: distinct.remove(0),
            }),
            _ => Criteria::Terms(Terms {
                field,
                values: distinct,
                execution,
            }),
        }
    }

    fn absorb(&mut self, other: Terms) {
        for value in other.values {
            if !self.values.contains(&value) {
                self.values.push(value);
            }
        }
        if self.execution != other.execution {
            self.execution = TermsExecution::Plain;
        }
    }
}

impl Range {
    pub fn new(field: impl Into<String>, op: RangeOp, value: Value) -> Self {
        let mut range = Range {
            field: field.into(),
            gt: None,
            gte: None,
            lt: None,
            lte: None,
        };
        match op {
            RangeOp::Gt => range.gt = Some(value),
            RangeOp::Gte => range.gte = Some(value),
            RangeOp::Lt => range.lt = Some(value),
            RangeOp::Lte => range.lte = Some(value),
        }
        range
    }

    /// Union of bounds; a repeated comparison keeps the tighter value.
    fn merge(&mut self, other: Range) {
        self.gt = mem::take(&mut self.gt).or_map(other.gt, tighter_lower);
        self.gte = mem::take(&mut self.gte).or_map(other.gte, tighter_lower);
        self.lt = mem::take(&mut self.lt).or_map(other.lt, tighter_upper);
        self.lte = mem::take(&mut self.lte).or_map(other.lte, tighter_upper);
    }
}

fn tighter_lower(a: Value, b: Value) -> Value {
    match compare(&a, &b) {
        Some(Ordering::Less) => b,
        _ => a,
    }
}

fn tighter_upper(a: Value, b: Value) -> Value {
    match compare(&a, &b) {
        Some(Ordering::Greater) => b,
        _ => a,
    }
}

// Numbers compare numerically, strings lexically. Mixed kinds are not
// comparable; the bound already present wins.
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a.as_f64(), b.as_f64()) {
        (Some(a), Some(b)) => a.partial_cmp(&b),
        _ => match (a.as_str(), b.as_str()) {
            (Some(a), Some(b)) => Some(a.cmp(b)),
            _ => None,
        },
    }
}

impl Not {
    pub fn create(criteria: Criteria) -> Criteria {
        match criteria {
            Criteria::Not(inner) => *inner.criteria,
            Criteria::MatchAll => Criteria::MatchNone,
            Criteria::MatchNone => Criteria::MatchAll,
            Criteria::Missing(missing) => Exists::new(missing.field),
            Criteria::Exists(exists) => Missing::new(exists.field),
            criteria => Criteria::Not(Not {
                criteria: Box::new(criteria),
            }),
        }
    }
}

impl And {
    pub fn combine(criteria: Vec<Criteria>) -> Criteria {
        let mut flat = Vec::new();
        for criteria in criteria {
            match criteria {
                Criteria::And(inner) => flat.extend(inner.criteria),
                Criteria::MatchAll => {}
                Criteria::MatchNone => return Criteria::MatchNone,
                other => flat.push(other),
            }
        }

        let mut children: Vec<Criteria> = Vec::with_capacity(flat.len());
        for criteria in flat {
            match criteria {
                Criteria::Range(range) => {
                    let existing = children.iter().position(
                        |child| matches!(child, Criteria::Range(r) if r.field == range.field),
                    );
                    match existing {
                        Some(i) => {
                            if let Criteria::Range(r) = &mut children[i] {
                                r.merge(range);
                            }
                        }
                        None => children.push(Criteria::Range(range)),
                    }
                }
                criteria => {
                    if !children.contains(&criteria) {
                        children.push(criteria);
                    }
                }
            }
        }

        match children.len() {
            0 => Criteria::MatchAll,
            1 => children.remove(0),
            _ => Criteria::And(And { criteria: children }),
        }
    }
}

impl Or {
    pub fn combine(criteria: Vec<Criteria>) -> Criteria {
        let mut flat = Vec::new();
        for criteria in criteria {
            match criteria {
                Criteria::Or(inner) => flat.extend(inner.criteria),
                Criteria::MatchNone => {}
                Criteria::MatchAll => return Criteria::MatchAll,
                other => flat.push(other),
            }
        }

        let mut children: Vec<Criteria> = Vec::with_capacity(flat.len());
        for criteria in flat {
            match criteria {
                Criteria::Terms(terms) if terms.execution.admits_disjunction() => {
                    let existing = children.iter().position(|child| {
                        matches!(child, Criteria::Terms(t)
                            if t.field == terms.field && t.execution.admits_disjunction())
                    });
                    match existing {
                        Some(i) => {
                            if let Criteria::Terms(t) = &mut children[i] {
                                t.absorb(terms);
                            }
                        }
                        None => children.push(Criteria::Terms(terms)),
                    }
                }
                criteria => {
                    if !children.contains(&criteria) {
                        children.push(criteria);
                    }
                }
            }
        }

        match children.len() {
            0 => Criteria::MatchNone,
            1 => children.remove(0),
            _ => Criteria::Or(Or { criteria: children }),
        }
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    fn term(field: &str, value: &str) -> Criteria {
        Term::new(field, value)
    }

    fn terms(field: &str, values: &[&str]) -> Criteria {
        Criteria::Terms(Terms {
            field: field.to_string(),
            values: values.iter().map(|v| json!(v)).collect(),
            execution: TermsExecution::Plain,
        })
    }

    #[test]
    fn not_of_not_is_identity() {
        let inner = term("name", "marvin");
        assert_eq!(Not::create(Not::create(inner.clone())), inner);
    }

    #[test]
    fn not_swaps_constants_and_null_tests() {
        assert_eq!(Not::create(Criteria::MatchAll), Criteria::MatchNone);
        assert_eq!(Not::create(Criteria::MatchNone), Criteria::MatchAll);
        assert_eq!(Not::create(Missing::new("name")), Exists::new("name"));
        assert_eq!(Not::create(Exists::new("name")), Missing::new("name"));
    }

    #[test]
    fn and_flattens_nested_ands() {
        let nested = And::combine(vec![term("a", "1"), term("b", "2")]);
        let combined = And::combine(vec![nested, term("c", "3")]);

        let and = combined.into_and().unwrap();
        assert_eq!(and.criteria.len(), 3);
        assert!(and.criteria.iter().all(|c| c.as_and().is_none()));
    }

    #[test]
    fn and_absorbs_constants() {
        assert_eq!(
            And::combine(vec![term("a", "1"), Criteria::MatchNone]),
            Criteria::MatchNone
        );
        assert_eq!(
            And::combine(vec![Criteria::MatchAll, term("a", "1")]),
            term("a", "1")
        );
    }

    #[test]
    fn and_of_single_child_is_that_child() {
        assert_eq!(And::combine(vec![term("a", "1")]), term("a", "1"));
    }

    #[test]
    fn and_of_nothing_is_match_all() {
        assert_eq!(And::combine(vec![]), Criteria::MatchAll);
        assert_eq!(
            And::combine(vec![Criteria::MatchAll, Criteria::MatchAll]),
            Criteria::MatchAll
        );
    }

    #[test]
    fn and_dedupes_identical_children() {
        assert_eq!(
            And::combine(vec![term("a", "1"), term("a", "1")]),
            term("a", "1")
        );
    }

    #[test]
    fn and_merges_ranges_over_the_same_field() {
        let lower = Criteria::Range(Range::new("cost", RangeOp::Gt, json!(710.956)));
        let upper = Criteria::Range(Range::new("cost", RangeOp::Lt, json!(3428.9)));

        let combined = And::combine(vec![lower, upper]);
        let range = combined.into_range().unwrap();
        assert_eq!(range.gt, Some(json!(710.956)));
        assert_eq!(range.lt, Some(json!(3428.9)));
        assert_eq!(range.gte, None);
        assert_eq!(range.lte, None);
    }

    #[test]
    fn range_merge_tightens_repeated_comparisons() {
        let loose = Criteria::Range(Range::new("cost", RangeOp::Lt, json!(100)));
        let tight = Criteria::Range(Range::new("cost", RangeOp::Lt, json!(10)));
        let floor = Criteria::Range(Range::new("cost", RangeOp::Gt, json!(1)));
        let higher_floor = Criteria::Range(Range::new("cost", RangeOp::Gt, json!(5)));

        let combined = And::combine(vec![loose, tight, floor, higher_floor]);
        let range = combined.into_range().unwrap();
        assert_eq!(range.lt, Some(json!(10)));
        assert_eq!(range.gt, Some(json!(5)));
    }

    #[test]
    fn or_absorbs_constants() {
        assert_eq!(
            Or::combine(vec![term("a", "1"), Criteria::MatchAll]),
            Criteria::MatchAll
        );
        assert_eq!(
            Or::combine(vec![Criteria::MatchNone, term("a", "1")]),
            term("a", "1")
        );
        assert_eq!(Or::combine(vec![]), Criteria::MatchNone);
    }

    #[test]
    fn or_flattens_nested_ors() {
        let nested = Or::combine(vec![term("a", "1"), term("b", "2")]);
        let combined = Or::combine(vec![nested, term("c", "3")]);

        let or = combined.into_or().unwrap();
        assert_eq!(or.criteria.len(), 3);
        assert!(or.criteria.iter().all(|c| c.as_or().is_none()));
    }

    #[test]
    fn or_coalesces_terms_over_the_same_field() {
        let combined = Or::combine(vec![
            terms("name", &["robbie", "ig-88"]),
            terms("name", &["ig-88", "hal"]),
            terms("zone", &["north", "south"]),
        ]);

        let or = combined.into_or().unwrap();
        assert_eq!(or.criteria.len(), 2);
        let name_terms = or.criteria[0].as_terms().unwrap();
        assert_eq!(
            name_terms.values,
            vec![json!("robbie"), json!("ig-88"), json!("hal")]
        );
    }

    #[test]
    fn or_keeps_conjunctive_terms_apart() {
        let all = Criteria::Terms(Terms {
            field: "tags".to_string(),
            values: vec![json!("a"), json!("b")],
            execution: TermsExecution::And,
        });
        let any = Criteria::Terms(Terms {
            field: "tags".to_string(),
            values: vec![json!("c"), json!("d")],
            execution: TermsExecution::Bool,
        });

        let or = Or::combine(vec![all.clone(), any.clone()]).into_or().unwrap();
        assert_eq!(or.criteria, vec![all, any]);
    }

    #[test]
    fn terms_build_degenerates() {
        assert_eq!(
            Terms::build("name", vec![], TermsExecution::Plain),
            Criteria::MatchNone
        );
        assert_eq!(
            Terms::build("name", vec![json!("marvin")], TermsExecution::Plain),
            term("name", "marvin")
        );
        assert_eq!(
            Terms::build(
                "name",
                vec![json!("a"), json!("a"), json!("b")],
                TermsExecution::Plain,
            ),
            terms("name", &["a", "b"])
        );
    }
}
