//! Simple tests for "this predicate creates this request body" go here.

use insta::assert_snapshot;
use serde_json::{json, Value};
use similar_asserts::assert_eq;

use crate::ast::{BinOp, Expr, Lambda, Literal, Member, Ty, TyKind, UnOp};
use crate::criteria::{And, Criteria, Exists};
use crate::error::{ErrorKind, ErrorMessages, Result};
use crate::mapping::{ElasticMapping, Mapping, MetadataFields, DOCUMENT_METADATA};
use crate::search::SearchRequest;
use crate::{criteria_of_predicate, json_of_request, request_of_criteria, translate};

fn robot() -> Expr {
    Expr::param("r")
}

fn member(name: &str, ty: Ty) -> Expr {
    Expr::member(robot(), "Robot", name, ty)
}

fn name() -> Expr {
    member("Name", Ty::new(TyKind::String))
}

fn cost() -> Expr {
    member("Cost", Ty::new(TyKind::Float))
}

fn zone() -> Expr {
    member("Zone", Ty::nullable(TyKind::Int))
}

fn aliases() -> Expr {
    member("Aliases", Ty::new(TyKind::Seq))
}

fn active() -> Expr {
    member("Active", Ty::new(TyKind::Bool))
}

fn pred(body: Expr) -> Lambda {
    Lambda::new("r", body)
}

fn translate_robot(body: Expr) -> Result<SearchRequest, ErrorMessages> {
    translate(pred(body), &ElasticMapping::default(), "Robot")
}

fn body_of(body: Expr) -> Value {
    let request = translate_robot(body).unwrap();
    serde_json::to_value(&request).unwrap()
}

#[test]
fn term_for_string_equality() {
    let request = translate_robot(Expr::binary(name(), BinOp::Eq, Expr::literal("Marvin"))).unwrap();

    assert_eq!(request.doc_type, "robots");
    assert_eq!(request.query, None);
    assert_eq!(
        serde_json::to_value(&request).unwrap(),
        json!({"filter": {"term": {"name": "marvin"}}})
    );
}

#[test]
fn range_comparisons_merge_into_one_node() {
    let body = Expr::binary(
        Expr::binary(cost(), BinOp::Gt, Expr::literal(710.956)),
        BinOp::And,
        Expr::binary(cost(), BinOp::Lt, Expr::literal(3428.9)),
    );
    assert_eq!(
        body_of(body),
        json!({"filter": {"range": {"cost": {"gt": 710.956, "lt": 3428.9}}}})
    );
}

#[test]
fn constant_on_the_left_inverts_the_comparison() {
    // 10 > cost is cost < 10
    let body = Expr::binary(Expr::literal(10.0), BinOp::Gt, cost());
    assert_eq!(
        body_of(body),
        json!({"filter": {"range": {"cost": {"lt": 10.0}}}})
    );
}

#[test]
fn contains_over_a_sequence_with_null_adds_missing() {
    let collection = Expr::array(vec![
        Expr::literal("Robbie"),
        Expr::null(),
        Expr::literal("IG-88"),
    ]);
    let body = Expr::call(Some(collection), "Seq", "contains", vec![name()]);

    assert_eq!(
        body_of(body),
        json!({"filter": {"or": {"filters": [
            {"terms": {"name": ["robbie", "ig-88"]}},
            {"missing": {"field": "name"}},
        ]}}})
    );
}

#[test]
fn contains_on_a_sequence_member_is_a_term() {
    let body = Expr::call(Some(aliases()), "Seq", "contains", vec![Expr::literal("HAL")]);
    assert_eq!(
        body_of(body),
        json!({"filter": {"term": {"aliases": "hal"}}})
    );
}

#[test]
fn negated_null_test_becomes_exists() {
    let body = Expr::unary(
        UnOp::Not,
        Expr::binary(name(), BinOp::Eq, Expr::null()),
    );
    assert_eq!(body_of(body), json!({"filter": {"exists": {"field": "name"}}}));
}

#[test]
fn null_tests_translate_to_missing_and_exists() {
    let body = Expr::binary(name(), BinOp::Eq, Expr::null());
    assert_eq!(body_of(body), json!({"filter": {"missing": {"field": "name"}}}));

    let body = Expr::binary(name(), BinOp::Ne, Expr::null());
    assert_eq!(body_of(body), json!({"filter": {"exists": {"field": "name"}}}));
}

#[test]
fn not_equal_wraps_the_term() {
    let body = Expr::binary(name(), BinOp::Ne, Expr::literal("Marvin"));
    assert_eq!(
        body_of(body),
        json!({"filter": {"not": {"filter": {"term": {"name": "marvin"}}}}})
    );
}

#[test]
fn bare_boolean_members_match_true() {
    assert_eq!(body_of(active()), json!({"filter": {"term": {"active": true}}}));

    let body = Expr::binary(active(), BinOp::Eq, Expr::literal(false));
    assert_eq!(
        body_of(body),
        json!({"filter": {"not": {"filter": {"term": {"active": true}}}}})
    );

    let body = Expr::binary(Expr::literal(true), BinOp::Eq, active());
    assert_eq!(body_of(body), json!({"filter": {"term": {"active": true}}}));
}

#[test]
fn nullable_members_translate_through_option_helpers() {
    let body = Expr::call(Some(zone()), "Option", "is_some", vec![]);
    assert_eq!(body_of(body), json!({"filter": {"exists": {"field": "zone"}}}));

    let body = Expr::unary(
        UnOp::Not,
        Expr::call(Some(zone()), "Option", "is_some", vec![]),
    );
    assert_eq!(body_of(body), json!({"filter": {"missing": {"field": "zone"}}}));

    // unwrapping inside an operand is transparent
    let unwrapped = Expr::call(Some(zone()), "Option", "value", vec![]);
    let body = Expr::binary(unwrapped, BinOp::Gt, Expr::literal(5i64));
    assert_eq!(
        body_of(body),
        json!({"filter": {"range": {"zone": {"gt": 5}}}})
    );
}

#[test]
fn option_helpers_require_nullable_members() {
    let body = Expr::call(Some(cost()), "Option", "is_some", vec![]);
    let error = translate_robot(body).unwrap_err();
    assert_eq!(error.inner[0].kind, ErrorKind::Argument);

    // an unwrap of a non-nullable member is not recognized as anything
    let unwrapped = Expr::call(Some(cost()), "Option", "value", vec![]);
    let body = Expr::binary(unwrapped, BinOp::Gt, Expr::literal(5.0));
    let error = translate_robot(body).unwrap_err();
    assert_eq!(error.inner[0].kind, ErrorKind::Unsupported);
}

#[test]
fn narrowing_casts_land_in_the_cast_domain() {
    // an explicit integer cast over a fractional constant compares as an integer
    let body = Expr::binary(
        zone(),
        BinOp::Eq,
        Expr::cast(Expr::literal(7.9), TyKind::Int),
    );
    assert_eq!(body_of(body), json!({"filter": {"term": {"zone": 7}}}));
}

#[test]
fn equals_methods_behave_like_equality() {
    let body = Expr::call(Some(name()), "String", "equals", vec![Expr::literal("Marvin")]);
    assert_eq!(body_of(body), json!({"filter": {"term": {"name": "marvin"}}}));

    // the static two-argument spelling
    let body = Expr::call(
        None,
        "Object",
        "equals",
        vec![name(), Expr::literal("Marvin")],
    );
    assert_eq!(body_of(body), json!({"filter": {"term": {"name": "marvin"}}}));
}

#[test]
fn elastic_helpers_translate_to_terms_modes() {
    let values = Expr::array(vec![Expr::literal("a"), Expr::literal("b")]);
    let body = Expr::call(None, "Elastic", "contains_any", vec![aliases(), values]);
    assert_eq!(
        body_of(body),
        json!({"filter": {"terms": {"aliases": ["a", "b"], "execution": "bool"}}})
    );

    let values = Expr::array(vec![Expr::literal("a"), Expr::literal("b")]);
    // order-agnostic argument positions
    let body = Expr::call(None, "Elastic", "contains_all", vec![values, aliases()]);
    assert_eq!(
        body_of(body),
        json!({"filter": {"terms": {"aliases": ["a", "b"], "execution": "and"}}})
    );
}

#[test]
fn elastic_text_helpers_translate_verbatim() {
    let body = Expr::call(None, "Elastic", "prefix", vec![name(), Expr::literal("Mar")]);
    assert_eq!(body_of(body), json!({"filter": {"prefix": {"name": "Mar"}}}));

    let body = Expr::call(
        None,
        "Elastic",
        "regexp",
        vec![name(), Expr::literal("mar.*")],
    );
    assert_eq!(body_of(body), json!({"filter": {"regexp": {"name": "mar.*"}}}));
}

#[test]
fn closed_over_values_fold_before_translation() {
    let captured = "Marvin".to_string();
    let thunk = Expr::thunk(move || Ok(Literal::String(captured.clone())));
    let body = Expr::binary(name(), BinOp::Eq, thunk);
    assert_eq!(body_of(body), json!({"filter": {"term": {"name": "marvin"}}}));
}

#[test]
fn nested_chains_walk_through_the_mapping() {
    let stats = member("Stats", Ty::new(TyKind::Record));
    let price = Expr::member(stats, "Stats", "InvoicePrice", Ty::new(TyKind::Float));
    let body = Expr::binary(price, BinOp::Gte, Expr::literal(100.0));
    assert_eq!(
        body_of(body),
        json!({"filter": {"range": {"stats.invoicePrice": {"gte": 100.0}}}})
    );
}

#[test]
fn wrapped_mappings_prefix_fields_and_select_the_type() {
    let mapping = ElasticMapping::default().wrapped("doc", Some("type"));
    let body = Expr::binary(name(), BinOp::Eq, Expr::literal("Marvin"));
    let request = translate(pred(body), &mapping, "Robot").unwrap();

    assert_eq!(
        serde_json::to_value(&request).unwrap(),
        json!({"filter": {"and": {"filters": [
            {"term": {"doc.name": "marvin"}},
            {"term": {"doc.type": "robots"}},
        ]}}})
    );
}

struct DocIdMapping(ElasticMapping);

impl Mapping for DocIdMapping {
    fn field_segment(&self, member: &Member) -> String {
        self.0.field_segment(member)
    }
    fn document_type(&self, record_type: &str) -> String {
        self.0.document_type(record_type)
    }
    fn prefix(&self, record_type: &str) -> Option<String> {
        self.0.prefix(record_type)
    }
    fn format_value(&self, member: &Member, value: &Literal) -> Result<Value> {
        self.0.format_value(member, value)
    }
    fn type_selection(&self, _doc_type: &str) -> Option<Criteria> {
        Some(Exists::new("doc.id"))
    }
}

#[test]
fn constant_predicate_falls_back_to_the_type_selection() {
    // cost < 10 || true || cost > 1 collapses to the constant
    let body = Expr::binary(
        Expr::binary(
            Expr::binary(cost(), BinOp::Lt, Expr::literal(10.0)),
            BinOp::Or,
            Expr::literal(true),
        ),
        BinOp::Or,
        Expr::binary(cost(), BinOp::Gt, Expr::literal(1.0)),
    );
    let mapping = DocIdMapping(ElasticMapping::default());
    let request = translate(pred(body), &mapping, "Robot").unwrap();

    assert_eq!(request.query, None);
    assert_eq!(
        serde_json::to_value(&request).unwrap(),
        json!({"filter": {"exists": {"field": "doc.id"}}})
    );
}

#[test]
fn constant_true_without_type_selection_has_no_filter() {
    let request = translate_robot(Expr::literal(true)).unwrap();
    assert_eq!(request.filter, None);
    assert_eq!(json_of_request(&request).unwrap(), "{}");
}

#[test]
fn constant_false_matches_nothing() {
    let request = translate_robot(Expr::literal(false)).unwrap();
    assert_eq!(
        serde_json::to_value(&request).unwrap(),
        json!({"filter": {"match_none": {}}})
    );
}

#[test]
fn string_contains_is_rejected() {
    let body = Expr::call(Some(name()), "String", "contains", vec![Expr::literal("bo")]);
    let error = translate_robot(body).unwrap_err();

    assert_eq!(error.inner[0].kind, ErrorKind::Unsupported);
    assert_snapshot!(error.to_string(), @r###"
    method `String::contains/2` not found
    help: string matching cannot run in filter context; use Elastic::prefix or Elastic::regexp
    "###);
}

#[test]
fn comparing_two_fields_is_rejected() {
    let body = Expr::binary(name(), BinOp::Eq, aliases());
    let error = translate_robot(body).unwrap_err();

    assert_eq!(error.inner[0].kind, ErrorKind::Unsupported);
    assert_snapshot!(error.to_string(), @"comparing two document fields is not supported");
}

#[test]
fn foreign_roots_are_rejected() {
    let foreign = Expr::member(Expr::param("other"), "Robot", "Name", Ty::new(TyKind::String));
    let body = Expr::binary(foreign, BinOp::Eq, Expr::literal("Marvin"));
    let error = translate_robot(body).unwrap_err();
    assert_eq!(error.inner[0].kind, ErrorKind::Unsupported);
}

#[test]
fn failed_thunks_surface_as_evaluation_errors() {
    let thunk = Expr::thunk(|| Err(anyhow::anyhow!("lost the capture")));
    let body = Expr::binary(name(), BinOp::Eq, thunk);
    let error = translate_robot(body).unwrap_err();
    assert_eq!(error.inner[0].kind, ErrorKind::Evaluation);
}

#[test]
fn metadata_members_address_underscore_fields() {
    let mapping = MetadataFields::new(ElasticMapping::default());
    let id = Expr::member(robot(), DOCUMENT_METADATA, "Id", Ty::new(TyKind::String));
    let body = Expr::binary(id, BinOp::Eq, Expr::literal("a-1"));
    let request = translate(pred(body), &mapping, "Robot").unwrap();
    assert_eq!(
        serde_json::to_value(&request).unwrap(),
        json!({"filter": {"term": {"_id": "a-1"}}})
    );
}

#[test]
fn translation_is_deterministic_and_idempotent() {
    let build = || {
        Expr::binary(
            Expr::binary(cost(), BinOp::Gt, Expr::literal(1.0)),
            BinOp::And,
            Expr::binary(name(), BinOp::Eq, Expr::literal("Marvin")),
        )
    };
    let mapping = ElasticMapping::default();
    let first = criteria_of_predicate(pred(build()), &mapping).unwrap();
    let second = criteria_of_predicate(pred(build()), &mapping).unwrap();
    assert_eq!(first, second);

    // re-combining an already-canonical tree changes nothing
    assert_eq!(And::combine(vec![first.clone()]), first);

    let request = request_of_criteria(first.clone(), &mapping, "Robot");
    assert_eq!(request.filter, Some(first));
}
