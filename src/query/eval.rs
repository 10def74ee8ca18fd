//! Query evaluation over a resource and its ownership verdict

use crate::models::Resource;
use crate::ownership::Ownership;
use crate::query::parser::{Comparison, Field, Operator, QueryExpr};

/// Evaluate an expression against one resource. Pure and deterministic.
pub fn evaluate(expr: &QueryExpr, resource: &Resource, ownership: &Ownership) -> bool {
    match expr {
        QueryExpr::Comparison(cmp) => evaluate_comparison(cmp, resource, ownership),
        QueryExpr::And(lhs, rhs) => {
            evaluate(lhs, resource, ownership) && evaluate(rhs, resource, ownership)
        }
        QueryExpr::Or(lhs, rhs) => {
            evaluate(lhs, resource, ownership) || evaluate(rhs, resource, ownership)
        }
    }
}

fn evaluate_comparison(cmp: &Comparison, resource: &Resource, ownership: &Ownership) -> bool {
    let actual = field_value(&cmp.field, resource, ownership);
    match cmp.op {
        Operator::Eq => cmp.values[0] == actual,
        Operator::Ne => cmp.values.iter().all(|v| v.as_str() != actual),
        Operator::Prefix => value_matches(actual, &cmp.values[0]),
        Operator::In => cmp.values.iter().any(|v| value_matches(actual, v)),
        Operator::Matches => cmp
            .pattern
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(actual)),
    }
}

/// Equality with single-segment trailing-`*` prefix support
fn value_matches(actual: &str, expected: &str) -> bool {
    match expected.strip_suffix('*') {
        Some(prefix) => actual.starts_with(prefix),
        None => actual == expected,
    }
}

/// Absent label keys evaluate to the empty string, not an error
fn field_value<'a>(field: &Field, resource: &'a Resource, ownership: &'a Ownership) -> &'a str {
    match field {
        Field::Owner => ownership.owner.as_str(),
        Field::Namespace => &resource.namespace,
        Field::Kind => &resource.kind,
        Field::Name => &resource.name,
        Field::Status => {
            if resource.status.ready {
                "Ready"
            } else {
                "NotReady"
            }
        }
        Field::Cluster => &resource.cluster,
        Field::Label(key) => resource.label(key).unwrap_or_default(),
    }
}
