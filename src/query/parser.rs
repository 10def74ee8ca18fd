//! Query expression parser
//!
//! Grammar: `field OP value[,value...]` with `OP` one of `=`, `!=`, `~=`.
//! `=` gains IN-semantics from comma lists and prefix semantics from a
//! trailing `*`; `~=` compiles the right-hand side as a case-sensitive
//! regular expression at parse time. Comparisons combine with `AND`/`OR`
//! (case-insensitive), left-associative, AND binding tighter than OR, no
//! parenthesized grouping.

use crate::models::OwnerKind;
use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("empty query")]
    Empty,
    #[error("unknown field: {0}")]
    UnknownField(String),
    #[error("missing operator in '{0}'")]
    MissingOperator(String),
    #[error("missing value in '{0}'")]
    MissingValue(String),
    #[error("invalid regex '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("dangling '{0}' at end of query")]
    DanglingKeyword(String),
    #[error("'{0}' keyword without a comparison before it")]
    MisplacedKeyword(String),
}

/// Fixed enumerated field set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Owner,
    Namespace,
    Kind,
    Name,
    Status,
    Cluster,
    Label(String),
}

impl Field {
    fn parse(token: &str) -> Result<Self, QueryError> {
        match token {
            "owner" => Ok(Field::Owner),
            "namespace" => Ok(Field::Namespace),
            "kind" => Ok(Field::Kind),
            "name" => Ok(Field::Name),
            "status" => Ok(Field::Status),
            "cluster" => Ok(Field::Cluster),
            _ => {
                if let Some(key) = token
                    .strip_prefix("labels[")
                    .and_then(|rest| rest.strip_suffix(']'))
                {
                    if !key.is_empty() {
                        return Ok(Field::Label(key.to_string()));
                    }
                }
                Err(QueryError::UnknownField(token.to_string()))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    /// Regular expression match (`~=`)
    Matches,
    /// Comma-separated value list on `=`
    In,
    /// Trailing `*` single-segment prefix on `=`
    Prefix,
}

/// One `field OP values` leaf
#[derive(Debug, Clone)]
pub struct Comparison {
    pub field: Field,
    pub op: Operator,
    pub values: Vec<String>,
    /// Compiled pattern for Operator::Matches
    pub(crate) pattern: Option<Regex>,
}

/// Boolean AST: flat two-level expressions (ORs of AND groups)
#[derive(Debug, Clone)]
pub enum QueryExpr {
    Comparison(Comparison),
    And(Box<QueryExpr>, Box<QueryExpr>),
    Or(Box<QueryExpr>, Box<QueryExpr>),
}

/// Parse a query string into an expression tree
pub fn parse(input: &str) -> Result<QueryExpr, QueryError> {
    let tokens: Vec<&str> = input.split_whitespace().collect();
    if tokens.is_empty() {
        return Err(QueryError::Empty);
    }

    // Split the token stream into OR groups of AND groups; comparison tokens
    // between keywords are re-joined so `owner = Flux` parses like `owner=Flux`.
    let mut or_groups: Vec<Vec<QueryExpr>> = Vec::new();
    let mut current_group: Vec<QueryExpr> = Vec::new();
    let mut pending: Vec<&str> = Vec::new();

    for token in &tokens {
        if token.eq_ignore_ascii_case("and") || token.eq_ignore_ascii_case("or") {
            if pending.is_empty() {
                return Err(QueryError::MisplacedKeyword(token.to_string()));
            }
            current_group.push(QueryExpr::Comparison(parse_comparison(&pending.join(""))?));
            pending.clear();
            if token.eq_ignore_ascii_case("or") {
                or_groups.push(std::mem::take(&mut current_group));
            }
        } else {
            pending.push(token);
        }
    }
    if pending.is_empty() {
        let last = tokens.last().unwrap_or(&"");
        return Err(QueryError::DanglingKeyword(last.to_string()));
    }
    current_group.push(QueryExpr::Comparison(parse_comparison(&pending.join(""))?));
    or_groups.push(current_group);

    let mut or_exprs = or_groups.into_iter().map(|group| {
        let mut iter = group.into_iter();
        let first = iter.next().expect("group is never empty");
        iter.fold(first, |acc, next| {
            QueryExpr::And(Box::new(acc), Box::new(next))
        })
    });
    let first = or_exprs.next().expect("at least one group");
    Ok(or_exprs.fold(first, |acc, next| {
        QueryExpr::Or(Box::new(acc), Box::new(next))
    }))
}

fn parse_comparison(token: &str) -> Result<Comparison, QueryError> {
    // Two-character operators first so `!=` is not split at `=`
    let (field_str, op, value_str) = if let Some((f, v)) = token.split_once("!=") {
        (f, Operator::Ne, v)
    } else if let Some((f, v)) = token.split_once("~=") {
        (f, Operator::Matches, v)
    } else if let Some((f, v)) = token.split_once('=') {
        (f, Operator::Eq, v)
    } else {
        return Err(QueryError::MissingOperator(token.to_string()));
    };

    let field = Field::parse(field_str.trim())?;
    let value_str = value_str.trim();
    if value_str.is_empty() {
        return Err(QueryError::MissingValue(token.to_string()));
    }

    if op == Operator::Matches {
        let pattern = Regex::new(value_str).map_err(|source| QueryError::InvalidRegex {
            pattern: value_str.to_string(),
            source,
        })?;
        return Ok(Comparison {
            field,
            op,
            values: vec![value_str.to_string()],
            pattern: Some(pattern),
        });
    }

    let mut values: Vec<String> = value_str.split(',').map(|v| v.to_string()).collect();
    // Owner values accept the short aliases users type (flux, argo, tf...);
    // canonicalize them at parse time so evaluation stays plain string equality
    if field == Field::Owner {
        for value in &mut values {
            if let Some(kind) = OwnerKind::from_str_case_insensitive(value) {
                *value = kind.as_str().to_string();
            }
        }
    }
    let op = match op {
        Operator::Eq if values.len() > 1 => Operator::In,
        Operator::Eq if values[0].ends_with('*') => Operator::Prefix,
        other => other,
    };

    Ok(Comparison {
        field,
        op,
        values,
        pattern: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_comparison() {
        let expr = parse("owner=Flux").unwrap();
        let QueryExpr::Comparison(cmp) = expr else {
            panic!("expected comparison");
        };
        assert_eq!(cmp.field, Field::Owner);
        assert_eq!(cmp.op, Operator::Eq);
        assert_eq!(cmp.values, vec!["Flux"]);
    }

    #[test]
    fn test_parse_in_and_prefix() {
        let QueryExpr::Comparison(cmp) = parse("kind=Deployment,StatefulSet").unwrap() else {
            panic!("expected comparison");
        };
        assert_eq!(cmp.op, Operator::In);

        let QueryExpr::Comparison(cmp) = parse("namespace=prod*").unwrap() else {
            panic!("expected comparison");
        };
        assert_eq!(cmp.op, Operator::Prefix);
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        // a OR b AND c must parse as a OR (b AND c)
        let expr = parse("owner=Flux OR owner=Helm AND kind=Deployment").unwrap();
        let QueryExpr::Or(lhs, rhs) = expr else {
            panic!("expected OR at the top");
        };
        assert!(matches!(*lhs, QueryExpr::Comparison(_)));
        assert!(matches!(*rhs, QueryExpr::And(_, _)));
    }

    #[test]
    fn test_owner_alias_canonicalized() {
        let QueryExpr::Comparison(cmp) = parse("owner=argo").unwrap() else {
            panic!("expected comparison");
        };
        assert_eq!(cmp.values, vec!["ArgoCD"]);

        // Non-owner fields are left untouched
        let QueryExpr::Comparison(cmp) = parse("name=argo").unwrap() else {
            panic!("expected comparison");
        };
        assert_eq!(cmp.values, vec!["argo"]);
    }

    #[test]
    fn test_spaced_operator() {
        let QueryExpr::Comparison(cmp) = parse("owner = Flux").unwrap() else {
            panic!("expected comparison");
        };
        assert_eq!(cmp.values, vec!["Flux"]);
    }

    #[test]
    fn test_label_field() {
        let QueryExpr::Comparison(cmp) = parse("labels[app.kubernetes.io/name]=api").unwrap()
        else {
            panic!("expected comparison");
        };
        assert_eq!(
            cmp.field,
            Field::Label("app.kubernetes.io/name".to_string())
        );
    }

    #[test]
    fn test_unknown_field_is_error() {
        assert!(matches!(
            parse("owners=Flux"),
            Err(QueryError::UnknownField(token)) if token == "owners"
        ));
    }

    #[test]
    fn test_bad_regex_is_error() {
        assert!(matches!(
            parse("name~=[unclosed"),
            Err(QueryError::InvalidRegex { .. })
        ));
    }

    #[test]
    fn test_missing_operator_is_error() {
        assert!(matches!(
            parse("owner"),
            Err(QueryError::MissingOperator(_))
        ));
    }

    #[test]
    fn test_dangling_keyword_is_error() {
        assert!(matches!(
            parse("owner=Flux AND"),
            Err(QueryError::DanglingKeyword(_))
        ));
    }

    #[test]
    fn test_leading_keyword_is_error() {
        assert!(matches!(
            parse("AND owner=Flux"),
            Err(QueryError::MisplacedKeyword(token)) if token == "AND"
        ));
        assert!(matches!(
            parse("owner=Flux OR OR owner=Helm"),
            Err(QueryError::MisplacedKeyword(token)) if token == "OR"
        ));
    }
}
