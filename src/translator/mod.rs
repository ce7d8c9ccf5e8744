//! Query-to-request translation.
//!
//! A restricted query maps onto exactly one GET request: the table picks
//! the endpoint path, each predicate becomes one query-string parameter,
//! and LIMIT becomes the configured page-size parameter.
//!
//! Parameter naming convention: equality uses the bare column name
//! (`id=2`); range operators suffix the column with `__gt`, `__gte`,
//! `__lt`, `__lte` or `__ne`.

use crate::connection::config::ConnectionConfig;
use crate::parser::ast::{CompareOp, SelectQuery};

/// The single HTTP request a query translates to. URL encoding of the
/// parameters is left to the HTTP client.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestPlan {
    pub path: String,
    pub params: Vec<(String, String)>,
}

pub fn build_plan(config: &ConnectionConfig, query: &SelectQuery) -> RequestPlan {
    let mut params = Vec::with_capacity(query.predicates.len() + 1);

    for predicate in &query.predicates {
        params.push((
            param_name(&predicate.column, predicate.op),
            predicate.value.to_string(),
        ));
    }

    if let Some(limit) = query.limit {
        params.push((config.limit_param.clone(), limit.to_string()));
    }

    RequestPlan {
        path: config.endpoint_path(&query.table),
        params,
    }
}

fn param_name(column: &str, op: CompareOp) -> String {
    match op {
        CompareOp::Eq => column.to_string(),
        CompareOp::NotEq => format!("{}__ne", column),
        CompareOp::Lt => format!("{}__lt", column),
        CompareOp::LtEq => format!("{}__lte", column),
        CompareOp::Gt => format!("{}__gt", column),
        CompareOp::GtEq => format!("{}__gte", column),
    }
}
