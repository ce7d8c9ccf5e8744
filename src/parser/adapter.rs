use crate::core::{ApiError, Result, Value};
use crate::parser::ast::*;
use sqlparser::ast as sql_ast;
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

/// Adapter from sqlparser's full SQL AST to the restricted query
/// description. Anything a single GET request cannot answer is rejected
/// here, before a request is built.
#[derive(Debug)]
pub struct SqlParserAdapter {
    dialect: PostgreSqlDialect,
}

impl SqlParserAdapter {
    pub fn new() -> Self {
        Self {
            dialect: PostgreSqlDialect {},
        }
    }

    pub fn parse(&self, sql: &str) -> Result<SelectQuery> {
        let mut statements = Parser::parse_sql(&self.dialect, sql)
            .map_err(|e| ApiError::Parse(e.to_string()))?;

        if statements.len() != 1 {
            return Err(ApiError::UnsupportedQuery(format!(
                "expected exactly one statement, got {}",
                statements.len()
            )));
        }

        match statements.remove(0) {
            sql_ast::Statement::Query(query) => self.convert_query(*query),
            other => Err(ApiError::UnsupportedQuery(format!(
                "read-only connector supports SELECT only, got: {}",
                other
            ))),
        }
    }

    fn convert_query(&self, query: sql_ast::Query) -> Result<SelectQuery> {
        if query.with.is_some() {
            return Err(ApiError::UnsupportedQuery("WITH clauses not supported".into()));
        }
        if query.order_by.is_some() {
            return Err(ApiError::UnsupportedQuery("ORDER BY not supported".into()));
        }
        if query.fetch.is_some() {
            return Err(ApiError::UnsupportedQuery("FETCH not supported".into()));
        }

        let limit = self.convert_limit_clause(&query.limit_clause)?;

        let sql_ast::SetExpr::Select(select) = *query.body else {
            return Err(ApiError::UnsupportedQuery(
                "only plain SELECT queries supported".into(),
            ));
        };

        if select.distinct.is_some() {
            return Err(ApiError::UnsupportedQuery("DISTINCT not supported".into()));
        }
        if select.having.is_some() {
            return Err(ApiError::UnsupportedQuery("HAVING not supported".into()));
        }
        match &select.group_by {
            sql_ast::GroupByExpr::Expressions(exprs, _) if exprs.is_empty() => {}
            _ => {
                return Err(ApiError::UnsupportedQuery("GROUP BY not supported".into()));
            }
        }

        let table = self.convert_from(select.from)?;
        let projection = self.convert_projection(select.projection)?;

        let mut predicates = Vec::new();
        if let Some(selection) = select.selection {
            self.collect_predicates(selection, &mut predicates)?;
        }

        Ok(SelectQuery {
            table,
            projection,
            predicates,
            limit,
        })
    }

    fn convert_from(&self, from: Vec<sql_ast::TableWithJoins>) -> Result<String> {
        let mut from = from.into_iter();
        let (Some(table), None) = (from.next(), from.next()) else {
            return Err(ApiError::UnsupportedQuery(
                "queries must reference exactly one table".into(),
            ));
        };
        if !table.joins.is_empty() {
            return Err(ApiError::UnsupportedQuery("JOINs not supported".into()));
        }

        match table.relation {
            sql_ast::TableFactor::Table { name, .. } => extract_table_name(&name),
            other => Err(ApiError::UnsupportedQuery(format!(
                "complex table references not supported: {}",
                other
            ))),
        }
    }

    fn convert_projection(&self, items: Vec<sql_ast::SelectItem>) -> Result<Projection> {
        if items.len() == 1 && matches!(items[0], sql_ast::SelectItem::Wildcard(_)) {
            return Ok(Projection::Wildcard);
        }

        let columns = items
            .into_iter()
            .map(|item| match item {
                sql_ast::SelectItem::UnnamedExpr(sql_ast::Expr::Identifier(ident)) => {
                    Ok(ident.value)
                }
                other => Err(ApiError::UnsupportedQuery(format!(
                    "only plain column references or * supported in SELECT, got: {}",
                    other
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Projection::Columns(columns))
    }

    /// Flatten a conjunctive WHERE clause into pushdown predicates.
    fn collect_predicates(
        &self,
        expr: sql_ast::Expr,
        out: &mut Vec<Predicate>,
    ) -> Result<()> {
        match expr {
            sql_ast::Expr::BinaryOp { left, op, right } => match op {
                sql_ast::BinaryOperator::And => {
                    self.collect_predicates(*left, out)?;
                    self.collect_predicates(*right, out)
                }
                _ => {
                    out.push(self.convert_comparison(*left, &op, *right)?);
                    Ok(())
                }
            },
            sql_ast::Expr::Nested(inner) => self.collect_predicates(*inner, out),
            other => Err(ApiError::UnsupportedQuery(format!(
                "unsupported WHERE construct: {}",
                other
            ))),
        }
    }

    fn convert_comparison(
        &self,
        left: sql_ast::Expr,
        op: &sql_ast::BinaryOperator,
        right: sql_ast::Expr,
    ) -> Result<Predicate> {
        let op = self.convert_compare_op(op)?;

        let sql_ast::Expr::Identifier(ident) = left else {
            return Err(ApiError::UnsupportedQuery(
                "predicates must compare a column against a literal".into(),
            ));
        };

        let sql_ast::Expr::Value(literal) = right else {
            return Err(ApiError::UnsupportedQuery(format!(
                "predicate on '{}' must compare against a literal",
                ident.value
            )));
        };

        let value = self.convert_value(&literal.value)?;
        if value.is_null() {
            return Err(ApiError::UnsupportedQuery(format!(
                "NULL cannot be used in a pushdown predicate on '{}'",
                ident.value
            )));
        }

        Ok(Predicate {
            column: ident.value,
            op,
            value,
        })
    }

    fn convert_compare_op(&self, op: &sql_ast::BinaryOperator) -> Result<CompareOp> {
        use sql_ast::BinaryOperator as SqlOp;

        match op {
            SqlOp::Eq => Ok(CompareOp::Eq),
            SqlOp::NotEq => Ok(CompareOp::NotEq),
            SqlOp::Lt => Ok(CompareOp::Lt),
            SqlOp::LtEq => Ok(CompareOp::LtEq),
            SqlOp::Gt => Ok(CompareOp::Gt),
            SqlOp::GtEq => Ok(CompareOp::GtEq),
            other => Err(ApiError::UnsupportedQuery(format!(
                "unsupported operator in WHERE clause: {}",
                other
            ))),
        }
    }

    fn convert_value(&self, value: &sql_ast::Value) -> Result<Value> {
        match value {
            sql_ast::Value::Number(n, _) => {
                if let Ok(i) = n.parse::<i64>() {
                    Ok(Value::Integer(i))
                } else if let Ok(f) = n.parse::<f64>() {
                    Ok(Value::Float(f))
                } else {
                    Err(ApiError::Parse(format!("invalid number literal: {}", n)))
                }
            }
            sql_ast::Value::SingleQuotedString(s) | sql_ast::Value::DoubleQuotedString(s) => {
                Ok(Value::Text(s.clone()))
            }
            sql_ast::Value::Boolean(b) => Ok(Value::Boolean(*b)),
            sql_ast::Value::Null => Ok(Value::Null),
            other => Err(ApiError::UnsupportedQuery(format!(
                "unsupported literal: {}",
                other
            ))),
        }
    }

    fn convert_limit_clause(
        &self,
        limit_clause: &Option<sql_ast::LimitClause>,
    ) -> Result<Option<usize>> {
        let Some(clause) = limit_clause else {
            return Ok(None);
        };

        match clause {
            sql_ast::LimitClause::LimitOffset { limit, offset, .. } => {
                if offset.is_some() {
                    return Err(ApiError::UnsupportedQuery("OFFSET not supported".into()));
                }
                match limit {
                    Some(sql_ast::Expr::Value(literal)) => {
                        self.extract_limit_number(&literal.value)
                    }
                    Some(_) => Err(ApiError::UnsupportedQuery(
                        "only numeric LIMIT supported".into(),
                    )),
                    None => Ok(None),
                }
            }
            sql_ast::LimitClause::OffsetCommaLimit { .. } => {
                Err(ApiError::UnsupportedQuery("OFFSET not supported".into()))
            }
        }
    }

    fn extract_limit_number(&self, value: &sql_ast::Value) -> Result<Option<usize>> {
        match value {
            sql_ast::Value::Number(n, _) => n
                .parse::<usize>()
                .map(Some)
                .map_err(|_| ApiError::Parse(format!("invalid LIMIT value: {}", n))),
            other => Err(ApiError::UnsupportedQuery(format!(
                "only numeric LIMIT supported, got: {}",
                other
            ))),
        }
    }
}

impl Default for SqlParserAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn extract_table_name(name: &sql_ast::ObjectName) -> Result<String> {
    name.0
        .last()
        .map(|ident| ident.to_string())
        .ok_or_else(|| ApiError::Parse("invalid table name".into()))
}
