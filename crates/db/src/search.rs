//! Generic search / filter / sort / paginate over a single table.
//!
//! A [`SearchQuery`] from `triage_core` is compiled against a model's
//! [`Searchable`] description into a [`CompiledQuery`]: every field name is
//! resolved through the model's allow-list and every value is parsed into
//! the column's type up front, so translation errors surface as
//! [`CoreError::Validation`] before any SQL runs. Only allow-listed column
//! names are interpolated into SQL; all values are bound parameters.

use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use triage_core::error::CoreError;
use triage_core::search::{Filter, FilterOp, PageRequest, SearchQuery};
use triage_core::types::Timestamp;

use crate::models::page::Page;

// ---------------------------------------------------------------------------
// Model description
// ---------------------------------------------------------------------------

/// Storage type of a filterable column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Boolean,
    Timestamp,
}

/// A filterable / sortable column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl Column {
    pub const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self { name, kind }
    }
}

/// A table that can be listed through [`search_filter_sort_paginate`].
pub trait Searchable: for<'r> FromRow<'r, PgRow> + Send + Unpin {
    const TABLE: &'static str;

    /// Column list selected for each row.
    const COLUMNS: &'static str;

    /// SQL expression yielding the `tsvector` matched against `q`.
    const SEARCH_VECTOR: &'static str;

    /// Column appended to every ordering so pages are stable.
    const TIE_BREAKER: &'static str = "id";

    /// Resolve an API field name to its column. `None` rejects the field.
    fn column(field: &str) -> Option<Column>;
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The query referenced an unknown field or carried an unparsable value.
    #[error(transparent)]
    Invalid(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

// ---------------------------------------------------------------------------
// Compilation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum BindValue {
    Text(String),
    Integer(i64),
    Boolean(bool),
    Timestamp(Timestamp),
}

#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    Compare {
        column: &'static str,
        sql_op: &'static str,
        value: BindValue,
    },
    List {
        column: &'static str,
        negated: bool,
        values: Vec<BindValue>,
    },
    Null {
        column: &'static str,
        negated: bool,
    },
    FullText {
        vector: &'static str,
        tsquery: String,
    },
}

/// A [`SearchQuery`] resolved against one model.
#[derive(Debug, Clone)]
pub struct CompiledQuery {
    table: &'static str,
    columns: &'static str,
    predicates: Vec<Predicate>,
    order_by: Vec<(&'static str, bool)>,
    page: PageRequest,
}

impl CompiledQuery {
    /// Resolve fields and parse values of `query` against model `T`.
    pub fn compile<T: Searchable>(query: &SearchQuery) -> Result<Self, CoreError> {
        let mut predicates = query
            .filters
            .iter()
            .map(compile_filter::<T>)
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(tsquery) = &query.text {
            predicates.push(Predicate::FullText {
                vector: T::SEARCH_VECTOR,
                tsquery: tsquery.clone(),
            });
        }

        let mut order_by = Vec::with_capacity(query.sort.len() + 1);
        for key in &query.sort {
            let column = resolve::<T>(&key.field)?;
            order_by.push((column.name, key.descending));
        }
        if !order_by.iter().any(|(name, _)| *name == T::TIE_BREAKER) {
            order_by.push((T::TIE_BREAKER, false));
        }

        Ok(Self {
            table: T::TABLE,
            columns: T::COLUMNS,
            predicates,
            order_by,
            page: query.page,
        })
    }

    /// `SELECT COUNT(*)` over every matching row.
    pub fn count_query(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", self.table));
        self.push_where(&mut qb);
        qb
    }

    /// `SELECT` of the requested page, ordered.
    pub fn page_query(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(format!("SELECT {} FROM {}", self.columns, self.table));
        self.push_where(&mut qb);

        qb.push(" ORDER BY ");
        for (i, (column, descending)) in self.order_by.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            qb.push(*column);
            qb.push(if *descending { " DESC" } else { " ASC" });
        }

        if let Some(limit) = self.page.limit() {
            qb.push(" LIMIT ");
            qb.push_bind(limit);
            qb.push(" OFFSET ");
            qb.push_bind(self.page.offset());
        }
        qb
    }

    fn push_where(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        for (i, predicate) in self.predicates.iter().enumerate() {
            qb.push(if i == 0 { " WHERE " } else { " AND " });
            match predicate {
                Predicate::Compare {
                    column,
                    sql_op,
                    value,
                } => {
                    qb.push(format!("{column} {sql_op} "));
                    push_value(qb, value);
                }
                Predicate::List {
                    column,
                    negated,
                    values,
                } => {
                    if values.is_empty() {
                        // `x IN ()` is not valid SQL.
                        qb.push(if *negated { "TRUE" } else { "FALSE" });
                        continue;
                    }
                    qb.push(*column);
                    qb.push(if *negated { " NOT IN (" } else { " IN (" });
                    for (j, value) in values.iter().enumerate() {
                        if j > 0 {
                            qb.push(", ");
                        }
                        push_value(qb, value);
                    }
                    qb.push(")");
                }
                Predicate::Null { column, negated } => {
                    qb.push(*column);
                    qb.push(if *negated { " IS NOT NULL" } else { " IS NULL" });
                }
                Predicate::FullText { tsquery, .. } if tsquery.is_empty() => {
                    qb.push("FALSE");
                }
                Predicate::FullText { vector, tsquery } => {
                    qb.push(format!("{vector} @@ to_tsquery('simple', "));
                    qb.push_bind(tsquery.clone());
                    qb.push(")");
                }
            }
        }
    }
}

fn push_value(qb: &mut QueryBuilder<'static, Postgres>, value: &BindValue) {
    match value {
        BindValue::Text(v) => qb.push_bind(v.clone()),
        BindValue::Integer(v) => qb.push_bind(*v),
        BindValue::Boolean(v) => qb.push_bind(*v),
        BindValue::Timestamp(v) => qb.push_bind(*v),
    };
}

fn resolve<T: Searchable>(field: &str) -> Result<Column, CoreError> {
    T::column(field).ok_or_else(|| {
        CoreError::Validation(format!("Unknown field '{field}' for {}", T::TABLE))
    })
}

fn compile_filter<T: Searchable>(filter: &Filter) -> Result<Predicate, CoreError> {
    let column = resolve::<T>(&filter.field)?;

    match filter.op {
        FilterOp::IsNull | FilterOp::IsNotNull => Ok(Predicate::Null {
            column: column.name,
            negated: filter.op == FilterOp::IsNotNull,
        }),
        FilterOp::In | FilterOp::NotIn => {
            let values = filter
                .list_values()
                .into_iter()
                .map(|raw| parse_value(column, &filter.field, raw))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Predicate::List {
                column: column.name,
                negated: filter.op == FilterOp::NotIn,
                values,
            })
        }
        op => {
            if op.is_pattern() && column.kind != ColumnKind::Text {
                return Err(CoreError::Validation(format!(
                    "Operator '{op}' requires a text field, '{}' is not one",
                    filter.field
                )));
            }
            Ok(Predicate::Compare {
                column: column.name,
                sql_op: comparison_sql(op),
                value: parse_value(column, &filter.field, &filter.value)?,
            })
        }
    }
}

/// SQL spelling of a binary comparison operator.
fn comparison_sql(op: FilterOp) -> &'static str {
    match op {
        FilterOp::Eq => "=",
        FilterOp::Ne => "<>",
        FilterOp::Gt => ">",
        FilterOp::Lt => "<",
        FilterOp::Ge => ">=",
        FilterOp::Le => "<=",
        FilterOp::Like => "LIKE",
        FilterOp::ILike => "ILIKE",
        FilterOp::NotILike => "NOT ILIKE",
        FilterOp::In => "IN",
        FilterOp::NotIn => "NOT IN",
        FilterOp::IsNull => "IS NULL",
        FilterOp::IsNotNull => "IS NOT NULL",
    }
}

fn parse_value(column: Column, field: &str, raw: &str) -> Result<BindValue, CoreError> {
    let invalid = |expected: &str| {
        CoreError::Validation(format!(
            "Value '{raw}' for field '{field}' is not a valid {expected}"
        ))
    };

    match column.kind {
        ColumnKind::Text => Ok(BindValue::Text(raw.to_string())),
        ColumnKind::Integer => raw
            .trim()
            .parse()
            .map(BindValue::Integer)
            .map_err(|_| invalid("integer")),
        ColumnKind::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(BindValue::Boolean(true)),
            "false" | "0" => Ok(BindValue::Boolean(false)),
            _ => Err(invalid("boolean")),
        },
        ColumnKind::Timestamp => chrono::DateTime::parse_from_rfc3339(raw.trim())
            .map(|ts| BindValue::Timestamp(ts.with_timezone(&chrono::Utc)))
            .map_err(|_| invalid("RFC 3339 timestamp")),
    }
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Run `query` against model `T`, returning one page plus the total count
/// of matching rows.
pub async fn search_filter_sort_paginate<T: Searchable>(
    pool: &PgPool,
    query: &SearchQuery,
) -> Result<Page<T>, SearchError> {
    let compiled = CompiledQuery::compile::<T>(query)?;

    let mut count = compiled.count_query();
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    let mut select = compiled.page_query();
    let items: Vec<T> = select.build_query_as().fetch_all(pool).await?;

    tracing::debug!(
        table = T::TABLE,
        total,
        returned = items.len(),
        page = query.page.page,
        "Search executed",
    );

    Ok(Page {
        items,
        total,
        page: query.page.page,
        items_per_page: query.page.items_per_page,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
