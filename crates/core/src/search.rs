//! Search, filter, sort and pagination query model.
//!
//! List endpoints accept a free-text query, positionally paired `sortBy[]` /
//! `descending[]` arrays and parallel `field[]` / `op[]` / `value[]` arrays.
//! [`SearchQuery::from_params`] validates those raw parameters into a small
//! query AST; the database layer translates the AST into SQL. Field names
//! are not checked here because the set of filterable fields belongs to
//! each model.

use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Pagination defaults
// ---------------------------------------------------------------------------

/// Page returned when the caller does not ask for one.
pub const DEFAULT_PAGE: i64 = 1;

/// Page size used when `itemsPerPage` is omitted.
pub const DEFAULT_ITEMS_PER_PAGE: i64 = 5;

// ---------------------------------------------------------------------------
// Filter operators
// ---------------------------------------------------------------------------

/// Comparison operator of a filter triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    Like,
    ILike,
    NotILike,
    In,
    NotIn,
    IsNull,
    IsNotNull,
}

impl FilterOp {
    /// Operators that only make sense on text columns.
    pub fn is_pattern(self) -> bool {
        matches!(self, FilterOp::Like | FilterOp::ILike | FilterOp::NotILike)
    }

    /// Canonical spelling, as accepted by [`FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            FilterOp::Eq => "==",
            FilterOp::Ne => "!=",
            FilterOp::Gt => ">",
            FilterOp::Lt => "<",
            FilterOp::Ge => ">=",
            FilterOp::Le => "<=",
            FilterOp::Like => "like",
            FilterOp::ILike => "ilike",
            FilterOp::NotILike => "not_ilike",
            FilterOp::In => "in",
            FilterOp::NotIn => "not_in",
            FilterOp::IsNull => "is_null",
            FilterOp::IsNotNull => "is_not_null",
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOp {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let op = match s {
            "==" | "eq" => FilterOp::Eq,
            "!=" | "ne" => FilterOp::Ne,
            ">" | "gt" => FilterOp::Gt,
            "<" | "lt" => FilterOp::Lt,
            ">=" | "ge" => FilterOp::Ge,
            "<=" | "le" => FilterOp::Le,
            "like" => FilterOp::Like,
            "ilike" => FilterOp::ILike,
            "not_ilike" => FilterOp::NotILike,
            "in" => FilterOp::In,
            "not_in" => FilterOp::NotIn,
            "is_null" => FilterOp::IsNull,
            "is_not_null" => FilterOp::IsNotNull,
            other => {
                return Err(CoreError::Validation(format!(
                    "Unknown filter operator '{other}'"
                )))
            }
        };
        Ok(op)
    }
}

// ---------------------------------------------------------------------------
// AST nodes
// ---------------------------------------------------------------------------

/// One `(field, op, value)` predicate. All filters are AND-ed together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: String,
}

impl Filter {
    /// The value split into list items for `in` / `not_in`.
    ///
    /// Items are trimmed and empty items dropped.
    pub fn list_values(&self) -> Vec<&str> {
        self.value
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .collect()
    }
}

/// One ordering key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub descending: bool,
}

/// Which slice of the result set to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: i64,
    /// Page size as requested; negative means "every row".
    pub items_per_page: i64,
}

impl PageRequest {
    /// Normalize raw parameters: page floors at 1, a page size of 0 floors
    /// at 1, and any negative page size means no limit.
    pub fn new(page: Option<i64>, items_per_page: Option<i64>) -> Self {
        let page = page.unwrap_or(DEFAULT_PAGE).max(1);
        let items_per_page = match items_per_page.unwrap_or(DEFAULT_ITEMS_PER_PAGE) {
            n if n < 0 => -1,
            n => n.max(1),
        };
        Self {
            page,
            items_per_page,
        }
    }

    /// SQL `LIMIT`, or `None` when every row was requested.
    pub fn limit(&self) -> Option<i64> {
        (self.items_per_page > 0).then_some(self.items_per_page)
    }

    /// SQL `OFFSET`. Always 0 when there is no limit.
    pub fn offset(&self) -> i64 {
        match self.limit() {
            Some(limit) => (self.page - 1).saturating_mul(limit),
            None => 0,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// A validated list query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchQuery {
    /// Prefix `tsquery` built from `q`. `None` when `q` was absent or blank;
    /// an empty string when `q` held no searchable word, which matches nothing.
    pub text: Option<String>,
    pub filters: Vec<Filter>,
    pub sort: Vec<SortKey>,
    pub page: PageRequest,
}

/// Raw list parameters as received on the query string.
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    pub q: Option<String>,
    pub page: Option<i64>,
    pub items_per_page: Option<i64>,
    pub sort_by: Vec<String>,
    pub descending: Vec<bool>,
    pub fields: Vec<String>,
    pub ops: Vec<String>,
    pub values: Vec<String>,
}

impl SearchQuery {
    /// Validate raw parameters into a [`SearchQuery`].
    ///
    /// Fails with [`CoreError::Validation`] when the filter arrays differ in
    /// length or an operator is unknown.
    pub fn from_params(params: SearchParams) -> Result<Self, CoreError> {
        let SearchParams {
            q,
            page,
            items_per_page,
            sort_by,
            descending,
            fields,
            ops,
            values,
        } = params;

        if fields.len() != ops.len() || fields.len() != values.len() {
            return Err(CoreError::Validation(format!(
                "field[], op[] and value[] must have the same length (got {}, {}, {})",
                fields.len(),
                ops.len(),
                values.len()
            )));
        }

        let filters = fields
            .into_iter()
            .zip(ops)
            .zip(values)
            .map(|((field, op), value)| -> Result<Filter, CoreError> {
                Ok(Filter {
                    field,
                    op: op.parse()?,
                    value,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let sort = sort_by
            .into_iter()
            .enumerate()
            .map(|(i, field)| SortKey {
                field,
                descending: descending.get(i).copied().unwrap_or(false),
            })
            .collect();

        Ok(Self {
            text: match q.as_deref().map(str::trim) {
                Some(q) if !q.is_empty() => Some(build_prefix_tsquery(q).unwrap_or_default()),
                _ => None,
            },
            filters,
            sort,
            page: PageRequest::new(page, items_per_page),
        })
    }
}

// ---------------------------------------------------------------------------
// Free-text helpers
// ---------------------------------------------------------------------------

/// Split user input into terms safe to embed in a `tsquery`.
///
/// Any run of non-alphanumeric characters separates terms, so `data-breach`
/// yields `data` and `breach`, the same words the `simple` parser indexes.
fn sanitize_terms(query: &str) -> Option<Vec<&str>> {
    let terms: Vec<&str> = query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms)
    }
}

/// Build a prefix `tsquery`: every term is AND-ed and the last one is
/// matched as a prefix, so `"data br"` finds "Data Breach".
///
/// ```
/// use triage_core::search::build_prefix_tsquery;
/// assert_eq!(build_prefix_tsquery("phish"), Some("phish:*".to_string()));
/// assert_eq!(build_prefix_tsquery("data br"), Some("data & br:*".to_string()));
/// assert_eq!(build_prefix_tsquery("  "), None);
/// ```
pub fn build_prefix_tsquery(query: &str) -> Option<String> {
    let terms = sanitize_terms(query)?;
    let (last, exact) = terms.split_last()?;
    if exact.is_empty() {
        Some(format!("{last}:*"))
    } else {
        Some(format!("{} & {last}:*", exact.join(" & ")))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
