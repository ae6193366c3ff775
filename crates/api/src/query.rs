//! Query parameter types for list endpoints.
//!
//! Array-valued parameters arrive as repeated `key[]=` pairs, so these structs
//! are extracted with [`axum_extra::extract::Query`] rather than axum's
//! single-valued `Query`.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use triage_core::search::SearchParams;

/// Search, filter, sort and pagination parameters
/// (`?q=&page=&itemsPerPage=&sortBy[]=&descending[]=&field[]=&op[]=&value[]=`).
///
/// Values are validated when converted into a
/// [`SearchQuery`](triage_core::search::SearchQuery).
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub q: Option<String>,
    pub page: Option<i64>,
    #[serde(rename = "itemsPerPage")]
    pub items_per_page: Option<i64>,
    #[serde(rename = "sortBy[]", default)]
    pub sort_by: Vec<String>,
    #[serde(rename = "descending[]", default, deserialize_with = "lenient_bools")]
    pub descending: Vec<bool>,
    #[serde(rename = "field[]", default)]
    pub fields: Vec<String>,
    #[serde(rename = "op[]", default)]
    pub ops: Vec<String>,
    #[serde(rename = "value[]", default)]
    pub values: Vec<String>,
}

impl From<ListParams> for SearchParams {
    fn from(params: ListParams) -> Self {
        SearchParams {
            q: params.q,
            page: params.page,
            items_per_page: params.items_per_page,
            sort_by: params.sort_by,
            descending: params.descending,
            fields: params.fields,
            ops: params.ops,
            values: params.values,
        }
    }
}

/// Parse a boolean the way HTML forms and query strings spell it:
/// `true/false`, `1/0`, `yes/no`, `on/off`, case-insensitively.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn lenient_bools<'de, D>(deserializer: D) -> Result<Vec<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<String>::deserialize(deserializer)?
        .iter()
        .map(|raw| {
            parse_bool(raw)
                .ok_or_else(|| D::Error::custom(format!("invalid boolean '{raw}' in descending[]")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use axum::extract::FromRequestParts;
    use axum::http::Request;
    use axum_extra::extract::{Query, QueryRejection};

    use super::*;

    async fn parse(query: &str) -> Result<ListParams, QueryRejection> {
        let (mut parts, ()) = Request::builder()
            .uri(format!("/incident-types?{query}"))
            .body(())
            .unwrap()
            .into_parts();
        let Query(params) = Query::<ListParams>::from_request_parts(&mut parts, &()).await?;
        Ok(params)
    }

    #[tokio::test]
    async fn descending_accepts_common_spellings() {
        let params = parse(
            "descending%5B%5D=1&descending%5B%5D=True&descending%5B%5D=off&descending%5B%5D=yes",
        )
        .await
        .unwrap();
        assert_eq!(params.descending, vec![true, true, false, true]);
    }

    #[tokio::test]
    async fn descending_rejects_unknown_words() {
        assert!(parse("descending%5B%5D=maybe").await.is_err());
    }

    #[tokio::test]
    async fn repeated_keys_collect_in_order() {
        let params = parse("sortBy%5B%5D=name&sortBy%5B%5D=id&itemsPerPage=-1")
            .await
            .unwrap();
        assert_eq!(params.sort_by, vec!["name", "id"]);
        assert_eq!(params.items_per_page, Some(-1));
        assert!(params.descending.is_empty());
    }
}
