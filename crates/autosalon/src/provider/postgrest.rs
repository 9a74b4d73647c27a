//! Minimal PostgREST client, the REST surface of a Supabase project.
//!
//! Only what the inventory and the inbox need: table requests with the
//! project key attached, and exact row counts from `Content-Range`.

use reqwest::header::CONTENT_RANGE;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::http::{build_client, check_status, decode_error, map_reqwest_error};
use crate::error::Result;

/// `Prefer` header asking PostgREST to echo affected rows.
pub(crate) const RETURN_REPRESENTATION: &str = "return=representation";
pub(crate) const COUNT_EXACT: &str = "count=exact";

#[derive(Clone)]
pub struct PostgrestClient {
    http: Client,
    base_url: String,
    api_key: String,
    access_token: Option<String>,
}

impl PostgrestClient {
    pub fn new(project_url: &str, api_key: &str) -> Result<Self> {
        Ok(Self {
            http: build_client()?,
            base_url: project_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            access_token: None,
        })
    }

    /// Sends the signed-in user's JWT instead of the anon key as bearer.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    pub(crate) fn request(&self, method: Method, table: &str) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.api_key);
        self.http
            .request(method, self.table_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(bearer)
    }

    pub(crate) async fn send(&self, req: RequestBuilder, missing: Option<&str>) -> Result<Response> {
        let res = req.send().await.map_err(map_reqwest_error)?;
        check_status(res, missing).await
    }

    /// Exact row count for `filters` (pairs like `("read", "eq.false")`).
    pub(crate) async fn count(&self, table: &str, filters: &[(&str, &str)]) -> Result<u64> {
        let req = self
            .request(Method::HEAD, table)
            .query(&[("select", "*")])
            .query(filters)
            .header("Prefer", COUNT_EXACT);
        let res = self.send(req, None).await?;
        let header = res
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| decode_error("missing Content-Range header"))?;
        parse_content_range_total(header)
            .ok_or_else(|| decode_error(format!("bad Content-Range: {}", header)))
    }
}

/// `"0-24/573"` → 573, `"*/0"` → 0.
pub(crate) fn parse_content_range_total(header: &str) -> Option<u64> {
    let (_, total) = header.trim().rsplit_once('/')?;
    total.parse().ok()
}

/// PostgREST equality filter value.
pub(crate) fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

/// Accepts text or numeric primary keys.
pub(crate) fn id_as_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_range_total() {
        assert_eq!(parse_content_range_total("0-24/573"), Some(573));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total("0-9/*"), None);
        assert_eq!(parse_content_range_total("garbage"), None);
    }

    #[test]
    fn test_table_url() {
        let client = PostgrestClient::new("https://abc.supabase.co/", "anon").unwrap();
        assert_eq!(
            client.table_url("cars"),
            "https://abc.supabase.co/rest/v1/cars"
        );
    }

    #[test]
    fn test_eq_filter() {
        assert_eq!(eq("42"), "eq.42");
    }
}
