use crate::config::DiagnosticsConfig;
use crate::domain::model::ErrorDetail;
use crate::utils::error::Result;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

/// PostgREST 錯誤回應格式
#[derive(Debug, Deserialize)]
struct PostgrestError {
    message: Option<String>,
    code: Option<String>,
    hint: Option<String>,
    details: Option<String>,
}

/// 查詢結果：成功回傳資料列，或後端拒絕
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Rows(serde_json::Value),
    Rejected(ErrorDetail),
}

/// Read-only client for `{endpoint}/rest/v1/{table}`.
#[derive(Debug, Clone)]
pub struct RestClient {
    endpoint: String,
    api_key: String,
    client: Client,
}

impl RestClient {
    pub fn new(config: &DiagnosticsConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            client,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.endpoint, table)
    }

    /// `select=count` 聚合查詢，只讀取筆數
    pub async fn count(&self, table: &str) -> Result<QueryOutcome> {
        self.get(table, &[("select", "count".to_string())]).await
    }

    /// 以 `limit=0` 查詢指定欄位，欄位或資料表不存在時後端會拒絕
    pub async fn probe_columns(&self, table: &str, columns: &[String]) -> Result<QueryOutcome> {
        let select = if columns.is_empty() {
            "*".to_string()
        } else {
            columns.join(",")
        };
        self.get(table, &[("select", select), ("limit", "0".to_string())])
            .await
    }

    /// 嵌入查詢 `select=id,to(id)`，外鍵關聯不存在時後端會拒絕
    pub async fn probe_embed(&self, from: &str, to: &str) -> Result<QueryOutcome> {
        self.get(
            from,
            &[("select", format!("id,{}(id)", to)), ("limit", "0".to_string())],
        )
        .await
    }

    async fn get(&self, table: &str, query: &[(&str, String)]) -> Result<QueryOutcome> {
        let url = self.table_url(table);
        tracing::debug!("GET {} {:?}", url, query);

        let mut request = self.client.get(&url).query(query);
        if !self.api_key.is_empty() {
            request = request
                .header("apikey", &self.api_key)
                .bearer_auth(&self.api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("Response status: {}", status);

        if status.is_success() {
            let body = response.text().await?;
            let rows = if body.trim().is_empty() {
                serde_json::Value::Array(Vec::new())
            } else {
                serde_json::from_str(&body)?
            };
            return Ok(QueryOutcome::Rows(rows));
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!("Failed to read error body: {}", e);
                String::new()
            }
        };
        Ok(QueryOutcome::Rejected(decode_error(status, &body)))
    }
}

fn decode_error(status: StatusCode, body: &str) -> ErrorDetail {
    let kind = format!("http_{}", status.as_u16());
    let fallback = status
        .canonical_reason()
        .map(|r| format!("{} {}", status.as_u16(), r))
        .unwrap_or_else(|| status.to_string());

    match serde_json::from_str::<PostgrestError>(body) {
        Ok(err) => {
            let message = err
                .message
                .filter(|m| !m.is_empty())
                .or(err.details)
                .unwrap_or(fallback);
            ErrorDetail {
                kind,
                message,
                code: err.code,
                hint: err.hint,
            }
        }
        Err(_) => {
            let message = if body.trim().is_empty() {
                fallback
            } else {
                body.trim().to_string()
            };
            ErrorDetail::new(kind, message)
        }
    }
}

/// 從 `[{"count": n}]` 取出筆數
pub fn extract_count(rows: &serde_json::Value) -> Option<u64> {
    rows.as_array()?
        .first()?
        .get("count")?
        .as_u64()
}
