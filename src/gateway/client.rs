//! Table API client for the record store.
//!
//! Uses reqwest with JSON bodies. All requests target
//! `{instance}/api/now/table/{table}`; session auth is expected to be
//! handled by the surrounding transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::de::DeserializeOwned;
use url::Url;

use super::{list_limit, stage_query, RecordGateway, RESULT_KEY};
use crate::config::Config;
use crate::error::GatewayError;
use crate::record::{FieldMap, Record, RecordKind};

const TABLE_API_PATH: &str = "api/now/table/";

pub struct TableApiClient {
    client: reqwest::Client,
    base: Url,
}

impl TableApiClient {
    pub fn new(instance: Url, timeout: Duration) -> Result<Self, GatewayError> {
        if instance.cannot_be_a_base() {
            return Err(GatewayError::InvalidUrl(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        let mut base = instance;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let base = base.join(TABLE_API_PATH)?;

        Ok(Self { client, base })
    }

    pub fn from_config(config: &Config) -> Result<Self, GatewayError> {
        let instance = Url::parse(&config.instance_url)?;
        Self::new(instance, Duration::from_secs(config.request_timeout_secs))
    }

    fn table_url(&self, kind: RecordKind, id: Option<&str>) -> Result<Url, GatewayError> {
        let mut url = self.base.join(kind.table())?;
        if let Some(id) = id {
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.push(id);
            }
        }
        Ok(url)
    }

    /// URL for a list call, with the stage filter and the hard cap.
    pub fn list_url(&self, kind: RecordKind, stage: Option<&str>) -> Result<Url, GatewayError> {
        let mut url = self.table_url(kind, None)?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(stage) = stage {
                query.append_pair("sysparm_query", &stage_query(kind, stage));
            }
            query.append_pair("sysparm_limit", &list_limit(kind).to_string());
        }
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, GatewayError> {
        let resp = request.send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            log::warn!("Record store error {}: {}", status, body);
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await?;
        let envelope: serde_json::Value = serde_json::from_slice(&bytes)?;
        unwrap_envelope(envelope)
    }
}

/// Pull the payload out of `{"result": ...}`.
pub(crate) fn unwrap_envelope<T: DeserializeOwned>(
    mut envelope: serde_json::Value,
) -> Result<T, GatewayError> {
    let payload = envelope
        .get_mut(RESULT_KEY)
        .map(serde_json::Value::take)
        .ok_or(GatewayError::Envelope(RESULT_KEY))?;
    Ok(serde_json::from_value(payload)?)
}

#[async_trait]
impl RecordGateway for TableApiClient {
    async fn list(&self, kind: RecordKind, stage: Option<&str>) -> Result<Vec<Record>, GatewayError> {
        let url = self.list_url(kind, stage)?;
        log::debug!("GET {}", url);

        let records: Vec<Record> = self.send(self.client.get(url)).await?;
        if super::is_possibly_truncated(kind, records.len()) {
            log::warn!(
                "{} list hit the {}-record cap; results may be truncated",
                kind,
                list_limit(kind)
            );
        }
        Ok(records)
    }

    async fn update(
        &self,
        kind: RecordKind,
        id: &str,
        fields: &FieldMap,
    ) -> Result<Record, GatewayError> {
        let url = self.table_url(kind, Some(id))?;
        log::debug!("PATCH {} ({} fields)", url, fields.len());
        self.send(self.client.patch(url).json(fields)).await
    }

    async fn create(&self, kind: RecordKind, fields: &FieldMap) -> Result<Record, GatewayError> {
        if !matches!(kind, RecordKind::Lead | RecordKind::Opportunity) {
            return Err(GatewayError::Unsupported {
                operation: "create",
                kind,
            });
        }
        let url = self.table_url(kind, None)?;
        log::debug!("POST {}", url);
        self.send(self.client.post(url).json(fields)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FieldValue;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    fn client_for(base: &str) -> TableApiClient {
        TableApiClient::new(Url::parse(base).unwrap(), Duration::from_secs(5)).unwrap()
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let body_len = head
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + body_len {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Serve one canned response and hand back the raw request.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            request
        });
        (format!("http://{}", addr), handle)
    }

    #[test]
    fn test_list_url_serializes_filter_and_cap() {
        let client = client_for("https://dev.example.com");
        let url = client.list_url(RecordKind::Lead, Some("Qualified")).unwrap();

        assert_eq!(url.path(), "/api/now/table/x_dxc_advisor_lead");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("sysparm_query".to_string(), "stage=Qualified".to_string()),
                ("sysparm_limit".to_string(), "1000".to_string()),
            ]
        );
    }

    #[test]
    fn test_list_url_without_filter_only_caps() {
        let client = client_for("https://dev.example.com/");
        let url = client.list_url(RecordKind::Activity, None).unwrap();

        assert_eq!(url.path(), "/api/now/table/sys_ui_list_recent");
        assert_eq!(url.query(), Some("sysparm_limit=50"));
    }

    #[test]
    fn test_base_path_is_preserved() {
        let client = client_for("https://proxy.example.com/sn");
        let url = client.table_url(RecordKind::Quote, Some("a b")).unwrap();

        assert_eq!(url.path(), "/sn/api/now/table/x_dxc_advisor_quote/a%20b");
    }

    #[test]
    fn test_unwrap_envelope() {
        let envelope = serde_json::json!({ "result": [{ "sys_id": "1", "stage": "New" }] });
        let records: Vec<Record> = unwrap_envelope(envelope).unwrap();
        assert_eq!(records[0].id(), Some("1"));

        let missing = serde_json::json!({ "error": { "message": "nope" } });
        let err = unwrap_envelope::<Vec<Record>>(missing).unwrap_err();
        assert!(matches!(err, GatewayError::Envelope("result")));
    }

    #[tokio::test]
    async fn test_list_sends_filter_and_unwraps_result() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"result":[{"sys_id":"1","stage":"Qualified"},{"sys_id":"2","stage":"Qualified"}]}"#,
        )
        .await;
        let client = client_for(&base);

        let records = client.list(RecordKind::Lead, Some("Qualified")).await.unwrap();
        let request = server.await.unwrap();

        assert_eq!(records.len(), 2);
        assert!(request.starts_with(
            "GET /api/now/table/x_dxc_advisor_lead?sysparm_query=stage%3DQualified&sysparm_limit=1000 "
        ));
    }

    #[tokio::test]
    async fn test_update_patches_by_id() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"result":{"sys_id":"42","stage":"Contacted"}}"#,
        )
        .await;
        let client = client_for(&base);
        let mut fields = FieldMap::new();
        fields.insert("stage".to_string(), FieldValue::from("Contacted"));

        let record = client.update(RecordKind::Lead, "42", &fields).await.unwrap();
        let request = server.await.unwrap();

        assert_eq!(record.stage(RecordKind::Lead), Some("Contacted"));
        assert!(request.starts_with("PATCH /api/now/table/x_dxc_advisor_lead/42 "));
        assert!(request.ends_with(r#"{"stage":"Contacted"}"#));
    }

    #[tokio::test]
    async fn test_non_success_status_surfaces() {
        let (base, server) = serve_once("503 Service Unavailable", r#"{"error":"down"}"#).await;
        let client = client_for(&base);

        let err = client.list(RecordKind::Quote, None).await.unwrap_err();
        server.await.unwrap();

        match err {
            GatewayError::Status { status, body } => {
                assert_eq!(status, 503);
                assert!(body.contains("down"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = client_for(&format!("http://{}", addr));

        let err = client.list(RecordKind::Lead, None).await.unwrap_err();
        assert!(matches!(err, GatewayError::Transport(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_create_posts_to_table() {
        let (base, server) = serve_once(
            "201 Created",
            r#"{"result":{"sys_id":"new1","number":"LEAD0003","stage":"New"}}"#,
        )
        .await;
        let client = client_for(&base);
        let mut fields = FieldMap::new();
        fields.insert("first_name".to_string(), FieldValue::from("Ada"));
        fields.insert("stage".to_string(), FieldValue::from("New"));

        let record = client.create(RecordKind::Lead, &fields).await.unwrap();
        let request = server.await.unwrap();

        assert_eq!(record.id(), Some("new1"));
        assert!(request.starts_with("POST /api/now/table/x_dxc_advisor_lead "));
    }

    #[tokio::test]
    async fn test_create_unsupported_for_quotes() {
        let client = client_for("https://dev.example.com");
        let err = client
            .create(RecordKind::Quote, &FieldMap::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Unsupported {
                operation: "create",
                kind: RecordKind::Quote
            }
        ));
    }
}
