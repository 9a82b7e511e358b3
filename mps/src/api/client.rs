use chrono::Utc;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tfplug::context::Context;

use super::common::{ErrorEnvelope, ResponseEnvelope};
use super::error::ApiError;
use super::pool::{ConnectionPoolConfig, ConnectionPoolManager, ConnectionStats};
use super::signer::{self, Credential, Signer};

pub const SERVICE: &str = "mps";
pub const API_VERSION: &str = "2019-06-12";
pub const DEFAULT_DOMAIN: &str = "tencentcloudapi.com";
const LANGUAGE: &str = "en-US";

/// Settings needed to reach one regional MPS endpoint
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub credential: Credential,
    pub region: String,
    /// Full URL of the service, e.g. `https://mps.tencentcloudapi.com`
    pub endpoint: String,
    pub pool: ConnectionPoolConfig,
}

impl ClientConfig {
    /// `<protocol>://mps.<domain>`
    pub fn endpoint_for(protocol: &str, domain: &str) -> String {
        format!("{}://{}.{}", protocol.to_lowercase(), SERVICE, domain)
    }
}

/// MPS API client
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    endpoint: String,
    host: String,
    region: String,
    credential: Credential,
    pool_manager: ConnectionPoolManager,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let url = url::Url::parse(&config.endpoint)
            .map_err(|e| ApiError::InvalidEndpoint(format!("{}: {}", config.endpoint, e)))?;
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => return Err(ApiError::InvalidEndpoint(config.endpoint)),
        };

        let pool_manager = ConnectionPoolManager::new(config.pool);
        let http_client = pool_manager.build_client()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                endpoint: config.endpoint.trim_end_matches('/').to_string() + "/",
                host,
                region: config.region,
                credential: config.credential,
                pool_manager,
            }),
        })
    }

    pub fn region(&self) -> &str {
        &self.inner.region
    }

    /// Performs one signed call of `action`. Retrying is up to the caller.
    pub async fn call<Req, Resp>(
        &self,
        ctx: &Context,
        action: &str,
        request: &Req,
    ) -> Result<Resp, ApiError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let body = serde_json::to_string(request)
            .map_err(|e| ApiError::ParseError(format!("Failed to encode request: {}", e)))?;
        let timestamp = Utc::now().timestamp();
        let authorization = Signer::new(&self.inner.credential, SERVICE).authorization(
            &self.inner.host,
            &body,
            timestamp,
        )?;

        let mut builder = self
            .inner
            .http_client
            .post(&self.inner.endpoint)
            .header(AUTHORIZATION, authorization)
            .header(CONTENT_TYPE, signer::CONTENT_TYPE)
            .header("X-TC-Action", action)
            .header("X-TC-Version", API_VERSION)
            .header("X-TC-Timestamp", timestamp.to_string())
            .header("X-TC-Region", &self.inner.region)
            .header("X-TC-Language", LANGUAGE)
            .body(body.clone());
        if let Some(token) = &self.inner.credential.token {
            builder = builder.header("X-TC-Token", token);
        }

        let result = match builder.send().await {
            Ok(response) => {
                let status = response.status();
                match response.text().await {
                    Ok(text) => parse_response(status, &text).map(|resp| (resp, text)),
                    Err(e) => Err(ApiError::RequestError(e)),
                }
            }
            Err(e) => Err(ApiError::RequestError(e)),
        };

        self.inner
            .pool_manager
            .record_request(action, result.is_ok())
            .await;

        match result {
            Ok((resp, text)) => {
                tracing::debug!(
                    "{} api[{}] success, request body [{}], response body [{}]",
                    ctx.log_id(),
                    action,
                    body,
                    text
                );
                Ok(resp)
            }
            Err(e) => {
                tracing::error!(
                    "{} api[{}] fail, request body [{}], reason[{}]",
                    ctx.log_id(),
                    action,
                    body,
                    e
                );
                Err(e)
            }
        }
    }

    pub async fn get_connection_stats(&self) -> ConnectionStats {
        self.inner.pool_manager.get_stats().await
    }
}

fn parse_response<Resp: DeserializeOwned>(
    status: reqwest::StatusCode,
    text: &str,
) -> Result<Resp, ApiError> {
    let envelope = match serde_json::from_str::<ResponseEnvelope>(text) {
        Ok(envelope) => envelope,
        Err(_) if !status.is_success() => {
            return Err(ApiError::HttpError {
                status: status.as_u16(),
                message: text.to_string(),
            });
        }
        Err(e) => {
            return Err(ApiError::ParseError(format!(
                "Failed to parse response: {}",
                e
            )))
        }
    };

    let error = serde_json::from_value::<ErrorEnvelope>(envelope.response.clone())
        .map_err(|e| ApiError::ParseError(e.to_string()))?;
    if let Some(info) = error.error {
        return Err(ApiError::ServiceError {
            code: info.code,
            message: info.message,
            request_id: error.request_id,
        });
    }

    if !status.is_success() {
        return Err(ApiError::HttpError {
            status: status.as_u16(),
            message: text.to_string(),
        });
    }

    serde_json::from_value(envelope.response).map_err(|e| ApiError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "PascalCase")]
    struct CreateResponse {
        definition: u64,
        request_id: String,
    }

    fn client(url: &str, token: Option<&str>) -> Client {
        Client::new(ClientConfig {
            credential: Credential {
                secret_id: "AKIDEXAMPLE".to_string(),
                secret_key: "secret".to_string(),
                token: token.map(str::to_string),
            },
            region: "ap-guangzhou".to_string(),
            endpoint: url.to_string(),
            pool: ConnectionPoolConfig::default(),
        })
        .unwrap()
    }

    #[test]
    fn endpoint_for_lowercases_protocol() {
        assert_eq!(
            ClientConfig::endpoint_for("HTTPS", DEFAULT_DOMAIN),
            "https://mps.tencentcloudapi.com"
        );
    }

    #[test]
    fn rejects_invalid_endpoint() {
        let result = Client::new(ClientConfig {
            credential: Credential {
                secret_id: "a".into(),
                secret_key: "b".into(),
                token: None,
            },
            region: "ap-guangzhou".into(),
            endpoint: "not a url".into(),
            pool: ConnectionPoolConfig::default(),
        });
        assert!(matches!(result, Err(ApiError::InvalidEndpoint(_))));
    }

    #[tokio::test]
    async fn call_sends_signed_headers_and_unwraps_response() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_header("x-tc-action", "CreateTranscodeTemplate")
            .match_header("x-tc-version", API_VERSION)
            .match_header("x-tc-region", "ap-guangzhou")
            .match_header("x-tc-language", "en-US")
            .match_header("x-tc-token", "session")
            .match_header(
                "authorization",
                Matcher::Regex("^TC3-HMAC-SHA256 Credential=AKIDEXAMPLE/".to_string()),
            )
            .match_body(Matcher::Json(json!({"Container": "mp4"})))
            .with_body(r#"{"Response":{"Definition":1001,"RequestId":"req-1"}}"#)
            .create_async()
            .await;

        let client = client(&server.url(), Some("session"));
        let response: CreateResponse = client
            .call(
                &Context::new(),
                "CreateTranscodeTemplate",
                &json!({"Container": "mp4"}),
            )
            .await
            .unwrap();

        assert_eq!(response.definition, 1001);
        assert_eq!(response.request_id, "req-1");
        mock.assert_async().await;

        let stats = client.get_connection_stats().await;
        assert_eq!(stats.total_requests, 1);
        assert_eq!(stats.failed_requests, 0);
    }

    #[tokio::test]
    async fn service_error_is_surfaced_with_code() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_body(
                r#"{"Response":{"Error":{"Code":"ResourceNotFound.FlowNotExist","Message":"flow not exist"},"RequestId":"req-2"}}"#,
            )
            .create_async()
            .await;

        let client = client(&server.url(), None);
        let err = client
            .call::<_, CreateResponse>(&Context::new(), "DescribeStreamLinkFlow", &json!({}))
            .await
            .unwrap_err();

        assert_eq!(err.code(), Some("ResourceNotFound.FlowNotExist"));
        assert!(err.is_not_found());
        match err {
            ApiError::ServiceError { request_id, .. } => assert_eq!(request_id, "req-2"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(client.get_connection_stats().await.failed_requests, 1);
    }

    #[tokio::test]
    async fn non_json_server_error_keeps_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;

        let client = client(&server.url(), None);
        let err = client
            .call::<_, CreateResponse>(&Context::new(), "DescribeTasks", &json!({}))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(502));
    }

    #[tokio::test]
    async fn network_error_is_request_error() {
        let client = client("http://127.0.0.1:9", None);
        let result = client
            .call::<_, CreateResponse>(&Context::new(), "DescribeTasks", &json!({}))
            .await;
        assert!(matches!(result, Err(ApiError::RequestError(_))));
    }
}
