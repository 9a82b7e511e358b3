//! Shared setup for tests that run handlers against a mock MPS endpoint

use mockito::{Matcher, Mock, ServerGuard};
use serde_json::{json, Value};
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tencentcloud_mps::api::pool::ConnectionPoolConfig;
use tencentcloud_mps::api::{Client, ClientConfig, Credential};
use tencentcloud_mps::provider_data::MpsProviderData;
use tencentcloud_mps::TencentCloudProvider;
use tfplug::context::Context;
use tfplug::data_source::{ConfigureDataSourceRequest, DataSourceWithConfigure};
use tfplug::provider::Provider;
use tfplug::resource::{ConfigureResourceRequest, ResourceWithConfigure};
use tfplug::retry::RetryPolicy;
use tfplug::types::DynamicValue;

pub fn provider_data(server: &ServerGuard) -> Arc<dyn Any + Send + Sync> {
    let client = Client::new(ClientConfig {
        credential: Credential {
            secret_id: "AKIDtest".to_string(),
            secret_key: "secret".to_string(),
            token: None,
        },
        region: "ap-guangzhou".to_string(),
        endpoint: server.url(),
        pool: ConnectionPoolConfig::default(),
    })
    .unwrap();

    let quick = RetryPolicy {
        timeout: Duration::from_millis(200),
        initial_backoff: Duration::from_millis(10),
        max_backoff: Duration::from_millis(50),
    };
    Arc::new(MpsProviderData::new(client).with_retry_policies(quick, quick))
}

pub async fn resource(server: &ServerGuard, type_name: &str) -> Box<dyn ResourceWithConfigure> {
    let factories = TencentCloudProvider::new().resources();
    let mut resource = factories.get(type_name).unwrap()();
    let response = resource
        .configure(
            Context::new(),
            ConfigureResourceRequest {
                provider_data: Some(provider_data(server)),
            },
        )
        .await;
    assert!(response.diagnostics.is_empty());
    resource
}

pub async fn data_source(
    server: &ServerGuard,
    type_name: &str,
) -> Box<dyn DataSourceWithConfigure> {
    let factories = TencentCloudProvider::new().data_sources();
    let mut data_source = factories.get(type_name).unwrap()();
    let response = data_source
        .configure(
            Context::new(),
            ConfigureDataSourceRequest {
                provider_data: Some(provider_data(server)),
            },
        )
        .await;
    assert!(response.diagnostics.is_empty());
    data_source
}

pub fn value(json: Value) -> DynamicValue {
    DynamicValue::new(tfplug::value::from_json(&json))
}

pub fn to_json(value: &DynamicValue) -> Value {
    tfplug::value::to_json(&value.value)
}

/// Wraps `body` the way MPS does, adding a request id.
pub fn mps_body(mut body: Value) -> String {
    if let Some(fields) = body.as_object_mut() {
        fields.insert("RequestId".to_string(), json!("req-test"));
    }
    json!({ "Response": body }).to_string()
}

pub fn mps_error(code: &str) -> String {
    mps_body(json!({"Error": {"Code": code, "Message": "mock failure"}}))
}

/// Starts a mock for `action` answering with `body`.
pub async fn mock_action(server: &mut ServerGuard, action: &str, body: Value) -> Mock {
    server
        .mock("POST", "/")
        .match_header("x-tc-action", action)
        .match_header("x-tc-version", "2019-06-12")
        .with_header("content-type", "application/json")
        .with_body(mps_body(body))
        .create_async()
        .await
}

/// Like [`mock_action`], also requiring the request body to contain `request`.
pub async fn mock_request(
    server: &mut ServerGuard,
    action: &str,
    request: Value,
    body: Value,
) -> Mock {
    server
        .mock("POST", "/")
        .match_header("x-tc-action", action)
        .match_body(Matcher::PartialJson(request))
        .with_header("content-type", "application/json")
        .with_body(mps_body(body))
        .create_async()
        .await
}
