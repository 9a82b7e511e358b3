pub mod api;
pub mod data_sources;
pub mod log;
pub mod provider_data;
pub mod resources;
pub mod retry;
pub mod service;

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::data_source::DataSourceWithConfigure;
use tfplug::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, DataSourceFactory, Provider,
    ProviderMetadataRequest, ProviderMetadataResponse, ProviderSchemaRequest,
    ProviderSchemaResponse, ResourceFactory,
};
use tfplug::resource::ResourceWithConfigure;
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic};
use tfplug::validator::StringOneOf;

use api::client::DEFAULT_DOMAIN;
use api::pool::ConnectionPoolConfig;
use api::{Client, ClientConfig, Credential};
use provider_data::MpsProviderData;

pub const PROVIDER_NAME: &str = "tencentcloud";
const DEFAULT_PROTOCOL: &str = "HTTPS";

/// Provider arguments. Each falls back to an environment variable.
#[derive(Debug, Default, Deserialize)]
struct ProviderModel {
    secret_id: Option<String>,
    secret_key: Option<String>,
    security_token: Option<String>,
    region: Option<String>,
    protocol: Option<String>,
    domain: Option<String>,
    endpoint: Option<String>,
}

fn setting(configured: Option<String>, env_var: &str) -> Option<String> {
    configured
        .filter(|v| !v.is_empty())
        .or_else(|| std::env::var(env_var).ok().filter(|v| !v.is_empty()))
}

fn missing(name: &str, env_var: &str) -> Diagnostic {
    Diagnostic::error(
        format!(
            "{} is required (set in provider config or {} env var)",
            name, env_var
        ),
        "",
    )
    .with_attribute(AttributePath::new(name))
}

impl ProviderModel {
    fn client_config(self) -> Result<ClientConfig, Vec<Diagnostic>> {
        let secret_id = setting(self.secret_id, "TENCENTCLOUD_SECRET_ID");
        let secret_key = setting(self.secret_key, "TENCENTCLOUD_SECRET_KEY");
        let region = setting(self.region, "TENCENTCLOUD_REGION");

        let mut diagnostics = vec![];
        if secret_id.is_none() {
            diagnostics.push(missing("secret_id", "TENCENTCLOUD_SECRET_ID"));
        }
        if secret_key.is_none() {
            diagnostics.push(missing("secret_key", "TENCENTCLOUD_SECRET_KEY"));
        }
        if region.is_none() {
            diagnostics.push(missing("region", "TENCENTCLOUD_REGION"));
        }
        let (Some(secret_id), Some(secret_key), Some(region)) = (secret_id, secret_key, region)
        else {
            return Err(diagnostics);
        };

        let endpoint = setting(self.endpoint, "TENCENTCLOUD_MPS_ENDPOINT").unwrap_or_else(|| {
            let protocol = setting(self.protocol, "TENCENTCLOUD_PROTOCOL")
                .unwrap_or_else(|| DEFAULT_PROTOCOL.to_string());
            let domain = setting(self.domain, "TENCENTCLOUD_DOMAIN")
                .unwrap_or_else(|| DEFAULT_DOMAIN.to_string());
            ClientConfig::endpoint_for(&protocol, &domain)
        });

        Ok(ClientConfig {
            credential: Credential {
                secret_id,
                secret_key,
                token: setting(self.security_token, "TENCENTCLOUD_SECURITY_TOKEN"),
            },
            region,
            endpoint,
            pool: ConnectionPoolConfig::default(),
        })
    }
}

#[derive(Default)]
pub struct TencentCloudProvider;

impl TencentCloudProvider {
    pub fn new() -> Self {
        Self
    }
}

fn resource<R>(new: fn() -> R) -> ResourceFactory
where
    R: ResourceWithConfigure + 'static,
{
    Box::new(move || Box::new(new()) as Box<dyn ResourceWithConfigure>)
}

fn data_source<D>(new: fn() -> D) -> DataSourceFactory
where
    D: DataSourceWithConfigure + 'static,
{
    Box::new(move || Box::new(new()) as Box<dyn DataSourceWithConfigure>)
}

#[async_trait]
impl Provider for TencentCloudProvider {
    fn type_name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ProviderMetadataRequest,
    ) -> ProviderMetadataResponse {
        ProviderMetadataResponse {
            type_name: PROVIDER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    async fn schema(&self, _ctx: Context, _request: ProviderSchemaRequest) -> ProviderSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .description("Tencent Cloud Media Processing Service")
            .attribute(
                AttributeBuilder::new("secret_id", AttributeType::String)
                    .description("API secret ID. Can also be set with TENCENTCLOUD_SECRET_ID.")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("secret_key", AttributeType::String)
                    .description("API secret key. Can also be set with TENCENTCLOUD_SECRET_KEY.")
                    .optional()
                    .sensitive()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("security_token", AttributeType::String)
                    .description(
                        "Token of temporary credentials. Can also be set with TENCENTCLOUD_SECURITY_TOKEN.",
                    )
                    .optional()
                    .sensitive()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("region", AttributeType::String)
                    .description("Region of the MPS endpoint. Can also be set with TENCENTCLOUD_REGION.")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("protocol", AttributeType::String)
                    .description(
                        "`HTTP` or `HTTPS`, default `HTTPS`. Can also be set with TENCENTCLOUD_PROTOCOL.",
                    )
                    .optional()
                    .validator(StringOneOf::new(["HTTP", "HTTPS"]))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("domain", AttributeType::String)
                    .description(
                        "Root domain of the API, default `tencentcloudapi.com`. Can also be set with TENCENTCLOUD_DOMAIN.",
                    )
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("endpoint", AttributeType::String)
                    .description(
                        "Full URL of the MPS endpoint, overriding protocol and domain. Can also be set with TENCENTCLOUD_MPS_ENDPOINT.",
                    )
                    .optional()
                    .build(),
            )
            .build();

        ProviderSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn configure(
        &mut self,
        ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        let model: ProviderModel = match request.config.decode() {
            Ok(model) => model,
            Err(e) => {
                return ConfigureProviderResponse {
                    diagnostics: vec![Diagnostic::error(
                        "Invalid provider configuration",
                        e.to_string(),
                    )],
                    provider_data: None,
                }
            }
        };

        let config = match model.client_config() {
            Ok(config) => config,
            Err(diagnostics) => {
                return ConfigureProviderResponse {
                    diagnostics,
                    provider_data: None,
                }
            }
        };

        tracing::info!(
            "{} configuring MPS client for region {} at {}",
            ctx.log_id(),
            config.region,
            config.endpoint
        );
        match Client::new(config) {
            Ok(client) => ConfigureProviderResponse {
                diagnostics: vec![],
                provider_data: Some(Arc::new(MpsProviderData::new(client))),
            },
            Err(e) => ConfigureProviderResponse {
                diagnostics: vec![Diagnostic::error(
                    "Failed to create API client",
                    e.to_string(),
                )],
                provider_data: None,
            },
        }
    }

    fn resources(&self) -> HashMap<String, ResourceFactory> {
        use resources::*;

        HashMap::from([
            (
                "tencentcloud_mps_adaptive_dynamic_streaming_template".to_string(),
                resource(AdaptiveDynamicStreamingTemplateResource::new),
            ),
            (
                "tencentcloud_mps_ai_recognition_template".to_string(),
                resource(AiRecognitionTemplateResource::new),
            ),
            (
                "tencentcloud_mps_content_review_template".to_string(),
                resource(ContentReviewTemplateResource::new),
            ),
            (
                "tencentcloud_mps_edit_media_operation".to_string(),
                resource(EditMediaOperationResource::new),
            ),
            (
                "tencentcloud_mps_execute_function_operation".to_string(),
                resource(ExecuteFunctionOperationResource::new),
            ),
            ("tencentcloud_mps_flow".to_string(), resource(FlowResource::new)),
            ("tencentcloud_mps_input".to_string(), resource(InputResource::new)),
            (
                "tencentcloud_mps_manage_task_operation".to_string(),
                resource(ManageTaskOperationResource::new),
            ),
            ("tencentcloud_mps_output".to_string(), resource(OutputResource::new)),
            ("tencentcloud_mps_schedule".to_string(), resource(ScheduleResource::new)),
            (
                "tencentcloud_mps_start_flow_operation".to_string(),
                resource(StartFlowOperationResource::new),
            ),
            (
                "tencentcloud_mps_transcode_template".to_string(),
                resource(TranscodeTemplateResource::new),
            ),
            (
                "tencentcloud_mps_watermark_template".to_string(),
                resource(WatermarkTemplateResource::new),
            ),
        ])
    }

    fn data_sources(&self) -> HashMap<String, DataSourceFactory> {
        use data_sources::*;

        HashMap::from([
            (
                "tencentcloud_mps_adaptive_dynamic_streaming_templates".to_string(),
                data_source(AdaptiveDynamicStreamingTemplatesDataSource::new),
            ),
            (
                "tencentcloud_mps_content_review_templates".to_string(),
                data_source(ContentReviewTemplatesDataSource::new),
            ),
            (
                "tencentcloud_mps_schedules".to_string(),
                data_source(SchedulesDataSource::new),
            ),
            (
                "tencentcloud_mps_tasks".to_string(),
                data_source(TasksDataSource::new),
            ),
            (
                "tencentcloud_mps_transcode_templates".to_string(),
                data_source(TranscodeTemplatesDataSource::new),
            ),
        ])
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use serde_json::json;
    use serial_test::serial;
    use tfplug::types::{ClientCapabilities, DynamicValue};

    const ENV_VARS: [&str; 7] = [
        "TENCENTCLOUD_SECRET_ID",
        "TENCENTCLOUD_SECRET_KEY",
        "TENCENTCLOUD_SECURITY_TOKEN",
        "TENCENTCLOUD_REGION",
        "TENCENTCLOUD_PROTOCOL",
        "TENCENTCLOUD_DOMAIN",
        "TENCENTCLOUD_MPS_ENDPOINT",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    fn configure_request(config: serde_json::Value) -> ConfigureProviderRequest {
        let mut full = json!({
            "secret_id": null,
            "secret_key": null,
            "security_token": null,
            "region": null,
            "protocol": null,
            "domain": null,
            "endpoint": null
        });
        if let (Some(full), Some(config)) = (full.as_object_mut(), config.as_object()) {
            for (k, v) in config {
                full.insert(k.clone(), v.clone());
            }
        }

        ConfigureProviderRequest {
            terraform_version: "1.9.0".to_string(),
            config: DynamicValue::new(tfplug::value::from_json(&full)),
            client_capabilities: ClientCapabilities::default(),
        }
    }

    #[tokio::test]
    #[serial]
    async fn provider_configures_successfully_with_env_vars() {
        clear_env();
        std::env::set_var("TENCENTCLOUD_SECRET_ID", "AKIDexample");
        std::env::set_var("TENCENTCLOUD_SECRET_KEY", "secret");
        std::env::set_var("TENCENTCLOUD_REGION", "ap-guangzhou");

        let mut provider = TencentCloudProvider::new();
        let response = provider
            .configure(Context::new(), configure_request(json!({})))
            .await;

        assert!(response.diagnostics.is_empty());
        let data = response
            .provider_data
            .and_then(|data| data.downcast_ref::<MpsProviderData>().cloned())
            .unwrap();
        assert_eq!(data.client.region(), "ap-guangzhou");

        clear_env();
    }

    #[tokio::test]
    #[serial]
    async fn provider_config_wins_over_env_vars() {
        clear_env();
        std::env::set_var("TENCENTCLOUD_REGION", "ap-guangzhou");

        let mut provider = TencentCloudProvider::new();
        let response = provider
            .configure(
                Context::new(),
                configure_request(json!({
                    "secret_id": "AKIDexample",
                    "secret_key": "secret",
                    "region": "ap-singapore"
                })),
            )
            .await;

        assert!(response.diagnostics.is_empty());
        let data = response
            .provider_data
            .and_then(|data| data.downcast_ref::<MpsProviderData>().cloned())
            .unwrap();
        assert_eq!(data.client.region(), "ap-singapore");

        clear_env();
    }

    #[tokio::test]
    #[serial]
    async fn provider_configure_requires_secret_id() {
        clear_env();
        std::env::set_var("TENCENTCLOUD_SECRET_KEY", "secret");
        std::env::set_var("TENCENTCLOUD_REGION", "ap-guangzhou");

        let mut provider = TencentCloudProvider::new();
        let response = provider
            .configure(Context::new(), configure_request(json!({})))
            .await;

        assert!(response.provider_data.is_none());
        assert_eq!(response.diagnostics.len(), 1);
        assert!(response.diagnostics[0]
            .summary
            .contains("secret_id is required"));
        assert!(response.diagnostics[0]
            .summary
            .contains("TENCENTCLOUD_SECRET_ID"));

        clear_env();
    }

    #[tokio::test]
    #[serial]
    async fn provider_configure_reports_every_missing_argument() {
        clear_env();

        let mut provider = TencentCloudProvider::new();
        let response = provider
            .configure(Context::new(), configure_request(json!({})))
            .await;

        let summaries: Vec<_> = response
            .diagnostics
            .iter()
            .map(|d| d.summary.as_str())
            .collect();
        assert_eq!(summaries.len(), 3);
        assert!(summaries[1].starts_with("secret_key is required"));
        assert!(summaries[2].starts_with("region is required"));
    }

    #[test]
    #[serial]
    fn endpoint_follows_protocol_and_domain() {
        clear_env();
        std::env::set_var("TENCENTCLOUD_DOMAIN", "internal.tencentcloudapi.com");

        let model = ProviderModel {
            secret_id: Some("AKIDexample".into()),
            secret_key: Some("secret".into()),
            region: Some("ap-guangzhou".into()),
            protocol: Some("HTTP".into()),
            ..Default::default()
        };
        let config = model.client_config().unwrap();
        assert_eq!(config.endpoint, "http://mps.internal.tencentcloudapi.com");

        std::env::set_var("TENCENTCLOUD_MPS_ENDPOINT", "http://127.0.0.1:9000");
        let model = ProviderModel {
            secret_id: Some("AKIDexample".into()),
            secret_key: Some("secret".into()),
            region: Some("ap-guangzhou".into()),
            ..Default::default()
        };
        let config = model.client_config().unwrap();
        assert_eq!(config.endpoint, "http://127.0.0.1:9000");

        clear_env();
    }

    #[test]
    fn provider_registers_every_resource_and_data_source() {
        let provider = TencentCloudProvider::new();

        let resources = provider.resources();
        assert_eq!(resources.len(), 13);
        for (name, factory) in &resources {
            assert_eq!(factory().type_name(), name);
        }

        let data_sources = provider.data_sources();
        assert_eq!(data_sources.len(), 5);
        for (name, factory) in &data_sources {
            assert_eq!(factory().type_name(), name);
        }
    }
}
