//! Starts or stops a StreamLink flow

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tfplug::context::Context;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceSchemaRequest, ResourceSchemaResponse,
    ResourceWithConfigure, UpdateResourceRequest, UpdateResourceResponse,
};
use tfplug::schema::SchemaBuilder;
use tfplug::types::DynamicValue;

use super::common::{api_error, boolean, decode, encode_state, id_attribute, not_configured, string};
use crate::api::ApiError;
use crate::log::log_elapsed;
use crate::provider_data::MpsProviderData;
use crate::retry::with_retry;

const TYPE_NAME: &str = "tencentcloud_mps_start_flow_operation";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StartFlowOperationModel {
    pub id: Option<String>,
    pub flow_id: Option<String>,
    pub start: Option<bool>,
}

#[derive(Default)]
pub struct StartFlowOperationResource {
    provider_data: Option<MpsProviderData>,
}

impl StartFlowOperationResource {
    pub fn new() -> Self {
        Self::default()
    }

    async fn switch_flow(
        ctx: &Context,
        data: &MpsProviderData,
        flow_id: &str,
        start: bool,
    ) -> Result<(), ApiError> {
        let client = &data.client;
        if start {
            with_retry(&data.write_retry, || client.start_stream_link_flow(ctx, flow_id)).await
        } else {
            with_retry(&data.write_retry, || client.stop_stream_link_flow(ctx, flow_id)).await
        }
    }
}

#[async_trait]
impl Resource for StartFlowOperationResource {
    fn type_name(&self) -> &str {
        TYPE_NAME
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .description("Provides a resource to start or stop a mps flow")
            .attribute(id_attribute("The flow ID."))
            .attribute(
                string("flow_id", "The flow ID.")
                    .required()
                    .force_new()
                    .build(),
            )
            .attribute(
                boolean("start", "`true` starts the flow, `false` stops it.")
                    .required()
                    .build(),
            )
            .build();

        ResourceSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let _elapsed = log_elapsed(&ctx, "resource.tencentcloud_mps_start_flow_operation.create");
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return CreateResourceResponse {
                new_state: DynamicValue::null(),
                private: vec![],
                diagnostics,
            };
        };

        let mut plan: StartFlowOperationModel = match decode(&request.config, "configuration") {
            Ok(plan) => plan,
            Err(diag) => {
                diagnostics.push(diag);
                return CreateResourceResponse {
                    new_state: DynamicValue::null(),
                    private: vec![],
                    diagnostics,
                };
            }
        };

        let flow_id = plan.flow_id.clone().unwrap_or_default();
        let start = plan.start.unwrap_or_default();
        if let Err(e) = Self::switch_flow(&ctx, data, &flow_id, start).await {
            let summary = if start {
                "Failed to start flow"
            } else {
                "Failed to stop flow"
            };
            diagnostics.push(api_error(summary, &e));
            return CreateResourceResponse {
                new_state: DynamicValue::null(),
                private: vec![],
                diagnostics,
            };
        }

        plan.id = Some(flow_id);
        CreateResourceResponse {
            new_state: encode_state(&plan, &mut diagnostics),
            private: vec![],
            diagnostics,
        }
    }

    async fn read(&self, _ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        ReadResourceResponse {
            new_state: Some(request.current_state),
            diagnostics: vec![],
            private: request.private,
        }
    }

    async fn update(&self, ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let _elapsed = log_elapsed(&ctx, "resource.tencentcloud_mps_start_flow_operation.update");
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return UpdateResourceResponse {
                new_state: DynamicValue::null(),
                private: vec![],
                diagnostics,
            };
        };

        let decoded = decode::<StartFlowOperationModel>(&request.prior_state, "prior state")
            .and_then(|prior| {
                let plan: StartFlowOperationModel = decode(&request.config, "configuration")?;
                Ok((prior, plan))
            });
        let (prior, mut plan) = match decoded {
            Ok(decoded) => decoded,
            Err(diag) => {
                diagnostics.push(diag);
                return UpdateResourceResponse {
                    new_state: DynamicValue::null(),
                    private: vec![],
                    diagnostics,
                };
            }
        };
        plan.id = prior.id.clone();

        if plan.start != prior.start {
            let flow_id = plan.flow_id.clone().unwrap_or_default();
            let start = plan.start.unwrap_or_default();
            if let Err(e) = Self::switch_flow(&ctx, data, &flow_id, start).await {
                let summary = if start {
                    "Failed to start flow"
                } else {
                    "Failed to stop flow"
                };
                diagnostics.push(api_error(summary, &e));
                return UpdateResourceResponse {
                    new_state: DynamicValue::null(),
                    private: vec![],
                    diagnostics,
                };
            }
        }

        UpdateResourceResponse {
            new_state: encode_state(&plan, &mut diagnostics),
            private: vec![],
            diagnostics,
        }
    }

    async fn delete(&self, _ctx: Context, _request: DeleteResourceRequest) -> DeleteResourceResponse {
        DeleteResourceResponse {
            diagnostics: vec![],
        }
    }
}

#[async_trait]
impl ResourceWithConfigure for StartFlowOperationResource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse {
        let mut diagnostics = vec![];

        match MpsProviderData::from_configure(request.provider_data, "resource") {
            Ok(data) => self.provider_data = Some(data),
            Err(diag) => diagnostics.push(diag),
        }

        ConfigureResourceResponse { diagnostics }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tfplug::types::ClientCapabilities;

    #[tokio::test]
    async fn read_keeps_state() {
        let resource = StartFlowOperationResource::new();
        let state = DynamicValue::encode(&StartFlowOperationModel {
            id: Some("flow-1".into()),
            flow_id: Some("flow-1".into()),
            start: Some(true),
        })
        .unwrap();

        let response = resource
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: TYPE_NAME.to_string(),
                    current_state: state.clone(),
                    private: vec![],
                    provider_meta: None,
                    client_capabilities: ClientCapabilities::default(),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
        assert_eq!(response.new_state, Some(state));
    }

    #[test]
    fn operation_is_not_importable() {
        let resource = StartFlowOperationResource::new();
        assert!(resource.as_importable().is_none());
    }
}
