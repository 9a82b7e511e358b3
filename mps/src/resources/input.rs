//! Settings of an input that already belongs to a StreamLink flow

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tfplug::context::Context;
use tfplug::import::import_state_passthrough_id;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceSchemaRequest, ResourceSchemaResponse,
    ResourceWithConfigure, ResourceWithImportState, UpdateResourceRequest, UpdateResourceResponse,
};
use tfplug::schema::SchemaBuilder;
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};
use tfplug::value::single_block;

use super::common::{
    api_error, decode, encode_state, id_attribute, not_configured, require_id, split_id, string,
    warn_vanished, written_state, ID_SEPARATOR,
};
use super::flow::{flow_input_block, FlowInputModel};
use crate::api::stream_link::ModifyInputRequest;
use crate::api::ApiError;
use crate::log::log_elapsed;
use crate::provider_data::MpsProviderData;
use crate::retry::with_retry;

const TYPE_NAME: &str = "tencentcloud_mps_input";
const WHAT: &str = "input";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputModel {
    pub id: Option<String>,
    pub flow_id: Option<String>,
    pub input_id: Option<String>,
    #[serde(default, with = "single_block")]
    pub input_group: Option<FlowInputModel>,
}

impl InputModel {
    fn ids(&self) -> Result<(String, String), Diagnostic> {
        let [flow_id, input_id] = split_id::<2>(require_id(self.id.as_deref())?)?;
        Ok((flow_id.to_string(), input_id.to_string()))
    }

    /// State for a described input. Settings are only tracked when they were
    /// configured, or when nothing is known yet as after an import.
    fn described(
        flow_id: &str,
        input_id: &str,
        mut input: FlowInputModel,
        known: &InputModel,
    ) -> Self {
        let tracked = known.flow_id.is_none() || known.input_group.is_some();
        input.keep_secrets_from(known.input_group.as_ref());
        Self {
            id: Some(format!("{}{}{}", flow_id, ID_SEPARATOR, input_id)),
            flow_id: Some(flow_id.to_string()),
            input_id: Some(input_id.to_string()),
            input_group: tracked.then_some(input),
        }
    }
}

#[derive(Default)]
pub struct InputResource {
    provider_data: Option<MpsProviderData>,
}

impl InputResource {
    pub fn new() -> Self {
        Self::default()
    }

    async fn read_input(
        ctx: &Context,
        data: &MpsProviderData,
        flow_id: &str,
        input_id: &str,
        known: &InputModel,
    ) -> Result<Option<InputModel>, ApiError> {
        let service = data.service();
        let input = with_retry(&data.read_retry, || {
            service.describe_input_by_id(ctx, flow_id, input_id)
        })
        .await?;
        Ok(input.map(|input| InputModel::described(flow_id, input_id, input.into(), known)))
    }

    async fn modify_input(
        ctx: &Context,
        data: &MpsProviderData,
        flow_id: &str,
        input_id: &str,
        input: &FlowInputModel,
    ) -> Result<(), ApiError> {
        let request = ModifyInputRequest {
            flow_id: flow_id.to_string(),
            input: input.clone().into_api(Some(input_id.to_string())),
        };
        let client = &data.client;
        with_retry(&data.write_retry, || {
            client.modify_stream_link_input(ctx, &request)
        })
        .await
    }
}

#[async_trait]
impl Resource for InputResource {
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
            .description("Provides a resource to configure a mps input")
            .attribute(id_attribute("The flow ID and input ID joined by `#`."))
            .attribute(
                string("flow_id", "The ID of the flow the input belongs to.")
                    .required()
                    .force_new()
                    .build(),
            )
            .attribute(
                string("input_id", "The input ID.")
                    .required()
                    .force_new()
                    .build(),
            )
            .block(
                flow_input_block("input_group")
                    .description("The input settings.")
                    .single()
                    .build(),
            )
            .build();

        ResourceSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let _elapsed = log_elapsed(&ctx, "resource.tencentcloud_mps_input.create");
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return CreateResourceResponse {
                new_state: DynamicValue::null(),
                private: vec![],
                diagnostics,
            };
        };

        let mut plan: InputModel = match decode(&request.config, "configuration") {
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
        let input_id = plan.input_id.clone().unwrap_or_default();
        plan.id = Some(format!("{}{}{}", flow_id, ID_SEPARATOR, input_id));

        if let Some(input) = &plan.input_group {
            if let Err(e) = Self::modify_input(&ctx, data, &flow_id, &input_id, input).await {
                diagnostics.push(api_error("Failed to configure input", &e));
                return CreateResourceResponse {
                    new_state: DynamicValue::null(),
                    private: vec![],
                    diagnostics,
                };
            }
        }

        let read_back = Self::read_input(&ctx, data, &flow_id, &input_id, &plan).await;
        let new_state = written_state(&plan, read_back, WHAT, &mut diagnostics);

        CreateResourceResponse {
            new_state,
            private: vec![],
            diagnostics,
        }
    }

    async fn read(&self, ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let _elapsed = log_elapsed(&ctx, "resource.tencentcloud_mps_input.read");
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics,
                private: request.private,
            };
        };

        let decoded = decode::<InputModel>(&request.current_state, "state").and_then(|state| {
            let ids = state.ids()?;
            Ok((state, ids))
        });
        let (state, (flow_id, input_id)) = match decoded {
            Ok(decoded) => decoded,
            Err(diag) => {
                diagnostics.push(diag);
                return ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                    private: request.private,
                };
            }
        };

        match Self::read_input(&ctx, data, &flow_id, &input_id, &state).await {
            Ok(Some(model)) => ReadResourceResponse {
                new_state: Some(encode_state(&model, &mut diagnostics)),
                diagnostics,
                private: request.private,
            },
            Ok(None) => {
                warn_vanished(&ctx, TYPE_NAME, state.id.as_deref().unwrap_or_default());
                ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                    private: request.private,
                }
            }
            Err(e) => {
                diagnostics.push(api_error("Failed to read input", &e));
                ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                    private: request.private,
                }
            }
        }
    }

    async fn update(&self, ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let _elapsed = log_elapsed(&ctx, "resource.tencentcloud_mps_input.update");
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return UpdateResourceResponse {
                new_state: DynamicValue::null(),
                private: vec![],
                diagnostics,
            };
        };

        let decoded = decode::<InputModel>(&request.prior_state, "prior state").and_then(|prior| {
            let plan: InputModel = decode(&request.config, "configuration")?;
            let ids = prior.ids()?;
            Ok((prior, plan, ids))
        });
        let (prior, mut plan, (flow_id, input_id)) = match decoded {
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

        if plan.input_group != prior.input_group {
            if let Some(input) = &plan.input_group {
                if let Err(e) = Self::modify_input(&ctx, data, &flow_id, &input_id, input).await {
                    diagnostics.push(api_error("Failed to update input", &e));
                    return UpdateResourceResponse {
                        new_state: DynamicValue::null(),
                        private: vec![],
                        diagnostics,
                    };
                }
            }
        }

        let read_back = Self::read_input(&ctx, data, &flow_id, &input_id, &plan).await;
        let new_state = written_state(&plan, read_back, WHAT, &mut diagnostics);

        UpdateResourceResponse {
            new_state,
            private: vec![],
            diagnostics,
        }
    }

    /// Inputs are removed together with their flow, so this only forgets the
    /// resource.
    async fn delete(&self, ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let _elapsed = log_elapsed(&ctx, "resource.tencentcloud_mps_input.delete");
        if let Ok(prior) = decode::<InputModel>(&request.prior_state, "prior state") {
            tracing::debug!(
                "{} input {} stays attached to its flow",
                ctx.log_id(),
                prior.id.unwrap_or_default()
            );
        }
        DeleteResourceResponse {
            diagnostics: vec![],
        }
    }
}

#[async_trait]
impl ResourceWithConfigure for InputResource {
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

    fn as_importable(&self) -> Option<&dyn ResourceWithImportState> {
        Some(self)
    }
}

#[async_trait]
impl ResourceWithImportState for InputResource {
    async fn import_state(
        &self,
        ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let mut response = ImportResourceStateResponse {
            imported_resources: vec![],
            diagnostics: vec![],
        };
        if let Err(diag) = split_id::<2>(&request.id) {
            response.diagnostics.push(diag);
            return response;
        }
        import_state_passthrough_id(&ctx, AttributePath::new("id"), &request, &mut response);
        response
    }
}
