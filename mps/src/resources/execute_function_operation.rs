//! Runs a customer-specific MPS function

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

use super::common::{api_error, decode, encode_state, id_attribute, not_configured, string};
use crate::api::tasks::ExecuteFunctionRequest;
use crate::log::log_elapsed;
use crate::provider_data::MpsProviderData;
use crate::retry::with_retry;

const TYPE_NAME: &str = "tencentcloud_mps_execute_function_operation";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecuteFunctionOperationModel {
    pub id: Option<String>,
    pub function_name: Option<String>,
    pub function_arg: Option<String>,
    pub result: Option<String>,
}

impl ExecuteFunctionOperationModel {
    fn to_request(&self) -> ExecuteFunctionRequest {
        ExecuteFunctionRequest {
            function_name: self.function_name.clone().unwrap_or_default(),
            function_arg: self.function_arg.clone().unwrap_or_default(),
        }
    }
}

#[derive(Default)]
pub struct ExecuteFunctionOperationResource {
    provider_data: Option<MpsProviderData>,
}

impl ExecuteFunctionOperationResource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Resource for ExecuteFunctionOperationResource {
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
            .description("Provides a resource to execute a mps function")
            .attribute(id_attribute("The function name."))
            .attribute(
                string(
                    "function_name",
                    "The name of the function, agreed upon with MPS for the customer.",
                )
                .required()
                .force_new()
                .build(),
            )
            .attribute(
                string("function_arg", "The argument of the function.")
                    .required()
                    .force_new()
                    .build(),
            )
            .attribute(
                string("result", "The string the function returned.")
                    .computed()
                    .build(),
            )
            .build();

        ResourceSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let _elapsed =
            log_elapsed(&ctx, "resource.tencentcloud_mps_execute_function_operation.create");
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return CreateResourceResponse {
                new_state: DynamicValue::null(),
                private: vec![],
                diagnostics,
            };
        };

        let mut plan: ExecuteFunctionOperationModel =
            match decode(&request.config, "configuration") {
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

        let execute = plan.to_request();
        let client = &data.client;
        let result = match with_retry(&data.write_retry, || {
            client.execute_function(&ctx, &execute)
        })
        .await
        {
            Ok(result) => result,
            Err(e) => {
                diagnostics.push(api_error("Failed to execute function", &e));
                return CreateResourceResponse {
                    new_state: DynamicValue::null(),
                    private: vec![],
                    diagnostics,
                };
            }
        };

        plan.id = plan.function_name.clone();
        plan.result = Some(result);
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

    async fn update(&self, _ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        UpdateResourceResponse {
            new_state: request.planned_state,
            private: request.planned_private,
            diagnostics: vec![],
        }
    }

    async fn delete(&self, _ctx: Context, _request: DeleteResourceRequest) -> DeleteResourceResponse {
        DeleteResourceResponse {
            diagnostics: vec![],
        }
    }
}

#[async_trait]
impl ResourceWithConfigure for ExecuteFunctionOperationResource {
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
    use serde_json::json;

    #[test]
    fn arguments_reach_the_request() {
        let config = DynamicValue::new(tfplug::value::from_json(&json!({
            "id": null,
            "function_name": "SomeFunction",
            "function_arg": "{\"key\":\"value\"}",
            "result": null
        })));
        let model: ExecuteFunctionOperationModel = config.decode().unwrap();

        assert_eq!(
            serde_json::to_value(model.to_request()).unwrap(),
            json!({"FunctionName": "SomeFunction", "FunctionArg": "{\"key\":\"value\"}"})
        );
    }
}
