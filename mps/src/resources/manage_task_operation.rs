//! Aborts a running media task

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
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};
use tfplug::validator::StringOneOf;

use super::common::{api_error, decode, encode_state, id_attribute, not_configured, string};
use crate::api::tasks::ManageTaskRequest;
use crate::log::log_elapsed;
use crate::provider_data::MpsProviderData;
use crate::retry::with_retry;

const TYPE_NAME: &str = "tencentcloud_mps_manage_task_operation";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManageTaskOperationModel {
    pub id: Option<String>,
    pub operation_type: Option<String>,
    pub task_id: Option<String>,
}

#[derive(Default)]
pub struct ManageTaskOperationResource {
    provider_data: Option<MpsProviderData>,
}

impl ManageTaskOperationResource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Resource for ManageTaskOperationResource {
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
            .description("Provides a resource to manage a mps task")
            .attribute(id_attribute("The task ID."))
            .attribute(
                string("operation_type", "The operation. `Abort` terminates the task.")
                    .required()
                    .force_new()
                    .validator(StringOneOf::new(["Abort"]))
                    .build(),
            )
            .attribute(
                string("task_id", "The video processing task ID.")
                    .required()
                    .force_new()
                    .build(),
            )
            .build();

        ResourceSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let _elapsed = log_elapsed(&ctx, "resource.tencentcloud_mps_manage_task_operation.create");
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return CreateResourceResponse {
                new_state: DynamicValue::null(),
                private: vec![],
                diagnostics,
            };
        };

        let mut plan: ManageTaskOperationModel = match decode(&request.config, "configuration") {
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

        let task_id = plan.task_id.clone().unwrap_or_default();
        let service = data.service();
        match with_retry(&data.read_retry, || {
            service.describe_task_detail_by_id(&ctx, &task_id)
        })
        .await
        {
            Ok(Some(detail)) => tracing::debug!(
                "{} task {} is {}",
                ctx.log_id(),
                task_id,
                detail.status.unwrap_or_default()
            ),
            Ok(None) => {
                diagnostics.push(
                    Diagnostic::error(
                        "Task not found",
                        format!("MPS has no task with id \"{}\"", task_id),
                    )
                    .with_attribute(AttributePath::new("task_id")),
                );
                return CreateResourceResponse {
                    new_state: DynamicValue::null(),
                    private: vec![],
                    diagnostics,
                };
            }
            Err(e) => {
                diagnostics.push(api_error("Failed to read task", &e));
                return CreateResourceResponse {
                    new_state: DynamicValue::null(),
                    private: vec![],
                    diagnostics,
                };
            }
        }

        let manage = ManageTaskRequest {
            operation_type: plan.operation_type.clone().unwrap_or_default(),
            task_id: task_id.clone(),
        };
        let client = &data.client;
        if let Err(e) = with_retry(&data.write_retry, || client.manage_task(&ctx, &manage)).await {
            diagnostics.push(api_error("Failed to manage task", &e));
            return CreateResourceResponse {
                new_state: DynamicValue::null(),
                private: vec![],
                diagnostics,
            };
        }

        plan.id = Some(task_id);
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
impl ResourceWithConfigure for ManageTaskOperationResource {
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
