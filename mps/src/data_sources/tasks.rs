//! Lists media processing tasks by status

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceSchemaRequest,
    DataSourceSchemaResponse, DataSourceWithConfigure, ReadDataSourceRequest,
    ReadDataSourceResponse,
};
use tfplug::schema::{BlockBuilder, SchemaBuilder};
use tfplug::validator::{NumberRange, StringOneOf};
use tfplug::value::null_default;

use super::common::{
    configure, id_attribute, read_failed, result_output_file_attribute, result_set_attribute,
    results_id, write_result_output_file,
};
use crate::api::tasks::{DescribeTasksRequest, TaskSimpleInfo};
use crate::log::log_elapsed;
use crate::provider_data::MpsProviderData;
use crate::resources::common::{
    api_error, decode, encode_state, not_configured, number, string, string_list,
};
use crate::retry::with_retry;

const TYPE_NAME: &str = "tencentcloud_mps_tasks";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskInfoModel {
    pub task_id: Option<String>,
    pub task_type: Option<String>,
    pub status: Option<String>,
    pub create_time: Option<String>,
    pub begin_process_time: Option<String>,
    pub finish_time: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub sub_task_types: Vec<String>,
}

impl TaskInfoModel {
    /// DescribeTasks lists tasks of a single status and does not repeat it
    /// per task.
    fn from_api(task: TaskSimpleInfo, status: Option<String>) -> Self {
        Self {
            task_id: task.task_id,
            task_type: task.task_type,
            status,
            create_time: task.create_time,
            begin_process_time: task.begin_process_time,
            finish_time: task.finish_time,
            sub_task_types: task.sub_task_types.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TasksDataSourceModel {
    pub id: Option<String>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub scroll_token: Option<String>,
    pub result_output_file: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub task_set: Vec<TaskInfoModel>,
}

impl TasksDataSourceModel {
    fn filter(&self) -> DescribeTasksRequest {
        DescribeTasksRequest {
            status: self.status.clone(),
            limit: self.limit,
            scroll_token: self.scroll_token.clone(),
        }
    }
}

fn task_info_block() -> BlockBuilder {
    BlockBuilder::new("task_set")
        .description("The tasks found.")
        .attribute(string("task_id", "The task ID.").computed().build())
        .attribute(
            string(
                "task_type",
                "The task type: `WorkflowTask`, `EditMediaTask` or `LiveProcessTask`.",
            )
            .computed()
            .build(),
        )
        .attribute(
            string("status", "The task status: `WAITING`, `PROCESSING` or `FINISH`.")
                .computed()
                .build(),
        )
        .attribute(
            string("create_time", "Creation time in ISO date format.")
                .computed()
                .build(),
        )
        .attribute(
            string("begin_process_time", "Time execution began, in ISO date format.")
                .computed()
                .build(),
        )
        .attribute(
            string("finish_time", "Time execution finished, in ISO date format.")
                .computed()
                .build(),
        )
        .attribute(
            string_list("sub_task_types", "The types of the task's subtasks.")
                .computed()
                .build(),
        )
}

#[derive(Default)]
pub struct TasksDataSource {
    provider_data: Option<MpsProviderData>,
}

impl TasksDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataSource for TasksDataSource {
    fn type_name(&self) -> &str {
        TYPE_NAME
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .description("Use this data source to query detailed information of mps tasks")
            .attribute(id_attribute())
            .attribute(
                string("status", "Task status: `WAITING`, `PROCESSING` or `FINISH`.")
                    .required()
                    .validator(StringOneOf::new(["WAITING", "PROCESSING", "FINISH"]))
                    .build(),
            )
            .attribute(
                number("limit", "Number of returned entries, 1 to 100. Default value: 10.")
                    .optional()
                    .validator(NumberRange {
                        min: Some(1.0),
                        max: Some(100.0),
                    })
                    .build(),
            )
            .attribute(
                string(
                    "scroll_token",
                    "Cursor of the page to fetch. When unset, receives the cursor of the next page.",
                )
                .optional()
                .computed()
                .build(),
            )
            .attribute(result_output_file_attribute())
            .attribute(result_set_attribute(task_info_block()))
            .build();

        DataSourceSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn read(&self, ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let _elapsed = log_elapsed(&ctx, "data_source.tencentcloud_mps_tasks.read");

        let Some(data) = &self.provider_data else {
            return read_failed(vec![not_configured()]);
        };

        let mut model: TasksDataSourceModel = match decode(&request.config, "configuration") {
            Ok(model) => model,
            Err(diag) => return read_failed(vec![diag]),
        };

        let filter = model.filter();
        let client = &data.client;
        let response = match with_retry(&data.read_retry, || client.describe_tasks(&ctx, &filter))
            .await
        {
            Ok(response) => response,
            Err(e) => return read_failed(vec![api_error("Failed to read tasks", &e)]),
        };

        model.task_set = response
            .task_set
            .unwrap_or_default()
            .into_iter()
            .map(|task| TaskInfoModel::from_api(task, model.status.clone()))
            .collect();
        if model.scroll_token.is_none() {
            model.scroll_token = response.scroll_token;
        }
        model.id = Some(results_id(
            model
                .task_set
                .iter()
                .map(|t| t.task_id.clone().unwrap_or_default()),
        ));

        let mut diagnostics = vec![];
        if let Some(path) = &model.result_output_file {
            if let Err(diag) = write_result_output_file(path, &model.task_set).await {
                diagnostics.push(diag);
            }
        }

        ReadDataSourceResponse {
            state: encode_state(&model, &mut diagnostics),
            diagnostics,
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for TasksDataSource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        configure(request.provider_data, &mut self.provider_data)
    }
}
