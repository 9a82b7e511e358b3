//! Lists orchestration schedules

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceSchemaRequest,
    DataSourceSchemaResponse, DataSourceWithConfigure, ReadDataSourceRequest,
    ReadDataSourceResponse,
};
use tfplug::schema::{BlockBuilder, SchemaBuilder};
use tfplug::validator::StringOneOf;
use tfplug::value::{null_default, single_block};

use super::common::{
    configure, id_attribute, read_failed, result_output_file_attribute, result_set_attribute,
    results_id, write_result_output_file,
};
use crate::api::schedules::{DescribeSchedulesRequest, SchedulesInfo};
use crate::log::log_elapsed;
use crate::provider_data::MpsProviderData;
use crate::resources::common::{
    api_error, decode, encode_state, not_configured, number, number_list, output_storage_block,
    string, task_notify_config_block, OutputStorageModel, TaskNotifyConfigModel,
};
use crate::resources::schedule::{activities_block, trigger_block, ActivityModel, TriggerModel};
use crate::retry::with_retry;

const TYPE_NAME: &str = "tencentcloud_mps_schedules";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleInfoModel {
    pub schedule_id: Option<i64>,
    pub schedule_name: Option<String>,
    pub status: Option<String>,
    #[serde(default, with = "single_block")]
    pub trigger: Option<TriggerModel>,
    #[serde(default, deserialize_with = "null_default")]
    pub activities: Vec<ActivityModel>,
    #[serde(default, with = "single_block")]
    pub output_storage: Option<OutputStorageModel>,
    pub output_dir: Option<String>,
    #[serde(default, with = "single_block")]
    pub task_notify_config: Option<TaskNotifyConfigModel>,
    pub resource_id: Option<String>,
    pub create_time: Option<String>,
    pub update_time: Option<String>,
}

impl From<SchedulesInfo> for ScheduleInfoModel {
    fn from(info: SchedulesInfo) -> Self {
        Self {
            schedule_id: info.schedule_id,
            schedule_name: info.schedule_name,
            status: info.status,
            trigger: info.trigger.map(Into::into),
            activities: info
                .activities
                .unwrap_or_default()
                .into_iter()
                .map(Into::into)
                .collect(),
            output_storage: info.output_storage.map(Into::into),
            output_dir: info.output_dir,
            task_notify_config: info.task_notify_config.map(Into::into),
            resource_id: info.resource_id,
            create_time: info.create_time,
            update_time: info.update_time,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchedulesDataSourceModel {
    pub id: Option<String>,
    pub schedule_ids: Option<Vec<i64>>,
    pub trigger_type: Option<String>,
    pub status: Option<String>,
    pub result_output_file: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub schedule_info_set: Vec<ScheduleInfoModel>,
}

impl SchedulesDataSourceModel {
    fn filter(&self) -> DescribeSchedulesRequest {
        DescribeSchedulesRequest {
            schedule_ids: self.schedule_ids.clone(),
            trigger_type: self.trigger_type.clone(),
            status: self.status.clone(),
            ..Default::default()
        }
    }
}

fn schedule_info_block() -> BlockBuilder {
    BlockBuilder::new("schedule_info_set")
        .description("The schedules found.")
        .attribute(number("schedule_id", "The schedule ID.").computed().build())
        .attribute(string("schedule_name", "The schedule name.").computed().build())
        .attribute(
            string("status", "The schedule status, `Enabled` or `Disabled`.")
                .computed()
                .build(),
        )
        .block(trigger_block().build())
        .block(activities_block().build())
        .block(output_storage_block("output_storage", "The bucket output files are saved to.").build())
        .attribute(
            string("output_dir", "The directory output files are saved to.")
                .computed()
                .build(),
        )
        .block(task_notify_config_block().build())
        .attribute(string("resource_id", "The resource ID.").computed().build())
        .attribute(
            string("create_time", "Creation time in ISO date format.")
                .computed()
                .build(),
        )
        .attribute(
            string("update_time", "Last modified time in ISO date format.")
                .computed()
                .build(),
        )
}

#[derive(Default)]
pub struct SchedulesDataSource {
    provider_data: Option<MpsProviderData>,
}

impl SchedulesDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataSource for SchedulesDataSource {
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
            .description("Use this data source to query detailed information of mps schedules")
            .attribute(id_attribute())
            .attribute(
                number_list("schedule_ids", "The IDs of the schedules to query, up to 100.")
                    .optional()
                    .build(),
            )
            .attribute(
                string(
                    "trigger_type",
                    "The trigger type. `CosFileUpload` or `AwsS3FileUpload`. All types if unset.",
                )
                .optional()
                .validator(StringOneOf::new(["CosFileUpload", "AwsS3FileUpload"]))
                .build(),
            )
            .attribute(
                string("status", "The schedule status. `Enabled` or `Disabled`. All if unset.")
                    .optional()
                    .validator(StringOneOf::new(["Enabled", "Disabled"]))
                    .build(),
            )
            .attribute(result_output_file_attribute())
            .attribute(result_set_attribute(schedule_info_block()))
            .build();

        DataSourceSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn read(&self, ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let _elapsed = log_elapsed(&ctx, "data_source.tencentcloud_mps_schedules.read");

        let Some(data) = &self.provider_data else {
            return read_failed(vec![not_configured()]);
        };

        let mut model: SchedulesDataSourceModel = match decode(&request.config, "configuration") {
            Ok(model) => model,
            Err(diag) => return read_failed(vec![diag]),
        };

        let filter = model.filter();
        let service = data.service();
        let schedules = match with_retry(&data.read_retry, || {
            service.describe_schedules_by_filter(&ctx, filter.clone())
        })
        .await
        {
            Ok(schedules) => schedules,
            Err(e) => return read_failed(vec![api_error("Failed to read schedules", &e)]),
        };

        tracing::debug!("{} found {} schedules", ctx.log_id(), schedules.len());
        model.schedule_info_set = schedules.into_iter().map(Into::into).collect();
        model.id = Some(results_id(
            model
                .schedule_info_set
                .iter()
                .map(|s| s.schedule_id.unwrap_or_default().to_string()),
        ));

        let mut diagnostics = vec![];
        if let Some(path) = &model.result_output_file {
            if let Err(diag) = write_result_output_file(path, &model.schedule_info_set).await {
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
impl DataSourceWithConfigure for SchedulesDataSource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        configure(request.provider_data, &mut self.provider_data)
    }
}
