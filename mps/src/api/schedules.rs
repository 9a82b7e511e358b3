//! Orchestration schedules triggered by storage uploads

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use tfplug::context::Context;

use super::client::Client;
use super::common::{AwsSqs, EmptyResponse, TaskNotifyConfig, TaskOutputStorage};
use super::error::ApiError;

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CosFileUploadTrigger {
    pub bucket: Option<String>,
    pub region: Option<String>,
    pub dir: Option<String>,
    pub formats: Option<Vec<String>>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AwsS3FileUploadTrigger {
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub dir: Option<String>,
    pub formats: Option<Vec<String>>,
    pub s3_secret_id: Option<String>,
    pub s3_secret_key: Option<String>,
    #[serde(rename = "AwsSQS")]
    pub aws_sqs: Option<AwsSqs>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WorkflowTrigger {
    pub r#type: Option<String>,
    pub cos_file_upload_trigger: Option<CosFileUploadTrigger>,
    pub aws_s3_file_upload_trigger: Option<AwsS3FileUploadTrigger>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NumberFormat {
    pub initial_value: Option<i64>,
    pub increment: Option<i64>,
    pub min_length: Option<i64>,
    pub place_holder: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TranscodeTaskInput {
    pub definition: Option<i64>,
    pub start_time_offset: Option<f64>,
    pub end_time_offset: Option<f64>,
    pub output_storage: Option<TaskOutputStorage>,
    pub output_object_path: Option<String>,
    pub segment_object_name: Option<String>,
    pub object_number_format: Option<NumberFormat>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AnimatedGraphicTaskInput {
    pub definition: Option<i64>,
    pub start_time_offset: Option<f64>,
    pub end_time_offset: Option<f64>,
    pub output_storage: Option<TaskOutputStorage>,
    pub output_object_path: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SnapshotByTimeOffsetTaskInput {
    pub definition: Option<i64>,
    pub ext_time_offset_set: Option<Vec<String>>,
    pub output_storage: Option<TaskOutputStorage>,
    pub output_object_path: Option<String>,
    pub object_number_format: Option<NumberFormat>,
}

/// Sample snapshots and image sprites take the same arguments, sprites add
/// a WebVTT index
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SnapshotTaskInput {
    pub definition: Option<i64>,
    pub output_storage: Option<TaskOutputStorage>,
    pub output_object_path: Option<String>,
    pub web_vtt_object_name: Option<String>,
    pub object_number_format: Option<NumberFormat>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AdaptiveDynamicStreamingTaskInput {
    pub definition: Option<i64>,
    pub output_storage: Option<TaskOutputStorage>,
    pub output_object_path: Option<String>,
    pub sub_stream_object_name: Option<String>,
    pub segment_object_name: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AiTaskInput {
    pub definition: Option<i64>,
    pub extended_parameter: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActivityPara {
    pub transcode_task: Option<TranscodeTaskInput>,
    pub animated_graphic_task: Option<AnimatedGraphicTaskInput>,
    pub snapshot_by_time_offset_task: Option<SnapshotByTimeOffsetTaskInput>,
    pub sample_snapshot_task: Option<SnapshotTaskInput>,
    pub image_sprite_task: Option<SnapshotTaskInput>,
    pub adaptive_dynamic_streaming_task: Option<AdaptiveDynamicStreamingTaskInput>,
    pub ai_content_review_task: Option<AiTaskInput>,
    pub ai_analysis_task: Option<AiTaskInput>,
    pub ai_recognition_task: Option<AiTaskInput>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Activity {
    pub activity_type: Option<String>,
    pub reardrive_index: Option<Vec<i64>>,
    pub activity_para: Option<ActivityPara>,
}

/// Arguments shared by CreateSchedule and ModifySchedule
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScheduleParams {
    pub schedule_name: Option<String>,
    pub trigger: Option<WorkflowTrigger>,
    pub activities: Option<Vec<Activity>>,
    pub output_storage: Option<TaskOutputStorage>,
    pub output_dir: Option<String>,
    pub task_notify_config: Option<TaskNotifyConfig>,
    pub resource_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModifyScheduleRequest {
    #[serde(rename = "ScheduleId")]
    pub schedule_id: i64,
    #[serde(flatten)]
    pub params: ScheduleParams,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScheduleIdRequest {
    pub schedule_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CreateScheduleResponse {
    schedule_id: i64,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeSchedulesRequest {
    pub schedule_ids: Option<Vec<i64>>,
    pub trigger_type: Option<String>,
    pub status: Option<String>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SchedulesInfo {
    pub schedule_id: Option<i64>,
    pub schedule_name: Option<String>,
    pub status: Option<String>,
    pub trigger: Option<WorkflowTrigger>,
    pub activities: Option<Vec<Activity>>,
    pub output_storage: Option<TaskOutputStorage>,
    pub output_dir: Option<String>,
    pub task_notify_config: Option<TaskNotifyConfig>,
    pub resource_id: Option<String>,
    pub create_time: Option<String>,
    pub update_time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeSchedulesResponse {
    #[serde(default)]
    pub total_count: i64,
    pub schedule_info_set: Option<Vec<SchedulesInfo>>,
}

impl Client {
    pub async fn create_schedule(
        &self,
        ctx: &Context,
        params: &ScheduleParams,
    ) -> Result<i64, ApiError> {
        let response: CreateScheduleResponse = self.call(ctx, "CreateSchedule", params).await?;
        Ok(response.schedule_id)
    }

    pub async fn modify_schedule(
        &self,
        ctx: &Context,
        request: &ModifyScheduleRequest,
    ) -> Result<(), ApiError> {
        self.call::<_, EmptyResponse>(ctx, "ModifySchedule", request)
            .await
            .map(|_| ())
    }

    pub async fn describe_schedules(
        &self,
        ctx: &Context,
        request: &DescribeSchedulesRequest,
    ) -> Result<DescribeSchedulesResponse, ApiError> {
        self.call(ctx, "DescribeSchedules", request).await
    }

    pub async fn delete_schedule(&self, ctx: &Context, schedule_id: i64) -> Result<(), ApiError> {
        self.call::<_, EmptyResponse>(ctx, "DeleteSchedule", &ScheduleIdRequest { schedule_id })
            .await
            .map(|_| ())
    }

    pub async fn enable_schedule(&self, ctx: &Context, schedule_id: i64) -> Result<(), ApiError> {
        self.call::<_, EmptyResponse>(ctx, "EnableSchedule", &ScheduleIdRequest { schedule_id })
            .await
            .map(|_| ())
    }

    pub async fn disable_schedule(&self, ctx: &Context, schedule_id: i64) -> Result<(), ApiError> {
        self.call::<_, EmptyResponse>(ctx, "DisableSchedule", &ScheduleIdRequest { schedule_id })
            .await
            .map(|_| ())
    }
}
