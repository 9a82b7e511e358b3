//! Orchestration schedule resource

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
use tfplug::schema::{Attribute, BlockBuilder, SchemaBuilder};
use tfplug::types::{AttributePath, DynamicValue};
use tfplug::validator::{StringOneOf, StringPattern};
use tfplug::value::{null_default, single_block};

use super::common::{
    api_error, aws_sqs_block, decode, definition_from_id, encode_state, id_attribute,
    not_configured, number, number_list, output_storage_block, string, string_list,
    task_notify_config_block, warn_vanished, written_state, AwsSqsModel, OutputStorageModel,
    TaskNotifyConfigModel,
};
use crate::api::schedules::{
    Activity, ActivityPara, AdaptiveDynamicStreamingTaskInput, AiTaskInput,
    AnimatedGraphicTaskInput, AwsS3FileUploadTrigger, CosFileUploadTrigger, ModifyScheduleRequest,
    NumberFormat, ScheduleParams, SchedulesInfo, SnapshotByTimeOffsetTaskInput, SnapshotTaskInput,
    TranscodeTaskInput, WorkflowTrigger,
};
use crate::api::ApiError;
use crate::log::log_elapsed;
use crate::provider_data::MpsProviderData;
use crate::retry::with_retry;

const TYPE_NAME: &str = "tencentcloud_mps_schedule";
const WHAT: &str = "schedule";

const STATUS_ENABLED: &str = "Enabled";
const STATUS_DISABLED: &str = "Disabled";

// Trigger

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CosFileUploadTriggerModel {
    pub bucket: Option<String>,
    pub region: Option<String>,
    pub dir: Option<String>,
    pub formats: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AwsS3FileUploadTriggerModel {
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub dir: Option<String>,
    pub formats: Option<Vec<String>>,
    pub s3_secret_id: Option<String>,
    pub s3_secret_key: Option<String>,
    #[serde(default, with = "single_block")]
    pub aws_sqs: Option<AwsSqsModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriggerModel {
    pub r#type: Option<String>,
    #[serde(default, with = "single_block")]
    pub cos_file_upload_trigger: Option<CosFileUploadTriggerModel>,
    #[serde(default, with = "single_block")]
    pub aws_s3_file_upload_trigger: Option<AwsS3FileUploadTriggerModel>,
}

impl From<TriggerModel> for WorkflowTrigger {
    fn from(model: TriggerModel) -> Self {
        Self {
            r#type: model.r#type,
            cos_file_upload_trigger: model.cos_file_upload_trigger.map(|cos| {
                CosFileUploadTrigger {
                    bucket: cos.bucket,
                    region: cos.region,
                    dir: cos.dir,
                    formats: cos.formats,
                }
            }),
            aws_s3_file_upload_trigger: model.aws_s3_file_upload_trigger.map(|s3| {
                AwsS3FileUploadTrigger {
                    s3_bucket: s3.s3_bucket,
                    s3_region: s3.s3_region,
                    dir: s3.dir,
                    formats: s3.formats,
                    s3_secret_id: s3.s3_secret_id,
                    s3_secret_key: s3.s3_secret_key,
                    aws_sqs: s3.aws_sqs.map(Into::into),
                }
            }),
        }
    }
}

impl From<WorkflowTrigger> for TriggerModel {
    fn from(trigger: WorkflowTrigger) -> Self {
        Self {
            r#type: trigger.r#type,
            cos_file_upload_trigger: trigger.cos_file_upload_trigger.map(|cos| {
                CosFileUploadTriggerModel {
                    bucket: cos.bucket,
                    region: cos.region,
                    dir: cos.dir,
                    formats: cos.formats,
                }
            }),
            aws_s3_file_upload_trigger: trigger.aws_s3_file_upload_trigger.map(|s3| {
                AwsS3FileUploadTriggerModel {
                    s3_bucket: s3.s3_bucket,
                    s3_region: s3.s3_region,
                    dir: s3.dir,
                    formats: s3.formats,
                    s3_secret_id: s3.s3_secret_id,
                    s3_secret_key: s3.s3_secret_key,
                    aws_sqs: s3.aws_sqs.map(Into::into),
                }
            }),
        }
    }
}

// Activities

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumberFormatModel {
    pub initial_value: Option<i64>,
    pub increment: Option<i64>,
    pub min_length: Option<i64>,
    pub place_holder: Option<String>,
}

impl From<NumberFormatModel> for NumberFormat {
    fn from(model: NumberFormatModel) -> Self {
        Self {
            initial_value: model.initial_value,
            increment: model.increment,
            min_length: model.min_length,
            place_holder: model.place_holder,
        }
    }
}

impl From<NumberFormat> for NumberFormatModel {
    fn from(format: NumberFormat) -> Self {
        Self {
            initial_value: format.initial_value,
            increment: format.increment,
            min_length: format.min_length,
            place_holder: format.place_holder,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscodeTaskModel {
    pub definition: Option<i64>,
    pub start_time_offset: Option<f64>,
    pub end_time_offset: Option<f64>,
    #[serde(default, with = "single_block")]
    pub output_storage: Option<OutputStorageModel>,
    pub output_object_path: Option<String>,
    pub segment_object_name: Option<String>,
    #[serde(default, with = "single_block")]
    pub object_number_format: Option<NumberFormatModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimatedGraphicTaskModel {
    pub definition: Option<i64>,
    pub start_time_offset: Option<f64>,
    pub end_time_offset: Option<f64>,
    #[serde(default, with = "single_block")]
    pub output_storage: Option<OutputStorageModel>,
    pub output_object_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotByTimeOffsetTaskModel {
    pub definition: Option<i64>,
    pub ext_time_offset_set: Option<Vec<String>>,
    #[serde(default, with = "single_block")]
    pub output_storage: Option<OutputStorageModel>,
    pub output_object_path: Option<String>,
    #[serde(default, with = "single_block")]
    pub object_number_format: Option<NumberFormatModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleSnapshotTaskModel {
    pub definition: Option<i64>,
    #[serde(default, with = "single_block")]
    pub output_storage: Option<OutputStorageModel>,
    pub output_object_path: Option<String>,
    #[serde(default, with = "single_block")]
    pub object_number_format: Option<NumberFormatModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageSpriteTaskModel {
    pub definition: Option<i64>,
    #[serde(default, with = "single_block")]
    pub output_storage: Option<OutputStorageModel>,
    pub output_object_path: Option<String>,
    pub web_vtt_object_name: Option<String>,
    #[serde(default, with = "single_block")]
    pub object_number_format: Option<NumberFormatModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveDynamicStreamingTaskModel {
    pub definition: Option<i64>,
    #[serde(default, with = "single_block")]
    pub output_storage: Option<OutputStorageModel>,
    pub output_object_path: Option<String>,
    pub sub_stream_object_name: Option<String>,
    pub segment_object_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiTaskModel {
    pub definition: Option<i64>,
    pub extended_parameter: Option<String>,
}

impl From<AiTaskModel> for AiTaskInput {
    fn from(model: AiTaskModel) -> Self {
        Self {
            definition: model.definition,
            extended_parameter: model.extended_parameter,
        }
    }
}

impl From<AiTaskInput> for AiTaskModel {
    fn from(input: AiTaskInput) -> Self {
        Self {
            definition: input.definition,
            extended_parameter: input.extended_parameter,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityParaModel {
    #[serde(default, with = "single_block")]
    pub transcode_task: Option<TranscodeTaskModel>,
    #[serde(default, with = "single_block")]
    pub animated_graphic_task: Option<AnimatedGraphicTaskModel>,
    #[serde(default, with = "single_block")]
    pub snapshot_by_time_offset_task: Option<SnapshotByTimeOffsetTaskModel>,
    #[serde(default, with = "single_block")]
    pub sample_snapshot_task: Option<SampleSnapshotTaskModel>,
    #[serde(default, with = "single_block")]
    pub image_sprite_task: Option<ImageSpriteTaskModel>,
    #[serde(default, with = "single_block")]
    pub adaptive_dynamic_streaming_task: Option<AdaptiveDynamicStreamingTaskModel>,
    #[serde(default, with = "single_block")]
    pub ai_content_review_task: Option<AiTaskModel>,
    #[serde(default, with = "single_block")]
    pub ai_analysis_task: Option<AiTaskModel>,
    #[serde(default, with = "single_block")]
    pub ai_recognition_task: Option<AiTaskModel>,
}

impl ActivityParaModel {
    fn output_storages_mut(&mut self) -> [Option<&mut OutputStorageModel>; 6] {
        [
            self.transcode_task.as_mut().and_then(|t| t.output_storage.as_mut()),
            self.animated_graphic_task.as_mut().and_then(|t| t.output_storage.as_mut()),
            self.snapshot_by_time_offset_task.as_mut().and_then(|t| t.output_storage.as_mut()),
            self.sample_snapshot_task.as_mut().and_then(|t| t.output_storage.as_mut()),
            self.image_sprite_task.as_mut().and_then(|t| t.output_storage.as_mut()),
            self.adaptive_dynamic_streaming_task.as_mut().and_then(|t| t.output_storage.as_mut()),
        ]
    }

    fn output_storages(&self) -> [Option<&OutputStorageModel>; 6] {
        [
            self.transcode_task.as_ref().and_then(|t| t.output_storage.as_ref()),
            self.animated_graphic_task.as_ref().and_then(|t| t.output_storage.as_ref()),
            self.snapshot_by_time_offset_task.as_ref().and_then(|t| t.output_storage.as_ref()),
            self.sample_snapshot_task.as_ref().and_then(|t| t.output_storage.as_ref()),
            self.image_sprite_task.as_ref().and_then(|t| t.output_storage.as_ref()),
            self.adaptive_dynamic_streaming_task.as_ref().and_then(|t| t.output_storage.as_ref()),
        ]
    }
}

impl From<ActivityParaModel> for ActivityPara {
    fn from(model: ActivityParaModel) -> Self {
        Self {
            transcode_task: model.transcode_task.map(|t| TranscodeTaskInput {
                definition: t.definition,
                start_time_offset: t.start_time_offset,
                end_time_offset: t.end_time_offset,
                output_storage: t.output_storage.map(Into::into),
                output_object_path: t.output_object_path,
                segment_object_name: t.segment_object_name,
                object_number_format: t.object_number_format.map(Into::into),
            }),
            animated_graphic_task: model.animated_graphic_task.map(|t| AnimatedGraphicTaskInput {
                definition: t.definition,
                start_time_offset: t.start_time_offset,
                end_time_offset: t.end_time_offset,
                output_storage: t.output_storage.map(Into::into),
                output_object_path: t.output_object_path,
            }),
            snapshot_by_time_offset_task: model.snapshot_by_time_offset_task.map(|t| {
                SnapshotByTimeOffsetTaskInput {
                    definition: t.definition,
                    ext_time_offset_set: t.ext_time_offset_set,
                    output_storage: t.output_storage.map(Into::into),
                    output_object_path: t.output_object_path,
                    object_number_format: t.object_number_format.map(Into::into),
                }
            }),
            sample_snapshot_task: model.sample_snapshot_task.map(|t| SnapshotTaskInput {
                definition: t.definition,
                output_storage: t.output_storage.map(Into::into),
                output_object_path: t.output_object_path,
                web_vtt_object_name: None,
                object_number_format: t.object_number_format.map(Into::into),
            }),
            image_sprite_task: model.image_sprite_task.map(|t| SnapshotTaskInput {
                definition: t.definition,
                output_storage: t.output_storage.map(Into::into),
                output_object_path: t.output_object_path,
                web_vtt_object_name: t.web_vtt_object_name,
                object_number_format: t.object_number_format.map(Into::into),
            }),
            adaptive_dynamic_streaming_task: model.adaptive_dynamic_streaming_task.map(|t| {
                AdaptiveDynamicStreamingTaskInput {
                    definition: t.definition,
                    output_storage: t.output_storage.map(Into::into),
                    output_object_path: t.output_object_path,
                    sub_stream_object_name: t.sub_stream_object_name,
                    segment_object_name: t.segment_object_name,
                }
            }),
            ai_content_review_task: model.ai_content_review_task.map(Into::into),
            ai_analysis_task: model.ai_analysis_task.map(Into::into),
            ai_recognition_task: model.ai_recognition_task.map(Into::into),
        }
    }
}

impl From<ActivityPara> for ActivityParaModel {
    fn from(para: ActivityPara) -> Self {
        Self {
            transcode_task: para.transcode_task.map(|t| TranscodeTaskModel {
                definition: t.definition,
                start_time_offset: t.start_time_offset,
                end_time_offset: t.end_time_offset,
                output_storage: t.output_storage.map(Into::into),
                output_object_path: t.output_object_path,
                segment_object_name: t.segment_object_name,
                object_number_format: t.object_number_format.map(Into::into),
            }),
            animated_graphic_task: para.animated_graphic_task.map(|t| AnimatedGraphicTaskModel {
                definition: t.definition,
                start_time_offset: t.start_time_offset,
                end_time_offset: t.end_time_offset,
                output_storage: t.output_storage.map(Into::into),
                output_object_path: t.output_object_path,
            }),
            snapshot_by_time_offset_task: para.snapshot_by_time_offset_task.map(|t| {
                SnapshotByTimeOffsetTaskModel {
                    definition: t.definition,
                    ext_time_offset_set: t.ext_time_offset_set,
                    output_storage: t.output_storage.map(Into::into),
                    output_object_path: t.output_object_path,
                    object_number_format: t.object_number_format.map(Into::into),
                }
            }),
            sample_snapshot_task: para.sample_snapshot_task.map(|t| SampleSnapshotTaskModel {
                definition: t.definition,
                output_storage: t.output_storage.map(Into::into),
                output_object_path: t.output_object_path,
                object_number_format: t.object_number_format.map(Into::into),
            }),
            image_sprite_task: para.image_sprite_task.map(|t| ImageSpriteTaskModel {
                definition: t.definition,
                output_storage: t.output_storage.map(Into::into),
                output_object_path: t.output_object_path,
                web_vtt_object_name: t.web_vtt_object_name,
                object_number_format: t.object_number_format.map(Into::into),
            }),
            adaptive_dynamic_streaming_task: para.adaptive_dynamic_streaming_task.map(|t| {
                AdaptiveDynamicStreamingTaskModel {
                    definition: t.definition,
                    output_storage: t.output_storage.map(Into::into),
                    output_object_path: t.output_object_path,
                    sub_stream_object_name: t.sub_stream_object_name,
                    segment_object_name: t.segment_object_name,
                }
            }),
            ai_content_review_task: para.ai_content_review_task.map(Into::into),
            ai_analysis_task: para.ai_analysis_task.map(Into::into),
            ai_recognition_task: para.ai_recognition_task.map(Into::into),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityModel {
    pub activity_type: Option<String>,
    pub reardrive_index: Option<Vec<i64>>,
    #[serde(default, with = "single_block")]
    pub activity_para: Option<ActivityParaModel>,
}

impl From<ActivityModel> for Activity {
    fn from(model: ActivityModel) -> Self {
        Self {
            activity_type: model.activity_type,
            reardrive_index: model.reardrive_index,
            activity_para: model.activity_para.map(Into::into),
        }
    }
}

impl From<Activity> for ActivityModel {
    fn from(activity: Activity) -> Self {
        Self {
            activity_type: activity.activity_type,
            reardrive_index: activity.reardrive_index,
            activity_para: activity.activity_para.map(Into::into),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleModel {
    pub id: Option<String>,
    pub schedule_name: Option<String>,
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
    pub status: Option<String>,
}

fn fill<T: Clone>(target: &mut Option<T>, known: Option<&T>) {
    if target.is_none() {
        *target = known.cloned();
    }
}

fn keep_sqs_secrets(sqs: Option<&mut AwsSqsModel>, known: Option<&AwsSqsModel>) {
    if let (Some(sqs), Some(known)) = (sqs, known) {
        fill(&mut sqs.s3_secret_id, known.s3_secret_id.as_ref());
        fill(&mut sqs.s3_secret_key, known.s3_secret_key.as_ref());
    }
}

impl ScheduleModel {
    fn to_params(&self) -> ScheduleParams {
        ScheduleParams {
            schedule_name: self.schedule_name.clone(),
            trigger: self.trigger.clone().map(Into::into),
            activities: Some(self.activities.iter().cloned().map(Into::into).collect()),
            output_storage: self.output_storage.clone().map(Into::into),
            output_dir: self.output_dir.clone(),
            task_notify_config: self.task_notify_config.clone().map(Into::into),
            resource_id: self.resource_id.clone(),
        }
    }

    fn from_api(info: SchedulesInfo) -> Self {
        Self {
            id: info.schedule_id.map(|id| id.to_string()),
            schedule_name: info.schedule_name,
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
            status: info.status,
        }
    }

    /// Restores credentials MPS does not echo back, activities matched by
    /// position.
    fn keep_secrets_from(&mut self, known: &ScheduleModel) {
        if let Some(storage) = self.output_storage.as_mut() {
            storage.keep_secrets_from(known.output_storage.as_ref());
        }

        let known_s3 = known
            .trigger
            .as_ref()
            .and_then(|t| t.aws_s3_file_upload_trigger.as_ref());
        if let (Some(s3), Some(known_s3)) = (
            self.trigger
                .as_mut()
                .and_then(|t| t.aws_s3_file_upload_trigger.as_mut()),
            known_s3,
        ) {
            fill(&mut s3.s3_secret_id, known_s3.s3_secret_id.as_ref());
            fill(&mut s3.s3_secret_key, known_s3.s3_secret_key.as_ref());
            keep_sqs_secrets(s3.aws_sqs.as_mut(), known_s3.aws_sqs.as_ref());
        }

        if let (Some(notify), Some(known_notify)) = (
            self.task_notify_config.as_mut(),
            known.task_notify_config.as_ref(),
        ) {
            keep_sqs_secrets(notify.aws_sqs.as_mut(), known_notify.aws_sqs.as_ref());
        }

        for (activity, known_activity) in self.activities.iter_mut().zip(&known.activities) {
            let (Some(para), Some(known_para)) = (
                activity.activity_para.as_mut(),
                known_activity.activity_para.as_ref(),
            ) else {
                continue;
            };
            for (storage, known_storage) in para
                .output_storages_mut()
                .into_iter()
                .zip(known_para.output_storages())
            {
                if let Some(storage) = storage {
                    storage.keep_secrets_from(known_storage);
                }
            }
        }
    }
}

pub(crate) fn trigger_block() -> BlockBuilder {
    BlockBuilder::new("trigger")
        .description("The trigger of the schedule.")
        .single()
        .attribute(
            string(
                "type",
                "The trigger type. `CosFileUpload` for COS uploads, `AwsS3FileUpload` for AWS S3 uploads.",
            )
            .required()
            .build(),
        )
        .block(
            BlockBuilder::new("cos_file_upload_trigger")
                .description("Valid when `type` is `CosFileUpload`.")
                .single()
                .attribute(string("bucket", "The COS bucket to watch.").required().build())
                .attribute(string("region", "The region of the bucket.").required().build())
                .attribute(
                    string("dir", "The input path directory, which must begin and end with `/`.")
                        .optional()
                        .validator(StringPattern::new(
                            r"^/(.*/)?$",
                            "a path beginning and ending with `/`",
                        ))
                        .build(),
                )
                .attribute(
                    string_list("formats", "The file formats that trigger the schedule.")
                        .optional()
                        .build(),
                )
                .build(),
        )
        .block(
            BlockBuilder::new("aws_s3_file_upload_trigger")
                .description("Valid when `type` is `AwsS3FileUpload`.")
                .single()
                .attribute(string("s3_bucket", "The S3 bucket to watch.").required().build())
                .attribute(string("s3_region", "The region of the S3 bucket.").required().build())
                .attribute(string("dir", "The input path directory.").optional().build())
                .attribute(
                    string_list("formats", "The file formats that trigger the schedule.")
                        .optional()
                        .build(),
                )
                .attribute(
                    string("s3_secret_id", "The key ID of the S3 bucket.")
                        .optional()
                        .sensitive()
                        .build(),
                )
                .attribute(
                    string("s3_secret_key", "The key of the S3 bucket.")
                        .optional()
                        .sensitive()
                        .build(),
                )
                .block(aws_sqs_block().build())
                .build(),
        )
}

fn task_output_storage_block() -> BlockBuilder {
    output_storage_block(
        "output_storage",
        "The target storage of this task's output files. Defaults to the schedule's storage.",
    )
}

fn number_format_block() -> BlockBuilder {
    BlockBuilder::new("object_number_format")
        .description("Rule of the `{number}` variable in output paths.")
        .single()
        .attribute(number("initial_value", "The start value. Default 0.").optional().build())
        .attribute(number("increment", "The increment. Default 1.").optional().build())
        .attribute(
            number("min_length", "The minimum length, padded when shorter. Default 1.")
                .optional()
                .build(),
        )
        .attribute(
            string("place_holder", "The placeholder used for padding. Default `0`.")
                .optional()
                .build(),
        )
}

fn definition_attribute(description: &str) -> Attribute {
    number("definition", description).required().build()
}

fn output_object_path_attribute() -> Attribute {
    string("output_object_path", "The output path of the task's files.")
        .optional()
        .build()
}

fn ai_task_block(name: &str, description: &str) -> BlockBuilder {
    BlockBuilder::new(name)
        .description(description)
        .single()
        .attribute(definition_attribute("The template ID."))
        .attribute(
            string("extended_parameter", "Extended parameter, a serialized JSON string.")
                .optional()
                .build(),
        )
}

fn activity_para_block() -> BlockBuilder {
    BlockBuilder::new("activity_para")
        .description("The parameters of the activity's task.")
        .single()
        .block(
            BlockBuilder::new("transcode_task")
                .description("A transcoding task.")
                .single()
                .attribute(definition_attribute("The transcoding template ID."))
                .attribute(
                    number("start_time_offset", "Start time offset of the output in seconds.")
                        .optional()
                        .build(),
                )
                .attribute(
                    number("end_time_offset", "End time offset of the output in seconds.")
                        .optional()
                        .build(),
                )
                .block(task_output_storage_block().build())
                .attribute(output_object_path_attribute())
                .attribute(
                    string("segment_object_name", "The output path of HLS segment files.")
                        .optional()
                        .build(),
                )
                .block(number_format_block().build())
                .build(),
        )
        .block(
            BlockBuilder::new("animated_graphic_task")
                .description("An animated image generating task.")
                .single()
                .attribute(definition_attribute("The animated image template ID."))
                .attribute(
                    number("start_time_offset", "Start time of the animation in seconds.")
                        .required()
                        .build(),
                )
                .attribute(
                    number("end_time_offset", "End time of the animation in seconds.")
                        .required()
                        .build(),
                )
                .block(task_output_storage_block().build())
                .attribute(output_object_path_attribute())
                .build(),
        )
        .block(
            BlockBuilder::new("snapshot_by_time_offset_task")
                .description("A time point screencapturing task.")
                .single()
                .attribute(definition_attribute("The screencapturing template ID."))
                .attribute(
                    string_list(
                        "ext_time_offset_set",
                        "Screenshot time points such as `1.5s` or `10pct`.",
                    )
                    .optional()
                    .build(),
                )
                .block(task_output_storage_block().build())
                .attribute(output_object_path_attribute())
                .block(number_format_block().build())
                .build(),
        )
        .block(
            BlockBuilder::new("sample_snapshot_task")
                .description("A sampled screencapturing task.")
                .single()
                .attribute(definition_attribute("The sampled screencapturing template ID."))
                .block(task_output_storage_block().build())
                .attribute(output_object_path_attribute())
                .block(number_format_block().build())
                .build(),
        )
        .block(
            BlockBuilder::new("image_sprite_task")
                .description("An image sprite generating task.")
                .single()
                .attribute(definition_attribute("The image sprite template ID."))
                .block(task_output_storage_block().build())
                .attribute(output_object_path_attribute())
                .attribute(
                    string("web_vtt_object_name", "The output path of the WebVTT file.")
                        .optional()
                        .build(),
                )
                .block(number_format_block().build())
                .build(),
        )
        .block(
            BlockBuilder::new("adaptive_dynamic_streaming_task")
                .description("An adaptive bitrate streaming task.")
                .single()
                .attribute(definition_attribute("The adaptive bitrate streaming template ID."))
                .block(task_output_storage_block().build())
                .attribute(
                    string("output_object_path", "The output path of the manifest file.")
                        .optional()
                        .build(),
                )
                .attribute(
                    string("sub_stream_object_name", "The output path of the substream files.")
                        .optional()
                        .build(),
                )
                .attribute(
                    string("segment_object_name", "The output path of the segment files.")
                        .optional()
                        .build(),
                )
                .build(),
        )
        .block(ai_task_block("ai_content_review_task", "A content moderation task.").build())
        .block(ai_task_block("ai_analysis_task", "A content analysis task.").build())
        .block(ai_task_block("ai_recognition_task", "A content recognition task.").build())
}

pub(crate) fn activities_block() -> BlockBuilder {
    BlockBuilder::new("activities")
        .description("The subtasks of the schedule.")
        .attribute(
            string(
                "activity_type",
                "The subtask type: `input`, `output`, `action-trans`, `action-samplesnapshot`, \
                 `action-AIAnalysis`, `action-AIRecognition`, `action-aiReview`, \
                 `action-animated-graphics`, `action-image-sprite`, `action-snapshotByTimeOffset` \
                 or `action-adaptive-substream`.",
            )
            .required()
            .build(),
        )
        .attribute(
            number_list("reardrive_index", "Indexes of the activities that follow this one.")
                .optional()
                .build(),
        )
        .block(activity_para_block().build())
}

#[derive(Default)]
pub struct ScheduleResource {
    provider_data: Option<MpsProviderData>,
}

impl ScheduleResource {
    pub fn new() -> Self {
        Self::default()
    }

    async fn read_schedule(
        ctx: &Context,
        data: &MpsProviderData,
        schedule_id: i64,
        known: &ScheduleModel,
    ) -> Result<Option<ScheduleModel>, ApiError> {
        let service = data.service();
        let info = with_retry(&data.read_retry, || {
            service.describe_schedule_by_id(ctx, schedule_id)
        })
        .await?;
        Ok(info.map(|info| {
            let mut model = ScheduleModel::from_api(info);
            model.id = Some(schedule_id.to_string());
            model.keep_secrets_from(known);
            model
        }))
    }

    /// Switches the schedule to `status` when it is set.
    async fn apply_status(
        ctx: &Context,
        data: &MpsProviderData,
        schedule_id: i64,
        status: Option<&str>,
    ) -> Result<(), ApiError> {
        let service = data.service();
        match status {
            Some(STATUS_ENABLED) => {
                with_retry(&data.write_retry, || service.enable_schedule(ctx, schedule_id)).await
            }
            Some(STATUS_DISABLED) => {
                with_retry(&data.write_retry, || service.disable_schedule(ctx, schedule_id)).await
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl Resource for ScheduleResource {
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
            .description("Provides a resource to create a mps schedule")
            .attribute(id_attribute("The schedule ID."))
            .attribute(
                string("schedule_name", "The schedule name, up to 128 characters.")
                    .required()
                    .build(),
            )
            .block(trigger_block().required().build())
            .block(activities_block().required().build())
            .block(
                output_storage_block(
                    "output_storage",
                    "The bucket to save the output files to. Defaults to the trigger's bucket.",
                )
                .build(),
            )
            .attribute(
                string("output_dir", "The directory to save the media processing output files to.")
                    .optional()
                    .build(),
            )
            .block(task_notify_config_block().build())
            .attribute(
                string("resource_id", "The resource ID. Defaults to the account's main resource.")
                    .optional()
                    .build(),
            )
            .attribute(
                string("status", "The schedule status, `Enabled` or `Disabled`.")
                    .optional()
                    .computed()
                    .validator(StringOneOf::new([STATUS_ENABLED, STATUS_DISABLED]))
                    .build(),
            )
            .build();

        ResourceSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let _elapsed = log_elapsed(&ctx, "resource.tencentcloud_mps_schedule.create");
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return CreateResourceResponse {
                new_state: DynamicValue::null(),
                private: vec![],
                diagnostics,
            };
        };

        let mut plan: ScheduleModel = match decode(&request.config, "configuration") {
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

        let params = plan.to_params();
        let client = &data.client;
        let schedule_id =
            match with_retry(&data.write_retry, || client.create_schedule(&ctx, &params)).await {
                Ok(id) => id,
                Err(e) => {
                    diagnostics.push(api_error("Failed to create schedule", &e));
                    return CreateResourceResponse {
                        new_state: DynamicValue::null(),
                        private: vec![],
                        diagnostics,
                    };
                }
            };
        plan.id = Some(schedule_id.to_string());

        let mut read_back = Self::read_schedule(&ctx, data, schedule_id, &plan).await;
        let created_status = match &read_back {
            Ok(Some(model)) => model.status.clone(),
            _ => None,
        };
        if plan.status.is_some() && plan.status != created_status {
            if let Err(e) =
                Self::apply_status(&ctx, data, schedule_id, plan.status.as_deref()).await
            {
                diagnostics.push(api_error("Failed to set schedule status", &e));
            }
            read_back = Self::read_schedule(&ctx, data, schedule_id, &plan).await;
        }

        let new_state = written_state(&plan, read_back, WHAT, &mut diagnostics);

        CreateResourceResponse {
            new_state,
            private: vec![],
            diagnostics,
        }
    }

    async fn read(&self, ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let _elapsed = log_elapsed(&ctx, "resource.tencentcloud_mps_schedule.read");
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics,
                private: request.private,
            };
        };

        let decoded = decode::<ScheduleModel>(&request.current_state, "state").and_then(|state| {
            let schedule_id = definition_from_id(state.id.as_deref())?;
            Ok((state, schedule_id))
        });
        let (state, schedule_id) = match decoded {
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

        match Self::read_schedule(&ctx, data, schedule_id, &state).await {
            Ok(Some(model)) => ReadResourceResponse {
                new_state: Some(encode_state(&model, &mut diagnostics)),
                diagnostics,
                private: request.private,
            },
            Ok(None) => {
                warn_vanished(&ctx, TYPE_NAME, &schedule_id.to_string());
                ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                    private: request.private,
                }
            }
            Err(e) => {
                diagnostics.push(api_error("Failed to read schedule", &e));
                ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                    private: request.private,
                }
            }
        }
    }

    async fn update(&self, ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let _elapsed = log_elapsed(&ctx, "resource.tencentcloud_mps_schedule.update");
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return UpdateResourceResponse {
                new_state: DynamicValue::null(),
                private: vec![],
                diagnostics,
            };
        };

        let decoded = decode::<ScheduleModel>(&request.prior_state, "prior state").and_then(|prior| {
            let plan: ScheduleModel = decode(&request.config, "configuration")?;
            let schedule_id = definition_from_id(prior.id.as_deref())?;
            Ok((prior, plan, schedule_id))
        });
        let (prior, mut plan, schedule_id) = match decoded {
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

        let params = plan.to_params();
        if params != prior.to_params() {
            let modify = ModifyScheduleRequest {
                schedule_id,
                params,
            };
            let client = &data.client;
            if let Err(e) =
                with_retry(&data.write_retry, || client.modify_schedule(&ctx, &modify)).await
            {
                diagnostics.push(api_error("Failed to update schedule", &e));
                return UpdateResourceResponse {
                    new_state: DynamicValue::null(),
                    private: vec![],
                    diagnostics,
                };
            }
        }

        if plan.status.is_some() && plan.status != prior.status {
            if let Err(e) = Self::apply_status(&ctx, data, schedule_id, plan.status.as_deref()).await {
                diagnostics.push(api_error("Failed to set schedule status", &e));
            }
        } else if plan.status.is_none() {
            plan.status = prior.status.clone();
        }

        let read_back = Self::read_schedule(&ctx, data, schedule_id, &plan).await;
        let new_state = written_state(&plan, read_back, WHAT, &mut diagnostics);

        UpdateResourceResponse {
            new_state,
            private: vec![],
            diagnostics,
        }
    }

    async fn delete(&self, ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let _elapsed = log_elapsed(&ctx, "resource.tencentcloud_mps_schedule.delete");
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return DeleteResourceResponse { diagnostics };
        };

        let schedule_id = match decode::<ScheduleModel>(&request.prior_state, "prior state")
            .and_then(|prior| definition_from_id(prior.id.as_deref()))
        {
            Ok(id) => id,
            Err(diag) => {
                diagnostics.push(diag);
                return DeleteResourceResponse { diagnostics };
            }
        };

        let service = data.service();
        if let Err(e) = with_retry(&data.write_retry, || {
            service.delete_schedule_by_id(&ctx, schedule_id)
        })
        .await
        {
            diagnostics.push(api_error("Failed to delete schedule", &e));
        }

        DeleteResourceResponse { diagnostics }
    }
}

#[async_trait]
impl ResourceWithConfigure for ScheduleResource {
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
impl ResourceWithImportState for ScheduleResource {
    async fn import_state(
        &self,
        ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let mut response = ImportResourceStateResponse {
            imported_resources: vec![],
            diagnostics: vec![],
        };
        import_state_passthrough_id(&ctx, AttributePath::new("id"), &request, &mut response);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::common::{S3OutputStorage, TaskOutputStorage};
    use serde_json::json;

    fn config() -> DynamicValue {
        DynamicValue::new(tfplug::value::from_json(&json!({
            "id": null,
            "schedule_name": "terraform-test",
            "trigger": [{
                "type": "CosFileUpload",
                "cos_file_upload_trigger": [{
                    "bucket": "bucket-125",
                    "region": "ap-guangzhou",
                    "dir": "/upload/",
                    "formats": ["flv", "mov"]
                }],
                "aws_s3_file_upload_trigger": []
            }],
            "activities": [
                {"activity_type": "input", "reardrive_index": [1, 2], "activity_para": []},
                {
                    "activity_type": "action-trans",
                    "reardrive_index": [3],
                    "activity_para": [{
                        "transcode_task": [{
                            "definition": 10,
                            "start_time_offset": 1.5,
                            "end_time_offset": null,
                            "output_storage": [{
                                "type": "AWS-S3",
                                "cos_output_storage": [],
                                "s3_output_storage": [{
                                    "s3_bucket": "s3-bucket",
                                    "s3_region": "us-east-1",
                                    "s3_secret_id": "id",
                                    "s3_secret_key": "key"
                                }]
                            }],
                            "output_object_path": null,
                            "segment_object_name": null,
                            "object_number_format": []
                        }],
                        "ai_recognition_task": [{"definition": 20001, "extended_parameter": null}]
                    }]
                },
                {"activity_type": "output", "reardrive_index": null, "activity_para": []}
            ],
            "output_storage": [],
            "output_dir": "/output/",
            "task_notify_config": [],
            "resource_id": null,
            "status": null
        })))
    }

    #[test]
    fn nested_activities_reach_the_request() {
        let model: ScheduleModel = config().decode().unwrap();
        let body = serde_json::to_value(model.to_params()).unwrap();

        assert_eq!(body["ScheduleName"], "terraform-test");
        assert_eq!(body["Trigger"]["CosFileUploadTrigger"]["Formats"], json!(["flv", "mov"]));
        assert_eq!(body["Activities"].as_array().unwrap().len(), 3);
        assert_eq!(body["Activities"][0], json!({"ActivityType": "input", "ReardriveIndex": [1, 2]}));
        let task = &body["Activities"][1]["ActivityPara"]["TranscodeTask"];
        assert_eq!(task["Definition"], 10);
        assert_eq!(task["StartTimeOffset"], 1.5);
        assert_eq!(task["OutputStorage"]["S3OutputStorage"]["S3Bucket"], "s3-bucket");
        assert_eq!(
            body["Activities"][1]["ActivityPara"]["AiRecognitionTask"]["Definition"],
            20001
        );
        assert!(body.get("OutputStorage").is_none());
        assert!(body.get("Status").is_none());
    }

    #[test]
    fn described_schedule_keeps_configured_secrets() {
        let known: ScheduleModel = config().decode().unwrap();
        let mut described = known.clone();
        described.id = Some("12".into());
        described.status = Some("Enabled".into());
        let mut info_activities: Vec<Activity> =
            described.activities.iter().cloned().map(Into::into).collect();
        let storage = info_activities[1]
            .activity_para
            .as_mut()
            .and_then(|p| p.transcode_task.as_mut())
            .and_then(|t| t.output_storage.as_mut())
            .unwrap();
        *storage = TaskOutputStorage {
            r#type: Some("AWS-S3".into()),
            cos_output_storage: None,
            s3_output_storage: Some(S3OutputStorage {
                s3_bucket: Some("s3-bucket".into()),
                s3_region: Some("us-east-1".into()),
                s3_secret_id: None,
                s3_secret_key: None,
            }),
        };

        let info = SchedulesInfo {
            schedule_id: Some(12),
            schedule_name: described.schedule_name.clone(),
            status: Some("Enabled".into()),
            trigger: described.trigger.clone().map(Into::into),
            activities: Some(info_activities),
            output_dir: Some("/output/".into()),
            ..Default::default()
        };

        let mut model = ScheduleModel::from_api(info);
        model.keep_secrets_from(&known);

        assert_eq!(model, described);
        let state = DynamicValue::encode(&model).unwrap();
        assert_eq!(state.decode::<ScheduleModel>().unwrap(), model);
    }

    #[test]
    fn trigger_dir_must_be_slash_delimited() {
        let schema = tokio_test::block_on(
            ScheduleResource::new().schema(Context::new(), ResourceSchemaRequest),
        )
        .schema;
        assert!(tfplug::validator::validate_config(&schema.block, &config().value).is_empty());

        let mut bad = tfplug::value::to_json(&config().value);
        bad["trigger"][0]["cos_file_upload_trigger"][0]["dir"] = json!("upload");
        let diags =
            tfplug::validator::validate_config(&schema.block, &tfplug::value::from_json(&bad));
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0].attribute.as_ref().map(|p| p.to_string()),
            Some("trigger[0].cos_file_upload_trigger[0].dir".to_string())
        );
    }

    #[test]
    fn status_is_not_a_schedule_parameter() {
        let mut model: ScheduleModel = config().decode().unwrap();
        let before = model.to_params();
        model.status = Some("Disabled".into());
        assert_eq!(model.to_params(), before);
    }
}
