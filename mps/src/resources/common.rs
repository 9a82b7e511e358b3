//! Helpers and nested models shared by the MPS resources

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tfplug::context::Context;
use tfplug::plan_modifier::UseStateForUnknown;
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType, BlockBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};
use tfplug::value::single_block;

use crate::api::common::{
    AwsSqs, CosOutputStorage, S3OutputStorage, TaskNotifyConfig, TaskOutputStorage,
};
use crate::api::templates::{AudioTemplateInfo, VideoTemplateInfo};
use crate::api::ApiError;

/// Separator of composite resource ids such as `flow_id#output_id`
pub(crate) const ID_SEPARATOR: &str = "#";

pub(crate) fn id_attribute(description: &str) -> Attribute {
    AttributeBuilder::new("id", AttributeType::String)
        .description(description)
        .computed()
        .plan_modifier(UseStateForUnknown)
        .build()
}

pub(crate) fn not_configured() -> Diagnostic {
    Diagnostic::error(
        "Provider not configured",
        "Provider data was not properly configured",
    )
}

pub(crate) fn api_error(summary: &str, err: &ApiError) -> Diagnostic {
    Diagnostic::error(summary, format!("API error: {}", err))
}

pub(crate) fn decode<T: DeserializeOwned>(value: &DynamicValue, what: &str) -> Result<T, Diagnostic> {
    value
        .decode()
        .map_err(|e| Diagnostic::error(format!("Invalid {}", what), e.to_string()))
}

/// Encodes `model` as state, or pushes a diagnostic and returns null.
pub(crate) fn encode_state<T: Serialize>(model: &T, diagnostics: &mut Vec<Diagnostic>) -> DynamicValue {
    match DynamicValue::encode(model) {
        Ok(state) => state,
        Err(e) => {
            diagnostics.push(Diagnostic::error("Failed to encode state", e.to_string()));
            DynamicValue::null()
        }
    }
}

/// State after a successful write. When the entity cannot be read back the
/// written model is kept so the id is not lost.
pub(crate) fn written_state<T: Serialize>(
    written: &T,
    read_back: Result<Option<T>, ApiError>,
    what: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> DynamicValue {
    match read_back {
        Ok(Some(model)) => encode_state(&model, diagnostics),
        Ok(None) => {
            diagnostics.push(Diagnostic::error(
                format!("Failed to read {}", what),
                format!("The {} was not found after it was written", what),
            ));
            encode_state(written, diagnostics)
        }
        Err(e) => {
            diagnostics.push(api_error(&format!("Failed to read {}", what), &e));
            encode_state(written, diagnostics)
        }
    }
}

pub(crate) fn require_id(id: Option<&str>) -> Result<&str, Diagnostic> {
    match id {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(Diagnostic::error("Missing id", "The resource id is not set in state")
            .with_attribute(AttributePath::new("id"))),
    }
}

/// Template ids are numeric definitions kept as strings in state.
pub(crate) fn parse_definition(id: &str) -> Result<i64, Diagnostic> {
    id.parse().map_err(|_| {
        Diagnostic::error(
            "Invalid id",
            format!("Expected a numeric template definition, got \"{}\"", id),
        )
        .with_attribute(AttributePath::new("id"))
    })
}

pub(crate) fn definition_from_id(id: Option<&str>) -> Result<i64, Diagnostic> {
    require_id(id).and_then(parse_definition)
}

/// Logs that the entity behind `id` is gone; Terraform then drops it from state.
pub(crate) fn warn_vanished(ctx: &Context, type_name: &str, id: &str) {
    tracing::warn!(
        "{} resource `{}` [{}] not found, please check if it has been deleted.",
        ctx.log_id(),
        type_name,
        id
    );
}

/// Splits a composite id into exactly `N` non-empty parts.
pub(crate) fn split_id<const N: usize>(id: &str) -> Result<[&str; N], Diagnostic> {
    let parts: Vec<&str> = id.split(ID_SEPARATOR).collect();
    let invalid = || {
        Diagnostic::error(
            "Invalid id",
            format!(
                "Expected {} parts separated by `{}`, got \"{}\"",
                N, ID_SEPARATOR, id
            ),
        )
        .with_attribute(AttributePath::new("id"))
    };
    if parts.iter().any(|p| p.is_empty()) {
        return Err(invalid());
    }
    parts.try_into().map_err(|_| invalid())
}

pub(crate) fn immutable_argument(name: &str) -> Diagnostic {
    Diagnostic::error(
        "Unsupported update",
        format!("argument `{}` cannot be changed", name),
    )
    .with_attribute(AttributePath::new(name))
}

pub(crate) fn string(name: &str, description: &str) -> AttributeBuilder {
    AttributeBuilder::new(name, AttributeType::String).description(description)
}

pub(crate) fn number(name: &str, description: &str) -> AttributeBuilder {
    AttributeBuilder::new(name, AttributeType::Number).description(description)
}

pub(crate) fn boolean(name: &str, description: &str) -> AttributeBuilder {
    AttributeBuilder::new(name, AttributeType::Bool).description(description)
}

pub(crate) fn string_list(name: &str, description: &str) -> AttributeBuilder {
    AttributeBuilder::new(name, AttributeType::list(AttributeType::String)).description(description)
}

pub(crate) fn number_list(name: &str, description: &str) -> AttributeBuilder {
    AttributeBuilder::new(name, AttributeType::list(AttributeType::Number)).description(description)
}

// Output storage

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CosOutputStorageModel {
    pub bucket: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct S3OutputStorageModel {
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_secret_id: Option<String>,
    pub s3_secret_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputStorageModel {
    pub r#type: Option<String>,
    #[serde(default, with = "single_block")]
    pub cos_output_storage: Option<CosOutputStorageModel>,
    #[serde(default, with = "single_block")]
    pub s3_output_storage: Option<S3OutputStorageModel>,
}

impl OutputStorageModel {
    /// Restores S3 credentials the API did not echo back.
    pub fn keep_secrets_from(&mut self, known: Option<&OutputStorageModel>) {
        let (Some(s3), Some(known)) = (
            self.s3_output_storage.as_mut(),
            known.and_then(|k| k.s3_output_storage.as_ref()),
        ) else {
            return;
        };
        if s3.s3_secret_id.is_none() {
            s3.s3_secret_id = known.s3_secret_id.clone();
        }
        if s3.s3_secret_key.is_none() {
            s3.s3_secret_key = known.s3_secret_key.clone();
        }
    }
}

impl From<OutputStorageModel> for TaskOutputStorage {
    fn from(model: OutputStorageModel) -> Self {
        Self {
            r#type: model.r#type,
            cos_output_storage: model.cos_output_storage.map(|cos| CosOutputStorage {
                bucket: cos.bucket,
                region: cos.region,
            }),
            s3_output_storage: model.s3_output_storage.map(|s3| S3OutputStorage {
                s3_bucket: s3.s3_bucket,
                s3_region: s3.s3_region,
                s3_secret_id: s3.s3_secret_id,
                s3_secret_key: s3.s3_secret_key,
            }),
        }
    }
}

impl From<TaskOutputStorage> for OutputStorageModel {
    fn from(storage: TaskOutputStorage) -> Self {
        Self {
            r#type: storage.r#type,
            cos_output_storage: storage.cos_output_storage.map(|cos| CosOutputStorageModel {
                bucket: cos.bucket,
                region: cos.region,
            }),
            s3_output_storage: storage.s3_output_storage.map(|s3| S3OutputStorageModel {
                s3_bucket: s3.s3_bucket,
                s3_region: s3.s3_region,
                s3_secret_id: s3.s3_secret_id,
                s3_secret_key: s3.s3_secret_key,
            }),
        }
    }
}

/// `type` plus the COS and S3 sub-blocks; callers decide cardinality flags.
pub(crate) fn output_storage_block(name: &str, description: &str) -> BlockBuilder {
    BlockBuilder::new(name)
        .description(description)
        .single()
        .attribute(
            string(
                "type",
                "The storage type. `COS` for Tencent Cloud COS, `AWS-S3` for AWS S3 buckets.",
            )
            .required()
            .build(),
        )
        .block(
            BlockBuilder::new("cos_output_storage")
                .description("The COS bucket to save output files to, when `type` is `COS`.")
                .single()
                .attribute(string("bucket", "The bucket name.").optional().build())
                .attribute(string("region", "The region of the bucket.").optional().build())
                .build(),
        )
        .block(
            BlockBuilder::new("s3_output_storage")
                .description("The AWS S3 bucket to save output files to, when `type` is `AWS-S3`.")
                .single()
                .attribute(string("s3_bucket", "The S3 bucket.").required().build())
                .attribute(string("s3_region", "The region of the S3 bucket.").required().build())
                .attribute(
                    string("s3_secret_id", "The key ID required to access the S3 object.")
                        .optional()
                        .sensitive()
                        .build(),
                )
                .attribute(
                    string("s3_secret_key", "The key required to access the S3 object.")
                        .optional()
                        .sensitive()
                        .build(),
                )
                .build(),
        )
}

// Event notification

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AwsSqsModel {
    pub sqs_region: Option<String>,
    pub sqs_queue_name: Option<String>,
    pub s3_secret_id: Option<String>,
    pub s3_secret_key: Option<String>,
}

impl From<AwsSqsModel> for AwsSqs {
    fn from(model: AwsSqsModel) -> Self {
        Self {
            sqs_region: model.sqs_region,
            sqs_queue_name: model.sqs_queue_name,
            s3_secret_id: model.s3_secret_id,
            s3_secret_key: model.s3_secret_key,
        }
    }
}

impl From<AwsSqs> for AwsSqsModel {
    fn from(sqs: AwsSqs) -> Self {
        Self {
            sqs_region: sqs.sqs_region,
            sqs_queue_name: sqs.sqs_queue_name,
            s3_secret_id: sqs.s3_secret_id,
            s3_secret_key: sqs.s3_secret_key,
        }
    }
}

pub(crate) fn aws_sqs_block() -> BlockBuilder {
    BlockBuilder::new("aws_sqs")
        .description("The AWS SQS queue notifications are sent to.")
        .single()
        .attribute(string("sqs_region", "The region of the SQS queue.").required().build())
        .attribute(string("sqs_queue_name", "The name of the SQS queue.").required().build())
        .attribute(
            string("s3_secret_id", "The key ID required to read from the SQS queue.")
                .optional()
                .sensitive()
                .build(),
        )
        .attribute(
            string("s3_secret_key", "The key required to read from the SQS queue.")
                .optional()
                .sensitive()
                .build(),
        )
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskNotifyConfigModel {
    pub cmq_model: Option<String>,
    pub cmq_region: Option<String>,
    pub topic_name: Option<String>,
    pub queue_name: Option<String>,
    pub notify_mode: Option<String>,
    pub notify_type: Option<String>,
    pub notify_url: Option<String>,
    #[serde(default, with = "single_block")]
    pub aws_sqs: Option<AwsSqsModel>,
}

impl From<TaskNotifyConfigModel> for TaskNotifyConfig {
    fn from(model: TaskNotifyConfigModel) -> Self {
        Self {
            cmq_model: model.cmq_model,
            cmq_region: model.cmq_region,
            topic_name: model.topic_name,
            queue_name: model.queue_name,
            notify_mode: model.notify_mode,
            notify_type: model.notify_type,
            notify_url: model.notify_url,
            aws_sqs: model.aws_sqs.map(Into::into),
        }
    }
}

impl From<TaskNotifyConfig> for TaskNotifyConfigModel {
    fn from(config: TaskNotifyConfig) -> Self {
        Self {
            cmq_model: config.cmq_model,
            cmq_region: config.cmq_region,
            topic_name: config.topic_name,
            queue_name: config.queue_name,
            notify_mode: config.notify_mode,
            notify_type: config.notify_type,
            notify_url: config.notify_url,
            aws_sqs: config.aws_sqs.map(Into::into),
        }
    }
}

pub(crate) fn task_notify_config_block() -> BlockBuilder {
    BlockBuilder::new("task_notify_config")
        .description("The event notification configuration.")
        .single()
        .attribute(string("cmq_model", "The CMQ or TDMQ-CMQ model. `Queue` or `Topic`.").optional().build())
        .attribute(string("cmq_region", "The region of the CMQ or TDMQ-CMQ instance.").optional().build())
        .attribute(
            string("topic_name", "The topic name, valid when the model is `Topic`.")
                .optional()
                .build(),
        )
        .attribute(
            string("queue_name", "The queue name, valid when the model is `Queue`.")
                .optional()
                .build(),
        )
        .attribute(
            string("notify_mode", "Workflow notification method. `Finish` or `Change`.")
                .optional()
                .build(),
        )
        .attribute(
            string(
                "notify_type",
                "Notification type: `CMQ`, `TDMQ-CMQ`, `URL`, `SCF` or `AWS-SQS`.",
            )
            .optional()
            .build(),
        )
        .attribute(
            string("notify_url", "HTTP callback address, required when `notify_type` is `URL`.")
                .optional()
                .build(),
        )
        .block(aws_sqs_block().build())
}

// Audio and video parameters

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoTemplateModel {
    pub codec: Option<String>,
    pub fps: Option<i64>,
    pub bitrate: Option<i64>,
    pub resolution_adaptive: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub gop: Option<i64>,
    pub fill_type: Option<String>,
    pub vcrf: Option<i64>,
}

impl From<VideoTemplateModel> for VideoTemplateInfo {
    fn from(model: VideoTemplateModel) -> Self {
        Self {
            codec: model.codec,
            fps: model.fps,
            bitrate: model.bitrate,
            resolution_adaptive: model.resolution_adaptive,
            width: model.width,
            height: model.height,
            gop: model.gop,
            fill_type: model.fill_type,
            vcrf: model.vcrf,
        }
    }
}

impl From<VideoTemplateInfo> for VideoTemplateModel {
    fn from(info: VideoTemplateInfo) -> Self {
        Self {
            codec: info.codec,
            fps: info.fps,
            bitrate: info.bitrate,
            resolution_adaptive: info.resolution_adaptive,
            width: info.width,
            height: info.height,
            gop: info.gop,
            fill_type: info.fill_type,
            vcrf: info.vcrf,
        }
    }
}

pub(crate) fn video_template_block(name: &str) -> BlockBuilder {
    BlockBuilder::new(name)
        .description("Video stream parameters.")
        .single()
        .attribute(
            string("codec", "The video codec, e.g. `libx264`, `libx265`, `av1`.")
                .required()
                .build(),
        )
        .attribute(
            number("fps", "The video frame rate in Hz. 0 keeps the source frame rate.")
                .required()
                .build(),
        )
        .attribute(
            number("bitrate", "The video bitrate in Kbps. 0 keeps the source bitrate.")
                .required()
                .build(),
        )
        .attribute(
            string("resolution_adaptive", "Resolution adaption, `open` or `close`.")
                .optional()
                .build(),
        )
        .attribute(number("width", "The maximum video width in px.").optional().build())
        .attribute(number("height", "The maximum video height in px.").optional().build())
        .attribute(
            number("gop", "The interval between keyframes in frames.")
                .optional()
                .build(),
        )
        .attribute(
            string("fill_type", "The fill mode, e.g. `black`, `stretch`, `white`, `gauss`.")
                .optional()
                .build(),
        )
        .attribute(
            number("vcrf", "The video constant rate factor, between 1 and 51. 0 disables it.")
                .optional()
                .build(),
        )
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioTemplateModel {
    pub codec: Option<String>,
    pub bitrate: Option<i64>,
    pub sample_rate: Option<i64>,
    pub audio_channel: Option<i64>,
}

impl From<AudioTemplateModel> for AudioTemplateInfo {
    fn from(model: AudioTemplateModel) -> Self {
        Self {
            codec: model.codec,
            bitrate: model.bitrate,
            sample_rate: model.sample_rate,
            audio_channel: model.audio_channel,
        }
    }
}

impl From<AudioTemplateInfo> for AudioTemplateModel {
    fn from(info: AudioTemplateInfo) -> Self {
        Self {
            codec: info.codec,
            bitrate: info.bitrate,
            sample_rate: info.sample_rate,
            audio_channel: info.audio_channel,
        }
    }
}

pub(crate) fn audio_template_block(name: &str) -> BlockBuilder {
    BlockBuilder::new(name)
        .description("Audio stream parameters.")
        .single()
        .attribute(
            string("codec", "The audio codec, e.g. `libfdk_aac`, `libmp3lame`.")
                .required()
                .build(),
        )
        .attribute(
            number("bitrate", "The audio bitrate in Kbps. 0 keeps the source bitrate.")
                .required()
                .build(),
        )
        .attribute(
            number("sample_rate", "The audio sample rate in Hz.")
                .required()
                .build(),
        )
        .attribute(
            number("audio_channel", "Audio channels: 1 mono, 2 dual, 6 stereo.")
                .optional()
                .build(),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_id_requires_every_part() {
        assert_eq!(split_id::<2>("flow-1#out-2").unwrap(), ["flow-1", "out-2"]);
        assert!(split_id::<2>("flow-1").is_err());
        assert!(split_id::<2>("flow-1#").is_err());
        assert!(split_id::<2>("a#b#c").is_err());
    }

    #[test]
    fn definitions_must_be_numeric() {
        assert_eq!(parse_definition("1043").unwrap(), 1043);
        let diag = parse_definition("abc").unwrap_err();
        assert!(diag.detail.contains("abc"));
    }

    #[test]
    fn unreadable_write_keeps_the_written_model() {
        let mut diagnostics = vec![];
        let written = CosOutputStorageModel {
            bucket: Some("b".into()),
            region: None,
        };
        let state = written_state(&written, Ok(None), "template", &mut diagnostics);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            state.decode::<CosOutputStorageModel>().unwrap(),
            written
        );
    }

    #[test]
    fn missing_id_is_an_error() {
        assert!(require_id(None).is_err());
        assert!(require_id(Some("")).is_err());
        assert_eq!(require_id(Some("42")).unwrap(), "42");
    }

    #[test]
    fn output_storage_converts_both_ways() {
        let model = OutputStorageModel {
            r#type: Some("AWS-S3".into()),
            cos_output_storage: None,
            s3_output_storage: Some(S3OutputStorageModel {
                s3_bucket: Some("media".into()),
                s3_region: Some("us-east-1".into()),
                s3_secret_id: Some("id".into()),
                s3_secret_key: Some("key".into()),
            }),
        };

        let storage: TaskOutputStorage = model.clone().into();
        assert_eq!(storage.r#type.as_deref(), Some("AWS-S3"));
        assert_eq!(
            storage.s3_output_storage.as_ref().and_then(|s| s.s3_bucket.as_deref()),
            Some("media")
        );
        assert_eq!(OutputStorageModel::from(storage), model);
    }

    #[test]
    fn secrets_survive_a_read_without_them() {
        let known = OutputStorageModel {
            r#type: Some("AWS-S3".into()),
            cos_output_storage: None,
            s3_output_storage: Some(S3OutputStorageModel {
                s3_bucket: Some("media".into()),
                s3_region: Some("us-east-1".into()),
                s3_secret_id: Some("id".into()),
                s3_secret_key: Some("key".into()),
            }),
        };
        let mut read = known.clone();
        if let Some(s3) = read.s3_output_storage.as_mut() {
            s3.s3_secret_id = None;
            s3.s3_secret_key = None;
        }

        read.keep_secrets_from(Some(&known));
        assert_eq!(read, known);
    }

    #[test]
    fn output_storage_decodes_from_terraform_value() {
        let value = DynamicValue::new(tfplug::value::from_json(&serde_json::json!({
            "type": "COS",
            "cos_output_storage": [{"bucket": "b-125", "region": "ap-guangzhou"}],
            "s3_output_storage": []
        })));

        let model: OutputStorageModel = decode(&value, "output storage").unwrap();
        assert_eq!(
            model.cos_output_storage,
            Some(CosOutputStorageModel {
                bucket: Some("b-125".into()),
                region: Some("ap-guangzhou".into()),
            })
        );
        assert!(model.s3_output_storage.is_none());
    }
}
