//! Response envelope and structures shared by several MPS actions

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// Every MPS response is wrapped as `{"Response": {...}}`
#[derive(Debug, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(rename = "Response")]
    pub response: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorEnvelope {
    pub error: Option<ErrorInfo>,
    #[serde(default)]
    pub request_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorInfo {
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// Response of actions that return nothing but a request id
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EmptyResponse {
    #[serde(default)]
    pub request_id: String,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CosInputInfo {
    pub bucket: Option<String>,
    pub region: Option<String>,
    pub object: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UrlInputInfo {
    pub url: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct S3InputInfo {
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_object: Option<String>,
    pub s3_secret_id: Option<String>,
    pub s3_secret_key: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MediaInputInfo {
    pub r#type: Option<String>,
    pub cos_input_info: Option<CosInputInfo>,
    pub url_input_info: Option<UrlInputInfo>,
    pub s3_input_info: Option<S3InputInfo>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CosOutputStorage {
    pub bucket: Option<String>,
    pub region: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct S3OutputStorage {
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_secret_id: Option<String>,
    pub s3_secret_key: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskOutputStorage {
    pub r#type: Option<String>,
    pub cos_output_storage: Option<CosOutputStorage>,
    pub s3_output_storage: Option<S3OutputStorage>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AwsSqs {
    #[serde(rename = "SQSRegion")]
    pub sqs_region: Option<String>,
    #[serde(rename = "SQSQueueName")]
    pub sqs_queue_name: Option<String>,
    #[serde(rename = "S3SecretId")]
    pub s3_secret_id: Option<String>,
    #[serde(rename = "S3SecretKey")]
    pub s3_secret_key: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskNotifyConfig {
    pub cmq_model: Option<String>,
    pub cmq_region: Option<String>,
    pub topic_name: Option<String>,
    pub queue_name: Option<String>,
    pub notify_mode: Option<String>,
    pub notify_type: Option<String>,
    pub notify_url: Option<String>,
    #[serde(rename = "AwsSQS")]
    pub aws_sqs: Option<AwsSqs>,
}
