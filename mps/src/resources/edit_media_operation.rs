//! Clips or splices media files into a new one

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tfplug::context::Context;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceSchemaRequest, ResourceSchemaResponse,
    ResourceWithConfigure, UpdateResourceRequest, UpdateResourceResponse,
};
use tfplug::schema::{BlockBuilder, SchemaBuilder};
use tfplug::types::DynamicValue;
use tfplug::value::{null_default, single_block};

use super::common::{
    api_error, decode, encode_state, id_attribute, not_configured, number, output_storage_block,
    string, task_notify_config_block, OutputStorageModel, TaskNotifyConfigModel,
};
use crate::api::common::{CosInputInfo, MediaInputInfo, S3InputInfo, UrlInputInfo};
use crate::api::tasks::{EditMediaFileInfo, EditMediaOutputConfig, EditMediaRequest};
use crate::log::log_elapsed;
use crate::provider_data::MpsProviderData;
use crate::retry::with_retry;

const TYPE_NAME: &str = "tencentcloud_mps_edit_media_operation";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CosInputInfoModel {
    pub bucket: Option<String>,
    pub region: Option<String>,
    pub object: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UrlInputInfoModel {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct S3InputInfoModel {
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_object: Option<String>,
    pub s3_secret_id: Option<String>,
    pub s3_secret_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputInfoModel {
    pub r#type: Option<String>,
    #[serde(default, with = "single_block")]
    pub cos_input_info: Option<CosInputInfoModel>,
    #[serde(default, with = "single_block")]
    pub url_input_info: Option<UrlInputInfoModel>,
    #[serde(default, with = "single_block")]
    pub s3_input_info: Option<S3InputInfoModel>,
}

impl From<InputInfoModel> for MediaInputInfo {
    fn from(model: InputInfoModel) -> Self {
        Self {
            r#type: model.r#type,
            cos_input_info: model.cos_input_info.map(|cos| CosInputInfo {
                bucket: cos.bucket,
                region: cos.region,
                object: cos.object,
            }),
            url_input_info: model.url_input_info.map(|url| UrlInputInfo { url: url.url }),
            s3_input_info: model.s3_input_info.map(|s3| S3InputInfo {
                s3_bucket: s3.s3_bucket,
                s3_region: s3.s3_region,
                s3_object: s3.s3_object,
                s3_secret_id: s3.s3_secret_id,
                s3_secret_key: s3.s3_secret_key,
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileInfoModel {
    #[serde(default, with = "single_block")]
    pub input_info: Option<InputInfoModel>,
    pub start_time_offset: Option<f64>,
    pub end_time_offset: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfigModel {
    pub container: Option<String>,
    pub r#type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditMediaOperationModel {
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub file_infos: Vec<FileInfoModel>,
    #[serde(default, with = "single_block")]
    pub output_storage: Option<OutputStorageModel>,
    pub output_object_path: Option<String>,
    #[serde(default, with = "single_block")]
    pub output_config: Option<OutputConfigModel>,
    #[serde(default, with = "single_block")]
    pub task_notify_config: Option<TaskNotifyConfigModel>,
    pub tasks_priority: Option<i64>,
    pub session_id: Option<String>,
    pub session_context: Option<String>,
}

impl EditMediaOperationModel {
    fn to_request(&self) -> EditMediaRequest {
        EditMediaRequest {
            file_infos: Some(
                self.file_infos
                    .iter()
                    .cloned()
                    .map(|file| EditMediaFileInfo {
                        input_info: file.input_info.map(Into::into),
                        start_time_offset: file.start_time_offset,
                        end_time_offset: file.end_time_offset,
                    })
                    .collect(),
            ),
            output_storage: self.output_storage.clone().map(Into::into),
            output_object_path: self.output_object_path.clone(),
            output_config: self.output_config.clone().map(|config| EditMediaOutputConfig {
                container: config.container,
                r#type: config.r#type,
            }),
            task_notify_config: self.task_notify_config.clone().map(Into::into),
            tasks_priority: self.tasks_priority,
            session_id: self.session_id.clone(),
            session_context: self.session_context.clone(),
        }
    }
}

fn file_infos_block() -> BlockBuilder {
    BlockBuilder::new("file_infos")
        .description("The input files to edit, spliced in order.")
        .required()
        .force_new()
        .block(
            BlockBuilder::new("input_info")
                .description("The input file.")
                .single()
                .required()
                .attribute(
                    string("type", "The input type: `COS`, `URL` or `AWS-S3`.")
                        .required()
                        .build(),
                )
                .block(
                    BlockBuilder::new("cos_input_info")
                        .description("The COS object, when `type` is `COS`.")
                        .single()
                        .attribute(string("bucket", "The bucket name.").required().build())
                        .attribute(string("region", "The region of the bucket.").required().build())
                        .attribute(
                            string("object", "The path of the object, e.g. `/movie/201907/WildAnimal.mov`.")
                                .required()
                                .build(),
                        )
                        .build(),
                )
                .block(
                    BlockBuilder::new("url_input_info")
                        .description("The URL of the file, when `type` is `URL`.")
                        .single()
                        .attribute(string("url", "The video URL.").required().build())
                        .build(),
                )
                .block(
                    BlockBuilder::new("s3_input_info")
                        .description("The S3 object, when `type` is `AWS-S3`.")
                        .single()
                        .attribute(string("s3_bucket", "The S3 bucket.").required().build())
                        .attribute(string("s3_region", "The region of the S3 bucket.").required().build())
                        .attribute(string("s3_object", "The path of the S3 object.").required().build())
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
                .build(),
        )
        .attribute(
            number("start_time_offset", "Start offset of the clip in seconds.")
                .optional()
                .build(),
        )
        .attribute(
            number("end_time_offset", "End offset of the clip in seconds.")
                .optional()
                .build(),
        )
}

#[derive(Default)]
pub struct EditMediaOperationResource {
    provider_data: Option<MpsProviderData>,
}

impl EditMediaOperationResource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Resource for EditMediaOperationResource {
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
            .description("Provides a resource to create a mps edit_media_operation")
            .attribute(id_attribute("The ID of the editing task."))
            .block(file_infos_block().build())
            .block(
                output_storage_block("output_storage", "The storage location of the output file.")
                    .required()
                    .force_new()
                    .build(),
            )
            .attribute(
                string("output_object_path", "The path of the output file.")
                    .required()
                    .force_new()
                    .build(),
            )
            .block(
                BlockBuilder::new("output_config")
                    .description("The output configuration of the editing task.")
                    .single()
                    .force_new()
                    .attribute(
                        string("container", "The output format, `mp4` or `mov`.")
                            .optional()
                            .build(),
                    )
                    .attribute(
                        string("type", "The editing mode, `normal` or `fast`.")
                            .optional()
                            .build(),
                    )
                    .build(),
            )
            .block(task_notify_config_block().force_new().build())
            .attribute(
                number("tasks_priority", "The task priority, from -10 to 10.")
                    .optional()
                    .force_new()
                    .build(),
            )
            .attribute(
                string("session_id", "Deduplication ID, valid for three days.")
                    .optional()
                    .force_new()
                    .build(),
            )
            .attribute(
                string("session_context", "Source context passed through to callbacks.")
                    .optional()
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
        let _elapsed = log_elapsed(&ctx, "resource.tencentcloud_mps_edit_media_operation.create");
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return CreateResourceResponse {
                new_state: DynamicValue::null(),
                private: vec![],
                diagnostics,
            };
        };

        let mut plan: EditMediaOperationModel = match decode(&request.config, "configuration") {
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

        let edit = plan.to_request();
        let client = &data.client;
        let task_id = match with_retry(&data.write_retry, || client.edit_media(&ctx, &edit)).await {
            Ok(task_id) => task_id,
            Err(e) => {
                diagnostics.push(api_error("Failed to edit media", &e));
                return CreateResourceResponse {
                    new_state: DynamicValue::null(),
                    private: vec![],
                    diagnostics,
                };
            }
        };

        tracing::info!("{} editing task {} submitted", ctx.log_id(), task_id);
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
impl ResourceWithConfigure for EditMediaOperationResource {
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
    fn clips_reach_the_request_in_order() {
        let config = DynamicValue::new(tfplug::value::from_json(&json!({
            "id": null,
            "file_infos": [
                {
                    "input_info": [{
                        "type": "COS",
                        "cos_input_info": [{"bucket": "bucket-125", "region": "ap-guangzhou", "object": "/mps-test/a.mp4"}],
                        "url_input_info": [],
                        "s3_input_info": []
                    }],
                    "start_time_offset": 60,
                    "end_time_offset": 120
                },
                {
                    "input_info": [{
                        "type": "URL",
                        "cos_input_info": [],
                        "url_input_info": [{"url": "https://example.com/b.mp4"}],
                        "s3_input_info": []
                    }],
                    "start_time_offset": null,
                    "end_time_offset": null
                }
            ],
            "output_storage": [{
                "type": "COS",
                "cos_output_storage": [{"bucket": "bucket-125", "region": "ap-guangzhou"}],
                "s3_output_storage": []
            }],
            "output_object_path": "/output/edit.mp4",
            "output_config": [{"container": "mp4", "type": "normal"}],
            "task_notify_config": [],
            "tasks_priority": 10,
            "session_id": null,
            "session_context": null
        })));
        let model: EditMediaOperationModel = config.decode().unwrap();
        let body = serde_json::to_value(model.to_request()).unwrap();

        assert_eq!(body["FileInfos"][0]["InputInfo"]["CosInputInfo"]["Object"], "/mps-test/a.mp4");
        assert_eq!(body["FileInfos"][0]["StartTimeOffset"], 60.0);
        assert_eq!(
            body["FileInfos"][1],
            json!({"InputInfo": {"Type": "URL", "UrlInputInfo": {"Url": "https://example.com/b.mp4"}}})
        );
        assert_eq!(body["OutputConfig"], json!({"Container": "mp4", "Type": "normal"}));
        assert_eq!(body["TasksPriority"], 10);
        assert!(body.get("TaskNotifyConfig").is_none());
    }
}
