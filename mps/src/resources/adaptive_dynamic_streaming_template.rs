//! Adaptive bitrate streaming template resource

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
use tfplug::schema::{BlockBuilder, SchemaBuilder};
use tfplug::types::{AttributePath, DynamicValue};
use tfplug::validator::StringOneOf;
use tfplug::value::{null_default, single_block};

use super::common::{
    api_error, audio_template_block, decode, definition_from_id, encode_state, id_attribute,
    not_configured, number, string, video_template_block, warn_vanished, written_state,
    AudioTemplateModel, VideoTemplateModel,
};
use crate::api::templates::{
    AdaptiveDynamicStreamingTemplate, AdaptiveDynamicStreamingTemplateParams,
    AdaptiveStreamTemplate, ModifyTemplateRequest,
};
use crate::api::ApiError;
use crate::log::log_elapsed;
use crate::provider_data::MpsProviderData;
use crate::retry::with_retry;

const TYPE_NAME: &str = "tencentcloud_mps_adaptive_dynamic_streaming_template";
const WHAT: &str = "adaptive dynamic streaming template";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamInfoModel {
    #[serde(default, with = "single_block")]
    pub video: Option<VideoTemplateModel>,
    #[serde(default, with = "single_block")]
    pub audio: Option<AudioTemplateModel>,
    pub remove_audio: Option<i64>,
    pub remove_video: Option<i64>,
}

impl From<StreamInfoModel> for AdaptiveStreamTemplate {
    fn from(model: StreamInfoModel) -> Self {
        Self {
            video: model.video.map(Into::into),
            audio: model.audio.map(Into::into),
            remove_audio: model.remove_audio,
            remove_video: model.remove_video,
        }
    }
}

impl From<AdaptiveStreamTemplate> for StreamInfoModel {
    fn from(stream: AdaptiveStreamTemplate) -> Self {
        Self {
            video: stream.video.map(Into::into),
            audio: stream.audio.map(Into::into),
            remove_audio: stream.remove_audio,
            remove_video: stream.remove_video,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveDynamicStreamingTemplateModel {
    pub id: Option<String>,
    pub format: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub stream_infos: Vec<StreamInfoModel>,
    pub name: Option<String>,
    pub disable_higher_video_bitrate: Option<i64>,
    pub disable_higher_video_resolution: Option<i64>,
    pub comment: Option<String>,
}

impl AdaptiveDynamicStreamingTemplateModel {
    fn to_params(&self) -> AdaptiveDynamicStreamingTemplateParams {
        AdaptiveDynamicStreamingTemplateParams {
            format: self.format.clone(),
            stream_infos: Some(self.stream_infos.iter().cloned().map(Into::into).collect()),
            name: self.name.clone(),
            disable_higher_video_bitrate: self.disable_higher_video_bitrate,
            disable_higher_video_resolution: self.disable_higher_video_resolution,
            comment: self.comment.clone(),
        }
    }

    fn from_api(id: String, template: AdaptiveDynamicStreamingTemplate) -> Self {
        Self {
            id: Some(id),
            format: template.format,
            stream_infos: template
                .stream_infos
                .unwrap_or_default()
                .into_iter()
                .map(Into::into)
                .collect(),
            name: template.name,
            disable_higher_video_bitrate: template.disable_higher_video_bitrate,
            disable_higher_video_resolution: template.disable_higher_video_resolution,
            comment: template.comment,
        }
    }
}

pub(crate) fn stream_infos_block() -> BlockBuilder {
    BlockBuilder::new("stream_infos")
        .description("Parameters of the output substreams, up to 10.")
        .block(video_template_block("video").required().build())
        .block(audio_template_block("audio").required().build())
        .attribute(
            number("remove_audio", "Whether to remove audio. 0: no, 1: yes.")
                .optional()
                .build(),
        )
        .attribute(
            number("remove_video", "Whether to remove video. 0: no, 1: yes.")
                .optional()
                .build(),
        )
}

#[derive(Default)]
pub struct AdaptiveDynamicStreamingTemplateResource {
    provider_data: Option<MpsProviderData>,
}

impl AdaptiveDynamicStreamingTemplateResource {
    pub fn new() -> Self {
        Self::default()
    }

    async fn read_template(
        ctx: &Context,
        data: &MpsProviderData,
        definition: i64,
    ) -> Result<Option<AdaptiveDynamicStreamingTemplateModel>, ApiError> {
        let service = data.service();
        let template = with_retry(&data.read_retry, || {
            service.describe_adaptive_dynamic_streaming_template_by_id(ctx, definition)
        })
        .await?;
        Ok(template.map(|t| {
            AdaptiveDynamicStreamingTemplateModel::from_api(definition.to_string(), t)
        }))
    }
}

#[async_trait]
impl Resource for AdaptiveDynamicStreamingTemplateResource {
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
            .description("Provides a resource to create a mps adaptive_dynamic_streaming_template")
            .attribute(id_attribute("The template definition."))
            .attribute(
                string("format", "Adaptive bitstream format. Valid values: `HLS`, `MPEG-DASH`.")
                    .required()
                    .validator(StringOneOf::new(["HLS", "MPEG-DASH"]))
                    .build(),
            )
            .block(stream_infos_block().required().max_items(10).build())
            .attribute(
                string("name", "Template name, up to 64 characters.")
                    .optional()
                    .build(),
            )
            .attribute(
                number(
                    "disable_higher_video_bitrate",
                    "Whether to forbid transcoding from low bitrate to high bitrate. 0: no, 1: yes.",
                )
                .optional()
                .build(),
            )
            .attribute(
                number(
                    "disable_higher_video_resolution",
                    "Whether to forbid transcoding from low resolution to high resolution. 0: no, 1: yes.",
                )
                .optional()
                .build(),
            )
            .attribute(
                string("comment", "Template description, up to 256 characters.")
                    .optional()
                    .build(),
            )
            .build();

        ResourceSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let _elapsed = log_elapsed(
            &ctx,
            "resource.tencentcloud_mps_adaptive_dynamic_streaming_template.create",
        );
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return CreateResourceResponse {
                new_state: DynamicValue::null(),
                private: vec![],
                diagnostics,
            };
        };

        let mut plan: AdaptiveDynamicStreamingTemplateModel =
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

        let params = plan.to_params();
        let client = &data.client;
        let definition = match with_retry(&data.write_retry, || {
            client.create_adaptive_dynamic_streaming_template(&ctx, &params)
        })
        .await
        {
            Ok(definition) => definition,
            Err(e) => {
                diagnostics.push(api_error(
                    "Failed to create adaptive dynamic streaming template",
                    &e,
                ));
                return CreateResourceResponse {
                    new_state: DynamicValue::null(),
                    private: vec![],
                    diagnostics,
                };
            }
        };

        plan.id = Some(definition.to_string());
        let read_back = Self::read_template(&ctx, data, definition).await;
        let new_state = written_state(&plan, read_back, WHAT, &mut diagnostics);

        CreateResourceResponse {
            new_state,
            private: vec![],
            diagnostics,
        }
    }

    async fn read(&self, ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let _elapsed = log_elapsed(
            &ctx,
            "resource.tencentcloud_mps_adaptive_dynamic_streaming_template.read",
        );
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics,
                private: request.private,
            };
        };

        let definition = match decode::<AdaptiveDynamicStreamingTemplateModel>(
            &request.current_state,
            "state",
        )
        .and_then(|state| definition_from_id(state.id.as_deref()))
        {
            Ok(definition) => definition,
            Err(diag) => {
                diagnostics.push(diag);
                return ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                    private: request.private,
                };
            }
        };

        match Self::read_template(&ctx, data, definition).await {
            Ok(Some(model)) => ReadResourceResponse {
                new_state: Some(encode_state(&model, &mut diagnostics)),
                diagnostics,
                private: request.private,
            },
            Ok(None) => {
                warn_vanished(&ctx, TYPE_NAME, &definition.to_string());
                ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                    private: request.private,
                }
            }
            Err(e) => {
                diagnostics.push(api_error(
                    "Failed to read adaptive dynamic streaming template",
                    &e,
                ));
                ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                    private: request.private,
                }
            }
        }
    }

    async fn update(&self, ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let _elapsed = log_elapsed(
            &ctx,
            "resource.tencentcloud_mps_adaptive_dynamic_streaming_template.update",
        );
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return UpdateResourceResponse {
                new_state: DynamicValue::null(),
                private: vec![],
                diagnostics,
            };
        };

        let decoded = decode::<AdaptiveDynamicStreamingTemplateModel>(
            &request.prior_state,
            "prior state",
        )
        .and_then(|prior| {
            let plan: AdaptiveDynamicStreamingTemplateModel =
                decode(&request.config, "configuration")?;
            let definition = definition_from_id(prior.id.as_deref())?;
            Ok((prior, plan, definition))
        });
        let (prior, mut plan, definition) = match decoded {
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
            let modify = ModifyTemplateRequest { definition, params };
            let client = &data.client;
            if let Err(e) = with_retry(&data.write_retry, || {
                client.modify_adaptive_dynamic_streaming_template(&ctx, &modify)
            })
            .await
            {
                diagnostics.push(api_error(
                    "Failed to update adaptive dynamic streaming template",
                    &e,
                ));
                return UpdateResourceResponse {
                    new_state: DynamicValue::null(),
                    private: vec![],
                    diagnostics,
                };
            }
        }

        let read_back = Self::read_template(&ctx, data, definition).await;
        let new_state = written_state(&plan, read_back, WHAT, &mut diagnostics);

        UpdateResourceResponse {
            new_state,
            private: vec![],
            diagnostics,
        }
    }

    async fn delete(&self, ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let _elapsed = log_elapsed(
            &ctx,
            "resource.tencentcloud_mps_adaptive_dynamic_streaming_template.delete",
        );
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return DeleteResourceResponse { diagnostics };
        };

        let definition = match decode::<AdaptiveDynamicStreamingTemplateModel>(
            &request.prior_state,
            "prior state",
        )
        .and_then(|prior| definition_from_id(prior.id.as_deref()))
        {
            Ok(definition) => definition,
            Err(diag) => {
                diagnostics.push(diag);
                return DeleteResourceResponse { diagnostics };
            }
        };

        let service = data.service();
        if let Err(e) = with_retry(&data.write_retry, || {
            service.delete_adaptive_dynamic_streaming_template_by_id(&ctx, definition)
        })
        .await
        {
            diagnostics.push(api_error(
                "Failed to delete adaptive dynamic streaming template",
                &e,
            ));
        }

        DeleteResourceResponse { diagnostics }
    }
}

#[async_trait]
impl ResourceWithConfigure for AdaptiveDynamicStreamingTemplateResource {
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
impl ResourceWithImportState for AdaptiveDynamicStreamingTemplateResource {
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
