//! Transcoding template resource

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
use tfplug::value::single_block;

use super::common::{
    api_error, audio_template_block, decode, definition_from_id, encode_state, id_attribute,
    not_configured, number, string, video_template_block, warn_vanished, written_state,
    AudioTemplateModel, VideoTemplateModel,
};
use crate::api::templates::{
    EnhanceConfig, EnhanceIntensity, EnhanceSwitch, FrameRateConfig, ModifyTemplateRequest,
    SuperResolutionConfig, TehdConfig, TranscodeTemplate, TranscodeTemplateParams,
    VideoEnhanceConfig,
};
use crate::api::ApiError;
use crate::log::log_elapsed;
use crate::provider_data::MpsProviderData;
use crate::retry::with_retry;

const TYPE_NAME: &str = "tencentcloud_mps_transcode_template";
const WHAT: &str = "transcode template";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TehdConfigModel {
    pub r#type: Option<String>,
    pub max_video_bitrate: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameRateModel {
    pub switch: Option<String>,
    pub fps: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuperResolutionModel {
    pub switch: Option<String>,
    pub r#type: Option<String>,
    pub size: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnhanceSwitchModel {
    pub switch: Option<String>,
    pub r#type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnhanceIntensityModel {
    pub switch: Option<String>,
    pub intensity: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoEnhanceModel {
    #[serde(default, with = "single_block")]
    pub frame_rate: Option<FrameRateModel>,
    #[serde(default, with = "single_block")]
    pub super_resolution: Option<SuperResolutionModel>,
    #[serde(default, with = "single_block")]
    pub hdr: Option<EnhanceSwitchModel>,
    #[serde(default, with = "single_block")]
    pub denoise: Option<EnhanceSwitchModel>,
    #[serde(default, with = "single_block")]
    pub image_quality_enhance: Option<EnhanceSwitchModel>,
    #[serde(default, with = "single_block")]
    pub color_enhance: Option<EnhanceSwitchModel>,
    #[serde(default, with = "single_block")]
    pub sharp_enhance: Option<EnhanceIntensityModel>,
    #[serde(default, with = "single_block")]
    pub face_enhance: Option<EnhanceIntensityModel>,
    #[serde(default, with = "single_block")]
    pub low_light_enhance: Option<EnhanceSwitchModel>,
    #[serde(default, with = "single_block")]
    pub scratch_repair: Option<EnhanceIntensityModel>,
    #[serde(default, with = "single_block")]
    pub artifact_repair: Option<EnhanceSwitchModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnhanceConfigModel {
    #[serde(default, with = "single_block")]
    pub video_enhance: Option<VideoEnhanceModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscodeTemplateModel {
    pub id: Option<String>,
    pub container: Option<String>,
    pub name: Option<String>,
    pub comment: Option<String>,
    pub remove_video: Option<i64>,
    pub remove_audio: Option<i64>,
    #[serde(default, with = "single_block")]
    pub video_template: Option<VideoTemplateModel>,
    #[serde(default, with = "single_block")]
    pub audio_template: Option<AudioTemplateModel>,
    #[serde(default, with = "single_block")]
    pub tehd_config: Option<TehdConfigModel>,
    #[serde(default, with = "single_block")]
    pub enhance_config: Option<EnhanceConfigModel>,
}

fn switch_to_api(model: EnhanceSwitchModel) -> EnhanceSwitch {
    EnhanceSwitch {
        switch: model.switch,
        r#type: model.r#type,
    }
}

fn switch_from_api(switch: EnhanceSwitch) -> EnhanceSwitchModel {
    EnhanceSwitchModel {
        switch: switch.switch,
        r#type: switch.r#type,
    }
}

fn intensity_to_api(model: EnhanceIntensityModel) -> EnhanceIntensity {
    EnhanceIntensity {
        switch: model.switch,
        intensity: model.intensity,
    }
}

fn intensity_from_api(intensity: EnhanceIntensity) -> EnhanceIntensityModel {
    EnhanceIntensityModel {
        switch: intensity.switch,
        intensity: intensity.intensity,
    }
}

impl From<VideoEnhanceModel> for VideoEnhanceConfig {
    fn from(model: VideoEnhanceModel) -> Self {
        Self {
            frame_rate: model.frame_rate.map(|f| FrameRateConfig {
                switch: f.switch,
                fps: f.fps,
            }),
            super_resolution: model.super_resolution.map(|s| SuperResolutionConfig {
                switch: s.switch,
                r#type: s.r#type,
                size: s.size,
            }),
            hdr: model.hdr.map(switch_to_api),
            denoise: model.denoise.map(switch_to_api),
            image_quality_enhance: model.image_quality_enhance.map(switch_to_api),
            color_enhance: model.color_enhance.map(switch_to_api),
            sharp_enhance: model.sharp_enhance.map(intensity_to_api),
            face_enhance: model.face_enhance.map(intensity_to_api),
            low_light_enhance: model.low_light_enhance.map(switch_to_api),
            scratch_repair: model.scratch_repair.map(intensity_to_api),
            artifact_repair: model.artifact_repair.map(switch_to_api),
        }
    }
}

impl From<VideoEnhanceConfig> for VideoEnhanceModel {
    fn from(config: VideoEnhanceConfig) -> Self {
        Self {
            frame_rate: config.frame_rate.map(|f| FrameRateModel {
                switch: f.switch,
                fps: f.fps,
            }),
            super_resolution: config.super_resolution.map(|s| SuperResolutionModel {
                switch: s.switch,
                r#type: s.r#type,
                size: s.size,
            }),
            hdr: config.hdr.map(switch_from_api),
            denoise: config.denoise.map(switch_from_api),
            image_quality_enhance: config.image_quality_enhance.map(switch_from_api),
            color_enhance: config.color_enhance.map(switch_from_api),
            sharp_enhance: config.sharp_enhance.map(intensity_from_api),
            face_enhance: config.face_enhance.map(intensity_from_api),
            low_light_enhance: config.low_light_enhance.map(switch_from_api),
            scratch_repair: config.scratch_repair.map(intensity_from_api),
            artifact_repair: config.artifact_repair.map(switch_from_api),
        }
    }
}

impl TranscodeTemplateModel {
    fn to_params(&self) -> TranscodeTemplateParams {
        TranscodeTemplateParams {
            container: self.container.clone(),
            name: self.name.clone(),
            comment: self.comment.clone(),
            remove_video: self.remove_video,
            remove_audio: self.remove_audio,
            video_template: self.video_template.clone().map(Into::into),
            audio_template: self.audio_template.clone().map(Into::into),
            tehd_config: self.tehd_config.clone().map(|t| TehdConfig {
                r#type: t.r#type,
                max_video_bitrate: t.max_video_bitrate,
            }),
            enhance_config: self.enhance_config.clone().map(|e| EnhanceConfig {
                video_enhance: e.video_enhance.map(Into::into),
            }),
        }
    }

    pub(crate) fn from_api(id: String, template: TranscodeTemplate) -> Self {
        Self {
            id: Some(id),
            container: template.container,
            name: template.name,
            comment: template.comment,
            remove_video: template.remove_video,
            remove_audio: template.remove_audio,
            video_template: template.video_template.map(Into::into),
            audio_template: template.audio_template.map(Into::into),
            tehd_config: template.tehd_config.map(|t| TehdConfigModel {
                r#type: t.r#type,
                max_video_bitrate: t.max_video_bitrate,
            }),
            enhance_config: template.enhance_config.map(|e| EnhanceConfigModel {
                video_enhance: e.video_enhance.map(Into::into),
            }),
        }
    }
}

fn switch_block(name: &str, description: &str, type_description: &str) -> BlockBuilder {
    BlockBuilder::new(name)
        .description(description)
        .single()
        .attribute(
            string("switch", "Capability switch, `ON` or `OFF`.")
                .optional()
                .build(),
        )
        .attribute(string("type", type_description).optional().build())
}

fn intensity_block(name: &str, description: &str) -> BlockBuilder {
    BlockBuilder::new(name)
        .description(description)
        .single()
        .attribute(
            string("switch", "Capability switch, `ON` or `OFF`.")
                .optional()
                .build(),
        )
        .attribute(
            number("intensity", "Strength, between 0.0 and 1.0.")
                .optional()
                .build(),
        )
}

pub(crate) fn tehd_config_block() -> BlockBuilder {
    BlockBuilder::new("tehd_config")
        .description("Top speed codec transcoding parameters.")
        .single()
        .attribute(
            string(
                "type",
                "Extreme high-speed transcoding type: `TEHD-100`, `TEHD-200` or `OFF`.",
            )
            .required()
            .build(),
        )
        .attribute(
            number("max_video_bitrate", "Video bitrate limit in Kbps.")
                .optional()
                .build(),
        )
}

pub(crate) fn enhance_config_block() -> BlockBuilder {
    let strength = "Strength: `weak`, `normal` or `strong`.";
    BlockBuilder::new("enhance_config")
        .description("Audio and video enhancement configuration.")
        .single()
        .block(
            BlockBuilder::new("video_enhance")
                .description("Video enhancement configuration.")
                .single()
                .block(
                    BlockBuilder::new("frame_rate")
                        .description("Frame interpolation configuration.")
                        .single()
                        .attribute(
                            string("switch", "Capability switch, `ON` or `OFF`.")
                                .optional()
                                .build(),
                        )
                        .attribute(
                            number("fps", "Frame rate in Hz, between 0 and 100.")
                                .optional()
                                .build(),
                        )
                        .build(),
                )
                .block(
                    BlockBuilder::new("super_resolution")
                        .description("Super resolution configuration.")
                        .single()
                        .attribute(
                            string("switch", "Capability switch, `ON` or `OFF`.")
                                .optional()
                                .build(),
                        )
                        .attribute(
                            string("type", "Strength: `lq` or `hq`.")
                                .optional()
                                .build(),
                        )
                        .attribute(
                            number("size", "Magnification, currently only 2.")
                                .optional()
                                .build(),
                        )
                        .build(),
                )
                .block(
                    switch_block("hdr", "HDR configuration.", "Type: `HDR10` or `HLG`.").build(),
                )
                .block(switch_block("denoise", "Video noise reduction configuration.", strength).build())
                .block(
                    switch_block(
                        "image_quality_enhance",
                        "Comprehensive enhancement configuration.",
                        strength,
                    )
                    .build(),
                )
                .block(switch_block("color_enhance", "Color enhancement configuration.", strength).build())
                .block(intensity_block("sharp_enhance", "Detail enhancement configuration.").build())
                .block(intensity_block("face_enhance", "Face enhancement configuration.").build())
                .block(
                    switch_block(
                        "low_light_enhance",
                        "Low light enhancement configuration.",
                        "Type, currently only `normal`.",
                    )
                    .build(),
                )
                .block(intensity_block("scratch_repair", "Banding removal configuration.").build())
                .block(
                    switch_block(
                        "artifact_repair",
                        "Artifact removal configuration.",
                        "Type: `weak` or `strong`.",
                    )
                    .build(),
                )
                .build(),
        )
}

#[derive(Default)]
pub struct TranscodeTemplateResource {
    provider_data: Option<MpsProviderData>,
}

impl TranscodeTemplateResource {
    pub fn new() -> Self {
        Self::default()
    }

    async fn read_template(
        ctx: &Context,
        data: &MpsProviderData,
        definition: i64,
    ) -> Result<Option<TranscodeTemplateModel>, ApiError> {
        let service = data.service();
        let template = with_retry(&data.read_retry, || {
            service.describe_transcode_template_by_id(ctx, definition)
        })
        .await?;
        Ok(template.map(|t| TranscodeTemplateModel::from_api(definition.to_string(), t)))
    }
}

#[async_trait]
impl Resource for TranscodeTemplateResource {
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
            .description("Provides a resource to create a mps transcode_template")
            .attribute(id_attribute("The template definition."))
            .attribute(
                string(
                    "container",
                    "Container format, e.g. `mp4`, `flv`, `hls`, `mp3`, `flac`, `ogg`, `m4a`.",
                )
                .required()
                .build(),
            )
            .attribute(
                string("name", "Transcoding template name, up to 64 characters.")
                    .optional()
                    .build(),
            )
            .attribute(
                string("comment", "Template description, up to 256 characters.")
                    .optional()
                    .build(),
            )
            .attribute(
                number("remove_video", "Whether to remove video data. 0: retain, 1: remove.")
                    .optional()
                    .build(),
            )
            .attribute(
                number("remove_audio", "Whether to remove audio data. 0: retain, 1: remove.")
                    .optional()
                    .build(),
            )
            .block(video_template_block("video_template").build())
            .block(audio_template_block("audio_template").build())
            .block(tehd_config_block().build())
            .block(enhance_config_block().build())
            .build();

        ResourceSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let _elapsed = log_elapsed(&ctx, "resource.tencentcloud_mps_transcode_template.create");
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return CreateResourceResponse {
                new_state: DynamicValue::null(),
                private: vec![],
                diagnostics,
            };
        };

        let mut plan: TranscodeTemplateModel = match decode(&request.config, "configuration") {
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
            client.create_transcode_template(&ctx, &params)
        })
        .await
        {
            Ok(definition) => definition,
            Err(e) => {
                diagnostics.push(api_error("Failed to create transcode template", &e));
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
        let _elapsed = log_elapsed(&ctx, "resource.tencentcloud_mps_transcode_template.read");
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics,
                private: request.private,
            };
        };

        let definition = match decode::<TranscodeTemplateModel>(&request.current_state, "state")
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
                diagnostics.push(api_error("Failed to read transcode template", &e));
                ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                    private: request.private,
                }
            }
        }
    }

    async fn update(&self, ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let _elapsed = log_elapsed(&ctx, "resource.tencentcloud_mps_transcode_template.update");
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return UpdateResourceResponse {
                new_state: DynamicValue::null(),
                private: vec![],
                diagnostics,
            };
        };

        let decoded = decode::<TranscodeTemplateModel>(&request.prior_state, "prior state")
            .and_then(|prior| {
                let plan: TranscodeTemplateModel = decode(&request.config, "configuration")?;
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
                client.modify_transcode_template(&ctx, &modify)
            })
            .await
            {
                diagnostics.push(api_error("Failed to update transcode template", &e));
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
        let _elapsed = log_elapsed(&ctx, "resource.tencentcloud_mps_transcode_template.delete");
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return DeleteResourceResponse { diagnostics };
        };

        let definition = match decode::<TranscodeTemplateModel>(&request.prior_state, "prior state")
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
            service.delete_transcode_template_by_id(&ctx, definition)
        })
        .await
        {
            diagnostics.push(api_error("Failed to delete transcode template", &e));
        }

        DeleteResourceResponse { diagnostics }
    }
}

#[async_trait]
impl ResourceWithConfigure for TranscodeTemplateResource {
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
impl ResourceWithImportState for TranscodeTemplateResource {
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
