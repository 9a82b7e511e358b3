//! Adaptive streaming, transcode, watermark, AI recognition and content review templates

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use tfplug::context::Context;

use super::client::Client;
use super::common::EmptyResponse;
use super::error::ApiError;

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VideoTemplateInfo {
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

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AudioTemplateInfo {
    pub codec: Option<String>,
    pub bitrate: Option<i64>,
    pub sample_rate: Option<i64>,
    pub audio_channel: Option<i64>,
}

/// One rendition of an adaptive bitrate stream
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AdaptiveStreamTemplate {
    pub video: Option<VideoTemplateInfo>,
    pub audio: Option<AudioTemplateInfo>,
    pub remove_audio: Option<i64>,
    pub remove_video: Option<i64>,
}

/// Arguments shared by CreateAdaptiveDynamicStreamingTemplate and its Modify counterpart
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AdaptiveDynamicStreamingTemplateParams {
    pub format: Option<String>,
    pub stream_infos: Option<Vec<AdaptiveStreamTemplate>>,
    pub name: Option<String>,
    pub disable_higher_video_bitrate: Option<i64>,
    pub disable_higher_video_resolution: Option<i64>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AdaptiveDynamicStreamingTemplate {
    pub definition: Option<i64>,
    pub r#type: Option<String>,
    pub name: Option<String>,
    pub comment: Option<String>,
    pub format: Option<String>,
    pub stream_infos: Option<Vec<AdaptiveStreamTemplate>>,
    pub disable_higher_video_bitrate: Option<i64>,
    pub disable_higher_video_resolution: Option<i64>,
    pub create_time: Option<String>,
    pub update_time: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TehdConfig {
    pub r#type: Option<String>,
    pub max_video_bitrate: Option<i64>,
}

/// Enhancement switched on and off, optionally with a strength type
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EnhanceSwitch {
    pub switch: Option<String>,
    pub r#type: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EnhanceIntensity {
    pub switch: Option<String>,
    pub intensity: Option<f64>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FrameRateConfig {
    pub switch: Option<String>,
    pub fps: Option<i64>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SuperResolutionConfig {
    pub switch: Option<String>,
    pub r#type: Option<String>,
    pub size: Option<i64>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VideoEnhanceConfig {
    pub frame_rate: Option<FrameRateConfig>,
    pub super_resolution: Option<SuperResolutionConfig>,
    pub hdr: Option<EnhanceSwitch>,
    pub denoise: Option<EnhanceSwitch>,
    pub image_quality_enhance: Option<EnhanceSwitch>,
    pub color_enhance: Option<EnhanceSwitch>,
    pub sharp_enhance: Option<EnhanceIntensity>,
    pub face_enhance: Option<EnhanceIntensity>,
    pub low_light_enhance: Option<EnhanceSwitch>,
    pub scratch_repair: Option<EnhanceIntensity>,
    pub artifact_repair: Option<EnhanceSwitch>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EnhanceConfig {
    pub video_enhance: Option<VideoEnhanceConfig>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TranscodeTemplateParams {
    pub container: Option<String>,
    pub name: Option<String>,
    pub comment: Option<String>,
    pub remove_video: Option<i64>,
    pub remove_audio: Option<i64>,
    pub video_template: Option<VideoTemplateInfo>,
    pub audio_template: Option<AudioTemplateInfo>,
    #[serde(rename = "TEHDConfig")]
    pub tehd_config: Option<TehdConfig>,
    pub enhance_config: Option<EnhanceConfig>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TranscodeTemplate {
    pub definition: Option<String>,
    pub container: Option<String>,
    pub name: Option<String>,
    pub comment: Option<String>,
    pub r#type: Option<String>,
    pub remove_video: Option<i64>,
    pub remove_audio: Option<i64>,
    pub video_template: Option<VideoTemplateInfo>,
    pub audio_template: Option<AudioTemplateInfo>,
    #[serde(rename = "TEHDConfig")]
    pub tehd_config: Option<TehdConfig>,
    pub container_type: Option<String>,
    pub create_time: Option<String>,
    pub update_time: Option<String>,
    pub enhance_config: Option<EnhanceConfig>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImageWatermarkInput {
    pub image_content: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub repeat_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImageWatermarkTemplate {
    pub image_url: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub repeat_type: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TextWatermarkTemplate {
    pub font_type: Option<String>,
    pub font_size: Option<String>,
    pub font_color: Option<String>,
    pub font_alpha: Option<f64>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SvgWatermarkTemplate {
    pub width: Option<String>,
    pub height: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct WatermarkTemplateParams {
    /// Immutable; left out of Modify requests
    pub r#type: Option<String>,
    pub name: Option<String>,
    pub comment: Option<String>,
    pub coordinate_origin: Option<String>,
    pub x_pos: Option<String>,
    pub y_pos: Option<String>,
    pub image_template: Option<ImageWatermarkInput>,
    pub text_template: Option<TextWatermarkTemplate>,
    pub svg_template: Option<SvgWatermarkTemplate>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WatermarkTemplate {
    pub definition: Option<i64>,
    pub r#type: Option<String>,
    pub name: Option<String>,
    pub comment: Option<String>,
    pub x_pos: Option<String>,
    pub y_pos: Option<String>,
    pub image_template: Option<ImageWatermarkTemplate>,
    pub text_template: Option<TextWatermarkTemplate>,
    pub svg_template: Option<SvgWatermarkTemplate>,
    pub coordinate_origin: Option<String>,
    pub create_time: Option<String>,
    pub update_time: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FaceConfigureInfo {
    pub switch: Option<String>,
    pub score: Option<f64>,
    pub default_library_label_set: Option<Vec<String>>,
    pub user_define_library_label_set: Option<Vec<String>>,
    pub face_library: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SwitchConfigureInfo {
    pub switch: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LabelConfigureInfo {
    pub switch: Option<String>,
    pub label_set: Option<Vec<String>>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AsrFullTextConfigureInfo {
    pub switch: Option<String>,
    pub subtitle_format: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AiRecognitionTemplateParams {
    pub name: Option<String>,
    pub comment: Option<String>,
    pub face_configure: Option<FaceConfigureInfo>,
    pub ocr_full_text_configure: Option<SwitchConfigureInfo>,
    pub ocr_words_configure: Option<LabelConfigureInfo>,
    pub asr_full_text_configure: Option<AsrFullTextConfigureInfo>,
    pub asr_words_configure: Option<LabelConfigureInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AiRecognitionTemplate {
    pub definition: Option<i64>,
    pub name: Option<String>,
    pub comment: Option<String>,
    pub face_configure: Option<FaceConfigureInfo>,
    pub ocr_full_text_configure: Option<SwitchConfigureInfo>,
    pub ocr_words_configure: Option<LabelConfigureInfo>,
    pub asr_full_text_configure: Option<AsrFullTextConfigureInfo>,
    pub asr_words_configure: Option<LabelConfigureInfo>,
    pub create_time: Option<String>,
    pub update_time: Option<String>,
}

/// Switch and thresholds of one detection channel. Only face, image and
/// custom channels take a `LabelSet`.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReviewTemplateInfo {
    pub switch: Option<String>,
    pub label_set: Option<Vec<String>>,
    pub block_confidence: Option<i64>,
    pub review_confidence: Option<i64>,
}

/// One moderation category. Each category uses a subset of the channels.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReviewConfigureInfo {
    pub img_review_info: Option<ReviewTemplateInfo>,
    pub face_review_info: Option<ReviewTemplateInfo>,
    pub asr_review_info: Option<ReviewTemplateInfo>,
    pub ocr_review_info: Option<ReviewTemplateInfo>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContentReviewTemplateParams {
    pub name: Option<String>,
    pub comment: Option<String>,
    pub porn_configure: Option<ReviewConfigureInfo>,
    pub terrorism_configure: Option<ReviewConfigureInfo>,
    pub political_configure: Option<ReviewConfigureInfo>,
    pub prohibited_configure: Option<ReviewConfigureInfo>,
    pub user_define_configure: Option<ReviewConfigureInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContentReviewTemplate {
    pub definition: Option<i64>,
    pub name: Option<String>,
    pub comment: Option<String>,
    pub porn_configure: Option<ReviewConfigureInfo>,
    pub terrorism_configure: Option<ReviewConfigureInfo>,
    pub political_configure: Option<ReviewConfigureInfo>,
    pub prohibited_configure: Option<ReviewConfigureInfo>,
    pub user_define_configure: Option<ReviewConfigureInfo>,
    pub create_time: Option<String>,
    pub update_time: Option<String>,
    pub r#type: Option<String>,
}

/// Modify* request: the template id followed by the same arguments as Create*
#[derive(Debug, Clone, Serialize)]
pub struct ModifyTemplateRequest<T> {
    #[serde(rename = "Definition")]
    pub definition: i64,
    #[serde(flatten)]
    pub params: T,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteTemplateRequest {
    pub definition: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateTemplateResponse {
    pub definition: i64,
    #[serde(default)]
    pub request_id: String,
}

/// Filters accepted by the Describe*Templates actions. Members a given
/// action does not know are left unset.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeTemplatesRequest {
    pub definitions: Option<Vec<i64>>,
    pub r#type: Option<String>,
    pub container_type: Option<String>,
    #[serde(rename = "TEHDType")]
    pub tehd_type: Option<String>,
    pub transcode_type: Option<String>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

impl DescribeTemplatesRequest {
    pub fn by_id(definition: i64) -> Self {
        Self {
            definitions: Some(vec![definition]),
            ..Default::default()
        }
    }
}

/// One page of a Describe*Templates call
#[derive(Debug, Clone, Default)]
pub struct TemplatePage<T> {
    pub total_count: i64,
    pub items: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeAdaptiveDynamicStreamingTemplatesResponse {
    #[serde(default)]
    total_count: i64,
    adaptive_dynamic_streaming_template_set: Option<Vec<AdaptiveDynamicStreamingTemplate>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeTranscodeTemplatesResponse {
    #[serde(default)]
    total_count: i64,
    transcode_template_set: Option<Vec<TranscodeTemplate>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeWatermarkTemplatesResponse {
    #[serde(default)]
    total_count: i64,
    watermark_template_set: Option<Vec<WatermarkTemplate>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeAiRecognitionTemplatesResponse {
    #[serde(default)]
    total_count: i64,
    #[serde(rename = "AIRecognitionTemplateSet")]
    ai_recognition_template_set: Option<Vec<AiRecognitionTemplate>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeContentReviewTemplatesResponse {
    #[serde(default)]
    total_count: i64,
    content_review_template_set: Option<Vec<ContentReviewTemplate>>,
}

impl Client {
    pub async fn create_adaptive_dynamic_streaming_template(
        &self,
        ctx: &Context,
        params: &AdaptiveDynamicStreamingTemplateParams,
    ) -> Result<i64, ApiError> {
        let response: CreateTemplateResponse = self
            .call(ctx, "CreateAdaptiveDynamicStreamingTemplate", params)
            .await?;
        Ok(response.definition)
    }

    pub async fn modify_adaptive_dynamic_streaming_template(
        &self,
        ctx: &Context,
        request: &ModifyTemplateRequest<AdaptiveDynamicStreamingTemplateParams>,
    ) -> Result<(), ApiError> {
        self.call::<_, EmptyResponse>(ctx, "ModifyAdaptiveDynamicStreamingTemplate", request)
            .await
            .map(|_| ())
    }

    pub async fn describe_adaptive_dynamic_streaming_templates(
        &self,
        ctx: &Context,
        request: &DescribeTemplatesRequest,
    ) -> Result<TemplatePage<AdaptiveDynamicStreamingTemplate>, ApiError> {
        let response: DescribeAdaptiveDynamicStreamingTemplatesResponse = self
            .call(ctx, "DescribeAdaptiveDynamicStreamingTemplates", request)
            .await?;
        Ok(TemplatePage {
            total_count: response.total_count,
            items: response
                .adaptive_dynamic_streaming_template_set
                .unwrap_or_default(),
        })
    }

    pub async fn delete_adaptive_dynamic_streaming_template(
        &self,
        ctx: &Context,
        definition: i64,
    ) -> Result<(), ApiError> {
        self.call::<_, EmptyResponse>(
            ctx,
            "DeleteAdaptiveDynamicStreamingTemplate",
            &DeleteTemplateRequest { definition },
        )
        .await
        .map(|_| ())
    }

    pub async fn create_transcode_template(
        &self,
        ctx: &Context,
        params: &TranscodeTemplateParams,
    ) -> Result<i64, ApiError> {
        let response: CreateTemplateResponse =
            self.call(ctx, "CreateTranscodeTemplate", params).await?;
        Ok(response.definition)
    }

    pub async fn modify_transcode_template(
        &self,
        ctx: &Context,
        request: &ModifyTemplateRequest<TranscodeTemplateParams>,
    ) -> Result<(), ApiError> {
        self.call::<_, EmptyResponse>(ctx, "ModifyTranscodeTemplate", request)
            .await
            .map(|_| ())
    }

    pub async fn describe_transcode_templates(
        &self,
        ctx: &Context,
        request: &DescribeTemplatesRequest,
    ) -> Result<TemplatePage<TranscodeTemplate>, ApiError> {
        let response: DescribeTranscodeTemplatesResponse =
            self.call(ctx, "DescribeTranscodeTemplates", request).await?;
        Ok(TemplatePage {
            total_count: response.total_count,
            items: response.transcode_template_set.unwrap_or_default(),
        })
    }

    pub async fn delete_transcode_template(
        &self,
        ctx: &Context,
        definition: i64,
    ) -> Result<(), ApiError> {
        self.call::<_, EmptyResponse>(
            ctx,
            "DeleteTranscodeTemplate",
            &DeleteTemplateRequest { definition },
        )
        .await
        .map(|_| ())
    }

    pub async fn create_watermark_template(
        &self,
        ctx: &Context,
        params: &WatermarkTemplateParams,
    ) -> Result<i64, ApiError> {
        let response: CreateTemplateResponse =
            self.call(ctx, "CreateWatermarkTemplate", params).await?;
        Ok(response.definition)
    }

    pub async fn modify_watermark_template(
        &self,
        ctx: &Context,
        request: &ModifyTemplateRequest<WatermarkTemplateParams>,
    ) -> Result<(), ApiError> {
        self.call::<_, EmptyResponse>(ctx, "ModifyWatermarkTemplate", request)
            .await
            .map(|_| ())
    }

    pub async fn describe_watermark_templates(
        &self,
        ctx: &Context,
        request: &DescribeTemplatesRequest,
    ) -> Result<TemplatePage<WatermarkTemplate>, ApiError> {
        let response: DescribeWatermarkTemplatesResponse =
            self.call(ctx, "DescribeWatermarkTemplates", request).await?;
        Ok(TemplatePage {
            total_count: response.total_count,
            items: response.watermark_template_set.unwrap_or_default(),
        })
    }

    pub async fn delete_watermark_template(
        &self,
        ctx: &Context,
        definition: i64,
    ) -> Result<(), ApiError> {
        self.call::<_, EmptyResponse>(
            ctx,
            "DeleteWatermarkTemplate",
            &DeleteTemplateRequest { definition },
        )
        .await
        .map(|_| ())
    }

    pub async fn create_ai_recognition_template(
        &self,
        ctx: &Context,
        params: &AiRecognitionTemplateParams,
    ) -> Result<i64, ApiError> {
        let response: CreateTemplateResponse =
            self.call(ctx, "CreateAIRecognitionTemplate", params).await?;
        Ok(response.definition)
    }

    pub async fn modify_ai_recognition_template(
        &self,
        ctx: &Context,
        request: &ModifyTemplateRequest<AiRecognitionTemplateParams>,
    ) -> Result<(), ApiError> {
        self.call::<_, EmptyResponse>(ctx, "ModifyAIRecognitionTemplate", request)
            .await
            .map(|_| ())
    }

    pub async fn describe_ai_recognition_templates(
        &self,
        ctx: &Context,
        request: &DescribeTemplatesRequest,
    ) -> Result<TemplatePage<AiRecognitionTemplate>, ApiError> {
        let response: DescribeAiRecognitionTemplatesResponse = self
            .call(ctx, "DescribeAIRecognitionTemplates", request)
            .await?;
        Ok(TemplatePage {
            total_count: response.total_count,
            items: response.ai_recognition_template_set.unwrap_or_default(),
        })
    }

    pub async fn delete_ai_recognition_template(
        &self,
        ctx: &Context,
        definition: i64,
    ) -> Result<(), ApiError> {
        self.call::<_, EmptyResponse>(
            ctx,
            "DeleteAIRecognitionTemplate",
            &DeleteTemplateRequest { definition },
        )
        .await
        .map(|_| ())
    }

    pub async fn create_content_review_template(
        &self,
        ctx: &Context,
        params: &ContentReviewTemplateParams,
    ) -> Result<i64, ApiError> {
        let response: CreateTemplateResponse =
            self.call(ctx, "CreateContentReviewTemplate", params).await?;
        Ok(response.definition)
    }

    pub async fn modify_content_review_template(
        &self,
        ctx: &Context,
        request: &ModifyTemplateRequest<ContentReviewTemplateParams>,
    ) -> Result<(), ApiError> {
        self.call::<_, EmptyResponse>(ctx, "ModifyContentReviewTemplate", request)
            .await
            .map(|_| ())
    }

    pub async fn describe_content_review_templates(
        &self,
        ctx: &Context,
        request: &DescribeTemplatesRequest,
    ) -> Result<TemplatePage<ContentReviewTemplate>, ApiError> {
        let response: DescribeContentReviewTemplatesResponse = self
            .call(ctx, "DescribeContentReviewTemplates", request)
            .await?;
        Ok(TemplatePage {
            total_count: response.total_count,
            items: response.content_review_template_set.unwrap_or_default(),
        })
    }

    pub async fn delete_content_review_template(
        &self,
        ctx: &Context,
        definition: i64,
    ) -> Result<(), ApiError> {
        self.call::<_, EmptyResponse>(
            ctx,
            "DeleteContentReviewTemplate",
            &DeleteTemplateRequest { definition },
        )
        .await
        .map(|_| ())
    }
}
