//! Watermark template resource

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
    ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::schema::{BlockBuilder, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use tfplug::validator::StringOneOf;
use tfplug::value::single_block;

use super::common::{
    api_error, decode, definition_from_id, encode_state, id_attribute, not_configured, number,
    string, warn_vanished, written_state,
};
use crate::api::templates::{
    ImageWatermarkInput, ModifyTemplateRequest, SvgWatermarkTemplate, TextWatermarkTemplate,
    WatermarkTemplate, WatermarkTemplateParams,
};
use crate::api::ApiError;
use crate::log::log_elapsed;
use crate::provider_data::MpsProviderData;
use crate::retry::with_retry;

const TYPE_NAME: &str = "tencentcloud_mps_watermark_template";
const WHAT: &str = "watermark template";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageTemplateModel {
    pub image_content: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub repeat_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextTemplateModel {
    pub font_type: Option<String>,
    pub font_size: Option<String>,
    pub font_color: Option<String>,
    pub font_alpha: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SvgTemplateModel {
    pub width: Option<String>,
    pub height: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WatermarkTemplateModel {
    pub id: Option<String>,
    pub r#type: Option<String>,
    pub name: Option<String>,
    pub comment: Option<String>,
    pub coordinate_origin: Option<String>,
    pub x_pos: Option<String>,
    pub y_pos: Option<String>,
    #[serde(default, with = "single_block")]
    pub image_template: Option<ImageTemplateModel>,
    #[serde(default, with = "single_block")]
    pub text_template: Option<TextTemplateModel>,
    #[serde(default, with = "single_block")]
    pub svg_template: Option<SvgTemplateModel>,
}

impl WatermarkTemplateModel {
    fn to_params(&self) -> WatermarkTemplateParams {
        WatermarkTemplateParams {
            r#type: self.r#type.clone(),
            name: self.name.clone(),
            comment: self.comment.clone(),
            coordinate_origin: self.coordinate_origin.clone(),
            x_pos: self.x_pos.clone(),
            y_pos: self.y_pos.clone(),
            image_template: self.image_template.clone().map(|i| ImageWatermarkInput {
                image_content: i.image_content,
                width: i.width,
                height: i.height,
                repeat_type: i.repeat_type,
            }),
            text_template: self.text_template.clone().map(|t| TextWatermarkTemplate {
                font_type: t.font_type,
                font_size: t.font_size,
                font_color: t.font_color,
                font_alpha: t.font_alpha,
            }),
            svg_template: self.svg_template.clone().map(|s| SvgWatermarkTemplate {
                width: s.width,
                height: s.height,
            }),
        }
    }

    /// The watermark type is fixed at creation; ModifyWatermarkTemplate has no `Type`.
    fn to_modify_params(&self) -> WatermarkTemplateParams {
        WatermarkTemplateParams {
            r#type: None,
            ..self.to_params()
        }
    }

    /// MPS only returns the URL of an uploaded image, so the configured
    /// `image_content` is carried over from `known`.
    fn from_api(id: String, template: WatermarkTemplate, known: Option<&ImageTemplateModel>) -> Self {
        Self {
            id: Some(id),
            r#type: template.r#type,
            name: template.name,
            comment: template.comment,
            coordinate_origin: template.coordinate_origin,
            x_pos: template.x_pos,
            y_pos: template.y_pos,
            image_template: template.image_template.map(|i| ImageTemplateModel {
                image_content: known.and_then(|k| k.image_content.clone()),
                width: i.width,
                height: i.height,
                repeat_type: i.repeat_type,
            }),
            text_template: template.text_template.map(|t| TextTemplateModel {
                font_type: t.font_type,
                font_size: t.font_size,
                font_color: t.font_color,
                font_alpha: t.font_alpha,
            }),
            svg_template: template.svg_template.map(|s| SvgTemplateModel {
                width: s.width,
                height: s.height,
            }),
        }
    }
}

#[derive(Default)]
pub struct WatermarkTemplateResource {
    provider_data: Option<MpsProviderData>,
}

impl WatermarkTemplateResource {
    pub fn new() -> Self {
        Self::default()
    }

    async fn read_template(
        ctx: &Context,
        data: &MpsProviderData,
        definition: i64,
        known: Option<&ImageTemplateModel>,
    ) -> Result<Option<WatermarkTemplateModel>, ApiError> {
        let service = data.service();
        let template = with_retry(&data.read_retry, || {
            service.describe_watermark_template_by_id(ctx, definition)
        })
        .await?;
        Ok(template.map(|t| WatermarkTemplateModel::from_api(definition.to_string(), t, known)))
    }
}

#[async_trait]
impl Resource for WatermarkTemplateResource {
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
            .description("Provides a resource to create a mps watermark_template")
            .attribute(id_attribute("The template definition."))
            .attribute(
                string("type", "Watermark type. Valid values: `image`, `text`, `svg`.")
                    .required()
                    .validator(StringOneOf::new(["image", "text", "svg"]))
                    .force_new()
                    .build(),
            )
            .attribute(
                string("name", "Watermark template name, up to 64 characters.")
                    .optional()
                    .build(),
            )
            .attribute(
                string("comment", "Template description, up to 256 characters.")
                    .optional()
                    .build(),
            )
            .attribute(
                string(
                    "coordinate_origin",
                    "Origin position: `TopLeft`, `TopRight`, `BottomLeft` or `BottomRight`.",
                )
                .optional()
                .build(),
            )
            .attribute(
                string("x_pos", "Horizontal offset from the origin, in px or `%`.")
                    .optional()
                    .build(),
            )
            .attribute(
                string("y_pos", "Vertical offset from the origin, in px or `%`.")
                    .optional()
                    .build(),
            )
            .block(
                BlockBuilder::new("image_template")
                    .description("Image watermark template, required when `type` is `image`.")
                    .single()
                    .attribute(
                        string(
                            "image_content",
                            "Base64-encoded watermark image, JPEG or PNG.",
                        )
                        .required()
                        .build(),
                    )
                    .attribute(
                        string("width", "Watermark width, in px or `%`.")
                            .optional()
                            .build(),
                    )
                    .attribute(
                        string("height", "Watermark height, in px or `%`.")
                            .optional()
                            .build(),
                    )
                    .attribute(
                        string("repeat_type", "Repeat type: `once`, `repeat_last_frame` or `repeat`.")
                            .optional()
                            .build(),
                    )
                    .build(),
            )
            .block(
                BlockBuilder::new("text_template")
                    .description("Text watermark template, required when `type` is `text`.")
                    .single()
                    .attribute(string("font_type", "Font type, e.g. `simkai.ttf`.").required().build())
                    .attribute(string("font_size", "Font size in px, e.g. `16px`.").required().build())
                    .attribute(string("font_color", "Font color, e.g. `0xFFFFFF`.").required().build())
                    .attribute(
                        number("font_alpha", "Text transparency, between 0 and 1.")
                            .required()
                            .build(),
                    )
                    .build(),
            )
            .block(
                BlockBuilder::new("svg_template")
                    .description("SVG watermark template, required when `type` is `svg`.")
                    .single()
                    .attribute(
                        string("width", "Watermark width, in px, `W%` or `H%`.")
                            .optional()
                            .build(),
                    )
                    .attribute(
                        string("height", "Watermark height, in px, `W%` or `H%`.")
                            .optional()
                            .build(),
                    )
                    .build(),
            )
            .build();

        ResourceSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        let mut diagnostics = vec![];

        // The block matching `type` carries the watermark itself.
        if let Ok(watermark_type) = request.config.get_string(&AttributePath::new("type")) {
            let block = format!("{}_template", watermark_type);
            let configured = match request.config.get(&AttributePath::new(&block)) {
                Some(Dynamic::List(items)) => !items.is_empty(),
                Some(Dynamic::Unknown) => true,
                _ => false,
            };
            if watermark_type != "svg" && !configured {
                diagnostics.push(
                    Diagnostic::error(
                        "Missing watermark template",
                        format!("`{}` is required when `type` is `{}`", block, watermark_type),
                    )
                    .with_attribute(AttributePath::new(&block)),
                );
            }
        }

        ValidateResourceConfigResponse { diagnostics }
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let _elapsed = log_elapsed(&ctx, "resource.tencentcloud_mps_watermark_template.create");
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return CreateResourceResponse {
                new_state: DynamicValue::null(),
                private: vec![],
                diagnostics,
            };
        };

        let mut plan: WatermarkTemplateModel = match decode(&request.config, "configuration") {
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
            client.create_watermark_template(&ctx, &params)
        })
        .await
        {
            Ok(definition) => definition,
            Err(e) => {
                diagnostics.push(api_error("Failed to create watermark template", &e));
                return CreateResourceResponse {
                    new_state: DynamicValue::null(),
                    private: vec![],
                    diagnostics,
                };
            }
        };

        plan.id = Some(definition.to_string());
        let read_back =
            Self::read_template(&ctx, data, definition, plan.image_template.as_ref()).await;
        let new_state = written_state(&plan, read_back, WHAT, &mut diagnostics);

        CreateResourceResponse {
            new_state,
            private: vec![],
            diagnostics,
        }
    }

    async fn read(&self, ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let _elapsed = log_elapsed(&ctx, "resource.tencentcloud_mps_watermark_template.read");
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics,
                private: request.private,
            };
        };

        let decoded = decode::<WatermarkTemplateModel>(&request.current_state, "state")
            .and_then(|state| Ok((definition_from_id(state.id.as_deref())?, state)));
        let (definition, current) = match decoded {
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

        match Self::read_template(&ctx, data, definition, current.image_template.as_ref()).await {
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
                diagnostics.push(api_error("Failed to read watermark template", &e));
                ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                    private: request.private,
                }
            }
        }
    }

    async fn update(&self, ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let _elapsed = log_elapsed(&ctx, "resource.tencentcloud_mps_watermark_template.update");
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return UpdateResourceResponse {
                new_state: DynamicValue::null(),
                private: vec![],
                diagnostics,
            };
        };

        let decoded = decode::<WatermarkTemplateModel>(&request.prior_state, "prior state")
            .and_then(|prior| {
                let plan: WatermarkTemplateModel = decode(&request.config, "configuration")?;
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

        let params = plan.to_modify_params();
        if params != prior.to_modify_params() {
            let modify = ModifyTemplateRequest { definition, params };
            let client = &data.client;
            if let Err(e) = with_retry(&data.write_retry, || {
                client.modify_watermark_template(&ctx, &modify)
            })
            .await
            {
                diagnostics.push(api_error("Failed to update watermark template", &e));
                return UpdateResourceResponse {
                    new_state: DynamicValue::null(),
                    private: vec![],
                    diagnostics,
                };
            }
        }

        let read_back =
            Self::read_template(&ctx, data, definition, plan.image_template.as_ref()).await;
        let new_state = written_state(&plan, read_back, WHAT, &mut diagnostics);

        UpdateResourceResponse {
            new_state,
            private: vec![],
            diagnostics,
        }
    }

    async fn delete(&self, ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let _elapsed = log_elapsed(&ctx, "resource.tencentcloud_mps_watermark_template.delete");
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return DeleteResourceResponse { diagnostics };
        };

        let definition = match decode::<WatermarkTemplateModel>(&request.prior_state, "prior state")
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
            service.delete_watermark_template_by_id(&ctx, definition)
        })
        .await
        {
            diagnostics.push(api_error("Failed to delete watermark template", &e));
        }

        DeleteResourceResponse { diagnostics }
    }
}

#[async_trait]
impl ResourceWithConfigure for WatermarkTemplateResource {
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
impl ResourceWithImportState for WatermarkTemplateResource {
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
