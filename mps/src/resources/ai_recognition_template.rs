//! AI-based recognition template resource

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
use tfplug::validator::{NumberRange, StringOneOf};
use tfplug::value::single_block;

use super::common::{
    api_error, decode, definition_from_id, encode_state, id_attribute, not_configured, number,
    string, string_list, warn_vanished, written_state,
};
use crate::api::templates::{
    AiRecognitionTemplate, AiRecognitionTemplateParams, AsrFullTextConfigureInfo,
    FaceConfigureInfo, LabelConfigureInfo, ModifyTemplateRequest, SwitchConfigureInfo,
};
use crate::api::ApiError;
use crate::log::log_elapsed;
use crate::provider_data::MpsProviderData;
use crate::retry::with_retry;

const TYPE_NAME: &str = "tencentcloud_mps_ai_recognition_template";
const WHAT: &str = "AI recognition template";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaceConfigureModel {
    pub switch: Option<String>,
    pub score: Option<f64>,
    pub default_library_label_set: Option<Vec<String>>,
    pub user_define_library_label_set: Option<Vec<String>>,
    pub face_library: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwitchConfigureModel {
    pub switch: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelConfigureModel {
    pub switch: Option<String>,
    pub label_set: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AsrFullTextConfigureModel {
    pub switch: Option<String>,
    pub subtitle_format: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiRecognitionTemplateModel {
    pub id: Option<String>,
    pub name: Option<String>,
    pub comment: Option<String>,
    #[serde(default, with = "single_block")]
    pub face_configure: Option<FaceConfigureModel>,
    #[serde(default, with = "single_block")]
    pub ocr_full_text_configure: Option<SwitchConfigureModel>,
    #[serde(default, with = "single_block")]
    pub ocr_words_configure: Option<LabelConfigureModel>,
    #[serde(default, with = "single_block")]
    pub asr_full_text_configure: Option<AsrFullTextConfigureModel>,
    #[serde(default, with = "single_block")]
    pub asr_words_configure: Option<LabelConfigureModel>,
}

fn label_to_api(model: LabelConfigureModel) -> LabelConfigureInfo {
    LabelConfigureInfo {
        switch: model.switch,
        label_set: model.label_set,
    }
}

fn label_from_api(info: LabelConfigureInfo) -> LabelConfigureModel {
    LabelConfigureModel {
        switch: info.switch,
        label_set: info.label_set,
    }
}

impl AiRecognitionTemplateModel {
    fn to_params(&self) -> AiRecognitionTemplateParams {
        AiRecognitionTemplateParams {
            name: self.name.clone(),
            comment: self.comment.clone(),
            face_configure: self.face_configure.clone().map(|f| FaceConfigureInfo {
                switch: f.switch,
                score: f.score,
                default_library_label_set: f.default_library_label_set,
                user_define_library_label_set: f.user_define_library_label_set,
                face_library: f.face_library,
            }),
            ocr_full_text_configure: self
                .ocr_full_text_configure
                .clone()
                .map(|o| SwitchConfigureInfo { switch: o.switch }),
            ocr_words_configure: self.ocr_words_configure.clone().map(label_to_api),
            asr_full_text_configure: self.asr_full_text_configure.clone().map(|a| {
                AsrFullTextConfigureInfo {
                    switch: a.switch,
                    subtitle_format: a.subtitle_format,
                }
            }),
            asr_words_configure: self.asr_words_configure.clone().map(label_to_api),
        }
    }

    fn from_api(id: String, template: AiRecognitionTemplate) -> Self {
        Self {
            id: Some(id),
            name: template.name,
            comment: template.comment,
            face_configure: template.face_configure.map(|f| FaceConfigureModel {
                switch: f.switch,
                score: f.score,
                default_library_label_set: f.default_library_label_set,
                user_define_library_label_set: f.user_define_library_label_set,
                face_library: f.face_library,
            }),
            ocr_full_text_configure: template
                .ocr_full_text_configure
                .map(|o| SwitchConfigureModel { switch: o.switch }),
            ocr_words_configure: template.ocr_words_configure.map(label_from_api),
            asr_full_text_configure: template.asr_full_text_configure.map(|a| {
                AsrFullTextConfigureModel {
                    switch: a.switch,
                    subtitle_format: a.subtitle_format,
                }
            }),
            asr_words_configure: template.asr_words_configure.map(label_from_api),
        }
    }
}

fn switch_attribute(description: &str) -> tfplug::schema::Attribute {
    string("switch", description)
        .required()
        .validator(StringOneOf::new(["ON", "OFF"]))
        .build()
}

#[derive(Default)]
pub struct AiRecognitionTemplateResource {
    provider_data: Option<MpsProviderData>,
}

impl AiRecognitionTemplateResource {
    pub fn new() -> Self {
        Self::default()
    }

    async fn read_template(
        ctx: &Context,
        data: &MpsProviderData,
        definition: i64,
    ) -> Result<Option<AiRecognitionTemplateModel>, ApiError> {
        let service = data.service();
        let template = with_retry(&data.read_retry, || {
            service.describe_ai_recognition_template_by_id(ctx, definition)
        })
        .await?;
        Ok(template.map(|t| AiRecognitionTemplateModel::from_api(definition.to_string(), t)))
    }
}

#[async_trait]
impl Resource for AiRecognitionTemplateResource {
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
            .description("Provides a resource to create a mps ai_recognition_template")
            .attribute(id_attribute("The template definition."))
            .attribute(
                string("name", "Name of an AI-based recognition template, up to 64 characters.")
                    .optional()
                    .build(),
            )
            .attribute(
                string("comment", "Template description, up to 256 characters.")
                    .optional()
                    .build(),
            )
            .block(
                BlockBuilder::new("face_configure")
                    .description("Face recognition control parameters.")
                    .single()
                    .attribute(switch_attribute("Face recognition switch, `ON` or `OFF`."))
                    .attribute(
                        number("score", "Face recognition filter score, between 0 and 100.")
                            .optional()
                            .validator(NumberRange {
                                min: Some(0.0),
                                max: Some(100.0),
                            })
                            .build(),
                    )
                    .attribute(
                        string_list(
                            "default_library_label_set",
                            "Default figure labels: `entertainment`, `sport`, `politician`.",
                        )
                        .optional()
                        .build(),
                    )
                    .attribute(
                        string_list(
                            "user_define_library_label_set",
                            "Custom face labels, up to 100 labels of at most 16 characters.",
                        )
                        .optional()
                        .build(),
                    )
                    .attribute(
                        string(
                            "face_library",
                            "Figure library: `Default`, `UserDefine` or `All`.",
                        )
                        .optional()
                        .build(),
                    )
                    .build(),
            )
            .block(
                BlockBuilder::new("ocr_full_text_configure")
                    .description("Full text recognition control parameters.")
                    .single()
                    .attribute(switch_attribute("Full text recognition switch, `ON` or `OFF`."))
                    .build(),
            )
            .block(
                BlockBuilder::new("ocr_words_configure")
                    .description("Text keyword recognition control parameters.")
                    .single()
                    .attribute(switch_attribute("Text keyword recognition switch, `ON` or `OFF`."))
                    .attribute(
                        string_list("label_set", "Keyword filter labels.")
                            .optional()
                            .build(),
                    )
                    .build(),
            )
            .block(
                BlockBuilder::new("asr_full_text_configure")
                    .description("Full speech recognition control parameters.")
                    .single()
                    .attribute(switch_attribute("Full speech recognition switch, `ON` or `OFF`."))
                    .attribute(
                        string("subtitle_format", "Generated subtitle file format, `vtt`.")
                            .optional()
                            .build(),
                    )
                    .build(),
            )
            .block(
                BlockBuilder::new("asr_words_configure")
                    .description("Speech keyword recognition control parameters.")
                    .single()
                    .attribute(switch_attribute("Speech keyword recognition switch, `ON` or `OFF`."))
                    .attribute(
                        string_list("label_set", "Keyword filter labels.")
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

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let _elapsed = log_elapsed(&ctx, "resource.tencentcloud_mps_ai_recognition_template.create");
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return CreateResourceResponse {
                new_state: DynamicValue::null(),
                private: vec![],
                diagnostics,
            };
        };

        let mut plan: AiRecognitionTemplateModel = match decode(&request.config, "configuration") {
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
            client.create_ai_recognition_template(&ctx, &params)
        })
        .await
        {
            Ok(definition) => definition,
            Err(e) => {
                diagnostics.push(api_error("Failed to create AI recognition template", &e));
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
        let _elapsed = log_elapsed(&ctx, "resource.tencentcloud_mps_ai_recognition_template.read");
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics,
                private: request.private,
            };
        };

        let definition =
            match decode::<AiRecognitionTemplateModel>(&request.current_state, "state")
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
                diagnostics.push(api_error("Failed to read AI recognition template", &e));
                ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                    private: request.private,
                }
            }
        }
    }

    async fn update(&self, ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let _elapsed = log_elapsed(&ctx, "resource.tencentcloud_mps_ai_recognition_template.update");
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return UpdateResourceResponse {
                new_state: DynamicValue::null(),
                private: vec![],
                diagnostics,
            };
        };

        let decoded = decode::<AiRecognitionTemplateModel>(&request.prior_state, "prior state")
            .and_then(|prior| {
                let plan: AiRecognitionTemplateModel = decode(&request.config, "configuration")?;
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
                client.modify_ai_recognition_template(&ctx, &modify)
            })
            .await
            {
                diagnostics.push(api_error("Failed to update AI recognition template", &e));
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
        let _elapsed = log_elapsed(&ctx, "resource.tencentcloud_mps_ai_recognition_template.delete");
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return DeleteResourceResponse { diagnostics };
        };

        let definition =
            match decode::<AiRecognitionTemplateModel>(&request.prior_state, "prior state")
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
            service.delete_ai_recognition_template_by_id(&ctx, definition)
        })
        .await
        {
            diagnostics.push(api_error("Failed to delete AI recognition template", &e));
        }

        DeleteResourceResponse { diagnostics }
    }
}

#[async_trait]
impl ResourceWithConfigure for AiRecognitionTemplateResource {
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
impl ResourceWithImportState for AiRecognitionTemplateResource {
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
