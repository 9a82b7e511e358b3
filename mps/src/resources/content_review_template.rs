//! Content moderation template resource

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
use tfplug::schema::{AttributeBuilder, BlockBuilder, SchemaBuilder};
use tfplug::types::{AttributePath, DynamicValue};
use tfplug::validator::{NumberRange, StringOneOf};
use tfplug::value::single_block;

use super::common::{
    api_error, decode, definition_from_id, encode_state, id_attribute, not_configured, number,
    string, string_list, warn_vanished, written_state,
};
use crate::api::templates::{
    ContentReviewTemplate, ContentReviewTemplateParams, ModifyTemplateRequest,
    ReviewConfigureInfo, ReviewTemplateInfo,
};
use crate::api::ApiError;
use crate::log::log_elapsed;
use crate::provider_data::MpsProviderData;
use crate::retry::with_retry;

const TYPE_NAME: &str = "tencentcloud_mps_content_review_template";
const WHAT: &str = "content review template";

/// A detection channel inside a moderation category
pub(crate) struct Channel {
    pub name: &'static str,
    pub what: &'static str,
    pub labels: bool,
    pub required: bool,
}

const fn channel(name: &'static str, what: &'static str, labels: bool) -> Channel {
    Channel {
        name,
        what,
        labels,
        required: false,
    }
}

/// Moderation categories and the channels each one accepts
pub(crate) const CATEGORIES: [(&str, &str, &[Channel]); 5] = [
    (
        "porn_configure",
        "Porn information detection.",
        &[
            channel("img_review_info", "in images", true),
            channel("asr_review_info", "in speech", false),
            channel("ocr_review_info", "in text", false),
        ],
    ),
    (
        "terrorism_configure",
        "Terrorism information detection.",
        &[
            channel("img_review_info", "in images", true),
            Channel {
                name: "ocr_review_info",
                what: "in text",
                labels: false,
                required: true,
            },
        ],
    ),
    (
        "political_configure",
        "Politically sensitive information detection.",
        &[
            channel("img_review_info", "in images", true),
            channel("asr_review_info", "in speech", false),
            channel("ocr_review_info", "in text", false),
        ],
    ),
    (
        "prohibited_configure",
        "Prohibited information detection.",
        &[
            channel("asr_review_info", "in speech", false),
            channel("ocr_review_info", "in text", false),
        ],
    ),
    (
        "user_define_configure",
        "Custom content detection.",
        &[
            channel("face_review_info", "of faces", true),
            channel("asr_review_info", "in speech", true),
            channel("ocr_review_info", "in text", true),
        ],
    ),
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewInfoModel {
    pub switch: Option<String>,
    pub label_set: Option<Vec<String>>,
    pub block_confidence: Option<i64>,
    pub review_confidence: Option<i64>,
}

impl From<ReviewInfoModel> for ReviewTemplateInfo {
    fn from(model: ReviewInfoModel) -> Self {
        Self {
            switch: model.switch,
            label_set: model.label_set,
            block_confidence: model.block_confidence,
            review_confidence: model.review_confidence,
        }
    }
}

impl From<ReviewTemplateInfo> for ReviewInfoModel {
    fn from(info: ReviewTemplateInfo) -> Self {
        Self {
            switch: info.switch,
            label_set: info.label_set,
            block_confidence: info.block_confidence,
            review_confidence: info.review_confidence,
        }
    }
}

/// Channels a category does not declare stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewConfigureModel {
    #[serde(default, with = "single_block")]
    pub img_review_info: Option<ReviewInfoModel>,
    #[serde(default, with = "single_block")]
    pub face_review_info: Option<ReviewInfoModel>,
    #[serde(default, with = "single_block")]
    pub asr_review_info: Option<ReviewInfoModel>,
    #[serde(default, with = "single_block")]
    pub ocr_review_info: Option<ReviewInfoModel>,
}

impl From<ReviewConfigureModel> for ReviewConfigureInfo {
    fn from(model: ReviewConfigureModel) -> Self {
        Self {
            img_review_info: model.img_review_info.map(Into::into),
            face_review_info: model.face_review_info.map(Into::into),
            asr_review_info: model.asr_review_info.map(Into::into),
            ocr_review_info: model.ocr_review_info.map(Into::into),
        }
    }
}

impl From<ReviewConfigureInfo> for ReviewConfigureModel {
    fn from(info: ReviewConfigureInfo) -> Self {
        Self {
            img_review_info: info.img_review_info.map(Into::into),
            face_review_info: info.face_review_info.map(Into::into),
            asr_review_info: info.asr_review_info.map(Into::into),
            ocr_review_info: info.ocr_review_info.map(Into::into),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentReviewTemplateModel {
    pub id: Option<String>,
    pub name: Option<String>,
    pub comment: Option<String>,
    #[serde(default, with = "single_block")]
    pub porn_configure: Option<ReviewConfigureModel>,
    #[serde(default, with = "single_block")]
    pub terrorism_configure: Option<ReviewConfigureModel>,
    #[serde(default, with = "single_block")]
    pub political_configure: Option<ReviewConfigureModel>,
    #[serde(default, with = "single_block")]
    pub prohibited_configure: Option<ReviewConfigureModel>,
    #[serde(default, with = "single_block")]
    pub user_define_configure: Option<ReviewConfigureModel>,
}

impl ContentReviewTemplateModel {
    fn to_params(&self) -> ContentReviewTemplateParams {
        ContentReviewTemplateParams {
            name: self.name.clone(),
            comment: self.comment.clone(),
            porn_configure: self.porn_configure.clone().map(Into::into),
            terrorism_configure: self.terrorism_configure.clone().map(Into::into),
            political_configure: self.political_configure.clone().map(Into::into),
            prohibited_configure: self.prohibited_configure.clone().map(Into::into),
            user_define_configure: self.user_define_configure.clone().map(Into::into),
        }
    }

    fn from_api(id: String, template: ContentReviewTemplate) -> Self {
        Self {
            id: Some(id),
            name: template.name,
            comment: template.comment,
            porn_configure: template.porn_configure.map(Into::into),
            terrorism_configure: template.terrorism_configure.map(Into::into),
            political_configure: template.political_configure.map(Into::into),
            prohibited_configure: template.prohibited_configure.map(Into::into),
            user_define_configure: template.user_define_configure.map(Into::into),
        }
    }
}

fn confidence(name: &str, description: &str) -> AttributeBuilder {
    number(name, description).validator(NumberRange {
        min: Some(0.0),
        max: Some(100.0),
    })
}

fn channel_block(channel: &Channel) -> BlockBuilder {
    let mut block = BlockBuilder::new(channel.name)
        .description(&format!("Detection {}.", channel.what))
        .single()
        .attribute(
            string("switch", &format!("Detection {} switch, `ON` or `OFF`.", channel.what))
                .required()
                .validator(StringOneOf::new(["ON", "OFF"]))
                .build(),
        )
        .attribute(
            confidence(
                "block_confidence",
                "Score, between 0 and 100, from which content is deemed a violation.",
            )
            .optional()
            .build(),
        )
        .attribute(
            confidence(
                "review_confidence",
                "Score, between 0 and 100, from which content goes to human review.",
            )
            .optional()
            .build(),
        );
    if channel.labels {
        block = block.attribute(
            string_list("label_set", "Filter labels. Every result is returned when empty.")
                .optional()
                .build(),
        );
    }
    if channel.required {
        block = block.required();
    }
    block
}

/// The `*_configure` block of one category
pub(crate) fn category_block(name: &str, description: &str, channels: &[Channel]) -> BlockBuilder {
    channels.iter().fold(
        BlockBuilder::new(name).description(description).single(),
        |block, channel| block.block(channel_block(channel).build()),
    )
}

#[derive(Default)]
pub struct ContentReviewTemplateResource {
    provider_data: Option<MpsProviderData>,
}

impl ContentReviewTemplateResource {
    pub fn new() -> Self {
        Self::default()
    }

    async fn read_template(
        ctx: &Context,
        data: &MpsProviderData,
        definition: i64,
    ) -> Result<Option<ContentReviewTemplateModel>, ApiError> {
        let service = data.service();
        let template = with_retry(&data.read_retry, || {
            service.describe_content_review_template_by_id(ctx, definition)
        })
        .await?;
        Ok(template.map(|t| ContentReviewTemplateModel::from_api(definition.to_string(), t)))
    }
}

#[async_trait]
impl Resource for ContentReviewTemplateResource {
    fn type_name(&self) -> &str {
        TYPE_NAME
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        let schema = CATEGORIES.iter().fold(
            SchemaBuilder::new()
                .version(0)
                .description("Provides a resource to create a mps content_review_template")
                .attribute(id_attribute("The template definition."))
                .attribute(
                    string("name", "Name of the content moderation template, up to 64 characters.")
                        .optional()
                        .build(),
                )
                .attribute(
                    string("comment", "Template description, up to 256 characters.")
                        .optional()
                        .build(),
                ),
            |schema, (name, description, channels)| {
                schema.block(category_block(name, description, channels).build())
            },
        );

        ResourceSchemaResponse {
            schema: schema.build(),
            diagnostics: vec![],
        }
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let _elapsed =
            log_elapsed(&ctx, "resource.tencentcloud_mps_content_review_template.create");
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return CreateResourceResponse {
                new_state: DynamicValue::null(),
                private: vec![],
                diagnostics,
            };
        };

        let mut plan: ContentReviewTemplateModel = match decode(&request.config, "configuration")
        {
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
            client.create_content_review_template(&ctx, &params)
        })
        .await
        {
            Ok(definition) => definition,
            Err(e) => {
                diagnostics.push(api_error("Failed to create content review template", &e));
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
        let _elapsed = log_elapsed(&ctx, "resource.tencentcloud_mps_content_review_template.read");
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
            match decode::<ContentReviewTemplateModel>(&request.current_state, "state")
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
                diagnostics.push(api_error("Failed to read content review template", &e));
                ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                    private: request.private,
                }
            }
        }
    }

    async fn update(&self, ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let _elapsed =
            log_elapsed(&ctx, "resource.tencentcloud_mps_content_review_template.update");
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return UpdateResourceResponse {
                new_state: DynamicValue::null(),
                private: vec![],
                diagnostics,
            };
        };

        let decoded = decode::<ContentReviewTemplateModel>(&request.prior_state, "prior state")
            .and_then(|prior| {
                let plan: ContentReviewTemplateModel = decode(&request.config, "configuration")?;
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
                client.modify_content_review_template(&ctx, &modify)
            })
            .await
            {
                diagnostics.push(api_error("Failed to update content review template", &e));
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
        let _elapsed =
            log_elapsed(&ctx, "resource.tencentcloud_mps_content_review_template.delete");
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return DeleteResourceResponse { diagnostics };
        };

        let definition =
            match decode::<ContentReviewTemplateModel>(&request.prior_state, "prior state")
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
            service.delete_content_review_template_by_id(&ctx, definition)
        })
        .await
        {
            diagnostics.push(api_error("Failed to delete content review template", &e));
        }

        DeleteResourceResponse { diagnostics }
    }
}

#[async_trait]
impl ResourceWithConfigure for ContentReviewTemplateResource {
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
impl ResourceWithImportState for ContentReviewTemplateResource {
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
    use serde_json::json;
    use tfplug::types::Dynamic;
    use tfplug::validator::validate_config;

    fn schema() -> tfplug::schema::Schema {
        tokio_test::block_on(
            ContentReviewTemplateResource::new().schema(Context::new(), ResourceSchemaRequest),
        )
        .schema
    }

    #[test]
    fn categories_declare_only_their_channels() {
        let schema = schema();
        let channels = |category: &str| -> Vec<String> {
            let mut names: Vec<_> = schema
                .block
                .block_types
                .iter()
                .find(|b| b.type_name == category)
                .map(|b| b.block.block_types.iter().map(|c| c.type_name.clone()).collect())
                .unwrap_or_default();
            names.sort();
            names
        };

        assert_eq!(channels("terrorism_configure"), vec!["img_review_info", "ocr_review_info"]);
        assert_eq!(
            channels("user_define_configure"),
            vec!["asr_review_info", "face_review_info", "ocr_review_info"]
        );
        assert_eq!(channels("prohibited_configure"), vec!["asr_review_info", "ocr_review_info"]);
    }

    #[test]
    fn confidence_outside_range_is_rejected() {
        let config = json!({
            "id": null,
            "name": "terraform-test",
            "comment": null,
            "porn_configure": [{
                "img_review_info": [{"switch": "ON", "label_set": ["porn"], "block_confidence": 120, "review_confidence": 75}],
                "asr_review_info": [],
                "ocr_review_info": []
            }],
            "terrorism_configure": [],
            "political_configure": [],
            "prohibited_configure": [],
            "user_define_configure": []
        });
        let value: Dynamic = tfplug::value::from_json(&config);

        let diagnostics = validate_config(&schema().block, &value);
        assert_eq!(diagnostics.len(), 1, "{:?}", diagnostics);
    }

    #[test]
    fn configured_channels_reach_the_request() {
        let config = DynamicValue::new(tfplug::value::from_json(&json!({
            "id": null,
            "name": "terraform-test",
            "comment": null,
            "porn_configure": [],
            "terrorism_configure": [{
                "img_review_info": [{"switch": "ON", "label_set": ["guns"], "block_confidence": 60, "review_confidence": 100}],
                "ocr_review_info": [{"switch": "ON", "block_confidence": 60, "review_confidence": null}]
            }],
            "political_configure": [],
            "prohibited_configure": [],
            "user_define_configure": []
        })));

        let model: ContentReviewTemplateModel = config.decode().unwrap();
        let body = serde_json::to_value(model.to_params()).unwrap();

        assert_eq!(body["Name"], "terraform-test");
        assert_eq!(
            body["TerrorismConfigure"]["ImgReviewInfo"],
            json!({"Switch": "ON", "LabelSet": ["guns"], "BlockConfidence": 60, "ReviewConfidence": 100})
        );
        assert_eq!(
            body["TerrorismConfigure"]["OcrReviewInfo"],
            json!({"Switch": "ON", "BlockConfidence": 60})
        );
        assert!(body.get("PornConfigure").is_none());
    }
}
