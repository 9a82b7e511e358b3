//! Lists content moderation templates

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceSchemaRequest,
    DataSourceSchemaResponse, DataSourceWithConfigure, ReadDataSourceRequest,
    ReadDataSourceResponse,
};
use tfplug::schema::{Block, BlockBuilder, SchemaBuilder};
use tfplug::types::{Diagnostic, DynamicValue};
use tfplug::validator::StringOneOf;
use tfplug::value::{null_default, single_block, to_json};

use super::common::{
    configure, id_attribute, read_failed, result_output_file_attribute, result_set_attribute,
    results_id, write_result_output_file,
};
use crate::api::templates::{ContentReviewTemplate, DescribeTemplatesRequest};
use crate::log::log_elapsed;
use crate::provider_data::MpsProviderData;
use crate::resources::common::{
    api_error, decode, encode_state, not_configured, number, number_list, string,
};
use crate::resources::content_review_template::{
    category_block, ReviewConfigureModel, CATEGORIES,
};
use crate::retry::with_retry;

const TYPE_NAME: &str = "tencentcloud_mps_content_review_templates";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentReviewTemplateInfoModel {
    pub definition: Option<i64>,
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
    pub create_time: Option<String>,
    pub update_time: Option<String>,
    pub r#type: Option<String>,
}

impl From<ContentReviewTemplate> for ContentReviewTemplateInfoModel {
    fn from(template: ContentReviewTemplate) -> Self {
        Self {
            definition: template.definition,
            name: template.name,
            comment: template.comment,
            porn_configure: template.porn_configure.map(Into::into),
            terrorism_configure: template.terrorism_configure.map(Into::into),
            political_configure: template.political_configure.map(Into::into),
            prohibited_configure: template.prohibited_configure.map(Into::into),
            user_define_configure: template.user_define_configure.map(Into::into),
            create_time: template.create_time,
            update_time: template.update_time,
            r#type: template.r#type,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentReviewTemplatesDataSourceModel {
    pub id: Option<String>,
    pub definitions: Option<Vec<i64>>,
    pub r#type: Option<String>,
    pub result_output_file: Option<String>,
    /// Entries already reshaped to the element type of the result list
    #[serde(default, deserialize_with = "null_default")]
    pub content_review_template_set: Vec<Value>,
}

impl ContentReviewTemplatesDataSourceModel {
    fn filter(&self) -> DescribeTemplatesRequest {
        DescribeTemplatesRequest {
            definitions: self.definitions.clone(),
            r#type: self.r#type.clone(),
            ..Default::default()
        }
    }
}

fn template_info_block() -> BlockBuilder {
    let block = BlockBuilder::new("content_review_template_set")
        .description("The content moderation templates found.")
        .attribute(number("definition", "Unique ID of the template.").computed().build())
        .attribute(string("name", "Template name.").computed().build())
        .attribute(string("comment", "Template description.").computed().build());
    CATEGORIES
        .iter()
        .fold(block, |block, (name, description, channels)| {
            block.block(category_block(name, description, channels).build())
        })
        .attribute(
            string("create_time", "Creation time in ISO date format.")
                .computed()
                .build(),
        )
        .attribute(
            string("update_time", "Last modified time in ISO date format.")
                .computed()
                .build(),
        )
        .attribute(
            string("type", "Template type, `Preset` or `Custom`.")
                .computed()
                .build(),
        )
}

/// Categories share one model, so each entry is cut down to the channels its
/// category declares before it goes into the result list.
fn result_entry(block: &Block, info: &ContentReviewTemplateInfoModel) -> Result<Value, Diagnostic> {
    let encoded = DynamicValue::encode(info)
        .map_err(|e| Diagnostic::error("Failed to encode state", e.to_string()))?;
    Ok(to_json(&block.conform(&encoded.value)))
}

#[derive(Default)]
pub struct ContentReviewTemplatesDataSource {
    provider_data: Option<MpsProviderData>,
}

impl ContentReviewTemplatesDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataSource for ContentReviewTemplatesDataSource {
    fn type_name(&self) -> &str {
        TYPE_NAME
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .description(
                "Use this data source to query detailed information of mps content_review_templates",
            )
            .attribute(id_attribute())
            .attribute(
                number_list("definitions", "IDs of the templates to query, up to 50.")
                    .optional()
                    .build(),
            )
            .attribute(
                string("type", "Template type, `Preset` or `Custom`. All if unset.")
                    .optional()
                    .validator(StringOneOf::new(["Preset", "Custom"]))
                    .build(),
            )
            .attribute(result_output_file_attribute())
            .attribute(result_set_attribute(template_info_block()))
            .build();

        DataSourceSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn read(&self, ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let _elapsed = log_elapsed(&ctx, "data_source.tencentcloud_mps_content_review_templates.read");

        let Some(data) = &self.provider_data else {
            return read_failed(vec![not_configured()]);
        };

        let mut model: ContentReviewTemplatesDataSourceModel =
            match decode(&request.config, "configuration") {
                Ok(model) => model,
                Err(diag) => return read_failed(vec![diag]),
            };

        let filter = model.filter();
        let service = data.service();
        let page = match with_retry(&data.read_retry, || {
            service.describe_content_review_templates_by_filter(&ctx, filter.clone())
        })
        .await
        {
            Ok(page) => page,
            Err(e) => {
                return read_failed(vec![api_error(
                    "Failed to read content review templates",
                    &e,
                )])
            }
        };

        let infos: Vec<ContentReviewTemplateInfoModel> =
            page.items.into_iter().map(Into::into).collect();
        let block = template_info_block().build().block;
        model.content_review_template_set = match infos
            .iter()
            .map(|info| result_entry(&block, info))
            .collect::<Result<Vec<_>, _>>()
        {
            Ok(entries) => entries,
            Err(diag) => return read_failed(vec![diag]),
        };
        model.id = Some(results_id(
            infos
                .iter()
                .map(|t| t.definition.unwrap_or_default().to_string()),
        ));

        let mut diagnostics = vec![];
        if let Some(path) = &model.result_output_file {
            if let Err(diag) = write_result_output_file(path, &infos).await {
                diagnostics.push(diag);
            }
        }

        ReadDataSourceResponse {
            state: encode_state(&model, &mut diagnostics),
            diagnostics,
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for ContentReviewTemplatesDataSource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        configure(request.provider_data, &mut self.provider_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entries_keep_only_declared_channels() {
        let template: ContentReviewTemplate = serde_json::from_value(json!({
            "Definition": 20,
            "Name": "review",
            "Type": "Custom",
            "PornConfigure": {
                "AsrReviewInfo": {"Switch": "ON", "BlockConfidence": 100, "ReviewConfidence": 75}
            }
        }))
        .unwrap();
        let block = template_info_block().build().block;

        let entry = result_entry(&block, &template.into()).unwrap();

        let porn = &entry["porn_configure"][0];
        assert!(porn.get("face_review_info").is_none());
        assert!(porn["asr_review_info"][0].get("label_set").is_none());
        assert_eq!(porn["asr_review_info"][0]["review_confidence"], 75);
        assert_eq!(porn["img_review_info"], json!([]));
        assert_eq!(entry["terrorism_configure"], json!([]));
        assert_eq!(entry["definition"], 20);
    }
}
