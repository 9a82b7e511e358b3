//! Lists adaptive bitrate streaming templates

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceSchemaRequest,
    DataSourceSchemaResponse, DataSourceWithConfigure, ReadDataSourceRequest,
    ReadDataSourceResponse,
};
use tfplug::schema::{BlockBuilder, SchemaBuilder};
use tfplug::validator::{NumberRange, StringOneOf};
use tfplug::value::null_default;

use super::common::{
    configure, id_attribute, read_failed, result_output_file_attribute, result_set_attribute,
    results_id, write_result_output_file,
};
use crate::api::templates::{AdaptiveDynamicStreamingTemplate, DescribeTemplatesRequest};
use crate::log::log_elapsed;
use crate::provider_data::MpsProviderData;
use crate::resources::adaptive_dynamic_streaming_template::{stream_infos_block, StreamInfoModel};
use crate::resources::common::{
    api_error, decode, encode_state, not_configured, number, number_list, string,
};
use crate::retry::with_retry;

const TYPE_NAME: &str = "tencentcloud_mps_adaptive_dynamic_streaming_templates";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveDynamicStreamingTemplateInfoModel {
    pub definition: Option<i64>,
    pub r#type: Option<String>,
    pub name: Option<String>,
    pub comment: Option<String>,
    pub format: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub stream_infos: Vec<StreamInfoModel>,
    pub disable_higher_video_bitrate: Option<i64>,
    pub disable_higher_video_resolution: Option<i64>,
    pub create_time: Option<String>,
    pub update_time: Option<String>,
}

impl From<AdaptiveDynamicStreamingTemplate> for AdaptiveDynamicStreamingTemplateInfoModel {
    fn from(template: AdaptiveDynamicStreamingTemplate) -> Self {
        Self {
            definition: template.definition,
            r#type: template.r#type,
            name: template.name,
            comment: template.comment,
            format: template.format,
            stream_infos: template
                .stream_infos
                .unwrap_or_default()
                .into_iter()
                .map(Into::into)
                .collect(),
            disable_higher_video_bitrate: template.disable_higher_video_bitrate,
            disable_higher_video_resolution: template.disable_higher_video_resolution,
            create_time: template.create_time,
            update_time: template.update_time,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveDynamicStreamingTemplatesDataSourceModel {
    pub id: Option<String>,
    pub definitions: Option<Vec<i64>>,
    pub r#type: Option<String>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
    pub result_output_file: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub adaptive_dynamic_streaming_template_set: Vec<AdaptiveDynamicStreamingTemplateInfoModel>,
    pub total_count: Option<i64>,
}

impl AdaptiveDynamicStreamingTemplatesDataSourceModel {
    fn filter(&self) -> DescribeTemplatesRequest {
        DescribeTemplatesRequest {
            definitions: self.definitions.clone(),
            r#type: self.r#type.clone(),
            offset: self.offset,
            limit: self.limit,
            ..Default::default()
        }
    }
}

fn template_info_block() -> BlockBuilder {
    BlockBuilder::new("adaptive_dynamic_streaming_template_set")
        .description("The adaptive bitrate streaming templates found.")
        .attribute(number("definition", "Unique ID of the template.").computed().build())
        .attribute(
            string("type", "Template type, `Preset` or `Custom`.")
                .computed()
                .build(),
        )
        .attribute(string("name", "Template name.").computed().build())
        .attribute(string("comment", "Template description.").computed().build())
        .attribute(
            string("format", "Adaptive bitstream format, `HLS` or `MPEG-DASH`.")
                .computed()
                .build(),
        )
        .block(stream_infos_block().build())
        .attribute(
            number(
                "disable_higher_video_bitrate",
                "Whether transcoding from low bitrate to high bitrate is forbidden.",
            )
            .computed()
            .build(),
        )
        .attribute(
            number(
                "disable_higher_video_resolution",
                "Whether transcoding from low resolution to high resolution is forbidden.",
            )
            .computed()
            .build(),
        )
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
}

#[derive(Default)]
pub struct AdaptiveDynamicStreamingTemplatesDataSource {
    provider_data: Option<MpsProviderData>,
}

impl AdaptiveDynamicStreamingTemplatesDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataSource for AdaptiveDynamicStreamingTemplatesDataSource {
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
                "Use this data source to query detailed information of mps adaptive_dynamic_streaming_templates",
            )
            .attribute(id_attribute())
            .attribute(
                number_list("definitions", "Unique IDs of the templates to query, up to 100.")
                    .optional()
                    .build(),
            )
            .attribute(
                string("type", "Template type, `Preset` or `Custom`. All if unset.")
                    .optional()
                    .validator(StringOneOf::new(["Preset", "Custom"]))
                    .build(),
            )
            .attribute(
                number("offset", "Paging offset. Default value: 0.")
                    .optional()
                    .build(),
            )
            .attribute(
                number(
                    "limit",
                    "Number of returned entries, 1 to 100. All matching templates are returned if unset.",
                )
                .optional()
                .validator(NumberRange {
                    min: Some(1.0),
                    max: Some(100.0),
                })
                .build(),
            )
            .attribute(result_output_file_attribute())
            .attribute(result_set_attribute(template_info_block()))
            .attribute(
                number("total_count", "Total number of matching templates.")
                    .computed()
                    .build(),
            )
            .build();

        DataSourceSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn read(&self, ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let _elapsed = log_elapsed(
            &ctx,
            "data_source.tencentcloud_mps_adaptive_dynamic_streaming_templates.read",
        );

        let Some(data) = &self.provider_data else {
            return read_failed(vec![not_configured()]);
        };

        let mut model: AdaptiveDynamicStreamingTemplatesDataSourceModel =
            match decode(&request.config, "configuration") {
                Ok(model) => model,
                Err(diag) => return read_failed(vec![diag]),
            };

        let filter = model.filter();
        let service = data.service();
        let page = match with_retry(&data.read_retry, || {
            service.describe_adaptive_dynamic_streaming_templates_by_filter(&ctx, filter.clone())
        })
        .await
        {
            Ok(page) => page,
            Err(e) => {
                return read_failed(vec![api_error(
                    "Failed to read adaptive dynamic streaming templates",
                    &e,
                )])
            }
        };

        model.total_count = Some(page.total_count);
        model.adaptive_dynamic_streaming_template_set =
            page.items.into_iter().map(Into::into).collect();
        model.id = Some(results_id(
            model
                .adaptive_dynamic_streaming_template_set
                .iter()
                .map(|t| t.definition.unwrap_or_default().to_string()),
        ));

        let mut diagnostics = vec![];
        if let Some(path) = &model.result_output_file {
            if let Err(diag) =
                write_result_output_file(path, &model.adaptive_dynamic_streaming_template_set).await
            {
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
impl DataSourceWithConfigure for AdaptiveDynamicStreamingTemplatesDataSource {
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
    fn unset_filters_stay_off_the_request() {
        let model = AdaptiveDynamicStreamingTemplatesDataSourceModel {
            r#type: Some("Custom".into()),
            ..Default::default()
        };

        assert_eq!(
            serde_json::to_value(model.filter()).unwrap(),
            json!({"Type": "Custom"})
        );
    }

    #[test]
    fn substreams_keep_their_order() {
        let template: AdaptiveDynamicStreamingTemplate = serde_json::from_value(json!({
            "Definition": 10001,
            "Type": "Custom",
            "Format": "HLS",
            "StreamInfos": [
                {"Video": {"Codec": "libx264", "Fps": 30, "Bitrate": 1200}, "RemoveAudio": 0},
                {"Video": {"Codec": "libx265", "Fps": 25, "Bitrate": 800}, "RemoveAudio": 1}
            ]
        }))
        .unwrap();

        let info = AdaptiveDynamicStreamingTemplateInfoModel::from(template);
        assert_eq!(info.definition, Some(10001));
        assert_eq!(info.stream_infos.len(), 2);
        let codecs: Vec<_> = info
            .stream_infos
            .iter()
            .map(|s| s.video.as_ref().and_then(|v| v.codec.clone()))
            .collect();
        assert_eq!(
            codecs,
            vec![Some("libx264".to_string()), Some("libx265".to_string())]
        );
        assert_eq!(info.stream_infos[1].remove_audio, Some(1));
    }
}
