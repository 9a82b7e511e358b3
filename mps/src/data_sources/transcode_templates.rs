//! Lists transcoding templates

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
use tfplug::value::{null_default, single_block};

use super::common::{
    configure, id_attribute, read_failed, result_output_file_attribute, result_set_attribute,
    results_id, write_result_output_file,
};
use crate::api::templates::{DescribeTemplatesRequest, TranscodeTemplate};
use crate::log::log_elapsed;
use crate::provider_data::MpsProviderData;
use crate::resources::common::{
    api_error, audio_template_block, decode, encode_state, not_configured, number, number_list,
    string, video_template_block, AudioTemplateModel, VideoTemplateModel,
};
use crate::resources::transcode_template::{
    enhance_config_block, tehd_config_block, EnhanceConfigModel, TehdConfigModel,
    TranscodeTemplateModel,
};
use crate::retry::with_retry;

const TYPE_NAME: &str = "tencentcloud_mps_transcode_templates";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscodeTemplateInfoModel {
    pub definition: Option<String>,
    pub container: Option<String>,
    pub name: Option<String>,
    pub comment: Option<String>,
    pub r#type: Option<String>,
    pub remove_video: Option<i64>,
    pub remove_audio: Option<i64>,
    #[serde(default, with = "single_block")]
    pub video_template: Option<VideoTemplateModel>,
    #[serde(default, with = "single_block")]
    pub audio_template: Option<AudioTemplateModel>,
    #[serde(default, with = "single_block")]
    pub tehd_config: Option<TehdConfigModel>,
    pub container_type: Option<String>,
    pub create_time: Option<String>,
    pub update_time: Option<String>,
    #[serde(default, with = "single_block")]
    pub enhance_config: Option<EnhanceConfigModel>,
}

impl From<TranscodeTemplate> for TranscodeTemplateInfoModel {
    fn from(template: TranscodeTemplate) -> Self {
        let definition = template.definition.clone();
        let r#type = template.r#type.clone();
        let container_type = template.container_type.clone();
        let create_time = template.create_time.clone();
        let update_time = template.update_time.clone();
        let model =
            TranscodeTemplateModel::from_api(definition.clone().unwrap_or_default(), template);

        Self {
            definition,
            container: model.container,
            name: model.name,
            comment: model.comment,
            r#type,
            remove_video: model.remove_video,
            remove_audio: model.remove_audio,
            video_template: model.video_template,
            audio_template: model.audio_template,
            tehd_config: model.tehd_config,
            container_type,
            create_time,
            update_time,
            enhance_config: model.enhance_config,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscodeTemplatesDataSourceModel {
    pub id: Option<String>,
    pub definitions: Option<Vec<i64>>,
    pub r#type: Option<String>,
    pub container_type: Option<String>,
    pub tehd_type: Option<String>,
    pub transcode_type: Option<String>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
    pub result_output_file: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub transcode_template_set: Vec<TranscodeTemplateInfoModel>,
    pub total_count: Option<i64>,
}

impl TranscodeTemplatesDataSourceModel {
    fn filter(&self) -> DescribeTemplatesRequest {
        DescribeTemplatesRequest {
            definitions: self.definitions.clone(),
            r#type: self.r#type.clone(),
            container_type: self.container_type.clone(),
            tehd_type: self.tehd_type.clone(),
            transcode_type: self.transcode_type.clone(),
            offset: self.offset,
            limit: self.limit,
        }
    }
}

fn template_info_block() -> BlockBuilder {
    BlockBuilder::new("transcode_template_set")
        .description("The transcoding templates found.")
        .attribute(
            string("definition", "Unique ID of the template.")
                .computed()
                .build(),
        )
        .attribute(string("container", "Container format.").computed().build())
        .attribute(string("name", "Template name.").computed().build())
        .attribute(string("comment", "Template description.").computed().build())
        .attribute(
            string("type", "Template type, `Preset` or `Custom`.")
                .computed()
                .build(),
        )
        .attribute(
            number("remove_video", "Whether video data is removed. 0: retain, 1: remove.")
                .computed()
                .build(),
        )
        .attribute(
            number("remove_audio", "Whether audio data is removed. 0: retain, 1: remove.")
                .computed()
                .build(),
        )
        .block(video_template_block("video_template").build())
        .block(audio_template_block("audio_template").build())
        .block(tehd_config_block().build())
        .attribute(
            string(
                "container_type",
                "Container filter: `Video`, `PureAudio` or `Video,PureAudio`.",
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
        .block(enhance_config_block().build())
}

#[derive(Default)]
pub struct TranscodeTemplatesDataSource {
    provider_data: Option<MpsProviderData>,
}

impl TranscodeTemplatesDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataSource for TranscodeTemplatesDataSource {
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
            .description("Use this data source to query detailed information of mps transcode_templates")
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
                string(
                    "container_type",
                    "Container filter: `Video`, `PureAudio` or `Video,PureAudio`.",
                )
                .optional()
                .build(),
            )
            .attribute(
                string(
                    "tehd_type",
                    "TESHD filter: `Common` for ordinary transcoding, `TEHD` for top speed codec.",
                )
                .optional()
                .validator(StringOneOf::new(["Common", "TEHD"]))
                .build(),
            )
            .attribute(
                string(
                    "transcode_type",
                    "Template type filter: `Common`, `Enhance` or `*` for all.",
                )
                .optional()
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
        let _elapsed = log_elapsed(&ctx, "data_source.tencentcloud_mps_transcode_templates.read");

        let Some(data) = &self.provider_data else {
            return read_failed(vec![not_configured()]);
        };

        let mut model: TranscodeTemplatesDataSourceModel =
            match decode(&request.config, "configuration") {
                Ok(model) => model,
                Err(diag) => return read_failed(vec![diag]),
            };

        let filter = model.filter();
        let service = data.service();
        let page = match with_retry(&data.read_retry, || {
            service.describe_transcode_templates_by_filter(&ctx, filter.clone())
        })
        .await
        {
            Ok(page) => page,
            Err(e) => return read_failed(vec![api_error("Failed to read transcode templates", &e)]),
        };

        model.total_count = Some(page.total_count);
        model.transcode_template_set = page.items.into_iter().map(Into::into).collect();
        model.id = Some(results_id(
            model
                .transcode_template_set
                .iter()
                .map(|t| t.definition.clone().unwrap_or_default()),
        ));

        let mut diagnostics = vec![];
        if let Some(path) = &model.result_output_file {
            if let Err(diag) = write_result_output_file(path, &model.transcode_template_set).await {
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
impl DataSourceWithConfigure for TranscodeTemplatesDataSource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        configure(request.provider_data, &mut self.provider_data)
    }
}
