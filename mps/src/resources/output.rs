//! StreamLink flow output resource

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
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};
use tfplug::validator::StringOneOf;
use tfplug::value::{null_default, single_block};

use super::common::{
    api_error, decode, encode_state, id_attribute, not_configured, number, require_id, split_id,
    string, string_list, warn_vanished, written_state, ID_SEPARATOR,
};
use super::flow::{ip_address_block, IpAddressModel};
use crate::api::stream_link::{
    FlowOutput, OutputRequest, OutputRtmpSettings, OutputRtpSettings, OutputSrtSettings,
    RtmpDestination,
};
use crate::api::ApiError;
use crate::log::log_elapsed;
use crate::provider_data::MpsProviderData;
use crate::retry::with_retry;

const TYPE_NAME: &str = "tencentcloud_mps_output";
const WHAT: &str = "output";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputSrtSettingsModel {
    #[serde(default, deserialize_with = "null_default")]
    pub destinations: Vec<IpAddressModel>,
    pub stream_id: Option<String>,
    pub latency: Option<i64>,
    pub recv_latency: Option<i64>,
    pub peer_latency: Option<i64>,
    pub peer_idle_timeout: Option<i64>,
    pub passphrase: Option<String>,
    pub pb_key_len: Option<i64>,
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RtmpDestinationModel {
    pub url: Option<String>,
    pub stream_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputRtmpSettingsModel {
    #[serde(default, deserialize_with = "null_default")]
    pub destinations: Vec<RtmpDestinationModel>,
    pub chunk_size: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputRtpSettingsModel {
    #[serde(default, deserialize_with = "null_default")]
    pub destinations: Vec<IpAddressModel>,
    pub fec: Option<String>,
    pub idle_timeout: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowOutputModel {
    pub output_name: Option<String>,
    pub description: Option<String>,
    pub protocol: Option<String>,
    pub output_region: Option<String>,
    #[serde(default, with = "single_block")]
    pub srt_settings: Option<OutputSrtSettingsModel>,
    #[serde(default, with = "single_block")]
    pub rtmp_settings: Option<OutputRtmpSettingsModel>,
    #[serde(default, with = "single_block")]
    pub rtp_settings: Option<OutputRtpSettingsModel>,
    pub allow_ip_list: Option<Vec<String>>,
    pub max_concurrent: Option<i64>,
}

impl FlowOutputModel {
    fn into_api(self, output_id: Option<String>) -> FlowOutput {
        FlowOutput {
            output_id,
            output_name: self.output_name,
            description: self.description,
            protocol: self.protocol,
            output_region: self.output_region,
            srt_settings: self.srt_settings.map(|srt| OutputSrtSettings {
                destinations: Some(srt.destinations.into_iter().map(Into::into).collect()),
                stream_id: srt.stream_id,
                latency: srt.latency,
                recv_latency: srt.recv_latency,
                peer_latency: srt.peer_latency,
                peer_idle_timeout: srt.peer_idle_timeout,
                passphrase: srt.passphrase,
                pb_key_len: srt.pb_key_len,
                mode: srt.mode,
            }),
            rtmp_settings: self.rtmp_settings.map(|rtmp| OutputRtmpSettings {
                destinations: Some(
                    rtmp.destinations
                        .into_iter()
                        .map(|d| RtmpDestination {
                            url: d.url,
                            stream_key: d.stream_key,
                        })
                        .collect(),
                ),
                chunk_size: rtmp.chunk_size,
            }),
            rtp_settings: self.rtp_settings.map(|rtp| OutputRtpSettings {
                destinations: Some(rtp.destinations.into_iter().map(Into::into).collect()),
                fec: rtp.fec,
                idle_timeout: rtp.idle_timeout,
            }),
            allow_ip_list: self.allow_ip_list,
            max_concurrent: self.max_concurrent,
        }
    }
}

impl From<FlowOutput> for FlowOutputModel {
    fn from(output: FlowOutput) -> Self {
        Self {
            output_name: output.output_name,
            description: output.description,
            protocol: output.protocol,
            output_region: output.output_region,
            srt_settings: output.srt_settings.map(|srt| OutputSrtSettingsModel {
                destinations: srt
                    .destinations
                    .unwrap_or_default()
                    .into_iter()
                    .map(Into::into)
                    .collect(),
                stream_id: srt.stream_id,
                latency: srt.latency,
                recv_latency: srt.recv_latency,
                peer_latency: srt.peer_latency,
                peer_idle_timeout: srt.peer_idle_timeout,
                passphrase: srt.passphrase,
                pb_key_len: srt.pb_key_len,
                mode: srt.mode,
            }),
            rtmp_settings: output.rtmp_settings.map(|rtmp| OutputRtmpSettingsModel {
                destinations: rtmp
                    .destinations
                    .unwrap_or_default()
                    .into_iter()
                    .map(|d| RtmpDestinationModel {
                        url: d.url,
                        stream_key: d.stream_key,
                    })
                    .collect(),
                chunk_size: rtmp.chunk_size,
            }),
            rtp_settings: output.rtp_settings.map(|rtp| OutputRtpSettingsModel {
                destinations: rtp
                    .destinations
                    .unwrap_or_default()
                    .into_iter()
                    .map(Into::into)
                    .collect(),
                fec: rtp.fec,
                idle_timeout: rtp.idle_timeout,
            }),
            allow_ip_list: output.allow_ip_list,
            max_concurrent: output.max_concurrent,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputModel {
    pub id: Option<String>,
    pub flow_id: Option<String>,
    #[serde(default, with = "single_block")]
    pub output: Option<FlowOutputModel>,
}

impl OutputModel {
    fn ids(&self) -> Result<(String, String), Diagnostic> {
        let [flow_id, output_id] = split_id::<2>(require_id(self.id.as_deref())?)?;
        Ok((flow_id.to_string(), output_id.to_string()))
    }

    /// The SRT passphrase is kept from `known` when MPS does not return it.
    fn described(flow_id: &str, output_id: &str, output: FlowOutput, known: &OutputModel) -> Self {
        let mut output = FlowOutputModel::from(output);
        let known_passphrase = known
            .output
            .as_ref()
            .and_then(|o| o.srt_settings.as_ref())
            .and_then(|srt| srt.passphrase.clone());
        if let Some(srt) = output.srt_settings.as_mut() {
            if srt.passphrase.is_none() {
                srt.passphrase = known_passphrase;
            }
        }
        Self {
            id: Some(format!("{}{}{}", flow_id, ID_SEPARATOR, output_id)),
            flow_id: Some(flow_id.to_string()),
            output: Some(output),
        }
    }
}

fn output_block() -> BlockBuilder {
    BlockBuilder::new("output")
        .description("The output configuration.")
        .single()
        .required()
        .attribute(string("output_name", "The output name.").required().build())
        .attribute(string("description", "The output description.").required().build())
        .attribute(
            string("protocol", "The output protocol.")
                .required()
                .validator(StringOneOf::new(["SRT", "RTMP", "RTP"]))
                .build(),
        )
        .attribute(string("output_region", "The output region.").required().build())
        .block(
            BlockBuilder::new("srt_settings")
                .description("The SRT configuration.")
                .single()
                .block(
                    ip_address_block("destinations", "The push destinations.")
                        .required()
                        .build(),
                )
                .attribute(string("stream_id", "The stream ID.").optional().build())
                .attribute(number("latency", "The latency in ms.").optional().build())
                .attribute(number("recv_latency", "The receive latency in ms.").optional().build())
                .attribute(number("peer_latency", "The peer latency in ms.").optional().build())
                .attribute(
                    number("peer_idle_timeout", "The peer idle timeout in ms.")
                        .optional()
                        .build(),
                )
                .attribute(
                    string("passphrase", "The encryption key, 10 to 79 characters.")
                        .optional()
                        .sensitive()
                        .build(),
                )
                .attribute(
                    number("pb_key_len", "The key length: 0, 16, 24 or 32.")
                        .optional()
                        .build(),
                )
                .attribute(
                    string("mode", "The SRT mode, `LISTENER` or `CALLER`.")
                        .optional()
                        .build(),
                )
                .build(),
        )
        .block(
            BlockBuilder::new("rtmp_settings")
                .description("The RTMP configuration.")
                .single()
                .block(
                    BlockBuilder::new("destinations")
                        .description("The push destinations, at most two.")
                        .required()
                        .max_items(2)
                        .attribute(string("url", "The push URL, `rtmp://domain/live`.").required().build())
                        .attribute(string("stream_key", "The stream key.").required().build())
                        .build(),
                )
                .attribute(
                    number("chunk_size", "The RTMP chunk size, between 4096 and 40960.")
                        .optional()
                        .build(),
                )
                .build(),
        )
        .block(
            BlockBuilder::new("rtp_settings")
                .description("The RTP configuration.")
                .single()
                .block(
                    ip_address_block("destinations", "The push destinations.")
                        .required()
                        .build(),
                )
                .attribute(string("fec", "Either `none` or `ulpfec`.").required().build())
                .attribute(number("idle_timeout", "The idle timeout in ms.").required().build())
                .build(),
        )
        .attribute(
            string_list("allow_ip_list", "The IP allowlist in CIDR format, for SRT listeners.")
                .optional()
                .build(),
        )
        .attribute(
            number("max_concurrent", "The maximum number of concurrent pulls, 1 to 4.")
                .optional()
                .build(),
        )
}

#[derive(Default)]
pub struct OutputResource {
    provider_data: Option<MpsProviderData>,
}

impl OutputResource {
    pub fn new() -> Self {
        Self::default()
    }

    async fn read_output(
        ctx: &Context,
        data: &MpsProviderData,
        flow_id: &str,
        output_id: &str,
        known: &OutputModel,
    ) -> Result<Option<OutputModel>, ApiError> {
        let service = data.service();
        let output = with_retry(&data.read_retry, || {
            service.describe_output_by_id(ctx, flow_id, output_id)
        })
        .await?;
        Ok(output.map(|output| OutputModel::described(flow_id, output_id, output, known)))
    }
}

#[async_trait]
impl Resource for OutputResource {
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
            .description("Provides a resource to create a mps output")
            .attribute(id_attribute("The flow ID and output ID joined by `#`."))
            .attribute(
                string("flow_id", "The ID of the flow the output belongs to.")
                    .required()
                    .force_new()
                    .build(),
            )
            .block(output_block().build())
            .build();

        ResourceSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let _elapsed = log_elapsed(&ctx, "resource.tencentcloud_mps_output.create");
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return CreateResourceResponse {
                new_state: DynamicValue::null(),
                private: vec![],
                diagnostics,
            };
        };

        let mut plan: OutputModel = match decode(&request.config, "configuration") {
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

        let flow_id = plan.flow_id.clone().unwrap_or_default();
        let create = OutputRequest {
            flow_id: flow_id.clone(),
            output: plan.output.clone().unwrap_or_default().into_api(None),
        };
        let client = &data.client;
        let output_id = match with_retry(&data.write_retry, || {
            client.create_stream_link_output(&ctx, &create)
        })
        .await
        {
            Ok(output_id) => output_id,
            Err(e) => {
                diagnostics.push(api_error("Failed to create output", &e));
                return CreateResourceResponse {
                    new_state: DynamicValue::null(),
                    private: vec![],
                    diagnostics,
                };
            }
        };

        plan.id = Some(format!("{}{}{}", flow_id, ID_SEPARATOR, output_id));
        let read_back = Self::read_output(&ctx, data, &flow_id, &output_id, &plan).await;
        let new_state = written_state(&plan, read_back, WHAT, &mut diagnostics);

        CreateResourceResponse {
            new_state,
            private: vec![],
            diagnostics,
        }
    }

    async fn read(&self, ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let _elapsed = log_elapsed(&ctx, "resource.tencentcloud_mps_output.read");
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics,
                private: request.private,
            };
        };

        let decoded = decode::<OutputModel>(&request.current_state, "state").and_then(|state| {
            let ids = state.ids()?;
            Ok((state, ids))
        });
        let (state, (flow_id, output_id)) = match decoded {
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

        match Self::read_output(&ctx, data, &flow_id, &output_id, &state).await {
            Ok(Some(model)) => ReadResourceResponse {
                new_state: Some(encode_state(&model, &mut diagnostics)),
                diagnostics,
                private: request.private,
            },
            Ok(None) => {
                warn_vanished(&ctx, TYPE_NAME, state.id.as_deref().unwrap_or_default());
                ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                    private: request.private,
                }
            }
            Err(e) => {
                diagnostics.push(api_error("Failed to read output", &e));
                ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                    private: request.private,
                }
            }
        }
    }

    async fn update(&self, ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let _elapsed = log_elapsed(&ctx, "resource.tencentcloud_mps_output.update");
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return UpdateResourceResponse {
                new_state: DynamicValue::null(),
                private: vec![],
                diagnostics,
            };
        };

        let decoded = decode::<OutputModel>(&request.prior_state, "prior state").and_then(|prior| {
            let plan: OutputModel = decode(&request.config, "configuration")?;
            let ids = prior.ids()?;
            Ok((prior, plan, ids))
        });
        let (prior, mut plan, (flow_id, output_id)) = match decoded {
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

        if plan.output != prior.output {
            let modify = OutputRequest {
                flow_id: flow_id.clone(),
                output: plan
                    .output
                    .clone()
                    .unwrap_or_default()
                    .into_api(Some(output_id.clone())),
            };
            let client = &data.client;
            if let Err(e) = with_retry(&data.write_retry, || {
                client.modify_stream_link_output(&ctx, &modify)
            })
            .await
            {
                diagnostics.push(api_error("Failed to update output", &e));
                return UpdateResourceResponse {
                    new_state: DynamicValue::null(),
                    private: vec![],
                    diagnostics,
                };
            }
        }

        let read_back = Self::read_output(&ctx, data, &flow_id, &output_id, &plan).await;
        let new_state = written_state(&plan, read_back, WHAT, &mut diagnostics);

        UpdateResourceResponse {
            new_state,
            private: vec![],
            diagnostics,
        }
    }

    async fn delete(&self, ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let _elapsed = log_elapsed(&ctx, "resource.tencentcloud_mps_output.delete");
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return DeleteResourceResponse { diagnostics };
        };

        let (flow_id, output_id) = match decode::<OutputModel>(&request.prior_state, "prior state")
            .and_then(|prior| prior.ids())
        {
            Ok(ids) => ids,
            Err(diag) => {
                diagnostics.push(diag);
                return DeleteResourceResponse { diagnostics };
            }
        };

        let service = data.service();
        if let Err(e) = with_retry(&data.write_retry, || {
            service.delete_output_by_id(&ctx, &flow_id, &output_id)
        })
        .await
        {
            diagnostics.push(api_error("Failed to delete output", &e));
        }

        DeleteResourceResponse { diagnostics }
    }
}

#[async_trait]
impl ResourceWithConfigure for OutputResource {
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
impl ResourceWithImportState for OutputResource {
    async fn import_state(
        &self,
        ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let mut response = ImportResourceStateResponse {
            imported_resources: vec![],
            diagnostics: vec![],
        };
        if let Err(diag) = split_id::<2>(&request.id) {
            response.diagnostics.push(diag);
            return response;
        }
        import_state_passthrough_id(&ctx, AttributePath::new("id"), &request, &mut response);
        response
    }
}
