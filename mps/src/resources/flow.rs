//! StreamLink flow resource, plus the input models shared with the input resource

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
    api_error, boolean, decode, encode_state, id_attribute, immutable_argument, not_configured,
    number, require_id, string, string_list, warn_vanished, written_state,
};
use crate::api::stream_link::{
    CreateFlowRequest, FlowInfo, FlowInput, InputRtpSettings, InputSrtSettings, IpAddress,
    ModifyFlowRequest, ResilientStream, RtmpPullSettings, RtmpPullSourceAddress, UrlAddress,
    UrlPullSettings,
};
use crate::api::ApiError;
use crate::log::log_elapsed;
use crate::provider_data::MpsProviderData;
use crate::retry::with_retry;

const TYPE_NAME: &str = "tencentcloud_mps_flow";
const WHAT: &str = "flow";

const INPUT_PROTOCOLS: [&str; 7] = [
    "SRT", "RTP", "RTP_FEC", "RTMP", "RTMP_PULL", "RTSP_PULL", "HLS_PULL",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IpAddressModel {
    pub ip: Option<String>,
    pub port: Option<i64>,
}

impl From<IpAddressModel> for IpAddress {
    fn from(model: IpAddressModel) -> Self {
        Self {
            ip: model.ip,
            port: model.port,
        }
    }
}

impl From<IpAddress> for IpAddressModel {
    fn from(address: IpAddress) -> Self {
        Self {
            ip: address.ip,
            port: address.port,
        }
    }
}

/// `ip` and `port` pairs, used for SRT sources and SRT/RTP destinations
pub(crate) fn ip_address_block(name: &str, description: &str) -> BlockBuilder {
    BlockBuilder::new(name)
        .description(description)
        .attribute(string("ip", "The IP address.").required().build())
        .attribute(number("port", "The port.").required().build())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSrtSettingsModel {
    pub mode: Option<String>,
    pub stream_id: Option<String>,
    pub latency: Option<i64>,
    pub recv_latency: Option<i64>,
    pub peer_latency: Option<i64>,
    pub peer_idle_timeout: Option<i64>,
    pub passphrase: Option<String>,
    pub pb_key_len: Option<i64>,
    #[serde(default, deserialize_with = "null_default")]
    pub source_addresses: Vec<IpAddressModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputRtpSettingsModel {
    pub fec: Option<String>,
    pub idle_timeout: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RtmpPullSourceModel {
    pub tc_url: Option<String>,
    pub stream_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RtmpPullSettingsModel {
    #[serde(default, deserialize_with = "null_default")]
    pub source_addresses: Vec<RtmpPullSourceModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UrlSourceModel {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UrlPullSettingsModel {
    #[serde(default, deserialize_with = "null_default")]
    pub source_addresses: Vec<UrlSourceModel>,
}

impl From<UrlPullSettingsModel> for UrlPullSettings {
    fn from(model: UrlPullSettingsModel) -> Self {
        Self {
            source_addresses: Some(
                model
                    .source_addresses
                    .into_iter()
                    .map(|s| UrlAddress { url: s.url })
                    .collect(),
            ),
        }
    }
}

impl From<UrlPullSettings> for UrlPullSettingsModel {
    fn from(settings: UrlPullSettings) -> Self {
        Self {
            source_addresses: settings
                .source_addresses
                .unwrap_or_default()
                .into_iter()
                .map(|s| UrlSourceModel { url: s.url })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResilientStreamModel {
    pub enable: Option<bool>,
    pub buffer_time: Option<i64>,
}

/// One input of a flow, without the id MPS assigns to it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowInputModel {
    pub input_name: Option<String>,
    pub protocol: Option<String>,
    pub description: Option<String>,
    pub allow_ip_list: Option<Vec<String>>,
    #[serde(default, with = "single_block")]
    pub srt_settings: Option<InputSrtSettingsModel>,
    #[serde(default, with = "single_block")]
    pub rtp_settings: Option<InputRtpSettingsModel>,
    pub fail_over: Option<String>,
    #[serde(default, with = "single_block")]
    pub rtmp_pull_settings: Option<RtmpPullSettingsModel>,
    #[serde(default, with = "single_block")]
    pub rtsp_pull_settings: Option<UrlPullSettingsModel>,
    #[serde(default, with = "single_block")]
    pub hls_pull_settings: Option<UrlPullSettingsModel>,
    #[serde(default, with = "single_block")]
    pub resilient_stream: Option<ResilientStreamModel>,
}

impl FlowInputModel {
    pub fn into_api(self, input_id: Option<String>) -> FlowInput {
        FlowInput {
            input_id,
            input_name: self.input_name,
            protocol: self.protocol,
            description: self.description,
            allow_ip_list: self.allow_ip_list,
            srt_settings: self.srt_settings.map(|srt| InputSrtSettings {
                mode: srt.mode,
                stream_id: srt.stream_id,
                latency: srt.latency,
                recv_latency: srt.recv_latency,
                peer_latency: srt.peer_latency,
                peer_idle_timeout: srt.peer_idle_timeout,
                passphrase: srt.passphrase,
                pb_key_len: srt.pb_key_len,
                source_addresses: Some(srt.source_addresses.into_iter().map(Into::into).collect()),
            }),
            rtp_settings: self.rtp_settings.map(|rtp| InputRtpSettings {
                fec: rtp.fec,
                idle_timeout: rtp.idle_timeout,
            }),
            fail_over: self.fail_over,
            rtmp_pull_settings: self.rtmp_pull_settings.map(|rtmp| RtmpPullSettings {
                source_addresses: Some(
                    rtmp.source_addresses
                        .into_iter()
                        .map(|s| RtmpPullSourceAddress {
                            tc_url: s.tc_url,
                            stream_key: s.stream_key,
                        })
                        .collect(),
                ),
            }),
            rtsp_pull_settings: self.rtsp_pull_settings.map(Into::into),
            hls_pull_settings: self.hls_pull_settings.map(Into::into),
            resilient_stream: self.resilient_stream.map(|r| ResilientStream {
                enable: r.enable,
                buffer_time: r.buffer_time,
            }),
        }
    }
}

impl FlowInputModel {
    /// MPS leaves the SRT passphrase and key length out of its descriptions;
    /// they are carried over from `known`.
    pub(crate) fn keep_secrets_from(&mut self, known: Option<&FlowInputModel>) {
        let Some(known_srt) = known.and_then(|k| k.srt_settings.as_ref()) else {
            return;
        };
        if let Some(srt) = self.srt_settings.as_mut() {
            if srt.passphrase.is_none() {
                srt.passphrase = known_srt.passphrase.clone();
            }
            if srt.pb_key_len.is_none() {
                srt.pb_key_len = known_srt.pb_key_len;
            }
        }
    }
}

impl From<FlowInput> for FlowInputModel {
    fn from(input: FlowInput) -> Self {
        Self {
            input_name: input.input_name,
            protocol: input.protocol,
            description: input.description,
            allow_ip_list: input.allow_ip_list,
            srt_settings: input.srt_settings.map(|srt| InputSrtSettingsModel {
                mode: srt.mode,
                stream_id: srt.stream_id,
                latency: srt.latency,
                recv_latency: srt.recv_latency,
                peer_latency: srt.peer_latency,
                peer_idle_timeout: srt.peer_idle_timeout,
                passphrase: srt.passphrase,
                pb_key_len: srt.pb_key_len,
                source_addresses: srt
                    .source_addresses
                    .unwrap_or_default()
                    .into_iter()
                    .map(Into::into)
                    .collect(),
            }),
            rtp_settings: input.rtp_settings.map(|rtp| InputRtpSettingsModel {
                fec: rtp.fec,
                idle_timeout: rtp.idle_timeout,
            }),
            fail_over: input.fail_over,
            rtmp_pull_settings: input.rtmp_pull_settings.map(|rtmp| RtmpPullSettingsModel {
                source_addresses: rtmp
                    .source_addresses
                    .unwrap_or_default()
                    .into_iter()
                    .map(|s| RtmpPullSourceModel {
                        tc_url: s.tc_url,
                        stream_key: s.stream_key,
                    })
                    .collect(),
            }),
            rtsp_pull_settings: input.rtsp_pull_settings.map(Into::into),
            hls_pull_settings: input.hls_pull_settings.map(Into::into),
            resilient_stream: input.resilient_stream.map(|r| ResilientStreamModel {
                enable: r.enable,
                buffer_time: r.buffer_time,
            }),
        }
    }
}

fn url_pull_block(name: &str, description: &str) -> BlockBuilder {
    BlockBuilder::new(name)
        .description(description)
        .single()
        .block(
            BlockBuilder::new("source_addresses")
                .description("The source addresses, at most two.")
                .required()
                .max_items(2)
                .attribute(string("url", "The pull address.").required().build())
                .build(),
        )
}

/// The input shape shared by flows and the input resource
pub(crate) fn flow_input_block(name: &str) -> BlockBuilder {
    BlockBuilder::new(name)
        .description("The input configuration.")
        .attribute(string("input_name", "The input name, up to 32 characters.").required().build())
        .attribute(
            string("protocol", "The input protocol.")
                .required()
                .validator(StringOneOf::new(INPUT_PROTOCOLS))
                .build(),
        )
        .attribute(string("description", "The input description.").optional().build())
        .attribute(
            string_list("allow_ip_list", "The IP allowlist in CIDR format.")
                .optional()
                .build(),
        )
        .block(
            BlockBuilder::new("srt_settings")
                .description("The SRT configuration.")
                .single()
                .attribute(
                    string("mode", "The SRT mode, `LISTENER` or `CALLER`.")
                        .optional()
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
                    string("passphrase", "The decryption key, 10 to 79 characters.")
                        .optional()
                        .sensitive()
                        .build(),
                )
                .attribute(
                    number("pb_key_len", "The key length: 0, 16, 24 or 32.")
                        .optional()
                        .build(),
                )
                .block(
                    ip_address_block(
                        "source_addresses",
                        "The source addresses when the mode is `CALLER`.",
                    )
                    .build(),
                )
                .build(),
        )
        .block(
            BlockBuilder::new("rtp_settings")
                .description("The RTP configuration.")
                .single()
                .attribute(string("fec", "Either `none` or `ulpfec`.").optional().build())
                .attribute(number("idle_timeout", "The idle timeout in ms.").optional().build())
                .build(),
        )
        .attribute(
            string("fail_over", "Whether input failover is enabled, `OPEN` or `CLOSE`.")
                .optional()
                .build(),
        )
        .block(
            BlockBuilder::new("rtmp_pull_settings")
                .description("The RTMP pull configuration.")
                .single()
                .block(
                    BlockBuilder::new("source_addresses")
                        .description("The source addresses, at most two.")
                        .required()
                        .max_items(2)
                        .attribute(string("tc_url", "The RTMP address.").required().build())
                        .attribute(string("stream_key", "The stream key.").required().build())
                        .build(),
                )
                .build(),
        )
        .block(url_pull_block("rtsp_pull_settings", "The RTSP pull configuration.").build())
        .block(url_pull_block("hls_pull_settings", "The HLS pull configuration.").build())
        .block(
            BlockBuilder::new("resilient_stream")
                .description("Delayed playback configuration.")
                .single()
                .attribute(boolean("enable", "Whether delayed playback is enabled.").optional().build())
                .attribute(
                    number("buffer_time", "The delay in seconds, between 5 and 30.")
                        .optional()
                        .build(),
                )
                .build(),
        )
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowModel {
    pub id: Option<String>,
    pub flow_name: Option<String>,
    pub max_bandwidth: Option<i64>,
    #[serde(default, deserialize_with = "null_default")]
    pub input_group: Vec<FlowInputModel>,
    pub event_id: Option<String>,
}

impl FlowModel {
    fn to_create_request(&self) -> CreateFlowRequest {
        CreateFlowRequest {
            flow_name: self.flow_name.clone(),
            max_bandwidth: self.max_bandwidth,
            input_group: Some(
                self.input_group
                    .iter()
                    .cloned()
                    .map(|input| input.into_api(None))
                    .collect(),
            ),
            event_id: self.event_id.clone(),
        }
    }

    /// Inputs are matched to `known` by name, then by position.
    fn from_api(id: String, info: FlowInfo, known: &FlowModel) -> Self {
        let input_group = info
            .input_group
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(i, input)| {
                let mut input = FlowInputModel::from(input);
                let matched = known
                    .input_group
                    .iter()
                    .find(|k| k.input_name.is_some() && k.input_name == input.input_name)
                    .or_else(|| known.input_group.get(i));
                input.keep_secrets_from(matched);
                input
            })
            .collect();
        Self {
            id: Some(id),
            flow_name: info.flow_name,
            max_bandwidth: info.max_bandwidth,
            input_group,
            event_id: info.event_id,
        }
    }

    /// Diagnostics for every argument that differs from `prior` but cannot be
    /// modified in place.
    fn immutable_changes(&self, prior: &FlowModel) -> Vec<Diagnostic> {
        let mut diagnostics = vec![];
        if self.max_bandwidth != prior.max_bandwidth {
            diagnostics.push(immutable_argument("max_bandwidth"));
        }
        if self.input_group != prior.input_group {
            diagnostics.push(immutable_argument("input_group"));
        }
        if self.event_id != prior.event_id {
            diagnostics.push(immutable_argument("event_id"));
        }
        diagnostics
    }
}

#[derive(Default)]
pub struct FlowResource {
    provider_data: Option<MpsProviderData>,
}

impl FlowResource {
    pub fn new() -> Self {
        Self::default()
    }

    async fn read_flow(
        ctx: &Context,
        data: &MpsProviderData,
        flow_id: &str,
        known: &FlowModel,
    ) -> Result<Option<FlowModel>, ApiError> {
        let service = data.service();
        let info = with_retry(&data.read_retry, || service.describe_flow_by_id(ctx, flow_id)).await?;
        Ok(info.map(|info| FlowModel::from_api(flow_id.to_string(), info, known)))
    }
}

#[async_trait]
impl Resource for FlowResource {
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
            .description("Provides a resource to create a mps flow")
            .attribute(id_attribute("The flow ID."))
            .attribute(string("flow_name", "The flow name.").required().build())
            .attribute(
                number("max_bandwidth", "The maximum bandwidth in bps, e.g. 10000000 for 10 Mbps.")
                    .required()
                    .build(),
            )
            .block(
                flow_input_block("input_group")
                    .description("The flow inputs, at most two.")
                    .max_items(2)
                    .build(),
            )
            .attribute(
                string("event_id", "The ID of the event the flow belongs to.")
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
        let _elapsed = log_elapsed(&ctx, "resource.tencentcloud_mps_flow.create");
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return CreateResourceResponse {
                new_state: DynamicValue::null(),
                private: vec![],
                diagnostics,
            };
        };

        let mut plan: FlowModel = match decode(&request.config, "configuration") {
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

        let create = plan.to_create_request();
        let client = &data.client;
        let flow_id = match with_retry(&data.write_retry, || {
            client.create_stream_link_flow(&ctx, &create)
        })
        .await
        {
            Ok(flow_id) => flow_id,
            Err(e) => {
                diagnostics.push(api_error("Failed to create flow", &e));
                return CreateResourceResponse {
                    new_state: DynamicValue::null(),
                    private: vec![],
                    diagnostics,
                };
            }
        };

        plan.id = Some(flow_id.clone());
        let read_back = Self::read_flow(&ctx, data, &flow_id, &plan).await;
        let new_state = written_state(&plan, read_back, WHAT, &mut diagnostics);

        CreateResourceResponse {
            new_state,
            private: vec![],
            diagnostics,
        }
    }

    async fn read(&self, ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let _elapsed = log_elapsed(&ctx, "resource.tencentcloud_mps_flow.read");
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics,
                private: request.private,
            };
        };

        let (state, flow_id) = match decode::<FlowModel>(&request.current_state, "state")
            .and_then(|state| {
                let flow_id = require_id(state.id.as_deref())?.to_string();
                Ok((state, flow_id))
            }) {
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

        match Self::read_flow(&ctx, data, &flow_id, &state).await {
            Ok(Some(model)) => ReadResourceResponse {
                new_state: Some(encode_state(&model, &mut diagnostics)),
                diagnostics,
                private: request.private,
            },
            Ok(None) => {
                warn_vanished(&ctx, TYPE_NAME, &flow_id);
                ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                    private: request.private,
                }
            }
            Err(e) => {
                diagnostics.push(api_error("Failed to read flow", &e));
                ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                    private: request.private,
                }
            }
        }
    }

    async fn update(&self, ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let _elapsed = log_elapsed(&ctx, "resource.tencentcloud_mps_flow.update");
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return UpdateResourceResponse {
                new_state: DynamicValue::null(),
                private: vec![],
                diagnostics,
            };
        };

        let decoded = decode::<FlowModel>(&request.prior_state, "prior state").and_then(|prior| {
            let plan: FlowModel = decode(&request.config, "configuration")?;
            let flow_id = require_id(prior.id.as_deref())?.to_string();
            Ok((prior, plan, flow_id))
        });
        let (prior, mut plan, flow_id) = match decoded {
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

        let rejected = plan.immutable_changes(&prior);
        if !rejected.is_empty() {
            diagnostics.extend(rejected);
            return UpdateResourceResponse {
                new_state: request.prior_state,
                private: vec![],
                diagnostics,
            };
        }

        if plan.flow_name != prior.flow_name {
            let modify = ModifyFlowRequest {
                flow_id: flow_id.clone(),
                flow_name: plan.flow_name.clone().unwrap_or_default(),
            };
            let client = &data.client;
            if let Err(e) = with_retry(&data.write_retry, || {
                client.modify_stream_link_flow(&ctx, &modify)
            })
            .await
            {
                diagnostics.push(api_error("Failed to update flow", &e));
                return UpdateResourceResponse {
                    new_state: DynamicValue::null(),
                    private: vec![],
                    diagnostics,
                };
            }
        }

        let read_back = Self::read_flow(&ctx, data, &flow_id, &plan).await;
        let new_state = written_state(&plan, read_back, WHAT, &mut diagnostics);

        UpdateResourceResponse {
            new_state,
            private: vec![],
            diagnostics,
        }
    }

    async fn delete(&self, ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let _elapsed = log_elapsed(&ctx, "resource.tencentcloud_mps_flow.delete");
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return DeleteResourceResponse { diagnostics };
        };

        let flow_id = match decode::<FlowModel>(&request.prior_state, "prior state")
            .and_then(|prior| require_id(prior.id.as_deref()).map(str::to_string))
        {
            Ok(flow_id) => flow_id,
            Err(diag) => {
                diagnostics.push(diag);
                return DeleteResourceResponse { diagnostics };
            }
        };

        let service = data.service();
        if let Err(e) =
            with_retry(&data.write_retry, || service.delete_flow_by_id(&ctx, &flow_id)).await
        {
            diagnostics.push(api_error("Failed to delete flow", &e));
        }

        DeleteResourceResponse { diagnostics }
    }
}

#[async_trait]
impl ResourceWithConfigure for FlowResource {
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
impl ResourceWithImportState for FlowResource {
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
