//! StreamLink flows with their inputs and outputs

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use tfplug::context::Context;

use super::client::Client;
use super::common::EmptyResponse;
use super::error::ApiError;

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IpAddress {
    pub ip: Option<String>,
    pub port: Option<i64>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UrlAddress {
    pub url: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RtmpPullSourceAddress {
    pub tc_url: Option<String>,
    pub stream_key: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InputSrtSettings {
    pub mode: Option<String>,
    pub stream_id: Option<String>,
    pub latency: Option<i64>,
    pub recv_latency: Option<i64>,
    pub peer_latency: Option<i64>,
    pub peer_idle_timeout: Option<i64>,
    pub passphrase: Option<String>,
    pub pb_key_len: Option<i64>,
    pub source_addresses: Option<Vec<IpAddress>>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputRtpSettings {
    #[serde(rename = "FEC")]
    pub fec: Option<String>,
    #[serde(rename = "IdleTimeout")]
    pub idle_timeout: Option<i64>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RtmpPullSettings {
    pub source_addresses: Option<Vec<RtmpPullSourceAddress>>,
}

/// Pull settings for protocols addressed by a plain URL (RTSP, HLS)
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UrlPullSettings {
    pub source_addresses: Option<Vec<UrlAddress>>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResilientStream {
    pub enable: Option<bool>,
    pub buffer_time: Option<i64>,
}

/// A flow input as created, modified and described. `input_id` is assigned
/// by MPS and only sent when modifying.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowInput {
    #[serde(rename = "InputId")]
    pub input_id: Option<String>,
    #[serde(rename = "InputName")]
    pub input_name: Option<String>,
    #[serde(rename = "Protocol")]
    pub protocol: Option<String>,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "AllowIpList")]
    pub allow_ip_list: Option<Vec<String>>,
    #[serde(rename = "SRTSettings")]
    pub srt_settings: Option<InputSrtSettings>,
    #[serde(rename = "RTPSettings")]
    pub rtp_settings: Option<InputRtpSettings>,
    #[serde(rename = "FailOver")]
    pub fail_over: Option<String>,
    #[serde(rename = "RTMPPullSettings")]
    pub rtmp_pull_settings: Option<RtmpPullSettings>,
    #[serde(rename = "RTSPPullSettings")]
    pub rtsp_pull_settings: Option<UrlPullSettings>,
    #[serde(rename = "HLSPullSettings")]
    pub hls_pull_settings: Option<UrlPullSettings>,
    #[serde(rename = "ResilientStream")]
    pub resilient_stream: Option<ResilientStream>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutputSrtSettings {
    pub destinations: Option<Vec<IpAddress>>,
    pub stream_id: Option<String>,
    pub latency: Option<i64>,
    pub recv_latency: Option<i64>,
    pub peer_latency: Option<i64>,
    pub peer_idle_timeout: Option<i64>,
    pub passphrase: Option<String>,
    pub pb_key_len: Option<i64>,
    pub mode: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RtmpDestination {
    pub url: Option<String>,
    pub stream_key: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutputRtmpSettings {
    pub destinations: Option<Vec<RtmpDestination>>,
    pub chunk_size: Option<i64>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputRtpSettings {
    #[serde(rename = "Destinations")]
    pub destinations: Option<Vec<IpAddress>>,
    #[serde(rename = "FEC")]
    pub fec: Option<String>,
    #[serde(rename = "IdleTimeout")]
    pub idle_timeout: Option<i64>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowOutput {
    #[serde(rename = "OutputId")]
    pub output_id: Option<String>,
    #[serde(rename = "OutputName")]
    pub output_name: Option<String>,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "Protocol")]
    pub protocol: Option<String>,
    #[serde(rename = "OutputRegion")]
    pub output_region: Option<String>,
    #[serde(rename = "SRTSettings")]
    pub srt_settings: Option<OutputSrtSettings>,
    #[serde(rename = "RTMPSettings")]
    pub rtmp_settings: Option<OutputRtmpSettings>,
    #[serde(rename = "RTPSettings")]
    pub rtp_settings: Option<OutputRtpSettings>,
    #[serde(rename = "AllowIpList")]
    pub allow_ip_list: Option<Vec<String>>,
    #[serde(rename = "MaxConcurrent")]
    pub max_concurrent: Option<i64>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateFlowRequest {
    pub flow_name: Option<String>,
    pub max_bandwidth: Option<i64>,
    pub input_group: Option<Vec<FlowInput>>,
    pub event_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FlowInfo {
    pub flow_id: Option<String>,
    pub flow_name: Option<String>,
    pub state: Option<String>,
    pub max_bandwidth: Option<i64>,
    pub input_group: Option<Vec<FlowInput>>,
    pub output_group: Option<Vec<FlowOutput>>,
    pub event_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FlowInfoResponse {
    info: Option<FlowInfo>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FlowIdRequest {
    pub flow_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModifyFlowRequest {
    pub flow_id: String,
    pub flow_name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModifyInputRequest {
    pub flow_id: String,
    pub input: FlowInput,
}

/// Body of CreateStreamLinkOutputInfo and ModifyStreamLinkOutputInfo
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutputRequest {
    pub flow_id: String,
    pub output: FlowOutput,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OutputInfoResponse {
    info: Option<FlowOutput>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteOutputRequest {
    pub flow_id: String,
    pub output_id: String,
}

impl Client {
    /// Returns the id of the new flow
    pub async fn create_stream_link_flow(
        &self,
        ctx: &Context,
        request: &CreateFlowRequest,
    ) -> Result<String, ApiError> {
        let response: FlowInfoResponse = self.call(ctx, "CreateStreamLinkFlow", request).await?;
        response
            .info
            .and_then(|info| info.flow_id)
            .ok_or_else(|| ApiError::ParseError("CreateStreamLinkFlow returned no FlowId".into()))
    }

    pub async fn describe_stream_link_flow(
        &self,
        ctx: &Context,
        flow_id: &str,
    ) -> Result<Option<FlowInfo>, ApiError> {
        let response: FlowInfoResponse = self
            .call(
                ctx,
                "DescribeStreamLinkFlow",
                &FlowIdRequest {
                    flow_id: flow_id.to_string(),
                },
            )
            .await?;
        Ok(response.info)
    }

    pub async fn modify_stream_link_flow(
        &self,
        ctx: &Context,
        request: &ModifyFlowRequest,
    ) -> Result<(), ApiError> {
        self.call::<_, EmptyResponse>(ctx, "ModifyStreamLinkFlow", request)
            .await
            .map(|_| ())
    }

    pub async fn delete_stream_link_flow(&self, ctx: &Context, flow_id: &str) -> Result<(), ApiError> {
        self.flow_action(ctx, "DeleteStreamLinkFlow", flow_id).await
    }

    pub async fn start_stream_link_flow(&self, ctx: &Context, flow_id: &str) -> Result<(), ApiError> {
        self.flow_action(ctx, "StartStreamLinkFlow", flow_id).await
    }

    pub async fn stop_stream_link_flow(&self, ctx: &Context, flow_id: &str) -> Result<(), ApiError> {
        self.flow_action(ctx, "StopStreamLinkFlow", flow_id).await
    }

    async fn flow_action(&self, ctx: &Context, action: &str, flow_id: &str) -> Result<(), ApiError> {
        self.call::<_, EmptyResponse>(
            ctx,
            action,
            &FlowIdRequest {
                flow_id: flow_id.to_string(),
            },
        )
        .await
        .map(|_| ())
    }

    pub async fn modify_stream_link_input(
        &self,
        ctx: &Context,
        request: &ModifyInputRequest,
    ) -> Result<(), ApiError> {
        self.call::<_, EmptyResponse>(ctx, "ModifyStreamLinkInput", request)
            .await
            .map(|_| ())
    }

    /// Returns the id of the new output
    pub async fn create_stream_link_output(
        &self,
        ctx: &Context,
        request: &OutputRequest,
    ) -> Result<String, ApiError> {
        let response: OutputInfoResponse = self
            .call(ctx, "CreateStreamLinkOutputInfo", request)
            .await?;
        response
            .info
            .and_then(|info| info.output_id)
            .ok_or_else(|| {
                ApiError::ParseError("CreateStreamLinkOutputInfo returned no OutputId".into())
            })
    }

    pub async fn modify_stream_link_output(
        &self,
        ctx: &Context,
        request: &OutputRequest,
    ) -> Result<(), ApiError> {
        self.call::<_, EmptyResponse>(ctx, "ModifyStreamLinkOutputInfo", request)
            .await
            .map(|_| ())
    }

    pub async fn delete_stream_link_output(
        &self,
        ctx: &Context,
        request: &DeleteOutputRequest,
    ) -> Result<(), ApiError> {
        self.call::<_, EmptyResponse>(ctx, "DeleteStreamLinkOutput", request)
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn input_uses_protocol_acronyms() {
        let input = FlowInput {
            input_name: Some("in".to_string()),
            protocol: Some("SRT".to_string()),
            srt_settings: Some(InputSrtSettings {
                mode: Some("LISTENER".to_string()),
                latency: Some(1000),
                ..Default::default()
            }),
            rtp_settings: Some(InputRtpSettings {
                fec: Some("none".to_string()),
                idle_timeout: Some(1000),
            }),
            ..Default::default()
        };

        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            json!({
                "InputName": "in",
                "Protocol": "SRT",
                "SRTSettings": {"Mode": "LISTENER", "Latency": 1000},
                "RTPSettings": {"FEC": "none", "IdleTimeout": 1000}
            })
        );
    }

    #[test]
    fn flow_info_lists_inputs_and_outputs() {
        let response: FlowInfoResponse = serde_json::from_value(json!({
            "Info": {
                "FlowId": "flow-1",
                "FlowName": "terraform-test",
                "State": "Idle",
                "MaxBandwidth": 10000000,
                "InputGroup": [{"InputId": "in-1", "InputName": "in", "Protocol": "RTMP_PULL",
                    "RTMPPullSettings": {"SourceAddresses": [{"TcUrl": "rtmp://a/live", "StreamKey": "k"}]}}],
                "OutputGroup": [{"OutputId": "out-1", "OutputName": "out", "Protocol": "RTMP",
                    "RTMPSettings": {"Destinations": [{"Url": "rtmp://b/live", "StreamKey": "s"}], "ChunkSize": 4096}}]
            },
            "RequestId": "r"
        }))
        .unwrap();

        let info = response.info.unwrap();
        let input = &info.input_group.unwrap()[0];
        assert_eq!(input.input_id.as_deref(), Some("in-1"));
        let pull = input.rtmp_pull_settings.as_ref().unwrap();
        assert_eq!(
            pull.source_addresses.as_ref().unwrap()[0].tc_url.as_deref(),
            Some("rtmp://a/live")
        );
        let output = &info.output_group.unwrap()[0];
        assert_eq!(
            output.rtmp_settings.as_ref().unwrap().chunk_size,
            Some(4096)
        );
    }
}
