//! StreamLink flow lifecycle against a mock endpoint

use mockito::Server;
use serde_json::json;
use tfplug::context::Context;
use tfplug::resource::{
    CreateResourceRequest, DeleteResourceRequest, Resource, UpdateResourceRequest,
};

use crate::common::{mock_action, mock_request, resource, to_json, value};

const TYPE_NAME: &str = "tencentcloud_mps_flow";

fn flow_config(name: &str, max_bandwidth: i64) -> serde_json::Value {
    json!({
        "id": null,
        "flow_name": name,
        "max_bandwidth": max_bandwidth,
        "event_id": null,
        "input_group": [{
            "input_name": "srt-in",
            "protocol": "SRT",
            "description": null,
            "allow_ip_list": ["0.0.0.0/0"],
            "srt_settings": [{
                "mode": "LISTENER",
                "stream_id": null,
                "latency": 1000,
                "recv_latency": 1000,
                "peer_latency": 1000,
                "peer_idle_timeout": 1000,
                "passphrase": null,
                "pb_key_len": null,
                "source_addresses": []
            }],
            "rtp_settings": [],
            "fail_over": null,
            "rtmp_pull_settings": [],
            "rtsp_pull_settings": [],
            "hls_pull_settings": [],
            "resilient_stream": []
        }]
    })
}

fn described(name: &str) -> serde_json::Value {
    json!({
        "Info": {
            "FlowId": "flow-01",
            "FlowName": name,
            "State": "Idle",
            "MaxBandwidth": 10000000,
            "InputGroup": [{
                "InputId": "input-01",
                "InputName": "srt-in",
                "Protocol": "SRT",
                "AllowIpList": ["0.0.0.0/0"],
                "SRTSettings": {
                    "Mode": "LISTENER",
                    "Latency": 1000,
                    "RecvLatency": 1000,
                    "PeerLatency": 1000,
                    "PeerIdleTimeout": 1000
                }
            }],
            "OutputGroup": []
        }
    })
}

#[tokio::test(flavor = "multi_thread")]
async fn flow_is_created_renamed_and_deleted() {
    let mut server = Server::new_async().await;

    let create_mock = mock_request(
        &mut server,
        "CreateStreamLinkFlow",
        json!({
            "FlowName": "terraform-flow",
            "MaxBandwidth": 10000000,
            "InputGroup": [{"InputName": "srt-in", "Protocol": "SRT", "SRTSettings": {"Mode": "LISTENER"}}]
        }),
        json!({"Info": {"FlowId": "flow-01"}}),
    )
    .await;
    let describe_mock = mock_action(&mut server, "DescribeStreamLinkFlow", described("terraform-flow")).await;

    let resource = resource(&server, TYPE_NAME).await;
    let config = value(flow_config("terraform-flow", 10000000));
    let created = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: TYPE_NAME.to_string(),
                planned_state: config.clone(),
                config,
                planned_private: vec![],
                provider_meta: None,
            },
        )
        .await;

    assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);
    create_mock.assert_async().await;
    let state = to_json(&created.new_state);
    assert_eq!(state["id"], "flow-01");
    assert_eq!(state["input_group"][0]["srt_settings"][0]["mode"], "LISTENER");
    assert!(state["input_group"][0].get("input_id").is_none());

    describe_mock.remove_async().await;
    let modify_mock = mock_request(
        &mut server,
        "ModifyStreamLinkFlow",
        json!({"FlowId": "flow-01", "FlowName": "terraform-flow-renamed"}),
        json!({}),
    )
    .await;
    let _describe_renamed = mock_action(
        &mut server,
        "DescribeStreamLinkFlow",
        described("terraform-flow-renamed"),
    )
    .await;

    let config = value(flow_config("terraform-flow-renamed", 10000000));
    let updated = resource
        .update(
            Context::new(),
            UpdateResourceRequest {
                type_name: TYPE_NAME.to_string(),
                prior_state: created.new_state.clone(),
                planned_state: config.clone(),
                config,
                planned_private: vec![],
                provider_meta: None,
            },
        )
        .await;

    assert!(updated.diagnostics.is_empty(), "{:?}", updated.diagnostics);
    modify_mock.assert_async().await;
    assert_eq!(to_json(&updated.new_state)["flow_name"], "terraform-flow-renamed");

    let delete_mock = mock_request(
        &mut server,
        "DeleteStreamLinkFlow",
        json!({"FlowId": "flow-01"}),
        json!({}),
    )
    .await;
    let deleted = resource
        .delete(
            Context::new(),
            DeleteResourceRequest {
                type_name: TYPE_NAME.to_string(),
                prior_state: updated.new_state,
                planned_private: vec![],
                provider_meta: None,
            },
        )
        .await;
    assert!(deleted.diagnostics.is_empty());
    delete_mock.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn bandwidth_change_is_rejected_without_calling_mps() {
    let mut server = Server::new_async().await;
    let untouched = server
        .mock("POST", "/")
        .expect(0)
        .create_async()
        .await;

    let resource = resource(&server, TYPE_NAME).await;
    let mut prior = flow_config("terraform-flow", 10000000);
    prior["id"] = json!("flow-01");
    let prior = value(prior);
    let config = value(flow_config("terraform-flow-renamed", 20000000));

    let updated = resource
        .update(
            Context::new(),
            UpdateResourceRequest {
                type_name: TYPE_NAME.to_string(),
                prior_state: prior.clone(),
                planned_state: config.clone(),
                config,
                planned_private: vec![],
                provider_meta: None,
            },
        )
        .await;

    assert_eq!(updated.diagnostics.len(), 1);
    assert_eq!(
        updated.diagnostics[0].detail,
        "argument `max_bandwidth` cannot be changed"
    );
    assert_eq!(updated.new_state, prior);
    untouched.assert_async().await;
}

fn srt_secured(mut config: serde_json::Value) -> serde_json::Value {
    let srt = &mut config["input_group"][0]["srt_settings"][0];
    srt["passphrase"] = json!("correct-horse-battery");
    srt["pb_key_len"] = json!(16);
    config
}

#[tokio::test(flavor = "multi_thread")]
async fn rename_keeps_srt_passphrase_mps_does_not_echo() {
    let mut server = Server::new_async().await;

    let _create = mock_request(
        &mut server,
        "CreateStreamLinkFlow",
        json!({
            "InputGroup": [{"SRTSettings": {"Passphrase": "correct-horse-battery", "PbKeyLen": 16}}]
        }),
        json!({"Info": {"FlowId": "flow-01"}}),
    )
    .await;
    let describe_mock =
        mock_action(&mut server, "DescribeStreamLinkFlow", described("terraform-flow")).await;

    let resource = resource(&server, TYPE_NAME).await;
    let config = value(srt_secured(flow_config("terraform-flow", 10000000)));
    let created = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: TYPE_NAME.to_string(),
                planned_state: config.clone(),
                config,
                planned_private: vec![],
                provider_meta: None,
            },
        )
        .await;

    assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);
    let srt = &to_json(&created.new_state)["input_group"][0]["srt_settings"][0];
    assert_eq!(srt["passphrase"], "correct-horse-battery");
    assert_eq!(srt["pb_key_len"], 16);

    describe_mock.remove_async().await;
    let modify_mock = mock_request(
        &mut server,
        "ModifyStreamLinkFlow",
        json!({"FlowId": "flow-01", "FlowName": "terraform-flow-renamed"}),
        json!({}),
    )
    .await;
    let _describe_renamed = mock_action(
        &mut server,
        "DescribeStreamLinkFlow",
        described("terraform-flow-renamed"),
    )
    .await;

    let config = value(srt_secured(flow_config("terraform-flow-renamed", 10000000)));
    let updated = resource
        .update(
            Context::new(),
            UpdateResourceRequest {
                type_name: TYPE_NAME.to_string(),
                prior_state: created.new_state.clone(),
                planned_state: config.clone(),
                config,
                planned_private: vec![],
                provider_meta: None,
            },
        )
        .await;

    assert!(updated.diagnostics.is_empty(), "{:?}", updated.diagnostics);
    modify_mock.assert_async().await;
    let state = to_json(&updated.new_state);
    assert_eq!(state["flow_name"], "terraform-flow-renamed");
    assert_eq!(
        state["input_group"][0]["srt_settings"][0]["passphrase"],
        "correct-horse-battery"
    );
}
