//! Inputs and outputs addressed inside their flow by `flow_id#member_id`

use mockito::Server;
use serde_json::json;
use tfplug::context::Context;
use tfplug::resource::{
    CreateResourceRequest, DeleteResourceRequest, ImportResourceStateRequest,
    ReadResourceRequest, Resource,
};
use tfplug::types::ClientCapabilities;

use crate::common::{mock_action, mock_request, mps_error, resource, to_json, value};

const INPUT: &str = "tencentcloud_mps_input";
const OUTPUT: &str = "tencentcloud_mps_output";

fn srt_input(passphrase: Option<&str>) -> serde_json::Value {
    json!({
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
            "passphrase": passphrase,
            "pb_key_len": passphrase.map(|_| 16),
            "source_addresses": []
        }],
        "rtp_settings": [],
        "fail_over": null,
        "rtmp_pull_settings": [],
        "rtsp_pull_settings": [],
        "hls_pull_settings": [],
        "resilient_stream": []
    })
}

fn srt_output(passphrase: Option<&str>) -> serde_json::Value {
    json!({
        "output_name": "srt-out",
        "description": "push",
        "protocol": "SRT",
        "output_region": "ap-guangzhou",
        "srt_settings": [{
            "destinations": [{"ip": "203.0.113.1", "port": 9000}],
            "stream_id": null,
            "latency": 1000,
            "recv_latency": null,
            "peer_latency": null,
            "peer_idle_timeout": null,
            "passphrase": passphrase,
            "pb_key_len": null,
            "mode": "CALLER"
        }],
        "rtmp_settings": [],
        "rtp_settings": [],
        "allow_ip_list": null,
        "max_concurrent": null
    })
}

/// MPS answers without any SRT passphrase.
fn described_flow(outputs: serde_json::Value) -> serde_json::Value {
    json!({
        "Info": {
            "FlowId": "flow-01",
            "FlowName": "terraform-flow",
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
            "OutputGroup": outputs
        }
    })
}

fn described_output() -> serde_json::Value {
    json!([{
        "OutputId": "out-01",
        "OutputName": "srt-out",
        "Description": "push",
        "Protocol": "SRT",
        "OutputRegion": "ap-guangzhou",
        "SRTSettings": {
            "Destinations": [{"Ip": "203.0.113.1", "Port": 9000}],
            "Latency": 1000,
            "Mode": "CALLER"
        }
    }])
}

fn read_request(type_name: &str, state: tfplug::types::DynamicValue) -> ReadResourceRequest {
    ReadResourceRequest {
        type_name: type_name.to_string(),
        current_state: state,
        private: vec![],
        provider_meta: None,
        client_capabilities: ClientCapabilities::default(),
    }
}

fn import_request(type_name: &str, id: &str) -> ImportResourceStateRequest {
    ImportResourceStateRequest {
        type_name: type_name.to_string(),
        id: id.to_string(),
        client_capabilities: ClientCapabilities::default(),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn output_lives_under_its_flow_id() {
    let mut server = Server::new_async().await;

    let create_mock = mock_request(
        &mut server,
        "CreateStreamLinkOutputInfo",
        json!({
            "FlowId": "flow-01",
            "Output": {
                "OutputName": "srt-out",
                "SRTSettings": {"Passphrase": "output-secret-key", "Mode": "CALLER"}
            }
        }),
        json!({"Info": {"OutputId": "out-01"}}),
    )
    .await;
    let describe_mock = mock_action(
        &mut server,
        "DescribeStreamLinkFlow",
        described_flow(described_output()),
    )
    .await;

    let resource = resource(&server, OUTPUT).await;
    let config = value(json!({
        "id": null,
        "flow_id": "flow-01",
        "output": [srt_output(Some("output-secret-key"))]
    }));
    let created = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: OUTPUT.to_string(),
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
    assert_eq!(state["id"], "flow-01#out-01");
    assert_eq!(state["flow_id"], "flow-01");
    let srt = &state["output"][0]["srt_settings"][0];
    assert_eq!(srt["passphrase"], "output-secret-key");
    assert_eq!(srt["destinations"][0]["port"], 9000);

    // A refresh keeps the passphrase MPS leaves out.
    let read = resource
        .read(Context::new(), read_request(OUTPUT, created.new_state.clone()))
        .await;
    assert!(read.diagnostics.is_empty(), "{:?}", read.diagnostics);
    let refreshed = to_json(&read.new_state.unwrap());
    assert_eq!(
        refreshed["output"][0]["srt_settings"][0]["passphrase"],
        "output-secret-key"
    );

    // The output disappears from the flow.
    describe_mock.remove_async().await;
    let _describe_empty =
        mock_action(&mut server, "DescribeStreamLinkFlow", described_flow(json!([]))).await;
    let read = resource
        .read(Context::new(), read_request(OUTPUT, created.new_state.clone()))
        .await;
    assert!(read.diagnostics.is_empty());
    assert!(read.new_state.is_none());

    let delete_mock = mock_request(
        &mut server,
        "DeleteStreamLinkOutput",
        json!({"FlowId": "flow-01", "OutputId": "out-01"}),
        json!({}),
    )
    .await;
    let deleted = resource
        .delete(
            Context::new(),
            DeleteResourceRequest {
                type_name: OUTPUT.to_string(),
                prior_state: created.new_state,
                planned_private: vec![],
                provider_meta: None,
            },
        )
        .await;
    assert!(deleted.diagnostics.is_empty(), "{:?}", deleted.diagnostics);
    delete_mock.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn output_import_requires_both_ids() {
    let server = Server::new_async().await;
    let resource = resource(&server, OUTPUT).await;
    let importable = resource.as_importable().unwrap();

    let rejected = importable
        .import_state(Context::new(), import_request(OUTPUT, "out-01"))
        .await;
    assert_eq!(rejected.diagnostics.len(), 1);
    assert!(rejected.imported_resources.is_empty());

    let accepted = importable
        .import_state(Context::new(), import_request(OUTPUT, "flow-01#out-01"))
        .await;
    assert!(accepted.diagnostics.is_empty());
    assert_eq!(
        to_json(&accepted.imported_resources[0].state)["id"],
        "flow-01#out-01"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn input_is_configured_in_place_and_keeps_its_passphrase() {
    let mut server = Server::new_async().await;

    let modify_mock = mock_request(
        &mut server,
        "ModifyStreamLinkInput",
        json!({
            "FlowId": "flow-01",
            "Input": {
                "InputId": "input-01",
                "SRTSettings": {"Passphrase": "input-secret-key", "PbKeyLen": 16}
            }
        }),
        json!({}),
    )
    .await;
    let _describe = mock_action(
        &mut server,
        "DescribeStreamLinkFlow",
        described_flow(json!([])),
    )
    .await;

    let resource = resource(&server, INPUT).await;
    let config = value(json!({
        "id": null,
        "flow_id": "flow-01",
        "input_id": "input-01",
        "input_group": [srt_input(Some("input-secret-key"))]
    }));
    let created = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: INPUT.to_string(),
                planned_state: config.clone(),
                config,
                planned_private: vec![],
                provider_meta: None,
            },
        )
        .await;

    assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);
    modify_mock.assert_async().await;
    let state = to_json(&created.new_state);
    assert_eq!(state["id"], "flow-01#input-01");
    let srt = &state["input_group"][0]["srt_settings"][0];
    assert_eq!(srt["passphrase"], "input-secret-key");
    assert_eq!(srt["pb_key_len"], 16);

    let read = resource
        .read(Context::new(), read_request(INPUT, created.new_state.clone()))
        .await;
    assert!(read.diagnostics.is_empty(), "{:?}", read.diagnostics);
    assert_eq!(read.new_state, Some(created.new_state));
}

#[tokio::test(flavor = "multi_thread")]
async fn imported_input_is_read_from_its_flow() {
    let mut server = Server::new_async().await;
    let _describe = mock_action(
        &mut server,
        "DescribeStreamLinkFlow",
        described_flow(json!([])),
    )
    .await;

    let resource = resource(&server, INPUT).await;
    let imported = resource
        .as_importable()
        .unwrap()
        .import_state(Context::new(), import_request(INPUT, "flow-01#input-01"))
        .await;
    assert!(imported.diagnostics.is_empty());

    let read = resource
        .read(
            Context::new(),
            read_request(INPUT, imported.imported_resources[0].state.clone()),
        )
        .await;
    assert!(read.diagnostics.is_empty(), "{:?}", read.diagnostics);
    let state = to_json(&read.new_state.unwrap());
    assert_eq!(state["flow_id"], "flow-01");
    assert_eq!(state["input_id"], "input-01");
    assert_eq!(state["input_group"][0]["input_name"], "srt-in");
    assert_eq!(state["input_group"][0]["srt_settings"][0]["mode"], "LISTENER");
}

#[tokio::test(flavor = "multi_thread")]
async fn input_of_a_deleted_flow_vanishes() {
    let mut server = Server::new_async().await;
    let _describe = server
        .mock("POST", "/")
        .match_header("x-tc-action", "DescribeStreamLinkFlow")
        .with_body(mps_error("ResourceNotFound.FlowNotExist"))
        .create_async()
        .await;

    let resource = resource(&server, INPUT).await;
    let read = resource
        .read(
            Context::new(),
            read_request(
                INPUT,
                value(json!({"id": "flow-01#input-01", "flow_id": "flow-01", "input_id": "input-01"})),
            ),
        )
        .await;

    assert!(read.diagnostics.is_empty(), "{:?}", read.diagnostics);
    assert!(read.new_state.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn deleting_an_input_leaves_the_flow_alone() {
    let mut server = Server::new_async().await;
    let untouched = server.mock("POST", "/").expect(0).create_async().await;

    let resource = resource(&server, INPUT).await;
    let deleted = resource
        .delete(
            Context::new(),
            DeleteResourceRequest {
                type_name: INPUT.to_string(),
                prior_state: value(json!({"id": "flow-01#input-01", "flow_id": "flow-01", "input_id": "input-01"})),
                planned_private: vec![],
                provider_meta: None,
            },
        )
        .await;

    assert!(deleted.diagnostics.is_empty());
    untouched.assert_async().await;
}
