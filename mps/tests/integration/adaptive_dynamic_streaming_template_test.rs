//! Lifecycle of an adaptive bitrate streaming template against a mock endpoint

use mockito::Server;
use serde_json::json;
use tfplug::context::Context;
use tfplug::resource::{
    CreateResourceRequest, DeleteResourceRequest, ImportResourceStateRequest,
    ReadResourceRequest, Resource, UpdateResourceRequest,
};
use tfplug::types::ClientCapabilities;

use crate::common::{mock_action, mock_request, mps_error, resource, to_json, value};

const TYPE_NAME: &str = "tencentcloud_mps_adaptive_dynamic_streaming_template";

fn two_stream_config(name: &str) -> serde_json::Value {
    json!({
        "id": null,
        "format": "HLS",
        "name": name,
        "disable_higher_video_bitrate": 0,
        "disable_higher_video_resolution": 1,
        "comment": null,
        "stream_infos": [
            {
                "video": [{"codec": "libx265", "fps": 4, "bitrate": 129, "resolution_adaptive": "open", "width": 128, "height": 128, "fill_type": "stretch"}],
                "audio": [{"codec": "libmp3lame", "bitrate": 129, "sample_rate": 44100, "audio_channel": 2}],
                "remove_audio": 0,
                "remove_video": null
            },
            {
                "video": [{"codec": "libx264", "fps": 4, "bitrate": 256, "resolution_adaptive": "open", "width": 0, "height": 0, "fill_type": "stretch"}],
                "audio": [{"codec": "libfdk_aac", "bitrate": 256, "sample_rate": 44100, "audio_channel": 2}],
                "remove_audio": 1,
                "remove_video": null
            }
        ]
    })
}

fn described(name: &str) -> serde_json::Value {
    json!({
        "TotalCount": 1,
        "AdaptiveDynamicStreamingTemplateSet": [{
            "Definition": 1001,
            "Type": "Custom",
            "Name": name,
            "Format": "HLS",
            "DisableHigherVideoBitrate": 0,
            "DisableHigherVideoResolution": 1,
            "StreamInfos": [
                {
                    "Video": {"Codec": "libx265", "Fps": 4, "Bitrate": 129, "ResolutionAdaptive": "open", "Width": 128, "Height": 128, "FillType": "stretch"},
                    "Audio": {"Codec": "libmp3lame", "Bitrate": 129, "SampleRate": 44100, "AudioChannel": 2},
                    "RemoveAudio": 0
                },
                {
                    "Video": {"Codec": "libx264", "Fps": 4, "Bitrate": 256, "ResolutionAdaptive": "open", "Width": 0, "Height": 0, "FillType": "stretch"},
                    "Audio": {"Codec": "libfdk_aac", "Bitrate": 256, "SampleRate": 44100, "AudioChannel": 2},
                    "RemoveAudio": 1
                }
            ],
            "CreateTime": "2024-01-01T00:00:00Z",
            "UpdateTime": "2024-01-01T00:00:00Z"
        }]
    })
}

#[tokio::test(flavor = "multi_thread")]
async fn two_stream_template_round_trips() {
    let mut server = Server::new_async().await;

    let create_mock = mock_request(
        &mut server,
        "CreateAdaptiveDynamicStreamingTemplate",
        json!({
            "Format": "HLS",
            "Name": "terraform-ads",
            "StreamInfos": [
                {"Video": {"Codec": "libx265", "Bitrate": 129}, "Audio": {"Codec": "libmp3lame"}, "RemoveAudio": 0},
                {"Video": {"Codec": "libx264", "Bitrate": 256}, "Audio": {"Codec": "libfdk_aac"}, "RemoveAudio": 1}
            ]
        }),
        json!({"Definition": 1001}),
    )
    .await;
    let describe_mock = mock_action(
        &mut server,
        "DescribeAdaptiveDynamicStreamingTemplates",
        described("terraform-ads"),
    )
    .await;

    let resource = resource(&server, TYPE_NAME).await;
    let config = value(two_stream_config("terraform-ads"));
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
    assert_eq!(state["id"], "1001");
    assert_eq!(state["stream_infos"].as_array().unwrap().len(), 2);
    assert_eq!(state["stream_infos"][0]["video"][0]["codec"], "libx265");
    assert_eq!(state["stream_infos"][1]["video"][0]["codec"], "libx264");
    assert_eq!(state["stream_infos"][1]["audio"][0]["codec"], "libfdk_aac");
    assert_eq!(state["stream_infos"][1]["remove_audio"], 1);

    // Rename, then read the renamed template back.
    describe_mock.remove_async().await;
    let modify_mock = mock_request(
        &mut server,
        "ModifyAdaptiveDynamicStreamingTemplate",
        json!({"Definition": 1001, "Name": "terraform-ads-renamed"}),
        json!({}),
    )
    .await;
    let _describe_renamed = mock_action(
        &mut server,
        "DescribeAdaptiveDynamicStreamingTemplates",
        described("terraform-ads-renamed"),
    )
    .await;

    let config = value(two_stream_config("terraform-ads-renamed"));
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
    assert_eq!(state["id"], "1001");
    assert_eq!(state["name"], "terraform-ads-renamed");

    // Import by definition and refresh.
    let imported = resource
        .as_importable()
        .unwrap()
        .import_state(
            Context::new(),
            ImportResourceStateRequest {
                type_name: TYPE_NAME.to_string(),
                id: "1001".to_string(),
                client_capabilities: ClientCapabilities::default(),
            },
        )
        .await;
    assert!(imported.diagnostics.is_empty());
    assert_eq!(imported.imported_resources.len(), 1);

    let read = resource
        .read(
            Context::new(),
            ReadResourceRequest {
                type_name: TYPE_NAME.to_string(),
                current_state: imported.imported_resources[0].state.clone(),
                private: vec![],
                provider_meta: None,
                client_capabilities: ClientCapabilities::default(),
            },
        )
        .await;
    assert!(read.diagnostics.is_empty());
    let state = to_json(&read.new_state.unwrap());
    assert_eq!(state["format"], "HLS");
    assert_eq!(state["name"], "terraform-ads-renamed");
    assert_eq!(state["stream_infos"].as_array().unwrap().len(), 2);

    let delete_mock = mock_request(
        &mut server,
        "DeleteAdaptiveDynamicStreamingTemplate",
        json!({"Definition": 1001}),
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
async fn unchanged_template_is_not_modified() {
    let mut server = Server::new_async().await;
    let modify_mock = server
        .mock("POST", "/")
        .match_header("x-tc-action", "ModifyAdaptiveDynamicStreamingTemplate")
        .expect(0)
        .create_async()
        .await;
    let _describe = mock_action(
        &mut server,
        "DescribeAdaptiveDynamicStreamingTemplates",
        described("terraform-ads"),
    )
    .await;

    let resource = resource(&server, TYPE_NAME).await;
    let mut prior = two_stream_config("terraform-ads");
    prior["id"] = json!("1001");
    let config = value(two_stream_config("terraform-ads"));

    let updated = resource
        .update(
            Context::new(),
            UpdateResourceRequest {
                type_name: TYPE_NAME.to_string(),
                prior_state: value(prior),
                planned_state: config.clone(),
                config,
                planned_private: vec![],
                provider_meta: None,
            },
        )
        .await;

    assert!(updated.diagnostics.is_empty());
    modify_mock.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn vanished_template_is_removed_from_state() {
    let mut server = Server::new_async().await;
    let _describe = mock_action(
        &mut server,
        "DescribeAdaptiveDynamicStreamingTemplates",
        json!({"TotalCount": 0, "AdaptiveDynamicStreamingTemplateSet": []}),
    )
    .await;

    let resource = resource(&server, TYPE_NAME).await;
    let read = resource
        .read(
            Context::new(),
            ReadResourceRequest {
                type_name: TYPE_NAME.to_string(),
                current_state: value(json!({"id": "1001"})),
                private: vec![],
                provider_meta: None,
                client_capabilities: ClientCapabilities::default(),
            },
        )
        .await;

    assert!(read.diagnostics.is_empty());
    assert!(read.new_state.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_read_keeps_the_state() {
    let mut server = Server::new_async().await;
    let _describe = server
        .mock("POST", "/")
        .match_header("x-tc-action", "DescribeAdaptiveDynamicStreamingTemplates")
        .with_body(mps_error("AuthFailure.SignatureFailure"))
        .create_async()
        .await;

    let resource = resource(&server, TYPE_NAME).await;
    let current = value(json!({"id": "1001"}));
    let read = resource
        .read(
            Context::new(),
            ReadResourceRequest {
                type_name: TYPE_NAME.to_string(),
                current_state: current.clone(),
                private: vec![],
                provider_meta: None,
                client_capabilities: ClientCapabilities::default(),
            },
        )
        .await;

    assert_eq!(read.diagnostics.len(), 1);
    assert!(read.diagnostics[0].detail.contains("AuthFailure.SignatureFailure"));
    assert_eq!(read.new_state, Some(current));
}

#[tokio::test(flavor = "multi_thread")]
async fn non_numeric_id_is_rejected_on_read() {
    let server = Server::new_async().await;
    let resource = resource(&server, TYPE_NAME).await;

    let read = resource
        .read(
            Context::new(),
            ReadResourceRequest {
                type_name: TYPE_NAME.to_string(),
                current_state: value(json!({"id": "not-a-number"})),
                private: vec![],
                provider_meta: None,
                client_capabilities: ClientCapabilities::default(),
            },
        )
        .await;

    assert_eq!(read.diagnostics.len(), 1);
    assert_eq!(read.new_state, Some(value(json!({"id": "not-a-number"}))));
}
