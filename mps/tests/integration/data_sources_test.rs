//! Data sources read through a mock endpoint, including a provider
//! configured end to end

use mockito::Server;
use serde_json::json;
use tencentcloud_mps::TencentCloudProvider;
use tfplug::context::Context;
use tfplug::data_source::{ConfigureDataSourceRequest, DataSource, ReadDataSourceRequest};
use tfplug::provider::{ConfigureProviderRequest, Provider};
use tfplug::types::ClientCapabilities;

use crate::common::{data_source, mock_action, mock_request, mps_body, mps_error, to_json, value};

fn read_request(type_name: &str, config: serde_json::Value) -> ReadDataSourceRequest {
    ReadDataSourceRequest {
        type_name: type_name.to_string(),
        config: value(config),
        provider_meta: None,
        client_capabilities: ClientCapabilities::default(),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn tasks_are_listed_and_written_out() {
    let mut server = Server::new_async().await;
    let describe_mock = mock_request(
        &mut server,
        "DescribeTasks",
        json!({"Status": "FINISH", "Limit": 2}),
        json!({
            "TaskSet": [
                {
                    "TaskId": "2600010949-WorkflowTask-1",
                    "TaskType": "WorkflowTask",
                    "CreateTime": "2024-01-01T00:00:00Z",
                    "FinishTime": "2024-01-01T00:01:00Z",
                    "SubTaskTypes": ["Transcode"]
                },
                {
                    "TaskId": "2600010949-EditMediaTask-2",
                    "TaskType": "EditMediaTask"
                }
            ],
            "ScrollToken": "next-page"
        }),
    )
    .await;

    let output = std::env::temp_dir().join(format!("mps-tasks-{}.json", std::process::id()));
    let output_path = output.to_string_lossy().to_string();

    let type_name = "tencentcloud_mps_tasks";
    let data_source = data_source(&server, type_name).await;
    let read = data_source
        .read(
            Context::new(),
            read_request(
                type_name,
                json!({
                    "id": null,
                    "status": "FINISH",
                    "limit": 2,
                    "scroll_token": null,
                    "result_output_file": output_path,
                    "task_set": null
                }),
            ),
        )
        .await;

    assert!(read.diagnostics.is_empty(), "{:?}", read.diagnostics);
    describe_mock.assert_async().await;

    let state = to_json(&read.state);
    let tasks = state["task_set"].as_array().unwrap();
    assert_eq!(tasks.len(), 2);
    assert!(tasks.iter().all(|t| t["status"] == "FINISH"));
    assert_eq!(tasks[0]["sub_task_types"], json!(["Transcode"]));
    assert_eq!(state["scroll_token"], "next-page");
    assert_eq!(state["id"].as_str().unwrap().len(), 64);

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    std::fs::remove_file(&output).unwrap();
    assert_eq!(written[1]["task_id"], "2600010949-EditMediaTask-2");
}

#[tokio::test(flavor = "multi_thread")]
async fn describe_failure_is_reported() {
    let mut server = Server::new_async().await;
    let _describe = server
        .mock("POST", "/")
        .match_header("x-tc-action", "DescribeAdaptiveDynamicStreamingTemplates")
        .with_body(mps_error("InvalidParameterValue.Definitions"))
        .create_async()
        .await;

    let type_name = "tencentcloud_mps_adaptive_dynamic_streaming_templates";
    let data_source = data_source(&server, type_name).await;
    let read = data_source
        .read(
            Context::new(),
            read_request(
                type_name,
                json!({
                    "id": null,
                    "definitions": [-1],
                    "type": null,
                    "offset": null,
                    "limit": null,
                    "result_output_file": null,
                    "adaptive_dynamic_streaming_template_set": null,
                    "total_count": null
                }),
            ),
        )
        .await;

    assert_eq!(read.diagnostics.len(), 1);
    assert!(read.diagnostics[0]
        .detail
        .contains("InvalidParameterValue.Definitions"));
}

#[tokio::test(flavor = "multi_thread")]
async fn configured_provider_reaches_the_endpoint() {
    let mut server = Server::new_async().await;
    let describe_mock = server
        .mock("POST", "/")
        .match_header("x-tc-action", "DescribeSchedules")
        .match_header("x-tc-region", "ap-singapore")
        .match_header(
            "authorization",
            mockito::Matcher::Regex(r"^TC3-HMAC-SHA256 Credential=AKIDe2e/".to_string()),
        )
        .with_body(mps_body(json!({
            "TotalCount": 1,
            "ScheduleInfoSet": [{
                "ScheduleId": 7,
                "ScheduleName": "e2e",
                "Status": "Enabled",
                "Trigger": {
                    "Type": "CosFileUpload",
                    "CosFileUploadTrigger": {"Bucket": "bucket-125", "Region": "ap-singapore"}
                },
                "Activities": [{"ActivityType": "input"}, {"ActivityType": "output"}]
            }]
        })))
        .create_async()
        .await;

    let mut provider = TencentCloudProvider::new();
    let configured = provider
        .configure(
            Context::new(),
            ConfigureProviderRequest {
                terraform_version: "1.9.0".to_string(),
                config: value(json!({
                    "secret_id": "AKIDe2e",
                    "secret_key": "e2e-secret",
                    "security_token": null,
                    "region": "ap-singapore",
                    "protocol": null,
                    "domain": null,
                    "endpoint": server.url()
                })),
                client_capabilities: ClientCapabilities::default(),
            },
        )
        .await;
    assert!(configured.diagnostics.is_empty(), "{:?}", configured.diagnostics);

    let type_name = "tencentcloud_mps_schedules";
    let factories = provider.data_sources();
    let mut data_source = factories.get(type_name).unwrap()();
    let response = data_source
        .configure(
            Context::new(),
            ConfigureDataSourceRequest {
                provider_data: configured.provider_data,
            },
        )
        .await;
    assert!(response.diagnostics.is_empty());

    let read = data_source
        .read(
            Context::new(),
            read_request(
                type_name,
                json!({
                    "id": null,
                    "schedule_ids": [7],
                    "trigger_type": null,
                    "status": null,
                    "result_output_file": null,
                    "schedule_info_set": null
                }),
            ),
        )
        .await;

    assert!(read.diagnostics.is_empty(), "{:?}", read.diagnostics);
    describe_mock.assert_async().await;
    let state = to_json(&read.state);
    let schedule = &state["schedule_info_set"][0];
    assert_eq!(schedule["schedule_id"], 7);
    assert_eq!(schedule["status"], "Enabled");
    assert_eq!(
        schedule["trigger"][0]["cos_file_upload_trigger"][0]["bucket"],
        "bucket-125"
    );
    assert_eq!(schedule["activities"].as_array().unwrap().len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn transcode_templates_are_listed() {
    let mut server = Server::new_async().await;
    let _describe = mock_action(
        &mut server,
        "DescribeTranscodeTemplates",
        json!({
            "TotalCount": 1,
            "TranscodeTemplateSet": [{
                "Definition": "100010",
                "Type": "Preset",
                "Name": "MP4-H264",
                "Container": "mp4",
                "ContainerType": "Video",
                "RemoveVideo": 0,
                "RemoveAudio": 0,
                "VideoTemplate": {"Codec": "libx264", "Fps": 24, "Bitrate": 256}
            }]
        }),
    )
    .await;

    let type_name = "tencentcloud_mps_transcode_templates";
    let data_source = data_source(&server, type_name).await;
    let read = data_source
        .read(
            Context::new(),
            read_request(
                type_name,
                json!({
                    "id": null,
                    "definitions": null,
                    "type": "Preset",
                    "container_type": null,
                    "tehd_type": null,
                    "transcode_type": null,
                    "offset": null,
                    "limit": null,
                    "result_output_file": null,
                    "transcode_template_set": null,
                    "total_count": null
                }),
            ),
        )
        .await;

    assert!(read.diagnostics.is_empty(), "{:?}", read.diagnostics);
    let state = to_json(&read.state);
    assert_eq!(state["total_count"], 1);
    let template = &state["transcode_template_set"][0];
    assert_eq!(template["definition"], "100010");
    assert_eq!(template["container_type"], "Video");
    assert_eq!(template["video_template"][0]["codec"], "libx264");
}
