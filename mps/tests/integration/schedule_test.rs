//! Schedule lifecycle with nested activities against a mock endpoint

use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use tfplug::context::Context;
use tfplug::resource::{
    CreateResourceRequest, CreateResourceResponse, Resource, UpdateResourceRequest,
};

use crate::common::{mock_action, mock_request, mps_body, resource, to_json, value};

const TYPE_NAME: &str = "tencentcloud_mps_schedule";

fn schedule_config(status: Option<&str>) -> serde_json::Value {
    json!({
        "id": null,
        "schedule_name": "terraform-schedule",
        "status": status,
        "trigger": [{
            "type": "AwsS3FileUpload",
            "cos_file_upload_trigger": [],
            "aws_s3_file_upload_trigger": [{
                "s3_bucket": "media-in",
                "s3_region": "us-east-1",
                "dir": "/upload/",
                "formats": ["mp4", "flv"],
                "s3_secret_id": "AKIAEXAMPLE",
                "s3_secret_key": "aws-secret",
                "aws_sqs": []
            }]
        }],
        "activities": [
            {"activity_type": "input", "reardrive_index": [1, 2], "activity_para": []},
            {
                "activity_type": "action-trans",
                "reardrive_index": [3],
                "activity_para": [{
                    "transcode_task": [{"definition": 10, "output_object_path": "{inputName}_{definition}"}]
                }]
            },
            {
                "activity_type": "action-samplesnapshot",
                "reardrive_index": [3],
                "activity_para": [{
                    "sample_snapshot_task": [{"definition": 10}]
                }]
            },
            {"activity_type": "output", "reardrive_index": null, "activity_para": []}
        ],
        "output_storage": [{
            "type": "AWS-S3",
            "cos_output_storage": [],
            "s3_output_storage": [{
                "s3_bucket": "media-out",
                "s3_region": "us-east-1",
                "s3_secret_id": "AKIAEXAMPLE",
                "s3_secret_key": "aws-secret"
            }]
        }],
        "output_dir": "/output/",
        "task_notify_config": [],
        "resource_id": null
    })
}

fn described(status: &str) -> serde_json::Value {
    json!({
        "TotalCount": 1,
        "ScheduleInfoSet": [{
            "ScheduleId": 21,
            "ScheduleName": "terraform-schedule",
            "Status": status,
            "Trigger": {
                "Type": "AwsS3FileUpload",
                "AwsS3FileUploadTrigger": {
                    "S3Bucket": "media-in",
                    "S3Region": "us-east-1",
                    "Dir": "/upload/",
                    "Formats": ["mp4", "flv"]
                }
            },
            "Activities": [
                {"ActivityType": "input", "ReardriveIndex": [1, 2]},
                {
                    "ActivityType": "action-trans",
                    "ReardriveIndex": [3],
                    "ActivityPara": {"TranscodeTask": {"Definition": 10, "OutputObjectPath": "{inputName}_{definition}"}}
                },
                {
                    "ActivityType": "action-samplesnapshot",
                    "ReardriveIndex": [3],
                    "ActivityPara": {"SampleSnapshotTask": {"Definition": 10}}
                },
                {"ActivityType": "output"}
            ],
            "OutputStorage": {
                "Type": "AWS-S3",
                "S3OutputStorage": {"S3Bucket": "media-out", "S3Region": "us-east-1"}
            },
            "OutputDir": "/output/",
            "CreateTime": "2024-01-01T00:00:00Z",
            "UpdateTime": "2024-01-01T00:00:00Z"
        }]
    })
}

#[tokio::test(flavor = "multi_thread")]
async fn nested_schedule_round_trips() {
    let mut server = Server::new_async().await;

    let create_mock = mock_request(
        &mut server,
        "CreateSchedule",
        json!({
            "ScheduleName": "terraform-schedule",
            "Trigger": {
                "Type": "AwsS3FileUpload",
                "AwsS3FileUploadTrigger": {"S3Bucket": "media-in", "S3SecretKey": "aws-secret"}
            },
            "Activities": [
                {"ActivityType": "input", "ReardriveIndex": [1, 2]},
                {"ActivityType": "action-trans", "ActivityPara": {"TranscodeTask": {"Definition": 10}}},
                {"ActivityType": "action-samplesnapshot", "ActivityPara": {"SampleSnapshotTask": {"Definition": 10}}},
                {"ActivityType": "output"}
            ],
            "OutputDir": "/output/"
        }),
        json!({"ScheduleId": 21}),
    )
    .await;
    let _describe = mock_action(&mut server, "DescribeSchedules", described("Disabled")).await;

    let resource = resource(&server, TYPE_NAME).await;
    let config = value(schedule_config(None));
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
    assert_eq!(state["id"], "21");
    assert_eq!(state["status"], "Disabled");
    let activities = state["activities"].as_array().unwrap();
    assert_eq!(activities.len(), 4);
    assert_eq!(activities[0]["reardrive_index"], json!([1, 2]));
    assert_eq!(
        activities[1]["activity_para"][0]["transcode_task"][0]["definition"],
        10
    );
    assert_eq!(
        activities[2]["activity_para"][0]["sample_snapshot_task"][0]["definition"],
        10
    );
    assert_eq!(activities[3]["activity_type"], "output");

    // MPS does not echo credentials; the configured ones stay in state.
    let s3 = &state["trigger"][0]["aws_s3_file_upload_trigger"][0];
    assert_eq!(s3["s3_secret_key"], "aws-secret");
    assert_eq!(
        state["output_storage"][0]["s3_output_storage"][0]["s3_secret_key"],
        "aws-secret"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn status_change_enables_without_modifying() {
    let mut server = Server::new_async().await;

    let modify_mock = server
        .mock("POST", "/")
        .match_header("x-tc-action", "ModifySchedule")
        .expect(0)
        .create_async()
        .await;
    let enable_mock = mock_request(
        &mut server,
        "EnableSchedule",
        json!({"ScheduleId": 21}),
        json!({}),
    )
    .await;
    let _describe = mock_action(&mut server, "DescribeSchedules", described("Enabled")).await;

    let resource = resource(&server, TYPE_NAME).await;
    let mut prior = schedule_config(Some("Disabled"));
    prior["id"] = json!("21");
    let config = value(schedule_config(Some("Enabled")));

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

    assert!(updated.diagnostics.is_empty(), "{:?}", updated.diagnostics);
    enable_mock.assert_async().await;
    modify_mock.assert_async().await;
    assert_eq!(to_json(&updated.new_state)["status"], "Enabled");
}

async fn create_with_status(server: &mut ServerGuard, status: &str) -> CreateResourceResponse {
    let _create = mock_action(server, "CreateSchedule", json!({"ScheduleId": 21})).await;
    let resource = resource(server, TYPE_NAME).await;
    let config = value(schedule_config(Some(status)));
    resource
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
        .await
}

#[tokio::test(flavor = "multi_thread")]
async fn create_skips_status_switch_when_already_matching() {
    let mut server = Server::new_async().await;

    let switch_mock = server
        .mock("POST", "/")
        .match_header("x-tc-action", Matcher::Regex("(Enable|Disable)Schedule".into()))
        .expect(0)
        .create_async()
        .await;
    let _describe = mock_action(&mut server, "DescribeSchedules", described("Disabled")).await;

    let created = create_with_status(&mut server, "Disabled").await;

    assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);
    switch_mock.assert_async().await;
    assert_eq!(to_json(&created.new_state)["status"], "Disabled");
}

#[tokio::test(flavor = "multi_thread")]
async fn create_enables_when_created_disabled() {
    let mut server = Server::new_async().await;

    let enable_mock = mock_request(
        &mut server,
        "EnableSchedule",
        json!({"ScheduleId": 21}),
        json!({}),
    )
    .await;
    let disable_mock = server
        .mock("POST", "/")
        .match_header("x-tc-action", "DisableSchedule")
        .expect(0)
        .create_async()
        .await;
    let _describe = server
        .mock("POST", "/")
        .match_header("x-tc-action", "DescribeSchedules")
        .with_body(mps_body(described("Disabled")))
        .expect(2)
        .create_async()
        .await;

    let created = create_with_status(&mut server, "Enabled").await;

    assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);
    enable_mock.assert_async().await;
    disable_mock.assert_async().await;
}
