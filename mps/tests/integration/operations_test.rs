//! One-shot operation resources: the call happens on create, nothing after

use mockito::Server;
use serde_json::json;
use tfplug::context::Context;
use tfplug::resource::{
    CreateResourceRequest, DeleteResourceRequest, ReadResourceRequest, Resource,
};
use tfplug::types::ClientCapabilities;

use crate::common::{mock_action, mock_request, mps_error, resource, to_json, value};

#[tokio::test(flavor = "multi_thread")]
async fn start_flow_starts_once_and_then_stays_quiet() {
    let mut server = Server::new_async().await;
    let start_mock = mock_request(
        &mut server,
        "StartStreamLinkFlow",
        json!({"FlowId": "flow-01"}),
        json!({}),
    )
    .await;

    let type_name = "tencentcloud_mps_start_flow_operation";
    let resource = resource(&server, type_name).await;
    let config = value(json!({"id": null, "flow_id": "flow-01", "start": true}));
    let created = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: type_name.to_string(),
                planned_state: config.clone(),
                config,
                planned_private: vec![],
                provider_meta: None,
            },
        )
        .await;

    assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);
    assert_eq!(to_json(&created.new_state)["id"], "flow-01");

    let read = resource
        .read(
            Context::new(),
            ReadResourceRequest {
                type_name: type_name.to_string(),
                current_state: created.new_state.clone(),
                private: vec![],
                provider_meta: None,
                client_capabilities: ClientCapabilities::default(),
            },
        )
        .await;
    assert!(read.diagnostics.is_empty());
    assert_eq!(read.new_state, Some(created.new_state.clone()));

    let deleted = resource
        .delete(
            Context::new(),
            DeleteResourceRequest {
                type_name: type_name.to_string(),
                prior_state: created.new_state,
                planned_private: vec![],
                provider_meta: None,
            },
        )
        .await;
    assert!(deleted.diagnostics.is_empty());

    // read and delete never reach MPS
    start_mock.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn aborting_an_unknown_task_reports_it() {
    let mut server = Server::new_async().await;
    let _detail = server
        .mock("POST", "/")
        .match_header("x-tc-action", "DescribeTaskDetail")
        .with_body(mps_error("ResourceNotFound.TaskNotExist"))
        .create_async()
        .await;
    let manage_mock = server
        .mock("POST", "/")
        .match_header("x-tc-action", "ManageTask")
        .expect(0)
        .create_async()
        .await;

    let type_name = "tencentcloud_mps_manage_task_operation";
    let resource = resource(&server, type_name).await;
    let config = value(json!({
        "id": null,
        "operation_type": "Abort",
        "task_id": "2600010949-LiveProcessTask-1"
    }));
    let created = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: type_name.to_string(),
                planned_state: config.clone(),
                config,
                planned_private: vec![],
                provider_meta: None,
            },
        )
        .await;

    assert_eq!(created.diagnostics.len(), 1);
    assert_eq!(created.diagnostics[0].summary, "Task not found");
    manage_mock.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn aborting_a_live_task_calls_manage_task() {
    let mut server = Server::new_async().await;
    let _detail = mock_action(
        &mut server,
        "DescribeTaskDetail",
        json!({"TaskType": "LiveProcessTask", "Status": "PROCESSING"}),
    )
    .await;
    let manage_mock = mock_request(
        &mut server,
        "ManageTask",
        json!({"OperationType": "Abort", "TaskId": "2600010949-LiveProcessTask-1"}),
        json!({}),
    )
    .await;

    let type_name = "tencentcloud_mps_manage_task_operation";
    let resource = resource(&server, type_name).await;
    let config = value(json!({
        "id": null,
        "operation_type": "Abort",
        "task_id": "2600010949-LiveProcessTask-1"
    }));
    let created = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: type_name.to_string(),
                planned_state: config.clone(),
                config,
                planned_private: vec![],
                provider_meta: None,
            },
        )
        .await;

    assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);
    manage_mock.assert_async().await;
    assert_eq!(
        to_json(&created.new_state)["id"],
        "2600010949-LiveProcessTask-1"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn execute_function_records_its_result() {
    let mut server = Server::new_async().await;
    let execute_mock = mock_request(
        &mut server,
        "ExecuteFunction",
        json!({"FunctionName": "SomeFunction", "FunctionArg": "{\"key\":\"value\"}"}),
        json!({"Result": "{\"status\":\"done\"}"}),
    )
    .await;

    let type_name = "tencentcloud_mps_execute_function_operation";
    let resource = resource(&server, type_name).await;
    let config = value(json!({
        "id": null,
        "function_name": "SomeFunction",
        "function_arg": "{\"key\":\"value\"}",
        "result": null
    }));
    let created = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: type_name.to_string(),
                planned_state: config.clone(),
                config,
                planned_private: vec![],
                provider_meta: None,
            },
        )
        .await;

    assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);
    let state = to_json(&created.new_state);
    assert_eq!(state["id"], "SomeFunction");
    assert_eq!(state["result"], "{\"status\":\"done\"}");

    let read = resource
        .read(
            Context::new(),
            ReadResourceRequest {
                type_name: type_name.to_string(),
                current_state: created.new_state.clone(),
                private: vec![],
                provider_meta: None,
                client_capabilities: ClientCapabilities::default(),
            },
        )
        .await;
    assert!(read.diagnostics.is_empty());
    assert_eq!(read.new_state, Some(created.new_state.clone()));

    let deleted = resource
        .delete(
            Context::new(),
            DeleteResourceRequest {
                type_name: type_name.to_string(),
                prior_state: created.new_state,
                planned_private: vec![],
                provider_meta: None,
            },
        )
        .await;
    assert!(deleted.diagnostics.is_empty());

    // one call in total: read and delete never reach MPS
    execute_mock.assert_async().await;
}
