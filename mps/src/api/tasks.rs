//! Media tasks: editing, task management and custom functions

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use tfplug::context::Context;

use super::client::Client;
use super::common::{EmptyResponse, MediaInputInfo, TaskNotifyConfig, TaskOutputStorage};
use super::error::ApiError;

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EditMediaFileInfo {
    pub input_info: Option<MediaInputInfo>,
    pub start_time_offset: Option<f64>,
    pub end_time_offset: Option<f64>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EditMediaOutputConfig {
    pub container: Option<String>,
    pub r#type: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EditMediaRequest {
    pub file_infos: Option<Vec<EditMediaFileInfo>>,
    pub output_storage: Option<TaskOutputStorage>,
    pub output_object_path: Option<String>,
    pub output_config: Option<EditMediaOutputConfig>,
    pub task_notify_config: Option<TaskNotifyConfig>,
    pub tasks_priority: Option<i64>,
    pub session_id: Option<String>,
    pub session_context: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TaskIdResponse {
    task_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ManageTaskRequest {
    pub operation_type: String,
    pub task_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExecuteFunctionRequest {
    pub function_name: String,
    pub function_arg: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ExecuteFunctionResponse {
    #[serde(default)]
    result: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
struct TaskIdRequest<'a> {
    task_id: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskDetail {
    pub task_type: Option<String>,
    pub status: Option<String>,
    pub create_time: Option<String>,
    pub begin_process_time: Option<String>,
    pub finish_time: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeTasksRequest {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub scroll_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskSimpleInfo {
    pub task_id: Option<String>,
    pub task_type: Option<String>,
    pub create_time: Option<String>,
    pub begin_process_time: Option<String>,
    pub finish_time: Option<String>,
    pub sub_task_types: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeTasksResponse {
    pub task_set: Option<Vec<TaskSimpleInfo>>,
    /// Cursor of the next page; absent on the last one
    pub scroll_token: Option<String>,
}

impl Client {
    /// Returns the id of the editing task
    pub async fn edit_media(&self, ctx: &Context, request: &EditMediaRequest) -> Result<String, ApiError> {
        let response: TaskIdResponse = self.call(ctx, "EditMedia", request).await?;
        Ok(response.task_id)
    }

    pub async fn manage_task(&self, ctx: &Context, request: &ManageTaskRequest) -> Result<(), ApiError> {
        self.call::<_, EmptyResponse>(ctx, "ManageTask", request)
            .await
            .map(|_| ())
    }

    /// Returns the function's `Result` string
    pub async fn execute_function(
        &self,
        ctx: &Context,
        request: &ExecuteFunctionRequest,
    ) -> Result<String, ApiError> {
        let response: ExecuteFunctionResponse = self.call(ctx, "ExecuteFunction", request).await?;
        Ok(response.result)
    }

    pub async fn describe_task_detail(
        &self,
        ctx: &Context,
        task_id: &str,
    ) -> Result<TaskDetail, ApiError> {
        self.call(ctx, "DescribeTaskDetail", &TaskIdRequest { task_id })
            .await
    }

    pub async fn describe_tasks(
        &self,
        ctx: &Context,
        request: &DescribeTasksRequest,
    ) -> Result<DescribeTasksResponse, ApiError> {
        self.call(ctx, "DescribeTasks", request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::common::{CosInputInfo, CosOutputStorage};
    use serde_json::json;

    #[test]
    fn edit_media_request_shape() {
        let request = EditMediaRequest {
            file_infos: Some(vec![EditMediaFileInfo {
                input_info: Some(MediaInputInfo {
                    r#type: Some("COS".to_string()),
                    cos_input_info: Some(CosInputInfo {
                        bucket: Some("test-125".to_string()),
                        region: Some("ap-guangzhou".to_string()),
                        object: Some("/mps-test/test.mov".to_string()),
                    }),
                    ..Default::default()
                }),
                start_time_offset: Some(60.0),
                end_time_offset: Some(120.0),
            }]),
            output_storage: Some(TaskOutputStorage {
                r#type: Some("COS".to_string()),
                cos_output_storage: Some(CosOutputStorage {
                    bucket: Some("test-125".to_string()),
                    region: Some("ap-guangzhou".to_string()),
                }),
                s3_output_storage: None,
            }),
            output_object_path: Some("/output".to_string()),
            ..Default::default()
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "FileInfos": [{
                    "InputInfo": {
                        "Type": "COS",
                        "CosInputInfo": {"Bucket": "test-125", "Region": "ap-guangzhou", "Object": "/mps-test/test.mov"}
                    },
                    "StartTimeOffset": 60.0,
                    "EndTimeOffset": 120.0
                }],
                "OutputStorage": {"Type": "COS", "CosOutputStorage": {"Bucket": "test-125", "Region": "ap-guangzhou"}},
                "OutputObjectPath": "/output"
            })
        );
    }

    #[test]
    fn tasks_page_without_scroll_token_is_last() {
        let response: DescribeTasksResponse = serde_json::from_value(json!({
            "TaskSet": [{"TaskId": "t-1", "TaskType": "EditMediaTask", "SubTaskTypes": []}],
            "RequestId": "r"
        }))
        .unwrap();
        assert!(response.scroll_token.is_none());
        assert_eq!(response.task_set.unwrap()[0].task_id.as_deref(), Some("t-1"));
    }
}
