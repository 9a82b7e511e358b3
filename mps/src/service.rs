//! Lookups by id, deletes and paginated listings shared by the handlers

use std::future::Future;
use std::sync::Arc;
use tfplug::context::Context;

use crate::api::schedules::{DescribeSchedulesRequest, SchedulesInfo};
use crate::api::stream_link::{DeleteOutputRequest, FlowInfo, FlowInput, FlowOutput};
use crate::api::tasks::TaskDetail;
use crate::api::templates::{
    AdaptiveDynamicStreamingTemplate, AiRecognitionTemplate, ContentReviewTemplate,
    DescribeTemplatesRequest, TemplatePage, TranscodeTemplate, WatermarkTemplate,
};
use crate::api::{ApiError, Client};

/// Page size used when walking listings
pub const PAGE_LIMIT: i64 = 20;

#[derive(Clone)]
pub struct MpsService {
    client: Arc<Client>,
}

impl MpsService {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    pub async fn describe_adaptive_dynamic_streaming_template_by_id(
        &self,
        ctx: &Context,
        definition: i64,
    ) -> Result<Option<AdaptiveDynamicStreamingTemplate>, ApiError> {
        let page = self
            .client
            .describe_adaptive_dynamic_streaming_templates(
                ctx,
                &DescribeTemplatesRequest::by_id(definition),
            )
            .await?;
        Ok(page.items.into_iter().next())
    }

    pub async fn delete_adaptive_dynamic_streaming_template_by_id(
        &self,
        ctx: &Context,
        definition: i64,
    ) -> Result<(), ApiError> {
        self.client
            .delete_adaptive_dynamic_streaming_template(ctx, definition)
            .await
    }

    pub async fn describe_transcode_template_by_id(
        &self,
        ctx: &Context,
        definition: i64,
    ) -> Result<Option<TranscodeTemplate>, ApiError> {
        let page = self
            .client
            .describe_transcode_templates(ctx, &DescribeTemplatesRequest::by_id(definition))
            .await?;
        Ok(page.items.into_iter().next())
    }

    pub async fn delete_transcode_template_by_id(
        &self,
        ctx: &Context,
        definition: i64,
    ) -> Result<(), ApiError> {
        self.client.delete_transcode_template(ctx, definition).await
    }

    pub async fn describe_watermark_template_by_id(
        &self,
        ctx: &Context,
        definition: i64,
    ) -> Result<Option<WatermarkTemplate>, ApiError> {
        let page = self
            .client
            .describe_watermark_templates(ctx, &DescribeTemplatesRequest::by_id(definition))
            .await?;
        Ok(page.items.into_iter().next())
    }

    pub async fn delete_watermark_template_by_id(
        &self,
        ctx: &Context,
        definition: i64,
    ) -> Result<(), ApiError> {
        self.client.delete_watermark_template(ctx, definition).await
    }

    pub async fn describe_ai_recognition_template_by_id(
        &self,
        ctx: &Context,
        definition: i64,
    ) -> Result<Option<AiRecognitionTemplate>, ApiError> {
        let page = self
            .client
            .describe_ai_recognition_templates(ctx, &DescribeTemplatesRequest::by_id(definition))
            .await?;
        Ok(page.items.into_iter().next())
    }

    pub async fn delete_ai_recognition_template_by_id(
        &self,
        ctx: &Context,
        definition: i64,
    ) -> Result<(), ApiError> {
        self.client
            .delete_ai_recognition_template(ctx, definition)
            .await
    }

    pub async fn describe_content_review_template_by_id(
        &self,
        ctx: &Context,
        definition: i64,
    ) -> Result<Option<ContentReviewTemplate>, ApiError> {
        let page = self
            .client
            .describe_content_review_templates(ctx, &DescribeTemplatesRequest::by_id(definition))
            .await?;
        Ok(page.items.into_iter().next())
    }

    pub async fn delete_content_review_template_by_id(
        &self,
        ctx: &Context,
        definition: i64,
    ) -> Result<(), ApiError> {
        self.client
            .delete_content_review_template(ctx, definition)
            .await
    }

    /// Returns the matching templates and the total reported by MPS. Without
    /// an explicit `limit` every page is fetched.
    pub async fn describe_adaptive_dynamic_streaming_templates_by_filter(
        &self,
        ctx: &Context,
        filter: DescribeTemplatesRequest,
    ) -> Result<TemplatePage<AdaptiveDynamicStreamingTemplate>, ApiError> {
        collect_template_pages(filter, |request| async move {
            self.client
                .describe_adaptive_dynamic_streaming_templates(ctx, &request)
                .await
        })
        .await
    }

    pub async fn describe_transcode_templates_by_filter(
        &self,
        ctx: &Context,
        filter: DescribeTemplatesRequest,
    ) -> Result<TemplatePage<TranscodeTemplate>, ApiError> {
        collect_template_pages(filter, |request| async move {
            self.client.describe_transcode_templates(ctx, &request).await
        })
        .await
    }

    pub async fn describe_content_review_templates_by_filter(
        &self,
        ctx: &Context,
        filter: DescribeTemplatesRequest,
    ) -> Result<TemplatePage<ContentReviewTemplate>, ApiError> {
        collect_template_pages(filter, |request| async move {
            self.client
                .describe_content_review_templates(ctx, &request)
                .await
        })
        .await
    }

    pub async fn describe_schedule_by_id(
        &self,
        ctx: &Context,
        schedule_id: i64,
    ) -> Result<Option<SchedulesInfo>, ApiError> {
        let request = DescribeSchedulesRequest {
            schedule_ids: Some(vec![schedule_id]),
            ..Default::default()
        };
        let response = self.client.describe_schedules(ctx, &request).await?;
        Ok(response
            .schedule_info_set
            .unwrap_or_default()
            .into_iter()
            .next())
    }

    /// Walks every page of DescribeSchedules matching `filter`
    pub async fn describe_schedules_by_filter(
        &self,
        ctx: &Context,
        filter: DescribeSchedulesRequest,
    ) -> Result<Vec<SchedulesInfo>, ApiError> {
        let mut schedules = Vec::new();
        let mut offset = 0;

        loop {
            let request = DescribeSchedulesRequest {
                offset: Some(offset),
                limit: Some(PAGE_LIMIT),
                ..filter.clone()
            };
            let page = self
                .client
                .describe_schedules(ctx, &request)
                .await?
                .schedule_info_set
                .unwrap_or_default();
            let count = page.len() as i64;
            schedules.extend(page);
            if count < PAGE_LIMIT {
                break;
            }
            offset += count;
        }

        Ok(schedules)
    }

    pub async fn delete_schedule_by_id(
        &self,
        ctx: &Context,
        schedule_id: i64,
    ) -> Result<(), ApiError> {
        self.client.delete_schedule(ctx, schedule_id).await
    }

    pub async fn enable_schedule(&self, ctx: &Context, schedule_id: i64) -> Result<(), ApiError> {
        self.client.enable_schedule(ctx, schedule_id).await
    }

    pub async fn disable_schedule(&self, ctx: &Context, schedule_id: i64) -> Result<(), ApiError> {
        self.client.disable_schedule(ctx, schedule_id).await
    }

    /// `None` when the flow does not exist
    pub async fn describe_flow_by_id(
        &self,
        ctx: &Context,
        flow_id: &str,
    ) -> Result<Option<FlowInfo>, ApiError> {
        match self.client.describe_stream_link_flow(ctx, flow_id).await {
            Ok(info) => Ok(info),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn delete_flow_by_id(&self, ctx: &Context, flow_id: &str) -> Result<(), ApiError> {
        self.client.delete_stream_link_flow(ctx, flow_id).await
    }

    pub async fn describe_input_by_id(
        &self,
        ctx: &Context,
        flow_id: &str,
        input_id: &str,
    ) -> Result<Option<FlowInput>, ApiError> {
        let Some(flow) = self.describe_flow_by_id(ctx, flow_id).await? else {
            return Ok(None);
        };
        Ok(flow
            .input_group
            .unwrap_or_default()
            .into_iter()
            .find(|input| input.input_id.as_deref() == Some(input_id)))
    }

    pub async fn describe_output_by_id(
        &self,
        ctx: &Context,
        flow_id: &str,
        output_id: &str,
    ) -> Result<Option<FlowOutput>, ApiError> {
        let Some(flow) = self.describe_flow_by_id(ctx, flow_id).await? else {
            return Ok(None);
        };
        Ok(flow
            .output_group
            .unwrap_or_default()
            .into_iter()
            .find(|output| output.output_id.as_deref() == Some(output_id)))
    }

    pub async fn delete_output_by_id(
        &self,
        ctx: &Context,
        flow_id: &str,
        output_id: &str,
    ) -> Result<(), ApiError> {
        self.client
            .delete_stream_link_output(
                ctx,
                &DeleteOutputRequest {
                    flow_id: flow_id.to_string(),
                    output_id: output_id.to_string(),
                },
            )
            .await
    }

    /// `None` when MPS does not know the task
    pub async fn describe_task_detail_by_id(
        &self,
        ctx: &Context,
        task_id: &str,
    ) -> Result<Option<TaskDetail>, ApiError> {
        match self.client.describe_task_detail(ctx, task_id).await {
            Ok(detail) => Ok(Some(detail)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

async fn collect_template_pages<T, F, Fut>(
    filter: DescribeTemplatesRequest,
    mut fetch: F,
) -> Result<TemplatePage<T>, ApiError>
where
    F: FnMut(DescribeTemplatesRequest) -> Fut,
    Fut: Future<Output = Result<TemplatePage<T>, ApiError>>,
{
    if filter.limit.is_some() {
        return fetch(filter).await;
    }

    let mut result = TemplatePage {
        total_count: 0,
        items: Vec::new(),
    };
    let mut offset = filter.offset.unwrap_or(0);

    loop {
        let request = DescribeTemplatesRequest {
            offset: Some(offset),
            limit: Some(PAGE_LIMIT),
            ..filter.clone()
        };
        let page = fetch(request).await?;
        let count = page.items.len() as i64;
        result.total_count = page.total_count;
        result.items.extend(page.items);
        if count < PAGE_LIMIT {
            break;
        }
        offset += count;
    }

    Ok(result)
}
