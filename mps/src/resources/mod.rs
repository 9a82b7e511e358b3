//! Resource implementations

pub(crate) mod common;

pub mod adaptive_dynamic_streaming_template;
pub mod ai_recognition_template;
pub mod content_review_template;
pub mod edit_media_operation;
pub mod execute_function_operation;
pub mod flow;
pub mod input;
pub mod manage_task_operation;
pub mod output;
pub mod schedule;
pub mod start_flow_operation;
pub mod transcode_template;
pub mod watermark_template;

pub use adaptive_dynamic_streaming_template::AdaptiveDynamicStreamingTemplateResource;
pub use ai_recognition_template::AiRecognitionTemplateResource;
pub use content_review_template::ContentReviewTemplateResource;
pub use edit_media_operation::EditMediaOperationResource;
pub use execute_function_operation::ExecuteFunctionOperationResource;
pub use flow::FlowResource;
pub use input::InputResource;
pub use manage_task_operation::ManageTaskOperationResource;
pub use output::OutputResource;
pub use schedule::ScheduleResource;
pub use start_flow_operation::StartFlowOperationResource;
pub use transcode_template::TranscodeTemplateResource;
pub use watermark_template::WatermarkTemplateResource;
