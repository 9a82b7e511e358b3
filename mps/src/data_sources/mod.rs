//! Data source implementations

pub(crate) mod common;

pub mod adaptive_dynamic_streaming_templates;
pub mod content_review_templates;
pub mod schedules;
pub mod tasks;
pub mod transcode_templates;

pub use adaptive_dynamic_streaming_templates::AdaptiveDynamicStreamingTemplatesDataSource;
pub use content_review_templates::ContentReviewTemplatesDataSource;
pub use schedules::SchedulesDataSource;
pub use tasks::TasksDataSource;
pub use transcode_templates::TranscodeTemplatesDataSource;
