mod common;

mod adaptive_dynamic_streaming_template_test;
mod data_sources_test;
mod flow_test;
mod operations_test;
mod schedule_test;
mod stream_link_members_test;
mod templates_test;
