//! Protocol buffer types for Terraform Plugin Protocol 6
//!
//! Generated at build time by tonic-build from `proto/tfplugin6.proto`.
//! Several messages share names with framework types (`DynamicValue`,
//! `Diagnostic`, `Schema`), so refer to these through the `proto::` prefix.

include!(concat!(env!("OUT_DIR"), "/tfplugin6.rs"));

pub use provider_server::{Provider as ProviderService, ProviderServer};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_types_accessible() {
        let _ = diagnostic::Severity::Warning;
        let _ = attribute_path::step::Selector::ElementKeyInt(0);
        let _ = schema::nested_block::NestingMode::List;
    }

    #[test]
    fn stop_response_error_field() {
        let response = stop_provider::Response {
            error: "stopped".to_string(),
        };
        assert_eq!(response.error, "stopped");
    }
}
