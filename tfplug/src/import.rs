//! Import helpers for simplifying resource import implementations

use crate::context::Context;
use crate::resource::{ImportResourceStateRequest, ImportResourceStateResponse, ImportedResource};
use crate::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use std::collections::HashMap;

/// Sets the import ID to a specific attribute in state.
///
/// Terraform reads the resource right after importing, so for resources
/// whose identifier is the whole import ID this is all that is needed.
///
/// Example: ID "1234567" -> state.id = "1234567"
pub fn import_state_passthrough_id(
    ctx: &Context,
    attr_path: AttributePath,
    request: &ImportResourceStateRequest,
    response: &mut ImportResourceStateResponse,
) {
    if request.id.trim().is_empty() {
        response.diagnostics.push(
            Diagnostic::error(
                "Missing import ID",
                format!("{} requires a non-empty import ID", request.type_name),
            )
            .with_attribute(attr_path),
        );
        return;
    }

    let mut state = DynamicValue::new(Dynamic::Map(HashMap::new()));

    if let Err(e) = state.set_string(&attr_path, request.id.clone()) {
        response.diagnostics.push(
            Diagnostic::error(
                format!("Failed to set import ID: {}", e),
                format!("Could not set attribute '{}' to value '{}'", attr_path, request.id),
            )
            .with_attribute(attr_path),
        );
        return;
    }

    tracing::debug!(
        "{} import {} as {}",
        ctx.log_id(),
        request.type_name,
        request.id
    );

    response.imported_resources.push(ImportedResource {
        type_name: request.type_name.clone(),
        state,
        private: Vec::new(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ClientCapabilities;

    fn request(id: &str) -> ImportResourceStateRequest {
        ImportResourceStateRequest {
            type_name: "tencentcloud_mps_schedule".to_string(),
            id: id.to_string(),
            client_capabilities: ClientCapabilities::default(),
        }
    }

    fn empty_response() -> ImportResourceStateResponse {
        ImportResourceStateResponse {
            imported_resources: vec![],
            diagnostics: vec![],
        }
    }

    #[test]
    fn passthrough_sets_id() {
        let mut response = empty_response();
        import_state_passthrough_id(
            &Context::new(),
            AttributePath::new("id"),
            &request("28"),
            &mut response,
        );

        assert!(response.diagnostics.is_empty());
        assert_eq!(response.imported_resources.len(), 1);
        let state = &response.imported_resources[0].state;
        assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), "28");
    }

    #[test]
    fn empty_id_is_rejected() {
        let mut response = empty_response();
        import_state_passthrough_id(
            &Context::new(),
            AttributePath::new("id"),
            &request(" "),
            &mut response,
        );

        assert!(response.imported_resources.is_empty());
        assert_eq!(response.diagnostics.len(), 1);
    }
}
