//! Helpers shared by the list data sources

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::any::Any;
use std::sync::Arc;
use tfplug::data_source::{ConfigureDataSourceResponse, ReadDataSourceResponse};
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType, BlockBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};

use crate::provider_data::MpsProviderData;

pub(crate) fn id_attribute() -> Attribute {
    AttributeBuilder::new("id", AttributeType::String)
        .description("Hash of the ids in the result.")
        .computed()
        .build()
}

pub(crate) fn result_output_file_attribute() -> Attribute {
    AttributeBuilder::new("result_output_file", AttributeType::String)
        .description("Used to save results.")
        .optional()
        .build()
}

/// A computed list whose elements have the shape of `block`.
pub(crate) fn result_set_attribute(block: BlockBuilder) -> Attribute {
    let nested = block.build();
    AttributeBuilder::new(
        &nested.type_name,
        AttributeType::list(nested.block.object_type()),
    )
    .description(&nested.block.description)
    .computed()
    .build()
}

/// Stable data source id for a result, independent of filter values.
pub(crate) fn results_id<I, S>(ids: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut hasher = Sha256::new();
    for id in ids {
        hasher.update(id.as_ref().as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}

/// Writes `results` as pretty JSON to `path`.
pub(crate) async fn write_result_output_file<T: Serialize>(
    path: &str,
    results: &T,
) -> Result<(), Diagnostic> {
    let file_error = |detail: String| {
        Diagnostic::error("Failed to write result_output_file", detail)
            .with_attribute(AttributePath::new("result_output_file"))
    };

    let body = serde_json::to_vec_pretty(results).map_err(|e| file_error(e.to_string()))?;
    tokio::fs::write(path, body)
        .await
        .map_err(|e| file_error(format!("{}: {}", path, e)))
}

pub(crate) fn configure(
    provider_data: Option<Arc<dyn Any + Send + Sync>>,
    slot: &mut Option<MpsProviderData>,
) -> ConfigureDataSourceResponse {
    let mut diagnostics = vec![];

    match MpsProviderData::from_configure(provider_data, "data source") {
        Ok(data) => *slot = Some(data),
        Err(diag) => diagnostics.push(diag),
    }

    ConfigureDataSourceResponse { diagnostics }
}

pub(crate) fn read_failed(diagnostics: Vec<Diagnostic>) -> ReadDataSourceResponse {
    ReadDataSourceResponse {
        state: DynamicValue::null(),
        diagnostics,
    }
}
