//! gRPC service implementation of Terraform Plugin Protocol 6
//!
//! Resources and data sources are created on demand from the provider's
//! factories for every call and configured with the provider data captured
//! in ConfigureProvider, so no lock is held while a handler runs.

use crate::context::Context;
use crate::data_source::{
    ConfigureDataSourceRequest, DataSourceSchemaRequest, DataSourceWithConfigure,
    ReadDataSourceRequest, ValidateDataSourceConfigRequest,
};
use crate::plan::plan_resource_change;
use crate::proto;
use crate::provider::{
    ConfigureProviderRequest, DataSourceFactory, Provider, ProviderSchemaRequest, ResourceFactory,
};
use crate::resource::{
    ConfigureResourceRequest, CreateResourceRequest, DeleteResourceRequest,
    ImportResourceStateRequest, ReadResourceRequest, ResourceSchemaRequest,
    ResourceWithConfigure, UpdateResourceRequest, ValidateResourceConfigRequest,
};
use crate::schema::{Block, NestingMode, Schema, StringKind};
use crate::types::{
    has_errors, AttributePath, AttributePathStep, ClientCapabilities, Diagnostic,
    DiagnosticSeverity, DynamicValue,
};
use crate::validator::validate_config;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{OnceCell, RwLock};
use tonic::{Request, Response, Status};

type ProviderData = Option<Arc<dyn Any + Send + Sync>>;

/// Cloud APIs echo server-side defaults for arguments left unset. With the
/// legacy flag Terraform reports such drift after apply as a warning instead
/// of failing the run.
const LEGACY_TYPE_SYSTEM: bool = true;

struct Schemas {
    provider: Schema,
    resources: HashMap<String, Schema>,
    data_sources: HashMap<String, Schema>,
}

pub struct GrpcProviderServer<P: Provider> {
    provider: Arc<RwLock<P>>,
    provider_data: Arc<RwLock<ProviderData>>,
    resource_factories: HashMap<String, ResourceFactory>,
    data_source_factories: HashMap<String, DataSourceFactory>,
    schemas: OnceCell<Schemas>,
}

impl<P: Provider + 'static> GrpcProviderServer<P> {
    pub fn new(provider: P) -> Self {
        let resource_factories = provider.resources();
        let data_source_factories = provider.data_sources();
        Self {
            provider: Arc::new(RwLock::new(provider)),
            provider_data: Arc::new(RwLock::new(None)),
            resource_factories,
            data_source_factories,
            schemas: OnceCell::new(),
        }
    }

    async fn schemas(&self) -> &Schemas {
        self.schemas
            .get_or_init(|| async {
                let ctx = Context::new();
                let provider = self.provider.read().await;
                let provider_schema = provider
                    .schema(ctx.clone(), ProviderSchemaRequest)
                    .await
                    .schema;
                drop(provider);

                let mut resources = HashMap::new();
                for (name, factory) in &self.resource_factories {
                    let resource = factory();
                    let response = resource.schema(ctx.clone(), ResourceSchemaRequest).await;
                    resources.insert(name.clone(), response.schema);
                }

                let mut data_sources = HashMap::new();
                for (name, factory) in &self.data_source_factories {
                    let data_source = factory();
                    let response = data_source
                        .schema(ctx.clone(), DataSourceSchemaRequest)
                        .await;
                    data_sources.insert(name.clone(), response.schema);
                }

                Schemas {
                    provider: provider_schema,
                    resources,
                    data_sources,
                }
            })
            .await
    }

    async fn resource_schema(&self, type_name: &str) -> Result<&Schema, Status> {
        self.schemas()
            .await
            .resources
            .get(type_name)
            .ok_or_else(|| Status::not_found(format!("unknown resource type: {}", type_name)))
    }

    async fn data_source_schema(&self, type_name: &str) -> Result<&Schema, Status> {
        self.schemas()
            .await
            .data_sources
            .get(type_name)
            .ok_or_else(|| Status::not_found(format!("unknown data source type: {}", type_name)))
    }

    /// Instantiates and configures a resource. Configure diagnostics are
    /// returned alongside so that callers can report them.
    async fn configured_resource(
        &self,
        ctx: &Context,
        type_name: &str,
    ) -> Result<(Box<dyn ResourceWithConfigure>, Vec<Diagnostic>), Status> {
        let factory = self
            .resource_factories
            .get(type_name)
            .ok_or_else(|| Status::not_found(format!("unknown resource type: {}", type_name)))?;
        let mut resource = factory();
        let provider_data = self.provider_data.read().await.clone();
        let response = resource
            .configure(ctx.clone(), ConfigureResourceRequest { provider_data })
            .await;
        Ok((resource, response.diagnostics))
    }

    async fn configured_data_source(
        &self,
        ctx: &Context,
        type_name: &str,
    ) -> Result<(Box<dyn DataSourceWithConfigure>, Vec<Diagnostic>), Status> {
        let factory = self.data_source_factories.get(type_name).ok_or_else(|| {
            Status::not_found(format!("unknown data source type: {}", type_name))
        })?;
        let mut data_source = factory();
        let provider_data = self.provider_data.read().await.clone();
        let response = data_source
            .configure(ctx.clone(), ConfigureDataSourceRequest { provider_data })
            .await;
        Ok((data_source, response.diagnostics))
    }
}

#[tonic::async_trait]
impl<P: Provider + 'static> proto::provider_server::Provider for GrpcProviderServer<P> {
    async fn get_metadata(
        &self,
        _request: Request<proto::get_metadata::Request>,
    ) -> Result<Response<proto::get_metadata::Response>, Status> {
        let mut resources: Vec<_> = self.resource_factories.keys().cloned().collect();
        resources.sort();
        let mut data_sources: Vec<_> = self.data_source_factories.keys().cloned().collect();
        data_sources.sort();

        Ok(Response::new(proto::get_metadata::Response {
            server_capabilities: Some(server_capabilities()),
            diagnostics: vec![],
            data_sources: data_sources
                .into_iter()
                .map(|type_name| proto::get_metadata::DataSourceMetadata { type_name })
                .collect(),
            resources: resources
                .into_iter()
                .map(|type_name| proto::get_metadata::ResourceMetadata { type_name })
                .collect(),
        }))
    }

    async fn get_provider_schema(
        &self,
        _request: Request<proto::get_provider_schema::Request>,
    ) -> Result<Response<proto::get_provider_schema::Response>, Status> {
        let schemas = self.schemas().await;

        Ok(Response::new(proto::get_provider_schema::Response {
            provider: Some(schema_to_proto(&schemas.provider)),
            resource_schemas: schemas
                .resources
                .iter()
                .map(|(name, schema)| (name.clone(), schema_to_proto(schema)))
                .collect(),
            data_source_schemas: schemas
                .data_sources
                .iter()
                .map(|(name, schema)| (name.clone(), schema_to_proto(schema)))
                .collect(),
            diagnostics: vec![],
            provider_meta: None,
            server_capabilities: Some(server_capabilities()),
        }))
    }

    async fn validate_provider_config(
        &self,
        request: Request<proto::validate_provider_config::Request>,
    ) -> Result<Response<proto::validate_provider_config::Response>, Status> {
        let req = request.into_inner();
        let config = decode_dynamic_value(req.config)?;
        let schemas = self.schemas().await;

        let diagnostics = validate_config(&schemas.provider.block, &config.value);

        Ok(Response::new(proto::validate_provider_config::Response {
            diagnostics: diagnostics_to_proto(diagnostics),
        }))
    }

    async fn validate_resource_config(
        &self,
        request: Request<proto::validate_resource_config::Request>,
    ) -> Result<Response<proto::validate_resource_config::Response>, Status> {
        let req = request.into_inner();
        let config = decode_dynamic_value(req.config)?;
        let schema = self.resource_schema(&req.type_name).await?;

        let mut diagnostics = validate_config(&schema.block, &config.value);

        let factory = self
            .resource_factories
            .get(&req.type_name)
            .ok_or_else(|| Status::not_found(req.type_name.clone()))?;
        let resource = factory();
        let response = resource
            .validate(
                Context::new(),
                ValidateResourceConfigRequest {
                    type_name: req.type_name,
                    config,
                    client_capabilities: client_capabilities(req.client_capabilities),
                },
            )
            .await;
        diagnostics.extend(response.diagnostics);

        Ok(Response::new(proto::validate_resource_config::Response {
            diagnostics: diagnostics_to_proto(diagnostics),
        }))
    }

    async fn validate_data_resource_config(
        &self,
        request: Request<proto::validate_data_resource_config::Request>,
    ) -> Result<Response<proto::validate_data_resource_config::Response>, Status> {
        let req = request.into_inner();
        let config = decode_dynamic_value(req.config)?;
        let schema = self.data_source_schema(&req.type_name).await?;

        let mut diagnostics = validate_config(&schema.block, &config.value);

        let factory = self
            .data_source_factories
            .get(&req.type_name)
            .ok_or_else(|| Status::not_found(req.type_name.clone()))?;
        let data_source = factory();
        let response = data_source
            .validate(
                Context::new(),
                ValidateDataSourceConfigRequest {
                    type_name: req.type_name,
                    config,
                },
            )
            .await;
        diagnostics.extend(response.diagnostics);

        Ok(Response::new(proto::validate_data_resource_config::Response {
            diagnostics: diagnostics_to_proto(diagnostics),
        }))
    }

    async fn upgrade_resource_state(
        &self,
        request: Request<proto::upgrade_resource_state::Request>,
    ) -> Result<Response<proto::upgrade_resource_state::Response>, Status> {
        let req = request.into_inner();
        let schema = self.resource_schema(&req.type_name).await?;

        if req.version > schema.version {
            let diag = Diagnostic::error(
                "Unsupported state version",
                format!(
                    "{} state version {} is newer than schema version {}",
                    req.type_name, req.version, schema.version
                ),
            );
            return Ok(Response::new(proto::upgrade_resource_state::Response {
                upgraded_state: None,
                diagnostics: diagnostics_to_proto(vec![diag]),
            }));
        }

        let raw = req.raw_state.map(|r| r.json).unwrap_or_default();
        let state = DynamicValue::decode_json(&raw)
            .map_err(|e| Status::invalid_argument(e.to_string()))?;
        let upgraded = DynamicValue::new(schema.block.conform(&state.value));

        Ok(Response::new(proto::upgrade_resource_state::Response {
            upgraded_state: Some(encode_dynamic_value(&upgraded)?),
            diagnostics: vec![],
        }))
    }

    async fn configure_provider(
        &self,
        request: Request<proto::configure_provider::Request>,
    ) -> Result<Response<proto::configure_provider::Response>, Status> {
        let req = request.into_inner();
        let config = decode_dynamic_value(req.config)?;
        let ctx = Context::new();

        tracing::debug!(
            "{} configure provider, terraform {}",
            ctx.log_id(),
            req.terraform_version
        );

        let response = {
            let mut provider = self.provider.write().await;
            provider
                .configure(
                    ctx,
                    ConfigureProviderRequest {
                        terraform_version: req.terraform_version,
                        config,
                        client_capabilities: client_capabilities(req.client_capabilities),
                    },
                )
                .await
        };

        if !has_errors(&response.diagnostics) {
            *self.provider_data.write().await = response.provider_data;
        }

        Ok(Response::new(proto::configure_provider::Response {
            diagnostics: diagnostics_to_proto(response.diagnostics),
        }))
    }

    async fn read_resource(
        &self,
        request: Request<proto::read_resource::Request>,
    ) -> Result<Response<proto::read_resource::Response>, Status> {
        let req = request.into_inner();
        let ctx = Context::new();
        let current_state = decode_dynamic_value(req.current_state)?;
        let schema = self.resource_schema(&req.type_name).await?;

        let (resource, mut diagnostics) = self.configured_resource(&ctx, &req.type_name).await?;
        if has_errors(&diagnostics) {
            return Ok(Response::new(proto::read_resource::Response {
                new_state: Some(encode_dynamic_value(&current_state)?),
                diagnostics: diagnostics_to_proto(diagnostics),
                private: req.private,
            }));
        }

        let response = resource
            .read(
                ctx,
                ReadResourceRequest {
                    type_name: req.type_name,
                    current_state,
                    private: req.private,
                    provider_meta: decode_optional(req.provider_meta)?,
                    client_capabilities: client_capabilities(req.client_capabilities),
                },
            )
            .await;
        diagnostics.extend(response.diagnostics);

        let new_state = match response.new_state {
            Some(state) => DynamicValue::new(schema.block.conform(&state.value)),
            None => DynamicValue::null(),
        };

        Ok(Response::new(proto::read_resource::Response {
            new_state: Some(encode_dynamic_value(&new_state)?),
            diagnostics: diagnostics_to_proto(diagnostics),
            private: response.private,
        }))
    }

    async fn plan_resource_change(
        &self,
        request: Request<proto::plan_resource_change::Request>,
    ) -> Result<Response<proto::plan_resource_change::Response>, Status> {
        let req = request.into_inner();
        let schema = self.resource_schema(&req.type_name).await?;

        let prior_state = decode_dynamic_value(req.prior_state)?;
        let proposed = decode_dynamic_value(req.proposed_new_state)?;
        let config = decode_dynamic_value(req.config)?;

        let change = plan_resource_change(schema, &prior_state, &proposed, &config);

        Ok(Response::new(proto::plan_resource_change::Response {
            planned_state: Some(encode_dynamic_value(&change.planned_state)?),
            requires_replace: change.requires_replace.iter().map(path_to_proto).collect(),
            planned_private: req.prior_private,
            diagnostics: diagnostics_to_proto(change.diagnostics),
            legacy_type_system: LEGACY_TYPE_SYSTEM,
        }))
    }

    async fn apply_resource_change(
        &self,
        request: Request<proto::apply_resource_change::Request>,
    ) -> Result<Response<proto::apply_resource_change::Response>, Status> {
        let req = request.into_inner();
        let ctx = Context::new();
        let schema = self.resource_schema(&req.type_name).await?;

        let prior_state = decode_dynamic_value(req.prior_state)?;
        let planned_state = decode_dynamic_value(req.planned_state)?;
        let config = decode_dynamic_value(req.config)?;
        let provider_meta = decode_optional(req.provider_meta)?;

        let (resource, mut diagnostics) = self.configured_resource(&ctx, &req.type_name).await?;
        if has_errors(&diagnostics) {
            return Ok(Response::new(proto::apply_resource_change::Response {
                new_state: Some(encode_dynamic_value(&prior_state)?),
                private: req.planned_private,
                diagnostics: diagnostics_to_proto(diagnostics),
                legacy_type_system: LEGACY_TYPE_SYSTEM,
            }));
        }

        let (new_state, private) = if planned_state.is_null() {
            let response = resource
                .delete(
                    ctx,
                    DeleteResourceRequest {
                        type_name: req.type_name,
                        prior_state: prior_state.clone(),
                        planned_private: req.planned_private.clone(),
                        provider_meta,
                    },
                )
                .await;
            let failed = has_errors(&response.diagnostics);
            diagnostics.extend(response.diagnostics);
            if failed {
                (prior_state, req.planned_private)
            } else {
                (DynamicValue::null(), vec![])
            }
        } else if prior_state.is_null() {
            let response = resource
                .create(
                    ctx,
                    CreateResourceRequest {
                        type_name: req.type_name,
                        planned_state,
                        config,
                        planned_private: req.planned_private,
                        provider_meta,
                    },
                )
                .await;
            diagnostics.extend(response.diagnostics);
            (response.new_state, response.private)
        } else {
            let response = resource
                .update(
                    ctx,
                    UpdateResourceRequest {
                        type_name: req.type_name,
                        prior_state: prior_state.clone(),
                        planned_state,
                        config,
                        planned_private: req.planned_private,
                        provider_meta,
                    },
                )
                .await;
            let failed = has_errors(&response.diagnostics);
            diagnostics.extend(response.diagnostics);
            if failed && response.new_state.is_null() {
                (prior_state, response.private)
            } else {
                (response.new_state, response.private)
            }
        };

        let new_state = if new_state.is_null() {
            new_state
        } else {
            DynamicValue::new(schema.block.conform(&new_state.value))
        };

        Ok(Response::new(proto::apply_resource_change::Response {
            new_state: Some(encode_dynamic_value(&new_state)?),
            private,
            diagnostics: diagnostics_to_proto(diagnostics),
            legacy_type_system: LEGACY_TYPE_SYSTEM,
        }))
    }

    async fn import_resource_state(
        &self,
        request: Request<proto::import_resource_state::Request>,
    ) -> Result<Response<proto::import_resource_state::Response>, Status> {
        let req = request.into_inner();
        let ctx = Context::new();
        let schema = self.resource_schema(&req.type_name).await?;

        let (resource, mut diagnostics) = self.configured_resource(&ctx, &req.type_name).await?;

        let Some(importable) = resource.as_importable() else {
            diagnostics.push(Diagnostic::error(
                "Resource Import Not Implemented",
                format!("{} does not support import", req.type_name),
            ));
            return Ok(Response::new(proto::import_resource_state::Response {
                imported_resources: vec![],
                diagnostics: diagnostics_to_proto(diagnostics),
            }));
        };

        let response = importable
            .import_state(
                ctx,
                ImportResourceStateRequest {
                    type_name: req.type_name,
                    id: req.id,
                    client_capabilities: client_capabilities(req.client_capabilities),
                },
            )
            .await;
        diagnostics.extend(response.diagnostics);

        let mut imported_resources = Vec::with_capacity(response.imported_resources.len());
        for imported in response.imported_resources {
            let state = DynamicValue::new(schema.block.conform(&imported.state.value));
            imported_resources.push(proto::import_resource_state::ImportedResource {
                type_name: imported.type_name,
                state: Some(encode_dynamic_value(&state)?),
                private: imported.private,
            });
        }

        Ok(Response::new(proto::import_resource_state::Response {
            imported_resources,
            diagnostics: diagnostics_to_proto(diagnostics),
        }))
    }

    async fn read_data_source(
        &self,
        request: Request<proto::read_data_source::Request>,
    ) -> Result<Response<proto::read_data_source::Response>, Status> {
        let req = request.into_inner();
        let ctx = Context::new();
        let schema = self.data_source_schema(&req.type_name).await?;
        let config = decode_dynamic_value(req.config)?;

        let (data_source, mut diagnostics) =
            self.configured_data_source(&ctx, &req.type_name).await?;
        if has_errors(&diagnostics) {
            return Ok(Response::new(proto::read_data_source::Response {
                state: None,
                diagnostics: diagnostics_to_proto(diagnostics),
            }));
        }

        let response = data_source
            .read(
                ctx,
                ReadDataSourceRequest {
                    type_name: req.type_name,
                    config,
                    provider_meta: decode_optional(req.provider_meta)?,
                    client_capabilities: client_capabilities(req.client_capabilities),
                },
            )
            .await;
        diagnostics.extend(response.diagnostics);

        let state = if response.state.is_null() {
            None
        } else {
            let conformed = DynamicValue::new(schema.block.conform(&response.state.value));
            Some(encode_dynamic_value(&conformed)?)
        };

        Ok(Response::new(proto::read_data_source::Response {
            state,
            diagnostics: diagnostics_to_proto(diagnostics),
        }))
    }

    async fn stop_provider(
        &self,
        _request: Request<proto::stop_provider::Request>,
    ) -> Result<Response<proto::stop_provider::Response>, Status> {
        tracing::info!("stop requested");
        Ok(Response::new(proto::stop_provider::Response {
            error: String::new(),
        }))
    }
}

// Helper functions

fn server_capabilities() -> proto::ServerCapabilities {
    proto::ServerCapabilities {
        plan_destroy: false,
        get_provider_schema_optional: false,
        move_resource_state: false,
    }
}

fn client_capabilities(caps: Option<proto::ClientCapabilities>) -> ClientCapabilities {
    caps.map(|c| ClientCapabilities {
        deferral_allowed: c.deferral_allowed,
        write_only_attributes_allowed: c.write_only_attributes_allowed,
    })
    .unwrap_or_default()
}

#[allow(clippy::result_large_err)]
fn decode_dynamic_value(value: Option<proto::DynamicValue>) -> Result<DynamicValue, Status> {
    let Some(value) = value else {
        return Ok(DynamicValue::null());
    };

    if !value.msgpack.is_empty() {
        DynamicValue::decode_msgpack(&value.msgpack)
            .map_err(|e| Status::invalid_argument(e.to_string()))
    } else {
        DynamicValue::decode_json(&value.json).map_err(|e| Status::invalid_argument(e.to_string()))
    }
}

#[allow(clippy::result_large_err)]
fn decode_optional(value: Option<proto::DynamicValue>) -> Result<Option<DynamicValue>, Status> {
    value.map(|v| decode_dynamic_value(Some(v))).transpose()
}

#[allow(clippy::result_large_err)]
fn encode_dynamic_value(value: &DynamicValue) -> Result<proto::DynamicValue, Status> {
    let msgpack = value
        .encode_msgpack()
        .map_err(|e| Status::internal(e.to_string()))?;
    Ok(proto::DynamicValue {
        msgpack,
        json: vec![],
    })
}

fn schema_to_proto(schema: &Schema) -> proto::Schema {
    proto::Schema {
        version: schema.version,
        block: Some(block_to_proto(&schema.block)),
    }
}

fn block_to_proto(block: &Block) -> proto::schema::Block {
    proto::schema::Block {
        version: block.version,
        attributes: block
            .attributes
            .iter()
            .map(|attr| proto::schema::Attribute {
                name: attr.name.clone(),
                r#type: attr.r#type.to_bytes(),
                description: attr.description.clone(),
                required: attr.required,
                optional: attr.optional,
                computed: attr.computed,
                sensitive: attr.sensitive,
                description_kind: proto::StringKind::Plain as i32,
                deprecated: attr.deprecated,
            })
            .collect(),
        block_types: block
            .block_types
            .iter()
            .map(|nested| proto::schema::NestedBlock {
                type_name: nested.type_name.clone(),
                block: Some(block_to_proto(&nested.block)),
                nesting: nesting_mode(nested.nesting) as i32,
                min_items: nested.min_items,
                max_items: nested.max_items,
            })
            .collect(),
        description: block.description.clone(),
        description_kind: string_kind(block.description_kind),
        deprecated: block.deprecated,
    }
}

fn string_kind(kind: StringKind) -> i32 {
    match kind {
        StringKind::Plain => proto::StringKind::Plain as i32,
        StringKind::Markdown => proto::StringKind::Markdown as i32,
    }
}

fn nesting_mode(mode: NestingMode) -> proto::schema::nested_block::NestingMode {
    use proto::schema::nested_block::NestingMode as P;
    match mode {
        NestingMode::Invalid => P::Invalid,
        NestingMode::Single => P::Single,
        NestingMode::List => P::List,
        NestingMode::Set => P::Set,
        NestingMode::Map => P::Map,
        NestingMode::Group => P::Group,
    }
}

fn path_to_proto(path: &AttributePath) -> proto::AttributePath {
    use proto::attribute_path::step::Selector;
    proto::AttributePath {
        steps: path
            .steps
            .iter()
            .map(|step| proto::attribute_path::Step {
                selector: Some(match step {
                    AttributePathStep::AttributeName(name) => Selector::AttributeName(name.clone()),
                    AttributePathStep::ElementKeyString(key) => {
                        Selector::ElementKeyString(key.clone())
                    }
                    AttributePathStep::ElementKeyInt(idx) => Selector::ElementKeyInt(*idx),
                }),
            })
            .collect(),
    }
}

fn diagnostics_to_proto(diagnostics: Vec<Diagnostic>) -> Vec<proto::Diagnostic> {
    diagnostics
        .into_iter()
        .map(|d| proto::Diagnostic {
            severity: match d.severity {
                DiagnosticSeverity::Invalid => proto::diagnostic::Severity::Invalid as i32,
                DiagnosticSeverity::Error => proto::diagnostic::Severity::Error as i32,
                DiagnosticSeverity::Warning => proto::diagnostic::Severity::Warning as i32,
            },
            summary: d.summary,
            detail: d.detail,
            attribute: d.attribute.as_ref().map(path_to_proto),
        })
        .collect()
}
