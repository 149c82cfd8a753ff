use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::debug;

use crate::framework::{ApiError, DispatchContext, RequestContext, Route, RouteArgs, RouteHandler, RouteTable};
use crate::fields::{FieldChain, FIELD_KEY};
use crate::lifecycle::Api;
use crate::model::{Field, FieldRoutes, Form, Resource};

/// Builds the form a resource exposes for one request.
#[async_trait]
pub trait FormRegistry: Send + Sync {
    async fn form_for(&self, resource: &Resource, request: &RequestContext) -> Result<Form, ApiError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Textarea,
    Number,
    Toggle,
    /// A list of rows sharing one nested form.
    Structure,
    /// A single row with a nested form.
    Object,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Number => "number",
            FieldType::Toggle => "toggle",
            FieldType::Structure => "structure",
            FieldType::Object => "object",
        }
    }
}

/// Declarative field definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldBlueprint {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub fields: Vec<FieldBlueprint>,
}

impl FieldBlueprint {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            fields: Vec::new(),
        }
    }

    pub fn with_fields(mut self, fields: Vec<FieldBlueprint>) -> Self {
        self.fields = fields;
        self
    }
}

/// Blueprint-driven form registry.
///
/// Blueprints are keyed by [`Resource::blueprint`] (`site`, `pages/<template>`,
/// `files/<template>`, `users/<role>`). A resource without a blueprint gets an
/// empty form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Blueprints {
    #[serde(flatten)]
    blueprints: HashMap<String, Vec<FieldBlueprint>>,
}

impl Blueprints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, fields: Vec<FieldBlueprint>) -> Self {
        self.blueprints.insert(name.into(), fields);
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self, ApiError> {
        serde_json::from_str(json).map_err(|e| ApiError::Config(format!("blueprints: {e}")))
    }

    fn build_form(fields: &[FieldBlueprint], values: Option<&serde_json::Map<String, Value>>) -> Result<Form, ApiError> {
        let mut form = Form::new();
        for blueprint in fields {
            let value = values
                .and_then(|v| v.get(&blueprint.name))
                .cloned()
                .unwrap_or(Value::Null);
            form.push(Self::build_field(blueprint, value)?);
        }
        Ok(form)
    }

    fn build_field(blueprint: &FieldBlueprint, value: Value) -> Result<Field, ApiError> {
        let routes = field_routes()?;
        let name = &blueprint.name;
        let field_type = blueprint.field_type.as_str();

        let field = match blueprint.field_type {
            FieldType::Structure => {
                let nested = Self::build_form(&blueprint.fields, None)?;
                Field::new(name, field_type, value)
                    .with_form(nested)
                    .with_routes(routes.structure.clone())
            }
            FieldType::Object => {
                let nested = Self::build_form(&blueprint.fields, value.as_object())?;
                Field::new(name, field_type, value)
                    .with_form(nested)
                    .with_routes(routes.object.clone())
            }
            _ => Field::new(name, field_type, value).with_routes(routes.plain.clone()),
        };

        Ok(field)
    }
}

/// Route tables shared by every field of a type. Built once; cloning only
/// bumps handler reference counts.
struct FieldRouteSet {
    plain: FieldRoutes,
    structure: FieldRoutes,
    object: FieldRoutes,
}

impl FieldRouteSet {
    fn build() -> Result<Self, ApiError> {
        let mut plain: FieldRoutes = RouteTable::new();
        plain.register(Route::get("", FieldProps)?);

        let mut structure = plain.clone();
        structure
            .register(Route::get("items", StructureItems)?)
            .register(Route::get("items/(:num)", StructureItem)?)
            .register(Route::any("fields/(:any)/(:all?)", NestedFields)?);

        let mut object = plain.clone();
        object.register(Route::any("fields/(:any)/(:all?)", NestedFields)?);

        Ok(Self {
            plain,
            structure,
            object,
        })
    }
}

fn field_routes() -> Result<&'static FieldRouteSet, ApiError> {
    static ROUTES: OnceLock<Result<FieldRouteSet, ApiError>> = OnceLock::new();
    ROUTES.get_or_init(FieldRouteSet::build).as_ref().map_err(Clone::clone)
}

#[async_trait]
impl FormRegistry for Blueprints {
    async fn form_for(&self, resource: &Resource, _request: &RequestContext) -> Result<Form, ApiError> {
        let name = resource.blueprint();
        let fields = self.blueprints.get(&name).map(Vec::as_slice).unwrap_or(&[]);
        debug!(blueprint = %name, fields = fields.len(), "Building form");
        Self::build_form(fields, Some(resource.content()))
    }
}

// =============================================================================
// FIELD ROUTES
// =============================================================================

fn target_field(ctx: &DispatchContext<'_, Api>) -> Result<std::sync::Arc<Field>, ApiError> {
    ctx.data()
        .get::<Field>(FIELD_KEY)
        .ok_or_else(|| ApiError::Handler("no field in dispatch context".into()))
}

fn rows(field: &Field) -> &[Value] {
    field.value().as_array().map(Vec::as_slice).unwrap_or(&[])
}

/// `GET ""`: the field's own properties.
struct FieldProps;

#[async_trait]
impl RouteHandler<Api> for FieldProps {
    async fn handle(&self, _api: &Api, ctx: &DispatchContext<'_, Api>, _args: &RouteArgs) -> Result<Value, ApiError> {
        Ok(target_field(ctx)?.to_json())
    }
}

/// `GET items`: paginated structure rows, `?page=` is 1-based.
struct StructureItems;

#[async_trait]
impl RouteHandler<Api> for StructureItems {
    async fn handle(&self, api: &Api, ctx: &DispatchContext<'_, Api>, _args: &RouteArgs) -> Result<Value, ApiError> {
        let field = target_field(ctx)?;
        let rows = rows(&field);

        let request = ctx.request();
        let page = request
            .query("page")
            .and_then(|p| p.parse::<usize>().ok())
            .filter(|p| *p > 0)
            .unwrap_or(1);
        let limit = request
            .query("limit")
            .and_then(|l| l.parse::<usize>().ok())
            .filter(|l| *l > 0)
            .unwrap_or(api.config().default_limit);

        let items: Vec<Value> = rows
            .iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .cloned()
            .collect();

        Ok(json!({
            "data": items,
            "pagination": {
                "page": page,
                "limit": limit,
                "total": rows.len(),
            },
        }))
    }
}

/// `GET items/(:num)`: one structure row by zero-based index.
struct StructureItem;

#[async_trait]
impl RouteHandler<Api> for StructureItem {
    async fn handle(&self, _api: &Api, ctx: &DispatchContext<'_, Api>, args: &RouteArgs) -> Result<Value, ApiError> {
        let field = target_field(ctx)?;
        let index = args.get(0);
        index
            .parse::<usize>()
            .ok()
            .and_then(|i| rows(&field).get(i).cloned())
            .ok_or_else(|| {
                ApiError::not_found(
                    "field.item.notFound",
                    format!("The item \"{index}\" of field \"{}\" could not be found", field.name()),
                    [("name", field.name()), ("index", index)],
                )
            })
    }
}

/// `fields/<chain>/<rest>`: dispatches into the field's own nested form.
struct NestedFields;

#[async_trait]
impl RouteHandler<Api> for NestedFields {
    async fn handle(&self, api: &Api, ctx: &DispatchContext<'_, Api>, args: &RouteArgs) -> Result<Value, ApiError> {
        let field = target_field(ctx)?;
        let chain = FieldChain::parse(args.get(0))?;
        let form = field
            .form()
            .cloned()
            .ok_or_else(|| ApiError::field_not_found(chain.raw()))?;
        api.fields().dispatch_form(api, form, &chain, args.get(1), ctx).await
    }
}
