//! # Field Dispatcher
//!
//! Walks a [`FieldChain`] through nested forms and routes the remaining path
//! into the target field's private route table.
//!
//! Composite fields form an implicit tree. The walk does not know field
//! types; it only asks each field for its nested form and its routes. A
//! field route may itself dispatch into the field's nested form, so dispatch
//! recurses to whatever depth the tree has, bounded by
//! [`ApiConfig::max_field_depth`](crate::lifecycle::ApiConfig).

pub mod chain;

pub use chain::*;

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info_span, warn, Instrument};

use crate::clients::FormRegistry;
use crate::framework::{route_call, ApiError, DataBag, DispatchContext};
use crate::lifecycle::Api;
use crate::model::{Field, Form, Resource};

/// Data bag key the target field is stored under.
pub const FIELD_KEY: &str = "field";

pub struct FieldDispatcher<'a> {
    forms: &'a dyn FormRegistry,
    max_depth: usize,
}

impl<'a> FieldDispatcher<'a> {
    pub fn new(forms: &'a dyn FormRegistry, max_depth: usize) -> Self {
        Self { forms, max_depth }
    }

    /// Dispatches `remaining_path` to the field `chain` addresses on `resource`.
    pub async fn dispatch(
        &self,
        api: &Api,
        resource: &Resource,
        chain: &FieldChain,
        remaining_path: &str,
        ctx: &DispatchContext<'_, Api>,
    ) -> Result<Value, ApiError> {
        let form = self.forms.form_for(resource, ctx.request()).await?;
        self.dispatch_form(api, form, chain, remaining_path, ctx).await
    }

    /// Same as [`dispatch`](Self::dispatch), starting from an already built form.
    pub async fn dispatch_form(
        &self,
        api: &Api,
        form: Form,
        chain: &FieldChain,
        remaining_path: &str,
        ctx: &DispatchContext<'_, Api>,
    ) -> Result<Value, ApiError> {
        if ctx.depth() >= self.max_depth {
            warn!(chain = chain.raw(), depth = ctx.depth(), "Field nesting too deep");
            return Err(ApiError::DepthExceeded(self.max_depth));
        }

        let field = Self::walk(form, chain)?;
        let data = DataBag::new().with(FIELD_KEY, Arc::clone(&field));
        let nested = ctx.narrow(field.routes(), remaining_path, &data);

        let span = info_span!("field_api", chain = chain.raw(), depth = nested.depth());
        route_call(api, &nested).instrument(span).await
    }

    /// Resolves `chain` against `form`, strictly left to right.
    ///
    /// Performs one lookup per name and stops at the first miss. A field that
    /// has no nested form while names remain fails with the whole chain.
    pub fn walk(form: Form, chain: &FieldChain) -> Result<Arc<Field>, ApiError> {
        let mut form = form;
        let mut names = chain.names().iter().peekable();

        while let Some(name) = names.next() {
            let field = form.get(name).ok_or_else(|| {
                debug!(chain = chain.raw(), name = %name, "Field not found");
                ApiError::field_not_found(name)
            })?;

            if names.peek().is_none() {
                return Ok(field);
            }

            form = field.form().cloned().ok_or_else(|| {
                debug!(chain = chain.raw(), name = %name, "Field has no nested form");
                ApiError::field_not_found(chain.raw())
            })?;
        }

        Err(ApiError::field_not_found(chain.raw()))
    }
}
