//! Forms and fields.
//!
//! A [`Form`] is the ordered, name-keyed field table a resource exposes for one
//! request. Forms are built fresh per request and never cached.
//!
//! A [`Field`] may carry two extra capabilities:
//! - a nested [`Form`] (composite fields such as structures), and
//! - a private route table, addressable once the field is the dispatch target.
//!
//! The dispatcher only cares about those two capabilities, never the field type.

use serde_json::{json, Value};
use std::sync::Arc;

use crate::framework::RouteTable;
use crate::lifecycle::Api;

/// Routes a field answers once it is the dispatch target.
pub type FieldRoutes = RouteTable<Api>;

#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    field_type: String,
    value: Value,
    form: Option<Form>,
    routes: FieldRoutes,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            value,
            form: None,
            routes: RouteTable::new(),
        }
    }

    pub fn with_form(mut self, form: Form) -> Self {
        self.form = Some(form);
        self
    }

    pub fn with_routes(mut self, routes: FieldRoutes) -> Self {
        self.routes = routes;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> &str {
        &self.field_type
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The nested form, for composite fields.
    pub fn form(&self) -> Option<&Form> {
        self.form.as_ref()
    }

    pub fn routes(&self) -> &FieldRoutes {
        &self.routes
    }

    pub fn to_json(&self) -> Value {
        json!({
            "name": self.name,
            "type": self.field_type,
            "value": self.value,
            "fields": self.form.as_ref().map(Form::names),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct Form {
    fields: Vec<Arc<Field>>,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field. A later field with the same name replaces the earlier one
    /// in place, keeping the original position.
    pub fn push(&mut self, field: Field) -> &mut Self {
        let field = Arc::new(field);
        match self.fields.iter_mut().find(|f| f.name() == field.name()) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
        self
    }

    pub fn with(mut self, field: Field) -> Self {
        self.push(field);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<Field>> {
        self.fields.iter().find(|f| f.name() == name).cloned()
    }

    pub fn fields(&self) -> &[Arc<Field>] {
        &self.fields
    }

    pub fn names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
