//! The top-level route table.
//!
//! Every model (`site`, `account`, `pages/<id>`, `users/<id>`) and every file
//! of a model is addressable directly and through `/fields/<chain>/<rest>`.
//! Registration order matters: file field routes come before model field
//! routes, and the catch-all page route comes after the other models. A final
//! guard answers every unmatched path, so an unknown kind selector fails as
//! an invalid kind whatever the method.

use async_trait::async_trait;
use serde_json::Value;

use super::Api;
use crate::framework::{ApiError, DispatchContext, Route, RouteArgs, RouteHandler, RouteTable};
use crate::resolver::path::{self, PathTarget};

/// Path patterns of the addressable models.
const MODELS: [&str; 4] = ["site", "account", "users/(:any)", "pages/(:all)"];

/// Builds the default table.
pub fn default_routes() -> Result<RouteTable<Api>, ApiError> {
    let mut table = RouteTable::new();

    for model in MODELS {
        let file = format!("{model}/files/(:any)");
        table.register(Route::any(
            &format!("{file}/fields/(:any)/(:all?)"),
            FieldRoute::new(&file),
        )?);
    }
    for model in MODELS {
        table.register(Route::any(
            &format!("{model}/fields/(:any)/(:all?)"),
            FieldRoute::new(model),
        )?);
    }
    for model in MODELS {
        table.register(Route::get(&format!("{model}/files/(:any)"), ModelRoute)?);
    }
    for model in MODELS {
        table.register(Route::get(model, ModelRoute)?);
    }
    table.fallback(Route::any("(:all?)", KindGuard)?);

    Ok(table)
}

/// Answers with the resolved model itself.
struct ModelRoute;

#[async_trait]
impl RouteHandler<Api> for ModelRoute {
    async fn handle(&self, api: &Api, ctx: &DispatchContext<'_, Api>, _args: &RouteArgs) -> Result<Value, ApiError> {
        let resource = api.parent(ctx.path(), ctx.request()).await?;
        Ok(resource.to_json())
    }
}

/// Resolves the model, then hands the rest of the path to a field.
struct FieldRoute {
    model: String,
    captures: usize,
}

impl FieldRoute {
    fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            captures: model.matches("(:").count(),
        }
    }
}

#[async_trait]
impl RouteHandler<Api> for FieldRoute {
    async fn handle(&self, api: &Api, ctx: &DispatchContext<'_, Api>, args: &RouteArgs) -> Result<Value, ApiError> {
        let model_path = fill(&self.model, &args.as_slice()[..self.captures.min(args.len())]);
        let resource = api.parent(&model_path, ctx.request()).await?;
        api.field_api(&resource, args.get(self.captures), args.get(self.captures + 1), ctx)
            .await
    }
}

/// Fallback for unmatched paths: rejects unknown kinds, otherwise reports
/// the route as missing.
struct KindGuard;

#[async_trait]
impl RouteHandler<Api> for KindGuard {
    async fn handle(&self, _api: &Api, ctx: &DispatchContext<'_, Api>, _args: &RouteArgs) -> Result<Value, ApiError> {
        let mut target = path::classify(ctx.path())?;
        while let PathTarget::File { parent, .. } = target {
            target = path::classify(&parent)?;
        }
        Err(ApiError::RouteNotFound {
            path: ctx.path().to_string(),
            method: ctx.method().to_string(),
        })
    }
}

/// Substitutes placeholders in `pattern` with `args`, in order.
fn fill(pattern: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut rest = pattern;
    let mut args = args.iter();

    while let Some(start) = rest.find("(:") {
        out.push_str(&rest[..start]);
        let end = rest[start..]
            .find(')')
            .map(|offset| start + offset + 1)
            .unwrap_or(rest.len());
        out.push_str(args.next().map(String::as_str).unwrap_or_default());
        rest = &rest[end..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::Method;

    #[test]
    fn test_fill_substitutes_in_order() {
        let args = vec!["blog/post-1".to_string(), "cover.png".to_string()];
        assert_eq!(fill("pages/(:all)/files/(:any)", &args), "pages/blog/post-1/files/cover.png");
        assert_eq!(fill("site", &[]), "site");
    }

    #[test]
    fn test_file_field_routes_win_over_page_field_routes() {
        let table = default_routes().unwrap();
        let (route, args) = table
            .find("pages/blog/files/cover.png/fields/caption", Method::Get)
            .unwrap();
        assert_eq!(route.pattern(), "pages/(:all)/files/(:any)/fields/(:any)/(:all?)");
        assert_eq!(args.as_slice(), ["blog", "cover.png", "caption", ""]);
    }

    #[test]
    fn test_page_route_is_the_catch_all() {
        let table = default_routes().unwrap();
        let (route, args) = table.find("pages/blog/post-1", Method::Get).unwrap();
        assert_eq!(route.pattern(), "pages/(:all)");
        assert_eq!(args.as_slice(), ["blog/post-1"]);

        let (route, _) = table.find("pages/blog", Method::Delete).unwrap();
        assert_eq!(route.pattern(), "(:all?)");
        let (route, _) = table.find("pages/blog/fields/text", Method::Delete).unwrap();
        assert_eq!(route.pattern(), "pages/(:all)/fields/(:any)/(:all?)");
    }
}
