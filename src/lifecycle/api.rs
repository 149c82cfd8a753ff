use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};

use super::{routes, ApiConfig};
use crate::clients::{ContentGraph, FormRegistry, IdentityProvider};
use crate::fields::{FieldChain, FieldDispatcher};
use crate::framework::{route_call, ApiError, DispatchContext, Method, Payload, RequestContext, Response, RouteTable};
use crate::model::Resource;
use crate::resolver::PathResolver;

/// The call orchestrator.
///
/// Owns the top-level route table and the collaborators every route needs.
/// An `Api` holds no per-call state: each call builds its own context, so one
/// instance serves any number of concurrent calls.
///
/// # Example
///
/// ```ignore
/// let api = Api::new(ApiConfig::default(), content, forms, identity)?;
/// let page = api.call("pages/blog", Method::Get, Payload::new()).await?;
/// ```
pub struct Api {
    config: ApiConfig,
    content: Arc<dyn ContentGraph>,
    forms: Arc<dyn FormRegistry>,
    identity: Arc<dyn IdentityProvider>,
    routes: RouteTable<Api>,
}

impl Api {
    /// Creates an API with the default model and field routes registered.
    pub fn new(
        config: ApiConfig,
        content: Arc<dyn ContentGraph>,
        forms: Arc<dyn FormRegistry>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self, ApiError> {
        config.validate()?;
        let routes = routes::default_routes()?;
        info!(routes = routes.len(), "API initialized");

        Ok(Self {
            config,
            content,
            forms,
            identity,
            routes,
        })
    }

    /// Appends routes after the defaults and before the kind guard. Earlier
    /// routes still win.
    pub fn register_routes(&mut self, routes: RouteTable<Api>) -> &mut Self {
        self.routes.register_routes(routes);
        self
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn routes(&self) -> &RouteTable<Api> {
        &self.routes
    }

    pub fn resolver(&self) -> PathResolver<'_> {
        PathResolver::new(self.content.as_ref(), self.identity.as_ref(), &self.config)
    }

    pub fn fields(&self) -> FieldDispatcher<'_> {
        FieldDispatcher::new(self.forms.as_ref(), self.config.max_field_depth)
    }

    /// Resolves the model a field route hangs off.
    pub async fn parent(&self, path: &str, request: &RequestContext) -> Result<Resource, ApiError> {
        self.resolver().resolve(path, request).await
    }

    /// Dispatches `path` to the field addressed by the raw `chain` on `resource`.
    pub async fn field_api(
        &self,
        resource: &Resource,
        chain: &str,
        path: &str,
        ctx: &DispatchContext<'_, Api>,
    ) -> Result<Value, ApiError> {
        let chain = FieldChain::parse(chain)?;
        self.fields().dispatch(self, resource, &chain, path, ctx).await
    }

    /// Runs one call and returns the matched route's data.
    pub async fn call(&self, path: &str, method: Method, payload: Payload) -> Result<Value, ApiError> {
        self.handle(RequestContext::new(path, method).with_payload(payload))
            .await
    }

    /// Runs one call from a fully described request.
    pub async fn handle(&self, request: RequestContext) -> Result<Value, ApiError> {
        let span = info_span!("api_call", path = request.path(), method = %request.method());
        async move {
            debug!(?request, "call received");
            let call = Call::new(request).contextualize(self).await?;
            let result = call.dispatch(self).await;
            match &result {
                Ok(_) => info!("Call ok"),
                Err(e) => warn!(key = e.key(), status = e.status_code(), "Call failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Like [`handle`](Self::handle), rendered into a response envelope.
    pub async fn respond(&self, request: RequestContext) -> Response {
        self.handle(request).await.into()
    }
}

// =============================================================================
// CALL STATES
// =============================================================================

/// A request that has not been contextualized yet.
pub struct Initialized;

/// A request carrying its language, identity and translation.
pub struct Contextualized;

/// One call moving through its states. Only a contextualized call can be
/// dispatched.
pub struct Call<State> {
    request: RequestContext,
    _state: State,
}

impl Call<Initialized> {
    pub fn new(request: RequestContext) -> Self {
        Self {
            request,
            _state: Initialized,
        }
    }

    /// Sets the requested language first, then the acting identity and its
    /// preferred translation.
    pub async fn contextualize(self, api: &Api) -> Result<Call<Contextualized>, ApiError> {
        let language = api.identity.requested_language(&self.request);
        let request = self.request.with_language(language);

        let identity = api
            .identity
            .current_identity(&request, api.config.allow_impersonation)
            .await?;
        let translation = identity.as_ref().and_then(|user| user.language.clone());
        debug!(
            identity = identity.as_ref().map(|u| u.id.as_str()),
            language = request.language(),
            translation = translation.as_deref(),
            "Contextualized"
        );

        Ok(Call {
            request: request.with_identity(identity).with_translation(translation),
            _state: Contextualized,
        })
    }
}

impl Call<Contextualized> {
    pub fn request(&self) -> &RequestContext {
        &self.request
    }

    pub async fn dispatch(self, api: &Api) -> Result<Value, ApiError> {
        let ctx = DispatchContext::root(&self.request, &api.routes);
        route_call(api, &ctx).await
    }
}
