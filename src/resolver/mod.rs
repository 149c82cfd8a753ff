//! # Path Resolver
//!
//! Turns a model path into a concrete [`Resource`].
//!
//! Classification is pure (see [`path`]); this module performs the lookups
//! and enforces readability. An existing page or file the acting identity may
//! not read fails exactly like a missing one, so callers cannot probe for
//! hidden content.

pub mod path;

use tracing::{debug, warn};

use crate::clients::{ContentGraph, IdentityProvider, Lookup};
use crate::framework::{ApiError, BoxFuture, RequestContext};
use crate::lifecycle::ApiConfig;
use crate::model::Resource;
use path::PathTarget;

/// Resolves paths against the content graph on behalf of one request.
pub struct PathResolver<'a> {
    content: &'a dyn ContentGraph,
    identity: &'a dyn IdentityProvider,
    config: &'a ApiConfig,
}

impl<'a> PathResolver<'a> {
    pub fn new(
        content: &'a dyn ContentGraph,
        identity: &'a dyn IdentityProvider,
        config: &'a ApiConfig,
    ) -> Self {
        Self {
            content,
            identity,
            config,
        }
    }

    /// Resolves `path` to a resource.
    ///
    /// Fails with [`ApiError::InvalidKind`] when the path's kind selector is
    /// unknown and with [`ApiError::NotFound`] when the addressed resource is
    /// absent or unreadable. File paths resolve their parent first; a parent
    /// failure is returned as is.
    pub fn resolve<'b>(
        &'b self,
        path: &'b str,
        request: &'b RequestContext,
    ) -> BoxFuture<'b, Result<Resource, ApiError>> {
        Box::pin(async move {
            let target = path::classify(path)?;
            debug!(path, kind = %target.kind(), "Resolving");

            match target {
                PathTarget::Site => self.site().await,
                PathTarget::Account => self.account(request).await,
                PathTarget::Page { id } => self.find_page(&id, request).await,
                PathTarget::File { parent, filename } => {
                    let parent = self.resolve(&parent, request).await?;
                    self.find_file(&parent, &filename, request).await
                }
                PathTarget::User { id } => self.user(Some(&id), request).await,
            }
        })
    }

    pub async fn site(&self) -> Result<Resource, ApiError> {
        self.content
            .find(Lookup::Site)
            .await?
            .ok_or_else(|| ApiError::undefined("site"))
    }

    /// The acting identity as an `Account` resource.
    pub async fn account(&self, request: &RequestContext) -> Result<Resource, ApiError> {
        self.identity
            .current_identity(request, self.config.allow_impersonation)
            .await?
            .map(Resource::Account)
            .ok_or_else(|| {
                warn!("No acting identity");
                ApiError::undefined("account")
            })
    }

    /// Looks up a page by id; `+` in the id stands for `/`.
    pub async fn page(&self, id: &str, request: &RequestContext) -> Result<Resource, ApiError> {
        self.find_page(&id.replace('+', "/"), request).await
    }

    /// Looks up `filename` (percent-encoded) on the model at `parent_path`.
    pub async fn file(
        &self,
        parent_path: &str,
        filename: &str,
        request: &RequestContext,
    ) -> Result<Resource, ApiError> {
        let filename = path::percent_decode(filename);
        let parent = self.resolve(parent_path, request).await?;
        self.find_file(&parent, &filename, request).await
    }

    /// Looks up a user by id, or the acting identity when `id` is `None`.
    pub async fn user(&self, id: Option<&str>, request: &RequestContext) -> Result<Resource, ApiError> {
        let Some(id) = id else {
            return self
                .identity
                .current_identity(request, self.config.allow_impersonation)
                .await?
                .map(Resource::User)
                .ok_or_else(|| ApiError::undefined("user"));
        };

        match self.content.find(Lookup::User { id }).await? {
            Some(user) => Ok(user),
            None => {
                warn!(id, "User not found");
                Err(ApiError::user_not_found(id))
            }
        }
    }

    async fn find_page(&self, id: &str, request: &RequestContext) -> Result<Resource, ApiError> {
        let page = self.content.find(Lookup::Page { id }).await?;
        self.readable(page, request)
            .await
            .ok_or_else(|| {
                warn!(id, "Page not found");
                ApiError::page_not_found(id)
            })
    }

    async fn find_file(
        &self,
        parent: &Resource,
        filename: &str,
        request: &RequestContext,
    ) -> Result<Resource, ApiError> {
        let file = self.content.find(Lookup::File { parent, filename }).await?;
        self.readable(file, request)
            .await
            .ok_or_else(|| {
                warn!(parent = %parent.key(), filename, "File not found");
                ApiError::file_not_found(filename)
            })
    }

    /// Absence and unreadability collapse into `None`.
    async fn readable(&self, resource: Option<Resource>, request: &RequestContext) -> Option<Resource> {
        let resource = resource?;
        if self.content.is_readable(&resource, request.identity()).await {
            Some(resource)
        } else {
            None
        }
    }
}
