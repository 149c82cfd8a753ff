use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

use crate::content_actor::{ContentError, ContentRequest};
use crate::framework::ApiError;
use crate::model::{PageStatus, Resource, ResourceKey, User, Visibility};

/// One lookup against the content graph.
#[derive(Debug, Clone, Copy)]
pub enum Lookup<'a> {
    Site,
    Page { id: &'a str },
    File { parent: &'a Resource, filename: &'a str },
    User { id: &'a str },
}

impl Lookup<'_> {
    pub fn key(&self) -> ResourceKey {
        match self {
            Lookup::Site => ResourceKey::Site,
            Lookup::Page { id } => ResourceKey::page(*id),
            Lookup::File { parent, filename } => ResourceKey::file(Self::owner_key(parent), *filename),
            Lookup::User { id } => ResourceKey::user(*id),
        }
    }

    /// Files of the acting identity are stored under its user key.
    fn owner_key(parent: &Resource) -> ResourceKey {
        match parent {
            Resource::Account(user) => ResourceKey::user(user.id.as_str()),
            other => other.key(),
        }
    }
}

/// Read access to the content graph.
///
/// Implementations own storage and any caching; the resolver only asks
/// "what is at this key" and "may this identity see it".
#[async_trait]
pub trait ContentGraph: Send + Sync {
    /// Returns the resource for `lookup`, or `None` when nothing is stored there.
    async fn find(&self, lookup: Lookup<'_>) -> Result<Option<Resource>, ApiError>;

    /// Whether `identity` may currently read `resource`. Only consulted for pages and files.
    async fn is_readable(&self, resource: &Resource, identity: Option<&User>) -> bool;
}

/// Client for the in-memory content actor.
#[derive(Clone)]
pub struct ContentClient {
    sender: mpsc::Sender<ContentRequest>,
}

impl ContentClient {
    pub fn new(sender: mpsc::Sender<ContentRequest>) -> Self {
        Self { sender }
    }

    #[instrument(skip(self))]
    pub async fn get(&self, key: ResourceKey) -> Result<Option<Resource>, ContentError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ContentRequest::Get { key, respond_to })
            .await
            .map_err(|_| ContentError::ActorClosed)?;
        response.await.map_err(|_| ContentError::ActorDropped)?
    }

    #[instrument(skip(self, resource), fields(key = %resource.key()))]
    pub async fn insert(&self, resource: Resource) -> Result<ResourceKey, ContentError> {
        debug!("Sending request");
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ContentRequest::Insert {
                resource,
                respond_to,
            })
            .await
            .map_err(|_| ContentError::ActorClosed)?;
        response.await.map_err(|_| ContentError::ActorDropped)?
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, key: ResourceKey) -> Result<(), ContentError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ContentRequest::Remove { key, respond_to })
            .await
            .map_err(|_| ContentError::ActorClosed)?;
        response.await.map_err(|_| ContentError::ActorDropped)?
    }
}

#[async_trait]
impl ContentGraph for ContentClient {
    async fn find(&self, lookup: Lookup<'_>) -> Result<Option<Resource>, ApiError> {
        self.get(lookup.key())
            .await
            .map_err(|e| ApiError::Storage(e.to_string()))
    }

    async fn is_readable(&self, resource: &Resource, identity: Option<&User>) -> bool {
        let signed_in = identity.is_some();
        match resource {
            Resource::Page(page) => page.status != PageStatus::Draft || signed_in,
            Resource::File(file) => file.visibility == Visibility::Public || signed_in,
            Resource::Site(_) | Resource::User(_) | Resource::Account(_) => true,
        }
    }
}
