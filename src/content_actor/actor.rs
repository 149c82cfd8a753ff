//! # Content Actor
//!
//! The reference content graph: one task owns every stored resource and
//! answers requests sent over a channel. Requests are processed sequentially,
//! so the store needs no locks.

use std::collections::HashMap;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use super::error::ContentError;
use crate::clients::ContentClient;
use crate::model::{Resource, ResourceKey};

/// Type alias for the one-shot response channel used by the actor.
pub type Response<T> = oneshot::Sender<Result<T, ContentError>>;

/// Messages the content actor understands.
#[derive(Debug)]
pub enum ContentRequest {
    Get {
        key: ResourceKey,
        respond_to: Response<Option<Resource>>,
    },
    Insert {
        resource: Resource,
        respond_to: Response<ResourceKey>,
    },
    Remove {
        key: ResourceKey,
        respond_to: Response<()>,
    },
}

/// Owns the content map and the receiving end of the channel.
pub struct ContentActor {
    receiver: mpsc::Receiver<ContentRequest>,
    store: HashMap<ResourceKey, Resource>,
}

impl ContentActor {
    pub fn new(buffer_size: usize) -> (Self, ContentClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
        };
        (actor, ContentClient::new(sender))
    }

    /// Stores `resource` directly, before the actor is running.
    pub fn seed(&mut self, resource: Resource) -> Result<ResourceKey, ContentError> {
        self.insert(resource)
    }

    fn insert(&mut self, resource: Resource) -> Result<ResourceKey, ContentError> {
        if let Resource::Account(user) = &resource {
            return Err(ContentError::NotStorable(user.id.clone()));
        }
        let key = resource.key();
        self.store.insert(key.clone(), resource);
        Ok(key)
    }

    /// Runs the actor's event loop, processing messages until every client is dropped.
    pub async fn run(mut self) {
        info!(size = self.store.len(), "Content actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ContentRequest::Get { key, respond_to } => {
                    let item = self.store.get(&key).cloned();
                    debug!(%key, found = item.is_some(), "Get");
                    let _ = respond_to.send(Ok(item));
                }
                ContentRequest::Insert {
                    resource,
                    respond_to,
                } => {
                    let result = self.insert(resource);
                    match &result {
                        Ok(key) => info!(%key, size = self.store.len(), "Inserted"),
                        Err(e) => warn!(error = %e, "Insert failed"),
                    }
                    let _ = respond_to.send(result);
                }
                ContentRequest::Remove { key, respond_to } => {
                    if self.store.remove(&key).is_some() {
                        info!(%key, size = self.store.len(), "Removed");
                        let _ = respond_to.send(Ok(()));
                    } else {
                        warn!(%key, "Not found");
                        let _ = respond_to.send(Err(ContentError::NotFound(key.to_string())));
                    }
                }
            }
        }

        info!(size = self.store.len(), "Content actor shutdown");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Page, PageStatus, Site, User};

    #[tokio::test]
    async fn test_seeded_store_serves_requests() {
        let (mut actor, client) = ContentActor::new(4);
        actor
            .seed(Resource::Site(Site {
                title: "Home".into(),
                ..Site::default()
            }))
            .unwrap();
        tokio::spawn(actor.run());

        let site = client.get(ResourceKey::Site).await.unwrap();
        assert!(matches!(site, Some(Resource::Site(s)) if s.title == "Home"));

        let page = Resource::Page(Page::new("a", "default", PageStatus::Listed));
        client.insert(page).await.unwrap();
        assert!(client.get(ResourceKey::page("a")).await.unwrap().is_some());

        let missing = client.remove(ResourceKey::page("b")).await;
        assert_eq!(missing, Err(ContentError::NotFound("pages/b".into())));
    }

    #[tokio::test]
    async fn test_accounts_are_not_storable() {
        let (mut actor, _client) = ContentActor::new(1);
        let account = Resource::Account(User::new("u1", "u@example.com", "admin"));
        assert_eq!(
            actor.seed(account),
            Err(ContentError::NotStorable("u1".into()))
        );
    }
}
