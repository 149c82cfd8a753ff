//! In-memory content graph, owned by a single actor task.

pub mod actor;
pub mod error;

pub use actor::*;
pub use error::*;

use crate::clients::ContentClient;
use crate::model::Resource;

/// Creates a content actor seeded with `resources` and its client.
///
/// Seeding happens before the actor runs, so the store is complete by the
/// time the first request arrives.
pub fn new(resources: impl IntoIterator<Item = Resource>) -> Result<(ContentActor, ContentClient), ContentError> {
    let (mut actor, client) = ContentActor::new(32);
    for resource in resources {
        actor.seed(resource)?;
    }
    Ok((actor, client))
}
