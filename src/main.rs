//! Demo: seeds an in-memory content graph and runs a few calls against it.

use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, Instrument};

use content_api::clients::{Blueprints, SessionIdentity};
use content_api::framework::{Method, Payload, RequestContext};
use content_api::lifecycle::{setup_tracing, Api, ApiConfig};
use content_api::model::{File, Page, PageStatus, Resource, ResourceKey, Site, User, Visibility};

const BLUEPRINTS: &str = r#"{
    "pages/album": [
        { "name": "title", "type": "text" },
        { "name": "gallery", "type": "structure", "fields": [
            { "name": "caption", "type": "text" },
            { "name": "credits", "type": "object", "fields": [
                { "name": "author", "type": "text" }
            ]}
        ]}
    ],
    "files/image": [
        { "name": "alt", "type": "text" }
    ]
}"#;

fn content(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
    value.as_object().cloned().unwrap_or_default()
}

fn seed() -> Vec<Resource> {
    let trips = Page::new("blog/trips", "album", PageStatus::Listed).with_content(content(json!({
        "title": "Trips",
        "gallery": [
            { "caption": "Harbour", "credits": { "author": "Ana" } },
            { "caption": "Ridge", "credits": { "author": "Ben" } }
        ]
    })));
    let cover = File::new(ResourceKey::page("blog/trips"), "my cover.jpg")
        .with_template("image")
        .with_visibility(Visibility::Public)
        .with_content(content(json!({ "alt": "A boat" })));

    vec![
        Resource::Site(Site {
            title: "Demo".into(),
            content: content(json!({ "title": "Demo" })),
        }),
        Resource::Page(Page::new("blog", "default", PageStatus::Listed)),
        Resource::Page(trips),
        Resource::Page(Page::new("blog/secret", "default", PageStatus::Draft)),
        Resource::File(cover),
        Resource::User(User::new("ana", "ana@example.com", "editor").with_language("de")),
    ]
}

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();
    info!("Starting content API demo");

    let (actor, content) = content_api::content_actor::new(seed()).map_err(|e| e.to_string())?;
    let handle = tokio::spawn(actor.run());

    let forms = Blueprints::from_json_str(BLUEPRINTS).map_err(|e| e.to_string())?;
    let identity = SessionIdentity::new().with_session(
        "token-ana",
        User::new("ana", "ana@example.com", "editor").with_language("de"),
    );

    let api = Api::new(
        ApiConfig::default(),
        Arc::new(content),
        Arc::new(forms),
        Arc::new(identity),
    )
    .map_err(|e| e.to_string())?;

    let anonymous = [
        "site",
        "pages/blog+trips",
        "pages/blog/trips/files/my%20cover.jpg",
        "pages/blog+trips/fields/gallery/items",
        "pages/blog+trips/fields/gallery+credits+author",
        "pages/blog+secret",
        "widgets/1",
    ];

    for path in anonymous {
        let span = tracing::info_span!("demo_call", path);
        let response = async { api.respond(RequestContext::new(path, Method::Get)).await }
            .instrument(span)
            .await;
        info!(path, status = response.status, body = %response.body, "Response");
    }

    let request = RequestContext::new("pages/blog+secret", Method::Get)
        .with_header("Authorization", "Bearer token-ana");
    match api.handle(request).await {
        Ok(page) => info!(%page, "Signed-in caller sees the draft"),
        Err(e) => error!(error = %e, "Draft lookup failed"),
    }

    match api.call("account", Method::Get, Payload::new()).await {
        Ok(account) => info!(%account, "Account"),
        Err(e) => info!(error = %e, "No account without a session"),
    }

    drop(api);
    if let Err(e) = handle.await {
        error!("Content actor failed: {:?}", e);
        return Err(format!("Content actor failed: {:?}", e));
    }

    info!("Demo completed");
    Ok(())
}
