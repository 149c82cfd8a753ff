#![allow(dead_code)]

use serde_json::{json, Map, Value};
use std::sync::Arc;

use content_api::clients::{Blueprints, SessionIdentity};
use content_api::framework::{Method, RequestContext};
use content_api::lifecycle::{Api, ApiConfig};
use content_api::model::{File, Page, PageStatus, Resource, ResourceKey, Site, User, Visibility};

pub const TOKEN: &str = "t0k3n";

pub const BLUEPRINTS: &str = r#"{
    "pages/album": [
        { "name": "title", "type": "text" },
        { "name": "gallery", "type": "structure", "fields": [
            { "name": "caption", "type": "text" },
            { "name": "credits", "type": "object", "fields": [
                { "name": "author", "type": "text" }
            ]}
        ]},
        { "name": "meta", "type": "object", "fields": [
            { "name": "seo", "type": "object", "fields": [
                { "name": "keywords", "type": "text" }
            ]}
        ]}
    ],
    "files/image": [
        { "name": "alt", "type": "text" }
    ],
    "users/editor": [
        { "name": "bio", "type": "textarea" }
    ]
}"#;

pub fn map(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

pub fn editor() -> User {
    User::new("editor", "editor@example.com", "editor")
        .with_language("de")
        .with_content(map(json!({ "bio": "Writes things" })))
}

pub fn admin() -> User {
    User::new("kirby", "kirby@example.com", "admin").with_language("fr")
}

pub fn resources() -> Vec<Resource> {
    let album = Page::new("blog/post-1", "album", PageStatus::Listed).with_content(map(json!({
        "title": "Trips",
        "gallery": [
            { "caption": "Harbour", "credits": { "author": "Ana" } },
            { "caption": "Ridge", "credits": { "author": "Ben" } },
            { "caption": "Dune", "credits": { "author": "Cy" } }
        ],
        "meta": { "seo": { "keywords": "boats" } }
    })));

    vec![
        Resource::Site(Site {
            title: "Test site".into(),
            content: map(json!({ "title": "Test site" })),
        }),
        Resource::Page(Page::new("blog", "default", PageStatus::Listed)),
        Resource::Page(album),
        Resource::Page(Page::new("blog/draft", "album", PageStatus::Draft)),
        Resource::Page(Page::new("x", "default", PageStatus::Listed)),
        Resource::File(File::new(ResourceKey::page("x"), "my file.jpg").with_template("image")),
        Resource::File(
            File::new(ResourceKey::page("blog/post-1"), "cover.png")
                .with_template("image")
                .with_content(map(json!({ "alt": "A boat" }))),
        ),
        Resource::File(
            File::new(ResourceKey::page("blog/draft"), "cover.png").with_visibility(Visibility::Restricted),
        ),
        Resource::File(File::new(ResourceKey::Site, "logo.svg")),
        Resource::File(File::new(ResourceKey::page("x"), "secret.png").with_visibility(Visibility::Restricted)),
        Resource::File(File::new(ResourceKey::user("editor"), "avatar.jpg").with_template("image")),
        Resource::User(editor()),
    ]
}

pub fn api_with(config: ApiConfig) -> Api {
    let (actor, content) = content_api::content_actor::new(resources()).unwrap();
    tokio::spawn(actor.run());

    let forms = Blueprints::from_json_str(BLUEPRINTS).unwrap();
    let identity = SessionIdentity::new()
        .with_session(TOKEN, editor())
        .impersonate(admin());

    Api::new(config, Arc::new(content), Arc::new(forms), Arc::new(identity)).unwrap()
}

pub fn api() -> Api {
    api_with(ApiConfig::default())
}

pub fn get(path: &str) -> RequestContext {
    RequestContext::new(path, Method::Get)
}

pub fn signed_in(path: &str) -> RequestContext {
    get(path).with_header("Authorization", format!("Bearer {TOKEN}"))
}
