mod common;

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use content_api::framework::{ApiError, DispatchContext, Method, Payload, RequestContext, Route, RouteArgs, RouteHandler, RouteTable};
use content_api::lifecycle::{Api, ApiConfig};
use content_api::model::ResourceKey;

use common::{api, api_with, get, signed_in, TOKEN};

/// End-to-end: an unknown user id is a user.notFound naming the id.
#[tokio::test]
async fn test_missing_user_end_to_end() {
    let api = api();
    let err = api.call("users/42", Method::Get, Payload::new()).await.unwrap_err();
    assert_eq!(err, ApiError::user_not_found("42"));

    let response = api.respond(get("users/42")).await;
    assert_eq!(response.status, 404);
    assert_eq!(response.body["key"], "user.notFound");
    assert_eq!(response.body["data"], json!({ "name": "42" }));
}

/// End-to-end: a hidden parent short-circuits the file lookup.
#[tokio::test]
async fn test_file_of_hidden_page_reports_the_page() {
    let api = api();
    let err = api
        .call("pages/blog/draft/files/cover.png", Method::Get, Payload::new())
        .await
        .unwrap_err();
    assert_eq!(err.key(), "page.notFound");
    match err {
        ApiError::NotFound { data, .. } => assert_eq!(data.get("slug").map(String::as_str), Some("blog/draft")),
        other => panic!("unexpected error: {other:?}"),
    }

    // Signed in, both the draft and its restricted file are readable.
    let file = api.handle(signed_in("pages/blog/draft/files/cover.png")).await.unwrap();
    assert_eq!(file["filename"], "cover.png");
}

#[tokio::test]
async fn test_model_routes() {
    let api = api();

    let site = api.handle(get("site")).await.unwrap();
    assert_eq!(site["type"], "site");
    assert_eq!(site["title"], "Test site");

    let page = api.handle(get("pages/blog+post-1")).await.unwrap();
    assert_eq!(page["id"], "blog/post-1");

    let file = api.handle(get("pages/x/files/my%20file.jpg")).await.unwrap();
    assert_eq!(file["filename"], "my file.jpg");

    let user = api.handle(get("users/editor")).await.unwrap();
    assert_eq!(user["type"], "user");
    assert_eq!(user["email"], "editor@example.com");
}

#[tokio::test]
async fn test_unknown_kind_ignores_method_and_payload() {
    let api = api();
    let mut payload = Payload::new();
    payload.insert("title".into(), json!("x"));

    for method in Method::ALL {
        for path in ["widgets/1", "widgets/1/fields/title", "widgets/files/a.jpg"] {
            let request = RequestContext::new(path, method).with_payload(payload.clone());
            let err = api.handle(request).await.unwrap_err();
            assert!(matches!(err, ApiError::InvalidKind(_)), "{method} {path}: {err:?}");
            assert_eq!(err.status_code(), 400);
        }
    }
}

#[tokio::test]
async fn test_known_kind_with_wrong_method_is_route_not_found() {
    let api = api();
    let err = api.call("pages/blog", Method::Delete, Payload::new()).await.unwrap_err();
    assert_eq!(
        err,
        ApiError::RouteNotFound {
            path: "pages/blog".into(),
            method: "DELETE".into(),
        }
    );
}

#[tokio::test]
async fn test_account_route_and_impersonation() {
    let plain = api();
    let err = plain.call("account", Method::Get, Payload::new()).await.unwrap_err();
    assert_eq!(err.key(), "account.undefined");

    let account = plain.handle(signed_in("account")).await.unwrap();
    assert_eq!(account["type"], "account");
    assert_eq!(account["id"], "editor");

    let impersonating = api_with(ApiConfig {
        allow_impersonation: true,
        ..ApiConfig::default()
    });
    let account = impersonating.handle(get("account")).await.unwrap();
    assert_eq!(account["id"], "kirby");
}

#[tokio::test]
async fn test_account_files_are_the_users_files() {
    let api = api();

    let by_user = api.handle(get("users/editor/files/avatar.jpg")).await.unwrap();
    let by_account = api.handle(signed_in("account/files/avatar.jpg")).await.unwrap();
    assert_eq!(by_account, by_user);
    assert_eq!(by_account["filename"], "avatar.jpg");

    let err = api.handle(get("account/files/avatar.jpg")).await.unwrap_err();
    assert_eq!(err.key(), "account.undefined");
}

/// Reports what the call was contextualized with.
struct Whoami;

#[async_trait]
impl RouteHandler<Api> for Whoami {
    async fn handle(&self, _api: &Api, ctx: &DispatchContext<'_, Api>, _args: &RouteArgs) -> Result<Value, ApiError> {
        let request = ctx.request();
        Ok(json!({
            "identity": request.identity().map(|u| u.id.clone()),
            "language": request.language(),
            "translation": request.translation(),
        }))
    }
}

fn with_whoami(mut api: Api) -> Api {
    let mut routes = RouteTable::new();
    routes.register(Route::get("whoami", Whoami).unwrap());
    api.register_routes(routes);
    api
}

#[tokio::test]
async fn test_call_is_contextualized() {
    let api = with_whoami(api());

    let anonymous = api.handle(get("whoami").with_header("X-Language", "en")).await.unwrap();
    assert_eq!(anonymous, json!({ "identity": null, "language": "en", "translation": null }));

    let request = get("whoami")
        .with_query("language", "es")
        .with_header("X-Language", "en")
        .with_header("Authorization", format!("Bearer {TOKEN}"));
    let editor = api.handle(request).await.unwrap();
    assert_eq!(editor, json!({ "identity": "editor", "language": "es", "translation": "de" }));

    let impersonating = with_whoami(api_with(ApiConfig {
        allow_impersonation: true,
        ..ApiConfig::default()
    }));
    let admin = impersonating.handle(get("whoami")).await.unwrap();
    assert_eq!(admin["identity"], "kirby");
    assert_eq!(admin["translation"], "fr");
}

#[tokio::test]
async fn test_response_envelope() {
    let api = api();

    let ok = api.respond(get("pages/blog")).await;
    assert_eq!(ok.status, 200);
    assert_eq!(ok.body["status"], "ok");
    assert_eq!(ok.data().map(|d| d["id"].clone()), Some(json!("blog")));

    let err = api.respond(get("pages/nope")).await;
    assert_eq!(err.status, 404);
    assert_eq!(err.body["status"], "error");
    assert_eq!(err.body["message"], "The page \"nope\" cannot be found");
}

#[tokio::test]
async fn test_concurrent_calls_are_independent() {
    let api = Arc::new(api());

    let mut handles = Vec::new();
    for i in 0..32 {
        let api = Arc::clone(&api);
        handles.push(tokio::spawn(async move {
            let request = if i % 2 == 0 { get("pages/blog+draft") } else { signed_in("pages/blog+draft") };
            let hidden = api.handle(request).await;
            let page = api.resolver().resolve("pages/blog/post-1", &get("")).await;
            (i, hidden, page)
        }));
    }

    for handle in handles {
        let (i, hidden, page) = handle.await.unwrap();
        if i % 2 == 0 {
            assert_eq!(hidden.unwrap_err().key(), "page.notFound");
        } else {
            assert_eq!(hidden.unwrap()["id"], "blog/draft");
        }
        assert_eq!(page.unwrap().key(), ResourceKey::page("blog/post-1"));
    }
}
