//! Addressable content-graph entities.
//!
//! A [`Resource`] is one of five kinds. Four are stored by the content graph;
//! [`Resource::Account`] is an alias for whoever is acting on the request and
//! is never stored.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{self, Display};

use crate::resolver::path::percent_encode;

/// The five resource kinds a path can address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Site,
    Page,
    File,
    User,
    Account,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Site => "site",
            ResourceKind::Page => "page",
            ResourceKind::File => "file",
            ResourceKind::User => "user",
            ResourceKind::Account => "account",
        }
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The key a resource is re-looked-up by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ResourceKey {
    Site,
    Page { id: String },
    File { parent: Box<ResourceKey>, filename: String },
    User { id: String },
    Account { id: String },
}

impl ResourceKey {
    pub fn page(id: impl Into<String>) -> Self {
        ResourceKey::Page { id: id.into() }
    }

    pub fn user(id: impl Into<String>) -> Self {
        ResourceKey::User { id: id.into() }
    }

    pub fn file(parent: ResourceKey, filename: impl Into<String>) -> Self {
        ResourceKey::File {
            parent: Box::new(parent),
            filename: filename.into(),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceKey::Site => ResourceKind::Site,
            ResourceKey::Page { .. } => ResourceKind::Page,
            ResourceKey::File { .. } => ResourceKind::File,
            ResourceKey::User { .. } => ResourceKind::User,
            ResourceKey::Account { .. } => ResourceKind::Account,
        }
    }

    /// The canonical API path addressing this key.
    ///
    /// Page ids are written with `+` in place of `/`; filenames are percent-encoded.
    pub fn api_path(&self) -> String {
        match self {
            ResourceKey::Site => "site".to_string(),
            ResourceKey::Page { id } => format!("pages/{}", id.replace('/', "+")),
            ResourceKey::File { parent, filename } => {
                format!("{}/files/{}", parent.api_path(), percent_encode(filename))
            }
            ResourceKey::User { id } => format!("users/{id}"),
            ResourceKey::Account { .. } => "account".to_string(),
        }
    }
}

impl Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.api_path())
    }
}

/// The singleton root of the content graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub title: String,
    #[serde(default)]
    pub content: Map<String, Value>,
}

/// Publish state of a page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    #[default]
    Draft,
    Unlisted,
    Listed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Slash-delimited id; never starts or ends with `/`.
    pub id: String,
    pub template: String,
    pub status: PageStatus,
    #[serde(default)]
    pub content: Map<String, Value>,
}

impl Page {
    pub fn new(id: impl AsRef<str>, template: impl Into<String>, status: PageStatus) -> Self {
        Self {
            id: id.as_ref().trim_matches('/').to_string(),
            template: template.into(),
            status,
            content: Map::new(),
        }
    }

    pub fn with_content(mut self, content: Map<String, Value>) -> Self {
        self.content = content;
        self
    }
}

/// Whether a file is visible to anonymous callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Restricted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct File {
    pub parent: ResourceKey,
    pub filename: String,
    pub template: String,
    pub visibility: Visibility,
    #[serde(default)]
    pub content: Map<String, Value>,
}

impl File {
    pub fn new(parent: ResourceKey, filename: impl Into<String>) -> Self {
        Self {
            parent,
            filename: filename.into(),
            template: "default".to_string(),
            visibility: Visibility::Public,
            content: Map::new(),
        }
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_content(mut self, content: Map<String, Value>) -> Self {
        self.content = content;
        self
    }
}

/// A registered user. Also the shape of the acting identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub role: String,
    /// Preferred interface translation.
    pub language: Option<String>,
    #[serde(default)]
    pub content: Map<String, Value>,
}

impl User {
    pub fn new(id: impl Into<String>, email: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            role: role.into(),
            language: None,
            content: Map::new(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_content(mut self, content: Map<String, Value>) -> Self {
        self.content = content;
        self
    }
}

/// A resolved, addressable entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Resource {
    Site(Site),
    Page(Page),
    File(File),
    User(User),
    Account(User),
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::Site(_) => ResourceKind::Site,
            Resource::Page(_) => ResourceKind::Page,
            Resource::File(_) => ResourceKind::File,
            Resource::User(_) => ResourceKind::User,
            Resource::Account(_) => ResourceKind::Account,
        }
    }

    pub fn key(&self) -> ResourceKey {
        match self {
            Resource::Site(_) => ResourceKey::Site,
            Resource::Page(page) => ResourceKey::page(page.id.clone()),
            Resource::File(file) => ResourceKey::file(file.parent.clone(), file.filename.clone()),
            Resource::User(user) => ResourceKey::user(user.id.clone()),
            Resource::Account(user) => ResourceKey::Account {
                id: user.id.clone(),
            },
        }
    }

    /// Name of the blueprint the resource's form is built from.
    pub fn blueprint(&self) -> String {
        match self {
            Resource::Site(_) => "site".to_string(),
            Resource::Page(page) => format!("pages/{}", page.template),
            Resource::File(file) => format!("files/{}", file.template),
            Resource::User(user) | Resource::Account(user) => format!("users/{}", user.role),
        }
    }

    pub fn content(&self) -> &Map<String, Value> {
        match self {
            Resource::Site(site) => &site.content,
            Resource::Page(page) => &page.content,
            Resource::File(file) => &file.content,
            Resource::User(user) | Resource::Account(user) => &user.content,
        }
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
