//! Route node definitions.
//!
//! # Responsibilities
//! - Represent one navigable unit and its ordered children
//! - Carry display and behavior hints (title, icon, roles, caching)
//! - Provide a builder for compiled-in catalogs and catalog files
//!
//! # Design Decisions
//! - Nodes are immutable once built and shared via `Arc`
//! - Building never fails; structure is checked when nodes form a catalog
//! - The catch-all is a plain node whose path is `*`

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Path of the catch-all fallback node.
pub const CATCH_ALL: &str = "*";

/// An opaque permission tag.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    pub fn new(role: impl Into<String>) -> Self {
        Self(role.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Role {
    fn from(role: &str) -> Self {
        Self::new(role)
    }
}

impl From<String> for Role {
    fn from(role: String) -> Self {
        Self(role)
    }
}

/// Set of roles held by a viewer or required by a node.
pub type RoleSet = BTreeSet<Role>;

/// Build a role set from anything string-like.
pub fn roles<I, S>(items: I) -> RoleSet
where
    I: IntoIterator<Item = S>,
    S: Into<Role>,
{
    items.into_iter().map(Into::into).collect()
}

/// Whether a node shows up in generated menus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Visible,
    /// Reachable by direct path, never listed in a menu.
    Hidden,
}

/// Display and behavior hints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Meta {
    pub title: Option<String>,
    pub icon: Option<String>,
    /// Empty means unrestricted.
    pub roles: RoleSet,
    /// Excluded from keep-alive caching.
    pub no_cache: bool,
    /// Listed in breadcrumbs.
    pub breadcrumb: bool,
    /// Show the root menu entry even with a single visible child.
    pub always_show_root: bool,
    /// Menu entry to highlight instead of this node's own path.
    pub active_menu: Option<String>,
}

impl Default for Meta {
    fn default() -> Self {
        Self {
            title: None,
            icon: None,
            roles: RoleSet::new(),
            no_cache: false,
            breadcrumb: true,
            always_show_root: false,
            active_menu: None,
        }
    }
}

impl Meta {
    /// Meta with only a title set.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Role>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    pub fn no_cache(mut self) -> Self {
        self.no_cache = true;
        self
    }

    pub fn without_breadcrumb(mut self) -> Self {
        self.breadcrumb = false;
        self
    }

    pub fn always_show_root(mut self) -> Self {
        self.always_show_root = true;
        self
    }

    pub fn active_menu(mut self, path: impl Into<String>) -> Self {
        self.active_menu = Some(path.into());
        self
    }

    /// True when a viewer holding `held` may see a node carrying this meta.
    pub fn permits(&self, held: &RoleSet) -> bool {
        self.roles.is_empty() || self.roles.iter().any(|r| held.contains(r))
    }
}

/// What to render when a node is matched. The tokens are opaque to the router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "token", rename_all = "lowercase")]
pub enum ContentRef {
    /// A frame wrapping child content; never content on its own.
    Layout(String),
    /// A page with content of its own.
    View(String),
}

impl ContentRef {
    pub fn view(token: impl Into<String>) -> Self {
        Self::View(token.into())
    }

    pub fn layout() -> Self {
        Self::Layout("layout".to_string())
    }

    pub fn is_independent(&self) -> bool {
        matches!(self, Self::View(_))
    }
}

/// Redirect behavior of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Redirect {
    /// Forward visits to this path (absolute, or relative to the parent).
    To(String),
    /// Do not forward; the breadcrumb entry is not a link.
    NoRedirect,
}

impl Redirect {
    /// Marker used by catalog files for [`Redirect::NoRedirect`].
    pub const NO_REDIRECT: &'static str = "noRedirect";

    pub fn parse(value: &str) -> Self {
        if value == Self::NO_REDIRECT {
            Self::NoRedirect
        } else {
            Self::To(value.to_string())
        }
    }

    pub fn target(&self) -> Option<&str> {
        match self {
            Self::To(path) => Some(path),
            Self::NoRedirect => None,
        }
    }
}

/// One entry in the navigation hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteNode {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Arc<RouteNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<Redirect>,
    pub visibility: Visibility,
    pub meta: Meta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<ContentRef>,
}

impl RouteNode {
    pub fn builder(path: impl Into<String>) -> RouteNodeBuilder {
        RouteNodeBuilder::new(path)
    }

    /// The catch-all node: hidden, redirecting unmatched paths to `target`.
    pub fn catch_all(target: impl Into<String>) -> Arc<Self> {
        Self::builder(CATCH_ALL).redirect(target).hidden().build()
    }

    /// `*`, or any spelling that matches everything such as `/*`.
    pub fn is_catch_all(&self) -> bool {
        matches_everything(&self.path)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_hidden(&self) -> bool {
        self.visibility == Visibility::Hidden
    }

    /// Paths with a URL scheme point outside the application.
    pub fn is_external(&self) -> bool {
        is_external(&self.path)
    }

    pub fn has_independent_content(&self) -> bool {
        self.content.as_ref().is_some_and(ContentRef::is_independent)
    }

    pub fn title(&self) -> Option<&str> {
        self.meta.title.as_deref()
    }

    /// Copy of this node with its children replaced.
    pub fn with_children(&self, children: Vec<Arc<RouteNode>>) -> Self {
        Self {
            children,
            ..self.clone()
        }
    }
}

/// Effective path of a node whose parent's effective path is `parent`.
pub fn join_path(parent: Option<&str>, path: &str) -> String {
    match parent {
        _ if path.starts_with('/') || path == CATCH_ALL => path.to_string(),
        None => format!("/{path}"),
        Some(parent) if path.is_empty() => parent.to_string(),
        Some(parent) => format!("{}/{}", parent.trim_end_matches('/'), path),
    }
}

/// True when the only segment of `path` is the wildcard.
pub fn matches_everything(path: &str) -> bool {
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    segments.next() == Some(CATCH_ALL) && segments.next().is_none()
}

/// True for `https://...`, `mailto:...` and similar.
pub fn is_external(path: &str) -> bool {
    match path.split_once(':') {
        Some((scheme, _)) => {
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
                && scheme.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        }
        None => false,
    }
}

/// Builder for [`RouteNode`].
#[derive(Debug, Clone)]
pub struct RouteNodeBuilder {
    node: RouteNode,
}

impl RouteNodeBuilder {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            node: RouteNode {
                path: path.into(),
                name: None,
                children: Vec::new(),
                redirect: None,
                visibility: Visibility::Visible,
                meta: Meta::default(),
                content: None,
            },
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.node.name = Some(name.into());
        self
    }

    pub fn redirect(mut self, target: impl Into<String>) -> Self {
        self.node.redirect = Some(Redirect::To(target.into()));
        self
    }

    pub fn no_redirect(mut self) -> Self {
        self.node.redirect = Some(Redirect::NoRedirect);
        self
    }

    pub fn redirect_spec(mut self, redirect: Option<Redirect>) -> Self {
        self.node.redirect = redirect;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.node.visibility = Visibility::Hidden;
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.node.visibility = visibility;
        self
    }

    pub fn meta(mut self, meta: Meta) -> Self {
        self.node.meta = meta;
        self
    }

    pub fn layout(mut self) -> Self {
        self.node.content = Some(ContentRef::layout());
        self
    }

    pub fn view(mut self, token: impl Into<String>) -> Self {
        self.node.content = Some(ContentRef::view(token));
        self
    }

    pub fn content(mut self, content: Option<ContentRef>) -> Self {
        self.node.content = content;
        self
    }

    pub fn child(mut self, child: Arc<RouteNode>) -> Self {
        self.node.children.push(child);
        self
    }

    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = Arc<RouteNode>>,
    {
        self.node.children.extend(children);
        self
    }

    pub fn build(self) -> Arc<RouteNode> {
        Arc::new(self.node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_permits() {
        let open = Meta::titled("Dashboard");
        let admin = Meta::titled("Admin").roles(["admin"]);

        assert!(open.permits(&RoleSet::new()));
        assert!(!admin.permits(&roles(["viewer"])));
        assert!(admin.permits(&roles(["viewer", "admin"])));
    }

    #[test]
    fn test_external_paths() {
        assert!(is_external("https://example.com/#/"));
        assert!(is_external("mailto:ops@example.com"));
        assert!(!is_external("/dashboard"));
        assert!(!is_external("menu1-2"));
        assert!(!is_external(":id"));
    }

    #[test]
    fn test_redirect_marker() {
        assert_eq!(Redirect::parse("noRedirect"), Redirect::NoRedirect);
        assert_eq!(Redirect::parse("/404").target(), Some("/404"));
    }

    #[test]
    fn test_builder() {
        let node = RouteNode::builder("/form")
            .layout()
            .child(
                RouteNode::builder("index")
                    .name("Form")
                    .view("form/index")
                    .meta(Meta::titled("Form").icon("form"))
                    .build(),
            )
            .build();

        assert!(!node.is_leaf());
        assert!(!node.has_independent_content());
        assert!(node.children[0].has_independent_content());
        assert_eq!(node.children[0].title(), Some("Form"));
        assert!(RouteNode::catch_all("/404").is_catch_all());
        assert!(RouteNode::catch_all("/404").is_hidden());
        assert!(RouteNode::builder("/*").build().is_catch_all());
        assert!(!RouteNode::builder("/files/*").build().is_catch_all());
    }
}
