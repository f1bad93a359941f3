//! Shared builders for integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use route_tree::catalog::{build_static, default_catalog, StaticOptions};
use route_tree::routing::{MatcherOptions, Session};
use route_tree::tree::{roles, Meta, RouteNode};

/// Session over the compiled-in catalogs for `held` roles.
pub fn session(held: &[&str]) -> Arc<Session> {
    Arc::new(
        Session::start(
            build_static(&StaticOptions::default()).unwrap(),
            default_catalog().unwrap(),
            roles(held.iter().copied()),
            MatcherOptions::default(),
        )
        .unwrap(),
    )
}

/// `/404`, `/dashboard`, optionally `/admin`, then the catch-all.
pub fn roots(with_admin: bool) -> Vec<Arc<RouteNode>> {
    let mut roots = vec![
        RouteNode::builder("/404").view("error-page/404").hidden().build(),
        RouteNode::builder("/dashboard")
            .name("Dashboard")
            .view("dashboard/index")
            .meta(Meta::titled("Dashboard"))
            .build(),
    ];
    if with_admin {
        roots.push(
            RouteNode::builder("/admin")
                .name("Admin")
                .view("admin/index")
                .meta(Meta::titled("Admin").roles(["admin"]))
                .build(),
        );
    }
    roots.push(RouteNode::catch_all("/404"));
    roots
}

pub const NESTED_CATALOG: &str = r#"
[[route]]
key = "docs"
path = "/docs"
redirect = "/docs/intro"
component = "layout"
children = ["intro", "guide"]
name = "Docs"
meta = { title = "Docs", icon = "documentation" }

[[route]]
key = "intro"
path = "intro"
name = "DocsIntro"
component = "docs/intro"
meta = { title = "Intro" }

[[route]]
key = "guide"
path = "guide/:chapter"
name = "DocsGuide"
component = "docs/guide"
meta = { title = "Guide", roles = ["editor"] }
"#;
