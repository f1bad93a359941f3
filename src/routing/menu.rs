//! Navigation views derived from a forest or a match.
//!
//! # Responsibilities
//! - Sidebar menu: hidden nodes and the catch-all are left out, single visible
//!   children are promoted in place of their parent
//! - Breadcrumbs for a match
//! - Names of views eligible for keep-alive caching

use serde::Serialize;
use std::sync::Arc;

use crate::routing::matcher::MatchResult;
use crate::tree::node::{is_external, join_path};
use crate::tree::{Redirect, RouteForest, RouteNode};

/// One sidebar entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub path: String,
    pub external: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuItem>,
}

impl MenuItem {
    fn leaf(node: &RouteNode, path: String) -> Option<Self> {
        // entries without a title render nothing
        let title = node.meta.title.clone()?;
        Some(Self {
            name: node.name.clone(),
            title: Some(title),
            icon: node.meta.icon.clone(),
            external: is_external(&path),
            path,
            children: Vec::new(),
        })
    }
}

/// Sidebar menu for `forest`.
pub fn menu(forest: &RouteForest) -> Vec<MenuItem> {
    items(forest.roots(), None)
}

fn items(nodes: &[Arc<RouteNode>], base: Option<&str>) -> Vec<MenuItem> {
    nodes
        .iter()
        .filter(|node| !node.is_hidden() && !node.is_catch_all())
        .filter_map(|node| item(node, base))
        .collect()
}

fn item(node: &RouteNode, base: Option<&str>) -> Option<MenuItem> {
    let path = menu_path(base, &node.path);
    let showing: Vec<&Arc<RouteNode>> = node.children.iter().filter(|c| !c.is_hidden()).collect();

    match showing.as_slice() {
        [] => MenuItem::leaf(node, path),
        [only] if !node.meta.always_show_root && !has_visible_children(only) => {
            MenuItem::leaf(only, menu_path(Some(&path), &only.path))
        }
        _ => Some(MenuItem {
            name: node.name.clone(),
            title: node.meta.title.clone(),
            icon: node.meta.icon.clone(),
            external: false,
            children: items(&node.children, Some(&path)),
            path,
        }),
    }
}

fn has_visible_children(node: &RouteNode) -> bool {
    node.children.iter().any(|c| !c.is_hidden())
}

fn menu_path(base: Option<&str>, path: &str) -> String {
    if is_external(path) {
        return path.to_string();
    }
    match base {
        Some(base) if is_external(base) => base.to_string(),
        _ => join_path(base, path),
    }
}

/// One breadcrumb entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Crumb {
    pub title: String,
    pub path: String,
    /// Rendered as a link.
    pub link: bool,
}

/// Name of the landing page every breadcrumb trail starts from.
pub const HOME_NAME: &str = "Dashboard";
pub const HOME_PATH: &str = "/dashboard";

/// Breadcrumbs for a match: titled chain entries that allow breadcrumbs,
/// led by the landing page unless the trail already starts there.
pub fn breadcrumbs(result: &MatchResult) -> Vec<Crumb> {
    let titled: Vec<_> = result
        .chain
        .iter()
        .zip(&result.matched_paths)
        .filter_map(|(node, path)| node.meta.title.as_ref().map(|title| (node, title, path)))
        .collect();

    let starts_home = titled.first().is_some_and(|(node, _, _)| {
        node.name
            .as_deref()
            .is_some_and(|name| name.trim().eq_ignore_ascii_case(HOME_NAME))
    });

    let mut crumbs = Vec::with_capacity(titled.len() + 1);
    if !starts_home {
        crumbs.push((HOME_NAME.to_string(), HOME_PATH.to_string(), true));
    }
    crumbs.extend(
        titled
            .into_iter()
            .filter(|(node, _, _)| node.meta.breadcrumb)
            .map(|(node, title, path)| {
                let linkable = node.redirect != Some(Redirect::NoRedirect);
                (title.clone(), path.clone(), linkable)
            }),
    );

    // the trail's last entry is the current page
    let last = crumbs.len().saturating_sub(1);
    crumbs
        .into_iter()
        .enumerate()
        .map(|(i, (title, path, linkable))| Crumb {
            title,
            path,
            link: linkable && i != last,
        })
        .collect()
}

/// Names of views that should be kept alive between visits.
pub fn cached_views(forest: &RouteForest) -> Vec<String> {
    fn collect(nodes: &[Arc<RouteNode>], out: &mut Vec<String>) {
        for node in nodes {
            if let Some(name) = &node.name {
                if node.has_independent_content() && !node.meta.no_cache {
                    out.push(name.clone());
                }
            }
            collect(&node.children, out);
        }
    }
    let mut out = Vec::new();
    collect(forest.roots(), &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{assemble, build_dynamic, build_static, default_catalog, StaticOptions};
    use crate::routing::matcher::{Matcher, MatcherOptions};
    use crate::tree::{roles, Meta};

    fn forest() -> RouteForest {
        let static_forest = build_static(&StaticOptions::default()).unwrap();
        let dynamic = build_dynamic(&roles(["viewer"]), &default_catalog().unwrap());
        assemble(&static_forest, &dynamic).unwrap()
    }

    fn find<'a>(items: &'a [MenuItem], title: &str) -> Option<&'a MenuItem> {
        items.iter().find(|i| i.title.as_deref() == Some(title))
    }

    #[test]
    fn test_single_child_is_promoted() {
        let items = menu(&forest());

        let dashboard = find(&items, "Dashboard").unwrap();
        assert_eq!(dashboard.path, "/dashboard");
        assert!(dashboard.children.is_empty());

        let form = find(&items, "Form").unwrap();
        assert_eq!(form.path, "/form/index");
    }

    #[test]
    fn test_hidden_and_catch_all_excluded() {
        let items = menu(&forest());
        assert!(items.iter().all(|i| i.path != "/login" && i.path != "/404"));
        assert!(items.iter().all(|i| i.path != "*"));

        let example = find(&items, "Example").unwrap();
        let titles: Vec<_> = example.children.iter().filter_map(|c| c.title.as_deref()).collect();
        assert_eq!(titles, vec!["Table", "Tree"]);
    }

    #[test]
    fn test_nested_submenus() {
        let items = menu(&forest());
        let nested = find(&items, "Nested").unwrap();
        let menu1 = find(&nested.children, "Menu1").unwrap();
        let menu1_2 = find(&menu1.children, "Menu1-2").unwrap();

        assert_eq!(menu1_2.path, "/nested/menu1/menu1-2");
        assert_eq!(menu1_2.children[0].path, "/nested/menu1/menu1-2/menu1-2-1");
    }

    #[test]
    fn test_external_link_entry() {
        let items = menu(&forest());
        let link = find(&items, "External Link").unwrap();
        assert!(link.external);
        assert!(link.path.starts_with("https://"));
    }

    #[test]
    fn test_always_show_root() {
        let forest = RouteForest::new(vec![
            RouteNode::builder("/docs")
                .layout()
                .meta(Meta::titled("Docs").always_show_root())
                .child(
                    RouteNode::builder("intro")
                        .name("Intro")
                        .view("docs/intro")
                        .meta(Meta::titled("Intro"))
                        .build(),
                )
                .build(),
            RouteNode::catch_all("/docs"),
        ])
        .unwrap();

        let items = menu(&forest);
        assert_eq!(items[0].title.as_deref(), Some("Docs"));
        assert_eq!(items[0].children[0].path, "/docs/intro");
    }

    #[test]
    fn test_breadcrumbs() {
        let forest = forest();
        let matcher = Matcher::new(&forest, MatcherOptions::default()).unwrap();

        let crumbs = breadcrumbs(&matcher.resolve("/nested/menu1/menu1-2"));
        let titles: Vec<_> = crumbs.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Dashboard", "Nested", "Menu1", "Menu1-2"]);
        assert_eq!(crumbs[0].path, "/dashboard");
        assert!(crumbs[0].link);
        assert!(crumbs[1].link);
        assert!(!crumbs[3].link);

        let errors = breadcrumbs(&matcher.resolve("/error/401"));
        assert_eq!(errors[1].title, "Error Pages");
        assert!(!errors[1].link);

        let home = breadcrumbs(&matcher.resolve("/dashboard"));
        assert_eq!(home.len(), 1);
        assert!(!home[0].link);
    }

    #[test]
    fn test_breadcrumbs_skip_hidden_leaf() {
        let forest = RouteForest::new(vec![
            RouteNode::builder("/docs")
                .name("Docs")
                .layout()
                .meta(Meta::titled("Docs"))
                .child(
                    RouteNode::builder("intro")
                        .name("DocsIntro")
                        .view("docs/intro")
                        .meta(Meta::titled("Intro").without_breadcrumb())
                        .build(),
                )
                .build(),
            RouteNode::catch_all("/docs"),
        ])
        .unwrap();
        let matcher = Matcher::new(&forest, MatcherOptions::default()).unwrap();

        let crumbs = breadcrumbs(&matcher.resolve("/docs/intro"));
        let titles: Vec<_> = crumbs.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Dashboard", "Docs"]);
        assert!(crumbs[0].link);
        assert!(!crumbs[1].link);
    }

    #[test]
    fn test_cached_views() {
        let views = cached_views(&forest());
        assert!(views.contains(&"Dashboard".to_string()));
        assert!(views.contains(&"Table".to_string()));
        assert!(!views.contains(&"Page404".to_string()));
        assert!(!views.contains(&"ExampleEdit".to_string()));
        assert!(!views.contains(&"Nested".to_string()));
    }
}
