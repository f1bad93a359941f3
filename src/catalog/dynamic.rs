//! Permission-scoped routes.
//!
//! # Responsibilities
//! - Provide the compiled-in superset catalog
//! - Prune a catalog down to what a role set may see
//! - Combine the static forest with a pruned catalog
//!
//! # Design Decisions
//! - Pruning is top-down; parents survive only through children or their own content
//! - Unchanged subtrees are shared with the source catalog, not copied
//! - The static catch-all always ends the assembled forest

use std::sync::Arc;

use crate::tree::{Meta, RoleSet, RouteCatalog, RouteForest, RouteNode, StructureError};

/// Every permission-scoped page the application knows about.
pub fn default_catalog() -> Result<RouteCatalog, StructureError> {
    RouteCatalog::new(vec![
        RouteNode::builder("/example")
            .layout()
            .redirect("/example/table")
            .name("Example")
            .meta(Meta::titled("Example").icon("el-icon-s-help"))
            .child(
                RouteNode::builder("table")
                    .name("Table")
                    .view("table/index")
                    .meta(Meta::titled("Table").icon("table"))
                    .build(),
            )
            .child(
                RouteNode::builder("tree")
                    .name("Tree")
                    .view("tree/index")
                    .meta(Meta::titled("Tree").icon("tree"))
                    .build(),
            )
            .child(
                RouteNode::builder("edit/:id")
                    .name("ExampleEdit")
                    .view("table/edit")
                    .hidden()
                    .meta(Meta::titled("Edit").no_cache().active_menu("/example/table"))
                    .build(),
            )
            .build(),
        RouteNode::builder("/form")
            .layout()
            .child(
                RouteNode::builder("index")
                    .name("Form")
                    .view("form/index")
                    .meta(Meta::titled("Form").icon("form"))
                    .build(),
            )
            .build(),
        nested_menus(),
        RouteNode::builder("/admin")
            .layout()
            .redirect("/admin/users")
            .name("Admin")
            .meta(Meta::titled("Admin").icon("lock").roles(["admin"]))
            .child(
                RouteNode::builder("users")
                    .name("AdminUsers")
                    .view("admin/users")
                    .meta(Meta::titled("Users").icon("user"))
                    .build(),
            )
            .child(
                RouteNode::builder("audit")
                    .name("AdminAudit")
                    .view("admin/audit")
                    .meta(Meta::titled("Audit Log").icon("documentation").no_cache())
                    .build(),
            )
            .build(),
        RouteNode::builder("/external-link")
            .layout()
            .child(
                RouteNode::builder("https://panjiachen.github.io/vue-element-admin-site/#/")
                    .meta(Meta::titled("External Link").icon("link"))
                    .build(),
            )
            .build(),
    ])
}

fn nested_menus() -> Arc<RouteNode> {
    let page = |path: &str, name: &str, title: &str| {
        RouteNode::builder(path)
            .name(name)
            .view(format!("nested/{path}"))
            .meta(Meta::titled(title))
    };

    RouteNode::builder("/nested")
        .layout()
        .redirect("/nested/menu1")
        .name("Nested")
        .meta(Meta::titled("Nested").icon("nested"))
        .child(
            page("menu1", "Menu1", "Menu1")
                .child(page("menu1-1", "Menu1-1", "Menu1-1").build())
                .child(
                    page("menu1-2", "Menu1-2", "Menu1-2")
                        .child(page("menu1-2-1", "Menu1-2-1", "Menu1-2-1").build())
                        .child(page("menu1-2-2", "Menu1-2-2", "Menu1-2-2").build())
                        .build(),
                )
                .child(page("menu1-3", "Menu1-3", "Menu1-3").build())
                .build(),
        )
        .child(page("menu2", "Menu2", "menu2").build())
        .build()
}

/// Prune `catalog` down to the nodes a viewer holding `permitted` may reach.
///
/// A node is kept when its roles are empty or intersect `permitted`, and it is
/// either a leaf, keeps at least one child, or has content of its own. Sibling
/// order is preserved.
pub fn build_dynamic(permitted: &RoleSet, catalog: &RouteCatalog) -> RouteCatalog {
    RouteCatalog::from_pruned(prune(catalog.roots(), permitted))
}

fn prune(nodes: &[Arc<RouteNode>], permitted: &RoleSet) -> Vec<Arc<RouteNode>> {
    nodes
        .iter()
        .filter_map(|node| prune_node(node, permitted))
        .collect()
}

fn prune_node(node: &Arc<RouteNode>, permitted: &RoleSet) -> Option<Arc<RouteNode>> {
    if !node.meta.permits(permitted) {
        return None;
    }
    if node.is_leaf() {
        return Some(node.clone());
    }

    let children = prune(&node.children, permitted);
    if children.is_empty() && !node.has_independent_content() {
        return None;
    }

    let unchanged = children.len() == node.children.len()
        && children
            .iter()
            .zip(&node.children)
            .all(|(kept, original)| Arc::ptr_eq(kept, original));
    if unchanged {
        Some(node.clone())
    } else {
        Some(Arc::new(node.with_children(children)))
    }
}

/// Static roots, then the dynamic roots, then the static catch-all.
pub fn assemble(
    static_forest: &RouteForest,
    dynamic: &RouteCatalog,
) -> Result<RouteForest, StructureError> {
    let roots = static_forest
        .roots()
        .iter()
        .chain(dynamic.roots())
        .filter(|node| !node.is_catch_all())
        .cloned()
        .chain(std::iter::once(static_forest.fallback().clone()))
        .collect();
    RouteForest::new(roots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::constant::{build_static, StaticOptions};
    use crate::tree::roles;

    fn all_names(nodes: &[Arc<RouteNode>], out: &mut Vec<String>) {
        for node in nodes {
            if let Some(name) = &node.name {
                out.push(name.clone());
            }
            all_names(&node.children, out);
        }
    }

    fn names(catalog: &RouteCatalog) -> Vec<String> {
        let mut out = Vec::new();
        all_names(catalog.roots(), &mut out);
        out
    }

    #[test]
    fn test_default_catalog_is_valid() {
        let catalog = default_catalog().unwrap();
        assert!(catalog.fallback().is_none());
        assert!(catalog.find_by_name("Menu1-2-1").is_some());
    }

    #[test]
    fn test_viewer_loses_admin_branch() {
        let catalog = default_catalog().unwrap();
        let viewer = build_dynamic(&roles(["viewer"]), &catalog);
        let admin = build_dynamic(&roles(["admin"]), &catalog);

        assert!(viewer.find_by_name("Admin").is_none());
        assert!(viewer.find_by_name("AdminUsers").is_none());
        assert!(admin.find_by_name("Admin").is_some());
        assert_eq!(admin.roots().len(), catalog.roots().len());
    }

    #[test]
    fn test_parent_without_surviving_children_is_dropped() {
        let catalog = RouteCatalog::new(vec![
            RouteNode::builder("/reports")
                .layout()
                .name("Reports")
                .child(
                    RouteNode::builder("sales")
                        .name("Sales")
                        .view("reports/sales")
                        .meta(Meta::titled("Sales").roles(["finance"]))
                        .build(),
                )
                .child(
                    RouteNode::builder("payroll")
                        .name("Payroll")
                        .view("reports/payroll")
                        .meta(Meta::titled("Payroll").roles(["hr"]))
                        .build(),
                )
                .build(),
            RouteNode::builder("/overview")
                .name("Overview")
                .view("overview/index")
                .child(
                    RouteNode::builder("secret")
                        .name("Secret")
                        .view("overview/secret")
                        .meta(Meta::titled("Secret").roles(["admin"]))
                        .build(),
                )
                .build(),
        ])
        .unwrap();

        let viewer = build_dynamic(&roles(["viewer"]), &catalog);
        assert_eq!(names(&viewer), vec!["Overview".to_string()]);

        let finance = build_dynamic(&roles(["finance"]), &catalog);
        assert_eq!(names(&finance), vec!["Reports", "Sales", "Overview"]);
    }

    #[test]
    fn test_sibling_order_preserved() {
        let catalog = default_catalog().unwrap();
        let full = build_dynamic(&roles(["admin"]), &catalog);
        let order: Vec<&str> = full.roots().iter().map(|n| n.path.as_str()).collect();
        assert_eq!(
            order,
            vec!["/example", "/form", "/nested", "/admin", "/external-link"]
        );
    }

    #[test]
    fn test_unchanged_subtrees_are_shared() {
        let catalog = default_catalog().unwrap();
        let pruned = build_dynamic(&roles(["viewer"]), &catalog);
        assert!(Arc::ptr_eq(&pruned.roots()[0], &catalog.roots()[0]));
    }

    #[test]
    fn test_assemble_keeps_catch_all_last() {
        let static_forest = build_static(&StaticOptions::default()).unwrap();
        let dynamic = build_dynamic(&roles(["viewer"]), &default_catalog().unwrap());
        let forest = assemble(&static_forest, &dynamic).unwrap();

        assert!(forest.roots().last().unwrap().is_catch_all());
        assert_eq!(
            forest.roots().iter().filter(|n| n.is_catch_all()).count(),
            1
        );
        assert!(forest.find_by_name("Dashboard").is_some());
        assert!(forest.find_by_name("Table").is_some());
    }

    #[test]
    fn test_assemble_rejects_name_collision() {
        let static_forest = build_static(&StaticOptions::default()).unwrap();
        let clash = RouteCatalog::new(vec![RouteNode::builder("/again")
            .name("Dashboard")
            .view("dashboard/index")
            .build()])
        .unwrap();
        assert_eq!(
            assemble(&static_forest, &clash).unwrap_err(),
            StructureError::DuplicateName {
                name: "Dashboard".into()
            }
        );
    }
}
