//! Always-available routes.
//!
//! # Responsibilities
//! - Build the baseline forest present in every session
//! - Include optional dashboard widget pages when their feature is enabled
//!
//! # Design Decisions
//! - Pure and deterministic; the only input is compiled-in configuration
//! - A structure error here is a defect in this file, never a runtime condition

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::tree::{Meta, RouteForest, RouteNode, StructureError};

/// Optional dashboard widget pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Widget {
    ReliefMap,
    BarChart,
    BoxCard,
    LineChart,
    PanelGroup,
    TransactionTable,
    TodoList,
    VideoPlayer,
}

impl Widget {
    pub const ALL: [Widget; 8] = [
        Widget::ReliefMap,
        Widget::BarChart,
        Widget::BoxCard,
        Widget::LineChart,
        Widget::PanelGroup,
        Widget::TransactionTable,
        Widget::TodoList,
        Widget::VideoPlayer,
    ];

    /// (root path, route name, title, icon)
    fn descriptor(self) -> (&'static str, &'static str, &'static str, &'static str) {
        match self {
            Widget::ReliefMap => ("/relief-map", "ReliefMap", "Relief Map", "map"),
            Widget::BarChart => ("/BarChart", "BarChart", "BarChart", "BarChart"),
            Widget::BoxCard => ("/BarCard", "BarCard", "BarCard", "BarCard"),
            Widget::LineChart => ("/LineChart", "LineChart", "LineChart", "LineChart"),
            Widget::PanelGroup => ("/PanelGroup", "PanelGroup", "PanelGroup", "PanelGroup"),
            Widget::TransactionTable => (
                "/TransactionTable",
                "TransactionTable",
                "TransactionTable",
                "TransactionTable",
            ),
            Widget::TodoList => ("/TodoList", "TodoList", "TodoList", "TodoList"),
            Widget::VideoPlayer => ("/VideoPlayer", "VideoPlayer", "VideoPlayer", "VideoPlayer"),
        }
    }

    fn route(self) -> Arc<RouteNode> {
        let (path, name, title, icon) = self.descriptor();
        RouteNode::builder(path)
            .layout()
            .child(
                RouteNode::builder("index")
                    .name(name)
                    .view(format!("dashboard/admin/components/{name}"))
                    .meta(Meta::titled(title).icon(icon))
                    .build(),
            )
            .build()
    }
}

/// Compiled-in switches for the static catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticOptions {
    pub widgets: BTreeSet<Widget>,
}

impl StaticOptions {
    pub fn with_widgets<I: IntoIterator<Item = Widget>>(widgets: I) -> Self {
        Self {
            widgets: widgets.into_iter().collect(),
        }
    }
}

/// Build the baseline forest: login, error pages, landing pages and the catch-all.
pub fn build_static(options: &StaticOptions) -> Result<RouteForest, StructureError> {
    let mut roots = vec![
        RouteNode::builder("/login").view("login/index").hidden().build(),
        RouteNode::builder("/404").view("error-page/404").hidden().build(),
        RouteNode::builder("/401").view("error-page/401").hidden().build(),
        RouteNode::builder("/")
            .layout()
            .redirect("/dashboard")
            .child(
                RouteNode::builder("dashboard")
                    .name("Dashboard")
                    .view("dashboard/index")
                    .meta(Meta::titled("Dashboard").icon("dashboard"))
                    .build(),
            )
            .build(),
        RouteNode::builder("/History")
            .layout()
            .redirect("/History/history")
            .child(
                RouteNode::builder("history")
                    .name("History")
                    .view("history/index")
                    .meta(Meta::titled("History").icon("history"))
                    .build(),
            )
            .build(),
    ];

    roots.extend(
        Widget::ALL
            .iter()
            .filter(|w| options.widgets.contains(*w))
            .map(|w| w.route()),
    );

    roots.push(
        RouteNode::builder("/error")
            .layout()
            .no_redirect()
            .name("ErrorPages")
            .meta(Meta::titled("Error Pages").icon("404"))
            .child(
                RouteNode::builder("401")
                    .name("Page401")
                    .view("error-page/401")
                    .meta(Meta::titled("401").no_cache())
                    .build(),
            )
            .child(
                RouteNode::builder("404")
                    .name("Page404")
                    .view("error-page/404")
                    .meta(Meta::titled("404").no_cache())
                    .build(),
            )
            .build(),
    );

    // must stay last
    roots.push(RouteNode::catch_all("/404"));

    RouteForest::new(roots)
}
