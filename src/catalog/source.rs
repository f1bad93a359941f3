//! Catalog files.
//!
//! A catalog file is a flat TOML table of routes that reference their children by
//! key, so it can describe structures that compiled-in builders cannot: shared
//! children and cycles. Both are rejected while assembling the trees.
//!
//! ```toml
//! roots = ["nested"]          # optional, defaults to unreferenced routes
//!
//! [[route]]
//! key = "nested"
//! path = "/nested"
//! name = "Nested"
//! redirect = "/nested/menu1"
//! component = "layout"
//! children = ["menu1"]
//! meta = { title = "Nested", icon = "nested", roles = ["admin"] }
//! ```

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::tree::{
    ContentRef, Meta, Redirect, RouteCatalog, RouteNode, StructureError, Visibility,
};

/// Error type for catalog loading.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("route #{index}: {reason}")]
    InvalidRoute { index: usize, reason: String },

    #[error(transparent)]
    Structure(#[from] StructureError),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    #[serde(default)]
    roots: Option<Vec<String>>,
    #[serde(default, rename = "route")]
    routes: Vec<RouteSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RouteSpec {
    key: Option<String>,
    path: String,
    name: Option<String>,
    redirect: Option<String>,
    #[serde(default)]
    hidden: bool,
    component: Option<String>,
    #[serde(default)]
    children: Vec<String>,
    #[serde(default)]
    meta: MetaSpec,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct MetaSpec {
    title: Option<String>,
    icon: Option<String>,
    roles: Vec<String>,
    no_cache: bool,
    breadcrumb: bool,
    always_show: bool,
    active_menu: Option<String>,
}

impl Default for MetaSpec {
    fn default() -> Self {
        Self {
            title: None,
            icon: None,
            roles: Vec::new(),
            no_cache: false,
            breadcrumb: true,
            always_show: false,
            active_menu: None,
        }
    }
}

impl From<&MetaSpec> for Meta {
    fn from(spec: &MetaSpec) -> Self {
        Meta {
            title: spec.title.clone(),
            icon: spec.icon.clone(),
            roles: spec.roles.iter().map(|r| r.as_str().into()).collect(),
            no_cache: spec.no_cache,
            breadcrumb: spec.breadcrumb,
            always_show_root: spec.always_show,
            active_menu: spec.active_menu.clone(),
        }
    }
}

/// `layout`, `layout:<token>`, `view:<token>`; a bare token is a view.
fn parse_component(value: &str) -> Result<ContentRef, String> {
    match value.split_once(':') {
        None if value == "layout" => Ok(ContentRef::layout()),
        None if value.is_empty() => Err("empty component".to_string()),
        None => Ok(ContentRef::view(value)),
        Some(("layout", token)) if !token.is_empty() => Ok(ContentRef::Layout(token.to_string())),
        Some(("view", token)) if !token.is_empty() => Ok(ContentRef::view(token)),
        Some((kind, _)) => Err(format!("unsupported component '{value}' ({kind})")),
    }
}

/// Load and assemble a catalog from a TOML file.
pub fn load_catalog(path: &Path) -> Result<RouteCatalog, CatalogError> {
    let content = fs::read_to_string(path)?;
    parse_catalog(&content)
}

/// Parse and assemble a catalog from TOML text.
pub fn parse_catalog(content: &str) -> Result<RouteCatalog, CatalogError> {
    let file: CatalogFile = toml::from_str(content)?;
    let roots = Assembler::new(&file.routes)?.assemble(file.roots.as_deref())?;
    Ok(RouteCatalog::new(roots)?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Pending,
    InProgress,
    Done,
}

struct Assembler<'a> {
    specs: &'a [RouteSpec],
    keys: Vec<&'a str>,
    index: HashMap<&'a str, usize>,
    referenced: HashSet<usize>,
    visits: Vec<Visit>,
}

impl<'a> Assembler<'a> {
    fn new(specs: &'a [RouteSpec]) -> Result<Self, CatalogError> {
        let mut keys = Vec::with_capacity(specs.len());
        let mut index = HashMap::new();
        for (i, spec) in specs.iter().enumerate() {
            let key = spec
                .key
                .as_deref()
                .or(spec.name.as_deref())
                .ok_or_else(|| CatalogError::InvalidRoute {
                    index: i,
                    reason: "route needs a key or a name".to_string(),
                })?;
            if index.insert(key, i).is_some() {
                return Err(StructureError::DuplicateKey {
                    key: key.to_string(),
                }
                .into());
            }
            keys.push(key);
        }

        let mut referenced = HashSet::new();
        for spec in specs {
            for child in &spec.children {
                let target = *index.get(child.as_str()).ok_or_else(|| {
                    StructureError::UnknownReference { key: child.clone() }
                })?;
                if !referenced.insert(target) {
                    return Err(StructureError::MultipleParents { key: child.clone() }.into());
                }
            }
        }

        Ok(Self {
            specs,
            keys,
            index,
            referenced,
            visits: vec![Visit::Pending; specs.len()],
        })
    }

    fn assemble(mut self, roots: Option<&[String]>) -> Result<Vec<Arc<RouteNode>>, CatalogError> {
        let mut built = Vec::new();
        match roots {
            Some(keys) => {
                for key in keys {
                    let id = *self.index.get(key.as_str()).ok_or_else(|| {
                        StructureError::UnknownReference { key: key.clone() }
                    })?;
                    // walk first so a listed route on a loop reports the loop
                    let node = self.build(id)?;
                    if self.referenced.contains(&id) {
                        return Err(StructureError::MultipleParents { key: key.clone() }.into());
                    }
                    built.push(node);
                }
            }
            None => {
                for id in 0..self.specs.len() {
                    if !self.referenced.contains(&id) {
                        built.push(self.build(id)?);
                    }
                }
            }
        }

        // Anything still pending is either in a cycle or not listed under `roots`.
        for id in 0..self.specs.len() {
            if self.visits[id] == Visit::Pending {
                self.build(id)?;
                tracing::warn!(key = self.keys[id], "Catalog route is unreachable, ignoring");
            }
        }

        Ok(built)
    }

    fn build(&mut self, id: usize) -> Result<Arc<RouteNode>, CatalogError> {
        let specs = self.specs;
        let spec = &specs[id];
        match self.visits[id] {
            Visit::InProgress => {
                return Err(StructureError::Cycle {
                    path: spec.path.clone(),
                }
                .into())
            }
            // single parent per route, so a finished route is never requested twice
            Visit::Done => {
                return Err(StructureError::MultipleParents {
                    key: self.keys[id].to_string(),
                }
                .into())
            }
            Visit::Pending => {}
        }
        self.visits[id] = Visit::InProgress;

        let mut children = Vec::with_capacity(spec.children.len());
        for child in &spec.children {
            let child_id = self.index[child.as_str()];
            children.push(self.build(child_id)?);
        }

        let content = spec
            .component
            .as_deref()
            .map(parse_component)
            .transpose()
            .map_err(|reason| CatalogError::InvalidRoute { index: id, reason })?;

        let mut builder = RouteNode::builder(spec.path.clone())
            .redirect_spec(spec.redirect.as_deref().map(Redirect::parse))
            .visibility(if spec.hidden {
                Visibility::Hidden
            } else {
                Visibility::Visible
            })
            .meta(Meta::from(&spec.meta))
            .content(content)
            .children(children);
        if let Some(name) = &spec.name {
            builder = builder.name(name.clone());
        }

        self.visits[id] = Visit::Done;
        Ok(builder.build())
    }
}
