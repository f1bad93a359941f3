//! Path resolution.
//!
//! # Responsibilities
//! - Compile every node's effective path (parent path + own segment)
//! - Resolve a request path to the chain of nodes from a root to the match
//! - Follow redirects with a bounded hop count
//! - Build paths back from route names
//!
//! # Design Decisions
//! - Children are evaluated before their parent, siblings in declared order
//! - First match wins; the catch-all is always evaluated last
//! - Literal segments compare case-insensitively unless configured otherwise
//! - No regex: a pattern is a list of literal, `:param` and trailing `*` segments

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use thiserror::Error;

use crate::tree::node::join_path;
use crate::tree::{Redirect, RouteForest, RouteNode, StructureError};

/// Default cap on redirects followed by one resolution.
pub const DEFAULT_MAX_REDIRECT_HOPS: usize = 10;

/// Parameter name holding the path captured by a trailing `*`.
pub const WILDCARD_PARAM: &str = "pathMatch";

/// Captured path parameters.
pub type Params = BTreeMap<String, String>;

/// Matcher tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct MatcherOptions {
    pub max_redirect_hops: usize,
    pub case_sensitive: bool,
}

impl Default for MatcherOptions {
    fn default() -> Self {
        Self {
            max_redirect_hops: DEFAULT_MAX_REDIRECT_HOPS,
            case_sensitive: false,
        }
    }
}

/// A redirect chain longer than the hop cap.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("redirect chain starting at '{path}' exceeded {hops} hops")]
pub struct RedirectLoopError {
    pub path: String,
    pub hops: usize,
}

/// Outcome of a resolution.
#[derive(Debug, Clone)]
pub struct MatchResult {
    /// Normalized path of the final match.
    pub path: String,
    /// Nodes from the root down to the matched node.
    pub chain: Vec<Arc<RouteNode>>,
    /// Effective path pattern of each node in `chain`.
    pub matched_paths: Vec<String>,
    pub params: Params,
    /// Paths visited before the final one, in order.
    pub redirected_from: Vec<String>,
    /// The catch-all was hit along the way.
    pub fallback: bool,
    /// Set when the redirect cap was exceeded and the catch-all was used instead.
    pub redirect_error: Option<RedirectLoopError>,
}

impl MatchResult {
    /// The most specific matched node.
    pub fn leaf(&self) -> &Arc<RouteNode> {
        // a chain always holds at least the matched record's own node
        &self.chain[self.chain.len() - 1]
    }

    pub fn name(&self) -> Option<&str> {
        self.leaf().name.as_deref()
    }

    /// Menu entry to highlight for this match.
    pub fn active_menu(&self) -> &str {
        self.leaf()
            .meta
            .active_menu
            .as_deref()
            .unwrap_or(&self.path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
    Wildcard,
}

#[derive(Debug, Clone)]
struct Pattern {
    segments: Vec<Segment>,
}

impl Pattern {
    fn compile(path: &str) -> Result<Self, StructureError> {
        let invalid = |reason: &str| StructureError::InvalidPattern {
            path: path.to_string(),
            reason: reason.to_string(),
        };

        let raw: Vec<&str> = split_segments(path).collect();
        let mut segments = Vec::with_capacity(raw.len());
        for (i, seg) in raw.iter().enumerate() {
            if *seg == "*" {
                if i + 1 != raw.len() {
                    return Err(invalid("'*' must be the last segment"));
                }
                segments.push(Segment::Wildcard);
            } else if let Some(name) = seg.strip_prefix(':') {
                if name.is_empty() {
                    return Err(invalid("empty parameter name"));
                }
                if segments.contains(&Segment::Param(name.to_string())) {
                    return Err(invalid("repeated parameter name"));
                }
                segments.push(Segment::Param(name.to_string()));
            } else {
                segments.push(Segment::Literal(seg.to_string()));
            }
        }
        Ok(Self { segments })
    }

    fn matches(&self, input: &[&str], case_sensitive: bool) -> Option<Params> {
        let mut params = Params::new();
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Wildcard => {
                    let rest = &input[i.min(input.len())..];
                    let captured = if rest.is_empty() {
                        String::new()
                    } else {
                        format!("/{}", rest.join("/"))
                    };
                    params.insert(WILDCARD_PARAM.to_string(), captured);
                    return Some(params);
                }
                Segment::Literal(expected) => {
                    let actual = input.get(i)?;
                    let equal = if case_sensitive {
                        *actual == expected.as_str()
                    } else {
                        actual.eq_ignore_ascii_case(expected)
                    };
                    if !equal {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let actual = input.get(i)?;
                    params.insert(name.clone(), (*actual).to_string());
                }
            }
        }
        (input.len() == self.segments.len()).then_some(params)
    }

    fn render(&self, params: &Params) -> Option<String> {
        let mut parts = Vec::with_capacity(self.segments.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => parts.push(text.clone()),
                Segment::Param(name) => parts.push(params.get(name)?.clone()),
                Segment::Wildcard => {
                    let rest = params.get(WILDCARD_PARAM)?.trim_matches('/');
                    if !rest.is_empty() {
                        parts.push(rest.to_string());
                    }
                }
            }
        }
        Some(format!("/{}", parts.join("/")))
    }
}

#[derive(Debug, Clone)]
struct Record {
    pattern: Pattern,
    chain: Vec<Arc<RouteNode>>,
    matched_paths: Vec<String>,
    /// Effective path relative redirects are resolved against.
    base: String,
}

impl Record {
    fn node(&self) -> &Arc<RouteNode> {
        &self.chain[self.chain.len() - 1]
    }
}

/// Compiled lookup table for one forest.
#[derive(Debug, Clone)]
pub struct Matcher {
    records: Vec<Record>,
    names: HashMap<String, usize>,
    fallback: usize,
    options: MatcherOptions,
}

impl Matcher {
    /// Compile the forest. Fails on patterns that cannot be compiled.
    pub fn new(forest: &RouteForest, options: MatcherOptions) -> Result<Self, StructureError> {
        let mut records = Vec::new();
        let mut chain = Vec::new();
        let mut paths = Vec::new();
        for root in forest.roots() {
            compile_node(root, None, &mut chain, &mut paths, &mut records)?;
        }

        let fallback = records
            .iter()
            .rposition(|r| r.node().is_catch_all())
            .ok_or(StructureError::MissingFallback)?;

        let names = records
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.node().name.clone().map(|name| (name, i)))
            .collect();

        Ok(Self {
            records,
            names,
            fallback,
            options,
        })
    }

    pub fn options(&self) -> MatcherOptions {
        self.options
    }

    /// Resolve `path`, recovering from redirect loops with the catch-all.
    pub fn resolve(&self, path: &str) -> MatchResult {
        match self.try_resolve(path) {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(
                    path = %err.path,
                    hops = err.hops,
                    "Redirect loop detected, falling back to catch-all"
                );
                let mut result = self.fallback_match(path);
                result.redirect_error = Some(err);
                result
            }
        }
    }

    /// Resolve `path`, surfacing redirect loops as errors.
    pub fn try_resolve(&self, path: &str) -> Result<MatchResult, RedirectLoopError> {
        self.follow(normalize_path(path), None)
    }

    /// Path for the route called `name`, with `:param` segments filled from `params`.
    pub fn href_for(&self, name: &str, params: &Params) -> Option<String> {
        let record = &self.records[*self.names.get(name)?];
        record.pattern.render(params)
    }

    fn lookup(&self, path: &str) -> (usize, Params) {
        let input: Vec<&str> = split_segments(path).collect();
        self.records
            .iter()
            .enumerate()
            .find_map(|(i, record)| {
                record
                    .pattern
                    .matches(&input, self.options.case_sensitive)
                    .map(|params| (i, params))
            })
            .unwrap_or_else(|| {
                let mut params = Params::new();
                params.insert(WILDCARD_PARAM.to_string(), path.to_string());
                (self.fallback, params)
            })
    }

    fn follow(
        &self,
        mut path: String,
        mut hit: Option<(usize, Params)>,
    ) -> Result<MatchResult, RedirectLoopError> {
        let mut redirected_from: Vec<String> = Vec::new();
        let mut fallback = false;
        loop {
            let (index, params) = hit.take().unwrap_or_else(|| self.lookup(&path));
            fallback |= index == self.fallback;
            let record = &self.records[index];

            let target = record.node().redirect.as_ref().and_then(Redirect::target);
            let Some(target) = target else {
                return Ok(MatchResult {
                    path,
                    chain: record.chain.clone(),
                    matched_paths: record.matched_paths.clone(),
                    params,
                    redirected_from,
                    fallback,
                    redirect_error: None,
                });
            };

            if redirected_from.len() >= self.options.max_redirect_hops {
                let start = redirected_from.into_iter().next().unwrap_or(path);
                return Err(RedirectLoopError {
                    path: start,
                    hops: self.options.max_redirect_hops,
                });
            }
            let next = redirect_path(&record.base, target, &params);
            redirected_from.push(std::mem::replace(&mut path, next));
        }
    }

    fn fallback_match(&self, path: &str) -> MatchResult {
        let normalized = normalize_path(path);
        let mut params = Params::new();
        params.insert(WILDCARD_PARAM.to_string(), normalized.clone());

        self.follow(normalized.clone(), Some((self.fallback, params.clone())))
            .unwrap_or_else(|_| {
                let record = &self.records[self.fallback];
                MatchResult {
                    path: normalized,
                    chain: record.chain.clone(),
                    matched_paths: record.matched_paths.clone(),
                    params,
                    redirected_from: Vec::new(),
                    fallback: true,
                    redirect_error: None,
                }
            })
    }
}

fn compile_node(
    node: &Arc<RouteNode>,
    parent: Option<&str>,
    chain: &mut Vec<Arc<RouteNode>>,
    paths: &mut Vec<String>,
    records: &mut Vec<Record>,
) -> Result<(), StructureError> {
    // external links are menu entries only
    if node.is_external() {
        return Ok(());
    }

    let effective = join_path(parent, &node.path);
    chain.push(node.clone());
    paths.push(effective.clone());

    for child in &node.children {
        compile_node(child, Some(&effective), chain, paths, records)?;
    }

    records.push(Record {
        pattern: Pattern::compile(&effective)?,
        chain: chain.clone(),
        matched_paths: paths.clone(),
        base: parent.unwrap_or("/").to_string(),
    });

    chain.pop();
    paths.pop();
    Ok(())
}

fn redirect_path(base: &str, target: &str, params: &Params) -> String {
    let joined = if target.starts_with('/') {
        target.to_string()
    } else {
        join_path(Some(base), target)
    };
    let substituted: Vec<String> = split_segments(&joined)
        .map(|seg| match seg.strip_prefix(':') {
            Some(name) => params.get(name).cloned().unwrap_or_else(|| seg.to_string()),
            None => seg.to_string(),
        })
        .collect();
    normalize_path(&format!("/{}", substituted.join("/")))
}

fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Strip query and fragment, collapse slashes, drop the trailing slash.
pub fn normalize_path(path: &str) -> String {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let segments: Vec<&str> = split_segments(&path[..end]).collect();
    format!("/{}", segments.join("/"))
}
