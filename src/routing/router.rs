//! Router lifecycle.
//!
//! # Responsibilities
//! - Own the single live (forest, matcher) pair
//! - Swap in a freshly built pair on reset, keeping the handle's identity
//! - Serve resolutions against one consistent snapshot
//!
//! # Design Decisions
//! - Readers load an `Arc<RouterState>` once per call: lock-free, never mixed
//! - Writers are serialized by a mutex; the swap itself is one atomic store
//! - A failed reset leaves the previous state live and untouched

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::observability::metrics;
use crate::routing::matcher::{MatchResult, Matcher, MatcherOptions, Params, RedirectLoopError};
use crate::tree::{RouteForest, RouteNode, StructureError};

/// One generation of routing data. Never mutated after construction.
#[derive(Debug)]
pub struct RouterState {
    forest: RouteForest,
    matcher: Matcher,
    generation: u64,
}

impl RouterState {
    fn build(
        roots: Vec<Arc<RouteNode>>,
        options: MatcherOptions,
        generation: u64,
    ) -> Result<Self, StructureError> {
        let forest = RouteForest::new(roots)?;
        let matcher = Matcher::new(&forest, options)?;
        Ok(Self {
            forest,
            matcher,
            generation,
        })
    }

    pub fn forest(&self) -> &RouteForest {
        &self.forest
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Resolve against this generation, counting the outcome.
    pub fn resolve(&self, path: &str) -> MatchResult {
        let result = self.matcher.resolve(path);
        let outcome = if result.redirect_error.is_some() {
            "redirect_loop"
        } else if result.fallback {
            "fallback"
        } else {
            "matched"
        };
        metrics::record_resolve(outcome);
        result
    }
}

/// Stable router handle. Share it via `Arc`; `reset` swaps what it routes with.
#[derive(Debug)]
pub struct Router {
    state: ArcSwap<RouterState>,
    writer: Mutex<()>,
    options: MatcherOptions,
}

impl Router {
    /// Build the initial state. A failure here means there is nothing to route with.
    pub fn initialize(
        roots: Vec<Arc<RouteNode>>,
        options: MatcherOptions,
    ) -> Result<Self, StructureError> {
        let state = RouterState::build(roots, options, 0)?;
        tracing::info!(
            roots = state.forest.roots().len(),
            nodes = state.forest.as_catalog().node_count(),
            "Router initialized"
        );
        metrics::record_generation(0);
        Ok(Self {
            state: ArcSwap::from_pointee(state),
            writer: Mutex::new(()),
            options,
        })
    }

    /// Replace the live state with one built from `roots`. Returns the new generation.
    pub fn reset(&self, roots: Vec<Arc<RouteNode>>) -> Result<u64, StructureError> {
        self.reset_with(|| Ok::<_, StructureError>(roots))
    }

    /// Like [`Router::reset`], building the roots inside the writer critical section.
    /// Errors from `build` abort the reset as well.
    pub fn reset_with<F, E>(&self, build: F) -> Result<u64, E>
    where
        F: FnOnce() -> Result<Vec<Arc<RouteNode>>, E>,
        E: From<StructureError> + std::fmt::Display,
    {
        let _guard = self.writer.lock();
        let generation = self.state.load().generation + 1;

        let next = build().and_then(|roots| {
            RouterState::build(roots, self.options, generation).map_err(E::from)
        });
        match next {
            Ok(state) => {
                let nodes = state.forest.as_catalog().node_count();
                self.state.store(Arc::new(state));
                metrics::record_reset("ok");
                metrics::record_generation(generation);
                tracing::info!(generation, nodes, "Router reset");
                Ok(generation)
            }
            Err(e) => {
                metrics::record_reset("rejected");
                tracing::warn!(
                    error = %e,
                    generation = generation - 1,
                    "Router reset rejected, keeping current state"
                );
                Err(e)
            }
        }
    }

    pub fn resolve(&self, path: &str) -> MatchResult {
        self.state.load().resolve(path)
    }

    pub fn try_resolve(&self, path: &str) -> Result<MatchResult, RedirectLoopError> {
        self.state.load().matcher.try_resolve(path)
    }

    pub fn href_for(&self, name: &str, params: &Params) -> Option<String> {
        self.state.load().matcher.href_for(name, params)
    }

    /// The live state. Holding it keeps that generation alive across resets.
    pub fn snapshot(&self) -> Arc<RouterState> {
        self.state.load_full()
    }

    pub fn generation(&self) -> u64 {
        self.state.load().generation
    }

    pub fn options(&self) -> MatcherOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Meta;

    fn base_roots() -> Vec<Arc<RouteNode>> {
        vec![
            RouteNode::builder("/404").view("404").hidden().build(),
            RouteNode::builder("/dashboard")
                .name("Dashboard")
                .view("dashboard")
                .meta(Meta::titled("Dashboard"))
                .build(),
            RouteNode::catch_all("/404"),
        ]
    }

    fn with_admin() -> Vec<Arc<RouteNode>> {
        let mut roots = base_roots();
        roots.insert(
            2,
            RouteNode::builder("/admin")
                .name("Admin")
                .view("admin")
                .meta(Meta::titled("Admin").roles(["admin"]))
                .build(),
        );
        roots
    }

    #[test]
    fn test_initialize_rejects_bad_forest() {
        let err = Router::initialize(
            vec![RouteNode::builder("/a").build()],
            MatcherOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err, StructureError::MissingFallback);
    }

    #[test]
    fn test_reset_swaps_state() {
        let router = Router::initialize(base_roots(), MatcherOptions::default()).unwrap();
        assert!(router.resolve("/admin").fallback);

        assert_eq!(router.reset(with_admin()).unwrap(), 1);
        assert_eq!(router.resolve("/admin").name(), Some("Admin"));
        assert_eq!(router.generation(), 1);
    }

    #[test]
    fn test_failed_reset_keeps_previous_state() {
        let router = Router::initialize(with_admin(), MatcherOptions::default()).unwrap();

        let mut broken = with_admin();
        broken.pop();
        assert_eq!(
            router.reset(broken).unwrap_err(),
            StructureError::MissingFallback
        );
        assert_eq!(router.generation(), 0);
        assert_eq!(router.resolve("/admin").name(), Some("Admin"));
    }

    #[test]
    fn test_reset_with_builder_error() {
        #[derive(Debug)]
        enum BuildError {
            Source,
            Structure(StructureError),
        }
        impl From<StructureError> for BuildError {
            fn from(e: StructureError) -> Self {
                Self::Structure(e)
            }
        }
        impl std::fmt::Display for BuildError {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{self:?}")
            }
        }

        let router = Router::initialize(base_roots(), MatcherOptions::default()).unwrap();
        assert!(matches!(
            router.reset_with(|| Err(BuildError::Source)),
            Err(BuildError::Source)
        ));
        assert!(matches!(
            router.reset_with(|| Ok::<_, BuildError>(vec![])),
            Err(BuildError::Structure(StructureError::MissingFallback))
        ));
        assert_eq!(router.generation(), 0);
    }

    #[test]
    fn test_snapshot_survives_reset() {
        let router = Router::initialize(with_admin(), MatcherOptions::default()).unwrap();
        let before = router.snapshot();
        router.reset(base_roots()).unwrap();

        assert!(before.forest().find_by_name("Admin").is_some());
        assert_eq!(before.resolve("/admin").name(), Some("Admin"));
        assert_eq!(before.generation(), 0);
        assert!(router.resolve("/admin").fallback);
    }

    /// Records the outcome label of every resolve counter registration.
    #[derive(Default)]
    struct Outcomes(std::sync::Mutex<Vec<String>>);

    impl ::metrics::Recorder for Outcomes {
        fn describe_counter(
            &self,
            _: ::metrics::KeyName,
            _: Option<::metrics::Unit>,
            _: ::metrics::SharedString,
        ) {
        }
        fn describe_gauge(
            &self,
            _: ::metrics::KeyName,
            _: Option<::metrics::Unit>,
            _: ::metrics::SharedString,
        ) {
        }
        fn describe_histogram(
            &self,
            _: ::metrics::KeyName,
            _: Option<::metrics::Unit>,
            _: ::metrics::SharedString,
        ) {
        }

        fn register_counter(
            &self,
            key: &::metrics::Key,
            _: &::metrics::Metadata<'_>,
        ) -> ::metrics::Counter {
            if key.name() == "route_tree_resolve_total" {
                let outcome = key
                    .labels()
                    .find(|l| l.key() == "outcome")
                    .map(|l| l.value().to_string());
                self.0.lock().unwrap().extend(outcome);
            }
            ::metrics::Counter::noop()
        }

        fn register_gauge(
            &self,
            _: &::metrics::Key,
            _: &::metrics::Metadata<'_>,
        ) -> ::metrics::Gauge {
            ::metrics::Gauge::noop()
        }

        fn register_histogram(
            &self,
            _: &::metrics::Key,
            _: &::metrics::Metadata<'_>,
        ) -> ::metrics::Histogram {
            ::metrics::Histogram::noop()
        }
    }

    #[test]
    fn test_snapshot_resolve_counts_outcomes() {
        let router = Router::initialize(base_roots(), MatcherOptions::default()).unwrap();
        let outcomes = Outcomes::default();

        ::metrics::with_local_recorder(&outcomes, || {
            let snapshot = router.snapshot();
            snapshot.resolve("/dashboard");
            snapshot.resolve("/missing");
            router.resolve("/dashboard");
        });

        assert_eq!(
            *outcomes.0.lock().unwrap(),
            vec!["matched", "fallback", "matched"]
        );
    }
}
