//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming path
//!     → router.rs (load the live RouterState snapshot)
//!     → matcher.rs (normalize, first match, follow redirects)
//!     → MatchResult (node chain + params), catch-all when nothing matched
//!     → menu.rs (breadcrumbs, active menu)
//!
//! Reset (permission change, catalog reload):
//!     session.rs (roles + catalog)
//!     → build_dynamic + assemble → RouteForest
//!     → Matcher::new
//!     → atomic swap of Arc<RouterState>
//! ```
//!
//! # Design Decisions
//! - The router handle is stable; only its inner state is replaced
//! - Deterministic: same state and path always give the same match
//! - Resolution never fails; loops degrade to the catch-all

pub mod matcher;
pub mod menu;
pub mod router;
pub mod session;

pub use matcher::{MatchResult, Matcher, MatcherOptions, Params, RedirectLoopError};
pub use router::{Router, RouterState};
pub use session::Session;
