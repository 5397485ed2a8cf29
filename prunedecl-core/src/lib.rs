//! prunedecl-core: dead-declaration elimination for program reduction
//!
//! This library decides which declarations of a parsed program are
//! unreachable from its required-output set and deletes their text from the
//! original source, one reducer instance at a time.
//!
//! # Features
//!
//! - **Relation model**: span, template, redeclaration and alias groups plus
//!   lexical/semantic containment, built in a single traversal
//! - **Fixpoint liveness**: `referenced` / `used` propagation until stable
//! - **Candidates**: single declarations or one all-at-once group, re-validated
//!   right before each edit
//! - **Instance selection**: query the count, apply ordinal `N` or range `N..=M`
//! - **Protected files**: included headers and configured patterns are never edited
//!
//! # Quick Start
//!
//! Use the [`prelude`] module for convenient imports:
//!
//! ```rust,ignore
//! use prunedecl_core::prelude::*;
//!
//! let tree = load_tree(Path::new("input.tree.json"))?;
//! let outcome = Prunedecl::new(tree, source).run(Selection::Single(1))?;
//! std::io::stdout().write_all(&outcome.output)?;
//! ```
//!
//! # Module Organization
//!
//! - [`tree`]: Program tree arena and JSON dump loading
//! - [`model`]: Equivalence groups, containment graph, liveness table
//! - [`liveness`]: Fixpoint propagation
//! - [`candidate`]: Removal candidates and protection policy
//! - [`span`]: Declaration-to-span resolution
//! - [`buffer`]: Rewrite buffer with deletion tracking
//! - [`select`]: Instance selection and application
//! - [`builder`]: Fluent builder API
//! - [`error`]: Typed error handling

pub mod buffer;
pub mod builder;
pub mod candidate;
pub mod config;
pub mod error;
pub mod liveness;
pub mod logging;
pub mod model;
pub mod prelude;
pub mod report;
pub mod select;
pub mod span;
pub mod tree;

// ============================================================================
// Explicit Re-exports (avoiding glob imports for clear API surface)
// ============================================================================

// Error types
pub use error::{IoResultExt, PruneError, PruneResult};

// Builder API
pub use builder::{AnalysisResult, AnalysisSummary, Prunedecl, RunOutcome};

// Configuration
pub use config::{load_config, load_config_file, OutputConfig, PruneConfig, CONFIG_FILE};

// Program tree
pub use tree::{load_tree, DeclKind, DeclLinks, DeclNode, NodeId, ProgramTree, Span};

// Relation model and liveness
pub use liveness::{propagate, PropagationStats, Propagator};
pub use model::{
    build_relations, EquivalenceGroup, GroupSource, LivenessState, RelationBuilder,
    RelationGraph,
};

// Candidates and selection
pub use candidate::{collect_candidates, ApplyReport, Candidate, CandidateContext, SourcePolicy};
pub use select::{CandidateInfo, Selection, Transformation};

// Span and buffer
pub use buffer::TextBuffer;
pub use span::{ExactSpanResolver, FullSpanResolver, SpanResolver};

// Logging
pub use logging::{init_plain_logging, init_structured_logging, log_event};

// Reporting
pub use report::{candidates_to_json, print_json, print_plain};
