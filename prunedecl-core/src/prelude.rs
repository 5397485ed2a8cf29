//! Prelude module for convenient imports.
//!
//! Import commonly used types with a single line:
//!
//! ```rust,ignore
//! use prunedecl_core::prelude::*;
//! ```

// Core types
pub use crate::error::{PruneError, PruneResult};
pub use crate::tree::{load_tree, DeclKind, DeclNode, NodeId, ProgramTree, Span};

// Selection
pub use crate::select::{Selection, Transformation};

// Configuration
pub use crate::config::{load_config, PruneConfig};

// Builder API
pub use crate::builder::{AnalysisResult, Prunedecl};
