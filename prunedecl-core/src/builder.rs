//! Builder pattern API for prunedecl.
//!
//! Provides a fluent interface for configuring and running one pruning pass:
//!
//! ```rust,ignore
//! use prunedecl_core::prelude::*;
//!
//! let pruner = Prunedecl::new(load_tree(tree_path)?, source)
//!     .all_at_once(false)
//!     .protect(["^/usr/include/"]);
//!
//! let analysis = pruner.analyze()?;
//! let mut transformation = pruner.transformation(&analysis);
//! println!("instances: {}", transformation.query_count());
//! transformation.select_and_apply(Selection::Single(1))?;
//! ```

use serde::Serialize;
use tracing::debug;

use crate::buffer::TextBuffer;
use crate::candidate::{collect_candidates, ApplyReport, Candidate, CandidateContext, SourcePolicy};
use crate::config::PruneConfig;
use crate::error::PruneResult;
use crate::liveness::{propagate, PropagationStats};
use crate::model::{GroupSource, LivenessState, RelationBuilder};
use crate::select::{Selection, Transformation};
use crate::span::{FullSpanResolver, SpanResolver};
use crate::tree::ProgramTree;

/// Builder for one analysis-and-apply cycle over a tree and its source text.
pub struct Prunedecl {
    /// Parsed declarations of the program
    tree: ProgramTree,

    /// Original bytes of the main file
    source: Vec<u8>,

    /// Collapse every candidate into one group
    all_at_once: bool,

    /// Regexes over declaration file names that must never be edited
    protected: Vec<String>,

    /// How a declaration maps to its removable range
    resolver: Box<dyn SpanResolver>,
}

impl Prunedecl {
    /// Create a builder with the default full-span resolver.
    pub fn new(tree: ProgramTree, source: impl Into<Vec<u8>>) -> Self {
        Self {
            tree,
            source: source.into(),
            all_at_once: false,
            protected: Vec::new(),
            resolver: Box::new(FullSpanResolver),
        }
    }

    /// Offer all candidates as a single instance.
    pub fn all_at_once(mut self, enabled: bool) -> Self {
        self.all_at_once = enabled;
        self
    }

    /// Add protected-file patterns.
    pub fn protect(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.protected.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Replace the span resolver.
    pub fn with_resolver(mut self, resolver: impl SpanResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// Merge settings from a config file. Flags already enabled stay enabled.
    pub fn with_config(mut self, config: &PruneConfig) -> Self {
        self.all_at_once |= config.all_at_once.unwrap_or(false);
        if let Some(patterns) = &config.protected {
            self.protected.extend(patterns.iter().cloned());
        }
        self
    }

    pub fn tree(&self) -> &ProgramTree {
        &self.tree
    }

    pub fn source(&self) -> &[u8] {
        &self.source
    }

    /// Build relations, run the fixpoint and collect candidates.
    pub fn analyze(&self) -> PruneResult<AnalysisResult> {
        // 1. Compile protection before any work
        let policy = SourcePolicy::new(&self.protected)?;

        // 2. One traversal: groups, containment, seeds
        let builder = RelationBuilder::new(&self.tree).walk();
        let dangling = builder.dangling_handles();
        let (graph, mut state) = builder.finish();

        // 3. Fixpoint
        let stats = propagate(&graph, &mut state);

        // 4. Candidates
        let candidates = collect_candidates(&self.tree, &state, self.all_at_once);

        let summary = AnalysisSummary {
            declarations: self.tree.len(),
            referenced: state.referenced_count(),
            used: state.used_count(),
            span_groups: graph.group_count(GroupSource::Span),
            template_groups: graph.group_count(GroupSource::Template),
            redeclaration_groups: graph.group_count(GroupSource::Redeclaration),
            alias_groups: graph.group_count(GroupSource::Alias),
            containment_edges: graph.containment_edge_count(),
            dangling_handles: dangling,
            passes: stats.passes,
            candidates: candidates.len(),
        };
        debug!(?summary, "analysis complete");

        Ok(AnalysisResult {
            state,
            stats,
            candidates,
            policy,
            summary,
        })
    }

    /// Start a transformation over a fresh buffer of the source text.
    pub fn transformation<'a>(&'a self, analysis: &'a AnalysisResult) -> Transformation<'a> {
        let ctx = CandidateContext::new(&self.tree, self.resolver.as_ref(), &analysis.policy);
        Transformation::new(ctx, analysis.candidates.clone(), TextBuffer::new(self.source.clone()))
    }

    /// Analyze and report the number of valid instances.
    pub fn query_count(&self) -> PruneResult<usize> {
        let analysis = self.analyze()?;
        Ok(self.transformation(&analysis).query_count())
    }

    /// Analyze, apply `selection` and return the rewritten bytes.
    pub fn run(&self, selection: Selection) -> PruneResult<RunOutcome> {
        let analysis = self.analyze()?;
        let mut transformation = self.transformation(&analysis);
        let report = transformation.select_and_apply(selection)?;
        Ok(RunOutcome {
            report,
            output: transformation.rewritten(),
        })
    }
}

/// Result of running the analysis.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// Liveness bits at the fixpoint
    pub state: LivenessState,

    /// Fixpoint pass statistics
    pub stats: PropagationStats,

    /// Candidates in ordinal order, before re-validation
    pub candidates: Vec<Candidate>,

    /// Compiled protection rules
    pub policy: SourcePolicy,

    /// Counters for logs and `--list --json`
    pub summary: AnalysisSummary,
}

impl AnalysisResult {
    /// Check if anything could be removed.
    pub fn has_candidates(&self) -> bool {
        !self.candidates.is_empty()
    }

    /// Declarations covered by all candidates.
    pub fn prunable_count(&self) -> usize {
        self.candidates.iter().map(|c| c.leaves().len()).sum()
    }
}

/// Serializable overview of one analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisSummary {
    pub declarations: usize,
    pub referenced: usize,
    pub used: usize,
    pub span_groups: usize,
    pub template_groups: usize,
    pub redeclaration_groups: usize,
    pub alias_groups: usize,
    pub containment_edges: usize,
    pub dangling_handles: usize,
    pub passes: usize,
    pub candidates: usize,
}

/// What [`Prunedecl::run`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub report: ApplyReport,
    pub output: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PruneError;
    use crate::span::ExactSpanResolver;
    use crate::tree::{DeclKind, DeclNode};

    const SOURCE: &str = "typedef int A;\nint main() {}\n";

    fn tree() -> ProgramTree {
        let mut tree = ProgramTree::new("input.cpp");
        tree.push(DeclNode::new("A", DeclKind::TypeAlias).with_span(0, 13));
        let mut main = DeclNode::new("main", DeclKind::Function).with_span(15, 28);
        main.must_be_emitted = true;
        tree.push(main);
        tree
    }

    #[test]
    fn test_analyze_summary() {
        let pruner = Prunedecl::new(tree(), SOURCE);
        let analysis = pruner.analyze().unwrap();
        assert_eq!(analysis.summary.declarations, 2);
        assert_eq!(analysis.summary.referenced, 1);
        assert_eq!(analysis.summary.candidates, 1);
        assert!(analysis.has_candidates());
        assert_eq!(analysis.prunable_count(), 1);
    }

    #[test]
    fn test_run_removes_alias_with_terminator() {
        let outcome = Prunedecl::new(tree(), SOURCE).run(Selection::Single(1)).unwrap();
        assert_eq!(outcome.output, b"\nint main() {}\n");
        assert_eq!(outcome.report.removed, 1);
    }

    #[test]
    fn test_exact_resolver_keeps_terminator() {
        let outcome = Prunedecl::new(tree(), SOURCE)
            .with_resolver(ExactSpanResolver)
            .run(Selection::Single(1))
            .unwrap();
        assert_eq!(outcome.output, b";\nint main() {}\n");
    }

    #[test]
    fn test_protect_main_file() {
        let pruner = Prunedecl::new(tree(), SOURCE).protect(["input\\.cpp"]);
        assert_eq!(pruner.query_count().unwrap(), 0);
    }

    #[test]
    fn test_bad_pattern() {
        let pruner = Prunedecl::new(tree(), SOURCE).protect(["("]);
        assert!(matches!(pruner.analyze(), Err(PruneError::Pattern { .. })));
    }

    #[test]
    fn test_with_config() {
        let config = PruneConfig {
            all_at_once: Some(true),
            protected: Some(vec!["\\.h$".to_string()]),
            output: None,
        };
        let pruner = Prunedecl::new(tree(), SOURCE).with_config(&config);
        assert!(pruner.all_at_once);
        assert_eq!(pruner.protected, vec!["\\.h$".to_string()]);

        let keep = Prunedecl::new(tree(), SOURCE)
            .all_at_once(true)
            .with_config(&PruneConfig::default());
        assert!(keep.all_at_once);
    }

    #[test]
    fn test_config_patterns_compile_into_policy() {
        let protect = PruneConfig {
            protected: Some(vec!["input\\.cpp".to_string()]),
            ..Default::default()
        };
        let pruner = Prunedecl::new(tree(), SOURCE).with_config(&protect);
        assert_eq!(pruner.query_count().unwrap(), 0);

        let broken = PruneConfig {
            protected: Some(vec!["[".to_string()]),
            ..Default::default()
        };
        let pruner = Prunedecl::new(tree(), SOURCE).with_config(&broken);
        assert!(matches!(pruner.analyze(), Err(PruneError::Pattern { .. })));
    }
}
