//! Pipeline job graph built with petgraph
//!
//! - **Directed Graph**: `A → B` means "B runs after A"
//! - **Nodes**: Jobs (one builder per platform, one publisher)
//! - **Edges**: Barrier dependencies (every builder precedes the publisher)
//! - **Stages**: Topological levels; jobs within a stage run in parallel,
//!   stages run sequentially
//!
//! The publisher's stage only runs when every job in the preceding stage
//! succeeded, which is the full-build barrier the publication invariant
//! depends on.

use crate::core::error::{ForgeError, ForgeResult};
use crate::platform::Platform;
use petgraph::Direction;
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use std::fmt;

/// A schedulable job in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Job {
  /// Build the binary for one platform target
  Build(Platform),
  /// Aggregate artifacts and create the release
  Publish,
}

impl fmt::Display for Job {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Job::Build(platform) => write!(f, "build({})", platform),
      Job::Publish => write!(f, "publish"),
    }
  }
}

/// The job dependency graph for one pipeline run
pub struct PipelineGraph {
  graph: DiGraph<Job, ()>,
}

impl PipelineGraph {
  /// Build the graph for the configured platform targets
  ///
  /// With `publish = false` (e.g. `run --skip-publish`) the graph holds only
  /// the independent builder jobs.
  pub fn new(platforms: &[Platform], publish: bool) -> Self {
    let mut graph = DiGraph::new();

    let builders: Vec<NodeIndex> = platforms.iter().map(|p| graph.add_node(Job::Build(*p))).collect();

    if publish {
      let publisher = graph.add_node(Job::Publish);
      for builder in builders {
        graph.add_edge(builder, publisher, ());
      }
    }

    Self { graph }
  }

  /// Number of jobs in the graph
  pub fn len(&self) -> usize {
    self.graph.node_count()
  }

  pub fn is_empty(&self) -> bool {
    self.graph.node_count() == 0
  }

  /// Derive sequential stages of parallel jobs.
  ///
  /// A job's stage is one past the latest stage of its dependencies, so the
  /// publisher lands in the stage after all builders: a join, not a lock.
  pub fn stages(&self) -> ForgeResult<Vec<Vec<Job>>> {
    let order =
      algo::toposort(&self.graph, None).map_err(|_| ForgeError::message("Pipeline job graph contains a cycle"))?;

    let mut level: HashMap<NodeIndex, usize> = HashMap::new();
    let mut stages: Vec<Vec<Job>> = Vec::new();

    for node in order {
      let stage = self
        .graph
        .neighbors_directed(node, Direction::Incoming)
        .map(|dep| level[&dep] + 1)
        .max()
        .unwrap_or(0);
      level.insert(node, stage);

      if stages.len() <= stage {
        stages.resize_with(stage + 1, Vec::new);
      }
      stages[stage].push(self.graph[node]);
    }

    Ok(stages)
  }
}
