//! Action reference graph built on `petgraph`.

use std::collections::HashMap;

use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;

use crate::error::{PlanError, ReferenceKind};
use crate::plan::Plan;

/// A directed graph of the references between a plan's actions.
///
/// An edge `a -> b` labelled with a [`ReferenceKind`] means action `a` lists
/// `b` as a condition, dependency, or recovery. Unlike a workflow DAG this
/// graph may legitimately contain cycles; the engine terminates on them
/// through its caches.
#[derive(Debug)]
pub struct ActionGraph {
    graph: DiGraph<String, ReferenceKind>,
    index_map: HashMap<String, NodeIndex>,
    roots: Vec<NodeIndex>,
}

impl ActionGraph {
    /// Build an [`ActionGraph`] from a [`Plan`].
    ///
    /// Returns the first unresolved reference as an error.
    pub fn from_plan(plan: &Plan) -> Result<Self, PlanError> {
        let mut graph = DiGraph::new();
        let mut index_map = HashMap::new();

        for name in plan.action_names() {
            let idx = graph.add_node(name.to_string());
            index_map.insert(name.to_string(), idx);
        }

        for name in plan.action_names() {
            let action = &plan.actions[name];
            let from = index_map[name];
            let lists = [
                (ReferenceKind::Condition, &action.conditions),
                (ReferenceKind::Dependency, &action.dependencies),
                (ReferenceKind::Recovery, &action.recovery_actions),
            ];
            for (kind, refs) in lists {
                for reference in refs {
                    let to = index_map.get(reference.as_str()).ok_or_else(|| {
                        PlanError::UnknownReference {
                            action: name.to_string(),
                            kind,
                            name: reference.clone(),
                        }
                    })?;
                    graph.add_edge(from, *to, kind);
                }
            }
        }

        let roots = plan
            .critical_actions
            .iter()
            .map(|name| {
                index_map
                    .get(name.as_str())
                    .copied()
                    .ok_or_else(|| PlanError::UnknownCriticalAction { name: name.clone() })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            graph,
            index_map,
            roots,
        })
    }

    /// Returns `true` if any chain of references leads back to where it started.
    #[must_use]
    pub fn has_cycle(&self) -> bool {
        algo::is_cyclic_directed(&self.graph)
    }

    /// Actions that no critical action can reach, sorted by name.
    #[must_use]
    pub fn unreachable_actions(&self) -> Vec<&str> {
        let mut visited = vec![false; self.graph.node_count()];
        for &root in &self.roots {
            let mut dfs = Dfs::new(&self.graph, root);
            while let Some(idx) = dfs.next(&self.graph) {
                visited[idx.index()] = true;
            }
        }
        let mut names: Vec<&str> = self
            .graph
            .node_indices()
            .filter(|idx| !visited[idx.index()])
            .map(|idx| self.graph[idx].as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// The actions directly referenced by `name`, with the kind of reference.
    #[must_use]
    pub fn references(&self, name: &str) -> Vec<(&str, ReferenceKind)> {
        let Some(&idx) = self.index_map.get(name) else {
            return Vec::new();
        };
        let mut refs: Vec<(&str, ReferenceKind)> = self
            .graph
            .edges(idx)
            .map(|edge| {
                use petgraph::visit::EdgeRef;
                (self.graph[edge.target()].as_str(), *edge.weight())
            })
            .collect();
        refs.sort_unstable_by_key(|(name, _)| *name);
        refs
    }

    /// Number of actions.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of references.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
