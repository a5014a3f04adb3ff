use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

/// Directed dependency graph over named nodes (modules or qualified type names).
///
/// Nodes are stored in a flat vector and edges refer to indices, so the
/// traversal state is plain per-index marks. Every traversal visits nodes and
/// edges in name order, which keeps cycle reports and orderings stable
/// regardless of insertion order.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    nodes: Vec<String>,
    index: BTreeMap<String, usize>,
    /// Edges from a dependent to its dependencies, sorted by dependency name
    edges: Vec<BTreeSet<String>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, returning its index. Adding an existing node is a no-op.
    pub fn add_node(&mut self, name: &str) -> usize {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = self.nodes.len();
        self.nodes.push(name.to_string());
        self.index.insert(name.to_string(), idx);
        self.edges.push(BTreeSet::new());
        idx
    }

    /// Record that `dependent` depends on `dependency`; both become nodes.
    pub fn add_dependency(&mut self, dependent: &str, dependency: &str) {
        self.add_node(dependency);
        let idx = self.add_node(dependent);
        self.edges[idx].insert(dependency.to_string());
    }

    fn successors(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        self.edges[idx]
            .iter()
            .filter_map(|name| self.index.get(name).copied())
    }

    /// Every node reachable from `name`, excluding `name` itself unless it
    /// sits on a cycle.
    pub fn closure(&self, name: &str) -> BTreeSet<String> {
        let mut reached = BTreeSet::new();
        let Some(&start) = self.index.get(name) else {
            return reached;
        };

        let mut seen = vec![false; self.nodes.len()];
        let mut stack: Vec<usize> = self.successors(start).collect();
        while let Some(idx) = stack.pop() {
            if seen[idx] {
                continue;
            }
            seen[idx] = true;
            reached.insert(self.nodes[idx].clone());
            stack.extend(self.successors(idx));
        }
        reached
    }

    /// Cycles closed by a back edge during a depth-first walk, each reported once.
    ///
    /// Every node on a cycle shows up in at least one entry, but overlapping
    /// cycles that share an already finished node are not all enumerated.
    /// A cycle is listed in traversal order, rotated so that its smallest
    /// member comes first: `[a, b, c]` means `a -> b -> c -> a`.
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        let mut marks = vec![Mark::Unvisited; self.nodes.len()];
        let mut stack = Vec::new();
        let mut found = BTreeSet::new();

        for idx in self.index.values().copied() {
            if marks[idx] == Mark::Unvisited {
                self.visit_for_cycles(idx, &mut marks, &mut stack, &mut found);
            }
        }

        found.into_iter().collect()
    }

    fn visit_for_cycles(
        &self,
        idx: usize,
        marks: &mut [Mark],
        stack: &mut Vec<usize>,
        found: &mut BTreeSet<Vec<String>>,
    ) {
        marks[idx] = Mark::OnStack;
        stack.push(idx);

        for next in self.successors(idx) {
            match marks[next] {
                Mark::Unvisited => self.visit_for_cycles(next, marks, stack, found),
                Mark::OnStack => {
                    if let Some(start) = stack.iter().position(|&i| i == next) {
                        let members: Vec<String> =
                            stack[start..].iter().map(|&i| self.nodes[i].clone()).collect();
                        found.insert(rotate_to_smallest(members));
                    }
                }
                Mark::Done => {}
            }
        }

        stack.pop();
        marks[idx] = Mark::Done;
    }

    /// Dependencies before dependents; unrelated nodes in name order.
    ///
    /// Edges closing a cycle are ignored, so every node appears exactly once
    /// even in a cyclic graph.
    pub fn topological_order(&self) -> Vec<String> {
        let mut marks = vec![Mark::Unvisited; self.nodes.len()];
        let mut sorted = Vec::with_capacity(self.nodes.len());

        for idx in self.index.values().copied() {
            self.topological_visit(idx, &mut marks, &mut sorted);
        }

        sorted
    }

    fn topological_visit(&self, idx: usize, marks: &mut [Mark], sorted: &mut Vec<String>) {
        if marks[idx] != Mark::Unvisited {
            return;
        }
        marks[idx] = Mark::OnStack;
        for next in self.successors(idx) {
            self.topological_visit(next, marks, sorted);
        }
        marks[idx] = Mark::Done;
        sorted.push(self.nodes[idx].clone());
    }
}

fn rotate_to_smallest(mut members: Vec<String>) -> Vec<String> {
    if let Some(pos) = members
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.cmp(b.1))
        .map(|(pos, _)| pos)
    {
        members.rotate_left(pos);
    }
    members
}
