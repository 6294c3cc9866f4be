//! PO-MCTS tree data model (spec §3 "Tree nodes", §4.F, §9 "Tree with
//! parent back-links").
//!
//! Grounded on `other_examples/0beac852_DennisLent-weavetree`'s arena
//! pattern (typed `NodeId` indices, parent back-links as plain indices
//! rather than `Rc<RefCell<>>`), per §9's explicit recommendation to use
//! an arena with index-based back-links over freeform raw pointers.

use std::collections::HashMap;

/// Index of an observation node in the tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ONodeId(usize);

/// Index of an action node in the tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ANodeId(usize);

/// Observation node: keyed by the observation index that led to it (`0`
/// at the root), with a visit count, a mapping from action index to child
/// action-node, and a back-link to its parent action-node (`None` at
/// root).
#[derive(Debug, Clone)]
pub struct ONode {
    pub observation: usize,
    pub visits: u32,
    pub children: HashMap<usize, ANodeId>,
    pub parent: Option<ANodeId>,
}

/// Action node: keyed by the action index, with a visit count, a running
/// mean value estimate, a mapping from observation index to child
/// observation-node, and a back-link to its parent observation-node.
#[derive(Debug, Clone)]
pub struct ANode {
    pub action: usize,
    pub visits: u32,
    pub value: f64,
    pub children: HashMap<usize, ONodeId>,
    pub parent: ONodeId,
}

/// The PO-MCTS tree: an arena of observation- and action-nodes, owned as
/// a whole. Nodes are created lazily on first visit and never deleted
/// during a search; the entire arena is dropped when the `Tree` is
/// dropped.
#[derive(Debug, Clone)]
pub struct Tree {
    onodes: Vec<ONode>,
    anodes: Vec<ANode>,
    root: ONodeId,
}

impl Tree {
    /// A fresh tree with a single root observation-node, observation
    /// index `0`, visit count `0`, no parent.
    pub fn new() -> Self {
        let root_node = ONode {
            observation: 0,
            visits: 0,
            children: HashMap::new(),
            parent: None,
        };
        Tree {
            onodes: vec![root_node],
            anodes: Vec::new(),
            root: ONodeId(0),
        }
    }

    pub fn root(&self) -> ONodeId {
        self.root
    }

    pub fn onode(&self, id: ONodeId) -> &ONode {
        &self.onodes[id.0]
    }

    pub fn onode_mut(&mut self, id: ONodeId) -> &mut ONode {
        &mut self.onodes[id.0]
    }

    pub fn anode(&self, id: ANodeId) -> &ANode {
        &self.anodes[id.0]
    }

    pub fn anode_mut(&mut self, id: ANodeId) -> &mut ANode {
        &mut self.anodes[id.0]
    }

    /// Insert a new action node as a child of `parent`, keyed by `action`.
    /// Returns the new node's id; the caller is responsible for linking
    /// it into `parent`'s `children` map.
    pub fn push_anode(&mut self, parent: ONodeId, action: usize, visits: u32, value: f64) -> ANodeId {
        let id = ANodeId(self.anodes.len());
        self.anodes.push(ANode {
            action,
            visits,
            value,
            children: HashMap::new(),
            parent,
        });
        id
    }

    /// Insert a new observation node as a child of `parent`, keyed by
    /// `observation`. Returns the new node's id; the caller is
    /// responsible for linking it into `parent`'s `children` map.
    pub fn push_onode(&mut self, parent: ANodeId, observation: usize) -> ONodeId {
        let id = ONodeId(self.onodes.len());
        self.onodes.push(ONode {
            observation,
            visits: 0,
            children: HashMap::new(),
            parent: Some(parent),
        });
        id
    }

    /// Walk the back-link chain from `h` up to the root, then apply
    /// `belief_update` in root-to-leaf order using each step's kernel and
    /// observed improvement. At the root, returns `prior` unchanged.
    pub fn belief_along_history(
        &self,
        h: ONodeId,
        prior: &[f64],
        kernels: &[crate::kernel::Kernel],
        policy: crate::config::InconsistentObservationPolicy,
    ) -> crate::error::Result<Vec<f64>> {
        let mut history = Vec::new();
        let mut current = h;
        while let Some(anode_id) = self.onode(current).parent {
            let anode = self.anode(anode_id);
            let observation = self.onode(current).observation;
            history.push((anode.action, observation));
            current = anode.parent;
        }
        history.reverse();

        let mut belief = prior.to_vec();
        for (action, observation) in history {
            belief = crate::belief::belief_update(&belief, &kernels[action], observation, policy)?;
        }
        Ok(belief)
    }

    /// Total number of observation- and action-nodes in the tree.
    /// Carried over from `original_source/utc.cpp`'s `onode_count`
    /// diagnostic.
    pub fn node_count(&self) -> usize {
        self.onodes.len() + self.anodes.len()
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::build_kernel;

    fn uniform_likelihood(_i: f64, _o: f64) -> f64 {
        1.0
    }

    #[test]
    fn fresh_tree_has_only_root() {
        let tree = Tree::new();
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.onode(tree.root()).observation, 0);
        assert!(tree.onode(tree.root()).parent.is_none());
    }

    #[test]
    fn belief_at_root_is_prior_unchanged() {
        let tree = Tree::new();
        let prior = vec![0.25, 0.25, 0.25, 0.25];
        let kernels: Vec<_> = (0..2)
            .map(|n| build_kernel(&[0.0, 1.0, 2.0, 3.0], uniform_likelihood, n).unwrap())
            .collect();
        let belief = tree
            .belief_along_history(tree.root(), &prior, &kernels, crate::config::InconsistentObservationPolicy::UniformFallback)
            .unwrap();
        assert_eq!(belief, prior);
    }

    #[test]
    fn belief_along_one_step_history_matches_direct_update() {
        let values = vec![0.0, 1.0, 2.0, 3.0];
        let kernels: Vec<_> = (0..2)
            .map(|n| build_kernel(&values, uniform_likelihood, n).unwrap())
            .collect();
        let prior = vec![0.25, 0.25, 0.25, 0.25];

        let mut tree = Tree::new();
        let root = tree.root();
        let anode = tree.push_anode(root, 1, 0, 0.0);
        tree.onode_mut(root).children.insert(1, anode);
        let onode = tree.push_onode(anode, 2);
        tree.anode_mut(anode).children.insert(2, onode);

        let policy = crate::config::InconsistentObservationPolicy::UniformFallback;
        let from_tree = tree.belief_along_history(onode, &prior, &kernels, policy).unwrap();
        let direct = crate::belief::belief_update(&prior, &kernels[1], 2, policy).unwrap();
        assert_eq!(from_tree, direct);
    }

    #[test]
    fn node_count_grows_with_insertions() {
        let mut tree = Tree::new();
        let root = tree.root();
        let anode = tree.push_anode(root, 0, 100, 1.5);
        tree.onode_mut(root).children.insert(0, anode);
        assert_eq!(tree.node_count(), 2);
        let onode = tree.push_onode(anode, 1);
        tree.anode_mut(anode).children.insert(1, onode);
        assert_eq!(tree.node_count(), 3);
    }
}
