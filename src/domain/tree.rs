//! Arena-based orbment tree
//!
//! Each node represents one slot. The shared slot (if any) is the root and
//! branches into one chain per line; non-shared slots form linear chains.
//! Placement state is deliberately kept OUT of the tree: the search engine
//! carries it in a separate vector indexed by traversal position, so the
//! tree stays immutable during search and can be shared or cloned freely.

use generational_arena::{Arena, Index};
use termtree::Tree;
use tracing::instrument;

use crate::domain::entities::Character;

/// One slot of the orbment after flattening into the tree.
#[derive(Debug, Clone)]
pub struct SlotNode {
    /// Stable index in traversal order; the search visits nodes in
    /// ascending position and placement vectors are indexed by it.
    pub position: usize,
    /// Owning line, `None` for the shared root
    pub line: Option<usize>,
    /// Position of the slot within its line
    pub slot_index: usize,
    /// Element restriction inherited from the slot
    pub restriction: Option<String>,
    pub parent: Option<Index>,
    pub children: Vec<Index>,
}

impl SlotNode {
    /// A node is shared iff it branches into more than one line.
    pub fn is_shared(&self) -> bool {
        self.children.len() > 1
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Tree of slot nodes for one character, plus the fixed traversal order.
#[derive(Debug, Clone, Default)]
pub struct OrbmentTree {
    arena: Arena<SlotNode>,
    root: Option<Index>,
    order: Vec<Index>,
}

impl OrbmentTree {
    /// Build the tree from a character's line topology.
    ///
    /// If the first slot of line 0 is shared and more than one line exists,
    /// the shared slot becomes the root and every line's remaining slots
    /// attach as a chain beneath it. Otherwise only line 0's full chain is
    /// built — additional lines without a genuine shared root are not
    /// searched (known limitation, kept for parity with the game data the
    /// topology was captured from).
    #[instrument(level = "debug", skip(character), fields(character = %character.name))]
    pub fn build(character: &Character) -> Self {
        let mut tree = Self::default();

        let Some(first_line) = character.lines.first() else {
            return tree;
        };
        let Some(first_slot) = first_line.slots.first() else {
            return tree;
        };

        if first_slot.shared && character.lines.len() > 1 {
            let root = tree.insert(SlotNode {
                position: 0,
                line: None,
                slot_index: first_slot.index,
                restriction: first_slot.restriction.clone(),
                parent: None,
                children: Vec::new(),
            });
            tree.root = Some(root);

            for (line_idx, line) in character.lines.iter().enumerate() {
                if line.slots.len() > 1 {
                    tree.build_chain(line_idx, &line.slots[1..], Some(root));
                }
            }
        } else {
            tree.root = tree.build_chain(0, &first_line.slots, None);
        }

        tree
    }

    fn insert(&mut self, node: SlotNode) -> Index {
        let idx = self.arena.insert(node);
        self.order.push(idx);
        idx
    }

    /// Append a linear chain of slots for one line, returning its head.
    fn build_chain(
        &mut self,
        line_idx: usize,
        slots: &[crate::domain::entities::Slot],
        parent: Option<Index>,
    ) -> Option<Index> {
        let mut head = None;
        let mut prev = parent;
        for slot in slots {
            let position = self.order.len();
            let idx = self.insert(SlotNode {
                position,
                line: Some(line_idx),
                slot_index: slot.index,
                restriction: slot.restriction.clone(),
                parent: prev,
                children: Vec::new(),
            });
            if let Some(prev_idx) = prev {
                self.arena[prev_idx].children.push(idx);
            }
            head.get_or_insert(idx);
            prev = Some(idx);
        }
        head
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    /// Total number of slots, which is also the recursion depth of a search.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Nodes in the fixed traversal order.
    pub fn order(&self) -> &[Index] {
        &self.order
    }

    pub fn node(&self, idx: Index) -> &SlotNode {
        &self.arena[idx]
    }

    /// Node at a traversal position.
    pub fn node_at(&self, position: usize) -> &SlotNode {
        &self.arena[self.order[position]]
    }

    /// Whether the parent of `node` is a branching (shared) node.
    /// Canonical-ordering pruning only applies when it is not.
    pub fn parent_is_shared(&self, node: &SlotNode) -> bool {
        node.parent.is_some_and(|p| self.arena[p].is_shared())
    }

    /// Every root-to-leaf path, one per line (shared prefix included).
    ///
    /// Per-line element totals and art unlocking always go through these
    /// paths, never through the global traversal order.
    pub fn paths(&self) -> Vec<Vec<Index>> {
        let mut paths = Vec::new();
        if let Some(root) = self.root {
            self.collect_paths(root, &mut Vec::new(), &mut paths);
        }
        paths
    }

    fn collect_paths(&self, idx: Index, current: &mut Vec<Index>, paths: &mut Vec<Vec<Index>>) {
        current.push(idx);
        let node = &self.arena[idx];
        if node.is_leaf() {
            paths.push(current.clone());
        } else {
            for &child in &node.children {
                self.collect_paths(child, current, paths);
            }
        }
        current.pop();
    }

    /// Render the tree for terminal display.
    pub fn to_tree_string(&self) -> Tree<String> {
        match self.root {
            Some(root) => self.render(root),
            None => Tree::new("empty orbment".to_string()),
        }
    }

    fn render(&self, idx: Index) -> Tree<String> {
        let node = &self.arena[idx];
        let line = match node.line {
            Some(i) => format!("line {}", i + 1),
            None => "shared".to_string(),
        };
        let restriction = node
            .restriction
            .as_deref()
            .map(|r| format!(" [{r}]"))
            .unwrap_or_default();
        let label = format!("slot {} ({line}){restriction}", node.slot_index);

        let leaves: Vec<_> = node.children.iter().map(|&c| self.render(c)).collect();
        Tree::new(label).with_leaves(leaves)
    }
}
