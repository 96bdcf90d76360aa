//! Defines the inner representation
//! of the Decision Tree class.
use serde::{Serialize, Deserialize};

use crate::classifier::Label;
use super::split_rule::*;


/// Enumeration of `BranchNode` and `LeafNode`.
/// A node is either an internal node with both children
/// and a splitting rule, or a terminal node with a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// A node that have two childrens.
    Branch(BranchNode),


    /// A node that have no child.
    Leaf(LeafNode),
}


/// Represents the branch nodes of decision tree.
/// Each `BranchNode` must have two childrens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchNode {
    pub(super) rule: Splitter,
    pub(super) left: Box<Node>,
    pub(super) right: Box<Node>,
    pub(super) depth: usize,
}


/// Represents the leaf nodes of decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafNode {
    pub(super) category: Label,
    pub(super) depth: usize,
}


impl BranchNode {
    /// The feature index this node tests.
    #[inline]
    pub fn feature(&self) -> usize {
        self.rule.feature
    }


    /// The threshold of the test `x[feature] < threshold`.
    #[inline]
    pub fn threshold(&self) -> f64 {
        self.rule.threshold
    }


    /// The child receiving the examples that pass the test.
    #[inline]
    pub fn left(&self) -> &Node {
        &self.left
    }


    /// The child receiving the other examples.
    #[inline]
    pub fn right(&self) -> &Node {
        &self.right
    }


    /// Depth of this node.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }
}


impl LeafNode {
    /// The predicted label.
    #[inline]
    pub fn category(&self) -> Label {
        self.category
    }


    /// Depth of this node.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }
}


impl Node {
    /// Construct a leaf node that predicts `category`.
    #[inline]
    pub(super) fn leaf(category: Label, depth: usize) -> Self {
        Self::Leaf(LeafNode { category, depth, })
    }


    /// Construct a branch node from the arguments.
    #[inline]
    pub(super) fn branch(
        rule: Splitter,
        left: Node,
        right: Node,
        depth: usize,
    ) -> Self
    {
        Self::Branch(BranchNode {
            rule,
            left: Box::new(left),
            right: Box::new(right),
            depth,
        })
    }


    /// Returns `true` if this node has no child.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }


    /// The label predicted by this node if it is terminal.
    #[inline]
    pub fn category(&self) -> Option<Label> {
        match self {
            Self::Leaf(leaf) => Some(leaf.category()),
            Self::Branch(_) => None,
        }
    }


    /// The feature index tested by this node if it is internal.
    #[inline]
    pub fn split_index(&self) -> Option<usize> {
        match self {
            Self::Branch(branch) => Some(branch.feature()),
            Self::Leaf(_) => None,
        }
    }


    /// The threshold tested by this node if it is internal.
    /// Examples with `x[split_index] < split_value` go left.
    #[inline]
    pub fn split_value(&self) -> Option<f64> {
        match self {
            Self::Branch(branch) => Some(branch.threshold()),
            Self::Leaf(_) => None,
        }
    }


    /// Left child.
    #[inline]
    pub fn left(&self) -> Option<&Node> {
        match self {
            Self::Branch(branch) => Some(branch.left()),
            Self::Leaf(_) => None,
        }
    }


    /// Right child.
    #[inline]
    pub fn right(&self) -> Option<&Node> {
        match self {
            Self::Branch(branch) => Some(branch.right()),
            Self::Leaf(_) => None,
        }
    }


    /// Depth of this node. The root has depth `0`.
    #[inline]
    pub fn depth(&self) -> usize {
        match self {
            Self::Branch(branch) => branch.depth(),
            Self::Leaf(leaf) => leaf.depth(),
        }
    }


    /// Returns the number of leaves of this sub-tree.
    pub fn leaves(&self) -> usize {
        match self {
            Self::Branch(branch) => branch.left.leaves() + branch.right.leaves(),
            Self::Leaf(_) => 1,
        }
    }


    /// Returns the largest depth of a node in this sub-tree.
    pub fn height(&self) -> usize {
        match self {
            Self::Branch(branch) => {
                branch.left.height().max(branch.right.height())
            },
            Self::Leaf(leaf) => leaf.depth,
        }
    }


    /// Returns the largest feature index tested in this sub-tree,
    /// or `None` if it is a single leaf.
    pub(super) fn max_feature(&self) -> Option<usize> {
        match self {
            Self::Branch(branch) => {
                let children = branch.left.max_feature()
                    .max(branch.right.max_feature());
                Some(branch.feature()).max(children)
            },
            Self::Leaf(_) => None,
        }
    }


    /// Traverse from this node to a leaf and return its category.
    /// The caller guarantees that `example` has enough features.
    #[inline]
    pub(crate) fn classify(&self, example: &[f64]) -> Label {
        let mut node = self;
        loop {
            match node {
                Self::Leaf(leaf) => return leaf.category,
                Self::Branch(branch) => {
                    node = match branch.rule.split(example) {
                        LeftRight::Left => &*branch.left,
                        LeftRight::Right => &*branch.right,
                    };
                },
            }
        }
    }


    pub(super) fn to_dot_info(&self, id: usize) -> (Vec<String>, usize) {
        match self {
            Node::Branch(b) => {
                let b_info = format!(
                    "\tnode_{id} [ label = \"x[{feat}] < {thr:.2} ?\" ];\n",
                    feat = b.rule.feature,
                    thr = b.rule.threshold
                );

                let (l_info, next_id) = b.left.to_dot_info(id + 1);
                let (mut r_info, ret_id) = b.right.to_dot_info(next_id);

                let mut info = l_info;
                info.push(b_info);
                info.append(&mut r_info);

                let l_edge = format!(
                    "\tnode_{id} -- node_{l_id} [ label = \"Yes\" ];\n",
                    l_id = id + 1
                );
                let r_edge = format!(
                    "\tnode_{id} -- node_{r_id} [ label = \"No\" ];\n",
                    r_id = next_id
                );

                info.push(l_edge);
                info.push(r_edge);

                (info, ret_id)
            },
            Node::Leaf(l) => {
                let info = format!(
                    "\tnode_{id} [ \
                     label = \"{p}\", \
                     shape = box, \
                     ];\n",
                    p = l.category
                );

                (vec![info], id + 1)
            }
        }
    }
}
