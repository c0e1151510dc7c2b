use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use ndarray::{ArrayView1, ArrayView2};
use serde::Deserialize;

/// Maps a batch of feature rows to predicted class codes.
pub trait Classifier: Send + Sync {
    fn num_features(&self) -> usize;
    fn predict(&self, batch: ArrayView2<'_, f64>) -> Result<Vec<u32>, ModelError>;
}

/// Training objective recorded in the exported model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Objective {
    #[serde(rename = "binary:logistic")]
    BinaryLogistic,
    #[serde(rename = "multi:softmax")]
    MultiSoftmax,
    #[serde(rename = "multi:softprob")]
    MultiSoftprob,
}

/// A node of a regression tree. Rows with `x[split] < threshold` take `yes`;
/// NaN features take `missing` (or `yes` when absent).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        split: usize,
        threshold: f64,
        yes: usize,
        no: usize,
        #[serde(default)]
        missing: Option<usize>,
    },
    Leaf {
        leaf: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Tree {
    #[serde(default)]
    pub class_id: usize,
    pub nodes: Vec<TreeNode>,
}

impl Tree {
    // Validation guarantees children sit after their parent, so the walk terminates.
    fn leaf_value(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Leaf { leaf } => return *leaf,
                TreeNode::Split {
                    split,
                    threshold,
                    yes,
                    no,
                    missing,
                } => {
                    let value = row[*split];
                    index = if value.is_nan() {
                        missing.unwrap_or(*yes)
                    } else if value < *threshold {
                        *yes
                    } else {
                        *no
                    };
                }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct ModelArtifact {
    objective: Objective,
    #[serde(default = "default_num_class")]
    num_class: usize,
    #[serde(default)]
    base_score: f64,
    num_feature: usize,
    trees: Vec<Tree>,
}

fn default_num_class() -> usize {
    1
}

/// Gradient-boosted tree ensemble exported from the training pipeline.
///
/// `base_score` is stored in margin space. Each class accumulates the leaves of the
/// trees tagged with its `class_id`; binary models use a single margin.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeEnsemble {
    objective: Objective,
    num_class: usize,
    base_score: f64,
    num_feature: usize,
    trees: Vec<Tree>,
}

impl TreeEnsemble {
    pub fn new(
        objective: Objective,
        num_class: usize,
        base_score: f64,
        num_feature: usize,
        trees: Vec<Tree>,
    ) -> Result<Self, ModelError> {
        let groups = match objective {
            Objective::BinaryLogistic => 1,
            Objective::MultiSoftmax | Objective::MultiSoftprob => {
                if num_class < 2 {
                    return Err(ModelError::InvalidClassCount(num_class));
                }
                num_class
            }
        };

        if trees.is_empty() {
            return Err(ModelError::NoTrees);
        }

        for (tree_index, tree) in trees.iter().enumerate() {
            validate_tree(tree_index, tree, groups, num_feature)?;
        }

        Ok(Self {
            objective,
            num_class: groups,
            base_score,
            num_feature,
            trees,
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ModelError> {
        let artifact: ModelArtifact = serde_json::from_reader(reader)?;
        Self::new(
            artifact.objective,
            artifact.num_class,
            artifact.base_score,
            artifact.num_feature,
            artifact.trees,
        )
    }

    pub fn objective(&self) -> Objective {
        self.objective
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Raw per-class margins for one row.
    pub fn margins(&self, row: ArrayView1<'_, f64>) -> Vec<f64> {
        let mut margins = vec![self.base_score; self.num_class];
        for tree in &self.trees {
            margins[tree.class_id] += tree.leaf_value(row);
        }
        margins
    }

    fn class_for(&self, margins: &[f64]) -> u32 {
        match self.objective {
            // sigmoid(m) > 0.5 exactly when m > 0; a zero margin stays class 0
            Objective::BinaryLogistic => u32::from(margins[0] > 0.0),
            Objective::MultiSoftmax | Objective::MultiSoftprob => {
                let mut best = 0;
                for (class, margin) in margins.iter().enumerate().skip(1) {
                    if *margin > margins[best] {
                        best = class;
                    }
                }
                best as u32
            }
        }
    }
}

fn validate_tree(
    tree_index: usize,
    tree: &Tree,
    groups: usize,
    num_feature: usize,
) -> Result<(), ModelError> {
    if tree.nodes.is_empty() {
        return Err(ModelError::EmptyTree { tree: tree_index });
    }
    if tree.class_id >= groups {
        return Err(ModelError::ClassOutOfRange {
            tree: tree_index,
            class_id: tree.class_id,
        });
    }

    for (node_index, node) in tree.nodes.iter().enumerate() {
        let TreeNode::Split {
            split,
            yes,
            no,
            missing,
            ..
        } = node
        else {
            continue;
        };

        if *split >= num_feature {
            return Err(ModelError::FeatureOutOfRange {
                tree: tree_index,
                node: node_index,
                feature: *split,
            });
        }

        for child in [Some(*yes), Some(*no), *missing].into_iter().flatten() {
            if child <= node_index || child >= tree.nodes.len() {
                return Err(ModelError::InvalidChild {
                    tree: tree_index,
                    node: node_index,
                    child,
                });
            }
        }
    }

    Ok(())
}

impl Classifier for TreeEnsemble {
    fn num_features(&self) -> usize {
        self.num_feature
    }

    fn predict(&self, batch: ArrayView2<'_, f64>) -> Result<Vec<u32>, ModelError> {
        if batch.ncols() != self.num_feature {
            return Err(ModelError::FeatureCountMismatch {
                expected: self.num_feature,
                actual: batch.ncols(),
            });
        }

        Ok(batch
            .rows()
            .into_iter()
            .map(|row| self.class_for(&self.margins(row)))
            .collect())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("unable to read model artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("model artifact is malformed: {0}")]
    Format(#[from] serde_json::Error),
    #[error("multi-class objectives need at least two classes, got {0}")]
    InvalidClassCount(usize),
    #[error("model contains no trees")]
    NoTrees,
    #[error("tree {tree} has no nodes")]
    EmptyTree { tree: usize },
    #[error("tree {tree} targets class {class_id}, which the model does not have")]
    ClassOutOfRange { tree: usize, class_id: usize },
    #[error("tree {tree} node {node} splits on feature {feature}, beyond the model's inputs")]
    FeatureOutOfRange {
        tree: usize,
        node: usize,
        feature: usize,
    },
    #[error("tree {tree} node {node} points at invalid child {child}")]
    InvalidChild {
        tree: usize,
        node: usize,
        child: usize,
    },
    #[error("model expects {expected} features per row, got {actual}")]
    FeatureCountMismatch { expected: usize, actual: usize },
}
