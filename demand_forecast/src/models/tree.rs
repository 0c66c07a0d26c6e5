//! Regression tree shared by the bagged and boosted ensembles
//!
//! Splits maximize the regularized squared-error gain
//! `S_l²/(n_l+λ) + S_r²/(n_r+λ) − S²/(n+λ)` and leaves predict `S/(n+λ)`,
//! where `S` is the target sum of a node. With `λ = 0` this is the classic
//! variance-reduction tree with mean leaves; with `λ > 0` it is the Newton
//! step of a squared-error booster.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Growth limits for one tree
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    /// Maximum depth of the tree (None = grow until leaves are pure)
    pub max_depth: Option<usize>,
    /// Minimum samples required to split a node
    pub min_samples_split: usize,
    /// Minimum samples in each child of a split
    pub min_samples_leaf: usize,
    /// Features considered per split (None = all)
    pub max_features: Option<usize>,
    /// L2 penalty on leaf values
    pub l2_regularization: f64,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            l2_regularization: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// Fitted regression tree
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionTree {
    root: Node,
}

struct Candidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

struct Builder<'a> {
    features: &'a [Vec<f64>],
    targets: &'a [f64],
    params: &'a TreeParams,
    rng: &'a mut ChaCha8Rng,
}

impl RegressionTree {
    /// Fit a tree on the rows named by `indices`.
    ///
    /// `indices` may repeat a row (bootstrap samples); repeated rows count
    /// once per occurrence. `rng` drives the per-split feature order.
    pub fn fit(
        features: &[Vec<f64>],
        targets: &[f64],
        indices: &[usize],
        params: &TreeParams,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let mut builder = Builder {
            features,
            targets,
            params,
            rng,
        };
        let mut indices = indices.to_vec();
        let root = builder.build(&mut indices, 0);
        Self { root }
    }

    /// Predict for a single row
    pub fn predict_one(&self, row: &[f64]) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }

    /// Number of levels, counting a lone leaf as depth 1
    pub fn depth(&self) -> usize {
        fn walk(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 1,
                Node::Split { left, right, .. } => 1 + walk(left).max(walk(right)),
            }
        }
        walk(&self.root)
    }

    pub fn n_leaves(&self) -> usize {
        fn walk(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 1,
                Node::Split { left, right, .. } => walk(left) + walk(right),
            }
        }
        walk(&self.root)
    }
}

impl<'a> Builder<'a> {
    fn build(&mut self, indices: &mut [usize], depth: usize) -> Node {
        let n = indices.len();
        let sum: f64 = indices.iter().map(|&i| self.targets[i]).sum();
        let leaf = Node::Leaf {
            value: self.leaf_value(sum, n),
        };

        let depth_reached = self.params.max_depth.is_some_and(|d| depth >= d);
        if depth_reached
            || n < self.params.min_samples_split
            || n < 2 * self.params.min_samples_leaf.max(1)
            || self.is_pure(indices)
        {
            return leaf;
        }

        let Some(best) = self.find_best_split(indices, sum) else {
            return leaf;
        };

        let mid = partition(indices, |i| self.features[i][best.feature] <= best.threshold);
        let (left_idx, right_idx) = indices.split_at_mut(mid);
        let left = self.build(left_idx, depth + 1);
        let right = self.build(right_idx, depth + 1);

        Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn leaf_value(&self, sum: f64, n: usize) -> f64 {
        let denom = n as f64 + self.params.l2_regularization;
        if denom > 0.0 {
            sum / denom
        } else {
            0.0
        }
    }

    fn score(&self, sum: f64, n: usize) -> f64 {
        let denom = n as f64 + self.params.l2_regularization;
        if denom > 0.0 {
            sum * sum / denom
        } else {
            0.0
        }
    }

    fn is_pure(&self, indices: &[usize]) -> bool {
        let first = self.targets[indices[0]];
        indices.iter().all(|&i| self.targets[i] == first)
    }

    fn find_best_split(&mut self, indices: &[usize], total: f64) -> Option<Candidate> {
        let n = indices.len();
        let n_features = self.features[indices[0]].len();
        let max_features = self
            .params
            .max_features
            .unwrap_or(n_features)
            .clamp(1, n_features.max(1));

        let mut feature_order: Vec<usize> = (0..n_features).collect();
        feature_order.shuffle(&mut *self.rng);
        feature_order.truncate(max_features);

        let parent_score = self.score(total, n);
        let min_leaf = self.params.min_samples_leaf.max(1);
        let mut best: Option<Candidate> = None;
        let mut sorted = indices.to_vec();

        for feature in feature_order {
            sorted.sort_by(|&a, &b| {
                self.features[a][feature].total_cmp(&self.features[b][feature])
            });

            let mut left_sum = 0.0;
            for pos in 0..n - 1 {
                left_sum += self.targets[sorted[pos]];
                let n_left = pos + 1;
                let n_right = n - n_left;

                let here = self.features[sorted[pos]][feature];
                let next = self.features[sorted[pos + 1]][feature];
                if here == next || n_left < min_leaf || n_right < min_leaf {
                    continue;
                }

                let gain = self.score(left_sum, n_left) + self.score(total - left_sum, n_right)
                    - parent_score;
                if gain > best.as_ref().map_or(0.0, |b| b.gain) {
                    let mut threshold = here / 2.0 + next / 2.0;
                    if threshold >= next {
                        threshold = here;
                    }
                    best = Some(Candidate {
                        feature,
                        threshold,
                        gain,
                    });
                }
            }
        }

        best
    }
}

/// Move every element satisfying `pred` to the front; returns how many did.
fn partition(indices: &mut [usize], pred: impl Fn(usize) -> bool) -> usize {
    let mut next = 0;
    for i in 0..indices.len() {
        if pred(indices[i]) {
            indices.swap(i, next);
            next += 1;
        }
    }
    next
}
