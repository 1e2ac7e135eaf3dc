//! CART-style decision trees with deterministic split selection.
//!
//! Splits are chosen by exhaustive sweep over midpoints between consecutive
//! distinct feature values; ties keep the first candidate in (feature,
//! threshold) order so identical inputs always grow identical trees.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Node<L> {
    Split { feature: usize, threshold: f64, left: Box<Node<L>>, right: Box<Node<L>> },
    Leaf { value: L },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_leaf: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree<L> {
    root: Node<L>,
}

impl<L> DecisionTree<L> {
    pub fn predict(&self, features: &[f64]) -> &L {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { value } => return value,
                Node::Split { feature, threshold, left, right } => {
                    let value = features.get(*feature).copied().unwrap_or(0.0);
                    node = if value <= *threshold { left } else { right };
                }
            }
        }
    }
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    score: f64,
}

fn partition(features: &[Vec<f64>], indices: &[usize], feature: usize, threshold: f64) -> (Vec<usize>, Vec<usize>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    for &row in indices {
        let value = features[row].get(feature).copied().unwrap_or(0.0);
        if value <= threshold {
            left.push(row);
        } else {
            right.push(row);
        }
    }
    (left, right)
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

pub fn fit_classification_tree(
    features: &[Vec<f64>],
    labels: &[usize],
    n_classes: usize,
    sample: &[usize],
    params: TreeParams,
) -> DecisionTree<Vec<f64>> {
    DecisionTree { root: grow_classification(features, labels, n_classes, sample.to_vec(), 0, params) }
}

fn class_distribution(labels: &[usize], indices: &[usize], n_classes: usize) -> Vec<f64> {
    let mut counts = vec![0.0; n_classes];
    for &row in indices {
        if let Some(count) = counts.get_mut(labels[row]) {
            *count += 1.0;
        }
    }
    let total: f64 = counts.iter().sum();
    if total > 0.0 {
        for count in &mut counts {
            *count /= total;
        }
    }
    counts
}

fn gini(counts: &[f64], total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    let sum_squares: f64 = counts.iter().map(|count| (count / total).powi(2)).sum();
    1.0 - sum_squares
}

fn grow_classification(
    features: &[Vec<f64>],
    labels: &[usize],
    n_classes: usize,
    indices: Vec<usize>,
    depth: usize,
    params: TreeParams,
) -> Node<Vec<f64>> {
    let distribution = class_distribution(labels, &indices, n_classes);
    let is_pure = distribution.iter().any(|share| *share >= 1.0);

    if depth >= params.max_depth || indices.len() < params.min_leaf * 2 || is_pure {
        return Node::Leaf { value: distribution };
    }

    let Some(split) = best_classification_split(features, labels, n_classes, &indices, params.min_leaf)
    else {
        return Node::Leaf { value: distribution };
    };

    let (left, right) = partition(features, &indices, split.feature, split.threshold);
    Node::Split {
        feature: split.feature,
        threshold: split.threshold,
        left: Box::new(grow_classification(features, labels, n_classes, left, depth + 1, params)),
        right: Box::new(grow_classification(features, labels, n_classes, right, depth + 1, params)),
    }
}

fn best_classification_split(
    features: &[Vec<f64>],
    labels: &[usize],
    n_classes: usize,
    indices: &[usize],
    min_leaf: usize,
) -> Option<SplitCandidate> {
    let n_features = features.first().map(Vec::len).unwrap_or(0);
    let total = indices.len() as f64;
    let mut best: Option<SplitCandidate> = None;

    for feature in 0..n_features {
        let mut ordered: Vec<(f64, usize)> = indices
            .iter()
            .map(|&row| (features[row].get(feature).copied().unwrap_or(0.0), labels[row]))
            .collect();
        ordered.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut left_counts = vec![0.0; n_classes];
        let mut right_counts = vec![0.0; n_classes];
        for &(_, label) in &ordered {
            if let Some(count) = right_counts.get_mut(label) {
                *count += 1.0;
            }
        }

        for position in 1..ordered.len() {
            let (value, label) = ordered[position - 1];
            if let Some(count) = left_counts.get_mut(label) {
                *count += 1.0;
            }
            if let Some(count) = right_counts.get_mut(label) {
                *count -= 1.0;
            }

            let next_value = ordered[position].0;
            if next_value <= value {
                continue;
            }
            if position < min_leaf || ordered.len() - position < min_leaf {
                continue;
            }

            let left_total = position as f64;
            let right_total = total - left_total;
            let score = (left_total * gini(&left_counts, left_total)
                + right_total * gini(&right_counts, right_total))
                / total;

            if best.as_ref().map(|candidate| score < candidate.score).unwrap_or(true) {
                best = Some(SplitCandidate {
                    feature,
                    threshold: (value + next_value) / 2.0,
                    score,
                });
            }
        }
    }

    best
}

// ---------------------------------------------------------------------------
// Regression
// ---------------------------------------------------------------------------

pub fn fit_regression_tree(
    features: &[Vec<f64>],
    targets: &[f64],
    sample: &[usize],
    params: TreeParams,
) -> DecisionTree<f64> {
    DecisionTree { root: grow_regression(features, targets, sample.to_vec(), 0, params) }
}

fn mean_target(targets: &[f64], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&row| targets[row]).sum::<f64>() / indices.len() as f64
}

fn grow_regression(
    features: &[Vec<f64>],
    targets: &[f64],
    indices: Vec<usize>,
    depth: usize,
    params: TreeParams,
) -> Node<f64> {
    if depth >= params.max_depth || indices.len() < params.min_leaf * 2 {
        return Node::Leaf { value: mean_target(targets, &indices) };
    }

    let Some(split) = best_regression_split(features, targets, &indices, params.min_leaf) else {
        return Node::Leaf { value: mean_target(targets, &indices) };
    };

    let (left, right) = partition(features, &indices, split.feature, split.threshold);
    Node::Split {
        feature: split.feature,
        threshold: split.threshold,
        left: Box::new(grow_regression(features, targets, left, depth + 1, params)),
        right: Box::new(grow_regression(features, targets, right, depth + 1, params)),
    }
}

fn best_regression_split(
    features: &[Vec<f64>],
    targets: &[f64],
    indices: &[usize],
    min_leaf: usize,
) -> Option<SplitCandidate> {
    let n_features = features.first().map(Vec::len).unwrap_or(0);
    let total = indices.len() as f64;
    let mut best: Option<SplitCandidate> = None;

    for feature in 0..n_features {
        let mut ordered: Vec<(f64, f64)> = indices
            .iter()
            .map(|&row| (features[row].get(feature).copied().unwrap_or(0.0), targets[row]))
            .collect();
        ordered.sort_by(|a, b| a.0.total_cmp(&b.0));

        let total_sum: f64 = ordered.iter().map(|(_, target)| target).sum();
        let total_sum_squares: f64 = ordered.iter().map(|(_, target)| target * target).sum();

        let mut left_sum = 0.0;
        let mut left_sum_squares = 0.0;

        for position in 1..ordered.len() {
            let (value, target) = ordered[position - 1];
            left_sum += target;
            left_sum_squares += target * target;

            let next_value = ordered[position].0;
            if next_value <= value {
                continue;
            }
            if position < min_leaf || ordered.len() - position < min_leaf {
                continue;
            }

            let left_total = position as f64;
            let right_total = total - left_total;
            let right_sum = total_sum - left_sum;
            let right_sum_squares = total_sum_squares - left_sum_squares;

            // Sum of squared deviations on each side; minimizing this is
            // equivalent to minimizing weighted variance.
            let left_sse = left_sum_squares - left_sum * left_sum / left_total;
            let right_sse = right_sum_squares - right_sum * right_sum / right_total;
            let score = left_sse + right_sse;

            if best.as_ref().map(|candidate| score < candidate.score).unwrap_or(true) {
                best = Some(SplitCandidate {
                    feature,
                    threshold: (value + next_value) / 2.0,
                    score,
                });
            }
        }
    }

    best
}
