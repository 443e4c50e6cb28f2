//! Out-of-sample classification quality.

use serde::{Deserialize, Serialize};

/// Scores of the oracle on the test period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEvaluation {
    /// `None` when the test labels contain a single class.
    pub roc_auc: Option<f64>,
    /// Share of rows where `prob > 0.5` matches the label.
    pub accuracy: f64,
    pub test_rows: usize,
    pub positive_rate: f64,
}

impl ModelEvaluation {
    pub fn evaluate(probabilities: &[f64], labels: &[bool]) -> Self {
        let positives = labels.iter().filter(|l| **l).count();
        Self {
            roc_auc: roc_auc(probabilities, labels),
            accuracy: accuracy(probabilities, labels),
            test_rows: labels.len(),
            positive_rate: if labels.is_empty() {
                0.0
            } else {
                positives as f64 / labels.len() as f64
            },
        }
    }
}

/// Area under the ROC curve via average ranks (ties share their mean rank).
pub fn roc_auc(scores: &[f64], labels: &[bool]) -> Option<f64> {
    let n = scores.len().min(labels.len());
    let n_pos = labels[..n].iter().filter(|l| **l).count();
    let n_neg = n - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg_rank;
        }
        i = j + 1;
    }

    let pos_rank_sum: f64 = (0..n).filter(|&k| labels[k]).map(|k| ranks[k]).sum();
    let n_pos = n_pos as f64;
    let n_neg = n_neg as f64;
    Some((pos_rank_sum - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg))
}

pub fn accuracy(probabilities: &[f64], labels: &[bool]) -> f64 {
    let n = probabilities.len().min(labels.len());
    if n == 0 {
        return 0.0;
    }
    let hits = probabilities
        .iter()
        .zip(labels)
        .filter(|(p, l)| (**p > 0.5) == **l)
        .count();
    hits as f64 / n as f64
}
