use serde::{Deserialize, Serialize};

/// Nodes are stored in traversal order: children always come after their
/// parent, so a walk from node 0 terminates without a cycle check.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        counts: Vec<f64>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forest {
    pub trees: Vec<Tree>,
}

impl Tree {
    /// Class distribution of the leaf this record falls into.
    fn leaf_distribution(&self, x: &[f64]) -> Vec<f64> {
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if x[*feature] <= *threshold { *left } else { *right };
                }
                Node::Leaf { counts } => {
                    let total: f64 = counts.iter().sum();
                    return counts.iter().map(|c| c / total).collect();
                }
            }
        }
    }

    fn validate(&self, n_columns: usize, n_classes: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_columns {
                        return Err(format!(
                            "node {i} splits on feature {feature} but the model has {n_columns} columns"
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {i} has a non-finite threshold"));
                    }
                    if *left >= self.nodes.len() || *right >= self.nodes.len() {
                        return Err(format!("node {i} has a child index out of range"));
                    }
                    if *left <= i || *right <= i {
                        return Err(format!("node {i} has a child before its parent"));
                    }
                }
                Node::Leaf { counts } => {
                    if counts.len() != n_classes {
                        return Err(format!(
                            "leaf {i} has {} class weights, expected {n_classes}",
                            counts.len()
                        ));
                    }
                    let mut total = 0.0f64;
                    for &c in counts {
                        if !c.is_finite() || c < 0.0 {
                            return Err(format!("leaf {i} has a negative or non-finite weight"));
                        }
                        total += c;
                    }
                    if total <= 0.0 {
                        return Err(format!("leaf {i} has zero total weight"));
                    }
                }
            }
        }
        Ok(())
    }
}

impl Forest {
    /// Probability interface: mean of the per-tree leaf distributions.
    pub fn mean_distribution(&self, x: &[f64]) -> Vec<f64> {
        let mut acc: Vec<f64> = Vec::new();
        for tree in &self.trees {
            let dist = tree.leaf_distribution(x);
            if acc.is_empty() {
                acc = dist;
            } else {
                for (a, v) in acc.iter_mut().zip(dist) {
                    *a += v;
                }
            }
        }
        let n = self.trees.len() as f64;
        for a in &mut acc {
            *a /= n;
        }
        acc
    }

    /// Label interface: hard majority vote over per-tree arg-max classes,
    /// ties broken by class order. Deliberately a separate code path from
    /// `mean_distribution`; the prediction stage cross-checks the two.
    pub fn majority_vote(&self, x: &[f64]) -> usize {
        let mut votes: Vec<u32> = Vec::new();
        for tree in &self.trees {
            let dist = tree.leaf_distribution(x);
            if votes.is_empty() {
                votes = vec![0; dist.len()];
            }
            votes[argmax(&dist)] += 1;
        }
        let mut best = 0usize;
        for (i, &v) in votes.iter().enumerate().skip(1) {
            if v > votes[best] {
                best = i;
            }
        }
        best
    }

    pub fn validate(&self, n_columns: usize, n_classes: usize) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        for (t, tree) in self.trees.iter().enumerate() {
            tree.validate(n_columns, n_classes)
                .map_err(|e| format!("tree {t}: {e}"))?;
        }
        Ok(())
    }
}

/// First strict maximum; ties keep the earliest index.
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0usize;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
#[path = "../../tests/src_inline/classifier/forest.rs"]
mod tests;
