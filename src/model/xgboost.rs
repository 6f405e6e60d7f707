//! Evaluator for gradient-boosted trees saved with XGBoost's
//! `Booster.save_model("*.json")`.

use serde::Deserialize;
use std::{fs, path::Path};

use super::Regressor;
use crate::error::ModelError;

#[derive(Deserialize)]
struct ModelJson {
    learner: LearnerJson,
}

#[derive(Deserialize)]
struct LearnerJson {
    learner_model_param: LearnerParamJson,
    gradient_booster: BoosterJson,
    objective: ObjectiveJson,
}

// XGBoost writes these numbers as strings, e.g. "5E-1" or "[5E-1]"
#[derive(Deserialize)]
struct LearnerParamJson {
    base_score: String,
    num_feature: String,
}

#[derive(Deserialize)]
struct BoosterJson {
    name: String,
    model: Option<GbTreeJson>,
}

#[derive(Deserialize)]
struct GbTreeJson {
    trees: Vec<TreeJson>,
}

#[derive(Deserialize)]
struct TreeJson {
    left_children: Vec<i64>,
    right_children: Vec<i64>,
    split_indices: Vec<i64>,
    split_conditions: Vec<f32>,
    default_left: Vec<Flag>,
    // 0 = numerical, 1 = categorical; absent before XGBoost 1.6
    #[serde(default)]
    split_type: Vec<i64>,
}

#[derive(Deserialize)]
struct ObjectiveJson {
    name: String,
}

#[derive(Deserialize, Clone, Copy)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
}

impl Flag {
    fn is_set(self) -> bool {
        match self {
            Flag::Bool(b) => b,
            Flag::Int(i) => i != 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Link {
    Identity,
    Log,
}

impl Link {
    fn for_objective(name: &str) -> Result<Self, ModelError> {
        match name {
            "reg:squarederror" | "reg:linear" | "reg:squaredlogerror"
            | "reg:pseudohubererror" | "reg:absoluteerror" => Ok(Link::Identity),
            "reg:gamma" | "reg:tweedie" | "count:poisson" => Ok(Link::Log),
            other => Err(ModelError::UnsupportedObjective(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Node {
    Leaf(f32),
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
        default_left: bool,
    },
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn from_json(idx: usize, t: TreeJson, n_features: usize) -> Result<Self, ModelError> {
        let n = t.left_children.len();
        if n == 0 {
            return Err(ModelError::Corrupt(format!("tree {} has no nodes", idx)));
        }
        if t.right_children.len() != n
            || t.split_indices.len() != n
            || t.split_conditions.len() != n
            || t.default_left.len() != n
        {
            return Err(ModelError::Corrupt(format!(
                "tree {} has inconsistent node arrays",
                idx
            )));
        }

        if !t.split_type.is_empty() && t.split_type.len() != n {
            return Err(ModelError::Corrupt(format!(
                "tree {} has inconsistent node arrays",
                idx
            )));
        }

        // Walk from the root so node ids may be in any order (pruning reuses
        // deleted slots). Each node must be reached at most once.
        let mut nodes = vec![Node::Leaf(0.0); n];
        let mut seen = vec![false; n];
        let mut stack = vec![0usize];
        while let Some(i) = stack.pop() {
            if seen[i] {
                return Err(ModelError::Corrupt(format!(
                    "tree {} node {} is reachable more than once",
                    idx, i
                )));
            }
            seen[i] = true;

            let (l, r) = (t.left_children[i], t.right_children[i]);
            if l == -1 {
                nodes[i] = Node::Leaf(t.split_conditions[i]);
                continue;
            }
            if t.split_type.get(i).copied().unwrap_or(0) != 0 {
                return Err(ModelError::UnsupportedFormat(format!(
                    "tree {} node {} uses a categorical split",
                    idx, i
                )));
            }
            let child_ok = |c: i64| c >= 0 && (c as usize) < n;
            if !child_ok(l) || !child_ok(r) {
                return Err(ModelError::Corrupt(format!(
                    "tree {} node {} has invalid children ({}, {})",
                    idx, i, l, r
                )));
            }
            let feature = t.split_indices[i];
            if feature < 0 || feature as usize >= n_features {
                return Err(ModelError::Corrupt(format!(
                    "tree {} node {} splits on feature {} of {}",
                    idx, i, feature, n_features
                )));
            }
            nodes[i] = Node::Split {
                feature: feature as usize,
                threshold: t.split_conditions[i],
                left: l as usize,
                right: r as usize,
                default_left: t.default_left[i].is_set(),
            };
            stack.push(r as usize);
            stack.push(l as usize);
        }
        Ok(Self { nodes })
    }

    fn leaf_value(&self, x: &[f32]) -> f32 {
        let mut i = 0;
        loop {
            match self.nodes[i] {
                Node::Leaf(v) => return v,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    default_left,
                } => {
                    let v = x[feature];
                    let go_left = if v.is_nan() { default_left } else { v < threshold };
                    i = if go_left { left } else { right };
                }
            }
        }
    }
}

/// A boosted tree ensemble for a single regression target.
#[derive(Debug, Clone)]
pub struct TreeEnsemble {
    trees: Vec<Tree>,
    base_margin: f32,
    n_features: usize,
    link: Link,
    objective: String,
}

impl TreeEnsemble {
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let txt = fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&txt)
    }

    pub fn from_json_str(txt: &str) -> Result<Self, ModelError> {
        let doc: ModelJson = serde_json::from_str(txt)?;
        let learner = doc.learner;

        if learner.gradient_booster.name != "gbtree" {
            return Err(ModelError::UnsupportedFormat(format!(
                "booster {}",
                learner.gradient_booster.name
            )));
        }
        let booster = learner
            .gradient_booster
            .model
            .ok_or_else(|| ModelError::Corrupt("gbtree has no model section".into()))?;

        let link = Link::for_objective(&learner.objective.name)?;
        let n_features: usize = parse_param(&learner.learner_model_param.num_feature, "num_feature")?;
        let base_score: f32 = parse_param(&learner.learner_model_param.base_score, "base_score")?;

        let base_margin = match link {
            Link::Identity => base_score,
            Link::Log => {
                if base_score <= 0.0 {
                    return Err(ModelError::Corrupt(format!(
                        "base_score {} invalid for log link",
                        base_score
                    )));
                }
                base_score.ln()
            }
        };

        let trees = booster
            .trees
            .into_iter()
            .enumerate()
            .map(|(i, t)| Tree::from_json(i, t, n_features))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            trees,
            base_margin,
            n_features,
            link,
            objective: learner.objective.name,
        })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Regressor for TreeEnsemble {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, x: &[f32]) -> Result<f32, ModelError> {
        if x.len() != self.n_features {
            return Err(ModelError::FeatureLength {
                expected: self.n_features,
                got: x.len(),
            });
        }
        let margin = self.trees.iter().fold(self.base_margin, |acc, t| acc + t.leaf_value(x));
        Ok(match self.link {
            Link::Identity => margin,
            Link::Log => margin.exp(),
        })
    }

    fn describe(&self) -> String {
        format!("xgboost gbtree ({} trees, {})", self.trees.len(), self.objective)
    }
}

fn parse_param<T: std::str::FromStr>(raw: &str, name: &str) -> Result<T, ModelError> {
    let trimmed = raw.trim().trim_start_matches('[').trim_end_matches(']').trim();
    trimmed
        .parse()
        .map_err(|_| ModelError::Corrupt(format!("bad {}: {:?}", name, raw)))
}
