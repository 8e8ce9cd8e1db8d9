//! XGBoost JSON model loader and tree-ensemble evaluator.
//!
//! Parses the subset of the `Booster.save_model("*.json")` schema that
//! inference needs: gbtree/dart boosters, numeric and categorical splits,
//! base score and objective. Training-only fields are ignored.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use serde_with::{DisplayFromStr, serde_as};

use crate::encode::FeatureVector;
use crate::error::PredictError;
use crate::model::Model;

// =============================================================================
// Foreign JSON types
// =============================================================================

/// XGBoost stores `base_score` as a number, a string, or a stringified array
/// (`"[5E-1]"`) depending on version.
fn deserialize_base_score<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as SerdeError;

    let mut cur = Value::deserialize(deserializer)?;
    loop {
        match cur {
            Value::Number(n) => return n.as_f64().ok_or_else(|| SerdeError::custom("invalid base_score")),
            Value::String(s) => {
                let t = s.trim();
                let inner = t.strip_prefix('[').and_then(|x| x.strip_suffix(']')).unwrap_or(t);
                return inner
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| SerdeError::custom(format!("cannot parse base_score from '{s}'")));
            }
            Value::Array(arr) => {
                cur = arr
                    .into_iter()
                    .next()
                    .ok_or_else(|| SerdeError::custom("empty base_score array"))?;
            }
            _ => return Err(SerdeError::custom("base_score must be a number, string or array")),
        }
    }
}

/// `default_left` is `[0, 1, ...]` in most versions and `[false, true, ...]` in some.
fn deserialize_flags<'de, D>(deserializer: D) -> Result<Vec<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as SerdeError;

    let values = Vec::<Value>::deserialize(deserializer)?;
    values
        .into_iter()
        .map(|v| match v {
            Value::Bool(b) => Ok(b),
            Value::Number(n) => Ok(n.as_i64().unwrap_or(0) != 0),
            other => Err(SerdeError::custom(format!("invalid default_left entry: {other}"))),
        })
        .collect()
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
struct TreeParam {
    #[serde_as(as = "DisplayFromStr")]
    num_nodes: i64,
}

#[derive(Debug, Clone, Deserialize)]
struct JsonTree {
    tree_param: TreeParam,
    left_children: Vec<i32>,
    right_children: Vec<i32>,
    split_indices: Vec<i32>,
    split_conditions: Vec<f32>,
    #[serde(deserialize_with = "deserialize_flags")]
    default_left: Vec<bool>,
    #[serde(default)]
    split_type: Vec<i32>,
    #[serde(default)]
    categories: Vec<i32>,
    #[serde(default)]
    categories_nodes: Vec<i32>,
    #[serde(default)]
    categories_segments: Vec<i64>,
    #[serde(default)]
    categories_sizes: Vec<i64>,
}

#[derive(Debug, Clone, Deserialize)]
struct ModelTrees {
    trees: Vec<JsonTree>,
}

#[derive(Debug, Clone, Deserialize)]
struct GbtreeDefinition {
    model: ModelTrees,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "name", rename_all = "lowercase")]
enum GradientBooster {
    Gbtree { model: ModelTrees },
    Dart { gbtree: GbtreeDefinition, weight_drop: Vec<f32> },
    Gblinear {},
}

#[derive(Debug, Clone, Deserialize)]
struct ObjectiveDef {
    name: String,
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
struct LearnerModelParam {
    #[serde(deserialize_with = "deserialize_base_score")]
    base_score: f64,
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default)]
    num_class: i64,
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default)]
    num_feature: i64,
}

#[derive(Debug, Clone, Deserialize)]
struct Learner {
    #[serde(default)]
    feature_names: Vec<String>,
    gradient_booster: GradientBooster,
    objective: ObjectiveDef,
    learner_model_param: LearnerModelParam,
}

#[derive(Debug, Clone, Deserialize)]
struct JsonModel {
    learner: Learner,
}

// =============================================================================
// Native representation
// =============================================================================

/// How the summed margin maps to the model's output space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Objective {
    /// `binary:logistic`, `reg:logistic`: sigmoid of the margin.
    Logistic,
    /// Squared/absolute/pseudo-Huber regression and `binary:logitraw`: the margin itself.
    Identity,
}

impl Objective {
    fn parse(name: &str) -> Result<Self, PredictError> {
        match name {
            "binary:logistic" | "reg:logistic" => Ok(Objective::Logistic),
            "reg:squarederror" | "reg:linear" | "reg:absoluteerror" | "reg:pseudohubererror"
            | "binary:logitraw" => Ok(Objective::Identity),
            other => Err(PredictError::ModelUnavailable(format!(
                "unsupported objective '{other}'"
            ))),
        }
    }

    /// Convert a stored base score into margin space.
    fn base_margin(self, base_score: f64) -> f32 {
        let margin = match self {
            Objective::Logistic => {
                let p = base_score.clamp(1e-7, 1.0 - 1e-7);
                (p / (1.0 - p)).ln()
            }
            Objective::Identity => base_score,
        };
        margin as f32
    }

    /// Applied in `f32`, the precision XGBoost predicts in.
    fn transform(self, margin: f32) -> f32 {
        match self {
            Objective::Logistic => 1.0 / (1.0 + (-margin).exp()),
            Objective::Identity => margin,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf(f32),
    Numeric {
        feature: usize,
        threshold: f32,
        default_left: bool,
        left: usize,
        right: usize,
    },
    Categorical {
        feature: usize,
        /// Categories routed to the right child.
        right_set: Vec<i32>,
        default_left: bool,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Leaf value reached by `row`.
    pub fn leaf_value(&self, row: &[f64]) -> f32 {
        let mut idx = 0usize;
        // Converted trees only link forward (child > parent), so this terminates.
        loop {
            match &self.nodes[idx] {
                Node::Leaf(value) => return *value,
                Node::Numeric {
                    feature,
                    threshold,
                    default_left,
                    left,
                    right,
                } => {
                    let x = row.get(*feature).copied().unwrap_or(f64::NAN);
                    idx = if x.is_nan() {
                        if *default_left { *left } else { *right }
                    } else if (x as f32) < *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                Node::Categorical {
                    feature,
                    right_set,
                    default_left,
                    left,
                    right,
                } => {
                    let x = row.get(*feature).copied().unwrap_or(f64::NAN);
                    idx = if x.is_nan() || x < 0.0 {
                        if *default_left { *left } else { *right }
                    } else if right_set.contains(&(x as i32)) {
                        *right
                    } else {
                        *left
                    };
                }
            }
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }
}

/// A loaded gradient-boosted tree ensemble.
#[derive(Debug, Clone)]
pub struct XgbBooster {
    trees: Vec<Tree>,
    /// Per-tree multiplier (1.0 for gbtree, `weight_drop` for dart).
    tree_weights: Vec<f32>,
    base_margin: f32,
    objective: Objective,
    objective_name: String,
    num_feature: usize,
    feature_names: Vec<String>,
}

impl XgbBooster {
    pub fn from_json(json: &str) -> Result<Self, PredictError> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| PredictError::ModelUnavailable(format!("invalid model JSON: {e}")))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, PredictError> {
        let model: JsonModel = serde_json::from_value(value)
            .map_err(|e| PredictError::ModelUnavailable(format!("unrecognized XGBoost model: {e}")))?;
        Self::convert(model)
    }

    fn convert(model: JsonModel) -> Result<Self, PredictError> {
        let learner = model.learner;
        if learner.learner_model_param.num_class > 1 {
            return Err(PredictError::ModelUnavailable(format!(
                "multi-class models are not supported (num_class={})",
                learner.learner_model_param.num_class
            )));
        }

        let objective = Objective::parse(&learner.objective.name)?;
        let (json_trees, weights) = match learner.gradient_booster {
            GradientBooster::Gbtree { model } => {
                let n = model.trees.len();
                (model.trees, vec![1.0; n])
            }
            GradientBooster::Dart { gbtree, weight_drop } => {
                if weight_drop.len() != gbtree.model.trees.len() {
                    return Err(PredictError::ModelUnavailable(format!(
                        "dart model has {} trees but {} weights",
                        gbtree.model.trees.len(),
                        weight_drop.len()
                    )));
                }
                (gbtree.model.trees, weight_drop)
            }
            GradientBooster::Gblinear {} => {
                return Err(PredictError::ModelUnavailable(
                    "gblinear boosters are not supported".to_string(),
                ));
            }
        };

        let trees = json_trees
            .iter()
            .enumerate()
            .map(|(i, t)| convert_tree(t, i))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            trees,
            tree_weights: weights,
            base_margin: objective.base_margin(learner.learner_model_param.base_score),
            objective,
            objective_name: learner.objective.name,
            num_feature: learner.learner_model_param.num_feature.max(0) as usize,
            feature_names: learner.feature_names,
        })
    }

    /// Raw margin for one numeric row.
    ///
    /// Leaves are accumulated in `f32`, as XGBoost does.
    pub fn predict_margin(&self, row: &[f64]) -> f32 {
        self.trees
            .iter()
            .zip(&self.tree_weights)
            .fold(self.base_margin, |acc, (tree, w)| acc + w * tree.leaf_value(row))
    }

    /// Objective-space output (probability for logistic, value for regression).
    pub fn predict_row(&self, row: &[f64]) -> Result<f64, PredictError> {
        if self.num_feature > 0 && row.len() != self.num_feature {
            return Err(PredictError::invalid(format!(
                "model expects {} features, row has {}",
                self.num_feature,
                row.len()
            )));
        }
        Ok(f64::from(self.objective.transform(self.predict_margin(row))))
    }

    pub fn objective(&self) -> Objective {
        self.objective
    }

    pub fn objective_name(&self) -> &str {
        &self.objective_name
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn num_feature(&self) -> usize {
        self.num_feature
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }
}

impl Model for XgbBooster {
    fn predict(&self, vector: &FeatureVector) -> Result<f64, PredictError> {
        if !self.feature_names.is_empty() {
            check_schema(&self.feature_names, &vector.names())?;
        }
        self.predict_row(&vector.to_numeric()?)
    }

    fn describe(&self) -> String {
        format!(
            "xgboost {} ({} trees, {} features)",
            self.objective_name,
            self.trees.len(),
            self.num_feature
        )
    }
}

/// Names and order must match exactly.
pub fn check_schema<S: AsRef<str>>(expected: &[S], actual: &[&str]) -> Result<(), PredictError> {
    if expected.len() != actual.len() {
        return Err(PredictError::invalid(format!(
            "schema mismatch: model was fit on {} features, row has {}",
            expected.len(),
            actual.len()
        )));
    }
    for (pos, (want, got)) in expected.iter().zip(actual).enumerate() {
        if want.as_ref() != *got {
            return Err(PredictError::invalid(format!(
                "schema mismatch at position {pos}: model expects '{}', row has '{got}'",
                want.as_ref()
            )));
        }
    }
    Ok(())
}

fn convert_tree(tree: &JsonTree, tree_idx: usize) -> Result<Tree, PredictError> {
    let n = tree.tree_param.num_nodes.max(0) as usize;
    let corrupt = |what: String| PredictError::ModelUnavailable(format!("tree {tree_idx}: {what}"));

    if n == 0 {
        return Err(corrupt("no nodes".to_string()));
    }
    let arrays = [
        tree.left_children.len(),
        tree.right_children.len(),
        tree.split_indices.len(),
        tree.split_conditions.len(),
        tree.default_left.len(),
    ];
    if arrays.iter().any(|&len| len != n) {
        return Err(corrupt(format!("node arrays disagree with num_nodes={n}")));
    }

    let mut nodes = Vec::with_capacity(n);
    for i in 0..n {
        let left = tree.left_children[i];
        let right = tree.right_children[i];
        if left == -1 {
            // Leaf values share storage with split conditions.
            nodes.push(Node::Leaf(tree.split_conditions[i]));
            continue;
        }

        let child = |c: i32| -> Result<usize, PredictError> {
            if c <= i as i32 || c as usize >= n {
                Err(corrupt(format!("node {i} has invalid child {c}")))
            } else {
                Ok(c as usize)
            }
        };
        let (left, right) = (child(left)?, child(right)?);
        let feature = usize::try_from(tree.split_indices[i])
            .map_err(|_| corrupt(format!("node {i} has negative split index")))?;
        let default_left = tree.default_left[i];

        if tree.split_type.get(i).copied().unwrap_or(0) == 1 {
            nodes.push(Node::Categorical {
                feature,
                right_set: categories_for_node(tree, i),
                default_left,
                left,
                right,
            });
        } else {
            nodes.push(Node::Numeric {
                feature,
                threshold: tree.split_conditions[i],
                default_left,
                left,
                right,
            });
        }
    }
    Ok(Tree { nodes })
}

fn categories_for_node(tree: &JsonTree, node: usize) -> Vec<i32> {
    let Some(k) = tree.categories_nodes.iter().position(|&n| n as usize == node) else {
        return Vec::new();
    };
    let start = tree.categories_segments.get(k).copied().unwrap_or(0).max(0) as usize;
    let size = tree.categories_sizes.get(k).copied().unwrap_or(0).max(0) as usize;
    tree.categories
        .get(start..start + size)
        .map(<[i32]>::to_vec)
        .unwrap_or_default()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    /// One stump on feature 0 (`x0 < 0.5` → -1.0, else 1.0), 2 features.
    pub(crate) fn stump_model(objective: &str, base_score: &str) -> Value {
        json!({
            "version": [2, 0, 3],
            "learner": {
                "feature_names": [],
                "gradient_booster": {
                    "name": "gbtree",
                    "model": {
                        "gbtree_model_param": {"num_trees": "1", "num_parallel_tree": "1"},
                        "tree_info": [0],
                        "trees": [{
                            "id": 0,
                            "tree_param": {"num_nodes": "3", "num_feature": "2", "size_leaf_vector": "1", "num_deleted": "0"},
                            "left_children": [1, -1, -1],
                            "right_children": [2, -1, -1],
                            "parents": [2147483647, 0, 0],
                            "split_indices": [0, 0, 0],
                            "split_conditions": [0.5, -1.0, 1.0],
                            "split_type": [0, 0, 0],
                            "default_left": [1, 0, 0],
                            "base_weights": [0.0, -1.0, 1.0],
                            "loss_changes": [1.0, 0.0, 0.0],
                            "sum_hessian": [2.0, 1.0, 1.0],
                            "categories": [],
                            "categories_nodes": [],
                            "categories_segments": [],
                            "categories_sizes": []
                        }]
                    }
                },
                "objective": {"name": objective},
                "learner_model_param": {"base_score": base_score, "num_class": "0", "num_feature": "2"}
            }
        })
    }

    #[test]
    fn regression_sums_leaf_and_base_score() {
        let b = XgbBooster::from_value(stump_model("reg:squarederror", "[5E-1]")).unwrap();
        assert_eq!(b.num_trees(), 1);
        assert!((b.predict_row(&[0.0, 9.0]).unwrap() - (-0.5)).abs() < 1e-12);
        assert!((b.predict_row(&[1.0, 9.0]).unwrap() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn missing_value_follows_default_direction() {
        let b = XgbBooster::from_value(stump_model("reg:squarederror", "0")).unwrap();
        assert_eq!(b.predict_row(&[f64::NAN, 0.0]).unwrap(), -1.0);
    }

    #[test]
    fn logistic_applies_sigmoid_to_margin() {
        let b = XgbBooster::from_value(stump_model("binary:logistic", "5E-1")).unwrap();
        let p = b.predict_row(&[1.0, 0.0]).unwrap();
        assert_eq!(p, f64::from(1.0 / (1.0 + (-1.0f32).exp())));
    }

    #[test]
    fn wrong_width_is_invalid_input() {
        let b = XgbBooster::from_value(stump_model("reg:squarederror", "0")).unwrap();
        assert!(matches!(b.predict_row(&[1.0]), Err(PredictError::InvalidInput(_))));
    }

    #[test]
    fn unsupported_objective_is_rejected_at_load() {
        let err = XgbBooster::from_value(stump_model("multi:softprob", "0")).unwrap_err();
        assert!(matches!(err, PredictError::ModelUnavailable(_)));
    }

    #[test]
    fn categorical_split_routes_listed_categories_right() {
        let mut v = stump_model("reg:squarederror", "0");
        let tree = &mut v["learner"]["gradient_booster"]["model"]["trees"][0];
        tree["split_type"] = json!([1, 0, 0]);
        tree["categories"] = json!([2, 3]);
        tree["categories_nodes"] = json!([0]);
        tree["categories_segments"] = json!([0]);
        tree["categories_sizes"] = json!([2]);
        let b = XgbBooster::from_value(v).unwrap();
        assert_eq!(b.predict_row(&[3.0, 0.0]).unwrap(), 1.0);
        assert_eq!(b.predict_row(&[1.0, 0.0]).unwrap(), -1.0);
    }

    #[test]
    fn leaves_accumulate_in_single_precision() {
        let mut v = stump_model("reg:squarederror", "0.1");
        let trees = &mut v["learner"]["gradient_booster"]["model"]["trees"];
        let tree = trees[0].clone();
        trees.as_array_mut().unwrap().push(tree);
        let b = XgbBooster::from_value(v).unwrap();
        let expected = 0.1f32 + 1.0f32 + 1.0f32;
        assert_eq!(b.predict_row(&[1.0, 0.0]).unwrap(), f64::from(expected));
        assert_ne!(b.predict_row(&[1.0, 0.0]).unwrap(), 0.1f64 + 2.0);
    }

    #[test]
    fn schema_check_reports_first_mismatch() {
        let err = check_schema(&["a", "b"], &["a", "c"]).unwrap_err();
        assert!(err.to_string().contains("position 1"));
        assert!(check_schema(&["a", "b"], &["a", "b"]).is_ok());
    }
}
