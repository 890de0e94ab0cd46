/*

    Index construction and query settings.

    All fields have defaults, so a config file only needs
    to name what it changes. Field names follow the
    PascalCase convention of the JSON files.

    @date: 13 Oct, 2025
    @author: Bartu
*/

use crate::camera::Camera;
use crate::json_parser::{deser_float, deser_usize};
use crate::prelude::*;

/// Leaf capacity: a node with this many primitives or fewer is not split.
pub const NODE_SIZE: usize = 8;

/// Recursion bound of the KD builder.
pub const MAX_DEPTH: usize = 5;

/// Hard cap for `max_depth`. Duplication can double the primitive
/// references per level, and 2^21 nodes is as far as we let that go.
pub const MAX_DEPTH_LIMIT: usize = 20;

/// Where the KD builder places the splitting plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitHeuristic {
    /// Minimum coordinate of the median primitive, sorted by minimum coordinate.
    #[default]
    Median,
    /// Middle of the node's extent.
    Midpoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Structure {
    #[default]
    #[serde(alias = "kdtree")]
    KdTree,
    Bvh,
}

/// What a query reports back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMode {
    /// Every primitive in every leaf the ray's path crosses, unordered.
    AllCandidates,
    /// Nearest exact hit.
    #[default]
    ClosestHit,
    /// Stop at the first exact hit found, e.g. for shadow rays.
    AnyHit,
}

#[derive(Debug, Clone, Deserialize, SmartDefault)]
#[serde(default)]
pub struct IndexConfig {
    #[serde(rename = "NodeSize", deserialize_with = "deser_usize")]
    #[default(NODE_SIZE)]
    pub node_size: usize,

    #[serde(rename = "MaxDepth", deserialize_with = "deser_usize")]
    #[default(MAX_DEPTH)]
    pub max_depth: usize,

    #[serde(rename = "Split")]
    pub split: SplitHeuristic,

    #[serde(rename = "Structure")]
    pub structure: Structure,

    #[serde(rename = "QueryMode")]
    pub query_mode: QueryMode,

    #[serde(rename = "RayEpsilon", deserialize_with = "deser_float")]
    #[default(1e-4)]
    pub ray_epsilon: Float,
}

impl IndexConfig {
    pub fn validate(&self) -> Result<()> {
        if self.node_size == 0 {
            return Err(IndexError::InvalidConfig("NodeSize must be at least 1".to_string()));
        }
        if self.max_depth > MAX_DEPTH_LIMIT {
            return Err(IndexError::InvalidConfig(format!(
                "MaxDepth {} exceeds the limit of {}",
                self.max_depth, MAX_DEPTH_LIMIT
            )));
        }
        if !(self.ray_epsilon.is_finite() && self.ray_epsilon >= 0.0) {
            return Err(IndexError::InvalidConfig(format!(
                "RayEpsilon must be a finite non-negative number, got {}",
                self.ray_epsilon
            )));
        }
        Ok(())
    }

    pub fn with_limits(node_size: usize, max_depth: usize) -> Self {
        Self {
            node_size,
            max_depth,
            ..Self::default()
        }
    }
}

/// Everything the `kdtrace` binary reads from its config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    #[serde(rename = "Index")]
    pub index: IndexConfig,

    #[serde(rename = "Camera")]
    pub camera: Camera,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let c = IndexConfig::default();
        assert_eq!(c.node_size, NODE_SIZE);
        assert_eq!(c.max_depth, MAX_DEPTH);
        assert_eq!(c.split, SplitHeuristic::Median);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn zero_node_size_is_rejected() {
        assert!(IndexConfig::with_limits(0, 5).validate().is_err());
    }

    #[test]
    fn depth_above_limit_is_rejected() {
        assert!(IndexConfig::with_limits(8, MAX_DEPTH_LIMIT).validate().is_ok());
        assert!(IndexConfig::with_limits(8, MAX_DEPTH_LIMIT + 1).validate().is_err());
    }

    #[test]
    fn negative_epsilon_is_rejected() {
        let c = IndexConfig { ray_epsilon: -1.0, ..IndexConfig::default() };
        assert!(matches!(c.validate(), Err(IndexError::InvalidConfig(_))));
    }
}
