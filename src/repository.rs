//! Seed repositories.
//!
//! A repository hands out historically validated plans for an operator's
//! static shape metadata. [`InMemoryRepository`] keeps them in memory and
//! can be loaded from JSON:
//!
//! ```text
//! {
//!   "spatial": [ { "op_type": "conv2d", "plan": {...}, "anchor": {"h": 56, "w": 56} } ],
//!   "batch":   [ { "op_type": "conv2d", "plan": {...}, "anchor": 16 } ]
//! }
//! ```

use crate::geometry::Point;
use crate::plan::{BatchSeed, Seed, SpatialSeed};
use crate::shape::ShapeDescriptor;
use crate::utils::errors::{TilingError, TilingResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Source of seeds for the selectors.
pub trait SeedRepository<P> {
    /// Seeds anchored at `(h, w)` points, for shapes with symbolic H/W.
    fn spatial_seeds(&self, shape: &ShapeDescriptor) -> Vec<SpatialSeed<P>>;

    /// Seeds anchored at batch values, for shapes with a symbolic batch.
    fn batch_seeds(&self, shape: &ShapeDescriptor) -> Vec<BatchSeed<P>>;
}

/// A repository record: a seed tagged with the operator it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoEntry<P, A> {
    pub op_type: String,
    pub plan: P,
    pub anchor: A,
}

/// Seeds held in memory, keyed by operator type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "P: Deserialize<'de>"))]
pub struct InMemoryRepository<P> {
    #[serde(default)]
    spatial: Vec<RepoEntry<P, Point>>,
    #[serde(default)]
    batch: Vec<RepoEntry<P, i64>>,
}

impl<P> Default for InMemoryRepository<P> {
    fn default() -> Self {
        Self { spatial: Vec::new(), batch: Vec::new() }
    }
}

impl<P> InMemoryRepository<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a seed validated at `anchor` for `op_type`.
    pub fn add_spatial(&mut self, op_type: impl Into<String>, plan: P, anchor: Point) {
        self.spatial.push(RepoEntry { op_type: op_type.into(), plan, anchor });
    }

    /// Add a seed validated at batch `anchor` for `op_type`.
    pub fn add_batch(&mut self, op_type: impl Into<String>, plan: P, anchor: i64) {
        self.batch.push(RepoEntry { op_type: op_type.into(), plan, anchor });
    }

    pub fn len(&self) -> usize {
        self.spatial.len() + self.batch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<P: DeserializeOwned> InMemoryRepository<P> {
    /// Parse a repository from its JSON form.
    pub fn from_json_str(json: &str) -> TilingResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a repository from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> TilingResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| TilingError::Repository(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&text)
    }
}

fn matching<P: Clone, A: Copy>(entries: &[RepoEntry<P, A>], op_type: &str) -> Vec<Seed<P, A>> {
    entries
        .iter()
        .filter(|e| e.op_type == op_type)
        .map(|e| Seed::new(e.plan.clone(), e.anchor))
        .collect()
}

impl<P: Clone> SeedRepository<P> for InMemoryRepository<P> {
    fn spatial_seeds(&self, shape: &ShapeDescriptor) -> Vec<SpatialSeed<P>> {
        matching(&self.spatial, &shape.op_type)
    }

    fn batch_seeds(&self, shape: &ShapeDescriptor) -> Vec<BatchSeed<P>> {
        matching(&self.batch, &shape.op_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::DimRange;

    #[test]
    fn test_filter_by_op_type() {
        let mut repo = InMemoryRepository::new();
        repo.add_spatial("conv2d", 1u32, Point::new(10, 10));
        repo.add_spatial("pool", 2u32, Point::new(20, 20));
        repo.add_batch("conv2d", 3u32, 16);

        let shape = ShapeDescriptor::spatial("conv2d", 1, DimRange::new(1, 64), DimRange::new(1, 64));
        let seeds = repo.spatial_seeds(&shape);
        assert_eq!(seeds, vec![Seed::new(1u32, Point::new(10, 10))]);
        assert_eq!(repo.batch_seeds(&shape).len(), 1);
        assert_eq!(repo.len(), 3);
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "spatial": [{"op_type": "conv2d", "plan": 7, "anchor": {"h": 3, "w": 4}}]
        }"#;
        let repo: InMemoryRepository<u32> = InMemoryRepository::from_json_str(json).unwrap();
        let shape = ShapeDescriptor::batched("conv2d", DimRange::new(1, 8), 3, 4);
        assert!(repo.batch_seeds(&shape).is_empty());
        assert_eq!(repo.spatial_seeds(&shape)[0].plan, 7);
    }

    #[test]
    fn test_missing_file() {
        let err = InMemoryRepository::<u32>::from_path("/nonexistent/seeds.json").unwrap_err();
        assert!(matches!(err, TilingError::Repository(_)));
    }

    /// A plan type with no `Default` impl.
    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct Blocks {
        rows: i64,
    }

    #[test]
    fn test_from_json_plan_without_default() {
        let json = r#"{"batch": [{"op_type": "conv2d", "plan": {"rows": 4}, "anchor": 16}]}"#;
        let repo: InMemoryRepository<Blocks> = InMemoryRepository::from_json_str(json).unwrap();
        let shape = ShapeDescriptor::batched("conv2d", DimRange::new(1, 64), 8, 8);
        assert_eq!(repo.batch_seeds(&shape), vec![Seed::new(Blocks { rows: 4 }, 16)]);
        assert!(repo.spatial_seeds(&shape).is_empty());
    }
}
