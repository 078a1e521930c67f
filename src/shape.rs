//! Operator shape metadata with symbolic dimensions.
//!
//! A [`ShapeDescriptor`] names the operator and states, for batch, height
//! and width, whether the dimension is a compile-time constant or a
//! symbolic dimension bounded by a declared range. The pattern of symbolic
//! dimensions decides which selector the driver runs.

use crate::geometry::{DimRange, Point, Rect};
use crate::utils::errors::{TilingError, TilingResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Variable name of the symbolic batch dimension.
pub const VAR_BATCH: &str = "batch";
/// Variable name of the symbolic height dimension.
pub const VAR_HEIGHT: &str = "h";
/// Variable name of the symbolic width dimension.
pub const VAR_WIDTH: &str = "w";

/// One dimension of an operator input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dim {
    /// Known at compile time
    Static(i64),
    /// Symbolic, bounded by an inclusive range
    Dynamic(DimRange),
}

impl Dim {
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Dim::Dynamic(_))
    }

    /// The declared range; a static dimension is a single-value range.
    pub fn range(&self) -> DimRange {
        match *self {
            Dim::Static(v) => DimRange::single(v),
            Dim::Dynamic(r) => r,
        }
    }
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dim::Static(v) => write!(f, "{}", v),
            Dim::Dynamic(r) => write!(f, "?{}", r),
        }
    }
}

/// Static shape metadata of an operator input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeDescriptor {
    /// Operator type, used to look up seeds
    pub op_type: String,
    pub batch: Dim,
    pub height: Dim,
    pub width: Dim,
}

/// Which selector applies to a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TilingMode {
    /// H and W symbolic, batch static
    Spatial { h: DimRange, w: DimRange },
    /// Batch symbolic, H and W static
    Batch(DimRange),
}

impl TilingMode {
    pub fn name(&self) -> &'static str {
        match self {
            TilingMode::Spatial { .. } => "dynamic_hw",
            TilingMode::Batch(_) => "dynamic_batch",
        }
    }

    /// Target rectangle of a spatial mode.
    pub fn target_rect(&self) -> Option<Rect> {
        match *self {
            TilingMode::Spatial { h, w } => Some(Rect::from_ranges(h, w)),
            TilingMode::Batch(_) => None,
        }
    }
}

/// A concrete point in the symbolic shape space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapePoint {
    Spatial(Point),
    Batch(i64),
}

impl fmt::Display for ShapePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapePoint::Spatial(p) => write!(f, "hw={}", p),
            ShapePoint::Batch(b) => write!(f, "batch={}", b),
        }
    }
}

impl ShapeDescriptor {
    /// Shape with symbolic H and W and a fixed batch.
    pub fn spatial(op_type: impl Into<String>, batch: i64, h: DimRange, w: DimRange) -> Self {
        Self {
            op_type: op_type.into(),
            batch: Dim::Static(batch),
            height: Dim::Dynamic(h),
            width: Dim::Dynamic(w),
        }
    }

    /// Shape with a symbolic batch and fixed H and W.
    pub fn batched(op_type: impl Into<String>, batch: DimRange, h: i64, w: i64) -> Self {
        Self {
            op_type: op_type.into(),
            batch: Dim::Dynamic(batch),
            height: Dim::Static(h),
            width: Dim::Static(w),
        }
    }

    /// Classify the symbolic-dimension pattern.
    pub fn mode(&self) -> TilingResult<TilingMode> {
        self.validate()?;
        match (self.batch, self.height, self.width) {
            (Dim::Static(_), Dim::Dynamic(h), Dim::Dynamic(w)) => Ok(TilingMode::Spatial { h, w }),
            (Dim::Dynamic(b), Dim::Static(_), Dim::Static(_)) => Ok(TilingMode::Batch(b)),
            _ => Err(TilingError::UnsupportedPattern(format!(
                "{} with batch={}, h={}, w={}: expected dynamic H and W, or dynamic batch alone",
                self.op_type, self.batch, self.height, self.width
            ))),
        }
    }

    fn validate(&self) -> TilingResult<()> {
        for (name, dim) in [(VAR_BATCH, self.batch), (VAR_HEIGHT, self.height), (VAR_WIDTH, self.width)] {
            let r = dim.range();
            if r.min < 1 || !r.is_well_formed() {
                return Err(TilingError::InvalidRange { dim: name.to_string(), min: r.min, max: r.max });
            }
        }
        Ok(())
    }
}

impl fmt::Display for ShapeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}, {}, {}]", self.op_type, self.batch, self.height, self.width)
    }
}
