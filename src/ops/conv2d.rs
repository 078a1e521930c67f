//! Reference 2-D convolution operator.
//!
//! A small but complete resource model: the input feature map is streamed
//! into an on-chip L1 buffer either whole (full load) or as row blocks that
//! produce `block_rows` output rows at a time. A plan fits a shape when the
//! L1 footprint of one load, optionally double buffered, stays within
//! `l1_bytes`.

use crate::case::TilingCase;
use crate::config::TilingConfig;
use crate::driver::TilingDriver;
use crate::fallback::SynthesisOracle;
use crate::feasibility::FeasibilityOracle;
use crate::geometry::Point;
use crate::metadata::InMemorySink;
use crate::plan::TilingPlan;
use crate::repository::InMemoryRepository;
use crate::shape::{ShapeDescriptor, ShapePoint, VAR_HEIGHT, VAR_WIDTH};
use crate::utils::errors::{TilingError, TilingResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Operator type tag used in seed repositories.
pub const OP_TYPE: &str = "conv2d";

/// Static convolution attributes and the hardware budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conv2dParams {
    pub kernel: Point,
    pub stride: Point,
    pub dilation: Point,
    /// Symmetric padding per axis
    pub pad: Point,
    /// Input channels resident in L1 per load
    pub cin_block: i64,
    pub dtype_bytes: i64,
    pub l1_bytes: i64,
    pub cores: i64,
}

impl Default for Conv2dParams {
    fn default() -> Self {
        Self {
            kernel: Point::splat(3),
            stride: Point::splat(1),
            dilation: Point::splat(1),
            pad: Point::splat(1),
            cin_block: 16,
            dtype_bytes: 2,
            l1_bytes: 1 << 20,
            cores: 32,
        }
    }
}

impl Conv2dParams {
    /// Kernel extent after dilation.
    pub fn dilated_kernel(&self) -> Point {
        Point::new(
            (self.kernel.h - 1) * self.dilation.h + 1,
            (self.kernel.w - 1) * self.dilation.w + 1,
        )
    }

    /// Output size for an input of `input`, 0 on an axis the kernel does not fit.
    pub fn out_size(&self, input: Point) -> Point {
        let dk = self.dilated_kernel();
        let out = |i: i64, p: i64, k: i64, s: i64| {
            let span = i + 2 * p - k;
            if span < 0 {
                0
            } else {
                span / s.max(1) + 1
            }
        };
        Point::new(
            out(input.h, self.pad.h, dk.h, self.stride.h),
            out(input.w, self.pad.w, dk.w, self.stride.w),
        )
    }

    /// Smallest input with at least one output on each axis.
    pub fn min_input(&self) -> Point {
        let dk = self.dilated_kernel();
        Point::new((dk.h - 2 * self.pad.h).max(1), (dk.w - 2 * self.pad.w).max(1))
    }

    /// Input rows needed to produce `block_rows` output rows.
    pub fn input_rows(&self, block_rows: i64) -> i64 {
        (block_rows - 1) * self.stride.h + self.dilated_kernel().h
    }

    fn bytes_per_cell(&self) -> i64 {
        self.cin_block * self.dtype_bytes
    }

    /// L1 bytes one load of `plan` needs at input size `size`.
    pub fn footprint(&self, plan: &Conv2dTiling, size: Point) -> i64 {
        let cells = if plan.full_load {
            size.h * size.w
        } else {
            let rows = self.input_rows(plan.block_rows).min(size.h + 2 * self.pad.h);
            rows * (size.w + 2 * self.pad.w)
        };
        cells * self.bytes_per_cell() * plan.buffers()
    }
}

/// One shape-specialized convolution tiling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conv2dTiling {
    /// Output rows produced per L1 load
    pub block_rows: i64,
    /// Cores working along the batch axis
    pub batch_dim: i64,
    pub double_buffer: bool,
    /// The whole input feature map sits in L1
    pub full_load: bool,
}

impl Conv2dTiling {
    pub fn buffers(&self) -> i64 {
        if self.double_buffer {
            2
        } else {
            1
        }
    }
}

impl TilingPlan for Conv2dTiling {
    fn primary_parallelism(&self) -> i64 {
        self.batch_dim
    }
}

impl fmt::Display for Conv2dTiling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rows={} batch_dim={}", self.block_rows, self.batch_dim)?;
        if self.full_load {
            write!(f, " full")?;
        }
        if self.double_buffer {
            write!(f, " db")?;
        }
        Ok(())
    }
}

/// L1 feasibility for [`Conv2dTiling`].
///
/// Inputs smaller than [`Conv2dParams::min_input`] are never feasible and the
/// cost model cannot plan for them; [`Conv2dJob::run`] rejects declared ranges
/// that include such inputs.
#[derive(Debug, Clone)]
pub struct Conv2dFeasibility {
    pub params: Conv2dParams,
}

impl Conv2dFeasibility {
    pub fn new(params: Conv2dParams) -> Self {
        Self { params }
    }
}

impl FeasibilityOracle<Conv2dTiling> for Conv2dFeasibility {
    fn minimal_bound(&self, _plan: &Conv2dTiling) -> Point {
        self.params.min_input()
    }

    fn is_feasible(&self, plan: &Conv2dTiling, size: Point) -> bool {
        let min = self.params.min_input();
        if size.h < min.h || size.w < min.w {
            return false;
        }
        if !plan.full_load && plan.block_rows > self.params.out_size(size).h {
            return false;
        }
        self.params.footprint(plan, size) <= self.params.l1_bytes
    }

    fn capacity_bound(&self, plan: &Conv2dTiling) -> Option<i64> {
        plan.full_load
            .then(|| self.params.l1_bytes / (self.params.bytes_per_cell() * plan.buffers()))
    }
}

/// Heuristic cost model: the largest L1 load that fits, double buffered when possible.
#[derive(Debug, Clone)]
pub struct Conv2dCostModel {
    pub params: Conv2dParams,
}

impl Conv2dCostModel {
    pub fn new(params: Conv2dParams) -> Self {
        Self { params }
    }

    /// Best plan at input size `hw` with `batch` images.
    pub fn plan_for(&self, hw: Point, batch: i64) -> TilingResult<Conv2dTiling> {
        let p = &self.params;
        let out = p.out_size(hw);
        if out.h < 1 || out.w < 1 {
            return Err(TilingError::synthesis(format!("kernel does not fit input {}", hw)));
        }
        let batch_dim = batch.min(p.cores).max(1);

        for double_buffer in [true, false] {
            let full = Conv2dTiling { block_rows: out.h, batch_dim, double_buffer, full_load: true };
            if p.footprint(&full, hw) <= p.l1_bytes {
                return Ok(full);
            }
        }

        for double_buffer in [true, false] {
            let bufs = if double_buffer { 2 } else { 1 };
            let row_bytes = (hw.w + 2 * p.pad.w) * p.bytes_per_cell() * bufs;
            let rows_fit = p.l1_bytes / row_bytes;
            let dk = p.dilated_kernel();
            if rows_fit < dk.h {
                continue;
            }
            let block_rows = ((rows_fit - dk.h) / p.stride.h.max(1) + 1).min(out.h);
            return Ok(Conv2dTiling { block_rows, batch_dim, double_buffer, full_load: false });
        }

        Err(TilingError::synthesis(format!(
            "no row block of width {} fits {} bytes of L1",
            hw.w, p.l1_bytes
        )))
    }
}

impl SynthesisOracle<Conv2dTiling> for Conv2dCostModel {
    fn synthesize(&self, shape: &ShapeDescriptor, point: ShapePoint) -> TilingResult<Conv2dTiling> {
        match point {
            ShapePoint::Spatial(hw) => self.plan_for(hw, shape.batch.range().min),
            ShapePoint::Batch(batch) => {
                let hw = Point::new(shape.height.range().min, shape.width.range().min);
                self.plan_for(hw, batch)
            }
        }
    }
}

/// A complete conv2d tiling request, as read from a job file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conv2dJob {
    pub shape: ShapeDescriptor,
    #[serde(default)]
    pub operator: Conv2dParams,
    #[serde(default)]
    pub seeds: InMemoryRepository<Conv2dTiling>,
    #[serde(default)]
    pub config: TilingConfig,
}

/// Cases plus the metadata published while computing them.
#[derive(Debug, Clone)]
pub struct Conv2dOutcome {
    pub cases: Vec<TilingCase<Conv2dTiling>>,
    pub metadata: InMemorySink,
}

impl Conv2dJob {
    pub fn from_json_str(json: &str) -> TilingResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> TilingResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Reject H/W ranges that reach below the smallest input the kernel fits.
    ///
    /// The cost model has no plan for such inputs, so tiling would otherwise
    /// fail halfway through the fallback loop.
    pub fn validate(&self) -> TilingResult<()> {
        let min = self.operator.min_input();
        for (name, dim, floor) in [(VAR_HEIGHT, self.shape.height, min.h), (VAR_WIDTH, self.shape.width, min.w)] {
            let r = dim.range();
            if r.min < floor {
                return Err(TilingError::InvalidRange { dim: name.to_string(), min: r.min, max: r.max });
            }
        }
        Ok(())
    }

    /// Run the tiling driver with this job's oracles and seeds.
    pub fn run(&self) -> TilingResult<Conv2dOutcome> {
        self.validate()?;
        let feasibility = Conv2dFeasibility::new(self.operator.clone());
        let cost_model = Conv2dCostModel::new(self.operator.clone());
        let mut metadata = InMemorySink::new();
        let cases = TilingDriver::new(&feasibility, &cost_model, &self.seeds)
            .with_config(self.config.clone())
            .calc_tiling_with_sink(&self.shape, &mut metadata)?;
        Ok(Conv2dOutcome { cases, metadata })
    }
}
