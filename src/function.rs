use std::{cell::Cell, rc::Rc};

use crate::{
    builder::FunctionBuilder,
    catalog::{self, Op},
    config::ConfigNode,
    context::SimContext,
    error::AerofnResult,
    param::Parameter,
    property::PropertyHandle,
    table,
};

/// An algebraic function defined in configuration data: an operation tree over
/// constants, property references, tables, and nested operations, evaluating
/// to a scalar.
///
/// Built once at model load (see [`Function::from_config`]), evaluated every
/// simulation step. A named function publishes itself into the property
/// namespace; with caching enabled, repeated reads within one simulation
/// cycle return the memoized value.
pub struct Function {
    ctx: Rc<SimContext>,
    op: Op,
    params: Vec<Rc<dyn Parameter>>,
    name: Option<String>,
    copy_to: Option<PropertyHandle>,
    cached: Cell<bool>,
    memo: Cell<Option<CacheEntry>>,
    reported: Cell<bool>,
}

impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Function")
            .field("op", &self.op)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Copy)]
struct CacheEntry {
    cycle: u64,
    value: f64,
}

impl Function {
    /// Builds a function tree from a configuration node (a `function`
    /// container or a bare operation element). `prefix` qualifies the
    /// publication path of a named function.
    pub fn from_config(
        ctx: &Rc<SimContext>,
        node: &ConfigNode,
        prefix: &str,
    ) -> AerofnResult<Rc<Function>> {
        FunctionBuilder::new(ctx, prefix).build(node)
    }

    pub(crate) fn new(
        ctx: Rc<SimContext>,
        op: Op,
        params: Vec<Rc<dyn Parameter>>,
        name: Option<String>,
        copy_to: Option<PropertyHandle>,
    ) -> Self {
        Self {
            ctx,
            op,
            params,
            name,
            copy_to,
            cached: Cell::new(false),
            memo: Cell::new(None),
            reported: Cell::new(false),
        }
    }

    /// The publication path, for functions that have one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Enables or disables per-cycle caching. Disabling drops any memoized
    /// value; a fresh computation happens on the next read.
    pub fn set_caching(&self, enabled: bool) {
        self.cached.set(enabled);
        if !enabled {
            self.memo.set(None);
        }
    }

    pub fn caching(&self) -> bool {
        self.cached.get()
    }

    /// Computes the function value.
    ///
    /// With caching enabled, a value already computed in the current
    /// simulation cycle is returned as-is, with no recomputation and no
    /// side effects; [`SimContext::advance_cycle`] invalidates it. A real
    /// computation also mirrors the result into the copy-to property when
    /// one is configured.
    pub fn evaluate(&self) -> f64 {
        let cycle = self.ctx.cycle();
        if self.cached.get()
            && let Some(entry) = self.memo.get()
            && entry.cycle == cycle
        {
            return entry.value;
        }

        let value = self.apply();

        if let Some(target) = &self.copy_to
            && target.set(value).is_err()
        {
            self.report("copy-to target became read-only");
        }
        if self.cached.get() {
            self.memo.set(Some(CacheEntry { cycle, value }));
        }
        value
    }

    /// Decimal rendering of the current value.
    pub fn value_as_string(&self) -> String {
        format!("{:.9}", self.evaluate())
    }

    fn apply(&self) -> f64 {
        // Children evaluate depth-first, left to right; argument position is
        // significant for difference, quotient, pow, mod, atan2, ifthen and
        // switch.
        let vals: Vec<f64> = self.params.iter().map(|p| p.value()).collect();

        match self.op {
            Op::TopLevel => vals[0],
            Op::Sum => vals.iter().sum(),
            Op::Difference => vals[0] - vals[1..].iter().sum::<f64>(),
            Op::Product => vals.iter().product(),
            Op::Quotient => {
                if vals[1] == 0.0 {
                    self.report("quotient divisor is zero");
                    0.0
                } else {
                    vals[0] / vals[1]
                }
            }
            Op::Pow => vals[0].powf(vals[1]),
            Op::Sqrt => vals[0].sqrt(),
            Op::ToRadians => vals[0].to_radians(),
            Op::ToDegrees => vals[0].to_degrees(),
            Op::Exp => vals[0].exp(),
            Op::Log2 => vals[0].log2(),
            Op::Ln => vals[0].ln(),
            Op::Log10 => vals[0].log10(),
            Op::Abs => vals[0].abs(),
            Op::Sign => {
                if vals[0] < 0.0 {
                    -1.0
                } else {
                    1.0
                }
            }
            Op::Sin => vals[0].sin(),
            Op::Cos => vals[0].cos(),
            Op::Tan => vals[0].tan(),
            Op::Asin => self.clamped_unit(vals[0], "asin").asin(),
            Op::Acos => self.clamped_unit(vals[0], "acos").acos(),
            Op::Atan => vals[0].atan(),
            Op::Atan2 => vals[0].atan2(vals[1]),
            Op::Min => vals[1..].iter().copied().fold(vals[0], f64::min),
            Op::Max => vals[1..].iter().copied().fold(vals[0], f64::max),
            Op::Avg => vals.iter().sum::<f64>() / vals.len() as f64,
            Op::Fraction => vals[0].fract(),
            Op::Integer => vals[0].trunc(),
            Op::Mod => {
                if vals[1] == 0.0 {
                    self.report("mod divisor is zero");
                    0.0
                } else {
                    vals[0] % vals[1]
                }
            }
            Op::Random => self.ctx.gaussian(),
            Op::Urandom => self.ctx.uniform(),
            Op::Pi => std::f64::consts::PI,
            Op::Lt => catalog::encode(vals[0] < vals[1]),
            Op::Le => catalog::encode(vals[0] <= vals[1]),
            Op::Gt => catalog::encode(vals[0] > vals[1]),
            Op::Ge => catalog::encode(vals[0] >= vals[1]),
            Op::Eq => catalog::encode(vals[0] == vals[1]),
            Op::Nq => catalog::encode(vals[0] != vals[1]),
            Op::And => {
                let mut all = true;
                for &v in &vals {
                    all &= self.truthy(v);
                }
                catalog::encode(all)
            }
            Op::Or => {
                let mut any = false;
                for &v in &vals {
                    any |= self.truthy(v);
                }
                catalog::encode(any)
            }
            Op::Not => catalog::encode(!self.truthy(vals[0])),
            Op::IfThen => {
                if self.truthy(vals[0]) {
                    vals[1]
                } else {
                    vals.get(2).copied().unwrap_or(0.0)
                }
            }
            Op::Switch => {
                let idx = vals[0].trunc() as i64;
                if idx >= 0 && (idx as usize) < vals.len() - 1 {
                    vals[1 + idx as usize]
                } else {
                    self.report("switch index out of range");
                    0.0
                }
            }
            Op::Interpolate1d => {
                let rows: Vec<(f64, f64)> =
                    vals[1..].chunks_exact(2).map(|c| (c[0], c[1])).collect();
                table::interp_clamped(&rows, vals[0])
            }
        }
    }

    fn truthy(&self, v: f64) -> bool {
        match catalog::binary(v) {
            Some(b) => b,
            None => {
                self.report("malformed conditional value (expected 0 or 1)");
                false
            }
        }
    }

    fn clamped_unit(&self, v: f64, what: &str) -> f64 {
        if (-1.0..=1.0).contains(&v) {
            v
        } else {
            self.report(&format!("{what} argument outside [-1, 1], clamping"));
            v.clamp(-1.0, 1.0)
        }
    }

    /// Domain errors are surfaced once per function node, not once per step.
    fn report(&self, msg: &str) {
        if !self.reported.replace(true) {
            tracing::error!(
                function = self.name.as_deref().unwrap_or("anonymous"),
                op = self.op.keyword(),
                "{msg}"
            );
        }
    }
}

impl Parameter for Function {
    fn value(&self) -> f64 {
        self.evaluate()
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}
