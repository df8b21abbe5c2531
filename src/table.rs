use crate::{
    config::ConfigNode,
    context::SimContext,
    error::{AerofnError, AerofnResult},
    param::Parameter,
    property::PropertyHandle,
};

/// A one-dimensional lookup table with its own independent-variable property.
///
/// The full multi-dimensional table machinery belongs to the host simulation;
/// functions consume tables as opaque evaluables, and this covers the
/// one-dimensional case used throughout aerodynamic coefficient definitions.
pub struct Table1D {
    lookup: PropertyHandle,
    rows: Vec<(f64, f64)>,
}

impl std::fmt::Debug for Table1D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table1D")
            .field("lookup", &self.lookup.path())
            .field("rows", &self.rows)
            .finish()
    }
}

impl Table1D {
    /// Builds from a `table` (or `t`) configuration node containing an
    /// `independentVar` path and whitespace-separated `tableData` rows.
    pub fn from_config(ctx: &SimContext, node: &ConfigNode) -> AerofnResult<Self> {
        let indep = node
            .children
            .iter()
            .find(|c| c.tag == "independentVar")
            .ok_or_else(|| AerofnError::config("table is missing an <independentVar> element"))?;
        let lookup = ctx
            .properties()
            .resolve(indep.path_text()?)
            .map_err(|e| AerofnError::config(format!("table independent variable: {e}")))?;

        let data = node
            .children
            .iter()
            .find(|c| c.tag == "tableData")
            .ok_or_else(|| AerofnError::config("table is missing a <tableData> element"))?;
        let rows = parse_rows(&data.text)?;

        Ok(Self { lookup, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Parameter for Table1D {
    fn value(&self) -> f64 {
        interp_clamped(&self.rows, self.lookup.get())
    }
}

fn parse_rows(text: &str) -> AerofnResult<Vec<(f64, f64)>> {
    let mut rows = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split_whitespace();
        let (Some(x), Some(y), None) = (fields.next(), fields.next(), fields.next()) else {
            return Err(AerofnError::config(format!(
                "tableData row '{line}' is not an (x, y) pair"
            )));
        };
        let parse = |s: &str| {
            s.parse::<f64>().map_err(|_| {
                AerofnError::config(format!("malformed numeric literal '{s}' in tableData"))
            })
        };
        rows.push((parse(x)?, parse(y)?));
    }
    if rows.is_empty() {
        return Err(AerofnError::config("tableData has no rows"));
    }
    for pair in rows.windows(2) {
        if pair[1].0 <= pair[0].0 {
            return Err(AerofnError::config(format!(
                "tableData breakpoints must be strictly ascending ({} then {})",
                pair[0].0, pair[1].0
            )));
        }
    }
    Ok(rows)
}

/// Clamped linear interpolation over ascending (x, y) breakpoints: lookups
/// outside the covered range hold the nearest endpoint value, never
/// extrapolate.
pub(crate) fn interp_clamped(rows: &[(f64, f64)], x: f64) -> f64 {
    let Some(first) = rows.first() else {
        return 0.0;
    };
    if x <= first.0 {
        return first.1;
    }
    let last = rows[rows.len() - 1];
    if x >= last.0 {
        return last.1;
    }
    for pair in rows.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if x <= x1 {
            let t = (x - x0) / (x1 - x0);
            return y0 + (y1 - y0) * t;
        }
    }
    last.1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_node(data: &str) -> ConfigNode {
        ConfigNode::new("table")
            .child(ConfigNode::new("independentVar").text("aero/alpha-rad"))
            .child(ConfigNode::new("tableData").text(data))
    }

    fn ctx_with_alpha(alpha: f64) -> SimContext {
        let ctx = SimContext::new();
        ctx.properties().set("aero/alpha-rad", alpha).unwrap();
        ctx
    }

    #[test]
    fn interpolates_between_breakpoints() {
        let ctx = ctx_with_alpha(0.4);
        let t = Table1D::from_config(&ctx, &table_node("0.00 0.25\n0.80 0.50\n0.90 0.60")).unwrap();
        assert!((t.value() - 0.375).abs() < 1e-12);
    }

    #[test]
    fn clamps_instead_of_extrapolating() {
        let node = table_node("0.00 0.25\n0.80 0.50\n0.90 0.60");

        let hi = ctx_with_alpha(1.5);
        assert_eq!(Table1D::from_config(&hi, &node).unwrap().value(), 0.60);

        let lo = ctx_with_alpha(-2.0);
        assert_eq!(Table1D::from_config(&lo, &node).unwrap().value(), 0.25);
    }

    #[test]
    fn tracks_independent_variable_between_reads() {
        let ctx = ctx_with_alpha(0.0);
        let t = Table1D::from_config(&ctx, &table_node("0.0 0.0\n1.0 10.0")).unwrap();
        assert_eq!(t.value(), 0.0);
        ctx.properties().set("aero/alpha-rad", 0.5).unwrap();
        assert_eq!(t.value(), 5.0);
    }

    #[test]
    fn rejects_descending_breakpoints() {
        let ctx = ctx_with_alpha(0.0);
        let err = Table1D::from_config(&ctx, &table_node("0.9 0.6\n0.8 0.5")).unwrap_err();
        assert!(err.to_string().contains("strictly ascending"));
    }

    #[test]
    fn rejects_unknown_independent_variable() {
        let ctx = SimContext::new();
        let err = Table1D::from_config(&ctx, &table_node("0.0 1.0")).unwrap_err();
        assert!(err.to_string().contains("independent variable"));
    }

    #[test]
    fn rejects_ragged_rows() {
        let ctx = ctx_with_alpha(0.0);
        let err = Table1D::from_config(&ctx, &table_node("0.0 1.0 2.0")).unwrap_err();
        assert!(err.to_string().contains("(x, y) pair"));
    }
}
