/// Operation kinds recognized in a function definition.
///
/// `TopLevel` is the `function` container element itself: it holds exactly one
/// operation (or, degenerately, one leaf) and carries the publication
/// attributes. Every other variant is an algebraic operation keyword.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    TopLevel,
    Sum,
    Difference,
    Product,
    Quotient,
    Pow,
    Sqrt,
    ToRadians,
    ToDegrees,
    Exp,
    Log2,
    Ln,
    Log10,
    Abs,
    Sign,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Atan2,
    Min,
    Max,
    Avg,
    Fraction,
    Integer,
    Mod,
    Random,
    Urandom,
    Pi,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Nq,
    And,
    Or,
    Not,
    IfThen,
    Switch,
    Interpolate1d,
}

/// Catalog entry: keyword plus the child-count bounds enforced at build time.
pub struct OpSpec {
    pub keyword: &'static str,
    pub op: Op,
    pub min_args: usize,
    pub max_args: usize,
}

pub const UNBOUNDED: usize = usize::MAX;

/// The full operation catalog. Pure data: the builder validates arity against
/// it and the evaluator dispatches on `Op` alone.
pub static CATALOG: &[OpSpec] = &[
    entry("function", Op::TopLevel, 1, 1),
    entry("sum", Op::Sum, 1, UNBOUNDED),
    entry("difference", Op::Difference, 1, UNBOUNDED),
    entry("product", Op::Product, 1, UNBOUNDED),
    entry("quotient", Op::Quotient, 2, 2),
    entry("pow", Op::Pow, 2, 2),
    entry("sqrt", Op::Sqrt, 1, 1),
    entry("toradians", Op::ToRadians, 1, 1),
    entry("todegrees", Op::ToDegrees, 1, 1),
    entry("exp", Op::Exp, 1, 1),
    entry("log2", Op::Log2, 1, 1),
    entry("ln", Op::Ln, 1, 1),
    entry("log10", Op::Log10, 1, 1),
    entry("abs", Op::Abs, 1, 1),
    entry("sign", Op::Sign, 1, 1),
    entry("sin", Op::Sin, 1, 1),
    entry("cos", Op::Cos, 1, 1),
    entry("tan", Op::Tan, 1, 1),
    entry("asin", Op::Asin, 1, 1),
    entry("acos", Op::Acos, 1, 1),
    entry("atan", Op::Atan, 1, 1),
    entry("atan2", Op::Atan2, 2, 2),
    entry("min", Op::Min, 1, UNBOUNDED),
    entry("max", Op::Max, 1, UNBOUNDED),
    entry("avg", Op::Avg, 1, UNBOUNDED),
    entry("fraction", Op::Fraction, 1, 1),
    entry("integer", Op::Integer, 1, 1),
    entry("mod", Op::Mod, 2, 2),
    entry("random", Op::Random, 0, 0),
    entry("urandom", Op::Urandom, 0, 0),
    entry("pi", Op::Pi, 0, 0),
    entry("lt", Op::Lt, 2, 2),
    entry("le", Op::Le, 2, 2),
    entry("gt", Op::Gt, 2, 2),
    entry("ge", Op::Ge, 2, 2),
    entry("eq", Op::Eq, 2, 2),
    entry("nq", Op::Nq, 2, 2),
    entry("and", Op::And, 1, UNBOUNDED),
    entry("or", Op::Or, 1, UNBOUNDED),
    entry("not", Op::Not, 1, 1),
    entry("ifthen", Op::IfThen, 2, 3),
    entry("switch", Op::Switch, 2, UNBOUNDED),
    entry("interpolate1d", Op::Interpolate1d, 5, UNBOUNDED),
];

const fn entry(keyword: &'static str, op: Op, min_args: usize, max_args: usize) -> OpSpec {
    OpSpec {
        keyword,
        op,
        min_args,
        max_args,
    }
}

impl Op {
    pub fn from_keyword(keyword: &str) -> Option<Op> {
        CATALOG
            .iter()
            .find(|spec| spec.keyword == keyword)
            .map(|spec| spec.op)
    }

    pub fn spec(self) -> &'static OpSpec {
        // The catalog covers every variant.
        CATALOG
            .iter()
            .find(|spec| spec.op == self)
            .unwrap_or(&CATALOG[0])
    }

    pub fn keyword(self) -> &'static str {
        self.spec().keyword
    }
}

/// Tolerance for the 1.0/0.0 boolean encoding used by the logical and
/// conditional operations.
pub const BOOL_EPS: f64 = 1e-9;

/// Classifies a boolean-encoded value: magnitude within tolerance of 0 is
/// false, of 1 is true. Anything else is malformed and yields `None`; callers
/// decide the fallback (report once, treat as false).
pub fn binary(v: f64) -> Option<bool> {
    let mag = v.abs();
    if mag < BOOL_EPS {
        Some(false)
    } else if (mag - 1.0).abs() < BOOL_EPS {
        Some(true)
    } else {
        None
    }
}

pub fn encode(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_keyword_round_trips() {
        for spec in CATALOG {
            assert_eq!(Op::from_keyword(spec.keyword), Some(spec.op));
            assert_eq!(spec.op.keyword(), spec.keyword);
        }
    }

    #[test]
    fn unknown_keyword_is_none() {
        assert_eq!(Op::from_keyword("hypot"), None);
        assert_eq!(Op::from_keyword(""), None);
    }

    #[test]
    fn arity_bounds_match_the_vocabulary() {
        assert_eq!(Op::Quotient.spec().min_args, 2);
        assert_eq!(Op::Quotient.spec().max_args, 2);
        assert_eq!(Op::Sum.spec().max_args, UNBOUNDED);
        assert_eq!(Op::IfThen.spec().min_args, 2);
        assert_eq!(Op::IfThen.spec().max_args, 3);
        assert_eq!(Op::Pi.spec().min_args, 0);
        assert_eq!(Op::Pi.spec().max_args, 0);
        assert_eq!(Op::Interpolate1d.spec().min_args, 5);
    }

    #[test]
    fn binary_tolerates_near_encodings() {
        assert_eq!(binary(0.0), Some(false));
        assert_eq!(binary(1e-12), Some(false));
        assert_eq!(binary(1.0), Some(true));
        assert_eq!(binary(-1.0), Some(true));
        assert_eq!(binary(1.0 + 1e-12), Some(true));
        assert_eq!(binary(0.5), None);
        assert_eq!(binary(2.0), None);
    }

    #[test]
    fn encode_is_exact() {
        assert_eq!(encode(true), 1.0);
        assert_eq!(encode(false), 0.0);
    }
}
