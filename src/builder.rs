use std::rc::Rc;

use crate::{
    catalog::{Op, UNBOUNDED},
    config::ConfigNode,
    context::SimContext,
    error::{AerofnError, AerofnResult},
    function::Function,
    param::{Constant, Parameter, PropertyRef},
    table::Table1D,
};

/// Recursive-descent constructor for [`Function`] trees.
///
/// Walks a configuration node depth-first, classifying each child as a
/// literal value, a property reference, a table, or a nested operation, and
/// validates child counts against the operation catalog. All construction
/// errors are fatal: a model with a malformed function must not load.
pub struct FunctionBuilder<'a> {
    ctx: &'a Rc<SimContext>,
    prefix: String,
}

impl<'a> FunctionBuilder<'a> {
    pub fn new(ctx: &'a Rc<SimContext>, prefix: &str) -> Self {
        Self {
            ctx,
            prefix: prefix.to_string(),
        }
    }

    /// Builds the top-level function from a `function` container element or a
    /// bare operation element. Only this level honors the `name` and
    /// `copy-to` attributes; a named function is published into the property
    /// namespace before this returns.
    #[tracing::instrument(skip_all, fields(tag = %node.tag, name = node.attribute("name").unwrap_or("")))]
    pub fn build(&self, node: &ConfigNode) -> AerofnResult<Rc<Function>> {
        let op = keyword_op(node)?;
        let params = match op {
            Op::TopLevel => self.container_children(node)?,
            _ => self.operation_children(node, op)?,
        };
        check_arity(node, op, params.len())?;

        let name = node
            .attribute("name")
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .map(|n| self.publication_path(n));

        let copy_to = match node.attribute("copy-to") {
            Some(path) => {
                let handle = self.ctx.properties().resolve_or_create(path)?;
                if handle.is_bound() {
                    return Err(AerofnError::config(format!(
                        "copy-to target '{path}' is bound to a function and cannot be written"
                    )));
                }
                Some(handle)
            }
            None => None,
        };

        let function = Rc::new(Function::new(
            Rc::clone(self.ctx),
            op,
            params,
            name,
            copy_to,
        ));
        if let Some(path) = function.name() {
            self.ctx
                .properties()
                .bind(path, Rc::clone(&function) as Rc<dyn Parameter>)?;
        }
        Ok(function)
    }

    /// A `function` container holds exactly one operation (or one bare leaf,
    /// degenerately) besides documentation.
    fn container_children(&self, node: &ConfigNode) -> AerofnResult<Vec<Rc<dyn Parameter>>> {
        let mut operations = 0usize;
        let mut params: Vec<Rc<dyn Parameter>> = Vec::new();
        for child in &node.children {
            if child.is_documentation() {
                continue;
            }
            if !(child.is_value() || child.is_property() || child.is_table()) {
                operations += 1;
            }
            params.push(self.child_param(child)?);
        }
        match params.len() {
            0 => Err(AerofnError::config(
                "function element contains no operation",
            )),
            1 => Ok(params),
            _ if operations > 1 => Err(AerofnError::config(
                "only one operation element is permitted per function",
            )),
            _ => Err(AerofnError::config(
                "value/property/table elements directly under a function must be wrapped in an operation",
            )),
        }
    }

    fn operation_children(
        &self,
        node: &ConfigNode,
        op: Op,
    ) -> AerofnResult<Vec<Rc<dyn Parameter>>> {
        let children: Vec<&ConfigNode> = node
            .children
            .iter()
            .filter(|c| !c.is_documentation())
            .collect();
        let mut params = Vec::with_capacity(children.len());
        for child in &children {
            params.push(self.child_param(child)?);
        }
        if op == Op::Interpolate1d {
            validate_interpolation(node, &children)?;
        }
        Ok(params)
    }

    fn child_param(&self, child: &ConfigNode) -> AerofnResult<Rc<dyn Parameter>> {
        if child.is_value() {
            return Ok(Rc::new(Constant::new(child.numeric_text()?)));
        }
        if child.is_property() {
            let path = child.path_text()?;
            let handle = self.ctx.properties().resolve(path).map_err(|e| {
                AerofnError::config(format!("in <{}> element: {e}", child.tag))
            })?;
            return Ok(Rc::new(PropertyRef::new(handle)));
        }
        if child.is_table() {
            return Ok(Rc::new(Table1D::from_config(self.ctx, child)?));
        }
        if child.tag == "function" {
            return Err(AerofnError::config(
                "nested <function> elements are not supported; nest an operation element instead",
            ));
        }
        match Op::from_keyword(&child.tag) {
            Some(op) => {
                let params = self.operation_children(child, op)?;
                check_arity(child, op, params.len())?;
                Ok(Rc::new(Function::new(
                    Rc::clone(self.ctx),
                    op,
                    params,
                    None,
                    None,
                )))
            }
            None => Err(AerofnError::config(format!(
                "unknown operation keyword '{}'",
                child.tag
            ))),
        }
    }

    /// Publication path formation: a numeric prefix substitutes every `#` in
    /// the name (indexed template functions, e.g. per-engine copies); any
    /// other prefix is prepended as a path segment.
    fn publication_path(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_string()
        } else if self.prefix.chars().all(|c| c.is_ascii_digit()) {
            name.replace('#', &self.prefix)
        } else {
            format!("{}/{}", self.prefix, name)
        }
    }
}

fn keyword_op(node: &ConfigNode) -> AerofnResult<Op> {
    Op::from_keyword(&node.tag).ok_or_else(|| {
        AerofnError::config(format!("unknown operation keyword '{}'", node.tag))
    })
}

fn check_arity(node: &ConfigNode, op: Op, count: usize) -> AerofnResult<()> {
    let spec = op.spec();
    if (spec.min_args..=spec.max_args).contains(&count) {
        return Ok(());
    }
    let expected = if spec.min_args == spec.max_args {
        format!("exactly {}", spec.min_args)
    } else if spec.max_args == UNBOUNDED {
        format!("at least {}", spec.min_args)
    } else {
        format!("{} to {}", spec.min_args, spec.max_args)
    };
    Err(AerofnError::config(format!(
        "<{}> takes {expected} argument(s), found {count}",
        node.tag
    )))
}

/// Structural rules for `interpolate1d`: an odd argument count (lookup value
/// plus (x, y) pairs), and strictly ascending breakpoints wherever the x
/// arguments are literal values.
fn validate_interpolation(node: &ConfigNode, children: &[&ConfigNode]) -> AerofnResult<()> {
    if children.len() % 2 == 0 {
        return Err(AerofnError::config(format!(
            "<{}> takes an odd number of arguments (a lookup value plus (x, y) pairs), found {}",
            node.tag,
            children.len()
        )));
    }
    let mut previous: Option<f64> = None;
    for x_child in children.iter().skip(1).step_by(2) {
        let x = if x_child.is_value() {
            Some(x_child.numeric_text()?)
        } else {
            None
        };
        if let (Some(prev), Some(x)) = (previous, x)
            && x <= prev
        {
            return Err(AerofnError::config(format!(
                "<{}> breakpoints must be strictly ascending ({prev} then {x})",
                node.tag
            )));
        }
        previous = x;
    }
    Ok(())
}
