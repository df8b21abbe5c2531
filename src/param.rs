use crate::property::PropertyHandle;

/// Anything that evaluates to a scalar: constants, property references,
/// tables, and whole functions. Evaluation is infallible; recoverable numeric
/// conditions are handled by the operation rules themselves.
pub trait Parameter {
    fn value(&self) -> f64;

    /// Diagnostic name, where one exists (property paths, published functions).
    fn name(&self) -> Option<&str> {
        None
    }
}

/// An immutable literal.
#[derive(Clone, Copy, Debug)]
pub struct Constant(f64);

impl Constant {
    pub fn new(value: f64) -> Self {
        Self(value)
    }
}

impl Parameter for Constant {
    fn value(&self) -> f64 {
        self.0
    }
}

/// A reference into the shared property namespace, resolved once at
/// construction. Reads see the namespace's current value on every call.
pub struct PropertyRef {
    handle: PropertyHandle,
}

impl PropertyRef {
    pub fn new(handle: PropertyHandle) -> Self {
        Self { handle }
    }
}

impl Parameter for PropertyRef {
    fn value(&self) -> f64 {
        self.handle.get()
    }

    fn name(&self) -> Option<&str> {
        Some(self.handle.path())
    }
}
