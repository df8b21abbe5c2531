#![forbid(unsafe_code)]

//! Declarative algebraic functions for flight-dynamics simulation models:
//! configuration-defined expression trees (sums, products, trig, comparisons,
//! table lookups, conditionals) built once at model load and evaluated every
//! simulation step to a scalar, optionally published into the shared property
//! namespace.

pub mod builder;
pub mod catalog;
pub mod config;
pub mod context;
pub mod error;
pub mod function;
pub mod param;
pub mod property;
pub mod table;

pub use builder::FunctionBuilder;
pub use catalog::Op;
pub use config::ConfigNode;
pub use context::SimContext;
pub use error::{AerofnError, AerofnResult};
pub use function::Function;
pub use param::{Constant, Parameter, PropertyRef};
pub use property::{PropertyHandle, PropertyManager};
pub use table::Table1D;
