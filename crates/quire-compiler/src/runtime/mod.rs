//! Runtime types and the runtime operation library.

pub mod abi;
pub mod function;
pub mod ops;
pub mod value;

pub use abi::{RuntimeLibrary, RuntimeOp, StandardRuntime};
pub use function::{CallContext, NativeFunction};
pub use value::Value;
