//! Shared primitive types.

mod call;
pub use call::*;

mod erc7821;
pub use erc7821::*;
