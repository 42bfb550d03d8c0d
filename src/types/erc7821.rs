//! ERC-7821 minimal batch executor interface.

use crate::constants::{MODE_DEFAULT, MODE_OP_DATA};
use alloy::{primitives::B256, sol};
use core::fmt;
use serde::{Deserialize, Serialize};

sol! {
    #[sol(rpc)]
    #[derive(Debug)]
    interface IERC7821 {
        /// Executes the calls in `executionData` according to `mode`.
        ///
        /// `executionData` is `abi.encode(calls)`, optionally followed by a
        /// trailing `opData` bytes field, where `calls` is of type `Call[]`.
        function execute(bytes32 mode, bytes calldata executionData) external payable;

        /// Returns whether the contract supports the given execution mode.
        function supportsExecutionMode(bytes32 mode) external view returns (bool);

        /// Solady fallback sentinel, reverted when the called selector or the
        /// requested execution mode is not handled by the contract.
        error FnSelectorNotRecognized();
    }
}

/// The execution mode of an ERC-7821 batch, selecting the calling convention
/// the target contract should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExecutionMode {
    /// Single batch execution without auxiliary data.
    Default,
    /// Single batch execution with trailing `opData` bytes.
    OpData,
}

impl ExecutionMode {
    /// Selects the mode for a batch from the presence of auxiliary data.
    pub fn from_op_data<T>(op_data: Option<T>) -> Self {
        if op_data.is_some() { Self::OpData } else { Self::Default }
    }

    /// The `bytes32` mode selector passed to `execute` and
    /// `supportsExecutionMode`.
    pub const fn as_b256(&self) -> B256 {
        match self {
            Self::Default => MODE_DEFAULT,
            Self::OpData => MODE_OP_DATA,
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("default"),
            Self::OpData => f.write_str("opData"),
        }
    }
}
