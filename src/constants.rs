//! Client constants.

use alloy::primitives::{b256, B256};

/// ERC-7821 mode selector for plain single-batch execution.
///
/// ```solidity
/// bytes32 constant MODE_DEFAULT = 0x0100000000000000000000000000000000000000000000000000000000000000;
/// ```
pub const MODE_DEFAULT: B256 =
    b256!("0x0100000000000000000000000000000000000000000000000000000000000000");

/// ERC-7821 mode selector for single-batch execution carrying trailing `opData`.
///
/// The `0x78210001` marker in bytes 6..10 signals the optional-mode extension
/// defined by ERC-7821.
pub const MODE_OP_DATA: B256 =
    b256!("0x0100000000007821000100000000000000000000000000000000000000000000");
