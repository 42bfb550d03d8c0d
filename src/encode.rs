//! Batch encoding for ERC-7821 execution data.

use crate::{
    error::EncodeError,
    types::{Call, CallRequest},
};
use alloy::{primitives::Bytes, sol_types::SolValue};

/// Derives the ERC-7821 [`Call`] structs for the given requests.
pub fn encode_calls(calls: &[CallRequest]) -> Result<Vec<Call>, EncodeError> {
    calls.iter().map(CallRequest::to_call).collect()
}

/// Encodes the execution data for an ERC-7821 `execute` call.
///
/// Without auxiliary data this is `abi.encode(calls)`; with it, the batch is
/// followed by a trailing `opData` bytes field, i.e. `abi.encode(calls, opData)`.
/// The encoding is deterministic and must round-trip through the batch-struct
/// ABI schema exactly.
pub fn encode_execution_data(
    calls: &[CallRequest],
    op_data: Option<&Bytes>,
) -> Result<Bytes, EncodeError> {
    let calls = encode_calls(calls)?;
    Ok(match op_data {
        Some(op_data) => (calls, op_data.clone()).abi_encode_params().into(),
        None => calls.abi_encode().into(),
    })
}
