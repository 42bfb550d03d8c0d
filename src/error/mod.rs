//! Client error types and post-submission revert attribution.

use crate::types::{CallData, CallRequest, ExecutionMode, IERC7821};
use alloy::{
    dyn_abi::{DynSolValue, JsonAbiExt},
    json_abi::JsonAbi,
    primitives::{Address, Bytes},
    sol_types::SolError,
    transports::TransportError,
};
use core::fmt;
use thiserror::Error;

/// Errors deriving calldata or execution data from a call description.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The named function does not exist in the supplied interface.
    #[error("function {name} not found in the supplied ABI")]
    FunctionNotFound {
        /// The name of the missing function.
        name: String,
    },
    /// An error occurred during ABI encoding.
    #[error(transparent)]
    Abi(#[from] alloy::dyn_abi::Error),
}

/// The overarching error type returned by the executor.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// Malformed call description or argument/interface mismatch.
    #[error(transparent)]
    Encode(#[from] EncodeError),
    /// The pre-flight probe reported that the target does not support the
    /// requested execution mode. No transaction was submitted.
    #[error("execution mode {mode} is not supported by {address}")]
    UnsupportedMode {
        /// The probed target.
        address: Address,
        /// The unsupported mode.
        mode: ExecutionMode,
    },
    /// The submission reverted with the sentinel selector: the contract does
    /// not recognize the batch execute function or the requested mode.
    ///
    /// Unlike [`ExecutorError::UnsupportedMode`] this is discovered after
    /// submission, indicating an on-chain mismatch the pre-flight probe could
    /// not detect.
    #[error("batch execution is not supported by the contract")]
    ModeNotRecognized {
        /// The returned revert bytes.
        revert_data: Bytes,
    },
    /// The submission reverted and the revert was attributed to a specific
    /// sub-call of the batch.
    #[error(transparent)]
    CallRevert(#[from] Box<CallRevertError>),
    /// An error occurred talking to RPC.
    #[error(transparent)]
    Rpc(#[from] TransportError),
}

/// An on-chain revert attributed to a specific sub-call of a batch.
///
/// Carries the call's position, target, function and arguments over the
/// original low-level error, giving the caller an actionable diagnosis
/// instead of an opaque revert.
#[derive(Debug, Error)]
pub struct CallRevertError {
    /// Position of the matched call in the original batch.
    pub index: usize,
    /// The call target.
    pub target: Address,
    /// The name of the called function.
    pub function: String,
    /// The call arguments.
    pub args: Vec<DynSolValue>,
    /// Human-readable rendering of the decoded revert.
    pub decoded: String,
    /// The returned revert bytes.
    pub revert_data: Bytes,
    /// The original submission failure.
    #[source]
    pub source: TransportError,
}

impl fmt::Display for CallRevertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { index, target, function, decoded, .. } = self;
        write!(f, "call {index} ({function}) to {target} reverted: {decoded}")
    }
}

/// Attributes a submission failure to a specific call of the batch.
///
/// Extracts embedded revert data from the RPC error response; without any, the
/// original error passes through unchanged. A revert leading with the sentinel
/// selector becomes [`ExecutorError::ModeNotRecognized`]. Otherwise the revert
/// is decoded against each interface-described call in batch order and the
/// first match wins; calls carrying raw calldata cannot be matched and are
/// skipped.
pub fn resolve_execute_error(err: TransportError, calls: &[CallRequest]) -> ExecutorError {
    let Some(revert_data) = err.as_error_resp().and_then(|resp| resp.as_revert_data()) else {
        return ExecutorError::Rpc(err);
    };

    if revert_data.starts_with(&IERC7821::FnSelectorNotRecognized::SELECTOR) {
        return ExecutorError::ModeNotRecognized { revert_data };
    }

    for (index, call) in calls.iter().enumerate() {
        let CallData::Abi { abi, function, args } = &call.data else { continue };
        let Some(decoded) = decode_revert(abi, &revert_data) else { continue };
        return ExecutorError::CallRevert(Box::new(CallRevertError {
            index,
            target: call.to,
            function: function.clone(),
            args: args.clone(),
            decoded,
            revert_data,
            source: err,
        }));
    }

    ExecutorError::Rpc(err)
}

/// Decodes revert bytes against the errors declared by `abi`.
///
/// Returns a rendering of the first declared error whose selector and
/// argument encoding match, or `None` if the interface cannot explain the
/// revert.
fn decode_revert(abi: &JsonAbi, revert_data: &Bytes) -> Option<String> {
    let (selector, payload) = revert_data.split_first_chunk::<4>()?;
    abi.errors().find_map(|decl| {
        if decl.selector().0 != *selector {
            return None;
        }
        let values = decl.abi_decode_input(payload).ok()?;
        let args = values.iter().map(|value| format!("{value:?}")).collect::<Vec<_>>().join(", ");
        Some(format!("{}({args})", decl.name))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::{
        hex,
        primitives::{address, U256},
        rpc::json_rpc::ErrorPayload,
        sol,
        transports::{RpcError, TransportErrorKind},
    };

    sol! {
        error AlphaFault(uint256 code);
        error BetaFault(address who);
    }

    fn alpha_abi() -> JsonAbi {
        serde_json::from_str(
            r#"[
                {
                    "type": "function",
                    "name": "poke",
                    "stateMutability": "nonpayable",
                    "inputs": [],
                    "outputs": []
                },
                {
                    "type": "error",
                    "name": "AlphaFault",
                    "inputs": [{ "name": "code", "type": "uint256" }]
                }
            ]"#,
        )
        .unwrap()
    }

    fn beta_abi() -> JsonAbi {
        serde_json::from_str(
            r#"[
                {
                    "type": "function",
                    "name": "poke",
                    "stateMutability": "nonpayable",
                    "inputs": [],
                    "outputs": []
                },
                {
                    "type": "error",
                    "name": "BetaFault",
                    "inputs": [{ "name": "who", "type": "address" }]
                }
            ]"#,
        )
        .unwrap()
    }

    fn revert_error(revert_data: &[u8]) -> TransportError {
        RpcError::ErrorResp(ErrorPayload {
            code: 3,
            message: "execution reverted".into(),
            data: Some(
                serde_json::value::to_raw_value(&format!("0x{}", hex::encode(revert_data)))
                    .unwrap(),
            ),
        })
    }

    fn abi_calls() -> Vec<CallRequest> {
        vec![
            CallRequest::abi(
                address!("00000000000000000000000000000000000000aa"),
                alpha_abi(),
                "poke",
                vec![],
            ),
            CallRequest::abi(
                address!("00000000000000000000000000000000000000bb"),
                beta_abi(),
                "poke",
                vec![],
            ),
        ]
    }

    #[test]
    fn sentinel_revert_is_mode_not_recognized() {
        let revert_data = IERC7821::FnSelectorNotRecognized {}.abi_encode();
        let resolved = resolve_execute_error(revert_error(&revert_data), &abi_calls());
        assert!(matches!(
            resolved,
            ExecutorError::ModeNotRecognized { revert_data: data } if data.as_ref() == revert_data
        ));
    }

    #[test]
    fn revert_is_attributed_to_the_matching_call() {
        // Matches the second call's interface, not the first's.
        let who = address!("0000000000000000000000000000000000001234");
        let revert_data = BetaFault { who }.abi_encode();

        let ExecutorError::CallRevert(revert) =
            resolve_execute_error(revert_error(&revert_data), &abi_calls())
        else {
            panic!("expected a matched sub-call error");
        };

        assert_eq!(revert.index, 1);
        assert_eq!(revert.target, address!("00000000000000000000000000000000000000bb"));
        assert_eq!(revert.function, "poke");
        assert!(revert.decoded.starts_with("BetaFault("));
        assert_eq!(revert.revert_data, Bytes::from(revert_data));
    }

    #[test]
    fn first_matching_call_wins() {
        // Both calls declare AlphaFault; the earlier one is blamed.
        let calls = vec![
            CallRequest::abi(
                address!("00000000000000000000000000000000000000aa"),
                alpha_abi(),
                "poke",
                vec![],
            ),
            CallRequest::abi(
                address!("00000000000000000000000000000000000000bb"),
                alpha_abi(),
                "poke",
                vec![],
            ),
        ];
        let revert_data = AlphaFault { code: U256::from(42) }.abi_encode();

        let ExecutorError::CallRevert(revert) =
            resolve_execute_error(revert_error(&revert_data), &calls)
        else {
            panic!("expected a matched sub-call error");
        };
        assert_eq!(revert.index, 0);
        assert_eq!(revert.target, address!("00000000000000000000000000000000000000aa"));
    }

    #[test]
    fn raw_calls_are_skipped() {
        let calls = vec![
            CallRequest::raw(
                address!("00000000000000000000000000000000000000aa"),
                Bytes::from(vec![0xde, 0xad]),
            ),
            CallRequest::abi(
                address!("00000000000000000000000000000000000000bb"),
                beta_abi(),
                "poke",
                vec![],
            ),
        ];
        let revert_data = BetaFault { who: Address::ZERO }.abi_encode();

        let ExecutorError::CallRevert(revert) =
            resolve_execute_error(revert_error(&revert_data), &calls)
        else {
            panic!("expected a matched sub-call error");
        };
        assert_eq!(revert.index, 1);
    }

    #[test]
    fn unmatched_revert_passes_through_unchanged() {
        // Revert data matching no declared interface.
        let err = revert_error(&[0x01, 0x02, 0x03, 0x04, 0x05]);
        let expected = err.to_string();

        let resolved = resolve_execute_error(err, &abi_calls());
        let ExecutorError::Rpc(inner) = resolved else {
            panic!("expected the original error to pass through");
        };
        assert_eq!(inner.to_string(), expected);
    }

    #[test]
    fn failure_without_revert_data_passes_through() {
        let err = TransportErrorKind::custom_str("connection reset");
        let expected = err.to_string();

        let resolved = resolve_execute_error(err, &abi_calls());
        let ExecutorError::Rpc(inner) = resolved else {
            panic!("expected the original error to pass through");
        };
        assert_eq!(inner.to_string(), expected);
    }
}
