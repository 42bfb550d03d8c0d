//! Call types used for ERC-7821 batch execution.

use crate::error::EncodeError;
use alloy::{
    dyn_abi::{DynSolValue, JsonAbiExt},
    json_abi::JsonAbi,
    primitives::{Address, Bytes, U256},
    sol,
};

sol! {
    /// ERC-7821 call struct (ERC-7579 batch execution encoding).
    #[derive(Debug, PartialEq, Eq)]
    struct Call {
        /// The call target.
        address target;
        /// Amount of native value to send to the target.
        uint256 value;
        /// The calldata bytes.
        bytes data;
    }
}

/// A single requested sub-call of a batch.
///
/// The calldata for the call is derived from [`CallData`]; the value defaults
/// to zero.
#[derive(Debug, Clone, Default)]
pub struct CallRequest {
    /// The call target.
    pub to: Address,
    /// Amount of native value to send to the target.
    pub value: U256,
    /// How the calldata is derived.
    pub data: CallData,
}

/// How the calldata for a [`CallRequest`] is derived.
///
/// The two sources are mutually exclusive: a call is either described by an
/// ABI (and can later be matched against revert data), or carries raw bytes.
#[derive(Debug, Clone)]
pub enum CallData {
    /// Encode a function call described by a JSON ABI.
    Abi {
        /// The interface of the target contract.
        abi: JsonAbi,
        /// The name of the function to call.
        function: String,
        /// The function arguments.
        args: Vec<DynSolValue>,
    },
    /// Use the given bytes verbatim. Empty bytes for a plain value transfer.
    Raw(Bytes),
}

impl Default for CallData {
    fn default() -> Self {
        Self::Raw(Bytes::new())
    }
}

impl CallRequest {
    /// Creates a call carrying raw calldata bytes.
    pub fn raw(to: Address, data: Bytes) -> Self {
        Self { to, value: U256::ZERO, data: CallData::Raw(data) }
    }

    /// Creates a call described by a JSON ABI, function name and arguments.
    pub fn abi(
        to: Address,
        abi: JsonAbi,
        function: impl Into<String>,
        args: Vec<DynSolValue>,
    ) -> Self {
        Self { to, value: U256::ZERO, data: CallData::Abi { abi, function: function.into(), args } }
    }

    /// Sets the native value sent with the call.
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Derives the ERC-7821 [`Call`] struct for this request.
    pub fn to_call(&self) -> Result<Call, EncodeError> {
        Ok(Call { target: self.to, value: self.value, data: self.data.encoded()? })
    }
}

impl CallData {
    /// Derives the final calldata bytes.
    ///
    /// For [`CallData::Abi`], the function is resolved in the interface
    /// (preferring an overload whose arity matches the supplied arguments) and
    /// the call is encoded as selector plus ABI-encoded arguments.
    pub fn encoded(&self) -> Result<Bytes, EncodeError> {
        match self {
            Self::Raw(data) => Ok(data.clone()),
            Self::Abi { abi, function, args } => {
                let resolved = abi
                    .function(function)
                    .and_then(|overloads| {
                        overloads
                            .iter()
                            .find(|f| f.inputs.len() == args.len())
                            .or_else(|| overloads.first())
                    })
                    .ok_or_else(|| EncodeError::FunctionNotFound { name: function.clone() })?;
                Ok(resolved.abi_encode_input(args)?.into())
            }
        }
    }
}
