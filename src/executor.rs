//! Batch execution dispatcher.

use crate::{
    cache::{ClientId, SupportCache, SupportKey},
    encode::encode_execution_data,
    error::{resolve_execute_error, ExecutorError},
    types::{CallRequest, ExecutionMode, IERC7821},
};
use alloy::{
    eips::eip7702::SignedAuthorization,
    primitives::{Address, Bytes, TxHash},
    providers::Provider,
    rpc::types::TransactionRequest,
    sol_types::SolCall,
    transports::TransportErrorKind,
};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tracing::{debug, instrument};

static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(0);

/// Parameters for a batched `execute` submission.
#[derive(Debug, Clone, Default)]
pub struct ExecuteParams {
    /// The address of the executing contract.
    ///
    /// Superseded by the authorized delegation address when
    /// [`ExecuteParams::authorization`] is set.
    pub to: Address,
    /// The sub-calls of the batch.
    pub calls: Vec<CallRequest>,
    /// Optional auxiliary data forwarded to the contract, uninterpreted by
    /// this client. Empty bytes are treated the same as none.
    pub op_data: Option<Bytes>,
    /// Optional EIP-7702 authorization attached to the transaction. When set,
    /// the batch is executed on the authorized delegation address.
    pub authorization: Option<SignedAuthorization>,
    /// Base transaction request. Gas, fee fields, nonce, sender and chain
    /// overrides pass through to the submission unchanged; `to` and `input`
    /// are overwritten with the encoded `execute` call.
    pub tx: TransactionRequest,
}

impl ExecuteParams {
    /// Creates parameters for executing `calls` on `to`.
    pub fn new(to: Address, calls: Vec<CallRequest>) -> Self {
        Self { to, calls, ..Default::default() }
    }

    /// Attaches auxiliary `opData` to the batch.
    pub fn with_op_data(mut self, op_data: Bytes) -> Self {
        self.op_data = Some(op_data);
        self
    }

    /// Attaches an EIP-7702 authorization to the transaction.
    pub fn with_authorization(mut self, authorization: SignedAuthorization) -> Self {
        self.authorization = Some(authorization);
        self
    }

    /// Sets the base transaction request for the submission.
    pub fn with_tx(mut self, tx: TransactionRequest) -> Self {
        self.tx = tx;
        self
    }

    /// The address the batch will execute on: the authorized delegation
    /// address if an authorization is attached, else [`ExecuteParams::to`].
    pub fn effective_target(&self) -> Address {
        self.authorization.as_ref().map(|auth| auth.address).unwrap_or(self.to)
    }
}

/// A client for ERC-7821 batch executor contracts.
///
/// Wraps a provider together with a capability cache; each executor gets a
/// process-unique [`ClientId`] so executors sharing a cache never share probe
/// results.
#[derive(Debug)]
pub struct Executor<P: Provider> {
    provider: P,
    cache: Arc<SupportCache>,
    client_id: ClientId,
}

impl<P: Provider> Executor<P> {
    /// Creates a new executor with its own capability cache.
    pub fn new(provider: P) -> Self {
        Self::with_cache(provider, Arc::new(SupportCache::new()))
    }

    /// Creates a new executor on a shared capability cache.
    pub fn with_cache(provider: P, cache: Arc<SupportCache>) -> Self {
        Self { provider, cache, client_id: NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed) }
    }

    /// The underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// The capability cache.
    pub fn cache(&self) -> &Arc<SupportCache> {
        &self.cache
    }

    /// Returns whether `address` supports the given execution mode.
    ///
    /// The result is memoized per (client, address, mode); repeated calls for
    /// the same triple do not query the contract again. The probe is a
    /// read-only `eth_call`; remote failures propagate unmasked.
    pub async fn supports_execution_mode(
        &self,
        address: Address,
        mode: ExecutionMode,
    ) -> Result<bool, ExecutorError> {
        let key = SupportKey::new(self.client_id, address, mode.as_b256());
        self.cache
            .get_or_probe(key, || async {
                IERC7821::new(address, &self.provider)
                    .supportsExecutionMode(mode.as_b256())
                    .call()
                    .await
                    .map_err(TransportErrorKind::custom)
                    .map_err(ExecutorError::from)
            })
            .await
    }

    /// Executes a batch of calls on an ERC-7821 contract.
    ///
    /// Encodes the batch, selects the execution mode from the presence of
    /// `opData`, and confirms mode support before spending gas: if the
    /// pre-flight probe reports the mode as unsupported, no transaction is
    /// submitted. On submission failure the revert is attributed to the
    /// responsible sub-call where possible; see
    /// [`resolve_execute_error`](crate::error::resolve_execute_error).
    #[instrument(skip_all, fields(target = %params.effective_target(), calls = params.calls.len()))]
    pub async fn execute(&self, params: ExecuteParams) -> Result<TxHash, ExecutorError> {
        let ExecuteParams { to, calls, op_data, authorization, tx } = params;
        let target = authorization.as_ref().map(|auth| auth.address).unwrap_or(to);

        let op_data = op_data.filter(|data| !data.is_empty());
        let execution_data = encode_execution_data(&calls, op_data.as_ref())?;
        let mode = ExecutionMode::from_op_data(op_data.as_ref());

        if !self.supports_execution_mode(target, mode).await? {
            return Err(ExecutorError::UnsupportedMode { address: target, mode });
        }

        let input: Bytes = IERC7821::executeCall { mode: mode.as_b256(), executionData: execution_data }
            .abi_encode()
            .into();
        let mut tx = tx.to(target).input(input.into());
        if let Some(authorization) = authorization {
            tx.authorization_list.get_or_insert_with(Vec::new).push(authorization);
        }

        match self.provider.send_transaction(tx).await {
            Ok(pending) => {
                let tx_hash = *pending.tx_hash();
                debug!(%tx_hash, %mode, "batch execution submitted");
                Ok(tx_hash)
            }
            Err(err) => Err(resolve_execute_error(err, &calls)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::{
        eips::eip7702::Authorization,
        primitives::{address, U256},
        providers::{mock::Asserter, ProviderBuilder},
        sol_types::SolValue,
    };

    fn authorization(address: Address) -> SignedAuthorization {
        Authorization { chain_id: U256::from(1), address, nonce: 0 }
            .into_signed(alloy::primitives::Signature::new(U256::from(1), U256::from(1), false))
    }

    #[test]
    fn authorization_address_supersedes_target() {
        let to = address!("00000000000000000000000000000000000000aa");
        let delegate = address!("00000000000000000000000000000000000000bb");

        let params = ExecuteParams::new(to, vec![]);
        assert_eq!(params.effective_target(), to);

        let params = params.with_authorization(authorization(delegate));
        assert_eq!(params.effective_target(), delegate);
    }

    #[tokio::test]
    async fn support_probe_is_memoized() {
        let asserter = Asserter::new();
        // A single queued response serves every probe for the same triple.
        asserter.push_success(&Bytes::from(true.abi_encode()));
        let provider = ProviderBuilder::new().connect_mocked_client(asserter);
        let executor = Executor::new(provider);

        let target = address!("000000000000000000000000000000000000cafe");
        for _ in 0..3 {
            assert!(executor
                .supports_execution_mode(target, ExecutionMode::Default)
                .await
                .unwrap());
        }
        assert_eq!(executor.cache().stats().entries, 1);
    }

    #[tokio::test]
    async fn unsupported_mode_submits_nothing() {
        let asserter = Asserter::new();
        // Only the probe response is queued; any submission attempt would hit
        // an empty transport and fail with a different error.
        asserter.push_success(&Bytes::from(false.abi_encode()));
        let provider = ProviderBuilder::new().connect_mocked_client(asserter);
        let executor = Executor::new(provider);

        let target = address!("000000000000000000000000000000000000cafe");
        let err = executor
            .execute(ExecuteParams::new(
                target,
                vec![CallRequest::raw(target, Bytes::from(vec![0xde, 0xad]))],
            ))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ExecutorError::UnsupportedMode { address, mode: ExecutionMode::Default }
                if address == target
        ));
    }
}
