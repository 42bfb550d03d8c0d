//! # ERC-7821 client
//!
//! Client-side helpers for invoking batched calls on contracts implementing the
//! ERC-7821 minimal batch executor interface.
//!
//! The entry point is [`executor::Executor`], which encodes a list of
//! [`types::CallRequest`]s into ERC-7821 execution data, probes the target for
//! support of the chosen execution mode (memoized in a [`cache::SupportCache`]),
//! submits the batch as a single transaction, and on failure attributes the
//! revert back to the specific sub-call responsible.

pub mod cache;
pub mod constants;
pub mod encode;
pub mod error;
pub mod executor;
pub mod types;
