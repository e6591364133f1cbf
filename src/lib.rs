//! Client-side toolkit for module-extended smart accounts.
//!
//! Without any prior on-chain interaction, a caller can compute where an
//! account and its modules *will* live, build relay-ready calldata to deploy
//! and configure them, route transactions through the timelocked
//! propose/dispatch protocol, and later audit the live topology in a single
//! aggregated read.
//!
//! The crate is pure and stateless: the only two points touching the outside
//! world are the injected [`providers::TypedDataSigner`] and
//! [`providers::ReadProvider`] capabilities. Every function is reentrant and
//! safe to call concurrently.

pub mod abi;
pub mod batch;
pub mod delay;
pub mod deployments;
pub mod errors;
pub mod integrity;
pub mod providers;
pub mod registry;
pub mod setup;
pub mod typed_data;
pub mod types;

pub use batch::{encode_multi_send, encode_multi_send_call_only};
pub use delay::{populate_delay_dispatch, populate_delay_enqueue, SignerKind};
pub use deployments::{
    predict_account_address, predict_deployment, AccountKind, AccountTopology, Deployment,
    ModuleTopology,
};
pub use errors::{Error, InputError, ProviderError};
pub use integrity::{
    accrued_balance, build_integrity_query, check_integrity, evaluate_integrity,
    next_refill_at, AccountIntegrity, AccountIntegrityStatus, AllowanceInfo, AllowanceState,
    IntegrityConfig,
};
pub use providers::{ReadProvider, TypedDataSigner};
pub use registry::ContractRegistry;
pub use typed_data::{build_account_tx, build_modifier_tx, parse_salt, TypedMessage};
pub use types::{parse_address, OperationType, TransactionRequest};
