//! Account integrity query and evaluation.
//!
//! All reads for one account are bundled into a single Multicall3
//! `aggregate3` request so the evaluation works over one consistent state
//! snapshot; the block timestamp used for allowance accrual comes from that
//! same snapshot, never from the caller's clock. Evaluation never throws: a
//! malformed on-chain response normalizes to `UnexpectedError` so status
//! polling loops keep running.

use alloy_primitives::{address, Address, B256, U256};
use alloy_sol_types::SolCall;
use serde::Serialize;

use crate::abi::{IDelay, IMulticall3, IRolesModifier, ISafe};
use crate::deployments::{AccountTopology, ModuleTopology};
use crate::errors::ProviderError;
use crate::providers::ReadProvider;
use crate::registry::ContractRegistry;

/// Sentinel head of the Safe owner/module linked lists.
const SENTINEL: Address = address!("0000000000000000000000000000000000000001");

/// Page size for the single modules-paginated read.
const MODULES_PAGE_SIZE: u64 = 10;

/// Number of calls in the aggregate query; evaluation rejects anything else.
const QUERY_CALL_COUNT: usize = 10;

/// Parameters of the integrity check that are account-policy rather than
/// registry facts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntegrityConfig {
    /// Allowance key queried on the Roles modifier.
    pub allowance_key: B256,
    /// Minimum acceptable delay cooldown, in seconds.
    pub min_cooldown: u64,
}

/// Outcome of a point-in-time structural check. Recomputed fresh on every
/// query, never cached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum AccountIntegrityStatus {
    Ok,
    SafeNotDeployed,
    SafeMisconfigured,
    RolesNotDeployed,
    RolesMisconfigured,
    DelayNotDeployed,
    DelayMisconfigured,
    DelayQueueNotEmpty,
    UnexpectedError,
}

/// On-chain allowance record as stored by the Roles modifier.
///
/// `period == 0` (or `refill == 0` for refill scheduling) signals "no
/// periodic refill". Never mutated by this crate; accrual is derived.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AllowanceState {
    pub balance: U256,
    pub max_refill: U256,
    pub refill: U256,
    pub period: u64,
    pub timestamp: u64,
}

/// Allowance figures derived from one state snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AllowanceInfo {
    pub state: AllowanceState,
    /// Block timestamp of the snapshot the state was read in.
    pub block_timestamp: u64,
    /// Balance after applying periodic accrual up to `block_timestamp`.
    pub accrued: U256,
    /// Unix time of the next refill, if the allowance refills at all.
    pub next_refill_at: Option<u64>,
}

/// Result of evaluating one aggregate read.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AccountIntegrity {
    pub status: AccountIntegrityStatus,
    /// Best-effort: present whenever the allowance and timestamp reads
    /// succeeded, regardless of the status outcome.
    pub allowance: Option<AllowanceInfo>,
}

/// Balance after periodic accrual: untouched before the first elapsed
/// period, replenished linearly per full period afterwards, capped at
/// `max_refill`.
pub fn accrued_balance(state: &AllowanceState, block_timestamp: u64) -> U256 {
    if state.period == 0 || block_timestamp < state.timestamp.saturating_add(state.period) {
        return state.balance;
    }
    let elapsed = (block_timestamp - state.timestamp) / state.period;
    let replenished = state
        .balance
        .saturating_add(state.refill.saturating_mul(U256::from(elapsed)));
    replenished.min(state.max_refill)
}

/// Unix time of the next refill boundary, or `None` when the allowance does
/// not refill.
pub fn next_refill_at(state: &AllowanceState, block_timestamp: u64) -> Option<u64> {
    if state.period == 0 || state.refill == U256::ZERO {
        return None;
    }
    let elapsed = if block_timestamp < state.timestamp {
        0
    } else {
        (block_timestamp - state.timestamp) / state.period
    };
    Some(
        state
            .timestamp
            .saturating_add(elapsed.saturating_add(1).saturating_mul(state.period)),
    )
}

/// Build the single aggregate read for one account. Targets the registry's
/// Multicall3 deployment; every inner call is fail-tolerant so partial
/// deployment maps to statuses instead of a reverted query.
pub fn build_integrity_query(
    registry: &ContractRegistry,
    account: Address,
    config: &IntegrityConfig,
) -> Vec<u8> {
    let topology = AccountTopology::new(registry, account).derive();

    let calls = vec![
        call3(account, ISafe::getOwnersCall {}.abi_encode()),
        call3(account, ISafe::getThresholdCall {}.abi_encode()),
        call3(
            account,
            ISafe::getModulesPaginatedCall {
                start: SENTINEL,
                pageSize: U256::from(MODULES_PAGE_SIZE),
            }
            .abi_encode(),
        ),
        call3(topology.roles, IRolesModifier::ownerCall {}.abi_encode()),
        call3(
            topology.roles,
            IRolesModifier::allowancesCall {
                key: config.allowance_key,
            }
            .abi_encode(),
        ),
        call3(topology.delay, IDelay::ownerCall {}.abi_encode()),
        call3(topology.delay, IDelay::txCooldownCall {}.abi_encode()),
        call3(topology.delay, IDelay::txNonceCall {}.abi_encode()),
        call3(topology.delay, IDelay::queueNonceCall {}.abi_encode()),
        call3(
            registry.multicall,
            IMulticall3::getCurrentBlockTimestampCall {}.abi_encode(),
        ),
    ];
    debug_assert_eq!(calls.len(), QUERY_CALL_COUNT);

    IMulticall3::aggregate3Call { calls }.abi_encode()
}

fn call3(target: Address, call_data: Vec<u8>) -> IMulticall3::Call3 {
    IMulticall3::Call3 {
        target,
        allowFailure: true,
        callData: call_data.into(),
    }
}

/// Interpret the raw `aggregate3` return data for one account.
pub fn evaluate_integrity(
    registry: &ContractRegistry,
    account: Address,
    config: &IntegrityConfig,
    raw_result: &[u8],
) -> AccountIntegrity {
    evaluate_inner(registry, account, config, raw_result).unwrap_or(AccountIntegrity {
        status: AccountIntegrityStatus::UnexpectedError,
        allowance: None,
    })
}

/// Build the query, read it through the provider and evaluate the result.
pub fn check_integrity<P: ReadProvider>(
    registry: &ContractRegistry,
    account: Address,
    config: &IntegrityConfig,
    provider: &P,
) -> Result<AccountIntegrity, ProviderError> {
    let query = build_integrity_query(registry, account, config);
    let raw = provider.eth_call(registry.multicall, &query)?;
    Ok(evaluate_integrity(registry, account, config, &raw))
}

/// Marker for a decode failure anywhere in evaluation; normalized to
/// `UnexpectedError` at the boundary.
struct DecodeFailure;

type Decoded<T> = Result<T, DecodeFailure>;

fn evaluate_inner(
    registry: &ContractRegistry,
    account: Address,
    config: &IntegrityConfig,
    raw_result: &[u8],
) -> Decoded<AccountIntegrity> {
    let results = IMulticall3::aggregate3Call::abi_decode_returns(raw_result, true)
        .map_err(|_| DecodeFailure)?
        .returnData;
    if results.len() != QUERY_CALL_COUNT {
        return Ok(AccountIntegrity {
            status: AccountIntegrityStatus::UnexpectedError,
            allowance: None,
        });
    }

    let topology = AccountTopology::new(registry, account).derive();
    let allowance = decode_allowance(&results[4], &results[9])?;
    let status = evaluate_status(registry, account, config, &topology, &results)?;
    Ok(AccountIntegrity { status, allowance })
}

/// Fixed-precedence status machine. The order is load-bearing: a later rule
/// reads data that is garbage when an earlier rule already failed.
fn evaluate_status(
    registry: &ContractRegistry,
    account: Address,
    config: &IntegrityConfig,
    topology: &ModuleTopology,
    results: &[IMulticall3::Result],
) -> Decoded<AccountIntegrityStatus> {
    // 1. Safe reads failed entirely.
    if !results[0].success || !results[1].success || !results[2].success {
        return Ok(AccountIntegrityStatus::SafeNotDeployed);
    }

    // 2. Owner set, threshold and enabled modules must match the topology.
    let owners = decode::<ISafe::getOwnersCall>(&results[0])?.owners;
    let threshold = decode::<ISafe::getThresholdCall>(&results[1])?.threshold;
    let modules = decode::<ISafe::getModulesPaginatedCall>(&results[2])?.array;

    let owners_ok = owners == [registry.placeholder_owner];
    let modules_ok = modules.len() == 2
        && modules.contains(&topology.delay)
        && modules.contains(&topology.roles);
    if !owners_ok || threshold != U256::from(1u64) || !modules_ok {
        return Ok(AccountIntegrityStatus::SafeMisconfigured);
    }

    // 3. Roles modifier reads.
    if !results[3].success || !results[4].success {
        return Ok(AccountIntegrityStatus::RolesNotDeployed);
    }
    let roles_owner = decode::<IRolesModifier::ownerCall>(&results[3])?.ownerAddress;
    if roles_owner != topology.bouncer {
        return Ok(AccountIntegrityStatus::RolesMisconfigured);
    }

    // 4. Delay modifier reads.
    if !results[5].success
        || !results[6].success
        || !results[7].success
        || !results[8].success
    {
        return Ok(AccountIntegrityStatus::DelayNotDeployed);
    }
    let delay_owner = decode::<IDelay::ownerCall>(&results[5])?.ownerAddress;
    let cooldown = decode::<IDelay::txCooldownCall>(&results[6])?.cooldown;
    let tx_nonce = decode::<IDelay::txNonceCall>(&results[7])?.nonce;
    let queue_nonce = decode::<IDelay::queueNonceCall>(&results[8])?.nonce;

    if delay_owner != account || cooldown < U256::from(config.min_cooldown) {
        return Ok(AccountIntegrityStatus::DelayMisconfigured);
    }
    if tx_nonce != queue_nonce {
        return Ok(AccountIntegrityStatus::DelayQueueNotEmpty);
    }

    Ok(AccountIntegrityStatus::Ok)
}

fn decode<C: SolCall>(result: &IMulticall3::Result) -> Decoded<C::Return> {
    C::abi_decode_returns(&result.returnData, true).map_err(|_| DecodeFailure)
}

/// Best-effort allowance decode from the aggregate snapshot. Absent reads
/// yield `None`; a successful-but-malformed read is a decode failure.
fn decode_allowance(
    allowance_result: &IMulticall3::Result,
    timestamp_result: &IMulticall3::Result,
) -> Decoded<Option<AllowanceInfo>> {
    if !allowance_result.success || !timestamp_result.success {
        return Ok(None);
    }
    let raw = decode::<IRolesModifier::allowancesCall>(allowance_result)?;
    let ts = decode::<IMulticall3::getCurrentBlockTimestampCall>(timestamp_result)?.timestamp;
    let block_timestamp = u64::try_from(ts).map_err(|_| DecodeFailure)?;

    let state = AllowanceState {
        balance: U256::from(raw.balance),
        max_refill: U256::from(raw.maxRefill),
        refill: U256::from(raw.refill),
        period: raw.period,
        timestamp: raw.timestamp,
    };
    let accrued = accrued_balance(&state, block_timestamp);
    let next = next_refill_at(&state, block_timestamp);
    Ok(Some(AllowanceInfo {
        state,
        block_timestamp,
        accrued,
        next_refill_at: next,
    }))
}
