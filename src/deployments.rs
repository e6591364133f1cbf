//! Deterministic deployment-address derivation.
//!
//! Nothing here is stored or fetched: every module address is recomputed on
//! demand from the account address and the fixed registry, and must agree
//! with what the factories actually deploy. Derivation is pure arithmetic
//! over caller-supplied bytes; garbage in produces a garbage-but-deterministic
//! address out.

use alloy_primitives::{b256, bytes, keccak256, Address, B256, U256};
use alloy_sol_types::{SolCall, SolValue};

use crate::abi::{IBouncer, IDelay, IRolesModifier, ISafe};
use crate::registry::ContractRegistry;
use crate::types::TransactionRequest;

/// Salt nonce committed when the canonical account proxy is deployed.
///
/// Must match the deploy-time value byte-for-byte: a drifted nonce predicts
/// a different, unrelated address with no error raised by the chain.
pub const ACCOUNT_CREATION_NONCE: B256 =
    b256!("5b0e2f1a9c3d4786a02f11e6bd94cf1e6a0b7d5c8e9413a2d57c6880fa3b19e4");

/// Salt nonce for the multi-owner spender account kind.
pub const SPENDER_ACCOUNT_CREATION_NONCE: B256 =
    b256!("8c44a7d1e0b92f3561ee9a4cd27f80b3941c6ad05e78b12f30a9d46c157ef2a8");

/// Salt nonce for the per-account owner channel.
pub const OWNER_CHANNEL_CREATION_NONCE: B256 =
    b256!("17f3b8a64d20c5e19ab470358fcd9e267104bd83fa52c096e481d7a3b6e50c91");

/// Salt nonce for the per-account spender channel.
pub const SPENDER_CHANNEL_CREATION_NONCE: B256 =
    b256!("2d98c0f57a61e4b3805acf12697db045318ce6fd94270b8a5c13ef6084ad97b6");

/// Salt nonce used for Zodiac module deployment (conventionally zero, so a
/// module address is fully determined by factory, mastercopy and setup
/// calldata).
pub const MODULE_SALT_NONCE: B256 = B256::ZERO;

/// Account kinds with distinct creation-nonce constants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccountKind {
    /// Canonical single-owner account.
    Primary,
    /// Multi-owner spender account.
    Spender,
}

impl AccountKind {
    pub fn creation_nonce(self) -> B256 {
        match self {
            AccountKind::Primary => ACCOUNT_CREATION_NONCE,
            AccountKind::Spender => SPENDER_ACCOUNT_CREATION_NONCE,
        }
    }
}

/// One deterministic deployment, tagged by the proxy pattern it follows.
#[derive(Clone, Debug)]
pub enum Deployment<'a> {
    /// Account proxy: `create2(factory, salt, hash(creationCode ++ abi.encode(mastercopy)))`
    /// with `salt = hash(hash(initializer) ++ creationNonce)`.
    AccountProxy {
        factory: Address,
        mastercopy: Address,
        creation_code: &'a [u8],
        initializer: &'a [u8],
        creation_nonce: B256,
    },
    /// Zodiac minimal proxy: the mastercopy is spliced into a fixed bytecode
    /// skeleton and `salt = hash(hash(setupCalldata) ++ saltNonce)`.
    ZodiacModule {
        factory: Address,
        mastercopy: Address,
        setup_calldata: &'a [u8],
        salt_nonce: B256,
    },
    /// Shared singleton: the minimal proxy skeleton deployed once per chain
    /// under the zero salt.
    MinimalProxySingleton {
        factory: Address,
        mastercopy: Address,
    },
}

/// Predict the address a [`Deployment`] will land on. Pure and
/// side-effect-free; callers validate deployed state separately.
pub fn predict_deployment(deployment: &Deployment<'_>) -> Address {
    match deployment {
        Deployment::AccountProxy {
            factory,
            mastercopy,
            creation_code,
            initializer,
            creation_nonce,
        } => {
            let mut init_code = creation_code.to_vec();
            init_code.extend_from_slice(mastercopy.into_word().as_slice());
            let salt = derivation_salt(initializer, *creation_nonce);
            factory.create2(salt, keccak256(&init_code))
        }
        Deployment::ZodiacModule {
            factory,
            mastercopy,
            setup_calldata,
            salt_nonce,
        } => {
            let salt = derivation_salt(setup_calldata, *salt_nonce);
            factory.create2(salt, keccak256(minimal_proxy_init_code(*mastercopy)))
        }
        Deployment::MinimalProxySingleton { factory, mastercopy } => {
            factory.create2(B256::ZERO, keccak256(minimal_proxy_init_code(*mastercopy)))
        }
    }
}

/// `salt = keccak256(keccak256(initializer) ++ nonce)`, shared by both
/// proxy patterns.
fn derivation_salt(initializer: &[u8], nonce: B256) -> B256 {
    let mut buf = Vec::with_capacity(64);
    buf.extend_from_slice(keccak256(initializer).as_slice());
    buf.extend_from_slice(nonce.as_slice());
    keccak256(buf)
}

/// Minimal proxy creation bytecode with the mastercopy spliced at byte 19.
fn minimal_proxy_init_code(mastercopy: Address) -> Vec<u8> {
    let prefix = bytes!("602d8060093d393df3363d3d373d3d3d363d73");
    let suffix = bytes!("5af43d82803e903d91602b57fd5bf3");
    let mut code = Vec::with_capacity(prefix.len() + 20 + suffix.len());
    code.extend_from_slice(&prefix);
    code.extend_from_slice(mastercopy.as_slice());
    code.extend_from_slice(&suffix);
    code
}

/// Safe `setup(...)` initializer used for account proxies and channels.
pub fn account_setup_initializer(
    registry: &ContractRegistry,
    owners: &[Address],
    threshold: u64,
) -> Vec<u8> {
    ISafe::setupCall {
        owners: owners.to_vec(),
        threshold: U256::from(threshold),
        to: Address::ZERO,
        data: Vec::new().into(),
        fallbackHandler: registry.fallback_handler,
        paymentToken: Address::ZERO,
        payment: U256::ZERO,
        paymentReceiver: Address::ZERO,
    }
    .abi_encode()
}

/// Predict the account proxy address for an owner set.
pub fn predict_account_address(
    registry: &ContractRegistry,
    owners: &[Address],
    threshold: u64,
    kind: AccountKind,
) -> Address {
    let initializer = account_setup_initializer(registry, owners, threshold);
    predict_deployment(&Deployment::AccountProxy {
        factory: registry.safe_proxy_factory,
        mastercopy: registry.safe_mastercopy,
        creation_code: &registry.safe_proxy_creation_code,
        initializer: &initializer,
        creation_nonce: kind.creation_nonce(),
    })
}

/// Delay modifier setup calldata. Timing parameters are zero at deploy time
/// so the derived address does not depend on the configured cooldown; the
/// cooldown is set in the account configuration batch.
pub fn delay_setup_calldata(account: Address) -> Vec<u8> {
    let init_params =
        (account, account, account, U256::ZERO, U256::ZERO).abi_encode_params();
    IDelay::setUpCall {
        initParams: init_params.into(),
    }
    .abi_encode()
}

/// Roles modifier setup calldata. The bouncer owns the modifier so that
/// ownership can only move through the guard.
pub fn roles_setup_calldata(account: Address, bouncer: Address) -> Vec<u8> {
    let init_params = (bouncer, account, account).abi_encode_params();
    IRolesModifier::setUpCall {
        initParams: init_params.into(),
    }
    .abi_encode()
}

/// Bouncer setup calldata: the guard is parameterized by the account alone.
pub fn bouncer_setup_calldata(account: Address) -> Vec<u8> {
    let init_params = account.abi_encode();
    IBouncer::setUpCall {
        initParams: init_params.into(),
    }
    .abi_encode()
}

/// The full set of derived addresses for one account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleTopology {
    pub account: Address,
    pub delay: Address,
    pub roles: Address,
    pub bouncer: Address,
    pub forwarder: Address,
    pub owner_channel: Address,
    pub spender_channel: Address,
}

/// Derives the module topology for one account against a fixed registry.
#[derive(Clone, Debug)]
pub struct AccountTopology<'a> {
    registry: &'a ContractRegistry,
    account: Address,
}

impl<'a> AccountTopology<'a> {
    pub fn new(registry: &'a ContractRegistry, account: Address) -> Self {
        AccountTopology { registry, account }
    }

    pub fn account(&self) -> Address {
        self.account
    }

    pub fn delay(&self) -> Address {
        let setup = delay_setup_calldata(self.account);
        predict_deployment(&Deployment::ZodiacModule {
            factory: self.registry.module_proxy_factory,
            mastercopy: self.registry.delay_mastercopy,
            setup_calldata: &setup,
            salt_nonce: MODULE_SALT_NONCE,
        })
    }

    pub fn roles(&self) -> Address {
        let setup = roles_setup_calldata(self.account, self.bouncer());
        predict_deployment(&Deployment::ZodiacModule {
            factory: self.registry.module_proxy_factory,
            mastercopy: self.registry.roles_mastercopy,
            setup_calldata: &setup,
            salt_nonce: MODULE_SALT_NONCE,
        })
    }

    pub fn bouncer(&self) -> Address {
        let setup = bouncer_setup_calldata(self.account);
        predict_deployment(&Deployment::ZodiacModule {
            factory: self.registry.module_proxy_factory,
            mastercopy: self.registry.bouncer_mastercopy,
            setup_calldata: &setup,
            salt_nonce: MODULE_SALT_NONCE,
        })
    }

    pub fn forwarder(&self) -> Address {
        predict_deployment(&Deployment::MinimalProxySingleton {
            factory: self.registry.singleton_factory,
            mastercopy: self.registry.forwarder_mastercopy,
        })
    }

    pub fn owner_channel(&self) -> Address {
        self.channel(OWNER_CHANNEL_CREATION_NONCE)
    }

    pub fn spender_channel(&self) -> Address {
        self.channel(SPENDER_CHANNEL_CREATION_NONCE)
    }

    fn channel(&self, creation_nonce: B256) -> Address {
        let initializer = account_setup_initializer(self.registry, &[self.account], 1);
        predict_deployment(&Deployment::AccountProxy {
            factory: self.registry.safe_proxy_factory,
            mastercopy: self.registry.safe_mastercopy,
            creation_code: &self.registry.safe_proxy_creation_code,
            initializer: &initializer,
            creation_nonce,
        })
    }

    pub fn derive(&self) -> ModuleTopology {
        ModuleTopology {
            account: self.account,
            delay: self.delay(),
            roles: self.roles(),
            bouncer: self.bouncer(),
            forwarder: self.forwarder(),
            owner_channel: self.owner_channel(),
            spender_channel: self.spender_channel(),
        }
    }
}

/// Relay-ready module deployment call against the module proxy factory.
pub fn populate_module_deployment(
    registry: &ContractRegistry,
    mastercopy: Address,
    setup_calldata: Vec<u8>,
) -> TransactionRequest {
    let data = crate::abi::IModuleProxyFactory::deployModuleCall {
        masterCopy: mastercopy,
        initializer: setup_calldata.into(),
        saltNonce: U256::from_be_bytes(MODULE_SALT_NONCE.0),
    }
    .abi_encode();
    TransactionRequest::call(registry.module_proxy_factory, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    fn registry() -> ContractRegistry {
        ContractRegistry::default()
    }

    #[test]
    fn prediction_is_deterministic() {
        let registry = registry();
        let owner = address!("1111111111111111111111111111111111111111");
        let a = predict_account_address(&registry, &[owner], 1, AccountKind::Primary);
        let b = predict_account_address(&registry, &[owner], 1, AccountKind::Primary);
        assert_eq!(a, b);
    }

    #[test]
    fn account_kinds_predict_distinct_addresses() {
        let registry = registry();
        let owner = address!("1111111111111111111111111111111111111111");
        let primary = predict_account_address(&registry, &[owner], 1, AccountKind::Primary);
        let spender = predict_account_address(&registry, &[owner], 1, AccountKind::Spender);
        assert_ne!(primary, spender);
    }

    #[test]
    fn single_byte_of_setup_calldata_changes_the_address() {
        let registry = registry();
        let account = address!("2222222222222222222222222222222222222222");
        let setup = delay_setup_calldata(account);
        let mut mutated = setup.clone();
        mutated[setup.len() - 1] ^= 0x01;

        let base = predict_deployment(&Deployment::ZodiacModule {
            factory: registry.module_proxy_factory,
            mastercopy: registry.delay_mastercopy,
            setup_calldata: &setup,
            salt_nonce: MODULE_SALT_NONCE,
        });
        let drifted = predict_deployment(&Deployment::ZodiacModule {
            factory: registry.module_proxy_factory,
            mastercopy: registry.delay_mastercopy,
            setup_calldata: &mutated,
            salt_nonce: MODULE_SALT_NONCE,
        });
        assert_ne!(base, drifted);
    }

    #[test]
    fn mastercopy_changes_the_address() {
        let registry = registry();
        let account = address!("2222222222222222222222222222222222222222");
        let setup = delay_setup_calldata(account);
        let base = predict_deployment(&Deployment::ZodiacModule {
            factory: registry.module_proxy_factory,
            mastercopy: registry.delay_mastercopy,
            setup_calldata: &setup,
            salt_nonce: MODULE_SALT_NONCE,
        });
        let other = predict_deployment(&Deployment::ZodiacModule {
            factory: registry.module_proxy_factory,
            mastercopy: registry.roles_mastercopy,
            setup_calldata: &setup,
            salt_nonce: MODULE_SALT_NONCE,
        });
        assert_ne!(base, other);
    }

    #[test]
    fn fresh_topology_is_stable_and_collision_free() {
        let registry = registry();
        let account = address!("3333333333333333333333333333333333333333");
        let topology = AccountTopology::new(&registry, account);

        let first = topology.derive();
        let second = topology.derive();
        assert_eq!(first, second);
        assert_ne!(first.delay, first.roles);
        assert_ne!(first.owner_channel, first.spender_channel);
    }
}
