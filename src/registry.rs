//! Fixed-address registry for one chain configuration.
//!
//! Every component takes a [`ContractRegistry`] value instead of reading
//! process-wide constants, so multiple network configurations can coexist.
//! None of these addresses are computed by this crate; they identify
//! already-deployed singletons.

use alloy_primitives::{address, bytes, Address, Bytes};

/// Addresses and bytecode the derivation and encoding layers treat as
/// globally known.
///
/// All derived addresses are a pure function of this registry plus the
/// account address. Changing any field silently changes every prediction,
/// with no error raised by the chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractRegistry {
    /// Safe proxy factory (`createProxyWithNonce`).
    pub safe_proxy_factory: Address,
    /// Safe singleton the account proxies delegate to.
    pub safe_mastercopy: Address,
    /// Fallback handler wired into every account setup initializer.
    pub fallback_handler: Address,
    /// The factory's `proxyCreationCode`. Must match the deployed factory
    /// byte-for-byte: the account address commits to its hash.
    pub safe_proxy_creation_code: Bytes,
    /// Zodiac module proxy factory (`deployModule`).
    pub module_proxy_factory: Address,
    /// Delay modifier implementation.
    pub delay_mastercopy: Address,
    /// Roles modifier implementation.
    pub roles_mastercopy: Address,
    /// Bouncer (ownership-transfer guard) implementation.
    pub bouncer_mastercopy: Address,
    /// Forwarder implementation, deployed once per chain.
    pub forwarder_mastercopy: Address,
    /// ERC-2470 style singleton deployment factory.
    pub singleton_factory: Address,
    /// MultiSend entry point (delegate-call batches).
    pub multi_send: Address,
    /// MultiSendCallOnly entry point (relayer-submitted batches).
    pub multi_send_call_only: Address,
    /// Multicall3 aggregator used for integrity queries.
    pub multicall: Address,
    /// Placeholder sole owner a fully configured account must hold.
    pub placeholder_owner: Address,
}

impl Default for ContractRegistry {
    /// Canonical deployments shared across the supported networks.
    fn default() -> Self {
        ContractRegistry {
            safe_proxy_factory: address!("4e1dcf7ad4e460cfd30791ccc4f9c8a4f820ec67"),
            safe_mastercopy: address!("41675c099f32341bf84bfc5382af534df5c7461a"),
            fallback_handler: address!("fd0732dc9e303f09fcef3a7388ad10a83459ec99"),
            safe_proxy_creation_code: bytes!("608060405234801561001057600080fd5b506040516101e63803806101e68339818101604052602081101561003357600080fd5b8101908080519060200190929190505050600073ffffffffffffffffffffffffffffffffffffffff168173ffffffffffffffffffffffffffffffffffffffff16141561010a576040517f08c379a00000000000000000000000000000000000000000000000000000000081526004018080602001828103825260228152602001806101c46022913960400191505060405180910390fd5b806000806101000a81548173ffffffffffffffffffffffffffffffffffffffff021916908373ffffffffffffffffffffffffffffffffffffffff1602179055505060ab806101196000396000f3fe608060405273ffffffffffffffffffffffffffffffffffffffff600054167fa619486e0000000000000000000000000000000000000000000000000000000060003514156050578060005260206000f35b3660008037600080366000845af43d6000803e60008114156070573d6000fd5b3d6000f3fea265627a7a72315820d8a00dc4fe6bf675a9d7416fc2d00bb3433362aa8186b750f76c4027269667ff64736f6c634300050e0032496e76616c6964206d617374657220636f707920616464726573732070726f7669646564"),
            module_proxy_factory: address!("000000000000addb49795b0f9ba5bc298cdda236"),
            delay_mastercopy: address!("d54895b1121a2ee3f37b502f507631fa1331bed6"),
            roles_mastercopy: address!("9646fdad06d3e24444381f44362a3b0eb343d337"),
            bouncer_mastercopy: address!("c5e3f7a1bbde0e0e86c9c4de163c4f9c52d22a4e"),
            forwarder_mastercopy: address!("82f53fd8e267fcb9b7c8e1a2de47cd36bb8e4d10"),
            singleton_factory: address!("ce0042b868300000d44a59004da54a005ffdcf9f"),
            multi_send: address!("38869bf66a61cf6bdb996a6ae40d5853fd43b526"),
            multi_send_call_only: address!("9641d764fc13c8b624c04430c7356c1c7c8102e2"),
            multicall: address!("ca11bde05977b3631167028862be2a173976ca11"),
            placeholder_owner: address!("000000000000000000000000000000000000dead"),
        }
    }
}
