//! Solidity ABI surface this crate encodes against.
//!
//! These interfaces mirror the deployed contracts (Safe v1.4.1, the Zodiac
//! Delay and Roles modifiers, Multicall3). Only the functions this crate
//! actually encodes or decodes are declared.

use alloy_sol_types::sol;

sol! {
    interface ISafe {
        function setup(
            address[] calldata owners,
            uint256 threshold,
            address to,
            bytes calldata data,
            address fallbackHandler,
            address paymentToken,
            uint256 payment,
            address payable paymentReceiver
        ) external;

        function execTransaction(
            address to,
            uint256 value,
            bytes calldata data,
            uint8 operation,
            uint256 safeTxGas,
            uint256 baseGas,
            uint256 gasPrice,
            address gasToken,
            address payable refundReceiver,
            bytes memory signatures
        ) external payable returns (bool success);

        function getOwners() external view returns (address[] memory owners);
        function getThreshold() external view returns (uint256 threshold);
        function getModulesPaginated(address start, uint256 pageSize)
            external
            view
            returns (address[] memory array, address next);
        function enableModule(address module) external;
        function swapOwner(address prevOwner, address oldOwner, address newOwner) external;
    }

    interface ISafeProxyFactory {
        function createProxyWithNonce(
            address singleton,
            bytes memory initializer,
            uint256 saltNonce
        ) external returns (address proxy);
    }

    interface IModuleProxyFactory {
        function deployModule(
            address masterCopy,
            bytes memory initializer,
            uint256 saltNonce
        ) external returns (address proxy);
    }

    interface IMultiSend {
        /// `transactions` is the packed encoding
        /// `operation (1) || to (20) || value (32) || data length (32) || data`,
        /// concatenated per call.
        function multiSend(bytes memory transactions) external payable;
    }

    interface IDelay {
        function setUp(bytes memory initParams) external;
        function execTransactionFromModule(
            address to,
            uint256 value,
            bytes memory data,
            uint8 operation
        ) external returns (bool success);
        function executeNextTx(
            address to,
            uint256 value,
            bytes memory data,
            uint8 operation
        ) external;
        function setTxCooldown(uint256 cooldown) external;
        function owner() external view returns (address ownerAddress);
        function txCooldown() external view returns (uint256 cooldown);
        function txNonce() external view returns (uint256 nonce);
        function queueNonce() external view returns (uint256 nonce);
    }

    interface IRolesModifier {
        function setUp(bytes memory initParams) external;
        function owner() external view returns (address ownerAddress);
        function allowances(bytes32 key)
            external
            view
            returns (uint128 refill, uint128 maxRefill, uint64 period, uint128 balance, uint64 timestamp);
    }

    interface IBouncer {
        function setUp(bytes memory initParams) external;
    }

    interface IMulticall3 {
        struct Call3 {
            address target;
            bool allowFailure;
            bytes callData;
        }

        struct Result {
            bool success;
            bytes returnData;
        }

        function aggregate3(Call3[] calldata calls)
            external
            payable
            returns (Result[] memory returnData);

        function getCurrentBlockTimestamp() external view returns (uint256 timestamp);
    }
}
