// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Gas tank account contracts: factory, account and ERC-4337 entry point.

use alloy::{
    primitives::{address, keccak256, Address, Bytes, B256, U256},
    sol,
    sol_types::{SolCall, SolValue},
};

sol! {
    #[sol(rpc)]
    interface IGasTankFactory {
        /// Deploys the owner's tank and funds it with `amount` of `token`
        /// pulled from the owner, in one transaction.
        function deployWithDeposit(address owner, uint256 index, address token, uint256 amount)
            external
            returns (address account);
    }

    #[sol(rpc)]
    interface IGasTank {
        function withdraw(address token, address recipient, uint256 amount) external;
    }

    #[sol(rpc)]
    interface IEntryPoint {
        function getNonce(address sender, uint192 key) external view returns (uint256 nonce);
    }
}

/// ERC-4337 v0.7 entry point, deployed at the same address on every chain.
pub const ENTRY_POINT_V07: Address = address!("0000000071727de22e5e9d8baf0edac6f37da032");

/// Counterfactual address of the owner's tank.
///
/// Pure CREATE2 derivation: the same owner, index and factory always yield
/// the same address, deployed or not, without touching the chain.
pub fn derive_tank_address(
    factory: Address,
    init_code_hash: B256,
    owner: Address,
    index: u64,
) -> Address {
    let salt = keccak256((owner, U256::from(index)).abi_encode());
    factory.create2(salt.0, init_code_hash.0)
}

/// Calldata for the factory's combined deploy-and-fund call.
pub fn deploy_with_deposit_calldata(
    owner: Address,
    index: u64,
    token: Address,
    amount: U256,
) -> Bytes {
    IGasTankFactory::deployWithDepositCall {
        owner,
        index: U256::from(index),
        token,
        amount,
    }
    .abi_encode()
    .into()
}

/// Calldata for the tank's owner-only withdraw.
pub fn withdraw_calldata(token: Address, recipient: Address, amount: U256) -> Bytes {
    IGasTank::withdrawCall {
        token,
        recipient,
        amount,
    }
    .abi_encode()
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::b256;

    const TEST_FACTORY: Address = address!("00000000000000000000000000000000000fac70");
    const TEST_INIT_CODE_HASH: B256 =
        b256!("1111111111111111111111111111111111111111111111111111111111111111");

    #[test]
    fn derived_address_is_deterministic() {
        let owner = Address::repeat_byte(0xaa);
        let first =
            derive_tank_address(TEST_FACTORY, TEST_INIT_CODE_HASH, owner, 0);
        let second =
            derive_tank_address(TEST_FACTORY, TEST_INIT_CODE_HASH, owner, 0);
        assert_eq!(first, second);
    }

    #[test]
    fn derived_address_depends_on_owner_and_index() {
        let owner = Address::repeat_byte(0xaa);
        let other = Address::repeat_byte(0xbb);
        let base = derive_tank_address(TEST_FACTORY, TEST_INIT_CODE_HASH, owner, 0);

        assert_ne!(
            base,
            derive_tank_address(TEST_FACTORY, TEST_INIT_CODE_HASH, other, 0)
        );
        assert_ne!(
            base,
            derive_tank_address(TEST_FACTORY, TEST_INIT_CODE_HASH, owner, 1)
        );
    }

    #[test]
    fn withdraw_calldata_encodes_three_words() {
        let data = withdraw_calldata(
            Address::repeat_byte(1),
            Address::repeat_byte(2),
            U256::from(10u64),
        );
        assert_eq!(data.len(), 4 + 32 * 3);
        assert_eq!(&data[..4], IGasTank::withdrawCall::SELECTOR.as_slice());
    }
}
