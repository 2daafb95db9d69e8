//! Account contract bindings against a mocked transport.

use alloy::{
    primitives::{Bytes, U64, U256, address},
    providers::{ProviderBuilder, mock::Asserter},
    sol_types::SolValue,
};
use passkey_account::{
    error::{ContractError, PasskeyError},
    types::{EcPoint, IPasskeyAccount, PasskeyAccount},
};

fn public_key_response(credential_id: &str, x: u64, y: u64) -> Bytes {
    IPasskeyAccount::PublicKey {
        credentialId: credential_id.to_string(),
        pubX: U256::from(x),
        pubY: U256::from(y),
    }
    .abi_encode()
    .into()
}

#[tokio::test]
async fn unregistered_credential_is_none() -> eyre::Result<()> {
    let asserter = Asserter::new();
    let provider = ProviderBuilder::new().connect_mocked_client(asserter.clone());
    let account =
        PasskeyAccount::new(address!("0x5fbdb2315678afecb367f032d93f642f64180aa3"), provider);

    asserter.push_success(&public_key_response("", 0, 0));
    assert_eq!(account.public_key("missing").await?, None);

    Ok(())
}

#[tokio::test]
async fn registered_credential_is_returned() -> eyre::Result<()> {
    let asserter = Asserter::new();
    let provider = ProviderBuilder::new().connect_mocked_client(asserter.clone());
    let account =
        PasskeyAccount::new(address!("0x5fbdb2315678afecb367f032d93f642f64180aa3"), provider);

    asserter.push_success(&public_key_response("abc", 1, 2));
    let credential = account.public_key("abc").await?.expect("registered");

    assert_eq!(credential.credential_id, "abc");
    assert_eq!(credential.public_key, EcPoint::new(U256::from(1), U256::from(2)));

    Ok(())
}

#[tokio::test]
async fn chain_mismatch_aborts() -> eyre::Result<()> {
    let asserter = Asserter::new();
    let provider = ProviderBuilder::new().connect_mocked_client(asserter.clone());
    let account =
        PasskeyAccount::new(address!("0x5fbdb2315678afecb367f032d93f642f64180aa3"), provider);

    asserter.push_success(&U64::from(80001));
    account.ensure_chain(80001).await?;

    asserter.push_success(&U64::from(1));
    let err = account.ensure_chain(80001).await.unwrap_err();
    assert!(matches!(err, ContractError::ChainMismatch { expected: 80001, actual: 1 }));
    assert!(PasskeyError::from(err).is_contract_call_failed());

    Ok(())
}

#[tokio::test]
async fn rpc_failure_is_contract_call_failed() {
    let asserter = Asserter::new();
    let provider = ProviderBuilder::new().connect_mocked_client(asserter.clone());
    let account =
        PasskeyAccount::new(address!("0x5fbdb2315678afecb367f032d93f642f64180aa3"), provider);

    asserter.push_failure_msg("execution reverted");
    let err = PasskeyError::from(account.public_key("abc").await.unwrap_err());
    assert!(err.is_contract_call_failed());
}
