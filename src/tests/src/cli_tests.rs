use crate::support::{echo_submission, FakeChain};
use mockito::{Matcher, Mock, ServerGuard};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use ttc_cli::send::{self, SendArgs};
use ttc_cli::{balance, init_config, read_phrase, CliError, ClientConfig};
use ttc_core::{Address, ClientError, SeedWallet, WalletHandle, WalletKind};
use ttc_network::SUBMIT_PATH;

const RPC_PATH: &str = "/jsonRPC";

fn rpc_result(result: Value) -> String {
    json!({"ok": true, "result": result, "jsonrpc": "2.0", "id": "1"}).to_string()
}

fn write_phrase(dir: &TempDir, name: &str, prefix: &str) -> PathBuf {
    let path = dir.path().join(name);
    let words: Vec<String> = (0..24).map(|i| format!("{}{}", prefix, i)).collect();
    std::fs::write(&path, words.join(" ")).unwrap();
    path
}

fn address_of(path: &Path, kind: WalletKind) -> Address {
    let words = read_phrase(path).unwrap();
    let wallet = SeedWallet::from_seed(Arc::new(FakeChain::new()), &words, kind).unwrap();
    *wallet.address()
}

fn config(server: &ServerGuard) -> ClientConfig {
    ClientConfig {
        endpoint: server.url(),
        rpc_uri: format!("{}{}", server.url(), RPC_PATH),
        ..ClientConfig::default()
    }
}

fn args(from: PathBuf) -> SendArgs {
    SendArgs {
        auth_header: "secret".to_string(),
        destination_address: None,
        from_wallet: from,
        to_wallet: None,
        wallet_type: None,
        amount: None,
        tip: None,
        comment: Some("test".to_string()),
        max_pause: None,
        max_addon: None,
        uri: None,
        rpc_uri: None,
    }
}

async fn mock_chain(server: &mut ServerGuard, balances: &[(Address, u64)]) -> Vec<Mock> {
    let mut mocks = vec![
        server
            .mock("POST", RPC_PATH)
            .match_body(Matcher::PartialJson(json!({"method": "getMasterchainInfo"})))
            .with_status(200)
            .with_body(rpc_result(json!({
                "last": {"workchain": -1, "shard": "-9223372036854775808", "seqno": 4200}
            })))
            .create_async()
            .await,
        server
            .mock("POST", RPC_PATH)
            .match_body(Matcher::PartialJson(json!({"method": "runGetMethod"})))
            .with_status(200)
            .with_body(rpc_result(json!({"exit_code": 0, "stack": [["num", "0x5"]]})))
            .create_async()
            .await,
    ];
    for (address, balance) in balances {
        mocks.push(
            server
                .mock("POST", RPC_PATH)
                .match_body(Matcher::PartialJson(json!({
                    "method": "getAddressInformation",
                    "params": {"address": address.to_string(), "seqno": 4200}
                })))
                .with_status(200)
                .with_body(rpc_result(json!({"balance": balance.to_string(), "state": "active"})))
                .create_async()
                .await,
        );
    }
    mocks
}

#[tokio::test]
async fn test_send_between_own_wallets() {
    let dir = tempfile::tempdir().unwrap();
    let first = write_phrase(&dir, "first.txt", "alpha");
    let second = write_phrase(&dir, "second.txt", "beta");
    let first_address = address_of(&first, WalletKind::V4R2);
    let second_address = address_of(&second, WalletKind::V4R2);

    let mut server = mockito::Server::new_async().await;
    let _chain = mock_chain(
        &mut server,
        &[(first_address, 2_000_000_000), (second_address, 100_000_000)],
    )
    .await;
    let submit = server
        .mock("POST", SUBMIT_PATH)
        .match_header("authorization", "secret")
        .with_status(200)
        .with_body_from_request(echo_submission)
        .expect(1)
        .create_async()
        .await;

    let mut args = args(first);
    args.to_wallet = Some(second);
    let summary = send::run(&config(&server), &args, &CancellationToken::new())
        .await
        .unwrap();

    let fields: Vec<&str> = summary.split('|').collect();
    assert_eq!(fields[0], "V4R2");
    assert_eq!(fields[1], first_address.to_string());
    assert_eq!(fields[2], format!("{}:250000000", second_address));
    assert!(fields[3].ends_with(":15000000"));
    submit.assert_async().await;
}

#[tokio::test]
async fn test_send_to_destination_with_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let from = write_phrase(&dir, "from.txt", "gamma");
    let from_address = address_of(&from, WalletKind::HighloadV3);
    let destination = Address::new(0, [7u8; 32]);

    let mut server = mockito::Server::new_async().await;
    let _chain = mock_chain(&mut server, &[(from_address, 1_000_000_000)]).await;
    let _submit = server
        .mock("POST", SUBMIT_PATH)
        .with_status(200)
        .with_body_from_request(echo_submission)
        .create_async()
        .await;

    let mut args = args(from);
    args.destination_address = Some(destination.to_raw());
    args.wallet_type = Some(WalletKind::HighloadV3);
    args.amount = Some(1_000);
    args.tip = Some(2_000);
    let summary = send::run(&config(&server), &args, &CancellationToken::new())
        .await
        .unwrap();

    let fields: Vec<&str> = summary.split('|').collect();
    assert_eq!(fields[0], "HighloadV3");
    assert_eq!(fields[1], from_address.to_string());
    assert_eq!(fields[2], format!("{}:1000", destination));
    assert!(fields[3].ends_with(":2000"));
}

#[tokio::test]
async fn test_send_rejects_unsupported_wallet_type() {
    let dir = tempfile::tempdir().unwrap();
    let from = write_phrase(&dir, "from.txt", "delta");

    let mut server = mockito::Server::new_async().await;
    let rpc = server.mock("POST", RPC_PATH).expect(0).create_async().await;
    let submit = server.mock("POST", SUBMIT_PATH).expect(0).create_async().await;

    let mut args = args(from);
    args.destination_address = Some(Address::new(0, [7u8; 32]).to_string());
    args.wallet_type = Some(WalletKind::V5R1Beta);
    let err = send::run(&config(&server), &args, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CliError::Client(ClientError::UnsupportedWalletKind(WalletKind::V5R1Beta))
    ));
    rpc.assert_async().await;
    submit.assert_async().await;
}

#[tokio::test]
async fn test_send_rejects_short_phrase() {
    let dir = tempfile::tempdir().unwrap();
    let from = dir.path().join("from.txt");
    std::fs::write(&from, "only three words").unwrap();

    let server = mockito::Server::new_async().await;
    let mut args = args(from);
    args.destination_address = Some(Address::new(0, [7u8; 32]).to_string());
    let err = send::run(&config(&server), &args, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, CliError::InvalidPhrase(_)));
}

#[tokio::test]
async fn test_balance_command() {
    let dir = tempfile::tempdir().unwrap();
    let wallet = write_phrase(&dir, "wallet.txt", "epsilon");
    let address = address_of(&wallet, WalletKind::V5R1Final);

    let mut server = mockito::Server::new_async().await;
    let _chain = mock_chain(&mut server, &[(address, 3_500_000_000)]).await;

    let (reported, balance) = balance::run(
        &config(&server),
        &wallet,
        WalletKind::V5R1Final,
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(reported, address);
    assert_eq!(balance, 3_500_000_000);
}

#[test]
fn test_init_config_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ttc").join("config.json");
    init_config::run(&path).unwrap();

    let config = ClientConfig::from_file(&path).unwrap();
    assert_eq!(config, ClientConfig::default());
    assert_eq!(config.amount, 250_000_000);
    assert_eq!(config.tip, 15_000_000);
}
