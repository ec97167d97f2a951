use crate::support::{echo_submission, wallet, FakeChain};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use ttc_cli::send::{execute, TransferPlan};
use ttc_core::{ClientError, Jitter, WalletHandle, WalletKind, TIP_ADDRESS};
use ttc_network::{RelayClient, SUBMIT_PATH};

const AUTH: &str = "relay-token";

fn plan(destination: Option<String>) -> TransferPlan {
    TransferPlan {
        destination,
        amount: 250_000_000,
        tip: 15_000_000,
        comment: "test".to_string(),
        query_deadline: Duration::from_secs(5),
    }
}

fn relay(server: &ServerGuard) -> RelayClient {
    RelayClient::new(server.url(), AUTH).unwrap()
}

#[tokio::test]
async fn test_single_wallet_send() {
    let mut server = Server::new_async().await;
    let submit = server
        .mock("POST", SUBMIT_PATH)
        .match_header("authorization", AUTH)
        .match_header("content-type", "application/json")
        .match_body(Matcher::PartialJson(json!({"wallet": "V4R2"})))
        .with_status(200)
        .with_body(r#"{"msg_body_hash":"abc123"}"#)
        .expect(1)
        .create_async()
        .await;

    let chain = Arc::new(FakeChain::new());
    let from = wallet(&chain, 1, WalletKind::V4R2);
    chain.set_balance(from.address(), 1_000_000_000);
    let destination = wallet(&chain, 9, WalletKind::V4R2).address().to_string();

    let hash = execute(
        chain.as_ref(),
        &relay(&server),
        &from,
        None,
        &plan(Some(destination)),
        &mut Jitter::new(0, 0),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(hash, "abc123");
    submit.assert_async().await;
}

#[tokio::test]
async fn test_submitted_message_carries_transfer_and_tip() {
    let mut server = Server::new_async().await;
    let _submit = server
        .mock("POST", SUBMIT_PATH)
        .with_status(200)
        .with_body_from_request(echo_submission)
        .create_async()
        .await;

    let chain = Arc::new(FakeChain::new());
    let from = wallet(&chain, 1, WalletKind::HighloadV3);
    let to = wallet(&chain, 2, WalletKind::HighloadV3);
    chain.set_balance(from.address(), 400_000_000);
    chain.set_balance(to.address(), 900_000_000);

    let summary = execute(
        chain.as_ref(),
        &relay(&server),
        &from,
        Some(&to),
        &plan(None),
        &mut Jitter::new(0, 0),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    // The richer second wallet sends back to the first
    let tip = ttc_core::Address::parse(TIP_ADDRESS).unwrap();
    let expected = [
        "HighloadV3".to_string(),
        to.address().to_string(),
        format!("{}:250000000", from.address()),
        format!("{}:15000000", tip),
        format!("tip from {}", to.address()),
    ]
    .join("|");
    assert_eq!(summary, expected);
}

#[tokio::test]
async fn test_equal_balances_second_wallet_sends() {
    let mut server = Server::new_async().await;
    let _submit = server
        .mock("POST", SUBMIT_PATH)
        .with_status(200)
        .with_body_from_request(echo_submission)
        .create_async()
        .await;

    let chain = Arc::new(FakeChain::new());
    let from = wallet(&chain, 3, WalletKind::V5R1Final);
    let to = wallet(&chain, 4, WalletKind::V5R1Final);
    chain.set_balance(from.address(), 500_000_000);
    chain.set_balance(to.address(), 500_000_000);

    let summary = execute(
        chain.as_ref(),
        &relay(&server),
        &from,
        Some(&to),
        &plan(None),
        &mut Jitter::new(0, 0),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    let fields: Vec<&str> = summary.split('|').collect();
    assert_eq!(fields[0], "V5R1Final");
    assert_eq!(fields[1], to.address().to_string());
    assert_eq!(fields[2], format!("{}:250000000", from.address()));
}

#[tokio::test]
async fn test_unsupported_wallet_touches_nothing() {
    let mut server = Server::new_async().await;
    let submit = server
        .mock("POST", SUBMIT_PATH)
        .with_status(200)
        .with_body(r#"{"msg_body_hash":"abc123"}"#)
        .expect(0)
        .create_async()
        .await;

    for kind in [WalletKind::V3, WalletKind::V5R1Beta] {
        let chain = Arc::new(FakeChain::new());
        let from = wallet(&chain, 1, kind);
        let destination = wallet(&chain, 9, kind).address().to_string();

        let err = execute(
            chain.as_ref(),
            &relay(&server),
            &from,
            None,
            &plan(Some(destination)),
            &mut Jitter::new(0, 0),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ClientError::UnsupportedWalletKind(k) if k == kind));
        assert_eq!(chain.queries(), 0);
    }
    submit.assert_async().await;
}

#[tokio::test]
async fn test_unsupported_second_wallet_rejected() {
    let server = Server::new_async().await;
    let chain = Arc::new(FakeChain::new());
    let from = wallet(&chain, 1, WalletKind::V4R2);
    let to = wallet(&chain, 2, WalletKind::V3);

    let err = execute(
        chain.as_ref(),
        &relay(&server),
        &from,
        Some(&to),
        &plan(None),
        &mut Jitter::new(0, 0),
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ClientError::UnsupportedWalletKind(WalletKind::V3)));
    assert_eq!(chain.queries(), 0);
}

#[tokio::test]
async fn test_relay_rejection() {
    let mut server = Server::new_async().await;
    let _submit = server
        .mock("POST", SUBMIT_PATH)
        .with_status(400)
        .with_body(r#"{"code":1,"message":"bad signature"}"#)
        .create_async()
        .await;

    let chain = Arc::new(FakeChain::new());
    let from = wallet(&chain, 1, WalletKind::HighloadV2R2);
    let destination = wallet(&chain, 9, WalletKind::HighloadV2R2).address().to_string();

    let err = execute(
        chain.as_ref(),
        &relay(&server),
        &from,
        None,
        &plan(Some(destination)),
        &mut Jitter::new(0, 0),
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();

    match err {
        ClientError::RelayRejected { code, message } => {
            assert_eq!(code, 1);
            assert_eq!(message, "bad signature");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_balance_failure_aborts_before_submit() {
    let mut server = Server::new_async().await;
    let submit = server
        .mock("POST", SUBMIT_PATH)
        .with_status(200)
        .with_body(r#"{"msg_body_hash":"abc123"}"#)
        .expect(0)
        .create_async()
        .await;

    let chain = Arc::new(FakeChain::failing_balances());
    let from = wallet(&chain, 1, WalletKind::V4R2);
    let to = wallet(&chain, 2, WalletKind::V4R2);

    let err = execute(
        chain.as_ref(),
        &relay(&server),
        &from,
        Some(&to),
        &plan(None),
        &mut Jitter::new(0, 0),
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ClientError::BalanceQueryFailed(_)));
    submit.assert_async().await;
}

#[tokio::test]
async fn test_addon_raises_primary_amount_only() {
    let mut server = Server::new_async().await;
    let _submit = server
        .mock("POST", SUBMIT_PATH)
        .with_status(200)
        .with_body_from_request(echo_submission)
        .create_async()
        .await;

    let chain = Arc::new(FakeChain::new());
    let from = wallet(&chain, 1, WalletKind::V4R2);
    let destination = wallet(&chain, 9, WalletKind::V4R2);

    let summary = execute(
        chain.as_ref(),
        &relay(&server),
        &from,
        None,
        &plan(Some(destination.address().to_string())),
        &mut Jitter::seeded(0, 1_000, 7),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    let fields: Vec<&str> = summary.split('|').collect();
    let amount: u64 = fields[2].rsplit(':').next().unwrap().parse().unwrap();
    assert!((250_000_000..250_001_000).contains(&amount));
    assert!(fields[3].ends_with(":15000000"));
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let server = Server::new_async().await;
    let chain = Arc::new(FakeChain::new());
    let from = wallet(&chain, 1, WalletKind::V4R2);
    let destination = wallet(&chain, 9, WalletKind::V4R2).address().to_string();

    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = execute(
        chain.as_ref(),
        &relay(&server),
        &from,
        None,
        &plan(Some(destination)),
        &mut Jitter::new(0, 0),
        &cancel,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ClientError::Cancelled));
}

#[tokio::test]
async fn test_seqno_lookup_honours_cancellation() {
    let mut server = Server::new_async().await;
    let submit = server.mock("POST", SUBMIT_PATH).expect(0).create_async().await;

    let chain = Arc::new(FakeChain::hanging_seqno());
    let from = wallet(&chain, 1, WalletKind::V4R2);
    chain.set_balance(from.address(), 1_000_000_000);
    let destination = wallet(&chain, 9, WalletKind::V4R2).address().to_string();
    let mut plan = plan(Some(destination));
    plan.query_deadline = Duration::from_secs(60);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let result = tokio::time::timeout(
        Duration::from_secs(3),
        execute(
            chain.as_ref(),
            &relay(&server),
            &from,
            None,
            &plan,
            &mut Jitter::new(0, 0),
            &cancel,
        ),
    )
    .await
    .expect("send kept waiting on seqno after cancellation");

    assert!(matches!(result, Err(ClientError::Cancelled)));
    submit.assert_async().await;
}

#[tokio::test]
async fn test_seqno_lookup_bounded_by_query_deadline() {
    let server = Server::new_async().await;
    let chain = Arc::new(FakeChain::hanging_seqno());
    let from = wallet(&chain, 1, WalletKind::V5R1Final);
    chain.set_balance(from.address(), 1_000_000_000);
    let destination = wallet(&chain, 9, WalletKind::V5R1Final).address().to_string();
    let mut plan = plan(Some(destination));
    plan.query_deadline = Duration::from_millis(200);

    let result = tokio::time::timeout(
        Duration::from_secs(3),
        execute(
            chain.as_ref(),
            &relay(&server),
            &from,
            None,
            &plan,
            &mut Jitter::new(0, 0),
            &CancellationToken::new(),
        ),
    )
    .await
    .expect("send kept waiting on seqno past the query deadline");

    assert!(matches!(result, Err(ClientError::MessageAssemblyError(_))));
}
