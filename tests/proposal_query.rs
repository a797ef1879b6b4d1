// Integration tests for the node query client against a mock RPC server.

use base64::{engine::general_purpose, Engine as _};
use nodeops::proposal::{
    derive_status, encode_proposal, Address, Epoch, InternalAddress, ProposalRecord, ProposalStatus,
    ProposalType,
};
use nodeops::rpc::{fetch_current_epoch, fetch_proposal, FetchError, RpcClient, RpcError};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn abci_response(value: Option<&[u8]>) -> serde_json::Value {
    json!({
        "jsonrpc": "2.0",
        "id": -1,
        "result": {
            "response": {
                "code": 0,
                "log": "",
                "info": "",
                "index": "0",
                "key": null,
                "value": value.map(|v| general_purpose::STANDARD.encode(v)),
                "proofOps": null,
                "height": "1024",
                "codespace": ""
            }
        }
    })
}

async fn mount_query(server: &MockServer, storage_path: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/abci_query"))
        .and(query_param("path", format!("\"{}\"", storage_path)))
        .and(query_param("prove", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn client(server: &MockServer) -> RpcClient {
    RpcClient::new(format!("{}/", server.uri()), Duration::from_secs(5)).unwrap()
}

fn pgf_proposal() -> ProposalRecord {
    ProposalRecord {
        id: 3,
        content: [("title", "Fund stewards"), ("authors", "ops@example.org")]
            .into_iter()
            .collect(),
        author: Address::Implicit([9; 20]),
        proposal_type: ProposalType::PgfSteward(vec![]),
        voting_start_epoch: Epoch(10),
        voting_end_epoch: Epoch(20),
        activation_epoch: Epoch(21),
    }
}

#[tokio::test]
async fn test_fetch_epoch_and_proposal() {
    let server = MockServer::start().await;
    let record = pgf_proposal();
    let mut stored = vec![1u8];
    stored.extend(encode_proposal(&record).unwrap());

    mount_query(&server, "/shell/epoch", abci_response(Some(&12u64.to_le_bytes()))).await;
    mount_query(&server, "/vp/governance/proposal/3", abci_response(Some(&stored))).await;

    let node = client(&server);
    let epoch = fetch_current_epoch(&node).await.unwrap();
    let fetched = fetch_proposal(&node, 3).await.unwrap();

    assert_eq!(epoch, Epoch(12));
    assert_eq!(fetched, record);
    assert_eq!(derive_status(&fetched, epoch), ProposalStatus::OnGoing);
}

#[tokio::test]
async fn test_missing_proposal_is_not_found() {
    let server = MockServer::start().await;
    mount_query(&server, "/vp/governance/proposal/99", abci_response(None)).await;

    let err = fetch_proposal(&client(&server), 99).await.unwrap_err();
    assert!(matches!(err, FetchError::ProposalNotFound(99)));
}

#[tokio::test]
async fn test_none_envelope_is_not_found() {
    let server = MockServer::start().await;
    mount_query(&server, "/vp/governance/proposal/5", abci_response(Some(&[0u8]))).await;

    let err = fetch_proposal(&client(&server), 5).await.unwrap_err();
    assert!(matches!(err, FetchError::ProposalNotFound(5)));
}

#[tokio::test]
async fn test_malformed_record_is_decode_error() {
    let server = MockServer::start().await;
    let mut stored = vec![1u8];
    stored.extend(encode_proposal(&pgf_proposal()).unwrap());
    stored.truncate(stored.len() - 4);
    mount_query(&server, "/vp/governance/proposal/3", abci_response(Some(&stored))).await;

    let err = fetch_proposal(&client(&server), 3).await.unwrap_err();
    assert!(matches!(err, FetchError::Decode(_)));
}

#[tokio::test]
async fn test_query_error_code() {
    let server = MockServer::start().await;
    let body = json!({
        "jsonrpc": "2.0",
        "id": -1,
        "result": { "response": { "code": 1, "log": "invalid storage path", "value": null } }
    });
    mount_query(&server, "/shell/epoch", body).await;

    let err = fetch_current_epoch(&client(&server)).await.unwrap_err();
    match err {
        FetchError::Rpc(RpcError::Query { code, log, .. }) => {
            assert_eq!(code, 1);
            assert_eq!(log, "invalid storage path");
        }
        other => panic!("expected query error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/abci_query"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = fetch_current_epoch(&client(&server)).await.unwrap_err();
    assert!(matches!(
        err,
        FetchError::Rpc(RpcError::Http { status: 502, .. })
    ));
}

#[tokio::test]
async fn test_unreachable_node_is_transport_error() {
    // Nothing listens on port 9 (discard) in the test environment
    let node = RpcClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
    let err = fetch_current_epoch(&node).await.unwrap_err();
    assert!(matches!(err, FetchError::Rpc(RpcError::Transport(_))));
}

#[test]
fn test_internal_author_round_trips_through_storage_encoding() {
    let mut record = pgf_proposal();
    record.author = Address::Internal(InternalAddress::Governance);
    let bytes = encode_proposal(&record).unwrap();
    assert_eq!(nodeops::proposal::decode_proposal(&bytes).unwrap(), record);
}
