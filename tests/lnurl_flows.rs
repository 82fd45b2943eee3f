//! End-to-end flows: the wallet client talks to the server router in
//! process, both sides backed by mock nodes.

use async_trait::async_trait;
use axum::{
    Json, Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
    routing::get,
};
use clap::Parser;
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use url::Url;

use lnurl_service::{
    AppState, ClientConfig, LnurlClient, LnurlError, ServerConfig,
    client::{HttpResponse, LnurlTransport, PayFlowState, routes},
    db::{SqliteGiftCardStore, migrate},
    documents::InMemoryDocuments,
    handlers,
    lightning::{InvoiceDescription, InvoiceRequest, MockNode, NodeRpc, mock::FundChannelCall},
    observer::{FlowEvent, FlowObserver},
    protocol::{BoundsError, PayRequest, Tag, VerificationError},
};

const METADATA: &str = r#"[["text/plain","x"]]"#;

fn server_node_id() -> String {
    format!("02{}", "aa".repeat(32))
}

fn wallet_node_id() -> String {
    format!("03{}", "bb".repeat(32))
}

fn server_config() -> ServerConfig {
    ServerConfig::parse_from([
        "lnurl-server",
        "--lightning-rpc-path",
        "/tmp/lightning-rpc",
        "--metadata-text",
        "x",
        "--public-url",
        "http://lnurl.test",
    ])
}

fn client_config(extra: &[&str]) -> ClientConfig {
    let mut args = vec![
        "lnurl-client",
        "--lightning-rpc-path",
        "/tmp/wallet-rpc",
        "--server-url",
        "http://lnurl.test",
        "--well-known-scheme",
        "http",
    ];
    args.extend_from_slice(extra);
    ClientConfig::parse_from(args)
}

fn alice_document() -> PayRequest {
    PayRequest {
        callback: "http://lnurl.test/lnurl-pay".into(),
        max_sendable: 1_000_000,
        min_sendable: 1_000,
        metadata: METADATA.into(),
        tag: Tag::PayRequest,
    }
}

struct Server {
    app: Router,
    node: Arc<MockNode>,
}

async fn server() -> Server {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    migrate(&pool).await.unwrap();

    let node = Arc::new(MockNode::new(server_node_id()));
    let documents = InMemoryDocuments::default().with("alice", alice_document());
    let state = AppState::new(
        server_config(),
        node.clone(),
        Arc::new(documents),
        Arc::new(SqliteGiftCardStore::new(pool)),
    );
    Server {
        app: handlers::router(state),
        node,
    }
}

/// Routes the client's requests into an axum router, ignoring the host.
struct RouterTransport {
    app: Router,
    requests: Mutex<Vec<String>>,
}

impl RouterTransport {
    fn new(app: Router) -> Arc<Self> {
        Arc::new(Self {
            app,
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LnurlTransport for RouterTransport {
    async fn get(&self, url: &Url) -> Result<HttpResponse, LnurlError> {
        self.requests.lock().unwrap().push(url.to_string());
        let uri = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };
        let (status, body) = get_raw(&self.app, &uri).await;
        Ok(HttpResponse {
            status: status.as_u16(),
            body,
        })
    }
}

#[derive(Default)]
struct RecordingObserver {
    events: Mutex<Vec<String>>,
}

impl RecordingObserver {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl FlowObserver for RecordingObserver {
    fn on_event(&self, event: &FlowEvent<'_>) {
        let name = match event {
            FlowEvent::Started { .. } => "started".to_string(),
            FlowEvent::PayState { to, .. } => format!("{to:?}"),
            FlowEvent::Verification { result } => format!("verification ok={}", result.is_ok()),
            FlowEvent::Payment { .. } => "payment".to_string(),
            FlowEvent::Completed { .. } => "completed".to_string(),
            FlowEvent::Aborted { .. } => "aborted".to_string(),
        };
        self.events.lock().unwrap().push(name);
    }
}

async fn get_raw(app: &Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let (status, body) = get_raw(app, uri).await;
    (status, serde_json::from_str(&body).unwrap())
}

fn wallet() -> Arc<MockNode> {
    Arc::new(MockNode::new(wallet_node_id()))
}

#[tokio::test]
async fn pay_flow_pays_committed_invoice() {
    let server = server().await;
    let transport = RouterTransport::new(server.app.clone());
    let wallet = wallet();
    let observer = Arc::new(RecordingObserver::default());
    let client = LnurlClient::new(client_config(&[]), transport.clone(), wallet.clone())
        .with_observer(observer.clone());

    let outcome = client
        .run_pay_flow("http://lnurl.test/lnurl6", 5_000)
        .await
        .unwrap();

    assert!(outcome.payment.is_complete());
    assert_eq!(outcome.description.as_deref(), Some("x"));

    let decoded = wallet.decode_invoice(&outcome.invoice).await.unwrap();
    assert_eq!(decoded.amount_msat, Some(5_000));
    let expected = hex::encode(Sha256::digest(METADATA.as_bytes()));
    assert_eq!(decoded.description_hash.as_deref(), Some(expected.as_str()));

    assert_eq!(wallet.payments().await, vec![outcome.invoice.clone()]);
    assert_eq!(
        transport.requests(),
        vec![
            "http://lnurl.test/lnurl6".to_string(),
            "http://lnurl.test/lnurl-pay?amount=5000".to_string(),
        ]
    );
    assert_eq!(
        observer.events(),
        vec![
            "started",
            "CapabilityFetched",
            "BoundsOk",
            "InvoiceRequested",
            "InvoiceReceived",
            "verification ok=true",
            "Verified",
            "payment",
            "Paid",
            "completed",
        ]
    );
}

#[tokio::test]
async fn amount_below_minimum_never_reaches_callback() {
    let server = server().await;
    let transport = RouterTransport::new(server.app.clone());
    let wallet = wallet();
    let client = LnurlClient::new(client_config(&[]), transport.clone(), wallet.clone());

    let mut flow = client.pay_flow();
    let err = flow.run("http://lnurl.test/lnurl6", 500).await.unwrap_err();

    assert!(matches!(
        err,
        LnurlError::Bounds(BoundsError::OutOfRange { amount: 500, .. })
    ));
    assert_eq!(flow.state(), PayFlowState::Aborted);
    assert_eq!(transport.requests().len(), 1);
    assert!(wallet.payments().await.is_empty());
}

#[tokio::test]
async fn disjoint_bounds_abort_before_callback() {
    let server = server().await;
    let transport = RouterTransport::new(server.app.clone());
    // Server accepts 1000..=1_000_000 msat, the wallet only sends above that.
    let client = LnurlClient::new(
        client_config(&["--local-min-sendable", "2000000"]),
        transport.clone(),
        wallet(),
    );

    let err = client
        .run_pay_flow("http://lnurl.test/lnurl6", 2_000_000)
        .await
        .unwrap_err();
    assert!(matches!(err, LnurlError::Bounds(BoundsError::EmptyRange { .. })));
    assert_eq!(transport.requests().len(), 1);
}

/// A service that answers the callback with a foreign invoice.
async fn dishonest_service(description: InvoiceDescription, amount_msat: u64) -> Router {
    let foreign = MockNode::new(server_node_id());
    let pr = foreign
        .create_invoice(InvoiceRequest {
            amount_msat,
            label: "foreign".into(),
            description,
        })
        .await
        .unwrap()
        .bolt11;

    Router::new()
        .route(
            "/lnurl6",
            get(|| async {
                Json(json!({
                    "callback": "/lnurl-pay",
                    "maxSendable": 1_000_000,
                    "minSendable": 1_000,
                    "metadata": METADATA,
                    "tag": "payRequest",
                }))
            }),
        )
        .route(
            "/lnurl-pay",
            get(move || {
                let pr = pr.clone();
                async move { Json(json!({ "pr": pr, "routes": [] })) }
            }),
        )
}

#[tokio::test]
async fn invoice_for_other_metadata_is_not_paid() {
    let app = dishonest_service(
        InvoiceDescription::HashOf(r#"[["text/plain","y"]]"#.into()),
        5_000,
    )
    .await;
    let wallet = wallet();
    let observer = Arc::new(RecordingObserver::default());
    let client = LnurlClient::new(client_config(&[]), RouterTransport::new(app), wallet.clone())
        .with_observer(observer.clone());

    let mut flow = client.pay_flow();
    let err = flow.run("http://evil.test/lnurl6", 5_000).await.unwrap_err();

    assert!(matches!(
        err,
        LnurlError::Verification(VerificationError::CommitmentMismatch { .. })
    ));
    assert_eq!(flow.state(), PayFlowState::Aborted);
    assert!(wallet.payments().await.is_empty());
    assert!(observer.events().contains(&"verification ok=false".to_string()));
    assert_eq!(observer.events().last().map(String::as_str), Some("aborted"));
}

#[tokio::test]
async fn invoice_for_other_amount_is_not_paid() {
    let app = dishonest_service(InvoiceDescription::HashOf(METADATA.into()), 6_000).await;
    let wallet = wallet();
    let client = LnurlClient::new(client_config(&[]), RouterTransport::new(app), wallet.clone());

    let err = client
        .run_pay_flow("http://evil.test/lnurl6", 5_000)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        LnurlError::Verification(VerificationError::AmountMismatch {
            expected: 5_000,
            found: 6_000
        })
    ));
    assert!(wallet.payments().await.is_empty());
}

#[tokio::test]
async fn pay_flow_runs_once() {
    let server = server().await;
    let transport = RouterTransport::new(server.app.clone());
    let client = LnurlClient::new(client_config(&[]), transport.clone(), wallet());

    let mut flow = client.pay_flow();
    flow.run("http://lnurl.test/lnurl6", 5_000).await.unwrap();
    assert_eq!(flow.state(), PayFlowState::Paid);

    let err = flow.run("http://lnurl.test/lnurl6", 5_000).await.unwrap_err();
    assert!(matches!(err, LnurlError::Protocol(_)));
    assert_eq!(transport.requests().len(), 2);
}

#[tokio::test]
async fn pay_timeout_reports_unknown_status() {
    let server = server().await;
    let wallet = wallet();
    wallet.set_pay_times_out(true).await;
    let client = LnurlClient::new(
        client_config(&[]),
        RouterTransport::new(server.app.clone()),
        wallet.clone(),
    );

    let err = client
        .run_pay_flow("http://lnurl.test/lnurl6", 5_000)
        .await
        .unwrap_err();
    assert!(matches!(err, LnurlError::PaymentStatusUnknown(_)));
    assert_eq!(wallet.payments().await.len(), 1);
}

#[tokio::test]
async fn pay_request_document_is_stable() {
    let server = server().await;
    let (status, first) = get_raw(&server.app, "/lnurl6").await;
    let (_, second) = get_raw(&server.app, "/lnurl6").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, second);

    let document: Value = serde_json::from_str(&first).unwrap();
    assert_eq!(document["tag"], "payRequest");
    assert_eq!(document["callback"], "http://lnurl.test/lnurl-pay");
    assert_eq!(document["metadata"], METADATA);
    assert_eq!(document["minSendable"], 1_000);
    assert_eq!(document["maxSendable"], 1_000_000);
}

#[tokio::test]
async fn pay_callback_rejects_bad_amounts() {
    let server = server().await;

    for uri in ["/lnurl-pay", "/lnurl-pay?amount=abc", "/lnurl-pay?amount=0"] {
        let (status, body) = get_json(&server.app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["status"], "ERROR");
    }

    let (status, body) = get_json(&server.app, "/lnurl-pay?amount=2000000").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "ERROR");
}

#[tokio::test]
async fn invoice_failure_is_an_lnurl_error() {
    let server = server().await;
    server.node.fail_invoices(Some("insufficient inbound")).await;

    let (status, body) = get_json(&server.app, "/lnurl-pay?amount=5000").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "ERROR");

    let client = LnurlClient::new(
        client_config(&[]),
        RouterTransport::new(server.app.clone()),
        wallet(),
    );
    let err = client
        .run_pay_flow("http://lnurl.test/lnurl6", 5_000)
        .await
        .unwrap_err();
    assert!(matches!(&err, LnurlError::Callback(reason) if reason.contains("invoice creation failed")));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn channel_flow_opens_private_channel() {
    let server = server().await;
    let wallet = wallet();
    let client = LnurlClient::new(
        client_config(&[]),
        RouterTransport::new(server.app.clone()),
        wallet.clone(),
    );

    let outcome = client
        .run_channel_flow("http://lnurl.test/lnurl2")
        .await
        .unwrap();

    assert_eq!(outcome.peer, server_node_id());
    assert_eq!(outcome.response["status"], "OK");
    assert_eq!(
        wallet.connections().await,
        vec![format!("{}@127.0.0.1:9735", server_node_id())]
    );
    assert_eq!(
        server.node.fundings().await,
        vec![FundChannelCall {
            node_id: wallet_node_id(),
            amount_sat: 1_000_000,
            announce: false,
        }]
    );
}

#[tokio::test]
async fn public_channel_is_announced() {
    let server = server().await;
    let client = LnurlClient::new(
        client_config(&["--private-channel", "false"]),
        RouterTransport::new(server.app.clone()),
        wallet(),
    );

    client
        .run_channel_flow("http://lnurl.test/lnurl2")
        .await
        .unwrap();
    let fundings = server.node.fundings().await;
    assert_eq!(fundings.len(), 1);
    assert!(fundings[0].announce);
}

#[tokio::test]
async fn channel_k1_is_single_use() {
    let server = server().await;
    let (_, document) = get_json(&server.app, "/lnurl2").await;
    let k1 = document["k1"].as_str().unwrap().to_string();
    assert_eq!(k1.len(), 64);

    let callback = format!(
        "/lnurl-channel-request?k1={k1}&remote_id={}&amount=100000&private=1",
        wallet_node_id()
    );
    let (status, body) = get_json(&server.app, &callback).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");

    let (status, body) = get_json(&server.app, &callback).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "ERROR");
    assert_eq!(server.node.fundings().await.len(), 1);
}

#[tokio::test]
async fn channel_callback_rejects_unknown_k1_and_bad_node_id() {
    let server = server().await;

    let unknown = format!(
        "/lnurl-channel-request?k1={}&remote_id={}&amount=100000",
        "00".repeat(32),
        wallet_node_id()
    );
    let (status, _) = get_json(&server.app, &unknown).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, document) = get_json(&server.app, "/lnurl2").await;
    let bad_node = format!(
        "/lnurl-channel-request?k1={}&remote_id=nothex&amount=100000",
        document["k1"].as_str().unwrap()
    );
    let (status, body) = get_json(&server.app, &bad_node).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "ERROR");
    assert!(server.node.fundings().await.is_empty());
}

#[tokio::test]
async fn withdraw_flow_gets_invoice_paid() {
    let server = server().await;
    let wallet = wallet();
    let client = LnurlClient::new(
        client_config(&[]),
        RouterTransport::new(server.app.clone()),
        wallet.clone(),
    );

    let outcome = client
        .run_withdraw_flow("http://lnurl.test/lnurl-withdraw", 50_000)
        .await
        .unwrap();

    assert_eq!(server.node.payments().await, vec![outcome.invoice.clone()]);
    let decoded = wallet.decode_invoice(&outcome.invoice).await.unwrap();
    assert_eq!(decoded.amount_msat, Some(50_000));
    assert_eq!(decoded.description.as_deref(), Some("Withdrawal: x"));
}

#[tokio::test]
async fn withdraw_above_maximum_is_refused_locally() {
    let server = server().await;
    let wallet = wallet();
    let client = LnurlClient::new(
        client_config(&[]),
        RouterTransport::new(server.app.clone()),
        wallet.clone(),
    );

    let err = client
        .run_withdraw_flow("http://lnurl.test/lnurl-withdraw", 200_000)
        .await
        .unwrap_err();
    assert!(matches!(err, LnurlError::Bounds(_)));
    assert!(server.node.payments().await.is_empty());
}

async fn k1_from(app: &Router, document_path: &str) -> String {
    let (_, document) = get_json(app, document_path).await;
    document["k1"].as_str().unwrap().to_string()
}

async fn wallet_invoice(wallet: &MockNode, amount_msat: u64) -> String {
    wallet
        .create_invoice(InvoiceRequest {
            amount_msat,
            label: format!("withdraw-{amount_msat}"),
            description: InvoiceDescription::Direct("withdraw".into()),
        })
        .await
        .unwrap()
        .bolt11
}

async fn assert_withdraw_refused(server: &Server, k1: &str, pr: &str) {
    let callback = format!("/lnurl-withdraw/callback?k1={k1}&pr={pr}");
    let (status, body) = get_json(&server.app, &callback).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "ERROR");
    assert!(body["reason"].is_string());
}

#[tokio::test]
async fn withdraw_callback_k1_is_single_use() {
    let server = server().await;
    let wallet = wallet();
    let k1 = k1_from(&server.app, "/lnurl-withdraw").await;

    let first = wallet_invoice(&wallet, 50_000).await;
    let callback = format!("/lnurl-withdraw/callback?k1={k1}&pr={first}");
    let (status, body) = get_json(&server.app, &callback).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert_eq!(server.node.payments().await, vec![first]);

    let second = wallet_invoice(&wallet, 60_000).await;
    assert_withdraw_refused(&server, &k1, &second).await;
    assert_eq!(server.node.payments().await.len(), 1);
}

#[tokio::test]
async fn withdraw_callback_rejects_channel_k1() {
    let server = server().await;
    let k1 = k1_from(&server.app, "/lnurl2").await;
    let pr = wallet_invoice(&wallet(), 50_000).await;

    assert_withdraw_refused(&server, &k1, &pr).await;
    assert!(server.node.payments().await.is_empty());
}

#[tokio::test]
async fn withdraw_callback_rejects_invoice_above_maximum() {
    let server = server().await;
    let k1 = k1_from(&server.app, "/lnurl-withdraw").await;
    let pr = wallet_invoice(&wallet(), 200_000).await;

    assert_withdraw_refused(&server, &k1, &pr).await;
    assert!(server.node.payments().await.is_empty());
}

#[tokio::test]
async fn withdraw_callback_rejects_amountless_invoice() {
    let server = server().await;
    let k1 = k1_from(&server.app, "/lnurl-withdraw").await;
    let pr = MockNode::amountless_invoice("withdraw").unwrap();

    assert_withdraw_refused(&server, &k1, &pr).await;
    assert!(server.node.payments().await.is_empty());
}

#[tokio::test]
async fn static_flow_returns_published_document() {
    let server = server().await;
    let transport = RouterTransport::new(server.app.clone());
    let client = LnurlClient::new(client_config(&[]), transport.clone(), wallet());

    let document = client.run_static_flow("Alice@lnurl.test").await.unwrap();
    assert_eq!(document, alice_document());
    assert_eq!(
        transport.requests(),
        vec!["http://lnurl.test/.well-known/lnurlp/alice".to_string()]
    );

    let err = client.run_static_flow("bob@lnurl.test").await.unwrap_err();
    assert!(matches!(err, LnurlError::Callback(reason) if reason == "unknown user"));

    let err = client.run_static_flow("not-an-address").await.unwrap_err();
    assert!(matches!(err, LnurlError::Protocol(_)));
}

#[tokio::test]
async fn lightning_address_can_be_paid() {
    let server = server().await;
    let wallet = wallet();
    let client = LnurlClient::new(
        client_config(&[]),
        RouterTransport::new(server.app.clone()),
        wallet.clone(),
    );

    let outcome = client.pay_address("alice@lnurl.test", 7_000).await.unwrap();
    assert!(outcome.payment.is_complete());
    assert_eq!(wallet.payments().await.len(), 1);
}

#[tokio::test]
async fn auth_error_body_is_reported() {
    let app = Router::new().route(
        "/lnurl-auth",
        get(|| async { Json(json!({ "status": "ERROR", "reason": "bad signature" })) }),
    );
    let client = LnurlClient::new(client_config(&[]), RouterTransport::new(app), wallet());

    let err = client
        .run_auth_flow("http://lnurl.test/lnurl-auth")
        .await
        .unwrap_err();
    assert!(matches!(err, LnurlError::Callback(reason) if reason == "bad signature"));
}

#[tokio::test]
async fn gift_card_code_is_stable_across_polls() {
    let server = server().await;
    server.node.add_channel(&wallet_node_id(), true).await;

    let (status, order) = get_json(&server.app, "/api/create_invoice/25").await;
    assert_eq!(status, StatusCode::OK);
    let payment_hash = order["payment_hash"].as_str().unwrap().to_string();
    let decoded = server
        .node
        .decode_invoice(order["payment_request"].as_str().unwrap())
        .await
        .unwrap();
    assert_eq!(decoded.amount_msat, Some(25_000_000));

    let check = format!("/api/check_payment/{payment_hash}");
    let (_, unpaid) = get_json(&server.app, &check).await;
    assert_eq!(unpaid["paid"], false);
    assert!(unpaid.get("gift_code").is_none());

    assert!(server.node.mark_paid(&payment_hash).await);
    let (_, first) = get_json(&server.app, &check).await;
    let (_, second) = get_json(&server.app, &check).await;
    assert_eq!(first["paid"], true);
    assert!(first["gift_code"].as_str().unwrap().starts_with("GIFT-"));
    assert_eq!(first["gift_code"], second["gift_code"]);
}

#[tokio::test]
async fn gift_card_requires_active_channel_and_known_price() {
    let server = server().await;

    let (status, body) = get_json(&server.app, "/api/create_invoice/25").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());

    server.node.add_channel(&wallet_node_id(), true).await;
    let (status, body) = get_json(&server.app, "/api/create_invoice/30").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid amount");
}

#[tokio::test]
async fn wallet_routes_proxy_orders_and_pay() {
    let server = server().await;
    server.node.add_channel(&wallet_node_id(), true).await;
    let wallet = wallet();
    let client = LnurlClient::new(
        client_config(&["--client-node-id", &wallet_node_id()]),
        RouterTransport::new(server.app.clone()),
        wallet.clone(),
    );
    let app = routes::router(routes::ClientState {
        client: Arc::new(client),
    });

    let (status, order) = get_json(&app, "/generate_invoice/50").await;
    assert_eq!(status, StatusCode::OK);
    let bolt11 = order["payment_request"].as_str().unwrap();

    let (status, paid) = get_json(&app, &format!("/pay_invoice/{bolt11}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["status"], "success");
    assert_eq!(wallet.payments().await, vec![bolt11.to_string()]);

    let (status, _) = get_json(
        &app,
        &format!("/check_payment/{}", order["payment_hash"].as_str().unwrap()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn wallet_refuses_to_pay_from_wrong_node() {
    let server = server().await;
    let client = LnurlClient::new(
        client_config(&["--client-node-id", &server_node_id()]),
        RouterTransport::new(server.app.clone()),
        wallet(),
    );
    let app = routes::router(routes::ClientState {
        client: Arc::new(client),
    });

    let (status, body) = get_json(&app, "/pay_invoice/lnmock100").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("misconfigured"));
}

#[tokio::test]
async fn wallet_routes_keep_path_input_in_one_segment() {
    let server = server().await;
    let transport = RouterTransport::new(server.app.clone());
    let client = LnurlClient::new(client_config(&[]), transport.clone(), wallet());
    let app = routes::router(routes::ClientState {
        client: Arc::new(client),
    });

    get_raw(&app, "/check_payment/abc%3Fx=1").await;
    get_raw(&app, "/generate_invoice/25%2F..%2Fcheck_payment%2Fabc").await;

    assert_eq!(
        transport.requests(),
        vec![
            "http://lnurl.test/api/check_payment/abc%3Fx=1".to_string(),
            "http://lnurl.test/api/create_invoice/25%2F..%2Fcheck_payment%2Fabc".to_string(),
        ]
    );
}
