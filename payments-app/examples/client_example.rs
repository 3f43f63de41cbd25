//! Client example demonstrating credit, debit and lookup against a running server.
//!
//! Starts a stand-in payment provider and the payments server on local ports,
//! then drives the server through the client SDK.
//!
//! Run with: cargo run -p payments-app --example client_example

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use rust_decimal_macros::dec;
use tokio::net::TcpListener;

use payments_client::PaymentsClient;
use payments_hex::{PaymentService, ReconciliationService, ServiceSettings, inbound::HttpServer};
use payments_provider::HttpPaymentProvider;
use payments_store::{Seed, build_store};
use payments_types::{AccountId, PaymentRequest, ProviderPayment, UserId};

type Ledger = Arc<Mutex<HashMap<String, ProviderPayment>>>;

async fn provider_pay(
    State(ledger): State<Ledger>,
    Json(payment): Json<ProviderPayment>,
) -> Json<ProviderPayment> {
    ledger
        .lock()
        .unwrap()
        .insert(payment.reference.clone(), payment.clone());
    Json(payment)
}

async fn provider_get(
    State(ledger): State<Ledger>,
    Path(reference): Path<String>,
) -> Result<Json<ProviderPayment>, StatusCode> {
    ledger
        .lock()
        .unwrap()
        .get(&reference)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn spawn_provider() -> anyhow::Result<SocketAddr> {
    let app = Router::new()
        .route("/payments", post(provider_pay))
        .route("/payments/{reference}", get(provider_get))
        .with_state(Ledger::default());
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(addr)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt().with_env_filter("info").init();

    let provider_addr = spawn_provider().await?;

    // Find an available port
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr: SocketAddr = listener.local_addr()?;
    let port = addr.port();
    drop(listener);

    println!("🚀 Starting server on port {port}...");
    println!("   Provider: http://{provider_addr}");

    let store = build_store("memory://").await?;
    store
        .seed(&Seed::from_json(
            r#"{
                "users": [{ "id": "usr-001", "name": "Ada" }],
                "accounts": [{ "account_id": "acc_001", "balance": 1 }]
            }"#,
        )?)
        .await?;
    let provider = HttpPaymentProvider::new(format!("http://{provider_addr}"));

    let server = HttpServer::new(
        PaymentService::new(store.clone(), provider.clone(), ServiceSettings::default()),
        ReconciliationService::new(store, provider),
    );
    let bind = format!("127.0.0.1:{port}");
    let server_handle = tokio::spawn(async move { server.run(&bind).await });

    tokio::time::sleep(std::time::Duration::from_millis(500)).await;

    let client = PaymentsClient::new(format!("http://127.0.0.1:{port}"));

    println!("\n🏥 Checking API...");
    println!("   Up: {}", client.health().await?);

    let mut request = PaymentRequest {
        user_id: UserId::new("usr-001"),
        account_id: AccountId::new("acc_001"),
        reference: "ref-001".to_string(),
        amount: dec!(10),
    };

    println!("\n💰 Crediting 10...");
    client.credit(&request).await?;
    println!("   ✅ Credited");

    println!("\n💸 Debiting 25 (more than the balance)...");
    request.reference = "ref-002".to_string();
    request.amount = dec!(25);
    match client.debit(&request).await {
        Ok(()) => println!("   ⚠️  Unexpectedly accepted"),
        Err(e) => println!("   ✅ Rejected: {e}"),
    }

    println!("\n💸 Debiting 0.50...");
    request.amount = dec!(0.50);
    client.debit(&request).await?;
    println!("   ✅ Debited");

    println!("\n🔎 Looking up ref-001...");
    let report = client.lookup("ref-001").await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    server_handle.abort();
    println!("\n✨ Done");
    Ok(())
}
