use std::fs::File;
use std::sync::Arc;

use chrono::Utc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use warung_pos::{
    auth::MemoryIdentity,
    config::AppConfig,
    dto::products::ProductForm,
    services::{
        auth_service::AuthService,
        cart_service::CartService,
        catalog_service::CatalogService,
        checkout_service, export_service,
        report_service::{ReportRange, ReportService},
    },
    session::SessionManager,
    state::AppState,
    store::MemoryStore,
};

// Composition root standing in for the UI shell: wires the in-memory
// backends, signs in, and runs one full cashier day against the services.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,warung_pos=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let state = AppState {
        store: Arc::new(MemoryStore::new()),
        identity: Arc::new(MemoryIdentity::new()),
    };

    let auth = AuthService::new(Arc::clone(&state.identity));
    let catalog = CatalogService::new();
    let cart = Arc::new(CartService::new());
    let session = SessionManager::new(state.clone(), Arc::clone(&catalog), Arc::clone(&cart));
    let driver = session.spawn(auth.watch_state());

    auth.register("kasir@warung.test", "rahasia123").await?;
    // The driver task reacts to the auth stream as well; starting the
    // session here just makes the scripted flow below deterministic.
    if let Some(user_id) = auth.current_user() {
        session.on_session_start(&user_id);
    }

    if config.seed_demo_data {
        let seeded = seed_catalog(&state, &catalog).await?;
        // Wait for the live mirror to catch up with the seeded catalog.
        let mut mirror = catalog.watch_products();
        while catalog.products().len() < seeded {
            if !mirror.changed().await {
                break;
            }
        }
    }
    tracing::info!(products = catalog.products().len(), "catalog ready");

    let products = catalog.products();
    if products.len() < 3 {
        anyhow::bail!("demo flow needs a seeded catalog; set WARUNG_SEED_DEMO=true");
    }

    // Ring up a sale: two instant noodles, one bottled tea.
    let noodles = &products[0];
    let tea = &products[1];
    cart.add_to_cart(noodles);
    cart.add_to_cart(noodles);
    cart.add_to_cart(tea);
    tracing::info!(total = %cart.total_amount(), lines = cart.items().len(), "cart ready");

    let receipt = checkout_service::checkout(&state, &cart.items(), cart.total_amount()).await?;
    cart.clear();
    tracing::info!(receipt_id = %receipt.id, "sale recorded");

    // A second sale that the customer changes their mind about.
    let coffee = &products[2];
    cart.add_to_cart(coffee);
    let cancelled = checkout_service::checkout(&state, &cart.items(), cart.total_amount()).await?;
    cart.clear();
    checkout_service::cancel_transaction(&state, &cancelled).await?;

    // The transaction feed settles on exactly one remaining sale.
    let mut history = session.watch_transactions();
    while session.transactions().len() != 1 {
        if !history.changed().await {
            break;
        }
    }

    let today = Utc::now().date_naive();
    let reports = ReportService::new();
    let report = reports.generate(&session.transactions(), &ReportRange::new(today, today));
    tracing::info!(
        revenue = %report.total_revenue,
        transactions = report.transaction_count,
        best_seller = ?report.best_selling_products.first(),
        "daily report"
    );

    let file = File::create(&config.export_path)?;
    export_service::export_csv(file, &session.transactions())?;
    tracing::info!(path = %config.export_path, "history exported");

    auth.logout().await;
    while !session.transactions().is_empty() {
        if !history.changed().await {
            break;
        }
    }
    driver.abort();

    Ok(())
}

async fn seed_catalog(state: &AppState, catalog: &CatalogService) -> anyhow::Result<usize> {
    let products = vec![
        ("Indomie Goreng", "3500", "120"),
        ("Teh Botol Sosro", "5000", "80"),
        ("Kopi Kapal Api Sachet", "2000", "200"),
        ("Sabun Lifebuoy", "4500", "40"),
    ];
    let count = products.len();

    for (name, price, stock) in products {
        catalog
            .add_product(
                state,
                &ProductForm {
                    name: name.to_string(),
                    price: price.to_string(),
                    stock: stock.to_string(),
                },
            )
            .await?;
    }

    tracing::info!(count, "seeded demo catalog");
    Ok(count)
}
