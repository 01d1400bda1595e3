//! Headless storefront session: hydrate the cart, load the catalog, report.

use anyhow::Context;
use storefront_cart::CartPersistence;
use storefront_catalog::{HttpCatalogSource, LoadOutcome};
use storefront_client::{Storefront, StorefrontConfig};
use storefront_core::format_amount;
use storefront_storage::SqliteSlot;

// Sync main: SqliteSlot blocks on its own runtime and must not be driven from
// inside another one.
fn main() -> anyhow::Result<()> {
    storefront_observability::init();

    let config = StorefrontConfig::from_env()?;
    tracing::info!(
        catalog_url = %config.catalog_url,
        cart_key = %config.cart_key,
        state_db = %config.state_db.display(),
        "storefront configured"
    );

    let slot = SqliteSlot::open(&config.state_db)?;
    let persistence = CartPersistence::with_key(slot, config.cart_key.clone());
    let storefront = Storefront::new(HttpCatalogSource::new(config.catalog_url.clone()), persistence);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build runtime for catalog load")?;

    match runtime.block_on(storefront.load_catalog()) {
        LoadOutcome::Applied { count } => {
            tracing::info!(count, categories = ?storefront.catalog().categories(), "catalog ready");
        }
        LoadOutcome::Failed(err) => {
            tracing::warn!(error = %err, "catalog unavailable; cart still usable");
        }
        LoadOutcome::Superseded => {}
    }

    for line in storefront.cart().lines() {
        tracing::info!(
            product_id = %line.product.id,
            title = %line.product.title,
            qty = line.qty,
            line_total = %format_amount(line.total()),
            "cart line"
        );
    }

    tracing::info!(
        badge = storefront.cart_badge(),
        total = %format_amount(storefront.cart().total_price()),
        "cart summary"
    );

    Ok(())
}
