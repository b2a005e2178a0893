//! Product catalog commands.

use seller_dashboard::views::ProductCatalog;
use seller_dashboard::{Dashboard, Route, error::NoticeContext};
use seller_dashboard_core::ProductId;

use super::CliError;

/// Mount the catalog and fetch the seller's products.
async fn open_catalog(dashboard: &Dashboard) -> Result<ProductCatalog, CliError> {
    let (_shell, scope) = super::mount(dashboard, Route::Products).await?;
    let mut catalog = dashboard.catalog(scope)?;
    catalog
        .load()
        .await
        .map_err(|e| CliError::action(NoticeContext::ProductList, "list products", e))?;
    Ok(catalog)
}

/// Print every product.
///
/// # Errors
///
/// Returns `CliError::NotSignedIn` without a session, or the generic notice
/// if the list cannot be fetched.
pub async fn list(dashboard: &Dashboard) -> Result<(), CliError> {
    let catalog = open_catalog(dashboard).await?;
    let rows = catalog.display_rows();

    if rows.is_empty() {
        tracing::info!("No products yet. Add one with `seller products create`.");
        return Ok(());
    }
    for row in rows {
        tracing::info!("[{}] {} - {}", row.id, row.name, row.price);
        if !row.description.is_empty() {
            tracing::info!("    {}", row.description);
        }
    }
    Ok(())
}

/// Add a product.
///
/// # Errors
///
/// Returns `CliError::NotSignedIn` without a session, or the create notice
/// when the input is invalid or the backend rejects it.
pub async fn create(
    dashboard: &Dashboard,
    name: String,
    price: String,
    description: String,
) -> Result<(), CliError> {
    let mut catalog = open_catalog(dashboard).await?;

    catalog.begin_create();
    let form = catalog.form_mut();
    form.name = name;
    form.price = price;
    form.description = description;

    let notice = catalog
        .submit()
        .await
        .map_err(|e| CliError::action(NoticeContext::ProductCreate, "create product", e))?;
    tracing::info!("{notice}");
    if let Some(entry) = catalog.entries().last() {
        tracing::info!("[{}] {} - {}", entry.product.id, entry.product.name, entry.product.price);
    }
    Ok(())
}

/// Change a product; fields left out keep their current value.
///
/// # Errors
///
/// Returns `CliError::NotSignedIn` without a session, or the update notice
/// when the product is unknown, the input is invalid or the backend rejects
/// it.
pub async fn update(
    dashboard: &Dashboard,
    id: &str,
    name: Option<String>,
    price: Option<String>,
    description: Option<String>,
) -> Result<(), CliError> {
    let mut catalog = open_catalog(dashboard).await?;
    let id = ProductId::new(id);

    catalog
        .begin_edit(&id)
        .map_err(|e| CliError::action(NoticeContext::ProductUpdate, "update product", e))?;
    let form = catalog.form_mut();
    if let Some(name) = name {
        form.name = name;
    }
    if let Some(price) = price {
        form.price = price;
    }
    if let Some(description) = description {
        form.description = description;
    }

    let notice = catalog
        .submit()
        .await
        .map_err(|e| CliError::action(NoticeContext::ProductUpdate, "update product", e))?;
    tracing::info!("{notice}");
    Ok(())
}

/// Remove a product.
///
/// # Errors
///
/// Returns `CliError::NotSignedIn` without a session, or the delete notice
/// when the product is unknown or the backend rejects it.
pub async fn delete(dashboard: &Dashboard, id: &str) -> Result<(), CliError> {
    let mut catalog = open_catalog(dashboard).await?;

    let notice = catalog
        .delete(&ProductId::new(id))
        .await
        .map_err(|e| CliError::action(NoticeContext::ProductDelete, "delete product", e))?;
    tracing::info!("{notice}");
    Ok(())
}
