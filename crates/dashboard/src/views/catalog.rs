//! Product catalog manager.
//!
//! Keeps a local mirror of the seller's products. Mutations patch the mirror
//! only after the backend accepts them; while a call is in flight the entry
//! only carries its [`ProductPhase`]. A new product is staged as
//! [`ProductPhase::Creating`] under a time-derived id and dropped again if the
//! backend refuses it. When the backend returns no id the entry keeps that id,
//! tagged [`RecordOrigin::Provisional`], until the next [`ProductCatalog::load`].
//!
//! Rows are published on a [`watch`] channel after every change so a renderer
//! can follow operations that are still in flight.

use tokio::sync::watch;
use tracing::instrument;

use seller_dashboard_core::{
    Price, Product, ProductDraft, ProductId, ProductPhase, RecordOrigin,
};

use crate::api::{ApiError, SellerApi};
use crate::error::{DashboardError, Notice, NoticeContext};
use crate::scope::{BusyFlag, ViewScope};

/// Outcome of the last list fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogLoad {
    /// Not fetched yet.
    #[default]
    Idle,
    /// Fetch in flight.
    Loading,
    /// Fetched; the list is the seller's full catalog (possibly empty).
    Ready,
    /// Fetch failed; the list is empty but that says nothing about the
    /// catalog.
    Failed,
}

/// A product in the local mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub product: Product,
    pub origin: RecordOrigin,
    pub phase: ProductPhase,
}

impl CatalogEntry {
    fn listed(product: Product, origin: RecordOrigin) -> Self {
        Self {
            product,
            origin,
            phase: ProductPhase::Listed,
        }
    }

    fn staged(product: Product) -> Self {
        Self {
            product,
            origin: RecordOrigin::Provisional,
            phase: ProductPhase::Creating,
        }
    }

    fn move_to(&mut self, next: ProductPhase) -> Result<(), DashboardError> {
        if !self.phase.can_transition_to(Some(next)) {
            return Err(DashboardError::InvalidTransition {
                id: self.product.id.clone(),
                from: self.phase,
                to: next,
            });
        }
        self.phase = next;
        Ok(())
    }

    /// Undo a mutation that did not go through.
    const fn revert(&mut self) {
        self.phase = ProductPhase::Listed;
    }
}

/// Raw text of the create/edit dialog.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductForm {
    pub name: String,
    pub price: String,
    pub description: String,
}

impl ProductForm {
    /// Parse the form into a draft.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::InvalidInput` for a blank name or an
    /// unparseable price.
    pub fn to_draft(&self) -> Result<ProductDraft, DashboardError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DashboardError::InvalidInput("Informe o nome do produto.".to_owned()));
        }
        Ok(ProductDraft {
            name: name.to_owned(),
            price: Price::parse(&self.price)?,
            description: self.description.trim().to_owned(),
        })
    }

    fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price.to_input(),
            description: product.description.clone(),
        }
    }
}

/// What the dialog is doing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormMode {
    #[default]
    Closed,
    Creating,
    Editing(ProductId),
}

/// A product formatted for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRow {
    pub id: ProductId,
    pub name: String,
    pub price: String,
    pub description: String,
    pub provisional: bool,
    pub phase: ProductPhase,
}

/// List + create/edit/delete flow for the seller's products.
#[derive(Debug)]
pub struct ProductCatalog {
    api: SellerApi,
    scope: ViewScope,
    entries: Vec<CatalogEntry>,
    load: CatalogLoad,
    form: ProductForm,
    mode: FormMode,
    busy: BusyFlag,
    rows: watch::Sender<Vec<ProductRow>>,
}

impl ProductCatalog {
    /// Mount an empty catalog. Call [`Self::load`] to fetch products.
    #[must_use]
    pub fn new(api: SellerApi, scope: ViewScope) -> Self {
        Self {
            api,
            scope,
            entries: Vec::new(),
            load: CatalogLoad::Idle,
            form: ProductForm::default(),
            mode: FormMode::Closed,
            busy: BusyFlag::new(),
            rows: watch::channel(Vec::new()).0,
        }
    }

    /// Outcome of the last list fetch.
    #[must_use]
    pub const fn load_state(&self) -> CatalogLoad {
        self.load
    }

    /// Entries in display order.
    #[must_use]
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Look up an entry by id.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| &e.product.id == id)
    }

    /// Products formatted for display, price as `R$ 0.00`.
    #[must_use]
    pub fn display_rows(&self) -> Vec<ProductRow> {
        self.entries
            .iter()
            .map(|e| ProductRow {
                id: e.product.id.clone(),
                name: e.product.name.clone(),
                price: e.product.price.to_string(),
                description: e.product.description.clone(),
                provisional: e.origin.is_provisional(),
                phase: e.phase,
            })
            .collect()
    }

    /// Receiver of [`Self::display_rows`], refreshed after every change.
    #[must_use]
    pub fn watch_rows(&self) -> watch::Receiver<Vec<ProductRow>> {
        self.rows.subscribe()
    }

    /// Handle for observing whether an operation is in flight.
    #[must_use]
    pub fn busy_flag(&self) -> BusyFlag {
        self.busy.clone()
    }

    /// The dialog's current text.
    #[must_use]
    pub const fn form(&self) -> &ProductForm {
        &self.form
    }

    /// Edit the dialog's text.
    pub const fn form_mut(&mut self) -> &mut ProductForm {
        &mut self.form
    }

    /// What the dialog is doing.
    #[must_use]
    pub const fn mode(&self) -> &FormMode {
        &self.mode
    }

    /// Open an empty dialog for a new product.
    pub fn begin_create(&mut self) {
        self.form = ProductForm::default();
        self.mode = FormMode::Creating;
    }

    /// Open the dialog prefilled with an existing product.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::NotFound` if the id is not in the mirror.
    pub fn begin_edit(&mut self, id: &ProductId) -> Result<(), DashboardError> {
        let entry = self
            .get(id)
            .ok_or_else(|| DashboardError::NotFound(id.clone()))?;
        self.form = ProductForm::from_product(&entry.product);
        self.mode = FormMode::Editing(id.clone());
        Ok(())
    }

    /// Close the dialog and reset its text.
    pub fn cancel_form(&mut self) {
        self.form = ProductForm::default();
        self.mode = FormMode::Closed;
    }

    /// Fetch the seller's full catalog, replacing the mirror.
    ///
    /// On failure the mirror is emptied and the load state is
    /// [`CatalogLoad::Failed`].
    ///
    /// # Errors
    ///
    /// Returns the API failure. A cancelled fetch leaves the catalog as it
    /// was.
    #[instrument(skip(self))]
    pub async fn load(&mut self) -> Result<usize, DashboardError> {
        let _busy = self.busy.enter().ok_or(DashboardError::Busy)?;
        let previous = self.load;
        self.load = CatalogLoad::Loading;

        match self.scope.run(self.api.list_products()).await {
            Ok(products) => {
                self.entries = products
                    .into_iter()
                    .map(|p| CatalogEntry::listed(p, RecordOrigin::Confirmed))
                    .collect();
                self.load = CatalogLoad::Ready;
                self.publish();
                tracing::debug!(count = self.entries.len(), "catalog loaded");
                Ok(self.entries.len())
            }
            Err(ApiError::Cancelled) => {
                self.load = previous;
                Err(ApiError::Cancelled.into())
            }
            Err(e) => {
                self.entries.clear();
                self.load = CatalogLoad::Failed;
                self.publish();
                Err(e.into())
            }
        }
    }

    /// Submit the dialog: create when opened with [`Self::begin_create`] (or
    /// not opened at all), update when opened with [`Self::begin_edit`].
    ///
    /// The dialog closes and resets once the call finishes, whatever the
    /// outcome. Input errors are reported before anything is sent and leave
    /// the dialog open.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::InvalidInput`, `DashboardError::Busy`,
    /// `DashboardError::NotFound` (edited product vanished),
    /// `DashboardError::InvalidTransition` (product still being created or
    /// deleted), or the API failure.
    pub async fn submit(&mut self) -> Result<Notice, DashboardError> {
        let draft = self.form.to_draft()?;
        let _busy = self.busy.enter().ok_or(DashboardError::Busy)?;

        let result = match self.mode.clone() {
            FormMode::Editing(id) => self.update(&id, &draft).await,
            FormMode::Creating | FormMode::Closed => self.create(draft).await,
        };

        if !matches!(&result, Err(e) if e.is_cancelled()) {
            self.cancel_form();
        }
        result
    }

    /// Delete a product by id.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Busy`, `DashboardError::NotFound`,
    /// `DashboardError::InvalidTransition`, or the API failure; the product
    /// stays listed on failure.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete(&mut self, id: &ProductId) -> Result<Notice, DashboardError> {
        let _busy = self.busy.enter().ok_or(DashboardError::Busy)?;
        self.transition(id, ProductPhase::Deleting)?;
        self.publish();

        match self.scope.run(self.api.delete_product(id)).await {
            Ok(()) => {
                self.entries.retain(|e| &e.product.id != id);
                self.publish();
                tracing::info!(product_id = %id, "product deleted");
                Ok(NoticeContext::ProductDelete.success())
            }
            Err(e) => {
                self.revert(id);
                Err(e.into())
            }
        }
    }

    #[instrument(skip(self, draft), fields(name = %draft.name))]
    async fn create(&mut self, draft: ProductDraft) -> Result<Notice, DashboardError> {
        let provisional = self.provisional_id();
        let product = draft.into_product(provisional.clone());
        self.entries.push(CatalogEntry::staged(product.clone()));
        self.publish();

        let assigned = match self.scope.run(self.api.create_product(&product)).await {
            Ok(assigned) => assigned,
            Err(err) => {
                self.entries.retain(|e| e.product.id != provisional);
                self.publish();
                return Err(err.into());
            }
        };

        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.product.id == provisional)
            .ok_or_else(|| DashboardError::NotFound(provisional.clone()))?;
        if let Some(id) = assigned {
            entry.product.id = id;
            entry.origin = RecordOrigin::Confirmed;
        } else {
            tracing::debug!(
                product_id = %provisional,
                "backend returned no id, keeping provisional id until next load"
            );
        }
        entry.move_to(ProductPhase::Listed)?;
        let id = entry.product.id.clone();
        self.publish();

        tracing::info!(product_id = %id, "product created");
        Ok(NoticeContext::ProductCreate.success())
    }

    #[instrument(skip(self, draft), fields(product_id = %id))]
    async fn update(
        &mut self,
        id: &ProductId,
        draft: &ProductDraft,
    ) -> Result<Notice, DashboardError> {
        self.transition(id, ProductPhase::Editing)?;
        self.publish();
        let payload = draft.clone().into_product(id.clone());

        match self.scope.run(self.api.update_product(&payload)).await {
            Ok(()) => {
                if let Some(entry) = self.entries.iter_mut().find(|e| &e.product.id == id) {
                    entry.product.apply(draft);
                    entry.move_to(ProductPhase::Listed)?;
                }
                self.publish();
                tracing::info!(product_id = %id, "product updated");
                Ok(NoticeContext::ProductUpdate.success())
            }
            Err(e) => {
                self.revert(id);
                Err(e.into())
            }
        }
    }

    fn transition(&mut self, id: &ProductId, next: ProductPhase) -> Result<(), DashboardError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| &e.product.id == id)
            .ok_or_else(|| DashboardError::NotFound(id.clone()))?;
        entry.move_to(next)
    }

    fn revert(&mut self, id: &ProductId) {
        if let Some(entry) = self.entries.iter_mut().find(|e| &e.product.id == id) {
            entry.revert();
        }
        self.publish();
    }

    fn publish(&self) {
        self.rows.send_replace(self.display_rows());
    }

    /// Millisecond timestamp, bumped past any id already in the mirror.
    fn provisional_id(&self) -> ProductId {
        let mut millis = chrono::Utc::now().timestamp_millis();
        loop {
            let candidate = ProductId::provisional(millis);
            if self.get(&candidate).is_none() {
                return candidate;
            }
            millis += 1;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;

    fn catalog() -> ProductCatalog {
        let api =
            SellerApi::new(DashboardConfig::new("http://127.0.0.1:9", "/tmp/unused").unwrap())
                .unwrap();
        ProductCatalog::new(api, ViewScope::new())
    }

    fn product(id: &str, name: &str, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_owned(),
            price: Price::from_cents(cents),
            description: String::new(),
        }
    }

    #[test]
    fn test_form_to_draft() {
        let form = ProductForm {
            name: "  Botijão P13 ".to_owned(),
            price: "95.00".to_owned(),
            description: "13 kg".to_owned(),
        };
        let draft = form.to_draft().unwrap();
        assert_eq!(draft.name, "Botijão P13");
        assert_eq!(draft.price.to_string(), "R$ 95.00");
    }

    #[test]
    fn test_form_rejects_bad_input() {
        let blank_name = ProductForm {
            price: "10".to_owned(),
            ..ProductForm::default()
        };
        assert!(matches!(
            blank_name.to_draft(),
            Err(DashboardError::InvalidInput(_))
        ));

        let bad_price = ProductForm {
            name: "Água".to_owned(),
            price: "dez".to_owned(),
            ..ProductForm::default()
        };
        assert!(matches!(
            bad_price.to_draft(),
            Err(DashboardError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_begin_edit_prefills_form() {
        let mut catalog = catalog();
        catalog.entries.push(CatalogEntry::listed(
            product("p1", "P45", 42_000),
            RecordOrigin::Confirmed,
        ));

        catalog.begin_edit(&ProductId::new("p1")).unwrap();
        assert_eq!(catalog.form().price, "420");
        assert_eq!(catalog.mode(), &FormMode::Editing(ProductId::new("p1")));

        catalog.cancel_form();
        assert_eq!(catalog.mode(), &FormMode::Closed);
        assert_eq!(catalog.form(), &ProductForm::default());
    }

    #[test]
    fn test_begin_edit_unknown_id() {
        let mut catalog = catalog();
        assert!(matches!(
            catalog.begin_edit(&ProductId::new("nope")),
            Err(DashboardError::NotFound(_))
        ));
    }

    #[test]
    fn test_provisional_id_avoids_collisions() {
        let mut catalog = catalog();
        let first = catalog.provisional_id();
        catalog.entries.push(CatalogEntry::listed(
            product(first.as_str(), "x", 1),
            RecordOrigin::Provisional,
        ));
        let second = catalog.provisional_id();
        assert_ne!(first, second);
    }

    #[test]
    fn test_display_rows_format_price() {
        let mut catalog = catalog();
        catalog.entries.push(CatalogEntry::listed(
            product("p1", "P13", 9500),
            RecordOrigin::Provisional,
        ));
        let rows = catalog.display_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].price, "R$ 95.00");
        assert!(rows[0].provisional);
    }

    #[tokio::test]
    async fn test_failed_load_is_distinct_from_empty() {
        let mut catalog = catalog();
        catalog.entries.push(CatalogEntry::listed(
            product("stale", "old", 1),
            RecordOrigin::Confirmed,
        ));

        assert!(catalog.load().await.is_err());
        assert_eq!(catalog.load_state(), CatalogLoad::Failed);
        assert!(catalog.entries().is_empty());
        assert!(!catalog.busy_flag().is_busy());
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_product_listed() {
        let mut catalog = catalog();
        catalog.entries.push(CatalogEntry::listed(
            product("p1", "P13", 9500),
            RecordOrigin::Confirmed,
        ));

        assert!(catalog.delete(&ProductId::new("p1")).await.is_err());
        let entry = catalog.get(&ProductId::new("p1")).unwrap();
        assert_eq!(entry.phase, ProductPhase::Listed);
    }

    #[tokio::test]
    async fn test_failed_create_drops_staged_entry() {
        let mut catalog = catalog();
        let rows = catalog.watch_rows();
        catalog.begin_create();
        catalog.form_mut().name = "P13".to_owned();
        catalog.form_mut().price = "95".to_owned();

        assert!(matches!(catalog.submit().await, Err(DashboardError::Api(_))));
        assert!(catalog.entries().is_empty());
        assert!(rows.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_entry_still_being_created_cannot_be_edited() {
        let mut catalog = catalog();
        catalog
            .entries
            .push(CatalogEntry::staged(product("p1", "P13", 9500)));
        let id = ProductId::new("p1");

        catalog.begin_edit(&id).unwrap();
        catalog.form_mut().price = "99".to_owned();
        let err = catalog.submit().await.unwrap_err();

        assert!(matches!(
            err,
            DashboardError::InvalidTransition {
                from: ProductPhase::Creating,
                to: ProductPhase::Editing,
                ..
            }
        ));
        let entry = catalog.get(&id).unwrap();
        assert_eq!(entry.phase, ProductPhase::Creating);
        assert_eq!(entry.product.price, Price::from_cents(9500));
    }

    #[tokio::test]
    async fn test_entry_being_deleted_cannot_be_deleted_again() {
        let mut catalog = catalog();
        let mut entry = CatalogEntry::listed(product("p1", "P13", 9500), RecordOrigin::Confirmed);
        entry.move_to(ProductPhase::Deleting).unwrap();
        catalog.entries.push(entry);

        let err = catalog.delete(&ProductId::new("p1")).await.unwrap_err();
        assert!(matches!(err, DashboardError::InvalidTransition { .. }));
        assert!(!catalog.busy_flag().is_busy());
    }

    #[test]
    fn test_move_to_rejects_illegal_phase() {
        let mut entry = CatalogEntry::listed(product("p1", "P13", 9500), RecordOrigin::Confirmed);
        assert!(entry.move_to(ProductPhase::Listed).is_err());
        assert!(entry.move_to(ProductPhase::Creating).is_err());
        assert_eq!(entry.phase, ProductPhase::Listed);

        entry.move_to(ProductPhase::Editing).unwrap();
        entry.move_to(ProductPhase::Listed).unwrap();
    }

    #[tokio::test]
    async fn test_invalid_input_sends_nothing_and_keeps_dialog() {
        let mut catalog = catalog();
        catalog.begin_create();
        catalog.form_mut().name = "P13".to_owned();
        catalog.form_mut().price = "caro".to_owned();

        assert!(matches!(
            catalog.submit().await,
            Err(DashboardError::InvalidInput(_))
        ));
        assert_eq!(catalog.mode(), &FormMode::Creating);
        assert_eq!(catalog.form().name, "P13");
    }
}
