pub mod models;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::store::google::GoogleSheetsStore;
use crate::store::{CellRange, SheetStore};

pub use models::{ApplicationPayload, ApplicationRecord, EMAIL_COLUMN};

/// Checks an application against the sheet's email column and appends it if unseen.
///
/// The check and the append are two separate store calls. Two submissions carrying the
/// same new email can both pass the check before either appends, so uniqueness is
/// best-effort only.
pub struct SubmissionHandler {
    store: Arc<dyn SheetStore>,
    sheet_name: String,
}

impl SubmissionHandler {
    pub fn new(store: Arc<dyn SheetStore>, sheet_name: impl Into<String>) -> Self {
        Self {
            store,
            sheet_name: sheet_name.into(),
        }
    }

    /// Build a handler backed by Google Sheets. Fails without touching the network when
    /// credentials are absent.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let sheets = config.sheets.as_ref().ok_or_else(|| {
            AppError::Config("Missing Google Sheets environment variables".to_string())
        })?;
        let store = GoogleSheetsStore::new(sheets)?;
        Ok(Self::new(Arc::new(store), config.sheet_name.clone()))
    }

    pub fn store_name(&self) -> &str {
        self.store.name()
    }

    /// `<sheet>!F2:F`: every email below the header row.
    pub fn email_range(&self) -> CellRange {
        CellRange::column_from(&self.sheet_name, EMAIL_COLUMN, 1)
    }

    pub fn append_range(&self) -> CellRange {
        CellRange::anchor(&self.sheet_name)
    }

    #[tracing::instrument(name = "submit_application", skip(self, payload), fields(email = %payload.email))]
    pub async fn submit(&self, payload: ApplicationPayload) -> Result<ApplicationRecord, AppError> {
        let existing = self
            .store
            .read_range(&self.email_range())
            .await
            .inspect_err(|e| tracing::error!("Store error ({}): {e}", self.store.name()))?;
        if existing.iter().flatten().any(|email| *email == payload.email) {
            tracing::warn!("Rejected duplicate application");
            return Err(AppError::DuplicateEmail);
        }

        let record = ApplicationRecord::new(payload);
        self.store
            .append_rows(&self.append_range(), &[record.to_row()])
            .await
            .inspect_err(|e| tracing::error!("Store error ({}): {e}", self.store.name()))?;

        tracing::info!(application_id = %record.application_id, "Application recorded");
        Ok(record)
    }
}
