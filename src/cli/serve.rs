use std::sync::Arc;

use crate::config::{AppConfig, SheetsConfig, parse_bind};
use crate::store::memory::MemoryStore;
use crate::submission::SubmissionHandler;

pub async fn serve(bind: &str, sheet: &str, in_memory: bool) -> anyhow::Result<()> {
    let sheets = if in_memory {
        None
    } else {
        Some(SheetsConfig::from_env()?)
    };
    let config = AppConfig::new(sheets, parse_bind(bind)?).with_sheet_name(sheet);

    let handler = if config.sheets.is_none() {
        tracing::warn!("Using the in-memory store; applications are lost on shutdown");
        let store = MemoryStore::new().with_sheet(&config.sheet_name);
        SubmissionHandler::new(Arc::new(store), config.sheet_name.clone())
    } else {
        SubmissionHandler::from_config(&config)?
    };

    crate::server::serve(config.bind, Arc::new(handler)).await
}
