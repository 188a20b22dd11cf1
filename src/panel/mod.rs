//! Generic admin panel controller.
//!
//! One [`Panel`] replaces the per-resource list/form screens: it owns the
//! fetched collection, the view state and a log of user-facing notices, and
//! talks to its resource through a [`DataSource`].
//!
//! Every successful create, update or delete refetches the whole collection
//! and returns to page 1. A failure leaves both the collection and the view
//! untouched and is reported once as an error notice.

use serde::Serialize;

use crate::client::{ClientError, DataSource, Upload};
use crate::listview::{list_view, ListPage, ListQuery, Record, SortKey, ViewState};
use crate::resources::ResourceConfig;

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient notification for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

pub struct Panel<D> {
    source: D,
    config: ResourceConfig,
    records: Vec<Record>,
    view: ViewState,
    notices: Vec<Notice>,
}

impl<D: DataSource> Panel<D> {
    pub fn new(source: D, config: ResourceConfig) -> Self {
        let view = ViewState {
            sort_key: config.default_sort.clone(),
            ..ViewState::default()
        };
        Self {
            source,
            config,
            records: Vec::new(),
            view,
            notices: Vec::new(),
        }
    }

    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    pub fn source(&self) -> &D {
        &self.source
    }

    /// The full collection as last fetched.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Drain pending notices once they have been shown.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Fetch the collection, replacing whatever was loaded.
    pub async fn load(&mut self) -> Result<(), ClientError> {
        match self.source.list().await {
            Ok(records) => {
                tracing::debug!(resource = self.config.name, count = records.len(), "collection loaded");
                self.records = records;
                self.clamp_page();
                Ok(())
            }
            Err(e) => Err(self.fail("load", e)),
        }
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.view.search_term = term.into();
        self.view.current_page = 1;
    }

    pub fn set_sort(&mut self, key: SortKey) {
        self.view.sort_key = key;
        self.view.current_page = 1;
    }

    /// Go to a page, clamped to the pages the current filter produces.
    pub fn set_page(&mut self, page: usize) {
        self.view.current_page = page;
        self.clamp_page();
    }

    /// The visible page for the current view state.
    pub fn view(&self) -> ListPage<'_> {
        list_view(
            &self.records,
            &ListQuery::from_view(&self.view, self.config.search_fields, self.config.page_size),
        )
    }

    pub async fn create(&mut self, fields: Record, files: Vec<Upload>) -> Result<Record, ClientError> {
        if let Some(field) = self.config.missing_field(&fields) {
            let error = ClientError::Validation(format!("{} is required", field));
            return Err(self.fail("create", error));
        }

        match self.source.create(fields, files).await {
            Ok(record) => {
                self.after_mutation(format!("{} added", self.config.label)).await;
                Ok(record)
            }
            Err(e) => Err(self.fail("create", e)),
        }
    }

    pub async fn update(&mut self, id: &str, fields: Record, files: Vec<Upload>) -> Result<Record, ClientError> {
        match self.source.update(id, fields, files).await {
            Ok(record) => {
                self.after_mutation(format!("{} updated", self.config.label)).await;
                Ok(record)
            }
            Err(e) => Err(self.fail("update", e)),
        }
    }

    pub async fn remove(&mut self, id: &str) -> Result<(), ClientError> {
        match self.source.remove(id).await {
            Ok(()) => {
                self.after_mutation(format!("{} deleted", self.config.label)).await;
                Ok(())
            }
            Err(e) => Err(self.fail("delete", e)),
        }
    }

    /// Refetch and go back to page 1.
    ///
    /// The mutation already succeeded, so a failed refetch only adds an
    /// error notice and keeps the stale collection.
    async fn after_mutation(&mut self, message: String) {
        self.notices.push(Notice::success(message));
        self.view.current_page = 1;
        // load() reports its own failure
        self.load().await.ok();
    }

    fn clamp_page(&mut self) {
        self.view.current_page = self.view().effective_page;
    }

    fn fail(&mut self, operation: &str, error: ClientError) -> ClientError {
        tracing::warn!(resource = self.config.name, operation, "{}", error);
        self.notices.push(Notice::error(error.message()));
        error
    }
}
