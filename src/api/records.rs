//! Record API endpoints, shared by every resource.

use axum::extract::{rejection::QueryRejection, Path, Query, State};
use serde::{Deserialize, Serialize};

use super::{resource, success, ApiResult, Submission};
use crate::errors::AppError;
use crate::listview::{list_view, ListPage, ListQuery, Record, SortKey};
use crate::resources::ResourceConfig;
use crate::AppState;

/// Upper bound for a requested page size.
const MAX_PAGE_SIZE: usize = 100;

/// Query parameters of the server-side list view.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewQuery {
    /// Free-text search term.
    #[serde(default)]
    pub q: String,
    /// Sort key such as `newest:createdAt`; the resource default when absent.
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default)]
    pub page_size: Option<usize>,
}

fn default_page() -> usize {
    1
}

/// Owned variant of [`ListPage`] for responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewResponse {
    pub page_items: Vec<Record>,
    pub total_pages: usize,
    pub total_count: usize,
    pub effective_page: usize,
    pub page_size: usize,
    pub sort: String,
}

impl ViewResponse {
    fn new(page: ListPage<'_>, page_size: usize, sort: &SortKey) -> Self {
        Self {
            page_items: page.page_items.into_iter().cloned().collect(),
            total_pages: page.total_pages,
            total_count: page.total_count,
            effective_page: page.effective_page,
            page_size,
            sort: sort.to_string(),
        }
    }
}

/// GET /api/resources - List the resource catalogue.
pub async fn list_resources(State(state): State<AppState>) -> ApiResult<Vec<ResourceConfig>> {
    success(state.resources.iter().cloned().collect())
}

/// GET /api/:resource - List all records of a resource.
pub async fn list_records(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Vec<Record>> {
    let config = resource(&state, &name)?;
    success(state.repo.list(config.name).await?)
}

/// GET /api/:resource/view - Search, sort and paginate a resource.
pub async fn view_records(
    State(state): State<AppState>,
    Path(name): Path<String>,
    query: Result<Query<ViewQuery>, QueryRejection>,
) -> ApiResult<ViewResponse> {
    let config = resource(&state, &name)?;
    let Query(params) = query?;

    let sort = match params.sort.as_deref() {
        Some(raw) => raw.parse::<SortKey>().map_err(AppError::BadRequest)?,
        None => config.default_sort.clone(),
    };
    let page_size = params
        .page_size
        .unwrap_or(config.page_size)
        .clamp(1, MAX_PAGE_SIZE);

    let records = state.repo.list(config.name).await?;
    let page = list_view(
        &records,
        &ListQuery {
            search_term: &params.q,
            search_fields: config.search_fields,
            sort: &sort,
            page: params.page,
            page_size,
        },
    );

    success(ViewResponse::new(page, page_size, &sort))
}

/// GET /api/:resource/:id - Get a single record.
pub async fn get_record(
    State(state): State<AppState>,
    Path((name, id)): Path<(String, String)>,
) -> ApiResult<Record> {
    let config = resource(&state, &name)?;
    match state.repo.get(config.name, &id).await? {
        Some(record) => success(record),
        None => Err(AppError::NotFound(format!("Record {} not found in {}", id, name))),
    }
}

/// POST /api/:resource - Create a record from JSON or form data.
pub async fn create_record(
    State(state): State<AppState>,
    Path(name): Path<String>,
    submission: Submission,
) -> ApiResult<Record> {
    let config = resource(&state, &name)?;

    if let Some(field) = config.missing_field(&submission.fields) {
        return Err(AppError::Validation(format!("{} is required", field)));
    }

    let fields = submission.into_record(config, &state.uploads).await?;
    let record = state.repo.create(config.name, fields).await?;
    tracing::info!(resource = config.name, id = ?record.get("id"), "record created");
    success(record)
}

/// PUT /api/:resource/:id - Merge changes into a record.
pub async fn update_record(
    State(state): State<AppState>,
    Path((name, id)): Path<(String, String)>,
    submission: Submission,
) -> ApiResult<Record> {
    let config = resource(&state, &name)?;

    // Reject before storing any upload
    if state.repo.get(config.name, &id).await?.is_none() {
        return Err(AppError::NotFound(format!("Record {} not found in {}", id, name)));
    }

    let fields = submission.into_record(config, &state.uploads).await?;
    let record = state.repo.update(config.name, &id, fields).await?;
    tracing::info!(resource = config.name, id = %id, "record updated");
    success(record)
}

/// DELETE /api/:resource/:id - Delete a record.
pub async fn delete_record(
    State(state): State<AppState>,
    Path((name, id)): Path<(String, String)>,
) -> ApiResult<()> {
    let config = resource(&state, &name)?;
    state.repo.delete(config.name, &id).await?;
    tracing::info!(resource = config.name, id = %id, "record deleted");
    success(())
}
