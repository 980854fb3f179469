use axum::extract::{Extension, Path, State};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::{require_user, ApiJson, ApiResponse, ApiResult};
use crate::server::AppState;
use crate::store::{resolve, DatasetDocument, Identity, Record};

/// GET /api/shortcuts - the caller's full dataset.
///
/// Anonymous callers see the demo dataset read-only; clients get the empty
/// shape. The identity-to-dataset binding is recomputed on every request.
pub async fn shortcuts_get(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<DatasetDocument> {
    let selection = resolve(&identity);
    let doc = state.store.read_all(selection.dataset).await?;
    Ok(ApiResponse::success(doc))
}

/// POST /api/shortcuts/:type - create a record in one collection
pub async fn shortcuts_post(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    Extension(identity): Extension<Identity>,
    ApiJson(payload): ApiJson<Value>,
) -> ApiResult<Record> {
    require_user(&identity)?;
    let selection = resolve(&identity);
    let fields = as_record(payload)?;

    let record = state
        .store
        .create(selection.dataset, &collection, fields, selection.can_write)
        .await?;
    Ok(ApiResponse::success(record))
}

/// PUT /api/shortcuts/:type/:id - merge fields into an existing record
pub async fn shortcuts_put(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
    Extension(identity): Extension<Identity>,
    ApiJson(payload): ApiJson<Value>,
) -> ApiResult<Record> {
    require_user(&identity)?;
    let selection = resolve(&identity);
    let fields = as_record(payload)?;

    let record = state
        .store
        .update(selection.dataset, &collection, &id, fields, selection.can_write)
        .await?;
    Ok(ApiResponse::success(record))
}

/// DELETE /api/shortcuts/:type/:id - remove a record
pub async fn shortcuts_delete(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Value> {
    require_user(&identity)?;
    let selection = resolve(&identity);

    state
        .store
        .delete(selection.dataset, &collection, &id, selection.can_write)
        .await?;
    Ok(ApiResponse::success(json!({ "id": id })))
}

fn as_record(payload: Value) -> Result<Record, ApiError> {
    match payload {
        Value::Object(map) => Ok(map),
        _ => Err(ApiError::bad_request("Request body must be a JSON object")),
    }
}
