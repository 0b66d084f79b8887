//! Generic CRUD handler factory. [`resource_routes`] turns one static
//! [`Resource`] contract into a mounted sub-router with list, fetch, create,
//! partial-update, delete, query-filter and nested-children handlers. The
//! handlers never know which entity they serve beyond the contract given to
//! them through an `Extension`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::{Extension, Router};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::{debug, info, instrument, trace, warn};
use uuid::Uuid;

use crate::cascade;
use crate::catalog;
use crate::error::ApiError;
use crate::resource::Resource;
use crate::schemas::{AppState, MessageResponse};
use crate::store::Document;

/// Build the route table for one resource. Routes are only registered where
/// the contract calls for them: no `/find` without a query allow-list, no
/// PATCH with an empty update allow-list, nested reads only for resources
/// some other resource points at.
pub fn resource_routes(resource: &'static Resource) -> Router<AppState> {
    let mut router = Router::new().route("/", get(list).post(create));
    if !resource.allowed_query_params.is_empty() {
        router = router.route("/find", get(find));
    }
    let mut item_routes = get(fetch).delete(remove);
    if !resource.allowed_updates.is_empty() {
        item_routes = item_routes.patch(update);
    }
    router = router.route("/:id", item_routes);
    if catalog::is_referenced(resource) {
        router = router.route("/:id/:child", get(children));
    }
    router.layer(Extension(resource))
}

/// Malformed-id check, always ahead of any lookup.
fn parse_id(resource: &Resource, id: &str) -> Result<(), ApiError> {
    Uuid::parse_str(id).map_err(|_| {
        warn!(resource = resource.name, id, "malformed id");
        ApiError::InvalidId(resource.name)
    })?;
    Ok(())
}

fn body_object(body: Value) -> Document {
    match body {
        Value::Object(map) => map,
        // Anything else validates like an empty submission.
        _ => Map::new(),
    }
}

/// Reject duplicates on unique fields. Optional unique fields (category
/// alias) are only checked when present; `exclude_id` keeps an update from
/// colliding with the record itself.
async fn check_unique(
    resource: &Resource,
    state: &AppState,
    doc: &Document,
    exclude_id: Option<&str>,
) -> Result<(), ApiError> {
    for field in resource.unique.iter().copied() {
        let Some(value) = doc.get(field) else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        let hits = state
            .store
            .find(resource.collection, &[(field.to_string(), value.clone())])
            .await?;
        let collides = hits.iter().any(|hit| {
            hit.get("id").and_then(Value::as_str) != exclude_id
        });
        if collides {
            warn!(resource = resource.name, field, "uniqueness violation");
            return Err(ApiError::Duplicate(field));
        }
    }
    Ok(())
}

/// Structural validation shared by create and update: email format first,
/// ahead of the aggregated required/enum violations.
fn validate(resource: &Resource, doc: &Document) -> Result<(), ApiError> {
    if resource.invalid_email_field(doc).is_some() {
        return Err(ApiError::InvalidEmail);
    }
    let violations = resource.violations(doc);
    if !violations.is_empty() {
        debug!(
            resource = resource.name,
            count = violations.len(),
            "validation failed"
        );
        return Err(ApiError::Validation(
            resource.validation_message(&violations),
        ));
    }
    Ok(())
}

/// GET / — every record, enriched with derived fields. An empty collection
/// is an empty array, not an error.
#[instrument(skip(state))]
pub async fn list(
    Extension(resource): Extension<&'static Resource>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Document>>, ApiError> {
    trace!("listing {}", resource.collection);
    let mut docs = state.store.find(resource.collection, &[]).await?;
    cascade::enrich_all(resource, state.store.as_ref(), &mut docs).await?;
    debug!(resource = resource.name, count = docs.len(), "listed");
    Ok(Json(docs))
}

/// GET /:id — malformed id beats missing record, missing record beats
/// everything else.
#[instrument(skip(state))]
pub async fn fetch(
    Extension(resource): Extension<&'static Resource>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Document>, ApiError> {
    parse_id(resource, &id)?;
    let mut doc = state
        .store
        .find_by_id(resource.collection, &id)
        .await?
        .ok_or(ApiError::NotFound(resource.name))?;
    cascade::enrich(resource, state.store.as_ref(), &mut doc).await?;
    Ok(Json(doc))
}

/// POST / — defaults, aggregated validation, uniqueness, then insert.
#[instrument(skip(state, body))]
pub async fn create(
    Extension(resource): Extension<&'static Resource>,
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Document>), ApiError> {
    let mut doc = body_object(body);
    resource.apply_defaults(&mut doc);
    validate(resource, &doc)?;
    check_unique(resource, &state, &doc, None).await?;

    let stored = state.store.insert(resource.collection, doc).await?;
    let stored_id = stored.get("id").and_then(Value::as_str);
    info!(resource = resource.name, id = stored_id, "created");
    Ok((StatusCode::CREATED, Json(stored)))
}

/// PATCH /:id — all-or-nothing: one disallowed or null-valued key rejects
/// the whole request before anything is applied.
#[instrument(skip(state, body))]
pub async fn update(
    Extension(resource): Extension<&'static Resource>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Document>, ApiError> {
    parse_id(resource, &id)?;
    let mut doc = state
        .store
        .find_by_id(resource.collection, &id)
        .await?
        .ok_or(ApiError::NotFound(resource.name))?;

    let updates = body_object(body);
    let invalid: Vec<String> = updates
        .iter()
        .filter(|(key, value)| {
            !resource.allowed_updates.contains(&key.as_str()) || value.is_null()
        })
        .map(|(key, _)| key.clone())
        .collect();
    if !invalid.is_empty() {
        warn!(resource = resource.name, %id, ?invalid, "rejected update");
        return Err(ApiError::InvalidUpdates(invalid));
    }

    for (key, value) in updates {
        doc.insert(key, value);
    }
    validate(resource, &doc)?;
    check_unique(resource, &state, &doc, Some(&id)).await?;

    let saved = state.store.save(resource.collection, &id, doc).await?;
    info!(resource = resource.name, %id, "updated");
    Ok(Json(saved))
}

/// DELETE /:id — cascade to dependents first; if any cascade step fails the
/// owner stays put and the step's error is surfaced.
#[instrument(skip(state))]
pub async fn remove(
    Extension(resource): Extension<&'static Resource>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    parse_id(resource, &id)?;
    state
        .store
        .find_by_id(resource.collection, &id)
        .await?
        .ok_or(ApiError::NotFound(resource.name))?;

    cascade::cascade_delete(resource, state.store.as_ref(), &id).await?;
    state.store.delete(resource.collection, &id).await?;
    info!(resource = resource.name, %id, "deleted");
    Ok(Json(MessageResponse {
        message: format!("Deleted {}", resource.name),
    }))
}

/// GET /find — equality filters from the allow-list, ANDed; `unique` asks
/// for at most one match.
#[instrument(skip(state))]
pub async fn find(
    Extension(resource): Extension<&'static Resource>,
    State(state): State<AppState>,
    Query(mut params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let unique = params.remove("unique").is_some();
    if params
        .keys()
        .any(|key| !resource.allowed_query_params.contains(&key.as_str()))
    {
        warn!(resource = resource.name, ?params, "disallowed query parameter");
        return Err(ApiError::InvalidQuery(resource.allowed_query_params));
    }

    let filters: Vec<(String, Value)> = params
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect();
    let mut docs = state.store.find(resource.collection, &filters).await?;
    cascade::enrich_all(resource, state.store.as_ref(), &mut docs).await?;

    if unique {
        return match docs.len() {
            0 => Ok(Json(Value::Null)),
            1 => Ok(Json(Value::Object(docs.remove(0)))),
            _ => {
                warn!(resource = resource.name, count = docs.len(), "unique filter matched several");
                Err(ApiError::DuplicateValues)
            }
        };
    }
    Ok(Json(Value::Array(docs.into_iter().map(Value::Object).collect())))
}

/// GET /:id/:child — records in the child collection referencing this
/// owner. Deliberately no existence check on the owner id: an unknown owner
/// simply owns nothing.
#[instrument(skip(state))]
pub async fn children(
    Extension(resource): Extension<&'static Resource>,
    State(state): State<AppState>,
    Path((id, child)): Path<(String, String)>,
) -> Result<Json<Vec<Document>>, ApiError> {
    let (child_resource, foreign_key) =
        catalog::child_of(resource, &child).ok_or(ApiError::UnknownChild)?;
    let mut docs = state
        .store
        .find(
            child_resource.collection,
            &[(foreign_key.to_string(), Value::String(id.clone()))],
        )
        .await?;
    cascade::enrich_all(child_resource, state.store.as_ref(), &mut docs).await?;
    debug!(
        owner = resource.name,
        child = child_resource.name,
        count = docs.len(),
        "nested read"
    );
    Ok(Json(docs))
}
