//! Cascade rules engine: explicit hook points replacing what the schema
//! layer used to do implicitly. Reads pass through [`enrich`] to pick up
//! derived values; deletes pass through [`cascade_delete`] before the owning
//! record is removed.

use serde_json::{Number, Value};
use tracing::{debug, warn};

use crate::resource::Resource;
use crate::store::{Document, DocumentStore, StoreError};

/// Sum a numeric field across documents. Stays integral as long as every
/// contributing amount is integral, so a whole-number balance serializes
/// without a fractional part.
fn sum_field(docs: &[Document], field: &str) -> Value {
    let mut int_sum: i64 = 0;
    let mut float_sum = 0.0_f64;
    let mut is_float = false;
    for doc in docs {
        let Some(Value::Number(n)) = doc.get(field) else {
            continue;
        };
        match (is_float, n.as_i64()) {
            (false, Some(i)) => match int_sum.checked_add(i) {
                Some(sum) => int_sum = sum,
                // Integer overflow spills the running total into the float
                // path instead of panicking.
                None => {
                    is_float = true;
                    float_sum = int_sum as f64 + i as f64;
                }
            },
            _ => {
                if !is_float {
                    is_float = true;
                    float_sum = int_sum as f64;
                }
                float_sum += n.as_f64().unwrap_or(0.0);
            }
        }
    }
    if is_float {
        Number::from_f64(float_sum)
            .map(Value::Number)
            .unwrap_or_else(|| Value::from(0))
    } else {
        Value::from(int_sum)
    }
}

/// On-read hook: attach every derived field to `doc`. The computed value is
/// part of the response, never of the stored document.
pub async fn enrich(
    resource: &Resource,
    store: &dyn DocumentStore,
    doc: &mut Document,
) -> Result<(), StoreError> {
    let Some(id) = doc.get("id").cloned() else {
        return Ok(());
    };
    for derived in resource.derived {
        let related = store
            .find(
                derived.collection,
                &[(derived.foreign_key.to_string(), id.clone())],
            )
            .await?;
        let value = sum_field(&related, derived.sum_field);
        debug!(
            resource = resource.name,
            field = derived.field,
            related = related.len(),
            "computed derived field"
        );
        doc.insert(derived.field.to_string(), value);
    }
    Ok(())
}

/// Batch variant of [`enrich`] for list and find responses.
pub async fn enrich_all(
    resource: &Resource,
    store: &dyn DocumentStore,
    docs: &mut [Document],
) -> Result<(), StoreError> {
    if resource.derived.is_empty() {
        return Ok(());
    }
    for doc in docs.iter_mut() {
        enrich(resource, store, doc).await?;
    }
    Ok(())
}

/// Pre-delete hook: remove every dependent record referencing `id`. Runs
/// dependent collections sequentially; the first failure aborts the whole
/// delete so the owner is never removed while dependents remain. One level
/// deep only, since no dependent has dependents of its own.
pub async fn cascade_delete(
    resource: &Resource,
    store: &dyn DocumentStore,
    id: &str,
) -> Result<(), StoreError> {
    for rule in resource.cascades {
        let removed = store
            .delete_many(
                rule.collection,
                &[(rule.foreign_key.to_string(), Value::String(id.to_string()))],
            )
            .await
            .inspect_err(|err| {
                warn!(
                    resource = resource.name,
                    id,
                    dependent = rule.collection,
                    %err,
                    "cascade step failed, aborting delete"
                );
            })?;
        if removed > 0 {
            debug!(
                resource = resource.name,
                id,
                dependent = rule.collection,
                removed,
                "cascade removed dependents"
            );
        }
    }
    Ok(())
}
