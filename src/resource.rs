use chrono::Utc;
use serde_json::Value;
use validator::ValidateEmail;

use crate::store::Document;

/// Enumerated field: a closed value set, optionally substituted with a
/// default when the field is absent.
#[derive(Debug, Clone, Copy)]
pub struct EnumField {
    pub field: &'static str,
    pub values: &'static [&'static str],
    pub default: Option<&'static str>,
}

/// Foreign-key field naming the collection it points into. Existence of the
/// target is not checked at write time; the link is maintained only by
/// cascade deletion.
#[derive(Debug, Clone, Copy)]
pub struct Reference {
    pub field: &'static str,
    pub collection: &'static str,
}

/// Read-time derived field: the sum of `sum_field` over every document in
/// `collection` whose `foreign_key` equals the owning document's id.
#[derive(Debug, Clone, Copy)]
pub struct DerivedSum {
    pub field: &'static str,
    pub collection: &'static str,
    pub foreign_key: &'static str,
    pub sum_field: &'static str,
}

/// Dependent collection emptied before the owning document is deleted.
#[derive(Debug, Clone, Copy)]
pub struct CascadeRule {
    pub collection: &'static str,
    pub foreign_key: &'static str,
}

/// Static structural contract for one resource type. Consumed by the CRUD
/// handler factory, the query filter handler and the cascade engine; carries
/// the resource name explicitly so error messages never rely on reflection.
#[derive(Debug)]
pub struct Resource {
    /// Singular lowercase name used in messages ("Invalid wallet ID").
    pub name: &'static str,
    /// Collection name, which is also the route mount ("/wallets").
    pub collection: &'static str,
    pub required: &'static [&'static str],
    pub enums: &'static [EnumField],
    /// Fields that may not collide across documents. Optional fields are
    /// only checked when present.
    pub unique: &'static [&'static str],
    pub references: &'static [Reference],
    /// Fields validated as email addresses when present.
    pub email_fields: &'static [&'static str],
    /// Fields defaulted to the current UTC timestamp when absent.
    pub now_defaults: &'static [&'static str],
    pub derived: &'static [DerivedSum],
    pub cascades: &'static [CascadeRule],
    /// PATCH allow-list; empty means the resource has no update route.
    pub allowed_updates: &'static [&'static str],
    /// `/find` query allow-list; empty means the resource has no find route.
    pub allowed_query_params: &'static [&'static str],
}

/// Missing, null or empty-string all count as "not provided".
fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

impl Resource {
    /// Capitalized name for validation messages ("Wallet validation failed").
    pub fn display_name(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Substitute enum and timestamp defaults for absent fields.
    pub fn apply_defaults(&self, doc: &mut Document) {
        for rule in self.enums {
            if let Some(default) = rule.default {
                if is_blank(doc.get(rule.field)) {
                    doc.insert(rule.field.to_string(), Value::String(default.to_string()));
                }
            }
        }
        for field in self.now_defaults {
            if is_blank(doc.get(*field)) {
                doc.insert(field.to_string(), Value::String(Utc::now().to_rfc3339()));
            }
        }
    }

    /// Every violated path, in schema order. Empty means the document is
    /// structurally valid.
    pub fn violations(&self, doc: &Document) -> Vec<String> {
        let mut violations = Vec::new();
        for field in self.required {
            if is_blank(doc.get(*field)) {
                violations.push(format!("{field}: Path `{field}` is required."));
            }
        }
        for rule in self.enums {
            let Some(value) = doc.get(rule.field) else {
                continue;
            };
            // Non-string values cast to their textual rendering, which never
            // sits in a string-only value set.
            let rendered = match value {
                Value::Null => continue,
                Value::String(s) if s.is_empty() => continue,
                Value::String(s) if rule.values.contains(&s.as_str()) => continue,
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            violations.push(format!(
                "{}: `{}` is not a valid enum value for path `{}`.",
                rule.field, rendered, rule.field
            ));
        }
        violations
    }

    /// Aggregated validation message in the shape clients already depend on.
    pub fn validation_message(&self, violations: &[String]) -> String {
        format!(
            "{} validation failed: {}",
            self.display_name(),
            violations.join(", ")
        )
    }

    /// Email-format check for the fields that want one. Returns the first
    /// offending field, if any. An absent field is left to the required-field
    /// check instead.
    pub fn invalid_email_field(&self, doc: &Document) -> Option<&'static str> {
        self.email_fields.iter().copied().find(|field| {
            matches!(doc.get(*field), Some(Value::String(s)) if !s.validate_email())
        })
    }
}
