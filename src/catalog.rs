//! Static resource catalog: one `Resource` contract per entity type. The
//! router derives the whole HTTP surface from this table.

use crate::resource::{CascadeRule, DerivedSum, EnumField, Reference, Resource};

pub static USER: Resource = Resource {
    name: "user",
    collection: "users",
    required: &["firstName", "lastName", "email", "password"],
    enums: &[],
    unique: &["email"],
    references: &[],
    email_fields: &["email"],
    now_defaults: &[],
    derived: &[],
    cascades: &[
        CascadeRule { collection: "wallets", foreign_key: "user" },
        CascadeRule { collection: "accounts", foreign_key: "user" },
        CascadeRule { collection: "budgets", foreign_key: "user" },
        CascadeRule { collection: "categories", foreign_key: "user" },
        CascadeRule { collection: "transactions", foreign_key: "user" },
        CascadeRule { collection: "events", foreign_key: "user" },
        CascadeRule { collection: "messages", foreign_key: "user" },
    ],
    allowed_updates: &["firstName", "lastName", "email", "password"],
    allowed_query_params: &[],
};

pub static WALLET: Resource = Resource {
    name: "wallet",
    collection: "wallets",
    required: &["name", "balance", "user"],
    enums: &[EnumField {
        field: "type",
        values: &[
            "checking",
            "savings",
            "investment",
            "cash",
            "loan",
            "credit",
            "other",
        ],
        default: Some("other"),
    }],
    unique: &[],
    references: &[Reference { field: "user", collection: "users" }],
    email_fields: &[],
    now_defaults: &[],
    derived: &[],
    cascades: &[],
    allowed_updates: &["name", "balance", "type"],
    allowed_query_params: &["user"],
};

/// Unlike a wallet, an account stores no balance: it is derived from the
/// transactions pointing at it on every read.
pub static ACCOUNT: Resource = Resource {
    name: "account",
    collection: "accounts",
    required: &["name", "user"],
    enums: &[EnumField {
        field: "type",
        values: &[
            "cash",
            "checking",
            "savings",
            "investment",
            "credit",
            "loan",
            "property",
            "other",
        ],
        default: Some("other"),
    }],
    unique: &[],
    references: &[Reference { field: "user", collection: "users" }],
    email_fields: &[],
    now_defaults: &[],
    derived: &[DerivedSum {
        field: "balance",
        collection: "transactions",
        foreign_key: "account",
        sum_field: "amount",
    }],
    cascades: &[CascadeRule { collection: "transactions", foreign_key: "account" }],
    allowed_updates: &["name", "type"],
    allowed_query_params: &["user"],
};

pub static CATEGORY: Resource = Resource {
    name: "category",
    collection: "categories",
    required: &["name", "user"],
    enums: &[EnumField {
        field: "parent",
        values: &[
            "root",
            "auto-transport",
            "bills-utilities",
            "business-services",
            "education",
            "entertainment",
            "financial",
            "food-dining",
            "gifts-donations",
            "fees-charges",
            "home",
            "income",
            "investments",
            "health-fitness",
            "loans",
            "misc-expenses",
            "kids",
            "shopping",
            "personal-care",
            "pets",
            "taxes",
            "transfer",
            "travel",
            "uncategorized",
        ],
        default: None,
    }],
    unique: &["alias"],
    references: &[Reference { field: "user", collection: "users" }],
    email_fields: &[],
    now_defaults: &[],
    derived: &[],
    cascades: &[],
    allowed_updates: &["name", "alias", "parent"],
    allowed_query_params: &["user"],
};

pub static BUDGET: Resource = Resource {
    name: "budget",
    collection: "budgets",
    required: &["name", "amount", "start_date", "end_date", "user"],
    enums: &[],
    unique: &[],
    references: &[
        Reference { field: "user", collection: "users" },
        Reference { field: "category", collection: "categories" },
    ],
    email_fields: &[],
    now_defaults: &[],
    derived: &[],
    cascades: &[],
    allowed_updates: &["name", "amount", "start_date", "end_date", "category"],
    allowed_query_params: &["user"],
};

pub static TRANSACTION: Resource = Resource {
    name: "transaction",
    collection: "transactions",
    required: &["amount", "type", "user"],
    enums: &[EnumField {
        field: "type",
        values: &["income", "expense", "transfer", "adjustment", "other"],
        default: None,
    }],
    unique: &[],
    references: &[
        Reference { field: "user", collection: "users" },
        Reference { field: "account", collection: "accounts" },
        Reference { field: "wallet", collection: "wallets" },
        Reference { field: "category", collection: "categories" },
    ],
    email_fields: &[],
    now_defaults: &["date"],
    derived: &[],
    cascades: &[],
    allowed_updates: &[
        "amount",
        "description",
        "date",
        "type",
        "account",
        "wallet",
        "category",
    ],
    allowed_query_params: &["user", "account", "type"],
};

pub static EVENT: Resource = Resource {
    name: "event",
    collection: "events",
    required: &["day", "month", "year", "tag", "user"],
    enums: &[EnumField {
        field: "type",
        values: &["success", "error", "default"],
        default: Some("default"),
    }],
    unique: &[],
    references: &[Reference { field: "user", collection: "users" }],
    email_fields: &[],
    now_defaults: &[],
    derived: &[],
    cascades: &[],
    allowed_updates: &["year", "month", "day", "tag", "type"],
    allowed_query_params: &["user"],
};

/// Messages are write-once feedback: no update route.
pub static MESSAGE: Resource = Resource {
    name: "message",
    collection: "messages",
    required: &["message", "type", "user"],
    enums: &[EnumField {
        field: "type",
        values: &["help", "bug", "suggestion", "other", "feedback"],
        default: None,
    }],
    unique: &[],
    references: &[Reference { field: "user", collection: "users" }],
    email_fields: &[],
    now_defaults: &[],
    derived: &[],
    cascades: &[],
    allowed_updates: &[],
    allowed_query_params: &["user"],
};

static ALL: [&Resource; 8] = [
    &USER, &WALLET, &ACCOUNT, &CATEGORY, &BUDGET, &TRANSACTION, &EVENT, &MESSAGE,
];

pub fn all() -> &'static [&'static Resource] {
    &ALL
}

/// True when some other resource holds a foreign key into `resource`,
/// which is what earns it nested `/:id/:child` read routes.
pub fn is_referenced(resource: &Resource) -> bool {
    all().iter().any(|other| {
        other
            .references
            .iter()
            .any(|reference| reference.collection == resource.collection)
    })
}

/// Resolve a nested child collection: the child must exist and carry a
/// foreign key into the owner's collection. Returns the child resource and
/// the foreign-key field to filter on.
pub fn child_of(
    owner: &Resource,
    child_collection: &str,
) -> Option<(&'static Resource, &'static str)> {
    all().iter().find_map(|candidate| {
        if candidate.collection != child_collection {
            return None;
        }
        candidate
            .references
            .iter()
            .find(|reference| reference.collection == owner.collection)
            .map(|reference| (*candidate, reference.field))
    })
}
