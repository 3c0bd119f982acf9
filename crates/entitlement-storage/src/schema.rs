//! Table definitions, one const per schema version.

/// v1: one JSON document per user.
pub const ENTITLEMENT_TABLES_V1: &str = "
CREATE TABLE IF NOT EXISTS entitlement_records (
    user_id    TEXT PRIMARY KEY,
    record     TEXT NOT NULL,
    updated_at INTEGER NOT NULL
) STRICT;
";
