//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode. UUIDs are stored as
//! strings; enums are stored as strings with ASSERT constraints.
//! Access-control lists are arrays of `{ level, group_id }` objects.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Groups
-- Soft-deleted groups are purged by the retention sweeper.
-- =======================================================================
DEFINE TABLE user_group SCHEMAFULL;
DEFINE FIELD context ON TABLE user_group TYPE string \
    ASSERT $value IN ['api', 'course', 'lesson'];
DEFINE FIELD modus ON TABLE user_group TYPE string \
    ASSERT $value IN ['standard', 'optIn'];
DEFINE FIELD context_info ON TABLE user_group TYPE option<string>;
DEFINE FIELD title ON TABLE user_group TYPE string DEFAULT '';
DEFINE FIELD users ON TABLE user_group TYPE array DEFAULT [];
DEFINE FIELD users.* ON TABLE user_group TYPE string;
DEFINE FIELD sub_groups ON TABLE user_group TYPE array DEFAULT [];
DEFINE FIELD sub_groups.* ON TABLE user_group TYPE object;
DEFINE FIELD sub_groups.*.title ON TABLE user_group TYPE string;
DEFINE FIELD sub_groups.*.users ON TABLE user_group TYPE array;
DEFINE FIELD sub_groups.*.users.* ON TABLE user_group TYPE string;
DEFINE FIELD autogenerated ON TABLE user_group TYPE bool DEFAULT false;
DEFINE FIELD course_id ON TABLE user_group TYPE option<string>;
DEFINE FIELD lesson_id ON TABLE user_group TYPE option<string>;
DEFINE FIELD permission ON TABLE user_group TYPE option<string>;
DEFINE FIELD created_from ON TABLE user_group TYPE option<string>;
DEFINE FIELD updated_by ON TABLE user_group TYPE option<string>;
DEFINE FIELD created_at ON TABLE user_group TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user_group TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD deleted_at ON TABLE user_group TYPE option<datetime>;
DEFINE INDEX idx_user_group_lesson ON TABLE user_group COLUMNS lesson_id;
DEFINE INDEX idx_user_group_deleted ON TABLE user_group COLUMNS deleted_at;

-- =======================================================================
-- Lessons (course scope)
-- =======================================================================
DEFINE TABLE lesson SCHEMAFULL;
DEFINE FIELD course_id ON TABLE lesson TYPE string;
DEFINE FIELD title ON TABLE lesson TYPE string;
DEFINE FIELD note ON TABLE lesson TYPE string DEFAULT '';
DEFINE FIELD visible ON TABLE lesson TYPE bool DEFAULT true;
DEFINE FIELD position ON TABLE lesson TYPE int DEFAULT 0;
DEFINE FIELD sections ON TABLE lesson TYPE array DEFAULT [];
DEFINE FIELD sections.* ON TABLE lesson TYPE string;
DEFINE FIELD permissions ON TABLE lesson TYPE array DEFAULT [];
DEFINE FIELD permissions.* ON TABLE lesson TYPE object;
DEFINE FIELD permissions.*.level ON TABLE lesson TYPE string \
    ASSERT $value IN ['read', 'write'];
DEFINE FIELD permissions.*.group_id ON TABLE lesson TYPE string;
DEFINE FIELD created_at ON TABLE lesson TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE lesson TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD deleted_at ON TABLE lesson TYPE option<datetime>;
DEFINE INDEX idx_lesson_course ON TABLE lesson COLUMNS course_id;

-- =======================================================================
-- Sections (lesson scope)
-- =======================================================================
DEFINE TABLE section SCHEMAFULL;
DEFINE FIELD lesson_id ON TABLE section TYPE string;
DEFINE FIELD title ON TABLE section TYPE string DEFAULT '';
DEFINE FIELD note ON TABLE section TYPE string DEFAULT '';
DEFINE FIELD visible ON TABLE section TYPE bool DEFAULT true;
DEFINE FIELD position ON TABLE section TYPE int DEFAULT 0;
DEFINE FIELD permissions ON TABLE section TYPE array DEFAULT [];
DEFINE FIELD permissions.* ON TABLE section TYPE object;
DEFINE FIELD permissions.*.level ON TABLE section TYPE string \
    ASSERT $value IN ['read', 'write'];
DEFINE FIELD permissions.*.group_id ON TABLE section TYPE string;
DEFINE FIELD created_at ON TABLE section TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE section TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD deleted_at ON TABLE section TYPE option<datetime>;
DEFINE INDEX idx_section_lesson ON TABLE section COLUMNS lesson_id;

-- =======================================================================
-- Collections (lesson scope, removed with the lesson)
-- =======================================================================
DEFINE TABLE collection SCHEMAFULL;
DEFINE FIELD lesson_id ON TABLE collection TYPE string;
DEFINE FIELD title ON TABLE collection TYPE string DEFAULT '';
DEFINE FIELD created_at ON TABLE collection TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE collection TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_collection_lesson ON TABLE collection COLUMNS lesson_id;
";

/// Run all pending schema migrations.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );
        db.query(migration.sql).await?.check().map_err(|e| {
            DbError::Migration(format!(
                "Migration v{} '{}' failed: {}",
                migration.version, migration.name, e,
            ))
        })?;

        db.query("CREATE _migration SET version = $version, name = $name")
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

        info!(version = migration.version, "Migration applied successfully");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }

    #[test]
    fn soft_deletable_tables_carry_deleted_at() {
        for table in ["user_group", "lesson", "section"] {
            let needle = format!("DEFINE FIELD deleted_at ON TABLE {table}");
            assert!(SCHEMA_V1.contains(&needle), "{table} lacks deleted_at");
        }
    }
}
