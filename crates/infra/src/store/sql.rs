//! SQL text for a resource, rendered once per dialect.
//!
//! Table and column names come from the static [`Resource`] declaration only;
//! request data is always bound as a parameter.

use crudline_core::{ColumnKind, Resource};

/// Placeholder style and DDL flavor.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    Sqlite,
}

impl Dialect {
    /// Placeholder for the `n`-th (1-based) argument.
    pub fn placeholder(self, n: usize) -> String {
        match self {
            Self::Postgres => format!("${n}"),
            Self::Sqlite => "?".to_string(),
        }
    }

    fn id_column_ddl(self) -> &'static str {
        match self {
            Self::Postgres => "BIGSERIAL PRIMARY KEY",
            Self::Sqlite => "INTEGER PRIMARY KEY AUTOINCREMENT",
        }
    }

    fn column_type(self, kind: ColumnKind) -> &'static str {
        match (self, kind) {
            (Self::Postgres, ColumnKind::Int) => "BIGINT",
            (Self::Sqlite, ColumnKind::Int) => "INTEGER",
            (_, ColumnKind::Text) => "TEXT",
        }
    }
}

/// Prepared SQL for the five resource operations plus bootstrap DDL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlTemplates {
    pub insert: String,
    pub select_all: String,
    pub select_one: String,
    pub update: String,
    pub delete: String,
    pub create_table: String,
}

impl SqlTemplates {
    pub fn for_resource<R: Resource>(dialect: Dialect) -> Self {
        let table = R::TABLE;
        let id = R::ID_COLUMN;
        let fields: Vec<&str> = R::FIELDS.iter().map(|c| c.name).collect();
        let field_count = fields.len();

        let selected = std::iter::once(id)
            .chain(fields.iter().copied())
            .collect::<Vec<_>>()
            .join(", ");

        let insert_params = (1..=field_count)
            .map(|n| dialect.placeholder(n))
            .collect::<Vec<_>>()
            .join(", ");

        let assignments = fields
            .iter()
            .enumerate()
            .map(|(i, name)| format!("{name} = {}", dialect.placeholder(i + 1)))
            .collect::<Vec<_>>()
            .join(", ");

        let column_ddl = std::iter::once(format!("{id} {}", dialect.id_column_ddl()))
            .chain(
                R::FIELDS
                    .iter()
                    .map(|c| format!("{} {} NOT NULL", c.name, dialect.column_type(c.kind))),
            )
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            insert: format!(
                "INSERT INTO {table} ({}) VALUES ({insert_params}) RETURNING {id}",
                fields.join(", ")
            ),
            select_all: format!("SELECT {selected} FROM {table}"),
            select_one: format!(
                "SELECT {selected} FROM {table} WHERE {id} = {}",
                dialect.placeholder(1)
            ),
            update: format!(
                "UPDATE {table} SET {assignments} WHERE {id} = {}",
                dialect.placeholder(field_count + 1)
            ),
            delete: format!("DELETE FROM {table} WHERE {id} = {}", dialect.placeholder(1)),
            create_table: format!("CREATE TABLE IF NOT EXISTS {table} ({column_ddl})"),
        }
    }
}
