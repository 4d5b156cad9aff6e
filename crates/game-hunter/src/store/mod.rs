//! SQLite-backed game record store.
//!
//! One row per title in a single table. Ids are assigned once, in
//! registration order, and never reused. The store keeps an in-memory
//! title → id map that is loaded at open and extended only after an insert
//! transaction commits.

pub mod columns;

use crate::error::{HunterError, HunterResult};
use crate::types::{GameRecord, SourceRecord};
use chrono::NaiveDate;
use columns::Column;
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub use columns::column_values;

/// Storage format of the `LastUpdate` column.
pub const DATE_FORMAT: &str = "%m-%d-%Y";

pub struct GameRecordStore {
    conn: Connection,
    table: String,
    path: PathBuf,
    ids: HashMap<String, i64>,
}

impl GameRecordStore {
    /// Open `<folder>/<name>.db`, creating the folder, file and table as
    /// needed.
    pub fn open(folder: &Path, name: &str, table: &str) -> HunterResult<Self> {
        validate_identifier(table)?;
        if name.trim().is_empty() {
            return Err(HunterError::Config("database name must not be empty".to_string()));
        }
        std::fs::create_dir_all(folder)?;
        let path = folder.join(format!("{name}.db"));
        let conn = Connection::open(&path)?;

        conn.execute_batch(&create_table_sql(table))?;

        let mut store = Self {
            conn,
            table: table.to_string(),
            path,
            ids: HashMap::new(),
        };
        store.ids = store.load_ids()?;
        info!(
            "Opened {} ({} titles) at {}",
            store.table,
            store.ids.len(),
            store.path.display()
        );
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_ids(&self) -> HunterResult<HashMap<String, i64>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT ID, Title FROM {}", self.table))?;
        let ids = stmt
            .query_map([], |row| Ok((row.get::<_, String>(1)?, row.get::<_, i64>(0)?)))?
            .collect::<Result<HashMap<_, _>, _>>()?;
        Ok(ids)
    }

    pub fn id_of(&self, title: &str) -> Option<i64> {
        self.ids.get(title).copied()
    }

    fn require_id(&self, title: &str) -> HunterResult<i64> {
        self.id_of(title)
            .ok_or_else(|| HunterError::UnknownTitle(title.to_string()))
    }

    /// Insert titles not yet in the store. Returns how many were added.
    ///
    /// New titles get ids `max(id)+1, max(id)+2, ...` in input order;
    /// existing ones are untouched. Runs in one transaction.
    pub fn register_titles<S: AsRef<str>>(&mut self, titles: &[S]) -> HunterResult<usize> {
        let mut fresh: Vec<&str> = Vec::new();
        for title in titles {
            let title: &str = title.as_ref();
            if !self.ids.contains_key(title) && !fresh.contains(&title) {
                fresh.push(title);
            }
        }
        if fresh.is_empty() {
            debug!("No new titles to register");
            return Ok(0);
        }

        let tx = self.conn.transaction()?;
        let last: i64 = tx.query_row(
            &format!("SELECT COALESCE(MAX(ID), 0) FROM {}", self.table),
            [],
            |row| row.get(0),
        )?;
        let mut assigned = Vec::with_capacity(fresh.len());
        {
            let mut insert = tx.prepare(&format!("INSERT INTO {} (ID, Title) VALUES (?1, ?2)", self.table))?;
            for (offset, title) in fresh.iter().enumerate() {
                let id = last + 1 + offset as i64;
                insert.execute(params![id, title])?;
                assigned.push((title.to_string(), id));
            }
        }
        tx.commit()?;

        let added = assigned.len();
        self.ids.extend(assigned);
        info!("Registered {added} new titles");
        Ok(added)
    }

    /// Date of the last completed search, `None` if never searched.
    pub fn last_update(&self, title: &str) -> HunterResult<Option<NaiveDate>> {
        let id = self.require_id(title)?;
        let raw: Option<String> = self
            .conn
            .query_row(
                &format!("SELECT LastUpdate FROM {} WHERE ID = ?1", self.table),
                params![id],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?
            .flatten();
        Ok(raw.and_then(|s| parse_date(&s)))
    }

    /// Write the column group of one source record in a single UPDATE.
    pub fn upsert_source_record(&mut self, title: &str, record: &SourceRecord) -> HunterResult<()> {
        let id = self.require_id(title)?;
        let values = column_values(record);
        let assignments: Vec<String> = values
            .iter()
            .enumerate()
            .map(|(i, (column, _))| format!("{} = ?{}", column.db_name(), i + 1))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE ID = ?{}",
            self.table,
            assignments.join(", "),
            values.len() + 1
        );
        let mut bound: Vec<Value> = values.into_iter().map(|(_, v)| v).collect();
        bound.push(Value::Integer(id));

        let tx = self.conn.transaction()?;
        tx.execute(&sql, rusqlite::params_from_iter(bound))?;
        tx.commit()?;
        debug!("Stored {} columns for '{title}'", record.source());
        Ok(())
    }

    /// Stamp the last-update date of a title.
    pub fn mark_updated(&mut self, title: &str, date: NaiveDate) -> HunterResult<()> {
        let id = self.require_id(title)?;
        let tx = self.conn.transaction()?;
        tx.execute(
            &format!("UPDATE {} SET LastUpdate = ?1 WHERE ID = ?2", self.table),
            params![date.format(DATE_FORMAT).to_string(), id],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Read one cell by column. `None` when the cell has never been written.
    pub fn get_field(&self, title: &str, column: Column) -> HunterResult<Option<String>> {
        let id = self.require_id(title)?;
        let value: Value = self.conn.query_row(
            &format!("SELECT {} FROM {} WHERE ID = ?1", column.db_name(), self.table),
            params![id],
            |row| row.get(0),
        )?;
        Ok(match value {
            Value::Null => None,
            Value::Integer(i) => Some(i.to_string()),
            Value::Real(f) => Some(f.to_string()),
            Value::Text(s) => Some(s),
            Value::Blob(b) => Some(String::from_utf8_lossy(&b).into_owned()),
        })
    }

    /// Read one cell by its spreadsheet label or database name.
    pub fn get_field_by_label(&self, title: &str, label: &str) -> HunterResult<Option<String>> {
        let column = Column::from_label(label).ok_or_else(|| HunterError::UnknownColumn(label.to_string()))?;
        self.get_field(title, column)
    }

    /// Every `(id, title)` pair, ordered by id.
    pub fn all_titles(&self) -> HunterResult<Vec<(i64, String)>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT ID, Title FROM {} ORDER BY ID", self.table))?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn game(&self, title: &str) -> HunterResult<GameRecord> {
        Ok(GameRecord {
            id: self.require_id(title)?,
            title: title.to_string(),
            last_update: self.last_update(title)?,
        })
    }
}

fn create_table_sql(table: &str) -> String {
    let columns: Vec<String> = Column::ALL
        .iter()
        .map(|c| match c {
            Column::Title => "Title TEXT UNIQUE NOT NULL".to_string(),
            other => format!("{} {}", other.db_name(), other.sql_type()),
        })
        .collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (\n    ID INTEGER PRIMARY KEY,\n    {}\n);",
        columns.join(",\n    ")
    )
}

/// Table names are interpolated into SQL, so only plain identifiers pass.
/// Reject anything but a plain SQL identifier, since table names are
/// interpolated into statements.
pub(crate) fn validate_identifier(name: &str) -> HunterResult<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(HunterError::Config(format!("invalid table name '{name}'")))
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(e) => {
            debug!("Ignoring unparseable LastUpdate '{raw}': {e}");
            None
        }
    }
}
