//! LanceDB connection and collection lifecycle helpers.
use anyhow::Result;
use arrow_array::RecordBatchIterator;
use arrow_schema::Schema;
use lancedb::database::CreateTableMode;
use lancedb::{connect, Connection, Table};
use std::sync::Arc;
use tracing::{debug, info};

pub async fn open_db(uri: &str) -> Result<Connection> {
    debug!(uri, "connecting to lancedb");
    Ok(connect(uri).execute().await?)
}

pub async fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    Ok(conn.table_names().execute().await?.iter().any(|n| n == name))
}

/// Drop any existing collection `name` and create an empty one with `schema`.
pub async fn recreate_table(conn: &Connection, name: &str, schema: Arc<Schema>) -> Result<Table> {
    if table_exists(conn, name).await? {
        info!(collection = name, "replacing existing collection");
    }
    // create empty table with 0 rows
    let iter = RecordBatchIterator::new(vec![].into_iter(), schema);
    Ok(conn.create_table(name, Box::new(iter)).mode(CreateTableMode::Overwrite).execute().await?)
}

/// Open collection `name`, creating it empty with `schema` if missing.
pub async fn ensure_table(conn: &Connection, name: &str, schema: Arc<Schema>) -> Result<Table> {
    if table_exists(conn, name).await? {
        return Ok(conn.open_table(name).execute().await?);
    }
    info!(collection = name, "collection missing, creating it");
    let iter = RecordBatchIterator::new(vec![].into_iter(), schema);
    Ok(conn.create_table(name, Box::new(iter)).execute().await?)
}

pub async fn row_count(table: &Table) -> Result<usize> {
    Ok(table.count_rows(None).await?)
}
