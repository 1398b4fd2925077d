use anyhow::Result;
use arrow_array::types::Float32Type;
use arrow_array::{FixedSizeListArray, Int64Array, RecordBatch, RecordBatchIterator};
use lancedb::Table;
use std::sync::Arc;

use squrrl_core::batch::InsertBatch;

use crate::schema::build_book_schema;

/// Arrow rendering of a validated batch.
pub fn to_record_batch(batch: &InsertBatch, dim: i32) -> Result<RecordBatch> {
    let vectors = batch.vectors.iter().map(|v| Some(v.iter().copied().map(Some).collect::<Vec<_>>()));
    let record_batch = RecordBatch::try_new(
        build_book_schema(dim),
        vec![
            Arc::new(Int64Array::from(batch.title_ids.clone())),
            Arc::new(Int64Array::from(batch.author_ids.clone())),
            Arc::new(FixedSizeListArray::from_iter_primitive::<Float32Type, _, _>(vectors, dim)),
        ],
    )?;
    Ok(record_batch)
}

/// Validate `batch` against `dim` and append it to `table`.
pub async fn insert_batch(table: &Table, batch: &InsertBatch, dim: usize) -> Result<()> {
    batch.validate(dim)?;
    let width = i32::try_from(dim)?;
    let record_batch = to_record_batch(batch, width)?;
    let schema = record_batch.schema();
    let reader = Box::new(RecordBatchIterator::new(vec![Ok(record_batch)].into_iter(), schema));
    table.add(reader).execute().await?;
    Ok(())
}
