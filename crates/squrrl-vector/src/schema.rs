use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;

pub const TITLE_ID: &str = "title_id";
pub const AUTHOR: &str = "author";
pub const DESCRIPTION: &str = "description";

/// Collection schema: book id, author id, description embedding of width `dim`.
pub fn build_book_schema(dim: i32) -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new(TITLE_ID, DataType::Int64, false),
        Field::new(AUTHOR, DataType::Int64, false),
        Field::new(DESCRIPTION, DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim), true),
    ]))
}
