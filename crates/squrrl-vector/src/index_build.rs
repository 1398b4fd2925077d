//! Similarity index over the description column.
//!
//! Partition counts follow the usual IVF rule of thumb (about `sqrt(rows)`),
//! clamped so tiny collections still train. PQ sub-vectors must divide the
//! embedding dimension.
use anyhow::Result;
use lancedb::index::vector::{IvfFlatIndexBuilder, IvfPqIndexBuilder};
use lancedb::index::Index;
use lancedb::{DistanceType, Table};
use tracing::{info, warn};

use squrrl_core::config::{IndexConfig, IndexKind, Metric};

use crate::schema::DESCRIPTION;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IvfParams {
    pub num_partitions: u32,
    pub num_sub_vectors: u32,
}

pub fn distance_type(metric: Metric) -> DistanceType {
    match metric {
        Metric::Cosine => DistanceType::Cosine,
        Metric::L2 => DistanceType::L2,
        Metric::Dot => DistanceType::Dot,
    }
}

pub fn compute_ivf_params(rows: usize, dim: usize, config: &IndexConfig) -> IvfParams {
    let num_partitions = config.num_partitions.unwrap_or_else(|| {
        let sqrt_n = (rows as f64).sqrt() as usize;
        // Clamp to be less than rows for tiny datasets
        let nlist = sqrt_n.clamp(1, 4096).min(rows.saturating_sub(1).max(1));
        u32::try_from(nlist).unwrap_or(u32::MAX)
    });
    let num_sub_vectors = config.num_sub_vectors.unwrap_or_else(|| {
        let target = if dim >= 1024 { 32 } else { 16 };
        let m = (1..=target.min(dim.max(1))).rev().find(|m| dim % m == 0).unwrap_or(1);
        u32::try_from(m).unwrap_or(1)
    });
    IvfParams { num_partitions, num_sub_vectors }
}

/// Build the configured index on `table`. Returns `false` when no index was built.
pub async fn build_index(table: &Table, rows: usize, dim: usize, config: &IndexConfig) -> Result<bool> {
    if config.kind == IndexKind::None {
        info!("index.kind = none, leaving collection unindexed");
        return Ok(false);
    }
    if rows < config.min_rows {
        warn!(rows, min_rows = config.min_rows, "too few rows to train an index, skipping");
        return Ok(false);
    }
    let params = compute_ivf_params(rows, dim, config);
    let distance = distance_type(config.metric);
    let index = match config.kind {
        IndexKind::IvfPq => Index::IvfPq(
            IvfPqIndexBuilder::default()
                .distance_type(distance)
                .num_partitions(params.num_partitions)
                .num_sub_vectors(params.num_sub_vectors),
        ),
        _ => Index::IvfFlat(IvfFlatIndexBuilder::default().distance_type(distance).num_partitions(params.num_partitions)),
    };
    info!(kind = ?config.kind, metric = ?config.metric, partitions = params.num_partitions, "building index");
    table
        .create_index(&[DESCRIPTION], index)
        .name(format!("{DESCRIPTION}_idx"))
        .execute()
        .await?;
    Ok(true)
}
