//! Parquet output of the widened compliance batch.

use super::error::ArtifactError;
use super::{persist, staging_file};
use crate::compliance::ComplianceRecord;
use arrow::array::{
    ArrayRef, BooleanArray, ListArray, StringArray, StructArray, TimestampMicrosecondArray,
    UInt32Array, UInt64Array,
};
use arrow::buffer::OffsetBuffer;
use arrow::datatypes::{DataType, Field, Fields, Schema, SchemaRef, TimeUnit};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

const UTC: &str = "UTC";

fn timestamp_type() -> DataType {
    DataType::Timestamp(TimeUnit::Microsecond, Some(UTC.into()))
}

fn check_run_fields() -> Fields {
    Fields::from(vec![
        Field::new("name", DataType::Utf8, false),
        Field::new("conclusion", DataType::Utf8, true),
        Field::new("completed_at", timestamp_type(), true),
    ])
}

fn review_item() -> Arc<Field> {
    Arc::new(Field::new("item", DataType::Utf8, true))
}

fn check_run_item() -> Arc<Field> {
    Arc::new(Field::new(
        "item",
        DataType::Struct(check_run_fields()),
        true,
    ))
}

/// Arrow schema of the parquet artifact: one column per widened field plus `loaded_at`.
pub fn compliance_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("pr_number", DataType::UInt64, false),
        Field::new("pr_title", DataType::Utf8, false),
        Field::new("user_login", DataType::Utf8, false),
        Field::new("user_id", DataType::UInt64, false),
        Field::new("repository", DataType::Utf8, false),
        Field::new("created_at", timestamp_type(), true),
        Field::new("merged_at", timestamp_type(), true),
        Field::new("closed_at", timestamp_type(), true),
        Field::new("base_branch", DataType::Utf8, false),
        Field::new("head_branch", DataType::Utf8, false),
        Field::new("reviews", DataType::List(review_item()), false),
        Field::new("code_review_passed", DataType::UInt32, false),
        Field::new("check_runs", DataType::List(check_run_item()), false),
        Field::new("combined_status", DataType::Utf8, true),
        Field::new("status_checks_passed", DataType::Boolean, false),
        Field::new("is_compliant", DataType::Boolean, false),
        Field::new("loaded_at", timestamp_type(), false),
    ]))
}

fn timestamps<I>(values: I) -> TimestampMicrosecondArray
where
    I: IntoIterator<Item = Option<DateTime<Utc>>>,
{
    values
        .into_iter()
        .map(|value| value.map(|ts| ts.timestamp_micros()))
        .collect::<TimestampMicrosecondArray>()
        .with_timezone(UTC)
}

fn strings<'a, I>(values: I) -> StringArray
where
    I: IntoIterator<Item = &'a str>,
{
    StringArray::from_iter_values(values)
}

fn reviews_column(records: &[ComplianceRecord]) -> Result<ListArray, ArrowError> {
    let states: Vec<&str> = records
        .iter()
        .flat_map(|record| record.reviews.iter().map(|review| review.state.as_str()))
        .collect();
    let states = strings(states);
    let offsets = OffsetBuffer::from_lengths(records.iter().map(|record| record.reviews.len()));
    ListArray::try_new(review_item(), offsets, Arc::new(states), None)
}

fn check_runs_column(records: &[ComplianceRecord]) -> Result<ListArray, ArrowError> {
    let runs: Vec<_> = records
        .iter()
        .flat_map(|record| record.check_runs.iter())
        .collect();

    let names = strings(runs.iter().map(|run| run.name.as_str()));
    let conclusions: StringArray = runs.iter().map(|run| run.conclusion.as_deref()).collect();
    let completed = timestamps(runs.iter().map(|run| run.completed_at));

    let values = StructArray::try_new(
        check_run_fields(),
        vec![
            Arc::new(names) as ArrayRef,
            Arc::new(conclusions),
            Arc::new(completed),
        ],
        None,
    )?;
    let offsets = OffsetBuffer::from_lengths(records.iter().map(|record| record.check_runs.len()));
    ListArray::try_new(check_run_item(), offsets, Arc::new(values), None)
}

/// Lays out `records` as a single record batch.
pub fn to_record_batch(
    records: &[ComplianceRecord],
    loaded_at: DateTime<Utc>,
) -> Result<RecordBatch, ArrowError> {
    let columns: Vec<ArrayRef> = vec![
        Arc::new(UInt64Array::from_iter_values(
            records.iter().map(|r| r.pr_number),
        )),
        Arc::new(strings(records.iter().map(|r| r.pr_title.as_str()))),
        Arc::new(strings(records.iter().map(|r| r.user_login.as_str()))),
        Arc::new(UInt64Array::from_iter_values(
            records.iter().map(|r| r.user_id),
        )),
        Arc::new(strings(records.iter().map(|r| r.repository.as_str()))),
        Arc::new(timestamps(records.iter().map(|r| r.created_at))),
        Arc::new(timestamps(records.iter().map(|r| r.merged_at))),
        Arc::new(timestamps(records.iter().map(|r| r.closed_at))),
        Arc::new(strings(records.iter().map(|r| r.base_branch.as_str()))),
        Arc::new(strings(records.iter().map(|r| r.head_branch.as_str()))),
        Arc::new(reviews_column(records)?),
        Arc::new(UInt32Array::from_iter_values(
            records.iter().map(|r| r.code_review_passed),
        )),
        Arc::new(check_runs_column(records)?),
        Arc::new(
            records
                .iter()
                .map(|r| r.combined_status.as_deref())
                .collect::<StringArray>(),
        ),
        Arc::new(BooleanArray::from(
            records
                .iter()
                .map(|r| r.status_checks_passed)
                .collect::<Vec<_>>(),
        )),
        Arc::new(BooleanArray::from(
            records.iter().map(|r| r.is_compliant).collect::<Vec<_>>(),
        )),
        Arc::new(timestamps(records.iter().map(|_| Some(loaded_at)))),
    ];

    RecordBatch::try_new(compliance_schema(), columns)
}

/// Writes `records` to a snappy-compressed parquet file at `path`.
///
/// # Errors
///
/// Returns [`ArtifactError::Arrow`] if the columns cannot be assembled,
/// [`ArtifactError::Parquet`] if encoding fails and [`ArtifactError::Io`] for
/// filesystem failures.
pub fn write_parquet(
    path: &Path,
    records: &[ComplianceRecord],
    loaded_at: DateTime<Utc>,
) -> Result<(), ArtifactError> {
    let location = path.display().to_string();
    let batch = to_record_batch(records, loaded_at).map_err(|source| ArtifactError::Arrow {
        path: location.clone(),
        source,
    })?;

    let staging = staging_file(path)?;
    let file = staging.reopen().map_err(|source| ArtifactError::Io {
        path: location.clone(),
        source,
    })?;

    let parquet_error = |source| ArtifactError::Parquet {
        path: location.clone(),
        source,
    };
    let properties = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(properties))
        .map_err(parquet_error)?;
    writer.write(&batch).map_err(parquet_error)?;
    writer.close().map_err(parquet_error)?;

    persist(staging, path)?;
    info!(path = %location, rows = batch.num_rows(), "Wrote parquet artifact");
    Ok(())
}
