//! Spreadsheet batch drafting.
//!
//! Each row gets one internal-layout document, drafted from the first source
//! pair that has any text (Source 1/2, then Source 3/4) or from the title and
//! vertical when all four are blank. Rows are processed in file order and a
//! failed draft never stops the rows after it.

pub mod handlers;
pub mod sheet;

use tracing::{info, warn};

use crate::errors::AppError;
use crate::generation::generator::{generate_document, DraftSource};
use crate::llm_client::{is_error_sentinel, TextCompleter};
use sheet::SheetTable;

pub const OUTPUT_COLUMN: &str = "Internal (Output 1)";
pub const DEFAULT_BATCH_VERTICAL: &str = "distribution";
const SOURCE_PREFIX: &str = "Job description: ";

/// Lowercase alphanumerics only: `Source 3(Additional ...)` → `source3additional...`.
fn normalise(header: &str) -> String {
    header
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Column indexes resolved once per sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub job_profile: usize,
    pub job_profile_name: Option<usize>,
    pub vertical: Option<usize>,
    /// Source 1 through Source 4.
    pub sources: [Option<usize>; 4],
}

impl ColumnMap {
    pub fn resolve(table: &SheetTable) -> Result<Self, AppError> {
        let (Some(_), Some(job_profile)) = (table.column("ID"), table.column("Job Profile")) else {
            return Err(AppError::Spreadsheet(
                "Missing required columns: 'ID' or 'Job Profile'".to_string(),
            ));
        };

        let source = |n: usize| {
            let prefix = format!("source{n}");
            table.headers.iter().position(|h| {
                let norm = normalise(h);
                norm.strip_prefix(&prefix)
                    .is_some_and(|rest| !rest.starts_with(|c: char| c.is_ascii_digit()))
            })
        };

        Ok(Self {
            job_profile,
            job_profile_name: table.column("Job Profile Name"),
            vertical: table.column("Vertical"),
            sources: [source(1), source(2), source(3), source(4)],
        })
    }
}

fn tagged(text: &str) -> String {
    if text.trim().is_empty() {
        String::new()
    } else {
        format!("{SOURCE_PREFIX}{text}")
    }
}

/// Picks the drafting path for one row.
pub fn plan_row(table: &SheetTable, columns: &ColumnMap, row: &[String]) -> DraftSource {
    let cell = move |c: Option<usize>| table.cell(row, c);

    for pair in [[0, 1], [2, 3]] {
        let (a, b) = (cell(columns.sources[pair[0]]), cell(columns.sources[pair[1]]));
        if !a.trim().is_empty() || !b.trim().is_empty() {
            return DraftSource::Sources {
                desc_1: tagged(a),
                desc_2: tagged(b),
            };
        }
    }

    let name = cell(columns.job_profile_name);
    let job_profile = if name.trim().is_empty() {
        cell(Some(columns.job_profile))
    } else {
        name
    };
    let vertical = cell(columns.vertical).trim();

    DraftSource::TitleAndVertical {
        job_profile: job_profile.trim().to_string(),
        vertical: if vertical.is_empty() {
            DEFAULT_BATCH_VERTICAL.to_string()
        } else {
            vertical.to_string()
        },
    }
}

/// Drafts every row and returns the table with `OUTPUT_COLUMN` appended.
pub async fn process_table(
    llm: &dyn TextCompleter,
    table: SheetTable,
) -> Result<SheetTable, AppError> {
    let columns = ColumnMap::resolve(&table)?;
    let mut output = SheetTable {
        headers: table.headers.clone(),
        rows: Vec::with_capacity(table.rows.len()),
    };
    output.headers.push(OUTPUT_COLUMN.to_string());

    let width = table.headers.len();
    let mut failed = 0usize;
    for (i, row) in table.rows.iter().enumerate() {
        let source = plan_row(&table, &columns, row);
        let text = generate_document(llm, &source).await;
        if is_error_sentinel(&text) {
            failed += 1;
            warn!("Row {} draft failed: {text}", i + 1);
        }

        let mut cells = row.clone();
        cells.resize(width, String::new());
        cells.push(text);
        output.rows.push(cells);
    }

    info!(
        "Batch drafted {} rows ({failed} failed)",
        output.rows.len()
    );
    Ok(output)
}
