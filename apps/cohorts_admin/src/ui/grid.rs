//! Grid column schema and the text rendering of the cohort table.

use std::fmt::Write as _;

use shared::domain::Cohort;

use crate::controller::view_model::{CohortRow, CohortsViewModel};

const CREATED_FORMAT: &str = "%Y-%m-%d %H:%M";
const COLUMN_GAP: &str = "  ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CohortField {
    Name,
    Description,
    Type,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub field: CohortField,
    pub enable_cell_edit: bool,
}

impl ColumnDef {
    pub fn cell(&self, cohort: &Cohort) -> String {
        match self.field {
            CohortField::Name => cohort.name.to_string(),
            CohortField::Description => cohort.description.clone().unwrap_or_default(),
            CohortField::Type => cohort.cohort_type.clone().unwrap_or_default(),
            CohortField::CreatedAt => cohort
                .created_at
                .map(|created| created.format(CREATED_FORMAT).to_string())
                .unwrap_or_default(),
        }
    }
}

pub const COHORT_COLUMNS: [ColumnDef; 4] = [
    ColumnDef {
        name: "Name",
        field: CohortField::Name,
        enable_cell_edit: true,
    },
    ColumnDef {
        name: "Description",
        field: CohortField::Description,
        enable_cell_edit: true,
    },
    ColumnDef {
        name: "Type",
        field: CohortField::Type,
        enable_cell_edit: true,
    },
    ColumnDef {
        name: "Created",
        field: CohortField::CreatedAt,
        enable_cell_edit: false,
    },
];

/// Grid binding borrowed from the view-model.
#[derive(Debug, Clone, Copy)]
pub struct GridOptions<'a> {
    pub enable_sorting: bool,
    pub column_defs: &'static [ColumnDef],
    pub data: &'a [CohortRow],
}

/// Renders the current grid, the query status line, and any error message.
pub fn render_table(view_model: &CohortsViewModel) -> String {
    let grid = view_model.grid();
    let cells: Vec<Vec<String>> = grid
        .data
        .iter()
        .map(|row| {
            grid.column_defs
                .iter()
                .map(|column| column.cell(&row.cohort))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = grid
        .column_defs
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            cells
                .iter()
                .map(|row| row[idx].chars().count())
                .chain(std::iter::once(column.name.chars().count()))
                .max()
                .unwrap_or_default()
        })
        .collect();

    let mut out = String::new();
    let header: Vec<String> = grid.column_defs.iter().map(|c| c.name.to_string()).collect();
    push_line(&mut out, "  ", &header, &widths);
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    push_line(&mut out, "  ", &rule, &widths);

    if cells.is_empty() {
        out.push_str("  (no cohorts)\n");
    }
    for (row, row_cells) in grid.data.iter().zip(&cells) {
        let marker = if row.is_removing() {
            "- "
        } else if view_model.selected().contains(row.name()) {
            "* "
        } else {
            "  "
        };
        push_line(&mut out, marker, row_cells, &widths);
    }

    let query = view_model.query();
    let _ = write!(
        out,
        "\npage {} | {} per page | order {}",
        query.page, query.limit, query.order
    );
    if !query.filter.is_empty() {
        let _ = write!(out, " | filter \"{}\"", query.filter);
    }
    out.push('\n');

    if let Some(error) = view_model.error() {
        let _ = writeln!(out, "error: {error}");
    }
    out
}

fn push_line(out: &mut String, marker: &str, cells: &[String], widths: &[usize]) {
    let mut line = String::from(marker);
    for (idx, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if idx > 0 {
            line.push_str(COLUMN_GAP);
        }
        let _ = write!(line, "{cell:<width$}");
    }
    out.push_str(line.trim_end());
    out.push('\n');
}
