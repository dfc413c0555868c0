use crate::{
    binding::ParameterValues,
    compile::CompiledProjection,
    exec::{ExecuteError, QueryAdapter, project_rows},
    model::ShapeModel,
    value::Record,
};

///
/// MemoryStore
///
/// In-memory rows of a single source shape. Every row is checked against
/// the shape on insert, so execution only ever sees conforming records.
///

#[derive(Clone, Debug)]
pub struct MemoryStore {
    shape: &'static ShapeModel,
    rows: Vec<Record>,
}

impl MemoryStore {
    #[must_use]
    pub const fn new(shape: &'static ShapeModel) -> Self {
        Self {
            shape,
            rows: Vec::new(),
        }
    }

    pub fn insert(&mut self, row: Record) -> Result<(), ExecuteError> {
        self.shape.check_record(&row)?;
        self.rows.push(row);

        Ok(())
    }

    /// Insert several rows; nothing is inserted if any row is rejected.
    pub fn extend(&mut self, rows: impl IntoIterator<Item = Record>) -> Result<(), ExecuteError> {
        let rows: Vec<Record> = rows.into_iter().collect();
        for row in &rows {
            self.shape.check_record(row)?;
        }
        self.rows.extend(rows);

        Ok(())
    }

    #[must_use]
    pub const fn shape(&self) -> &'static ShapeModel {
        self.shape
    }

    #[must_use]
    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl QueryAdapter for MemoryStore {
    fn execute(
        &self,
        compiled: &CompiledProjection,
        parameters: &ParameterValues,
    ) -> Result<Vec<Record>, ExecuteError> {
        if compiled.source() != self.shape.name {
            return Err(ExecuteError::SourceMismatch {
                expected: self.shape.name,
                found: compiled.source(),
            });
        }

        project_rows(compiled.expr(), &self.rows, parameters)
    }
}
