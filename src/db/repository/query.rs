use rusqlite::types::ToSql;
use rusqlite::Row;

use crate::models::{PatientRef, PatientSet, Visibility};

/// Helper: builds a dynamic WHERE suffix with numbered, bound parameters.
///
/// Every value lands in `params`; only column names (chosen by the
/// caller, never by user input) are interpolated into the SQL.
pub(crate) struct ScopedQuery {
    clauses: Vec<String>,
    params: Vec<Box<dyn ToSql>>,
}

impl ScopedQuery {
    pub(crate) fn new() -> Self {
        Self {
            clauses: Vec::new(),
            params: Vec::new(),
        }
    }

    fn bind(&mut self, value: Box<dyn ToSql>) -> String {
        self.params.push(value);
        format!("?{}", self.params.len())
    }

    fn bind_all(&mut self, values: &[String]) -> String {
        values
            .iter()
            .map(|v| self.bind(Box::new(v.clone())))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Restrict to rows of the given patients, matching each identity kind
    /// on its own column. An empty set matches nothing.
    pub(crate) fn patients(mut self, alias: &str, set: &PatientSet) -> Self {
        let mut parts = Vec::new();
        if !set.registered.is_empty() {
            let ph = self.bind_all(&set.registered);
            parts.push(format!("{alias}.patient_id IN ({ph})"));
        }
        if !set.unregistered.is_empty() {
            let ph = self.bind_all(&set.unregistered);
            parts.push(format!("{alias}.unregistered_patient_id IN ({ph})"));
        }

        if parts.is_empty() {
            self.clauses.push(" AND 0".to_string());
        } else {
            self.clauses.push(format!(" AND ({})", parts.join(" OR ")));
        }
        self
    }

    /// Apply row visibility on the owning-clinician column.
    pub(crate) fn visibility(mut self, alias: &str, owner_column: &str, visibility: &Visibility) -> Self {
        match visibility {
            Visibility::All => {}
            Visibility::OwnedBy(clinician_id) => {
                let ph = self.bind(Box::new(clinician_id.clone()));
                self.clauses.push(format!(" AND {alias}.{owner_column} = {ph}"));
            }
            Visibility::OwnedByOrGranted {
                clinician_id,
                granted,
            } => {
                let owner = self.bind(Box::new(clinician_id.clone()));
                if granted.is_empty() {
                    self.clauses.push(format!(" AND {alias}.{owner_column} = {owner}"));
                } else {
                    let ph = self.bind_all(granted);
                    self.clauses.push(format!(
                        " AND ({alias}.{owner_column} = {owner} OR {alias}.patient_id IN ({ph}))"
                    ));
                }
            }
        }
        self
    }

    /// `column IN (values)`; an empty list matches nothing.
    pub(crate) fn in_list(mut self, column: &str, values: &[String]) -> Self {
        if values.is_empty() {
            self.clauses.push(" AND 0".to_string());
        } else {
            let ph = self.bind_all(values);
            self.clauses.push(format!(" AND {column} IN ({ph})"));
        }
        self
    }

    pub(crate) fn eq(mut self, column: &str, value: impl ToSql + 'static) -> Self {
        let ph = self.bind(Box::new(value));
        self.clauses.push(format!(" AND {column} = {ph}"));
        self
    }

    /// Case-insensitive substring match.
    pub(crate) fn contains(mut self, column: &str, needle: &str) -> Self {
        let ph = self.bind(Box::new(format!("%{}%", needle.to_lowercase())));
        self.clauses.push(format!(" AND LOWER({column}) LIKE {ph}"));
        self
    }

    pub(crate) fn sql_suffix(&self) -> String {
        self.clauses.join("")
    }

    pub(crate) fn param_refs(&self) -> Vec<&dyn ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }

    /// Next free placeholder index, for callers appending LIMIT/OFFSET.
    pub(crate) fn next_index(&self) -> usize {
        self.params.len() + 1
    }
}

/// Read the two patient-reference columns into a `PatientRef`.
pub(crate) fn patient_ref(row: &Row<'_>) -> rusqlite::Result<PatientRef> {
    let registered: Option<String> = row.get("patient_id")?;
    let unregistered: Option<String> = row.get("unregistered_patient_id")?;
    match (registered, unregistered) {
        (Some(id), _) => Ok(PatientRef::Registered(id)),
        (None, Some(id)) => Ok(PatientRef::Unregistered(id)),
        (None, None) => {
            let idx = row.as_ref().column_index("patient_id")?;
            Err(rusqlite::Error::InvalidColumnType(
                idx,
                "patient_id".into(),
                rusqlite::types::Type::Null,
            ))
        }
    }
}
