use crate::error::CommandError;
use crate::improvement;
use crate::models::{
    Appreciation, Catalog, ReportEntry, Roster, SelectionState, StudentId,
};

/// Resolves the current choices into one report entry per selected student,
/// in the order the students were given.
///
/// The caller rejects an empty selection before getting here.
pub fn build_report_entries(
    selected: &[StudentId],
    roster: &Roster,
    catalog: &Catalog,
    selection: &SelectionState,
    export_date: &str,
) -> Result<Vec<ReportEntry>, CommandError> {
    let mut appreciations = Vec::new();
    let mut improvements = Vec::new();

    for criterion in catalog.iter() {
        let Some(index) = selection.chosen(&criterion.code) else {
            continue;
        };
        let Some(text) = criterion.suggestions.get(index) else {
            tracing::warn!(code = %criterion.code, index, "chosen suggestion is out of range");
            continue;
        };

        appreciations.push(Appreciation {
            label: criterion.label.clone(),
            text: text.clone(),
        });

        if selection.improvement_included(&criterion.code) {
            if let Some(advice) = improvement::select_improvement(
                Some(index),
                criterion.suggestions.len(),
                &criterion.improvements,
            ) {
                improvements.push(advice.to_string());
            }
        }
    }

    let last = selected.len().saturating_sub(1);
    selected
        .iter()
        .enumerate()
        .map(|(position, &id)| {
            let student = roster.get(id).ok_or(CommandError::UnknownStudent(id))?;
            Ok(ReportEntry {
                student_id: id,
                first_name: student.first_name.clone(),
                last_name: student.last_name.clone(),
                class: student.class.clone(),
                export_date: export_date.to_string(),
                appreciations: appreciations.clone(),
                improvements: improvements.clone(),
                page_break_after: position < last,
            })
        })
        .collect()
}
