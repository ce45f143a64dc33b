use crate::error::CommandError;
use crate::models::{AdviceItem, Catalog, SelectionState};

/// Maps a chosen suggestion onto one of the coarser improvement tiers.
///
/// Suggestions run from mild to severe, so the tier grows with the index.
/// `suggestion_count` must be non-zero whenever a suggestion is chosen, and
/// the index must lie inside the suggestion list.
pub fn select_improvement(
    suggestion: Option<usize>,
    suggestion_count: usize,
    improvements: &[String],
) -> Option<&str> {
    let index = suggestion?;
    let levels = improvements.len();
    if levels == 0 {
        return None;
    }

    let tier = ((index as f64 / suggestion_count as f64) * levels as f64).floor() as usize;
    improvements.get(tier.min(levels - 1)).map(String::as_str)
}

/// Builds the "Pour progresser" list for the current choices, in catalog order.
pub fn progress_advice(
    catalog: &Catalog,
    selection: &SelectionState,
) -> Result<Vec<AdviceItem>, CommandError> {
    if !selection.has_choices() {
        return Err(CommandError::NoAppreciation);
    }

    let advice: Vec<AdviceItem> = catalog
        .iter()
        .filter_map(|criterion| {
            let text = select_improvement(
                selection.chosen(&criterion.code),
                criterion.suggestions.len(),
                &criterion.improvements,
            )?;
            Some(AdviceItem {
                code: criterion.code.clone(),
                text: text.to_string(),
            })
        })
        .collect();

    if advice.is_empty() {
        return Err(CommandError::NoAppreciation);
    }
    Ok(advice)
}
