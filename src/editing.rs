//! Group and criteria edits, applied to the in-memory tables before saving.

use crate::error::CommandError;
use crate::models::{Catalog, Roster, StudentId, DEFAULT_GROUP};

/// Reads a group number the way a lenient form field would: leading digits
/// only, anything that does not give a positive number falls back to group 1.
pub fn coerce_group(raw: &str) -> u32 {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    match trimmed[..end].parse::<u32>() {
        Ok(group) if group > 0 => group,
        _ => DEFAULT_GROUP,
    }
}

/// Applies `(student, raw group)` edits. Every id is checked before anything
/// changes. Returns how many students moved.
pub fn apply_group_edits(
    roster: &mut Roster,
    edits: &[(StudentId, String)],
) -> Result<usize, CommandError> {
    if let Some((id, _)) = edits.iter().find(|(id, _)| roster.get(*id).is_none()) {
        return Err(CommandError::UnknownStudent(*id));
    }

    let mut moved = 0;
    for (id, raw) in edits {
        let group = coerce_group(raw);
        if let Some(student) = roster.get_mut(*id) {
            if student.group != group {
                tracing::debug!(student = %id, from = student.group, to = group, "group changed");
                student.group = group;
                moved += 1;
            }
        }
    }
    Ok(moved)
}

/// One phrase per line, trimmed, blank lines dropped.
pub fn parse_phrase_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Replaces the suggestion and/or improvement list of one criterion.
pub fn replace_phrases(
    catalog: &mut Catalog,
    code: &str,
    suggestions: Option<&str>,
    improvements: Option<&str>,
) -> Result<(), CommandError> {
    let criterion = catalog
        .get_mut(code)
        .ok_or_else(|| CommandError::UnknownCriterion(code.to_string()))?;

    if let Some(text) = suggestions {
        criterion.suggestions = parse_phrase_lines(text);
    }
    if let Some(text) = improvements {
        criterion.improvements = parse_phrase_lines(text);
    }
    Ok(())
}
