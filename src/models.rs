use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CommandError;

pub const DEFAULT_GROUP: u32 = 1;

fn default_group() -> u32 {
    DEFAULT_GROUP
}

/// Position of a student in the roster.
///
/// Assigned when the roster is loaded and never reused: students are only
/// ever appended, so an id stays valid for the whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StudentId(usize);

impl StudentId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StudentId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    #[serde(rename = "prenom")]
    pub first_name: String,
    #[serde(rename = "nom")]
    pub last_name: String,
    #[serde(rename = "classe")]
    pub class: String,
    #[serde(rename = "groupe", default = "default_group")]
    pub group: u32,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Ordered student table. Serialized as a bare JSON array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    students: Vec<Student>,
}

impl Roster {
    pub fn new(students: Vec<Student>) -> Self {
        Self { students }
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn get(&self, id: StudentId) -> Option<&Student> {
        self.students.get(id.index())
    }

    pub fn get_mut(&mut self, id: StudentId) -> Option<&mut Student> {
        self.students.get_mut(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = (StudentId, &Student)> {
        self.students
            .iter()
            .enumerate()
            .map(|(index, student)| (StudentId::new(index), student))
    }

    pub fn push(&mut self, student: Student) -> StudentId {
        self.students.push(student);
        StudentId::new(self.students.len() - 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criterion {
    pub code: String,
    pub label: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
}

impl Criterion {
    /// Resolves a user choice to a suggestion index. Accepts a 1-based
    /// position or the exact phrase.
    pub fn resolve_suggestion(&self, choice: &str) -> Option<usize> {
        let choice = choice.trim();
        if let Ok(position) = choice.parse::<usize>() {
            return (1..=self.suggestions.len())
                .contains(&position)
                .then(|| position - 1);
        }
        self.suggestions.iter().position(|s| s == choice)
    }
}

/// Criteria in catalog order. Serialized as a bare JSON array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    criteria: Vec<Criterion>,
}

impl Catalog {
    pub fn new(criteria: Vec<Criterion>) -> Self {
        Self { criteria }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Criterion> {
        self.criteria.iter()
    }

    pub fn get(&self, code: &str) -> Option<&Criterion> {
        self.criteria.iter().find(|c| c.code == code)
    }

    pub fn get_mut(&mut self, code: &str) -> Option<&mut Criterion> {
        self.criteria.iter_mut().find(|c| c.code == code)
    }

    pub fn resolve_choice(&self, code: &str, choice: &str) -> Result<usize, CommandError> {
        let criterion = self
            .get(code)
            .ok_or_else(|| CommandError::UnknownCriterion(code.to_string()))?;
        criterion
            .resolve_suggestion(choice)
            .ok_or_else(|| CommandError::UnknownSuggestion {
                code: code.to_string(),
                choice: choice.to_string(),
            })
    }
}

/// What the user picked on the appreciation form. Choices are shared by every
/// student in an export.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    choices: HashMap<String, usize>,
    improvement_flags: HashMap<String, bool>,
}

impl SelectionState {
    pub fn choose(&mut self, code: impl Into<String>, suggestion: usize) {
        self.choices.insert(code.into(), suggestion);
    }

    pub fn chosen(&self, code: &str) -> Option<usize> {
        self.choices.get(code).copied()
    }

    pub fn has_choices(&self) -> bool {
        !self.choices.is_empty()
    }

    pub fn set_improvement_included(&mut self, code: impl Into<String>, included: bool) {
        self.improvement_flags.insert(code.into(), included);
    }

    /// Improvements start checked.
    pub fn improvement_included(&self, code: &str) -> bool {
        self.improvement_flags.get(code).copied().unwrap_or(true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appreciation {
    pub label: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdviceItem {
    pub code: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub student_id: StudentId,
    pub first_name: String,
    pub last_name: String,
    pub class: String,
    pub export_date: String,
    pub appreciations: Vec<Appreciation>,
    pub improvements: Vec<String>,
    pub page_break_after: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn criterion() -> Criterion {
        Criterion {
            code: "autonomie".to_string(),
            label: "Autonomie".to_string(),
            icon: "fa-user".to_string(),
            suggestions: vec![
                "Très autonome".to_string(),
                "Autonome".to_string(),
                "Peu autonome".to_string(),
            ],
            improvements: vec!["Continuer ainsi".to_string()],
        }
    }

    #[test]
    fn students_use_seed_field_names() {
        let json = r#"[{"prenom":"Léa","nom":"Martin","classe":"2A"}]"#;
        let roster: Roster = serde_json::from_str(json).unwrap();
        let student = roster.get(StudentId::new(0)).unwrap();
        assert_eq!(student.full_name(), "Léa Martin");
        assert_eq!(student.group, DEFAULT_GROUP);

        let back = serde_json::to_value(&roster).unwrap();
        assert_eq!(back[0]["groupe"], 1);
        assert_eq!(back[0]["classe"], "2A");
    }

    #[test]
    fn push_assigns_next_dense_id() {
        let mut roster = Roster::default();
        let student = Student {
            first_name: "Noé".to_string(),
            last_name: "Petit".to_string(),
            class: "1B".to_string(),
            group: 2,
        };
        assert_eq!(roster.push(student.clone()), StudentId::new(0));
        assert_eq!(roster.push(student), StudentId::new(1));
        let ids: Vec<usize> = roster.iter().map(|(id, _)| id.index()).collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn suggestions_resolve_by_position_or_text() {
        let c = criterion();
        assert_eq!(c.resolve_suggestion("1"), Some(0));
        assert_eq!(c.resolve_suggestion("3"), Some(2));
        assert_eq!(c.resolve_suggestion("0"), None);
        assert_eq!(c.resolve_suggestion("4"), None);
        assert_eq!(c.resolve_suggestion(" Peu autonome "), Some(2));
        assert_eq!(c.resolve_suggestion("inconnu"), None);
    }

    #[test]
    fn resolve_choice_reports_unknown_code() {
        let catalog = Catalog::new(vec![criterion()]);
        assert_eq!(catalog.resolve_choice("autonomie", "2").unwrap(), 1);
        assert!(matches!(
            catalog.resolve_choice("rigueur", "1"),
            Err(CommandError::UnknownCriterion(code)) if code == "rigueur"
        ));
        assert!(matches!(
            catalog.resolve_choice("autonomie", "9"),
            Err(CommandError::UnknownSuggestion { .. })
        ));
    }

    #[test]
    fn improvement_flags_default_to_checked() {
        let mut selection = SelectionState::default();
        assert!(selection.improvement_included("autonomie"));
        selection.set_improvement_included("autonomie", false);
        assert!(!selection.improvement_included("autonomie"));
        assert!(!selection.has_choices());
        selection.choose("autonomie", 1);
        assert_eq!(selection.chosen("autonomie"), Some(1));
        assert_eq!(selection.chosen("rigueur"), None);
        assert!(selection.has_choices());
    }

    #[test]
    fn student_ids_parse_from_text() {
        assert_eq!(" 12 ".parse::<StudentId>().unwrap(), StudentId::new(12));
        assert!("x".parse::<StudentId>().is_err());
    }
}
