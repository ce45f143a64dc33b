use std::collections::BTreeMap;

use crate::models::{Roster, Student, StudentId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterEntry<'a> {
    pub id: StudentId,
    pub student: &'a Student,
}

/// Class label -> students, roster order within each class.
pub type ClassView<'a> = BTreeMap<&'a str, Vec<RosterEntry<'a>>>;

/// Class label -> group number -> students, roster order within each group.
pub type ClassGroupView<'a> = BTreeMap<&'a str, BTreeMap<u32, Vec<RosterEntry<'a>>>>;

pub fn group_by_class(roster: &Roster) -> ClassView<'_> {
    let mut classes = ClassView::new();
    for (id, student) in roster.iter() {
        classes
            .entry(student.class.as_str())
            .or_default()
            .push(RosterEntry { id, student });
    }
    classes
}

pub fn group_by_class_and_group(roster: &Roster) -> ClassGroupView<'_> {
    let mut classes = ClassGroupView::new();
    for (id, student) in roster.iter() {
        classes
            .entry(student.class.as_str())
            .or_default()
            .entry(student.group)
            .or_default()
            .push(RosterEntry { id, student });
    }
    classes
}
