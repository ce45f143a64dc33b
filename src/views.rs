use std::fmt::Write;

use crate::grouping::{ClassGroupView, ClassView};
use crate::models::{AdviceItem, Catalog};

pub fn group_editor(classes: &ClassView<'_>) -> String {
    let mut output = String::new();

    if classes.is_empty() {
        let _ = writeln!(output, "Aucun élève dans la liste.");
        return output;
    }

    for (class, students) in classes {
        let _ = writeln!(output, "## Classe {class}");
        for entry in students {
            let _ = writeln!(
                output,
                "- [{}] {} (groupe {})",
                entry.id,
                entry.student.full_name(),
                entry.student.group
            );
        }
        let _ = writeln!(output);
    }

    output
}

pub fn student_selector(classes: &ClassGroupView<'_>) -> String {
    let mut output = String::new();

    if classes.is_empty() {
        let _ = writeln!(output, "Aucun élève dans la liste.");
        return output;
    }

    for (class, groups) in classes {
        let _ = writeln!(output, "## Classe {class}");
        for (group, students) in groups {
            let _ = writeln!(output, "### Groupe {group}");
            for entry in students {
                let _ = writeln!(output, "- [{}] {}", entry.id, entry.student.full_name());
            }
        }
        let _ = writeln!(output);
    }

    output
}

pub fn criteria_editor(catalog: &Catalog) -> String {
    let mut output = String::new();

    for criterion in catalog.iter() {
        let _ = writeln!(output, "## {} ({})", criterion.label, criterion.code);
        let _ = writeln!(output, "Suggestions d'appréciations :");
        for (position, suggestion) in criterion.suggestions.iter().enumerate() {
            let _ = writeln!(output, "  {}. {}", position + 1, suggestion);
        }
        let _ = writeln!(output, "Conseils pour progresser :");
        for improvement in &criterion.improvements {
            let _ = writeln!(output, "  - {improvement}");
        }
        let _ = writeln!(output);
    }

    output
}

pub fn advice_list(advice: &[AdviceItem]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Pour progresser");
    for item in advice {
        let _ = writeln!(output, "- [{}] {}", item.code, item.text);
    }
    output
}
