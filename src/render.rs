//! Printable export document and the sink that writes it out.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};

use crate::error::CommandError;
use crate::models::ReportEntry;

const TITLE: &str = "Appréciations en enseignement professionnel";
const SUBTITLE: &str = "appréciation relative à l’enseignement professionnel « Étude et économie de la construction », bilan établi à l’issue de chaque période.";
pub const NO_APPRECIATION: &str = "Aucune appréciation sélectionnée.";

const MONTHS: [&str; 12] = [
    "janvier",
    "février",
    "mars",
    "avril",
    "mai",
    "juin",
    "juillet",
    "août",
    "septembre",
    "octobre",
    "novembre",
    "décembre",
];

/// Long French date, e.g. `16 octobre 2026`.
pub fn format_export_date(date: NaiveDate) -> String {
    format!(
        "{} {} {}",
        date.day(),
        MONTHS[date.month0() as usize],
        date.year()
    )
}

pub fn export_filename(student_count: usize) -> String {
    format!("Appreciations_Collectives_{student_count}_eleves.pdf").replace(' ', "_")
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_page(output: &mut String, entry: &ReportEntry) {
    let page_break = if entry.page_break_after {
        " page-break-after: always;"
    } else {
        ""
    };

    let _ = writeln!(
        output,
        r#"<div class="page" data-student="{}" style="font-family: Arial, sans-serif; padding: 20px; max-width: 800px; margin: auto;{page_break}">"#,
        entry.student_id
    );
    let _ = writeln!(
        output,
        r#"<header style="text-align: center; border-bottom: 1px solid #ccc; padding-bottom: 15px;">"#
    );
    let _ = writeln!(output, "<h1>{TITLE}</h1>");
    let _ = writeln!(
        output,
        r#"<p style="font-style: italic; color: #555;">{}</p>"#,
        escape(SUBTITLE)
    );
    let _ = writeln!(output, "<p>{}</p>", escape(&entry.export_date));
    let _ = writeln!(
        output,
        "<h2>Élève : {} {}</h2>",
        escape(&entry.first_name),
        escape(&entry.last_name)
    );
    let _ = writeln!(output, "<p>Classe {}</p>", escape(&entry.class));
    let _ = writeln!(output, "</header>");

    let _ = writeln!(output, r#"<section style="margin-top: 30px;">"#);
    let _ = writeln!(output, "<h3>Appréciations générales :</h3>");
    if entry.appreciations.is_empty() {
        let _ = writeln!(output, "<p>{NO_APPRECIATION}</p>");
    } else {
        let _ = writeln!(output, "<ul>");
        for appreciation in &entry.appreciations {
            let _ = writeln!(
                output,
                "<li><strong>{}:</strong> {}</li>",
                escape(&appreciation.label),
                escape(&appreciation.text)
            );
        }
        let _ = writeln!(output, "</ul>");
    }
    let _ = writeln!(output, "</section>");

    if !entry.improvements.is_empty() {
        let _ = writeln!(output, r#"<section style="margin-top: 30px;">"#);
        let _ = writeln!(output, "<h2>Pour progresser</h2>");
        let _ = writeln!(output, "<ul>");
        for improvement in &entry.improvements {
            let _ = writeln!(output, "<li>{}</li>", escape(improvement));
        }
        let _ = writeln!(output, "</ul>");
        let _ = writeln!(output, "</section>");
    }

    let _ = writeln!(
        output,
        r#"<footer style="margin-top: 60px; display: flex; gap: 40px; border-top: 1px solid #ccc; padding-top: 20px; page-break-inside: avoid;">"#
    );
    let _ = writeln!(
        output,
        r#"<div style="flex: 1;"><label style="font-weight: bold;">Signature des parents</label></div>"#
    );
    let _ = writeln!(
        output,
        r#"<div style="flex: 1;"><label style="font-weight: bold;">Signature de l’enseignant</label></div>"#
    );
    let _ = writeln!(output, "</footer>");
    let _ = writeln!(output, "</div>");
}

/// One page per entry, in entry order.
pub fn render_document(entries: &[ReportEntry]) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "<!DOCTYPE html>");
    let _ = writeln!(output, r#"<html lang="fr">"#);
    let _ = writeln!(output, r#"<head><meta charset="utf-8"><title>{TITLE}</title>"#);
    let _ = writeln!(
        output,
        "<style>@page {{ size: A4 portrait; margin: 0.5in 0.4in; }}</style></head>"
    );
    let _ = writeln!(output, "<body>");
    for entry in entries {
        render_page(&mut output, entry);
    }
    let _ = writeln!(output, "</body>");
    let _ = writeln!(output, "</html>");

    output
}

/// Receives the finished document. Turning it into the final file format is
/// the sink's business.
pub trait ExportSink {
    fn write(&self, filename: &str, document: &str) -> Result<PathBuf, CommandError>;
}

/// Writes the printable HTML next to the requested PDF name.
pub struct HtmlFileSink {
    dir: PathBuf,
}

impl HtmlFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ExportSink for HtmlFileSink {
    fn write(&self, filename: &str, document: &str) -> Result<PathBuf, CommandError> {
        let path = self.dir.join(filename).with_extension("html");
        std::fs::create_dir_all(&self.dir)
            .and_then(|()| std::fs::write(&path, document))
            .map_err(|source| CommandError::Export {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Appreciation, StudentId};
    use tempfile::TempDir;

    fn entry(id: usize, page_break_after: bool) -> ReportEntry {
        ReportEntry {
            student_id: StudentId::new(id),
            first_name: format!("Élise{id}"),
            last_name: "Roux".to_string(),
            class: "2A".to_string(),
            export_date: "16 octobre 2026".to_string(),
            appreciations: vec![Appreciation {
                label: "Oral".to_string(),
                text: "Participe <souvent> & bien".to_string(),
            }],
            improvements: vec!["Prendre la parole".to_string()],
            page_break_after,
        }
    }

    #[test]
    fn dates_use_french_month_names() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert_eq!(format_export_date(date), "16 octobre 2026");
        let date = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        assert_eq!(format_export_date(date), "1 février 2025");
    }

    #[test]
    fn filename_depends_only_on_count() {
        assert_eq!(export_filename(3), "Appreciations_Collectives_3_eleves.pdf");
        assert_eq!(export_filename(1), export_filename(1));
        assert!(!export_filename(12).contains(' '));
    }

    #[test]
    fn only_non_final_pages_break() {
        let html = render_document(&[entry(5, true), entry(2, false)]);
        assert_eq!(html.matches("page-break-after: always").count(), 1);
        assert_eq!(html.matches(r#"<div class="page""#).count(), 2);
        assert!(html.contains(r#"data-student="5""#));
        assert!(html.contains("<p>Classe 2A</p>"));

        let first = html.find("Élise5").unwrap();
        let second = html.find("Élise2").unwrap();
        assert!(first < second);
        let break_at = html.find("page-break-after").unwrap();
        assert!(break_at < first);
    }

    #[test]
    fn text_is_escaped() {
        let html = render_document(&[entry(0, false)]);
        assert!(html.contains("Participe &lt;souvent&gt; &amp; bien"));
        assert!(!html.contains("<souvent>"));
    }

    #[test]
    fn empty_appreciations_show_placeholder_and_no_advice_section() {
        let mut bare = entry(0, false);
        bare.appreciations.clear();
        bare.improvements.clear();
        let html = render_document(&[bare]);
        assert!(html.contains(NO_APPRECIATION));
        assert!(!html.contains("Pour progresser"));
        assert!(html.contains("Signature des parents"));
    }

    #[test]
    fn html_sink_writes_beside_pdf_name() {
        let dir = TempDir::new().unwrap();
        let sink = HtmlFileSink::new(dir.path().join("out"));
        let path = sink
            .write(&export_filename(2), "<html></html>")
            .unwrap();
        assert_eq!(
            path.file_name().unwrap(),
            "Appreciations_Collectives_2_eleves.html"
        );
        assert_eq!(std::fs::read_to_string(path).unwrap(), "<html></html>");
    }
}
