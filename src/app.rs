use std::collections::HashSet;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::editing;
use crate::error::CommandError;
use crate::grouping::{self, ClassGroupView, ClassView};
use crate::improvement;
use crate::models::{AdviceItem, Catalog, Roster, SelectionState, Student, StudentId};
use crate::render::{self, ExportSink};
use crate::report;
use crate::seed::SeedData;
use crate::store::{Store, CRITERIA_KEY, ROSTER_KEY};

#[derive(Debug, Clone)]
pub struct AppState {
    pub roster: Roster,
    pub catalog: Catalog,
}

#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub pages: usize,
}

/// Owns the roster and criteria tables for the session and runs every
/// user command against them.
pub struct App {
    store: Store,
    state: AppState,
}

impl App {
    /// Stored overrides win over the seed data.
    pub async fn start(store: Store, seed: SeedData) -> Self {
        let roster = store.load(ROSTER_KEY, seed.roster).await;
        let catalog = store.load(CRITERIA_KEY, seed.catalog).await;
        tracing::debug!(students = roster.len(), "application state ready");
        Self {
            store,
            state: AppState { roster, catalog },
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn group_editor(&self) -> ClassView<'_> {
        grouping::group_by_class(&self.state.roster)
    }

    pub fn student_selector(&self) -> ClassGroupView<'_> {
        grouping::group_by_class_and_group(&self.state.roster)
    }

    pub fn criteria_editor(&self) -> &Catalog {
        &self.state.catalog
    }

    /// Tables only change once the store has accepted the new value.
    pub async fn save_groups(
        &mut self,
        edits: &[(StudentId, String)],
    ) -> Result<usize, CommandError> {
        let mut roster = self.state.roster.clone();
        let moved = editing::apply_group_edits(&mut roster, edits)?;
        self.store
            .save(ROSTER_KEY, &roster)
            .await
            .map_err(CommandError::Save)?;
        self.state.roster = roster;
        Ok(moved)
    }

    pub async fn save_criteria(
        &mut self,
        code: &str,
        suggestions: Option<&str>,
        improvements: Option<&str>,
    ) -> Result<(), CommandError> {
        let mut catalog = self.state.catalog.clone();
        editing::replace_phrases(&mut catalog, code, suggestions, improvements)?;
        self.store
            .save(CRITERIA_KEY, &catalog)
            .await
            .map_err(CommandError::Save)?;
        self.state.catalog = catalog;
        Ok(())
    }

    pub async fn import_roster(
        &mut self,
        students: Vec<Student>,
    ) -> Result<Vec<StudentId>, CommandError> {
        let mut roster = self.state.roster.clone();
        let ids: Vec<StudentId> = students.into_iter().map(|s| roster.push(s)).collect();
        self.store
            .save(ROSTER_KEY, &roster)
            .await
            .map_err(CommandError::Save)?;
        self.state.roster = roster;
        Ok(ids)
    }

    pub fn progress_advice(
        &self,
        selection: &SelectionState,
    ) -> Result<Vec<AdviceItem>, CommandError> {
        improvement::progress_advice(&self.state.catalog, selection)
    }

    pub fn export(
        &self,
        selected: &[StudentId],
        selection: &SelectionState,
        date: NaiveDate,
        sink: &dyn ExportSink,
    ) -> Result<ExportOutcome, CommandError> {
        if selected.is_empty() {
            return Err(CommandError::EmptySelection);
        }

        // The selection is a set: repeats collapse onto their first position.
        let mut seen = HashSet::new();
        let selected: Vec<StudentId> = selected
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();

        let export_date = render::format_export_date(date);
        let entries = report::build_report_entries(
            &selected,
            &self.state.roster,
            &self.state.catalog,
            selection,
            &export_date,
        )?;
        let document = render::render_document(&entries);
        let path = sink.write(&render::export_filename(selected.len()), &document)?;

        tracing::info!(pages = entries.len(), path = %path.display(), "export written");
        Ok(ExportOutcome {
            path,
            pages: entries.len(),
        })
    }
}
