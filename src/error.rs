use std::path::PathBuf;

use thiserror::Error;

use crate::models::StudentId;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),
    #[error("could not serialize value for `{key}`: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures of a user-triggered command. None of these abort the program:
/// the front end turns each one into a message.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Veuillez sélectionner au moins un élève.")]
    EmptySelection,
    #[error("Veuillez sélectionner au moins une appréciation.")]
    NoAppreciation,
    #[error("Élève inconnu : {0}.")]
    UnknownStudent(StudentId),
    #[error("Critère inconnu : `{0}`.")]
    UnknownCriterion(String),
    #[error("Le critère `{code}` n'a aucune appréciation correspondant à `{choice}`.")]
    UnknownSuggestion { code: String, choice: String },
    #[error("Impossible de sauvegarder les données. Le stockage local est peut-être plein ou indisponible.")]
    Save(#[source] StoreError),
    #[error("Impossible d'écrire l'export dans {} : {source}", .path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CommandError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            CommandError::EmptySelection | CommandError::NoAppreciation => 2,
            CommandError::UnknownStudent(_)
            | CommandError::UnknownCriterion(_)
            | CommandError::UnknownSuggestion { .. } => 3,
            CommandError::Save(_) => 4,
            CommandError::Export { .. } => 5,
        }
    }
}
