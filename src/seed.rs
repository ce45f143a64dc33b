use std::path::Path;

use anyhow::Context;

use crate::editing::coerce_group;
use crate::models::{Catalog, Roster, Student};

pub const ROSTER_SEED_FILE: &str = "eleves.json";
pub const CRITERIA_SEED_FILE: &str = "criteres.json";

#[derive(Debug, Clone)]
pub struct SeedData {
    pub roster: Roster,
    pub catalog: Catalog,
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("lecture impossible du fichier initial {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("fichier initial invalide : {}", path.display()))
}

/// Reads both bundled datasets. Either one failing aborts startup.
pub async fn load_seed(data_dir: &Path) -> anyhow::Result<SeedData> {
    let roster_path = data_dir.join(ROSTER_SEED_FILE);
    let criteria_path = data_dir.join(CRITERIA_SEED_FILE);

    let (roster, catalog) = tokio::try_join!(
        read_json::<Roster>(&roster_path),
        read_json::<Catalog>(&criteria_path)
    )?;

    if roster.is_empty() {
        tracing::warn!(path = %roster_path.display(), "seed roster is empty");
    }
    tracing::info!(
        students = roster.len(),
        criteria = catalog.iter().count(),
        "seed data loaded"
    );
    Ok(SeedData { roster, catalog })
}

/// Reads `prenom,nom,classe,groupe` rows. The group column may be blank.
pub fn read_roster_csv(csv_path: &Path) -> anyhow::Result<Vec<Student>> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        prenom: String,
        nom: String,
        classe: String,
        #[serde(default)]
        groupe: String,
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(csv_path)
        .with_context(|| format!("ouverture impossible de {}", csv_path.display()))?;

    let mut students = Vec::new();
    for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("ligne {} de la liste d'élèves invalide", line + 1))?;
        students.push(Student {
            first_name: row.prenom,
            last_name: row.nom,
            class: row.classe,
            group: coerce_group(&row.groupe),
        });
    }

    Ok(students)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ROSTER: &str = r#"[
        {"prenom": "Léa", "nom": "Martin", "classe": "2A", "groupe": 2},
        {"prenom": "Hugo", "nom": "Leroy", "classe": "1B"}
    ]"#;
    const CRITERIA: &str = r#"[
        {"code": "oral", "label": "Oral", "icon": "fa-comments",
         "suggestions": ["Bien", "Moyen"], "improvements": ["Continuer"]}
    ]"#;

    #[tokio::test]
    async fn loads_both_datasets() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(ROSTER_SEED_FILE), ROSTER).unwrap();
        std::fs::write(dir.path().join(CRITERIA_SEED_FILE), CRITERIA).unwrap();

        let seed = load_seed(dir.path()).await.unwrap();
        assert_eq!(seed.roster.len(), 2);
        assert_eq!(seed.catalog.get("oral").unwrap().suggestions.len(), 2);
    }

    #[tokio::test]
    async fn missing_dataset_is_fatal() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(ROSTER_SEED_FILE), ROSTER).unwrap();

        let err = load_seed(dir.path()).await.unwrap_err();
        assert!(err.to_string().contains(CRITERIA_SEED_FILE));
    }

    #[tokio::test]
    async fn malformed_dataset_is_fatal() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(ROSTER_SEED_FILE), "[{").unwrap();
        std::fs::write(dir.path().join(CRITERIA_SEED_FILE), CRITERIA).unwrap();

        assert!(load_seed(dir.path()).await.is_err());
    }

    #[test]
    fn csv_rows_become_students() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("roster.csv");
        std::fs::write(
            &path,
            "prenom,nom,classe,groupe\nInès, Moreau ,2A,3\nTom,Garcia,2A,\nZoé,Faure,1B,abc\n",
        )
        .unwrap();

        let students = read_roster_csv(&path).unwrap();
        assert_eq!(students.len(), 3);
        assert_eq!(students[0].last_name, "Moreau");
        assert_eq!(students[0].group, 3);
        assert_eq!(students[1].group, 1);
        assert_eq!(students[2].group, 1);
    }
}
