use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgGroup, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod app;
mod config;
mod editing;
mod error;
mod grouping;
mod improvement;
mod models;
mod render;
mod report;
mod seed;
mod store;
mod views;

use app::App;
use config::Config;
use error::CommandError;
use models::{SelectionState, StudentId};
use render::HtmlFileSink;
use store::Store;

#[derive(Parser)]
#[command(name = "appreciations")]
#[command(about = "Per-student appreciation reports by class and group", long_about = None)]
struct Cli {
    /// SQLite file holding saved edits
    #[arg(long, global = true)]
    store: Option<PathBuf>,
    /// Directory with eleves.json and criteres.json
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List students by class with their current group
    Groups,
    /// Change student groups, e.g. --set 4=2
    SaveGroups {
        #[arg(long = "set", value_parser = parse_group_edit, required = true)]
        edits: Vec<(StudentId, String)>,
    },
    /// List criteria with their numbered phrases
    Criteria,
    /// Replace a criterion's phrase lists from one-per-line text files
    #[command(group(
        ArgGroup::new("lists")
            .args(["suggestions", "improvements"])
            .multiple(true)
            .required(true)
    ))]
    SaveCriteria {
        #[arg(long)]
        code: String,
        #[arg(long)]
        suggestions: Option<PathBuf>,
        #[arg(long)]
        improvements: Option<PathBuf>,
    },
    /// Show students by class and group
    Selector,
    /// Append students from a prenom,nom,classe,groupe CSV file
    ImportRoster {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Compute the "Pour progresser" list for the chosen appreciations
    Advice {
        /// CODE=N (1-based) or CODE=exact phrase
        #[arg(long = "choice", value_parser = parse_choice)]
        choices: Vec<(String, String)>,
    },
    /// Write the report for the selected students
    Export {
        #[arg(long = "student")]
        students: Vec<StudentId>,
        /// CODE=N (1-based) or CODE=exact phrase
        #[arg(long = "choice", value_parser = parse_choice)]
        choices: Vec<(String, String)>,
        /// Leave this criterion's advice out of the report
        #[arg(long = "skip-advice")]
        skip_advice: Vec<String>,
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

fn split_pair(raw: &str) -> Result<(&str, &str), String> {
    raw.split_once('=')
        .ok_or_else(|| format!("format attendu CLE=VALEUR, reçu `{raw}`"))
}

fn parse_group_edit(raw: &str) -> Result<(StudentId, String), String> {
    let (id, group) = split_pair(raw)?;
    let id = id
        .parse::<StudentId>()
        .map_err(|err| format!("identifiant d'élève invalide `{id}` : {err}"))?;
    Ok((id, group.to_string()))
}

fn parse_choice(raw: &str) -> Result<(String, String), String> {
    let (code, choice) = split_pair(raw)?;
    Ok((code.trim().to_string(), choice.to_string()))
}

fn selection_from(
    app: &App,
    choices: &[(String, String)],
    skip_advice: &[String],
) -> Result<SelectionState, CommandError> {
    let catalog = app.criteria_editor();
    let mut selection = SelectionState::default();
    for (code, choice) in choices {
        selection.choose(code.clone(), catalog.resolve_choice(code, choice)?);
    }
    for code in skip_advice {
        if catalog.get(code).is_none() {
            return Err(CommandError::UnknownCriterion(code.clone()));
        }
        selection.set_improvement_included(code.clone(), false);
    }
    Ok(selection)
}

fn read_optional(path: Option<&PathBuf>) -> anyhow::Result<Option<String>> {
    path.map(|p| {
        std::fs::read_to_string(p).with_context(|| format!("lecture impossible de {}", p.display()))
    })
    .transpose()
}

async fn run(app: &mut App, command: Commands, config: &Config) -> anyhow::Result<()> {
    match command {
        Commands::Groups => {
            print!("{}", views::group_editor(&app.group_editor()));
        }
        Commands::SaveGroups { edits } => {
            let moved = app.save_groups(&edits).await?;
            println!("Groupes sauvegardés ({moved} élève(s) déplacé(s)).");
        }
        Commands::Criteria => {
            print!("{}", views::criteria_editor(app.criteria_editor()));
        }
        Commands::SaveCriteria {
            code,
            suggestions,
            improvements,
        } => {
            let suggestions = read_optional(suggestions.as_ref())?;
            let improvements = read_optional(improvements.as_ref())?;
            app.save_criteria(&code, suggestions.as_deref(), improvements.as_deref())
                .await?;
            println!("Appréciations sauvegardées.");
        }
        Commands::Selector => {
            print!("{}", views::student_selector(&app.student_selector()));
        }
        Commands::ImportRoster { csv } => {
            let students = seed::read_roster_csv(&csv)?;
            let ids = app.import_roster(students).await?;
            println!(
                "{} élève(s) importé(s) depuis {} ({} au total).",
                ids.len(),
                csv.display(),
                app.state().roster.len()
            );
        }
        Commands::Advice { choices } => {
            let selection = selection_from(app, &choices, &[])?;
            let advice = app.progress_advice(&selection)?;
            print!("{}", views::advice_list(&advice));
        }
        Commands::Export {
            students,
            choices,
            skip_advice,
            out_dir,
        } => {
            let selection = selection_from(app, &choices, &skip_advice)?;
            let sink = HtmlFileSink::new(out_dir.unwrap_or_else(|| config.export_dir.clone()));
            tracing::debug!(dir = %sink.dir().display(), "exporting");
            let today = chrono::Local::now().date_naive();
            let outcome = app.export(&students, &selection, today, &sink)?;
            println!(
                "Appréciations de {} élève(s) exportées dans {}.",
                outcome.pages,
                outcome.path.display()
            );
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(store) = cli.store {
        config.store_path = store;
    }
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let seed = seed::load_seed(&config.data_dir)
        .await
        .context("chargement des données initiales impossible")?;
    let store = Store::open(&config.store_path).await;
    let mut app = App::start(store, seed).await;

    match run(&mut app, cli.command, &config).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => match err.downcast_ref::<CommandError>() {
            Some(command_err) => {
                eprintln!("{command_err}");
                Ok(ExitCode::from(command_err.exit_code()))
            }
            None => Err(err),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn export_arguments_parse() {
        let cli = Cli::try_parse_from([
            "appreciations",
            "export",
            "--student",
            "5",
            "--student",
            "2",
            "--choice",
            "oral=2",
            "--choice",
            "soin=Très soigné",
            "--skip-advice",
            "soin",
        ])
        .unwrap();

        let Commands::Export {
            students,
            choices,
            skip_advice,
            out_dir,
        } = cli.command
        else {
            panic!("expected export");
        };
        assert_eq!(students, vec![StudentId::new(5), StudentId::new(2)]);
        assert_eq!(choices[1], ("soin".to_string(), "Très soigné".to_string()));
        assert_eq!(skip_advice, vec!["soin".to_string()]);
        assert!(out_dir.is_none());
    }

    #[test]
    fn save_criteria_needs_a_list_file() {
        let err = Cli::try_parse_from(["appreciations", "save-criteria", "--code", "oral"])
            .err()
            .unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);

        for flag in ["--suggestions", "--improvements"] {
            let cli = Cli::try_parse_from([
                "appreciations",
                "save-criteria",
                "--code",
                "oral",
                flag,
                "lines.txt",
            ]);
            assert!(cli.is_ok(), "{flag} alone should be accepted");
        }

        let both = Cli::try_parse_from([
            "appreciations",
            "save-criteria",
            "--code",
            "oral",
            "--suggestions",
            "a.txt",
            "--improvements",
            "b.txt",
        ]);
        assert!(both.is_ok());
    }

    #[test]
    fn group_edits_need_key_value_pairs() {
        assert_eq!(
            parse_group_edit("3=abc").unwrap(),
            (StudentId::new(3), "abc".to_string())
        );
        assert!(parse_group_edit("3").is_err());
        assert!(parse_group_edit("x=2").is_err());
    }
}
