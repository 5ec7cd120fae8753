use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use engine::HubDef;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

pub(crate) const HUBS_FILE: &str = "hubs.json";
pub(crate) const QUIZZES_FILE: &str = "quizzes.json";

const MAX_OPTIONS: usize = 4;

#[derive(Debug, Error)]
pub(crate) enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{file} at {json_path}: {message}")]
    Parse {
        file: String,
        json_path: String,
        message: String,
    },
    #[error("{file} declares scene id '{id}' more than once")]
    DuplicateId { file: String, id: String },
    #[error("quiz '{deck}' has no questions")]
    EmptyDeck { deck: String },
    #[error("quiz '{deck}' question {index}: {reason}")]
    InvalidQuestion {
        deck: String,
        index: usize,
        reason: String,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct HubFile {
    hubs: Vec<HubDef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct QuizFile {
    decks: Vec<QuizDeck>,
}

/// A multiple-choice quiz. `answer` indexes into `options`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct QuizQuestion {
    pub(crate) prompt: String,
    pub(crate) options: Vec<String>,
    pub(crate) answer: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct QuizDeck {
    pub(crate) id: String,
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) music: Option<String>,
    /// Questions drawn per play; the whole deck when absent.
    #[serde(default)]
    pub(crate) questions_per_run: Option<usize>,
    pub(crate) questions: Vec<QuizQuestion>,
}

/// Game data loaded once at startup.
#[derive(Debug, Clone, Default)]
pub(crate) struct GameCatalog {
    hubs: Vec<HubDef>,
    quizzes: BTreeMap<String, QuizDeck>,
}

impl GameCatalog {
    pub(crate) fn load(assets_dir: &Path) -> Result<Self, CatalogError> {
        let hubs_text = read(&assets_dir.join(HUBS_FILE))?;
        let quizzes_text = read(&assets_dir.join(QUIZZES_FILE))?;
        let catalog = Self::from_json(&hubs_text, &quizzes_text)?;
        info!(
            hubs = catalog.hubs.len(),
            quizzes = catalog.quizzes.len(),
            dir = %assets_dir.display(),
            "catalog_loaded"
        );
        Ok(catalog)
    }

    pub(crate) fn from_json(hubs_text: &str, quizzes_text: &str) -> Result<Self, CatalogError> {
        let hub_file: HubFile = parse(HUBS_FILE, hubs_text)?;
        let quiz_file: QuizFile = parse(QUIZZES_FILE, quizzes_text)?;

        let mut hub_ids = BTreeSet::new();
        for hub in &hub_file.hubs {
            if !hub_ids.insert(hub.id.as_str()) {
                return Err(CatalogError::DuplicateId {
                    file: HUBS_FILE.to_string(),
                    id: hub.id.clone(),
                });
            }
        }

        let mut quizzes = BTreeMap::new();
        for deck in quiz_file.decks {
            validate_deck(&deck)?;
            // Hubs and decks register under the same scene ids.
            if quizzes.contains_key(&deck.id) || hub_ids.contains(deck.id.as_str()) {
                return Err(CatalogError::DuplicateId {
                    file: QUIZZES_FILE.to_string(),
                    id: deck.id,
                });
            }
            quizzes.insert(deck.id.clone(), deck);
        }

        Ok(Self {
            hubs: hub_file.hubs,
            quizzes,
        })
    }

    pub(crate) fn hubs(&self) -> &[HubDef] {
        &self.hubs
    }

    pub(crate) fn quizzes(&self) -> impl Iterator<Item = &QuizDeck> {
        self.quizzes.values()
    }

    #[cfg(test)]
    pub(crate) fn quiz(&self, id: &str) -> Option<&QuizDeck> {
        self.quizzes.get(id)
    }

    pub(crate) fn quiz_count(&self) -> usize {
        self.quizzes.len()
    }
}

fn read(path: &Path) -> Result<String, CatalogError> {
    fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn parse<T: DeserializeOwned>(file: &str, text: &str) -> Result<T, CatalogError> {
    let mut deserializer = serde_json::Deserializer::from_str(text);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
        let json_path = error.path().to_string();
        let source = error.into_inner();
        CatalogError::Parse {
            file: file.to_string(),
            json_path,
            message: source.to_string(),
        }
    })
}

fn validate_deck(deck: &QuizDeck) -> Result<(), CatalogError> {
    if deck.questions.is_empty() || deck.questions_per_run == Some(0) {
        return Err(CatalogError::EmptyDeck {
            deck: deck.id.clone(),
        });
    }
    for (index, question) in deck.questions.iter().enumerate() {
        let invalid = |reason: String| CatalogError::InvalidQuestion {
            deck: deck.id.clone(),
            index,
            reason,
        };
        if !(2..=MAX_OPTIONS).contains(&question.options.len()) {
            return Err(invalid(format!(
                "expected 2 to {MAX_OPTIONS} options, found {}",
                question.options.len()
            )));
        }
        if question.answer >= question.options.len() {
            return Err(invalid(format!(
                "answer index {} is out of range",
                question.answer
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HUBS: &str = r#"{
        "hubs": [
            {
                "id": "library",
                "map": "library",
                "zones": [
                    { "id": "maze", "area": [496, 880, 20, 20], "target": "maze" },
                    {
                        "id": "locked",
                        "area": [494, 288, 100, 100],
                        "target": "access_denied",
                        "policy": "reenter_fresh"
                    }
                ]
            }
        ]
    }"#;

    const QUIZZES: &str = r#"{
        "decks": [
            {
                "id": "math_olympus",
                "title": "Math Olympus",
                "questions_per_run": 1,
                "questions": [
                    {
                        "prompt": "If 3x + 2 = 11, what is x?",
                        "options": ["3", "2", "5"],
                        "answer": 0
                    }
                ]
            }
        ]
    }"#;

    #[test]
    fn loads_hubs_and_quizzes() {
        let catalog = GameCatalog::from_json(HUBS, QUIZZES).expect("catalog");
        assert_eq!(catalog.hubs().len(), 1);
        assert_eq!(catalog.hubs()[0].zones.len(), 2);
        let deck = catalog.quiz("math_olympus").expect("deck");
        assert_eq!(deck.questions[0].options[deck.questions[0].answer], "3");
    }

    #[test]
    fn parse_errors_name_the_json_path() {
        let broken = HUBS.replace("[494, 288, 100, 100]", "\"wide\"");
        let error = GameCatalog::from_json(&broken, QUIZZES).expect_err("area is not a rect");
        match error {
            CatalogError::Parse { file, json_path, .. } => {
                assert_eq!(file, HUBS_FILE);
                assert_eq!(json_path, "hubs[0].zones[1].area");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let broken = HUBS.replace("reenter_fresh", "sometimes");
        assert!(matches!(
            GameCatalog::from_json(&broken, QUIZZES),
            Err(CatalogError::Parse { .. })
        ));
    }

    #[test]
    fn answer_must_index_an_option() {
        let broken = QUIZZES.replace("\"answer\": 0", "\"answer\": 3");
        assert!(matches!(
            GameCatalog::from_json(HUBS, &broken),
            Err(CatalogError::InvalidQuestion { index: 0, .. })
        ));
    }

    #[test]
    fn duplicate_hub_ids_are_rejected() {
        let doubled = r#"{ "hubs": [
            { "id": "maze", "map": "maze", "zones": [] },
            { "id": "maze", "map": "maze", "zones": [] }
        ] }"#;
        assert!(matches!(
            GameCatalog::from_json(doubled, QUIZZES),
            Err(CatalogError::DuplicateId { id, .. }) if id == "maze"
        ));
    }

    #[test]
    fn deck_reusing_a_hub_id_is_rejected() {
        let clashing = QUIZZES.replace("\"id\": \"math_olympus\"", "\"id\": \"library\"");
        assert!(matches!(
            GameCatalog::from_json(HUBS, &clashing),
            Err(CatalogError::DuplicateId { file, id }) if file == QUIZZES_FILE && id == "library"
        ));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join(HUBS_FILE), HUBS).expect("write hubs");

        let error = GameCatalog::load(dir.path()).expect_err("quizzes.json is missing");
        assert!(matches!(error, CatalogError::Read { path, .. } if path.ends_with(QUIZZES_FILE)));
    }
}
