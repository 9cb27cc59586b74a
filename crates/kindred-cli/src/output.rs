//! Output formatting utilities

use serde::{Deserialize, Serialize};

use kindred_core::{PersonId, PersonView};

use crate::interpreter::CommandError;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("expected 'text' or 'json', got '{}'", s)),
        }
    }
}

/// One node of a rendered ancestor or descendant tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeLine {
    pub depth: u32,
    pub person: PersonView,
}

/// Successful result of one command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Created(PersonId),
    Done,
    Tree(Vec<TreeLine>),
    People(Vec<PersonView>),
    Spouse(Option<PersonView>),
    Person(PersonView),
    Help(Vec<String>),
    Exit,
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum Response<'a> {
    Ok(&'a Outcome),
    Error { kind: &'static str, message: String },
}

fn text_lines(outcome: &Outcome) -> Vec<String> {
    match outcome {
        Outcome::Created(id) => vec![format!("-> {}", id)],
        Outcome::Done => vec!["OK".to_string()],
        Outcome::Tree(lines) => lines
            .iter()
            .map(|line| {
                format!(
                    "{} {}",
                    "-".repeat(line.depth as usize + 1),
                    line.person.summary()
                )
            })
            .collect(),
        Outcome::People(people) if people.is_empty() => vec!["<none>".to_string()],
        Outcome::People(people) => people
            .iter()
            .map(|p| format!("- {}", p.summary()))
            .collect(),
        Outcome::Spouse(None) => vec!["<none>".to_string()],
        Outcome::Spouse(Some(spouse)) => vec![spouse.summary()],
        Outcome::Person(view) => vec![view.to_string()],
        Outcome::Help(lines) => lines.clone(),
        Outcome::Exit => Vec::new(),
    }
}

/// Render a successful command
pub fn format_outcome(outcome: &Outcome, format: OutputFormat) -> Vec<String> {
    match format {
        OutputFormat::Text => text_lines(outcome),
        OutputFormat::Json => vec![to_json(&Response::Ok(outcome))],
    }
}

/// Render a failed command
pub fn format_error(error: &CommandError, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format!("Error: {}", error),
        OutputFormat::Json => to_json(&Response::Error {
            kind: error.kind(),
            message: error.to_string(),
        }),
    }
}

fn to_json(response: &Response<'_>) -> String {
    serde_json::to_string(response).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kindred_core::Gender;

    fn view(id: &str, name: &str, birth: i32) -> PersonView {
        PersonView {
            id: PersonId::from(id),
            full_name: name.to_string(),
            gender: Gender::Female,
            birth_year: birth,
            death_year: None,
            spouse: None,
            child_count: 0,
        }
    }

    #[test]
    fn test_text_tree_uses_dash_depth() {
        let outcome = Outcome::Tree(vec![
            TreeLine {
                depth: 0,
                person: view("P003", "Carol", 1976),
            },
            TreeLine {
                depth: 1,
                person: view("P001", "Alice", 1950),
            },
        ]);
        assert_eq!(
            format_outcome(&outcome, OutputFormat::Text),
            vec!["- P003 Carol (b.1976)", "-- P001 Alice (b.1950)"]
        );
    }

    #[test]
    fn test_text_empty_lists() {
        assert_eq!(
            format_outcome(&Outcome::People(vec![]), OutputFormat::Text),
            vec!["<none>"]
        );
        assert_eq!(
            format_outcome(&Outcome::Spouse(None), OutputFormat::Text),
            vec!["<none>"]
        );
    }

    #[test]
    fn test_json_envelopes() {
        let ok = format_outcome(&Outcome::Created(PersonId::from("P001")), OutputFormat::Json);
        assert_eq!(ok, vec![r#"{"ok":{"created":"P001"}}"#]);

        let done = format_outcome(&Outcome::Done, OutputFormat::Json);
        assert_eq!(done, vec![r#"{"ok":"done"}"#]);

        let err = CommandError::Tree(kindred_core::Error::UnknownPerson("P9".to_string()));
        let value: serde_json::Value =
            serde_json::from_str(&format_error(&err, OutputFormat::Json)).unwrap();
        assert_eq!(value["error"]["kind"], "unknown_person");
        assert_eq!(value["error"]["message"], "Unknown ID: P9");
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("csv".parse::<OutputFormat>().is_err());
    }
}
