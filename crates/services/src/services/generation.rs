use once_cell::sync::Lazy;
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{config::GenerationConfig, parse_provider_error};

const TASKS_PER_TOPIC: usize = 5;
const MIN_TASK_LEN: usize = 3;

// "1. ", "2) " and similar markers anywhere in the text.
static ENUMERATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+\s*[.)]\s+").expect("valid enumeration regex"));
// Leading list markers on a single line, numbered or bulleted.
static LIST_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:\d+\s*[.)]|[-*•])\s+").expect("valid list marker regex"));

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Task generation request failed: {0}")]
    Upstream(#[from] reqwest::Error),
    #[error("Task generation failed: {0}")]
    Provider(String),
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Turns a free-text topic into a short list of candidate task titles via
/// the generative-language API. Nothing here touches the database; callers
/// decide what, if anything, gets saved.
#[derive(Clone)]
pub struct GenerationService {
    client: reqwest::Client,
    api_base: String,
    api_key: SecretString,
    model: String,
}

impl GenerationService {
    pub fn new(client: reqwest::Client, config: GenerationConfig) -> Self {
        Self {
            client,
            api_base: config.api_base,
            api_key: config.api_key,
            model: config.model,
        }
    }

    pub async fn generate_tasks(&self, topic: &str) -> Result<Vec<String>, GenerationError> {
        let url = generate_url(&self.api_base, &self.model, self.api_key.expose_secret());
        let request_body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_prompt(topic),
                }],
            }],
        };

        let response = self.client.post(url).json(&request_body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = parse_provider_error(&body)
                .unwrap_or_else(|| format!("generation failed with status {status}"));
            return Err(GenerationError::Provider(message));
        }

        let data = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|err| GenerationError::Provider(format!("unusable response: {err}")))?;

        Ok(parse_task_lines(&response_text(data)))
    }
}

fn generate_url(api_base: &str, model: &str, api_key: &str) -> String {
    format!(
        "{}/v1beta/models/{}:generateContent?key={}",
        api_base.trim_end_matches('/'),
        model,
        api_key
    )
}

fn build_prompt(topic: &str) -> String {
    format!(
        "Generate a list of exactly {count} concise, actionable tasks to learn about \"{topic}\".\n\
         Format the output strictly as:\n\
         1. First task\n\
         2. Second task\n\
         3. Third task\n\
         4. Fourth task\n\
         5. Fifth task\n\
         Do not include any introduction or explanation.",
        count = TASKS_PER_TOPIC,
        topic = topic
    )
}

fn response_text(data: GenerateContentResponse) -> String {
    data.candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default()
}

/// Splits raw model output into task titles. The upstream format is not
/// guaranteed, so this tolerates numbered lists, bullets, and bare lines;
/// output that parses to nothing yields an empty list, never an error.
fn parse_task_lines(raw: &str) -> Vec<String> {
    let from_enumeration: Vec<String> = ENUMERATION
        .split(raw)
        .map(|item| item.trim().to_string())
        .filter(|item| item.len() > MIN_TASK_LEN)
        .collect();
    if from_enumeration.len() > 1 {
        return from_enumeration;
    }

    raw.lines()
        .map(|line| LIST_MARKER.replace(line, "").trim().to_string())
        .filter(|line| line.len() > MIN_TASK_LEN)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{build_prompt, generate_url, parse_task_lines};

    #[test]
    fn generate_url_joins_base_model_and_key() {
        assert_eq!(
            generate_url("https://generativelanguage.googleapis.com", "gemini-1.5-flash", "k123"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent?key=k123"
        );
        assert_eq!(
            generate_url("http://127.0.0.1:9100/", "gemini-1.5-flash", "k123"),
            "http://127.0.0.1:9100/v1beta/models/gemini-1.5-flash:generateContent?key=k123"
        );
    }

    #[test]
    fn build_prompt_names_the_topic_and_count() {
        let prompt = build_prompt("Rust ownership");
        assert!(prompt.contains("\"Rust ownership\""));
        assert!(prompt.contains("exactly 5"));
    }

    #[test]
    fn parse_task_lines_handles_numbered_lists() {
        let raw = "1. Read the official book\n2. Write a CLI tool\n3. Learn the borrow checker";
        assert_eq!(
            parse_task_lines(raw),
            vec![
                "Read the official book",
                "Write a CLI tool",
                "Learn the borrow checker",
            ]
        );
    }

    #[test]
    fn parse_task_lines_handles_single_line_enumerations() {
        let raw = "1. Read the book 2. Build a project 3. Review notes";
        assert_eq!(
            parse_task_lines(raw),
            vec!["Read the book", "Build a project", "Review notes"]
        );
    }

    #[test]
    fn parse_task_lines_handles_bullets_and_bare_lines() {
        let raw = "- Read the book\n* Build a project\nReview your notes";
        assert_eq!(
            parse_task_lines(raw),
            vec!["Read the book", "Build a project", "Review your notes"]
        );
    }

    #[test]
    fn parse_task_lines_trims_and_drops_short_items() {
        let raw = "1.   Read the book   \n2. ok\n3. Build a project";
        assert_eq!(
            parse_task_lines(raw),
            vec!["Read the book", "Build a project"]
        );
    }

    #[test]
    fn parse_task_lines_of_garbage_is_empty() {
        assert!(parse_task_lines("").is_empty());
        assert!(parse_task_lines("   \n\t\n").is_empty());
        assert!(parse_task_lines("ok\nno\n-").is_empty());
    }

    #[test]
    fn parse_task_lines_accepts_paren_numbering() {
        let raw = "1) Read the book\n2) Build a project";
        assert_eq!(
            parse_task_lines(raw),
            vec!["Read the book", "Build a project"]
        );
    }
}
