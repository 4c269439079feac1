use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

const QUESTION_MARKER: &str = "Question:";
const ANSWER_MARKER: &str = "Answer:";

/// One evaluation unit: a prompt and the sampled answers to score.
///
/// Fields other than `question` and `answers[].text` are ignored, so
/// records that already carry evaluation metadata load as is.
#[derive(Deserialize, Clone, Debug)]
pub struct Record {
    pub question: String,
    #[serde(default)]
    pub answers: Vec<Answer>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct Answer {
    pub text: String,
}

/// Reads a JSON array of records from a file.
///
/// - Reads the entire file into memory
/// - Fails on I/O errors and malformed JSON
pub fn read_records<P: AsRef<Path>>(filename: P) -> Result<Vec<Record>, Box<dyn std::error::Error>> {
    let mut contents = String::new();
    File::open(filename)?.read_to_string(&mut contents)?;
    parse_records(&contents)
}

/// Parses a JSON array of records.
pub fn parse_records(contents: &str) -> Result<Vec<Record>, Box<dyn std::error::Error>> {
    Ok(serde_json::from_str(contents)?)
}

/// Extracts the question from a prompt.
///
/// Returns the trimmed text between the first `Question:` and the next
/// `Answer:`. Prompts without both markers are returned unchanged.
pub fn extract_question(prompt: &str) -> &str {
    let Some(start) = prompt.find(QUESTION_MARKER) else {
        return prompt;
    };
    let rest = &prompt[start + QUESTION_MARKER.len()..];
    match rest.find(ANSWER_MARKER) {
        Some(end) => rest[..end].trim(),
        None => prompt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_text_between_markers() {
        let prompt = "Solve it.\nQuestion:  A car drives 5 km.\nHow far?\n Answer: <think>";
        assert_eq!(extract_question(prompt), "A car drives 5 km.\nHow far?");
    }

    #[test]
    fn falls_back_to_whole_prompt() {
        assert_eq!(extract_question("How far?"), "How far?");
        assert_eq!(extract_question("Question: how far?"), "Question: how far?");
    }

    #[test]
    fn parses_records_and_ignores_extra_fields() {
        let records = parse_records(
            r#"[
                {"question": "Question: 1 + 1 Answer:", "answers": [{"text": "2", "answer_eval": {"correct": true}}]},
                {"question": "q", "evaluation": {"pass@n": false}}
            ]"#,
        )
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].answers[0].text, "2");
        assert!(records[1].answers.is_empty());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(parse_records("{").is_err());
    }
}
