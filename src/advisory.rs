//! Best-effort extraction of the structured summary block the docent is
//! asked to append to every workshop reply.
//!
//! The block is advisory only. It may be absent, malformed, or disagree
//! with the controller's own tally; none of those are errors here.

use regex_lite::Regex;
use serde::Deserialize;

/// The backend's own view of the session, as embedded in its reply.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Advisory {
    #[serde(default)]
    pub current_objects: Vec<String>,
    #[serde(default)]
    pub current_colors: Vec<String>,
    #[serde(default)]
    pub is_complete: bool,
}

/// Split a raw reply into display text and the optional advisory block.
///
/// The last JSON object mentioning `current_objects` wins. Whatever is
/// matched is removed from the display text along with any code fence that
/// only existed to carry it.
pub fn extract(text: &str) -> (String, Option<Advisory>) {
    let Ok(re) = Regex::new(r#"\{[^{}]*"current_objects"[^{}]*\}"#) else {
        return (text.to_string(), None);
    };

    let Some(found) = re.find_iter(text).last() else {
        return (tidy(text, text.len()..text.len()), None);
    };

    let advisory = serde_json::from_str::<Advisory>(found.as_str()).ok();
    (tidy(text, found.start()..found.end()), advisory)
}

fn tidy(text: &str, block: std::ops::Range<usize>) -> String {
    let mut remainder = String::with_capacity(text.len());
    remainder.push_str(&text[..block.start]);
    remainder.push_str(&text[block.end..]);

    remainder
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            trimmed != "```" && trimmed != "```json"
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_block_is_parsed_and_stripped() {
        let reply = "이제 2번째 조각이 놓였습니다.\n\n```json\n{\"current_objects\": [\"고양이\", \"열쇠\"], \"current_colors\": [], \"is_complete\": false}\n```";
        let (text, advisory) = extract(reply);
        let advisory = advisory.unwrap();
        assert_eq!(advisory.current_objects, vec!["고양이", "열쇠"]);
        assert!(advisory.current_colors.is_empty());
        assert!(!advisory.is_complete);
        assert_eq!(text, "이제 2번째 조각이 놓였습니다.");
    }

    #[test]
    fn bare_block_is_parsed() {
        let reply = "모든 조각과 색이 채워졌습니다.\n{\"current_objects\": [\"a\", \"b\", \"c\"], \"current_colors\": [\"violet\", \"gold\"], \"is_complete\": true}";
        let (text, advisory) = extract(reply);
        assert!(advisory.unwrap().is_complete);
        assert_eq!(text, "모든 조각과 색이 채워졌습니다.");
    }

    #[test]
    fn missing_block_is_not_an_error() {
        let (text, advisory) = extract("남은 조각은 1개입니다.");
        assert!(advisory.is_none());
        assert_eq!(text, "남은 조각은 1개입니다.");
    }

    #[test]
    fn malformed_block_is_stripped_but_ignored() {
        let reply = "답변.\n{\"current_objects\": not-json, \"current_colors\"}";
        let (text, advisory) = extract(reply);
        assert!(advisory.is_none());
        assert_eq!(text, "답변.");
    }

    #[test]
    fn last_block_wins() {
        let reply = "x {\"current_objects\": [\"a\"], \"current_colors\": [], \"is_complete\": false} y {\"current_objects\": [\"a\", \"b\"], \"current_colors\": [], \"is_complete\": false}";
        let (_, advisory) = extract(reply);
        assert_eq!(advisory.unwrap().current_objects.len(), 2);
    }

    #[test]
    fn missing_fields_default() {
        let reply = "{\"current_objects\": [\"a\"]}";
        let (_, advisory) = extract(reply);
        let advisory = advisory.unwrap();
        assert!(advisory.current_colors.is_empty());
        assert!(!advisory.is_complete);
    }
}
