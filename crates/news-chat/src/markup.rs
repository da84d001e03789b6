//! Decoration of backend text for display.
//!
//! These helpers are pure string transformations. They do not escape
//! their input, so HTML produced from untrusted text must be treated
//! accordingly.

use std::fmt::Display;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, TimeZone};
use news_chat_model::parse_timestamp;
use regex::Regex;

static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());

static QUERY_WORDS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"search term|keyword|query").unwrap());
static ADVICE_WORDS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"suggestion|recommend|try").unwrap());
static NUMBERED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.").unwrap());

struct AssistantPatterns {
    h3: Regex,
    h2: Regex,
    h1: Regex,
    bold: Regex,
    italic: Regex,
    numbered_item: Regex,
    bullet_item: Regex,
}

static ASSISTANT_PATTERNS: LazyLock<AssistantPatterns> =
    LazyLock::new(|| AssistantPatterns {
        h3: Regex::new(r"(?m)^### (.*)$").unwrap(),
        h2: Regex::new(r"(?m)^## (.*)$").unwrap(),
        h1: Regex::new(r"(?m)^# (.*)$").unwrap(),
        bold: Regex::new(r"\*\*(.*?)\*\*").unwrap(),
        italic: Regex::new(r"\*(.*?)\*").unwrap(),
        numbered_item: Regex::new(r"(?m)^\s*\d+\.\s+(.*)$").unwrap(),
        bullet_item: Regex::new(r"(?m)^\s*[-*]\s+(.*)$").unwrap(),
    });

/// Formats an article date as `yyyy-mm-dd`.
///
/// Returns an empty string for empty input and the input itself when it
/// is not a recognizable date.
pub fn format_date(date: &str) -> String {
    if date.is_empty() {
        return String::new();
    }
    let parsed = parse_timestamp(date)
        .map(|timestamp| timestamp.date_naive())
        .or_else(|| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
        .or_else(|| {
            DateTime::parse_from_rfc2822(date)
                .ok()
                .map(|timestamp| timestamp.date_naive())
        });
    match parsed {
        Some(day) => day.format("%Y-%m-%d").to_string(),
        None => date.to_owned(),
    }
}

/// Formats the time of day of a transcript entry as `HH:MM`.
pub fn format_time<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    timestamp.format("%H:%M").to_string()
}

/// Turns the backend's rephrasing advice into a Markdown section.
///
/// Paragraphs are separated by blank lines. Paragraphs that look like
/// lists are kept verbatim; in the others, words about queries are set in
/// bold and words about advice in italics.
pub fn format_suggestion_to_markdown(suggestion: &str) -> String {
    if suggestion.is_empty() {
        return String::new();
    }

    let paragraphs = suggestion
        .split("\n\n")
        .filter(|paragraph| !paragraph.trim().is_empty())
        .map(|paragraph| {
            if paragraph.contains("- ") || NUMBERED_RE.is_match(paragraph) {
                return paragraph.to_owned();
            }
            let emphasized = QUERY_WORDS_RE.replace_all(paragraph, "**${0}**");
            ADVICE_WORDS_RE
                .replace_all(&emphasized, "*${0}*")
                .into_owned()
        })
        .collect::<Vec<_>>();

    format!("### Search Suggestions\n\n{}", paragraphs.join("\n\n"))
}

/// Converts Markdown links into anchors that open in a new tab.
pub fn linkify(text: &str) -> String {
    LINK_RE
        .replace_all(
            text,
            r#"<a href="${2}" target="_blank" rel="noopener noreferrer">${1}</a>"#,
        )
        .into_owned()
}

/// Converts the Markdown subset used in assistant answers into HTML.
///
/// Handles headings, bold and italic text, list items, paragraph breaks
/// and links.
pub fn process_assistant_message(content: &str) -> String {
    if content.is_empty() {
        return String::new();
    }

    let patterns = &*ASSISTANT_PATTERNS;
    let processed = patterns.h3.replace_all(content, "<h3>${1}</h3>");
    let processed = patterns.h2.replace_all(&processed, "<h2>${1}</h2>");
    let processed = patterns.h1.replace_all(&processed, "<h1>${1}</h1>");
    let processed = patterns
        .bold
        .replace_all(&processed, "<strong>${1}</strong>");
    let processed = patterns.italic.replace_all(&processed, "<em>${1}</em>");
    let processed = patterns
        .numbered_item
        .replace_all(&processed, "<li>${1}</li>");
    let processed = patterns
        .bullet_item
        .replace_all(&processed, "<li>${1}</li>");
    let processed = processed.replace("\n\n", "<br/><br/>");

    linkify(&processed)
}
