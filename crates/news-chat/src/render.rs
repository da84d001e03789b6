//! Rendering of transcript entries.

use std::fmt::Display;

use chrono::TimeZone;
use news_chat_core::{ChatMessage, Transcript};
use news_chat_model::{Role, SearchResult};

use crate::markup::{
    format_date, format_suggestion_to_markdown, format_time,
    process_assistant_message,
};

const NO_RESULTS: &str = "Sorry, no related information found";
const NO_RELEVANT_RESULTS: &str = "No highly relevant results found. You \
    might want to try different search terms.";

/// Returns the label shown next to an entry.
#[inline]
pub fn role_label(role: Role) -> &'static str {
    match role {
        Role::User => "You",
        Role::Assistant => "Assistant",
    }
}

/// Renders an entry as plain text, with times shown in `tz`.
///
/// The first line is the header (author and time), followed by the text
/// and, for answers to a search, what the search returned.
pub fn render_message<Tz: TimeZone>(msg: &ChatMessage, tz: &Tz) -> String
where
    Tz::Offset: Display,
{
    let mut lines = vec![format!(
        "{} · {}",
        role_label(msg.role()),
        format_time(&msg.timestamp().with_timezone(tz))
    )];
    lines.push(msg.content().to_owned());

    if let Some(results) = msg.results() {
        lines.push(String::new());
        if results.is_empty() {
            push_generated_query(&mut lines, msg);
            lines.push(NO_RESULTS.to_owned());
        } else {
            lines.push(format!("Found {} related information", results.len()));
            push_generated_query(&mut lines, msg);
            if msg.has_relevant_results() == Some(true) {
                for (idx, result) in results.iter().enumerate() {
                    lines.push(String::new());
                    render_result(&mut lines, idx + 1, result);
                }
            } else {
                lines.push(NO_RELEVANT_RESULTS.to_owned());
            }
        }
    }

    if let Some(suggestions) = msg.suggestions().filter(|s| !s.is_empty()) {
        lines.push(String::new());
        lines.push(format_suggestion_to_markdown(suggestions));
    }

    lines.join("\n")
}

fn push_generated_query(lines: &mut Vec<String>, msg: &ChatMessage) {
    if let Some(query) = msg.generated_query() {
        lines.push(format!("Search query: {query}"));
    }
}

fn render_result(lines: &mut Vec<String>, ordinal: usize, result: &SearchResult) {
    lines.push(format!("{ordinal}. {}", result.title));
    lines.push(format!("   {}", result.url));
    match result.date.as_deref().map(format_date) {
        Some(date) if !date.is_empty() => {
            lines.push(format!("   Source: {} • {date}", result.source));
        }
        _ => lines.push(format!("   Source: {}", result.source)),
    }
    lines.push(format!("   {}", result.body));
    if let (Some(score), Some(tier)) =
        (result.relevance_score, result.relevance_tier())
    {
        lines.push(format!("   Relevance: {score}/10 ({})", tier.label()));
        if let Some(reason) = &result.relevance_reason {
            lines.push(format!("   Recommendation reason: {reason}"));
        }
    }
}

/// Renders a whole transcript as a standalone HTML document.
pub fn transcript_to_html(transcript: &Transcript) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
        <title>News Assistant</title>\n</head>\n<body>\n<h3>News Assistant</h3>\n",
    );
    for msg in transcript.items() {
        html.push_str(&message_to_html(msg));
    }
    html.push_str("</body>\n</html>\n");
    html
}

fn message_to_html(msg: &ChatMessage) -> String {
    let class = match msg.role() {
        Role::User => "user-message",
        Role::Assistant => "assistant-message",
    };
    let body = match msg.role() {
        Role::User => escape_html(msg.content()),
        Role::Assistant => process_assistant_message(msg.content()),
    };

    let mut html = format!(
        "<div class=\"message {class}\">\n\
        <div class=\"message-meta\">{} <span class=\"message-time\">{}</span></div>\n\
        <div class=\"message-content\">{body}</div>\n",
        role_label(msg.role()),
        msg.timestamp().to_rfc3339(),
    );

    if let Some(results) = msg.results().filter(|results| !results.is_empty()) {
        html.push_str("<ol class=\"search-results\">\n");
        for result in results {
            html.push_str(&format!(
                "<li><a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a> \
                <small>{}</small><p>{}</p></li>\n",
                escape_html(&result.url),
                escape_html(&result.title),
                escape_html(&result.source),
                escape_html(&result.body),
            ));
        }
        html.push_str("</ol>\n");
    }
    if let Some(suggestions) = msg.suggestions().filter(|s| !s.is_empty()) {
        let markdown = format_suggestion_to_markdown(suggestions);
        html.push_str(&format!(
            "<div class=\"suggestions\">{}</div>\n",
            process_assistant_message(&markdown)
        ));
    }

    html.push_str("</div>\n");
    html
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
