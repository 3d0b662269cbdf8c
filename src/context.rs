//! Core data model shared by every stage of the pipeline: spec §3.
//!
//! `Context` is the structure the router receives from the host and,
//! possibly rewritten, passes on to the resolved backend. Every stage that
//! touches it treats it as copy-on-write: the router never mutates the
//! context it was handed (spec §3 invariant).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Who produced a [`Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    User,
    Assistant,
    ToolResult,
    System,
}

/// One piece of a [`Message`]'s content.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ContentPart {
    Text { text: String },
    ToolCall { name: String, args: Value },
    ToolResult {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        output: Value,
    },
}

/// A single conversation turn.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentPart>,
    /// Provider that produced this message, when it is an assistant turn
    /// from a concrete backend (used for cloud session affinity, spec §4.4).
    #[serde(default)]
    pub provider: Option<String>,
    /// Model id that produced this message, if known.
    #[serde(default)]
    pub model: Option<String>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentPart::Text { text: text.into() }],
            provider: None,
            model: None,
        }
    }

    pub fn assistant(text: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: vec![ContentPart::Text { text: text.into() }],
            provider: Some(provider.into()),
            model: None,
        }
    }

    pub fn tool_result(output: Value) -> Self {
        Self {
            role: Role::ToolResult,
            content: vec![ContentPart::ToolResult { name: None, output }],
            provider: None,
            model: None,
        }
    }

    /// Join every `Text` part's text with a single space; non-text parts
    /// contribute nothing. Matches the classifier's extraction rule (spec §4.3).
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|p| match p {
                ContentPart::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn tool_call_count(&self) -> usize {
        self.content
            .iter()
            .filter(|p| matches!(p, ContentPart::ToolCall { .. }))
            .count()
    }
}

/// A tool the host can dispatch to, by name, when the model calls it.
///
/// `execute` is intentionally untyped (`Value::Null` by default, or whatever
/// opaque marker the host attaches) — the router never inspects or invokes
/// it, only preserves it across adaptation (spec §4.5).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub execute: Value,
}

/// The bundle passed to a single inference call.
///
/// Mutable only via copy-on-write: [`crate::adapter::adapt_context`] never
/// mutates its input, it returns a fresh `Context` or a clone of the input
/// unchanged (spec §3).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Context {
    pub messages: Vec<Message>,
    #[serde(default)]
    pub tools: Vec<ToolSchema>,
    #[serde(default)]
    pub system_prompt: String,
}

impl Context {
    /// The text of the most recent `user` message, walking from the end.
    /// Empty string if no user message exists (spec §4.3 extraction rule).
    pub fn last_user_text(&self) -> String {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.text())
            .unwrap_or_default()
    }

    /// True iff the last message in the conversation is a tool-result
    /// (spec's "post-tool turn").
    pub fn last_message_is_tool_result(&self) -> bool {
        matches!(self.messages.last(), Some(m) if m.role == Role::ToolResult)
    }

    /// The most recent `assistant` message, if any — used for cloud session
    /// affinity (spec §4.4).
    pub fn last_assistant_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role == Role::Assistant)
    }

    /// Total tool-call content parts across the last `n` messages.
    pub fn tool_calls_in_last(&self, n: usize) -> usize {
        let start = self.messages.len().saturating_sub(n);
        self.messages[start..]
            .iter()
            .map(Message::tool_call_count)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_user_text_joins_text_parts_with_space() {
        let ctx = Context {
            messages: vec![Message {
                role: Role::User,
                content: vec![
                    ContentPart::Text { text: "hello".into() },
                    ContentPart::Text { text: "world".into() },
                ],
                provider: None,
                model: None,
            }],
            tools: vec![],
            system_prompt: String::new(),
        };
        assert_eq!(ctx.last_user_text(), "hello world");
    }

    #[test]
    fn last_user_text_empty_when_no_user_message() {
        let ctx = Context {
            messages: vec![Message::assistant("hi", "ollama")],
            tools: vec![],
            system_prompt: String::new(),
        };
        assert_eq!(ctx.last_user_text(), "");
    }

    #[test]
    fn last_user_text_ignores_trailing_non_user_messages() {
        let ctx = Context {
            messages: vec![
                Message::user("first question"),
                Message::assistant("answer", "anthropic"),
                Message::tool_result(serde_json::json!({"ok": true})),
            ],
            tools: vec![],
            system_prompt: String::new(),
        };
        assert_eq!(ctx.last_user_text(), "first question");
    }

    #[test]
    fn last_message_is_tool_result_detects_post_tool_turn() {
        let ctx = Context {
            messages: vec![Message::user("q"), Message::tool_result(Value::Null)],
            tools: vec![],
            system_prompt: String::new(),
        };
        assert!(ctx.last_message_is_tool_result());
    }

    #[test]
    fn tool_calls_in_last_counts_only_window() {
        let mut messages = vec![];
        for _ in 0..5 {
            messages.push(Message {
                role: Role::Assistant,
                content: vec![ContentPart::ToolCall {
                    name: "read".into(),
                    args: serde_json::json!({}),
                }],
                provider: Some("ollama".into()),
                model: None,
            });
        }
        let ctx = Context { messages, tools: vec![], system_prompt: String::new() };
        assert_eq!(ctx.tool_calls_in_last(10), 5);
        assert_eq!(ctx.tool_calls_in_last(3), 3);
    }
}
