//! Context Adapter: spec §4.5.
//!
//! Rewrites the outgoing `Context` per decided target. Copy-on-write: the
//! input is never mutated, and the `cloud` branch returns it unchanged
//! without cloning. Grounded on the teacher's `dispatch()` field-substitution
//! style in `router.rs`, adapted to produce a genuinely fresh `Context`
//! rather than an in-place rewrite, per the copy-on-write invariant (spec §3).

use std::borrow::Cow;

use serde_json::json;

use crate::context::{Context, ToolSchema};
use crate::decision::Target;
use crate::identity::IdentityPreamble;

const TOOL_BASE: &str =
    "You can use the available tools to read, write, and edit files and run shell commands.";
const TEXT_BASE: &str = "Respond directly in plain text; no tools are available to you.";

/// The simplified tool table (spec §4.5, exhaustive).
fn simplified_tool(name: &str) -> Option<ToolSchema> {
    match name {
        "read" => Some(ToolSchema {
            name: "read".to_owned(),
            description: "Read a file.".to_owned(),
            parameters: json!({
                "type": "object",
                "properties": { "path": { "type": "string" } },
                "required": ["path"],
            }),
            execute: serde_json::Value::Null,
        }),
        "exec" => Some(ToolSchema {
            name: "exec".to_owned(),
            description: "Run a shell command (ls, cat, git, date, echo, etc.).".to_owned(),
            parameters: json!({
                "type": "object",
                "properties": { "command": { "type": "string" } },
                "required": ["command"],
            }),
            execute: serde_json::Value::Null,
        }),
        "write" => Some(ToolSchema {
            name: "write".to_owned(),
            description: "Write content to a file.".to_owned(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string" },
                    "content": { "type": "string" },
                },
                "required": ["path", "content"],
            }),
            execute: serde_json::Value::Null,
        }),
        "edit" => Some(ToolSchema {
            name: "edit".to_owned(),
            description: "Edit a file by replacing text.".to_owned(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string" },
                    "oldText": { "type": "string" },
                    "newText": { "type": "string" },
                },
                "required": ["path", "oldText", "newText"],
            }),
            execute: serde_json::Value::Null,
        }),
        _ => None,
    }
}

/// Rewrite `original` for `target`. Returns a borrowed `Cow::Borrowed` for
/// `cloud` (no allocation at all) and an owned, freshly built `Context` for
/// the two local targets.
pub fn adapt_context<'a>(
    original: &'a Context,
    target: Target,
    identity: &IdentityPreamble,
) -> Cow<'a, Context> {
    match target {
        Target::Cloud => Cow::Borrowed(original),
        Target::Local => {
            let system_prompt = format!("{} {}", identity.as_str(), TOOL_BASE);
            let tools = original
                .tools
                .iter()
                .filter_map(|t| {
                    simplified_tool(&t.name).map(|mut simplified| {
                        simplified.execute = t.execute.clone();
                        simplified
                    })
                })
                .take(4)
                .collect();
            Cow::Owned(Context {
                messages: original.messages.clone(),
                tools,
                system_prompt,
            })
        }
        Target::LocalText => {
            let system_prompt = format!("{} {}", identity.as_str(), TEXT_BASE);
            Cow::Owned(Context {
                messages: original.messages.clone(),
                tools: Vec::new(),
                system_prompt,
            })
        }
    }
}
