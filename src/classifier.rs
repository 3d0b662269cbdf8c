//! Complexity classifier: spec §4.3.
//!
//! Scores the last user message plus lightweight conversation features in
//! `[0, 1]`. Keyword families are precompiled once, as a `Lazy<Vec<_>>` built
//! in one shot rather than per-element `Lazy<Regex>` fields promoted into a
//! `&'static` array, matching the teacher's precompiled-pattern posture in
//! `config.rs`'s validation pass.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::CompiledPatterns;
use crate::context::Context;

/// Result of [`classify`]: the score, which rule produced it, and the tags
/// that fired along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub score: f64,
    pub reason: &'static str,
    pub tags: Vec<String>,
}

struct KeywordFamily {
    regex: Regex,
    weight: f64,
    tag: &'static str,
}

macro_rules! family {
    ($pattern:expr, $weight:expr, $tag:expr) => {
        KeywordFamily {
            regex: Regex::new(&format!("(?i){}", $pattern)).unwrap(),
            weight: $weight,
            tag: $tag,
        }
    };
}

static COMPLEX_FAMILIES: Lazy<Vec<KeywordFamily>> = Lazy::new(|| {
    vec![
        family!(r"explain|describe|elaborate", 0.15, "explanation"),
        family!(r"implement|create|build|develop", 0.20, "implementation"),
        family!(r"refactor|optimize|improve|restructure", 0.20, "refactoring"),
        family!(r"debug|fix|solve|troubleshoot", 0.15, "debugging"),
        family!(r"analyze|compare|evaluate|review", 0.15, "analysis"),
        family!(r"why |how does |what causes", 0.10, "reasoning"),
        family!(r"step by step|in detail|thoroughly", 0.15, "detail-request"),
        family!(r"write .*|generate .*|compose .*", 0.15, "generation"),
        family!(r"find |search|look up|google|browse", 0.35, "search"),
        family!(r"recommend|suggest|\bbest\b|\btop\b|highest rated", 0.30, "recommendation"),
        family!(r"latest|recent|current|today|news|price", 0.30, "real-time"),
        family!(r"buy|purchase|order|shop|deal|discount", 0.25, "shopping"),
        family!(r"summarize|plan|design|architect", 0.20, "planning"),
        family!(r"help me|assist|guide", 0.10, "assistance"),
    ]
});

static SIMPLE_FAMILIES: Lazy<Vec<KeywordFamily>> = Lazy::new(|| {
    vec![
        family!(r"read|cat|show|display|print the file", -0.25, "file-read"),
        family!(r"list |^ls\b| ls |\bdir\b", -0.20, "directory"),
        family!(r"run |execute|\bexec\b", -0.10, "command"),
        family!(r"^(yes|no|ok|okay|sure|confirm|yep|nah)\s*[.!?]?$", -0.35, "confirmation"),
        family!(r"^(hello|hi|hey|thanks|thank you)\s*[.!?]?$", -0.30, "greeting"),
    ]
});

/// Tags that count toward the "genuine complexity" multi-signal boost:
/// every complex-family tag, excluding the word-count boosts.
fn is_complexity_tag(tag: &str) -> bool {
    COMPLEX_FAMILIES.iter().any(|f| f.tag == tag)
}

/// Scores `context` per spec §4.3. `patterns` supplies the precompiled
/// force-cloud/force-local regex lists from [`crate::config::RoutingConfig`].
pub fn classify(context: &Context, patterns: &CompiledPatterns) -> Classification {
    let text = context.last_user_text();

    for re in &patterns.force_cloud {
        if re.is_match(&text) {
            return Classification {
                score: 1.0,
                reason: "force-cloud",
                tags: vec![re.as_str().to_owned()],
            };
        }
    }
    for re in &patterns.force_local {
        if re.is_match(&text) {
            return Classification {
                score: 0.0,
                reason: "force-local",
                tags: vec![re.as_str().to_owned()],
            };
        }
    }
    if context.last_message_is_tool_result() {
        return Classification {
            score: 0.0,
            reason: "post-tool-turn",
            tags: vec!["post-tool".to_owned()],
        };
    }

    let mut score = 0.0;
    let mut tags: Vec<String> = Vec::new();

    let word_count = text.split_whitespace().count();
    if word_count > 100 {
        score += 0.15;
        tags.push("long-prompt".to_owned());
    }
    if word_count > 300 {
        score += 0.15;
        tags.push("very-long-prompt".to_owned());
    }

    for fam in COMPLEX_FAMILIES {
        if fam.regex.is_match(&text) {
            score += fam.weight;
            tags.push(fam.tag.to_owned());
        }
    }
    for fam in SIMPLE_FAMILIES {
        if fam.regex.is_match(&text) {
            score += fam.weight;
            tags.push(fam.tag.to_owned());
        }
    }

    let complexity_tag_count = tags.iter().filter(|t| is_complexity_tag(t)).count();
    if complexity_tag_count >= 2 {
        score += 0.15;
        tags.push("multi-signal".to_owned());
    }
    if word_count > 12 && complexity_tag_count >= 1 {
        score += 0.10;
        tags.push("detailed-query".to_owned());
    }

    let tool_calls = context.tool_calls_in_last(10);
    if tool_calls > 3 {
        score -= 0.10;
        tags.push("tool-heavy-ctx".to_owned());
    }

    Classification { score: score.clamp(0.0, 1.0), reason: "heuristic", tags }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoutingConfig;
    use crate::context::Message;

    fn ctx_with_user_text(text: &str) -> Context {
        Context {
            messages: vec![Message::user(text)],
            tools: vec![],
            system_prompt: String::new(),
        }
    }

    fn no_patterns() -> CompiledPatterns {
        CompiledPatterns::default()
    }

    #[test]
    fn force_cloud_pattern_shortcuts_to_score_one() {
        let routing = RoutingConfig {
            force_cloud_patterns: vec!["search the web".into()],
            ..Default::default()
        };
        let patterns = CompiledPatterns::compile(&routing);
        let ctx = ctx_with_user_text("please SEARCH THE WEB for this");
        let c = classify(&ctx, &patterns);
        assert_eq!(c.score, 1.0);
        assert_eq!(c.reason, "force-cloud");
    }

    #[test]
    fn force_local_pattern_shortcuts_to_score_zero() {
        let routing = RoutingConfig {
            force_local_patterns: vec!["^ping$".into()],
            ..Default::default()
        };
        let patterns = CompiledPatterns::compile(&routing);
        let ctx = ctx_with_user_text("ping");
        let c = classify(&ctx, &patterns);
        assert_eq!(c.score, 0.0);
        assert_eq!(c.reason, "force-local");
    }

    #[test]
    fn force_cloud_wins_over_force_local_when_both_match() {
        let routing = RoutingConfig {
            force_cloud_patterns: vec!["hello".into()],
            force_local_patterns: vec!["hello".into()],
            ..Default::default()
        };
        let patterns = CompiledPatterns::compile(&routing);
        let ctx = ctx_with_user_text("hello");
        let c = classify(&ctx, &patterns);
        assert_eq!(c.reason, "force-cloud");
    }

    #[test]
    fn post_tool_turn_shortcuts_to_score_zero() {
        let ctx = Context {
            messages: vec![
                Message::user("run the tests"),
                Message::tool_result(serde_json::json!({"ok": true})),
            ],
            tools: vec![],
            system_prompt: String::new(),
        };
        let c = classify(&ctx, &no_patterns());
        assert_eq!(c.score, 0.0);
        assert_eq!(c.reason, "post-tool-turn");
    }

    #[test]
    fn greeting_scores_low() {
        let ctx = ctx_with_user_text("hello");
        let c = classify(&ctx, &no_patterns());
        assert_eq!(c.reason, "heuristic");
        assert!(c.score <= 0.0);
        assert!(c.tags.contains(&"greeting".to_owned()));
    }

    #[test]
    fn confirmation_scores_low() {
        let ctx = ctx_with_user_text("yes");
        let c = classify(&ctx, &no_patterns());
        assert!(c.tags.contains(&"confirmation".to_owned()));
    }

    #[test]
    fn implementation_request_scores_above_threshold() {
        let ctx = ctx_with_user_text("please implement a new caching layer for the API");
        let c = classify(&ctx, &no_patterns());
        assert!(c.tags.contains(&"implementation".to_owned()));
        assert!(c.score > 0.0);
    }

    #[test]
    fn multi_signal_boost_applies_with_two_complexity_tags() {
        let ctx = ctx_with_user_text("please explain and debug this implementation");
        let c = classify(&ctx, &no_patterns());
        assert!(c.tags.contains(&"multi-signal".to_owned()));
    }

    #[test]
    fn search_tag_present_for_web_lookup_request() {
        let ctx = ctx_with_user_text("can you search for the latest news on this topic");
        let c = classify(&ctx, &no_patterns());
        assert!(c.tags.contains(&"search".to_owned()));
        assert!(c.tags.contains(&"real-time".to_owned()));
    }

    #[test]
    fn tool_heavy_context_applies_discount() {
        let mut messages = vec![];
        for _ in 0..5 {
            messages.push(crate::context::Message {
                role: crate::context::Role::Assistant,
                content: vec![crate::context::ContentPart::ToolCall {
                    name: "read".into(),
                    args: serde_json::json!({}),
                }],
                provider: Some("ollama".into()),
                model: None,
            });
        }
        messages.push(Message::user("implement a refactor of this module"));
        let ctx = Context { messages, tools: vec![], system_prompt: String::new() };
        let c = classify(&ctx, &no_patterns());
        assert!(c.tags.contains(&"tool-heavy-ctx".to_owned()));
    }

    #[test]
    fn score_never_exceeds_unit_interval() {
        let ctx = ctx_with_user_text(
            "please explain and implement and refactor and debug and analyze and find \
             and recommend and search for the latest and greatest and help me build and plan \
             and design a thoroughly detailed architecture step by step in detail",
        );
        let c = classify(&ctx, &no_patterns());
        assert!(c.score <= 1.0);
        assert!(c.score >= 0.0);
    }

    #[test]
    fn empty_context_yields_zero_score_heuristic() {
        let ctx = Context { messages: vec![], tools: vec![], system_prompt: String::new() };
        let c = classify(&ctx, &no_patterns());
        assert_eq!(c.reason, "heuristic");
        assert_eq!(c.score, 0.0);
    }
}
