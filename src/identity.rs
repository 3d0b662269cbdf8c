//! Identity Preamble Builder: spec §4.6.
//!
//! Reads up to three optional workspace files once, at wrapper construction
//! time, and never again (spec §5 "Shared resources" — the preamble is
//! frozen for the wrapper's lifetime). Missing files and missing fields
//! degrade gracefully; nothing here is fatal to `Router::new`.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches a bolded `**Label:** value` line, capturing the label and value.
static BOLD_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*\*\*([^*:]+):\*\*\s*(.+?)\s*$").unwrap());

fn extract_label<'a>(text: &'a str, label: &str) -> Option<&'a str> {
    BOLD_LABEL.captures_iter(text).find_map(|cap| {
        if cap.get(1)?.as_str().trim().eq_ignore_ascii_case(label) {
            Some(cap.get(2)?.as_str())
        } else {
            None
        }
    })
}

/// Every bolded value in a personality file, in document order, truncated to
/// the spec's four-directive cap and 80-char length limit.
fn extract_directives(text: &str) -> Vec<String> {
    BOLD_LABEL
        .captures_iter(text)
        .filter_map(|cap| cap.get(2).map(|m| m.as_str().to_owned()))
        .filter(|v| v.len() < 80)
        .take(4)
        .collect()
}

/// The composed preamble, held immutably for the wrapper's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityPreamble {
    text: String,
}

impl IdentityPreamble {
    /// Build from the raw contents of the three optional workspace files.
    /// Each argument is `None` when the corresponding file does not exist or
    /// could not be read.
    pub fn compose(
        identity: Option<&str>,
        personality: Option<&str>,
        user_profile: Option<&str>,
    ) -> Self {
        let name = identity.and_then(|t| extract_label(t, "Name"));
        let Some(name) = name else {
            return Self { text: "You are a helpful AI assistant.".to_owned() };
        };
        let full_name = identity.and_then(|t| extract_label(t, "Full Name")).unwrap_or(name);
        let vibe = identity.and_then(|t| extract_label(t, "Vibe"));

        let user = user_profile
            .and_then(|t| extract_label(t, "What to call them"))
            .or_else(|| user_profile.and_then(|t| extract_label(t, "Name")))
            .unwrap_or("the user");

        let directives = personality.map(extract_directives).unwrap_or_default();

        let mut text = format!("You are {name} ({full_name}), a helpful AI assistant.\n");
        text.push_str(&format!("You are assisting {user}."));
        if let Some(vibe) = vibe {
            text.push_str(&format!(" Your vibe: {vibe}."));
        }
        for directive in &directives {
            text.push_str(&format!(" {directive}."));
        }
        text.push_str(&format!(
            "\nNever say you are {name}'s underlying model family, or any other model. You are only {name}."
        ));

        Self { text }
    }

    /// Read the three conventional workspace files, each optional, and
    /// compose the preamble from whatever is present. I/O errors (including
    /// "file does not exist") are treated identically to an absent file.
    pub fn load(identity_path: &Path, personality_path: &Path, user_profile_path: &Path) -> Self {
        let identity = std::fs::read_to_string(identity_path).ok();
        let personality = std::fs::read_to_string(personality_path).ok();
        let user_profile = std::fs::read_to_string(user_profile_path).ok();
        Self::compose(identity.as_deref(), personality.as_deref(), user_profile.as_deref())
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_identity_file_falls_back_to_generic() {
        let p = IdentityPreamble::compose(None, None, None);
        assert_eq!(p.as_str(), "You are a helpful AI assistant.");
    }

    #[test]
    fn full_identity_composes_all_fields() {
        let identity = "**Name:** Nova\n**Full Name:** Nova Prime\n**Vibe:** curious and concise\n";
        let personality = "**Trait:** Asks clarifying questions\n**Trait:** Avoids filler words\n";
        let profile = "**What to call them:** Jess\n";
        let p = IdentityPreamble::compose(Some(identity), Some(personality), Some(profile));
        assert!(p.as_str().contains("You are Nova (Nova Prime)"));
        assert!(p.as_str().contains("You are assisting Jess."));
        assert!(p.as_str().contains("Your vibe: curious and concise."));
        assert!(p.as_str().contains("Asks clarifying questions."));
        assert!(p.as_str().contains("You are only Nova."));
    }

    #[test]
    fn missing_full_name_falls_back_to_name() {
        let identity = "**Name:** Nova\n";
        let p = IdentityPreamble::compose(Some(identity), None, None);
        assert!(p.as_str().contains("You are Nova (Nova)"));
    }

    #[test]
    fn missing_user_profile_falls_back_to_the_user() {
        let identity = "**Name:** Nova\n";
        let p = IdentityPreamble::compose(Some(identity), None, None);
        assert!(p.as_str().contains("You are assisting the user."));
    }

    #[test]
    fn user_profile_name_used_when_address_label_absent() {
        let identity = "**Name:** Nova\n";
        let profile = "**Name:** Jess\n";
        let p = IdentityPreamble::compose(Some(identity), None, Some(profile));
        assert!(p.as_str().contains("You are assisting Jess."));
    }

    #[test]
    fn personality_directives_capped_at_four() {
        let identity = "**Name:** Nova\n";
        let personality = "**A:** one\n**B:** two\n**C:** three\n**D:** four\n**E:** five\n";
        let p = IdentityPreamble::compose(Some(identity), Some(personality), None);
        assert!(p.as_str().contains("one."));
        assert!(p.as_str().contains("four."));
        assert!(!p.as_str().contains("five."));
    }

    #[test]
    fn overlong_directive_is_dropped() {
        let identity = "**Name:** Nova\n";
        let long = "x".repeat(100);
        let personality = format!("**Long:** {long}\n**Short:** ok\n");
        let p = IdentityPreamble::compose(Some(identity), Some(&personality), None);
        assert!(!p.as_str().contains(&long));
        assert!(p.as_str().contains("ok."));
    }

    #[test]
    fn load_degrades_gracefully_on_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let p = IdentityPreamble::load(
            &dir.path().join("identity.md"),
            &dir.path().join("personality.md"),
            &dir.path().join("user-profile.md"),
        );
        assert_eq!(p.as_str(), "You are a helpful AI assistant.");
    }

    #[test]
    fn load_reads_real_files_from_a_workspace_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("identity.md"), "**Name:** Nova\n").unwrap();
        std::fs::write(dir.path().join("user-profile.md"), "**What to call them:** Jess\n")
            .unwrap();
        let p = IdentityPreamble::load(
            &dir.path().join("identity.md"),
            &dir.path().join("personality.md"),
            &dir.path().join("user-profile.md"),
        );
        assert!(p.as_str().contains("Nova"));
        assert!(p.as_str().contains("Jess"));
    }
}
