//! Provider identity shared across the classifier, credential resolver, and
//! model resolver.
//!
//! Generalises the teacher's 4-variant `config::Provider` (OpenAI,
//! OpenRouter, Ollama, Anthropic) to the set the routing spec implies: seven
//! recognised cloud providers plus the one local provider the default
//! `localModel` names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A model backend's wire protocol family.
///
/// `Ollama` is the only local-inference variant; everything else is a cloud
/// provider with an entry in the [`Provider::env_var`] credential table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Ollama,
    Anthropic,
    OpenAI,
    Google,
    OpenRouter,
    Xai,
    Groq,
    Mistral,
}

impl Provider {
    /// All providers recognised by the router, in the order the spec lists
    /// them (`anthropic, openai, google, openrouter, xai, groq, mistral`).
    pub const CLOUD: [Provider; 7] = [
        Provider::Anthropic,
        Provider::OpenAI,
        Provider::Google,
        Provider::OpenRouter,
        Provider::Xai,
        Provider::Groq,
        Provider::Mistral,
    ];

    /// True for every variant except [`Provider::Ollama`].
    pub fn is_cloud(self) -> bool {
        !matches!(self, Provider::Ollama)
    }

    /// Name of the environment variable holding this provider's API key, per
    /// the fixed table in the credential resolver spec. Returns `None` for
    /// `Ollama`, which is typically keyless.
    pub fn env_var(self) -> Option<&'static str> {
        match self {
            Provider::Ollama => None,
            Provider::Anthropic => Some("ANTHROPIC_API_KEY"),
            Provider::OpenAI => Some("OPENAI_API_KEY"),
            Provider::Google => Some("GOOGLE_API_KEY"),
            Provider::OpenRouter => Some("OPENROUTER_API_KEY"),
            Provider::Groq => Some("GROQ_API_KEY"),
            Provider::Xai => Some("XAI_API_KEY"),
            Provider::Mistral => Some("MISTRAL_API_KEY"),
        }
    }

    /// Provider-specific OAuth environment variable, checked after the plain
    /// API-key table. Currently only Anthropic has one.
    pub fn oauth_env_var(self) -> Option<&'static str> {
        match self {
            Provider::Anthropic => Some("ANTHROPIC_OAUTH_TOKEN"),
            _ => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Provider::Ollama => "ollama",
            Provider::Anthropic => "anthropic",
            Provider::OpenAI => "openai",
            Provider::Google => "google",
            Provider::OpenRouter => "openrouter",
            Provider::Xai => "xai",
            Provider::Groq => "groq",
            Provider::Mistral => "mistral",
        })
    }
}

/// Error returned by [`FromStr`] for an unrecognised provider name.
#[derive(Debug, thiserror::Error)]
#[error("unrecognised provider `{0}`")]
pub struct UnknownProvider(pub String);

impl FromStr for Provider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ollama" => Ok(Provider::Ollama),
            "anthropic" => Ok(Provider::Anthropic),
            "openai" => Ok(Provider::OpenAI),
            "google" => Ok(Provider::Google),
            "openrouter" => Ok(Provider::OpenRouter),
            "xai" => Ok(Provider::Xai),
            "groq" => Ok(Provider::Groq),
            "mistral" => Ok(Provider::Mistral),
            other => Err(UnknownProvider(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_display_and_from_str() {
        for p in Provider::CLOUD.iter().copied().chain([Provider::Ollama]) {
            let s = p.to_string();
            assert_eq!(s.parse::<Provider>().unwrap(), p);
        }
    }

    #[test]
    fn only_ollama_is_not_cloud() {
        assert!(!Provider::Ollama.is_cloud());
        for p in Provider::CLOUD {
            assert!(p.is_cloud());
        }
    }

    #[test]
    fn env_var_table_matches_spec() {
        assert_eq!(Provider::Anthropic.env_var(), Some("ANTHROPIC_API_KEY"));
        assert_eq!(Provider::OpenAI.env_var(), Some("OPENAI_API_KEY"));
        assert_eq!(Provider::Google.env_var(), Some("GOOGLE_API_KEY"));
        assert_eq!(Provider::OpenRouter.env_var(), Some("OPENROUTER_API_KEY"));
        assert_eq!(Provider::Groq.env_var(), Some("GROQ_API_KEY"));
        assert_eq!(Provider::Xai.env_var(), Some("XAI_API_KEY"));
        assert_eq!(Provider::Mistral.env_var(), Some("MISTRAL_API_KEY"));
        assert_eq!(Provider::Ollama.env_var(), None);
    }

    #[test]
    fn unknown_provider_name_errors() {
        assert!("not-a-provider".parse::<Provider>().is_err());
    }
}
