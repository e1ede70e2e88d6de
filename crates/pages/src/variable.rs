//! Localized page variables and the text-resolution policy.
//!
//! A variable binds a symbolic key (e.g. `HERO_TITLE`) on one page to four
//! fixed language slots. Resolution prefers the requested language and then
//! walks [`FALLBACK_ORDER`]. A missing variable and a variable whose slots are
//! all blank both resolve to "not found", which tells the renderer to show its
//! own default label.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use pagecraft_core::{DomainError, DomainResult, Entity, PageId, ValueObject};

const MAX_KEY_LEN: usize = 128;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    French,
    Spanish,
    #[default]
    Portuguese,
}

impl ValueObject for Language {}

/// Slots consulted when the requested language is blank.
pub const FALLBACK_ORDER: [Language; 4] = [
    Language::Portuguese,
    Language::English,
    Language::Spanish,
    Language::French,
];

impl Language {
    pub const ALL: [Language; 4] = [
        Language::English,
        Language::French,
        Language::Spanish,
        Language::Portuguese,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Language::English => "english",
            Language::French => "french",
            Language::Spanish => "spanish",
            Language::Portuguese => "portuguese",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::French => "fr",
            Language::Spanish => "es",
            Language::Portuguese => "pt",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = DomainError;

    /// Accepts the English name or the ISO 639-1 code, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Language::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(wanted) || l.code().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DomainError::validation(format!("unsupported language '{wanted}'")))
    }
}

/// The four language slots of a variable. Empty strings are valid slot values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    #[serde(default)]
    pub english: String,
    #[serde(default)]
    pub french: String,
    #[serde(default)]
    pub spanish: String,
    #[serde(default)]
    pub portuguese: String,
}

impl ValueObject for LocalizedText {}

impl LocalizedText {
    pub fn new(
        english: impl Into<String>,
        french: impl Into<String>,
        spanish: impl Into<String>,
        portuguese: impl Into<String>,
    ) -> Self {
        Self {
            english: english.into(),
            french: french.into(),
            spanish: spanish.into(),
            portuguese: portuguese.into(),
        }
    }

    pub fn get(&self, language: Language) -> &str {
        match language {
            Language::English => &self.english,
            Language::French => &self.french,
            Language::Spanish => &self.spanish,
            Language::Portuguese => &self.portuguese,
        }
    }

    pub fn with(&self, language: Language, text: impl Into<String>) -> Self {
        let mut next = self.clone();
        let slot = match language {
            Language::English => &mut next.english,
            Language::French => &mut next.french,
            Language::Spanish => &mut next.spanish,
            Language::Portuguese => &mut next.portuguese,
        };
        *slot = text.into();
        next
    }

    /// Requested slot first, then the fallback order; whitespace-only slots are blank.
    pub fn resolve(&self, language: Language) -> Option<&str> {
        std::iter::once(language)
            .chain(FALLBACK_ORDER)
            .map(|l| self.get(l))
            .find(|text| !text.trim().is_empty())
    }

    pub fn is_blank(&self) -> bool {
        Language::ALL.iter().all(|l| self.get(*l).trim().is_empty())
    }
}

/// Result of resolving one variable key for one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub found: bool,
    pub text: String,
}

impl Resolution {
    pub fn found(text: impl Into<String>) -> Self {
        Self {
            found: true,
            text: text.into(),
        }
    }

    pub fn missing() -> Self {
        Self {
            found: false,
            text: String::new(),
        }
    }

    /// Resolved text, or the caller's default label when nothing resolved.
    pub fn text_or<'a>(&'a self, default_label: &'a str) -> &'a str {
        if self.found { &self.text } else { default_label }
    }
}

/// Localized text bound to `(page, key)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    page_id: PageId,
    key: String,
    texts: LocalizedText,
}

impl Variable {
    pub fn new(page_id: PageId, key: impl Into<String>, texts: LocalizedText) -> DomainResult<Self> {
        Ok(Self {
            page_id,
            key: Self::validate_key(key.into())?,
            texts,
        })
    }

    /// Canonical form of a key as stored. Lookups go through this too.
    pub fn normalize_key(key: &str) -> &str {
        key.trim()
    }

    /// Keys are symbolic names: non-empty, no whitespace, bounded length.
    pub fn validate_key(key: String) -> DomainResult<String> {
        let key = Self::normalize_key(&key).to_string();
        if key.is_empty() {
            return Err(DomainError::validation("variable key must not be empty"));
        }
        if key.chars().count() > MAX_KEY_LEN {
            return Err(DomainError::validation(format!(
                "variable key must be at most {MAX_KEY_LEN} characters"
            )));
        }
        if key.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(DomainError::validation(format!(
                "variable key '{key}' must not contain whitespace"
            )));
        }
        Ok(key)
    }

    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn texts(&self) -> &LocalizedText {
        &self.texts
    }

    pub fn with_text(&self, language: Language, text: impl Into<String>) -> Self {
        Self {
            texts: self.texts.with(language, text),
            ..self.clone()
        }
    }

    pub fn resolve(&self, language: Language) -> Resolution {
        match self.texts.resolve(language) {
            Some(text) => Resolution::found(text),
            None => Resolution::missing(),
        }
    }
}

impl Entity for Variable {
    type Id = (PageId, String);

    fn id(&self) -> Self::Id {
        (self.page_id, self.key.clone())
    }
}
