use serde::{Deserialize, Serialize};

/// User theme preference; `Default` follows the system scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    Default,
    Light,
    Dark,
}

impl ThemePreference {
    /// Name used as the persisted `userTheme` value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ThemePreference::Default => "default",
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
        }
    }

    /// Parse a persisted value; unknown strings fall back to `Default`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "light" => ThemePreference::Light,
            "dark" => ThemePreference::Dark,
            _ => ThemePreference::Default,
        }
    }
}

/// Locally persisted app settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AppSettings {
    pub theme: ThemePreference,
    pub auto_advance_on_correct: bool,
    pub shuffle_answers: bool,
}
