use std::fmt;

/// Language of validation messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Locale {
    #[default]
    Zh,
    En,
}

impl Locale {
    /// Resolves a locale tag. Anything other than `zh` or `en` falls back to `zh`.
    pub fn resolve(tag: &str) -> Self {
        match tag {
            "en" => Self::En,
            _ => Self::Zh,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zh => "zh",
            Self::En => "en",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
