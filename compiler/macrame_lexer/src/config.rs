//! Tokenizer options.

/// Switches controlling how source text is split into tokens.
///
/// All options default to `true`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
#[allow(
    clippy::struct_excessive_bools,
    reason = "each flag is an independent tokenizer option"
)]
pub struct TokenizerConfig {
    /// Emit whitespace tokens instead of dropping them.
    pub include_whitespaces: bool,
    /// Lex `1.5` as one decimal rather than `1`, `.`, `5`.
    pub capture_decimal_numbers: bool,
    /// Expand `\n`, `\"` and friends inside strings. When off, string
    /// content keeps its backslashes for the caller to decode.
    pub resolve_escaped_string_characters: bool,
    /// Allow digits after the first letter of a label.
    pub labels_have_digits: bool,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        TokenizerConfig {
            include_whitespaces: true,
            capture_decimal_numbers: true,
            resolve_escaped_string_characters: true,
            labels_have_digits: true,
        }
    }
}

impl TokenizerConfig {
    #[must_use]
    pub const fn with_whitespaces(mut self, include: bool) -> Self {
        self.include_whitespaces = include;
        self
    }

    #[must_use]
    pub const fn with_decimal_numbers(mut self, capture: bool) -> Self {
        self.capture_decimal_numbers = capture;
        self
    }

    #[must_use]
    pub const fn with_escape_resolution(mut self, resolve: bool) -> Self {
        self.resolve_escaped_string_characters = resolve;
        self
    }

    #[must_use]
    pub const fn with_label_digits(mut self, allow: bool) -> Self {
        self.labels_have_digits = allow;
        self
    }
}
