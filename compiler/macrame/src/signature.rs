//! Macro signatures.

use std::fmt;

/// Unique key of a registered macro: its name plus how many token and
/// matcher arguments it takes. The same name may be registered with
/// different argument counts.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct MacroSignature {
    pub name: String,
    pub token_arguments: usize,
    pub matcher_arguments: usize,
}

impl MacroSignature {
    pub fn new(name: impl Into<String>, token_arguments: usize, matcher_arguments: usize) -> Self {
        MacroSignature {
            name: name.into(),
            token_arguments,
            matcher_arguments,
        }
    }
}

/// Renders as `\name[2]{1}`, mirroring call syntax.
impl fmt::Display for MacroSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\\{}[{}]{{{}}}",
            self.name, self.token_arguments, self.matcher_arguments
        )
    }
}
