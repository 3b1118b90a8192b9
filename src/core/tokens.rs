//! String tokens for configuration enumerations.
//!
//! Users write enumerations as hyphenated lower-case tokens (`"high-memory"`),
//! the engine works on closed enums. Two boundary functions convert between them:
//!
//! - [`parse_token`] is strict and fails with `UnknownEnumToken`. Used for fields
//!   that gate behavior.
//! - [`try_parse_token`] is lenient and returns `None`. Used where an unknown
//!   value only means "undetermined".
//!
//! Input is normalized before matching: surrounding whitespace is trimmed, case is
//! folded and `_` is read as `-`, so `HIGH_MEMORY` also parses.

use crate::core::error::ConfigError;

/// A closed enumeration with a canonical token per member.
pub trait TokenEnum: Sized + Copy + 'static {
    /// Configuration field this enumeration is read from, for error messages.
    const FIELD: &'static str;

    /// Every member, in declaration order.
    const ALL: &'static [Self];

    /// The canonical token. `parse_token(v.token()) == Ok(v)` for every member.
    fn token(self) -> &'static str;
}

fn normalize(token: &str) -> String {
    token.trim().to_lowercase().replace('_', "-")
}

/// Comma-separated list of every canonical token of `E`.
pub fn expected_tokens<E: TokenEnum>() -> String {
    E::ALL
        .iter()
        .map(|member| member.token())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a token, returning `None` if it names no member.
pub fn try_parse_token<E: TokenEnum>(token: &str) -> Option<E> {
    let normalized = normalize(token);
    E::ALL
        .iter()
        .copied()
        .find(|member| member.token() == normalized)
}

/// Parse a token, failing with `UnknownEnumToken` if it names no member.
pub fn parse_token<E: TokenEnum>(token: &str) -> Result<E, ConfigError> {
    try_parse_token(token).ok_or_else(|| ConfigError::UnknownEnumToken {
        field: E::FIELD,
        token: token.to_string(),
        expected: expected_tokens::<E>(),
    })
}

/// Render a member as its canonical token.
pub fn render_token<E: TokenEnum>(value: E) -> &'static str {
    value.token()
}

/// Declare a closed enumeration together with its tokens.
///
/// ```ignore
/// token_enum! {
///     /// Installer compression.
///     pub enum CompressionLevel: "installer.compression-level" {
///         Fast => "fast",
///         Medium => "medium",
///         High => "high",
///     }
/// }
/// ```
macro_rules! token_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $field:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $token:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $crate::core::tokens::TokenEnum for $name {
            const FIELD: &'static str = $field;
            const ALL: &'static [Self] = &[$($name::$variant),+];

            fn token(self) -> &'static str {
                match self {
                    $($name::$variant => $token),+
                }
            }
        }

        impl $name {
            /// Get the canonical token.
            pub fn as_str(&self) -> &'static str {
                $crate::core::tokens::TokenEnum::token(*self)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::core::error::ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $crate::core::tokens::parse_token(s)
            }
        }
    };
}

pub(crate) use token_enum;
