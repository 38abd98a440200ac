//! Macro for implementing Display and FromStr for vocabulary enums
//!
//! Several domain enums (job status, customer type, match strategy) travel as
//! lowercase strings between the internal system and the CRM adapters. This
//! macro provides both conversions from a single table, with optional alias
//! spellings accepted on input.
//!
//! # Example
//!
//! ```rust
//! use fieldsync_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Priority {
//!     Low,
//!     High,
//! }
//!
//! impl_domain_status_conversions!(Priority {
//!     Low => "low",
//!     High => "high" | "urgent",
//! });
//!
//! assert_eq!("URGENT".parse::<Priority>().unwrap(), Priority::High);
//! assert_eq!(Priority::High.to_string(), "high");
//! ```

/// Implements `as_str`, Display and FromStr for vocabulary enums
///
/// This macro generates:
/// - `as_str()`: the canonical lowercase spelling
/// - Display trait: writes the canonical spelling
/// - FromStr trait: case-insensitive parsing of the canonical spelling or any
///   alias, ignoring surrounding whitespace
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str | $alias...` - Mapping of enum variants to their
///   canonical string and optional aliases
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal $(| $alias:literal)*),+ $(,)? }) => {
        impl $enum_name {
            /// Canonical lowercase spelling
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str $(| $alias)* => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
