//! Macro for implementing Display and FromStr for status enums
//!
//! Status enums are persisted and exchanged as upper-case names
//! (`SCHEDULED`, `CANCELLED`, ...). This macro keeps the string mapping in one
//! place and accepts any casing when parsing.
//!
//! # Example
//!
//! ```rust
//! use meetsched_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum RoomState {
//!     Free,
//!     Booked,
//! }
//!
//! impl_domain_status_conversions!(RoomState {
//!     Free => "FREE",
//!     Booked => "BOOKED",
//! });
//!
//! assert_eq!(RoomState::Booked.to_string(), "BOOKED");
//! assert_eq!("free".parse::<RoomState>().unwrap(), RoomState::Free);
//! ```

/// Implements Display and FromStr traits for status enums
///
/// This macro generates:
/// - Display trait: writes the mapped upper-case string
/// - FromStr trait: parses case-insensitive strings to enum variants
///
/// The mapped strings must be upper case.
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s.trim().to_uppercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
