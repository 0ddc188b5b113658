//! Type-safe identifier wrappers.
//!
//! Sessions are identified by UUID v7 values generated client side. Zones
//! and hospitals are named by the allocation engine (`Z1`, `H1`, ...) so
//! their identifiers wrap the engine's string labels instead.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
        )]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

/// Generates a transparent newtype wrapper around an engine-assigned label.
macro_rules! define_label {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[serde(transparent)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub String);

        impl $name {
            /// Borrow the label as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(label: &str) -> Self {
                Self(label.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(label: String) -> Self {
                Self(label)
            }
        }
    };
}

define_id! {
    /// Unique identifier for one simulation session (one operator run).
    SessionId
}

define_label! {
    /// Engine-assigned identifier of a disaster zone (e.g. `Z1`).
    ZoneId
}

define_label! {
    /// Engine-assigned identifier of a hospital or resource depot (e.g. `H1`).
    HospitalId
}
