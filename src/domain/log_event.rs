use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a tag string is not one of the known values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown {kind} '{input}'")]
pub struct UnknownTag {
    pub kind: &'static str,
    pub input: String,
}

/// Declares a closed, lowercase-serialized tag enum with `ALL`, `as_str`,
/// `Display` and case-insensitive `FromStr`.
macro_rules! log_tag {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownTag;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(UnknownTag {
                        kind: $kind,
                        input: s.to_string(),
                    }),
                }
            }
        }
    };
}

log_tag! {
    /// Which tier of the system produced the event.
    Stack, "stack" {
        Frontend => "frontend",
        Backend => "backend",
        Middleware => "middleware",
        Config => "config",
        Utils => "utils",
    }
}

log_tag! {
    /// Severity of a reported event.
    ///
    /// Distinct from the `tracing` level used for local diagnostics: this is
    /// the severity the collector receives.
    Level, "level" {
        Error => "error",
        Fatal => "fatal",
        Warn => "warn",
        Info => "info",
        Debug => "debug",
    }
}

log_tag! {
    /// Subsystem that produced the event.
    Package, "package" {
        Handler => "handler",
        Db => "db",
        Route => "route",
        Service => "service",
        Api => "api",
        Component => "component",
        Hook => "hook",
        Page => "page",
        State => "state",
        Style => "style",
        Auth => "auth",
        Config => "config",
        Middleware => "middleware",
        Utils => "utils",
        App => "app",
    }
}

/// A single event shipped to the collector.
///
/// Built fresh for each report and dropped once the request completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub stack: Stack,
    pub level: Level,
    pub package: Package,
    pub message: String,
}

impl LogEvent {
    pub fn new(stack: Stack, level: Level, package: Package, message: impl Into<String>) -> Self {
        Self {
            stack,
            level,
            package,
            message: message.into(),
        }
    }

    /// Shorthand for events raised by the front-end tier.
    pub fn frontend(level: Level, package: Package, message: impl Into<String>) -> Self {
        Self::new(Stack::Frontend, level, package, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serializes_to_exact_wire_keys() {
        let event = LogEvent::new(Stack::Frontend, Level::Fatal, Package::Component, "boom");
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(
            value,
            json!({
                "stack": "frontend",
                "level": "fatal",
                "package": "component",
                "message": "boom"
            })
        );
    }

    #[test]
    fn test_rejects_unknown_tag_values() {
        let raw = r#"{"stack":"mobile","level":"info","package":"app","message":"x"}"#;
        assert!(serde_json::from_str::<LogEvent>(raw).is_err());

        let raw = r#"{"stack":"frontend","level":"info","package":"app"}"#;
        assert!(serde_json::from_str::<LogEvent>(raw).is_err());
    }

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!("FRONTEND".parse::<Stack>().unwrap(), Stack::Frontend);
        assert_eq!(" Fatal ".parse::<Level>().unwrap(), Level::Fatal);
        assert_eq!("db".parse::<Package>().unwrap(), Package::Db);

        let err = "critical".parse::<Level>().unwrap_err();
        assert_eq!(err.kind, "level");
        assert_eq!(err.to_string(), "Unknown level 'critical'");
    }

    #[test]
    fn test_all_lists_every_variant_once() {
        assert_eq!(Stack::ALL.len(), 5);
        assert_eq!(Level::ALL.len(), 5);
        assert_eq!(Package::ALL.len(), 15);

        for package in Package::ALL {
            assert_eq!(package.as_str().parse::<Package>().unwrap(), *package);
        }
    }
}
