//! Test utilities for property-based testing
//!
//! This module provides generators and helpers for proptest.

#[cfg(test)]
pub mod generators {
    use proptest::prelude::*;

    use crate::config::defaults::RESERVED_LANE_NAMES;

    /// Generate a valid lane name (identifier that is not reserved)
    pub fn lane_name() -> impl Strategy<Value = String> {
        "[a-z_][a-z0-9_]{0,20}"
            .prop_filter("Name must not be reserved", |s| !RESERVED_LANE_NAMES.contains(&s.as_str()))
    }

    /// Generate a lane name with at least one space in it
    pub fn spaced_lane_name() -> impl Strategy<Value = String> {
        ("[a-z]{1,8}", "[ \t]{1,3}", "[a-z]{1,8}").prop_map(|(a, gap, b)| format!("{a}{gap}{b}"))
    }

    /// Generate a platform name
    pub fn platform_name() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("ios".to_string()),
            Just("mac".to_string()),
            Just("android".to_string()),
        ]
    }

    /// Generate text that is safe inside any quoted literal
    pub fn plain_text() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 .,:_-]{0,30}"
    }

    /// Generate a multi-line Lanefile fragment mixing quote styles and comments
    pub fn quoted_source() -> impl Strategy<Value = String> {
        prop::collection::vec(
            (plain_text(), 0u8..4).prop_map(|(text, style)| match style {
                0 => format!("puts \"{text}\""),
                1 => format!("puts '{text}'"),
                2 => format!("puts \u{201C}{text}\u{201D}"),
                _ => format!("# {text} 'quoted'"),
            }),
            0..8,
        )
        .prop_map(|lines| lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use proptest::prelude::*;

    use crate::config::defaults::MIN_PROPTEST_ITERATIONS;
    use crate::core::lanefile::Lanefile;
    use crate::core::script::repair_quotes;
    use crate::error::{DeclarationError, LanewayError};

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(MIN_PROPTEST_ITERATIONS))]

        #[test]
        fn test_valid_lane_names_register(name in lane_name(), platform in platform_name()) {
            let source = format!("lane :{name} {{\n}}\nplatform :{platform} {{\n  lane :{name} {{\n  }}\n}}\n");
            let lanefile = Lanefile::parse(&source).unwrap();
            prop_assert!(lanefile.registry().lane(None, &name).is_some());
            prop_assert!(lanefile.registry().lane(Some(&platform), &name).is_some());
        }

        #[test]
        fn test_spaced_lane_names_fail_in_any_scope(name in spaced_lane_name(), platform in platform_name()) {
            let root = format!("lane :\"{name}\" {{\n}}\n");
            let scoped = format!("platform :{platform} {{\n  lane :\"{name}\" {{\n  }}\n}}\n");
            for source in [root, scoped] {
                let err = Lanefile::parse(&source).unwrap_err();
                prop_assert!(
                    matches!(err, LanewayError::Declaration(DeclarationError::ContainsSpaces { .. })),
                    "unexpected error: {}", err
                );
            }
        }

        #[test]
        fn test_repair_preserves_line_count(source in quoted_source()) {
            let repaired = repair_quotes(&source);
            prop_assert_eq!(repaired.lines().count(), source.lines().count());
        }

        #[test]
        fn test_repair_is_idempotent(source in quoted_source()) {
            let once = repair_quotes(&source);
            prop_assert_eq!(repair_quotes(&once), once.clone());
        }

        #[test]
        fn test_repaired_source_parses(source in quoted_source()) {
            let script = format!("lane :x {{\n{source}\n}}\n");
            prop_assert!(Lanefile::parse(&script).is_ok());
        }
    }
}
