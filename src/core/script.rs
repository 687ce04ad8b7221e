//! Script sources and quote repair
//!
//! A [`Script`] owns the raw text of a Lanefile together with where it came
//! from. The raw text is kept after parsing: lane descriptions are harvested
//! from it and syntax errors quote lines out of it.

use std::path::{Path, PathBuf};

use crate::config::defaults::INLINE_ORIGIN;
use crate::error::ScriptError;

/// Where a script's text came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptOrigin {
    /// Read from a file
    File(PathBuf),
    /// Supplied as a string
    Inline,
}

/// Raw Lanefile text plus its origin
#[derive(Debug, Clone)]
pub struct Script {
    origin: ScriptOrigin,
    source: String,
}

impl Script {
    /// Read a script from disk
    pub fn from_path(path: &Path) -> Result<Self, ScriptError> {
        if !path.is_file() {
            return Err(ScriptError::NotFound {
                path: path.display().to_string(),
            });
        }

        let source = std::fs::read_to_string(path).map_err(|e| ScriptError::Read {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        Ok(Self {
            origin: ScriptOrigin::File(path.to_path_buf()),
            source,
        })
    }

    /// Wrap a string as an inline script
    pub fn inline(source: impl Into<String>) -> Self {
        Self {
            origin: ScriptOrigin::Inline,
            source: source.into(),
        }
    }

    pub fn origin(&self) -> &ScriptOrigin {
        &self.origin
    }

    /// Raw source text, before quote repair
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Label used in error messages: the path as given (without a leading
    /// `./`) or the inline marker
    pub fn origin_label(&self) -> String {
        match &self.origin {
            ScriptOrigin::File(path) => {
                let shown = path.display().to_string();
                shown
                    .strip_prefix("./")
                    .map(str::to_string)
                    .unwrap_or(shown)
            }
            ScriptOrigin::Inline => INLINE_ORIGIN.to_string(),
        }
    }

    /// Directory that relative imports resolve against
    pub fn base_dir(&self) -> PathBuf {
        match &self.origin {
            ScriptOrigin::File(path) => path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf),
            ScriptOrigin::Inline => PathBuf::from("."),
        }
    }

    /// Canonical path of a file script, used for import cycle detection
    pub fn canonical_path(&self) -> Option<PathBuf> {
        match &self.origin {
            ScriptOrigin::File(path) => {
                Some(std::fs::canonicalize(path).unwrap_or_else(|_| path.clone()))
            }
            ScriptOrigin::Inline => None,
        }
    }

    /// Line `n` (1-based) of the raw source
    pub fn line(&self, n: usize) -> Option<&str> {
        n.checked_sub(1).and_then(|i| self.source.lines().nth(i))
    }

    /// Comment block immediately above line `n`, used as a lane description.
    ///
    /// Walks upwards until the first line that is blank or not a comment.
    /// Comment lines with no text are skipped.
    pub fn comment_block_above(&self, n: usize) -> Vec<String> {
        let lines: Vec<&str> = self.source.lines().collect();
        let mut description = Vec::new();

        let mut index = n.saturating_sub(1);
        while index > 0 {
            index -= 1;
            let Some(text) = lines.get(index).map(|l| l.trim()) else {
                break;
            };
            let Some(comment) = text.strip_prefix('#') else {
                break;
            };
            let comment = comment.trim();
            if !comment.is_empty() {
                description.push(comment.to_string());
            }
        }

        description.reverse();
        description
    }

    /// Source text with quotes repaired, ready for the lexer
    pub fn repaired_source(&self) -> String {
        repair_quotes(&self.source)
    }
}

/// Rewrite quoting the lexer does not accept into double-quoted literals.
///
/// Typographic quotes are normalised to their ASCII forms and single-quoted
/// literals become double-quoted ones. Newlines are never added or removed,
/// so line numbers stay valid. Comments and double-quoted strings are copied
/// untouched.
pub fn repair_quotes(source: &str) -> String {
    let normalised: String = source
        .chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{2033}' => '"',
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{2032}' => '\'',
            other => other,
        })
        .collect();

    let mut out = String::with_capacity(normalised.len());
    let mut chars = normalised.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '#' => {
                out.push(c);
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    out.push(next);
                    chars.next();
                }
            }
            '"' => {
                out.push(c);
                while let Some(next) = chars.next() {
                    out.push(next);
                    match next {
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                out.push(escaped);
                            }
                        }
                        '"' | '\n' => break,
                        _ => {}
                    }
                }
            }
            '\'' => {
                out.push('"');
                while let Some(next) = chars.next() {
                    match next {
                        '\\' => {
                            // Only \' and \\ are escapes inside single quotes
                            match chars.peek() {
                                Some('\'') => {
                                    chars.next();
                                    out.push('\'');
                                }
                                Some('\\') => {
                                    chars.next();
                                    out.push_str("\\\\");
                                }
                                _ => out.push_str("\\\\"),
                            }
                        }
                        '\'' => {
                            out.push('"');
                            break;
                        }
                        '"' => out.push_str("\\\""),
                        '\n' => {
                            // Unterminated: leave the rest to the lexer
                            out.push(next);
                            break;
                        }
                        other => out.push(other),
                    }
                }
            }
            other => out.push(other),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repair_single_quotes() {
        assert_eq!(repair_quotes("sh 'ls -la'"), "sh \"ls -la\"");
    }

    #[test]
    fn test_repair_typographic_quotes() {
        assert_eq!(
            repair_quotes("puts \u{201C}hello\u{201D}"),
            "puts \"hello\""
        );
        assert_eq!(repair_quotes("puts \u{2018}hi\u{2019}"), "puts \"hi\"");
    }

    #[test]
    fn test_repair_escapes_inner_double_quotes() {
        assert_eq!(repair_quotes(r#"sh 'say "hi"'"#), r#"sh "say \"hi\"""#);
    }

    #[test]
    fn test_repair_leaves_comments_and_strings() {
        let src = "# it's fine\nsh \"it's fine\"";
        assert_eq!(repair_quotes(src), src);
    }

    #[test]
    fn test_repair_preserves_lines() {
        let src = "lane :a {\n  sh 'one'\n  sh 'two\n}\n";
        let repaired = repair_quotes(src);
        assert_eq!(repaired.lines().count(), src.lines().count());
    }

    #[test]
    fn test_comment_block_above() {
        let script = Script::inline("lane :a { }\n\n# My Deploy\n#\n# description\nlane :deploy { }\n");
        assert_eq!(
            script.comment_block_above(6),
            vec!["My Deploy".to_string(), "description".to_string()]
        );
    }

    #[test]
    fn test_comment_block_stops_at_blank_line() {
        let script = Script::inline("# unrelated\n\n# mine\nlane :x { }\n");
        assert_eq!(script.comment_block_above(4), vec!["mine".to_string()]);
        assert!(script.comment_block_above(1).is_empty());
    }

    #[test]
    fn test_origin_label_strips_dot_slash() {
        let script = Script {
            origin: ScriptOrigin::File(PathBuf::from("./fixtures/Lanefile")),
            source: String::new(),
        };
        assert_eq!(script.origin_label(), "fixtures/Lanefile");
        assert_eq!(Script::inline("").origin_label(), "(inline)");
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = Script::from_path(Path::new("./definitely/not/here")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Could not find Lanefile at path './definitely/not/here'"
        );
    }
}
