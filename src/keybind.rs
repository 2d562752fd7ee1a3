// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Keybinding extraction and presentation.
//!
//! Hyprland keybindings are spread across one or more configuration files as
//! `bind` directives:
//!
//! ```text
//! bind = SUPER, Q, exec, firefox
//! ```
//!
//! This module filters those directives out of the configuration, cleans them
//! up, and reformats each one into a two column row of trigger (the modifier
//! and key combination) and action (the command the trigger fires). The rows
//! are then handed to an external dmenu-compatible selector so the user can
//! fuzzy search their own keybindings.
//!
//! # Extraction Pipeline
//!
//! Extraction is a pure in-process pipeline: read all files in order, keep
//! lines whose first token is exactly `bind`, truncate at the first `#`,
//! drop blanks, deduplicate, then parse each survivor into a [`Binding`].
//! Missing or unreadable files contribute zero lines instead of failing, so
//! the caller can pass every path a binding could live at without checking
//! which ones exist.
//!
//! # Pitfalls
//!
//! Comment stripping is naive. An action payload containing a literal `#`
//! gets truncated at it, e.g., `exec, echo 'a#b'` surfaces as `echo 'a`.
//! Upstream behaves the same way, and we preserve it rather than guess at
//! which `#` starts a comment.
//!
//! # Markup Escaping
//!
//! The selector renders rows as markup, so the five reserved characters in
//! the action column are replaced with their named entities. Ampersand goes
//! first so entities introduced by the other four substitutions survive
//! untouched.

use std::{
    collections::BTreeSet,
    fmt::{Display, Formatter, Result as FmtResult},
    fs::read_to_string,
    io::Write,
    path::Path,
    process::{Command, ExitStatus, Stdio},
};
use tracing::{debug, instrument};

/// Directive keyword identifying a keybinding definition.
const DIRECTIVE: &str = "bind";

/// Optional payload token marking a shell command execution.
const EXEC_MARKER: &str = "exec";

/// A single formatted keybinding entry.
///
/// Derived, read-only pair of display label and display action. The action
/// field is already markup-escaped by the time a `Binding` exists.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Binding {
    /// Modifier and key combination that activates the action.
    pub trigger: String,

    /// Markup-escaped command or effect the trigger fires.
    pub action: String,
}

impl Display for Binding {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        write!(fmt, "{:<35} → {}", self.trigger, self.action)
    }
}

/// Extract keybindings from an ordered listing of configuration files.
///
/// Paths that do not exist, or cannot be read, contribute zero lines. Lines
/// that fail to match the `bind` directive syntax are dropped, as are
/// directives with no action payload left after cleanup. Output is sorted
/// lexically on the raw directive line, which makes the listing
/// deterministic regardless of file order.
#[instrument(skip(paths), level = "debug")]
pub fn extract(paths: impl IntoIterator<Item = impl AsRef<Path>>) -> Vec<Binding> {
    let mut survivors = BTreeSet::new();
    for path in paths {
        let content = match read_to_string(path.as_ref()) {
            Ok(content) => content,
            Err(error) => {
                debug!("skipping {:?}: {error}", path.as_ref().display());
                continue;
            }
        };

        survivors.extend(content.lines().filter_map(qualify));
    }

    survivors
        .iter()
        .filter_map(|line| parse_directive(line))
        .collect()
}

/// Keep a raw configuration line only if it is a live `bind` directive.
///
/// Comment stripping happens after the directive check, so a commented-out
/// binding never qualifies.
fn qualify(line: &str) -> Option<String> {
    if line.split_whitespace().next() != Some(DIRECTIVE) {
        return None;
    }

    // INVARIANT: Everything from the first '#' onward is comment.
    let line = line.split('#').next().unwrap_or_default().trim();
    if line.is_empty() {
        return None;
    }

    Some(line.to_owned())
}

/// Parse one comment-stripped `bind` directive into a [`Binding`].
///
/// Returns [`None`] for malformed directives and for directives whose
/// cleaned action payload is empty.
fn parse_directive(line: &str) -> Option<Binding> {
    let rest = line.trim_start().strip_prefix(DIRECTIVE)?;
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();
    let rest = strip_exec_marker(rest);

    let fields: Vec<&str> = rest.split(',').collect();
    let trigger_raw = match fields.get(1) {
        Some(second) => format!("{} + {}", fields[0], second),
        None => fields[0].to_owned(),
    };
    let trigger = collapse_whitespace(&trigger_raw);
    let trigger = trigger
        .strip_prefix("+ ")
        .map(ToOwned::to_owned)
        .unwrap_or(trigger);

    let action_raw = match fields.len() {
        0..=2 => String::new(),
        _ => fields[2..].join(","),
    };
    let action = strip_exec_marker(action_raw.trim()).trim();
    if action.is_empty() {
        return None;
    }

    Some(Binding {
        trigger,
        action: escape_markup(action),
    })
}

/// Strip a leading execution-marker token, if present.
///
/// The marker only counts as a token when followed by a comma, whitespace,
/// or the end of input; `execute-this` is left alone.
fn strip_exec_marker(text: &str) -> &str {
    let Some(rest) = text.strip_prefix(EXEC_MARKER) else {
        return text;
    };

    match rest.chars().next() {
        None => rest,
        Some(',') => &rest[1..],
        Some(next) if next.is_whitespace() => rest,
        Some(_) => text,
    }
}

/// Collapse runs of whitespace into single spaces, trimming both ends.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Escape the five markup-reserved characters with their named entities.
///
/// # Invariant
///
/// - Ampersand is replaced first, so entities produced by the other four
///   substitutions are never double-escaped.
fn escape_markup(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// External dmenu-compatible selector.
///
/// The formatted bindings are piped into the selector's stdin; everything
/// past that point (search, selection, rendering) belongs to the selector.
#[derive(Clone, Debug)]
pub struct Menu {
    program: String,
    theme: String,
    prompt: String,
}

impl Menu {
    /// Construct new menu hand-off.
    pub fn new(
        program: impl Into<String>,
        theme: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            program: program.into(),
            theme: theme.into(),
            prompt: prompt.into(),
        }
    }

    /// Present bindings through the selector.
    ///
    /// Blocks until the selector exits, and reports its exit status so the
    /// caller can inherit it.
    ///
    /// # Errors
    ///
    /// - Return [`KeybindError::Selector`] if the selector cannot be
    ///   spawned or fed.
    #[instrument(skip(self, bindings), level = "debug")]
    pub fn show(&self, bindings: &[Binding]) -> Result<ExitStatus> {
        let mut child = Command::new(&self.program)
            .args(["--dmenu", "--theme", self.theme.as_str(), "-p", self.prompt.as_str()])
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|source| KeybindError::Selector {
                source,
                program: self.program.clone(),
            })?;

        // INVARIANT: Stdin handle must drop before wait, or the selector
        // never sees end of input.
        {
            let mut stdin = child.stdin.take().ok_or_else(|| KeybindError::Selector {
                source: std::io::Error::other("selector stdin unavailable"),
                program: self.program.clone(),
            })?;
            for binding in bindings {
                writeln!(stdin, "{binding}").map_err(|source| KeybindError::Selector {
                    source,
                    program: self.program.clone(),
                })?;
            }
        }

        child.wait().map_err(|source| KeybindError::Selector {
            source,
            program: self.program.clone(),
        })
    }
}

impl Default for Menu {
    fn default() -> Self {
        Self::new("walker", "keybindings", "Keybindings")
    }
}

/// Keybinding presentation error types.
#[derive(Debug, thiserror::Error)]
pub enum KeybindError {
    /// Selector process cannot be spawned or written to.
    #[error("failed to run selector {program:?}")]
    Selector {
        #[source]
        source: std::io::Error,
        program: String,
    },
}

/// Friendly result alias :3
pub type Result<T, E = KeybindError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;
    use simple_test_case::test_case;
    use std::fs::write;

    fn extract_str(content: &str) -> Vec<Binding> {
        content.lines().filter_map(qualify).collect::<BTreeSet<_>>()
            .iter()
            .filter_map(|line| parse_directive(line))
            .collect()
    }

    #[test]
    fn directive_with_payload_becomes_binding() {
        let result = extract_str("bind = SUPER, Q, exec, firefox");
        let expect = vec![Binding {
            trigger: "SUPER + Q".into(),
            action: "firefox".into(),
        }];
        assert_eq!(result, expect);
    }

    #[test]
    fn action_is_markup_escaped() {
        let result = extract_str(r#"bind = SUPER SHIFT, Return, exec, kitty --title "a & b""#);
        let expect = vec![Binding {
            trigger: "SUPER SHIFT + Return".into(),
            action: "kitty --title &quot;a &amp; b&quot;".into(),
        }];
        assert_eq!(result, expect);
    }

    #[test]
    fn ampersand_escape_never_doubles() {
        let result = extract_str("bind = SUPER, X, exec, echo 'a&<b>'");
        assert_eq!(
            result[0].action,
            "echo &apos;a&amp;&lt;b&gt;&apos;".to_string()
        );
    }

    #[test_case("bind = SUPER, L,"; "no payload")]
    #[test_case("bind = SUPER, L, exec,"; "exec marker only")]
    #[test_case("bind = SUPER, L, exec, # nothing here"; "payload all comment")]
    #[test]
    fn empty_action_is_dropped(line: &str) {
        pretty_assertions::assert_eq!(extract_str(line), Vec::new());
    }

    #[test_case("unbind = SUPER, O"; "unbind directive")]
    #[test_case("bindm = SUPER, mouse:272, movewindow"; "bindm directive")]
    #[test_case("# bind = SUPER, Q, exec, firefox"; "commented out")]
    #[test_case("env = CHROME_FLAGS,\"--ozone-platform=wayland\""; "unrelated directive")]
    #[test_case("   "; "blank line")]
    #[test]
    fn non_directive_lines_produce_nothing(line: &str) {
        pretty_assertions::assert_eq!(extract_str(line), Vec::new());
    }

    #[test]
    fn exact_duplicates_collapse_to_one_entry() {
        let content = indoc! {r#"
            bind = SUPER, Q, exec, firefox
            bind = SUPER, Q, exec, firefox # same after comment strip
        "#};
        assert_eq!(extract_str(content).len(), 1);
    }

    #[test]
    fn naive_comment_strip_truncates_hash_payloads() {
        let result = extract_str("bind = SUPER, X, exec, echo a#b");
        assert_eq!(result[0].action, "echo a".to_string());
    }

    #[test]
    fn empty_modifiers_lose_leading_plus_sign() {
        let result = extract_str("bind = , Print, exec, grim");
        let expect = vec![Binding {
            trigger: "Print".into(),
            action: "grim".into(),
        }];
        assert_eq!(result, expect);
    }

    #[test]
    fn trigger_whitespace_collapses() {
        let result = extract_str("bind =  SUPER   SHIFT ,  Return , exec, kitty");
        assert_eq!(result[0].trigger, "SUPER SHIFT + Return".to_string());
    }

    #[test]
    fn action_keeps_interior_commas() {
        let result = extract_str("bind = SUPER, V, exec, cliphist list, then pick");
        assert_eq!(result[0].action, "cliphist list, then pick".to_string());
    }

    #[test]
    fn formatted_row_pads_trigger_to_fixed_width() {
        let binding = Binding {
            trigger: "SUPER + Q".into(),
            action: "firefox".into(),
        };
        let expect = format!("{:<35} → firefox", "SUPER + Q");
        assert_eq!(binding.to_string(), expect);
    }

    #[sealed_test]
    fn missing_files_contribute_zero_lines() {
        let result = extract(["no-such-file.conf", "also-missing.conf"]);
        assert_eq!(result, Vec::new());
    }

    #[sealed_test]
    fn files_concatenate_in_path_order_and_sort() -> anyhow::Result<()> {
        write(
            "hyprland.conf",
            indoc! {r#"
                bind = SUPER, Q, exec, firefox
                monitor = , preferred, auto, 1
            "#},
        )?;
        write(
            "bindings.conf",
            indoc! {r#"
                bind = SUPER SHIFT, Return, exec, kitty
                bind = SUPER, Q, exec, firefox
            "#},
        )?;

        let result = extract(["hyprland.conf", "bindings.conf", "missing.conf"]);
        let expect = vec![
            Binding {
                trigger: "SUPER SHIFT + Return".into(),
                action: "kitty".into(),
            },
            Binding {
                trigger: "SUPER + Q".into(),
                action: "firefox".into(),
            },
        ];
        assert_eq!(result, expect);

        Ok(())
    }
}
