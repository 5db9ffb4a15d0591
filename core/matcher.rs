//! Substring-glob matching of root-relative paths against ignore patterns.
//!
//! Every pattern is wrapped as `*pattern*` and matched against the whole
//! relative path with `*` allowed to cross `/`. So `build` ignores
//! `build/x`, `src/build.rs` and `rebuild` alike, which is looser than
//! gitignore semantics. Only `*`, `?`, `[...]` and `[!...]` are special;
//! braces and backslashes match themselves.

use crate::error::{AppError, Result, ScanWarning};
use crate::rules::IgnoreRuleSet;
use globset::{Glob, GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};
use log;

pub fn wrap_pattern(pattern: &str) -> String {
    format!("*{}*", pattern)
}

/// Rewrites a shell-style pattern into globset syntax with the same meaning.
///
/// Braces are literal, a class opened with `^` is not negated (only `[!` is),
/// and `]` right after `[` or `[!` is a member. An unclosed `[` is copied
/// through unchanged so that compilation rejects it.
fn translate_pattern(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '{' => out.push_str("[{]"),
            '}' => out.push_str("[}]"),
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    push_class(&chars[i + 1..end], &mut out);
                    i = end;
                }
                None => {
                    out.extend(&chars[i..]);
                    break;
                }
            },
            c => out.push(c),
        }
        i += 1;
    }
    out
}

/// Index of the `]` closing the class opened at `start`.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start + 1;
    if chars.get(j) == Some(&'!') {
        j += 1;
    }
    if chars.get(j) == Some(&']') {
        j += 1;
    }
    chars[j..].iter().position(|&c| c == ']').map(|p| j + p)
}

fn push_class(body: &[char], out: &mut String) {
    let (negated, members) = match body.split_first() {
        Some(('!', rest)) => (true, rest),
        _ => (false, body),
    };
    if !negated && members.first() == Some(&'^') {
        // globset negates on a leading `^`; lead with a member already in the
        // class instead.
        if members.len() == 1 {
            out.push('^');
            return;
        }
        out.push('[');
        out.push(members[members.len() - 1]);
        out.extend(members);
        out.push(']');
        return;
    }
    out.push('[');
    if negated {
        out.push('!');
    }
    out.extend(members);
    out.push(']');
}

fn compile_glob(pattern: &str) -> Result<Glob> {
    GlobBuilder::new(&wrap_pattern(&translate_pattern(pattern)))
        .literal_separator(false)
        .backslash_escape(false)
        .build()
        .map_err(AppError::from)
}

pub fn compile_pattern(pattern: &str) -> Result<GlobMatcher> {
    Ok(compile_glob(pattern)?.compile_matcher())
}

/// Reports whether `path` matches `pattern` under substring-glob rules.
///
/// A pattern that fails to compile never matches; the failure is logged.
pub fn matches(pattern: &str, path: &str) -> bool {
    match compile_pattern(pattern) {
        Ok(matcher) => matcher.is_match(path),
        Err(e) => {
            log::warn!("Invalid pattern \"{}\": {}", pattern, e);
            false
        }
    }
}

/// A compiled [`IgnoreRuleSet`].
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    set: GlobSet,
    compiled: Vec<String>,
    warnings: Vec<ScanWarning>,
}

impl PatternMatcher {
    pub fn new(rules: &IgnoreRuleSet) -> Self {
        Self::from_patterns(rules.patterns())
    }

    pub fn from_patterns<S: AsRef<str>>(patterns: &[S]) -> Self {
        let mut builder = GlobSetBuilder::new();
        let mut compiled = Vec::new();
        let mut warnings = Vec::new();

        for pattern in patterns.iter().map(AsRef::as_ref) {
            match compile_glob(pattern) {
                Ok(glob) => {
                    log::trace!(
                        "Adding glob pattern: {} (processed as {})",
                        pattern,
                        glob.glob()
                    );
                    builder.add(glob);
                    compiled.push(pattern.to_string());
                }
                Err(e) => {
                    log::warn!("Invalid glob pattern \"{}\" ignored: {}", pattern, e);
                    warnings.push(ScanWarning::InvalidPattern {
                        pattern: pattern.to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        let set = builder.build().unwrap_or_else(|e| {
            log::error!("Error building glob set: {}", e);
            warnings.push(ScanWarning::InvalidPattern {
                pattern: compiled.join(", "),
                message: e.to_string(),
            });
            compiled.clear();
            GlobSet::empty()
        });

        Self {
            set,
            compiled,
            warnings,
        }
    }

    /// `path` is root-relative with `/` separators.
    pub fn is_ignored(&self, path: &str) -> bool {
        self.set.is_match(path)
    }

    /// The patterns that match `path`, in rule-set order.
    pub fn matching_patterns(&self, path: &str) -> Vec<&str> {
        self.set
            .matches(path)
            .into_iter()
            .map(|idx| self.compiled[idx].as_str())
            .collect()
    }

    pub fn patterns(&self) -> &[String] {
        &self.compiled
    }

    pub fn warnings(&self) -> &[ScanWarning] {
        &self.warnings
    }
}
