//! Classifies sequence ids as unplaced by exact name or shell-style glob.

use std::collections::HashSet;

use regex::Regex;

use super::error::ConfigError;

/// Membership test for unplaced (scaffold-like) sequences.
///
/// Specs containing `*`, `?` or `[` are compiled as globs; everything else is
/// an exact name. An empty matcher matches nothing.
#[derive(Debug, Clone, Default)]
pub struct UnplacedMatcher {
    names: HashSet<String>,
    patterns: Vec<Regex>,
}

impl UnplacedMatcher {
    /// Build a matcher from a list of names and patterns.
    pub fn new<I, S>(specs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut matcher = Self::default();
        for spec in specs {
            let spec = spec.as_ref();
            if is_glob(spec) {
                let compiled =
                    Regex::new(&glob_to_regex(spec)).map_err(|err| ConfigError::InvalidPattern {
                        pattern: spec.to_string(),
                        reason: err.to_string(),
                    })?;
                matcher.patterns.push(compiled);
            } else {
                matcher.names.insert(spec.to_string());
            }
        }
        Ok(matcher)
    }

    /// True if `id` is an exact name or matches any pattern.
    pub fn matches(&self, id: &str) -> bool {
        self.names.contains(id) || self.patterns.iter().any(|re| re.is_match(id))
    }

    /// True when the matcher holds no names and no patterns.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.patterns.is_empty()
    }
}

fn is_glob(spec: &str) -> bool {
    spec.contains(['*', '?', '['])
}

/// Translate an fnmatch-style glob into an anchored regex.
fn glob_to_regex(glob: &str) -> String {
    let chars: Vec<char> = glob.chars().collect();
    let mut out = String::from("^");
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    out.push_str(&translate_class(&chars[i + 1..end]));
                    i = end;
                }
                None => out.push_str("\\["),
            },
            c => out.push_str(&regex::escape(&c.to_string())),
        }
        i += 1;
    }

    out.push('$');
    out
}

/// Index of the `]` closing the class opened at `open`, if any.
fn class_end(chars: &[char], open: usize) -> Option<usize> {
    let mut j = open + 1;
    if chars.get(j) == Some(&'!') {
        j += 1;
    }
    // A leading ']' is a literal member.
    if chars.get(j) == Some(&']') {
        j += 1;
    }
    while j < chars.len() {
        if chars[j] == ']' {
            return Some(j);
        }
        j += 1;
    }
    None
}

fn translate_class(body: &[char]) -> String {
    let mut out = String::from("[");
    let mut members = body;
    if let Some((&'!', rest)) = members.split_first() {
        out.push('^');
        members = rest;
    }
    for &c in members {
        match c {
            '\\' | '[' | ']' | '^' | '&' | '~' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out.push(']');
    out
}
