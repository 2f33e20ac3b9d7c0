// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Attack detector for raw submitted text.
//!
//! Scans the text as typed, before sanitization, against an ordered list of
//! independent rules. Any match flags the text. The heuristic is coarse:
//! ordinary prose that happens to contain `alert(` or `onion=` is flagged
//! too.
//!
//! Encoded payloads (HTML entities, percent-encoding, Unicode escapes) are
//! not decoded. `&lt;script&gt;` passes detection; the sanitizer leaves it
//! as inert text.

use crate::error::Result;
use regex::{Regex, RegexBuilder};
use tracing::debug;

/// A single detection rule.
pub trait DetectionRule: Send + Sync {
    /// Short identifier used in logs. Never the matched text.
    fn name(&self) -> &str;

    /// Whether `text` trips this rule.
    fn matches(&self, text: &str) -> bool;
}

/// Case-insensitive regular expression rule.
#[derive(Debug, Clone)]
pub struct PatternRule {
    name: String,
    pattern: Regex,
}

impl PatternRule {
    /// Compile a rule. The pattern is always matched case-insensitively.
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self> {
        let pattern = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Self {
            name: name.into(),
            pattern,
        })
    }
}

impl DetectionRule for PatternRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Built-in rules as `(name, pattern)` pairs.
const BUILTIN_RULES: &[(&str, &str)] = &[
    ("script_open", r"<script"),
    ("script_close", r"</script>"),
    ("event_handler", r"on\w+\s*="),
    ("javascript_uri", r"javascript:"),
    ("iframe_tag", r"<iframe"),
    ("object_tag", r"<object"),
    ("embed_tag", r"<embed"),
    ("onerror_handler", r"onerror\s*="),
    ("onload_handler", r"onload\s*="),
    ("onclick_handler", r"onclick\s*="),
    ("alert_call", r"alert\s*\("),
    ("eval_call", r"eval\s*\("),
    ("cookie_access", r"document\.cookie"),
    ("img_src", r"<img[^>]+src"),
    ("svg_tag", r"<svg"),
    ("body_tag", r"<body"),
    ("input_onfocus", r"<input[^>]+onfocus"),
    ("marquee_tag", r"<marquee"),
];

/// Ordered rule set producing a boolean verdict.
pub struct AttackDetector {
    rules: Vec<Box<dyn DetectionRule>>,
}

impl Default for AttackDetector {
    fn default() -> Self {
        Self::builtin()
    }
}

impl AttackDetector {
    /// Detector with no rules. Flags nothing until rules are appended.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Detector loaded with the built-in XSS rules.
    pub fn builtin() -> Self {
        let rules = BUILTIN_RULES
            .iter()
            .map(|(name, pattern)| {
                let rule = PatternRule::new(*name, pattern)
                    .expect("built-in attack patterns are valid regular expressions");
                Box::new(rule) as Box<dyn DetectionRule>
            })
            .collect();
        Self { rules }
    }

    /// Append a rule after the existing ones.
    pub fn with_rule(mut self, rule: impl DetectionRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Number of loaded rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Name of the first rule that matches, if any.
    pub fn first_match(&self, raw: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.matches(raw))
            .map(|rule| rule.name())
    }

    /// Whether `raw` looks like an attack.
    pub fn is_attack(&self, raw: &str) -> bool {
        match self.first_match(raw) {
            Some(rule) => {
                debug!(rule, length = raw.len(), "Attack pattern matched");
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for AttackDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttackDetector")
            .field("rules", &self.rules.iter().map(|r| r.name()).collect::<Vec<_>>())
            .finish()
    }
}
