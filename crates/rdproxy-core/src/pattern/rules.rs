//! Parser for policy pattern rule sets.
//!
//! A rule set is the text an administrator types into the "pattern to kill"
//! or "pattern to notify" field of a connection policy.  Its grammar is shared
//! with existing policy files and must not change:
//!
//! ```text
//! rule-set  = rule *( %x01 rule )
//! rule      = *WSP ( directive-rule / plain-rule )
//! directive-rule = "$" directive ":" payload
//! directive = token *( ( "-" / "," ) token )
//! plain-rule = payload
//! ```
//!
//! Examples:
//!
//! | Rule                        | Channels          | Match                   |
//! |-----------------------------|-------------------|-------------------------|
//! | `Bloc-notes`                | screen text       | regex                   |
//! | `$kbd:gpedit`               | keystrokes        | regex                   |
//! | `$ocr-kbd:cmd`              | both              | regex                   |
//! | `$exact-content,ocr:cmd`    | screen text       | whole string, literal   |
//! | `$ocm:10.10.46.0/24:3389`   | none (not content)| -                       |

use regex::{Regex, RegexBuilder};
use thiserror::Error;

/// Separator between two rules of a rule set.
pub const RULE_SEPARATOR: char = '\x01';
/// First character of a directive rule.
pub const DIRECTIVE_MARKER: char = '$';
/// Ends the directive segment of a directive rule.
pub const DIRECTIVE_TERMINATOR: char = ':';

const TOKEN_SEPARATORS: [char; 2] = ['-', ','];

/// Monitoring channels a rule is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Channels {
    /// Matched against the reconstructed keystroke stream.
    pub keyboard: bool,
    /// Matched against text recognised on screen.
    pub screen_text: bool,
}

impl Channels {
    pub const NONE: Channels = Channels {
        keyboard: false,
        screen_text: false,
    };

    pub fn any(&self) -> bool {
        self.keyboard || self.screen_text
    }
}

/// How a rule payload is compared with observed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchKind {
    /// The payload is a regular expression.
    #[default]
    Regex,
    /// The payload is literal text.
    Content,
}

/// The family a rule belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleKind {
    /// A content rule, matched on one or more monitoring channels.
    Content {
        channels: Channels,
        kind: MatchKind,
        /// The whole observed string must match, not just part of it.
        exact: bool,
    },
    /// A directive none of whose tokens this parser knows, e.g. a network
    /// rule.  Such rules never enable content monitoring.
    Unknown { directive: String },
}

/// One parsed rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternRule {
    pub kind: RuleKind,
    pub payload: String,
}

impl PatternRule {
    /// Channels this rule must be matched against.
    pub fn channels(&self) -> Channels {
        match self.kind {
            RuleKind::Content { channels, .. } => channels,
            RuleKind::Unknown { .. } => Channels::NONE,
        }
    }

    /// Builds a matcher for this rule.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::NotContent`] for unknown directives and
    /// [`PatternError::InvalidRegex`] when a regex payload does not compile.
    pub fn compile(&self) -> Result<CompiledRule, PatternError> {
        let RuleKind::Content { kind, exact, .. } = self.kind else {
            return Err(PatternError::NotContent(self.payload.clone()));
        };
        let matcher = match kind {
            MatchKind::Content => Matcher::Literal(self.payload.clone()),
            MatchKind::Regex => {
                let source = if exact {
                    format!("^(?:{})$", self.payload)
                } else {
                    self.payload.clone()
                };
                let re = RegexBuilder::new(&source).build().map_err(|e| {
                    PatternError::InvalidRegex {
                        pattern: self.payload.clone(),
                        reason: e.to_string(),
                    }
                })?;
                Matcher::Regex(re)
            }
        };
        Ok(CompiledRule { matcher, exact })
    }
}

/// Errors raised when turning a rule into a matcher.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("rule {0:?} is not a content rule")]
    NotContent(String),
    #[error("invalid regex {pattern:?}: {reason}")]
    InvalidRegex { pattern: String, reason: String },
}

#[derive(Debug, Clone)]
enum Matcher {
    Literal(String),
    Regex(Regex),
}

/// A rule ready to be tested against observed text.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    matcher: Matcher,
    exact: bool,
}

impl CompiledRule {
    /// Returns `true` if `text` triggers the rule.
    pub fn is_match(&self, text: &str) -> bool {
        match &self.matcher {
            Matcher::Literal(needle) if self.exact => text == needle,
            Matcher::Literal(needle) => text.contains(needle.as_str()),
            Matcher::Regex(re) => re.is_match(text),
        }
    }
}

/// Splits a rule set into its rules.
///
/// Blank rules and rules with an empty payload are dropped: they have nothing
/// to match.
pub fn parse_rules(rule_set: &str) -> Vec<PatternRule> {
    rule_set
        .split(RULE_SEPARATOR)
        .filter_map(parse_rule)
        .collect()
}

fn parse_rule(raw: &str) -> Option<PatternRule> {
    let rule = raw.trim_start_matches(|c: char| c.is_ascii_whitespace());
    if rule.is_empty() {
        return None;
    }

    let Some(body) = rule.strip_prefix(DIRECTIVE_MARKER) else {
        return Some(PatternRule {
            kind: RuleKind::Content {
                channels: Channels {
                    keyboard: false,
                    screen_text: true,
                },
                kind: MatchKind::Regex,
                exact: false,
            },
            payload: rule.to_string(),
        });
    };

    let (directive, payload) = body
        .split_once(DIRECTIVE_TERMINATOR)
        .unwrap_or((body, ""));
    if payload.is_empty() {
        return None;
    }

    Some(PatternRule {
        kind: parse_directive(directive),
        payload: payload.to_string(),
    })
}

fn parse_directive(directive: &str) -> RuleKind {
    let mut channels = Channels::NONE;
    let mut kind = MatchKind::Regex;
    let mut exact = false;
    let mut recognised = false;

    for token in directive.split(TOKEN_SEPARATORS) {
        match token {
            "kbd" => channels.keyboard = true,
            "ocr" => channels.screen_text = true,
            "content" => kind = MatchKind::Content,
            "regex" => kind = MatchKind::Regex,
            "exact" => exact = true,
            _ => continue,
        }
        recognised = true;
    }

    if !recognised {
        tracing::debug!(
            directive,
            "unknown pattern directive; rule excluded from content monitoring"
        );
        return RuleKind::Unknown {
            directive: directive.to_string(),
        };
    }
    RuleKind::Content {
        channels,
        kind,
        exact,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
