//! Pattern rule classification.
//!
//! Before a session starts, the proxy decides which monitoring channels the
//! capture subsystem must run.  Keystroke reconstruction and on-screen text
//! recognition are both expensive, so each is enabled only when at least one
//! rule of the session policy actually needs it.
//!
//! The three `contains_*` queries answer that question for a single rule set;
//! [`CaptureChannels`] combines the "kill" and "notify" rule sets of a policy.

pub mod rules;

pub use rules::{
    parse_rules, Channels, CompiledRule, MatchKind, PatternError, PatternRule, RuleKind,
    DIRECTIVE_MARKER, DIRECTIVE_TERMINATOR, RULE_SEPARATOR,
};

/// Returns `true` if any rule of `rule_set` is matched against keystrokes.
pub fn contains_kbd_pattern(rule_set: &str) -> bool {
    parse_rules(rule_set)
        .iter()
        .any(|rule| rule.channels().keyboard)
}

/// Returns `true` if any rule of `rule_set` is matched against screen text.
pub fn contains_ocr_pattern(rule_set: &str) -> bool {
    parse_rules(rule_set)
        .iter()
        .any(|rule| rule.channels().screen_text)
}

/// Returns `true` if any rule of `rule_set` needs either channel.
pub fn contains_kbd_or_ocr_pattern(rule_set: &str) -> bool {
    parse_rules(rule_set).iter().any(|rule| rule.channels().any())
}

/// Monitoring channels a session policy requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaptureChannels {
    /// Keystroke-pattern matching must run.
    pub keyboard: bool,
    /// Screen-text (OCR) pattern matching must run.
    pub screen_text: bool,
}

impl CaptureChannels {
    /// Classifies every rule set of a policy and ORs the results.
    pub fn from_rule_sets<'a>(rule_sets: impl IntoIterator<Item = &'a str>) -> Self {
        rule_sets
            .into_iter()
            .fold(CaptureChannels::default(), |acc, set| CaptureChannels {
                keyboard: acc.keyboard || contains_kbd_pattern(set),
                screen_text: acc.screen_text || contains_ocr_pattern(set),
            })
    }

    pub fn any(&self) -> bool {
        self.keyboard || self.screen_text
    }
}
