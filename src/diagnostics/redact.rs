//! Pattern-based redaction of sensitive substrings.
//!
//! Best effort: the patterns can both miss secrets that do not match and
//! hide harmless values that do (e.g. a public 64-hex block hash).

use regex::Regex;
use serde::Deserialize;

/// Ordered default rules: `(name, pattern, replacement)`.
///
/// Key/value secrets run first so the value is replaced as a whole before
/// narrower rules see pieces of it. Keys run before addresses because both
/// are bech32 strings.
const DEFAULT_RULES: &[(&str, &str, &str)] = &[
    (
        "secret-assignment",
        r#"(?i)\b(priv(?:ate)?[_-]?key|secret(?:[_-]?key)?|password|passphrase|mnemonic|api[_-]?key|auth[_-]?token|token)("?\s*[=:]\s*)(\{[^}]*\}|"[^"]*"|'[^']*'|[^\s,}]+)"#,
        "${1}${2}[REDACTED]",
    ),
    (
        "bech32-key",
        r"\b(?:tpknam|tsknam|zsknam|zvknam|zppknam)1[02-9ac-hj-np-z]{20,}\b",
        "[REDACTED_KEY]",
    ),
    (
        "bech32-address",
        r"\b(?:tnam|znam)1[02-9ac-hj-np-z]{20,}\b",
        "[REDACTED_ADDRESS]",
    ),
    ("hex64", r"\b[0-9A-Fa-f]{64,}\b", "[REDACTED_HEX]"),
    ("ipv4", r"\b(?:\d{1,3}\.){3}\d{1,3}\b", "[REDACTED_IP]"),
    (
        "email",
        r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
        "[REDACTED_EMAIL]",
    ),
];

/// A user-supplied rule, as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, serde::Serialize)]
pub struct RuleSpec {
    pub name: String,
    pub pattern: String,
    #[serde(default = "default_replacement")]
    pub replacement: String,
}

fn default_replacement() -> String {
    "[REDACTED]".to_string()
}

/// One substitution: every match of `pattern` becomes `replacement`.
#[derive(Debug, Clone)]
pub struct RedactionRule {
    name: String,
    pattern: Regex,
    replacement: String,
}

impl RedactionRule {
    /// `replacement` may refer to capture groups (`$1`, `${name}`).
    pub fn new(name: &str, pattern: &str, replacement: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.to_string(),
            pattern: Regex::new(pattern)?,
            replacement: replacement.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Output of a redaction pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redacted {
    pub text: String,
    /// `(rule name, replacements made)` for rules that matched.
    pub hits: Vec<(String, usize)>,
}

impl Redacted {
    pub fn total(&self) -> usize {
        self.hits.iter().map(|(_, n)| n).sum()
    }
}

/// Applies rules in order to a piece of text.
#[derive(Debug, Clone, Default)]
pub struct Redactor {
    rules: Vec<RedactionRule>,
}

impl Redactor {
    /// A redactor with no rules; `redact` returns its input unchanged.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_default_rules() -> Result<Self, regex::Error> {
        let rules = DEFAULT_RULES
            .iter()
            .map(|(name, pattern, replacement)| RedactionRule::new(name, pattern, replacement))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Default rules followed by `extra`, in the order given.
    pub fn with_extra_rules(extra: &[RuleSpec]) -> Result<Self, regex::Error> {
        let mut redactor = Self::with_default_rules()?;
        for spec in extra {
            redactor.push(RedactionRule::new(&spec.name, &spec.pattern, &spec.replacement)?);
        }
        Ok(redactor)
    }

    pub fn push(&mut self, rule: RedactionRule) {
        self.rules.push(rule);
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.name())
    }

    pub fn redact(&self, input: &str) -> Redacted {
        let mut text = input.to_string();
        let mut hits = Vec::new();
        for rule in &self.rules {
            let count = rule.pattern.find_iter(&text).count();
            if count == 0 {
                continue;
            }
            text = rule
                .pattern
                .replace_all(&text, rule.replacement.as_str())
                .into_owned();
            hits.push((rule.name.clone(), count));
        }
        Redacted { text, hits }
    }
}
