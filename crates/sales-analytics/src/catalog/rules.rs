use regex::Regex;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One entry of the ordered product-name pipeline.
///
/// `Exact`, `Keyword` and `Prefix` rules end evaluation on their first match.
/// `SuffixStrip` rules remove the first match of their pattern and let
/// evaluation continue.
#[derive(Debug, Clone)]
pub enum Rule {
    Exact {
        match_name: String,
        mapped_name: String,
    },
    Keyword {
        keyword: String,
        mapped_name: String,
    },
    Prefix {
        prefix: String,
        mapped_name: String,
    },
    SuffixStrip {
        pattern: Regex,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Exact,
    Keyword,
    Prefix,
    SuffixStrip,
}

impl RuleKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Keyword => "keyword",
            Self::Prefix => "prefix",
            Self::SuffixStrip => "suffix",
        }
    }
}

impl Rule {
    pub fn exact(match_name: impl Into<String>, mapped_name: impl Into<String>) -> Self {
        Self::Exact {
            match_name: match_name.into(),
            mapped_name: mapped_name.into(),
        }
    }

    pub fn keyword(keyword: impl Into<String>, mapped_name: impl Into<String>) -> Self {
        Self::Keyword {
            keyword: keyword.into(),
            mapped_name: mapped_name.into(),
        }
    }

    pub fn prefix(prefix: impl Into<String>, mapped_name: impl Into<String>) -> Self {
        Self::Prefix {
            prefix: prefix.into(),
            mapped_name: mapped_name.into(),
        }
    }

    pub fn suffix_strip(pattern: &str) -> Result<Self, RuleSetError> {
        let compiled = Regex::new(pattern).map_err(|source| RuleSetError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self::SuffixStrip { pattern: compiled })
    }

    pub const fn kind(&self) -> RuleKind {
        match self {
            Self::Exact { .. } => RuleKind::Exact,
            Self::Keyword { .. } => RuleKind::Keyword,
            Self::Prefix { .. } => RuleKind::Prefix,
            Self::SuffixStrip { .. } => RuleKind::SuffixStrip,
        }
    }

    /// True for rules that stop evaluation when they match.
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::SuffixStrip { .. })
    }

    /// The literal the rule matches on, or the pattern source for strip rules.
    pub fn matcher(&self) -> &str {
        match self {
            Self::Exact { match_name, .. } => match_name.as_str(),
            Self::Keyword { keyword, .. } => keyword.as_str(),
            Self::Prefix { prefix, .. } => prefix.as_str(),
            Self::SuffixStrip { pattern } => pattern.as_str(),
        }
    }

    pub fn mapped_name(&self) -> Option<&str> {
        match self {
            Self::Exact { mapped_name, .. }
            | Self::Keyword { mapped_name, .. }
            | Self::Prefix { mapped_name, .. } => Some(mapped_name.as_str()),
            Self::SuffixStrip { .. } => None,
        }
    }

    pub fn to_spec(&self) -> RuleSpec {
        match self {
            Self::Exact {
                match_name,
                mapped_name,
            } => RuleSpec::Exact {
                exact_name: match_name.clone(),
                mapped_name: mapped_name.clone(),
            },
            Self::Keyword {
                keyword,
                mapped_name,
            } => RuleSpec::Keyword {
                keyword: keyword.clone(),
                mapped_name: mapped_name.clone(),
            },
            Self::Prefix {
                prefix,
                mapped_name,
            } => RuleSpec::Prefix {
                prefix: prefix.clone(),
                mapped_name: mapped_name.clone(),
            },
            Self::SuffixStrip { pattern } => RuleSpec::Suffix {
                pattern: pattern.as_str().to_string(),
            },
        }
    }
}

/// Serializable form of a [`Rule`], as found in JSON rule files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleSpec {
    Exact {
        exact_name: String,
        mapped_name: String,
    },
    Keyword {
        keyword: String,
        mapped_name: String,
    },
    Prefix {
        prefix: String,
        mapped_name: String,
    },
    Suffix {
        pattern: String,
    },
}

impl RuleSpec {
    pub fn compile(self) -> Result<Rule, RuleSetError> {
        Ok(match self {
            Self::Exact {
                exact_name,
                mapped_name,
            } => Rule::exact(exact_name, mapped_name),
            Self::Keyword {
                keyword,
                mapped_name,
            } => Rule::keyword(keyword, mapped_name),
            Self::Prefix {
                prefix,
                mapped_name,
            } => Rule::prefix(prefix, mapped_name),
            Self::Suffix { pattern } => Rule::suffix_strip(&pattern)?,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RuleSetError {
    #[error("invalid suffix pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("failed to read rule file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid rule file: {0}")]
    Json(#[from] serde_json::Error),
}

/// A short-circuit rule that can never fire because an earlier rule
/// always matches first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShadowedRule {
    pub index: usize,
    pub kind: RuleKind,
    pub matcher: String,
    pub shadowed_by: usize,
}

/// Ordered, immutable rule table. Clones share the same rules.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Arc<[Rule]>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self {
            rules: rules.into(),
        }
    }

    pub fn from_specs<I>(specs: I) -> Result<Self, RuleSetError>
    where
        I: IntoIterator<Item = RuleSpec>,
    {
        let rules = specs
            .into_iter()
            .map(RuleSpec::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(rules))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RuleSetError> {
        let specs: Vec<RuleSpec> = serde_json::from_reader(reader)?;
        Self::from_specs(specs)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, RuleSetError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| RuleSetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// The built-in product table.
    pub fn standard() -> Self {
        super::standard::standard_rule_set()
    }

    /// Returns a new set evaluating `overrides` before the rules of `self`.
    pub fn with_overrides(&self, overrides: &RuleSet) -> Self {
        let rules = overrides
            .rules
            .iter()
            .chain(self.rules.iter())
            .cloned()
            .collect::<Vec<_>>();
        Self::new(rules)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn specs(&self) -> Vec<RuleSpec> {
        self.rules.iter().map(Rule::to_spec).collect()
    }

    pub fn shadowed_rules(&self) -> Vec<ShadowedRule> {
        let mut shadowed = Vec::new();
        for (index, rule) in self.rules.iter().enumerate() {
            if !rule.is_terminal() {
                continue;
            }
            let blocker = self.rules[..index]
                .iter()
                .position(|earlier| always_matches_before(earlier, rule));
            if let Some(shadowed_by) = blocker {
                shadowed.push(ShadowedRule {
                    index,
                    kind: rule.kind(),
                    matcher: rule.matcher().to_string(),
                    shadowed_by,
                });
            }
        }
        shadowed
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

// Strip rules between `earlier` and `later` can change the name, so this only
// holds for names that reach `later` unchanged; it is a lint, not a proof.
fn always_matches_before(earlier: &Rule, later: &Rule) -> bool {
    let literal = later.matcher();
    match (earlier, later) {
        (_, Rule::SuffixStrip { .. }) | (Rule::SuffixStrip { .. }, _) => false,
        (Rule::Exact { match_name, .. }, Rule::Exact { .. }) => match_name == literal,
        (Rule::Exact { .. }, _) => false,
        (Rule::Keyword { keyword, .. }, _) => literal.contains(keyword.as_str()),
        (Rule::Prefix { prefix, .. }, Rule::Exact { .. } | Rule::Prefix { .. }) => {
            literal.starts_with(prefix.as_str())
        }
        (Rule::Prefix { .. }, Rule::Keyword { .. }) => false,
    }
}
