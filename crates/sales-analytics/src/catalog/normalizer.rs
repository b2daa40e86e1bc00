use super::rules::{Rule, RuleKind, RuleSet};
use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;

/// Maps raw product names onto canonical grouping keys.
///
/// Evaluation walks the rule set once: the first matching exact, keyword or
/// prefix rule replaces the name and ends the walk, while suffix rules strip
/// the first match of their pattern and pass the result on. The name is
/// trimmed before and after evaluation.
#[derive(Debug, Clone)]
pub struct ProductNameNormalizer {
    rules: RuleSet,
}

/// Record of the rules that shaped one canonical name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizationTrace {
    pub raw: String,
    pub canonical: String,
    pub steps: Vec<AppliedRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedRule {
    pub index: usize,
    pub kind: RuleKind,
    pub matcher: String,
    pub result: String,
}

impl ProductNameNormalizer {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn standard() -> Self {
        Self::new(RuleSet::standard())
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn normalize(&self, raw: &str) -> String {
        self.evaluate(raw, |_, _, _| {})
    }

    pub fn normalize_optional(&self, raw: Option<&str>) -> Option<String> {
        raw.map(|name| self.normalize(name))
    }

    /// Normalizes string values; every other JSON value is returned as is.
    pub fn normalize_value(&self, raw: &Value) -> Value {
        match raw {
            Value::String(name) => Value::String(self.normalize(name)),
            other => other.clone(),
        }
    }

    pub fn explain(&self, raw: &str) -> NormalizationTrace {
        let mut steps = Vec::new();
        let canonical = self.evaluate(raw, |index, rule, result| {
            steps.push(AppliedRule {
                index,
                kind: rule.kind(),
                matcher: rule.matcher().to_string(),
                result: result.to_string(),
            });
        });

        NormalizationTrace {
            raw: raw.to_string(),
            canonical,
            steps,
        }
    }

    fn evaluate<F>(&self, raw: &str, mut on_applied: F) -> String
    where
        F: FnMut(usize, &Rule, &str),
    {
        let mut name: Cow<'_, str> = Cow::Borrowed(raw.trim());

        for (index, rule) in self.rules.rules().iter().enumerate() {
            match rule {
                Rule::Exact {
                    match_name,
                    mapped_name,
                } if name.as_ref() == match_name.as_str() => {
                    on_applied(index, rule, mapped_name);
                    name = Cow::Borrowed(mapped_name.as_str());
                    break;
                }
                Rule::Keyword {
                    keyword,
                    mapped_name,
                } if name.contains(keyword.as_str()) => {
                    on_applied(index, rule, mapped_name);
                    name = Cow::Borrowed(mapped_name.as_str());
                    break;
                }
                Rule::Prefix {
                    prefix,
                    mapped_name,
                } if name.starts_with(prefix.as_str()) => {
                    on_applied(index, rule, mapped_name);
                    name = Cow::Borrowed(mapped_name.as_str());
                    break;
                }
                Rule::SuffixStrip { pattern } => {
                    let stripped = match pattern.replace(&name, "") {
                        Cow::Owned(stripped) => Some(stripped),
                        Cow::Borrowed(_) => None,
                    };
                    if let Some(stripped) = stripped {
                        on_applied(index, rule, &stripped);
                        name = Cow::Owned(stripped);
                    }
                }
                _ => {}
            }
        }

        name.trim().to_string()
    }
}

impl Default for ProductNameNormalizer {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn jacket_rules() -> ProductNameNormalizer {
        ProductNameNormalizer::new(RuleSet::new(vec![
            Rule::exact("4代蓝色经典飞行夹克", "4代蓝色经典飞行夹克"),
            Rule::keyword("夹克", "其他夹克"),
            Rule::suffix_strip("-[A-Za-z]+$").expect("pattern"),
        ]))
    }

    #[test]
    fn exact_override_wins_over_keyword_collapse() {
        let normalizer = jacket_rules();
        assert_eq!(
            normalizer.normalize("4代蓝色经典飞行夹克"),
            "4代蓝色经典飞行夹克"
        );
        assert_eq!(normalizer.normalize("XX夹克-L"), "其他夹克");
    }

    #[test]
    fn terminal_match_skips_later_strip_rules() {
        let normalizer = ProductNameNormalizer::new(RuleSet::new(vec![
            Rule::prefix("帽子", "帽子-XL"),
            Rule::suffix_strip("-[A-Za-z]+$").expect("pattern"),
        ]));
        assert_eq!(normalizer.normalize("帽子-S"), "帽子-XL");
    }

    #[test]
    fn strip_rules_run_in_order_when_nothing_terminates() {
        let normalizer = ProductNameNormalizer::new(RuleSet::new(vec![
            Rule::suffix_strip("-[0-9]+$").expect("pattern"),
            Rule::suffix_strip("-[A-Za-z]+$").expect("pattern"),
        ]));
        assert_eq!(normalizer.normalize("帽子-L-42"), "帽子");
    }

    #[test]
    fn strip_rules_replace_only_the_first_match() {
        let normalizer = ProductNameNormalizer::new(RuleSet::new(vec![
            Rule::suffix_strip("-[0-9]+").expect("pattern"),
        ]));
        assert_eq!(normalizer.normalize("包-1-2"), "包-2");
    }

    #[test]
    fn trims_before_and_after_evaluation() {
        let normalizer = ProductNameNormalizer::new(RuleSet::new(vec![
            Rule::exact("衬衫", "衬衫"),
            Rule::suffix_strip("[0-9]+$").expect("pattern"),
        ]));
        assert_eq!(normalizer.normalize("  衬衫  "), "衬衫");
        assert_eq!(normalizer.normalize("\t衬衫 2"), "衬衫");
    }

    #[test]
    fn empty_rule_set_only_trims() {
        let normalizer = ProductNameNormalizer::new(RuleSet::new(Vec::new()));
        assert_eq!(normalizer.normalize("  舰帽--红 "), "舰帽--红");
        assert_eq!(normalizer.normalize("   "), "");
    }

    #[test]
    fn non_string_values_pass_through() {
        let normalizer = ProductNameNormalizer::standard();
        assert_eq!(normalizer.normalize_value(&Value::Null), Value::Null);
        assert_eq!(normalizer.normalize_value(&json!(42)), json!(42));
        assert_eq!(normalizer.normalize_value(&json!(true)), json!(true));
        assert_eq!(
            normalizer.normalize_value(&json!(" 舰帽--红-42 ")),
            json!("舰帽")
        );
        assert_eq!(normalizer.normalize_optional(None), None);
    }

    #[test]
    fn explain_lists_applied_rules() {
        let normalizer = ProductNameNormalizer::new(RuleSet::new(vec![
            Rule::suffix_strip("--.*$").expect("pattern"),
            Rule::suffix_strip("-[0-9]+$").expect("pattern"),
            Rule::suffix_strip("[0-9]+$").expect("pattern"),
        ]));
        let trace = normalizer.explain("舰帽--红-42");
        assert_eq!(trace.canonical, "舰帽");
        assert_eq!(trace.steps.len(), 1);
        assert_eq!(trace.steps[0].index, 0);
        assert_eq!(trace.steps[0].result, "舰帽");

        let trace = jacket_rules().explain("XX夹克-L");
        assert_eq!(trace.steps.len(), 1);
        assert_eq!(trace.steps[0].kind, RuleKind::Keyword);
        assert_eq!(trace.canonical, "其他夹克");
    }
}
