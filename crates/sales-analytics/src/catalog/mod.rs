mod normalizer;
mod rules;
mod standard;

pub use normalizer::{AppliedRule, NormalizationTrace, ProductNameNormalizer};
pub use rules::{Rule, RuleKind, RuleSet, RuleSetError, RuleSpec, ShadowedRule};

use crate::config::{CatalogConfig, RulesMode};
use tracing::{info, warn};

/// Builds the rule set described by the catalog configuration.
pub fn load_rule_set(config: &CatalogConfig) -> Result<RuleSet, RuleSetError> {
    let standard = RuleSet::standard();
    let Some(path) = config.rules_path.as_ref() else {
        return Ok(standard);
    };

    let loaded = RuleSet::from_path(path)?;
    info!(
        path = %path.display(),
        rules = loaded.len(),
        mode = config.rules_mode.label(),
        "loaded product rule file"
    );

    let rules = match config.rules_mode {
        RulesMode::Extend => standard.with_overrides(&loaded),
        RulesMode::Replace => loaded,
    };

    for shadowed in rules.shadowed_rules() {
        warn!(
            index = shadowed.index,
            kind = shadowed.kind.label(),
            matcher = %shadowed.matcher,
            shadowed_by = shadowed.shadowed_by,
            "product rule can never match"
        );
    }

    Ok(rules)
}
