use super::rules::{Rule, RuleSet};
use std::sync::OnceLock;
use tracing::error;

static STANDARD_RULES: OnceLock<RuleSet> = OnceLock::new();

/// Names that must never be merged with their siblings.
const NAME_OVERRIDES: &[&str] = &[
    "4代蓝色经典飞行夹克",
    "荣造王牌飞行系列35飞行夹克",
    "王牌飞行系列共和国天空飞行夹克",
    "指挥员系列飞行夹克",
];

const KEYWORD_COLLAPSE: &[(&str, &str)] = &[("夹克", "其他夹克")];

// Longer prefixes must precede any shorter prefix they start with.
const PRODUCT_LINES: &[(&str, &str)] = &[
    // colour variants of the gift box; other names containing it stay apart
    ("钢笔EF-舰载熊猫礼盒-黑", "钢笔EF-舰载熊猫礼盒"),
    ("钢笔EF-舰载熊猫礼盒-白", "钢笔EF-舰载熊猫礼盒"),
    ("钢笔EF-舰载熊猫礼盒-灰", "钢笔EF-舰载熊猫礼盒"),
    ("钢笔EF-舰载熊猫礼盒-蓝", "钢笔EF-舰载熊猫礼盒"),
    ("航母岗位章", "航母岗位章"),
    ("舰载熊猫公仔", "舰载熊猫公仔"),
    ("王牌飞行系列头盔章", "王牌飞行系列头盔章"),
    ("舰载熊猫挂件", "舰载熊猫挂件"),
    ("荣造共和国天空系列", "荣造共和国天空系列"),
    ("舰载飞行头盔包", "舰载飞行头盔包"),
    ("弹射时代系列J15T帽子", "弹射时代系列帽子"),
    ("弹射时代系列J35帽子", "弹射时代系列帽子"),
    ("弹射时代系列KJ600帽子", "弹射时代系列帽子"),
    ("山东舰飞织舰帽", "山东舰飞织舰帽"),
    ("山东舰热熔款舰帽", "山东舰热熔款舰帽"),
    ("舰载熊猫", "舰载熊猫"),
    ("舰载", "舰载公仔"),
    ("航空母舰", "航空母舰"),
    ("航母", "航母"),
    ("熊猫", "熊猫"),
    ("公仔", "公仔"),
];

/// Cosmetic suffixes, stripped in this order.
///
/// The last pass removes any run of the size tails at once, so stripping one
/// tail never leaves another behind: no pass matches a stripped name.
const COSMETIC_SUFFIXES: &[&str] = &[
    // colour marker: 舰帽--红
    r"(?s)--.*$",
    // numeric size: 帽子-58
    r"-[0-9]+$",
    // numeric size with unit letters: 包-58CM
    r"-[0-9]+[A-Za-z]*$",
    // lettered size: 帽子-XL
    r"-[A-Za-z]+$",
    r"(?i)[0-9]+CM$",
    // bare digits and stacked tails: 钥匙扣2, 帽子-L1, 水杯-1 2
    r"(?:-[0-9]+[A-Za-z]*|-[A-Za-z]+|(?i:[0-9]+CM)|[0-9]+|\s+)+$",
];

pub(crate) fn standard_rule_set() -> RuleSet {
    STANDARD_RULES.get_or_init(build_standard_rules).clone()
}

fn build_standard_rules() -> RuleSet {
    let mut rules = Vec::with_capacity(
        NAME_OVERRIDES.len() + KEYWORD_COLLAPSE.len() + PRODUCT_LINES.len() + COSMETIC_SUFFIXES.len(),
    );

    rules.extend(NAME_OVERRIDES.iter().map(|name| Rule::exact(*name, *name)));
    rules.extend(
        KEYWORD_COLLAPSE
            .iter()
            .map(|(keyword, mapped)| Rule::keyword(*keyword, *mapped)),
    );
    rules.extend(
        PRODUCT_LINES
            .iter()
            .map(|(prefix, mapped)| Rule::prefix(*prefix, *mapped)),
    );

    for pattern in COSMETIC_SUFFIXES {
        match Rule::suffix_strip(pattern) {
            Ok(rule) => rules.push(rule),
            Err(err) => error!(%err, "skipping built-in suffix rule"),
        }
    }

    RuleSet::new(rules)
}
