use serde::{Deserialize, Serialize};
use std::fmt;

/// Sales platform an order came through, derived from the shop type column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Douyin,
    Tmall,
    Youzan,
    Jd,
    Other,
}

impl Channel {
    /// Named platforms in display order.
    pub const fn tracked() -> [Self; 4] {
        [Self::Douyin, Self::Tmall, Self::Youzan, Self::Jd]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Douyin => "抖音",
            Self::Tmall => "天猫",
            Self::Youzan => "有赞",
            Self::Jd => "京东",
            Self::Other => "其他",
        }
    }

    pub fn classify(shop_type: &str) -> Self {
        // Toutiao and Luban storefronts settle through Douyin.
        if ["抖音", "今日头条", "鲁班"]
            .iter()
            .any(|marker| shop_type.contains(*marker))
        {
            Self::Douyin
        } else if shop_type.contains("天猫") {
            Self::Tmall
        } else if shop_type.contains("有赞") {
            Self::Youzan
        } else if shop_type.contains("京东") {
            Self::Jd
        } else {
            Self::Other
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_matches_platform_markers() {
        assert_eq!(Channel::classify("抖音小店"), Channel::Douyin);
        assert_eq!(Channel::classify("今日头条放心购"), Channel::Douyin);
        assert_eq!(Channel::classify("鲁班电商"), Channel::Douyin);
        assert_eq!(Channel::classify("天猫旗舰店"), Channel::Tmall);
        assert_eq!(Channel::classify("有赞微商城"), Channel::Youzan);
        assert_eq!(Channel::classify("京东自营"), Channel::Jd);
        assert_eq!(Channel::classify("线下门店"), Channel::Other);
        assert_eq!(Channel::classify(""), Channel::Other);
    }
}
