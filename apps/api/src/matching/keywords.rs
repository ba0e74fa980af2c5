//! Keyword tables shared by the local heuristics (parser, scorer, canned analysis).

/// Region groups expand to their member cities. Order is the match order.
pub const REGION_GROUPS: &[(&str, &[&str])] = &[
    ("长三角", &["上海", "苏州", "杭州", "南京", "无锡", "合肥"]),
    ("珠三角", &["深圳", "广州", "东莞", "佛山"]),
    ("京津冀", &["北京", "天津", "雄安"]),
    ("成渝", &["成都", "重庆"]),
    ("华东", &["上海", "苏州", "杭州", "南京", "无锡", "合肥"]),
    ("华南", &["深圳", "广州", "东莞", "佛山"]),
    ("华北", &["北京", "天津"]),
    ("西南", &["成都", "重庆", "昆明"]),
];

pub const CITIES: &[&str] = &[
    "上海", "北京", "深圳", "广州", "杭州", "苏州", "南京", "成都", "无锡", "合肥", "武汉", "西安",
];

pub const INDUSTRIES: &[&str] = &[
    "AI", "人工智能", "医疗", "医疗健康", "生物医药", "机器人", "智能制造", "芯片", "半导体",
    "新能源", "新材料", "自动驾驶", "物流", "SaaS", "云计算", "大数据", "量子", "脑机接口", "基因",
];

pub const STAGES: &[&str] = &[
    "天使轮", "Pre-A轮", "A轮", "A+轮", "B轮", "B+轮", "C轮", "C+轮", "D轮", "IPO",
];

/// Shorthands that stand for the early-growth rounds.
pub const AB_ROUND_ALIASES: &[&str] = &["A/B轮", "AB轮"];
pub const AB_ROUNDS: &[&str] = &["A轮", "A+轮", "B轮"];

pub const EXTRA_KEYWORDS: &[&str] = &[
    "头部基金", "头部投资", "扩张", "增长", "商业化", "量产", "出口", "头部客户",
];

pub const SCENARIOS: &[&str] = &[
    "创新园区", "产业园", "总部办公", "实验室", "研发中心", "制造工厂", "孵化器", "加速器",
];

/// Investors treated as top-tier endorsement.
pub const TOP_INVESTORS: &[&str] = &[
    "红杉", "高瓴", "IDG", "经纬", "启明", "顺为", "真格", "北极光", "深创投", "腾讯", "阿里", "小米",
];

pub const GROWTH_FAST: &str = "快速增长";
pub const GROWTH_EARLY: &str = "早期";
pub const GROWTH_MATURE: &str = "成熟期";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndustryFamily {
    /// Needs plants and production floor space.
    Manufacturing,
    /// Office and R&D space.
    Digital,
    /// Wet labs and clinical facilities.
    LifeScience,
}

impl IndustryFamily {
    fn members(&self) -> &'static [&'static str] {
        match self {
            Self::Manufacturing => &["机器人", "智能制造", "新能源", "新材料"],
            Self::Digital => &["AI", "人工智能", "SaaS", "云计算", "大数据"],
            Self::LifeScience => &["医疗", "医疗健康", "生物医药", "基因"],
        }
    }

    /// True when any tag is exactly one of the family's industries.
    pub fn covers<S: AsRef<str>>(&self, tags: &[S]) -> bool {
        tags.iter().any(|t| self.members().contains(&t.as_ref()))
    }
}

pub fn has_top_investor(investors: &[String]) -> bool {
    investors
        .iter()
        .any(|inv| TOP_INVESTORS.iter().any(|top| inv.contains(top)))
}
