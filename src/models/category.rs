use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Fixed category taxonomy for restaurant candidates
///
/// Providers return free-text category strings ("음식점 > 한식 > 국밥");
/// candidates are tagged by substring-matching those strings against the
/// keyword table below. A raw category may match zero, one, or several tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Korean,
    Japanese,
    Chinese,
    Western,
    Meat,
    Noodle,
    Rice,
    Soup,
    Cafe,
}

/// Keyword table mapping provider category fragments to taxonomy tags.
///
/// Keywords overlap on purpose: "국밥" is both KOREAN and RICE, "라멘" both
/// JAPANESE and NOODLE.
const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Korean,
        &[
            "한식", "국밥", "찌개", "백반", "분식", "비빔밥", "국수", "냉면",
        ],
    ),
    (
        Category::Japanese,
        &[
            "일식", "스시", "초밥", "라멘", "우동", "돈카츠", "소바", "덮밥",
        ],
    ),
    (Category::Chinese, &["중식", "짜장", "짬뽕", "탕수육", "마라"]),
    (
        Category::Western,
        &["양식", "파스타", "피자", "버거", "스테이크", "브런치"],
    ),
    (
        Category::Meat,
        &["고기", "구이", "삼겹", "갈비", "정육", "솥뚜껑"],
    ),
    (
        Category::Noodle,
        &["국수", "라면", "라멘", "우동", "소바", "짜장", "짬뽕"],
    ),
    (
        Category::Rice,
        &["덮밥", "비빔밥", "백반", "카레", "김밥", "국밥"],
    ),
    (Category::Soup, &["국", "탕", "찌개", "전골"]),
    (Category::Cafe, &["카페", "디저트", "빵", "베이커리"]),
];

impl Category {
    /// Maps a provider's free-text category string to taxonomy tags.
    ///
    /// Each tag appears at most once, in taxonomy order. An unmatched string
    /// yields an empty set.
    pub fn match_raw(raw: &str) -> Vec<Category> {
        CATEGORY_KEYWORDS
            .iter()
            .filter(|(_, keywords)| keywords.iter().any(|keyword| raw.contains(keyword)))
            .map(|(category, _)| *category)
            .collect()
    }

    /// Provider search keyword used for keyword-mode place searches.
    pub fn search_keyword(&self) -> &'static str {
        match self {
            Category::Korean => "한식",
            Category::Japanese => "일식",
            Category::Chinese => "중식",
            Category::Western => "양식",
            Category::Meat => "고기",
            Category::Noodle => "국수",
            Category::Rice => "덮밥",
            Category::Soup => "탕",
            Category::Cafe => "카페",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Korean => "KOREAN",
            Category::Japanese => "JAPANESE",
            Category::Chinese => "CHINESE",
            Category::Western => "WESTERN",
            Category::Meat => "MEAT",
            Category::Noodle => "NOODLE",
            Category::Rice => "RICE",
            Category::Soup => "SOUP",
            Category::Cafe => "CAFE",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
