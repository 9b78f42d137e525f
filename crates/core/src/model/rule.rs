use serde::{Deserialize, Serialize};

/// Traffic-rule chapter as listed by `/v1/rules`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleChapter {
    pub id: i64,
    pub name: String,
    pub number: u32,
    pub version: u32,
    pub count_element: u32,
    #[serde(default)]
    pub viewed_count: Option<u32>,
}

/// Single paragraph/item within a chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleItem {
    pub id: i64,
    pub number: String,
    pub description: String,
}

/// Chapter with its items, from `/v1/rules/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleChapterDetails {
    #[serde(flatten)]
    pub chapter: RuleChapter,
    #[serde(default)]
    pub items: Vec<RuleItem>,
}
