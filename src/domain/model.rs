use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// 圖資料庫查詢結果的一列
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, serde_json::Value>,
}

impl Record {
    pub fn get(&self, column: &str) -> Option<&serde_json::Value> {
        self.data.get(column)
    }

    pub fn get_i64(&self, column: &str) -> Option<i64> {
        self.get(column).and_then(|v| v.as_i64())
    }

    pub fn get_str(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(|v| v.as_str())
    }
}

/// 圖資料庫 discovery 文件
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerInfo {
    #[serde(default)]
    pub neo4j_version: Option<String>,
    #[serde(default)]
    pub neo4j_edition: Option<String>,
}

impl ServerInfo {
    pub fn describe(&self) -> String {
        match (&self.neo4j_version, &self.neo4j_edition) {
            (Some(version), Some(edition)) => format!("Neo4j {} ({})", version, edition),
            (Some(version), None) => format!("Neo4j {}", version),
            _ => "graph server (version not reported)".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestRequest {
    pub question_content: String,
    pub question_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureInfo {
    #[serde(default)]
    pub words: Vec<String>,
    #[serde(default)]
    pub score: f64,
}

/// 特徵分析，保留回應中的鍵順序（與前端 `Object.entries` 一致）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureAnalysis(pub Vec<(String, FeatureInfo)>);

impl FeatureAnalysis {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureInfo)> {
        self.0.iter().map(|(category, info)| (category.as_str(), info))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for FeatureAnalysis {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (category, info) in &self.0 {
            map.serialize_entry(category, info)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FeatureAnalysis {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = FeatureAnalysis;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of feature categories")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((category, info)) = access.next_entry::<String, FeatureInfo>()? {
                    entries.push((category, info));
                }
                Ok(FeatureAnalysis(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub knowledge_point_id: String,
    pub knowledge_point_name: String,
    pub confidence: f64,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub matched_keywords: Vec<String>,
    #[serde(default)]
    pub grade_levels: Vec<String>,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_analysis: Option<FeatureAnalysis>,
    #[serde(default, rename = "isCollaborative")]
    pub is_collaborative: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestResponse {
    pub suggestions: Vec<Suggestion>,
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub message: Option<String>,
}

/// 儀表板統計；後端欄位名稱不一，兩種都接受
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub knowledge_points_count: u64,
    pub questions_count: u64,
}

impl DashboardStats {
    pub fn from_json(value: &serde_json::Value) -> Self {
        let count = |keys: &[&str]| {
            keys.iter()
                .find_map(|key| value.get(*key).and_then(|v| v.as_u64()))
                .unwrap_or(0)
        };

        Self {
            knowledge_points_count: count(&["knowledge_points_count", "total_knowledge_points"]),
            questions_count: count(&["questions_count", "total_questions"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default = "unknown_status")]
    pub status: String,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

fn unknown_status() -> String {
    "unknown".to_string()
}
