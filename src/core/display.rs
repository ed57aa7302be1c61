//! Replay of the browser-side suggestion rendering.
//!
//! Produces the same visible text the front end builds for each suggestion,
//! so an API payload can be compared with what the page shows.

use crate::domain::model::Suggestion;
use serde::Serialize;
use std::fmt;

pub const EMPTY_STATE: &str = "暂无推荐的知识点";
pub const KEYWORDS_LABEL: &str = "匹配关键词";
const COLLABORATIVE_TAG: &str = "协作推荐";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceClass {
    High,
    Medium,
    Low,
}

impl ConfidenceClass {
    pub fn css_class(&self) -> &'static str {
        match self {
            ConfidenceClass::High => "confidence-high",
            ConfidenceClass::Medium => "confidence-medium",
            ConfidenceClass::Low => "confidence-low",
        }
    }
}

pub fn confidence_class(confidence: f64) -> ConfidenceClass {
    if confidence >= 0.7 {
        ConfidenceClass::High
    } else if confidence >= 0.4 {
        ConfidenceClass::Medium
    } else {
        ConfidenceClass::Low
    }
}

/// `(confidence * 100).toFixed(0) + "%"`，四捨五入遠離零
pub fn confidence_percent(confidence: f64) -> String {
    format!("{}%", (confidence * 100.0).round() as i64)
}

pub fn keywords_line(keywords: &[String]) -> Option<String> {
    if keywords.is_empty() {
        return None;
    }
    Some(format!("{}: {}", KEYWORDS_LABEL, keywords.join(", ")))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionView {
    pub position: usize,
    pub title: String,
    pub confidence: String,
    pub confidence_class: ConfidenceClass,
    pub collaborative: bool,
    pub grade_levels: Vec<String>,
    pub reason: String,
    pub keywords: Option<String>,
    pub features: Vec<String>,
    pub learning_objectives: Vec<String>,
}

impl SuggestionView {
    pub fn from_suggestion(position: usize, suggestion: &Suggestion) -> Self {
        let features = suggestion
            .feature_analysis
            .iter()
            .flat_map(|features| features.iter())
            .map(|(category, info)| {
                format!(
                    "{}: {} ({})",
                    category,
                    info.words.join(", "),
                    confidence_percent(info.score)
                )
            })
            .collect();

        Self {
            position,
            title: suggestion.knowledge_point_name.clone(),
            confidence: confidence_percent(suggestion.confidence),
            confidence_class: confidence_class(suggestion.confidence),
            collaborative: suggestion.is_collaborative,
            grade_levels: suggestion.grade_levels.clone(),
            reason: suggestion.reason.clone(),
            keywords: keywords_line(&suggestion.matched_keywords),
            features,
            learning_objectives: suggestion.learning_objectives.clone(),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        let mut header = format!("{}. {} [{}]", self.position, self.title, self.confidence);
        if self.collaborative {
            header.push_str(&format!(" ({})", COLLABORATIVE_TAG));
        }

        let mut lines = vec![header];
        if !self.grade_levels.is_empty() {
            lines.push(format!("   年级: {}", self.grade_levels.join(" ")));
        }
        lines.push(format!("   理由: {}", self.reason));
        if let Some(keywords) = &self.keywords {
            lines.push(format!("   {}", keywords));
        }
        if !self.features.is_empty() {
            lines.push("   特征分析:".to_string());
            lines.extend(self.features.iter().map(|f| format!("     - {}", f)));
        }
        if !self.learning_objectives.is_empty() {
            lines.push("   学习目标:".to_string());
            lines.extend(self.learning_objectives.iter().map(|o| format!("     - {}", o)));
        }
        lines
    }
}

impl fmt::Display for SuggestionView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines().join("\n"))
    }
}

pub fn render_suggestions(suggestions: &[Suggestion]) -> Vec<SuggestionView> {
    suggestions
        .iter()
        .enumerate()
        .map(|(index, suggestion)| SuggestionView::from_suggestion(index + 1, suggestion))
        .collect()
}

/// 整個建議區塊的可見文字
pub fn render_text(suggestions: &[Suggestion]) -> Vec<String> {
    if suggestions.is_empty() {
        return vec![EMPTY_STATE.to_string()];
    }
    render_suggestions(suggestions)
        .iter()
        .flat_map(SuggestionView::lines)
        .collect()
}

/// 除錯時使用的固定建議資料
pub fn sample_suggestions() -> Vec<Suggestion> {
    vec![
        Suggestion {
            knowledge_point_id: "kp_573225".to_string(),
            knowledge_point_name: "动词时态".to_string(),
            confidence: 0.16,
            reason: "题目类型匹配".to_string(),
            matched_keywords: Vec::new(),
            grade_levels: Vec::new(),
            learning_objectives: Vec::new(),
            feature_analysis: None,
            is_collaborative: false,
        },
        Suggestion {
            knowledge_point_id: "kp_441152".to_string(),
            knowledge_point_name: "现在完成时".to_string(),
            confidence: 0.149,
            reason: "匹配关键词: already, have, finished".to_string(),
            matched_keywords: vec![
                "already".to_string(),
                "have".to_string(),
                "finished".to_string(),
            ],
            grade_levels: Vec::new(),
            learning_objectives: Vec::new(),
            feature_analysis: None,
            is_collaborative: false,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{FeatureAnalysis, FeatureInfo};

    #[test]
    fn test_confidence_percent_rounds_like_the_browser() {
        assert_eq!(confidence_percent(0.16), "16%");
        assert_eq!(confidence_percent(0.149), "15%");
        assert_eq!(confidence_percent(0.0), "0%");
        assert_eq!(confidence_percent(1.0), "100%");
    }

    #[test]
    fn test_confidence_class_thresholds() {
        assert_eq!(confidence_class(0.7), ConfidenceClass::High);
        assert_eq!(confidence_class(0.69), ConfidenceClass::Medium);
        assert_eq!(confidence_class(0.4), ConfidenceClass::Medium);
        assert_eq!(confidence_class(0.39), ConfidenceClass::Low);
        assert_eq!(ConfidenceClass::Low.css_class(), "confidence-low");
    }

    #[test]
    fn test_sample_payload_replay() {
        let views = render_suggestions(&sample_suggestions());

        assert_eq!(views.len(), 2);
        assert_eq!(views[0].confidence, "16%");
        assert_eq!(views[0].keywords, None);
        assert_eq!(
            views[1].keywords.as_deref(),
            Some("匹配关键词: already, have, finished")
        );
    }

    #[test]
    fn test_empty_state() {
        assert_eq!(render_text(&[]), vec![EMPTY_STATE.to_string()]);
    }

    #[test]
    fn test_optional_sections_rendered() {
        let mut suggestion = sample_suggestions().remove(1);
        suggestion.is_collaborative = true;
        suggestion.grade_levels = vec!["初中一年级".to_string()];
        suggestion.learning_objectives = vec!["掌握现在完成时的构成".to_string()];
        suggestion.feature_analysis = Some(FeatureAnalysis(vec![
            (
                "time_markers".to_string(),
                FeatureInfo {
                    words: vec!["already".to_string(), "yet".to_string()],
                    score: 0.5,
                },
            ),
            (
                "auxiliary".to_string(),
                FeatureInfo {
                    words: vec!["have".to_string()],
                    score: 0.3,
                },
            ),
        ]));

        let view = SuggestionView::from_suggestion(1, &suggestion);
        assert_eq!(
            view.features,
            vec!["time_markers: already, yet (50%)", "auxiliary: have (30%)"]
        );

        let text = view.to_string();
        assert!(text.contains("(协作推荐)"));
        assert!(text.contains("年级: 初中一年级"));
        assert!(text.contains("time_markers: already, yet (50%)"));
        assert!(text.contains("掌握现在完成时的构成"));
    }
}
