//! Decoding of model output into an [`AnalysisResult`].
//!
//! Models are asked for pure JSON but sometimes wrap it in Markdown code
//! fences, so fences are stripped before decoding. Enumerated fields are
//! read leniently: an unknown recommendation type becomes
//! [`RecommendationKind::Advisory`] and an unknown confidence becomes
//! [`Confidence::Low`].

use std::collections::BTreeSet;

use airwatch_ward_models::{
    AnalysisResult, Confidence, GroundingUrl, NewsItem, Recommendation, RecommendationKind,
    SourceShare,
};
use serde::Deserialize;

use crate::AiError;
use crate::providers::Citation;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawAnalysis {
    recommendations: Vec<RawRecommendation>,
    trend_analysis: Option<String>,
    source_breakdown: Vec<RawSourceShare>,
    news: Vec<RawNewsItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRecommendation {
    title: String,
    description: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSourceShare {
    source: String,
    percentage: f64,
    confidence: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawNewsItem {
    title: String,
    summary: String,
    time_ago: String,
    source: String,
}

/// Removes Markdown code fences (```` ```json ```` and ```` ``` ````) and
/// surrounding whitespace.
#[must_use]
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Decodes the model's JSON answer. Recommendation ids are assigned as
/// `gen-<index>`.
///
/// # Errors
///
/// Returns [`AiError::Json`] if the text is not a JSON object of the
/// expected shape.
pub fn parse_analysis(text: &str) -> Result<AnalysisResult, AiError> {
    let raw: RawAnalysis = serde_json::from_str(&strip_code_fences(text))?;

    let recommendations = raw
        .recommendations
        .into_iter()
        .enumerate()
        .map(|(i, rec)| Recommendation {
            id: format!("gen-{i}"),
            title: rec.title,
            description: rec.description,
            kind: rec.kind.parse().unwrap_or(RecommendationKind::Advisory),
        })
        .collect();

    let source_breakdown = raw
        .source_breakdown
        .into_iter()
        .map(|share| SourceShare {
            source: share.source,
            percentage: share.percentage,
            confidence: share.confidence.parse().unwrap_or(Confidence::Low),
        })
        .collect();

    let news = raw
        .news
        .into_iter()
        .map(|item| NewsItem {
            title: item.title,
            summary: item.summary,
            time_ago: item.time_ago,
            source: item.source,
        })
        .collect();

    let trend_analysis = raw
        .trend_analysis
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| AnalysisResult::UNAVAILABLE_TREND.to_string());

    Ok(AnalysisResult {
        recommendations,
        grounding_urls: Vec::new(),
        trend_analysis,
        source_breakdown,
        news,
    })
}

/// Converts citations to grounding links, dropping any without both a
/// title and a URI. The first citation for each URI wins.
#[must_use]
pub fn grounding_urls(citations: Vec<Citation>) -> Vec<GroundingUrl> {
    let mut seen = BTreeSet::new();
    citations
        .into_iter()
        .filter(|c| !c.title.is_empty() && !c.uri.is_empty())
        .filter(|c| seen.insert(c.uri.clone()))
        .map(|c| GroundingUrl {
            title: c.title,
            uri: c.uri,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markdown_fences() {
        let text = "```json\n{\"news\": []}\n```\n";
        assert_eq!(strip_code_fences(text), "{\"news\": []}");
    }

    #[test]
    fn assigns_ids_and_reads_enums_leniently() {
        let text = r#"```json
        {
            "recommendations": [
                { "title": "Stay indoors", "description": "Keep windows shut.", "type": "urgent" },
                { "title": "Plant trees", "description": "Long term.", "type": "someday" }
            ],
            "trendAnalysis": "Rising steadily.",
            "sourceBreakdown": [
                { "source": "Traffic", "percentage": 60, "confidence": "high" },
                { "source": "Dust", "percentage": 40, "confidence": "unsure" }
            ],
            "news": [
                {
                    "title": "GRAP III invoked", "summary": "Curbs announced.",
                    "timeAgo": "Yesterday", "source": "The Hindu"
                }
            ]
        }
        ```"#;

        let result = parse_analysis(text).unwrap();
        assert_eq!(result.recommendations.len(), 2);
        assert_eq!(result.recommendations[0].id, "gen-0");
        assert_eq!(result.recommendations[0].kind, RecommendationKind::Urgent);
        assert_eq!(result.recommendations[1].id, "gen-1");
        assert_eq!(result.recommendations[1].kind, RecommendationKind::Advisory);
        assert_eq!(result.trend_analysis, "Rising steadily.");
        assert_eq!(result.source_breakdown[0].confidence, Confidence::High);
        assert_eq!(result.source_breakdown[1].confidence, Confidence::Low);
        assert!((result.source_breakdown[0].percentage - 60.0).abs() < f64::EPSILON);
        assert_eq!(result.news[0].time_ago, "Yesterday");
    }

    #[test]
    fn missing_fields_stay_structurally_complete() {
        let result = parse_analysis("{}").unwrap();
        assert!(result.recommendations.is_empty());
        assert_eq!(result.trend_analysis, AnalysisResult::UNAVAILABLE_TREND);
        assert!(result.news.is_empty());
    }

    #[test]
    fn rejects_non_json() {
        assert!(matches!(
            parse_analysis("The air is bad today."),
            Err(AiError::Json(_))
        ));
    }

    #[test]
    fn dedupes_grounding_by_uri() {
        let citation = |title: &str, uri: &str| Citation {
            title: title.to_string(),
            uri: uri.to_string(),
        };
        let urls = grounding_urls(vec![
            citation("First", "https://a.example"),
            citation("", "https://b.example"),
            citation("Second", "https://a.example"),
            citation("Third", ""),
            citation("Fourth", "https://c.example"),
        ]);

        assert_eq!(
            urls,
            vec![
                GroundingUrl {
                    title: "First".to_string(),
                    uri: "https://a.example".to_string(),
                },
                GroundingUrl {
                    title: "Fourth".to_string(),
                    uri: "https://c.example".to_string(),
                },
            ]
        );
    }
}
