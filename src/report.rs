use crate::error::ParseError;
use crate::prompts::AnalysisKind;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

pub const MAX_SCORE: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl Verdict {
    pub fn from_overall(overall: f64) -> Self {
        if overall >= 8.5 {
            Verdict::Excellent
        } else if overall >= 7.0 {
            Verdict::Good
        } else if overall >= 5.0 {
            Verdict::Fair
        } else {
            Verdict::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Excellent => "Excellent",
            Verdict::Good => "Good",
            Verdict::Fair => "Fair",
            Verdict::Poor => "Poor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryScore {
    pub name: String,
    pub score: u8,
}

/// Parsed critique. Built once per analysis and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreReport {
    kind: AnalysisKind,
    categories: Vec<CategoryScore>,
    overall_score: f64,
    commentary: BTreeMap<String, String>,
    verdict: Verdict,
}

impl ScoreReport {
    /// Scores outside 0..=10 are clamped. Category names must be unique and
    /// there must be at least one.
    pub fn new(
        kind: AnalysisKind,
        scores: Vec<(String, i64)>,
        commentary: BTreeMap<String, String>,
    ) -> Result<Self, ParseError> {
        if scores.is_empty() {
            return Err(ParseError::NoCategories);
        }

        let mut seen = HashSet::new();
        let mut categories = Vec::with_capacity(scores.len());
        for (name, score) in scores {
            if !seen.insert(name.to_lowercase()) {
                return Err(ParseError::DuplicateCategory(name));
            }
            categories.push(CategoryScore {
                name,
                score: clamp_score(score),
            });
        }

        let overall_score = overall_score(&categories);
        Ok(Self {
            kind,
            categories,
            overall_score,
            commentary,
            verdict: Verdict::from_overall(overall_score),
        })
    }

    pub fn kind(&self) -> AnalysisKind {
        self.kind
    }

    pub fn categories(&self) -> &[CategoryScore] {
        &self.categories
    }

    pub fn overall_score(&self) -> f64 {
        self.overall_score
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    pub fn commentary(&self, category: &str) -> Option<&str> {
        self.commentary.get(category).map(String::as_str)
    }

    /// Markdown-ish text summary returned to the MCP caller.
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("🎨 **{}**", self.kind.title()),
            String::new(),
        ];
        for category in &self.categories {
            let comment = self.commentary(&category.name).unwrap_or_default();
            if comment.is_empty() {
                lines.push(format!("- **{}**: {}/10", category.name, category.score));
            } else {
                lines.push(format!(
                    "- **{}**: {}/10 - {comment}",
                    category.name, category.score
                ));
            }
        }
        lines.push(String::new());
        lines.push(format!(
            "**Overall**: {:.1}/10 ({})",
            self.overall_score,
            self.verdict.as_str()
        ));
        lines.join("\n")
    }
}

fn clamp_score(score: i64) -> u8 {
    score.clamp(0, MAX_SCORE) as u8
}

/// Mean of every category score, zero-filled ones included, to one decimal.
fn overall_score(categories: &[CategoryScore]) -> f64 {
    let total: u32 = categories.iter().map(|c| u32::from(c.score)).sum();
    let mean = f64::from(total) / categories.len() as f64;
    (mean * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(values: &[(&str, i64)]) -> Vec<(String, i64)> {
        values
            .iter()
            .map(|(name, score)| (name.to_string(), *score))
            .collect()
    }

    #[test]
    fn verdict_thresholds() {
        assert_eq!(Verdict::from_overall(8.5), Verdict::Excellent);
        assert_eq!(Verdict::from_overall(8.4), Verdict::Good);
        assert_eq!(Verdict::from_overall(7.0), Verdict::Good);
        assert_eq!(Verdict::from_overall(6.9), Verdict::Fair);
        assert_eq!(Verdict::from_overall(5.0), Verdict::Fair);
        assert_eq!(Verdict::from_overall(4.9), Verdict::Poor);
    }

    #[test]
    fn clamps_and_averages() {
        let report = ScoreReport::new(
            AnalysisKind::Design,
            scores(&[("Clarity", 15), ("Creativity", -3), ("Balance", 7)]),
            BTreeMap::new(),
        )
        .expect("report");
        let values: Vec<u8> = report.categories().iter().map(|c| c.score).collect();
        assert_eq!(values, [10, 0, 7]);
        assert_eq!(report.overall_score(), 5.7);
        assert_eq!(report.verdict(), Verdict::Fair);
    }

    #[test]
    fn rounds_to_one_decimal() {
        let report = ScoreReport::new(
            AnalysisKind::Layout,
            scores(&[("A", 9), ("B", 8), ("C", 8)]),
            BTreeMap::new(),
        )
        .expect("report");
        assert_eq!(report.overall_score(), 8.3);
    }

    #[test]
    fn rejects_empty_and_duplicates() {
        let err = ScoreReport::new(AnalysisKind::Design, Vec::new(), BTreeMap::new())
            .expect_err("error");
        assert_eq!(err, ParseError::NoCategories);

        let err = ScoreReport::new(
            AnalysisKind::Design,
            scores(&[("Clarity", 1), ("clarity", 2)]),
            BTreeMap::new(),
        )
        .expect_err("error");
        assert_eq!(err, ParseError::DuplicateCategory("clarity".to_string()));
    }

    #[test]
    fn summary_lists_categories() {
        let mut commentary = BTreeMap::new();
        commentary.insert("Clarity".to_string(), "great contrast".to_string());
        let report = ScoreReport::new(
            AnalysisKind::Design,
            scores(&[("Clarity", 9), ("Creativity", 6)]),
            commentary,
        )
        .expect("report");
        let summary = report.summary();
        assert!(summary.contains("- **Clarity**: 9/10 - great contrast"));
        assert!(summary.contains("- **Creativity**: 6/10"));
        assert!(summary.contains("**Overall**: 7.5/10 (Good)"));
    }
}
