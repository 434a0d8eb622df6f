//! Best-effort recovery of category scores from free-form model output.
//!
//! A score line is the category name, optional markup, a delimiter
//! (`:`, `-`, `/`), optional markup, an optional `Score:` label, a number
//! and an optional `/10`. The
//! first matching line per category wins. Categories that never match are
//! zero-filled and still count towards the overall score.

use crate::error::ParseError;
use crate::prompts::AnalysisKind;
use crate::report::ScoreReport;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::debug;

pub const NOT_REPORTED: &str = "not reported";

const MARKUP: &str = r#"[\s*_`~"'()\[\]]*"#;
const DELIMITER: &str = r"[:/\-–—]";
const SCORE_LABEL: &str = r#"(?:score\s*[:=]?[\s*_`~"'()\[\]]*)?"#;
const NUMBER: &str = r"(-?\d+(?:[.,]\d+)?)";
const OUT_OF_TEN: &str = r"(?:\s*/\s*10\b)?";

pub struct ResponseParser {
    patterns: Vec<(String, Regex)>,
}

impl ResponseParser {
    pub fn new<S: AsRef<str>>(categories: &[S]) -> Result<Self, ParseError> {
        if categories.is_empty() {
            return Err(ParseError::NoCategories);
        }
        let patterns = categories
            .iter()
            .map(|name| {
                let name = name.as_ref();
                category_pattern(name).map(|regex| (name.to_string(), regex))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn parse(&self, kind: AnalysisKind, raw: &str) -> Result<ScoreReport, ParseError> {
        let lines: Vec<&str> = raw.lines().collect();
        let mut scores = Vec::with_capacity(self.patterns.len());
        let mut commentary = BTreeMap::new();
        let mut found = 0usize;

        for (name, pattern) in &self.patterns {
            match self.find_score(pattern, &lines) {
                Some((score, comment)) => {
                    found += 1;
                    scores.push((name.clone(), score));
                    commentary.insert(name.clone(), comment);
                }
                None => {
                    debug!(category = %name, "category not found in model output");
                    scores.push((name.clone(), 0));
                    commentary.insert(name.clone(), NOT_REPORTED.to_string());
                }
            }
        }

        if found == 0 {
            return Err(ParseError::NothingRecognized(format!(
                "expected {}",
                self.patterns
                    .iter()
                    .map(|(name, _)| name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }

        ScoreReport::new(kind, scores, commentary)
    }

    fn find_score(&self, pattern: &Regex, lines: &[&str]) -> Option<(i64, String)> {
        for (index, line) in lines.iter().enumerate() {
            let Some(captures) = pattern.captures(line) else {
                continue;
            };
            let score = parse_number(captures.get(1)?.as_str())?;
            let rest = captures.get(2).map(|m| m.as_str()).unwrap_or_default();
            let mut comment = clean_comment(rest);
            if comment.is_empty() {
                comment = self.following_comment(&lines[index + 1..]);
            }
            return Some((score, comment));
        }
        None
    }

    /// The next non-empty line, unless it is itself a score line.
    fn following_comment(&self, lines: &[&str]) -> String {
        let Some(next) = lines.iter().find(|line| !line.trim().is_empty()) else {
            return String::new();
        };
        if self.patterns.iter().any(|(_, p)| p.is_match(next)) {
            return String::new();
        }
        clean_comment(next)
    }
}

pub fn parse<S: AsRef<str>>(
    kind: AnalysisKind,
    raw: &str,
    categories: &[S],
) -> Result<ScoreReport, ParseError> {
    ResponseParser::new(categories)?.parse(kind, raw)
}

fn category_pattern(name: &str) -> Result<Regex, ParseError> {
    let words: Vec<String> = name.split_whitespace().map(regex::escape).collect();
    if words.is_empty() {
        return Err(ParseError::InvalidCategory(name.to_string()));
    }
    let name_pattern = words.join(r"[\s_\-]+");
    let source = format!(
        r"(?i)(?:^|[^\p{{L}}\p{{N}}]){name_pattern}{MARKUP}{DELIMITER}{MARKUP}{SCORE_LABEL}{NUMBER}{OUT_OF_TEN}(.*)$"
    );
    Regex::new(&source).map_err(|_| ParseError::InvalidCategory(name.to_string()))
}

/// Integers pass through; fractional scores round to the nearest integer.
fn parse_number(value: &str) -> Option<i64> {
    let number: f64 = value.replace(',', ".").parse().ok()?;
    Some(number.round() as i64)
}

fn clean_comment(text: &str) -> String {
    let trimmed = text
        .trim()
        .trim_start_matches(|c: char| c.is_whitespace() || "-–—:|,.*_)".contains(c))
        .trim_end_matches(|c: char| c.is_whitespace() || c == '*');
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_fills_missing_categories() {
        let report = parse(
            AnalysisKind::Design,
            "Clarity: 9/10 great contrast\nCreativity - 6",
            &["Clarity", "Creativity", "Interactivity"],
        )
        .expect("report");

        let scores: Vec<(&str, u8)> = report
            .categories()
            .iter()
            .map(|c| (c.name.as_str(), c.score))
            .collect();
        assert_eq!(scores, [("Clarity", 9), ("Creativity", 6), ("Interactivity", 0)]);
        assert_eq!(report.overall_score(), 5.0);
        assert_eq!(report.verdict(), crate::report::Verdict::Fair);
        assert_eq!(report.commentary("Clarity"), Some("great contrast"));
        assert_eq!(report.commentary("Interactivity"), Some(NOT_REPORTED));
    }

    #[test]
    fn tolerates_markdown_and_emoji() {
        let raw = "## Review\n\
                   1. **Visual Harmony**: 8/10 - cohesive palette\n\
                   🎯 *User Friendliness* — 7 / 10 — intuitive flow\n\
                   - CLARITY / 6\n";
        let report = parse(
            AnalysisKind::Design,
            raw,
            &["Visual Harmony", "User Friendliness", "Clarity"],
        )
        .expect("report");
        let scores: Vec<u8> = report.categories().iter().map(|c| c.score).collect();
        assert_eq!(scores, [8, 7, 6]);
        assert_eq!(report.commentary("Visual Harmony"), Some("cohesive palette"));
        assert_eq!(report.commentary("User Friendliness"), Some("intuitive flow"));
    }

    #[test]
    fn accepts_score_label_after_delimiter() {
        let raw = "**Clarity** – Score: 8/10
                   **Creativity** - **Score:** 6/10 - bold colors
                   Interactivity: score 4";
        let report = parse(
            AnalysisKind::Design,
            raw,
            &["Clarity", "Creativity", "Interactivity"],
        )
        .expect("report");
        let scores: Vec<u8> = report.categories().iter().map(|c| c.score).collect();
        assert_eq!(scores, [8, 6, 4]);
        assert_eq!(report.commentary("Creativity"), Some("bold colors"));
    }

    #[test]
    fn first_match_wins_and_floats_round() {
        let raw = "Balance: 7.5/10\nBalance: 2/10\nSpacing: 6.4";
        let report = parse(AnalysisKind::Layout, raw, &["Balance", "Spacing"]).expect("report");
        let scores: Vec<u8> = report.categories().iter().map(|c| c.score).collect();
        assert_eq!(scores, [8, 6]);
    }

    #[test]
    fn clamps_out_of_range() {
        let raw = "Clarity: 15\nCreativity: -3";
        let report = parse(AnalysisKind::Design, raw, &["Clarity", "Creativity"]).expect("report");
        let scores: Vec<u8> = report.categories().iter().map(|c| c.score).collect();
        assert_eq!(scores, [10, 0]);
    }

    #[test]
    fn commentary_falls_back_to_next_line() {
        let raw = "Grammar: 9/10\n\n  No typos found.\nClarity: 5/10\nTone Consistency: 4\n";
        let report = parse(
            AnalysisKind::Copywriting,
            raw,
            &["Grammar", "Clarity", "Tone Consistency"],
        )
        .expect("report");
        assert_eq!(report.commentary("Grammar"), Some("No typos found."));
        assert_eq!(report.commentary("Clarity"), Some(""));
    }

    #[test]
    fn name_inside_other_words_does_not_match() {
        let raw = "Unclarity: 3\nClarity: 7";
        let report = parse(AnalysisKind::Design, raw, &["Clarity"]).expect("report");
        assert_eq!(report.categories()[0].score, 7);
    }

    #[test]
    fn fails_only_when_nothing_matches() {
        let err = parse(AnalysisKind::Design, "Looks nice overall.", &["Clarity", "Creativity"])
            .expect_err("error");
        assert!(matches!(err, ParseError::NothingRecognized(_)));

        let empty: [&str; 0] = [];
        let err = parse(AnalysisKind::Design, "Clarity: 5", &empty).expect_err("error");
        assert_eq!(err, ParseError::NoCategories);
    }

    #[test]
    fn length_matches_expected_categories() {
        let expected = ["Structure", "Visual Design", "Readability", "Storytelling", "Consistency"];
        let report = parse(AnalysisKind::PdfPresentation, "Readability: 4/10", &expected)
            .expect("report");
        assert_eq!(report.categories().len(), expected.len());
        assert_eq!(report.overall_score(), 0.8);
        assert_eq!(report.verdict(), crate::report::Verdict::Poor);
    }
}
