//! Renders an `AnalysisResult` as a plain-text feedback report.
//!
//! Pure and total: every combination of present and absent fields renders,
//! and the same input always yields the same lines.

use crate::analysis::models::{AnalysisResult, SectionAnalysis};

const TECH_DISPLAY_LIMIT: usize = 15;
const SOFT_DISPLAY_LIMIT: usize = 10;
const OTHER_DISPLAY_LIMIT: usize = 20;

/// Match quality band. Lower bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchBand {
    Excellent,
    Good,
    Moderate,
    Low,
}

impl MatchBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            MatchBand::Excellent
        } else if score >= 60.0 {
            MatchBand::Good
        } else if score >= 40.0 {
            MatchBand::Moderate
        } else {
            MatchBand::Low
        }
    }

    pub fn headline(self) -> &'static str {
        match self {
            MatchBand::Excellent => {
                "🎯 EXCELLENT MATCH! Your resume aligns very well with this job description."
            }
            MatchBand::Good => {
                "✅ GOOD MATCH! Your resume shows strong alignment with several key requirements."
            }
            MatchBand::Moderate => {
                "⚠️ MODERATE MATCH. Your resume has some relevant qualifications but needs improvement."
            }
            MatchBand::Low => {
                "❌ LOW MATCH. Significant gaps exist between your resume and job requirements."
            }
        }
    }
}

/// Ordered display lines. Blank entries separate sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackReport {
    pub lines: Vec<String>,
}

impl FeedbackReport {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    fn section(&mut self, header: impl Into<String>) {
        self.lines.push(String::new());
        self.lines.push(header.into());
    }

    fn bullets(&mut self, items: &[String]) {
        for item in items {
            self.push(format!("• {item}"));
        }
    }

    /// `label: a, b, c` capped at `limit` items, plus a `+N more` line when cut.
    fn capped_list(&mut self, label: &str, items: &[String], limit: usize) {
        let shown = &items[..items.len().min(limit)];
        self.push(format!("{label}: {}", shown.join(", ")));
        if items.len() > limit {
            self.push(format!("   +{} more", items.len() - limit));
        }
    }
}

pub fn format_feedback(analysis: &AnalysisResult) -> FeedbackReport {
    let mut report = FeedbackReport::default();
    let detailed = &analysis.detailed_feedback;

    report.push(MatchBand::from_score(analysis.score_value()).headline());

    if let Some(assessment) = non_empty(detailed.overall_assessment.as_deref()) {
        report.section(assessment);
    }

    report.section(format!("📊 Match Score: {}%", analysis.score()));

    if let Some(sections) = detailed.section_analysis.as_ref().filter(|s| !s.is_empty()) {
        push_structure(&mut report, sections);
    }

    push_missing(&mut report, analysis);

    if !detailed.strengths.is_empty() {
        report.section("🌟 STRENGTHS:");
        report.bullets(&detailed.strengths);
    }

    if !detailed.weaknesses.is_empty() {
        report.section("⚠️ AREAS FOR IMPROVEMENT:");
        report.bullets(&detailed.weaknesses);
    }

    if !analysis.priority_improvements.is_empty() {
        report.section("🎯 PRIORITY ACTIONS:");
        for (i, action) in analysis.priority_improvements.iter().enumerate() {
            report.push(format!("{}. {action}", i + 1));
        }
    }

    if !detailed.recommendations.is_empty() {
        report.section("💡 DETAILED RECOMMENDATIONS:");
        report.bullets(&detailed.recommendations);
    }

    if let Some(ats) = non_empty(detailed.ats_compatibility.as_deref()) {
        report.section("🤖 ATS COMPATIBILITY:");
        report.push(ats);
    }

    report
}

fn push_structure(report: &mut FeedbackReport, sections: &SectionAnalysis) {
    report.section("📋 RESUME STRUCTURE ANALYSIS:");

    let checks = [
        (sections.has_contact_info, "Contact Info"),
        (sections.has_experience, "Experience"),
        (sections.has_education, "Education"),
        (sections.has_skills_section, "Skills"),
    ];
    let missing: Vec<&str> = checks
        .iter()
        .filter(|(present, _)| !present.unwrap_or(false))
        .map(|(_, name)| *name)
        .collect();

    if missing.is_empty() {
        report.push("✅ All essential sections present");
    } else {
        report.push(format!("❌ Missing sections: {}", missing.join(", ")));
    }

    if sections.has_quantifiable_achievements.unwrap_or(false) {
        report.push("✅ Contains quantifiable achievements");
    } else {
        report.push("⚠️ Add more quantifiable achievements (numbers, percentages)");
    }
}

fn push_missing(report: &mut FeedbackReport, analysis: &AnalysisResult) {
    let keywords = &analysis.missing_keywords;
    let technical = &analysis.technical_skills_missing;
    let soft = &analysis.soft_skills_missing;

    let total = keywords.len() + technical.len() + soft.len();
    if total == 0 {
        return;
    }

    report.section(format!("🔍 MISSING KEYWORDS & SKILLS ({total} total):"));

    if !technical.is_empty() {
        report.capped_list("🔧 Technical skills", technical, TECH_DISPLAY_LIMIT);
    }
    if !soft.is_empty() {
        report.capped_list("💼 Soft skills", soft, SOFT_DISPLAY_LIMIT);
    }
    if technical.is_empty() && soft.is_empty() {
        report.capped_list("📝 Other keywords", keywords, OTHER_DISPLAY_LIMIT);
    }
}

fn non_empty(text: Option<&str>) -> Option<&str> {
    text.filter(|t| !t.is_empty())
}
