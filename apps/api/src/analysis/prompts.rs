// Prompt constants for resume analysis.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;

/// Analysis prompt template.
/// Replace: {json_only_instruction}, {job_text}, {resume_text}
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"You are an expert ATS (Applicant Tracking System) resume analyzer.

Analyze the following resume and job description and return JSON strictly in this format:

{
  "match_score": <0-100>,
  "matched_keywords": [],
  "missing_keywords": [],
  "technical_skills_present": [],
  "technical_skills_missing": [],
  "soft_skills_present": [],
  "soft_skills_missing": [],
  "detailed_feedback": {
    "overall_assessment": "",
    "strengths": [],
    "weaknesses": [],
    "recommendations": [],
    "ats_compatibility": "",
    "section_analysis": {
      "has_contact_info": true,
      "has_experience": true,
      "has_education": true,
      "has_skills_section": true,
      "has_quantifiable_achievements": true
    }
  },
  "priority_improvements": []
}

{json_only_instruction}

JOB DESCRIPTION:
{job_text}

RESUME:
{resume_text}
"#;

/// Builds the analysis prompt. Both texts are embedded verbatim.
///
/// The job text is substituted before the resume so that a literal
/// `{resume_text}` inside a job description is never expanded.
pub fn build_analysis_prompt(resume_text: &str, job_text: &str) -> String {
    let (head, tail) = ANALYSIS_PROMPT_TEMPLATE
        .split_once("{resume_text}")
        .unwrap_or((ANALYSIS_PROMPT_TEMPLATE, ""));
    let head = head
        .replace("{json_only_instruction}", JSON_ONLY_INSTRUCTION)
        .replace("{job_text}", job_text);
    format!("{head}{resume_text}{tail}")
}
