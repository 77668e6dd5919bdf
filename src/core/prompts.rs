//! Prompts sent to the text generator. The headings requested here are the
//! ones the splitter recognizes, so both sides must change together.

use crate::utils::error::{DocGenError, Result};

/// 模型可接受的最大 token 數
pub const MAX_PROMPT_TOKENS: usize = 1_048_575;

const NOT_PROVIDED: &str = "Not provided.";

/// 粗估 token 數：每 4 個字元約 1 個 token
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

fn optional(value: Option<&str>) -> &str {
    match value {
        Some(text) if !text.trim().is_empty() => text.trim(),
        _ => NOT_PROVIDED,
    }
}

pub fn minutes_prompt(transcript: &str) -> Result<String> {
    if transcript.trim().is_empty() {
        return Err(DocGenError::InputError {
            message: "Meeting transcript cannot be empty.".to_string(),
        });
    }

    Ok(format!(
        "You generate structured Minutes of Meeting (MOM) documents.\n\
         Using the meeting transcript below, write the following sections, each starting with its heading followed by a colon on its own line: \
         Meeting Summary, Attendees, Action Items, Discussion Points, Next Steps.\n\
         - Meeting Summary: two or three sentences on the purpose and outcome of the meeting.\n\
         - Attendees: every participant mentioned, one bullet ('* ') per person.\n\
         - Action Items: tasks with owner and deadline when mentioned, one bullet per task.\n\
         - Discussion Points: key topics, decisions and opinions, one bullet per point.\n\
         - Next Steps: follow-up actions, one bullet per step.\n\
         If a section cannot be filled from the transcript, write '* Not discussed in this meeting.' under it.\n\n\
         Example:\n\
         Meeting Summary:\n\
         The meeting focused on project planning and resource allocation.\n\
         Attendees:\n\
         * John Doe\n\
         * Jane Smith\n\
         Action Items:\n\
         * John to finalize budget by 2025-05-20.\n\n\
         Meeting Transcript:\n{}\n",
        transcript.trim()
    ))
}

pub fn requirements_prompt(
    transcript: &str,
    additional_context: Option<&str>,
    concept_note: Option<&str>,
) -> Result<String> {
    if transcript.trim().is_empty() {
        return Err(DocGenError::InputError {
            message: "Meeting transcript cannot be empty.".to_string(),
        });
    }

    let mut prompt = String::from(
        "Create a Business Requirements Document (BRD) based on the following inputs.\n\n",
    );
    prompt.push_str(&format!("Meeting Transcript:\n{}\n\n", transcript.trim()));
    prompt.push_str(&format!(
        "Additional Context:\n{}\n\n",
        optional(additional_context)
    ));
    if let Some(note) = concept_note.filter(|note| !note.trim().is_empty()) {
        prompt.push_str(&format!("Concept Note:\n{}\n\n", note.trim()));
    }
    prompt.push_str(
        "Write a short overview paragraph, then the sections Project Objective, Requirements, \
         Project Scope and Key Stakeholders, each starting with its heading followed by a colon. \
         List requirements and stakeholders as bullets ('* ') or as a markdown table.",
    );

    Ok(prompt)
}

fn test_cases_prompt_text(
    brd: &str,
    brd_label: &str,
    concept_note: Option<&str>,
    additional_context: Option<&str>,
) -> String {
    format!(
        "Generate detailed test cases from the inputs below. Format the output with these sections:\n\
         - Test Case Overview:\n\
         \x20 (a brief overview of the purpose of the test cases)\n\
         - Test Scenarios:\n\
         \x20 * one bullet per test scenario with a description\n\
         - Test Cases:\n\
         \x20 * Test Case ID: (e.g., TC001)\n\
         \x20   - Description: (what the test case verifies)\n\
         \x20   - Precondition: (any preconditions)\n\
         \x20   - Steps: (numbered steps, one per line)\n\
         \x20   - Expected Result: (the expected outcome)\n\n\
         Inputs:\n\
         - {}:\n{}\n\
         - Concept Note Content (optional):\n{}\n\
         - Additional Context (optional):\n{}\n\n\
         If a section cannot be populated, write 'Insufficient details in the provided inputs.' under it.\n",
        brd_label,
        brd.trim(),
        optional(concept_note),
        optional(additional_context)
    )
}

pub fn test_cases_prompt(
    brd: &str,
    concept_note: Option<&str>,
    additional_context: Option<&str>,
) -> Result<String> {
    test_cases_prompt_with_limit(brd, concept_note, additional_context, MAX_PROMPT_TOKENS)
}

/// 超過 token 上限時截斷 BRD 內容；連 BRD 全刪都不夠時回傳錯誤
pub fn test_cases_prompt_with_limit(
    brd: &str,
    concept_note: Option<&str>,
    additional_context: Option<&str>,
    max_tokens: usize,
) -> Result<String> {
    if brd.trim().is_empty() {
        return Err(DocGenError::InputError {
            message: "Please provide the BRD content.".to_string(),
        });
    }

    let prompt = test_cases_prompt_text(brd, "BRD Content", concept_note, additional_context);
    let estimated = estimate_tokens(&prompt);
    tracing::debug!("Estimated prompt size: {} tokens", estimated);

    if estimated <= max_tokens {
        return Ok(prompt);
    }

    let excess_chars = (estimated - max_tokens) * 4;
    let brd = brd.trim();
    let brd_chars = brd.chars().count();
    if excess_chars >= brd_chars {
        return Err(DocGenError::InputError {
            message: "The input content is too large to process. Please reduce the size of the BRD and try again."
                .to_string(),
        });
    }

    let truncated: String = brd.chars().take(brd_chars - excess_chars).collect();
    tracing::warn!(
        "⚠️ Prompt exceeds {} tokens, BRD truncated from {} to {} characters",
        max_tokens,
        brd_chars,
        truncated.chars().count()
    );

    Ok(test_cases_prompt_text(
        &truncated,
        "BRD Content (truncated due to API limits)",
        concept_note,
        additional_context,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_tokens_rounds_up() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
    }

    #[test]
    fn test_minutes_prompt_requires_transcript() {
        assert!(minutes_prompt("   ").is_err());
        let prompt = minutes_prompt("Alice: let's ship on Friday").unwrap();
        assert!(prompt.contains("Action Items"));
        assert!(prompt.ends_with("Alice: let's ship on Friday\n"));
    }

    #[test]
    fn test_requirements_prompt_optional_inputs() {
        let prompt = requirements_prompt("We need OTP login", None, None).unwrap();
        assert!(prompt.contains("Additional Context:\nNot provided."));
        assert!(!prompt.contains("Concept Note:"));

        let prompt = requirements_prompt("We need OTP login", Some("Retail only"), Some("Phase 1")).unwrap();
        assert!(prompt.contains("Concept Note:\nPhase 1"));
    }

    #[test]
    fn test_test_cases_prompt_within_limit() {
        let prompt = test_cases_prompt("The system shall log in users.", None, Some("Mobile")).unwrap();
        assert!(prompt.contains("- BRD Content:\nThe system shall log in users."));
        assert!(prompt.contains("- Concept Note Content (optional):\nNot provided."));
        assert!(prompt.contains("- Additional Context (optional):\nMobile"));
    }

    #[test]
    fn test_test_cases_prompt_truncates_brd() {
        let brd = "x".repeat(4000);
        let untruncated = test_cases_prompt_text(&brd, "BRD Content", None, None);
        let limit = estimate_tokens(&untruncated) - 100;

        let prompt = test_cases_prompt_with_limit(&brd, None, None, limit).unwrap();
        assert!(prompt.contains("truncated due to API limits"));
        assert!(!prompt.contains(&"x".repeat(4000)));
        assert!(prompt.contains(&"x".repeat(3600)));
    }

    #[test]
    fn test_test_cases_prompt_too_large() {
        let result = test_cases_prompt_with_limit("short brd", None, None, 10);
        assert!(matches!(result, Err(DocGenError::InputError { .. })));
    }
}
