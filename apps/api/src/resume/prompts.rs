// Resume field extraction prompt templates.

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;

const RESUME_PARSER_ROLE: &str = "\
You are a very accurate resume parser. \
You extract the applicant's own contact details and nothing else.";

pub const RESUME_EXTRACT_PROMPT: &str = r#"Extract the candidate details from the following resume TEXT.

RESUME TEXT:
{resume_text}

OUTPUT SCHEMA (return exactly this structure):
{"full_name": "string" | null, "email": "string" | null, "phone": "string" | null}

RULES:
1. Use null for any field that is not present in the text.
2. Extract ONLY the applicant's own details. Ignore employer, company, reference and recruiter contact information.
3. Ignore cover letter content and job descriptions.
4. Return ONLY the JSON object — nothing else, no code fences."#;

pub fn system_prompt() -> String {
    format!("{RESUME_PARSER_ROLE} {JSON_ONLY_SYSTEM}")
}

/// Fills the template with at most `max_chars` characters of resume text.
pub fn build_prompt(resume_text: &str, max_chars: usize) -> String {
    RESUME_EXTRACT_PROMPT.replace("{resume_text}", truncate_chars(resume_text.trim(), max_chars))
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
