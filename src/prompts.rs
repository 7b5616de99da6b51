//! The extraction prompt sent with every model call.
//!
//! Centralising the prompt here keeps it a single source of truth and lets
//! unit tests inspect it without spinning up a real model. The prompt fixes
//! the reply schema to a two-key JSON object; everything downstream
//! ([`crate::pipeline::parse`]) depends on that shape.

/// Instruction text attached to every page image.
///
/// The reply is expected to be a JSON object with exactly two top-level
/// keys, `key_value_pairs` and `extracted_tests`. Models frequently wrap
/// it in a ```json fence anyway; the parser tolerates both forms.
pub const EXTRACTION_PROMPT: &str = r#"You are a medical data extraction assistant. The attached image is a medical report (or a page from a medical report PDF). Identify all medical terms (e.g., hemoglobin, creatinine, blood sugar) and their associated values (numeric or textual, including units if present). Format the output as a JSON object with two keys:
- "key_value_pairs": Non-medical key-value pairs (e.g., patient name, age).
- "extracted_tests": Medical terms and their values (e.g., hemoglobin: 13.5 g/dL).
Do not use hardcoded patterns; rely on your understanding of medical terminology. If a term's value is unclear, skip it. Do not hallucinate values or tests that are not explicitly mentioned in the image. If a value is a reference range (e.g., '3.5-5.5'), only include it if no actual value is present. Ensure the output is valid JSON.

Output format:
{
    "key_value_pairs": {},
    "extracted_tests": {}
}"#;
