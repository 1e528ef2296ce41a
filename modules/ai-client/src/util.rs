/// Strip markdown code blocks from a response.
pub fn strip_code_blocks(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Slice out the outermost `{ ... }` object of a response that wraps JSON in prose.
/// Falls back to the code-block-stripped response when no braces are present.
pub fn extract_json_object(response: &str) -> &str {
    let stripped = strip_code_blocks(response);
    match (stripped.find('{'), stripped.rfind('}')) {
        (Some(start), Some(end)) if start < end => &stripped[start..=end],
        _ => stripped,
    }
}
