//! Prompt assembly for the review request.
//!
//! One prompt per run: all patch blocks (plus optional full file content)
//! concatenated under `File:` headers, followed by strict output-shape
//! instructions so the reply is machine-parsable JSON.

/// A file selected for review: its patch and, when configured, the full
/// content at the head SHA for added context.
#[derive(Debug, Clone)]
pub struct ReviewInput {
    pub path: String,
    pub patch: String,
    pub content: Option<String>,
}

pub const SYSTEM_PROMPT: &str = "You are an expert code reviewer.";

/// Builds the user instruction embedding all collected patches.
pub fn build_review_prompt(inputs: &[ReviewInput]) -> String {
    let mut diffs = String::new();
    for input in inputs {
        diffs.push_str("\n---\nFile: ");
        diffs.push_str(&input.path);
        diffs.push('\n');
        diffs.push_str(&input.patch);
        diffs.push('\n');
        if let Some(content) = &input.content {
            diffs.push_str("\nFull file content for context:\n");
            diffs.push_str(content);
            diffs.push('\n');
        }
    }

    format!(
        r#"Analyze the following code diff and return feedback as a single JSON object:

{{
  "summary": "<brief summary of overall issues and improvements>",
  "comments": [
    {{
      "file": "<filename>",
      "line": <line_number_in_new_file>,
      "comment": "<explanation of why this line needs improvement>",
      "suggestion": "<replacement code, optional>",
      "severity": "<critical|major|minor|style, optional>"
    }}
  ]
}}

Review focus areas:
- Correctness bugs and unhandled edge cases
- Error handling and failure paths
- Unsafe patterns and potential panics
- Readability, naming, and idiomatic style

Line numbers must refer to the new version of each file.
Return only the JSON object. Avoid explanations outside the JSON.

Here is the code diff to review:
{diffs}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_paths_and_patches() {
        let inputs = vec![
            ReviewInput {
                path: "src/a.rs".into(),
                patch: "@@ -1,1 +1,2 @@\n+fn a() {}".into(),
                content: None,
            },
            ReviewInput {
                path: "src/b.rs".into(),
                patch: "@@ -5,1 +5,1 @@\n+fn b() {}".into(),
                content: Some("fn b() {}\n".into()),
            },
        ];
        let prompt = build_review_prompt(&inputs);
        assert!(prompt.contains("File: src/a.rs"));
        assert!(prompt.contains("File: src/b.rs"));
        assert!(prompt.contains("+fn a() {}"));
        assert!(prompt.contains("Full file content for context:"));
        assert!(prompt.contains("Return only the JSON object."));
    }
}
