//! Prompt templates and response schemas for AI generation

use serde_json::{json, Value};

/// Prompt for a refactor suggestion
pub fn refactor_prompt(code: &str) -> String {
    format!(
        r#"Suggest a React refactor for the following code. Focus on best practices and state management.

Respond with JSON containing:
- "explanation": a short paragraph describing the changes
- "refactoredCode": the complete refactored source

Code:
```
{code}
```"#
    )
}

/// Prompt for a security audit of one file
pub fn security_audit_prompt(file_name: &str, content: &str) -> String {
    format!(
        r#"Analyze this file ({file_name}) for security vulnerabilities.

For each finding report the line number, a short vulnerability type, a severity
of "low", "medium" or "high", a description, and a concrete fix.

File:
```
{content}
```"#
    )
}

/// Response schema for refactor suggestions
pub fn refactor_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "explanation": { "type": "STRING" },
            "refactoredCode": { "type": "STRING" }
        },
        "required": ["explanation", "refactoredCode"]
    })
}

/// Response schema for security audits
pub fn security_audit_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "vulnerabilities": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "line": { "type": "NUMBER" },
                        "type": { "type": "STRING" },
                        "severity": { "type": "STRING" },
                        "description": { "type": "STRING" },
                        "fix": { "type": "STRING" }
                    }
                }
            }
        }
    })
}
