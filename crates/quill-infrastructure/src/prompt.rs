//! Prompt assembly for the OpenAI-compatible client.
//!
//! Turns the project preset, the summary log and the chapter buffer into
//! the system/user message pair sent to the model.

use quill_core::{ChatMessage, Preset};
use serde_json::{Value, json};

/// What the model is being asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Continue the chapter; the reply must be structured JSON.
    Continue,
    /// Discuss craft with the author; the reply is free text.
    Discuss,
}

/// Builds the system prompt from the style preset.
pub fn build_system_prompt(preset: &Preset, task: Task) -> String {
    let rules_text = preset
        .rules
        .iter()
        .map(|r| format!("- {r}"))
        .collect::<Vec<_>>()
        .join("\n");

    let mut prompt = format!(
        "You are a professional fiction-writing assistant.\n\n\
         ## Writing style\n{}\n\n\
         ## Point of view\n{}\n\n\
         ## Writing rules\n{}\n",
        preset.style, preset.pov, rules_text
    );

    match task {
        Task::Continue => prompt.push_str(
            r#"
## Output requirements
You must reply with JSON carrying two fields:
1. "content": the generated prose
2. "summary": a short summary of the generated prose (50-100 words)

Example output:
```json
{
  "content": "the generated prose...",
  "summary": "a summary of this passage..."
}
```

Output only the JSON, nothing else.
"#,
        ),
        Task::Discuss => prompt.push_str(
            r#"
## Output requirements
You are in advisory mode. Discuss plot, pacing, and characterization with
the author the way an experienced editor would. Reply in plain prose; no
JSON.
"#,
        ),
    }

    prompt
}

/// Builds the user prompt from prior-chapter summaries, the current chapter
/// text, and the author's instruction.
pub fn build_user_prompt(
    chapter_summaries: &[(String, String)],
    current_text: &str,
    task: Task,
    instruction: &str,
) -> String {
    let mut parts: Vec<String> = vec![];

    if !chapter_summaries.is_empty() {
        parts.push("## Story so far".to_string());
        for (title, summary) in chapter_summaries {
            parts.push(format!("[{title}] {summary}"));
        }
        parts.push(String::new());
    }

    if !current_text.is_empty() {
        parts.push("## Current chapter".to_string());
        parts.push(current_text.to_string());
        parts.push(String::new());
    }

    let action = match task {
        Task::Continue => "Continue the chapter",
        Task::Discuss => "Discuss the story",
    };
    parts.push(format!("## Task: {action}"));
    if !instruction.trim().is_empty() {
        parts.push(format!("Author's note: {}", instruction.trim()));
    }

    parts.join("\n")
}

/// Assembles the OpenAI chat-completions message array.
pub fn to_openai_messages(system: String, history: &[ChatMessage], user: String) -> Vec<Value> {
    let mut out = vec![json!({ "role": "system", "content": system })];
    for msg in history {
        out.push(json!({ "role": msg.role, "content": msg.content }));
    }
    out.push(json!({ "role": "user", "content": user }));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_lists_rules_in_order() {
        let preset = Preset {
            style: "spare".to_string(),
            pov: "first person".to_string(),
            rules: vec!["rule one".to_string(), "rule two".to_string()],
        };
        let prompt = build_system_prompt(&preset, Task::Continue);
        let one = prompt.find("- rule one").unwrap();
        let two = prompt.find("- rule two").unwrap();
        assert!(one < two);
        assert!(prompt.contains("\"summary\""));

        let prompt = build_system_prompt(&preset, Task::Discuss);
        assert!(prompt.contains("advisory mode"));
    }

    #[test]
    fn test_user_prompt_skips_empty_sections() {
        let prompt = build_user_prompt(&[], "", Task::Continue, "  ");
        assert_eq!(prompt, "## Task: Continue the chapter");

        let summaries = vec![("Ch 1".to_string(), "it begins".to_string())];
        let prompt = build_user_prompt(&summaries, "text", Task::Discuss, "be bold");
        assert!(prompt.contains("[Ch 1] it begins"));
        assert!(prompt.contains("## Current chapter"));
        assert!(prompt.contains("Author's note: be bold"));
    }

    #[test]
    fn test_message_array_shape() {
        let history = vec![ChatMessage::user("q"), ChatMessage::assistant("a")];
        let messages = to_openai_messages("sys".to_string(), &history, "next".to_string());
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[2]["role"], "assistant");
        assert_eq!(messages[3]["content"], "next");
    }
}
