use serde::Serialize;
use tera::{Context, Error as TeraError, Tera};

/// Template for the system prompt sent with every completion
pub const SYSTEM_PROMPT: &str = include_str!("prompts/system.md");

pub fn load_prompt<T: Serialize>(template: &str, context_data: &T) -> Result<String, TeraError> {
    let mut tera = Tera::default();
    tera.add_raw_template("inline_template", template)?;
    let context = Context::from_serialize(context_data)?;
    let rendered = tera.render("inline_template", &context)?;
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tool::Tool;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_load_prompt() {
        let template = "Hello, {{ name }}! You are {{ age }} years old.";
        let mut context = HashMap::new();
        context.insert("name".to_string(), "Alice".to_string());
        context.insert("age".to_string(), 30.to_string());

        let result = load_prompt(template, &context).unwrap();
        assert_eq!(result, "Hello, Alice! You are 30 years old.");
    }

    #[test]
    fn test_load_prompt_missing_variable() {
        let template = "Hello, {{ name }}! You are {{ age }} years old.";
        let mut context = HashMap::new();
        context.insert("name".to_string(), "Alice".to_string());
        // 'age' is missing from context
        let result = load_prompt(template, &context);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_prompt_with_tools() {
        let template = "### Tool Descriptions\n{% for tool in tools %}\n{{tool.name}}: {{tool.description}}{% endfor %}";

        let tools = vec![
            Tool::new(
                "tavily_search_results_json",
                "Searches the web",
                json!({"type": "object", "properties": {"query": {"type": "string"}}}),
            ),
            Tool::new("weather", "Gets weather information", json!({"type": "object"})),
        ];

        let mut context = HashMap::new();
        context.insert("tools".to_string(), tools);

        let result = load_prompt(template, &context).unwrap();
        let expected = "### Tool Descriptions\n\ntavily_search_results_json: Searches the web\nweather: Gets weather information";
        assert_eq!(result, expected);
    }

    #[test]
    fn test_system_prompt_without_toolkits() {
        let context = json!({"date": "2024-01-01", "toolkits": []});
        let result = load_prompt(SYSTEM_PROMPT, &context).unwrap();
        assert!(result.contains("The current date is 2024-01-01."));
        assert!(result.contains("You have no tools available"));
    }

    #[test]
    fn test_system_prompt_lists_toolkits() {
        let context = json!({
            "date": "2024-01-01",
            "toolkits": [{
                "name": "web_search",
                "description": "Search the web",
                "instructions": "Keep queries short."
            }]
        });
        let result = load_prompt(SYSTEM_PROMPT, &context).unwrap();
        assert!(result.contains("## web_search"));
        assert!(result.contains("Keep queries short."));
        assert!(!result.contains("You have no tools available"));
    }
}
