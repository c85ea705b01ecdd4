use std::{
    collections::HashMap,
    io::{self, Write},
};

use anyhow::Result;
use bat::WrappingMode;
use cliclack::spinner;
use console::style;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use serde_json::Value;
use wren::models::content::Content;
use wren::models::message::{Message, MessageContent, ToolRequest, ToolResponse};
use wren::models::role::Role;
use wren::models::tool::ToolCall;
use wren::toolkits::web_search::SEARCH_TOOL_NAME;

use super::{parse_input, thinking::get_random_thinking_message, Input, Prompt};

const PROMPT: &str = "User: ";
const THEME: &str = "zenburn";
const MAX_STRING_LENGTH: usize = 40;
const INDENT: &str = "    ";

pub struct RustylinePrompt {
    spinner: cliclack::ProgressBar,
    editor: DefaultEditor,
    renderers: Renderers,
}

impl RustylinePrompt {
    pub fn new() -> Result<Self> {
        Ok(RustylinePrompt {
            spinner: spinner(),
            editor: DefaultEditor::new()?,
            renderers: Renderers::new(),
        })
    }
}

/// Picks the renderer for each piece of tool content.
///
/// Requests and their responses arrive in separate messages, so the tool name of every
/// request is kept by id until its response has been rendered.
struct Renderers {
    by_tool: HashMap<String, Box<dyn ToolRenderer>>,
    pending: HashMap<String, String>,
}

impl Renderers {
    fn new() -> Self {
        let mut by_tool: HashMap<String, Box<dyn ToolRenderer>> = HashMap::new();
        let default_renderer = DefaultRenderer;
        by_tool.insert(default_renderer.tool_name(), Box::new(default_renderer));
        let search_renderer = SearchRenderer;
        by_tool.insert(search_renderer.tool_name(), Box::new(search_renderer));

        Self {
            by_tool,
            pending: HashMap::new(),
        }
    }

    fn get(&self, tool_name: &str) -> &dyn ToolRenderer {
        self.by_tool
            .get(tool_name)
            .map(|renderer| &**renderer)
            .unwrap_or(&DefaultRenderer)
    }

    fn for_request(&mut self, tool_request: &ToolRequest) -> &dyn ToolRenderer {
        match &tool_request.tool_call {
            Ok(call) => {
                self.pending
                    .insert(tool_request.id.clone(), call.name.clone());
                self.get(&call.name)
            }
            Err(_) => self.get("default"),
        }
    }

    fn for_response(&mut self, tool_response: &ToolResponse) -> &dyn ToolRenderer {
        let tool_name = self.pending.remove(&tool_response.id);
        self.get(tool_name.as_deref().unwrap_or("default"))
    }
}

/// Implement the ToolRenderer trait for each tool that you want to render in the prompt.
trait ToolRenderer {
    fn tool_name(&self) -> String;
    fn request(&self, tool_request: &ToolRequest);
    fn response(&self, tool_response: &ToolResponse);
}

struct DefaultRenderer;

impl ToolRenderer for DefaultRenderer {
    fn tool_name(&self) -> String {
        "default".to_string()
    }

    fn request(&self, tool_request: &ToolRequest) {
        match &tool_request.tool_call {
            Ok(call) => {
                print_request_header(call);

                // Format and print the parameters
                print_params(&call.arguments, 0);
                print_newline();
            }
            Err(e) => print_markdown(&e.to_string()),
        }
    }

    fn response(&self, tool_response: &ToolResponse) {
        default_response_renderer(tool_response);
    }
}

struct SearchRenderer;

impl ToolRenderer for SearchRenderer {
    fn tool_name(&self) -> String {
        SEARCH_TOOL_NAME.to_string()
    }

    fn request(&self, tool_request: &ToolRequest) {
        match &tool_request.tool_call {
            Ok(call) => {
                print_request_header(call);

                match call.arguments.get("query") {
                    Some(Value::String(query)) => {
                        println!("{}: {}", style("query").dim(), style(query).green());
                    }
                    _ => print_params(&call.arguments, 0),
                }
                print_newline();
            }
            Err(e) => print_markdown(&e.to_string()),
        }
    }

    fn response(&self, tool_response: &ToolResponse) {
        match &tool_response.tool_result {
            Ok(contents) => {
                println!(
                    "{}",
                    style(format!("{} result(s)", contents.len())).dim()
                );
                default_response_renderer(tool_response);
            }
            Err(e) => print_markdown(&e.to_string()),
        }
    }
}

fn default_response_renderer(tool_response: &ToolResponse) {
    match &tool_response.tool_result {
        Ok(contents) => {
            for content in contents {
                if let Content::Text(text) = content {
                    print_markdown(&text.text);
                }
            }
        }
        Err(e) => print_markdown(&e.to_string()),
    }
}

fn print_request_header(call: &ToolCall) {
    let tool_header = format!(
        "─── {} | {} ──────────────────────────",
        style(&call.name),
        style("tool").magenta().dim(),
    );
    print_newline();
    println!("{}", tool_header);
}

fn print_markdown(content: &str) {
    let printed = bat::PrettyPrinter::new()
        .input(bat::Input::from_bytes(content.as_bytes()))
        .theme(THEME)
        .language("Markdown")
        .wrapping_mode(WrappingMode::Character)
        .print();
    if let Err(e) = printed {
        tracing::debug!(error = %e, "falling back to plain output");
        println!("{}", content);
    }
}

/// Format and print parameters recursively with proper indentation and colors
fn print_params(value: &Value, depth: usize) {
    let indent = INDENT.repeat(depth);

    match value {
        Value::Object(map) => {
            for (key, val) in map {
                match val {
                    Value::Object(_) => {
                        println!("{}{}:", indent, style(key).dim());
                        print_params(val, depth + 1);
                    }
                    Value::Array(arr) => {
                        println!("{}{}:", indent, style(key).dim());
                        for item in arr.iter() {
                            println!("{}{}- ", indent, INDENT);
                            print_params(item, depth + 2);
                        }
                    }
                    Value::String(s) => {
                        if s.len() > MAX_STRING_LENGTH {
                            println!("{}{}: {}", indent, style(key).dim(), style("...").dim());
                        } else {
                            println!("{}{}: {}", indent, style(key).dim(), style(s).green());
                        }
                    }
                    Value::Number(n) => {
                        println!("{}{}: {}", indent, style(key).dim(), style(n).blue());
                    }
                    Value::Bool(b) => {
                        println!("{}{}: {}", indent, style(key).dim(), style(b).blue());
                    }
                    Value::Null => {
                        println!("{}{}: {}", indent, style(key).dim(), style("null").dim());
                    }
                }
            }
        }
        Value::Array(arr) => {
            for (i, item) in arr.iter().enumerate() {
                println!("{}{}.", indent, i + 1);
                print_params(item, depth + 1);
            }
        }
        Value::String(s) => println!("{}{}", indent, style(s).green()),
        Value::Number(n) => println!("{}{}", indent, style(n).yellow()),
        Value::Bool(b) => println!("{}{}", indent, style(b).yellow()),
        Value::Null => println!("{}{}", indent, style("null").dim()),
    }
}

fn print_newline() {
    println!();
}

impl Prompt for RustylinePrompt {
    fn render(&mut self, message: Box<Message>) {
        for message_content in &message.content {
            match message_content {
                MessageContent::Text(text) => {
                    if message.role == Role::Assistant {
                        println!("{}", style("Assistant:").bold().cyan());
                    }
                    print_markdown(&text.text);
                }
                MessageContent::ToolRequest(tool_request) => {
                    self.renderers.for_request(tool_request).request(tool_request)
                }
                MessageContent::ToolResponse(tool_response) => {
                    self.renderers.for_response(tool_response).response(tool_response)
                }
            }
        }

        print_newline();
        if let Err(e) = io::stdout().flush() {
            tracing::debug!(error = %e, "failed to flush stdout");
        }
    }

    fn render_error(&mut self, error: &str) {
        println!("{} {}", style("Error:").red().bold(), error);
        print_newline();
    }

    fn show_busy(&mut self) {
        self.spinner = spinner();
        self.spinner
            .start(format!("{}...", get_random_thinking_message()));
    }

    fn hide_busy(&self) {
        self.spinner.stop("");
    }

    fn get_input(&mut self) -> Result<Input> {
        match self.editor.readline(PROMPT) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.editor.add_history_entry(line.as_str())?;
                }
                Ok(parse_input(&line))
            }
            // Ctrl-D and Ctrl-C at an empty prompt both leave the session
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => Ok(Input::exit()),
            Err(e) => Err(e.into()),
        }
    }

    fn close(&self) {
        println!("Goodbye!");
    }

    #[cfg(test)]
    fn as_any(&self) -> &dyn std::any::Any {
        panic!("Not implemented");
    }
}
