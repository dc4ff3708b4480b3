use std::collections::HashMap;
use tracing::warn;

use super::shellexpand;

/// Externalized prompts, loaded from `{data_dir}/prompts/` at startup.
///
/// If the file is missing, hardcoded defaults are used.
#[derive(Debug, Clone)]
pub struct Prompts {
    /// System instruction with the persona and whereabouts rules.
    pub system: String,
    /// Chat analysis template with `{context}` and `{question}` placeholders.
    pub analyze: String,
    /// Shorter analysis template used when the full one fails.
    pub analyze_brief: String,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            system: "You are a helpful AI assistant in a chat application.\n\
                     Your name is tung tung tung sahur.\n\
                     - You must know Malay language. Answer whereabouts questions in Malay.\n\
                     - Be concise, friendly, and conversational. If you don't know something, admit it.\n\
                     - If another user asks where someone is, give the last known location or activity, \
                     or say you have no recent information about that user's whereabouts."
                .into(),
            analyze: "You are now being asked to analyze a chat conversation.\n\n\
                      Chat History:\n{context}\n\n\
                      Question: {question}\n\n\
                      Please analyze the chat history and answer the question."
                .into(),
            analyze_brief: "Question: {question}\n\n\
                            Based on this chat excerpt:\n{context}\n\n\
                            Please provide a brief answer."
                .into(),
        }
    }
}

/// Bundled system prompt, embedded at compile time.
const BUNDLED_SYSTEM_PROMPT: &str = include_str!("../../../../prompts/SYSTEM_PROMPT.md");

/// Deploy the bundled prompt file to `{data_dir}/prompts/`, creating the directory if needed.
///
/// Never overwrites an existing file so user edits are preserved.
pub fn install_bundled_prompts(data_dir: &str) {
    let expanded = shellexpand(data_dir);
    let dir = std::path::Path::new(&expanded).join("prompts");
    if let Err(e) = std::fs::create_dir_all(&dir) {
        warn!("prompts: failed to create {}: {e}", dir.display());
        return;
    }

    let dest = dir.join("SYSTEM_PROMPT.md");
    if !dest.exists() {
        if let Err(e) = std::fs::write(&dest, BUNDLED_SYSTEM_PROMPT) {
            warn!("prompts: failed to write {}: {e}", dest.display());
        } else {
            tracing::info!("prompts: deployed bundled SYSTEM_PROMPT.md");
        }
    }
}

impl Prompts {
    /// Load prompts from `{data_dir}/prompts/SYSTEM_PROMPT.md`.
    ///
    /// Missing file or sections fall back to defaults.
    pub fn load(data_dir: &str) -> Self {
        let dir = shellexpand(data_dir);
        let prompt_path = format!("{dir}/prompts/SYSTEM_PROMPT.md");
        match std::fs::read_to_string(&prompt_path) {
            Ok(content) => {
                tracing::info!("loaded prompts from {prompt_path}");
                Self::from_markdown(&content)
            }
            Err(_) => Self::default(),
        }
    }

    /// Build prompts from `## Section` markdown, keeping defaults for absent sections.
    pub fn from_markdown(content: &str) -> Self {
        let mut prompts = Self::default();
        let sections = parse_markdown_sections(content);
        if let Some(v) = sections.get("System") {
            prompts.system = v.clone();
        }
        if let Some(v) = sections.get("Analyze") {
            prompts.analyze = v.clone();
        }
        if let Some(v) = sections.get("Analyze Brief") {
            prompts.analyze_brief = v.clone();
        }
        prompts
    }

    /// Fill an analysis template.
    pub fn render_analyze(template: &str, context: &str, question: &str) -> String {
        template
            .replace("{context}", context)
            .replace("{question}", question)
    }
}

/// Parse a markdown file with `## Section` headers into a map of section name -> body.
fn parse_markdown_sections(content: &str) -> HashMap<String, String> {
    let mut sections = HashMap::new();
    let mut current_key: Option<String> = None;
    let mut current_body = String::new();

    for line in content.lines() {
        if let Some(header) = line.strip_prefix("## ") {
            // Save previous section.
            if let Some(key) = current_key.take() {
                let trimmed = current_body.trim().to_string();
                if !trimmed.is_empty() {
                    sections.insert(key, trimmed);
                }
            }
            current_key = Some(header.trim().to_string());
            current_body.clear();
        } else if current_key.is_some() {
            current_body.push_str(line);
            current_body.push('\n');
        }
    }

    // Save last section.
    if let Some(key) = current_key {
        let trimmed = current_body.trim().to_string();
        if !trimmed.is_empty() {
            sections.insert(key, trimmed);
        }
    }

    sections
}
