//! System prompt template assembly.
//!
//! Prompt *content* is host configuration; this module only assembles the
//! opaque sections into the final system prompt string, fencing any
//! user-provided context so the model can tell it apart from instructions.

/// The opaque sections of a system prompt, assembled in a fixed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    /// Opening instructions establishing the assistant's job.
    pub intro: String,

    /// Requirements on the shape of responses.
    pub format_requirements: String,

    /// Instructions for when web search is available to the model.
    pub search_usage: String,

    /// The body of the prompt (examples, domain guidance).
    pub content: String,

    /// Closing output instructions.
    pub output_instructions: String,
}

impl PromptTemplate {
    /// Creates a template with a minimal neutral default for each section.
    pub fn new() -> Self {
        Self {
            intro: "You are a concise assistant for what is on the user's screen. \
                    Answer the question in front of them directly."
                .to_string(),
            format_requirements: "Keep answers short and directly usable.".to_string(),
            search_usage: "Use web search for anything that may have changed recently, \
                           then state the final answer."
                .to_string(),
            content: String::new(),
            output_instructions: "Answer in plain markdown without meta-commentary.".to_string(),
        }
    }

    /// Replaces the intro section.
    pub fn with_intro(mut self, intro: impl Into<String>) -> Self {
        self.intro = intro.into();
        self
    }

    /// Replaces the format-requirements section.
    pub fn with_format_requirements(mut self, format_requirements: impl Into<String>) -> Self {
        self.format_requirements = format_requirements.into();
        self
    }

    /// Replaces the search-usage section.
    pub fn with_search_usage(mut self, search_usage: impl Into<String>) -> Self {
        self.search_usage = search_usage.into();
        self
    }

    /// Replaces the content section.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Replaces the output-instructions section.
    pub fn with_output_instructions(mut self, output_instructions: impl Into<String>) -> Self {
        self.output_instructions = output_instructions.into();
        self
    }

    /// Assembles the final system prompt.
    ///
    /// `custom_context` is the user's own prompt text; it lands inside a
    /// fenced block between the content and the output instructions. The
    /// search-usage section is included only when `search_enabled` is set.
    pub fn build(&self, custom_context: &str, search_enabled: bool) -> String {
        let mut sections = vec![self.intro.as_str(), "\n\n", self.format_requirements.as_str()];

        if search_enabled {
            sections.push("\n\n");
            sections.push(self.search_usage.as_str());
        }

        sections.push("\n\n");
        sections.push(self.content.as_str());
        sections.push("\n\nUser-provided context\n-----\n");
        sections.push(custom_context);
        sections.push("\n-----\n\n");
        sections.push(self.output_instructions.as_str());

        sections.join("")
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new()
    }
}
