//! Prompt Builder System
//!
//! Standardized prompt construction for assistant runs.
//! Every role's prompt is assembled from the same section kinds so drafts,
//! critiques and revisions read consistently to the model.
//!
//! ## Design Principles
//!
//! 1. **Role Definition**: Clear persona for each run
//! 2. **Structured Objectives**: Numbered goals
//! 3. **Context Sections**: Ordered key-value inputs
//! 4. **Focus Enforcement**: Keep the model on the target region
//! 5. **Quoted Material**: Prior drafts and critiques are fenced verbatim

/// Prompt section types
#[derive(Debug, Clone)]
pub enum PromptSection {
    /// Role definition with expertise area
    Role { expertise: String, task: String },
    /// Numbered objectives
    Objectives(Vec<String>),
    /// Context with key-value pairs, rendered in insertion order
    Context(Vec<(String, String)>),
    /// Raw text section with optional header
    Text {
        header: Option<String>,
        content: String,
    },
    /// Verbatim material between open/close tags
    Quoted { tag: String, content: String },
    /// Focus enforcement with restrictions
    Focus {
        target: String,
        restrictions: Vec<String>,
    },
}

/// Prompt builder for consistent prompt construction
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sections: Vec<PromptSection>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a role definition section
    pub fn role(mut self, expertise: &str, task: &str) -> Self {
        self.sections.push(PromptSection::Role {
            expertise: expertise.to_string(),
            task: task.to_string(),
        });
        self
    }

    /// Add objectives section
    pub fn objectives<S: AsRef<str>>(mut self, objectives: &[S]) -> Self {
        self.sections.push(PromptSection::Objectives(
            objectives.iter().map(|o| o.as_ref().to_string()).collect(),
        ));
        self
    }

    /// Add a context item, appending to the existing context section if any
    pub fn context_item(mut self, key: &str, value: &str) -> Self {
        for section in &mut self.sections {
            if let PromptSection::Context(ctx) = section {
                ctx.push((key.to_string(), value.to_string()));
                return self;
            }
        }
        self.sections.push(PromptSection::Context(vec![(
            key.to_string(),
            value.to_string(),
        )]));
        self
    }

    /// Add text section
    pub fn text(mut self, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: None,
            content: content.to_string(),
        });
        self
    }

    /// Add text section with header
    pub fn section(mut self, header: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: Some(header.to_string()),
            content: content.to_string(),
        });
        self
    }

    /// Add verbatim material, e.g. a prior draft
    pub fn quoted(mut self, tag: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Quoted {
            tag: tag.to_string(),
            content: content.to_string(),
        });
        self
    }

    /// Add focus enforcement section
    pub fn focus(mut self, target: &str, restrictions: &[&str]) -> Self {
        self.sections.push(PromptSection::Focus {
            target: target.to_string(),
            restrictions: restrictions.iter().map(|r| r.to_string()).collect(),
        });
        self
    }

    /// Build the final prompt string
    pub fn build(self) -> String {
        let mut prompt = String::new();

        for section in self.sections {
            match section {
                PromptSection::Role { expertise, task } => {
                    prompt.push_str("<ROLE>\n");
                    prompt.push_str(&format!(
                        "You are an expert {} specializing in {}.\n",
                        expertise, task
                    ));
                    prompt.push_str("</ROLE>\n\n");
                }
                PromptSection::Objectives(objectives) => {
                    prompt.push_str("<OBJECTIVES>\n");
                    for (i, obj) in objectives.iter().enumerate() {
                        prompt.push_str(&format!("{}. {}\n", i + 1, obj));
                    }
                    prompt.push_str("</OBJECTIVES>\n\n");
                }
                PromptSection::Context(ctx) => {
                    prompt.push_str("# Context\n\n");
                    for (key, value) in ctx {
                        prompt.push_str(&format!("**{}**: {}\n", key, value));
                    }
                    prompt.push('\n');
                }
                PromptSection::Text { header, content } => {
                    if let Some(h) = header {
                        prompt.push_str(&format!("# {}\n\n", h));
                    }
                    prompt.push_str(&content);
                    prompt.push_str("\n\n");
                }
                PromptSection::Quoted { tag, content } => {
                    prompt.push_str(&format!("<{}>\n", tag));
                    prompt.push_str(&content);
                    prompt.push_str(&format!("\n</{}>\n\n", tag));
                }
                PromptSection::Focus {
                    target,
                    restrictions,
                } => {
                    prompt.push_str("<FOCUS>\n");
                    prompt.push_str(&format!("IMPORTANT: Focus EXCLUSIVELY on: {}\n", target));
                    for restriction in restrictions {
                        prompt.push_str(&format!("- {}\n", restriction));
                    }
                    prompt.push_str("</FOCUS>\n\n");
                }
            }
        }

        prompt.trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_prompt() {
        let prompt = PromptBuilder::new()
            .role("surf forecaster", "Hawaiian wave conditions")
            .objectives(&["Read the buoys", "Write the forecast"])
            .build();

        assert!(prompt.contains("<ROLE>"));
        assert!(prompt.contains("surf forecaster"));
        assert!(prompt.contains("<OBJECTIVES>"));
        assert!(prompt.contains("1. Read the buoys"));
        assert!(prompt.contains("2. Write the forecast"));
    }

    #[test]
    fn test_focus_section() {
        let prompt = PromptBuilder::new()
            .focus("North Shore", &["Do NOT forecast other shores"])
            .build();

        assert!(prompt.contains("<FOCUS>"));
        assert!(prompt.contains("Focus EXCLUSIVELY on: North Shore"));
        assert!(prompt.contains("- Do NOT forecast other shores"));
    }

    #[test]
    fn test_context_items_keep_order() {
        let prompt = PromptBuilder::new()
            .context_item("Region", "South Shore")
            .context_item("Evidence files", "3")
            .build();

        let region = prompt.find("**Region**: South Shore").unwrap();
        let files = prompt.find("**Evidence files**: 3").unwrap();
        assert!(region < files);
        assert_eq!(prompt.matches("# Context").count(), 1);
    }

    #[test]
    fn test_quoted_material_is_verbatim() {
        let prompt = PromptBuilder::new()
            .quoted("FORECAST", "Line one\n  indented line")
            .build();

        assert!(prompt.contains("<FORECAST>\nLine one\n  indented line\n</FORECAST>"));
    }
}
