//! Prompt template rendering

use std::path::Path;

use crate::core::{RagError, Result};

/// Built-in question answering template.
pub const DEFAULT_TEMPLATE: &str = include_str!("../../prompts/medical_qa.v1.txt");
pub const DEFAULT_TEMPLATE_VERSION: &str = "medical_qa.v1";

const CONTEXT_SLOT: &str = "{context}";
const QUESTION_SLOT: &str = "{question}";
const COMPONENT: &str = "prompt template";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Context,
    Question,
}

/// A template with exactly one `{context}` and one `{question}` slot.
///
/// The template is split into segments once, so rendering never rescans
/// substituted text: braces inside a question or retrieved document come
/// through untouched.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    version: String,
    segments: Vec<Segment>,
}

impl PromptBuilder {
    pub fn new(version: impl Into<String>, template: &str) -> Result<Self> {
        let segments = parse(template)?;
        Ok(Self {
            version: version.into(),
            segments,
        })
    }

    /// The compiled-in `medical_qa.v1` template.
    pub fn builtin() -> Result<Self> {
        Self::new(DEFAULT_TEMPLATE_VERSION, DEFAULT_TEMPLATE)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let template = std::fs::read_to_string(path).map_err(|e| {
            RagError::init(COMPONENT, format!("cannot read {}: {}", path.display(), e))
        })?;
        let version = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::new(version, &template)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn render(&self, context: &str, question: &str) -> String {
        let mut prompt = String::with_capacity(
            self.literal_len() + context.len() + question.len(),
        );
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => prompt.push_str(text),
                Segment::Context => prompt.push_str(context),
                Segment::Question => prompt.push_str(question),
            }
        }
        prompt
    }

    fn literal_len(&self) -> usize {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(text) => text.len(),
                _ => 0,
            })
            .sum()
    }
}

fn parse(template: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut context_slots = 0;
    let mut question_slots = 0;
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        let tail = &rest[start..];
        let slot = if tail.starts_with(CONTEXT_SLOT) {
            context_slots += 1;
            Some((Segment::Context, CONTEXT_SLOT.len()))
        } else if tail.starts_with(QUESTION_SLOT) {
            question_slots += 1;
            Some((Segment::Question, QUESTION_SLOT.len()))
        } else {
            None
        };

        match slot {
            Some((segment, len)) => {
                literal.push_str(&rest[..start]);
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(segment);
                rest = &rest[start + len..];
            }
            None => {
                literal.push_str(&rest[..=start]);
                rest = &rest[start + 1..];
            }
        }
    }
    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    for (slot, count) in [(CONTEXT_SLOT, context_slots), (QUESTION_SLOT, question_slots)] {
        if count != 1 {
            return Err(RagError::init(COMPONENT, format!(
                "expected exactly one {} placeholder, found {}", slot, count
            )));
        }
    }

    Ok(segments)
}
