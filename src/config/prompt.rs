//! Initial prompt input: inline text or a path to a prompt file.

use std::path::{Path, PathBuf};

use crate::error::{ConvoyError, Result};

/// Where the initial user message comes from.
///
/// Classified once from the raw input and resolved once before the
/// conversation is created; downstream code only ever sees the resolved text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptSource {
    /// The input named an existing file; its contents are the prompt.
    PathReference(PathBuf),
    /// The input is the prompt itself.
    InlineText(String),
}

impl PromptSource {
    /// Classify raw input. Only an existing regular file counts as a path.
    pub fn from_input(input: &str) -> Self {
        let path = Path::new(input);
        if path.is_file() {
            Self::PathReference(path.to_path_buf())
        } else {
            Self::InlineText(input.to_string())
        }
    }

    /// Produce the prompt text.
    pub fn resolve(self) -> Result<String> {
        match self {
            Self::InlineText(text) => Ok(text),
            Self::PathReference(path) => std::fs::read_to_string(&path).map_err(|e| {
                ConvoyError::Configuration(format!(
                    "failed to read prompt file {}: {e}",
                    path.display()
                ))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn existing_file_is_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Fix the flaky test in ci.yml").unwrap();

        let source = PromptSource::from_input(file.path().to_str().unwrap());
        assert!(matches!(source, PromptSource::PathReference(_)));
        assert_eq!(source.resolve().unwrap(), "Fix the flaky test in ci.yml");
    }

    #[test]
    fn missing_path_is_inline_text() {
        let source = PromptSource::from_input("prompts/does-not-exist.md");
        assert_eq!(
            source,
            PromptSource::InlineText("prompts/does-not-exist.md".into())
        );
    }

    #[test]
    fn directory_is_inline_text() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().to_str().unwrap();
        assert_eq!(
            PromptSource::from_input(input),
            PromptSource::InlineText(input.to_string())
        );
    }

    #[test]
    fn plain_prompt_resolves_verbatim() {
        let source = PromptSource::from_input("Summarize the open issues");
        assert_eq!(source.resolve().unwrap(), "Summarize the open issues");
    }
}
