//! Editor implementations behind a uniform value-holder interface.
//!
//! The editing widgets themselves are rendered by the front end; the core
//! only needs to know which kind to mount and how to get and set the text.

use serde::{Deserialize, Serialize};
use shared_types::file_extension;

use crate::markdown::render_preview;

/// Syntax mode for the code editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageMode {
    Html,
    Css,
    Scss,
    Less,
    Xml,
    Yaml,
    TypeScript,
    Python,
    R,
    Markdown,
    PlainText,
}

impl LanguageMode {
    pub fn from_extension(extension: &str) -> Self {
        match extension.to_lowercase().as_str() {
            "html" | "htm" => LanguageMode::Html,
            "css" => LanguageMode::Css,
            "scss" => LanguageMode::Scss,
            "less" => LanguageMode::Less,
            "xml" => LanguageMode::Xml,
            "yml" | "yaml" => LanguageMode::Yaml,
            "ts" => LanguageMode::TypeScript,
            "py" => LanguageMode::Python,
            "r" => LanguageMode::R,
            "md" | "markdown" => LanguageMode::Markdown,
            _ => LanguageMode::PlainText,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageMode::Html => "html",
            LanguageMode::Css => "css",
            LanguageMode::Scss => "scss",
            LanguageMode::Less => "less",
            LanguageMode::Xml => "xml",
            LanguageMode::Yaml => "yaml",
            LanguageMode::TypeScript => "typescript",
            LanguageMode::Python => "python",
            LanguageMode::R => "r",
            LanguageMode::Markdown => "markdown",
            LanguageMode::PlainText => "plaintext",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditorKind {
    Code(LanguageMode),
    Markdown,
}

/// Pick the editor for a file; `.md` gets the markdown editor, everything
/// else the code editor in the matching language mode.
pub fn editor_kind_for(path: &str) -> EditorKind {
    let extension = file_extension(path);
    if extension == "md" {
        EditorKind::Markdown
    } else {
        EditorKind::Code(LanguageMode::from_extension(&extension))
    }
}

/// Get/set access to an editor's buffer.
pub trait Editor {
    fn value(&self) -> String;
    fn set_value(&mut self, text: &str);
    fn kind(&self) -> EditorKind;
}

/// General-purpose code editor state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeEditor {
    mode: LanguageMode,
    buffer: String,
    pub word_wrap: bool,
    /// Wrapped lines keep the indentation of their first line
    pub wrap_same_indent: bool,
    pub minimap: bool,
}

impl CodeEditor {
    pub fn new(mode: LanguageMode) -> Self {
        Self {
            mode,
            buffer: String::new(),
            word_wrap: true,
            wrap_same_indent: true,
            minimap: false,
        }
    }

    pub fn mode(&self) -> LanguageMode {
        self.mode
    }
}

impl Editor for CodeEditor {
    fn value(&self) -> String {
        self.buffer.clone()
    }

    fn set_value(&mut self, text: &str) {
        self.buffer = text.to_string();
    }

    fn kind(&self) -> EditorKind {
        EditorKind::Code(self.mode)
    }
}

/// Lightweight markdown editor with an optional rendered preview
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkdownEditor {
    buffer: String,
    pub spell_check: bool,
    preview: bool,
}

impl MarkdownEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_previewing(&self) -> bool {
        self.preview
    }

    pub fn toggle_preview(&mut self) {
        self.preview = !self.preview;
    }

    pub fn preview_html(&self) -> String {
        render_preview(&self.buffer)
    }
}

impl Editor for MarkdownEditor {
    fn value(&self) -> String {
        self.buffer.clone()
    }

    fn set_value(&mut self, text: &str) {
        self.buffer = text.to_string();
    }

    fn kind(&self) -> EditorKind {
        EditorKind::Markdown
    }
}

/// The mounted editor of a [`super::FileEditorView`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorInstance {
    Code(CodeEditor),
    Markdown(MarkdownEditor),
}

impl EditorInstance {
    pub fn for_kind(kind: EditorKind) -> Self {
        match kind {
            EditorKind::Code(mode) => EditorInstance::Code(CodeEditor::new(mode)),
            EditorKind::Markdown => EditorInstance::Markdown(MarkdownEditor::new()),
        }
    }

    pub fn for_path(path: &str) -> Self {
        Self::for_kind(editor_kind_for(path))
    }

    fn as_editor(&self) -> &dyn Editor {
        match self {
            EditorInstance::Code(editor) => editor,
            EditorInstance::Markdown(editor) => editor,
        }
    }

    fn as_editor_mut(&mut self) -> &mut dyn Editor {
        match self {
            EditorInstance::Code(editor) => editor,
            EditorInstance::Markdown(editor) => editor,
        }
    }
}

impl Editor for EditorInstance {
    fn value(&self) -> String {
        self.as_editor().value()
    }

    fn set_value(&mut self, text: &str) {
        self.as_editor_mut().set_value(text)
    }

    fn kind(&self) -> EditorKind {
        self.as_editor().kind()
    }
}
