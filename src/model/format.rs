use serde::Deserialize;

/// How parsed documents are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Compact single-line JSON.
    Json,
    /// Indented JSON.
    #[default]
    Pretty,
    /// Nested `{key=[values]}` text.
    Tree,
}

impl OutputFormat {
    pub fn label(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Pretty => "pretty",
            OutputFormat::Tree => "tree",
        }
    }
}
