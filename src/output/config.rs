use std::env;

use crate::telemetry::config::json_mode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Mcp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl OutputConfig {
    /// `RAG_OUTPUT_FORMAT` wins; otherwise `--json` selects JSON and text is the fallback.
    pub fn from_env() -> Self {
        Self::resolve(env::var("RAG_OUTPUT_FORMAT").ok().as_deref(), env::var("RAG_OUTPUT_PRETTY").ok().as_deref(), json_mode())
    }

    fn resolve(format: Option<&str>, pretty: Option<&str>, json: bool) -> Self {
        let format = match format {
            Some("json") => OutputFormat::Json,
            Some("mcp") => OutputFormat::Mcp,
            Some("text") => OutputFormat::Text,
            _ if json => OutputFormat::Json,
            _ => OutputFormat::Text,
        };
        let pretty = matches!(pretty, Some(v) if v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"));
        OutputConfig { format, pretty }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_format_beats_json_flag() {
        assert_eq!(OutputConfig::resolve(Some("mcp"), None, true).format, OutputFormat::Mcp);
        assert_eq!(OutputConfig::resolve(Some("text"), None, true).format, OutputFormat::Text);
    }

    #[test]
    fn json_flag_selects_json() {
        assert_eq!(OutputConfig::resolve(None, None, true).format, OutputFormat::Json);
        assert_eq!(OutputConfig::resolve(None, None, false).format, OutputFormat::Text);
        assert_eq!(OutputConfig::resolve(Some("yaml"), None, false).format, OutputFormat::Text);
    }

    #[test]
    fn pretty_accepts_truthy_values() {
        assert!(OutputConfig::resolve(None, Some("TRUE"), false).pretty);
        assert!(OutputConfig::resolve(None, Some("1"), false).pretty);
        assert!(!OutputConfig::resolve(None, Some("0"), false).pretty);
        assert!(!OutputConfig::resolve(None, None, false).pretty);
    }
}
