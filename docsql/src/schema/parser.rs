use super::types::DefinitionFile;
use crate::error::Result;
use std::path::Path;

/// Parse a document definition file.
pub fn parse_definitions(path: &Path) -> Result<DefinitionFile> {
    let content = std::fs::read_to_string(path)?;
    parse_definitions_str(&content)
}

/// Parse document definitions from a YAML string.
pub fn parse_definitions_str(content: &str) -> Result<DefinitionFile> {
    let definitions: DefinitionFile = serde_yaml::from_str(content)?;
    Ok(definitions)
}
