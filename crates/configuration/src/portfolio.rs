use crate::error::ConfigError;
use core_types::Symbol;
use std::fs;
use std::path::Path;

/// Reads the watched symbols from a whitespace or newline delimited file.
pub fn load_portfolio(path: &Path) -> Result<Vec<Symbol>, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Portfolio {
        path: path.to_path_buf(),
        source,
    })?;

    let symbols = parse_portfolio(&content);
    tracing::info!(path = %path.display(), count = symbols.len(), "Loaded portfolio");
    Ok(symbols)
}

/// Splits portfolio text into symbols, in file order. Case is left untouched.
pub fn parse_portfolio(content: &str) -> Vec<Symbol> {
    content.split_whitespace().map(str::to_string).collect()
}
