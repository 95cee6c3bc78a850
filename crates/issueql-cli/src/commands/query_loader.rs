use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// Loads the query document from inline text, a file, or stdin (`-`).
/// Returns the text plus a display path for diagnostics.
pub fn load_query(
    path: Option<&Path>,
    text: Option<&str>,
) -> Result<(String, String), String> {
    match (text, path) {
        (Some(text), None) => Ok((text.to_string(), "<query>".to_string())),
        (Some(_), Some(_)) => Err("cannot use both --query and a positional QUERY".to_string()),
        (None, Some(path)) if path.as_os_str() == "-" => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("failed to read stdin: {e}"))?;
            Ok((buf, "<stdin>".to_string()))
        }
        (None, Some(path)) => {
            let text = fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
            Ok((text, path.display().to_string()))
        }
        (None, None) => {
            Err("query required (positional path, `-` for stdin, or -q/--query)".to_string())
        }
    }
}
