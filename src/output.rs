//! JSON output helpers shared by the subcommands.

use std::path::Path;

use anyhow::{Context, Result};
use ndarray::Array2;
use serde_json::Value;
use tracing::info;

/// Converts a matrix into nested JSON rows. NaN becomes `null`.
pub fn matrix(m: &Array2<f64>) -> Vec<Vec<f64>> {
    m.rows().into_iter().map(|row| row.to_vec()).collect()
}

/// Pretty-prints `value` to `path`, or to stdout when no path is given.
pub fn emit(value: &Value, path: Option<&Path>) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialise output")?;
    match path {
        Some(path) => {
            std::fs::write(path, text + "\n")
                .with_context(|| format!("failed to write output: {}", path.display()))?;
            info!(path = %path.display(), "output written");
        }
        None => println!("{text}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use serde_json::json;

    #[test]
    fn nan_serialises_as_null() {
        let rows = matrix(&array![[1.0, f64::NAN]]);
        assert_eq!(json!(rows), json!([[1.0, null]]));
    }

    #[test]
    fn writes_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        emit(&json!({ "a": 1 }), Some(&path)).unwrap();
        let back: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back["a"], 1);
    }
}
