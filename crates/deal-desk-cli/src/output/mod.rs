pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Keys of result fields that hold a list of rows (schedule payments,
/// breakdown lines, applied clawbacks).
pub(crate) const ROW_KEYS: [&str; 3] = ["payments", "lines", "clawbacks"];

/// Render a scalar for a table cell or CSV field.
pub(crate) fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => arr.iter().map(cell).collect::<Vec<_>>().join(", "),
        Value::Object(map) => match (map.get("tier"), map.get("reason")) {
            // approval decisions
            (Some(tier), Some(reason)) => format!("{} ({})", cell(tier), cell(reason)),
            _ => serde_json::to_string(value).unwrap_or_default(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cell_approval_decision() {
        let v = json!({ "tier": "Finance Head", "reason": "Discount > 10%" });
        assert_eq!(cell(&v), "Finance Head (Discount > 10%)");
    }

    #[test]
    fn test_cell_scalars() {
        assert_eq!(cell(&json!("45000")), "45000");
        assert_eq!(cell(&json!(true)), "true");
        assert_eq!(cell(&Value::Null), "");
    }
}
