use serde_json::{Map, Value};
use std::io;

use super::{cell, ROW_KEYS};

/// Write output as CSV to stdout.
///
/// A result carrying a row list (schedule payments, breakdown lines) is
/// written as that list; anything else as `field,value` pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => match row_list(result) {
                Some(rows) => write_rows(&mut wtr, rows),
                None => write_fields(&mut wtr, result),
            },
            Some(Value::Array(rows)) => write_rows(&mut wtr, rows),
            _ => write_fields(&mut wtr, map),
        },
        Value::Array(arr) => write_rows(&mut wtr, arr),
        _ => {
            let _ = wtr.write_record([&cell(value)]);
        }
    }

    let _ = wtr.flush();
}

fn row_list(result: &Map<String, Value>) -> Option<&Vec<Value>> {
    ROW_KEYS
        .iter()
        .find_map(|key| result.get(*key).and_then(Value::as_array))
        .filter(|rows| !rows.is_empty())
}

fn write_fields<W: io::Write>(wtr: &mut csv::Writer<W>, map: &Map<String, Value>) {
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in map {
        let _ = wtr.write_record([key.as_str(), &cell(val)]);
    }
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            let _ = wtr.write_record([&cell(item)]);
        }
        return;
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);
    for map in arr.iter().filter_map(Value::as_object) {
        let row: Vec<String> = headers
            .iter()
            .map(|h| map.get(*h).map(cell).unwrap_or_default())
            .collect();
        let _ = wtr.write_record(&row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(value: &Value) -> String {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        match value.get("result").and_then(Value::as_object) {
            Some(result) => match row_list(result) {
                Some(rows) => write_rows(&mut wtr, rows),
                None => write_fields(&mut wtr, result),
            },
            None => unreachable!(),
        }
        String::from_utf8(wtr.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_schedule_written_as_rows() {
        let v = json!({ "result": {
            "grand_total": "1000",
            "payments": [
                { "milestone": "Advance", "amount": "500" },
                { "milestone": "On Completion", "amount": "500" }
            ]
        }});
        let out = render(&v);
        // serde_json maps keep keys sorted
        assert!(out.starts_with("amount,milestone\n"));
        assert!(out.contains("500,On Completion"));
    }

    #[test]
    fn test_scalar_result_written_as_fields() {
        let v = json!({ "result": { "net_amount": "135000" } });
        assert_eq!(render(&v), "field,value\nnet_amount,135000\n");
    }
}
