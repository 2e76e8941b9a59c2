pub mod format;
pub mod incentives;
pub mod payments;
pub mod quote;

use serde::de::DeserializeOwned;

use crate::input;

/// Resolve a command's input: `--input` file first, then piped stdin JSON,
/// then whatever the individual flags can build.
pub fn load_input<T, F>(path: Option<&str>, from_flags: F) -> Result<T, Box<dyn std::error::Error>>
where
    T: DeserializeOwned,
    F: FnOnce() -> Result<T, Box<dyn std::error::Error>>,
{
    if let Some(path) = path {
        input::file::read_input(path)
    } else if let Some(data) = input::stdin::read_stdin()? {
        Ok(serde_json::from_value(data)?)
    } else {
        from_flags()
    }
}
