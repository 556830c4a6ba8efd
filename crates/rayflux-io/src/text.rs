//! Whitespace-separated numeric text files.

use rayflux_types::error::{RayfluxError, RayfluxResult};
use std::path::Path;
use std::str::FromStr;

/// Read exactly `expected` whitespace-separated values of type `T`.
pub(crate) fn read_values<T>(path: &Path, expected: usize) -> RayfluxResult<Vec<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let contents = std::fs::read_to_string(path)?;
    parse_values(&contents, path, expected)
}

pub(crate) fn parse_values<T>(contents: &str, path: &Path, expected: usize) -> RayfluxResult<Vec<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let display = path.display().to_string();
    let mut values = Vec::with_capacity(expected);
    for (entry, token) in contents.split_whitespace().enumerate() {
        if entry >= expected {
            return Err(RayfluxError::Parse {
                path: display,
                entry,
                message: format!("more than {expected} values"),
            });
        }
        let value = token.parse::<T>().map_err(|e| RayfluxError::Parse {
            path: display.clone(),
            entry,
            message: format!("'{token}': {e}"),
        })?;
        values.push(value);
    }
    if values.len() != expected {
        return Err(RayfluxError::Parse {
            path: display,
            entry: values.len(),
            message: format!("expected {expected} values, found {}", values.len()),
        });
    }
    Ok(values)
}
