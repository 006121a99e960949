//! Shell-style expansion for path values.
//!
//! - `${VAR}` expands to the value of VAR, errors if unset
//! - `${VAR:-default}` falls back to `default` when VAR is unset
//! - a leading `~` expands to the home directory

use std::env::VarError;

use crate::ConfigError;

/// Expand environment references, then a leading tilde.
///
/// Bare `$VAR` is left untouched; only the braced form is recognized.
pub(crate) fn expand_path(value: &str, field: &str) -> Result<String, ConfigError> {
    let expanded = expand_env(value, field)?;
    Ok(shellexpand::tilde(&expanded).into_owned())
}

fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, VarError> {
        std::env::var(var).map(Some)
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.var_name),
    })
}
