use std::env;
use std::sync::OnceLock;

static DMLX_LAYOUT: OnceLock<Option<String>> = OnceLock::new();
static DMLX_VALIDATE: OnceLock<Option<String>> = OnceLock::new();

/// Reads `name` once per process, trimmed and lowercased; blank values count as unset.
fn cached(cell: &'static OnceLock<Option<String>>, name: &str) -> Option<&'static str> {
    cell.get_or_init(|| match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value.trim().to_ascii_lowercase()),
        _ => None,
    })
    .as_deref()
}

pub(crate) fn layout_override() -> Option<&'static str> {
    cached(&DMLX_LAYOUT, "DMLX_LAYOUT")
}

pub(crate) fn validate_override() -> Option<&'static str> {
    cached(&DMLX_VALIDATE, "DMLX_VALIDATE")
}

/// On/off switch spellings; anything else is `None` so callers can report it.
pub(crate) fn parse_switch(value: &str) -> Option<bool> {
    match value {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::parse_switch;

    #[test]
    fn switches_accept_both_polarities() {
        for value in ["1", "true", "yes", "on"] {
            assert_eq!(parse_switch(value), Some(true), "{value}");
        }
        for value in ["0", "false", "no", "off"] {
            assert_eq!(parse_switch(value), Some(false), "{value}");
        }
        assert_eq!(parse_switch("maybe"), None);
    }
}
