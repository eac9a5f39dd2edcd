//! Decoding of `application/x-www-form-urlencoded` submissions.

use crate::dom::{FieldKind, Form};

/// Decode a urlencoded body into ordered `(name, value)` pairs.
///
/// `+` decodes to a space. Pairs whose percent-escapes are not valid UTF-8
/// are dropped.
pub fn parse_urlencoded(body: &str) -> Vec<(String, String)> {
    body.split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            Some((decode(k)?, decode(v)?))
        })
        .collect()
}

fn decode(raw: &str) -> Option<String> {
    urlencoding::decode(&raw.replace('+', " "))
        .ok()
        .map(|s| s.into_owned())
}

/// Copy submitted values into `form`, matching fields by name.
///
/// Browsers omit unchecked checkboxes, so a checkbox is checked exactly
/// when its name was submitted. Other fields keep their value when absent.
pub fn apply_submission(form: &mut Form, pairs: &[(String, String)]) {
    for field in form.fields.iter_mut() {
        let submitted = pairs.iter().find(|(k, _)| *k == field.name);
        if field.kind == FieldKind::Checkbox {
            field.checked = submitted.is_some();
        } else if let Some((_, value)) = submitted {
            field.value = value.clone();
        }
    }
}
