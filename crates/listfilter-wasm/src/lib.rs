//! WASM bindings for listfilter.
//!
//! Exposes `parse` as a `#[wasm_bindgen]` function returning the parsed filter
//! as JSON, so JavaScript callers get plain data instead of Rust handles.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p listfilter-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target nodejs --out-dir pkg/ \
//!   target/wasm32-unknown-unknown/release/listfilter_wasm.wasm
//! ```

use listfilter::{Parser, ParserOptions};
use wasm_bindgen::prelude::*;

/// Parse a filter string and return its conditions as a JSON array.
///
/// `options` is an optional JSON object with the fields of `ParserOptions`
/// (`operators`, `snake_case`, `camel_case`, `reject_operators_in_values`).
/// Each element of the result has `key`, `keyParts`, `op`, `value` and
/// `next` (`"AND"`, `"OR"` or `null`).
///
/// Throws a JS error with the parser's message (including position) on failure.
#[wasm_bindgen]
pub fn parse(input: &str, options: Option<String>) -> std::result::Result<String, JsValue> {
    parse_to_json(input, options.as_deref()).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Re-emit a filter string in normalized form (single spaces around
/// separators, values quoted only where needed). The output parses back with
/// the same options.
#[wasm_bindgen]
pub fn normalize(input: &str, options: Option<String>) -> std::result::Result<String, JsValue> {
    normalize_with(input, options.as_deref()).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn build_parser(options: Option<&str>) -> listfilter::Result<Parser> {
    let options = match options {
        Some(json) => ParserOptions::from_json(json)?,
        None => ParserOptions::default(),
    };
    Ok(options.build()?)
}

fn parse_to_json(input: &str, options: Option<&str>) -> listfilter::Result<String> {
    build_parser(options)?.parse(input)?.to_json()
}

fn normalize_with(input: &str, options: Option<&str>) -> listfilter::Result<String> {
    let parser = build_parser(options)?;
    let filter = parser.parse(input)?;
    Ok(parser.render(&filter).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_to_json_lists_conditions_in_order() {
        let json = parse_to_json("foo=bar OR a.b!=\"x y\"", None).unwrap();
        assert_eq!(
            json,
            r#"[{"key":"foo","keyParts":["foo"],"op":"=","value":"bar","next":"OR"},{"key":"a.b","keyParts":["a","b"],"op":"!=","value":"x y","next":null}]"#
        );
    }

    #[test]
    fn parse_to_json_applies_options() {
        let json = parse_to_json("fooBar=1", Some(r#"{"snake_case":true}"#)).unwrap();
        assert!(json.contains(r#""key":"foo_bar""#));
    }

    #[test]
    fn conflicting_options_are_reported() {
        let err = parse_to_json("a=1", Some(r#"{"snake_case":true,"camel_case":true}"#)).unwrap_err();
        assert!(err.to_string().contains("conflicting options for name casing"));
    }

    #[test]
    fn parse_errors_carry_position() {
        let err = parse_to_json("1foo=bar", None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "filter parse error: name must start with letter @ 0 (1foo=bar)"
        );
    }

    #[test]
    fn normalize_collapses_separator_whitespace() {
        let normalized = normalize_with("a=1   AND\n\tb=\"x\"", None).unwrap();
        assert_eq!(normalized, "a=1 AND b=x");
    }

    #[test]
    fn normalize_output_parses_back_in_strict_mode() {
        let options = r#"{"operators":["=","<"],"reject_operators_in_values":true}"#;
        let normalized = normalize_with(r#"a="x<y" AND b="p=q""#, Some(options)).unwrap();
        assert_eq!(normalized, r#"a="x<y" AND b="p=q""#);
        assert_eq!(normalize_with(&normalized, Some(options)).unwrap(), normalized);
    }
}
