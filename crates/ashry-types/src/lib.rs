//! Type definitions shared by the Ashry client and the services it talks to
//!
//! This crate is the contract between the editing client, the synchronization
//! endpoint and the code-execution endpoint. Keeping the frames and payloads in
//! one place lets the client and any mock or real server agree on the exact
//! JSON shapes at compile time.
//!
//! ## Example
//!
//! ```rust
//! use ashry_types::{CodeUpdate, Language, RunRequest};
//!
//! let frame = CodeUpdate::new("let x = 1;");
//! assert_eq!(frame.to_frame().unwrap(), r#"{"code":"let x = 1;"}"#);
//!
//! let request = RunRequest::new("console.log(1)", Language::JavaScript);
//! assert_eq!(request.language.to_string(), "javascript");
//! ```

pub mod error;
pub mod suite;
pub mod types;

pub use error::*;
pub use suite::*;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_run_request_wire_shape() {
        let request = RunRequest::new("console.log(42)", Language::JavaScript);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({ "code": "console.log(42)", "language": "javascript" })
        );
    }

    #[test]
    fn test_typescript_language_tag() {
        let request = RunRequest::new("", Language::TypeScript);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["language"], "typescript");
        assert_eq!("typescript".parse::<Language>().unwrap(), Language::TypeScript);
    }

    #[test]
    fn test_code_update_frame() {
        let frame = CodeUpdate::new("a\n\"b\"").to_frame().unwrap();
        assert_eq!(frame, r#"{"code":"a\n\"b\""}"#);
    }

    #[test]
    fn test_parse_frame_with_code() {
        let code = CodeUpdate::parse_frame(r#"{"code":"function f() {}"}"#).unwrap();
        assert_eq!(code, Some("function f() {}".to_string()));
    }

    #[test]
    fn test_parse_frame_without_code() {
        assert_eq!(CodeUpdate::parse_frame(r#"{"cursor":3}"#).unwrap(), None);
    }

    #[test]
    fn test_parse_frame_rejects_non_json() {
        let err = CodeUpdate::parse_frame("hello there").unwrap_err();
        assert!(matches!(err, FrameError::Malformed { .. }));
    }

    #[test]
    fn test_parse_frame_rejects_non_object() {
        assert!(CodeUpdate::parse_frame(r#""just a string""#).is_err());
        assert!(CodeUpdate::parse_frame("[1,2]").is_err());
        assert!(CodeUpdate::parse_frame(r#"["smuggled"]"#).is_err());
    }

    #[test]
    fn test_parse_frame_rejects_non_string_code() {
        assert!(CodeUpdate::parse_frame(r#"{"code":5}"#).is_err());
    }

    #[test]
    fn test_execution_error_display() {
        let err = ExecutionError::status(500);
        assert_eq!(err.to_string(), "HTTP error! status: 500");

        let err = ExecutionError::transport("connection refused");
        assert_eq!(err.to_string(), "connection refused");
    }
}
