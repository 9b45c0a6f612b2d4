/// Marker closing a reasoning block that some models emit before the answer.
const REASONING_END: &str = "</think>";
const DELIMITER: char = '|';

/// Classifier output split into a name and raw parameters. Nothing is
/// validated yet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActionRequest {
    pub name: String,
    pub params: Vec<String>,
}

impl ActionRequest {
    pub fn new(name: impl Into<String>, params: Vec<String>) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }
}

/// Drop everything up to and including the last reasoning marker.
pub fn strip_reasoning(text: &str) -> &str {
    match text.rfind(REASONING_END) {
        Some(pos) => text[pos + REASONING_END.len()..].trim(),
        None => text.trim(),
    }
}

/// Parse `ACTION_NAME | p1 | ... | pN`. Every token is trimmed; the delimiter
/// cannot be escaped inside a parameter.
pub fn parse_action_response(text: &str) -> ActionRequest {
    let mut tokens = strip_reasoning(text).split(DELIMITER).map(str::trim);
    let name = tokens.next().unwrap_or_default().to_string();
    let params = tokens.map(str::to_string).collect();
    ActionRequest { name, params }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_name_and_params() {
        let request = parse_action_response("SET_TARGET_ITEM | bike | 200");
        assert_eq!(request.name, "SET_TARGET_ITEM");
        assert_eq!(request.params, vec!["bike", "200"]);
    }

    #[test]
    fn test_parse_reasoning_block() {
        let request = parse_action_response("<think>user wants nothing</think>NO_ACTION");
        assert_eq!(request.name, "NO_ACTION");
        assert!(request.params.is_empty());
    }

    #[test]
    fn test_parse_multiline_reasoning_with_params() {
        let text = "<think>\nThey said $50 into growth.\n| not a param |\n</think>\n\nTRANSFER | 50 | growth\n";
        let request = parse_action_response(text);
        assert_eq!(request, ActionRequest::new("TRANSFER", vec!["50".into(), "growth".into()]));
    }

    #[test]
    fn test_parse_name_only() {
        let request = parse_action_response("  GET_INFO  ");
        assert_eq!(request.name, "GET_INFO");
        assert!(request.params.is_empty());
    }

    #[test]
    fn test_parse_keeps_empty_params() {
        let request = parse_action_response("WITHDRAW |  | growth");
        assert_eq!(request.params, vec!["", "growth"]);
    }

    #[test]
    fn test_parse_empty_response() {
        let request = parse_action_response("");
        assert_eq!(request.name, "");
        assert!(request.params.is_empty());
    }

    #[test]
    fn test_strip_reasoning_without_marker() {
        assert_eq!(strip_reasoning("  Hello there "), "Hello there");
        assert_eq!(strip_reasoning("<think>a</think> b </think> c"), "c");
    }
}
