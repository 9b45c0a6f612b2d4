/// Twilio rejects WhatsApp bodies longer than this many characters.
pub const MAX_MESSAGE_LENGTH: usize = 1600;

/// Render a messaging response with one `<Message>` per chunk.
pub fn render(messages: &[String]) -> String {
    let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?><Response>"#);
    for message in messages {
        for chunk in split_message(message) {
            xml.push_str("<Message>");
            xml.push_str(&xml_escape(&chunk));
            xml.push_str("</Message>");
        }
    }
    xml.push_str("</Response>");
    xml
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Split on the last newline before the limit, or hard at the limit.
/// Lengths count characters, not bytes.
fn split_message(text: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut remaining = text;

    loop {
        let limit = match remaining.char_indices().nth(MAX_MESSAGE_LENGTH) {
            Some((pos, _)) => pos,
            None => {
                chunks.push(remaining.to_string());
                break;
            }
        };

        let split_pos = match remaining[..limit].rfind('\n') {
            Some(pos) => pos + 1,
            None => limit,
        };

        chunks.push(remaining[..split_pos].to_string());
        remaining = &remaining[split_pos..];
        if remaining.is_empty() {
            break;
        }
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_escapes() {
        let xml = render(&["Tom & Jerry <3 \"savings\"".to_string()]);
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>\
             Tom &amp; Jerry &lt;3 &quot;savings&quot;</Message></Response>"
        );
    }

    #[test]
    fn test_render_multiple_and_empty() {
        assert!(render(&[]).ends_with("<Response></Response>"));
        let xml = render(&["a".to_string(), "b".to_string()]);
        assert!(xml.contains("<Message>a</Message><Message>b</Message>"));
    }

    #[test]
    fn test_split_short() {
        assert_eq!(split_message("hi"), vec!["hi"]);
    }

    #[test]
    fn test_split_prefers_newline() {
        let text = format!("{}\n{}", "a".repeat(1000), "b".repeat(1000));
        let chunks = split_message(&text);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], format!("{}\n", "a".repeat(1000)));
        assert_eq!(chunks[1], "b".repeat(1000));
    }

    #[test]
    fn test_split_counts_chars() {
        // 2000 two-byte chars, no newline
        let text = "é".repeat(2000);
        let chunks = split_message(&text);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), MAX_MESSAGE_LENGTH);
        assert_eq!(chunks[1].chars().count(), 400);
    }

    #[test]
    fn test_split_exact_limit_is_one_chunk() {
        let text = "x".repeat(MAX_MESSAGE_LENGTH);
        assert_eq!(split_message(&text).len(), 1);
    }
}
