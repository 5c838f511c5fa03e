//! Channel transcripts
//!
//! Renders a channel's history into a standalone HTML document.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use lazy_core::HistoryMessage;

/// File name used when attaching a transcript
pub fn transcript_filename(channel_name: &str) -> String {
    format!("{channel_name}.html")
}

/// Escape text for HTML element content and attribute values
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render `messages` (oldest first) as an HTML page
pub fn render_transcript(
    channel_name: &str,
    messages: &[HistoryMessage],
    generated_at: DateTime<Utc>,
) -> String {
    let title = escape_html(channel_name);
    let mut html = String::new();

    // Writing into a String cannot fail
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Transcript - #{title}</title>\n<style>\n\
         body {{ background: #313338; color: #dbdee1; font-family: sans-serif; }}\n\
         .message {{ padding: 6px 16px; }}\n\
         .author {{ font-weight: 600; color: #f2f3f5; }}\n\
         .bot {{ font-size: 0.7em; background: #5865f2; border-radius: 3px; padding: 0 4px; margin-left: 4px; }}\n\
         .time {{ font-size: 0.75em; color: #949ba4; margin-left: 6px; }}\n\
         .content {{ white-space: pre-wrap; }}\n\
         .attachment, .embed {{ font-size: 0.85em; color: #00a8fc; }}\n\
         </style>\n</head>\n<body>\n<h1>#{title}</h1>\n<p class=\"time\">{} message(s), generated {}</p>\n",
        messages.len(),
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    for message in messages {
        let _ = write!(
            html,
            "<div class=\"message\" id=\"m{}\">\n<span class=\"author\">{}</span>",
            message.id,
            escape_html(&message.author_name)
        );
        if message.author_is_bot {
            html.push_str("<span class=\"bot\">BOT</span>");
        }
        let _ = writeln!(
            html,
            "<span class=\"time\">{}</span>",
            message.created_at.format("%Y-%m-%d %H:%M:%S")
        );
        if !message.content.is_empty() {
            let _ = writeln!(
                html,
                "<div class=\"content\">{}</div>",
                escape_html(&message.content)
            );
        }
        for title in &message.embed_titles {
            let _ = writeln!(html, "<div class=\"embed\">[embed] {}</div>", escape_html(title));
        }
        for attachment in &message.attachments {
            let _ = writeln!(
                html,
                "<div class=\"attachment\">[attachment] {}</div>",
                escape_html(attachment)
            );
        }
        html.push_str("</div>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use lazy_core::Snowflake;

    fn message(id: i64, author: &str, content: &str, at: DateTime<Utc>) -> HistoryMessage {
        HistoryMessage {
            id: Snowflake::new(id),
            author_id: Snowflake::new(id * 10),
            author_name: author.to_string(),
            author_is_bot: false,
            content: content.to_string(),
            attachments: Vec::new(),
            embed_titles: Vec::new(),
            created_at: at,
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#39;y&#39;&lt;/script&gt;"
        );
    }

    #[test]
    fn test_filename() {
        assert_eq!(transcript_filename("ticket-alice"), "ticket-alice.html");
    }

    #[test]
    fn test_render_keeps_order_and_escapes() {
        let now = Utc::now();
        let mut first = message(1, "alice", "hello <b>", now);
        first.attachments.push("log.txt".to_string());
        let second = message(2, "staff", "hi", now + Duration::seconds(5));

        let html = render_transcript("ticket-alice", &[first, second], now);

        assert!(html.contains("<h1>#ticket-alice</h1>"));
        assert!(html.contains("hello &lt;b&gt;"));
        assert!(html.contains("[attachment] log.txt"));
        assert!(html.contains("2 message(s)"));
        let alice = html.find("id=\"m1\"").unwrap();
        let staff = html.find("id=\"m2\"").unwrap();
        assert!(alice < staff);
    }

    #[test]
    fn test_render_empty_history() {
        let html = render_transcript("application-bob", &[], Utc::now());
        assert!(html.contains("0 message(s)"));
        assert!(html.ends_with("</html>\n"));
    }
}
