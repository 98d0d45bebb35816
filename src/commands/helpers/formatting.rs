use teloxide::{prelude::*, types::ParseMode};

const TELEGRAM_TEXT_HARD_LIMIT: usize = 4096;
const TELEGRAM_TEXT_SAFE_LIMIT: usize = 3900;
const TRUNCATE_NOTICE: &str = "\n\n⚠️ (Output was truncated...)";

pub(crate) fn as_html_block(title: &str, body: &str) -> String {
    let escaped_title = html_escape::encode_text(title);
    let body_budget = TELEGRAM_TEXT_SAFE_LIMIT.saturating_sub(TRUNCATE_NOTICE.len());
    let mut escaped_body = sanitize_and_truncate(body, body_budget);
    let was_truncated = html_escape::encode_text(body).len() > escaped_body.len();

    if was_truncated {
        escaped_body.push_str(TRUNCATE_NOTICE);
    }

    let message = format!("<b>{}</b>\n<pre>{}</pre>", escaped_title, escaped_body);
    if message.len() > TELEGRAM_TEXT_HARD_LIMIT {
        log::warn!("formatted Telegram message is close to hard limit");
    }
    message
}

pub(crate) async fn send_html(bot: &Bot, chat_id: ChatId, title: &str, body: &str) -> ResponseResult<()> {
    bot.send_message(chat_id, as_html_block(title, body))
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

fn sanitize_and_truncate(input: &str, max_escaped_len: usize) -> String {
    let escaped_full = html_escape::encode_text(input);
    if escaped_full.len() <= max_escaped_len {
        return escaped_full.into_owned();
    }

    let mut low = 0usize;
    let mut high = input.len();
    let mut best = "";

    while low <= high {
        let mid = (low + high) / 2;
        let candidate = truncate_to_char_boundary(input, mid);
        let escaped = html_escape::encode_text(candidate);

        if escaped.len() <= max_escaped_len {
            best = candidate;
            low = mid + 1;
        } else {
            if mid == 0 {
                break;
            }
            high = mid - 1;
        }
    }

    html_escape::encode_text(best).into_owned()
}

fn truncate_to_char_boundary(input: &str, max_bytes: usize) -> &str {
    if input.len() <= max_bytes {
        return input;
    }

    let mut end = max_bytes;
    while !input.is_char_boundary(end) {
        end -= 1;
    }

    &input[..end]
}

#[cfg(test)]
mod tests {
    use super::{TELEGRAM_TEXT_SAFE_LIMIT, TRUNCATE_NOTICE, as_html_block};

    #[test]
    fn escapes_sql_in_title_and_body() {
        let html = as_html_block("Query <pgpool>", "SELECT * FROM t WHERE a < 1 & b > 2");
        assert_eq!(
            html,
            "<b>Query &lt;pgpool&gt;</b>\n<pre>SELECT * FROM t WHERE a &lt; 1 &amp; b &gt; 2</pre>"
        );
    }

    #[test]
    fn long_frames_are_truncated_with_notice() {
        let body = "ü<".repeat(3000);
        let html = as_html_block("Status", &body);
        assert!(html.contains(TRUNCATE_NOTICE));
        assert!(html.len() <= TELEGRAM_TEXT_SAFE_LIMIT + "<b>Status</b>\n<pre></pre>".len());
    }
}
