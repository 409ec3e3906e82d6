use regex::Regex;

use super::types::FeatureRecord;
use crate::error::Result;

pub const TOKEN_URL: &str = "[URL]";
pub const TOKEN_EMAIL: &str = "[EMAIL]";
pub const TOKEN_SYMBOLS: &str = "[SYMBOLS]";

/// Punctuation deleted from body lines before splitting
const STRIPPED_CHARS: &str = "&<>.,:;_^-+=/\\*!\"()}{?$#@|%";

const URL_PATTERN: &str = concat!(
    r"(?:http|ftp)s?://",
    r"(?:(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+(?:[a-z]{2,6}\.?|[a-z0-9-]{2,}\.?)",
    r"|localhost",
    r"|\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})",
    r"(?::\d+)?",
    r"(?:[/?]\S*)?",
);
const EMAIL_PATTERN: &str = r"[^\s@]+@[^\s@]+\.[^\s@]+";
const SYMBOLS_PATTERN: &str = r"^[\W_]+$";
const IPV4_PATTERN: &str = r"\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}";
const HOUR_PATTERN: &str = r"(\d+):";

/// Email feature parser
///
/// Holds the compiled patterns; parsing itself is a pure function of the
/// input bytes.
pub struct EmailParser {
    url: Regex,
    email: Regex,
    symbols: Regex,
    ipv4: Regex,
    hour: Regex,
}

impl EmailParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            url: Regex::new(URL_PATTERN)?,
            email: Regex::new(EMAIL_PATTERN)?,
            symbols: Regex::new(SYMBOLS_PATTERN)?,
            ipv4: Regex::new(IPV4_PATTERN)?,
            hour: Regex::new(HOUR_PATTERN)?,
        })
    }

    /// Parse a raw message into an unlabeled feature record
    ///
    /// Invalid UTF-8 is dropped. Everything up to the first blank line is
    /// header; a message without a blank line has no body tokens.
    pub fn parse(&self, raw: &[u8]) -> FeatureRecord {
        let text = String::from_utf8_lossy(raw);
        self.parse_str(&text)
    }

    pub fn parse_str(&self, text: &str) -> FeatureRecord {
        let mut record = FeatureRecord::default();
        let mut in_body = false;

        for raw_line in text.lines() {
            let line: String = raw_line
                .chars()
                .filter(|&c| c != char::REPLACEMENT_CHARACTER)
                .collect::<String>()
                .trim()
                .to_lowercase();

            if !in_body {
                if line.is_empty() {
                    in_body = true;
                } else {
                    self.scan_header(&line, &mut record);
                }
                continue;
            }

            // Body lines are all content, `date:` and `received:` lines included
            for token in self.tokenize_line(&line) {
                record.tokens.add(&token);
            }
        }

        record
    }

    /// Pick up the relay IP and send hour from a lower-cased header line
    fn scan_header(&self, line: &str, record: &mut FeatureRecord) {
        if record.ip.is_none() && line.starts_with("received: from") {
            record.ip = self.ipv4.find(line).map(|m| m.as_str().to_string());
        }

        if record.hour.is_none() && line.starts_with("date: ") {
            record.hour = self
                .hour
                .captures(line)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string());
        }
    }

    /// Normalize one lower-cased body line and split it into tokens
    fn tokenize_line(&self, line: &str) -> Vec<String> {
        let line = self.url.replace_all(line, TOKEN_URL).into_owned();
        let line = self.email.replace_all(&line, TOKEN_EMAIL).into_owned();
        let line = if self.symbols.is_match(&line) {
            TOKEN_SYMBOLS.to_string()
        } else {
            line
        };

        let cleaned: String = line
            .chars()
            .filter(|c| !STRIPPED_CHARS.contains(*c))
            .collect();

        cleaned.split_whitespace().map(str::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> EmailParser {
        EmailParser::new().unwrap()
    }

    #[test]
    fn test_parse_ip_and_hour() {
        let message = b"Received: from relay.example.com (relay [10.0.0.5]) by mx\n\
Date: Tue, 14 Mar 2006 14:32:00 +0800\n\
Subject: Hello\n\
\n\
Hello world";
        let record = parser().parse(message);

        assert_eq!(record.ip.as_deref(), Some("10.0.0.5"));
        assert_eq!(record.hour.as_deref(), Some("14"));
        assert_eq!(record.tokens.count("hello"), 1);
        assert_eq!(record.tokens.count("world"), 1);
        assert!(record.label.is_none());
    }

    #[test]
    fn test_no_blank_line_means_headers_only() {
        let message = b"Received: from a.example.com [192.168.1.20]\nDate: Mon, 2 Jan 2006 09:15:00\nSubject: buy now";
        let record = parser().parse(message);

        assert!(record.tokens.is_empty());
        assert_eq!(record.ip.as_deref(), Some("192.168.1.20"));
        assert_eq!(record.hour.as_deref(), Some("09"));
    }

    #[test]
    fn test_first_received_line_wins() {
        let message = b"Received: from first [1.2.3.4]\nReceived: from second [5.6.7.8]\n\nbody";
        let record = parser().parse(message);
        assert_eq!(record.ip.as_deref(), Some("1.2.3.4"));
    }

    #[test]
    fn test_received_without_ip_does_not_block_later_lines() {
        let message = b"Received: from localhost by mx\nReceived: from relay [5.6.7.8]\n\nbody";
        let record = parser().parse(message);
        assert_eq!(record.ip.as_deref(), Some("5.6.7.8"));
    }

    #[test]
    fn test_date_in_body_is_ignored() {
        let message = b"Subject: hi\n\nDate: Tue, 14 Mar 2006 14:32:00";
        let record = parser().parse(message);
        assert!(record.hour.is_none());
    }

    #[test]
    fn test_date_in_body_is_tokenized() {
        let message = b"Subject: hi\n\nDate: Tue, 14 Mar 2006 14:32:00";
        let record = parser().parse(message);

        assert_eq!(record.tokens.count("date"), 1);
        assert_eq!(record.tokens.count("tue"), 1);
        assert_eq!(record.tokens.count("143200"), 1);
    }

    #[test]
    fn test_body_is_lowercased_and_counted() {
        let message = b"Subject: x\n\nWin WIN win money";
        let record = parser().parse(message);

        assert_eq!(record.tokens.count("win"), 3);
        assert_eq!(record.tokens.count("money"), 1);
        assert_eq!(record.tokens.total(), 4);
    }

    #[test]
    fn test_url_and_email_markers() {
        let message = b"Subject: x\n\nvisit http://www.example.com/offer now\nwrite to bob@example.com today";
        let record = parser().parse(message);

        assert_eq!(record.tokens.count(TOKEN_URL), 1);
        assert_eq!(record.tokens.count(TOKEN_EMAIL), 1);
        assert_eq!(record.tokens.count("visit"), 1);
        assert_eq!(record.tokens.count("today"), 1);
    }

    #[test]
    fn test_symbol_only_line() {
        let message = b"Subject: x\n\n----------\n*** !!! ***\nreal text";
        let record = parser().parse(message);

        assert_eq!(record.tokens.count(TOKEN_SYMBOLS), 2);
        assert_eq!(record.tokens.count("real"), 1);
    }

    #[test]
    fn test_punctuation_is_removed() {
        let message = b"Subject: x\n\nhello, world! (free) $100 don't";
        let record = parser().parse(message);

        assert_eq!(record.tokens.count("hello"), 1);
        assert_eq!(record.tokens.count("world"), 1);
        assert_eq!(record.tokens.count("free"), 1);
        assert_eq!(record.tokens.count("100"), 1);
        assert_eq!(record.tokens.count("don't"), 1);
    }

    #[test]
    fn test_invalid_utf8_is_dropped() {
        let message = b"Subject: x\n\ncheap\xff\xfe pills";
        let record = parser().parse(message);

        assert_eq!(record.tokens.count("cheap"), 1);
        assert_eq!(record.tokens.count("pills"), 1);
    }

    #[test]
    fn test_crlf_line_endings() {
        let message = b"Date: Wed, 1 Feb 2006 23:01:44\r\n\r\nnight mail\r\n";
        let record = parser().parse(message);

        assert_eq!(record.hour.as_deref(), Some("23"));
        assert_eq!(record.tokens.count("night"), 1);
        assert_eq!(record.tokens.count("mail"), 1);
    }
}
