//! Raw commit records turned into reusable templates.
//!
//! A commit object is a short header block (`tree`, `parent`, `author`,
//! `committer`, ...) followed by an empty line and the message. The two
//! identity lines carry `<name> <email> <timestamp> <timezone>`. The template
//! keeps every byte of the original except the two timestamp numerals, so a
//! record can be re-rendered with new timestamps and hashed the same way git
//! names the object.

use crate::error::{Result, WishError};
use sha1::{Digest, Sha1};
use std::fmt;

pub const AUTHOR_PLACEHOLDER: &str = "{author_timestamp}";
pub const COMMITTER_PLACEHOLDER: &str = "{committer_timestamp}";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(Vec<u8>),
    AuthorTimestamp,
    CommitterTimestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Author,
    Committer,
}

impl Field {
    fn keyword(self) -> &'static [u8] {
        match self {
            Field::Author => b"author ",
            Field::Committer => b"committer ",
        }
    }

    fn piece(self) -> Piece {
        match self {
            Field::Author => Piece::AuthorTimestamp,
            Field::Committer => Piece::CommitterTimestamp,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Author => write!(f, "author"),
            Field::Committer => write!(f, "committer"),
        }
    }
}

/// Location and value of a timestamp numeral inside one header line
#[derive(Debug, Clone, PartialEq, Eq)]
struct Stamp {
    start: usize,
    end: usize,
    seconds: i64,
    timezone: String,
}

impl Stamp {
    /// Finds the first run of digits after the identity. When the line has an
    /// `<email>` part the scan starts behind its closing `>`, so digits in a
    /// name or address are skipped.
    fn locate(field: Field, line: &[u8]) -> Result<Self> {
        let from = line
            .iter()
            .rposition(|&b| b == b'>')
            .map(|i| i + 1)
            .unwrap_or(field.keyword().len());

        let start = line[from..]
            .iter()
            .position(u8::is_ascii_digit)
            .map(|i| from + i)
            .ok_or_else(|| WishError::MalformedInput {
                reason: format!("{} line has no timestamp", field),
            })?;
        let end = line[start..]
            .iter()
            .position(|b| !b.is_ascii_digit())
            .map(|i| start + i)
            .unwrap_or(line.len());

        let digits = String::from_utf8_lossy(&line[start..end]);
        let seconds = digits.parse::<i64>().map_err(|e| WishError::MalformedInput {
            reason: format!("{} timestamp {} is not usable: {}", field, digits, e),
        })?;

        let timezone = String::from_utf8_lossy(&line[end..])
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            start,
            end,
            seconds,
            timezone,
        })
    }
}

/// A commit record whose author and committer timestamps can be swapped out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    original: Vec<u8>,
    template: Vec<Piece>,
    original_author_timestamp: i64,
    original_committer_timestamp: i64,
    author_timezone: String,
    committer_timezone: String,
    pub author_timestamp: i64,
    pub committer_timestamp: i64,
}

impl CommitRecord {
    /// Builds the template and extracts the original timestamps.
    ///
    /// Only header lines (everything before the first empty line) are
    /// inspected, and only the first line starting with `author ` and the
    /// first starting with `committer ` are templated.
    pub fn parse(raw: impl Into<Vec<u8>>) -> Result<Self> {
        let original = raw.into();
        let mut template = Vec::new();
        let mut literal = Vec::new();
        let mut author: Option<Stamp> = None;
        let mut committer: Option<Stamp> = None;
        let mut in_header = true;

        for line in original.split_inclusive(|&b| b == b'\n') {
            let content = line.strip_suffix(b"\n").unwrap_or(line);
            if content.is_empty() {
                in_header = false;
            }

            let field = if !in_header {
                None
            } else if author.is_none() && content.starts_with(Field::Author.keyword()) {
                Some(Field::Author)
            } else if committer.is_none() && content.starts_with(Field::Committer.keyword()) {
                Some(Field::Committer)
            } else {
                None
            };

            let Some(field) = field else {
                literal.extend_from_slice(line);
                continue;
            };

            let stamp = Stamp::locate(field, content)?;
            literal.extend_from_slice(&line[..stamp.start]);
            template.push(Piece::Literal(std::mem::take(&mut literal)));
            template.push(field.piece());
            literal.extend_from_slice(&line[stamp.end..]);

            match field {
                Field::Author => author = Some(stamp),
                Field::Committer => committer = Some(stamp),
            }
        }

        if !literal.is_empty() {
            template.push(Piece::Literal(literal));
        }

        let author = author.ok_or_else(|| WishError::MalformedInput {
            reason: "no author line".to_string(),
        })?;
        let committer = committer.ok_or_else(|| WishError::MalformedInput {
            reason: "no committer line".to_string(),
        })?;

        Ok(Self {
            original,
            template,
            original_author_timestamp: author.seconds,
            original_committer_timestamp: committer.seconds,
            author_timezone: author.timezone,
            committer_timezone: committer.timezone,
            author_timestamp: author.seconds,
            committer_timestamp: committer.seconds,
        })
    }

    pub fn original(&self) -> &[u8] {
        &self.original
    }

    /// Author and committer timestamps as found in the original record
    pub fn original_timestamps(&self) -> (i64, i64) {
        (
            self.original_author_timestamp,
            self.original_committer_timestamp,
        )
    }

    pub fn author_timezone(&self) -> &str {
        &self.author_timezone
    }

    pub fn committer_timezone(&self) -> &str {
        &self.committer_timezone
    }

    pub fn set_timestamps(&mut self, author: i64, committer: i64) {
        self.author_timestamp = author;
        self.committer_timestamp = committer;
    }

    /// The template with `{author_timestamp}` and `{committer_timestamp}`
    /// placeholders in place of the numerals.
    pub fn template_text(&self) -> String {
        let mut text = String::new();
        for piece in &self.template {
            match piece {
                Piece::Literal(bytes) => text.push_str(&String::from_utf8_lossy(bytes)),
                Piece::AuthorTimestamp => text.push_str(AUTHOR_PLACEHOLDER),
                Piece::CommitterTimestamp => text.push_str(COMMITTER_PLACEHOLDER),
            }
        }
        text
    }

    /// Renders the record with its current timestamps
    pub fn render(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.original.len() + 8);
        self.render_into(&mut buf);
        buf
    }

    pub fn render_into(&self, buf: &mut Vec<u8>) {
        self.render_with(self.author_timestamp, self.committer_timestamp, buf);
    }

    /// Renders arbitrary timestamps into `buf` without touching the record.
    pub fn render_with(&self, author: i64, committer: i64, buf: &mut Vec<u8>) {
        buf.clear();
        for piece in &self.template {
            match piece {
                Piece::Literal(bytes) => buf.extend_from_slice(bytes),
                Piece::AuthorTimestamp => buf.extend_from_slice(author.to_string().as_bytes()),
                Piece::CommitterTimestamp => {
                    buf.extend_from_slice(committer.to_string().as_bytes())
                }
            }
        }
    }

    /// Object id of the record rendered with its current timestamps
    pub fn digest(&self) -> String {
        object_id(&self.render())
    }
}

impl fmt::Display for CommitRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.render()))
    }
}

/// Git object id of a commit body: SHA-1 over `commit <len>\0<body>`, lowercase hex.
pub fn object_id(body: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(format!("commit {}\0", body.len()).as_bytes());
    hasher.update(body);
    format!("{:x}", hasher.finalize())
}
