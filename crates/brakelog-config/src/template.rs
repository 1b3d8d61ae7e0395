use regex::{Captures, Regex};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Group(usize),
    Named(String),
    /// Text before the match
    PreMatch,
    /// Text after the match
    PostMatch,
    /// Highest-numbered group that participated in the match
    LastGroup,
}

/// Replacement template for the message rewrite.
///
/// Templates use backslash references: `\0`..`\9` and `\&` for groups and
/// the whole match, `\k<name>` for named groups, `` \` `` and `\'` for the
/// text before and after the match, `\+` for the last matched group and
/// `\\` for a literal backslash. Everything else is literal, including `$`.
/// Groups that did not participate expand to nothing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageTemplate {
    pieces: Vec<Piece>,
}

impl MessageTemplate {
    pub fn parse(template: &str) -> Self {
        let mut pieces = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '\\' {
                literal.push(c);
                continue;
            }

            let piece = match chars.peek().copied() {
                Some(d @ '0'..='9') => Some(Piece::Group(d as usize - '0' as usize)),
                Some('&') => Some(Piece::Group(0)),
                Some('`') => Some(Piece::PreMatch),
                Some('\'') => Some(Piece::PostMatch),
                Some('+') => Some(Piece::LastGroup),
                Some('\\') => {
                    chars.next();
                    literal.push('\\');
                    continue;
                }
                Some('k') => {
                    let rest: String = chars.clone().skip(1).collect();
                    match named_reference(&rest) {
                        Some(name) => {
                            // 'k', '<' and the name; '>' is consumed below
                            for _ in 0..name.chars().count() + 2 {
                                chars.next();
                            }
                            Some(Piece::Named(name.to_string()))
                        }
                        None => None,
                    }
                }
                _ => None,
            };

            match piece {
                Some(piece) => {
                    chars.next();
                    if !literal.is_empty() {
                        pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                    }
                    pieces.push(piece);
                }
                None => literal.push('\\'),
            }
        }

        if !literal.is_empty() {
            pieces.push(Piece::Literal(literal));
        }

        Self { pieces }
    }

    /// Replace the first match of `pattern` in `message`
    pub fn rewrite(&self, pattern: &Regex, message: &str) -> String {
        let Some(caps) = pattern.captures(message) else {
            return message.to_string();
        };
        let Some(whole) = caps.get(0) else {
            return message.to_string();
        };

        let mut out = String::with_capacity(message.len());
        out.push_str(&message[..whole.start()]);
        self.expand(&caps, message, whole.start(), whole.end(), &mut out);
        out.push_str(&message[whole.end()..]);
        out
    }

    fn expand(
        &self,
        caps: &Captures<'_>,
        message: &str,
        start: usize,
        end: usize,
        out: &mut String,
    ) {
        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => out.push_str(text),
                Piece::Group(n) => out.push_str(caps.get(*n).map_or("", |m| m.as_str())),
                Piece::Named(name) => out.push_str(caps.name(name).map_or("", |m| m.as_str())),
                Piece::PreMatch => out.push_str(&message[..start]),
                Piece::PostMatch => out.push_str(&message[end..]),
                Piece::LastGroup => out.push_str(
                    (1..caps.len())
                        .rev()
                        .find_map(|i| caps.get(i))
                        .map_or("", |m| m.as_str()),
                ),
            }
        }
    }
}

/// Name inside a leading `<name>`, if well formed
fn named_reference(rest: &str) -> Option<&str> {
    let inner = rest.strip_prefix('<')?;
    let end = inner.find('>')?;
    let name = &inner[..end];
    let valid = !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_');
    valid.then_some(name)
}
