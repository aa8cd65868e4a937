//! Array text format.
//!
//! ```text
//! '{' elements '}'                 one dimension
//! '{' '{' .. '}' ',' '{' .. '}' '}' more dimensions
//! '[' lo ':' hi ']' .. '=' '{' .. '}' explicit bounds
//! ```
use bytes::{BufMut, BytesMut};

use super::{ArrayDimension, MAX_DIMENSIONS};
use crate::{postgres::Oid, types::WireError};

/// Parsed array literal.
pub(super) struct Literal {
    pub dimensions: Vec<ArrayDimension>,
    /// Unescaped elements, [`None`] for `NULL`.
    pub elements: Vec<Option<Vec<u8>>>,
}

enum Node {
    List(Vec<Node>),
    Element(Option<Vec<u8>>),
}

struct Parser<'a> {
    oid: Oid,
    src: &'a [u8],
    pos: usize,
}

/// Parse an array literal, dimension lengths are inferred from nesting.
pub(super) fn parse(oid: Oid, src: &[u8]) -> Result<Literal, WireError> {
    let mut p = Parser { oid, src, pos: 0 };

    p.skip_whitespace();
    let bounds = match p.peek() {
        Some(b'[') => Some(p.bounds()?),
        _ => None,
    };

    p.skip_whitespace();
    if !p.eat(b'{') {
        return Err(p.error("array must start with `{`"));
    }
    let root = Node::List(p.list(1)?);
    p.skip_whitespace();
    if p.pos != p.src.len() {
        return Err(p.error("unexpected character after array"));
    }

    // shape of the first path, every other path must agree
    let mut lengths = vec![];
    let mut node = &root;
    while let Node::List(items) = node {
        lengths.push(items.len());
        match items.first() {
            Some(first) => node = first,
            None => break,
        }
    }

    let mut elements = vec![];
    p.flatten(root, 0, &lengths, &mut elements)?;

    if let Some(bounds) = &bounds {
        let matches = bounds.len() == lengths.len()
            && bounds.iter().zip(&lengths).all(|(&(lo, hi), &len)| {
                i64::from(hi) - i64::from(lo) + 1 == len as i64
            });
        if !matches {
            return Err(p.error("dimension bounds do not match array"));
        }
    }

    if elements.is_empty() {
        return Ok(Literal { dimensions: vec![], elements });
    }

    let dimensions = lengths
        .iter()
        .enumerate()
        .map(|(i, &len)| ArrayDimension {
            length: len as i32,
            lower_bound: bounds.as_ref().map_or(1, |b| b[i].0),
        })
        .collect();

    Ok(Literal { dimensions, elements })
}

impl Parser<'_> {
    fn error(&self, reason: &'static str) -> WireError {
        WireError::malformed(self.oid, self.src.len(), reason)
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    /// `[lo:hi]` or `[hi]` for each dimension, followed by `=`.
    fn bounds(&mut self) -> Result<Vec<(i32, i32)>, WireError> {
        let mut bounds = vec![];
        while self.eat(b'[') {
            let first = self.int()?;
            let bound = match self.eat(b':') {
                true => (first, self.int()?),
                false => (1, first),
            };
            if !self.eat(b']') {
                return Err(self.error("unterminated dimension bound"));
            }
            bounds.push(bound);
            if bounds.len() > MAX_DIMENSIONS {
                return Err(self.error("too many dimensions"));
            }
        }
        self.skip_whitespace();
        if !self.eat(b'=') {
            return Err(self.error("expected `=` after dimension bounds"));
        }
        Ok(bounds)
    }

    fn int(&mut self) -> Result<i32, WireError> {
        let start = self.pos;
        if matches!(self.peek(), Some(b'-' | b'+')) {
            self.pos += 1;
        }
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        std::str::from_utf8(&self.src[start..self.pos])
            .ok()
            .and_then(|int| int.parse().ok())
            .ok_or_else(|| self.error("invalid dimension bound"))
    }

    /// Items of a brace group, the opening brace is already consumed.
    fn list(&mut self, depth: usize) -> Result<Vec<Node>, WireError> {
        if depth > MAX_DIMENSIONS {
            return Err(self.error("too many dimensions"));
        }

        let mut items = vec![];
        self.skip_whitespace();
        if self.eat(b'}') {
            return Ok(items);
        }

        loop {
            self.skip_whitespace();
            let item = match self.peek() {
                Some(b'{') => {
                    self.pos += 1;
                    Node::List(self.list(depth + 1)?)
                }
                Some(b'"') => {
                    self.pos += 1;
                    Node::Element(Some(self.quoted()?))
                }
                Some(_) => Node::Element(self.bare()?),
                None => return Err(self.error("unterminated array")),
            };
            items.push(item);

            self.skip_whitespace();
            match self.next() {
                Some(b',') => continue,
                Some(b'}') => return Ok(items),
                Some(_) => return Err(self.error("expected `,` or `}`")),
                None => return Err(self.error("unterminated array")),
            }
        }
    }

    /// Quoted element, the opening quote is already consumed.
    fn quoted(&mut self) -> Result<Vec<u8>, WireError> {
        let mut out = vec![];
        loop {
            match self.next() {
                Some(b'"') => return Ok(out),
                Some(b'\\') => match self.next() {
                    Some(b) => out.push(b),
                    None => return Err(self.error("unterminated quoted element")),
                },
                Some(b) => out.push(b),
                None => return Err(self.error("unterminated quoted element")),
            }
        }
    }

    /// Unquoted element, surrounding whitespace is not part of the value.
    fn bare(&mut self) -> Result<Option<Vec<u8>>, WireError> {
        let mut out = vec![];
        let mut escaped = false;
        // length of `out` without trailing unescaped whitespace
        let mut end = 0;
        while let Some(b) = self.peek() {
            match b {
                b',' | b'}' => break,
                b'{' | b'"' => return Err(self.error("unexpected character in unquoted element")),
                b'\\' => {
                    self.pos += 1;
                    let Some(b) = self.next() else {
                        return Err(self.error("unterminated escape"));
                    };
                    escaped = true;
                    out.push(b);
                    end = out.len();
                }
                b => {
                    self.pos += 1;
                    out.push(b);
                    if !b.is_ascii_whitespace() {
                        end = out.len();
                    }
                }
            }
        }
        out.truncate(end);

        if out.is_empty() {
            return Err(self.error("empty unquoted element"));
        }
        if !escaped && out.eq_ignore_ascii_case(b"NULL") {
            return Ok(None);
        }
        Ok(Some(out))
    }

    /// Check every node against the inferred lengths and collect elements in row-major order.
    fn flatten(
        &self,
        node: Node,
        depth: usize,
        lengths: &[usize],
        out: &mut Vec<Option<Vec<u8>>>,
    ) -> Result<(), WireError> {
        match (node, lengths.get(depth)) {
            (Node::List(items), Some(&len)) => {
                if items.len() != len {
                    return Err(self.error("sub-arrays must have matching dimensions"));
                }
                for item in items {
                    self.flatten(item, depth + 1, lengths, out)?;
                }
                Ok(())
            }
            (Node::Element(element), None) => {
                out.push(element);
                Ok(())
            }
            _ => Err(self.error("mixed elements and sub-arrays at the same level")),
        }
    }
}

/// Whether element text must be quoted.
pub(super) fn needs_quote(element: &[u8]) -> bool {
    element.is_empty()
        || element.eq_ignore_ascii_case(b"NULL")
        || element
            .iter()
            .any(|b| matches!(b, b'{' | b'}' | b',' | b'"' | b'\\') || b.is_ascii_whitespace())
}

/// Write element text, quoted and escaped when needed.
pub(super) fn put_element(buf: &mut BytesMut, element: &[u8]) {
    if !needs_quote(element) {
        buf.put_slice(element);
        return;
    }
    buf.put_u8(b'"');
    for &b in element {
        if matches!(b, b'"' | b'\\') {
            buf.put_u8(b'\\');
        }
        buf.put_u8(b);
    }
    buf.put_u8(b'"');
}
