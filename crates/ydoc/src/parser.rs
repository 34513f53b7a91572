//! lossless parser for block style yaml
//!
//! Turns text into [Documents]. The structure comes from the [saphyr_parser] event stream; the
//! text between events is sliced out of the source so that every byte of the input ends up in the
//! tree, mostly as the `prefix` of the node that follows it. Printing the result gives back the
//! input unchanged.
//!
//! Supported:
//! - multiple documents separated by `---`, optionally terminated by `...`
//! - block mappings with plain or quoted keys
//! - block sequences, including compact forms (`- key: value`, `- - item`)
//! - plain (also multi-line), quoted and block (`|`, `>`) scalars
//! - comments
//!
//! Flow collections (`[a, b]`, `{a: b}`) are kept as opaque plain scalars. Anchors, aliases, tags,
//! directives and complex keys are rejected with a [ParseError].
use crate::tree::{
    Document, DocumentEnd, Documents, Mapping, MappingEntry, Node, Scalar, ScalarStyle, Sequence,
    SequenceEntry,
};
use saphyr_parser::{Event, Parser as EventParser, ScalarStyle as EventStyle, ScanError, Span};
use std::path::Path;
use std::sync::Arc;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} (line {line}, column {column})")]
pub struct ParseError {
    message: String,
    /// 1-based
    line: usize,
    /// 1-based, in characters
    column: usize,
}

impl ParseError {
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }
}

impl From<ScanError> for ParseError {
    fn from(err: ScanError) -> Self {
        let marker = err.marker();
        ParseError {
            message: err.info().to_string(),
            line: marker.line(),
            column: marker.col() + 1,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("IO error")]
    IoError(#[from] std::io::Error),
    #[error("Unable to parse yaml file")]
    YamlParseFailed(#[from] ParseError),
}

/// Parse a yaml stream
///
/// Text without any document (empty or only comments) is kept as the stream suffix.
pub fn parse(text: &str) -> Result<Documents, ParseError> {
    let mut events = vec![];
    for result in EventParser::new_from_str(text) {
        events.push(result?);
    }

    let mut char_to_byte: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
    char_to_byte.push(text.len());

    let documents = TreeBuilder {
        src: text,
        events: events.into_iter(),
        char_to_byte,
        pos: 0,
    }
    .documents()?;

    // layouts the builder does not know would lose text
    let printed = documents.to_string();
    if printed != text {
        let mut at = printed
            .bytes()
            .zip(text.bytes())
            .position(|(printed, source)| printed != source)
            .unwrap_or(printed.len().min(text.len()));
        while !text.is_char_boundary(at) {
            at -= 1;
        }
        return Err(error_at(text, at, "unsupported yaml layout"));
    }

    Ok(documents)
}

pub fn load_file(file_path: &Path) -> Result<Documents, LoadError> {
    let file_path = file_path.canonicalize()?;
    tracing::info!(path=%file_path.display(), "loading file");

    let file_contents = std::fs::read_to_string(&file_path)?;
    Ok(parse(&file_contents)?)
}

impl std::str::FromStr for Documents {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// Builds the tree from the event stream
///
/// `pos` is the byte offset right after the last text that was put into the tree.
struct TreeBuilder<'a> {
    src: &'a str,
    events: std::vec::IntoIter<(Event<'a>, Span)>,
    /// char index (as in [saphyr_parser::Marker]) to byte index
    char_to_byte: Vec<usize>,
    pos: usize,
}

impl<'a> TreeBuilder<'a> {
    fn documents(mut self) -> Result<Documents, ParseError> {
        let Event::StreamStart = self.next_event()?.0 else {
            return Err(self.error(0, "expected start of stream"));
        };

        let mut documents = vec![];
        loop {
            match self.next_event()?.0 {
                Event::DocumentStart(explicit) => {
                    documents.push(Arc::new(self.document(explicit)?));
                }
                Event::StreamEnd => break,
                _ => return Err(self.error(self.pos, "expected a document")),
            }
        }

        let suffix = &self.src[self.pos..];
        Ok(Documents::new(documents).with_suffix(suffix))
    }

    fn document(&mut self, explicit: bool) -> Result<Document, ParseError> {
        let prefix = if explicit {
            let marker = self.next_token(self.pos);
            if !self.is_marker(marker, "---") {
                return Err(self.error(marker, "directives are not supported"));
            }
            let prefix = self.src[self.pos..marker].to_string();
            self.pos = marker + 3;
            prefix
        } else {
            String::new()
        };

        let block = self.node(None)?;

        let end = self.next_token(self.pos);
        let end_explicit = self.is_marker(end, "...");
        if !end_explicit && end < self.src.len() && !self.is_marker(end, "---") {
            return Err(self.error(end, "unexpected content"));
        }

        let end_prefix = self.src[self.pos..end].to_string();
        self.pos = if end_explicit { end + 3 } else { end };

        let Event::DocumentEnd = self.next_event()?.0 else {
            return Err(self.error(end, "unexpected content"));
        };

        Ok(Document::new(
            prefix,
            explicit,
            block,
            DocumentEnd::new(end_prefix, end_explicit),
        ))
    }

    /// Parse the node of the next event
    ///
    /// `parent` is the column of the key or `-` owning the node, `None` for the document root.
    fn node(&mut self, parent: Option<usize>) -> Result<Node, ParseError> {
        let (event, span) = self.next_event()?;
        self.node_from(event, span, parent)
    }

    fn node_from(
        &mut self,
        event: Event<'a>,
        span: Span,
        parent: Option<usize>,
    ) -> Result<Node, ParseError> {
        match event {
            Event::Scalar(value, style, anchor, tag) => {
                self.no_properties(anchor, tag.is_some())?;
                Ok(self.scalar(&value, style, span, parent)?.into())
            }
            Event::SequenceStart(anchor, tag) => {
                self.no_properties(anchor, tag.is_some())?;
                let start = self.next_token(self.pos);
                if self.byte(start) == Some(b'[') {
                    return Ok(self.flow(start)?.into());
                }
                Ok(self.sequence()?.into())
            }
            Event::MappingStart(anchor, tag) => {
                self.no_properties(anchor, tag.is_some())?;
                let start = self.next_token(self.pos);
                if self.byte(start) == Some(b'{') {
                    return Ok(self.flow(start)?.into());
                }
                Ok(self.mapping()?.into())
            }
            Event::Alias(_) => {
                Err(self.error(self.next_token(self.pos), "aliases are not supported"))
            }
            _ => Err(self.error(self.next_token(self.pos), "unexpected content")),
        }
    }

    fn mapping(&mut self) -> Result<Mapping, ParseError> {
        let mut entries: Vec<Arc<MappingEntry>> = vec![];

        loop {
            let (event, span) = self.next_event()?;
            let (value, style) = match event {
                Event::MappingEnd => break,
                Event::Scalar(value, style, anchor, tag) => {
                    self.no_properties(anchor, tag.is_some())?;
                    (value, style)
                }
                _ => {
                    let at = self.next_token(self.pos);
                    return Err(self.error(at, "complex keys are not supported"));
                }
            };

            let start = self.next_token(self.pos);
            if style == EventStyle::Plain && value.is_empty() {
                return Err(self.error(start, "empty keys are not supported"));
            }

            let prefix = self.src[self.pos..start].to_string();
            let column = self.column(start);
            self.pos = start;
            let key = self.scalar(&value, style, span, None)?;

            let colon = self.pos
                + self.src[self.pos..]
                    .bytes()
                    .take_while(|b| matches!(b, b' ' | b'\t'))
                    .count();
            if self.byte(colon) != Some(b':') {
                return Err(self.error(colon, "expected `:` after mapping key"));
            }
            let before_colon = self.src[self.pos..colon].to_string();
            self.pos = colon + 1;

            let value = self.node(Some(column))?;

            tracing::trace!(key = key.value(), "mapping entry");
            entries.push(Arc::new(MappingEntry::new(
                prefix,
                Arc::new(key),
                before_colon,
                value,
            )));
        }

        Ok(Mapping::new(String::new(), entries))
    }

    fn sequence(&mut self) -> Result<Sequence, ParseError> {
        let mut entries: Vec<Arc<SequenceEntry>> = vec![];

        loop {
            let (event, span) = self.next_event()?;
            if let Event::SequenceEnd = event {
                break;
            }

            let dash = self.next_token(self.pos);
            if self.byte(dash) != Some(b'-') {
                return Err(self.error(dash, "expected `-` in front of a sequence item"));
            }

            let prefix = self.src[self.pos..dash].to_string();
            let column = self.column(dash);
            self.pos = dash + 1;
            let block = self.node_from(event, span, Some(column))?;

            entries.push(Arc::new(SequenceEntry::new(prefix, block)));
        }

        Ok(Sequence::new(String::new(), entries))
    }

    /// A scalar starting at the next token
    ///
    /// Implicit nulls (`key:` with nothing behind) become an empty scalar that takes no text, so
    /// the whitespace goes to whatever follows.
    fn scalar(
        &mut self,
        value: &str,
        style: EventStyle,
        span: Span,
        parent: Option<usize>,
    ) -> Result<Scalar, ParseError> {
        if style == EventStyle::Plain && value.is_empty() {
            return Ok(Scalar::empty());
        }

        let src = self.src;
        let start = self.next_token(self.pos);
        let prefix = src[self.pos..start].to_string();

        let (style, raw, end) = match style {
            EventStyle::SingleQuoted | EventStyle::DoubleQuoted => {
                let end = self.quoted_end(start)?;
                let style = if style == EventStyle::SingleQuoted {
                    ScalarStyle::SingleQuoted
                } else {
                    ScalarStyle::DoubleQuoted
                };
                (style, &src[start + 1..end - 1], end)
            }
            EventStyle::Literal | EventStyle::Folded => {
                let end = self.block_scalar_end(start, parent);
                let style = if style == EventStyle::Literal {
                    ScalarStyle::Literal
                } else {
                    ScalarStyle::Folded
                };
                (style, &src[start..end], end)
            }
            _ => {
                let end = self.to_byte(span.end.index()).max(start);
                let raw = src[start..end].trim_end();
                (ScalarStyle::Plain, raw, start + raw.len())
            }
        };

        self.pos = end;
        Ok(Scalar::new(prefix, style, raw.to_string()))
    }

    /// A flow collection, kept as one plain scalar
    fn flow(&mut self, start: usize) -> Result<Scalar, ParseError> {
        let end = self.flow_end(start)?;

        // skip the events of the collection
        let mut depth = 1;
        while depth > 0 {
            match self.next_event()?.0 {
                Event::SequenceStart(..) | Event::MappingStart(..) => depth += 1,
                Event::SequenceEnd | Event::MappingEnd => depth -= 1,
                _ => {}
            }
        }

        let prefix = self.src[self.pos..start].to_string();
        let raw = self.src[start..end].to_string();
        self.pos = end;
        Ok(Scalar::new(prefix, ScalarStyle::Plain, raw))
    }

    fn no_properties(&self, anchor: usize, tagged: bool) -> Result<(), ParseError> {
        if anchor > 0 || tagged {
            return Err(self.error(
                self.next_token(self.pos),
                "anchors and tags are not supported",
            ));
        }
        Ok(())
    }

    fn next_event(&mut self) -> Result<(Event<'a>, Span), ParseError> {
        self.events
            .next()
            .ok_or_else(|| self.error(self.src.len(), "unexpected end of input"))
    }

    /// Position after the closing bracket of the flow collection starting at `start`
    fn flow_end(&self, start: usize) -> Result<usize, ParseError> {
        let open = self.src.as_bytes()[start];
        let close = if open == b'{' { b'}' } else { b']' };

        let mut depth = 0;
        let mut in_single = false;
        let mut in_double = false;
        for (i, byte) in self.src.bytes().enumerate().skip(start) {
            match byte {
                b'\'' if !in_double => in_single = !in_single,
                b'"' if !in_single => in_double = !in_double,
                b if b == open && !in_single && !in_double => depth += 1,
                b if b == close && !in_single && !in_double => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(i + 1);
                    }
                }
                _ => {}
            }
        }

        Err(self.error(start, "unterminated flow collection"))
    }

    /// Position right after the closing quote of the quoted scalar starting at `start`
    fn quoted_end(&self, start: usize) -> Result<usize, ParseError> {
        let bytes = self.src.as_bytes();
        let quote = bytes[start];
        if !matches!(quote, b'"' | b'\'') {
            return Err(self.error(start, "expected a quoted scalar"));
        }

        let mut i = start + 1;
        while i < bytes.len() {
            match bytes[i] {
                b'\\' if quote == b'"' => i += 2,
                b'\'' if quote == b'\'' && bytes.get(i + 1) == Some(&b'\'') => i += 2,
                c if c == quote => return Ok(i + 1),
                _ => i += 1,
            }
        }

        Err(self.error(start, "unterminated quoted scalar"))
    }

    /// End of a `|`/`>` scalar: the header line and every following line indented beyond the
    /// parent, trailing blank lines excluded
    fn block_scalar_end(&self, start: usize, parent: Option<usize>) -> usize {
        let mut end = self.end_of_line(start);
        let mut line_end = end;

        while line_end < self.src.len() {
            let line_start = line_end + 1;
            line_end = self.end_of_line(line_start);
            let line = &self.src[line_start..line_end];

            if line.trim().is_empty() {
                continue;
            }

            if self.is_marker(line_start, "---") || self.is_marker(line_start, "...") {
                break;
            }

            let indent = line.chars().take_while(|c| *c == ' ').count();
            if parent.is_some_and(|parent| indent <= parent) {
                break;
            }

            end = line_end;
        }

        end
    }

    /// Skips whitespace and comments, returns the position of the next token
    fn next_token(&self, mut pos: usize) -> usize {
        while let Some(byte) = self.byte(pos) {
            match byte {
                b' ' | b'\t' | b'\r' | b'\n' => pos += 1,
                b'#' => pos = self.end_of_line(pos),
                _ => break,
            }
        }
        pos
    }

    /// `---` or `...` at the start of a line
    fn is_marker(&self, pos: usize, marker: &str) -> bool {
        let line_start = pos == 0 || self.byte(pos - 1) == Some(b'\n');
        line_start
            && self.src[pos..].starts_with(marker)
            && matches!(
                self.byte(pos + 3),
                None | Some(b' ' | b'\t' | b'\r' | b'\n')
            )
    }

    fn end_of_line(&self, pos: usize) -> usize {
        self.src[pos..]
            .find('\n')
            .map_or(self.src.len(), |offset| pos + offset)
    }

    fn column(&self, pos: usize) -> usize {
        let line_start = self.src[..pos].rfind('\n').map_or(0, |i| i + 1);
        self.src[line_start..pos].chars().count()
    }

    fn to_byte(&self, char_index: usize) -> usize {
        self.char_to_byte
            .get(char_index)
            .copied()
            .unwrap_or(self.src.len())
    }

    fn byte(&self, pos: usize) -> Option<u8> {
        self.src.as_bytes().get(pos).copied()
    }

    fn error(&self, pos: usize, message: &str) -> ParseError {
        error_at(self.src, pos, message)
    }
}

fn error_at(src: &str, pos: usize, message: &str) -> ParseError {
    let line_start = src[..pos].rfind('\n').map_or(0, |i| i + 1);
    ParseError {
        message: message.to_string(),
        line: src[..pos].matches('\n').count() + 1,
        column: src[line_start..pos].chars().count() + 1,
    }
}
