//! printing trees back to text
//!
//! Printing is [std::fmt::Display]. Markers are never printed. For a parsed tree the output is the
//! exact input text.
use crate::tree::{
    Document, Documents, Mapping, MappingEntry, Node, Scalar, ScalarStyle, Sequence,
    SequenceEntry,
};
use std::fmt::{Display, Formatter, Result};

impl Display for Scalar {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(self.prefix())?;
        match self.style() {
            ScalarStyle::SingleQuoted => write!(f, "'{}'", self.value()),
            ScalarStyle::DoubleQuoted => write!(f, "\"{}\"", self.value()),
            ScalarStyle::Plain | ScalarStyle::Literal | ScalarStyle::Folded => {
                f.write_str(self.value())
            }
        }
    }
}

impl Display for MappingEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(
            f,
            "{}{}{}:{}",
            self.prefix(),
            self.key(),
            self.before_colon(),
            self.value()
        )
    }
}

impl Display for Mapping {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(self.prefix())?;
        for entry in self.entries() {
            entry.fmt(f)?;
        }
        Ok(())
    }
}

impl Display for SequenceEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}-{}", self.prefix(), self.block())
    }
}

impl Display for Sequence {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(self.prefix())?;
        for entry in self.entries() {
            entry.fmt(f)?;
        }
        Ok(())
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Node::Scalar(scalar) => scalar.fmt(f),
            Node::Mapping(mapping) => mapping.fmt(f),
            Node::Sequence(sequence) => sequence.fmt(f),
        }
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(self.prefix())?;
        if !self.explicit() {
            self.block().fmt(f)?;
        } else {
            // `---` has to be followed by whitespace, documents built from a non-explicit one may
            // start with content right away
            let block = self.block().to_string();
            let rest = if block.is_empty() {
                self.end().prefix()
            } else {
                block.as_str()
            };
            let separated =
                rest.starts_with(char::is_whitespace) || (rest.is_empty() && !self.end().explicit());

            f.write_str("---")?;
            if !separated {
                f.write_str("\n")?;
            }
            f.write_str(&block)?;
        }
        f.write_str(self.end().prefix())?;
        if self.end().explicit() {
            f.write_str("...")?;
        }
        Ok(())
    }
}

impl Display for Documents {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let mut previous: Option<&Document> = None;
        for document in self.documents() {
            // composed streams may place `---` right after a document that does not end its line
            if let Some(previous) = previous {
                if document.explicit()
                    && !previous.ends_line()
                    && !document.prefix().starts_with('\n')
                {
                    f.write_str("\n")?;
                }
            }

            document.fmt(f)?;
            previous = Some(document);
        }
        f.write_str(self.suffix())
    }
}
