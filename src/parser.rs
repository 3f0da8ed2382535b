//! PubMed efetch XML parser.
//!
//! Streams the document with quick-xml and keeps only what the report needs:
//! PMID, title, publication date fragment and the author list with each
//! author's first affiliation. Missing elements resolve to empty values; only
//! a document that is not well-formed XML is an error.

use crate::error::{FetchError, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

/// One author as listed in the record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthorEntry {
    /// "ForeName LastName", trimmed. Empty when both parts are missing.
    pub name: String,
    /// First affiliation listed for the author
    pub affiliation: Option<String>,
}

/// Fields extracted from one `PubmedArticle`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PubmedRecord {
    pub pmid: String,
    pub title: String,
    /// Four-digit year, else month, else empty
    pub pub_date: String,
    pub authors: Vec<AuthorEntry>,
}

/// Element whose text is currently being collected
#[derive(Debug, Clone, Copy, PartialEq)]
enum Field {
    Pmid,
    Title,
    Year,
    Month,
    LastName,
    ForeName,
    Affiliation,
}

#[derive(Default)]
struct AuthorBuilder {
    depth: usize,
    last_name: Option<String>,
    fore_name: Option<String>,
    affiliation: Option<String>,
}

impl AuthorBuilder {
    fn build(self) -> AuthorEntry {
        let name = format!(
            "{} {}",
            self.fore_name.unwrap_or_default(),
            self.last_name.unwrap_or_default()
        )
        .trim()
        .to_string();

        let affiliation = self
            .affiliation
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty());

        AuthorEntry { name, affiliation }
    }
}

#[derive(Default)]
struct RecordBuilder {
    pmid: Option<String>,
    title: Option<String>,
    year: Option<String>,
    month: Option<String>,
    authors: Vec<AuthorEntry>,
    author: Option<AuthorBuilder>,
    /// Field being captured and the depth of the element that opened it
    capture: Option<(Field, usize)>,
}

impl RecordBuilder {
    /// Decide whether `name`, opening at `depth` below `parent`, starts a
    /// field we collect. Only the first occurrence of each field counts.
    fn on_start(&mut self, name: &[u8], parent: Option<&[u8]>, depth: usize) {
        if self.capture.is_some() {
            // Inline markup inside a captured element, e.g. <i> in a title
            return;
        }

        if let Some(author) = self.author.as_mut() {
            let field = match name {
                b"LastName" if author.last_name.is_none() => {
                    author.last_name = Some(String::new());
                    Field::LastName
                }
                b"ForeName" if author.fore_name.is_none() => {
                    author.fore_name = Some(String::new());
                    Field::ForeName
                }
                b"Affiliation" if author.affiliation.is_none() => {
                    author.affiliation = Some(String::new());
                    Field::Affiliation
                }
                _ => return,
            };
            self.capture = Some((field, depth));
            return;
        }

        let field = match (name, parent) {
            (b"Author", _) => {
                self.author = Some(AuthorBuilder {
                    depth,
                    ..Default::default()
                });
                return;
            }
            (b"PMID", _) if self.pmid.is_none() => {
                self.pmid = Some(String::new());
                Field::Pmid
            }
            (b"ArticleTitle", _) if self.title.is_none() => {
                self.title = Some(String::new());
                Field::Title
            }
            (b"Year", Some(b"PubDate")) if self.year.is_none() => {
                self.year = Some(String::new());
                Field::Year
            }
            (b"Month", Some(b"PubDate")) if self.month.is_none() => {
                self.month = Some(String::new());
                Field::Month
            }
            _ => return,
        };
        self.capture = Some((field, depth));
    }

    fn on_text(&mut self, text: &str) {
        let Some((field, _)) = self.capture else {
            return;
        };

        let target = match field {
            Field::Pmid => self.pmid.as_mut(),
            Field::Title => self.title.as_mut(),
            Field::Year => self.year.as_mut(),
            Field::Month => self.month.as_mut(),
            Field::LastName => self.author.as_mut().and_then(|a| a.last_name.as_mut()),
            Field::ForeName => self.author.as_mut().and_then(|a| a.fore_name.as_mut()),
            Field::Affiliation => self.author.as_mut().and_then(|a| a.affiliation.as_mut()),
        };

        if let Some(target) = target {
            target.push_str(text);
        }
    }

    /// Called after the element at `depth` has closed.
    fn on_end(&mut self, depth: usize) {
        if matches!(self.capture, Some((_, d)) if d == depth) {
            self.capture = None;
        }

        if self.author.as_ref().is_some_and(|a| a.depth == depth) {
            if let Some(author) = self.author.take() {
                self.authors.push(author.build());
            }
        }
    }

    fn build(self) -> PubmedRecord {
        let non_empty = |s: Option<String>| {
            s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        };

        let pub_date = non_empty(self.year)
            .or_else(|| non_empty(self.month))
            .unwrap_or_default();

        PubmedRecord {
            pmid: non_empty(self.pmid).unwrap_or_default(),
            title: non_empty(self.title).unwrap_or_default(),
            pub_date,
            authors: self.authors,
        }
    }
}

/// Parse an efetch response into records, in document order.
///
/// # Errors
///
/// Returns [`FetchError::MalformedResponse`] when the body is not well-formed
/// XML: mismatched or unclosed tags, or no root element at all.
pub fn parse_records(xml: &str) -> Result<Vec<PubmedRecord>> {
    let mut reader = Reader::from_str(xml);

    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut records = Vec::new();
    let mut current: Option<RecordBuilder> = None;
    let mut saw_root = false;

    loop {
        let event = reader.read_event().map_err(|e| {
            FetchError::MalformedResponse(format!(
                "XML error at position {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;

        match event {
            Event::Start(e) => {
                saw_root = true;
                let name = e.name().as_ref().to_vec();
                let depth = stack.len();

                if name == b"PubmedArticle" {
                    current = Some(RecordBuilder::default());
                } else if let Some(record) = current.as_mut() {
                    record.on_start(&name, stack.last().map(Vec::as_slice), depth);
                }
                stack.push(name);
            }
            Event::Empty(_) => {
                saw_root = true;
            }
            Event::Text(e) => {
                if let Some(record) = current.as_mut() {
                    let text = match e.unescape() {
                        Ok(text) => text.into_owned(),
                        Err(err) => {
                            debug!(error = %err, "Keeping raw text for unknown entity");
                            String::from_utf8_lossy(&e).into_owned()
                        }
                    };
                    record.on_text(&text);
                }
            }
            Event::CData(e) => {
                if let Some(record) = current.as_mut() {
                    record.on_text(&String::from_utf8_lossy(&e));
                }
            }
            Event::End(e) => {
                stack.pop();
                let depth = stack.len();

                if e.name().as_ref() == b"PubmedArticle" {
                    if let Some(record) = current.take() {
                        records.push(record.build());
                    }
                } else if let Some(record) = current.as_mut() {
                    record.on_end(depth);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(FetchError::MalformedResponse(format!(
            "Document ended inside <{}>",
            String::from_utf8_lossy(open)
        )));
    }
    if !saw_root {
        return Err(FetchError::MalformedResponse(
            "Document has no root element".to_string(),
        ));
    }

    debug!(count = records.len(), "Parsed PubMed records");
    Ok(records)
}
