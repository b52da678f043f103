//! Markdown document tree built from the pulldown-cmark event stream

use lazy_static::lazy_static;
use pulldown_cmark::{Alignment, CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag};
use regex::Regex;

lazy_static! {
    /// Language identifier at the start of a fence info string
    static ref FENCE_LANG: Regex = Regex::new(r"^\w+").unwrap();
}

/// A node of a parsed Markdown document
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Heading {
        level: u8,
        children: Vec<Node>,
    },
    Paragraph(Vec<Node>),
    /// `start` is set for ordered lists
    List {
        start: Option<u64>,
        items: Vec<Node>,
    },
    ListItem(Vec<Node>),
    TaskMarker(bool),
    BlockQuote(Vec<Node>),
    CodeBlock {
        lang: Option<String>,
        code: String,
    },
    InlineCode(String),
    Link {
        href: String,
        title: String,
        children: Vec<Node>,
    },
    Image {
        src: String,
        alt: String,
        title: String,
    },
    Emphasis(Vec<Node>),
    Strong(Vec<Node>),
    Strikethrough(Vec<Node>),
    Table {
        alignments: Vec<Alignment>,
        children: Vec<Node>,
    },
    TableHead(Vec<Node>),
    TableRow(Vec<Node>),
    TableCell(Vec<Node>),
    FootnoteDefinition {
        label: String,
        children: Vec<Node>,
    },
    FootnoteReference(String),
    /// Raw HTML found in the source; rendered as text
    Html(String),
    Text(String),
    SoftBreak,
    HardBreak,
    Rule,
}

impl Node {
    /// Concatenated text content, markup stripped
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(text) | Node::InlineCode(text) | Node::Html(text) => out.push_str(text),
            Node::CodeBlock { code, .. } => out.push_str(code),
            Node::Image { alt, .. } => out.push_str(alt),
            Node::SoftBreak | Node::HardBreak => out.push(' '),
            Node::Heading { children, .. }
            | Node::List {
                items: children, ..
            }
            | Node::Link { children, .. }
            | Node::Table { children, .. }
            | Node::FootnoteDefinition { children, .. }
            | Node::Paragraph(children)
            | Node::ListItem(children)
            | Node::BlockQuote(children)
            | Node::Emphasis(children)
            | Node::Strong(children)
            | Node::Strikethrough(children)
            | Node::TableHead(children)
            | Node::TableRow(children)
            | Node::TableCell(children) => {
                for child in children {
                    child.collect_text(out);
                }
            }
            Node::TaskMarker(_) | Node::FootnoteReference(_) | Node::Rule => {}
        }
    }
}

/// Parser options: CommonMark plus the GitHub-flavored extensions
pub fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
}

/// Parse Markdown into a list of top-level nodes
pub fn parse(markdown: &str) -> Vec<Node> {
    let parser = Parser::new_ext(markdown, options());

    // Root frame collects the top-level nodes
    let mut stack: Vec<(Frame, Vec<Node>)> = vec![(Frame::Transparent, Vec::new())];

    for event in parser {
        let leaf = match event {
            Event::Start(tag) => {
                stack.push((Frame::open(tag), Vec::new()));
                continue;
            }
            Event::End(_) => {
                if stack.len() > 1 {
                    if let Some((frame, children)) = stack.pop() {
                        let closed = frame.close(children);
                        if let Some((_, parent)) = stack.last_mut() {
                            parent.extend(closed);
                        }
                    }
                }
                continue;
            }
            Event::Text(text) => Node::Text(text.into_string()),
            Event::Code(code) => Node::InlineCode(code.into_string()),
            Event::Html(html) | Event::InlineHtml(html) => Node::Html(html.into_string()),
            Event::FootnoteReference(label) => Node::FootnoteReference(label.into_string()),
            Event::SoftBreak => Node::SoftBreak,
            Event::HardBreak => Node::HardBreak,
            Event::Rule => Node::Rule,
            Event::TaskListMarker(checked) => Node::TaskMarker(checked),
            _ => continue,
        };

        if let Some((_, children)) = stack.last_mut() {
            children.push(leaf);
        }
    }

    // Unbalanced input cannot come out of pulldown-cmark, but fold any
    // leftover frames so no content is dropped.
    while stack.len() > 1 {
        if let Some((frame, children)) = stack.pop() {
            let closed = frame.close(children);
            if let Some((_, parent)) = stack.last_mut() {
                parent.extend(closed);
            }
        }
    }

    stack.pop().map(|(_, nodes)| nodes).unwrap_or_default()
}

/// Language declared by a fence info string (`go`, `rust,ignore`, `ts title=x`)
pub fn fence_language(info: &str) -> Option<String> {
    FENCE_LANG
        .find(info.trim())
        .map(|m| m.as_str().to_string())
}

/// An open container while the event stream is consumed
enum Frame {
    Heading(u8),
    Paragraph,
    List(Option<u64>),
    Item,
    BlockQuote,
    CodeBlock(Option<String>),
    Link { href: String, title: String },
    Image { src: String, title: String },
    Emphasis,
    Strong,
    Strikethrough,
    Table(Vec<Alignment>),
    TableHead,
    TableRow,
    TableCell,
    Footnote(String),
    HtmlBlock,
    /// Containers without a presentation rule; children are spliced into the parent
    Transparent,
}

impl Frame {
    fn open(tag: Tag<'_>) -> Self {
        match tag {
            Tag::Heading { level, .. } => Frame::Heading(heading_level(level)),
            Tag::Paragraph => Frame::Paragraph,
            Tag::List(start) => Frame::List(start),
            Tag::Item => Frame::Item,
            Tag::BlockQuote(_) => Frame::BlockQuote,
            Tag::CodeBlock(kind) => Frame::CodeBlock(match kind {
                CodeBlockKind::Fenced(info) => fence_language(&info),
                CodeBlockKind::Indented => None,
            }),
            Tag::Link {
                dest_url, title, ..
            } => Frame::Link {
                href: dest_url.into_string(),
                title: title.into_string(),
            },
            Tag::Image {
                dest_url, title, ..
            } => Frame::Image {
                src: dest_url.into_string(),
                title: title.into_string(),
            },
            Tag::Emphasis => Frame::Emphasis,
            Tag::Strong => Frame::Strong,
            Tag::Strikethrough => Frame::Strikethrough,
            Tag::Table(alignments) => Frame::Table(alignments),
            Tag::TableHead => Frame::TableHead,
            Tag::TableRow => Frame::TableRow,
            Tag::TableCell => Frame::TableCell,
            Tag::FootnoteDefinition(label) => Frame::Footnote(label.into_string()),
            Tag::HtmlBlock => Frame::HtmlBlock,
            _ => Frame::Transparent,
        }
    }

    fn close(self, children: Vec<Node>) -> Vec<Node> {
        let node = match self {
            Frame::Heading(level) => Node::Heading { level, children },
            Frame::Paragraph => Node::Paragraph(children),
            Frame::List(start) => Node::List {
                start,
                items: children,
            },
            Frame::Item => Node::ListItem(children),
            Frame::BlockQuote => Node::BlockQuote(children),
            Frame::CodeBlock(lang) => {
                let mut code: String = children.iter().map(Node::plain_text).collect();
                if code.ends_with('\n') {
                    code.pop();
                }
                Node::CodeBlock { lang, code }
            }
            Frame::Link { href, title } => Node::Link {
                href,
                title,
                children,
            },
            Frame::Image { src, title } => Node::Image {
                src,
                alt: children.iter().map(Node::plain_text).collect(),
                title,
            },
            Frame::Emphasis => Node::Emphasis(children),
            Frame::Strong => Node::Strong(children),
            Frame::Strikethrough => Node::Strikethrough(children),
            Frame::Table(alignments) => Node::Table {
                alignments,
                children,
            },
            Frame::TableHead => Node::TableHead(children),
            Frame::TableRow => Node::TableRow(children),
            Frame::TableCell => Node::TableCell(children),
            Frame::Footnote(label) => Node::FootnoteDefinition { label, children },
            Frame::HtmlBlock => Node::Html(children.iter().map(Node::plain_text).collect()),
            Frame::Transparent => return children,
        };
        vec![node]
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
