//! HTML presentation rules, one per node type

use pulldown_cmark::Alignment;

use super::highlight::Highlighter;
use super::tree::Node;
use crate::content::store::DATA_DIR;
use crate::helpers::{
    has_scheme, html_escape, is_safe_image, is_safe_link, AssetResolver, EXTERNAL_REL,
};

/// Image shown when a Markdown image has no source
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

/// Everything a rule may consult while rendering one document
pub(crate) struct RenderContext<'a> {
    pub assets: &'a AssetResolver,
    pub highlighter: &'a Highlighter,
    pub article_dir: Option<&'a str>,
}

pub(crate) fn render_nodes(nodes: &[Node], ctx: &RenderContext<'_>, out: &mut String) {
    for node in nodes {
        render_node(node, ctx, out);
    }
}

fn render_node(node: &Node, ctx: &RenderContext<'_>, out: &mut String) {
    match node {
        Node::Heading { level, children } => {
            match level {
                1..=3 => out.push_str(&format!(r#"<h{} class="md-h{}">"#, level, level)),
                _ => out.push_str(&format!("<h{}>", level)),
            }
            render_nodes(children, ctx, out);
            out.push_str(&format!("</h{}>\n", level));
        }
        Node::Paragraph(children) => wrap(out, r#"<p class="md-p">"#, "</p>\n", children, ctx),
        Node::List { start: None, items } => {
            wrap(out, "<ul class=\"md-ul\">\n", "</ul>\n", items, ctx)
        }
        Node::List {
            start: Some(start),
            items,
        } => {
            let open = if *start == 1 {
                "<ol class=\"md-ol\">\n".to_string()
            } else {
                format!("<ol class=\"md-ol\" start=\"{}\">\n", start)
            };
            wrap(out, &open, "</ol>\n", items, ctx);
        }
        Node::ListItem(children) => wrap(out, r#"<li class="md-li">"#, "</li>\n", children, ctx),
        Node::TaskMarker(checked) => {
            if *checked {
                out.push_str(r#"<input type="checkbox" disabled checked> "#);
            } else {
                out.push_str(r#"<input type="checkbox" disabled> "#);
            }
        }
        Node::BlockQuote(children) => wrap(
            out,
            "<blockquote class=\"md-blockquote\">\n",
            "</blockquote>\n",
            children,
            ctx,
        ),
        Node::CodeBlock {
            lang: Some(lang),
            code,
        } => {
            out.push_str(&ctx.highlighter.highlight(code, lang));
            out.push('\n');
        }
        Node::CodeBlock { lang: None, code } => {
            out.push_str(r#"<pre class="md-pre"><code>"#);
            out.push_str(&html_escape(code));
            out.push_str("</code></pre>\n");
        }
        Node::InlineCode(code) => {
            out.push_str(r#"<code class="md-code">"#);
            out.push_str(&html_escape(code));
            out.push_str("</code>");
        }
        Node::Link {
            href,
            title,
            children,
        } => {
            let href = if is_safe_link(href) { href.as_str() } else { "" };
            out.push_str(&format!(r#"<a href="{}""#, html_escape(href)));
            if !title.is_empty() {
                out.push_str(&format!(r#" title="{}""#, html_escape(title)));
            }
            out.push_str(&format!(
                r#" class="md-link" target="_blank" rel="{}">"#,
                EXTERNAL_REL
            ));
            render_nodes(children, ctx, out);
            out.push_str("</a>");
        }
        Node::Image { src, alt, title } => {
            let src = resolve_image_src(src, ctx.article_dir, ctx.assets);
            out.push_str(&format!(
                r#"<img src="{}" alt="{}""#,
                html_escape(&src),
                html_escape(alt)
            ));
            if !title.is_empty() {
                out.push_str(&format!(r#" title="{}""#, html_escape(title)));
            }
            out.push_str(r#" class="md-img">"#);
        }
        Node::Emphasis(children) => wrap(out, "<em>", "</em>", children, ctx),
        Node::Strong(children) => wrap(out, "<strong>", "</strong>", children, ctx),
        Node::Strikethrough(children) => wrap(out, "<del>", "</del>", children, ctx),
        Node::Table {
            alignments,
            children,
        } => render_table(alignments, children, ctx, out),
        // Table parts outside a table cannot come out of the parser
        Node::TableHead(children) | Node::TableRow(children) | Node::TableCell(children) => {
            render_nodes(children, ctx, out)
        }
        Node::FootnoteDefinition { label, children } => {
            let id = footnote_id(label);
            out.push_str(&format!(
                "<div class=\"footnote\" id=\"fn-{}\"><sup class=\"footnote-label\">{}</sup>\n",
                id,
                html_escape(label)
            ));
            render_nodes(children, ctx, out);
            out.push_str("</div>\n");
        }
        Node::FootnoteReference(label) => {
            let id = footnote_id(label);
            out.push_str(&format!(
                r##"<sup class="footnote-ref"><a href="#fn-{}" id="fnref-{}">{}</a></sup>"##,
                id,
                id,
                html_escape(label)
            ));
        }
        Node::Html(html) => out.push_str(&html_escape(html)),
        Node::Text(text) => out.push_str(&html_escape(text)),
        Node::SoftBreak => out.push('\n'),
        Node::HardBreak => out.push_str("<br>\n"),
        Node::Rule => out.push_str("<hr>\n"),
    }
}

fn wrap(out: &mut String, open: &str, close: &str, children: &[Node], ctx: &RenderContext<'_>) {
    out.push_str(open);
    render_nodes(children, ctx, out);
    out.push_str(close);
}

fn render_table(
    alignments: &[Alignment],
    children: &[Node],
    ctx: &RenderContext<'_>,
    out: &mut String,
) {
    out.push_str("<table class=\"md-table\">\n");

    let mut in_body = false;
    for child in children {
        match child {
            Node::TableHead(cells) => {
                out.push_str("<thead><tr>");
                render_cells(cells, "th", alignments, ctx, out);
                out.push_str("</tr></thead>\n");
            }
            Node::TableRow(cells) => {
                if !in_body {
                    out.push_str("<tbody>\n");
                    in_body = true;
                }
                out.push_str("<tr>");
                render_cells(cells, "td", alignments, ctx, out);
                out.push_str("</tr>\n");
            }
            other => render_node(other, ctx, out),
        }
    }

    if in_body {
        out.push_str("</tbody>\n");
    }
    out.push_str("</table>\n");
}

fn render_cells(
    cells: &[Node],
    tag: &str,
    alignments: &[Alignment],
    ctx: &RenderContext<'_>,
    out: &mut String,
) {
    for (i, cell) in cells.iter().enumerate() {
        let align = match alignments.get(i) {
            Some(Alignment::Left) => r#" style="text-align: left""#,
            Some(Alignment::Center) => r#" style="text-align: center""#,
            Some(Alignment::Right) => r#" style="text-align: right""#,
            _ => "",
        };
        out.push_str(&format!("<{}{}>", tag, align));
        match cell {
            Node::TableCell(children) => render_nodes(children, ctx, out),
            other => render_node(other, ctx, out),
        }
        out.push_str(&format!("</{}>", tag));
    }
}

fn footnote_id(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect()
}

/// Final `src` of a Markdown image
///
/// External references pass through; article-relative sources are moved
/// under `data/<article_dir>/`; everything local gets the base path.
/// Empty sources and disallowed schemes become the placeholder.
pub fn resolve_image_src(src: &str, article_dir: Option<&str>, assets: &AssetResolver) -> String {
    let src = src.trim();

    if src.is_empty() || !is_safe_image(src) {
        return assets.resolve(PLACEHOLDER_IMAGE);
    }
    if has_scheme(src) || src.starts_with("//") {
        return src.to_string();
    }
    if src.starts_with('/') {
        return assets.resolve(src);
    }

    match article_dir
        .map(|dir| dir.trim_matches('/'))
        .filter(|dir| !dir.is_empty())
    {
        Some(dir) => assets.resolve(&format!(
            "/{}/{}/{}",
            DATA_DIR,
            dir,
            src.trim_start_matches("./")
        )),
        None => assets.resolve(src),
    }
}
