//! Event-driven markdown to HTML renderer.

use std::fmt::Write;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use crate::code_block::{CodeBlockProcessor, FenceInfo, ProcessResult};
use crate::html::{self, LinkBase};
use crate::state::{CodeBlockState, Heading, HeadingState, ImageState, TableState, escape_html};
use crate::util::heading_level_to_num;

/// Result of rendering markdown.
#[derive(Clone, Debug)]
pub struct RenderResult {
    /// Rendered HTML content.
    pub html: String,
    /// Headings in document order, with their assigned IDs.
    pub headings: Vec<Heading>,
    /// Warnings generated during conversion (e.g., unknown code languages).
    pub warnings: Vec<String>,
}

/// Markdown to HTML renderer.
///
/// Every heading gets a unique `id` derived from its text, and the headings
/// are returned alongside the HTML for table-of-contents use.
///
/// # Code Block Processors
///
/// Fenced code blocks can be handled by processors added via
/// [`with_processor`](Self::with_processor). Processors are checked in order;
/// the first returning a non-`PassThrough` result wins.
///
/// Heading IDs are unique per [`render`](Self::render) call, but processor
/// warnings accumulate for the lifetime of the renderer, so use one renderer
/// per document.
pub struct MarkdownRenderer {
    output: String,
    code: CodeBlockState,
    table: TableState,
    image: ImageState,
    heading: HeadingState,
    link_base: Option<LinkBase>,
    pending_image: Option<(String, String)>,
    pending_fence: FenceInfo,
    processors: Vec<Box<dyn CodeBlockProcessor>>,
    code_block_index: usize,
    gfm: bool,
    heading_anchors: bool,
    raw_html: bool,
}

impl MarkdownRenderer {
    /// Create a new renderer with GFM enabled by default.
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: String::with_capacity(4096),
            code: CodeBlockState::default(),
            table: TableState::default(),
            image: ImageState::default(),
            heading: HeadingState::default(),
            link_base: None,
            pending_image: None,
            pending_fence: FenceInfo::default(),
            processors: Vec::new(),
            code_block_index: 0,
            gfm: true,
            heading_anchors: false,
            raw_html: false,
        }
    }

    /// Enable or disable GitHub Flavored Markdown features.
    ///
    /// GFM is enabled by default. When enabled, the parser supports:
    /// - Tables
    /// - Strikethrough (`~~text~~`)
    /// - Task lists (`- [ ] item`)
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Append a `#` anchor link to every heading.
    #[must_use]
    pub fn with_heading_anchors(mut self, enabled: bool) -> Self {
        self.heading_anchors = enabled;
        self
    }

    /// Pass raw HTML through instead of escaping it.
    #[must_use]
    pub fn with_raw_html(mut self, enabled: bool) -> Self {
        self.raw_html = enabled;
        self
    }

    /// Rewrite relative `.md` links against the given page location.
    ///
    /// Without a link base, link destinations are emitted unchanged.
    #[must_use]
    pub fn with_link_base(mut self, base: LinkBase) -> Self {
        self.link_base = Some(base);
        self
    }

    /// Add a code block processor.
    ///
    /// # Example
    ///
    /// ```
    /// use quire_renderer::{CodeBlockProcessor, FenceInfo, MarkdownRenderer, ProcessResult};
    ///
    /// struct Shouty;
    ///
    /// impl CodeBlockProcessor for Shouty {
    ///     fn process(&mut self, fence: &FenceInfo, source: &str, _index: usize) -> ProcessResult {
    ///         if fence.language.as_deref() == Some("shout") {
    ///             ProcessResult::Inline(format!("<p>{}</p>", source.trim().to_uppercase()))
    ///         } else {
    ///             ProcessResult::PassThrough
    ///         }
    ///     }
    /// }
    ///
    /// let result = MarkdownRenderer::new()
    ///     .with_processor(Shouty)
    ///     .render_markdown("```shout\nhello\n```");
    /// assert_eq!(result.html, "<p>HELLO</p>");
    /// ```
    #[must_use]
    pub fn with_processor<P: CodeBlockProcessor + 'static>(mut self, processor: P) -> Self {
        self.processors.push(Box::new(processor));
        self
    }

    /// Get parser options based on GFM configuration.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
        } else {
            Options::empty()
        }
    }

    /// Render markdown text using the configured parser options.
    pub fn render_markdown(&mut self, markdown: &str) -> RenderResult {
        let parser = Parser::new_ext(markdown, self.parser_options());
        self.render(parser)
    }

    /// Render markdown events and return the result.
    pub fn render<'a, I>(&mut self, events: I) -> RenderResult
    where
        I: Iterator<Item = Event<'a>>,
    {
        for event in events {
            self.process_event(event);
        }

        let mut heading = std::mem::take(&mut self.heading);
        self.code_block_index = 0;

        RenderResult {
            html: std::mem::take(&mut self.output),
            headings: heading.take_headings(),
            warnings: self.processor_warnings().collect(),
        }
    }

    /// Get all warnings from all processors.
    pub fn processor_warnings(&self) -> impl Iterator<Item = String> + '_ {
        self.processors.iter().flat_map(|p| p.warnings()).cloned()
    }

    /// Push content to output or heading buffer based on context.
    fn push_inline(&mut self, content: &str) {
        // Alt text is plain; formatting inside it is dropped
        if self.image.is_active() {
            return;
        }
        if self.heading.is_active() {
            self.heading.push_html(content);
        } else {
            self.output.push_str(content);
        }
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) | Event::InlineHtml(html) => self.raw_html(&html),
            Event::SoftBreak => self.soft_break(),
            Event::HardBreak => self.push_inline("<br>"),
            Event::Rule => self.output.push_str("<hr>"),
            Event::TaskListMarker(checked) => self.task_list_marker(checked),
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {
                // Not enabled in parser options
            }
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.output.push_str("<p>"),
            Tag::Heading { level, .. } => {
                // Opening tag is written in end_tag once the ID is known
                self.heading.start_heading(heading_level_to_num(level));
            }
            Tag::BlockQuote(_) => self.output.push_str("<blockquote>"),
            Tag::CodeBlock(kind) => {
                self.pending_fence = match kind {
                    CodeBlockKind::Fenced(info) => FenceInfo::parse(&info),
                    CodeBlockKind::Indented => FenceInfo::default(),
                };
                self.code.start();
            }
            Tag::List(start) => match start {
                Some(1) => self.output.push_str("<ol>"),
                Some(n) => write!(self.output, r#"<ol start="{n}">"#).unwrap(),
                None => self.output.push_str("<ul>"),
            },
            Tag::Item => self.output.push_str("<li>"),
            Tag::FootnoteDefinition(_) | Tag::HtmlBlock | Tag::MetadataBlock(_) => {}
            Tag::DefinitionList => self.output.push_str("<dl>"),
            Tag::DefinitionListTitle => self.output.push_str("<dt>"),
            Tag::DefinitionListDefinition => self.output.push_str("<dd>"),
            Tag::Table(alignments) => {
                self.table.start(alignments);
                self.output.push_str("<table>");
            }
            Tag::TableHead => {
                self.table.start_head();
                self.output.push_str("<thead><tr>");
            }
            Tag::TableRow => {
                self.table.start_row();
                self.output.push_str("<tr>");
            }
            Tag::TableCell => {
                let align = self.table.current_alignment_style();
                let tag = if self.table.is_in_head() { "th" } else { "td" };
                write!(self.output, "<{tag}{align}>").unwrap();
            }
            Tag::Emphasis => self.push_inline("<em>"),
            Tag::Strong => self.push_inline("<strong>"),
            Tag::Strikethrough => self.push_inline("<del>"),
            Tag::Link {
                dest_url, title, ..
            } => {
                let href = match &self.link_base {
                    Some(base) => html::resolve_link(&dest_url, base),
                    None => dest_url.to_string(),
                };
                let mut link_tag = format!(r#"<a href="{}""#, escape_html(&href));
                if !title.is_empty() {
                    write!(link_tag, r#" title="{}""#, escape_html(&title)).unwrap();
                }
                link_tag.push('>');
                self.push_inline(&link_tag);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                // Alt text is collected until the matching end tag
                self.image.start();
                self.pending_image = Some((dest_url.to_string(), title.to_string()));
            }
            Tag::Superscript => self.push_inline("<sup>"),
            Tag::Subscript => self.push_inline("<sub>"),
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.output.push_str("</p>"),
            TagEnd::Heading(_) => {
                if let Some(heading) = self.heading.complete_heading() {
                    let level = heading.level;
                    let id = escape_html(&heading.id);
                    write!(self.output, r#"<h{level} id="{id}">{}"#, heading.html.trim()).unwrap();
                    if self.heading_anchors {
                        write!(
                            self.output,
                            r##"<a class="anchor" href="#{id}" aria-hidden="true">#</a>"##
                        )
                        .unwrap();
                    }
                    write!(self.output, "</h{level}>").unwrap();
                }
            }
            TagEnd::BlockQuote(_) => self.output.push_str("</blockquote>"),
            TagEnd::CodeBlock => self.finish_code_block(),
            TagEnd::List(ordered) => {
                self.output
                    .push_str(if ordered { "</ol>" } else { "</ul>" });
            }
            TagEnd::Item => self.output.push_str("</li>"),
            TagEnd::FootnoteDefinition | TagEnd::HtmlBlock | TagEnd::MetadataBlock(_) => {}
            TagEnd::Image => {
                let alt = self.image.end();
                if let Some((src, title)) = self.pending_image.take() {
                    let mut img = String::new();
                    html::image(&src, &alt, &title, &mut img);
                    self.push_inline(&img);
                }
            }
            TagEnd::DefinitionList => self.output.push_str("</dl>"),
            TagEnd::DefinitionListTitle => self.output.push_str("</dt>"),
            TagEnd::DefinitionListDefinition => self.output.push_str("</dd>"),
            TagEnd::Table => self.output.push_str("</tbody></table>"),
            TagEnd::TableHead => {
                self.output.push_str("</tr></thead><tbody>");
                self.table.end_head();
            }
            TagEnd::TableRow => self.output.push_str("</tr>"),
            TagEnd::TableCell => {
                self.output.push_str(if self.table.is_in_head() {
                    "</th>"
                } else {
                    "</td>"
                });
                self.table.next_cell();
            }
            TagEnd::Emphasis => self.push_inline("</em>"),
            TagEnd::Strong => self.push_inline("</strong>"),
            TagEnd::Strikethrough => self.push_inline("</del>"),
            TagEnd::Link => self.push_inline("</a>"),
            TagEnd::Superscript => self.push_inline("</sup>"),
            TagEnd::Subscript => self.push_inline("</sub>"),
        }
    }

    fn finish_code_block(&mut self) {
        let content = self.code.end();
        let fence = std::mem::take(&mut self.pending_fence);
        let index = self.code_block_index;
        self.code_block_index += 1;

        // Try processors in order, fall back to a plain code block
        let processed = self.processors.iter_mut().any(|processor| {
            match processor.process(&fence, &content, index) {
                ProcessResult::Inline(html) => {
                    self.output.push_str(&html);
                    true
                }
                ProcessResult::PassThrough => false,
            }
        });

        if !processed {
            html::code_block(fence.language.as_deref(), &content, &mut self.output);
        }
    }

    fn text(&mut self, text: &str) {
        if self.code.is_active() {
            self.code.push_str(text);
        } else if self.image.is_active() {
            self.image.push_str(text);
        } else if self.heading.is_active() {
            self.heading.push_text(text);
            self.heading.push_html(&escape_html(text));
        } else {
            self.output.push_str(&escape_html(text));
        }
    }

    fn inline_code(&mut self, code: &str) {
        if self.image.is_active() {
            self.image.push_str(code);
            return;
        }
        if self.heading.is_active() {
            self.heading.push_text(code);
        }
        self.push_inline(&format!("<code>{}</code>", escape_html(code)));
    }

    fn raw_html(&mut self, html: &str) {
        if self.raw_html {
            self.push_inline(html);
        } else {
            self.push_inline(&escape_html(html));
        }
    }

    fn soft_break(&mut self) {
        if self.image.is_active() {
            self.image.push_str(" ");
        } else if self.heading.is_active() {
            self.heading.push_text(" ");
            self.heading.push_html("\n");
        } else {
            self.output.push('\n');
        }
    }

    fn task_list_marker(&mut self, checked: bool) {
        self.output.push_str(if checked {
            r#"<input type="checkbox" disabled checked> "#
        } else {
            r#"<input type="checkbox" disabled> "#
        });
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}
