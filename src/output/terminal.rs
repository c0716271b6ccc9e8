//! Terminal renderer: review Markdown styled for an ANSI terminal.
//!
//! The review is parsed with `pulldown-cmark` and styled on its event
//! stream. Heading lines are printed with their `#` markers so section
//! numbers stay recognisable in plain logs.

use colored::Colorize;
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::models::ReviewResult;
use crate::output::OutputRenderer;

/// Terminal output renderer with colored, flowing text.
pub struct TerminalRenderer;

impl OutputRenderer for TerminalRenderer {
    fn render(&self, result: &ReviewResult) -> String {
        match result {
            ReviewResult::Success { text } => render_markdown(text),
            ReviewResult::Failure { error } => {
                format!(" {} {}\n", "✖".red().bold(), error.red())
            }
        }
    }
}

/// Render Markdown to styled terminal text.
pub fn render_markdown(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let mut writer = Writer::new();
    for event in Parser::new_ext(markdown, options) {
        writer.event(event);
    }
    writer.finish()
}

#[derive(Default)]
struct Cell {
    plain: String,
    styled: String,
}

#[derive(Default)]
struct Table {
    rows: Vec<Vec<Cell>>,
    header_rows: usize,
}

/// Event-stream state: open inline styles, block nesting, and buffers for
/// blocks that are emitted whole (headings, code, tables).
struct Writer {
    out: String,
    at_line_start: bool,
    strong: usize,
    emphasis: usize,
    strike: usize,
    links: usize,
    quote_depth: usize,
    /// Next ordinal per open list; `None` for bullet lists.
    lists: Vec<Option<u64>>,
    heading: Option<(usize, String)>,
    code_block: Option<(String, String)>,
    table: Option<Table>,
}

impl Writer {
    fn new() -> Self {
        Self {
            out: String::new(),
            at_line_start: true,
            strong: 0,
            emphasis: 0,
            strike: 0,
            links: 0,
            quote_depth: 0,
            lists: Vec::new(),
            heading: None,
            code_block: None,
            table: None,
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) | Event::InlineHtml(html) => self.text(&html),
            Event::SoftBreak | Event::HardBreak => self.line_break(),
            Event::Rule => {
                self.ensure_line_start();
                self.write(&"─".repeat(40).dimmed().to_string());
                self.blank_line();
            }
            Event::TaskListMarker(done) => self.write(if done { "☑ " } else { "☐ " }),
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.ensure_line_start(),
            Tag::Heading { level, .. } => {
                self.ensure_line_start();
                self.heading = Some((heading_depth(level), String::new()));
            }
            Tag::BlockQuote => {
                self.ensure_line_start();
                self.quote_depth += 1;
            }
            Tag::CodeBlock(kind) => {
                self.ensure_line_start();
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => {
                        info.split_whitespace().next().unwrap_or_default().to_string()
                    }
                    CodeBlockKind::Indented => String::new(),
                };
                self.code_block = Some((lang, String::new()));
            }
            Tag::List(first) => {
                self.ensure_line_start();
                self.lists.push(first);
            }
            Tag::Item => self.start_item(),
            Tag::Table(_) => {
                self.ensure_line_start();
                self.table = Some(Table::default());
            }
            Tag::TableHead | Tag::TableRow => {
                if let Some(table) = self.table.as_mut() {
                    table.rows.push(Vec::new());
                }
            }
            Tag::TableCell => {
                if let Some(row) = self.table.as_mut().and_then(|t| t.rows.last_mut()) {
                    row.push(Cell::default());
                }
            }
            Tag::Emphasis => self.emphasis += 1,
            Tag::Strong => self.strong += 1,
            Tag::Strikethrough => self.strike += 1,
            Tag::Link { .. } => self.links += 1,
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.ensure_line_start();
                if self.lists.is_empty() {
                    self.blank_line();
                }
            }
            TagEnd::Heading(_) => {
                if let Some((depth, text)) = self.heading.take() {
                    let line = format!("{} {}", "#".repeat(depth), text.trim());
                    let styled = match depth {
                        1 | 2 => line.bold().underline().cyan(),
                        3 => line.bold().cyan(),
                        _ => line.bold(),
                    };
                    self.write(&styled.to_string());
                    self.blank_line();
                }
            }
            TagEnd::BlockQuote => {
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.ensure_line_start();
            }
            TagEnd::CodeBlock => {
                if let Some((lang, body)) = self.code_block.take() {
                    self.write_code_block(&lang, &body);
                }
            }
            TagEnd::List(_) => {
                self.lists.pop();
                self.ensure_line_start();
                if self.lists.is_empty() {
                    self.blank_line();
                }
            }
            TagEnd::Item => self.ensure_line_start(),
            TagEnd::TableHead => {
                if let Some(table) = self.table.as_mut() {
                    table.header_rows = table.rows.len();
                }
            }
            TagEnd::Table => {
                if let Some(table) = self.table.take() {
                    self.write_table(&table);
                }
            }
            TagEnd::Emphasis => self.emphasis = self.emphasis.saturating_sub(1),
            TagEnd::Strong => self.strong = self.strong.saturating_sub(1),
            TagEnd::Strikethrough => self.strike = self.strike.saturating_sub(1),
            TagEnd::Link => self.links = self.links.saturating_sub(1),
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if let Some((_, body)) = self.code_block.as_mut() {
            body.push_str(text);
            return;
        }
        if let Some((_, heading)) = self.heading.as_mut() {
            heading.push_str(text);
            return;
        }
        let styled = self.style(text);
        if let Some(cell) = self.current_cell() {
            cell.plain.push_str(text);
            cell.styled.push_str(&styled);
            return;
        }
        self.write(&styled);
    }

    fn inline_code(&mut self, code: &str) {
        if let Some((_, heading)) = self.heading.as_mut() {
            heading.push('`');
            heading.push_str(code);
            heading.push('`');
            return;
        }
        let styled = code.yellow().to_string();
        if let Some(cell) = self.current_cell() {
            cell.plain.push_str(code);
            cell.styled.push_str(&styled);
            return;
        }
        self.write(&styled);
    }

    fn line_break(&mut self) {
        if let Some((_, heading)) = self.heading.as_mut() {
            heading.push(' ');
        } else if let Some(cell) = self.current_cell() {
            cell.plain.push(' ');
            cell.styled.push(' ');
        } else {
            self.newline();
        }
    }

    fn style(&self, text: &str) -> String {
        let mut styled = text.normal();
        if self.strong > 0 {
            styled = styled.bold();
        }
        if self.emphasis > 0 {
            styled = styled.italic();
        }
        if self.strike > 0 {
            styled = styled.strikethrough();
        }
        if self.links > 0 {
            styled = styled.blue().underline();
        }
        styled.to_string()
    }

    fn current_cell(&mut self) -> Option<&mut Cell> {
        self.table.as_mut()?.rows.last_mut()?.last_mut()
    }

    fn start_item(&mut self) {
        self.ensure_line_start();
        let marker = match self.lists.last_mut() {
            Some(Some(n)) => {
                let marker = format!("{n}.");
                *n += 1;
                marker
            }
            _ => "•".to_string(),
        };
        let prefix = self.quote_prefix();
        let indent = "  ".repeat(self.lists.len().saturating_sub(1));
        self.out
            .push_str(&format!("{prefix}{indent} {} ", marker.cyan()));
        self.at_line_start = false;
    }

    fn write_code_block(&mut self, lang: &str, body: &str) {
        let header = if lang.is_empty() {
            "┌".to_string()
        } else {
            format!("┌ {lang}")
        };
        self.write(&format!("  {}", header.dimmed()));
        self.newline();
        for line in body.lines() {
            self.write(&format!("  {} {}", "│".dimmed(), line.yellow()));
            self.newline();
        }
        self.write(&format!("  {}", "└".dimmed()));
        self.newline();
        if self.lists.is_empty() {
            self.blank_line();
        }
    }

    fn write_table(&mut self, table: &Table) {
        let columns = table.rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut widths = vec![0usize; columns];
        for row in &table.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.plain.chars().count());
            }
        }

        let bar = "│".dimmed().to_string();
        for (index, row) in table.rows.iter().enumerate() {
            let header = index < table.header_rows;
            let mut line = bar.clone();
            for (i, width) in widths.iter().enumerate() {
                let (text, len) = match row.get(i) {
                    Some(cell) if header => (cell.plain.bold().to_string(), cell.plain.chars().count()),
                    Some(cell) => (cell.styled.clone(), cell.plain.chars().count()),
                    None => (String::new(), 0),
                };
                line.push(' ');
                line.push_str(&text);
                line.push_str(&" ".repeat(width - len + 1));
                line.push_str(&bar);
            }
            self.write(&line);
            self.newline();

            if index + 1 == table.header_rows {
                let rule: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
                self.write(&format!("├{}┤", rule.join("┼")).dimmed().to_string());
                self.newline();
            }
        }
        self.blank_line();
    }

    fn quote_prefix(&self) -> String {
        format!("{} ", "│".dimmed()).repeat(self.quote_depth)
    }

    /// Write at the current position, adding quote bars and list
    /// indentation at the start of a line.
    fn write(&mut self, text: &str) {
        if self.at_line_start {
            let prefix = self.quote_prefix();
            self.out.push_str(&prefix);
            if !self.lists.is_empty() {
                self.out.push_str(&"  ".repeat(self.lists.len()));
                self.out.push(' ');
            }
            self.at_line_start = false;
        }
        self.out.push_str(text);
    }

    fn newline(&mut self) {
        self.out.push('\n');
        self.at_line_start = true;
    }

    fn ensure_line_start(&mut self) {
        if !self.at_line_start {
            self.newline();
        }
    }

    fn blank_line(&mut self) {
        self.ensure_line_start();
        if !self.out.is_empty() && !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
    }

    fn finish(self) -> String {
        format!("{}\n", self.out.trim_end())
    }
}

fn heading_depth(level: HeadingLevel) -> usize {
    level as usize
}
