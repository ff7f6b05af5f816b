//! History pane
//!
//! Provides:
//! - The append-only history log and its entry types
//! - The single live input entry, always last when present
//! - A [`HistoryView`] seam that mirrors the log onto a display (DOM, stdout)
//!
//! Entries render to HTML (browser) or plain text (CLI). All text is escaped
//! on the way out; remote HTML arrives here already sanitized as [`SafeHtml`].

pub mod html;
mod text;

pub use html::SafeHtml;
pub use text::TextView;

use html::escape;

/// Prompt shown before echoed commands and prompt-prefixed output
pub const PROMPT: &str = "$ ";

/// A clickable command attached to a table row or button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub label: String,
    pub command: String,
}

impl Action {
    pub fn new(label: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            command: command.into(),
        }
    }
}

/// One table row; clicking it runs `command`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub cells: Vec<String>,
    pub command: Option<String>,
}

impl Row {
    pub fn new<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cells: cells.into_iter().map(Into::into).collect(),
            command: None,
        }
    }

    pub fn on_click(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }
}

/// Structured output content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Plain text; may span several lines
    Text(String),
    /// Tabular data (header row + data rows)
    Table { headers: Vec<String>, rows: Vec<Row> },
    /// Sanitized HTML
    Html(SafeHtml),
    /// Image that opens full-size when clicked
    Image { url: String, alt: String },
    /// Row of buttons (pagination)
    Actions(Vec<Action>),
}

impl From<&str> for Fragment {
    fn from(text: &str) -> Self {
        Fragment::Text(text.to_string())
    }
}

impl From<String> for Fragment {
    fn from(text: String) -> Self {
        Fragment::Text(text)
    }
}

impl From<SafeHtml> for Fragment {
    fn from(html: SafeHtml) -> Self {
        Fragment::Html(html)
    }
}

/// An entry in the history log. Immutable once appended, except that the
/// live input entry is removed and replaced wholesale on each command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// The literal submitted command line
    CommandEcho { text: String },
    Output {
        content: Fragment,
        prompt_prefixed: bool,
    },
    ErrorOutput { message: String },
    /// The interactive prompt
    LiveInput,
}

impl Entry {
    pub fn is_live_input(&self) -> bool {
        matches!(self, Entry::LiveInput)
    }

    /// HTML for the browser history pane
    pub fn to_html(&self) -> String {
        match self {
            Entry::CommandEcho { text } => {
                format!("<div class=\"command-line\">{}{}</div>", PROMPT, escape(text))
            }
            Entry::Output {
                content,
                prompt_prefixed,
            } => {
                let prefix = if *prompt_prefixed { PROMPT } else { "" };
                format!(
                    "<div class=\"command-output\">{}{}</div>",
                    prefix,
                    fragment_html(content)
                )
            }
            Entry::ErrorOutput { message } => {
                format!("<div class=\"command-error\">{}</div>", escape(message))
            }
            Entry::LiveInput => format!(
                "<div class=\"command-line live-input\">{}<input type=\"text\" id=\"{}\" \
                 autocomplete=\"off\" spellcheck=\"false\"></div>",
                PROMPT, INPUT_ID
            ),
        }
    }

    /// Plain-text rendering (CLI)
    pub fn to_text(&self) -> String {
        match self {
            Entry::CommandEcho { text } => format!("{}{}", PROMPT, text),
            Entry::Output {
                content,
                prompt_prefixed,
            } => {
                let body = fragment_text(content);
                if *prompt_prefixed && body.is_empty() {
                    PROMPT.trim_end().to_string()
                } else if *prompt_prefixed {
                    body.lines()
                        .map(|l| format!("{}{}", PROMPT, l).trim_end().to_string())
                        .collect::<Vec<_>>()
                        .join("\n")
                } else {
                    body
                }
            }
            Entry::ErrorOutput { message } => format!("error: {}", message),
            Entry::LiveInput => PROMPT.to_string(),
        }
    }
}

/// DOM id of the live input element
pub const INPUT_ID: &str = "commandInput";

fn fragment_html(fragment: &Fragment) -> String {
    match fragment {
        Fragment::Text(text) => escape(text).replace('\n', "<br>"),
        Fragment::Html(html) => html.as_str().to_string(),
        Fragment::Table { headers, rows } => {
            let mut out = String::from("<table class=\"command-table\">");
            if !headers.is_empty() {
                out.push_str("<thead><tr>");
                for h in headers {
                    out.push_str(&format!("<th>{}</th>", escape(h)));
                }
                out.push_str("</tr></thead>");
            }
            out.push_str("<tbody>");
            for row in rows {
                match &row.command {
                    Some(cmd) => out.push_str(&format!(
                        "<tr class=\"clickable-post\" data-command=\"{}\">",
                        escape(cmd)
                    )),
                    None => out.push_str("<tr>"),
                }
                for cell in &row.cells {
                    out.push_str(&format!("<td>{}</td>", escape(cell)));
                }
                out.push_str("</tr>");
            }
            out.push_str("</tbody></table>");
            out
        }
        Fragment::Image { url, .. } if !html::safe_url(url) => String::new(),
        Fragment::Image { url, alt } => format!(
            "<img class=\"featured-image\" src=\"{0}\" alt=\"{1}\" data-popup=\"{0}\">",
            escape(url),
            escape(alt)
        ),
        Fragment::Actions(actions) => {
            let mut out = String::from("<div class=\"pagination-controls\">");
            for action in actions {
                out.push_str(&format!(
                    "<button class=\"terminal-button\" data-command=\"{}\">{}</button>",
                    escape(&action.command),
                    escape(&action.label)
                ));
            }
            out.push_str("</div>");
            out
        }
    }
}

fn fragment_text(fragment: &Fragment) -> String {
    match fragment {
        Fragment::Text(text) => text.clone(),
        Fragment::Html(html) => html.to_text(),
        Fragment::Table { headers, rows } => {
            let columns = headers
                .len()
                .max(rows.iter().map(|r| r.cells.len()).max().unwrap_or(0));
            let mut widths = vec![0usize; columns];
            for (i, h) in headers.iter().enumerate() {
                widths[i] = widths[i].max(h.chars().count());
            }
            for row in rows {
                for (i, cell) in row.cells.iter().enumerate() {
                    widths[i] = widths[i].max(cell.chars().count());
                }
            }
            let line = |cells: &[String]| {
                cells
                    .iter()
                    .enumerate()
                    .map(|(i, c)| format!("{:<width$}", c, width = widths[i]))
                    .collect::<Vec<_>>()
                    .join(" | ")
                    .trim_end()
                    .to_string()
            };
            let mut lines = Vec::with_capacity(rows.len() + 1);
            if !headers.is_empty() {
                lines.push(line(headers));
            }
            for row in rows {
                lines.push(line(&row.cells));
            }
            lines.join("\n")
        }
        Fragment::Image { url, .. } => format!("[image] {}", url),
        Fragment::Actions(actions) => actions
            .iter()
            .map(|a| format!("[{}: {}]", a.label, a.command))
            .collect::<Vec<_>>()
            .join(" "),
    }
}

/// Display that mirrors the history log.
///
/// The log calls these after updating itself, so a view never has to read
/// the log back.
pub trait HistoryView {
    /// An entry was appended (before the live input, if one is present)
    fn append(&mut self, entry: &Entry);

    /// The live input entry was removed
    fn remove_input(&mut self);

    /// A fresh live input entry was appended at the end
    fn show_input(&mut self);

    /// Scroll so the last entry is visible
    fn scroll_to_end(&mut self) {}
}

/// The append-only history log
#[derive(Default)]
pub struct History {
    entries: Vec<Entry>,
    view: Option<Box<dyn HistoryView>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_view(view: Box<dyn HistoryView>) -> Self {
        Self {
            entries: Vec::new(),
            view: Some(view),
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True while a live input entry is the last entry
    pub fn input_active(&self) -> bool {
        self.entries.last().is_some_and(Entry::is_live_input)
    }

    /// Append an entry, keeping the live input (if any) last
    fn push(&mut self, entry: Entry) {
        debug_assert!(!entry.is_live_input());
        if let Some(view) = self.view.as_mut() {
            view.append(&entry);
        }
        if self.input_active() {
            let at = self.entries.len() - 1;
            self.entries.insert(at, entry);
        } else {
            self.entries.push(entry);
        }
    }

    /// Echo a submitted command line
    pub fn echo(&mut self, text: &str) {
        self.push(Entry::CommandEcho {
            text: text.to_string(),
        });
    }

    /// Prompt-prefixed output line
    pub fn print_line(&mut self, content: impl Into<Fragment>) {
        self.print(content, true);
    }

    pub fn print(&mut self, content: impl Into<Fragment>, prompt_prefixed: bool) {
        self.push(Entry::Output {
            content: content.into(),
            prompt_prefixed,
        });
    }

    pub fn print_error(&mut self, message: impl Into<String>) {
        self.push(Entry::ErrorOutput {
            message: message.into(),
        });
    }

    /// Raw (already sanitized) HTML fragment
    pub fn print_raw(&mut self, html: SafeHtml) {
        self.print(Fragment::Html(html), false);
    }

    /// Remove the live input entry; returns whether one existed
    pub fn remove_input(&mut self) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| !e.is_live_input());
        let removed = self.entries.len() != before;
        if removed {
            if let Some(view) = self.view.as_mut() {
                view.remove_input();
            }
        }
        removed
    }

    /// Replace any stale live input with a fresh one at the end, then scroll to it
    pub fn arm_input(&mut self) {
        self.remove_input();
        self.entries.push(Entry::LiveInput);
        if let Some(view) = self.view.as_mut() {
            view.show_input();
            view.scroll_to_end();
        }
    }

    /// Plain-text rendering of the whole log
    pub fn to_text(&self) -> String {
        self.entries
            .iter()
            .map(Entry::to_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
