//! Command handlers
//!
//! Each handler awaits every fetch before appending the output that depends
//! on it, so entries land in the history in call order. Handlers report
//! failure through [`CommandError`]; the session turns that into exactly one
//! error entry.

use super::parser::{Command, parse_count, parse_id};
use super::registry::{self, COMMANDS, CommandKind};
use crate::config::{MAX_PER_PAGE, SiteConfig};
use crate::content::{
    ContentError, ContentService, PageWindow, PagingError, RemoteCategory, RemoteItem,
};
use crate::render::html::{self, escape};
use crate::render::{Action, Fragment, History, Row, SafeHtml};
use chrono::{NaiveDate, NaiveDateTime};
use std::cell::{RefCell, RefMut};

/// Result type for command handlers
pub type CommandResult = Result<(), CommandError>;

/// Command failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command name (including the empty line)
    NotRecognized(String),
    /// A required argument is missing
    Usage { usage: &'static str },
    Content(ContentError),
    Paging(PagingError),
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotRecognized(name) if name.is_empty() => write!(f, "Command not recognized"),
            Self::NotRecognized(name) => write!(f, "Command not recognized: {}", name),
            Self::Usage { usage } => write!(f, "usage: {}", usage),
            Self::Content(e) => write!(f, "{}", e),
            Self::Paging(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Content(e) => Some(e),
            Self::Paging(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ContentError> for CommandError {
    fn from(e: ContentError) -> Self {
        Self::Content(e)
    }
}

impl From<PagingError> for CommandError {
    fn from(e: PagingError) -> Self {
        Self::Paging(e)
    }
}

/// What a handler can reach: configuration, content and the history log
pub struct Context<'a, C> {
    pub config: &'a SiteConfig,
    pub content: &'a C,
    history: &'a RefCell<History>,
}

impl<'a, C: ContentService> Context<'a, C> {
    pub fn new(config: &'a SiteConfig, content: &'a C, history: &'a RefCell<History>) -> Self {
        Self {
            config,
            content,
            history,
        }
    }

    /// Borrow the log for appending. Never hold the borrow across an await.
    fn out(&self) -> RefMut<'a, History> {
        self.history.borrow_mut()
    }

    fn per_page(&self, arg: Option<&str>) -> u32 {
        parse_count(arg, self.config.per_page()).min(MAX_PER_PAGE)
    }
}

/// Run a parsed command
pub async fn dispatch<C: ContentService>(cx: &Context<'_, C>, command: &Command) -> CommandResult {
    let Some(spec) = registry::lookup(&command.name) else {
        return Err(CommandError::NotRecognized(command.name.clone()));
    };
    let args = &command.args[..command.args.len().min(spec.max_args)];

    match spec.kind {
        CommandKind::Ls => ls(cx, args).await,
        CommandKind::Cat => cat(cx, args).await,
        CommandKind::Search => search(cx, args, spec.usage).await,
        CommandKind::Categories => categories(cx).await,
        CommandKind::Posts => posts(cx, args).await,
        CommandKind::Help => {
            help(cx);
            Ok(())
        }
    }
}

/// `ls [page] [per_page]`
async fn ls<C: ContentService>(cx: &Context<'_, C>, args: &[String]) -> CommandResult {
    let page = parse_count(arg(args, 0), 1);
    let per_page = cx.per_page(arg(args, 1));

    let total = cx.content.count_items().await?;
    let window = PageWindow::for_listing(total, page, per_page)?;
    if window.is_empty() {
        cx.out().print_line("No articles found.");
        return Ok(());
    }

    let items = cx.content.list_items(window.page, window.per_page).await?;
    let mut out = cx.out();
    print_items(&mut out, &items, "No articles found.");
    print_pager(&mut out, &window, |page| {
        format!("ls {} {}", page, window.per_page)
    });
    Ok(())
}

/// `cat <id or slug>`
async fn cat<C: ContentService>(cx: &Context<'_, C>, args: &[String]) -> CommandResult {
    let key = arg(args, 0).unwrap_or("");
    let id = match parse_id(key) {
        Some(id) => id,
        None if key.is_empty() => return Err(ContentError::not_found("article", "").into()),
        None => cx.content.item_by_slug(key).await?.id,
    };
    let item = cx.content.get_item(id).await?;

    let title = SafeHtml::sanitize(&item.title_html);
    let mut out = cx.out();
    out.print_raw(SafeHtml::trusted(format!("<h2>{}</h2>", title)));
    out.print_line(format!("Date: {}", display_date(&item.date_iso)));
    if let Some(url) = item.featured_image_url.as_deref().filter(|u| !u.is_empty()) {
        out.print(
            Fragment::Image {
                url: url.to_string(),
                alt: title.to_text(),
            },
            false,
        );
    }
    let body = SafeHtml::sanitize(&item.body_html);
    if !body.is_empty() {
        out.print_raw(body);
    }
    Ok(())
}

/// `search <query> [page] [per_page]`
async fn search<C: ContentService>(
    cx: &Context<'_, C>,
    args: &[String],
    usage: &'static str,
) -> CommandResult {
    let query = match arg(args, 0).map(str::trim) {
        Some(q) if !q.is_empty() => q,
        _ => return Err(CommandError::Usage { usage }),
    };
    let page = parse_count(arg(args, 1), 1);
    let per_page = cx.per_page(arg(args, 2));

    let total = cx.content.count_search(query).await?;
    let window = match PageWindow::for_search(total, page, per_page) {
        Ok(window) => window,
        Err(PagingError::NoResults) => {
            cx.out().print_line(PagingError::NoResults.to_string());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let items = cx
        .content
        .search_items(query, window.page, window.per_page)
        .await?;
    let mut out = cx.out();
    out.print_line(format!(
        "{} result{} for \"{}\"",
        window.total,
        if window.total == 1 { "" } else { "s" },
        query
    ));
    print_items(&mut out, &items, PagingError::NoResults.to_string().as_str());
    let quoted = quote(query);
    print_pager(&mut out, &window, |page| {
        format!("search {} {} {}", quoted, page, window.per_page)
    });
    Ok(())
}

/// `categories`
async fn categories<C: ContentService>(cx: &Context<'_, C>) -> CommandResult {
    let categories = cx.content.list_categories().await?;
    let mut out = cx.out();
    if categories.is_empty() {
        out.print_line("No categories found.");
        return Ok(());
    }
    out.print(category_table(&categories), false);
    Ok(())
}

/// `posts <category-id>`; unpaginated
async fn posts<C: ContentService>(cx: &Context<'_, C>, args: &[String]) -> CommandResult {
    let key = arg(args, 0).unwrap_or("");
    let Some(category_id) = parse_id(key) else {
        return Err(ContentError::not_found("category", key).into());
    };
    let items = cx.content.items_in_category(category_id).await?;
    print_items(&mut cx.out(), &items, "No articles found in this category.");
    Ok(())
}

/// `help`
fn help<C: ContentService>(cx: &Context<'_, C>) {
    let mut text = String::from(
        "<div class=\"help-text\"><strong>Available Commands:</strong><ul>",
    );
    for spec in COMMANDS {
        text.push_str(&format!(
            "<li><strong>{}</strong> - {} Usage: <code>{}</code></li>",
            escape(spec.usage),
            escape(spec.summary),
            escape(spec.example)
        ));
    }
    text.push_str("</ul></div>");
    cx.out().print_raw(SafeHtml::trusted(text));
}

fn arg(args: &[String], index: usize) -> Option<&str> {
    args.get(index).map(String::as_str)
}

fn print_items(out: &mut History, items: &[RemoteItem], empty: &str) {
    if items.is_empty() {
        out.print_line(empty);
    } else {
        out.print(item_table(items), false);
    }
}

fn item_table(items: &[RemoteItem]) -> Fragment {
    Fragment::Table {
        headers: vec!["ID".into(), "Title".into(), "Date".into()],
        rows: items
            .iter()
            .map(|item| {
                Row::new([
                    item.id.to_string(),
                    plain_title(&item.title_html),
                    display_date(&item.date_iso),
                ])
                .on_click(format!("cat {}", item.id))
            })
            .collect(),
    }
}

fn category_table(categories: &[RemoteCategory]) -> Fragment {
    Fragment::Table {
        headers: vec!["ID".into(), "Name".into(), "Slug".into()],
        rows: categories
            .iter()
            .map(|cat| {
                Row::new([
                    cat.id.to_string(),
                    html::decode_entities(&cat.name),
                    cat.slug.clone(),
                ])
                .on_click(format!("posts {}", cat.id))
            })
            .collect(),
    }
}

/// `Page p of N` plus Previous/Next buttons
fn print_pager(out: &mut History, window: &PageWindow, command: impl Fn(u32) -> String) {
    out.print_line(format!("Page {} of {}", window.page, window.total_pages));
    let mut actions = Vec::new();
    if window.has_previous() {
        actions.push(Action::new("Previous Page", command(window.page - 1)));
    }
    if window.has_next() {
        actions.push(Action::new("Next Page", command(window.page + 1)));
    }
    if !actions.is_empty() {
        out.print(Fragment::Actions(actions), false);
    }
}

fn plain_title(title_html: &str) -> String {
    let title = html::to_text(title_html).replace('\n', " ");
    if title.is_empty() {
        "(untitled)".to_string()
    } else {
        title
    }
}

/// `YYYY-MM-DD` from an ISO-8601 timestamp; unparsable input is shown as-is
pub fn display_date(iso: &str) -> String {
    let iso = iso.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(iso, "%Y-%m-%dT%H:%M:%S") {
        return dt.format("%Y-%m-%d").to_string();
    }
    match iso.get(..10).map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d")) {
        Some(Ok(date)) => date.format("%Y-%m-%d").to_string(),
        _ => iso.to_string(),
    }
}

/// Quote an argument so it parses back as one word.
///
/// The parser joins adjacent quoted pieces, so text holding both quote
/// characters is split into runs that each hold only one kind.
fn quote(arg: &str) -> String {
    if !arg.is_empty() && !arg.chars().any(|c| c.is_whitespace() || c == '"' || c == '\'') {
        return arg.to_string();
    }

    fn flush(out: &mut String, run: &mut String, has_double: bool) {
        let delim = if has_double { '\'' } else { '"' };
        out.push(delim);
        out.push_str(run);
        out.push(delim);
        run.clear();
    }

    let mut out = String::new();
    let mut run = String::new();
    let (mut has_single, mut has_double) = (false, false);
    for c in arg.chars() {
        if (c == '\'' && has_double) || (c == '"' && has_single) {
            flush(&mut out, &mut run, has_double);
            has_single = false;
            has_double = false;
        }
        has_single |= c == '\'';
        has_double |= c == '"';
        run.push(c);
    }
    if !run.is_empty() || out.is_empty() {
        flush(&mut out, &mut run, has_double);
    }
    out
}
