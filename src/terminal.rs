//! Terminal in the page's `#history` element
//!
//! The history log is mirrored into the DOM as it grows. Event handlers are
//! delegated to the history element, so entries appended later need no
//! wiring of their own:
//! - Enter in the live input submits the line
//! - Clicking a row or button with `data-command` runs that command
//! - Clicking a featured image opens it full-screen

#![cfg(target_arch = "wasm32")]

use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::content::ContentService;
use crate::render::{Entry, HistoryView, INPUT_ID};
use crate::shell::{Session, SessionState};

/// DOM id of the history pane
pub const HISTORY_ID: &str = "history";

const LIVE_INPUT: &str = ".live-input";

fn document() -> Result<web_sys::Document, JsValue> {
    web_sys::window()
        .ok_or("no window")?
        .document()
        .ok_or_else(|| "no document".into())
}

fn history_element() -> Result<web_sys::Element, JsValue> {
    document()?
        .get_element_by_id(HISTORY_ID)
        .ok_or_else(|| format!("no #{} element", HISTORY_ID).into())
}

/// [`HistoryView`] over the `#history` element
pub struct DomView {
    history: web_sys::Element,
}

impl DomView {
    /// Attach to the page's history pane
    pub fn attach() -> Result<Self, JsValue> {
        Ok(Self {
            history: history_element()?,
        })
    }

    fn live_input(&self) -> Option<web_sys::Element> {
        self.history.query_selector(LIVE_INPUT).ok().flatten()
    }
}

impl HistoryView for DomView {
    fn append(&mut self, entry: &Entry) {
        let html = entry.to_html();
        let result = match self.live_input() {
            Some(input) => input.insert_adjacent_html("beforebegin", &html),
            None => self.history.insert_adjacent_html("beforeend", &html),
        };
        if let Err(e) = result {
            web_sys::console::error_1(&e);
        }
    }

    fn remove_input(&mut self) {
        while let Some(input) = self.live_input() {
            input.remove();
        }
    }

    fn show_input(&mut self) {
        if let Err(e) = self
            .history
            .insert_adjacent_html("beforeend", &Entry::LiveInput.to_html())
        {
            web_sys::console::error_1(&e);
            return;
        }
        focus_input();
    }

    fn scroll_to_end(&mut self) {
        self.history.set_scroll_top(self.history.scroll_height());
    }
}

fn input_element() -> Option<web_sys::HtmlInputElement> {
    document()
        .ok()?
        .get_element_by_id(INPUT_ID)?
        .dyn_into()
        .ok()
}

fn focus_input() {
    if let Some(input) = input_element() {
        let _ = input.focus();
    }
}

/// Run `line` unless a command is already executing
fn submit<C: ContentService + 'static>(session: &Rc<Session<C>>, line: String) {
    if session.state() == SessionState::Executing {
        return;
    }
    let session = session.clone();
    wasm_bindgen_futures::spawn_local(async move {
        if let Err(e) = session.submit(&line).await {
            crate::console_log!("[terminal] {}", e);
        }
    });
}

/// Install keyboard and click handlers on the history pane
pub fn install<C: ContentService + 'static>(session: Rc<Session<C>>) -> Result<(), JsValue> {
    let history = history_element()?;
    setup_keyboard_handler(&history, session.clone())?;
    setup_click_handler(&history, session)?;
    Ok(())
}

fn setup_keyboard_handler<C: ContentService + 'static>(
    history: &web_sys::Element,
    session: Rc<Session<C>>,
) -> Result<(), JsValue> {
    let callback = Closure::wrap(Box::new(move |event: web_sys::KeyboardEvent| {
        if event.key() != "Enter" {
            return;
        }
        let Some(input) = event
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
        else {
            return;
        };
        if input.id() != INPUT_ID {
            return;
        }
        event.prevent_default();
        submit(&session, input.value().trim().to_string());
    }) as Box<dyn FnMut(_)>);

    history.add_event_listener_with_callback("keydown", callback.as_ref().unchecked_ref())?;
    callback.forget();
    Ok(())
}

fn setup_click_handler<C: ContentService + 'static>(
    history: &web_sys::Element,
    session: Rc<Session<C>>,
) -> Result<(), JsValue> {
    let callback = Closure::wrap(Box::new(move |event: web_sys::MouseEvent| {
        let Some(target) = event
            .target()
            .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
        else {
            return;
        };

        if let Ok(Some(el)) = target.closest("[data-popup]") {
            if let Some(url) = el.get_attribute("data-popup") {
                if let Err(e) = open_image_popup(&url) {
                    web_sys::console::error_1(&e);
                }
            }
            return;
        }

        if let Ok(Some(el)) = target.closest("[data-command]") {
            if let Some(command) = el.get_attribute("data-command") {
                submit(&session, command);
            }
            return;
        }

        // Clicking anywhere else in the pane returns focus to the prompt,
        // unless the user is selecting text
        let selecting = web_sys::window()
            .and_then(|w| w.get_selection().ok().flatten())
            .is_some_and(|s| !s.is_collapsed());
        if !selecting {
            focus_input();
        }
    }) as Box<dyn FnMut(_)>);

    history.add_event_listener_with_callback("click", callback.as_ref().unchecked_ref())?;
    callback.forget();
    Ok(())
}

/// Full-screen overlay showing `url`; clicking it closes it
fn open_image_popup(url: &str) -> Result<(), JsValue> {
    let document = document()?;
    let body = document.body().ok_or("no body")?;

    let popup: web_sys::HtmlElement = document.create_element("div")?.dyn_into()?;
    popup.set_class_name("image-popup");
    let style = popup.style();
    style.set_property("position", "fixed")?;
    style.set_property("top", "0")?;
    style.set_property("left", "0")?;
    style.set_property("width", "100%")?;
    style.set_property("height", "100%")?;
    style.set_property("background-color", "rgba(0, 0, 0, 0.8)")?;
    style.set_property("display", "flex")?;
    style.set_property("justify-content", "center")?;
    style.set_property("align-items", "center")?;
    style.set_property("z-index", "1000")?;

    let img: web_sys::HtmlElement = document.create_element("img")?.dyn_into()?;
    img.set_attribute("src", url)?;
    let img_style = img.style();
    img_style.set_property("max-width", "90%")?;
    img_style.set_property("max-height", "90%")?;
    img_style.set_property("margin", "auto")?;
    popup.append_child(&img)?;

    let popup_for_close = popup.clone();
    let close = Closure::once(move || {
        popup_for_close.remove();
        focus_input();
    });
    popup.add_event_listener_with_callback("click", close.as_ref().unchecked_ref())?;
    close.forget();

    body.append_child(&popup)?;
    Ok(())
}
