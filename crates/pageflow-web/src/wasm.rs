#![forbid(unsafe_code)]

//! `wasm-bindgen` exports for the SiteRunner.
//!
//! This module wraps [`super::runner_core::RunnerCore`] with JS-friendly types,
//! scans the live DOM into a [`PageLayout`] and applies patches and host
//! effects back onto it. Only compiled on `wasm32` targets.

use js_sys::{Array, Object, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, HtmlButtonElement, HtmlElement, HtmlInputElement, HtmlTextAreaElement,
    ScrollBehavior, ScrollToOptions, Window,
};

use pageflow_core::{
    ControlRole, DomPatch, FieldName, HistoryMode, HostEffect, PageLayout, REVEAL_TRANSITION,
    SectionId,
};
use pageflow_runtime::StepResult;
use pageflow_site::SiteConfig;

use super::runner_core::RunnerCore;

const CONTROL_ATTR: &str = "data-pageflow-control";
const ELEMENT_ATTR: &str = "data-pageflow-element";
const ERROR_BORDER: &str = "#ff6b6b";
const FLAG_ANIMATION: &str = "flagPulse 3s ease-in-out infinite";

/// Control groups in id order, with the role each one binds to.
const CONTROL_QUERIES: [(&str, ControlRole); 5] = [
    (".nav-link", ControlRole::PrimaryNav),
    ("footer a[href^=\"#\"]", ControlRole::FooterNav),
    (".mobile-link", ControlRole::MobileNav),
    (".mobile-menu-toggle", ControlRole::MenuToggle),
    (".pakistan-flag", ControlRole::Flag),
];

fn console_error(msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(error) = Reflect::get(&console, &"error".into()) else {
        return;
    };
    let Ok(error_fn) = error.dyn_into::<js_sys::Function>() else {
        return;
    };
    let _ = error_fn.call1(&console, &JsValue::from_str(msg));
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(loc) = info.location() {
                format!(
                    "panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                )
            } else {
                format!("panic: {info}")
            };
            console_error(&msg);
        }));
    });
}

fn set_js(obj: &Object, key: &str, value: JsValue) {
    let _ = Reflect::set(obj, &JsValue::from_str(key), &value);
}

fn js_error(msg: &str) -> JsValue {
    js_sys::Error::new(msg).into()
}

fn query_all(root: &Document, selector: &str) -> Vec<Element> {
    let Ok(list) = root.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|idx| list.item(idx))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn query_one(root: &Document, selector: &str) -> Option<HtmlElement> {
    root.query_selector(selector)
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
}

fn set_style(el: &HtmlElement, property: &str, value: &str) {
    let _ = el.style().set_property(property, value);
}

fn set_display(el: Option<&HtmlElement>, shown: bool, display: &str) {
    if let Some(el) = el {
        set_style(el, "display", if shown { display } else { "none" });
    }
}

/// Live elements behind the ids of a scanned [`PageLayout`].
#[derive(Default)]
struct DomHandles {
    sections: Vec<(SectionId, Element)>,
    controls: Vec<Element>,
    fields: [Option<Element>; 4],
    form: Option<HtmlElement>,
    form_error: Option<Element>,
    submit: Option<HtmlElement>,
    success: Option<HtmlElement>,
    mobile_menu: Option<HtmlElement>,
    background: Option<HtmlElement>,
    elements: Vec<HtmlElement>,
}

impl DomHandles {
    fn control(&self, idx: u32) -> Option<&Element> {
        self.controls.get(idx as usize)
    }

    fn html_control(&self, role: ControlRole, layout: &PageLayout) -> Option<HtmlElement> {
        layout
            .controls()
            .iter()
            .find(|c| c.role == role)
            .and_then(|c| self.control(c.id.get()))
            .and_then(|el| el.clone().dyn_into::<HtmlElement>().ok())
    }
}

/// Read the markup into a layout, tagging every bound element with its id.
fn scan_page(document: &Document, config: &SiteConfig) -> (PageLayout, DomHandles) {
    let mut layout = PageLayout::new();
    let mut dom = DomHandles::default();

    for el in query_all(document, ".section") {
        let id = el.id();
        if id.is_empty() {
            continue;
        }
        let section = SectionId::new(id);
        if el.class_list().contains("active") && layout.initial_section().is_none() {
            layout.set_initial_section(section.clone());
        }
        layout.push_section(section.clone());
        dom.sections.push((section, el));
    }

    for (selector, role) in CONTROL_QUERIES {
        for el in query_all(document, selector) {
            let id = layout.push_control(role, el.get_attribute("href"));
            let _ = el.set_attribute(CONTROL_ATTR, &id.get().to_string());
            dom.controls.push(el);
        }
    }

    dom.form = query_one(document, "#greetingForm");
    if let Some(form) = &dom.form {
        for field in FieldName::ALL {
            let selector = format!("[name=\"{}\"]", field.wire_name());
            if let Ok(Some(el)) = form.query_selector(&selector) {
                layout.push_field(field);
                dom.fields[field.index()] = Some(el);
            }
        }
        dom.form_error = form.query_selector(".form-error").ok().flatten().or_else(|| {
            let el = document.create_element("div").ok()?;
            el.set_class_name("form-error");
            form.append_child(&el).ok()?;
            Some(el)
        });
        dom.submit = form
            .query_selector(".btn-submit")
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());
    }
    if let Some(submit) = &dom.submit {
        let label = submit.text_content().unwrap_or_default();
        layout.set_submit_label(label.trim());
    }

    dom.success = query_one(document, "#successMessage");
    layout.set_success_message(dom.success.is_some());
    dom.mobile_menu = query_one(document, ".mobile-menu");
    layout.set_mobile_menu(dom.mobile_menu.is_some());
    dom.background = query_one(document, ".hero-background");
    layout.set_background(dom.background.is_some());

    for target in &config.animator.reveal_targets {
        for el in query_all(document, &target.selector.to_string()) {
            let Ok(el) = el.dyn_into::<HtmlElement>() else {
                continue;
            };
            if dom.elements.contains(&el) {
                continue;
            }
            let dom_id = Some(el.id()).filter(|id| !id.is_empty());
            let classes = el
                .class_name()
                .split_whitespace()
                .map(str::to_owned)
                .collect();
            let id = layout.push_element(dom_id, classes);
            let _ = el.set_attribute(ELEMENT_ATTR, &id.get().to_string());
            dom.elements.push(el);
        }
    }

    (layout, dom)
}

fn apply_patch(dom: &DomHandles, layout: &PageLayout, patch: &DomPatch) {
    match patch {
        DomPatch::SectionVisibility { section, visible } => {
            if let Some((_, el)) = dom.sections.iter().find(|(id, _)| id == section) {
                let _ = el.class_list().toggle_with_force("active", *visible);
            }
        }
        DomPatch::ControlActive { control, active } => {
            if let Some(el) = dom.control(control.get()) {
                let _ = el.class_list().toggle_with_force("active", *active);
            }
        }
        DomPatch::MobileMenu { open } => {
            set_display(dom.mobile_menu.as_ref(), *open, "flex");
        }
        DomPatch::FieldValue { field, value } => {
            if let Some(el) = &dom.fields[field.index()] {
                if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
                    input.set_value(value);
                } else if let Some(area) = el.dyn_ref::<HtmlTextAreaElement>() {
                    area.set_value(value);
                }
            }
        }
        DomPatch::FieldError { field, message } => {
            let Some(el) = &dom.fields[field.index()] else {
                return;
            };
            let slot = el
                .parent_element()
                .and_then(|parent| parent.query_selector(".error-message").ok().flatten());
            let Some(slot) = slot else {
                return;
            };
            slot.set_text_content(Some(message.as_deref().unwrap_or_default()));
            if let Some(html) = el.dyn_ref::<HtmlElement>() {
                let border = if message.is_some() { ERROR_BORDER } else { "" };
                set_style(html, "border-color", border);
            }
        }
        DomPatch::FormError { message } => {
            if let Some(el) = &dom.form_error {
                el.set_text_content(message.as_deref());
            }
        }
        DomPatch::SubmitButton { label, disabled } => {
            if let Some(el) = &dom.submit {
                el.set_text_content(Some(label));
                if let Some(button) = el.dyn_ref::<HtmlButtonElement>() {
                    button.set_disabled(*disabled);
                } else if *disabled {
                    let _ = el.set_attribute("disabled", "");
                } else {
                    let _ = el.remove_attribute("disabled");
                }
            }
        }
        DomPatch::FormVisibility { visible } => {
            set_display(dom.form.as_ref(), *visible, "block");
        }
        DomPatch::SuccessVisibility { visible } => {
            set_display(dom.success.as_ref(), *visible, "block");
        }
        DomPatch::Reveal {
            element,
            style,
            phase,
        } => {
            let Some(el) = dom.elements.get(element.get() as usize) else {
                return;
            };
            set_style(el, "opacity", phase.opacity());
            set_style(el, "transform", phase.transform(*style));
            set_style(el, "transition", REVEAL_TRANSITION);
        }
        DomPatch::BackgroundOffset { offset_px } => {
            if let Some(el) = &dom.background {
                set_style(el, "transform", &format!("translateY({offset_px}px)"));
            }
        }
        DomPatch::FlagPulse { running } => {
            if let Some(flag) = dom.html_control(ControlRole::Flag, layout) {
                set_style(&flag, "animation", if *running { FLAG_ANIMATION } else { "none" });
            }
        }
    }
}

fn apply_effect(window: &Window, effect: &HostEffect) {
    match effect {
        HostEffect::SetFragment { fragment, mode } => {
            let Ok(history) = window.history() else {
                return;
            };
            let result = match mode {
                HistoryMode::Replace => {
                    history.replace_state_with_url(&JsValue::NULL, "", Some(fragment.as_str()))
                }
                HistoryMode::Push => {
                    history.push_state_with_url(&JsValue::NULL, "", Some(fragment.as_str()))
                }
            };
            if result.is_err() {
                console_error(&format!("pageflow: history write failed for {fragment}"));
            }
        }
        HostEffect::ScrollToTop { smooth } => {
            let options = ScrollToOptions::new();
            options.set_top(0.0);
            options.set_behavior(if *smooth {
                ScrollBehavior::Smooth
            } else {
                ScrollBehavior::Auto
            });
            window.scroll_to_with_scroll_to_options(&options);
        }
    }
}

fn step_result_to_js(result: StepResult) -> JsValue {
    let obj = Object::new();
    set_js(
        &obj,
        "events_processed",
        JsValue::from_f64(result.events_processed as f64),
    );
    set_js(
        &obj,
        "messages_processed",
        JsValue::from_f64(result.messages_processed as f64),
    );
    set_js(
        &obj,
        "timers_fired",
        JsValue::from_f64(result.timers_fired as f64),
    );
    set_js(&obj, "rendered", result.rendered.into());
    set_js(
        &obj,
        "patch_count",
        JsValue::from_f64(result.patch_count as f64),
    );
    obj.into()
}

/// WASM page runner for a single-page site.
///
/// Host-driven: JavaScript forwards DOM listeners as encoded events, calls
/// `step()` after each batch, `advanceTime()` from a timer or animation
/// frame, and `frame()` when `hasPendingFrame()` asked for one. Bound
/// controls carry `data-pageflow-control` and observed elements carry
/// `data-pageflow-element` so listeners can encode ids.
#[wasm_bindgen]
pub struct SiteRunner {
    inner: RunnerCore,
    dom: DomHandles,
}

#[wasm_bindgen(start)]
pub fn wasm_start() {
    install_panic_hook();
}

#[wasm_bindgen]
impl SiteRunner {
    /// Scan the live document and start the controller.
    ///
    /// `config_json` overrides the defaults. Missing required markup or an
    /// invalid configuration is thrown as a JS error.
    pub fn mount(config_json: Option<String>) -> Result<SiteRunner, JsValue> {
        install_panic_hook();
        let config = match config_json.as_deref() {
            Some(json) => {
                SiteConfig::from_json_str(json).map_err(|err| js_error(&err.to_string()))?
            }
            None => SiteConfig::default(),
        };
        let window = web_sys::window().ok_or_else(|| js_error("pageflow: no window"))?;
        let document = window
            .document()
            .ok_or_else(|| js_error("pageflow: no document"))?;
        let (layout, dom) = scan_page(&document, &config);
        let fragment = window.location().hash().unwrap_or_default();
        let inner = RunnerCore::new(config, layout, &fragment)
            .map_err(|err| js_error(&format!("pageflow: {err}")))?;
        Ok(Self { inner, dom })
    }

    /// Parse a JSON-encoded event and push it to the event queue.
    /// Returns `true` if accepted, `false` if malformed.
    #[wasm_bindgen(js_name = pushEvent)]
    pub fn push_event(&mut self, json: &str) -> bool {
        self.inner.push_encoded_event(json)
    }

    /// Queue a programmatic navigation to `section`.
    #[wasm_bindgen(js_name = navigateTo)]
    pub fn navigate_to(&mut self, section: &str) {
        self.inner.navigate_to(section);
    }

    /// Advance deterministic clock by `dt_ms` milliseconds.
    #[wasm_bindgen(js_name = advanceTime)]
    pub fn advance_time(&mut self, dt_ms: f64) {
        self.inner.advance_time_ms(dt_ms);
    }

    /// Set deterministic clock to absolute milliseconds.
    #[wasm_bindgen(js_name = setTime)]
    pub fn set_time(&mut self, ts_ms: f64) {
        self.inner.set_time_ms(ts_ms);
    }

    /// Process queued events and due timers.
    /// Returns `{ events_processed, messages_processed, timers_fired, rendered, patch_count }`.
    pub fn step(&mut self) -> JsValue {
        step_result_to_js(self.inner.step())
    }

    /// Deliver the pending animation frame.
    pub fn frame(&mut self) -> JsValue {
        step_result_to_js(self.inner.frame())
    }

    #[wasm_bindgen(js_name = hasPendingFrame)]
    pub fn has_pending_frame(&self) -> bool {
        self.inner.has_pending_frame()
    }

    /// Milliseconds until the next timer, or `undefined` when none is pending.
    #[wasm_bindgen(js_name = nextTimerDelayMs)]
    pub fn next_timer_delay_ms(&self) -> Option<f64> {
        self.inner.next_timer_delay_ms()
    }

    /// Take pending DOM patches as a JSON array (for custom hosts).
    #[wasm_bindgen(js_name = takePatchesJson)]
    pub fn take_patches_json(&mut self) -> String {
        self.inner.take_patches_json()
    }

    /// Take pending host effects as a JSON array (for custom hosts).
    #[wasm_bindgen(js_name = takeEffectsJson)]
    pub fn take_effects_json(&mut self) -> String {
        self.inner.take_effects_json()
    }

    /// Apply pending patches, then pending effects, to the live page.
    /// Returns the number of patches applied.
    #[wasm_bindgen(js_name = applyToDom)]
    pub fn apply_to_dom(&mut self) -> u32 {
        let patches = self.inner.take_patches();
        for patch in &patches {
            apply_patch(&self.dom, self.inner.layout(), patch);
        }
        let effects = self.inner.take_effects();
        if let Some(window) = web_sys::window() {
            for effect in &effects {
                apply_effect(&window, effect);
            }
        }
        patches.len() as u32
    }

    /// Take log lines as a JS array of strings.
    #[wasm_bindgen(js_name = takeLogs)]
    pub fn take_logs(&mut self) -> Array {
        let arr = Array::new();
        for log in self.inner.take_logs() {
            arr.push(&JsValue::from_str(&log));
        }
        arr
    }

    /// Id of the section currently shown.
    #[wasm_bindgen(js_name = currentSection)]
    pub fn current_section(&self) -> Option<String> {
        self.inner.current_section()
    }
}
