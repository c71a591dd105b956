//! Browser adapter: drives an [`Escalator`] from DOM events and mirrors the
//! rendered body rows into real elements.
//!
//! ```javascript
//! import init, { WebEscalator } from 'escalator';
//! await init();
//! const grid = new WebEscalator(container, { height: 400 });
//! grid.insert_columns(0, 5);
//! grid.insert_rows('body', 0, 10000);
//! grid.attach();
//! container.addEventListener('wheel', (e) => grid.on_wheel(e), { passive: false });
//! ```

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, WheelEvent};

use crate::config::EscalatorConfig;
use crate::container::{DomMove, ElementId, Section};
use crate::escalator::{Escalator, WheelDeltaMode};
use crate::layout::ScrollDestination;

fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
}

#[wasm_bindgen]
pub struct WebEscalator {
    engine: Escalator,
    document: Document,
    body_root: HtmlElement,
    rows: HashMap<ElementId, HtmlElement>,
}

#[wasm_bindgen]
impl WebEscalator {
    /// Create an engine rendering its body rows into `body_root`.
    #[wasm_bindgen(constructor)]
    pub fn new(body_root: HtmlElement, config: JsValue) -> Result<WebEscalator, JsValue> {
        console_error_panic_hook::set_once();
        let config: EscalatorConfig = if config.is_undefined() || config.is_null() {
            EscalatorConfig::default()
        } else {
            from_js(config)?
        };
        let document = body_root
            .owner_document()
            .ok_or_else(|| JsValue::from_str("root element is not in a document"))?;
        Ok(Self {
            engine: Escalator::new(config)?,
            document,
            body_root,
            rows: HashMap::new(),
        })
    }

    pub fn insert_rows(&mut self, section: JsValue, index: usize, count: usize) -> Result<(), JsValue> {
        let section: Section = from_js(section)?;
        self.engine.insert_rows(section, index, count)?;
        self.sync_rows()
    }

    pub fn remove_rows(&mut self, section: JsValue, index: usize, count: usize) -> Result<(), JsValue> {
        let section: Section = from_js(section)?;
        self.engine.remove_rows(section, index, count)?;
        self.sync_rows()
    }

    pub fn insert_columns(&mut self, index: usize, count: usize) -> Result<(), JsValue> {
        self.engine.insert_columns(index, count)?;
        self.sync_rows()
    }

    pub fn remove_columns(&mut self, index: usize, count: usize) -> Result<(), JsValue> {
        self.engine.remove_columns(index, count)?;
        self.sync_rows()
    }

    pub fn set_frozen_column_count(&mut self, count: usize) -> Result<(), JsValue> {
        self.engine.set_frozen_column_count(count)?;
        Ok(())
    }

    pub fn set_column_width(&mut self, index: usize, px: f64) -> Result<(), JsValue> {
        self.engine.set_column_width(index, px)?;
        self.sync_rows()
    }

    pub fn set_spacer(&mut self, row: i32, height: f64) -> Result<(), JsValue> {
        self.engine.set_spacer(i64::from(row), height)?;
        self.sync_rows()
    }

    pub fn set_size(&mut self, width: f64, height: f64) -> Result<(), JsValue> {
        self.engine.set_size(width, height)?;
        self.sync_rows()
    }

    pub fn set_scroll_top(&mut self, px: f64) -> Result<(), JsValue> {
        self.engine.set_scroll_top(px);
        self.sync_rows()
    }

    pub fn set_scroll_left(&mut self, px: f64) {
        self.engine.set_scroll_left(px);
    }

    pub fn scroll_to_row(&mut self, row: usize, destination: JsValue, padding: f64) -> Result<(), JsValue> {
        let destination: ScrollDestination = from_js(destination)?;
        self.engine.scroll_to_row(row, destination, padding)?;
        self.sync_rows()
    }

    pub fn attach(&mut self) -> Result<(), JsValue> {
        self.engine.attach();
        self.engine.flush_deferred();
        self.sync_rows()
    }

    pub fn detach(&mut self) -> Result<(), JsValue> {
        self.engine.detach();
        self.sync_rows()
    }

    /// Scroll by a wheel event, cancelling it when the escalator used it.
    pub fn on_wheel(&mut self, event: &WheelEvent) -> Result<(), JsValue> {
        let mode = WheelDeltaMode::from_dom(event.delta_mode()).unwrap_or_default();
        if self.engine.on_wheel(event.delta_x(), event.delta_y(), mode) {
            event.prevent_default();
        }
        self.sync_rows()
    }

    pub fn on_touch_start(&mut self, x: f64, y: f64) {
        self.engine.on_touch_start(x, y);
    }

    pub fn on_touch_move(&mut self, x: f64, y: f64) -> Result<bool, JsValue> {
        let prevent = self.engine.on_touch_move(x, y);
        self.sync_rows()?;
        Ok(prevent)
    }

    pub fn on_touch_end(&mut self) {
        self.engine.on_touch_end();
    }

    /// Call from `requestAnimationFrame`. Replays the DOM resync moves.
    pub fn on_animation_frame(&mut self) -> Result<(), JsValue> {
        if self.engine.flush_deferred() {
            self.sync_rows()?;
        }
        let moves = self.engine.on_animation_frame();
        self.apply_moves(&moves)
    }

    pub fn is_work_pending(&self) -> bool {
        self.engine.is_work_pending()
    }

    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        to_js(&self.engine.snapshot())
    }

    pub fn drain_events(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.engine.drain_events())
    }

    pub fn sub_part_element(&mut self, name: &str) -> Result<JsValue, JsValue> {
        let part = self.engine.sub_part_element(name);
        self.sync_rows()?;
        to_js(&part)
    }
}

impl WebEscalator {
    /// Create, position and drop row elements to match the rendered window.
    fn sync_rows(&mut self) -> Result<(), JsValue> {
        let rendered: Vec<ElementId> = self.engine.body().visual_row_order().iter().copied().collect();
        self.rows.retain(|id, element| {
            let keep = rendered.contains(id);
            if !keep {
                element.remove();
            }
            keep
        });
        for id in rendered {
            let element = match self.rows.get(&id) {
                Some(element) => element.clone(),
                None => {
                    let element: HtmlElement = self.document.create_element("tr")?.dyn_into()?;
                    self.body_root.append_child(&element)?;
                    self.rows.insert(id, element.clone());
                    element
                }
            };
            let top = self.engine.positions().top(id);
            element
                .style()
                .set_property("transform", &format!("translate(0px, {top}px)"))?;
            if let Some(name) = self.engine.sub_part_name_of(id) {
                element.set_attribute("data-sub-part", &name)?;
            }
        }
        Ok(())
    }

    fn apply_moves(&self, moves: &[DomMove]) -> Result<(), JsValue> {
        for step in moves {
            match step {
                DomMove::First { element } => {
                    if let Some(node) = self.rows.get(element) {
                        let first = self.body_root.first_child();
                        self.body_root.insert_before(node, first.as_ref())?;
                    }
                }
                DomMove::After { element, anchor } => {
                    if let (Some(node), Some(anchor)) = (self.rows.get(element), self.rows.get(anchor)) {
                        let next = anchor.next_sibling();
                        self.body_root.insert_before(node, next.as_ref())?;
                    }
                }
            }
        }
        Ok(())
    }
}
