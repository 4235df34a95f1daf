//! [`Page`] over the real document.

use runtime::LogEntry;
use scene::Viewport;
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlCanvasElement, HtmlElement, HtmlImageElement, Window};

use crate::config::{ClientConfig, EyeImageConfig};
use crate::error::{ClientError, dom_err};
use crate::page::{Badge, ConnectionIndicator, EyeImage, Page};

/// The buttons the client wires up. `reset_animation` is optional.
#[derive(Clone)]
pub struct Controls {
    pub test_connection: Element,
    pub test_animation: Element,
    pub reset_animation: Option<Element>,
}

pub struct DomPage {
    window: Window,
    document: Document,
    connection_status: Element,
    canvas_container: HtmlElement,
    eye_images: Element,
    debug_messages: HtmlElement,
    processor_status: Option<Element>,
    monitoring_status: Option<Element>,
    keyboard_status: Option<Element>,
    controls: Controls,
    eye_config: EyeImageConfig,
}

impl DomPage {
    /// Looks up every element the client drives. Badges and the reset button
    /// are optional.
    pub fn bind(window: Window, config: &ClientConfig) -> Result<Self, ClientError> {
        let document = window
            .document()
            .ok_or_else(|| ClientError::Dom("document missing".into()))?;
        let ids = &config.elements;

        Ok(Self {
            connection_status: required(&document, &ids.connection_status)?,
            canvas_container: required_html(&document, &ids.canvas_container)?,
            eye_images: required(&document, &ids.eye_images)?,
            debug_messages: required_html(&document, &ids.debug_messages)?,
            processor_status: optional(&document, &ids.processor_status),
            monitoring_status: optional(&document, &ids.monitoring_status),
            keyboard_status: optional(&document, &ids.keyboard_status),
            controls: Controls {
                test_connection: required(&document, &ids.test_connection)?,
                test_animation: required(&document, &ids.test_animation)?,
                reset_animation: optional(&document, &ids.reset_animation),
            },
            eye_config: config.eye_images.clone(),
            window,
            document,
        })
    }

    /// Creates the drawing canvas inside the 3D container, sized in device
    /// pixels for the current viewport.
    pub fn create_canvas(&self) -> Result<HtmlCanvasElement, ClientError> {
        let canvas = self
            .document
            .create_element("canvas")
            .map_err(dom_err)?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| ClientError::Dom("canvas element has the wrong type".into()))?;
        let style = canvas.style();
        style.set_property("width", "100%").map_err(dom_err)?;
        style.set_property("height", "100%").map_err(dom_err)?;
        style.set_property("display", "block").map_err(dom_err)?;
        self.canvas_container.append_child(&canvas).map_err(dom_err)?;
        self.size_canvas(&canvas, self.viewport());
        Ok(canvas)
    }

    /// Sets the backing-store size for `viewport` and returns it in device pixels.
    pub fn size_canvas(&self, canvas: &HtmlCanvasElement, viewport: Viewport) -> (u32, u32) {
        let dpr = self.window.device_pixel_ratio().max(1.0);
        let width = (viewport.width * dpr).round().max(1.0) as u32;
        let height = (viewport.height * dpr).round().max(1.0) as u32;
        canvas.set_width(width);
        canvas.set_height(height);
        (width, height)
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }
}

fn required(document: &Document, id: &str) -> Result<Element, ClientError> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| ClientError::MissingElement(id.to_string()))
}

fn required_html(document: &Document, id: &str) -> Result<HtmlElement, ClientError> {
    required(document, id)?
        .dyn_into::<HtmlElement>()
        .map_err(|_| ClientError::Dom(format!("#{id} is not an html element")))
}

fn optional(document: &Document, id: &str) -> Option<Element> {
    let found = document.get_element_by_id(id);
    if found.is_none() {
        debug!(id, "optional element absent");
    }
    found
}

impl Page for DomPage {
    fn set_connection_status(&mut self, status: ConnectionIndicator) {
        self.connection_status.set_text_content(Some(status.label()));
        self.connection_status.set_class_name(status.css_class());
    }

    fn append_eye_image(&mut self, image: &EyeImage) -> Result<(), ClientError> {
        let img = self
            .document
            .create_element("img")
            .map_err(dom_err)?
            .dyn_into::<HtmlImageElement>()
            .map_err(|_| ClientError::Dom("img element has the wrong type".into()))?;
        img.set_class_name(&image.class);
        img.set_alt(&image.alt);

        // Fade in a little after the pixels arrive.
        let window = self.window.clone();
        let target = img.clone();
        let loaded_class = self.eye_config.loaded_class.clone();
        let delay_ms = self.eye_config.fade_in_delay_ms;
        let on_load = Closure::once_into_js(move || {
            let reveal = Closure::once_into_js(move || {
                if let Err(err) = target.class_list().add_1(&loaded_class) {
                    warn!(err = ?err, "could not reveal eye image");
                }
            });
            if let Err(err) = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                reveal.unchecked_ref(),
                delay_ms,
            ) {
                warn!(err = ?err, "could not schedule eye image fade-in");
            }
        });
        img.set_onload(Some(on_load.unchecked_ref()));
        img.set_src(&image.src);

        self.eye_images.append_child(&img).map_err(dom_err)?;
        Ok(())
    }

    fn append_log_line(&mut self, entry: &LogEntry) -> Result<(), ClientError> {
        let line = self.document.create_element("div").map_err(dom_err)?;
        line.set_class_name(entry.level.css_class());
        line.set_text_content(Some(entry.line().as_str()));
        self.debug_messages.append_child(&line).map_err(dom_err)?;
        self.debug_messages.set_scroll_top(self.debug_messages.scroll_height());
        Ok(())
    }

    fn remove_oldest_log_lines(&mut self, count: usize) {
        for _ in 0..count {
            match self.debug_messages.first_element_child() {
                Some(first) => first.remove(),
                None => break,
            }
        }
    }

    fn set_system_status(&mut self, processor: Badge, monitoring: Badge) {
        for (element, badge) in [
            (&self.processor_status, processor),
            (&self.monitoring_status, monitoring),
        ] {
            if let Some(element) = element {
                element.set_text_content(Some(badge.text.as_str()));
                element.set_class_name(badge.class);
            }
        }
    }

    fn set_keyboard_status(&mut self, badge: Badge) {
        if let Some(element) = &self.keyboard_status {
            element.set_text_content(Some(badge.text.as_str()));
            element.set_class_name(badge.class);
        }
    }

    fn viewport(&self) -> Viewport {
        let width = self.canvas_container.client_width().max(1) as f64;
        let height = self.canvas_container.client_height().max(1) as f64;
        Viewport::new(width, height)
    }
}
