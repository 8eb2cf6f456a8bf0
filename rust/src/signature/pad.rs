//! Freehand signature pad.
//!
//! "Has signature" flips to true when a stroke ends and back to false only on
//! `clear`. A press and release without movement is a dot and counts as ink.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use super::canvas::{Canvas, Rgba};
use super::encode::{encode_png, to_data_url};
use super::geometry::{BoundingRect, Gesture, Point, PointerEvent};
use super::theme::{Subscription, ThemeSignal};
use super::SignatureError;
use crate::crypto::integrity::fingerprint;

pub const DEFAULT_CANVAS_HEIGHT: u32 = 200;
pub const DEFAULT_STROKE_WIDTH: f32 = 2.0;
/// Largest width or height the surface will allocate.
pub const MAX_CANVAS_DIMENSION: u32 = 4096;

#[derive(Debug, Clone, PartialEq)]
pub struct PadConfig {
    pub height: u32,
    pub stroke_width: f32,
    pub light_pen: Rgba,
    pub dark_pen: Rgba,
}

impl Default for PadConfig {
    fn default() -> Self {
        Self {
            height: DEFAULT_CANVAS_HEIGHT,
            stroke_width: DEFAULT_STROKE_WIDTH,
            light_pen: Rgba::BLACK,
            dark_pen: Rgba::WHITE,
        }
    }
}

/// One press-drag-release gesture.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stroke {
    points: Vec<Point>,
}

impl Stroke {
    pub fn points(&self) -> &[Point] {
        &self.points
    }
}

type Listener = Box<dyn FnMut(&str) + Send>;

pub struct SignaturePad {
    canvas: Canvas,
    config: PadConfig,
    dark: Arc<AtomicBool>,
    strokes: Vec<Stroke>,
    active: Option<Stroke>,
    has_signature: bool,
    listener: Option<Listener>,
    _theme: Subscription,
}

/// Canvas width for a given layout width, kept within `1..=MAX_CANVAS_DIMENSION`.
pub fn canvas_width(layout_width: f32) -> u32 {
    layout_width.max(1.0).min(MAX_CANVAS_DIMENSION as f32).floor() as u32
}

impl SignaturePad {
    /// Sizes the surface from the layout width and starts observing the theme.
    pub fn mount(layout_width: f32, theme: &ThemeSignal, config: PadConfig) -> Self {
        let dark = Arc::new(AtomicBool::new(theme.current().is_dark()));
        let observed = Arc::clone(&dark);
        let subscription = theme.subscribe(move |theme| {
            observed.store(theme.is_dark(), Ordering::SeqCst);
        });

        Self {
            canvas: Canvas::new(
                canvas_width(layout_width),
                config.height.clamp(1, MAX_CANVAS_DIMENSION),
            ),
            config,
            dark,
            strokes: Vec::new(),
            active: None,
            has_signature: false,
            listener: None,
            _theme: subscription,
        }
    }

    /// Registers the receiver of emitted values: a data URL on confirm, `""`
    /// on clear. Replaces any previous listener.
    pub fn on_change<F>(&mut self, listener: F)
    where
        F: FnMut(&str) + Send + 'static,
    {
        self.listener = Some(Box::new(listener));
    }

    pub fn width(&self) -> u32 {
        self.canvas.width()
    }

    pub fn height(&self) -> u32 {
        self.canvas.height()
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn has_signature(&self) -> bool {
        self.has_signature
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn is_drawing(&self) -> bool {
        self.active.is_some()
    }

    pub fn pen_color(&self) -> Rgba {
        if self.dark.load(Ordering::SeqCst) {
            self.config.dark_pen
        } else {
            self.config.light_pen
        }
    }

    fn has_ink(&self) -> bool {
        self.active.is_some() || !self.strokes.is_empty()
    }

    /// Starts a new path at `point`. An unfinished stroke is ended first.
    pub fn begin_stroke(&mut self, point: Point) {
        if self.active.is_some() {
            self.end_stroke();
        }
        let pen = self.pen_color();
        self.canvas
            .stroke_segment(point, point, self.config.stroke_width, pen);
        self.active = Some(Stroke {
            points: vec![point],
        });
    }

    pub fn extend_stroke(&mut self, point: Point) {
        let pen = self.pen_color();
        let width = self.config.stroke_width;
        let Some(stroke) = self.active.as_mut() else {
            return;
        };
        if let Some(&last) = stroke.points.last() {
            self.canvas.stroke_segment(last, point, width, pen);
        }
        stroke.points.push(point);
    }

    pub fn end_stroke(&mut self) {
        if let Some(stroke) = self.active.take() {
            self.strokes.push(stroke);
        }
        if !self.strokes.is_empty() {
            self.has_signature = true;
        }
    }

    /// Erases everything and emits the empty value.
    pub fn clear(&mut self) {
        self.canvas.clear();
        self.strokes.clear();
        self.active = None;
        self.has_signature = false;
        self.emit("");
    }

    /// Encodes and emits the signature. Does nothing for an empty pad.
    pub fn confirm(&mut self) -> Result<Option<String>, SignatureError> {
        let Some(url) = self.snapshot()? else {
            debug!("confirm ignored: no signature drawn");
            return Ok(None);
        };
        self.emit(&url);
        Ok(Some(url))
    }

    /// The current signature as a data URL, without emitting it.
    pub fn snapshot(&self) -> Result<Option<String>, SignatureError> {
        if !self.has_signature {
            return Ok(None);
        }
        let png = encode_png(&self.canvas)?;
        debug!(bytes = png.len(), digest = %fingerprint(&png), "encoded signature");
        Ok(Some(to_data_url(&png)))
    }

    /// Follows a layout change. Ignored once ink is on the surface so drawn
    /// strokes are never discarded.
    pub fn resize(&mut self, layout_width: f32) -> bool {
        if self.has_ink() {
            debug!("resize ignored: surface already has ink");
            return false;
        }
        let width = canvas_width(layout_width);
        if width != self.canvas.width() {
            self.canvas.resize(width);
        }
        true
    }

    /// Routes raw mouse or touch input through the surface's bounding rect.
    pub fn handle(&mut self, event: &PointerEvent, rect: &BoundingRect) {
        match event.gesture(rect) {
            Some(Gesture::Begin(point)) => self.begin_stroke(point),
            Some(Gesture::Extend(point)) => self.extend_stroke(point),
            Some(Gesture::End) => self.end_stroke(),
            None => {}
        }
    }

    fn emit(&mut self, value: &str) {
        if let Some(listener) = self.listener.as_mut() {
            listener(value);
        }
    }
}
