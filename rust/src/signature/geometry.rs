//! Points and pointer input in viewport and canvas-local space.

/// A position in canvas-local pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Top-left corner of the drawing surface's bounding rectangle, in viewport
/// coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingRect {
    pub left: f32,
    pub top: f32,
}

impl BoundingRect {
    pub fn new(left: f32, top: f32) -> Self {
        Self { left, top }
    }

    /// Translates a viewport position into canvas-local space.
    pub fn to_local(&self, client_x: f32, client_y: f32) -> Point {
        Point::new(client_x - self.left, client_y - self.top)
    }
}

/// What a pointer event asks the pad to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Begin(Point),
    Extend(Point),
    End,
}

/// Raw input as delivered by the host. Touch events carry every active touch;
/// only the first one draws.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    MouseDown { client_x: f32, client_y: f32 },
    MouseMove { client_x: f32, client_y: f32 },
    MouseUp,
    TouchStart { touches: Vec<(f32, f32)> },
    TouchMove { touches: Vec<(f32, f32)> },
    TouchEnd,
}

impl PointerEvent {
    /// Maps the event onto a gesture. Mouse and touch share the same
    /// translation; touch events without touches map to nothing.
    pub fn gesture(&self, rect: &BoundingRect) -> Option<Gesture> {
        match self {
            PointerEvent::MouseDown { client_x, client_y } => {
                Some(Gesture::Begin(rect.to_local(*client_x, *client_y)))
            }
            PointerEvent::MouseMove { client_x, client_y } => {
                Some(Gesture::Extend(rect.to_local(*client_x, *client_y)))
            }
            PointerEvent::TouchStart { touches } => touches
                .first()
                .map(|&(x, y)| Gesture::Begin(rect.to_local(x, y))),
            PointerEvent::TouchMove { touches } => touches
                .first()
                .map(|&(x, y)| Gesture::Extend(rect.to_local(x, y))),
            PointerEvent::MouseUp | PointerEvent::TouchEnd => Some(Gesture::End),
        }
    }
}
