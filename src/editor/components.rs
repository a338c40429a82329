//! Widget model for the editor panel
//!
//! Toolkit-agnostic: the editor decides labels, enablement, colours and
//! bounds; a front end only draws what it finds here.

/// 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Colour {
    pub const LIGHT_BLUE: Colour = Colour::from_rgb(0xad, 0xd8, 0xe6);
    pub const DODGER_BLUE: Colour = Colour::from_rgb(0x1e, 0x90, 0xff);
    pub const CORNFLOWER_BLUE: Colour = Colour::from_rgb(0x64, 0x95, 0xed);

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Integer rectangle in editor coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rectangle {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// A clickable button with a text label
#[derive(Debug, Clone, PartialEq)]
pub struct TextButton {
    label: String,
    enabled: bool,
    colour: Option<Colour>,
    bounds: Rectangle,
}

impl TextButton {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            enabled: true,
            colour: None,
            bounds: Rectangle::default(),
        }
    }

    pub fn with_colour(mut self, colour: Colour) -> Self {
        self.colour = Some(colour);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: &str) {
        if self.label != label {
            self.label = label.to_string();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Fill colour; None means the toolkit default
    pub fn colour(&self) -> Option<Colour> {
        self.colour
    }

    pub fn bounds(&self) -> Rectangle {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Rectangle) {
        self.bounds = bounds;
    }
}
