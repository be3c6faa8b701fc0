//! Legend for the control page.
//!
//! A button is only a label and a colour drawn over a command index. The
//! table never decides what may be transmitted.

use serde::Deserialize;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
pub struct Rgba(pub u8, pub u8, pub u8, pub u8);

impl Rgba {
    pub const GREY: Rgba = Rgba(187, 187, 187, 255);
    pub const BLACK: Rgba = Rgba(8, 8, 8, 255);
    pub const RED: Rgba = Rgba(204, 0, 0, 255);
    pub const WHITE: Rgba = Rgba(255, 255, 255, 255);

    /// Opaque colour from channel levels 0..=5
    pub const fn level(r: u8, g: u8, b: u8) -> Self {
        Rgba(r * 51, g * 51, b * 51, 255)
    }

    pub fn css(&self) -> String {
        format!(
            "rgba({}, {}, {}, {:.3})",
            self.0,
            self.1,
            self.2,
            f32::from(self.3) / 255.0
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ButtonDescriptor {
    #[serde(default)]
    pub label: String,
    pub color: Rgba,
}

impl ButtonDescriptor {
    pub fn new(label: &str, color: Rgba) -> Self {
        ButtonDescriptor {
            label: label.to_string(),
            color,
        }
    }
}

/// Buttons in command order: entry `n` sends command `n`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ButtonTable {
    #[serde(rename = "button", default)]
    buttons: Vec<ButtonDescriptor>,
}

impl ButtonTable {
    pub fn new(buttons: Vec<ButtonDescriptor>) -> Self {
        ButtonTable { buttons }
    }

    /// Command index and button, for the first 256 entries
    pub fn iter(&self) -> impl Iterator<Item = (u8, &ButtonDescriptor)> {
        (0..=u8::MAX).zip(self.buttons.iter())
    }

    pub fn get(&self, cmd: u8) -> Option<&ButtonDescriptor> {
        self.buttons.get(usize::from(cmd))
    }

    pub fn len(&self) -> usize {
        self.buttons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }
}

impl Default for ButtonTable {
    /// The 24 key remote shipped with common RGB strips
    fn default() -> Self {
        use crate::buttons::Rgba as C;

        let b = ButtonDescriptor::new;
        ButtonTable::new(vec![
            b("\u{2795}", C::GREY), b("\u{2796}", C::GREY), b("OFF", C::BLACK), b("ON", C::RED),
            b("", C::level(5, 0, 0)), b("", C::level(0, 5, 0)), b("", C::level(0, 0, 5)), b("", C::WHITE),
            b("", C::level(5, 2, 0)), b("", C::level(0, 5, 2)), b("", C::level(2, 0, 5)), b("STROBE", C::GREY),
            b("", C::level(5, 4, 0)), b("", C::level(0, 5, 4)), b("", C::level(4, 0, 5)), b("FADE", C::GREY),
            b("", C::level(4, 5, 0)), b("", C::level(0, 4, 5)), b("", C::level(5, 0, 4)), b("SMOOTH", C::GREY),
            b("", C::level(2, 5, 0)), b("", C::level(0, 2, 5)), b("", C::level(5, 0, 2)), b("FLASH", C::GREY),
        ])
    }
}
