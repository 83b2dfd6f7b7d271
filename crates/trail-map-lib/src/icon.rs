//! Marker icon styling

/// An sRGB color
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const RED: Rgb = Rgb(0xFF, 0x00, 0x00);
    pub const GREEN: Rgb = Rgb(0x00, 0x80, 0x00);
    pub const BLACK: Rgb = Rgb(0x00, 0x00, 0x00);
    pub const WHITE: Rgb = Rgb(0xFF, 0xFF, 0xFF);

    /// `#RRGGBB` notation
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// A circle drawn at the marker position
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CircleSymbol {
    pub stroke_color: Rgb,
    pub fill_color: Rgb,
    pub stroke_weight: f32,
    pub fill_opacity: f32,
    /// Radius in screen pixels
    pub scale: f32,
}

impl CircleSymbol {
    /// Track point (all but the last one)
    pub const TRACK_POINT: CircleSymbol = CircleSymbol {
        stroke_color: Rgb::RED,
        fill_color: Rgb::WHITE,
        stroke_weight: 2.0,
        fill_opacity: 1.0,
        scale: 5.0,
    };

    /// Photo cluster
    pub const CLUSTER: CircleSymbol = CircleSymbol {
        stroke_color: Rgb::GREEN,
        fill_color: Rgb::WHITE,
        stroke_weight: 2.0,
        fill_opacity: 1.0,
        scale: 3.0,
    };

    /// Standalone image
    pub const IMAGE: CircleSymbol = CircleSymbol {
        stroke_color: Rgb::BLACK,
        fill_color: Rgb::WHITE,
        stroke_weight: 2.0,
        fill_opacity: 1.0,
        scale: 2.0,
    };
}

/// How a marker is drawn
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MarkerIcon {
    /// The widget's default pin, used for the current position
    DefaultPin,
    Circle(CircleSymbol),
}

impl MarkerIcon {
    pub fn is_default(&self) -> bool {
        matches!(self, MarkerIcon::DefaultPin)
    }
}
