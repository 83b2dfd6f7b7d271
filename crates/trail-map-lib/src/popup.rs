//! The shared info popup and its content

use crate::widget::MarkerId;

/// Maximum popup width in pixels
pub const POPUP_MAX_WIDTH: f32 = 400.0;

/// Content shown in the popup
#[derive(Clone, Debug, PartialEq)]
pub enum PopupContent {
    /// Plain text, may contain line breaks
    Text(String),
    /// Images shown full width, one after the other, with an optional trailing caption
    Images {
        sources: Vec<String>,
        caption: Option<String>,
    },
}

impl PopupContent {
    /// HTML fragment equivalent of the content (text is returned as-is)
    pub fn to_html(&self) -> String {
        match self {
            PopupContent::Text(text) => text.clone(),
            PopupContent::Images { sources, caption } => {
                let mut html: String = sources.iter().map(|src| image_tag(src)).collect();
                if let Some(caption) = caption {
                    html.push_str(caption);
                }
                html
            }
        }
    }
}

fn image_tag(src: &str) -> String {
    format!(r#"<IMG BORDER="0" STYLE="width:100%" SRC="{src}">"#)
}

/// Name of the pre-rendered thumbnail of a photo
///
/// Only the first `jpg` is replaced, case-sensitively.
pub fn thumbnail_name(filename: &str) -> String {
    filename.replacen("jpg", "png", 1)
}

/// URL of the thumbnail of `filename` under `base_url`
pub fn image_source(base_url: &str, filename: &str) -> String {
    format!("{}/images/{}", base_url, thumbnail_name(filename))
}

/// One popup shared by all markers
///
/// Opening it for a marker overwrites whatever it showed before.
#[derive(Clone, Debug)]
pub struct InfoPopup {
    content: Option<PopupContent>,
    anchor: Option<MarkerId>,
    max_width: f32,
}

impl Default for InfoPopup {
    fn default() -> Self {
        Self::new(POPUP_MAX_WIDTH)
    }
}

impl InfoPopup {
    pub fn new(max_width: f32) -> Self {
        Self {
            content: None,
            anchor: None,
            max_width,
        }
    }

    pub fn set_content(&mut self, content: PopupContent) {
        self.content = Some(content);
    }

    /// Show the popup at `anchor`, replacing any previous anchor
    pub fn open(&mut self, anchor: MarkerId) {
        self.anchor = Some(anchor);
    }

    pub fn close(&mut self) {
        self.anchor = None;
    }

    pub fn is_open(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn anchor(&self) -> Option<MarkerId> {
        self.anchor
    }

    pub fn content(&self) -> Option<&PopupContent> {
        self.content.as_ref()
    }

    pub fn max_width(&self) -> f32 {
        self.max_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thumbnail_name() {
        assert_eq!(thumbnail_name("IMG_1.jpg"), "IMG_1.png");
        assert_eq!(thumbnail_name("IMG_1.JPG"), "IMG_1.JPG");
        assert_eq!(thumbnail_name("jpg_1.jpg"), "png_1.jpg");
        assert_eq!(thumbnail_name("IMG_1.png"), "IMG_1.png");
    }

    #[test]
    fn test_image_source() {
        assert_eq!(
            image_source("https://example.org", "IMG_20170721_151308.jpg"),
            "https://example.org/images/IMG_20170721_151308.png"
        );
    }

    #[test]
    fn test_images_to_html() {
        let content = PopupContent::Images {
            sources: vec!["a.png".to_string(), "b.png".to_string()],
            caption: Some("2017-07-21 20:13:07".to_string()),
        };
        assert_eq!(
            content.to_html(),
            concat!(
                r#"<IMG BORDER="0" STYLE="width:100%" SRC="a.png">"#,
                r#"<IMG BORDER="0" STYLE="width:100%" SRC="b.png">"#,
                "2017-07-21 20:13:07"
            )
        );
    }

    #[test]
    fn test_text_to_html_is_verbatim() {
        let content = PopupContent::Text("Date: x \nAltitude: 1m".to_string());
        assert_eq!(content.to_html(), "Date: x \nAltitude: 1m");
    }

    #[test]
    fn test_popup_open_close() {
        let mut popup = InfoPopup::default();
        assert!(!popup.is_open());
        assert_eq!(popup.max_width(), 400.0);

        popup.set_content(PopupContent::Text("first".to_string()));
        popup.open(MarkerId(1));
        popup.set_content(PopupContent::Text("second".to_string()));
        popup.open(MarkerId(2));

        assert_eq!(popup.anchor(), Some(MarkerId(2)));
        assert_eq!(
            popup.content(),
            Some(&PopupContent::Text("second".to_string()))
        );

        popup.close();
        assert!(!popup.is_open());
    }
}
