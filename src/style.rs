//! Immutable look of the component. Hosts map these values onto their own renderer.

/// Colours are CSS colour strings; lengths are pixels unless noted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Style {
    pub border_width: u16,
    pub border_radius: u16,
    pub border_color: String,
    pub highlight_color: String,
    pub padding: u16,
    pub height: u16,
    pub file_card_width: u16,
    pub file_card_height: u16,
    pub file_card_background: String,
    /// Width of the progress track as a percentage of the file card.
    pub progress_track_percent: u8,
    pub progress_track_color: String,
    pub progress_fill_color: String,
    pub progress_fill_height: u16,
    /// Duration of the fill width transition, in milliseconds.
    pub progress_transition_ms: u32,
    pub file_name_font_size: u16,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            border_width: 2,
            border_radius: 20,
            border_color: "#ccc".into(),
            highlight_color: "purple".into(),
            padding: 20,
            height: 240,
            file_card_width: 100,
            file_card_height: 120,
            file_card_background: "linear-gradient(to bottom, #eee, #ddd)".into(),
            progress_track_percent: 80,
            progress_track_color: "#e0e0e0".into(),
            progress_fill_color: "#659cef".into(),
            progress_fill_height: 10,
            progress_transition_ms: 500,
            file_name_font_size: 14,
        }
    }
}

/// Resolved drop-area box for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropAreaStyle<'a> {
    pub border_width: u16,
    pub border_color: &'a str,
    pub border_radius: u16,
    pub padding: u16,
    pub height: u16,
}

impl Style {
    pub fn drop_area(&self, highlighted: bool) -> DropAreaStyle<'_> {
        DropAreaStyle {
            border_width: self.border_width,
            border_color: if highlighted {
                &self.highlight_color
            } else {
                &self.border_color
            },
            border_radius: self.border_radius,
            padding: self.padding,
            height: self.height,
        }
    }
}
