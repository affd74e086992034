use ratatui::style::Color;

use crate::config::Colors;
use crate::models::TimeSlot;

/// Parse a color string into a ratatui Color
/// Supports:
/// - Named colors: black, red, green, yellow, blue, magenta, cyan, white, gray/grey
/// - Extended named colors: darkgray, lightred, lightgreen, lightyellow, lightblue, lightmagenta, lightcyan
/// - Hex format: #RRGGBB or #RGB (short form)
/// - RGB format: rgb(255,0,0) or rgb(255, 0, 0)
/// Returns None for unrecognized colors
pub fn parse_color(color_str: &str) -> Option<Color> {
    let s = color_str.trim().to_lowercase();

    let named = match s.as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "white" => Color::White,
        "gray" | "grey" | "lightgray" | "lightgrey" => Color::Gray,
        "darkgray" | "darkgrey" => Color::DarkGray,
        "lightred" => Color::LightRed,
        "lightgreen" => Color::LightGreen,
        "lightyellow" => Color::LightYellow,
        "lightblue" => Color::LightBlue,
        "lightmagenta" => Color::LightMagenta,
        "lightcyan" => Color::LightCyan,
        _ if s.starts_with('#') => return parse_hex_color(&s),
        _ if s.starts_with("rgb(") => return parse_rgb_color(&s),
        _ => return None,
    };
    Some(named)
}

/// Parse hex color format (#RRGGBB or #RGB)
fn parse_hex_color(s: &str) -> Option<Color> {
    let hex = s.trim_start_matches('#');
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        6 => Some(Color::Rgb(
            u8::from_str_radix(&hex[0..2], 16).ok()?,
            u8::from_str_radix(&hex[2..4], 16).ok()?,
            u8::from_str_radix(&hex[4..6], 16).ok()?,
        )),
        3 => {
            let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
            Some(Color::Rgb(digit(0)?, digit(1)?, digit(2)?))
        }
        _ => None,
    }
}

/// Parse rgb(r,g,b) format
fn parse_rgb_color(s: &str) -> Option<Color> {
    let inner = s.strip_prefix("rgb(")?.strip_suffix(')')?;
    let parts: Vec<u8> = inner
        .split(',')
        .map(|p| p.trim().parse::<u8>())
        .collect::<Result<_, _>>()
        .ok()?;
    match parts.as_slice() {
        [r, g, b] => Some(Color::Rgb(*r, *g, *b)),
        _ => None,
    }
}

/// Black or white, whichever reads better on `background`
pub fn get_contrast_text_color(background: Color) -> Color {
    match background {
        Color::Rgb(r, g, b) => {
            // ITU-R BT.601 luma
            let luma = 0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b);
            if luma > 140.0 { Color::Black } else { Color::White }
        }
        Color::Black | Color::Blue | Color::Red | Color::Magenta | Color::DarkGray => Color::White,
        _ => Color::Black,
    }
}

/// Resolved board colors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub accent: Color,
    pub todo: Color,
    pub in_progress: Color,
    pub done: Color,
}

impl Palette {
    /// Unparseable entries fall back to the default colors
    pub fn from_config(colors: &Colors) -> Self {
        let defaults = Colors::default();
        let pick = |value: &str, fallback: &str| parse_color(value).or_else(|| parse_color(fallback)).unwrap_or(Color::White);
        Self {
            accent: pick(&colors.accent, &defaults.accent),
            todo: pick(&colors.todo, &defaults.todo),
            in_progress: pick(&colors.in_progress, &defaults.in_progress),
            done: pick(&colors.done, &defaults.done),
        }
    }

    pub fn column(&self, slot: TimeSlot) -> Color {
        match slot {
            TimeSlot::Todo => self.todo,
            TimeSlot::InProgress => self.in_progress,
            TimeSlot::Done => self.done,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_hex_and_rgb() {
        assert_eq!(parse_color(" Cyan "), Some(Color::Cyan));
        assert_eq!(parse_color("#ff8800"), Some(Color::Rgb(255, 136, 0)));
        assert_eq!(parse_color("#f80"), Some(Color::Rgb(255, 136, 0)));
        assert_eq!(parse_color("rgb(1, 2, 3)"), Some(Color::Rgb(1, 2, 3)));
        assert_eq!(parse_color("rgb(1,2)"), None);
        assert_eq!(parse_color("chartreuse"), None);
    }

    #[test]
    fn non_hex_digits_are_rejected() {
        assert_eq!(parse_color("#aééb"), None);
        assert_eq!(parse_color("#é1"), None);
        assert_eq!(parse_color("#+1f"), None);
        assert_eq!(parse_color("#12345g"), None);
    }

    #[test]
    fn palette_falls_back_per_entry() {
        let colors = Colors { accent: "nope".into(), done: "#000".into(), ..Colors::default() };
        let palette = Palette::from_config(&colors);
        assert_eq!(palette.accent, Color::Cyan);
        assert_eq!(palette.column(TimeSlot::Done), Color::Rgb(0, 0, 0));

        let accented = Colors { todo: "#aééb".into(), ..Colors::default() };
        assert_eq!(Palette::from_config(&accented).todo, Color::Blue);
        assert_eq!(get_contrast_text_color(palette.column(TimeSlot::Done)), Color::White);
    }
}
