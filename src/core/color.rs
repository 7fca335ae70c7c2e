//! Hex colour arithmetic for the page theme

/// Darken a `#RRGGBB` / `#RGB` colour by `percent` (clamped to 0..=100)
///
/// Blank input and unparsable digits yield `#000000`. Input whose length is
/// neither 3 nor 6 after stripping `#` is returned unchanged behind a `#`.
pub fn darken(hex: &str, percent: i64) -> String {
    if hex.trim().is_empty() {
        return "#000000".to_string();
    }

    let digits = hex.trim().replace('#', "");
    let expanded = match digits.len() {
        6 => digits.clone(),
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        _ => return format!("#{}", digits),
    };

    let Some((r, g, b)) = parse_rgb(&expanded) else {
        return "#000000".to_string();
    };

    let keep = 100 - percent.clamp(0, 100);
    let scale = |channel: u8| (i64::from(channel) * keep / 100).clamp(0, 255);

    format!("#{:02X}{:02X}{:02X}", scale(r), scale(g), scale(b))
}

fn parse_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}
