// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Minimal inline-style reading for the static HTML backend: lengths in CSS
// pixels, `display: none`, and solid colours.

use image::Rgba;

/// Declarations of a `style="..."` attribute, keys lower-cased.
pub(crate) fn declarations(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (key, value) = decl.split_once(':')?;
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim().trim_end_matches("!important").trim();
            (!key.is_empty() && !value.is_empty()).then(|| (key, value.to_string()))
        })
        .collect()
}

/// Look up the last declaration of `key` (later declarations win).
pub(crate) fn property<'a>(decls: &'a [(String, String)], key: &str) -> Option<&'a str> {
    decls
        .iter()
        .rev()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Parse `120`, `120px` or `120.5px` into CSS pixels. Other units are ignored.
pub(crate) fn parse_length(value: &str) -> Option<f32> {
    let value = value.trim();
    let number = value.strip_suffix("px").unwrap_or(value).trim();
    number
        .parse::<f32>()
        .ok()
        .filter(|px| px.is_finite() && *px >= 0.0)
}

/// Parse `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa` or a handful of keywords.
///
/// `transparent` parses to a fully transparent colour.
pub(crate) fn parse_color(value: &str) -> Option<Rgba<u8>> {
    let value = value.trim().to_ascii_lowercase();
    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex);
    }
    let rgb = match value.as_str() {
        "transparent" => return Some(Rgba([0, 0, 0, 0])),
        "white" => [255, 255, 255],
        "black" => [0, 0, 0],
        "red" => [255, 0, 0],
        "green" => [0, 128, 0],
        "lime" => [0, 255, 0],
        "blue" => [0, 0, 255],
        "yellow" => [255, 255, 0],
        "orange" => [255, 165, 0],
        "gray" | "grey" => [128, 128, 128],
        "silver" => [192, 192, 192],
        "navy" => [0, 0, 128],
        "purple" => [128, 0, 128],
        "teal" => [0, 128, 128],
        _ => return None,
    };
    Some(Rgba([rgb[0], rgb[1], rgb[2], 255]))
}

fn parse_hex(hex: &str) -> Option<Rgba<u8>> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|n| n * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some(Rgba([nibble(0)?, nibble(1)?, nibble(2)?, 255])),
        4 => Some(Rgba([nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?])),
        6 => Some(Rgba([byte(0)?, byte(2)?, byte(4)?, 255])),
        8 => Some(Rgba([byte(0)?, byte(2)?, byte(4)?, byte(6)?])),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declarations_split_and_normalise() {
        let decls = declarations("Width: 10px; height:20px ;; color : red !important");
        assert_eq!(property(&decls, "width"), Some("10px"));
        assert_eq!(property(&decls, "height"), Some("20px"));
        assert_eq!(property(&decls, "color"), Some("red"));
        assert_eq!(property(&decls, "margin"), None);
    }

    #[test]
    fn later_declarations_win() {
        let decls = declarations("width: 10px; width: 30px");
        assert_eq!(property(&decls, "width"), Some("30px"));
    }

    #[test]
    fn lengths() {
        assert_eq!(parse_length("120px"), Some(120.0));
        assert_eq!(parse_length(" 64 "), Some(64.0));
        assert_eq!(parse_length("12.5px"), Some(12.5));
        assert_eq!(parse_length("50%"), None);
        assert_eq!(parse_length("3em"), None);
        assert_eq!(parse_length("-4px"), None);
    }

    #[test]
    fn colours() {
        assert_eq!(parse_color("#fff"), Some(Rgba([255, 255, 255, 255])));
        assert_eq!(parse_color("#102030"), Some(Rgba([16, 32, 48, 255])));
        assert_eq!(parse_color("#10203080"), Some(Rgba([16, 32, 48, 128])));
        assert_eq!(parse_color("Navy"), Some(Rgba([0, 0, 128, 255])));
        assert_eq!(parse_color("transparent"), Some(Rgba([0, 0, 0, 0])));
        assert_eq!(parse_color("#ggg"), None);
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("rebeccapurple"), None);
    }
}
