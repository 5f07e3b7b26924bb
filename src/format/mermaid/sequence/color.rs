// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Sequin and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Color prefix of a `box` header.

use std::sync::OnceLock;

use regex::Regex;

const TRANSPARENT: &str = "transparent";

const NAMED_COLORS: &[&str] = &[
    "aliceblue", "antiquewhite", "aqua", "aquamarine", "azure", "beige", "bisque", "black",
    "blanchedalmond", "blue", "blueviolet", "brown", "burlywood", "cadetblue", "chartreuse",
    "chocolate", "coral", "cornflowerblue", "cornsilk", "crimson", "cyan", "darkblue",
    "darkcyan", "darkgoldenrod", "darkgray", "darkgreen", "darkgrey", "darkkhaki",
    "darkmagenta", "darkolivegreen", "darkorange", "darkorchid", "darkred", "darksalmon",
    "darkseagreen", "darkslateblue", "darkslategray", "darkslategrey", "darkturquoise",
    "darkviolet", "deeppink", "deepskyblue", "dimgray", "dimgrey", "dodgerblue", "firebrick",
    "floralwhite", "forestgreen", "fuchsia", "gainsboro", "ghostwhite", "gold", "goldenrod",
    "gray", "green", "greenyellow", "grey", "honeydew", "hotpink", "indianred", "indigo",
    "ivory", "khaki", "lavender", "lavenderblush", "lawngreen", "lemonchiffon", "lightblue",
    "lightcoral", "lightcyan", "lightgoldenrodyellow", "lightgray", "lightgreen", "lightgrey",
    "lightpink", "lightsalmon", "lightseagreen", "lightskyblue", "lightslategray",
    "lightslategrey", "lightsteelblue", "lightyellow", "lime", "limegreen", "linen", "magenta",
    "maroon", "mediumaquamarine", "mediumblue", "mediumorchid", "mediumpurple",
    "mediumseagreen", "mediumslateblue", "mediumspringgreen", "mediumturquoise",
    "mediumvioletred", "midnightblue", "mintcream", "mistyrose", "moccasin", "navajowhite",
    "navy", "oldlace", "olive", "olivedrab", "orange", "orangered", "orchid", "palegoldenrod",
    "palegreen", "paleturquoise", "palevioletred", "papayawhip", "peachpuff", "peru", "pink",
    "plum", "powderblue", "purple", "rebeccapurple", "red", "rosybrown", "royalblue",
    "saddlebrown", "salmon", "sandybrown", "seagreen", "seashell", "sienna", "silver",
    "skyblue", "slateblue", "slategray", "slategrey", "snow", "springgreen", "steelblue", "tan",
    "teal", "thistle", "tomato", "turquoise", "violet", "wheat", "white", "whitesmoke",
    "yellow", "yellowgreen",
];

fn functional_color_regex() -> &'static Regex {
    static FUNCTIONAL: OnceLock<Regex> = OnceLock::new();
    FUNCTIONAL.get_or_init(|| {
        Regex::new(r"(?i)^(?:rgba?|hsla?)\s*\([^)]*\)|^#[0-9a-f]{3,8}(?:\s|$)")
            .expect("valid color regex")
    })
}

/// Length of the color at the start of `text`, if it starts with one.
fn leading_color_len(text: &str) -> Option<usize> {
    if let Some(found) = functional_color_regex().find(text) {
        return Some(found.as_str().trim_end().len());
    }
    let word_len = text.find(char::is_whitespace).unwrap_or(text.len());
    let word = &text[..word_len];
    let is_named = word.eq_ignore_ascii_case(TRANSPARENT)
        || NAMED_COLORS
            .iter()
            .any(|named| word.eq_ignore_ascii_case(named));
    is_named.then_some(word_len)
}

/// `true` when a label written right after `box` would be taken as a color.
pub(crate) fn starts_with_color(label: &str) -> bool {
    leading_color_len(label).is_some()
}

/// `true` when all of `text` is a single color.
pub(crate) fn is_color(text: &str) -> bool {
    leading_color_len(text) == Some(text.len())
}

/// Splits the text after `box` into `(color, label)`.
///
/// `transparent` is the same as no color.
pub(crate) fn split_box_header(rest: &str) -> (Option<String>, Option<String>) {
    let rest = rest.trim();
    let (color, label) = match leading_color_len(rest) {
        Some(len) => (Some(&rest[..len]), rest[len..].trim()),
        None => (None, rest),
    };
    let color = color
        .filter(|color| !color.eq_ignore_ascii_case(TRANSPARENT))
        .map(str::to_owned);
    let label = (!label.is_empty()).then(|| label.to_owned());
    (color, label)
}

/// The placeholder color written before a label that would otherwise read as one.
pub(crate) fn transparent() -> &'static str {
    TRANSPARENT
}
