//! Text measurement, truncation, and wrapping utilities.

/// Width of one char in ems. CJK and other wide glyphs take a full em.
fn char_em(ch: char) -> f32 {
    let wide = matches!(ch as u32,
        0x1100..=0x115F
        | 0x2E80..=0x303E
        | 0x3041..=0x33FF
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFF00..=0xFF60);
    if wide { 1.0 } else { 0.60 }
}

/// Heuristic: estimate pixel width of text (Plotters has no built-in text measuring).
pub fn estimate_text_width_px(text: &str, font_px: u32) -> u32 {
    let ems: f32 = text.chars().map(char_em).sum();
    (ems * font_px as f32).ceil() as u32
}

/// Horizontal and vertical footprint of a label rotated by `degrees`.
pub fn rotated_extent_px(text: &str, font_px: u32, degrees: u32) -> (u32, u32) {
    let w = estimate_text_width_px(text, font_px) as f64;
    let h = font_px as f64;
    let r = (degrees as f64).to_radians();
    let (sin, cos) = (r.sin().abs(), r.cos().abs());
    (
        (w * cos + h * sin).ceil() as u32,
        (w * sin + h * cos).ceil() as u32,
    )
}

/// Truncate to fit `max_px` and add a single ellipsis if needed.
pub fn truncate_to_width(text: &str, font_px: u32, max_px: u32) -> String {
    let mut out = String::new();
    for ch in text.chars() {
        let next = format!("{out}{ch}");
        if estimate_text_width_px(&next, font_px) > max_px {
            if !out.is_empty() {
                if estimate_text_width_px(&(out.clone() + "…"), font_px) <= max_px {
                    out.push('…');
                } else if out.chars().count() > 1 {
                    out.pop();
                    out.push('…');
                }
            }
            return out;
        }
        out = next;
    }
    out
}

/// Wrap text to fit within a maximum pixel width, breaking on word boundaries where possible.
pub fn wrap_text_to_width(text: &str, font_px: u32, max_px: u32) -> Vec<String> {
    if max_px <= 12 {
        return vec![truncate_to_width(text, font_px, max_px)];
    }
    let mut lines: Vec<String> = Vec::new();
    let mut cur = String::new();
    for word in text.split_whitespace() {
        let candidate = if cur.is_empty() {
            word.to_string()
        } else {
            format!("{cur} {word}")
        };
        if estimate_text_width_px(&candidate, font_px) <= max_px {
            cur = candidate;
            continue;
        }
        if !cur.is_empty() {
            lines.push(std::mem::take(&mut cur));
            if estimate_text_width_px(word, font_px) <= max_px {
                cur = word.to_string();
                continue;
            }
        }
        // Single long word (or unspaced CJK run): hard-break by characters.
        let mut buf = String::new();
        for ch in word.chars() {
            let cand = format!("{buf}{ch}");
            if estimate_text_width_px(&cand, font_px) > max_px && !buf.is_empty() {
                lines.push(std::mem::replace(&mut buf, ch.to_string()));
            } else {
                buf = cand;
            }
        }
        cur = buf;
    }
    if !cur.is_empty() {
        lines.push(cur);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
