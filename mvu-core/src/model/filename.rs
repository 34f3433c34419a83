//! Program file name conventions: part number, view name, Windows stems.

/// Stem of a Windows or POSIX path (`C:\TEXT\OUTPUT.txt` -> `OUTPUT`).
pub fn windows_stem(path: &str) -> &str {
    let name = path.rsplit(['\\', '/']).next().unwrap_or(path);
    match name.rfind('.') {
        Some(dot) if dot > 0 => &name[..dot],
        _ => name,
    }
}

fn stem_parts(stem: &str) -> Vec<&str> {
    stem.split([' ', '_']).collect()
}

/// Part number: the first space- or underscore-separated part of the stem.
pub fn part_number(stem: &str) -> String {
    stem_parts(stem).first().copied().unwrap_or("").to_string()
}

/// View name: the stem parts around the revision marker.
///
/// The last part starting with `REV` marks the revision. A bare `REV` part
/// takes the following part as its letter.
pub fn view_name(stem: &str) -> String {
    let parts = stem_parts(stem);
    let count = parts.len();
    if count == 1 {
        return String::new();
    }

    let mut rev_begin = 0;
    let mut rev_end = 0;
    for (i, part) in parts.iter().enumerate() {
        let upper = part.to_uppercase();
        if upper.starts_with("REV") {
            rev_begin = i;
            rev_end = if upper == "REV" { i + 1 } else { i };
        }
    }

    let selected = if rev_begin == 0 {
        &parts[1..]
    } else if rev_begin == 1 && rev_end < count - 1 {
        &parts[rev_end..]
    } else {
        &parts[1..rev_end]
    };
    selected.join(" ").trim().to_string()
}
