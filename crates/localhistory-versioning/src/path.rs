// Copyright (C) 2026  winnyboy5
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//! Path helpers
//!
//! History paths are `/`-separated strings. Backslashes are accepted on input
//! and normalized; trailing separators are dropped.

/// Normalize separators and strip a trailing `/`
pub fn normalize(path: &str) -> String {
    let mut normalized = path.replace('\\', "/");
    while normalized.len() > 1 && normalized.ends_with('/') {
        normalized.pop();
    }
    normalized
}

/// Join a parent path and a child name
pub fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else if parent.ends_with('/') {
        format!("{parent}{name}")
    } else {
        format!("{parent}/{name}")
    }
}

/// Split into parent path and last segment
pub fn split_last(path: &str) -> (Option<&str>, &str) {
    match path.rsplit_once('/') {
        Some(("", name)) if !name.is_empty() => (Some("/"), name),
        Some((parent, name)) if !name.is_empty() => (Some(parent), name),
        _ => (None, path),
    }
}

/// Last segment of a path
pub fn last_segment(path: &str) -> &str {
    split_last(path).1
}

/// Replace the last segment, keeping every ancestor segment
pub fn replace_last_segment(path: &str, name: &str) -> String {
    match split_last(path) {
        (Some(parent), _) => join(parent, name),
        (None, _) => name.to_string(),
    }
}

/// True when `path` equals `ancestor` or lies below it on a segment boundary
pub fn is_within(path: &str, ancestor: &str) -> bool {
    match path.strip_prefix(ancestor) {
        Some("") => true,
        Some(rest) => rest.starts_with('/') || ancestor.ends_with('/'),
        None => false,
    }
}

/// Segments of `path` below `ancestor`; `None` when `path` is not within it
pub fn relative_segments<'a>(path: &'a str, ancestor: &str) -> Option<Vec<&'a str>> {
    if !is_within(path, ancestor) {
        return None;
    }
    Some(
        path[ancestor.len()..]
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect(),
    )
}

/// A name usable as a single path segment
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\\'])
}
