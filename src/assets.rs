// ABOUTME: Asset extraction for slide sections of the outline
// ABOUTME: Scans the bulleted Asset list of one section and returns paths in source order

use regex::Regex;
use std::sync::OnceLock;

/// Matches an `Asset` label bullet such as `* **Asset**:`, `* **Asset:**`,
/// `* **Asset** :` or `- **asset**`. Everything after the match is the inline value.
fn asset_label() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^[*-]\s+\*\*\s*asset\s*:?\s*\*\*\s*:?").expect("asset label regex")
    })
}

/// Matches any bullet that starts with a bold key.
fn bold_key_bullet() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[*-]\s+\*\*").expect("bold key regex"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// Looking for the first Asset label line
    Label,
    /// Inside the asset list, reading continuation bullets
    Continuation,
}

/// What a single line means to the scanner
#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Blank,
    /// An Asset label: its inline value (possibly empty), and the whole bullet
    /// with the marker stripped for when it appears inside the list
    Label { value: &'a str, bullet: &'a str },
    /// A bold-key bullet that is not an Asset label
    Key,
    /// A plain bullet, with the marker stripped
    Item(&'a str),
    Other,
}

fn classify(raw: &str) -> Line<'_> {
    let line = raw.trim();
    if line.is_empty() {
        return Line::Blank;
    }
    if let Some(m) = asset_label().find(line) {
        return Line::Label {
            value: line[m.end()..].trim(),
            bullet: line[1..].trim(),
        };
    }
    if bold_key_bullet().is_match(line) {
        return Line::Key;
    }
    if let Some(rest) = line.strip_prefix("* ").or_else(|| line.strip_prefix("- ")) {
        return Line::Item(rest.trim());
    }
    Line::Other
}

fn is_asset_value(value: &str) -> bool {
    !value.is_empty() && !value.eq_ignore_ascii_case("none")
}

/// Extract the ordered list of asset paths referenced by one slide section.
///
/// The first Asset label starts the list; its inline value (if any) is the first
/// entry. Following bullets are entries until another bold-key bullet begins a
/// new structural section. A repeated Asset bullet inside the list is an ordinary
/// entry and is kept verbatim, marker stripped. Blank and free-text lines are
/// tolerated and skipped. The literal `none` (any case) never becomes an entry.
pub fn extract_assets(section: &str) -> Vec<String> {
    let mut state = ScanState::Label;
    let mut assets = Vec::new();

    for raw in section.lines() {
        let line = classify(raw);
        state = match (state, line) {
            (ScanState::Label, Line::Label { value, .. }) => {
                if is_asset_value(value) {
                    assets.push(value.to_string());
                }
                ScanState::Continuation
            }
            (ScanState::Label, _) => ScanState::Label,
            (ScanState::Continuation, Line::Key) => break,
            (ScanState::Continuation, Line::Item(value) | Line::Label { bullet: value, .. }) => {
                if is_asset_value(value) {
                    assets.push(value.to_string());
                }
                ScanState::Continuation
            }
            (ScanState::Continuation, Line::Blank | Line::Other) => ScanState::Continuation,
        };
    }

    assets
}
