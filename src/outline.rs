// ABOUTME: Outline parsing for the slidegen application
// ABOUTME: Splits an outline document into slide records and resolves the slide selection

use crate::assets::extract_assets;
use crate::errors::{Result, SlideError};
use log::{debug, info, warn};
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::io;
use std::ops::RangeInclusive;
use std::path::Path;
use std::sync::OnceLock;

/// Default slide range used when no explicit slides are requested
pub const DEFAULT_FIRST_SLIDE: u32 = 1;
pub const DEFAULT_LAST_SLIDE: u32 = 19;

fn slide_header() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^[ \t]*####[ \t]+Slide[ \t]+(\d+)[ \t]*:").expect("slide header regex")
    })
}

/// Which slides of the outline to process
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Closed range of slide numbers, both ends inclusive
    Range { start: u32, end: u32 },
    /// Explicit set of slide numbers
    Slides(BTreeSet<u32>),
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Range {
            start: DEFAULT_FIRST_SLIDE,
            end: DEFAULT_LAST_SLIDE,
        }
    }
}

impl Selection {
    /// Build a selection from optional explicit slides and a range.
    /// A non-empty explicit list always wins over the range.
    pub fn new(slides: Option<&[u32]>, range: RangeInclusive<u32>) -> Self {
        match slides {
            Some(list) if !list.is_empty() => Selection::Slides(list.iter().copied().collect()),
            _ => Selection::Range {
                start: *range.start(),
                end: *range.end(),
            },
        }
    }

    pub fn contains(&self, number: u32) -> bool {
        match self {
            Selection::Range { start, end } => (*start..=*end).contains(&number),
            Selection::Slides(set) => set.contains(&number),
        }
    }
}

/// One slide section of the outline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideRecord {
    pub number: u32,
    /// The whole section text, header included, trimmed
    pub raw_content: String,
    /// Asset paths in the order the outline lists them
    pub asset_paths: Vec<String>,
}

/// Split `document` into slide records for every selected `#### Slide N:` section.
///
/// Records come back in document order. A selection matching nothing gives an
/// empty list. Two selected sections with the same number are rejected.
pub fn parse_outline(document: &str, selection: &Selection) -> Result<Vec<SlideRecord>> {
    let headers: Vec<_> = slide_header().captures_iter(document).collect();
    let mut records = Vec::new();
    let mut seen = HashSet::new();

    for (i, caps) in headers.iter().enumerate() {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let span_end = headers
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(document.len(), |m| m.start());

        let number = match caps[1].parse::<u32>() {
            Ok(n) => n,
            Err(e) => {
                warn!("Skipping slide header with invalid number {:?}: {}", &caps[1], e);
                continue;
            }
        };

        if !selection.contains(number) {
            debug!("Slide {} not selected", number);
            continue;
        }
        if !seen.insert(number) {
            return Err(SlideError::DuplicateSlide(number));
        }

        let raw_content = document[whole.start()..span_end].trim().to_string();
        let asset_paths = extract_assets(&raw_content);
        records.push(SlideRecord {
            number,
            raw_content,
            asset_paths,
        });
    }

    Ok(records)
}

/// Read an outline file and parse the selected slides
pub fn parse_outline_file(path: &Path, selection: &Selection) -> Result<Vec<SlideRecord>> {
    info!("Parsing outline: {:?}", path);

    let document = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => SlideError::PathNotFoundError(path.to_path_buf()),
        _ => SlideError::FileError(e),
    })?;

    let records = parse_outline(&document, selection)?;
    info!("Found {} selected slides in outline", records.len());
    Ok(records)
}
