//! Naturalization records from the certified text of a portaria.
//!
//! The clause is free-form legal prose, so this is a best-effort pattern
//! match. Phrasing that strays from the usual template yields fewer or
//! oddly-split records rather than an error.

use crate::models::NaturalizationRecord;
use regex::{Captures, Regex};
use std::sync::LazyLock;
use tracing::debug;

/// Bumped whenever [`PERSON_PATTERN`] changes, since that changes output.
pub const PATTERN_VERSION: u32 = 1;

/// `CONCEDER a nacionalidade brasileira` through the next `PORTARIA Nº`
const GRANT_BLOCK_PATTERN: &str = r"(?i)CONCEDER a nacionalidade brasileira[\s\S]*?PORTARIA Nº";

/// One applicant: name, id, origin, birth date, both parents, process number.
///
/// The tail is lazy and may run over any text up to the next `Processo`.
const PERSON_PATTERN: &str = concat!(
    r"(?i)(?P<name>[A-ZÀ-Ú\s\-'’]+?)\s*-\s*",
    r"(?P<id>[A-Z0-9\-/]+),\s*",
    r"natural da\s*(?P<origin>[^,]+),\s*",
    r"nascid[oa]\s+em\s+(?P<birth_date>[^,]+),\s*",
    r"filh[oa]\s+de\s+(?P<parent1>[^,]+?)\s+e\s+(?P<parent2>[^,]+?),",
    r"[\s\S]*?Processo\s+(?:n[ºo]\s*)?(?P<process>[0-9./]+)",
);

static GRANT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(GRANT_BLOCK_PATTERN).expect("valid grant block regex"));
static PERSON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PERSON_PATTERN).expect("valid person regex"));

/// All records in the nationality-grant clause, in order of appearance.
///
/// Without a grant clause the whole document is scanned.
pub fn parse_naturalizacao(html: &str) -> Vec<NaturalizationRecord> {
    let cleaned = collapse_line_breaks(html);

    let block = match GRANT_BLOCK.find(&cleaned) {
        Some(m) => m.as_str(),
        None => {
            debug!("No grant clause found, scanning whole document");
            cleaned.as_str()
        }
    };

    PERSON.captures_iter(block).map(|caps| record_from(&caps)).collect()
}

fn collapse_line_breaks(text: &str) -> String {
    text.replace("\r\n", " ").replace('\n', " ")
}

fn record_from(caps: &Captures<'_>) -> NaturalizationRecord {
    let field = |name: &str| {
        caps.name(name)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default()
    };

    NaturalizationRecord {
        name: field("name"),
        id: field("id"),
        origin: field("origin"),
        birth_date: field("birth_date"),
        parent1: field("parent1"),
        parent2: field("parent2"),
        process: field("process"),
    }
}
