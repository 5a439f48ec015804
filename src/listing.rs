//! Directory listings: uniform ordering and the selection record format.
//!
//! Listings are presentation-independent: directories always precede files,
//! each group sorted ascending by name, case-sensitively. Callers rely on
//! this order when mapping selections back to entries.

use tracing::debug;

use crate::error::FerryError;
use crate::session::{EntryKind, FileEntry, Session};

/// Width of the name field in a rendered listing record.
///
/// Names longer than this are truncated by the encoding and cannot be
/// recovered from the record; this is a documented lossy boundary of the
/// selection format, not something to widen quietly.
pub const NAME_FIELD_WIDTH: usize = 46;

/// Timestamp format in rendered listing records.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// List `path` through `session`, sorted directories-first, each group in
/// ascending case-sensitive name order.
///
/// The call is stateless: on failure the caller's previously displayed
/// state is simply not touched.
pub async fn list_dir(
    session: &dyn Session,
    path: &str,
) -> Result<Vec<FileEntry>, FerryError> {
    let mut entries = session.list(path).await?;
    sort_entries(&mut entries);
    debug!("listed {} entries in {}", entries.len(), path);
    Ok(entries)
}

/// Sort in place: directories before files, then by name, case-sensitive.
pub fn sort_entries(entries: &mut [FileEntry]) {
    entries.sort_by(|a, b| {
        let a_dir = a.kind == EntryKind::Directory;
        let b_dir = b.kind == EntryKind::Directory;
        b_dir.cmp(&a_dir).then_with(|| a.name.cmp(&b.name))
    });
}

/// Render one entry as a fixed-width selection record: a 4-character type
/// tag, the name left-justified in a 46-character field, then the
/// modification time.
pub fn format_entry(entry: &FileEntry) -> String {
    let tag = match entry.kind {
        EntryKind::Directory => " [D]",
        EntryKind::File => " [F]",
    };
    let name: String = entry.name.chars().take(NAME_FIELD_WIDTH).collect();
    format!(
        "{}{:<width$}{}",
        tag,
        name,
        entry.modified_at.format(TIMESTAMP_FORMAT),
        width = NAME_FIELD_WIDTH
    )
}

/// Recover the entry name from a rendered record: characters 4 through 49,
/// trailing whitespace trimmed.
pub fn parse_entry_name(record: &str) -> String {
    record
        .chars()
        .skip(4)
        .take(NAME_FIELD_WIDTH)
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// Whether a rendered record describes a directory.
pub fn record_is_dir(record: &str) -> bool {
    record.starts_with(" [D]")
}
