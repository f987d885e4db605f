use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, BufReader, Lines, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::adapters::file_io;
use crate::config::app_config::AuditSection;
use crate::core::errors::{Result, StaffAliasError};
use crate::core::models::audit_entry::{ActionKind, AuditEntry};
use crate::core::traits::ledger::{AuditLedger, Entries};

/// `prev_hash` of the first entry in a ledger.
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

const TAIL_CHUNK: u64 = 4096;

/// Attribution ledger stored as JSON lines, one `AuditEntry` per line.
///
/// Entries are hash-chained: each `hash` covers the entry's fields and the
/// previous entry's `hash`. Lines are only ever appended. The newest
/// entry's `seq` and `hash` are also kept in a sidecar next to the log
/// (`audit.log` → `audit.head`), so dropping entries from the end of the
/// file breaks verification too.
pub struct JsonAuditLedger {
    log_path: PathBuf,
    head_path: PathBuf,
    append_lock: Arc<Mutex<()>>,
}

/// Last entry the ledger appended, as recorded in the head sidecar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ChainHead {
    seq: u64,
    hash: String,
    created_at: DateTime<Utc>,
}

impl From<&AuditEntry> for ChainHead {
    fn from(entry: &AuditEntry) -> Self {
        Self {
            seq: entry.seq,
            hash: entry.hash.clone(),
            created_at: entry.created_at,
        }
    }
}

impl JsonAuditLedger {
    /// Create a ledger that writes to `{data_dir}/{log_file}`.
    pub fn new(data_dir: &Path, log_file: &str) -> Self {
        let log_path = data_dir.join(log_file);
        Self {
            head_path: log_path.with_extension("head"),
            append_lock: file_io::lock_for(&log_path),
            log_path,
        }
    }

    pub fn from_config(data_dir: &Path, audit: &AuditSection) -> Self {
        Self::new(data_dir, &audit.log_file)
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }

    pub fn head_path(&self) -> &Path {
        &self.head_path
    }

    /// Stream entries in file order without loading the whole ledger.
    pub fn stream(&self) -> Result<EntryStream> {
        if !self.log_path.exists() {
            return Ok(EntryStream { lines: None });
        }
        let file = fs::File::open(&self.log_path).map_err(|e| StaffAliasError::AuditError {
            detail: format!("Cannot read audit ledger: {e}"),
        })?;
        Ok(EntryStream {
            lines: Some(BufReader::new(file).lines().enumerate()),
        })
    }

    fn filtered(&self, keep: impl Fn(&AuditEntry) -> bool + 'static) -> Result<Entries<'static>> {
        Ok(Box::new(self.stream()?.filter_map(move |item| match item {
            Ok((_, entry)) => keep(&entry).then_some(Ok(entry)),
            Err(e) => Some(Err(e)),
        })))
    }

    /// The last non-blank line, read backwards from the end of the file.
    fn tail_line(&self) -> Result<Option<String>> {
        let read_error = |e: io::Error| StaffAliasError::AuditError {
            detail: format!("Cannot read audit ledger at {}: {e}", self.log_path.display()),
        };

        let mut file = match fs::File::open(&self.log_path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(read_error(e)),
        };
        let mut end = file.metadata().map_err(read_error)?.len();
        let mut tail: Vec<u8> = Vec::new();

        loop {
            let start = end.saturating_sub(TAIL_CHUNK);
            let mut chunk = vec![0; (end - start) as usize];
            file.seek(SeekFrom::Start(start)).map_err(read_error)?;
            file.read_exact(&mut chunk).map_err(read_error)?;
            chunk.extend_from_slice(&tail);
            tail = chunk;
            end = start;

            let text = String::from_utf8_lossy(&tail);
            let text = text.trim_end();
            match text.rfind('\n') {
                Some(pos) => return Ok(Some(text[pos + 1..].trim().to_string())),
                None if end == 0 => {
                    let line = text.trim();
                    return Ok((!line.is_empty()).then(|| line.to_string()));
                }
                None => {}
            }
        }
    }

    fn tail_entry(&self) -> Result<Option<AuditEntry>> {
        let Some(line) = self.tail_line()? else {
            return Ok(None);
        };
        serde_json::from_str(&line)
            .map(Some)
            .map_err(|e| StaffAliasError::AuditError {
                detail: format!("Last audit ledger line is malformed: {e}"),
            })
    }

    fn read_head(&self) -> Result<Option<ChainHead>> {
        if !self.head_path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.head_path)?;
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| StaffAliasError::AuditError {
                detail: format!("Malformed ledger head {}: {e}", self.head_path.display()),
            })
    }

    fn write_head(&self, head: &ChainHead) -> Result<()> {
        let content = serde_json::to_string(head).map_err(|e| StaffAliasError::AuditError {
            detail: format!("Failed to serialize ledger head: {e}"),
        })?;
        file_io::write_atomic(&self.head_path, content.as_bytes())
    }

    /// The entry the next record chains onto.
    ///
    /// Only the last line is parsed, so a damaged line further up does not
    /// stop new entries. When the file ends before the recorded head, the
    /// recorded head wins and the gap stays visible to `verify`.
    fn chain_head(&self) -> Result<Option<ChainHead>> {
        let recorded = self.read_head().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "ignoring unreadable ledger head");
            None
        });

        match (self.tail_entry(), recorded) {
            (Ok(Some(tail)), Some(head)) if head.seq > tail.seq => Ok(Some(head)),
            (Ok(Some(tail)), _) => Ok(Some(ChainHead::from(&tail))),
            (Ok(None), recorded) => Ok(recorded),
            (Err(e), Some(head)) => {
                tracing::warn!(error = %e, seq = head.seq, "chaining onto the recorded ledger head");
                Ok(Some(head))
            }
            (Err(e), None) => Err(e),
        }
    }

    /// Compare the end of the walked chain with the head sidecar.
    ///
    /// The sidecar is written after the line, so it may trail the file by
    /// exactly one entry.
    fn check_head(&self, last: Option<&AuditEntry>, last_line: usize) -> Result<()> {
        let head = self.read_head()?;
        let (head_seq, head_hash) = head
            .as_ref()
            .map_or((0, GENESIS_HASH), |h| (h.seq, h.hash.as_str()));
        let (seq, hash, prev_hash) = last.map_or((0, GENESIS_HASH, GENESIS_HASH), |e| {
            (e.seq, e.hash.as_str(), e.prev_hash.as_str())
        });

        if (seq == head_seq && hash == head_hash) || (seq == head_seq + 1 && prev_hash == head_hash) {
            return Ok(());
        }

        if seq < head_seq {
            Err(StaffAliasError::LedgerTampered {
                line: last_line + 1,
                detail: format!(
                    "ledger ends at sequence {seq} but its head records sequence {head_seq}"
                ),
            })
        } else {
            Err(StaffAliasError::LedgerTampered {
                line: last_line,
                detail: format!("entry {seq} does not match the recorded head (sequence {head_seq})"),
            })
        }
    }

    fn append_line(&self, line: &str) -> Result<()> {
        if let Some(parent) = self.log_path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| StaffAliasError::AuditError {
                detail: format!("Cannot open audit ledger at {}: {e}", self.log_path.display()),
            })?;

        writeln!(file, "{line}").map_err(|e| StaffAliasError::AuditError {
            detail: format!("Failed to write audit entry: {e}"),
        })?;
        file.sync_data().map_err(|e| StaffAliasError::AuditError {
            detail: format!("Failed to flush audit entry: {e}"),
        })
    }
}

/// Hash binding an entry to its content and to its predecessor.
pub fn chain_hash(
    seq: u64,
    real_actor_id: u64,
    content_id: u64,
    action: ActionKind,
    created_at: &DateTime<Utc>,
    prev_hash: &str,
) -> String {
    let material = format!(
        "{seq}|{real_actor_id}|{content_id}|{action}|{}|{prev_hash}",
        created_at.to_rfc3339_opts(SecondsFormat::Nanos, true)
    );
    let mut hasher = Sha256::new();
    hasher.update(material.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Lazy reader over ledger lines, yielding `(line_number, entry)`.
///
/// A line that does not parse is reported as tampering: nothing but this
/// ledger writes the file.
pub struct EntryStream {
    lines: Option<std::iter::Enumerate<Lines<BufReader<fs::File>>>>,
}

impl Iterator for EntryStream {
    type Item = Result<(usize, AuditEntry)>;

    fn next(&mut self) -> Option<Self::Item> {
        let lines = self.lines.as_mut()?;
        loop {
            let (index, line) = lines.next()?;
            let line_num = index + 1;
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    return Some(Err(StaffAliasError::AuditError {
                        detail: format!("Error reading audit ledger line {line_num}: {e}"),
                    }));
                }
            };

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            return Some(
                serde_json::from_str(trimmed)
                    .map(|entry| (line_num, entry))
                    .map_err(|e| StaffAliasError::LedgerTampered {
                        line: line_num,
                        detail: format!("malformed entry: {e}"),
                    }),
            );
        }
    }
}

impl AuditLedger for JsonAuditLedger {
    fn record(
        &self,
        real_actor_id: u64,
        content_id: u64,
        action: ActionKind,
    ) -> Result<AuditEntry> {
        let _guard = self.append_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let (seq, prev_hash, floor) = match self.chain_head()? {
            Some(head) => (head.seq + 1, head.hash, Some(head.created_at)),
            None => (1, GENESIS_HASH.to_string(), None),
        };
        // Keep file order and creation-time order the same even if the
        // clock steps backwards.
        let now = Utc::now();
        let created_at = floor.map_or(now, |floor| now.max(floor));

        let entry = AuditEntry {
            seq,
            real_actor_id,
            content_id,
            action,
            created_at,
            hash: chain_hash(seq, real_actor_id, content_id, action, &created_at, &prev_hash),
            prev_hash,
        };

        let line = serde_json::to_string(&entry).map_err(|e| StaffAliasError::AuditError {
            detail: format!("Failed to serialize audit entry: {e}"),
        })?;
        self.append_line(&line)?;

        if let Err(e) = self.write_head(&ChainHead::from(&entry)) {
            tracing::warn!(error = %e, seq, "audit entry appended but the ledger head was not updated");
        }

        Ok(entry)
    }

    fn exists(&self, real_actor_id: u64, content_id: u64, action: ActionKind) -> Result<bool> {
        for item in self.stream()? {
            let (_, entry) = item?;
            if entry.real_actor_id == real_actor_id
                && entry.content_id == content_id
                && entry.action == action
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn entries_for(&self, content_id: u64) -> Result<Entries<'_>> {
        self.filtered(move |e| e.content_id == content_id)
    }

    fn entries_by_actor(&self, real_actor_id: u64) -> Result<Entries<'_>> {
        self.filtered(move |e| e.real_actor_id == real_actor_id)
    }

    fn verify(&self) -> Result<usize> {
        let mut expected_seq = 1;
        let mut prev_hash = GENESIS_HASH.to_string();
        let mut last: Option<AuditEntry> = None;
        let mut last_line = 0;

        for item in self.stream()? {
            let (line, entry) = item?;

            if entry.seq != expected_seq {
                return Err(StaffAliasError::LedgerTampered {
                    line,
                    detail: format!("expected sequence {expected_seq}, found {}", entry.seq),
                });
            }
            if entry.prev_hash != prev_hash {
                return Err(StaffAliasError::LedgerTampered {
                    line,
                    detail: "previous-hash link is broken".into(),
                });
            }
            let computed = chain_hash(
                entry.seq,
                entry.real_actor_id,
                entry.content_id,
                entry.action,
                &entry.created_at,
                &entry.prev_hash,
            );
            if computed != entry.hash {
                return Err(StaffAliasError::LedgerTampered {
                    line,
                    detail: "entry does not match its hash".into(),
                });
            }

            expected_seq += 1;
            prev_hash = entry.hash.clone();
            last = Some(entry);
            last_line = line;
        }

        self.check_head(last.as_ref(), last_line)?;
        Ok((expected_seq - 1) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ledger(tmp: &TempDir) -> JsonAuditLedger {
        JsonAuditLedger::new(tmp.path(), "audit.log")
    }

    fn collect(entries: Result<Entries<'_>>) -> Vec<AuditEntry> {
        entries.unwrap().collect::<Result<Vec<_>>>().unwrap()
    }

    fn drop_last_line(ledger: &JsonAuditLedger) {
        let content = fs::read_to_string(ledger.path()).unwrap();
        let mut lines: Vec<&str> = content.lines().collect();
        lines.pop();
        fs::write(ledger.path(), lines.join("\n") + "\n").unwrap();
    }

    fn rewrite_line(ledger: &JsonAuditLedger, index: usize, edit: impl Fn(&str) -> String) {
        let content = fs::read_to_string(ledger.path()).unwrap();
        let lines: Vec<String> = content
            .lines()
            .enumerate()
            .map(|(i, l)| if i == index { edit(l) } else { l.to_string() })
            .collect();
        fs::write(ledger.path(), lines.join("\n") + "\n").unwrap();
    }

    #[test]
    fn record_chains_entries() {
        let tmp = TempDir::new().unwrap();
        let ledger = ledger(&tmp);

        let first = ledger.record(2, 10, ActionKind::Create).unwrap();
        let second = ledger.record(3, 10, ActionKind::Update).unwrap();

        assert_eq!(first.seq, 1);
        assert_eq!(first.prev_hash, GENESIS_HASH);
        assert_eq!(second.seq, 2);
        assert_eq!(second.prev_hash, first.hash);
        assert!(second.created_at >= first.created_at);
        assert_eq!(ledger.verify().unwrap(), 2);
    }

    #[test]
    fn exists_matches_all_three_fields() {
        let tmp = TempDir::new().unwrap();
        let ledger = ledger(&tmp);
        ledger.record(2, 10, ActionKind::Create).unwrap();

        assert!(ledger.exists(2, 10, ActionKind::Create).unwrap());
        assert!(!ledger.exists(2, 10, ActionKind::Update).unwrap());
        assert!(!ledger.exists(3, 10, ActionKind::Create).unwrap());
        assert!(!ledger.exists(2, 11, ActionKind::Create).unwrap());
    }

    #[test]
    fn repeated_updates_are_all_kept() {
        let tmp = TempDir::new().unwrap();
        let ledger = ledger(&tmp);
        ledger.record(2, 10, ActionKind::Create).unwrap();
        ledger.record(2, 10, ActionKind::Update).unwrap();
        ledger.record(2, 10, ActionKind::Update).unwrap();

        let entries = collect(ledger.entries_for(10));
        assert_eq!(entries.len(), 3);
        assert_eq!(
            entries.iter().map(|e| e.seq).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn queries_filter_by_post_and_by_actor() {
        let tmp = TempDir::new().unwrap();
        let ledger = ledger(&tmp);
        ledger.record(2, 10, ActionKind::Create).unwrap();
        ledger.record(3, 11, ActionKind::Create).unwrap();
        ledger.record(3, 10, ActionKind::Update).unwrap();

        let for_post: Vec<u64> = collect(ledger.entries_for(10)).iter().map(|e| e.real_actor_id).collect();
        assert_eq!(for_post, vec![2, 3]);

        let by_actor: Vec<u64> = collect(ledger.entries_by_actor(3)).iter().map(|e| e.content_id).collect();
        assert_eq!(by_actor, vec![11, 10]);
    }

    #[test]
    fn missing_ledger_is_empty_and_valid() {
        let ledger = JsonAuditLedger::new(Path::new("/nonexistent"), "audit.log");

        assert!(collect(ledger.entries_for(1)).is_empty());
        assert!(!ledger.exists(1, 1, ActionKind::Create).unwrap());
        assert_eq!(ledger.verify().unwrap(), 0);
    }

    #[test]
    fn record_creates_the_parent_directory() {
        let tmp = TempDir::new().unwrap();
        let ledger = JsonAuditLedger::new(&tmp.path().join("nested"), "audit.log");

        ledger.record(1, 1, ActionKind::Create).unwrap();
        assert!(ledger.path().exists());
    }

    #[test]
    fn edited_entry_is_detected() {
        let tmp = TempDir::new().unwrap();
        let ledger = ledger(&tmp);
        ledger.record(2, 10, ActionKind::Create).unwrap();
        ledger.record(2, 10, ActionKind::Update).unwrap();

        rewrite_line(&ledger, 1, |l| l.replace("\"real_actor_id\":2", "\"real_actor_id\":5"));

        assert!(matches!(
            ledger.verify(),
            Err(StaffAliasError::LedgerTampered { line: 2, .. })
        ));
    }

    #[test]
    fn removed_entry_is_detected() {
        let tmp = TempDir::new().unwrap();
        let ledger = ledger(&tmp);
        ledger.record(2, 10, ActionKind::Create).unwrap();
        ledger.record(2, 10, ActionKind::Update).unwrap();
        ledger.record(2, 10, ActionKind::Update).unwrap();

        rewrite_line(&ledger, 1, |_| String::new());

        assert!(matches!(
            ledger.verify(),
            Err(StaffAliasError::LedgerTampered { line: 3, .. })
        ));
    }

    #[test]
    fn garbage_line_is_reported_as_tampering() {
        let tmp = TempDir::new().unwrap();
        let ledger = ledger(&tmp);
        ledger.record(2, 10, ActionKind::Create).unwrap();

        rewrite_line(&ledger, 0, |_| "not json".into());

        assert!(matches!(
            ledger.entries_for(10).unwrap().next(),
            Some(Err(StaffAliasError::LedgerTampered { line: 1, .. }))
        ));
    }

    #[test]
    fn entries_are_read_as_the_iterator_advances() {
        let tmp = TempDir::new().unwrap();
        let ledger = ledger(&tmp);
        ledger.record(2, 10, ActionKind::Create).unwrap();
        ledger.record(2, 11, ActionKind::Create).unwrap();
        ledger.record(3, 10, ActionKind::Update).unwrap();

        rewrite_line(&ledger, 2, |_| "not json".into());

        let mut entries = ledger.entries_for(10).unwrap();
        assert_eq!(entries.next().unwrap().unwrap().seq, 1);
        assert!(matches!(
            entries.next(),
            Some(Err(StaffAliasError::LedgerTampered { line: 3, .. }))
        ));
    }

    #[test]
    fn damaged_earlier_line_does_not_block_new_entries() {
        let tmp = TempDir::new().unwrap();
        let ledger = ledger(&tmp);
        ledger.record(2, 10, ActionKind::Create).unwrap();
        let second = ledger.record(2, 10, ActionKind::Update).unwrap();

        rewrite_line(&ledger, 0, |_| "not json".into());

        let third = ledger.record(4, 10, ActionKind::Update).unwrap();
        assert_eq!(third.seq, 3);
        assert_eq!(third.prev_hash, second.hash);
        assert!(matches!(
            ledger.verify(),
            Err(StaffAliasError::LedgerTampered { line: 1, .. })
        ));
    }

    #[test]
    fn removed_newest_entries_are_detected() {
        let tmp = TempDir::new().unwrap();
        let ledger = ledger(&tmp);
        ledger.record(2, 10, ActionKind::Create).unwrap();
        ledger.record(3, 10, ActionKind::Update).unwrap();
        ledger.record(5, 10, ActionKind::Update).unwrap();

        drop_last_line(&ledger);

        assert!(matches!(
            ledger.verify(),
            Err(StaffAliasError::LedgerTampered { line: 3, .. })
        ));
    }

    #[test]
    fn entries_after_a_truncation_keep_the_gap_visible() {
        let tmp = TempDir::new().unwrap();
        let ledger = ledger(&tmp);
        ledger.record(2, 10, ActionKind::Create).unwrap();
        let dropped = ledger.record(5, 10, ActionKind::Update).unwrap();
        drop_last_line(&ledger);

        let next = ledger.record(2, 10, ActionKind::Update).unwrap();

        assert_eq!(next.seq, dropped.seq + 1);
        assert_eq!(next.prev_hash, dropped.hash);
        assert!(matches!(
            ledger.verify(),
            Err(StaffAliasError::LedgerTampered { line: 2, .. })
        ));
    }

    #[test]
    fn deleted_head_is_detected() {
        let tmp = TempDir::new().unwrap();
        let ledger = ledger(&tmp);
        ledger.record(2, 10, ActionKind::Create).unwrap();
        ledger.record(2, 10, ActionKind::Update).unwrap();

        fs::remove_file(ledger.head_path()).unwrap();

        assert!(matches!(
            ledger.verify(),
            Err(StaffAliasError::LedgerTampered { line: 2, .. })
        ));
    }

    #[test]
    fn head_one_entry_behind_is_accepted() {
        let tmp = TempDir::new().unwrap();
        let ledger = ledger(&tmp);
        ledger.record(2, 10, ActionKind::Create).unwrap();
        let stale_head = fs::read_to_string(ledger.head_path()).unwrap();
        ledger.record(2, 10, ActionKind::Update).unwrap();

        fs::write(ledger.head_path(), stale_head).unwrap();

        assert_eq!(ledger.verify().unwrap(), 2);
        assert_eq!(ledger.record(2, 10, ActionKind::Update).unwrap().seq, 3);
        assert_eq!(ledger.verify().unwrap(), 3);
    }

    #[test]
    fn hash_depends_on_every_field() {
        let at = Utc::now();
        let base = chain_hash(1, 2, 3, ActionKind::Create, &at, GENESIS_HASH);

        assert_ne!(base, chain_hash(1, 9, 3, ActionKind::Create, &at, GENESIS_HASH));
        assert_ne!(base, chain_hash(1, 2, 9, ActionKind::Create, &at, GENESIS_HASH));
        assert_ne!(base, chain_hash(1, 2, 3, ActionKind::Update, &at, GENESIS_HASH));
        assert_eq!(base.len(), 64);
    }
}
