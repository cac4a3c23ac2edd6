//! cuotas-storage-json
//!
//! Filesystem-backed roster store. Every mutation rewrites `roster.json`
//! atomically after copying the previous file into the backups directory.

use std::{
    cmp::Reverse,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use tracing::{debug, info};

use cuotas_core::{CoreError, MemberStore};
use cuotas_domain::{Member, MemberDraft, Payment, PaymentDraft, Roster, ROSTER_SCHEMA_VERSION};

const ROSTER_FILE: &str = "roster.json";
const BACKUP_PREFIX: &str = "roster";
const BACKUP_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S%3f";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 10;

/// Locations used by [`JsonRosterStorage`].
#[derive(Debug, Clone)]
pub struct StoragePaths {
    pub data_root: PathBuf,
    pub backup_root: PathBuf,
}

impl StoragePaths {
    /// `<root>/roster.json` with backups under `<root>/backups`.
    pub fn under(root: PathBuf) -> Self {
        let backup_root = root.join("backups");
        Self {
            data_root: root,
            backup_root,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BackupMetadata {
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
    /// Label given to `backup`; automatic pre-write copies have none.
    pub note: Option<String>,
    pub size_bytes: u64,
    pub path: PathBuf,
}

/// Roster persisted as one pretty-printed JSON document.
#[derive(Debug, Clone)]
pub struct JsonRosterStorage {
    paths: StoragePaths,
    retention: usize,
    roster: Roster,
}

impl JsonRosterStorage {
    pub fn open(paths: StoragePaths) -> Result<Self, CoreError> {
        Self::with_retention(paths, DEFAULT_RETENTION)
    }

    /// Opens the store, starting from an empty roster when no file exists yet.
    pub fn with_retention(paths: StoragePaths, retention: usize) -> Result<Self, CoreError> {
        fs::create_dir_all(&paths.data_root)?;
        fs::create_dir_all(&paths.backup_root)?;
        let path = paths.data_root.join(ROSTER_FILE);
        let roster = if path.exists() {
            load_roster_from_path(&path)?
        } else {
            Roster::default()
        };
        debug!(
            path = %path.display(),
            members = roster.members.len(),
            payments = roster.payments.len(),
            "roster opened"
        );
        Ok(Self {
            paths,
            retention: retention.max(1),
            roster,
        })
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn roster_path(&self) -> PathBuf {
        self.paths.data_root.join(ROSTER_FILE)
    }

    pub fn backups_dir(&self) -> &Path {
        &self.paths.backup_root
    }

    /// Writes a labelled snapshot of the current roster.
    pub fn backup(&self, note: Option<&str>) -> Result<BackupMetadata, CoreError> {
        let mut stem = format!("{}_{}", BACKUP_PREFIX, backup_stamp());
        if let Some(label) = sanitize_backup_note(note) {
            stem.push('_');
            stem.push_str(&label);
        }
        let name = format!("{}.{}", stem, BACKUP_EXTENSION);
        let path = self.paths.backup_root.join(&name);
        write_atomic(&path, &serialize_roster(&self.roster)?)?;
        self.prune_backups()?;
        info!(backup = %name, "roster backup created");
        Ok(self.metadata_for(name, path))
    }

    /// Backups, newest first.
    pub fn list_backups(&self) -> Result<Vec<BackupMetadata>, CoreError> {
        let dir = &self.paths.backup_root;
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut rows = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                rows.push(self.metadata_for(name.to_string(), path.clone()));
            }
        }
        rows.sort_by(|a, b| {
            Reverse(a.created_at)
                .cmp(&Reverse(b.created_at))
                .then_with(|| b.name.cmp(&a.name))
        });
        Ok(rows)
    }

    /// Replaces the live roster with a backup. The roster being replaced is
    /// itself backed up first.
    pub fn restore(&mut self, backup_name: &str) -> Result<&Roster, CoreError> {
        let source = self.paths.backup_root.join(backup_name);
        if !source.exists() {
            return Err(CoreError::Storage(format!(
                "backup `{}` not found",
                backup_name
            )));
        }
        let restored = load_roster_from_path(&source)?;
        self.replace(restored)?;
        info!(backup = %backup_name, "roster restored");
        Ok(&self.roster)
    }

    fn metadata_for(&self, name: String, path: PathBuf) -> BackupMetadata {
        let size_bytes = fs::metadata(&path).map(|meta| meta.len()).unwrap_or(0);
        BackupMetadata {
            created_at: parse_backup_timestamp(&name),
            note: parse_backup_note(&name),
            name,
            size_bytes,
            path,
        }
    }

    /// Applies `change` to a copy of the roster and keeps it only once it is
    /// on disk.
    fn mutate<T>(
        &mut self,
        change: impl FnOnce(&mut Roster) -> Result<T, CoreError>,
    ) -> Result<T, CoreError> {
        let mut next = self.roster.clone();
        let value = change(&mut next)?;
        self.replace(next)?;
        Ok(value)
    }

    fn replace(&mut self, roster: Roster) -> Result<(), CoreError> {
        let path = self.roster_path();
        self.backup_existing_file(&path)?;
        save_roster_to_path(&roster, &path)?;
        self.roster = roster;
        Ok(())
    }

    fn backup_existing_file(&self, path: &Path) -> Result<(), CoreError> {
        if !path.exists() {
            return Ok(());
        }
        let name = format!("{}_{}.{}", BACKUP_PREFIX, backup_stamp(), BACKUP_EXTENSION);
        fs::copy(path, self.paths.backup_root.join(&name))?;
        self.prune_backups()
    }

    /// Retention applies to automatic copies only; labelled backups are kept
    /// until removed by hand.
    fn prune_backups(&self) -> Result<(), CoreError> {
        let automatic = self
            .list_backups()?
            .into_iter()
            .filter(|entry| entry.note.is_none());
        for entry in automatic.skip(self.retention) {
            debug!(backup = %entry.name, "pruning old roster backup");
            let _ = fs::remove_file(entry.path);
        }
        Ok(())
    }
}

impl MemberStore for JsonRosterStorage {
    fn list_members(&self) -> Result<Vec<Member>, CoreError> {
        self.roster.list_members()
    }

    fn member(&self, id: i64) -> Result<Member, CoreError> {
        MemberStore::member(&self.roster, id)
    }

    fn insert_member(&mut self, draft: MemberDraft) -> Result<Member, CoreError> {
        self.mutate(|roster| roster.insert_member(draft))
    }

    fn update_member(&mut self, member: Member) -> Result<(), CoreError> {
        self.mutate(|roster| roster.update_member(member))
    }

    fn delete_member(&mut self, id: i64) -> Result<Member, CoreError> {
        self.mutate(|roster| roster.delete_member(id))
    }

    fn list_payments(&self) -> Result<Vec<Payment>, CoreError> {
        self.roster.list_payments()
    }

    fn payments_for(&self, member_id: i64) -> Result<Vec<Payment>, CoreError> {
        MemberStore::payments_for(&self.roster, member_id)
    }

    fn insert_payment(&mut self, draft: PaymentDraft) -> Result<Payment, CoreError> {
        self.mutate(|roster| roster.insert_payment(draft))
    }

    fn delete_payment(&mut self, id: i64) -> Result<Payment, CoreError> {
        self.mutate(|roster| roster.delete_payment(id))
    }
}

/// Saves a roster to an arbitrary path on disk.
pub fn save_roster_to_path(roster: &Roster, path: &Path) -> Result<(), CoreError> {
    let tmp = tmp_path(path);
    write_atomic(&tmp, &serialize_roster(roster)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Loads a roster, rejecting files written by a newer schema.
pub fn load_roster_from_path(path: &Path) -> Result<Roster, CoreError> {
    let data = fs::read_to_string(path)?;
    let mut roster: Roster =
        serde_json::from_str(&data).map_err(|err| CoreError::Serde(err.to_string()))?;
    if roster.schema_version > ROSTER_SCHEMA_VERSION {
        return Err(CoreError::Storage(format!(
            "{} uses schema {} but this build reads up to {}",
            path.display(),
            roster.schema_version,
            ROSTER_SCHEMA_VERSION
        )));
    }
    // Hand-edited or older files may lack the id counters.
    let max_member = roster.members.iter().map(|member| member.id).max().unwrap_or(0);
    let max_payment = roster.payments.iter().map(|payment| payment.id).max().unwrap_or(0);
    roster.next_member_id = roster.next_member_id.max(max_member + 1);
    roster.next_payment_id = roster.next_payment_id.max(max_payment + 1);
    Ok(roster)
}

fn backup_stamp() -> String {
    Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string()
}

fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.' | '_'))
            && !sanitized.is_empty()
            && !last_dash
        {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-').to_string();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// `roster_<date>_<time><millis>[_<note>].json`
fn parse_backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let stem = name.strip_suffix(&format!(".{}", BACKUP_EXTENSION))?;
    let mut segments = stem.split('_');
    if segments.next()? != BACKUP_PREFIX {
        return None;
    }
    let date = segments.next()?;
    let time = segments.next()?;
    if !is_digits(date, 8) || !is_digits(time, 9) {
        return None;
    }
    let (seconds, millis) = time.split_at(6);
    let naive = NaiveDateTime::parse_from_str(&format!("{}{}", date, seconds), "%Y%m%d%H%M%S").ok()?;
    let millis: i64 = millis.parse().ok()?;
    Some(DateTime::from_naive_utc_and_offset(
        naive + Duration::milliseconds(millis),
        Utc,
    ))
}

fn parse_backup_note(name: &str) -> Option<String> {
    let stem = name.strip_suffix(&format!(".{}", BACKUP_EXTENSION))?;
    let mut segments = stem.splitn(4, '_');
    if segments.next()? != BACKUP_PREFIX {
        return None;
    }
    segments.next()?;
    segments.next()?;
    segments
        .next()
        .filter(|note| !note.is_empty())
        .map(str::to_string)
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    Ok(())
}

fn serialize_roster(roster: &Roster) -> Result<String, CoreError> {
    serde_json::to_string_pretty(roster).map_err(|err| CoreError::Serde(err.to_string()))
}
