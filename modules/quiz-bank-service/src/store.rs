//! Question store: loads month files from the data directory and answers
//! read queries over them.
//!
//! Every `*.json` file in the data directory is a month file holding a JSON
//! array of question records. The aggregate question set is the concatenation
//! of all month files in file-name order.
//!
//! Two sourcing modes exist. `Preload` reads the directory once at startup and
//! keeps an immutable snapshot for the life of the process (changes on disk
//! are not picked up until restart). `Live` re-reads the directory on every
//! aggregate query. Month lookups always go to disk.

use quiz_bank_types::{Question, StoreMode};
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

const DATA_FILE_EXTENSION: &str = "json";

#[derive(Debug)]
pub enum StoreError {
    ReadDir { path: PathBuf, source: std::io::Error },
    ReadFile { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::ReadDir { path, source } => {
                write!(f, "failed to list {}: {}", path.display(), source)
            }
            StoreError::ReadFile { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            StoreError::Parse { path, source } => {
                write!(f, "failed to parse {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::ReadDir { source, .. } | StoreError::ReadFile { source, .. } => {
                Some(source)
            }
            StoreError::Parse { source, .. } => Some(source),
        }
    }
}

// =====================================================
// Directory loading
// =====================================================

/// List the month files in `dir`, sorted by file name.
///
/// Entries without a `.json` extension and directories are skipped.
pub async fn data_files(dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
    let read_dir_err = |source| StoreError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(read_dir_err)?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(read_dir_err)? {
        let path = entry.path();
        if path.extension().is_none_or(|ext| ext != DATA_FILE_EXTENSION) {
            log::debug!("[STORE] Skipping {} (not a data file)", path.display());
            continue;
        }
        // Follows symlinks. A broken link is kept so the read reports it.
        if let Ok(meta) = tokio::fs::metadata(&path).await {
            if meta.is_dir() {
                log::debug!("[STORE] Skipping directory {}", path.display());
                continue;
            }
        }
        files.push(path);
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Read and parse a single month file.
pub async fn read_data_file(path: &Path) -> Result<Vec<Question>, StoreError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| StoreError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
    serde_json::from_str(&raw).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the aggregate question set: every month file's records, in file order.
pub async fn load_all(dir: &Path) -> Result<Vec<Question>, StoreError> {
    let mut questions = Vec::new();
    for path in data_files(dir).await? {
        let records = read_data_file(&path).await?;
        log::debug!("[STORE] {} question(s) from {}", records.len(), path.display());
        questions.extend(records);
    }
    Ok(questions)
}

/// Month identifiers available on disk, sorted.
pub async fn list_months(dir: &Path) -> Result<Vec<String>, StoreError> {
    Ok(data_files(dir)
        .await?
        .iter()
        .filter_map(|p| p.file_stem())
        .filter_map(|stem| stem.to_str())
        .map(str::to_string)
        .collect())
}

// =====================================================
// Queries over a question set
// =====================================================

/// Distinct topics, sorted ascending. Records without a string topic are ignored.
pub fn derive_topics(questions: &[Question]) -> Vec<String> {
    questions
        .iter()
        .filter_map(Question::topic)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Records whose topic equals `topic` exactly, in their original order.
pub fn by_topic(questions: &[Question], topic: &str) -> Vec<Question> {
    questions
        .iter()
        .filter(|q| q.topic() == Some(topic))
        .cloned()
        .collect()
}

/// Month identifiers are file stems; only `[A-Za-z0-9_-]+` may reach the filesystem.
pub fn is_valid_month_id(month_id: &str) -> bool {
    !month_id.is_empty()
        && month_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

// =====================================================
// Store
// =====================================================

/// Immutable result of a startup load.
struct Snapshot {
    questions: Vec<Question>,
    topics: Vec<String>,
    loaded_at: String,
}

enum Source {
    Preloaded(Snapshot),
    Live,
}

pub struct QuestionStore {
    data_dir: PathBuf,
    source: Source,
    fixed_topics: Option<Vec<String>>,
}

/// Counts reported by `/status`.
#[derive(Debug, Default, PartialEq)]
pub struct Summary {
    pub question_count: usize,
    pub topic_count: usize,
    pub month_count: usize,
    pub loaded_at: Option<String>,
}

impl QuestionStore {
    pub async fn open(
        data_dir: PathBuf,
        mode: StoreMode,
        fixed_topics: Option<Vec<String>>,
    ) -> Result<Self, StoreError> {
        match mode {
            StoreMode::Preload => Self::preload(data_dir, fixed_topics).await,
            StoreMode::Live => Ok(Self::live(data_dir, fixed_topics)),
        }
    }

    /// Load everything now. Any unreadable file fails the whole load.
    pub async fn preload(
        data_dir: PathBuf,
        fixed_topics: Option<Vec<String>>,
    ) -> Result<Self, StoreError> {
        log::info!("Loading and caching quiz data from {}", data_dir.display());
        let questions = load_all(&data_dir).await?;
        let topics = derive_topics(&questions);
        log::info!(
            "Cached {} questions and {} topics.",
            questions.len(),
            topics.len()
        );
        Ok(Self {
            data_dir,
            source: Source::Preloaded(Snapshot {
                questions,
                topics,
                loaded_at: chrono::Utc::now().to_rfc3339(),
            }),
            fixed_topics,
        })
    }

    pub fn live(data_dir: PathBuf, fixed_topics: Option<Vec<String>>) -> Self {
        Self {
            data_dir,
            source: Source::Live,
            fixed_topics,
        }
    }

    pub fn mode(&self) -> StoreMode {
        match self.source {
            Source::Preloaded(_) => StoreMode::Preload,
            Source::Live => StoreMode::Live,
        }
    }

    /// When the preloaded snapshot was taken; `None` in live mode.
    pub fn loaded_at(&self) -> Option<&str> {
        match &self.source {
            Source::Preloaded(snapshot) => Some(&snapshot.loaded_at),
            Source::Live => None,
        }
    }

    /// The full aggregate question set.
    pub async fn all_questions(&self) -> Result<Cow<'_, [Question]>, StoreError> {
        match &self.source {
            Source::Preloaded(snapshot) => Ok(Cow::Borrowed(&snapshot.questions)),
            Source::Live => Ok(Cow::Owned(load_all(&self.data_dir).await?)),
        }
    }

    /// The topic list: the configured fixed list if any, otherwise derived.
    pub async fn topics(&self) -> Result<Cow<'_, [String]>, StoreError> {
        if let Some(fixed) = &self.fixed_topics {
            return Ok(Cow::Borrowed(fixed));
        }
        match &self.source {
            Source::Preloaded(snapshot) => Ok(Cow::Borrowed(&snapshot.topics)),
            Source::Live => Ok(Cow::Owned(derive_topics(
                &load_all(&self.data_dir).await?,
            ))),
        }
    }

    pub async fn questions_for_topic(&self, topic: &str) -> Result<Vec<Question>, StoreError> {
        Ok(by_topic(&self.all_questions().await?, topic))
    }

    /// Contents of `<month_id>.json`, or `None` if the identifier is not
    /// acceptable or the file is missing or malformed.
    pub async fn questions_for_month(&self, month_id: &str) -> Option<Vec<Question>> {
        if !is_valid_month_id(month_id) {
            log::warn!("[STORE] Rejected month identifier {:?}", month_id);
            return None;
        }
        let path = self
            .data_dir
            .join(format!("{}.{}", month_id, DATA_FILE_EXTENSION));
        match read_data_file(&path).await {
            Ok(questions) => Some(questions),
            Err(StoreError::ReadFile { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                log::debug!("[STORE] No month file at {}", path.display());
                None
            }
            Err(e) => {
                log::warn!("[STORE] {}", e);
                None
            }
        }
    }

    pub async fn months(&self) -> Result<Vec<String>, StoreError> {
        list_months(&self.data_dir).await
    }

    /// Best-effort counts; a failed live read reports zeros.
    pub async fn summary(&self) -> Summary {
        let month_count = match self.months().await {
            Ok(months) => months.len(),
            Err(e) => {
                log::warn!("[STORE] {}", e);
                0
            }
        };

        let (question_count, topic_count) = match (self.all_questions().await, self.topics().await)
        {
            (Ok(questions), Ok(topics)) => (questions.len(), topics.len()),
            (Err(e), _) | (_, Err(e)) => {
                log::warn!("[STORE] {}", e);
                (0, 0)
            }
        };

        Summary {
            question_count,
            topic_count,
            month_count,
            loaded_at: self.loaded_at().map(str::to_string),
        }
    }
}
