/*
 * The structure fetch service. Fetching a datasource's structure is the only
 * operation in the explorer that suspends, so it is split in two:
 *
 * - `StructureSourceOperations` performs a blocking fetch for one id (e.g. by
 *   reading a JSON document). `JsonDirStructureSource` is the concrete source.
 * - `StructureFetchOperations` is what the structure loader talks to: a one-way
 *   `request_structure` whose settled result is delivered later, off the caller's
 *   control flow. `ThreadedStructureFetcher` runs each request on a worker thread
 *   and posts a `StructureFetchOutcome` on a channel that the event loop drains.
 */
use super::models::{DatasourceId, DatasourceStructure};
use super::structure_cache::FetchTicket;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;

const STRUCTURE_FILE_EXTENSION: &str = "json";

/*
 * Why a structure fetch failed. The variants carry owned, cloneable data so the
 * error can live in the shared cache and be handed to every view that renders it.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructureFetchError {
    NotFound(DatasourceId),
    InvalidId(DatasourceId),
    Io(io::ErrorKind, String),
    Malformed(String),
    Unavailable(String),
}

impl From<io::Error> for StructureFetchError {
    fn from(err: io::Error) -> Self {
        StructureFetchError::Io(err.kind(), err.to_string())
    }
}

impl From<serde_json::Error> for StructureFetchError {
    fn from(err: serde_json::Error) -> Self {
        StructureFetchError::Malformed(err.to_string())
    }
}

impl std::fmt::Display for StructureFetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StructureFetchError::NotFound(id) => write!(f, "No structure available for {id}"),
            StructureFetchError::InvalidId(id) => {
                write!(f, "Datasource id {id:?} cannot be used to locate a structure")
            }
            StructureFetchError::Io(kind, msg) => write!(f, "I/O error ({kind:?}): {msg}"),
            StructureFetchError::Malformed(msg) => write!(f, "Malformed structure: {msg}"),
            StructureFetchError::Unavailable(msg) => {
                write!(f, "Structure service unavailable: {msg}")
            }
        }
    }
}

impl std::error::Error for StructureFetchError {}

pub type Result<T> = std::result::Result<T, StructureFetchError>;

// The settled result of one `request_structure` call.
#[derive(Debug, Clone)]
pub struct StructureFetchOutcome {
    pub datasource_id: DatasourceId,
    pub ticket: FetchTicket,
    pub result: Result<DatasourceStructure>,
}

/*
 * Issues asynchronous structure requests. Implementations must not block the
 * caller and must eventually deliver exactly one outcome per request, tagged
 * with the ticket it was issued under.
 */
pub trait StructureFetchOperations: Send + Sync {
    fn request_structure(&self, datasource_id: &DatasourceId, ticket: FetchTicket);
}

// A blocking source of datasource structures.
pub trait StructureSourceOperations: Send + Sync {
    fn fetch_structure(&self, datasource_id: &DatasourceId) -> Result<DatasourceStructure>;
}

/*
 * Reads `<dir>/<datasource id>.json`. Ids that would escape the directory are
 * rejected rather than sanitized, since a rewritten id would silently address
 * a different datasource.
 */
pub struct JsonDirStructureSource {
    dir: PathBuf,
}

impl JsonDirStructureSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        JsonDirStructureSource { dir: dir.into() }
    }

    fn structure_path(&self, datasource_id: &DatasourceId) -> Option<PathBuf> {
        let raw = datasource_id.as_str();
        let usable = !raw.is_empty()
            && raw != "."
            && raw != ".."
            && !raw.contains(['/', '\\'])
            && Path::new(raw).file_name().is_some();
        if !usable {
            return None;
        }
        Some(
            self.dir
                .join(format!("{raw}.{STRUCTURE_FILE_EXTENSION}")),
        )
    }
}

impl StructureSourceOperations for JsonDirStructureSource {
    fn fetch_structure(&self, datasource_id: &DatasourceId) -> Result<DatasourceStructure> {
        let path = self
            .structure_path(datasource_id)
            .ok_or_else(|| StructureFetchError::InvalidId(datasource_id.clone()))?;
        log::trace!("JsonDirStructureSource: Reading structure for {datasource_id} from {path:?}");
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StructureFetchError::NotFound(datasource_id.clone()));
            }
            Err(e) => return Err(e.into()),
        };
        let structure: DatasourceStructure = serde_json::from_reader(BufReader::new(file))?;
        Ok(structure)
    }
}

/*
 * Runs every request on its own worker thread and posts the outcome to the
 * event loop. There is no cancellation: a started fetch always completes and
 * its outcome is always sent, even if nobody is displaying the node any more.
 */
pub struct ThreadedStructureFetcher {
    source: Arc<dyn StructureSourceOperations>,
    outcome_sender: Sender<StructureFetchOutcome>,
}

impl ThreadedStructureFetcher {
    pub fn new(
        source: Arc<dyn StructureSourceOperations>,
        outcome_sender: Sender<StructureFetchOutcome>,
    ) -> Self {
        ThreadedStructureFetcher {
            source,
            outcome_sender,
        }
    }
}

impl StructureFetchOperations for ThreadedStructureFetcher {
    fn request_structure(&self, datasource_id: &DatasourceId, ticket: FetchTicket) {
        log::debug!("ThreadedStructureFetcher: Requesting structure for {datasource_id} ({ticket:?})");
        let source = Arc::clone(&self.source);
        let sender = self.outcome_sender.clone();
        let id = datasource_id.clone();

        let spawn_result = thread::Builder::new()
            .name(format!("structure-fetch-{}", ticket.0))
            .spawn(move || {
                let result = source.fetch_structure(&id);
                if let Err(e) = &result {
                    log::warn!("ThreadedStructureFetcher: Fetch for {id} failed: {e}");
                }
                let outcome = StructureFetchOutcome {
                    datasource_id: id,
                    ticket,
                    result,
                };
                if sender.send(outcome).is_err() {
                    log::debug!("ThreadedStructureFetcher: Event loop gone, outcome discarded.");
                }
            });

        if let Err(e) = spawn_result {
            log::error!("ThreadedStructureFetcher: Could not spawn fetch worker: {e}");
            let outcome = StructureFetchOutcome {
                datasource_id: datasource_id.clone(),
                ticket,
                result: Err(StructureFetchError::Unavailable(e.to_string())),
            };
            if self.outcome_sender.send(outcome).is_err() {
                log::debug!("ThreadedStructureFetcher: Event loop gone, outcome discarded.");
            }
        }
    }
}
