//! Manifest tracking and catalog rebuilds on file-system change.
//!
//! [`CatalogWatcher`] tracks the one logical manifest file, which may
//! physically exist under either accepted name. Its state machine is
//! Untracked ⇄ Tracked(path): create/change events on an accepted name
//! trigger a rebuild; a delete re-probes both names first, because editors
//! rename between the `.yml` and `.yaml` variants, and only goes Untracked
//! (with an empty catalog) when neither exists.
//!
//! The watch itself is push-driven through `notify`'s recommended backend;
//! the core never polls. A dedicated consumer thread coalesces event bursts,
//! and every rebuild, whether event-driven or forced through
//! [`CatalogWatcher::reconcile`], holds a rebuild lock across its whole
//! probe+build+swap so rebuilds never interleave and the newest filesystem
//! state wins. Each rebuild produces a fresh [`Catalog`] swapped in
//! atomically; readers hold `Arc` snapshots and never observe a half-built
//! catalog.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, RwLock};
use std::thread;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, warn};

use crate::catalog::{locate_manifest, Catalog, MANIFEST_FILE_NAMES};
use crate::config::Settings;
use crate::error::IndexError;

type ChangeHandler = Box<dyn Fn() + Send>;

struct ReactorState {
    settings: Settings,
    workspace_root: PathBuf,
    catalog: RwLock<Arc<Catalog>>,
    tracked: Mutex<Option<PathBuf>>,
    listeners: Mutex<Vec<ChangeHandler>>,
    // Held across one whole probe+build+swap so rebuilds from the consumer
    // thread and from explicit `reconcile` calls never interleave; a rebuild
    // that starts later always reads filesystem state at least as new.
    rebuild: Mutex<()>,
}

impl ReactorState {
    /// Re-probe the accepted manifest names, rebuild, swap, notify.
    ///
    /// Build failures inside a reaction follow the catalog's fail-soft
    /// policy; the reactor itself never crashes on them.
    fn reconcile(&self) {
        let _rebuild = self.rebuild.lock().unwrap();

        let located = locate_manifest(&self.workspace_root);
        *self.tracked.lock().unwrap() = located.clone();

        let next = match Catalog::build(&self.settings, &self.workspace_root) {
            Ok(catalog) => catalog,
            Err(err) => {
                warn!(%err, "catalog rebuild failed, exposing empty catalog");
                Catalog::empty(&self.workspace_root)
            }
        };

        debug!(tracked = ?located, "catalog swapped");
        *self.catalog.write().unwrap() = Arc::new(next);

        for listener in self.listeners.lock().unwrap().iter() {
            listener();
        }
    }
}

/// Watches the workspace root for manifest changes and keeps an up-to-date
/// catalog snapshot.
pub struct CatalogWatcher {
    state: Arc<ReactorState>,
    // Dropping the watcher closes the event channel and ends the consumer
    // thread.
    _watcher: RecommendedWatcher,
}

impl CatalogWatcher {
    /// Build the initial catalog and start watching the workspace root.
    ///
    /// When neither accepted name exists, tracking starts empty and all
    /// catalog-dependent reads return empty results until a manifest
    /// appears. Watch setup failure is [`IndexError::WatcherSetup`]; it
    /// disables reactivity only, explicit [`Catalog::build`] calls still
    /// work.
    pub fn new(settings: Settings, workspace_root: &Path) -> Result<CatalogWatcher, IndexError> {
        let state = Arc::new(ReactorState {
            settings,
            workspace_root: workspace_root.to_path_buf(),
            catalog: RwLock::new(Arc::new(Catalog::empty(workspace_root))),
            tracked: Mutex::new(None),
            listeners: Mutex::new(Vec::new()),
            rebuild: Mutex::new(()),
        });

        let (tx, rx) = mpsc::channel::<notify::Event>();
        let mut watcher =
            notify::recommended_watcher(move |result: Result<notify::Event, notify::Error>| {
                if let Ok(event) = result {
                    let _ = tx.send(event);
                }
            })?;
        watcher.watch(workspace_root, RecursiveMode::NonRecursive)?;

        let consumer_state = Arc::clone(&state);
        thread::spawn(move || {
            while let Ok(event) = rx.recv() {
                let mut relevant = is_manifest_event(&event);
                // Coalesce bursts: a rename arrives as delete + create, and
                // only the newest state matters.
                while let Ok(pending) = rx.try_recv() {
                    relevant |= is_manifest_event(&pending);
                }
                if relevant {
                    consumer_state.reconcile();
                }
            }
        });

        // Initial build only after the watch is live: a manifest appearing
        // between the probe and watch setup would otherwise produce no event
        // and leave the catalog stale indefinitely.
        state.reconcile();

        Ok(CatalogWatcher {
            state,
            _watcher: watcher,
        })
    }

    /// The current catalog snapshot.
    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.state.catalog.read().unwrap())
    }

    /// The manifest path currently tracked, if any.
    pub fn tracked_manifest(&self) -> Option<PathBuf> {
        self.state.tracked.lock().unwrap().clone()
    }

    /// Subscribe to catalog changes. Handlers carry no payload; consumers
    /// re-pull through [`CatalogWatcher::catalog`].
    pub fn on_change(&self, handler: impl Fn() + Send + 'static) {
        self.state.listeners.lock().unwrap().push(Box::new(handler));
    }

    /// Force a re-probe and rebuild, as if a change event had arrived.
    pub fn reconcile(&self) {
        self.state.reconcile();
    }
}

/// Whether any path in the event names an accepted manifest file.
fn is_manifest_event(event: &notify::Event) -> bool {
    event.paths.iter().any(|path| {
        path.file_name()
            .map(|name| {
                MANIFEST_FILE_NAMES
                    .iter()
                    .any(|accepted| name == OsStr::new(accepted))
            })
            .unwrap_or(false)
    })
}
