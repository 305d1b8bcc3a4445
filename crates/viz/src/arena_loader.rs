//! Arena loading and file watching.
//!
//! Owns the active [`Playback`]. Loads the arena descriptor on startup,
//! watches its file and reloads when it changes, and also reloads on the R
//! key. A failed reload leaves the previous arena playing.

use arena::{fixtures, Arena};
use bevy::prelude::*;
use notify::{Event as NotifyEvent, RecommendedWatcher, RecursiveMode, Watcher};
use playback::{Playback, PlaybackConfig};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};

use crate::plugin::VizSet;

/// Plugin for loading arenas from files.
pub struct ArenaLoaderPlugin;

impl Plugin for ArenaLoaderPlugin {
    fn build(&self, app: &mut App) {
        // ViewerConfig should be inserted by main.rs before adding this plugin
        // If not present, initialize with defaults
        if !app.world().contains_resource::<ViewerConfig>() {
            app.init_resource::<ViewerConfig>();
        }

        app.init_resource::<ArenaPlayback>()
            .add_event::<ArenaLoadedEvent>()
            .add_systems(
                Update,
                (check_file_updates, handle_reload_key)
                    .chain()
                    .in_set(VizSet::Input),
            );
    }
}

/// Startup configuration for the viewer.
#[derive(Resource, Clone, Debug)]
pub struct ViewerConfig {
    /// Arena descriptor to load; the bundled warehouse when absent.
    pub arena_path: Option<PathBuf>,
    /// Playback settings applied to every loaded arena.
    pub playback: PlaybackConfig,
    /// Whether to reload the arena when its file changes.
    pub watch: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            arena_path: None,
            playback: PlaybackConfig::default(),
            watch: true,
        }
    }
}

/// The arena currently being played back.
#[derive(Resource, Default)]
pub struct ArenaPlayback {
    /// Active playback, once an arena has loaded.
    pub playback: Option<Playback>,
    /// File the arena came from, if any.
    pub source: Option<PathBuf>,
    /// Any error from the last load attempt.
    pub last_error: Option<String>,
    /// Number of successful loads.
    pub loads: u64,
}

impl ArenaPlayback {
    /// Check if an arena is loaded.
    pub fn has_arena(&self) -> bool {
        self.playback.is_some()
    }

    /// The loaded arena, if any.
    pub fn arena(&self) -> Option<&Arena> {
        self.playback.as_ref().map(Playback::arena)
    }

    /// Replaces the active arena and rebuilds its trajectories.
    pub fn install(&mut self, arena: Arena, config: &PlaybackConfig) -> ArenaLoadedEvent {
        let event = ArenaLoadedEvent {
            agents: arena.agent_count(),
            span: arena.span(),
        };

        match self.playback.as_mut() {
            Some(playback) => playback.reload(arena),
            None => {
                let mut playback = Playback::new(arena, config.clone());
                playback.trajectories();
                self.playback = Some(playback);
            }
        }

        self.last_error = None;
        self.loads += 1;
        event
    }
}

/// Event emitted after an arena has been (re)loaded and its trajectories built.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaLoadedEvent {
    /// Number of agents in the new arena.
    pub agents: usize,
    /// Steps in the new timeline.
    pub span: usize,
}

/// File watching state stored in Local (doesn't need Send+Sync).
#[derive(Default)]
struct FileWatcherState {
    /// The watcher instance.
    watcher: Option<RecommendedWatcher>,
    /// Receiver for file change events.
    rx: Option<Receiver<Result<NotifyEvent, notify::Error>>>,
    /// Directory being watched.
    watch_path: Option<PathBuf>,
    /// Whether we've initialized.
    initialized: bool,
}

impl FileWatcherState {
    /// Loads the initial arena and starts watching its file.
    /// Returns the load event if an arena was installed.
    fn ensure_initialized(
        &mut self,
        config: &ViewerConfig,
        state: &mut ArenaPlayback,
    ) -> Option<ArenaLoadedEvent> {
        if self.initialized {
            return None;
        }
        self.initialized = true;

        let Some(arena_path) = config.arena_path.clone() else {
            tracing::info!("No arena file given, playing the bundled warehouse");
            return Some(state.install(fixtures::warehouse(), &config.playback));
        };

        state.source = Some(arena_path.clone());

        if config.watch {
            self.start_watching(&arena_path);
        }

        load_arena_file(&arena_path, state, &config.playback).or_else(|| {
            tracing::warn!("Falling back to the bundled warehouse arena");
            Some(state.install(fixtures::warehouse(), &config.playback))
        })
    }

    fn start_watching(&mut self, arena_path: &Path) {
        // Determine the watch directory
        let watch_dir = arena_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        // Create channel for file events
        let (tx, rx) = channel();

        // Create the watcher
        match RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            notify::Config::default(),
        ) {
            Ok(mut watcher) => {
                if let Err(e) = watcher.watch(&watch_dir, RecursiveMode::NonRecursive) {
                    tracing::warn!("Failed to watch directory {:?}: {}", watch_dir, e);
                } else {
                    tracing::info!("Watching directory: {:?}", watch_dir);
                    self.watch_path = Some(watch_dir);
                }

                self.watcher = Some(watcher);
                self.rx = Some(rx);
            }
            Err(e) => {
                tracing::error!("Failed to create file watcher: {}", e);
            }
        }
    }
}

/// Whether a file event touches the arena file.
fn is_relevant_change(event_paths: &[PathBuf], arena_path: &Path) -> bool {
    let arena_name = arena_path.file_name();
    arena_name.is_some() && event_paths.iter().any(|p| p.file_name() == arena_name)
}

/// Load the initial arena and reload it on file changes.
fn check_file_updates(
    mut watcher_state: Local<FileWatcherState>,
    config: Res<ViewerConfig>,
    mut state: ResMut<ArenaPlayback>,
    mut events: EventWriter<ArenaLoadedEvent>,
) {
    // Initialize on first run - send event if initial arena was loaded
    if let Some(event) = watcher_state.ensure_initialized(&config, &mut state) {
        events.send(event);
    }

    let Some(ref rx) = watcher_state.rx else {
        return;
    };
    let Some(arena_path) = state.source.clone() else {
        return;
    };

    // Non-blocking check for file events; one reload covers a burst
    let mut changed = false;
    while let Ok(result) = rx.try_recv() {
        match result {
            Ok(event) => {
                if is_relevant_change(&event.paths, &arena_path)
                    && matches!(
                        event.kind,
                        notify::EventKind::Modify(_) | notify::EventKind::Create(_)
                    )
                {
                    tracing::debug!("Detected file change: {:?}", event.paths);
                    changed = true;
                }
            }
            Err(e) => {
                tracing::warn!("File watcher error in {:?}: {}", watcher_state.watch_path, e);
            }
        }
    }

    if changed {
        if let Some(event) = load_arena_file(&arena_path, &mut state, &config.playback) {
            events.send(event);
        }
    }
}

/// Handle R key to force reload.
fn handle_reload_key(
    keyboard: Res<ButtonInput<KeyCode>>,
    config: Res<ViewerConfig>,
    mut state: ResMut<ArenaPlayback>,
    mut events: EventWriter<ArenaLoadedEvent>,
) {
    if !keyboard.just_pressed(KeyCode::KeyR) {
        return;
    }

    tracing::info!("Manual reload triggered");
    let loaded = match state.source.clone() {
        Some(path) => load_arena_file(&path, &mut state, &config.playback),
        None => Some(state.install(fixtures::warehouse(), &config.playback)),
    };
    if let Some(event) = loaded {
        events.send(event);
    }
}

/// Load an arena from a file, keeping the current one on failure.
pub fn load_arena_file(
    path: &Path,
    state: &mut ArenaPlayback,
    config: &PlaybackConfig,
) -> Option<ArenaLoadedEvent> {
    match Arena::from_file(path) {
        Ok(arena) => Some(state.install(arena, config)),
        Err(e) => {
            let error_msg = format!("Failed to load arena {:?}: {}", path, e);
            tracing::error!("{}", error_msg);
            state.last_error = Some(error_msg);
            None
        }
    }
}
