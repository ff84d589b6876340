//! Frame-loop owner.
//!
//! `FrameLoop` is the one place that knows about sessions. It routes
//! transport envelopes into the store, drops anything from a session other
//! than the current one, and paints frames on request. The host calls it
//! from a single task: messages and frames interleave but never overlap.

use chrono::{DateTime, Utc};
use frost_shared::{
    config::ClientConfig,
    math::Viewport,
    net::{Envelope, RoomPayload, ServerEvent, SessionId},
    render::{Canvas, SpriteKey},
    round::{FeatureTable, RoundType},
};
use tracing::{debug, info, trace, warn};

use crate::{
    assets::AssetCache,
    camera::{self, CameraInput},
    merge::Ingest,
    minimap,
    renderer::{self, Frame, FrameReport},
    store::{EntityStore, RosterEntry},
};

/// Minimum gap between paints on constrained devices, seconds.
pub const LOW_POWER_MIN_INTERVAL: f64 = 0.033;

/// Drops paints that come too soon after the previous one. Ingest is never
/// throttled, only painting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameThrottle {
    min_interval: f64,
    last_paint: Option<f64>,
}

impl FrameThrottle {
    pub fn new(min_interval: f64) -> Self {
        Self {
            min_interval: min_interval.max(0.0),
            last_paint: None,
        }
    }

    pub fn unlimited() -> Self {
        Self::new(0.0)
    }

    pub fn low_power() -> Self {
        Self::new(LOW_POWER_MIN_INTERVAL)
    }

    /// Returns whether a paint at `now` may go ahead, and records it if so.
    pub fn should_paint(&mut self, now: f64) -> bool {
        if let Some(last) = self.last_paint {
            // A clock that went backwards always paints.
            if now >= last && now - last < self.min_interval {
                return false;
            }
        }
        self.last_paint = Some(now);
        true
    }

    pub fn reset(&mut self) {
        self.last_paint = None;
    }
}

/// Something the UI layer may want to show. The core only queues these.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionNotice {
    Joined { room: String, player_id: String },
    RoundStarted { round: u32, round_type: RoundType },
    RoundEnded { round: u32 },
    /// `winner` is the roster entry with the highest score, if any.
    GameOver { winner: Option<String> },
    ServerError { message: String },
    Left,
    Disconnected,
}

pub struct FrameLoop {
    store: EntityStore,
    assets: AssetCache,
    viewport: Viewport,
    local_player: Option<String>,
    session: Option<SessionId>,
    /// Newest session that was left or lost. Its queued joins stay dead.
    retired: Option<SessionId>,
    throttle: FrameThrottle,
    features: FeatureTable,
    weather_particles: usize,
    notices: Vec<SessionNotice>,
    frames: u64,
}

impl FrameLoop {
    pub fn new(cfg: &ClientConfig) -> Self {
        Self {
            store: EntityStore::new(),
            assets: AssetCache::new(),
            viewport: Viewport::new(cfg.viewport_width, cfg.viewport_height),
            local_player: None,
            session: None,
            retired: None,
            throttle: if cfg.low_power {
                FrameThrottle::low_power()
            } else {
                FrameThrottle::unlimited()
            },
            features: cfg.feature_table(),
            weather_particles: cfg.weather_particles,
            notices: Vec::new(),
            frames: 0,
        }
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn assets(&self) -> &AssetCache {
        &self.assets
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn local_player(&self) -> Option<&str> {
        self.local_player.as_deref()
    }

    pub fn session(&self) -> Option<SessionId> {
        self.session
    }

    /// Frames actually painted (throttled calls excluded).
    pub fn frames_painted(&self) -> u64 {
        self.frames
    }

    /// Routes one envelope. Returns `false` if it was dropped as stale.
    pub fn on_message(&mut self, envelope: Envelope) -> bool {
        let Envelope { session, message } = envelope;

        let message = match message {
            ServerEvent::RoomJoined { room, you_id } => {
                if self.session.is_some_and(|current| session < current)
                    || self.retired.is_some_and(|left| session <= left)
                {
                    debug!(
                        session = ?session,
                        current = ?self.session,
                        retired = ?self.retired,
                        "Dropping stale join"
                    );
                    return false;
                }
                self.begin_session(session, room, you_id);
                return true;
            }
            other => other,
        };

        if self.session != Some(session) {
            trace!(
                session = ?session,
                current = ?self.session,
                event = message.name(),
                "Dropping message from another session"
            );
            return false;
        }

        match message {
            // Routed to begin_session above.
            ServerEvent::RoomJoined { .. } => {}
            ServerEvent::RoomUpdate { room } => {
                self.store.ingest(Ingest::RoomUpdate(room));
            }
            ServerEvent::WorldState { room, world } => {
                self.store.ingest(Ingest::WorldSnapshot {
                    world,
                    header: room,
                });
            }
            ServerEvent::RoundStarted { room } => {
                let notice = SessionNotice::RoundStarted {
                    round: room.current_round,
                    round_type: room.round_type,
                };
                info!(round = room.current_round, round_type = ?room.round_type, "Round started");
                self.store.ingest(Ingest::RoomUpdate(room));
                self.notices.push(notice);
            }
            ServerEvent::RoundEnded { room } => {
                let notice = SessionNotice::RoundEnded {
                    round: room.current_round,
                };
                info!(round = room.current_round, "Round ended");
                self.store.ingest(Ingest::RoomUpdate(room));
                self.notices.push(notice);
            }
            ServerEvent::GameOver { room } => {
                self.store.ingest(Ingest::RoomUpdate(room));
                // Ties go to the earliest roster entry.
                let winner = self
                    .store
                    .roster()
                    .iter()
                    .fold(None, |best: Option<&RosterEntry>, e| match best {
                        Some(b) if b.score >= e.score => Some(b),
                        _ => Some(e),
                    })
                    .map(|e| e.id.clone());
                info!(winner = ?winner, "Game over");
                self.notices.push(SessionNotice::GameOver { winner });
            }
            ServerEvent::ServerError { message } => {
                warn!(%message, "Server error");
                self.notices.push(SessionNotice::ServerError { message });
            }
        }
        true
    }

    fn begin_session(&mut self, session: SessionId, room: RoomPayload, you_id: String) {
        info!(session = ?session, room = %room.code, player = %you_id, "Joined room");
        self.store.clear();
        self.assets = AssetCache::new();
        self.throttle.reset();
        self.session = Some(session);
        self.notices.push(SessionNotice::Joined {
            room: room.code.clone(),
            player_id: you_id.clone(),
        });
        self.local_player = Some(you_id);
        self.store.ingest(Ingest::RoomUpdate(room));
    }

    /// Paints one frame at monotonic time `now` (seconds). Returns `None`
    /// when the throttle skipped the paint.
    pub fn render_frame<C: Canvas + ?Sized>(
        &mut self,
        now: f64,
        canvas: &mut C,
    ) -> Option<FrameReport> {
        if !self.throttle.should_paint(now) {
            return None;
        }

        let round = self.store.round_context();
        let local = self.local_player.as_deref();
        let camera = camera::solve(&CameraInput {
            world: self.store.extent(),
            viewport: self.viewport,
            round,
            focus: local.and_then(|id| self.store.player(id)).map(|p| p.pos),
        });
        let frame = Frame {
            store: &self.store,
            camera,
            minimap: minimap::project(&self.store, self.viewport, round, &self.features),
            clock: now,
            local_player: local,
            viewport: self.viewport,
            features: self.features.features(round.round_type),
            weather_particles: self.weather_particles,
        };
        let report = renderer::render(canvas, &frame, &self.assets);

        for key in &report.fallbacks {
            if self.assets.request(*key) {
                trace!(sprite = ?key, "Queued sprite load");
            }
        }
        self.frames += 1;
        Some(report)
    }

    pub fn resize(&mut self, viewport: Viewport) {
        debug!(width = viewport.width, height = viewport.height, "Viewport resized");
        self.viewport = viewport;
    }

    /// Leaves the room. Everything session-scoped is dropped.
    pub fn leave(&mut self) {
        info!(session = ?self.session, "Leaving room");
        self.teardown();
        self.notices.push(SessionNotice::Left);
    }

    pub fn disconnect(&mut self) {
        warn!(session = ?self.session, "Disconnected");
        self.teardown();
        self.notices.push(SessionNotice::Disconnected);
    }

    fn teardown(&mut self) {
        self.store.clear();
        self.assets = AssetCache::new();
        self.retired = self.retired.max(self.session);
        self.session = None;
        self.local_player = None;
        self.throttle.reset();
    }

    pub fn asset_loaded(&mut self, key: SpriteKey) {
        self.assets.mark_loaded(key);
    }

    pub fn asset_failed(&mut self, key: SpriteKey) {
        self.assets.mark_failed(key);
    }

    /// Sprite loads the host should start.
    pub fn take_load_requests(&mut self) -> Vec<SpriteKey> {
        self.assets.take_requests()
    }

    pub fn drain_notices(&mut self) -> Vec<SessionNotice> {
        std::mem::take(&mut self.notices)
    }

    /// Seconds left in the running round at wall-clock `now`.
    pub fn countdown(&self, now: DateTime<Utc>) -> f64 {
        self.store
            .room()
            .map(|room| room.seconds_remaining(now))
            .unwrap_or(0.0)
    }
}
