//! Headless client binary.
//!
//! Usage:
//!   cargo run -p frost_client --bin client -- [--config client.json]
//!       [--replay demos/session.jsonl] [--width 1280] [--height 720]
//!       [--frames 600] [--low-power]
//!
//! Plays a recorded session through the frame loop as if it arrived from a
//! live server. A transport task delivers envelopes on their recorded
//! timestamps, an asset task resolves sprite loads after a fixed latency,
//! and frames are painted into a recording canvas at the configured rate.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use frost_client::{
    replay::{self, ReplayLine},
    FrameLoop,
};
use frost_shared::{
    config::ClientConfig,
    net::Envelope,
    render::{RecordingCanvas, SpriteKey},
};
use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    replay: Option<String>,
    width: Option<f64>,
    height: Option<f64>,
    frames: Option<u64>,
    low_power: bool,
}

fn parse_args() -> Args {
    let mut out = Args::default();
    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" if i + 1 < args.len() => {
                out.config = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            "--replay" if i + 1 < args.len() => {
                out.replay = Some(args[i + 1].clone());
                i += 2;
            }
            "--width" if i + 1 < args.len() => {
                out.width = args[i + 1].parse().ok();
                i += 2;
            }
            "--height" if i + 1 < args.len() => {
                out.height = args[i + 1].parse().ok();
                i += 2;
            }
            "--frames" if i + 1 < args.len() => {
                out.frames = args[i + 1].parse().ok();
                i += 2;
            }
            "--low-power" => {
                out.low_power = true;
                i += 1;
            }
            _ => i += 1,
        }
    }
    out
}

impl Args {
    fn apply(&self, cfg: &mut ClientConfig) {
        if let Some(replay) = &self.replay {
            cfg.replay_path = replay.clone();
        }
        if let Some(w) = self.width {
            cfg.viewport_width = w;
        }
        if let Some(h) = self.height {
            cfg.viewport_height = h;
        }
        if self.low_power {
            cfg.low_power = true;
        }
    }
}

/// Delivers replay lines at their recorded offsets.
async fn transport(lines: Vec<ReplayLine>, tx: mpsc::Sender<Envelope>) {
    let start = Instant::now();
    for line in lines {
        let offset = Duration::try_from_secs_f64(line.at).unwrap_or(Duration::ZERO);
        tokio::time::sleep_until(start + offset).await;
        if tx.send(line.into_envelope()).await.is_err() {
            debug!("Frame loop gone; stopping transport");
            break;
        }
    }
}

/// Stand-in for the browser image loader.
async fn asset_loader(
    mut requests: mpsc::Receiver<SpriteKey>,
    done: mpsc::Sender<SpriteKey>,
    latency: Duration,
) {
    while let Some(key) = requests.recv().await {
        tokio::time::sleep(latency).await;
        debug!(path = %key.path(), "Sprite fetched");
        if done.send(key).await.is_err() {
            break;
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = parse_args();
    let mut cfg = match &args.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::default(),
    };
    args.apply(&mut cfg);
    let max_frames = args.frames.unwrap_or(600);

    info!(
        replay = %cfg.replay_path,
        width = cfg.viewport_width,
        height = cfg.viewport_height,
        frame_hz = cfg.frame_hz,
        low_power = cfg.low_power,
        "Starting headless client"
    );

    let lines = replay::load(Path::new(&cfg.replay_path))
        .await
        .context("load replay")?;
    info!(messages = lines.len(), "Replay loaded");

    let (msg_tx, mut msg_rx) = mpsc::channel::<Envelope>(64);
    let transport_task = tokio::spawn(transport(lines, msg_tx));

    let (load_tx, load_rx) = mpsc::channel::<SpriteKey>(64);
    let (done_tx, mut done_rx) = mpsc::channel::<SpriteKey>(64);
    let loader_task = tokio::spawn(asset_loader(
        load_rx,
        done_tx,
        Duration::from_millis(cfg.asset_latency_ms),
    ));

    let mut frame_loop = FrameLoop::new(&cfg);
    let mut canvas = RecordingCanvas::new();

    let period = Duration::from_secs_f64(1.0 / f64::from(cfg.frame_hz.max(1)));
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let start = Instant::now();
    let mut transport_done = false;

    for _ in 0..max_frames {
        ticker.tick().await;

        loop {
            match msg_rx.try_recv() {
                Ok(envelope) => {
                    frame_loop.on_message(envelope);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    transport_done = true;
                    break;
                }
            }
        }
        while let Ok(key) = done_rx.try_recv() {
            frame_loop.asset_loaded(key);
        }
        for notice in frame_loop.drain_notices() {
            info!(?notice, "Session notice");
        }

        let now = start.elapsed().as_secs_f64();
        if let Some(report) = frame_loop.render_frame(now, &mut canvas) {
            if frame_loop.frames_painted() % 60 == 0 {
                info!(
                    frame = frame_loop.frames_painted(),
                    entities = report.entities,
                    sprites = report.sprites,
                    fallbacks = report.fallbacks.len(),
                    commands = canvas.commands().len(),
                    countdown = frame_loop.countdown(Utc::now()),
                    "Frame"
                );
            }
        }

        for key in frame_loop.take_load_requests() {
            load_tx.send(key).await.context("asset loader stopped")?;
        }

        if transport_done {
            break;
        }
    }

    // Frame budget may run out before the recording does.
    transport_task.abort();
    drop(load_tx);
    drop(done_rx);
    match transport_task.await {
        Err(e) if e.is_cancelled() => debug!("Transport stopped early"),
        other => other.context("transport task")?,
    }
    loader_task.await.context("asset loader task")?;

    info!(
        frames = frame_loop.frames_painted(),
        sprites_ready = frame_loop.assets().ready_count(),
        "Replay finished"
    );
    Ok(())
}
