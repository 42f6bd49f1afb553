use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use voxlink_app::collaborators::{LoggingTransport, Pcm16Decoder, VirtualOutput};
use voxlink_app::config::AppConfig;
use voxlink_app::runtime::{PipelineEvent, PipelineRuntime};
use voxlink_audio::AudioFrame;
use voxlink_foundation::clock::real_clock;

/// Streaming voice pipeline demo: gates synthetic microphone audio into
/// outbound chunks, then schedules a simulated session reply for playback
/// and interrupts it mid-utterance.
#[derive(Parser, Debug)]
#[command(name = "voxlink")]
struct Cli {
    /// Optional TOML config; defaults apply for anything omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sample rate of the simulated capture device.
    #[arg(long, default_value_t = 48_000)]
    device_rate: u32,
}

const FRAME_MS: u64 = 20;
const REPLY_RATE: u32 = 24_000;

fn speech_frame(device_rate: u32, phase_offset: usize) -> AudioFrame {
    let len = (device_rate as u64 * FRAME_MS / 1000) as usize;
    let samples = (0..len)
        .map(|i| {
            let t = (phase_offset * len + i) as f32 / device_rate as f32;
            (2.0 * std::f32::consts::PI * 220.0 * t).sin() * 0.3
        })
        .collect();
    AudioFrame::new(samples, device_rate)
}

fn silence_frame(device_rate: u32) -> AudioFrame {
    let len = (device_rate as u64 * FRAME_MS / 1000) as usize;
    AudioFrame::new(vec![0.0; len], device_rate)
}

fn reply_fragment(secs: f64) -> Vec<u8> {
    let len = (secs * REPLY_RATE as f64) as usize;
    let mut bytes = Vec::with_capacity(len * 2);
    for i in 0..len {
        let t = i as f32 / REPLY_RATE as f32;
        let sample = ((2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.25 * 32767.0) as i16;
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    bytes
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    let output = VirtualOutput::new();
    let runtime = PipelineRuntime::new(
        &config,
        real_clock(),
        Arc::new(LoggingTransport),
        output.clone(),
        Arc::new(Pcm16Decoder::new(REPLY_RATE)),
    );
    let metrics = runtime.metrics();
    let phases = runtime.subscribe_phases();

    let (tx, rx) = mpsc::channel::<PipelineEvent>(256);
    let pipeline = tokio::spawn(runtime.run(rx));

    tx.send(PipelineEvent::Start).await?;

    // One second of synthetic speech, then silence through the hangover.
    info!("--- speaking ---");
    for i in 0..50 {
        tx.send(PipelineEvent::CaptureFrame(speech_frame(cli.device_rate, i)))
            .await?;
    }
    for _ in 0..=config.vad.max_silence_frames {
        tx.send(PipelineEvent::CaptureFrame(silence_frame(cli.device_rate)))
            .await?;
    }

    // Simulated session reply in three fragments, played to completion.
    info!("--- session replies ---");
    for secs in [0.4, 0.3, 0.2] {
        tx.send(PipelineEvent::InboundAudio(reply_fragment(secs)))
            .await?;
    }
    tokio::time::sleep(Duration::from_millis(50)).await;
    for token in output.advance_to(1.0) {
        tx.send(PipelineEvent::PlaybackFinished(token)).await?;
    }

    // Second reply, interrupted mid-playback.
    info!("--- session replies again, user barges in ---");
    tx.send(PipelineEvent::InboundAudio(reply_fragment(2.0)))
        .await?;
    tokio::time::sleep(Duration::from_millis(50)).await;
    tx.send(PipelineEvent::Interrupted).await?;

    tx.send(PipelineEvent::Stop).await?;
    drop(tx);
    pipeline.await?;

    while let Ok(phase) = phases.try_recv() {
        info!("phase observed: {:?}", phase);
    }
    info!(
        capture_frames = metrics.capture_frames.load(Ordering::Relaxed),
        silent_dropped = metrics.silent_frames_dropped.load(Ordering::Relaxed),
        chunks_sent = metrics.chunks_sent.load(Ordering::Relaxed),
        segments_scheduled = metrics.segments_scheduled.load(Ordering::Relaxed),
        segments_completed = metrics.segments_completed.load(Ordering::Relaxed),
        segments_cancelled = metrics.segments_cancelled.load(Ordering::Relaxed),
        "pipeline summary"
    );

    Ok(())
}
