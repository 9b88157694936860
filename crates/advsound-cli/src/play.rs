//! Playing one sound from the command line.

use std::thread;
use std::time::{Duration, Instant};

use advsound_backend::{Backend, HardwareMixer, SoftwareMixer};
use advsound_core::{SoundId, Volume};
use advsound_engine::{SoundController, SoundLog};
use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use crate::cli::{BackendKind, PlayArgs};
use crate::config::AppConfig;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub fn run(args: &PlayArgs, config: &AppConfig) -> Result<()> {
    match args.backend.unwrap_or(config.backend) {
        BackendKind::Software => play(SoftwareMixer::new(), args, config),
        BackendKind::Hardware => play(HardwareMixer::new(), args, config),
    }
}

fn play<B: Backend>(backend: B, args: &PlayArgs, config: &AppConfig) -> Result<()> {
    let filename =
        file_name(&args.uri).with_context(|| format!("No file name in '{}'", args.uri))?;
    let limit = args
        .seconds
        .map(Duration::try_from_secs_f64)
        .transpose()
        .context("--seconds must be a non-negative number")?;

    let mut controller =
        SoundController::with_config(backend, &config.controller, SoundLog::new());
    controller.initialize()?;

    let result = play_queued(&mut controller, args, config, filename, limit);
    controller.cleanup();
    result
}

fn play_queued<B: Backend>(
    controller: &mut SoundController<B>,
    args: &PlayArgs,
    config: &AppConfig,
    filename: &str,
    limit: Option<Duration>,
) -> Result<()> {
    let id = controller
        .queue(&args.uri, filename, args.looped, false)
        .map_err(|e| {
            if e.is_resource_error() {
                anyhow::Error::new(e).context(format!("Cannot use '{}' as a sound", args.uri))
            } else {
                e.into()
            }
        })?;
    let volume = args.volume.map_or(config.volume, Volume::clamped);
    controller.set_volume(id, i64::from(volume.percent()));
    if volume.is_mute() {
        warn!("Sound {id} will play at zero volume");
    }

    let started = if args.background {
        controller.play_in_background(id, args.looped)
    } else if let Some(&[x, y, z]) = args.position.as_deref() {
        controller.play_3d(id, x, y, z)
    } else {
        controller.play(id)
    };
    if !started {
        bail!("Sound {id} did not start");
    }
    info!(
        "Playing '{filename}' as sound {id} on the {} backend",
        controller.backend().label()
    );

    wait(controller, id, limit);
    Ok(())
}

/// Block until the sound ends or `limit` runs out.
fn wait<B: Backend>(controller: &mut SoundController<B>, id: SoundId, limit: Option<Duration>) {
    let started = Instant::now();
    while controller.is_playing(id) {
        if limit.is_some_and(|limit| started.elapsed() >= limit) {
            controller.stop(id);
            info!("Stopped after {:.1}s", started.elapsed().as_secs_f64());
            return;
        }
        thread::sleep(POLL_INTERVAL);
    }
    info!("Sound {id} finished");
}

fn file_name(uri: &str) -> Option<&str> {
    uri.rsplit(['/', '\\']).next().filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("https://example.com/sfx/door.ogg"), Some("door.ogg"));
        assert_eq!(file_name(r"C:\sounds\step.wav"), Some("step.wav"));
        assert_eq!(file_name("theme.mid"), Some("theme.mid"));
        assert_eq!(file_name("sounds/"), None);
    }
}
