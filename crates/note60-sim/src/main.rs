use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use glam::Vec3;
use note60_engine::gfx::RecordingGl;
use note60_engine::host::{HostConfig, StereoHost};
use note60_engine::logging::{LoggingConfig, init_logging};
use note60_scene::{FrameRenderer, NoteSpec, SceneConfig, ShaderSources};

struct Args {
    host: HostConfig,
    notes: Vec<NoteSpec>,
    shader_dir: Option<PathBuf>,
    log_filter: Option<String>,
}

fn parse_args() -> Result<Args> {
    let mut host = HostConfig::default();
    let mut notes = Vec::new();
    let mut shader_dir = None;
    let mut log_filter = None;
    let mut trigger_every = None;

    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        let mut value = || it.next().ok_or_else(|| anyhow!("missing value for {arg}"));
        match arg.as_str() {
            "--frames" => {
                host.frames = value()?.parse().context("invalid --frames value")?;
            }
            "--size" => {
                let v = value()?;
                let (w, h) = v
                    .split_once('x')
                    .ok_or_else(|| anyhow!("--size expects WxH, got {v:?}"))?;
                host.surface_width = w.parse().context("invalid --size width")?;
                host.surface_height = h.parse().context("invalid --size height")?;
                if host.surface_width == 0 || host.surface_height == 0 {
                    bail!("--size must be non-zero");
                }
            }
            "--yaw-rate" => {
                host.yaw_deg_per_frame = value()?.parse().context("invalid --yaw-rate value")?;
            }
            "--ipd" => {
                host.interpupillary_distance = value()?.parse().context("invalid --ipd value")?;
            }
            "--trigger-every" => {
                let n: u64 = value()?.parse().context("invalid --trigger-every value")?;
                if n == 0 {
                    bail!("--trigger-every must be > 0");
                }
                trigger_every = Some(n);
            }
            "--note" => {
                notes.push(parse_note(&value()?)?);
            }
            "--shader-dir" => {
                shader_dir = Some(PathBuf::from(value()?));
            }
            "--log" => {
                log_filter = Some(value()?);
            }
            "--mono" => {
                host.stereo = false;
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            other => bail!("unknown argument: {other}"),
        }
    }

    if let Some(n) = trigger_every {
        host.trigger_frames = (0..host.frames).filter(|f| (f + 1) % n == 0).collect();
    }

    Ok(Args {
        host,
        notes,
        shader_dir,
        log_filter,
    })
}

/// `MESSAGE@X,Y,Z`, or just `MESSAGE` for the default position.
fn parse_note(text: &str) -> Result<NoteSpec> {
    let Some((message, pos)) = text.rsplit_once('@') else {
        return Ok(NoteSpec::new(text, SceneConfig::NOTE_POSITION));
    };

    let coords = pos
        .split(',')
        .map(|c| c.trim().parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("invalid note position {pos:?}"))?;
    let [x, y, z] = coords[..] else {
        bail!("note position needs three coordinates, got {pos:?}");
    };
    Ok(NoteSpec::new(message, Vec3::new(x, y, z)))
}

fn print_help() {
    eprintln!("note60-sim [--frames N] [--size WxH] [--mono] [--ipd M] [--yaw-rate DEG]");
    eprintln!("           [--trigger-every N] [--note MESSAGE[@X,Y,Z]]... [--shader-dir DIR] [--log FILTER]");
}

fn main() {
    let args = match parse_args() {
        Ok(v) => v,
        Err(err) => {
            eprintln!("{err:#}");
            print_help();
            std::process::exit(2);
        }
    };

    init_logging(LoggingConfig {
        filter: args.log_filter.clone(),
        ..LoggingConfig::default()
    });

    if let Err(err) = run(args) {
        log::error!("{err:#}");
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut scene = SceneConfig::default();
    if !args.notes.is_empty() {
        scene.notes = args.notes;
    }
    if let Some(dir) = &args.shader_dir {
        scene.shaders = ShaderSources::from_dir(dir)?;
    }

    let host = StereoHost::new(args.host);
    let mut gl = RecordingGl::new();
    let mut renderer = FrameRenderer::new(scene);

    let summary = host.run(&mut gl, &mut renderer)?;

    println!(
        "{} frame(s), {} eye(s), {} draw call(s), {} trigger(s), {} graphics error(s), final yaw {:.1} deg",
        summary.frames,
        summary.eyes_drawn,
        gl.draws().len(),
        summary.triggers,
        renderer.total_errors(),
        summary.final_yaw_deg
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_with_position() {
        let n = parse_note("buy milk@1,-2.5,-4").unwrap();
        assert_eq!(n.message, "buy milk");
        assert_eq!(n.position, Vec3::new(1.0, -2.5, -4.0));
    }

    #[test]
    fn note_without_position_uses_default() {
        let n = parse_note("hello").unwrap();
        assert_eq!(n.position, SceneConfig::NOTE_POSITION);
    }

    #[test]
    fn message_may_contain_at_sign() {
        let n = parse_note("me@home@0,0,-2").unwrap();
        assert_eq!(n.message, "me@home");
    }

    #[test]
    fn bad_positions_are_rejected() {
        assert!(parse_note("x@1,2").is_err());
        assert!(parse_note("x@1,two,3").is_err());
    }
}
