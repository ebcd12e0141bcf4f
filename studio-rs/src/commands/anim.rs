//! Animation playback command implementations

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use console::style;
use glam::Vec3;
use std::path::{Path, PathBuf};
use studio_anim::{Animating, AnimatingOptions, FiredEvent, TickContext};
use studio_model::BoneFlags;

use crate::commands::load_model;
use crate::utils::{
    add_table_row, create_table, format_seconds, format_vec3, parse_pose, parse_vec3, yes_no,
};

#[derive(Subcommand)]
pub enum AnimCommands {
    /// Play a sequence at a fixed tick and report every event it fires
    Simulate {
        /// Path to the JSON model description
        file: PathBuf,

        /// Sequence label or index
        #[arg(short, long)]
        sequence: String,

        /// Seconds to simulate
        #[arg(short, long, default_value = "1.0")]
        duration: f32,

        /// Seconds between ticks
        #[arg(short, long, default_value = "0.1")]
        tick: f32,

        /// Playback rate
        #[arg(short, long, default_value = "1.0")]
        rate: f32,

        /// Pose parameter assignment, e.g. `--pose speed=0.5`
        #[arg(short, long = "pose", value_parser = parse_pose)]
        poses: Vec<(String, f32)>,

        /// Longest interval a single tick may advance the clock
        #[arg(long)]
        max_interval: Option<f32>,
    },

    /// Print world-space bone positions at a cycle
    Bones {
        /// Path to the JSON model description
        file: PathBuf,

        /// Sequence label or index
        #[arg(short, long)]
        sequence: String,

        /// Cycle to evaluate
        #[arg(short, long, default_value = "0.0")]
        cycle: f32,

        /// Entity origin as x,y,z
        #[arg(long, default_value = "0,0,0", value_parser = parse_vec3, allow_hyphen_values = true)]
        origin: Vec3,

        /// Entity yaw in degrees
        #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
        yaw: f32,

        /// Pose parameter assignment, e.g. `--pose speed=0.5`
        #[arg(short, long = "pose", value_parser = parse_pose)]
        poses: Vec<(String, f32)>,
    },

    /// Print the root motion covered by an interval of playback
    Motion {
        /// Path to the JSON model description
        file: PathBuf,

        /// Sequence label or index
        #[arg(short, long)]
        sequence: String,

        /// Seconds of playback
        #[arg(short, long, default_value = "0.1")]
        interval: f32,

        /// Cycle to start from
        #[arg(short, long, default_value = "0.0")]
        cycle: f32,

        /// Entity yaw in degrees
        #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
        yaw: f32,

        /// Pose parameter assignment, e.g. `--pose speed=0.5`
        #[arg(short, long = "pose", value_parser = parse_pose)]
        poses: Vec<(String, f32)>,
    },
}

pub fn execute(cmd: AnimCommands) -> Result<()> {
    match cmd {
        AnimCommands::Simulate {
            file,
            sequence,
            duration,
            tick,
            rate,
            poses,
            max_interval,
        } => {
            let mut options = AnimatingOptions::default();
            if let Some(seconds) = max_interval {
                options = options.with_max_interval(seconds);
            }
            let mut entity = setup_entity(&file, &sequence, &poses, options)?;
            entity.set_playback_rate(rate);
            handle_simulate(&mut entity, duration, tick)
        }
        AnimCommands::Bones {
            file,
            sequence,
            cycle,
            origin,
            yaw,
            poses,
        } => {
            let mut entity = setup_entity(&file, &sequence, &poses, AnimatingOptions::default())?;
            entity.set_cycle(cycle);
            entity.set_origin(origin);
            entity.set_angles(Vec3::new(0.0, yaw, 0.0));
            handle_bones(&mut entity);
            Ok(())
        }
        AnimCommands::Motion {
            file,
            sequence,
            interval,
            cycle,
            yaw,
            poses,
        } => {
            let mut entity = setup_entity(&file, &sequence, &poses, AnimatingOptions::default())?;
            entity.set_cycle(cycle);
            entity.set_angles(Vec3::new(0.0, yaw, 0.0));
            handle_motion(&entity, interval);
            Ok(())
        }
    }
}

/// Load the model and start `sequence` with the given pose parameters applied
fn setup_entity(
    file: &Path,
    sequence: &str,
    poses: &[(String, f32)],
    options: AnimatingOptions,
) -> Result<Animating> {
    let model = load_model(file)?;
    let mut entity = Animating::new().with_options(options).with_model(model);

    for (name, value) in poses {
        let index = entity
            .lookup_pose_parameter(name)
            .with_context(|| format!("Unknown pose parameter '{name}'"))?;
        entity.set_pose_parameter(index, *value);
    }

    let index = resolve_sequence(&entity, sequence)?;
    entity.reset_sequence(index);
    log::debug!("Playing sequence {index} ('{sequence}')");
    Ok(entity)
}

/// Find a sequence by label, falling back to a numeric index
fn resolve_sequence(entity: &Animating, sequence: &str) -> Result<usize> {
    let count = entity.model().map_or(0, |m| m.sequence_count());
    entity
        .lookup_sequence(sequence)
        .or_else(|| sequence.parse::<usize>().ok().filter(|&i| i < count))
        .with_context(|| format!("Unknown sequence '{sequence}' ({count} sequences)"))
}

fn label(entity: &Animating) -> String {
    entity
        .sequence()
        .and_then(|s| entity.sequence_name(s))
        .unwrap_or("-")
        .to_string()
}

fn handle_simulate(entity: &mut Animating, duration: f32, tick: f32) -> Result<()> {
    if tick <= 0.0 {
        bail!("Tick must be positive, got {tick}");
    }
    if duration < 0.0 {
        bail!("Duration must not be negative, got {duration}");
    }

    println!(
        "Simulating '{}' for {} at {} ticks (sequence duration {})",
        style(label(entity)).cyan(),
        format_seconds(duration),
        format_seconds(tick),
        format_seconds(entity.sequence_duration(entity.sequence()))
    );

    let start = entity.state().anim_time;
    let ticks = (duration / tick).round() as usize;
    let mut total = 0;
    let mut table = create_table(&["Time", "Cycle", "Finished", "Events"]);

    for i in 1..=ticks {
        let time = start + i as f32 * tick;
        let mut fired: Vec<FiredEvent> = Vec::new();
        entity.update(time, &mut |event: &FiredEvent| fired.push(event.clone()));
        total += fired.len();

        let events = fired
            .iter()
            .map(|e| {
                if e.options.is_empty() {
                    format!("{} at {}", e.event, format_seconds(e.time))
                } else {
                    format!("{} '{}' at {}", e.event, e.options, format_seconds(e.time))
                }
            })
            .collect::<Vec<_>>()
            .join(", ");

        add_table_row(
            &mut table,
            [
                format_seconds(time),
                format!("{:.4}", entity.cycle()),
                yes_no(entity.is_sequence_finished()).to_string(),
                events,
            ],
        );
    }

    table.printstd();
    println!("Fired {} events", style(total).green());
    Ok(())
}

fn handle_bones(entity: &mut Animating) {
    println!(
        "Bones of '{}' at cycle {:.4}",
        style(label(entity)).cyan(),
        entity.cycle()
    );

    let transforms = entity.setup_bones(&TickContext::new(0.0), BoneFlags::USED_BY_ANYTHING);
    let mut table = create_table(&["#", "Bone", "Position"]);
    for (index, transform) in transforms.iter().enumerate() {
        let name = entity
            .model()
            .and_then(|m| m.bone(index))
            .map_or_else(|| format!("#{index}"), |b| b.name.clone());
        let position = transform.map_or_else(
            || "-".to_string(),
            |t| format_vec3(Vec3::from(t.translation)),
        );
        add_table_row(&mut table, [index.to_string(), name, position]);
    }
    table.printstd();
}

fn handle_motion(entity: &Animating, interval: f32) {
    let movement = entity.interval_movement(interval);

    println!(
        "Motion of '{}' from cycle {:.4}",
        style(label(entity)).cyan(),
        entity.cycle()
    );
    let mut table = create_table(&["Property", "Value"]);
    let rows = [
        ("Interval used", format_seconds(movement.interval_used)),
        ("End cycle", format!("{:.4}", movement.end_cycle)),
        ("Finished", yes_no(movement.finished).to_string()),
        ("Moved", yes_no(movement.moved).to_string()),
        ("Position", format_vec3(movement.position)),
        ("Yaw", format!("{:.2}", movement.angles.y)),
        (
            "Instantaneous velocity",
            format!("{:.2}", entity.instantaneous_velocity(interval)),
        ),
        ("Ground speed", format!("{:.2}", entity.ground_speed())),
        ("Velocity", format_vec3(entity.velocity())),
    ];
    for (property, value) in rows {
        add_table_row(&mut table, [property.to_string(), value]);
    }
    table.printstd();
}
