//! Model description command implementations

use anyhow::Result;
use clap::Subcommand;
use console::style;
use std::path::PathBuf;
use studio_model::{MAX_POSE_PARAMETERS, StudioModel};

use crate::commands::load_model;
use crate::utils::{add_table_row, create_table, format_seconds, format_vec3, yes_no};

#[derive(Subcommand)]
pub enum ModelCommands {
    /// Display information about a model description
    Info {
        /// Path to the JSON model description
        file: PathBuf,

        /// Show bones, hitboxes and other tables as well
        #[arg(short, long)]
        detailed: bool,
    },

    /// Check that a model description loads and validates
    Validate {
        /// Path to the JSON model description
        file: PathBuf,
    },
}

pub fn execute(cmd: ModelCommands) -> Result<()> {
    match cmd {
        ModelCommands::Info { file, detailed } => handle_info(file, detailed),
        ModelCommands::Validate { file } => handle_validate(file),
    }
}

fn handle_validate(path: PathBuf) -> Result<()> {
    let model = load_model(&path)?;
    println!(
        "✓ Model '{}' is valid ({} bones, {} sequences)",
        style(model.name()).cyan(),
        model.bone_count(),
        model.sequence_count()
    );
    Ok(())
}

fn handle_info(path: PathBuf, detailed: bool) -> Result<()> {
    let model = load_model(&path)?;

    println!("\n{}", style("Model Information").bold().underlined());
    println!("File: {}", style(path.display()).cyan());
    println!("Name: {}", style(model.name()).yellow());
    println!("Bones: {}", style(model.bone_count()).green());
    println!("Animations: {}", style(model.animations().len()).green());
    println!("Sequences: {}", style(model.sequence_count()).green());
    println!("Pose Parameters: {}", style(model.pose_param_count()).green());
    println!("Attachments: {}", style(model.attachments().len()).green());
    println!("Hitbox Sets: {}", style(model.hitbox_sets().len()).green());
    println!("Body Parts: {}", style(model.body_parts().len()).green());
    println!("IK Chains: {}", style(model.ik_chains().len()).green());

    print_sequences(&model);

    if model.pose_param_count() > 0 {
        println!("\n{}", style("Pose Parameters").bold());
        let mut table = create_table(&["Name", "Start", "End", "Loop"]);
        for param in model.pose_params() {
            add_table_row(
                &mut table,
                [
                    param.name.clone(),
                    format!("{:.2}", param.start),
                    format!("{:.2}", param.end),
                    format!("{:.2}", param.looping),
                ],
            );
        }
        table.printstd();
    }

    if !model.attachments().is_empty() {
        println!("\n{}", style("Attachments").bold());
        let mut table = create_table(&["Name", "Bone", "Offset"]);
        for attachment in model.attachments() {
            add_table_row(
                &mut table,
                [
                    attachment.name.clone(),
                    bone_name(&model, attachment.bone),
                    format_vec3(attachment.position),
                ],
            );
        }
        table.printstd();
    }

    if detailed {
        print_details(&model);
    }

    Ok(())
}

fn print_sequences(model: &StudioModel) {
    if model.sequence_count() == 0 {
        return;
    }

    println!("\n{}", style("Sequences").bold());
    let neutral = [0.0; MAX_POSE_PARAMETERS];
    let mut table = create_table(&["#", "Label", "Activity", "Duration", "Loop", "Events"]);
    for (index, sequence) in model.sequences().iter().enumerate() {
        add_table_row(
            &mut table,
            [
                index.to_string(),
                sequence.label.clone(),
                sequence.activity.clone().unwrap_or_else(|| "-".to_string()),
                format_seconds(model.sequence_duration(index, &neutral)),
                yes_no(sequence.is_looping()).to_string(),
                sequence.events.len().to_string(),
            ],
        );
    }
    table.printstd();
}

fn print_details(model: &StudioModel) {
    println!("\n{}", style("Bones").bold());
    let mut table = create_table(&["#", "Name", "Parent", "Position", "Flags"]);
    for (index, bone) in model.bones().iter().enumerate() {
        add_table_row(
            &mut table,
            [
                index.to_string(),
                bone.name.clone(),
                bone.parent.map_or_else(|| "-".to_string(), |p| bone_name(model, p)),
                format_vec3(bone.position),
                format!("{:?}", bone.flags),
            ],
        );
    }
    table.printstd();

    for set in model.hitbox_sets() {
        println!("\n{} {}", style("Hitbox Set").bold(), style(&set.name).cyan());
        let mut table = create_table(&["Name", "Bone", "Group", "Min", "Max"]);
        for hitbox in &set.hitboxes {
            add_table_row(
                &mut table,
                [
                    hitbox.name.clone(),
                    bone_name(model, hitbox.bone),
                    hitbox.group.to_string(),
                    format_vec3(hitbox.bbmin),
                    format_vec3(hitbox.bbmax),
                ],
            );
        }
        table.printstd();
    }

    if !model.body_parts().is_empty() {
        println!("\n{}", style("Body Parts").bold());
        let mut table = create_table(&["Name", "Base", "Models"]);
        for part in model.body_parts() {
            add_table_row(
                &mut table,
                [part.name.clone(), part.base.to_string(), part.num_models.to_string()],
            );
        }
        table.printstd();
    }

    if !model.ik_chains().is_empty() {
        println!("\n{}", style("IK Chains").bold());
        let mut table = create_table(&["Name", "Links", "Knee"]);
        for chain in model.ik_chains() {
            let links = chain
                .links
                .iter()
                .map(|&bone| bone_name(model, bone))
                .collect::<Vec<_>>()
                .join(" > ");
            add_table_row(&mut table, [chain.name.clone(), links, format_vec3(chain.knee_dir)]);
        }
        table.printstd();
    }

    for (index, sequence) in model.sequences().iter().enumerate() {
        let events = model.sequence_events(index);
        if events.is_empty() {
            continue;
        }
        println!("\n{} {}", style("Events of").bold(), style(&sequence.label).cyan());
        let mut table = create_table(&["Cycle", "Event", "Options"]);
        for event in events {
            add_table_row(
                &mut table,
                [
                    format!("{:.3}", event.cycle),
                    event.event.to_string(),
                    event.options.clone(),
                ],
            );
        }
        table.printstd();
    }
}

fn bone_name(model: &StudioModel, bone: usize) -> String {
    model
        .bone(bone)
        .map_or_else(|| format!("#{bone}"), |b| b.name.clone())
}

