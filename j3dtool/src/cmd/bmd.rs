use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use argh::FromArgs;
use j3dlib::format::bmd::BmdModel;

use crate::util::file::map_file;

#[derive(FromArgs, PartialEq, Debug)]
/// process BMD/BDL files
#[argh(subcommand, name = "bmd")]
pub struct Args {
    #[argh(subcommand)]
    command: SubCommand,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand)]
enum SubCommand {
    Info(InfoArgs),
    Dump(DumpArgs),
}

#[derive(FromArgs, PartialEq, Eq, Debug)]
/// prints a summary of a model
#[argh(subcommand, name = "info")]
pub struct InfoArgs {
    #[argh(positional)]
    /// input BMD/BDL
    input: PathBuf,
}

#[derive(FromArgs, PartialEq, Eq, Debug)]
/// writes the decoded model as JSON
#[argh(subcommand, name = "dump")]
pub struct DumpArgs {
    #[argh(positional)]
    /// input BMD/BDL
    input: PathBuf,
    #[argh(positional)]
    /// output JSON file
    output: PathBuf,
}

pub fn run(args: Args) -> Result<()> {
    match args.command {
        SubCommand::Info(c_args) => info(c_args),
        SubCommand::Dump(c_args) => dump(c_args),
    }
}

fn info(args: InfoArgs) -> Result<()> {
    let data = map_file(&args.input)?;
    let model = BmdModel::slice(&data)
        .with_context(|| format!("Failed to decode '{}'", args.input.display()))?;

    log::info!("Model info ({:?}):", model.kind);
    log::info!(
        "  Vertices: {} ({} matrix groups, scaling {:?})",
        model.inf1.vertex_count,
        model.inf1.matrix_group_count,
        model.inf1.scaling_rule()
    );
    for (attr, array) in &model.vtx1.vertex_arrays {
        log::info!(
            "  {:?}: {} x {:?} {:?} (shift {})",
            attr,
            array.len(),
            array.comp_count,
            array.comp_type,
            array.comp_shift
        );
    }
    log::info!(
        "  Envelopes: {} ({} inverse binds)",
        model.evp1.envelopes.len(),
        model.evp1.inverse_binds.len()
    );
    log::info!("  Draw matrices: {}", model.drw1.matrices.len());
    log::info!("  Joints: {}", model.jnt1.joints.len());
    for joint in &model.jnt1.joints {
        log::info!("    {} (radius {})", joint.name, joint.bounding_radius);
    }
    log::info!("  Materials: {}", model.mat3.materials.len());
    for material in &model.mat3.materials {
        log::info!(
            "    {} {:?}, {} TEV stages, {} textures",
            material.name,
            material.mode,
            material.gx.tev_stages.len(),
            material.texture_indices.iter().flatten().count()
        );
    }
    let samplers = model.tex1.samplers.len();
    let textures = model.tex1.textures.len();
    let ratio = if samplers == 0 { 1.0 } else { textures as f32 / samplers as f32 };
    log::info!("  Textures: {textures} unique of {samplers} samplers (ratio {ratio:.2})");
    for texture in &model.tex1.textures {
        log::info!(
            "    {} {:?} {}x{} ({} mips)",
            texture.name,
            texture.format,
            texture.width,
            texture.height,
            texture.mip_count
        );
    }
    Ok(())
}

fn dump(args: DumpArgs) -> Result<()> {
    let data = map_file(&args.input)?;
    let model = BmdModel::slice(&data)
        .with_context(|| format!("Failed to decode '{}'", args.input.display()))?;

    let mut file = BufWriter::new(
        File::create(&args.output)
            .with_context(|| format!("Failed to create output file '{}'", args.output.display()))?,
    );
    log::info!("Writing {}", args.output.display());
    serde_json::to_writer_pretty(&mut file, &model)?;
    file.flush()?;
    Ok(())
}
