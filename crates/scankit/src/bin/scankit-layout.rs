//! Command-line access to the shared layout table.
//!
//! - `wgsl` writes the WGSL prelude for shaders to include
//! - `schema` writes the layout table as JSON
//! - `check` compares every host layout against naga's view of the WGSL

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use scankit::{check_catalog, CodegenOptions, WgslGenerator};

/// scankit GPU layout tool.
#[derive(Parser, Debug)]
#[command(
    name = "scankit-layout",
    about = "Generate and check the GPU layouts shared by scankit host code and shaders",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the WGSL prelude declaring every shared struct.
    Wgsl {
        /// Output file. Prints to stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,

        /// JSON file with code generation options.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Emit a uniform declaration for each block in this bind group.
        /// Overrides the config file.
        #[arg(long)]
        bind_group: Option<u32>,
    },

    /// Write the layout table as JSON.
    Schema {
        /// Output file. Prints to stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Check host layouts against the generated WGSL.
    Check {
        /// JSON file with code generation options.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn load_options(config: Option<&Path>) -> scankit::Result<CodegenOptions> {
    match config {
        Some(path) => CodegenOptions::load(path),
        None => Ok(CodegenOptions::default()),
    }
}

fn wgsl_options(config: Option<&Path>, bind_group: Option<u32>) -> scankit::Result<CodegenOptions> {
    let mut options = load_options(config)?;
    if let Some(group) = bind_group {
        options.bind_group = group;
        options.emit_uniform_bindings = true;
    }
    Ok(options)
}

fn run(command: Command) -> scankit::Result<ExitCode> {
    match command {
        Command::Wgsl {
            out,
            config,
            bind_group,
        } => {
            let options = wgsl_options(config.as_deref(), bind_group)?;
            match out {
                Some(path) => scankit::write_wgsl(path, options)?,
                None => print!("{}", WgslGenerator::new(options).generate()),
            }
        }
        Command::Schema { out } => match out {
            Some(path) => scankit::write_schema(path)?,
            None => println!("{}", scankit::render::catalog::to_json()?),
        },
        Command::Check { config } => {
            let generator = WgslGenerator::new(load_options(config.as_deref())?);
            let checks = check_catalog(&generator)?;
            let mut failed = 0;
            for check in &checks {
                let layout = check.entry.layout;
                match &check.result {
                    Ok(()) => println!("ok    {:<26} {:>4} bytes", layout.name, layout.size),
                    Err(err) => {
                        println!("FAIL  {:<26} {err}", layout.name);
                        failed += 1;
                    }
                }
            }
            println!("{} structs checked, {failed} mismatched", checks.len());
            if failed > 0 {
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    scankit::init_logging();
    let cli = Cli::parse();
    match run(cli.command) {
        Ok(code) => code,
        Err(err) => {
            log::error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_wgsl_arguments() {
        let cli = Cli::try_parse_from(["scankit-layout", "wgsl", "--out", "layout.wgsl", "--bind-group", "1"]).unwrap();
        match cli.command {
            Command::Wgsl { out, bind_group, config } => {
                assert_eq!(out, Some(PathBuf::from("layout.wgsl")));
                assert_eq!(bind_group, Some(1));
                assert!(config.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_bind_group_enables_uniform_bindings() {
        let options = wgsl_options(None, Some(1)).unwrap();
        assert_eq!(options.bind_group, 1);
        assert!(options.emit_uniform_bindings);
        let prelude = WgslGenerator::new(options).generate();
        assert!(prelude.contains("@group(1) @binding(2) var<uniform> cube_uniforms: CubeUniforms;"));

        let plain = wgsl_options(None, None).unwrap();
        assert_eq!(plain, CodegenOptions::default());
    }

    #[test]
    fn test_wgsl_out_writes_file() {
        let path = std::env::temp_dir().join(format!("scankit-layout-{}.wgsl", std::process::id()));
        let command = Command::Wgsl {
            out: Some(path.clone()),
            config: None,
            bind_group: Some(2),
        };
        assert_eq!(run(command).unwrap(), ExitCode::SUCCESS);
        let written = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(written.contains("struct DepthOverlayUniforms {"));
        assert!(written.contains("@group(2) @binding(2) var<uniform> depth_overlay_uniforms"));
    }
}
