//! Command line front end
//!
//! Argument parsing, output naming and the split-and-emit run shared by the
//! binary and the integration tests.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use vx_config::Config;
use vx_preprocess::{BuildTarget, Diagnostic, Preprocessor, ShaderSource, ShaderStage};

pub const USAGE: &str = "\
Usage: vxshader [OPTIONS] <file>
       vxshader [OPTIONS] --pair <vertex> <fragment>
       vxshader --init-config [PATH]

Options:
  --target <native|emscripten>  Target for $native / $emscripten regions
  --config <PATH>               Configuration file (default: ./vxshader.toml)
  --out-dir <DIR>               Directory for the written stages
  --stdout                      Print both stages instead of writing files
  -h, --help                    Show this message";

/// What to split
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// One annotated file holding both stages
    Combined(PathBuf),
    /// Vertex file split starting in vertex, fragment file starting in fragment
    Pair { vertex: PathBuf, fragment: PathBuf },
}

/// Requested action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Split(Input),
    InitConfig(PathBuf),
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub command: Command,
    pub target: Option<BuildTarget>,
    pub config: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub stdout: bool,
}

impl Args {
    /// Parse arguments, excluding the program name
    pub fn parse_from<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args = args.into_iter().map(Into::<String>::into);
        let mut target = None;
        let mut config = None;
        let mut out_dir = None;
        let mut stdout = false;
        let mut help = false;
        let mut init_config = false;
        let mut pair = None;
        let mut positional = Vec::new();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => help = true,
                "--stdout" => stdout = true,
                "--target" => {
                    let value = required(&mut args, "--target")?;
                    target = Some(value.parse::<BuildTarget>().map_err(anyhow::Error::msg)?);
                }
                "--config" => config = Some(PathBuf::from(required(&mut args, "--config")?)),
                "--out-dir" => out_dir = Some(PathBuf::from(required(&mut args, "--out-dir")?)),
                "--pair" => {
                    let vertex = PathBuf::from(required(&mut args, "--pair")?);
                    let fragment = PathBuf::from(required(&mut args, "--pair")?);
                    pair = Some(Input::Pair { vertex, fragment });
                }
                "--init-config" => init_config = true,
                flag if flag.starts_with("--") => bail!("unknown option {flag}\n\n{USAGE}"),
                _ => positional.push(PathBuf::from(arg)),
            }
        }

        let command = if help {
            Command::Help
        } else if init_config {
            match positional.len() {
                0 => Command::InitConfig(PathBuf::from(vx_config::CONFIG_FILE_NAME)),
                1 => Command::InitConfig(positional.remove(0)),
                _ => bail!("--init-config takes at most one path\n\n{USAGE}"),
            }
        } else {
            match (pair, positional.len()) {
                (Some(input), 0) => Command::Split(input),
                (Some(_), _) => {
                    bail!("--pair cannot be combined with a positional file\n\n{USAGE}")
                }
                (None, 1) => Command::Split(Input::Combined(positional.remove(0))),
                (None, 0) => bail!("no shader file given\n\n{USAGE}"),
                (None, n) => bail!("expected one shader file, got {n}\n\n{USAGE}"),
            }
        };

        Ok(Self {
            command,
            target,
            config,
            out_dir,
            stdout,
        })
    }

    /// Preprocessor for this invocation: config options, with `--target` on top
    pub fn preprocessor(&self, config: &Config) -> Preprocessor {
        let mut options = config.preprocess_options();
        if let Some(target) = self.target {
            options.target = target;
        }
        Preprocessor::new(options)
    }
}

fn required(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    match args.next() {
        Some(value) if !value.starts_with("--") => Ok(value),
        _ => bail!("{flag} requires a value\n\n{USAGE}"),
    }
}

/// Outcome of one split run
#[derive(Debug)]
pub struct Emitted {
    pub source: ShaderSource,
    pub diagnostics: Vec<Diagnostic>,
    /// Files written, empty with `--stdout`
    pub written: Vec<PathBuf>,
}

/// Split `input` with `preprocessor`
///
/// Fails when a top-level file cannot be opened; include problems are
/// returned as diagnostics.
pub fn split_input(
    preprocessor: &Preprocessor,
    input: &Input,
) -> Result<(ShaderSource, Vec<Diagnostic>)> {
    match input {
        Input::Combined(path) => {
            let split = preprocessor
                .split(path, ShaderStage::None)
                .with_context(|| format!("cannot split {}", path.display()))?;
            let source = ShaderSource::from_sources(split.vertex, split.fragment, path);
            Ok((source, split.diagnostics))
        }
        Input::Pair { vertex, fragment } => {
            let v = preprocessor
                .split(vertex, ShaderStage::Vertex)
                .with_context(|| format!("cannot split vertex stage {}", vertex.display()))?;
            let f = preprocessor
                .split(fragment, ShaderStage::Fragment)
                .with_context(|| format!("cannot split fragment stage {}", fragment.display()))?;

            let mut diagnostics = v.diagnostics;
            diagnostics.extend(f.diagnostics);
            let source =
                ShaderSource::from_sources_with_paths(v.vertex, f.fragment, vertex, fragment);
            Ok((source, diagnostics))
        }
    }
}

/// Destination of each stage: `<stem>.<extension>` in `out_dir`, or next to
/// the input file
pub fn output_paths(
    input: &Input,
    out_dir: Option<&Path>,
    config: &Config,
) -> Result<(PathBuf, PathBuf)> {
    let (vertex_input, fragment_input) = match input {
        Input::Combined(path) => (path.as_path(), path.as_path()),
        Input::Pair { vertex, fragment } => (vertex.as_path(), fragment.as_path()),
    };

    let vertex = stage_path(vertex_input, out_dir, &config.output.vertex_extension)?;
    let fragment = stage_path(fragment_input, out_dir, &config.output.fragment_extension)?;

    if vertex == fragment {
        bail!("both stages would be written to {}", vertex.display());
    }
    for output in [&vertex, &fragment] {
        if output == vertex_input || output == fragment_input {
            bail!("refusing to overwrite input {}", output.display());
        }
    }

    Ok((vertex, fragment))
}

fn stage_path(input: &Path, out_dir: Option<&Path>, extension: &str) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .with_context(|| format!("{} has no file name", input.display()))?;
    let dir = match out_dir {
        Some(dir) => dir.to_path_buf(),
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    Ok(dir.join(format!("{}.{extension}", stem.to_string_lossy())))
}

/// Split and emit, writing to files or to `out` with `--stdout`
pub fn run(args: &Args, config: &Config, out: &mut impl Write) -> Result<Option<Emitted>> {
    let input = match &args.command {
        Command::Help => {
            writeln!(out, "{USAGE}")?;
            return Ok(None);
        }
        Command::InitConfig(path) => {
            if path.exists() {
                bail!("{} already exists", path.display());
            }
            Config::write_default(path)?;
            writeln!(out, "wrote {}", path.display())?;
            return Ok(None);
        }
        Command::Split(input) => input,
    };

    let preprocessor = args.preprocessor(config);
    log::debug!("Splitting {:?} for {:?}", input, preprocessor.options().target);
    let (source, diagnostics) = split_input(&preprocessor, input)?;

    if !diagnostics.is_empty() {
        log::warn!("{} include(s) could not be resolved", diagnostics.len());
    }

    let mut written = Vec::new();
    if args.stdout {
        write!(
            out,
            "// vertex: {}\n{}",
            source.vertex_path().display(),
            source.vertex_source()
        )?;
        write!(
            out,
            "// fragment: {}\n{}",
            source.fragment_path().display(),
            source.fragment_source()
        )?;
    } else {
        let out_dir = args.out_dir.as_deref().or(config.output.directory.as_deref());
        let (vertex, fragment) = output_paths(input, out_dir, config)?;
        if let Some(dir) = out_dir {
            fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;
        }
        let stages = [
            (&vertex, source.vertex_source()),
            (&fragment, source.fragment_source()),
        ];
        for (path, text) in stages {
            fs::write(path, text).with_context(|| format!("cannot write {}", path.display()))?;
            log::info!("Wrote {}", path.display());
        }
        written.push(vertex);
        written.push(fragment);
    }

    Ok(Some(Emitted {
        source,
        diagnostics,
        written,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_combined() {
        let args = Args::parse_from(["--target", "emscripten", "quad.glsl"]).unwrap();
        assert_eq!(args.command, Command::Split(Input::Combined(PathBuf::from("quad.glsl"))));
        assert_eq!(args.target, Some(BuildTarget::Emscripten));
        assert!(!args.stdout);
    }

    #[test]
    fn test_parse_pair() {
        let args = Args::parse_from(["--pair", "a.glsl", "b.glsl", "--stdout"]).unwrap();
        assert_eq!(
            args.command,
            Command::Split(Input::Pair {
                vertex: PathBuf::from("a.glsl"),
                fragment: PathBuf::from("b.glsl"),
            })
        );
        assert!(args.stdout);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(Args::parse_from(Vec::<String>::new()).is_err());
        assert!(Args::parse_from(["a.glsl", "b.glsl"]).is_err());
        assert!(Args::parse_from(["--pair", "a.glsl"]).is_err());
        assert!(Args::parse_from(["--pair", "a", "b", "c"]).is_err());
        assert!(Args::parse_from(["--target", "metal", "a.glsl"]).is_err());
        assert!(Args::parse_from(["--frobnicate", "a.glsl"]).is_err());
        assert!(Args::parse_from(["--out-dir"]).is_err());
    }

    #[test]
    fn test_parse_help_and_init() {
        assert_eq!(Args::parse_from(["--help"]).unwrap().command, Command::Help);
        assert_eq!(
            Args::parse_from(["--init-config"]).unwrap().command,
            Command::InitConfig(PathBuf::from("vxshader.toml"))
        );
        assert_eq!(
            Args::parse_from(["--init-config", "x.toml"]).unwrap().command,
            Command::InitConfig(PathBuf::from("x.toml"))
        );
    }

    #[test]
    fn test_target_flag_overrides_config() {
        let mut config = Config::default();
        config.preprocess.target = Some(BuildTarget::Native);
        let args = Args::parse_from(["--target", "web", "a.glsl"]).unwrap();
        assert_eq!(args.preprocessor(&config).options().target, BuildTarget::Emscripten);

        let args = Args::parse_from(["a.glsl"]).unwrap();
        assert_eq!(args.preprocessor(&config).options().target, BuildTarget::Native);
    }

    #[test]
    fn test_output_paths_next_to_input() {
        let config = Config::default();
        let input = Input::Combined(PathBuf::from("shaders/quad.glsl"));
        let (vertex, fragment) = output_paths(&input, None, &config).unwrap();
        assert_eq!(vertex, PathBuf::from("shaders/quad.vert"));
        assert_eq!(fragment, PathBuf::from("shaders/quad.frag"));
    }

    #[test]
    fn test_output_paths_in_out_dir() {
        let config = Config::default();
        let input = Input::Pair {
            vertex: PathBuf::from("src/a.glsl"),
            fragment: PathBuf::from("src/b.glsl"),
        };
        let (vertex, fragment) = output_paths(&input, Some(Path::new("out")), &config).unwrap();
        assert_eq!(vertex, PathBuf::from("out/a.vert"));
        assert_eq!(fragment, PathBuf::from("out/b.frag"));
    }

    #[test]
    fn test_output_paths_keep_dotted_stem() {
        let config = Config::default();
        let input = Input::Combined(PathBuf::from("post.bloom.glsl"));
        let (vertex, _) = output_paths(&input, None, &config).unwrap();
        assert_eq!(vertex, PathBuf::from("post.bloom.vert"));
    }

    #[test]
    fn test_output_paths_refuse_to_overwrite_input() {
        let config = Config::default();
        let input = Input::Pair {
            vertex: PathBuf::from("quad.vert"),
            fragment: PathBuf::from("quad.frag"),
        };
        assert!(output_paths(&input, None, &config).is_err());
        assert!(output_paths(&input, Some(Path::new("out")), &config).is_ok());
    }
}
