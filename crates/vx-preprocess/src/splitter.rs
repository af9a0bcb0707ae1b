//! Source splitter
//!
//! Reads an annotated shader file line by line and accumulates two buffers,
//! one per stage. Directive lines switch the active stage, open and close
//! platform gates, or splice in the vertex output of another file.

use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{MAIN_SEPARATOR_STR, Path, PathBuf};

use crate::directive::{Directive, DirectiveMatching};
use crate::error::{Diagnostic, IncludeFailure, PreprocessError};
use crate::line::{LineKind, classify};
use crate::{BuildTarget, LOG_TARGET, PlatformGate, ShaderStage, can_write};

/// Knobs controlling how files are split
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreprocessOptions {
    /// Target used to evaluate `$native` / `$emscripten` regions
    pub target: BuildTarget,
    /// Keyword matching mode for directive bodies
    pub matching: DirectiveMatching,
    /// Skip includes that re-enter a file already being resolved
    pub detect_cycles: bool,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            target: BuildTarget::host(),
            matching: DirectiveMatching::default(),
            detect_cycles: true,
        }
    }
}

/// Result of splitting one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Split {
    /// Accumulated vertex-stage text, one `\n` per line
    pub vertex: String,
    /// Accumulated fragment-stage text, one `\n` per line
    pub fragment: String,
    /// Include failures from this file and everything it included
    pub diagnostics: Vec<Diagnostic>,
}

impl Split {
    /// Buffer receiving text for `stage`, if any
    pub fn buffer_mut(&mut self, stage: ShaderStage) -> Option<&mut String> {
        match stage {
            ShaderStage::None => None,
            ShaderStage::Vertex => Some(&mut self.vertex),
            ShaderStage::Fragment => Some(&mut self.fragment),
        }
    }

    /// Whether every include resolved
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Splits annotated shader files into vertex and fragment text
#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    options: PreprocessOptions,
}

/// Directive state while walking one file
#[derive(Debug, Clone, Copy)]
struct Cursor {
    stage: ShaderStage,
    gate: PlatformGate,
}

impl Preprocessor {
    pub fn new(options: PreprocessOptions) -> Self {
        Self { options }
    }

    /// Preprocessor for a specific target with default matching
    pub fn for_target(target: BuildTarget) -> Self {
        Self::new(PreprocessOptions {
            target,
            ..PreprocessOptions::default()
        })
    }

    pub fn options(&self) -> &PreprocessOptions {
        &self.options
    }

    /// Split `path`, treating text before the first stage directive as
    /// `initial_stage`
    ///
    /// Fails only when `path` itself cannot be opened or read. Include failures
    /// are logged, skipped and reported in [`Split::diagnostics`].
    pub fn split(
        &self,
        path: impl AsRef<Path>,
        initial_stage: ShaderStage,
    ) -> Result<Split, PreprocessError> {
        let mut chain = Vec::new();
        self.split_file(path.as_ref(), initial_stage, &mut chain)
    }

    fn split_file(
        &self,
        path: &Path,
        initial_stage: ShaderStage,
        chain: &mut Vec<PathBuf>,
    ) -> Result<Split, PreprocessError> {
        let file = File::open(path).map_err(|source| {
            let err = PreprocessError::Open {
                path: path.to_path_buf(),
                source,
            };
            log::error!(target: LOG_TARGET, "{err}");
            err
        })?;

        chain.push(chain_key(path));
        let result = self.split_lines(BufReader::new(file), path, initial_stage, chain);
        chain.pop();

        if result.is_ok() {
            log::debug!(target: LOG_TARGET, "shader \"{}\" loaded", path.display());
        }
        result
    }

    fn split_lines(
        &self,
        reader: impl BufRead,
        path: &Path,
        initial_stage: ShaderStage,
        chain: &mut Vec<PathBuf>,
    ) -> Result<Split, PreprocessError> {
        let mut split = Split::default();
        let mut cursor = Cursor {
            stage: initial_stage,
            gate: PlatformGate::Indifferent,
        };

        for (index, raw) in reader.split(b'\n').enumerate() {
            let raw = raw.map_err(|source| {
                let err = PreprocessError::Read {
                    path: path.to_path_buf(),
                    source,
                };
                log::error!(target: LOG_TARGET, "{err}");
                err
            })?;
            let line_number = index + 1;
            let line = decode_line(&raw);

            match classify(&line) {
                LineKind::Blank | LineKind::Comment => {}
                LineKind::Directive(body) => match Directive::parse(body, self.options.matching) {
                    Directive::Include(argument) => {
                        self.include(path, argument, line_number, cursor, &mut split, chain);
                    }
                    Directive::Stage(stage) => cursor.stage = stage,
                    Directive::Gate(gate) => cursor.gate = gate,
                    Directive::Unknown(body) => {
                        log::debug!(
                            target: LOG_TARGET,
                            "ignoring directive \"${body}\"\n\tshader \"{}\":{line_number}",
                            path.display()
                        );
                    }
                },
                LineKind::Content(text) => {
                    if let Some(buffer) = self.writable(&mut split, cursor) {
                        buffer.push_str(text);
                        buffer.push('\n');
                    }
                }
            }
        }

        Ok(split)
    }

    /// Resolve an `$include` and splice the dependency's vertex output into
    /// whichever stage is active in the includer
    fn include(
        &self,
        file: &Path,
        argument: &str,
        line: usize,
        cursor: Cursor,
        split: &mut Split,
        chain: &mut Vec<PathBuf>,
    ) {
        let include = include_path(file, argument);

        let outcome = if argument.is_empty() {
            Err(IncludeFailure::MissingPath)
        } else if self.options.detect_cycles && chain.contains(&chain_key(&include)) {
            Err(IncludeFailure::Cycle)
        } else {
            self.split_file(&include, ShaderStage::Vertex, chain)
                .map_err(|err| IncludeFailure::Unreadable(err.to_string()))
        };

        match outcome {
            Ok(dependency) => {
                split.diagnostics.extend(dependency.diagnostics);
                if let Some(buffer) = self.writable(split, cursor) {
                    splice(buffer, &dependency.vertex);
                }
            }
            Err(reason) => {
                let diagnostic = Diagnostic::IncludeFailed {
                    include,
                    file: file.to_path_buf(),
                    line,
                    reason,
                };
                log::error!(target: LOG_TARGET, "{diagnostic}");
                split.diagnostics.push(diagnostic);
            }
        }
    }

    fn writable<'s>(&self, split: &'s mut Split, cursor: Cursor) -> Option<&'s mut String> {
        if can_write(cursor.stage, cursor.gate, self.options.target) {
            split.buffer_mut(cursor.stage)
        } else {
            None
        }
    }
}

/// Dependency path: the including file's directory concatenated with the
/// argument
///
/// No `..` normalisation or symlink resolution happens here, and a leading
/// separator in the argument does not escape the directory.
pub fn include_path(file: &Path, argument: &str) -> PathBuf {
    let directory = match file.parent() {
        Some(directory) if !directory.as_os_str().is_empty() => directory,
        _ => return PathBuf::from(argument),
    };

    let mut joined = directory.as_os_str().to_os_string();
    if !directory.as_os_str().as_encoded_bytes().ends_with(MAIN_SEPARATOR_STR.as_bytes()) {
        joined.push(MAIN_SEPARATOR_STR);
    }
    joined.push(argument);
    PathBuf::from(joined)
}

/// Identity used for cycle detection; falls back to the literal path
fn chain_key(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// One raw line without its `\n` (and a trailing `\r`, if any)
fn decode_line(raw: &[u8]) -> Cow<'_, str> {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw)
}

/// Append an included block, guaranteeing it ends with a newline
fn splice(buffer: &mut String, block: &str) {
    if block.is_empty() {
        return;
    }
    buffer.push_str(block);
    if !block.ends_with('\n') {
        buffer.push('\n');
    }
}
