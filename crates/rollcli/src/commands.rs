use anyhow::{bail, Context, Result};
use rollcodec::{pipeline, GridCodec, MidiExportOptions, Token};
use rollconf::{RollConfig, Scheme};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// The codec chosen for one invocation.
#[derive(Debug, Clone, Copy)]
pub enum Codec {
    Delta,
    Grid(GridCodec),
}

impl Codec {
    /// Resolve scheme and resolution: command-line flags win over config.
    pub fn from_config(
        config: &RollConfig,
        scheme: Option<Scheme>,
        steps_per_bar: Option<u32>,
    ) -> Result<Self> {
        match scheme.unwrap_or(config.codec.scheme) {
            Scheme::Delta => Ok(Codec::Delta),
            Scheme::Grid => {
                let steps = steps_per_bar.unwrap_or(config.codec.steps_per_bar);
                Ok(Codec::Grid(GridCodec::new(steps)?))
            }
        }
    }

    fn encode_midi(&self, bytes: &[u8]) -> rollcodec::Result<Vec<Token>> {
        match self {
            Codec::Delta => pipeline::encode_midi_delta(bytes),
            Codec::Grid(grid) => grid.encode_midi(bytes),
        }
    }

    fn encode_wire(&self, json: &str) -> rollcodec::Result<Vec<Token>> {
        match self {
            Codec::Delta => pipeline::encode_wire_delta(json),
            Codec::Grid(grid) => grid.encode_wire(json),
        }
    }

    fn decode_midi(&self, tokens: &[Token], options: &MidiExportOptions) -> rollcodec::Result<Vec<u8>> {
        match self {
            Codec::Delta => Ok(pipeline::decode_delta_to_midi(tokens, options)),
            Codec::Grid(grid) => grid.decode_to_midi(tokens, options),
        }
    }

    fn decode_wire(&self, tokens: &[Token]) -> rollcodec::Result<String> {
        match self {
            Codec::Delta => pipeline::decode_delta_to_wire(tokens),
            Codec::Grid(grid) => grid.decode_to_wire(tokens),
        }
    }

    fn describe(&self) -> String {
        match self {
            Codec::Delta => format!("delta (vocab {})", rollcodec::VOCAB_SIZE),
            Codec::Grid(grid) => format!(
                "grid {} steps/bar (vocab {})",
                grid.steps_per_bar(),
                grid.vocab_size()
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Midi,
    Wire,
}

fn file_kind(path: &Path) -> Result<FileKind> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("mid") | Some("midi") => Ok(FileKind::Midi),
        Some("json") => Ok(FileKind::Wire),
        _ => bail!(
            "{}: expected a .mid, .midi or .json file",
            path.display()
        ),
    }
}

fn encode_path(codec: &Codec, input: &Path) -> Result<Vec<Token>> {
    let tokens = match file_kind(input)? {
        FileKind::Midi => {
            let bytes = fs::read(input).with_context(|| format!("reading {}", input.display()))?;
            codec.encode_midi(&bytes)?
        }
        FileKind::Wire => {
            let json = fs::read_to_string(input)
                .with_context(|| format!("reading {}", input.display()))?;
            codec.encode_wire(&json)?
        }
    };
    Ok(tokens)
}

pub fn encode(codec: &Codec, input: &Path, output: Option<&Path>) -> Result<()> {
    let tokens = encode_path(codec, input)?;
    info!(
        input = %input.display(),
        tokens = tokens.len(),
        codec = %codec.describe(),
        "encoded"
    );

    let json = serde_json::to_string(&tokens)?;
    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("writing {}", path.display()))?
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn read_tokens(path: &Path) -> Result<Vec<Token>> {
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("{}: expected a JSON array of integers", path.display()))
}

pub fn decode(codec: &Codec, tokens_path: &Path, output: &Path, program: u8) -> Result<()> {
    let tokens = read_tokens(tokens_path)?;

    match file_kind(output)? {
        FileKind::Midi => {
            let options = MidiExportOptions {
                program,
                ..Default::default()
            };
            let bytes = codec.decode_midi(&tokens, &options)?;
            fs::write(output, bytes).with_context(|| format!("writing {}", output.display()))?;
        }
        FileKind::Wire => {
            let json = codec.decode_wire(&tokens)?;
            fs::write(output, json).with_context(|| format!("writing {}", output.display()))?;
        }
    }

    info!(
        tokens = tokens.len(),
        output = %output.display(),
        codec = %codec.describe(),
        "decoded"
    );
    Ok(())
}

/// All `.mid`/`.midi` files under `dir`, in sorted order.
pub fn find_midi_files(dir: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| matches!(file_kind(p), Ok(FileKind::Midi)))
        .collect();
    paths.sort();
    paths
}

/// Tokenize every MIDI file under `midi_dir` into `out_dir`.
///
/// Each `song.mid` becomes `song.mid.<extension>` holding a JSON token
/// array. Files that fail to parse are logged and skipped.
pub fn preprocess(codec: &Codec, midi_dir: &Path, out_dir: &Path, extension: &str) -> Result<()> {
    if !midi_dir.is_dir() {
        bail!("{} is not a directory", midi_dir.display());
    }
    fs::create_dir_all(out_dir).with_context(|| format!("creating {}", out_dir.display()))?;

    let paths = find_midi_files(midi_dir);
    info!(files = paths.len(), codec = %codec.describe(), "preprocessing");

    let mut written = 0usize;
    for path in &paths {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable file");
                continue;
            }
        };
        let tokens = match codec.encode_midi(&bytes) {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping file");
                continue;
            }
        };

        let Some(file_name) = path.file_name() else {
            continue;
        };
        let target = out_dir.join(format!("{}.{}", file_name.to_string_lossy(), extension));
        fs::write(&target, serde_json::to_string(&tokens)?)
            .with_context(|| format!("writing {}", target.display()))?;
        written += 1;
    }

    info!(written, skipped = paths.len() - written, "preprocess complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rollcodec::{write_midi, MidiNote};

    #[test]
    fn file_kind_by_extension() {
        assert_eq!(file_kind(Path::new("a.MID")).unwrap(), FileKind::Midi);
        assert_eq!(file_kind(Path::new("a.midi")).unwrap(), FileKind::Midi);
        assert_eq!(file_kind(Path::new("a.json")).unwrap(), FileKind::Wire);
        assert!(file_kind(Path::new("a.txt")).is_err());
        assert!(file_kind(Path::new("noext")).is_err());
    }

    #[test]
    fn flags_override_config() {
        let config = RollConfig::default();
        assert!(matches!(
            Codec::from_config(&config, None, None).unwrap(),
            Codec::Delta
        ));
        match Codec::from_config(&config, Some(Scheme::Grid), Some(16)).unwrap() {
            Codec::Grid(grid) => assert_eq!(grid.steps_per_bar(), 16),
            Codec::Delta => panic!("expected grid codec"),
        }
        assert!(Codec::from_config(&config, Some(Scheme::Grid), Some(0)).is_err());
    }

    #[test]
    fn preprocess_writes_one_file_per_midi() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let nested = input.path().join("set1");
        fs::create_dir_all(&nested).unwrap();

        let notes = vec![MidiNote::new(60, 0.0, 0.5, 100)];
        let midi = write_midi(&notes, &MidiExportOptions::default());
        fs::write(input.path().join("a.mid"), &midi).unwrap();
        fs::write(nested.join("b.midi"), &midi).unwrap();
        fs::write(input.path().join("broken.mid"), b"junk").unwrap();
        fs::write(input.path().join("notes.txt"), b"ignored").unwrap();

        preprocess(&Codec::Delta, input.path(), output.path(), "tokens.json").unwrap();

        let a = fs::read_to_string(output.path().join("a.mid.tokens.json")).unwrap();
        let tokens: Vec<Token> = serde_json::from_str(&a).unwrap();
        assert_eq!(tokens, pipeline::encode_midi_delta(&midi).unwrap());
        assert!(output.path().join("b.midi.tokens.json").exists());
        assert!(!output.path().join("broken.mid.tokens.json").exists());
    }
}
