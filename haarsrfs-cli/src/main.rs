use clap::{Parser, Subcommand};
use haarsrfs::io::load_integral_table;
use haarsrfs::{
    read_templates, write_templates, FeatureWriter, SrfsExtractor, SrfsNormalization,
    TemplateGenerator, WindowConfig,
};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Haar wavelet template generator and SRFS extractor")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Enumerate templates for the configured window and write them to `templates_path`.
    Generate {
        /// Path to the JSON configuration file.
        #[arg(short, long, value_name = "FILE", default_value = "config.json")]
        config: PathBuf,
    },
    /// Compute SRFS features for every sample and template.
    Extract {
        /// Path to the JSON configuration file.
        #[arg(short, long, value_name = "FILE", default_value = "config.json")]
        config: PathBuf,
    },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
enum SrfsConfig {
    UnsignedMean { max_intensity: f64 },
    SignedMean { max_intensity: f64 },
}

impl From<SrfsConfig> for SrfsNormalization {
    fn from(value: SrfsConfig) -> Self {
        match value {
            SrfsConfig::UnsignedMean { max_intensity } => {
                SrfsNormalization::UnsignedMean { max_intensity }
            }
            SrfsConfig::SignedMean { max_intensity } => {
                SrfsNormalization::SignedMean { max_intensity }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct WindowConfigJson {
    sample_size: usize,
    min_rect_width: usize,
    min_rect_height: usize,
    dimensions: Vec<usize>,
    srfs: SrfsConfig,
}

impl Default for WindowConfigJson {
    fn default() -> Self {
        let cfg = WindowConfig::default();
        Self {
            sample_size: cfg.sample_size,
            min_rect_width: cfg.min_rect_width,
            min_rect_height: cfg.min_rect_height,
            dimensions: cfg.dimensions,
            srfs: SrfsConfig::UnsignedMean {
                max_intensity: cfg.srfs.max_intensity(),
            },
        }
    }
}

impl From<WindowConfigJson> for WindowConfig {
    fn from(value: WindowConfigJson) -> Self {
        WindowConfig::new(value.sample_size, value.min_rect_width)
            .with_min_rect(value.min_rect_width, value.min_rect_height)
            .with_dimensions(&value.dimensions)
            .with_srfs(value.srfs.into())
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    window: WindowConfigJson,
    parallel: bool,
    templates_path: String,
    samples: Vec<String>,
    /// File with one sample path per line, appended to `samples`.
    sample_list: Option<String>,
    output_dir: String,
    append: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: WindowConfigJson::default(),
            parallel: false,
            templates_path: String::new(),
            samples: Vec::new(),
            sample_list: None,
            output_dir: String::new(),
            append: false,
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateSummary {
    templates: usize,
    candidates: usize,
    duplicates: usize,
    collisions: usize,
    overlaps: usize,
}

#[derive(Debug, Serialize)]
struct ExtractSummary {
    templates: usize,
    samples: usize,
    /// Paths in feature-file line order.
    kept: Vec<String>,
    /// Paths smaller than the detector window.
    skipped: Vec<String>,
    /// Paths that could not be decoded.
    unreadable: Vec<String>,
}

/// Maps extractor sample indices back to input paths.
///
/// `loaded[i]` is the input index of the `i`-th decoded table, and `kept`
/// lists the table indices that were evaluated, in order. Returns the kept
/// and skipped paths, both in input order.
fn resolve_samples(
    paths: &[String],
    loaded: &[usize],
    kept: &[usize],
) -> (Vec<String>, Vec<String>) {
    let mut kept_paths = Vec::with_capacity(kept.len());
    let mut skipped_paths = Vec::new();
    let mut next = kept.iter().peekable();
    for (table_idx, &input_idx) in loaded.iter().enumerate() {
        let Some(path) = paths.get(input_idx) else {
            continue;
        };
        if next.peek() == Some(&&table_idx) {
            next.next();
            kept_paths.push(path.clone());
        } else {
            skipped_paths.push(path.clone());
        }
    }
    (kept_paths, skipped_paths)
}

fn open_output(path: &Path, append: bool) -> std::io::Result<File> {
    OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)
}

fn load_config(path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)?;
    let config: Config = serde_json::from_str(&text)?;
    if config.templates_path.is_empty() {
        return Err("templates_path must be set in the config".into());
    }
    Ok(config)
}

fn run_generate(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let window = WindowConfig::from(config.window);
    let generator = TemplateGenerator::new(&window)?.with_parallel(config.parallel);
    let (templates, stats) = generator.generate_with_stats()?;

    let file = BufWriter::new(File::create(&config.templates_path)?);
    write_templates(file, &templates)?;

    let summary = GenerateSummary {
        templates: stats.templates,
        candidates: stats.sweep.candidates,
        duplicates: stats.duplicates,
        collisions: stats.collisions,
        overlaps: stats.sweep.overlaps,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn sample_paths(config: &Config) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let mut paths = config.samples.clone();
    if let Some(list) = &config.sample_list {
        let reader = BufReader::new(File::open(list)?);
        for line in reader.lines() {
            let line = line?;
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                paths.push(trimmed.to_string());
            }
        }
    }
    Ok(paths)
}

fn run_extract(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    if config.output_dir.is_empty() {
        return Err("output_dir must be set in the config".into());
    }
    let templates = read_templates(BufReader::new(File::open(&config.templates_path)?))?;
    let paths = sample_paths(&config)?;
    let window = WindowConfig::from(config.window);
    window.validate()?;

    let mut tables = Vec::with_capacity(paths.len());
    let mut loaded = Vec::with_capacity(paths.len());
    let mut unreadable = Vec::new();
    for (idx, path) in paths.iter().enumerate() {
        match load_integral_table(path) {
            Ok(table) => {
                tables.push(table);
                loaded.push(idx);
            }
            Err(err) => {
                tracing::warn!(path = path.as_str(), error = %err, "sample_unreadable");
                unreadable.push(path.clone());
            }
        }
    }

    let extractor = SrfsExtractor::new(&templates, &window)?.with_parallel(config.parallel);
    let report = extractor.extract(&tables);
    let (kept, skipped) = resolve_samples(&paths, &loaded, &report.kept);
    for path in &skipped {
        tracing::warn!(path = path.as_str(), "sample_too_small");
    }

    let output_dir = PathBuf::from(&config.output_dir);
    fs::create_dir_all(&output_dir)?;
    for (index, rows) in report.features.iter().enumerate() {
        let file = open_output(&output_dir.join(format!("{index}.txt")), config.append)?;
        let mut writer = FeatureWriter::new(BufWriter::new(file));
        writer.write_rows(rows)?;
        writer.into_inner()?;
    }
    // Line n of every feature file belongs to line n of samples.txt.
    let listing = open_output(&output_dir.join("samples.txt"), config.append)?;
    let mut listing = BufWriter::new(listing);
    for path in &kept {
        writeln!(listing, "{path}")?;
    }
    listing.flush()?;

    let summary = ExtractSummary {
        templates: templates.len(),
        samples: paths.len(),
        kept,
        skipped,
        unreadable,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env()
                    .add_directive("haarsrfs=info".parse()?)
                    .add_directive("haarsrfs_cli=info".parse()?),
            )
            .with_target(false)
            .init();
    }

    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    match cli.command {
        Some(Command::Generate { config }) => run_generate(load_config(&config)?),
        Some(Command::Extract { config }) => run_extract(load_config(&config)?),
        None => Err("expected a subcommand: generate or extract".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::resolve_samples;

    fn paths(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn resolve_samples_skips_unreadable_and_small_inputs() {
        let inputs = paths(&["a.png", "broken.png", "b.png", "tiny.png", "c.png"]);
        // "broken.png" failed to decode; tables hold inputs 0, 2, 3, 4.
        let loaded = [0, 2, 3, 4];
        // Table 2 ("tiny.png") was skipped by the extractor.
        let kept = [0, 1, 3];
        let (kept_paths, skipped) = resolve_samples(&inputs, &loaded, &kept);
        assert_eq!(kept_paths, paths(&["a.png", "b.png", "c.png"]));
        assert_eq!(skipped, paths(&["tiny.png"]));
    }

    #[test]
    fn resolve_samples_keeps_everything_when_nothing_fails() {
        let inputs = paths(&["a.png", "b.png"]);
        let (kept_paths, skipped) = resolve_samples(&inputs, &[0, 1], &[0, 1]);
        assert_eq!(kept_paths, inputs);
        assert!(skipped.is_empty());
    }
}
