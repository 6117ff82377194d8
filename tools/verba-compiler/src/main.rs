use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use clap::{Parser, ValueEnum};
use rkyv::ser::{serializers::AllocSerializer, Serializer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use verba_decoder::{Decoded, Decoder};
use verba_protocol::IndexSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Rkyv,
}

#[derive(Parser)]
#[command(author, version, about = "Decodes a Latin lexicon dump into an inflection index")]
struct Cli {
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Worker threads; 0 streams the file on the current thread
    #[arg(short, long, default_value_t = 0)]
    jobs: usize,

    /// Print the decoded analyses of a headword after compiling
    #[arg(long, value_name = "HEADWORD")]
    lookup: Vec<String>,

    /// Repeat for more detail (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn default_log_filter(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "error",
            (false, 0) => "info",
            (false, 1) => "debug",
            _ => "trace",
        }
    }
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn decode_input(path: &Path, jobs: usize) -> anyhow::Result<Decoded> {
    if jobs == 0 {
        let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        return Decoder::new()
            .decode(BufReader::new(file))
            .with_context(|| format!("failed to decode {}", path.display()));
    }

    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let text = String::from_utf8_lossy(&bytes);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .context("failed to start worker pool")?;
    Ok(pool.install(|| Decoder::new().decode_parallel(&text)))
}

fn encode_snapshot(snapshot: &IndexSnapshot, format: Format, pretty: bool) -> anyhow::Result<Vec<u8>> {
    match format {
        Format::Json if pretty => Ok(serde_json::to_vec_pretty(snapshot)?),
        Format::Json => Ok(serde_json::to_vec(snapshot)?),
        Format::Rkyv => {
            let mut serializer = AllocSerializer::<256>::default();
            serializer
                .serialize_value(snapshot)
                .map_err(|e| anyhow!("failed to archive index: {}", e))?;
            Ok(serializer.into_serializer().into_inner().to_vec())
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.default_log_filter());

    info!(input = %cli.input.display(), jobs = cli.jobs, "reading lexicon");
    let decoded = decode_input(&cli.input, cli.jobs)?;

    for headword in &cli.lookup {
        match decoded.index.get(headword) {
            Some(records) => {
                for record in records {
                    println!("{}\t{}\t{:?}", headword, record, record.flags());
                }
            }
            None => println!("{}\t(no verb analyses)", headword),
        }
    }

    let headwords = decoded.index.len();
    let snapshot = IndexSnapshot::from(decoded.index);
    let bytes = encode_snapshot(&snapshot, cli.format, cli.pretty)?;

    fs::write(&cli.output, bytes)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;

    info!(output = %cli.output.display(), headwords, format = ?cli.format, "index written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rkyv::{check_archived_root, AlignedVec, Deserialize, Infallible};

    const LEXICON: &str = "amo\t{1 2 3\tto love\tpres ind act 1st sg}{1 2 3\tto love\tpres part act masc nom}";

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_json_export() {
        let snapshot = IndexSnapshot::from(verba_decoder::decode_str(LEXICON));
        let bytes = encode_snapshot(&snapshot, Format::Json, false).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        let records = &json["entries"][0]["records"];
        assert_eq!(json["entries"][0]["headword"], "amo");
        assert_eq!(records[0]["kind"], "finite_verb");
        assert_eq!(records[0]["person"], "1st");
        assert_eq!(records[1]["kind"], "participle");
        assert_eq!(records[1]["number"], "sg");

        let restored: IndexSnapshot = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(restored, snapshot);
    }

    #[test]
    fn test_rkyv_export_validates() {
        let snapshot = IndexSnapshot::from(verba_decoder::decode_str(LEXICON));
        let bytes = encode_snapshot(&snapshot, Format::Rkyv, false).unwrap();
        // Archives are read from an aligned buffer, as when loading from disk
        let mut aligned = AlignedVec::new();
        aligned.extend_from_slice(&bytes);

        let archived = check_archived_root::<IndexSnapshot>(&aligned).expect("Archive failed validation");
        let restored: IndexSnapshot = archived.deserialize(&mut Infallible).unwrap();
        assert_eq!(restored, snapshot);
    }

    #[test]
    fn test_log_filter_from_flags() {
        let cli = Cli::parse_from(["verba-compiler", "-i", "in.txt", "-o", "out.json", "-vv"]);
        assert_eq!(cli.default_log_filter(), "trace");
        let cli = Cli::parse_from(["verba-compiler", "-i", "in.txt", "-o", "out.json", "-q", "-v"]);
        assert_eq!(cli.default_log_filter(), "error");
    }
}
