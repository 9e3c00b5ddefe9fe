use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use barcode_reader::{
    BarcodeDecoder, BarcodeEvent, BarcodeFormat, BarcodeReader, ImageFormat, MultiFormatDecoder,
    QrDecoder, ReaderConfig,
};
use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    /// rxing, every supported symbology
    Multi,
    /// rqrr, QR codes only
    Qr,
}

/// Scan and decode barcodes from one or more image files
#[derive(Parser)]
#[command(name = "barcode-reader")]
#[command(version)]
#[command(about = "Scan and decode barcodes from one or more image files", long_about = None)]
struct Args {
    /// Only print decoded values
    #[arg(short, long)]
    quiet: bool,

    /// Spend more effort searching each image
    #[arg(long)]
    try_harder: bool,

    /// Also try each image rotated by 90, 180 and 270 degrees
    #[arg(long)]
    auto_rotate: bool,

    /// Fast scan: no extra effort, no rotation
    #[arg(long, conflicts_with_all = ["try_harder", "auto_rotate"])]
    performance: bool,

    /// Accepted barcode format (repeatable, default: all 1D formats)
    #[arg(long = "format", value_name = "FORMAT")]
    formats: Vec<BarcodeFormat>,

    /// Decoder backend
    #[arg(long, value_enum, default_value_t = Backend::Multi)]
    backend: Backend,

    /// Save every image that contained a barcode into this directory
    #[arg(long, value_name = "DIR")]
    save_dir: Option<PathBuf>,

    /// File format used with --save-dir
    #[arg(long, value_name = "FORMAT", default_value_t = ImageFormat::Png)]
    save_format: ImageFormat,

    /// Read settings from this JSON file instead of the user config
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Image files to scan
    #[arg(required = true)]
    images: Vec<PathBuf>,
}

impl Args {
    fn reader_config(&self) -> anyhow::Result<ReaderConfig> {
        let mut config = match &self.config {
            Some(path) => ReaderConfig::load_from(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => ReaderConfig::load(),
        };
        if self.performance {
            config.try_harder = false;
            config.auto_rotate = false;
        }
        config.try_harder |= self.try_harder;
        config.auto_rotate |= self.auto_rotate;
        if !self.formats.is_empty() {
            config.formats = self.formats.clone();
        }
        Ok(config)
    }

    fn decoder(&self) -> Arc<dyn BarcodeDecoder> {
        match self.backend {
            Backend::Multi => Arc::new(MultiFormatDecoder::new()),
            Backend::Qr => Arc::new(QrDecoder::with_max_dim(2048)),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let result = run(&args).await;
    if let Err(err) = &result {
        eprintln!("barcode-reader: {err:#}");
    }
    ExitCode::from(exit_status(&result))
}

/// 0 when every image had a barcode, 1 when some did not, 2 on error
fn exit_status(result: &anyhow::Result<bool>) -> u8 {
    match result {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(_) => 2,
    }
}

/// Hands out file stems for saved images, numbering repeats so inputs
/// such as `a/scan.png` and `b/scan.jpg` do not overwrite each other
#[derive(Default)]
struct SaveNames {
    used: HashSet<OsString>,
}

impl SaveNames {
    fn next(&mut self, path: &Path) -> OsString {
        let stem = path
            .file_stem()
            .map(|s| s.to_os_string())
            .unwrap_or_else(|| "barcode".into());

        let mut name = stem.clone();
        let mut n = 1;
        while self.used.contains(&name) {
            n += 1;
            name = stem.clone();
            name.push(format!("-{n}"));
        }
        self.used.insert(name.clone());
        name
    }
}

/// Returns whether every image contained a barcode
async fn run(args: &Args) -> anyhow::Result<bool> {
    let config = args.reader_config()?;
    log::debug!("Using {:?}", config);
    let reader = BarcodeReader::with_decoder(config, args.decoder());
    let detections = reader.subscribe();

    if let Some(dir) = &args.save_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }

    let mut names = SaveNames::default();
    let mut all_found = true;
    for path in &args.images {
        let image = image::open(path).with_context(|| format!("failed to open {}", path.display()))?;

        if !reader.decode_async(image).await {
            all_found = false;
            if !args.quiet {
                match reader.error() {
                    Some(err) => eprintln!("{}: {}", path.display(), err),
                    None => eprintln!("{}: no barcode found", path.display()),
                }
            }
            continue;
        }

        for event in detections.try_iter() {
            report(args, path, &event, &mut names)?;
        }
    }

    reader.dispose();
    Ok(all_found)
}

fn report(
    args: &Args,
    path: &Path,
    event: &BarcodeEvent,
    names: &mut SaveNames,
) -> anyhow::Result<()> {
    if args.quiet {
        println!("{}", event.value());
    } else {
        println!("{}: {}: {}", path.display(), event.format(), event.value());
    }

    if let Some(dir) = &args.save_dir {
        let name = names.next(path);
        let saved = BarcodeReader::save_image(event.image(), dir.join(name), args.save_format)
            .with_context(|| format!("failed to save {}", path.display()))?;
        log::info!("Saved {}", saved.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["barcode-reader"];
        argv.extend_from_slice(extra);
        argv.push("scan.png");
        Args::try_parse_from(argv).unwrap()
    }

    fn config_file(dir: &Path, config: &ReaderConfig) -> String {
        let path = dir.join("config.json");
        config.save_to(&path).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_exit_status() {
        assert_eq!(exit_status(&Ok(true)), 0);
        assert_eq!(exit_status(&Ok(false)), 1);
        assert_eq!(exit_status(&Err(anyhow::anyhow!("failed to open"))), 2);
    }

    #[test]
    fn test_config_file_is_used_as_is() {
        let dir = tempfile::tempdir().unwrap();
        let stored = ReaderConfig::new(true, false, &[BarcodeFormat::Code128]);
        let path = config_file(dir.path(), &stored);

        let config = args(&["--config", &path]).reader_config().unwrap();
        assert_eq!(config, stored);
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file(
            dir.path(),
            &ReaderConfig::new(true, true, &[BarcodeFormat::Code128]),
        );

        let fast = args(&["--config", &path, "--performance"])
            .reader_config()
            .unwrap();
        assert!(!fast.try_harder);
        assert!(!fast.auto_rotate);
        assert_eq!(fast.formats, vec![BarcodeFormat::Code128]);

        let formats = args(&["--config", &path, "--format", "qr_code", "--format", "ean-13"])
            .reader_config()
            .unwrap();
        assert_eq!(
            formats.formats,
            vec![BarcodeFormat::QrCode, BarcodeFormat::Ean13]
        );
        assert!(formats.try_harder);
    }

    #[test]
    fn test_flags_only_switch_options_on() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file(dir.path(), &ReaderConfig::new(false, true, &[]));

        let config = args(&["--config", &path, "--try-harder"])
            .reader_config()
            .unwrap();
        assert!(config.try_harder);
        assert!(config.auto_rotate);
        assert!(config.formats.is_empty());
    }

    #[test]
    fn test_performance_conflicts_with_effort_flags() {
        assert!(
            Args::try_parse_from(["barcode-reader", "--performance", "--try-harder", "a.png"])
                .is_err()
        );
        assert!(
            Args::try_parse_from(["barcode-reader", "--performance", "--auto-rotate", "a.png"])
                .is_err()
        );
    }

    #[test]
    fn test_bad_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, b"{ nope").unwrap();

        let err = args(&["--config", path.to_str().unwrap()])
            .reader_config()
            .unwrap_err();
        assert!(err.to_string().contains("failed to load config"));
    }

    #[test]
    fn test_save_names_number_repeated_stems() {
        let mut names = SaveNames::default();
        assert_eq!(names.next(Path::new("a/scan.png")), "scan");
        assert_eq!(names.next(Path::new("b/scan.jpg")), "scan-2");
        assert_eq!(names.next(Path::new("scan-2.png")), "scan-2-2");
        assert_eq!(names.next(Path::new("c/scan")), "scan-3");
        assert_eq!(names.next(Path::new("other.gif")), "other");
        assert_eq!(names.next(Path::new("/")), "barcode");
    }
}
