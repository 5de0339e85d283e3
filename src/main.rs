use clap::{Parser, Subcommand};
use geogal::imaging::RustBackend;
use geogal::site::{self, BuildConfig};
use geogal::{config, logging, output};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "geogal")]
#[command(about = "Static site generator for geotagged photo galleries")]
#[command(long_about = "\
Static site generator for geotagged photo galleries

Every JPEG or PNG directly under SOURCE that carries a GPS position and a
capture date becomes a page. Other files are skipped and reported.

Source layout:

  photos/
  ├── config.toml        # Site config (optional)
  ├── IMG_0042.jpg       # Geotagged image → IMG_0042.html
  ├── IMG_0042.txt       # Caption sidecar (optional)
  └── harbor.png

Output layout:

  site/
  ├── index.html         # All images, oldest capture first
  ├── images.json        # Page data for map clients
  ├── IMG_0042.html
  └── images/
      ├── IMG_0042.jpg       # Full-size copy
      └── IMG_0042_1024.jpg  # One thumbnail per width below the source width

Metadata resolution (first available wins):
  Caption:   sidecar .txt → IPTC caption → EXIF description → \"no description yet\"
  Headline:  IPTC headline → IPTC object name

Builds are incremental: unchanged sources are not re-encoded and identical
pages are not rewritten. Use --force-resync to rewrite everything.

Run 'geogal gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Log per-tag details (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the site from SOURCE into OUTPUT
    Build {
        /// Directory of source images
        source: PathBuf,
        /// Site output directory
        output: PathBuf,
        /// Rewrite every output, ignoring the last-run marker
        #[arg(long)]
        force_resync: bool,
        /// Thumbnail widths, overriding config.toml (e.g. 1024,320)
        #[arg(long, value_delimiter = ',')]
        widths: Option<Vec<u32>>,
    },
    /// Report which images would be published, without writing anything
    Check {
        /// Directory of source images
        source: PathBuf,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Command::Build {
            source,
            output,
            force_resync,
            widths,
        } => {
            let mut site_config = config::load_config(&source)?;
            if let Some(widths) = widths {
                site_config.images.widths = widths;
                site_config.validate()?;
            }
            let mut build_config = BuildConfig::new(&source, &output, &site_config);
            build_config.force_resync = force_resync;

            println!("==> Building {} → {}", source.display(), output.display());
            let backend = RustBackend::new();
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_build_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = site::build(&build_config, &backend, None, Some(tx));
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;
            let report = result?;

            println!();
            output::print_build_report(&report);
            println!("==> Build complete: {}", output.display());
        }
        Command::Check { source } => {
            let site_config = config::load_config(&source)?;
            let build_config = BuildConfig::new(&source, PathBuf::new(), &site_config);
            println!("==> Checking {}", source.display());
            let state = site::scan_source(&build_config, &RustBackend::new(), None, None)?;
            output::print_check_output(&state);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
