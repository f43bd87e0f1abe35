use clap::{Parser, Subcommand};
use simple_folio::generate::{NavEntry, SiteContext};
use simple_folio::naming::project_slug;
use simple_folio::{config, generate, output, scan};
use std::path::{Path, PathBuf};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "simple-folio")]
#[command(about = "Static site generator for project portfolios")]
#[command(long_about = "\
Static site generator for project portfolios

Projects come from an exported project list; screenshots come from an
exported preview table whose entries may be bare paths, objects or nested
arrays. Every project gets a page with a screenshot carousel, its overview
and its feature list.

Content structure:

  content/
  ├── config.toml      # Site config (optional)
  ├── projects.json    # [{\"id\": 1, \"name\": \"Lumen\", \"overview\": \"...\", \"image\": \"lumen/cover.png\"}]
  ├── previews.json    # [{\"project_id\": 1, \"preview\": [\"lumen/a.png\", {\"file\": \"b.png\", \"desc\": \"...\"}]}]
  ├── about.md         # Body of the home section with id \"about\" (optional)
  └── assets/          # Static assets (favicon, fonts) → copied to output root

Image keys resolve against [storage] base_url and bucket; absolute http(s)
URLs are used as-is.

Run 'simple-folio gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Directory for intermediate files (manifest)
    #[arg(long, default_value = ".simple-folio-temp", global = true)]
    temp_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load projects and previews into a manifest
    Scan,
    /// Produce the final HTML site from the manifest
    Generate,
    /// Run the full pipeline: scan → generate
    Build,
    /// Validate content directory without building
    Check,
    /// Print the HTML for a single project page
    Render {
        /// Project slug, e.g. `tide_tables`
        slug: String,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let manifest_path = cli.temp_dir.join("manifest.json");

    match cli.command {
        Command::Scan => {
            let manifest = run_scan(&cli.source)?;
            std::fs::create_dir_all(&cli.temp_dir)?;
            let json = serde_json::to_string_pretty(&manifest)?;
            std::fs::write(&manifest_path, json)?;
            output::print_scan_output(&manifest, &cli.source);
        }
        Command::Generate => {
            let manifest = generate::generate(&manifest_path, &cli.output, &cli.source)?;
            output::print_generate_output(&manifest);
        }
        Command::Build => {
            std::fs::create_dir_all(&cli.temp_dir)?;

            println!("==> Stage 1: Scanning {}", cli.source.display());
            let manifest = run_scan(&cli.source)?;
            let json = serde_json::to_string_pretty(&manifest)?;
            std::fs::write(&manifest_path, json)?;
            output::print_scan_output(&manifest, &cli.source);

            println!("==> Stage 2: Generating HTML → {}", cli.output.display());
            let manifest = generate::generate(&manifest_path, &cli.output, &cli.source)?;
            output::print_generate_output(&manifest);

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let manifest = run_scan(&cli.source)?;
            output::print_scan_output(&manifest, &cli.source);
            println!("==> Content is valid");
        }
        Command::Render { slug } => {
            let visit = scan::scan_page(&cli.source, &slug)?;
            let nav = visit
                .projects
                .iter()
                .map(|p| NavEntry {
                    title: p.name.clone(),
                    slug: project_slug(&p.name),
                })
                .collect();
            let ctx = SiteContext::new(&visit.config, nav);
            let view = visit.controller.view(visit.controller.ready_at());
            println!("{}", generate::render_view(view, &ctx).into_string());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Scan with fetch progress printed as it arrives.
fn run_scan(source: &Path) -> Result<scan::Manifest, Box<dyn std::error::Error>> {
    let site_config = config::load_config(source)?;
    init_thread_pool(&site_config.processing);

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_fetch_event(&event) {
                println!("{}", line);
            }
        }
    });
    let result = scan::scan_with_config(source, site_config, Some(tx));
    printer
        .join()
        .map_err(|_| "fetch progress printer panicked")?;
    Ok(result?)
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
