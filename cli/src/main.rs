//! mdesigner CLI - markdown export tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use mdesigner::{
    open_file, AppState, Designer, Document, DraftHost, ExportResult, FileStore, GlyphFont,
    PageGeometry, PdfOptions, Preview, SidebarState, Theme,
};

#[derive(Parser)]
#[command(name = "mdesigner")]
#[command(version)]
#[command(about = "Export markdown to paginated PDF, standalone HTML, and Markdown", long_about = None)]
struct Cli {
    /// Input markdown file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Export to all formats (PDF, HTML, Markdown)
    Convert {
        /// Input markdown file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        #[command(flatten)]
        meta: MetaArgs,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Export to a paginated PDF
    Pdf {
        /// Input markdown file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (named after the title if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        meta: MetaArgs,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Export to a standalone HTML file
    Html {
        /// Input markdown file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (named after the title if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        meta: MetaArgs,
    },

    /// Export to Markdown with front matter
    #[command(alias = "md")]
    Markdown {
        /// Input markdown file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        meta: MetaArgs,
    },

    /// Render the preview HTML fragment
    Preview {
        /// Input markdown file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show document information
    Info {
        /// Input markdown file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Inspect or change the saved editor session
    Session {
        /// Session directory
        #[arg(long, value_name = "DIR", env = "MDESIGNER_STORE", default_value = ".mdesigner")]
        store: PathBuf,

        #[command(subcommand)]
        action: SessionAction,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum SessionAction {
    /// Show the saved document, theme, and sidebar state
    Show,

    /// Replace the saved document with a markdown file
    Import {
        /// Input markdown file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Export the saved document to all formats
    Export {
        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Set the editor theme
    Theme {
        /// Theme name
        #[arg(value_enum)]
        theme: ThemeArg,
    },

    /// Set the sidebar state
    Sidebar {
        /// Sidebar state
        #[arg(value_enum)]
        state: SidebarArg,
    },

    /// Delete the saved session
    Reset,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum ThemeArg {
    /// Clean light theme
    Minimalist,
    /// Neon dark theme
    Cyberpunk,
    /// Grid-based typographic theme
    Swiss,
}

impl From<ThemeArg> for Theme {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Minimalist => Theme::Minimalist,
            ThemeArg::Cyberpunk => Theme::Cyberpunk,
            ThemeArg::Swiss => Theme::Swiss,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum SidebarArg {
    /// Show the sidebar
    Open,
    /// Collapse the sidebar
    Closed,
}

impl From<SidebarArg> for SidebarState {
    fn from(arg: SidebarArg) -> Self {
        match arg {
            SidebarArg::Open => SidebarState::Open,
            SidebarArg::Closed => SidebarState::Closed,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum PaperSize {
    /// 210 x 297 mm
    A4,
    /// 8.5 x 11 in
    Letter,
}

/// Metadata overrides applied on top of the file's front matter.
#[derive(Args, Clone, Default)]
struct MetaArgs {
    /// Document title
    #[arg(long)]
    title: Option<String>,

    /// Document author
    #[arg(long)]
    author: Option<String>,

    /// Document date (YYYY-MM-DD)
    #[arg(long)]
    date: Option<String>,

    /// Leave the title out of the export
    #[arg(long)]
    no_title: bool,

    /// Leave the author out of the export
    #[arg(long)]
    no_author: bool,

    /// Leave the date out of the export
    #[arg(long)]
    no_date: bool,
}

impl MetaArgs {
    fn apply(&self, mut doc: Document) -> Document {
        let meta = &mut doc.metadata;
        if let Some(ref title) = self.title {
            meta.title = title.clone();
        }
        if let Some(ref author) = self.author {
            meta.author = author.clone();
        }
        if let Some(ref date) = self.date {
            meta.date = date.clone();
        }
        meta.include_title &= !self.no_title;
        meta.include_author &= !self.no_author;
        meta.include_date &= !self.no_date;
        doc
    }
}

/// Page layout options for PDF output.
#[derive(Args, Clone)]
struct PageArgs {
    /// Paper size
    #[arg(long, value_enum, default_value = "a4")]
    paper: PaperSize,

    /// Page margin in millimetres
    #[arg(long, default_value = "15")]
    margin: f64,

    /// TrueType font for PDF text (default: a system font)
    #[arg(long, value_name = "PATH", env = "MDESIGNER_FONT")]
    font: Option<PathBuf>,
}

impl PageArgs {
    fn geometry(&self) -> PageGeometry {
        let paper = match self.paper {
            PaperSize::A4 => PageGeometry::a4(),
            PaperSize::Letter => PageGeometry::letter(),
        };
        paper.with_margin(self.margin)
    }

    fn designer(&self) -> Designer {
        Designer::new().with_pdf_options(PdfOptions::new().with_geometry(self.geometry()))
    }

    fn host(&self) -> mdesigner::Result<DraftHost> {
        Ok(match &self.font {
            Some(path) => DraftHost::new().with_font(GlyphFont::from_file(path)?),
            None => DraftHost::new().with_system_font(),
        })
    }

    /// Layout host for PDF output; warns when pages will carry no glyphs.
    fn pdf_host(&self) -> mdesigner::Result<DraftHost> {
        let host = self.host()?;
        if !host.has_glyphs() {
            eprintln!(
                "{}: no usable font found, PDF text will be drawn as placeholder bars. \
                 Pass --font <PATH> or set MDESIGNER_FONT.",
                "Warning".yellow().bold()
            );
        }
        Ok(host)
    }
}

impl Default for PageArgs {
    fn default() -> Self {
        Self {
            paper: PaperSize::A4,
            margin: 15.0,
            font: std::env::var_os("MDESIGNER_FONT").map(PathBuf::from),
        }
    }
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Convert {
            input,
            output,
            meta,
            page,
        }) => cmd_convert(&input, output.as_deref(), &meta, &page),
        Some(Commands::Pdf {
            input,
            output,
            meta,
            page,
        }) => cmd_pdf(&input, output.as_deref(), &meta, &page),
        Some(Commands::Html {
            input,
            output,
            meta,
        }) => cmd_html(&input, output.as_deref(), &meta),
        Some(Commands::Markdown {
            input,
            output,
            meta,
        }) => cmd_markdown(&input, output.as_deref(), &meta),
        Some(Commands::Preview { input, output }) => cmd_preview(&input, output.as_deref()),
        Some(Commands::Info { input, page }) => cmd_info(&input, &page),
        Some(Commands::Session { store, action }) => cmd_session(&store, action),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: convert if input is provided
            if let Some(input) = cli.input {
                cmd_convert(
                    &input,
                    cli.output.as_deref(),
                    &MetaArgs::default(),
                    &PageArgs::default(),
                )
            } else {
                println!("{}", "Usage: mdesigner <FILE> [OUTPUT]".yellow());
                println!("       mdesigner --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
}

fn load(input: &Path, meta: &MetaArgs) -> mdesigner::Result<Document> {
    Ok(meta.apply(open_file(input)?))
}

/// Write `result` to `output`, or into the current directory under its
/// suggested name.
fn save(result: &ExportResult, output: Option<&Path>) -> CliResult {
    let path = match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, &result.bytes)?;
            path.to_path_buf()
        }
        None => result.write_to(Path::new("."))?,
    };
    println!("{} {}", "Saved to".green(), path.display());
    Ok(())
}

fn export_all(doc: &Document, page: &PageArgs, output_dir: &Path) -> CliResult {
    let designer = page.designer();
    let host = page.pdf_host()?;
    fs::create_dir_all(output_dir)?;

    let pb = ProgressBar::new(3);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")?
            .progress_chars("#>-"),
    );

    pb.set_message("Rendering PDF...");
    let pdf = runtime()?.block_on(designer.export_pdf(doc, &host))?;
    pdf.write_to(output_dir)?;
    pb.inc(1);

    pb.set_message("Generating HTML...");
    let html = designer.export_html(doc)?;
    html.write_to(output_dir)?;
    pb.inc(1);

    pb.set_message("Generating Markdown...");
    let md = designer.export_markdown(doc)?;
    md.write_to(output_dir)?;
    pb.inc(1);

    pb.finish_with_message("Done!");

    println!("\n{}", "Output files:".green().bold());
    println!(
        "  {} {} ({} pages)",
        "├─".dimmed(),
        pdf.filename,
        pdf.page_count.unwrap_or(1)
    );
    println!("  {} {}", "├─".dimmed(), html.filename);
    println!("  {} {}", "└─".dimmed(), md.filename);

    Ok(())
}

fn cmd_convert(input: &Path, output: Option<&Path>, meta: &MetaArgs, page: &PageArgs) -> CliResult {
    let doc = load(input, meta)?;
    let output_dir = output.map(|p| p.to_path_buf()).unwrap_or_else(|| {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        PathBuf::from(format!("{}_output", stem))
    });
    export_all(&doc, page, &output_dir)
}

fn cmd_pdf(input: &Path, output: Option<&Path>, meta: &MetaArgs, page: &PageArgs) -> CliResult {
    let doc = load(input, meta)?;
    let designer = page.designer();
    let host = page.pdf_host()?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_message("Rendering pages...");
    let result = runtime()?.block_on(designer.export_pdf(&doc, &host));
    spinner.finish_and_clear();

    let result = result?;
    save(&result, output)?;
    println!(
        "{}: {}",
        "Pages".bold(),
        result.page_count.unwrap_or(1)
    );
    Ok(())
}

fn cmd_html(input: &Path, output: Option<&Path>, meta: &MetaArgs) -> CliResult {
    let doc = load(input, meta)?;
    let result = Designer::new().export_html(&doc)?;
    save(&result, output)
}

fn cmd_markdown(input: &Path, output: Option<&Path>, meta: &MetaArgs) -> CliResult {
    let doc = load(input, meta)?;
    let result = Designer::new().export_markdown(&doc)?;

    if let Some(path) = output {
        save(&result, Some(path))
    } else {
        print!("{}", result.as_text().unwrap_or_default());
        Ok(())
    }
}

fn cmd_preview(input: &Path, output: Option<&Path>) -> CliResult {
    let doc = open_file(input)?;
    let preview = Designer::new().preview(&doc);
    if let Preview::Failed(ref message) = preview {
        log::warn!("Preview failed: {}", message);
    }

    if let Some(path) = output {
        fs::write(path, preview.to_html())?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", preview.to_html());
    }
    Ok(())
}

fn cmd_info(input: &Path, page: &PageArgs) -> CliResult {
    let doc = open_file(input)?;
    print_document(&doc);

    let geometry = page.geometry();
    let plan = runtime()?.block_on(page.designer().plan(&doc, &page.host()?))?;

    println!();
    println!("{}", "PDF Layout".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!(
        "{}: {} x {} mm, {} mm margin",
        "Page".bold(),
        geometry.page_width,
        geometry.page_height,
        geometry.margin
    );
    println!("{}: {}", "Pages".bold(), plan.physical_pages());
    println!("{}: {:.3}", "Scale".bold(), plan.scale);

    Ok(())
}

fn print_document(doc: &Document) {
    let meta = &doc.metadata;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Title".bold(), meta.included_title().unwrap_or("-"));
    println!("{}: {}", "Author".bold(), meta.included_author().unwrap_or("-"));
    println!(
        "{}: {}",
        "Date".bold(),
        meta.display_date().unwrap_or_else(|| "-".to_string())
    );

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let stats = doc.stats();
    println!("{}: {}", "Words".bold(), stats.words);
    println!("{}: {}", "Characters".bold(), stats.chars);
    println!("{}: {}", "Lines".bold(), doc.markdown.lines().count());
}

fn cmd_session(dir: &Path, action: SessionAction) -> CliResult {
    let mut store = FileStore::new(dir);
    let mut state = AppState::load(&store)?;

    match action {
        SessionAction::Show => {
            println!("{}: {}", "Store".bold(), store.dir().display());
            println!("{}: {}", "Theme".bold(), state.theme);
            println!("{}: {}", "Sidebar".bold(), state.sidebar.as_str());
            println!();
            print_document(&state.document);
        }
        SessionAction::Import { input } => {
            state.document = open_file(&input)?;
            state.save(&mut store)?;
            println!(
                "{} {} ({})",
                "Imported".green(),
                input.display(),
                state.document.stats()
            );
        }
        SessionAction::Export { output, page } => {
            let output_dir = output.unwrap_or_else(|| PathBuf::from("."));
            export_all(&state.document, &page, &output_dir)?;
        }
        SessionAction::Theme { theme } => {
            state.set_theme(theme.into(), &mut store)?;
            println!("{} {}", "Theme changed to".green(), state.theme);
        }
        SessionAction::Sidebar { state: sidebar } => {
            state.set_sidebar(sidebar.into(), &mut store)?;
            println!("{} {}", "Sidebar".green(), state.sidebar.as_str());
        }
        SessionAction::Reset => {
            use mdesigner::Store;
            for key in [
                mdesigner::session::CONTENT_KEY,
                mdesigner::session::METADATA_KEY,
                mdesigner::session::THEME_KEY,
                mdesigner::session::SIDEBAR_KEY,
            ] {
                store.remove(key)?;
            }
            println!("{}", "Session cleared".green());
        }
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "mdesigner".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Markdown export tool: PDF, HTML, and Markdown");
    println!();
    println!("License: MIT");
}
