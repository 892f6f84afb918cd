mod logger;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use logger::StderrLogger;
use pdf_nup::{
    BookletMode, BorderType, IntervalSet, Position, PrintScaling, ProcessingParameters, Rotation,
    mm_to_pt,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Parser)]
#[command(name = "pdfnup", about = "N-up, booklet and page layout for PDF printing", version)]
struct Cli {
    /// More log output (repeat for debug and trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Impose the pages of a PDF onto output pages
    Impose(ImposeArgs),

    /// Write the default parameters as JSON
    InitConfig {
        /// Output JSON file
        path: PathBuf,
    },
}

#[derive(Args)]
struct ImposeArgs {
    /// Input PDF file
    #[arg(short, long)]
    input: PathBuf,

    /// Output PDF file
    #[arg(short, long, required_unless_present = "stats_only")]
    output: Option<PathBuf>,

    /// Start from parameters in a JSON file; other options override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output pages to print, e.g. `1-4,7,9-`
    #[arg(long)]
    pages: Option<String>,

    /// Input pages to use, e.g. `2-`
    #[arg(long)]
    input_pages: Option<String>,

    /// Print only even output pages
    #[arg(long, conflicts_with = "odd")]
    even: bool,

    /// Print only odd output pages
    #[arg(long)]
    odd: bool,

    /// Pages per output page
    #[arg(short = 'n', long)]
    number_up: Option<usize>,

    /// Fill order of the N-up grid, e.g. `lrtb` or `btrl`
    #[arg(long)]
    number_up_layout: Option<String>,

    /// Booklet mode
    #[arg(long, value_enum)]
    booklet: Option<BookletArg>,

    /// Pages per booklet signature (multiple of 4)
    #[arg(long)]
    signature: Option<usize>,

    /// Output orientation in degrees counter-clockwise
    #[arg(long, value_parser = parse_rotation)]
    orientation: Option<Rotation>,

    /// Output paper size; without it output pages follow the input pages
    #[arg(long, value_enum)]
    paper: Option<PaperArg>,

    /// Unprintable margin around the paper in mm
    #[arg(long, default_value = "0")]
    margin: f32,

    /// Print scaling
    #[arg(long, value_enum)]
    scaling: Option<ScalingArg>,

    /// Always scale to fit the printable area
    #[arg(long)]
    fidelity: bool,

    /// Flip output pages horizontally
    #[arg(long)]
    mirror: bool,

    /// Border around each placed page
    #[arg(long, value_enum)]
    border: Option<BorderArg>,

    /// Label printed at the top and bottom of each page
    #[arg(long)]
    page_label: Option<String>,

    /// Horizontal position of pages that do not fill their cell
    #[arg(long, value_enum)]
    position_x: Option<XPositionArg>,

    /// Vertical position of pages that do not fill their cell
    #[arg(long, value_enum)]
    position_y: Option<YPositionArg>,

    /// Number of copies
    #[arg(short, long)]
    copies: Option<u32>,

    /// Print copies as whole documents
    #[arg(long)]
    collate: bool,

    /// Output pages in reverse order
    #[arg(long)]
    reverse: bool,

    /// Pad every copy to an even number of pages
    #[arg(long)]
    even_duplex: bool,

    /// Turn pages to match the paper orientation
    #[arg(long)]
    auto_rotate: bool,

    /// Log a `PAGE:` line for every output page
    #[arg(long)]
    page_log: bool,

    /// Show statistics only, don't generate PDF
    #[arg(long)]
    stats_only: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum BookletArg {
    Off,
    On,
    ShuffleOnly,
}

#[derive(Clone, Copy, ValueEnum)]
enum PaperArg {
    A3,
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
}

#[derive(Clone, Copy, ValueEnum)]
enum ScalingArg {
    Auto,
    AutoFit,
    Fit,
    Fill,
    None,
}

#[derive(Clone, Copy, ValueEnum)]
enum BorderArg {
    None,
    Single,
    SingleThick,
    Double,
    DoubleThick,
}

#[derive(Clone, Copy, ValueEnum)]
enum XPositionArg {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, ValueEnum)]
enum YPositionArg {
    Bottom,
    Center,
    Top,
}

impl PaperArg {
    fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PaperArg::A3 => (297.0, 420.0),
            PaperArg::A4 => (210.0, 297.0),
            PaperArg::A5 => (148.0, 210.0),
            PaperArg::Letter => (215.9, 279.4),
            PaperArg::Legal => (215.9, 355.6),
            PaperArg::Tabloid => (279.4, 431.8),
        }
    }
}

impl From<BookletArg> for BookletMode {
    fn from(arg: BookletArg) -> Self {
        match arg {
            BookletArg::Off => Self::Off,
            BookletArg::On => Self::On,
            BookletArg::ShuffleOnly => Self::ShuffleOnly,
        }
    }
}

impl From<ScalingArg> for PrintScaling {
    fn from(arg: ScalingArg) -> Self {
        match arg {
            ScalingArg::Auto => Self::Auto,
            ScalingArg::AutoFit => Self::AutoFit,
            ScalingArg::Fit => Self::Fit,
            ScalingArg::Fill => Self::Fill,
            ScalingArg::None => Self::None,
        }
    }
}

impl From<BorderArg> for BorderType {
    fn from(arg: BorderArg) -> Self {
        match arg {
            BorderArg::None => Self::None,
            BorderArg::Single => Self::OneThin,
            BorderArg::SingleThick => Self::OneThick,
            BorderArg::Double => Self::TwoThin,
            BorderArg::DoubleThick => Self::TwoThick,
        }
    }
}

impl From<XPositionArg> for Position {
    fn from(arg: XPositionArg) -> Self {
        match arg {
            XPositionArg::Left => Position::LEFT,
            XPositionArg::Center => Position::Center,
            XPositionArg::Right => Position::RIGHT,
        }
    }
}

impl From<YPositionArg> for Position {
    fn from(arg: YPositionArg) -> Self {
        match arg {
            YPositionArg::Bottom => Position::BOTTOM,
            YPositionArg::Center => Position::Center,
            YPositionArg::Top => Position::TOP,
        }
    }
}

fn parse_rotation(value: &str) -> std::result::Result<Rotation, String> {
    let degrees: i32 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number of degrees", value))?;
    match degrees {
        0 | 90 | 180 | 270 => Rotation::from_degrees(degrees)
            .ok_or_else(|| format!("invalid orientation {}", degrees)),
        _ => Err(format!("orientation must be 0, 90, 180 or 270, got {}", degrees)),
    }
}

impl ImposeArgs {
    /// Parameters from the config file (or defaults) with the command line on top
    async fn parameters(&self) -> Result<ProcessingParameters> {
        let mut params = match &self.config {
            Some(path) => ProcessingParameters::load(path)
                .await
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => ProcessingParameters::default(),
        };

        if let Some(pages) = &self.pages {
            params.page_ranges = IntervalSet::parse_ranges(pages)?;
        }
        if let Some(pages) = &self.input_pages {
            params.input_page_ranges = IntervalSet::parse_ranges(pages)?;
        }
        if self.even {
            params.odd_pages = false;
        }
        if self.odd {
            params.even_pages = false;
        }

        if let Some(nup) = self.number_up {
            params.nup.apply_preset(nup)?;
        }
        if let Some(layout) = &self.number_up_layout {
            params.nup.parse_layout(layout)?;
        }
        if let Some(booklet) = self.booklet {
            params.booklet = booklet.into();
        }
        if self.signature.is_some() {
            params.book_signature = self.signature;
        }

        if let Some(orientation) = self.orientation {
            params.orientation = orientation;
        }
        if let Some(paper) = self.paper {
            let (width, height) = paper.dimensions_mm();
            params.set_page_size(mm_to_pt(width), mm_to_pt(height), mm_to_pt(self.margin));
        }
        if let Some(scaling) = self.scaling {
            params.set_print_scaling(scaling.into());
        }
        params.fidelity |= self.fidelity;
        params.mirror |= self.mirror;

        if let Some(border) = self.border {
            params.border = border.into();
        }
        if self.page_label.is_some() {
            params.page_label = self.page_label.clone();
        }
        if let Some(x) = self.position_x {
            params.xpos = x.into();
        }
        if let Some(y) = self.position_y {
            params.ypos = y.into();
        }

        if let Some(copies) = self.copies {
            params.num_copies = copies;
        }
        params.collate |= self.collate;
        params.reverse |= self.reverse;
        params.even_duplex |= self.even_duplex;
        params.auto_rotate |= self.auto_rotate;
        params.page_logging |= self.page_log;

        params.validate()?;
        Ok(params)
    }
}

async fn run_impose(args: ImposeArgs) -> Result<()> {
    let params = args.parameters().await?;

    let document = pdf_nup::load_pdf(&args.input)
        .await
        .with_context(|| format!("Failed to load {}", args.input.display()))?;

    // Calculate and show statistics
    let stats = pdf_nup::calculate_statistics(document.get_pages().len(), &params)?;
    println!("Imposition Statistics:");
    println!("  Source pages: {}", stats.source_pages);
    println!("  Selected pages: {}", stats.selected_pages);
    println!("  Pages per sheet: {}", stats.pages_per_sheet);
    if let Some(sigs) = stats.signatures {
        println!("  Signatures: {}", sigs);
    }
    println!("  Output pages: {}", stats.output_pages);
    println!("  Blank pages added: {}", stats.blank_pages_added);
    println!("  Total with copies: {}", stats.total_output_pages);

    if args.stats_only {
        return Ok(());
    }
    let Some(output) = args.output else {
        anyhow::bail!("No output file given");
    };

    let cancel = Arc::new(AtomicBool::new(false));
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, stopping after the current page");
            on_signal.store(true, Ordering::Relaxed);
        }
    });

    let imposed = pdf_nup::impose_with_cancel(&document, &params, cancel).await?;
    pdf_nup::save_pdf(imposed, &output)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Imposed → {}", output.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut level = StderrLogger::level_for(cli.verbose, cli.quiet);
    if let Commands::Impose(args) = &cli.command {
        if args.page_log && level < LevelFilter::Info {
            level = LevelFilter::Info;
        }
    }
    StderrLogger::new(level).init()?;

    match cli.command {
        Commands::Impose(args) => run_impose(args).await?,
        Commands::InitConfig { path } => {
            ProcessingParameters::default().save(&path).await?;
            println!("Default parameters → {}", path.display());
        }
    }

    Ok(())
}
