mod logger;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use pdf_fieldmap::{
    BatchJob, ColumnSet, DirectorySink, FieldMapping, FilenameSpec, FontLocation, GenerationOptions,
    MappingSet, RasterScale, RunControl, Template, TextAlign, emit_paced, generate_documents,
    to_document,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdft", about = "Stamp spreadsheet rows onto a PDF template", version)]
struct Cli {
    /// Increase log detail (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show template pages and spreadsheet columns
    Inspect {
        /// Template PDF
        #[arg(short, long)]
        template: PathBuf,

        /// Spreadsheet (CSV, xlsx, xls, ods)
        #[arg(short, long)]
        data: Option<PathBuf>,
    },

    /// Convert a point on a rendered page image to document units
    Locate {
        /// Page width in points
        #[arg(long)]
        page_width: f32,

        /// Width in pixels the page was rendered at
        #[arg(long)]
        raster_width: f32,

        #[arg(long)]
        x: f32,

        #[arg(long)]
        y: f32,
    },

    /// Generate one PDF per spreadsheet row
    Generate(GenerateArgs),
}

#[derive(Args)]
struct GenerateArgs {
    /// Template PDF
    #[arg(short, long)]
    template: PathBuf,

    /// Spreadsheet (CSV, xlsx, xls, ods)
    #[arg(short, long)]
    data: PathBuf,

    /// TrueType font file or http(s) URL
    #[arg(short, long)]
    font: String,

    /// Field placement as page:x:y:field (repeatable)
    #[arg(short, long = "map", value_name = "PAGE:X:Y:FIELD")]
    maps: Vec<FieldMapping>,

    /// Column whose value is appended to the filename (repeatable)
    #[arg(long = "filename-field", value_name = "FIELD")]
    filename_fields: Vec<String>,

    /// Filename base; defaults to the spreadsheet's file stem
    #[arg(long)]
    base: Option<String>,

    /// Output directory
    #[arg(short, long)]
    output_dir: PathBuf,

    /// Text size in points
    #[arg(long)]
    font_size: Option<f32>,

    #[arg(long, value_enum)]
    align: Option<AlignArg>,

    /// Baseline distance below the mapped point, in points
    #[arg(long)]
    vertical_offset: Option<f32>,

    /// Delay between written files, in milliseconds
    #[arg(long)]
    pacing_ms: Option<u64>,

    /// Write uncompressed PDFs
    #[arg(long)]
    no_compress: bool,

    /// Generation options as JSON; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Save the effective options as JSON
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// Write the run report as JSON
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum AlignArg {
    Left,
    Center,
}

impl From<AlignArg> for TextAlign {
    fn from(arg: AlignArg) -> Self {
        match arg {
            AlignArg::Left => Self::Left,
            AlignArg::Center => Self::Center,
        }
    }
}

impl GenerateArgs {
    /// Flags that were given replace the corresponding option
    fn apply_overrides(&self, options: &mut GenerationOptions) {
        if let Some(size) = self.font_size {
            options.font_size_pt = size;
        }
        if let Some(align) = self.align {
            options.align = align.into();
        }
        if let Some(offset) = self.vertical_offset {
            options.vertical_offset_pt = offset;
        }
        if let Some(pacing) = self.pacing_ms {
            options.pacing_ms = pacing;
        }
        if self.no_compress {
            options.compress = false;
        }
    }

    /// `source_stem` is the loaded spreadsheet's file stem
    fn filename_spec(&self, source_stem: &str) -> FilenameSpec {
        let base = self
            .base
            .clone()
            .unwrap_or_else(|| source_stem.to_string());
        FilenameSpec::new(base, self.filename_fields.clone())
    }
}

/// Reject mappings naming a column the spreadsheet lacks or a page past the
/// end of the template
fn check_mappings(mappings: &MappingSet, columns: &ColumnSet, page_count: usize) -> Result<()> {
    let mut problems = Vec::new();
    for stale in mappings.stale_against(columns) {
        problems.push(format!(
            "--map #{} uses unknown column \"{}\"",
            stale.index + 1,
            stale.field
        ));
    }
    for (index, mapping) in mappings.iter().enumerate() {
        if mapping.page as usize > page_count {
            problems.push(format!(
                "--map #{} is on page {} but the template has {} pages",
                index + 1,
                mapping.page,
                page_count
            ));
        }
    }

    if problems.is_empty() {
        return Ok(());
    }
    if !columns.is_empty() {
        problems.push(format!("available columns: {}", columns.names().join(", ")));
    }
    anyhow::bail!("Invalid field mappings:\n  {}", problems.join("\n  "))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::CliLogger::new(cli.verbose)
        .init()
        .context("Failed to install logger")?;

    match cli.command {
        Commands::Inspect { template, data } => inspect(template, data).await,
        Commands::Locate {
            page_width,
            raster_width,
            x,
            y,
        } => {
            let scale = RasterScale::fit_width(raster_width, page_width)?;
            let point = to_document(x, y, scale);
            println!("{:.2} {:.2}", point.x, point.y);
            Ok(())
        }
        Commands::Generate(args) => generate(args).await,
    }
}

async fn inspect(template: PathBuf, data: Option<PathBuf>) -> Result<()> {
    let loaded = Template::load(&template)
        .await
        .with_context(|| format!("Failed to load {}", template.display()))?;
    println!("Template: {}", template.display());
    for (i, size) in loaded.page_sizes().iter().enumerate() {
        println!("  Page {}: {:.1} x {:.1} pt", i + 1, size.width, size.height);
    }

    if let Some(data) = data {
        let sheet = pdf_sheet::load_rows(&data)
            .await
            .with_context(|| format!("Failed to load {}", data.display()))?;
        println!("Spreadsheet: {}", data.display());
        println!("  Rows: {}", sheet.row_count());
        println!("  Columns: {}", sheet.columns.names().join(", "));
    }

    Ok(())
}

async fn generate(args: GenerateArgs) -> Result<()> {
    let mut options = match &args.config {
        Some(path) => GenerationOptions::load(path)
            .await
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => GenerationOptions::default(),
    };
    args.apply_overrides(&mut options);
    options.validate()?;

    if let Some(path) = &args.save_config {
        options.save(path).await?;
        log::info!("Saved options to {}", path.display());
    }

    let template = Template::load(&args.template)
        .await
        .with_context(|| format!("Failed to load {}", args.template.display()))?;
    let sheet = pdf_sheet::load_rows(&args.data)
        .await
        .with_context(|| format!("Failed to load {}", args.data.display()))?;
    if sheet.is_empty() {
        anyhow::bail!("{} has no data rows", args.data.display());
    }

    let mappings: MappingSet = args.maps.iter().cloned().collect();
    if mappings.is_empty() {
        log::warn!("No --map given; documents will be unmodified copies of the template");
    }
    check_mappings(&mappings, &sheet.columns, template.page_count())?;
    let filename = args.filename_spec(&sheet.source_stem);
    let font = FontLocation::parse(&args.font)?;

    let (progress_tx, mut progress_rx) = tokio::sync::mpsc::unbounded_channel::<pdf_fieldmap::BatchProgress>();
    let progress_printer = tokio::spawn(async move {
        while let Some(progress) = progress_rx.recv().await {
            eprintln!("[{}/{}] rendered", progress.current, progress.total);
        }
    });

    let control = RunControl {
        cancel: None,
        progress: Some(progress_tx),
    };
    let job = BatchJob {
        template: std::sync::Arc::new(template),
        mappings: &mappings,
        rows: &sheet.rows,
        columns: &sheet.columns,
        filename: &filename,
    };
    let output = generate_documents(job, &font, &options, &control).await?;
    drop(control);
    let _ = progress_printer.await;

    let mut sink = DirectorySink::create(&args.output_dir).await?;
    let saved = emit_paced(output.documents, &mut sink, options.pacing(), None).await?;

    let report = output.report;
    for warning in &report.warnings {
        println!("warning: {}", warning);
    }
    for failure in &report.row_failures {
        println!("error: row {}: {}", failure.row + 1, failure.message);
    }
    println!(
        "Generated {} of {} documents → {}",
        saved,
        report.rows_total,
        sink.dir().display()
    );

    if let Some(path) = &args.report {
        report.save(path).await?;
        println!("Report → {}", path.display());
    }

    if !report.row_failures.is_empty() {
        anyhow::bail!("{} rows failed", report.row_failures.len());
    }
    Ok(())
}
