use std::{
    fs::File,
    io::{BufReader, BufWriter, Cursor, Write},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use chartographer::{CanvasDims, CanvasId, Chartographer, Region, WorkspaceConfig, format::bmp};
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "chartographer", version)]
struct Cli {
    /// Workspace directory holding canvases (falls back to the current directory).
    #[arg(long, global = true)]
    workdir: Option<PathBuf>,

    /// Log at debug level.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a blank canvas and print its id.
    Create(CreateArgs),
    /// Write an image fragment into a canvas.
    Upload(UploadArgs),
    /// Extract a rectangle of a canvas.
    Fetch(FetchArgs),
    /// Delete a canvas.
    Delete(IdArgs),
    /// Print the metadata record of a canvas as JSON.
    Info(IdArgs),
}

#[derive(Args, Debug)]
struct CreateArgs {
    /// Canvas width in pixels.
    #[arg(long)]
    width: u32,

    /// Canvas height in pixels.
    #[arg(long)]
    height: u32,
}

#[derive(Args, Debug)]
struct IdArgs {
    /// Canvas id.
    #[arg(long)]
    id: u64,
}

#[derive(Args, Debug)]
struct RectArgs {
    /// Canvas id.
    #[arg(long)]
    id: u64,

    /// Left edge.
    #[arg(long)]
    x: u32,

    /// Top edge (y grows downwards).
    #[arg(long)]
    y: u32,

    /// Rectangle width.
    #[arg(long)]
    width: u32,

    /// Rectangle height.
    #[arg(long)]
    height: u32,
}

impl RectArgs {
    fn region(&self) -> Region {
        Region::new(self.x, self.y, self.width, self.height)
    }
}

#[derive(Args, Debug)]
struct UploadArgs {
    #[command(flatten)]
    rect: RectArgs,

    /// Fragment file. `.bmp` is sent verbatim; other formats are converted to 24-bit BMP.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Args, Debug)]
struct FetchArgs {
    #[command(flatten)]
    rect: RectArgs,

    /// Output file. `.png` output is converted; anything else receives the BMP bytes.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = WorkspaceConfig::resolve(cli.workdir.as_deref())?;
    let mut service = Chartographer::open(config)?;

    match cli.cmd {
        Command::Create(args) => cmd_create(&mut service, args)?,
        Command::Upload(args) => cmd_upload(&service, args)?,
        Command::Fetch(args) => cmd_fetch(&service, args)?,
        Command::Delete(args) => service.delete(CanvasId(args.id))?,
        Command::Info(args) => {
            let record = service.record(CanvasId(args.id))?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
    }

    service.shutdown()?;
    Ok(())
}

fn cmd_create(service: &mut Chartographer, args: CreateArgs) -> anyhow::Result<()> {
    let id = service.create(args.width, args.height)?;
    println!("{id}");
    Ok(())
}

fn cmd_upload(service: &Chartographer, args: UploadArgs) -> anyhow::Result<()> {
    let id = CanvasId(args.rect.id);
    let region = args.rect.region();
    if has_extension(&args.in_path, "bmp") {
        let f = File::open(&args.in_path)
            .with_context(|| format!("open fragment '{}'", args.in_path.display()))?;
        service.upload(id, region, BufReader::new(f))?;
    } else {
        let bytes = convert_to_bmp(&args.in_path)?;
        service.upload(id, region, Cursor::new(bytes))?;
    }
    Ok(())
}

fn cmd_fetch(service: &Chartographer, args: FetchArgs) -> anyhow::Result<()> {
    let id = CanvasId(args.rect.id);
    let region = args.rect.region();

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    if has_extension(&args.out, "png") {
        let bmp_bytes = service.fetch_to_vec(id, region)?;
        let img = image::load_from_memory_with_format(&bmp_bytes, image::ImageFormat::Bmp)
            .context("decode fetched fragment")?;
        img.save_with_format(&args.out, image::ImageFormat::Png)
            .with_context(|| format!("write '{}'", args.out.display()))?;
    } else {
        let f = File::create(&args.out)
            .with_context(|| format!("create '{}'", args.out.display()))?;
        let mut out = BufWriter::new(f);
        service.fetch(id, region, &mut out)?;
        out.flush()
            .with_context(|| format!("write '{}'", args.out.display()))?;
    }
    Ok(())
}

fn convert_to_bmp(path: &Path) -> anyhow::Result<Vec<u8>> {
    let img = image::open(path).with_context(|| format!("decode image '{}'", path.display()))?;
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    let dims = CanvasDims::new(width, height)?;
    Ok(bmp::encode_rgb8(dims, rgb.as_raw())?)
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}
