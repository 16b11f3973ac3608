//! Intel HEX inspection utility
//! Loads a HEX file, prints its segment layout and optionally re-encodes it

use ihex_rs::formats::{load_hex, save_hex, Dialect, HexOptions, HexSummary};
use std::env;
use tracing_subscriber::{fmt::format::FmtSpan, prelude::*, EnvFilter};

fn usage(program: &str) -> ! {
    eprintln!("Usage: {} <file.hex> [options]", program);
    eprintln!("\nOptions:");
    eprintln!("  --dialect <narrow|segmented|linear>  Dialect for --write (default: inferred)");
    eprintln!("  --line-length <1-255>               Data bytes per record for --write");
    eprintln!("  --allow-duplicates                   Skip duplicate address checks");
    eprintln!("  --json                               Print the summary as JSON");
    eprintln!("  --dump                               Hex dump every segment");
    eprintln!("  --write <out.hex>                    Re-encode to a new file");
    std::process::exit(1);
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter_layer =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    let format_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(format_layer)
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("ihex-info");
    let Some(input) = args.get(1) else {
        usage(program);
    };

    let mut options = HexOptions::default();
    let mut json = false;
    let mut dump = false;
    let mut output: Option<&String> = None;

    let mut rest = args[2..].iter();
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--dialect" => {
                let value = rest
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--dialect needs a value"))?;
                options.dialect = Some(value.parse::<Dialect>()?);
            }
            "--line-length" => {
                let value = rest
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--line-length needs a value"))?;
                options.line_length = value.parse()?;
            }
            "--allow-duplicates" => options.allow_duplicate_addresses = true,
            "--json" => json = true,
            "--dump" => dump = true,
            "--write" => {
                output = Some(
                    rest.next()
                        .ok_or_else(|| anyhow::anyhow!("--write needs a path"))?,
                );
            }
            other => {
                eprintln!("Unknown option: {}", other);
                usage(program);
            }
        }
    }
    options.validate()?;

    tracing::info!("Loading {}", input);
    let model = load_hex(input, &options)?;
    let summary = HexSummary::from_model(&model);

    if json {
        println!("{}", summary.to_json()?);
    } else {
        println!("Segments: {}", summary.segments.len());
        for seg in &summary.segments {
            println!(
                "  0x{:08X}..0x{:08X}  {:>8} bytes",
                seg.address, seg.end_address, seg.length
            );
        }
        println!("Total bytes:  {}", summary.total_bytes);
        println!("Max address:  0x{:X}", summary.max_address);
        if let Some(dialect) = summary.dialect {
            println!("Dialect:      {}", dialect);
        }
        if let Some(start) = summary.start_segment_address {
            println!(
                "Start CS:IP:  {:04X}:{:04X}",
                start.code_segment, start.instruction_pointer
            );
        }
        if let Some(start) = summary.start_linear_address {
            println!("Start EIP:    0x{:08X}", start);
        }
    }

    if dump {
        for segment in model.segments() {
            println!("\n{}", segment);
            print!("{}", segment.printable());
        }
    }

    if let Some(path) = output {
        save_hex(path, &model, &options)?;
        tracing::info!("Wrote {}", path);
    }

    Ok(())
}
