//! `nativepack capabilities` command

use std::path::Path;

use anyhow::Result;

use crate::cli::{CapabilitiesArgs, OutputFormat};
use crate::commands::resolve_capabilities;
use nativepack::ops::CapabilityReport;

pub fn execute(args: CapabilitiesArgs) -> Result<()> {
    let caps = resolve_capabilities(Path::new("."), &args.target)?;
    let report = CapabilityReport::new(&caps);

    match args.format {
        OutputFormat::Text => print!("{}", report),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }

    Ok(())
}
