use granska_core::extraction::lines::reconstruct_lines;
use std::path::PathBuf;

pub fn run(
    input_file: PathBuf,
    config_file: Option<PathBuf>,
) -> Result<(), granska_core::error::GranskaError> {
    let config = super::engine_config(config_file.as_deref())?;
    let pages = super::load_pages(&input_file)?;
    let lines = reconstruct_lines(&pages, config.band_width);

    for line in &lines {
        println!("{:>3}  {:>7.1}  {}", line.page, line.y, line.text);
    }
    eprintln!("{} line(s) on {} page(s)", lines.len(), pages.len());

    Ok(())
}
