use anyhow::{Context, Result};
use byte_unit::{Byte, UnitType};
use colored::*;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table, presets::UTF8_FULL};
use foldertext_core::{FileEntry, ScanWarning, output_formats};
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

/// Prints `plain_text` for the `text` format, otherwise `data` serialized.
pub fn print_data_or_text<T: Serialize>(
    data: &T,
    plain_text: Option<String>,
    format: &str,
    pretty_json: bool,
    root_name: &str,
) -> Result<()> {
    if format.eq_ignore_ascii_case("text") {
        match plain_text {
            Some(text) => write_to_stdout(&text),
            None => write_to_stdout(&output_formats::serialize_to_json(data, true)?),
        }
    } else {
        let content = serialize_output(data, format, pretty_json, root_name)?;
        write_to_stdout(&content)
    }
}

pub fn serialize_output<T: Serialize>(
    data: &T,
    format: &str,
    pretty_json: bool,
    xml_root: &str,
) -> Result<String> {
    let content = match format.to_lowercase().as_str() {
        "yaml" | "yml" => output_formats::serialize_to_yaml(data)?,
        "xml" => output_formats::serialize_to_xml(data, xml_root)?,
        _ => output_formats::serialize_to_json(data, pretty_json)?,
    };
    Ok(content)
}

pub fn write_to_stdout(content: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(content.as_bytes())
        .context("Failed to write to stdout")?;
    if !content.ends_with('\n') {
        handle
            .write_all(b"\n")
            .context("Failed to write newline to stdout")?;
    }
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}

/// Asks before replacing `path`. Quiet mode never overwrites.
pub fn confirm_overwrite(path: &Path, quiet: bool) -> Result<bool> {
    if !path.exists() {
        return Ok(true);
    }
    if quiet {
        anyhow::bail!(
            "Target file '{}' exists. Overwrite prevented in quiet mode.",
            path.display()
        );
    }
    print!(
        "{} File already exists at '{}'. Overwrite? [{}/{}] ",
        "⚠️".yellow(),
        path.display().to_string().cyan(),
        "y".green(),
        "N".red()
    );
    io::stdout().flush().context("Failed to flush stdout")?;
    let mut response = String::new();
    io::stdin()
        .read_line(&mut response)
        .context("Failed to read user input")?;
    if response.trim().eq_ignore_ascii_case("y") {
        Ok(true)
    } else {
        println!("Save cancelled.");
        Ok(false)
    }
}

pub fn print_warnings(warnings: &[ScanWarning], quiet: bool) {
    if quiet || warnings.is_empty() {
        return;
    }
    eprintln!(
        "\n{}",
        format!("⚠️ Warning: {} problem(s) encountered during the scan:", warnings.len()).yellow()
    );
    for warning in warnings {
        eprintln!(" - {}", warning);
    }
    eprintln!("---");
}

pub fn readable_size(bytes: usize) -> String {
    Byte::from_u128(bytes as u128)
        .unwrap_or_default()
        .get_appropriate_unit(UnitType::Binary)
        .to_string()
}

pub fn print_file_table(files: &[FileEntry]) {
    if files.is_empty() {
        println!("{}", "(No files included)".yellow());
        return;
    }
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Path").fg(Color::Green),
        Cell::new("Lines").fg(Color::Green),
        Cell::new("Size").fg(Color::Green),
    ]);
    for file in files {
        let path_cell = if file.lossy {
            Cell::new(format!("{} (lossy)", file.path)).fg(Color::Yellow)
        } else {
            Cell::new(&file.path).fg(Color::Cyan)
        };
        table.add_row(vec![
            path_cell,
            Cell::new(file.line_count).set_alignment(CellAlignment::Right),
            Cell::new(readable_size(file.size))
                .set_alignment(CellAlignment::Right)
                .fg(Color::DarkGrey),
        ]);
    }
    println!("{table}");
}
