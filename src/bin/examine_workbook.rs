use calamine::{open_workbook_auto, DataType, Reader};
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: examine-workbook <workbook.xlsx> [sheet]");
        std::process::exit(1);
    }
    let file_path = &args[1];

    println!("Opening workbook: {file_path}");
    let mut workbook = open_workbook_auto(file_path)?;

    println!("\nSheet names:");
    for (i, name) in workbook.sheet_names().iter().enumerate() {
        println!("  {i}: {name}");
    }

    // Allow specifying which sheet to examine
    let sheet_name = if args.len() > 2 {
        args[2].clone()
    } else {
        "splits".to_string()
    };

    println!("\n\nExamining sheet: {sheet_name}");
    println!("{}", "=".repeat(100));

    let range = workbook.worksheet_range(&sheet_name)?;

    println!("Dimensions: {:?}", range.get_size());
    println!("\nFirst 20 rows (showing first 8 columns):");
    println!("{}", "=".repeat(100));

    for (row_idx, row) in range.rows().enumerate().take(20) {
        // Only print rows with data
        let has_data = row.iter().any(|cell| !cell.is_empty());
        if has_data {
            print!("Row {:3}: ", row_idx + 1);
            for cell in row.iter().take(8) {
                if cell.is_empty() {
                    print!("[empty] ");
                } else {
                    print!("[{cell}] ");
                }
            }
            println!();
        }
    }

    Ok(())
}
