use serde_json::json;

use crate::cli::OutputFormat;
use crate::routes::ROUTE_TABLE;

pub fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "routes": ROUTE_TABLE }))?);
        }
        OutputFormat::Text => {
            println!("{:<8} {:<22} GUARDS", "METHOD", "PATH");
            for route in ROUTE_TABLE {
                let stages = route.guard.stages();
                let guards = if stages.is_empty() {
                    "-".to_string()
                } else {
                    stages.join(" -> ")
                };
                println!("{:<8} {:<22} {}", route.method, route.path, guards);
            }
        }
    }
    Ok(())
}
