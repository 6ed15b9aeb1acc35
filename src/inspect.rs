use std::collections::HashSet;

use anyhow::{Context, Result};
use log::info;

use crate::{
    cli::InspectArgs,
    dates::{find_latest_date_column, parse_embedded_date},
    group::select_column_group,
    header::classify,
    io_utils, table,
};

pub fn execute(args: &InspectArgs) -> Result<()> {
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let dataset = io_utils::read_dataset(&args.input, args.delimiter, encoding)
        .with_context(|| format!("Inspecting {:?}", args.input))?;
    let headers = dataset.headers();
    let latest = find_latest_date_column(headers).map(|(header, _)| header);

    let rows = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            let date = parse_embedded_date(header)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default();
            let marker = if latest == Some(header.as_str()) {
                "latest"
            } else {
                ""
            };
            vec![
                (idx + 1).to_string(),
                header.clone(),
                classify(header).as_str().to_string(),
                date,
                marker.to_string(),
            ]
        })
        .collect::<Vec<_>>();
    let columns = ["#", "header", "role", "date", ""].map(String::from);
    print!("{}", table::render_table(&columns, &rows));

    if let Some(policy) = args.policy {
        let selection = select_column_group(policy, headers, latest, &HashSet::new());
        println!();
        match &selection.group.anchor {
            Some(anchor) => println!("{policy} group anchored at '{anchor}':"),
            None => println!("{policy} group (no date anchor):"),
        }
        for member in &selection.group.members {
            println!("  {member}");
        }
        if selection.group.is_empty() {
            println!("  (empty)");
        }
        if selection.used_fallback {
            println!("  selected by the name-based fallback scan");
        }
    }

    info!(
        "Inspected {} column(s) and {} row(s) in {:?}",
        headers.len(),
        dataset.len(),
        args.input
    );
    Ok(())
}
