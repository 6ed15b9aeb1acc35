use anyhow::Result;
use log::{debug, info, warn};

use crate::{
    cli::ViewArgs,
    config::ViewConfig,
    header::FilterRole,
    io_utils,
    reconcile_cmd::{load_run, reconcile_run},
    table,
    view::{self, Pager, ViewQuery},
};

pub fn execute(args: &ViewArgs) -> Result<()> {
    let run = load_run(&args.input)?;
    let reconciliation = reconcile_run(&run);
    let dataset = &reconciliation.dataset;

    if args.list_filters {
        let rows = FilterRole::ALL
            .iter()
            .map(|role| {
                let options = view::filter_options(dataset, *role);
                vec![role.label().to_string(), options.join(", ")]
            })
            .collect::<Vec<_>>();
        print!(
            "{}",
            table::render_table(&["filter".to_string(), "values".to_string()], &rows)
        );
        return Ok(());
    }

    let query = build_query(args, &run.config.view);
    debug!("View query: {query:?}");
    let filtered = view::apply(dataset, &query);
    if filtered.is_empty() {
        warn!("No rows match the current filters");
    }

    if let Some(path) = &args.output {
        let (headers, rows) = filtered.all().to_string_rows();
        io_utils::write_rows(Some(path), io_utils::DEFAULT_CSV_DELIMITER, &headers, &rows)?;
        info!("Exported {} filtered row(s) to {path:?}", filtered.len());
        return Ok(());
    }

    let page_size = args.page_size.unwrap_or(run.config.view.page_size);
    let mut pager = Pager::new(page_size);
    pager.sync(
        page_size,
        filtered.len(),
        query.search.as_deref().unwrap_or_default(),
    );
    pager.go_to(args.page);
    if pager.page() != args.page {
        warn!(
            "Page {} is out of range; showing page {} of {}",
            args.page,
            pager.page(),
            pager.page_count()
        );
    }

    print!("{}", table::render_page(&filtered.page(&pager)));
    Ok(())
}

fn build_query(args: &ViewArgs, defaults: &ViewConfig) -> ViewQuery {
    let mut query = ViewQuery {
        min_days_offline: args.min_days_offline,
        search: args.search.clone(),
        order_field: args
            .order_field
            .clone()
            .or_else(|| defaults.order_field.clone()),
        viewer: args.viewer,
        restricted_columns: defaults.restricted_columns.clone(),
        ..ViewQuery::default()
    };
    let requested = [
        (FilterRole::Circle, &args.circle),
        (FilterRole::Division, &args.division),
        (FilterRole::SubDivision, &args.sub_division),
        (FilterRole::DeviceStatus, &args.device_status),
    ];
    for (role, value) in requested {
        if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            query = query.with_filter(role, value);
        }
    }
    query
}
