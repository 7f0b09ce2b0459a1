use ghcnd_explorer::{ExplorerError, LatLon, StationDataError, StationExplorer, YearSpan};
use std::env;

#[tokio::main]
async fn main() -> Result<(), ExplorerError> {
    configure_polars_display();
    let explorer = StationExplorer::new().await?;
    let years = YearSpan::new(1990, 2020);

    let nearby = explorer
        .find_stations()
        .location(LatLon(49.45, 11.08))
        .max_distance_km(75.0)
        .years(years)
        .call();

    for found in &nearby {
        println!(
            "{} {:<30} {:>6.1} km  {}-{}",
            found.station.id,
            found.station.name,
            found.distance_km,
            found.station.first_year,
            found.station.last_year
        );
    }

    let Some(closest) = nearby.first() else {
        println!("No station with temperature data in {years}");
        return Ok(());
    };

    let datasets = match explorer.station_data(&closest.station.id).await {
        Ok(datasets) => datasets,
        Err(e) => {
            eprintln!("{}", e.user_message());
            return Err(e);
        }
    };
    let yearly = datasets
        .yearly_frame()?
        .collect()
        .map_err(|e| StationDataError::DatasetRead(datasets.paths.yearly.clone(), e))?;
    println!("{:#?}", yearly);

    let rows = explorer
        .seasonal_summary()
        .station_id(&closest.station.id)
        .years(years)
        .call()
        .await?;
    for row in rows {
        println!(
            "{}  winter {:>6}  summer {:>6}",
            row.year,
            format_temp(row.winter.min),
            format_temp(row.summer.max)
        );
    }

    Ok(())
}

fn format_temp(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.1}"))
}

fn configure_polars_display() {
    // show every column
    env::set_var("POLARS_FMT_MAX_COLS", "-1");
    // show 20 rows
    env::set_var("POLARS_FMT_MAX_ROWS", "20");
}
