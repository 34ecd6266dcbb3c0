use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;

use magdec::config::Config;
use magdec::{dates, heading, GeodeticCoordinate, MagneticModel, ModelEvaluator};

#[derive(Parser)]
#[command(
    name = "magdec",
    about = "Magnetic declination and geomagnetic elements from World Magnetic Model coefficients"
)]
struct Cli {
    /// TOML config with the observer position and coefficient file
    #[arg(long, default_value = "config.toml")]
    config: String,

    /// Geodetic latitude in degrees (overrides the config)
    #[arg(long, allow_negative_numbers = true)]
    latitude: Option<f64>,

    /// Longitude in degrees, positive east (overrides the config)
    #[arg(long, allow_negative_numbers = true)]
    longitude: Option<f64>,

    /// Height above the ellipsoid in km
    #[arg(long, allow_negative_numbers = true)]
    height_km: Option<f64>,

    /// Decimal year to evaluate at (defaults to now)
    #[arg(long)]
    year: Option<f64>,

    /// WMM coefficient file (overrides the config)
    #[arg(long)]
    cof: Option<PathBuf>,

    /// Measured magnetic compass heading in degrees; when given, the
    /// declination-corrected true heading is printed too
    #[arg(long, allow_negative_numbers = true)]
    heading: Option<f64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // CLI arguments win; the config file fills in whatever is missing.
    let config = match (&cli.latitude, &cli.longitude, &cli.cof) {
        (Some(_), Some(_), Some(_)) => None,
        _ => Some(Config::load(&cli.config).with_context(|| {
            format!(
                "no position/model on the command line and no config at {}",
                cli.config
            )
        })?),
    };

    let point = match (cli.latitude, cli.longitude) {
        (Some(lat), Some(lon)) => {
            GeodeticCoordinate::new(lat, lon, cli.height_km.unwrap_or(0.0))
        }
        (None, None) => {
            let observer = &config.as_ref().unwrap().observer;
            println!("Observer: {}", observer.name);
            GeodeticCoordinate::new(
                observer.latitude,
                observer.longitude,
                cli.height_km.unwrap_or(observer.height_km),
            )
        }
        _ => bail!("--latitude and --longitude must be given together"),
    };

    let cof = cli
        .cof
        .or_else(|| config.map(|c| c.model.coefficient_file))
        .expect("coefficient file resolved above");
    let model = MagneticModel::load(&cof)
        .with_context(|| format!("failed to load coefficients from {}", cof.display()))?;
    let decimal_year = cli.year.unwrap_or_else(|| dates::decimal_year(Utc::now()));

    println!(
        "Model: {} (epoch {:.1}, valid {:.2}..{:.2})",
        model.name, model.epoch, model.min_year, model.end_year
    );
    println!(
        "Location: {:.4}° lat, {:.4}° lon, {:.3} km above ellipsoid",
        point.latitude, point.longitude, point.height_km
    );
    println!("Date: {decimal_year:.2}");
    println!();

    let evaluator = ModelEvaluator::new(model);
    let result = evaluator.evaluate(point, decimal_year)?;
    let (e, u) = (result.elements, result.uncertainty);

    println!(
        "Declination (D): {:9.2} deg +/- {:.2}   changing by {:7.2} deg/yr",
        e.decl, u.decl, e.decl_dot
    );
    println!(
        "Inclination (I): {:9.2} deg +/- {:.2}   changing by {:7.2} deg/yr",
        e.incl, u.incl, e.incl_dot
    );
    println!(
        "Horizontal  (H): {:9.1} nT  +/- {:.0}    changing by {:7.1} nT/yr",
        e.h, u.h, e.h_dot
    );
    println!(
        "North       (X): {:9.1} nT  +/- {:.0}    changing by {:7.1} nT/yr",
        e.x, u.x, e.x_dot
    );
    println!(
        "East        (Y): {:9.1} nT  +/- {:.0}    changing by {:7.1} nT/yr",
        e.y, u.y, e.y_dot
    );
    println!(
        "Down        (Z): {:9.1} nT  +/- {:.0}    changing by {:7.1} nT/yr",
        e.z, u.z, e.z_dot
    );
    println!(
        "Total       (F): {:9.1} nT  +/- {:.0}    changing by {:7.1} nT/yr",
        e.f, u.f, e.f_dot
    );
    if point.latitude.abs() >= 55.0 {
        println!("Grid variation : {:9.2} deg (polar stereographic)", e.gv);
    }

    if let Some(measured) = cli.heading {
        let true_hdg = heading::true_heading(measured, e.decl);
        println!();
        println!(
            "Compass heading {measured:.1} deg -> true heading {true_hdg:.1} deg ({})",
            if e.decl > 0.0 {
                "declination east"
            } else {
                "declination west"
            }
        );
    }

    Ok(())
}
