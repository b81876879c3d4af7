use std::env;
use std::net::SocketAddr;

use contracts::{Factor, FleetConfig};
use flock_api::{default_bind_addr, serve, FleetApi};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

fn print_usage() {
    println!("flock-cli <command>");
    println!("commands:");
    println!("  houses");
    println!("  house <id>");
    println!("  telemetry <id> [day]");
    println!("  weekly <id>");
    println!("  kpis <id>");
    println!("    day-level fcr/pef trend from running feed and mortality totals");
    println!("  anomalies <id>");
    println!("  advise <week>");
    println!("    current operating point, recommendations and week support");
    println!("  summary");
    println!("  report");
    println!("  serve [addr]");
    println!("    default addr: $FLOCK_BIND_ADDR or 127.0.0.1:8080");
    println!("env: FLOCK_REFERENCE_DATE=YYYY-MM-DD, FLOCK_BUILD_THREADS=<n>, RUST_LOG");
}

fn parse_u32(value: Option<&String>, label: &str) -> Result<u32, String> {
    let raw = value.ok_or_else(|| format!("missing {label}"))?;
    raw.parse::<u32>()
        .map_err(|_| format!("invalid {label}: {raw}"))
}

fn parse_socket_addr(value: Option<&String>) -> Result<SocketAddr, String> {
    let raw = value.cloned().unwrap_or_else(default_bind_addr);
    raw.parse::<SocketAddr>()
        .map_err(|_| format!("invalid addr: {raw}"))
}

fn require_house_id(value: Option<&String>) -> Result<&str, String> {
    value
        .map(String::as_str)
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| "missing house id".to_string())
}

fn print_json(value: &impl Serialize) -> Result<(), String> {
    let encoded = serde_json::to_string_pretty(value)
        .map_err(|err| format!("failed to encode output: {err}"))?;
    println!("{encoded}");
    Ok(())
}

fn run_query(api: &FleetApi, command: &str, args: &[String]) -> Result<(), String> {
    match command {
        "houses" => print_json(&api.list_houses()),
        "house" => {
            let house_id = require_house_id(args.get(2))?;
            let overview = api
                .house_overview(house_id)
                .ok_or_else(|| format!("house not found: {house_id}"))?;
            print_json(&overview)
        }
        "telemetry" => {
            let house_id = require_house_id(args.get(2))?;
            match args.get(3) {
                Some(raw_day) => {
                    let day = parse_u32(Some(raw_day), "day")?;
                    let reading = api
                        .get_daily(house_id, day)
                        .map_err(|err| err.to_string())?;
                    print_json(&reading)
                }
                None => print_json(&api.get_telemetry(house_id)),
            }
        }
        "weekly" => {
            let house_id = require_house_id(args.get(2))?;
            print_json(&api.get_weekly_metrics(house_id))
        }
        "kpis" => {
            let house_id = require_house_id(args.get(2))?;
            print_json(&api.get_daily_kpis(house_id))
        }
        "anomalies" => {
            let house_id = require_house_id(args.get(2))?;
            print_json(&api.get_anomalies(house_id))
        }
        "advise" => {
            let week = parse_u32(args.get(2), "week")?;
            let current = api
                .current_factor_values(week)
                .map_err(|err| err.to_string())?;
            let recommendations = api
                .recommendations(week, &current)
                .map_err(|err| err.to_string())?;
            let support = api.week_support().map_err(|err| err.to_string())?;
            let factors = Factor::ALL
                .iter()
                .map(|factor| {
                    serde_json::json!({
                        "factor": factor,
                        "label": factor.label(),
                        "unit": factor.unit(),
                    })
                })
                .collect::<Vec<_>>();
            print_json(&serde_json::json!({
                "week": week,
                "factors": factors,
                "current": current,
                "recommendations": recommendations,
                "week_support": support,
            }))
        }
        "summary" => print_json(&api.fleet_summary()),
        "report" => print_json(&api.fleet_report()),
        other => Err(format!("unknown command: {other}")),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(String::as_str);

    match command {
        Some("serve") => match parse_socket_addr(args.get(2)) {
            Ok(addr) => {
                println!("serving fleet api on http://{addr}");
                if let Err(err) = serve(addr, FleetConfig::from_env()).await {
                    eprintln!("server error: {err}");
                    std::process::exit(1);
                }
            }
            Err(err) => {
                eprintln!("error: {err}");
                print_usage();
                std::process::exit(2);
            }
        },
        Some("help") | Some("--help") | None => print_usage(),
        Some(command) => {
            let api = FleetApi::from_env();
            if let Err(err) = run_query(&api, command, &args) {
                eprintln!("error: {err}");
                print_usage();
                std::process::exit(2);
            }
        }
    }
}
