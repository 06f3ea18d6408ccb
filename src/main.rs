use crate::delay::DelayConvention;
use crate::error::QueryError;
use crate::flight::Flight;
use crate::registry::{FlightRegistry, HourOrder};
use chrono::NaiveDate;
use clap::Parser;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::{Context, Editor, Helper, Highlighter, Hinter, Validator};
use std::error::Error;
use std::fmt::Display;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tabled::builder::Builder;
use tabled::settings::Style;
use tabled::{Table, Tabled};

mod aircraft;
mod airport;
mod delay;
mod error;
mod flight;
mod loader;
mod logging;
mod registry;

#[derive(Parser)]
struct Args {
    /// Path to the flights file (CSV, or JSON with a .json extension)
    #[arg(short, long, value_name = "FILE", default_value = "data/flights.csv")]
    flights: PathBuf,

    /// Treat "delayed" as behind schedule in every query instead of
    /// reproducing the historical sign of each query
    #[arg(long)]
    corrected_delays: bool,

    /// Log level used when RUST_LOG is not set
    #[arg(long, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Helper, Hinter, Highlighter, Validator)]
pub struct CompleteHelper {
    pub commands: Vec<String>,
}

impl Completer for CompleteHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, _pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        let candidates = self
            .commands
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.clone(),
                replacement: format!("{} ", cmd),
            })
            .collect();

        Ok((0, candidates))
    }
}

#[derive(Tabled)]
struct FlightRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Sched")]
    scheduled: String,
    #[tabled(rename = "Dir")]
    direction: String,
    #[tabled(rename = "City")]
    city: String,
    #[tabled(rename = "Carrier")]
    carrier: String,
    #[tabled(rename = "Aircraft")]
    aircraft: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Actual")]
    actual: String,
    #[tabled(rename = "Delay")]
    delay: String,
}

impl From<&Flight> for FlightRow {
    fn from(f: &Flight) -> Self {
        FlightRow {
            code: f.code.to_string(),
            date: f.date.to_string(),
            scheduled: f.scheduled_time.format("%H:%M").to_string(),
            direction: f.direction.to_string(),
            city: f.city.to_string(),
            carrier: f.carrier.to_string(),
            aircraft: f.aircraft.to_string(),
            status: f.status.to_string(),
            actual: f
                .actual_time
                .map(|t| t.format("%H:%M").to_string())
                .unwrap_or_default(),
            delay: f.delay_minutes().map(|m| format!("{:+}", m)).unwrap_or_default(),
        }
    }
}

fn paginate(content: String) {
    let pager = Command::new("less")
        .arg("-R")
        .stdin(Stdio::piped())
        .spawn()
        // Fallback to 'more' if 'less' isn't available
        .or_else(|_| Command::new("more").stdin(Stdio::piped()).spawn());

    let mut pager = match pager {
        Ok(pager) => pager,
        Err(_) => {
            println!("{}", content);
            return;
        }
    };

    // stdin must be closed before waiting, or the pager never sees EOF
    if let Some(mut stdin) = pager.stdin.take() {
        if let Err(e) = stdin.write_all(content.as_bytes()) {
            // Broken pipe is common if the user quits the pager early
            if e.kind() != std::io::ErrorKind::BrokenPipe {
                eprintln!("Error writing to pager: {}", e);
            }
        }
    }

    let _ = pager.wait();
}

fn show(mut table: Table, rows: usize) {
    table.with(Style::rounded());
    table.with(tabled::settings::Alignment::left());
    if rows > 20 {
        paginate(table.to_string());
    } else {
        println!("{}", table);
    }
}

fn show_flights<'a>(flights: impl IntoIterator<Item = &'a Flight>) {
    let rows: Vec<FlightRow> = flights.into_iter().map(FlightRow::from).collect();
    if rows.is_empty() {
        println!("No matching flights found.");
    } else {
        let len = rows.len();
        show(Table::new(rows), len);
    }
}

fn show_pairs<K: Display, V: Display>(headers: [&str; 2], pairs: impl IntoIterator<Item = (K, V)>) {
    let mut builder = Builder::default();
    builder.push_record(headers);
    let mut rows = 0;
    for (key, value) in pairs {
        builder.push_record([key.to_string(), value.to_string()]);
        rows += 1;
    }
    if rows == 0 {
        println!("Nothing to show.");
    } else {
        show(builder.build(), rows);
    }
}

fn join<T: Display>(items: impl IntoIterator<Item = T>) -> String {
    items
        .into_iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn list(registry: &FlightRegistry, filter: Option<&str>) {
    match filter {
        None => show_flights(registry.iter()),
        Some(arg) => match NaiveDate::parse_from_str(arg, "%Y-%m-%d") {
            Ok(date) => show_flights(registry.flights_by_date().get(&date).into_iter().flatten()),
            Err(_) => show_flights(registry.flights_by_city().get(arg).into_iter().flatten()),
        },
    }
}

fn stats(registry: &FlightRegistry) {
    show_pairs(
        ["Statistic", "Value"],
        [
            ("flights", registry.len().to_string()),
            ("departures", registry.count_outbound().to_string()),
            ("canceled", registry.count_canceled().to_string()),
            ("delayed", registry.count_delayed().to_string()),
            ("destinations", registry.count_distinct_destination_cities().to_string()),
            ("carriers", registry.distinct_carriers().len().to_string()),
            ("delay convention", registry.convention().to_string()),
        ],
    );
}

fn carriers(registry: &FlightRegistry) -> Result<(), QueryError> {
    let models = registry.aircraft_models_by_carrier();
    let delayed = registry.delayed_count_by_carrier();
    let accumulated = registry.accumulated_delay_by_carrier();
    let average = registry.average_delay_by_carrier();
    let shares = registry.delay_percentage_by_carrier();

    let mut builder = Builder::default();
    builder.push_record(["Carrier", "Flights", "Models", "Late", "Acc. delay", "Avg delay", "Late share"]);
    let carriers = registry.distinct_carriers();
    for carrier in &carriers {
        builder.push_record([
            carrier.to_string(),
            registry.count_by_carrier(carrier).to_string(),
            models.get(carrier).map(|m| join(m)).unwrap_or_default(),
            delayed.get(carrier).map(|c| c.to_string()).unwrap_or_default(),
            accumulated.get(carrier).map(|m| m.to_string()).unwrap_or_default(),
            average.get(carrier).map(|m| format!("{:.1}", m)).unwrap_or_default(),
            shares.get(carrier).map(|p| format!("{:.1}%", p)).unwrap_or_default(),
        ]);
    }
    show(builder.build(), carriers.len());

    println!("Second most active carrier: {}", registry.second_most_active_carrier()?);
    Ok(())
}

fn carrier(registry: &FlightRegistry, name: &str) -> Result<(), QueryError> {
    let first = registry.first_flight_of(name)?;
    show_pairs(
        ["Query", "Result"],
        [
            ("flights", registry.count_by_carrier(name).to_string()),
            ("aircraft models", join(registry.distinct_aircraft_models_of(name))),
            ("all on time or early", registry.all_on_time_or_early(name).to_string()),
            ("accumulated delay", registry.accumulated_delay_of(name).to_string()),
            ("first flight", first.to_string()),
        ],
    );
    Ok(())
}

fn city(registry: &FlightRegistry, name: &str) -> Result<(), QueryError> {
    let earliest = registry.earliest_departure_to(name)?;
    let mut weekdays = registry
        .weekdays_with_departure_to(name)
        .into_iter()
        .collect::<Vec<_>>();
    weekdays.sort_by_key(|d| d.num_days_from_monday());
    show_pairs(
        ["Query", "Result"],
        [
            ("departures", registry.count_to(name).to_string()),
            ("earliest departure", earliest.to_string()),
            ("weekdays", join(weekdays)),
            ("average delay", format!("{:.1}", registry.average_delay_to(name)?)),
        ],
    );
    Ok(())
}

fn delays(registry: &FlightRegistry) -> Result<(), QueryError> {
    match registry.worst_delay() {
        Some(flight) => println!("Worst delay: {} ({:+} min)", flight, flight.try_delay_minutes()?),
        None => println!("No flight operated behind schedule."),
    }
    show_pairs(["City", "Earliest arrival"], registry.earliest_inbound_by_city()?);
    show_pairs(["Carrier", "Worst delay"], registry.worst_delay_by_carrier()?);
    Ok(())
}

fn first(registry: &FlightRegistry, n: usize) {
    println!("First {} destinations: {}", n, join(registry.first_n_destinations(n)));
    show_pairs(
        ["Date", "Cities"],
        registry
            .first_n_cities_per_date(n)
            .into_iter()
            .map(|(date, cities)| (date, join(cities))),
    );
}

fn export(registry: &FlightRegistry, path: &str) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(&registry.flights())?;
    std::fs::write(path, json)?;
    Ok(())
}

fn report(result: Result<(), QueryError>) {
    match result {
        Ok(()) => {}
        Err(e) if e.is_not_found() => println!("{}", format!("Not found: {}", e).yellow()),
        Err(e) => println!("{}", format!("Error: {}", e).red()),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    logging::init(&args.log_level)?;

    let convention = if args.corrected_delays {
        DelayConvention::Corrected
    } else {
        DelayConvention::Literal
    };
    let mut registry = loader::load_from_file(&args.flights, convention)?;
    println!(
        "{} Loaded {} flights from {} ({} delays)",
        "Tower online.".green().bold(),
        registry.len(),
        args.flights.display(),
        convention
    );

    let config = rustyline::Config::builder()
        .history_ignore_space(true)
        .completion_type(rustyline::CompletionType::List)
        .build();

    let helper = CompleteHelper {
        commands: [
            "ls", "stats", "carriers", "carrier", "city", "cities", "delays", "hours", "first",
            "months", "divert", "export", "help", "exit",
        ]
        .iter()
        .map(|c| c.to_string())
        .collect(),
    };

    let mut rl = Editor::with_config(config)?;
    rl.set_helper(Some(helper));

    loop {
        let readline = rl.readline(">> ");
        match readline {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() { continue; }

                rl.add_history_entry(trimmed)?;

                let parts: Vec<&str> = trimmed.split_whitespace().collect();
                let rest = parts[1..].join(" ");
                match parts[0] {
                    "ls" => list(&registry, parts.get(1).map(|_| rest.as_str())),
                    "stats" => stats(&registry),
                    "carriers" => report(carriers(&registry)),
                    "carrier" if !rest.is_empty() => report(carrier(&registry, &rest)),
                    "city" if !rest.is_empty() => report(city(&registry, &rest)),
                    "cities" => show_pairs(["City", "Flights"], registry.flight_count_by_city()),
                    "delays" => report(delays(&registry)),
                    "hours" => {
                        let order = match parts.get(1) {
                            Some(&"desc") => HourOrder::Descending,
                            _ => HourOrder::Ascending,
                        };
                        show_pairs(["Hour", "Departures"], registry.departure_count_by_hour(order));
                    },
                    "first" => match parts.get(1).map(|n| n.parse::<usize>()) {
                        Some(Ok(n)) => first(&registry, n),
                        _ => println!("Usage: first <n>"),
                    },
                    "months" => show_pairs(
                        ["Month", "Destinations"],
                        registry.monthly_distinct_destination_counts(),
                    ),
                    "divert" => {
                        if let (Some(from), Some(to)) = (parts.get(1), parts.get(2)) {
                            let diverted = registry.divert_flights(from, to);
                            println!("Diverted {} departures from {} to {}.", diverted, from, to);
                        } else {
                            println!("Usage: divert <from_city> <to_city>");
                        }
                    },
                    "export" => match parts.get(1) {
                        Some(path) => match export(&registry, path) {
                            Ok(()) => println!("Wrote {} flights to {}.", registry.len(), path),
                            Err(e) => println!("{}", format!("Error: {}", e).red()),
                        },
                        None => println!("Usage: export <file.json>"),
                    },
                    "carrier" => println!("Usage: carrier <name>"),
                    "city" => println!("Usage: city <name>"),
                    "help" | "?" => {
                        println!("\nAvailable Commands:");
                        println!("  ls [date|city]      - List all flights, or those of a date (YYYY-MM-DD) or city");
                        println!("  stats               - Overall counts");
                        println!("  carriers            - Per-carrier models, delays and shares");
                        println!("  carrier <name>      - Queries for one carrier");
                        println!("  city <name>         - Queries for one destination");
                        println!("  cities              - Flights per city, both directions");
                        println!("  delays              - Worst delays and earliest arrivals");
                        println!("  hours [asc|desc]    - Departures per hour of day");
                        println!("  first <n>           - First <n> destinations, overall and per date");
                        println!("  months              - Distinct destinations per month");
                        println!("  divert <from> <to>  - Reroute departures to <from> towards <to>");
                        println!("  export <file>       - Write all flights as JSON");
                        println!("  help / ?            - Show this help menu");
                        println!("  exit / quit         - Leave the tower\n");
                    },
                    "exit" | "quit" => break,
                    _ => println!("Unknown command: {}", parts[0]),
                }
            },
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            },
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            },
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    Ok(())
}
