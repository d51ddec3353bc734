//! The autotrends-client executable supports the following command line arguments:
//!
//! `autotrends-client load [--file CSV] [--url URL]`
//!
//!     Load the dataset. With --file the CSV is uploaded, otherwise the server loads its own file.
//!
//! `autotrends-client data | clear | years [--url URL]`
//!
//!     Print every record, delete every record, or print the distinct model years.
//!
//! `autotrends-client year <YEAR> [--url URL]`
//!
//!     Print the records of one model year.
//!
//! `autotrends-client render | image | rm-image [--year Y] [--kind bar|line] [--out FILE]`
//!
//!     Render a chart, download a rendered chart, or delete every cached chart.
//!
//! --url is the base url of the server, `http://127.0.0.1:5000` if not given.
//! An error is printed and a non-zero exit code returned on a server error.

use std::fs;
use std::path::PathBuf;

use autotrends::{ApiReply, ChartRequest, Result, TrendsClient, TrendsError};
use clap::{crate_version, App, Arg, ArgMatches, SubCommand};
use serde::Serialize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

const DEFAULT_URL: &str = "http://127.0.0.1:5000";

/// the requests this client can make
#[derive(Debug)]
enum Command {
    Load { file: Option<PathBuf> },
    Data,
    Clear,
    Years,
    Year { year: String },
    Render { chart: ChartRequest },
    Image { chart: ChartRequest, out: PathBuf },
    RemoveImage,
}

/// ['Opt'] holds parsed and validated options from the command line
#[derive(Debug)]
struct Opt {
    /// the server's base url
    url: String,
    cmd: Command,
}

fn main() {
    // configure a subscriber that will log messages to STDERR
    subscriber_config();

    let chart_args = || {
        vec![
            Arg::with_name("year").long("year").value_name("YEAR").default_value("2021"),
            Arg::with_name("kind")
                .long("kind")
                .value_name("KIND")
                .possible_values(&["bar", "line"])
                .default_value("bar"),
        ]
    };

    let matches = App::new("autotrends-client")
        .version(crate_version!())
        .author("strohs <strohs1@gmail.com>")
        .about("a client for the autotrends HTTP API")
        .subcommands(vec![
            SubCommand::with_name("load")
                .about("Load the dataset into the store")
                .arg(Arg::with_name("file").long("file").value_name("CSV")),
            SubCommand::with_name("data").about("Print every record"),
            SubCommand::with_name("clear").about("Delete every record"),
            SubCommand::with_name("years").about("Print the distinct model years"),
            SubCommand::with_name("year")
                .about("Print the records of a model year")
                .arg(Arg::with_name("YEAR").required(true).index(1)),
            SubCommand::with_name("render")
                .about("Render and cache a chart")
                .args(&chart_args()),
            SubCommand::with_name("image")
                .about("Download a rendered chart")
                .args(&chart_args())
                .arg(Arg::with_name("out").long("out").value_name("FILE").default_value("chart.svg")),
            SubCommand::with_name("rm-image").about("Delete every cached chart"),
        ])
        .arg(Arg::with_name("url")
            .long("url")
            .value_name("URL")
            .help("sets the base url of the server to connect to")
            .default_value(DEFAULT_URL))
        .get_matches();

    // parse commands into an Opt struct, then run it
    if let Err(e) = parse_options(&matches).and_then(run) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

/// runs the requested command against the server at `opt.url`
fn run(opt: Opt) -> Result<()> {
    let client = TrendsClient::new(&opt.url);
    match opt.cmd {
        Command::Load { file } => {
            let csv = match file {
                Some(path) => Some(fs::read(path)?),
                None => None,
            };
            print!("{}", client.load_data(csv.as_deref())?);
        }
        Command::Data => print_reply(client.data()?)?,
        Command::Clear => print!("{}", client.delete_data()?),
        Command::Years => print_reply(client.years()?)?,
        Command::Year { year } => print_reply(client.year(&year)?)?,
        Command::Render { chart } => print_reply(client.render_image(&chart)?)?,
        Command::Image { chart, out } => match client.fetch_image(&chart)? {
            Some(bytes) => {
                fs::write(&out, bytes)?;
                println!("chart written to {}", out.display());
            }
            None => println!("Plot not found"),
        },
        Command::RemoveImage => print!("{}", client.delete_image()?),
    }
    Ok(())
}

fn print_reply<T: Serialize>(reply: ApiReply<T>) -> Result<()> {
    match reply {
        ApiReply::Data(data) => println!("{}", serde_json::to_string_pretty(&data)?),
        ApiReply::Advisory(msg) => print!("{}", msg),
    }
    Ok(())
}

/// parses the matches from the command line into an [`Opt`] struct
fn parse_options(matches: &ArgMatches) -> Result<Opt> {
    let url = matches.value_of("url").unwrap_or(DEFAULT_URL).to_string();
    let cmd = match matches.subcommand() {
        ("load", Some(args)) => Command::Load {
            file: args.value_of("file").map(PathBuf::from),
        },
        ("data", Some(_)) => Command::Data,
        ("clear", Some(_)) => Command::Clear,
        ("years", Some(_)) => Command::Years,
        ("year", Some(args)) => Command::Year {
            year: args.value_of("YEAR").unwrap_or_default().to_string(),
        },
        ("render", Some(args)) => Command::Render {
            chart: chart_request(args)?,
        },
        ("image", Some(args)) => Command::Image {
            chart: chart_request(args)?,
            out: PathBuf::from(args.value_of("out").unwrap_or("chart.svg")),
        },
        ("rm-image", Some(_)) => Command::RemoveImage,
        _ => {
            return Err(TrendsError::Parsing(
                "a subcommand is required, see --help".to_string(),
            ))
        }
    };
    Ok(Opt { url, cmd })
}

fn chart_request(args: &ArgMatches) -> Result<ChartRequest> {
    let mut chart = ChartRequest::for_year(args.value_of("year").unwrap_or("2021"));
    chart.kind = args.value_of("kind").unwrap_or("bar").parse()?;
    Ok(chart)
}

/// configures a tracing subscriber that will log warnings and errors to STDERR
fn subscriber_config() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::WARN)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("a global tracing subscriber was already set");
    }
}
