//! this binary starts the autotrends HTTP server
//! to see the list of options, type: `autotrends-server --help`

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::exit;
use std::str::FromStr;

use autotrends::thread_pool::{RayonThreadPool, SharedQueueThreadPool, ThreadPool};
use autotrends::{
    Api, KvBackend, MemoryBackend, RedisBackend, RedisPolicy, Result, SledBackend, SvgRenderer,
    TrendsError, TrendsServer,
};
use clap::{arg_enum, crate_version, value_t, App, Arg};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

arg_enum! {
    #[allow(non_camel_case_types)]
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    enum Backend {
        memory,
        sled,
        redis
    }
}

arg_enum! {
    #[allow(non_camel_case_types)]
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    enum Pool {
        shared,
        rayon
    }
}

const DEFAULT_ADDRESS: &str = "0.0.0.0:5000";
const DEFAULT_BACKEND: Backend = Backend::memory;
const DEFAULT_CSV: &str = "autoTrendsData.csv";
const DEFAULT_REDIS_PORT: u16 = 6379;
// the name of the file recording which persistent backend a data dir belongs to
const BACKEND_FILE: &str = "backend";

/// ['Opt'] holds parsed and validated options from the command line
#[derive(Debug)]
struct Opt {
    addr: SocketAddr,
    backend: Backend,
    data_dir: PathBuf,
    csv: PathBuf,
    redis_host: String,
    redis_port: u16,
    threads: u32,
    pool: Pool,
}

impl Opt {
    /// validates the address and backend parameters
    /// returns `Ok<Opt>` if everything is valid
    /// # Errors
    /// returns [`TrendsError::Parsing`] if one of the parameters is invalid
    ///
    fn build(
        addr: &str,
        req_backend: Backend,
        data_dir: PathBuf,
        csv: PathBuf,
        redis_host: String,
        redis_port: u16,
        threads: u32,
        pool: Pool,
    ) -> Result<Opt> {
        let addr: SocketAddr = addr.parse().map_err(|_| {
            TrendsError::Parsing(format!("could not parse {} into an IP address and port", addr))
        })?;

        // a persistent data dir must keep using the backend it was created with
        let backend = match current_backend(&data_dir)? {
            None => req_backend,
            Some(_) if req_backend == Backend::memory => req_backend,
            Some(cur_backend) if req_backend == cur_backend => cur_backend,
            Some(cur_backend) => {
                return Err(TrendsError::Parsing(format!(
                    "the requested backend: {} does not match the backend currently in use: {}",
                    req_backend, cur_backend
                )))
            }
        };

        if threads == 0 {
            return Err(TrendsError::Parsing("--threads must be at least 1".to_string()));
        }

        Ok(Opt {
            addr,
            backend,
            data_dir,
            csv,
            redis_host,
            redis_port,
            threads,
            pool,
        })
    }
}

fn main() {
    let matches = App::new("autotrends-server")
        .version(crate_version!())
        .author("strohs <strohs1@gmail.com>")
        .about("an HTTP API over the automotive trends dataset")
        .arg(Arg::with_name("addr")
            .long("addr")
            .value_name("IP_ADDR:PORT")
            .help("sets the IP_ADDR:PORT that the server listens on")
            .default_value(DEFAULT_ADDRESS))
        .arg(Arg::with_name("backend")
            .long("backend")
            .value_name("BACKEND")
            .help("sets the key/value backend to use")
            .possible_values(&Backend::variants())
            .default_value("memory"))
        .arg(Arg::with_name("data-dir")
            .long("data-dir")
            .value_name("DIR")
            .help("directory holding the sled database and the backend marker file")
            .default_value("."))
        .arg(Arg::with_name("csv")
            .long("csv")
            .value_name("FILE")
            .help("the CSV file loaded by POST /data")
            .default_value(DEFAULT_CSV))
        .arg(Arg::with_name("redis-host")
            .long("redis-host")
            .value_name("HOST")
            .env("REDIS_IP")
            .help("host of the redis server, required by the redis backend"))
        .arg(Arg::with_name("redis-port")
            .long("redis-port")
            .value_name("PORT")
            .help("port of the redis server"))
        .arg(Arg::with_name("threads")
            .long("threads")
            .value_name("N")
            .help("number of threads serving requests")
            .default_value("4"))
        .arg(Arg::with_name("pool")
            .long("pool")
            .value_name("POOL")
            .help("the thread pool implementation")
            .possible_values(&Pool::variants())
            .default_value("shared"))
        .arg(Arg::with_name("log-level")
            .long("log-level")
            .value_name("LEVEL")
            .help("maximum level of log events written to stderr")
            .default_value("info"))
        .get_matches();

    let level = match matches.value_of("log-level").map(Level::from_str) {
        Some(Ok(level)) => level,
        _ => {
            eprintln!("invalid --log-level, expected one of trace, debug, info, warn, error");
            exit(1);
        }
    };
    // set up a tracing subscriber to log to STDERR
    subscriber_config(level);

    let req_backend = value_t!(matches, "backend", Backend).unwrap_or(DEFAULT_BACKEND);
    let pool = value_t!(matches, "pool", Pool).unwrap_or(Pool::shared);
    let threads = match value_t!(matches, "threads", u32) {
        Ok(threads) => threads,
        Err(e) => e.exit(),
    };
    let redis_port = match matches.value_of("redis-port") {
        None => DEFAULT_REDIS_PORT,
        Some(port) => match port.parse() {
            Ok(port) => port,
            Err(_) => {
                eprintln!("could not parse --redis-port {}", port);
                exit(1);
            }
        },
    };

    let opt = Opt::build(
        matches.value_of("addr").unwrap_or(DEFAULT_ADDRESS),
        req_backend,
        PathBuf::from(matches.value_of("data-dir").unwrap_or(".")),
        PathBuf::from(matches.value_of("csv").unwrap_or(DEFAULT_CSV)),
        matches.value_of("redis-host").unwrap_or_default().to_string(),
        redis_port,
        threads,
        pool,
    );
    let opt = match opt {
        Ok(opt) => opt,
        Err(err) => {
            eprintln!("{}", err);
            exit(1);
        }
    };

    // start the server
    if let Err(e) = run(opt) {
        eprintln!("{}", e);
        exit(1);
    }
}

fn run(opt: Opt) -> Result<()> {
    info!("autotrends-server {}", env!("CARGO_PKG_VERSION"));
    info!("Backend: {}", opt.backend);
    info!("Listening on {}", opt.addr);

    if opt.backend != Backend::memory {
        fs::create_dir_all(&opt.data_dir)?;
        fs::write(opt.data_dir.join(BACKEND_FILE), opt.backend.to_string())?;
    }

    match opt.backend {
        Backend::memory => run_with_backend(MemoryBackend::new(), &opt),
        Backend::sled => run_with_backend(SledBackend::open(&opt.data_dir.join("sled"))?, &opt),
        Backend::redis => {
            if opt.redis_host.is_empty() {
                return Err(TrendsError::Parsing(
                    "the redis backend needs --redis-host or REDIS_IP".to_string(),
                ));
            }
            let backend = RedisBackend::new(&opt.redis_host, opt.redis_port, RedisPolicy::default())?;
            run_with_backend(backend, &opt)
        }
    }
}

fn run_with_backend<B: KvBackend>(backend: B, opt: &Opt) -> Result<()> {
    let api = Api::new(backend, SvgRenderer::new(), opt.csv.clone());
    match opt.pool {
        Pool::shared => {
            TrendsServer::new(api, SharedQueueThreadPool::new(opt.threads)?).run(opt.addr)
        }
        Pool::rayon => TrendsServer::new(api, RayonThreadPool::new(opt.threads)?).run(opt.addr),
    }
}

/// determines if `data_dir` holds a "backend" file and returns the value of that file, else None
///
/// returns `Ok(None)` if the backend file does not (yet) exist or holds invalid contents
fn current_backend(data_dir: &Path) -> Result<Option<Backend>> {
    let marker = data_dir.join(BACKEND_FILE);
    if !marker.exists() {
        return Ok(None);
    }

    match fs::read_to_string(marker)?.trim().parse() {
        Ok(backend) => Ok(Some(backend)),
        Err(e) => {
            // file is corrupted or invalid contents
            warn!("The content of the backend file is invalid: {}", e);
            Ok(None)
        }
    }
}

/// configures a tracing subscriber that will log to STDERR
fn subscriber_config(level: Level) {
    let subscriber = FmtSubscriber::builder()
        // spans and events up to `level` are written
        .with_max_level(level)
        // log to stderr instead of stdout
        .with_writer(std::io::stderr)
        // completes the builder.
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("a global tracing subscriber was already set");
    }
}
